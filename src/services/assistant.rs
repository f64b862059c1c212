use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Value, json};
use tracing::instrument;

use crate::{
    ai::{AiClient, GenerateRequest},
    error::{AppError, AppResult},
    models::QuizQuestion,
};

const CHAT_PERSONA: &str = "You are a friendly, knowledgeable cooking assistant. \
    Answer the user's question about the recipe below. Keep answers practical and concise, \
    and suggest substitutions or techniques when they help.";

const QUIZ_QUESTION_COUNT: usize = 5;
const QUIZ_OPTION_COUNT: usize = 4;

#[derive(Clone)]
pub struct AssistantService {
    ai_client: Arc<AiClient>,
}

impl AssistantService {
    pub fn new(ai_client: Arc<AiClient>) -> Self {
        Self { ai_client }
    }

    #[instrument(name = "assistant.chat", skip_all, fields(message_len = user_message.len()))]
    pub async fn chat(&self, user_message: &str, recipe_context: &Value) -> AppResult<String> {
        let prompt = build_chat_prompt(user_message, recipe_context);

        let resp = self
            .ai_client
            .generate(&GenerateRequest::text("chat", prompt))
            .await
            .map_err(|e| AppError::Ai(e.to_string()))?;

        Ok(resp.content)
    }

    #[instrument(name = "assistant.quiz", skip_all, fields(quiz.questions))]
    pub async fn quiz(&self, recipe_context: &Value) -> AppResult<Vec<QuizQuestion>> {
        let prompt = build_quiz_prompt(recipe_context);

        let resp = self
            .ai_client
            .generate(&GenerateRequest::structured("quiz", prompt, quiz_schema()))
            .await
            .map_err(|e| AppError::Ai(e.to_string()))?;

        let quiz = parse_quiz(&resp.content)?;

        tracing::Span::current().record("quiz.questions", quiz.len());

        Ok(quiz)
    }
}

fn build_chat_prompt(user_message: &str, recipe_context: &Value) -> String {
    format!(
        "{CHAT_PERSONA}\n\n\
        Recipe:\n{}\n\n\
        User question: {user_message}",
        recipe_context
    )
}

fn build_quiz_prompt(recipe_context: &Value) -> String {
    format!(
        "Create a quiz about the recipe below to test how well someone knows it.\n\n\
        Recipe:\n{recipe_context}\n\n\
        Rules:\n\
        - Write exactly {QUIZ_QUESTION_COUNT} multiple-choice questions about the ingredients, \
        steps, timing, and techniques of this recipe.\n\
        - Each question must have exactly {QUIZ_OPTION_COUNT} distinct options.\n\
        - \"correctAnswer\" must be copied exactly from one of the options.\n\
        - Give a short \"explanation\" of why the answer is correct.\n\
        Return only the JSON array."
    )
}

/// Response schema in the Gemini OpenAPI subset: an array of question objects.
pub fn quiz_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "question": { "type": "STRING" },
                "options": { "type": "ARRAY", "items": { "type": "STRING" } },
                "correctAnswer": { "type": "STRING" },
                "explanation": { "type": "STRING" }
            },
            "required": ["question", "options", "correctAnswer", "explanation"]
        }
    })
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        if let Some(inner) = rest.trim_end().strip_suffix("```") {
            return inner.trim();
        }
    }
    trimmed
}

fn parse_quiz(content: &str) -> AppResult<Vec<QuizQuestion>> {
    let quiz: Vec<QuizQuestion> = serde_json::from_str(strip_code_fence(content))
        .map_err(|e| AppError::Ai(format!("quiz reply is not valid JSON: {e}")))?;

    if quiz.is_empty() {
        return Err(AppError::Ai("quiz reply contained no questions".to_string()));
    }

    for (i, question) in quiz.iter().enumerate() {
        validate_question(question).map_err(|reason| {
            AppError::Ai(format!("quiz question {} is malformed: {reason}", i + 1))
        })?;
    }

    if quiz.len() != QUIZ_QUESTION_COUNT {
        tracing::warn!(
            expected = QUIZ_QUESTION_COUNT,
            actual = quiz.len(),
            "Quiz question count differs from request"
        );
    }

    Ok(quiz)
}

fn validate_question(question: &QuizQuestion) -> Result<(), String> {
    if question.options.len() != QUIZ_OPTION_COUNT {
        return Err(format!(
            "expected {QUIZ_OPTION_COUNT} options, got {}",
            question.options.len()
        ));
    }

    let distinct: HashSet<&str> = question.options.iter().map(String::as_str).collect();
    if distinct.len() != question.options.len() {
        return Err("options are not distinct".to_string());
    }

    if !distinct.contains(question.correct_answer.as_str()) {
        return Err("correct answer is not one of the options".to_string());
    }

    Ok(())
}
