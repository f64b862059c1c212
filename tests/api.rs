mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{MemoryStore, ScriptedProvider, app, send, send_raw};
use recipe_assistant_api::services::quiz_schema;

fn quiz_reply() -> String {
    let question = json!({
        "question": "Which herb is added at the end?",
        "options": ["Basil", "Thyme", "Rosemary", "Sage"],
        "correctAnswer": "Basil",
        "explanation": "Basil goes in right before serving."
    });
    json!([question.clone(), question.clone(), question.clone(), question.clone(), question])
        .to_string()
}

#[tokio::test]
async fn health_returns_success() {
    let app = app(Arc::default(), Arc::default());

    let (status, body) = send(&app, Method::GET, "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));
}

#[tokio::test]
async fn add_favorite_returns_created_record() {
    let store = Arc::new(MemoryStore::default());
    let app = app(store.clone(), Arc::default());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/favorites",
        Some(json!({"userId": "u1", "recipeId": 7, "title": "Soup"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["userId"], "u1");
    assert_eq!(body["recipeId"], 7);
    assert_eq!(body["title"], "Soup");
    assert!(body["id"].as_i64().is_some());
    assert!(body["createdAt"].is_string());
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn add_favorite_missing_fields_is_rejected_without_write() {
    let store = Arc::new(MemoryStore::default());
    let app = app(store.clone(), Arc::default());

    let bodies = [
        json!({"recipeId": 7, "title": "Soup"}),
        json!({"userId": "u1", "title": "Soup"}),
        json!({"userId": "u1", "recipeId": 7}),
    ];

    for body in bodies {
        let (status, response) = send(&app, Method::POST, "/api/favorites", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "Missing required fields");
    }

    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn add_favorite_malformed_body_is_bad_request() {
    let store = Arc::new(MemoryStore::default());
    let app = app(store.clone(), Arc::default());

    assert_eq!(
        send_raw(&app, "/api/favorites", "{not json").await,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        send_raw(&app, "/api/favorites", r#"{"userId": "u1", "recipeId": "seven", "title": "Soup"}"#).await,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn add_favorite_store_failure_is_server_error() {
    let app = app(Arc::new(MemoryStore::failing()), Arc::default());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/favorites",
        Some(json!({"userId": "u1", "recipeId": 7, "title": "Soup"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn list_favorites_empty_for_unknown_user() {
    let app = app(Arc::default(), Arc::default());

    let (status, body) = send(&app, Method::GET, "/api/favorites/nobody", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn list_favorites_returns_only_that_users_rows() {
    let app = app(Arc::default(), Arc::default());

    for (user, recipe) in [("u1", 1), ("u1", 2), ("u2", 3)] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/favorites",
            Some(json!({"userId": user, "recipeId": recipe, "title": "Dish"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, Method::GET, "/api/favorites/u1", None).await;

    assert_eq!(status, StatusCode::OK);
    let mut recipes: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["recipeId"].as_i64().unwrap())
        .collect();
    recipes.sort();
    assert_eq!(recipes, vec![1, 2]);
}

#[tokio::test]
async fn list_favorites_store_failure_is_server_error() {
    let app = app(Arc::new(MemoryStore::failing()), Arc::default());

    let (status, _) = send(&app, Method::GET, "/api/favorites/u1", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn delete_favorite_removes_only_that_pair() {
    let store = Arc::new(MemoryStore::default());
    let app = app(store.clone(), Arc::default());

    for recipe in [1, 2] {
        send(
            &app,
            Method::POST,
            "/api/favorites",
            Some(json!({"userId": "u1", "recipeId": recipe, "title": "Dish"})),
        )
        .await;
    }

    let (status, body) = send(&app, Method::DELETE, "/api/favorites/u1/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (_, remaining) = send(&app, Method::GET, "/api/favorites/u1", None).await;
    let remaining = remaining.as_array().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["recipeId"], 2);
}

#[tokio::test]
async fn delete_favorite_is_idempotent() {
    let app = app(Arc::default(), Arc::default());

    let (status, _) = send(&app, Method::DELETE, "/api/favorites/u1/99", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::DELETE, "/api/favorites/u1/not-a-number", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn duplicate_favorites_are_kept_and_deleted_together() {
    let store = Arc::new(MemoryStore::default());
    let app = app(store.clone(), Arc::default());
    let favorite = json!({"userId": "u1", "recipeId": 7, "title": "Soup"});

    for _ in 0..2 {
        let (status, _) = send(&app, Method::POST, "/api/favorites", Some(favorite.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, listed) = send(&app, Method::GET, "/api/favorites/u1", None).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|f| f["recipeId"] == 7));
    assert_ne!(listed[0]["id"], listed[1]["id"]);

    let (status, _) = send(&app, Method::DELETE, "/api/favorites/u1/7", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, listed) = send(&app, Method::GET, "/api/favorites/u1", None).await;
    assert_eq!(listed, json!([]));
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn delete_favorite_store_failure_is_server_error() {
    let app = app(Arc::new(MemoryStore::failing()), Arc::default());

    let (status, _) = send(&app, Method::DELETE, "/api/favorites/u1/1", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn chat_returns_generated_text() {
    let provider = Arc::new(ScriptedProvider::replying(Ok("Yes, it freezes well for 3 months.")));
    let app = app(Arc::default(), provider.clone());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/ai/chat",
        Some(json!({
            "userMessage": "Can I freeze it?",
            "recipeContext": {"title": "Tomato Soup", "ingredients": ["tomato", "basil"]}
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "Yes, it freezes well for 3 months.");

    let requests = provider.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].operation, "chat");
    assert!(requests[0].response_schema.is_none());
    assert!(requests[0].prompt.contains("Tomato Soup"));
    assert!(requests[0].prompt.contains("Can I freeze it?"));
}

#[tokio::test]
async fn chat_provider_failure_is_server_error() {
    let provider = Arc::new(ScriptedProvider::replying(Err("Gemini API error (429): quota")));
    let app = app(Arc::default(), provider);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/ai/chat",
        Some(json!({"userMessage": "Hi", "recipeContext": {}})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn chat_without_message_still_calls_provider() {
    let provider = Arc::new(ScriptedProvider::replying(Err("Gemini API error (400): empty")));
    let app = app(Arc::default(), provider.clone());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/ai/chat",
        Some(json!({"recipeContext": {}})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(provider.requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn quiz_returns_parsed_questions() {
    let reply = quiz_reply();
    let provider = Arc::new(ScriptedProvider::replying(Ok(reply.as_str())));
    let app = app(Arc::default(), provider.clone());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/ai/quiz",
        Some(json!({"recipeContext": {"title": "Tomato Soup"}})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let quiz = body["quiz"].as_array().unwrap();
    assert_eq!(quiz.len(), 5);
    for question in quiz {
        let fields = question.as_object().unwrap();
        assert_eq!(fields.len(), 4);
        for key in ["question", "options", "correctAnswer", "explanation"] {
            assert!(fields.contains_key(key), "missing {key}");
        }
    }

    let requests = provider.requests.lock().unwrap();
    assert_eq!(requests[0].operation, "quiz");
    assert_eq!(requests[0].response_schema, Some(quiz_schema()));
}

#[tokio::test]
async fn quiz_malformed_reply_is_server_error() {
    let provider = Arc::new(ScriptedProvider::replying(Ok("Sure! Question 1: ...")));
    let app = app(Arc::default(), provider);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/ai/quiz",
        Some(json!({"recipeContext": {"title": "Tomato Soup"}})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn quiz_provider_failure_is_server_error() {
    let provider = Arc::new(ScriptedProvider::replying(Err("error trying to connect")));
    let app = app(Arc::default(), provider);

    let (status, _) = send(&app, Method::POST, "/api/ai/quiz", Some(json!({}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
