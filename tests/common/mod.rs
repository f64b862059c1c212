use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header::CONTENT_TYPE},
};
use serde_json::Value;
use time::OffsetDateTime;
use tower::util::ServiceExt;

use recipe_assistant_api::{
    AppState,
    ai::{AiClient, GenerateRequest, GenerateResponse, Provider},
    models::{Favorite, NewFavorite},
    repository::FavoriteStore,
    routes::create_router,
    services::{AssistantService, FavoriteService},
};

#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Favorite>>,
    next_id: Mutex<i32>,
    pub fail: bool,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), sqlx::Error> {
        if self.fail {
            Err(sqlx::Error::PoolTimedOut)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl FavoriteStore for MemoryStore {
    async fn create(&self, favorite: &NewFavorite) -> Result<Favorite, sqlx::Error> {
        self.check()?;
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;

        let row = Favorite {
            id: *next_id,
            user_id: favorite.user_id.clone(),
            recipe_id: favorite.recipe_id,
            title: favorite.title.clone(),
            image: favorite.image.clone(),
            cook_time: favorite.cook_time.clone(),
            servings: favorite.servings,
            created_at: OffsetDateTime::now_utc(),
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Favorite>, sqlx::Error> {
        self.check()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, user_id: &str, recipe_id: i32) -> Result<u64, sqlx::Error> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|f| !(f.user_id == user_id && f.recipe_id == recipe_id));
        Ok((before - rows.len()) as u64)
    }
}

/// Replies with queued outcomes in order and records every request it receives.
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, String>>>,
    pub requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedProvider {
    pub fn replying(reply: Result<&str, &str>) -> Self {
        let provider = Self::default();
        provider
            .replies
            .lock()
            .unwrap()
            .push_back(reply.map(str::to_string).map_err(str::to_string));
        provider
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.requests.lock().unwrap().push(req.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("no scripted reply".to_string()));

        match reply {
            Ok(content) => Ok(GenerateResponse {
                content,
                model: "scripted-1".to_string(),
                input_tokens: 10,
                output_tokens: 5,
                finish_reason: "stop".to_string(),
            }),
            Err(msg) => Err(anyhow::anyhow!(msg)),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-1"
    }
}

pub fn app(store: Arc<MemoryStore>, provider: Arc<ScriptedProvider>) -> Router {
    let state = AppState {
        favorite_service: FavoriteService::new(store),
        assistant_service: AssistantService::new(Arc::new(AiClient::new(provider))),
    };
    create_router(state)
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

pub async fn send_raw(app: &Router, uri: &str, body: &'static str) -> StatusCode {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();

    app.clone().oneshot(request).await.unwrap().status()
}
