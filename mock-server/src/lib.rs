use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub done: bool,
}

#[derive(Deserialize)]
pub struct CreateItem {
    pub name: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Deserialize)]
pub struct UpdateItem {
    pub name: Option<String>,
    pub done: Option<bool>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
}

/// Error body shape shared by every failing route.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

pub struct Failure(StatusCode, &'static str);

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let body = ErrorMessage {
            message: self.1.to_string(),
        };
        (self.0, Json(body)).into_response()
    }
}

const NOT_FOUND: Failure = Failure(StatusCode::NOT_FOUND, "item not found");
const EMPTY_NAME: Failure = Failure(StatusCode::BAD_REQUEST, "name must not be empty");

pub type Db = Arc<RwLock<HashMap<Uuid, Item>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/{id}",
            get(get_item)
                .put(replace_item)
                .patch(update_item)
                .delete(delete_item),
        )
        .layer(middleware::from_fn(require_bearer))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock server listening");
    }
    axum::serve(listener, app()).await
}

async fn require_bearer(request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| !token.is_empty());
    if !authorized {
        debug!(uri = %request.uri(), "rejecting request without bearer token");
        return Failure(StatusCode::UNAUTHORIZED, "missing bearer token").into_response();
    }
    next.run(request).await
}

async fn list_items(State(db): State<Db>, Query(query): Query<ListQuery>) -> Json<Vec<Item>> {
    let items = db.read().await;
    let mut matching: Vec<Item> = items
        .values()
        .filter(|item| query.q.as_deref().map_or(true, |q| item.name.contains(q)))
        .cloned()
        .collect();
    matching.sort_by(|a, b| a.name.cmp(&b.name));
    Json(matching)
}

async fn create_item(
    State(db): State<Db>,
    Json(input): Json<CreateItem>,
) -> Result<Json<Item>, Failure> {
    if input.name.trim().is_empty() {
        return Err(EMPTY_NAME);
    }
    let item = Item {
        id: Uuid::new_v4(),
        name: input.name,
        done: input.done,
    };
    db.write().await.insert(item.id, item.clone());
    Ok(Json(item))
}

async fn get_item(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<Item>, Failure> {
    let items = db.read().await;
    items.get(&id).cloned().map(Json).ok_or(NOT_FOUND)
}

async fn replace_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<CreateItem>,
) -> Result<Json<Item>, Failure> {
    if input.name.trim().is_empty() {
        return Err(EMPTY_NAME);
    }
    let mut items = db.write().await;
    let item = items.get_mut(&id).ok_or(NOT_FOUND)?;
    item.name = input.name;
    item.done = input.done;
    Ok(Json(item.clone()))
}

async fn update_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateItem>,
) -> Result<Json<Item>, Failure> {
    let mut items = db.write().await;
    let item = items.get_mut(&id).ok_or(NOT_FOUND)?;
    if let Some(name) = input.name {
        if name.trim().is_empty() {
            return Err(EMPTY_NAME);
        }
        item.name = name;
    }
    if let Some(done) = input.done {
        item.done = done;
    }
    Ok(Json(item.clone()))
}

async fn delete_item(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<Item>, Failure> {
    let mut items = db.write().await;
    items.remove(&id).map(Json).ok_or(NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_serializes_to_json() {
        let item = Item {
            id: Uuid::nil(),
            name: "Test".to_string(),
            done: false,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["name"], "Test");
        assert_eq!(json["done"], false);
    }

    #[test]
    fn create_item_defaults_done_to_false() {
        let input: CreateItem = serde_json::from_str(r#"{"name":"No done field"}"#).unwrap();
        assert_eq!(input.name, "No done field");
        assert!(!input.done);
    }

    #[test]
    fn create_item_rejects_missing_name() {
        let result: Result<CreateItem, _> = serde_json::from_str(r#"{"done":true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_item_all_fields_optional() {
        let input: UpdateItem = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.name.is_none());
        assert!(input.done.is_none());
    }

    #[test]
    fn failure_keeps_its_status() {
        let response = NOT_FOUND.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
