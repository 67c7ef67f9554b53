//! Chat-bot command endpoints
//!
//! Each command maps request fields onto one `JokeStore` operation and
//! renders the outcome as a plain-text `Reply`. Malformed requests never
//! surface as HTTP errors: their fields are treated as missing.

pub mod add;
pub mod admin;
pub mod next;
pub mod remove;
pub mod reply;

use std::fmt;
use std::sync::Arc;

use axum::Json;
use axum::extract::Query;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use serde::Deserialize;
use tracing::warn;

use crate::store::JokeStore;

pub use reply::Reply;

/// Store handle shared by every request handler
pub type SharedStore = Arc<JokeStore>;

/// Name used when a request carries no user
pub const ANONYMOUS: &str = "anonymous";

/// JSON body sent by the chat bot on POST routes
#[derive(Debug, Default, Deserialize)]
pub struct ChatMessage {
    pub user: Option<String>,
    pub message: Option<MessageText>,
}

/// Message field, accepted as a JSON string or a bare number
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MessageText {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for MessageText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageText::Text(text) => write!(f, "{}", text),
            MessageText::Number(number) => write!(f, "{}", number),
        }
    }
}

/// Unwrap query parameters, falling back to empty ones if they were rejected
pub fn query_or_default<T: Default>(route: &str, query: Result<Query<T>, QueryRejection>) -> T {
    match query {
        Ok(Query(params)) => params,
        Err(e) => {
            warn!("Ignoring malformed query on {}: {}", route, e);
            T::default()
        }
    }
}

/// Unwrap a JSON body, falling back to an empty one if it was rejected
pub fn json_or_default<T: Default>(route: &str, body: Result<Json<T>, JsonRejection>) -> T {
    match body {
        Ok(Json(body)) => body,
        Err(e) => {
            warn!("Ignoring malformed body on {}: {}", route, e);
            T::default()
        }
    }
}
