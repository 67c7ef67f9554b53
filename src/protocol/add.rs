use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::info;

use crate::protocol::{
    ANONYMOUS, ChatMessage, Reply, SharedStore, json_or_default, query_or_default,
};
use crate::store::{JokeStore, StoreError};

/// Fields of an add request
#[derive(Debug, Default, Deserialize)]
pub struct AddParams {
    pub user: Option<String>,
    pub message: Option<String>,
}

impl From<ChatMessage> for AddParams {
    fn from(body: ChatMessage) -> Self {
        Self {
            user: body.user,
            message: body.message.map(|m| m.to_string()),
        }
    }
}

impl AddParams {
    /// Submitter name, falling back to `anonymous` when missing or blank
    fn user(&self) -> String {
        match self.user.as_deref().map(str::trim) {
            Some(user) if !user.is_empty() => user.to_string(),
            _ => ANONYMOUS.to_string(),
        }
    }
}

/// Run an add request against the store
pub fn execute(params: &AddParams, store: &JokeStore) -> Reply {
    let user = params.user();
    let message = params.message.as_deref().unwrap_or_default();

    match store.add(&user, message) {
        Ok(count) => {
            info!("Joke added by {}, {} jokes stored", user, count);
            Reply::Added { user, count }
        }
        Err(StoreError::SubmissionsClosed) => {
            info!("Rejected joke from {}: submissions closed", user);
            Reply::SubmissionsClosed { user }
        }
        // add never reports a position error
        Err(StoreError::EmptyJoke | StoreError::InvalidPosition) => {
            info!("Rejected empty joke from {}", user);
            Reply::EmptyJoke { user }
        }
    }
}

/// GET /add-to-jokes?user=..&message=..
pub async fn add_from_query(
    State(store): State<SharedStore>,
    query: Result<Query<AddParams>, QueryRejection>,
) -> Reply {
    execute(&query_or_default("/add-to-jokes", query), &store)
}

/// POST /add-to-jokes with a JSON body
pub async fn add_from_json(
    State(store): State<SharedStore>,
    body: Result<Json<ChatMessage>, JsonRejection>,
) -> Reply {
    let params = AddParams::from(json_or_default("/add-to-jokes", body));
    execute(&params, &store)
}
