use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::info;

use crate::protocol::{ChatMessage, Reply, SharedStore, json_or_default, query_or_default};
use crate::store::JokeStore;

/// Query string of GET /remove-from-jokes
#[derive(Debug, Default, Deserialize)]
pub struct RemoveQuery {
    pub position: Option<String>,
}

/// Remove the joke at `position`, addressing the reply to `user` if given
pub fn execute(position: &str, user: Option<String>, store: &JokeStore) -> Reply {
    match store.remove(position) {
        Ok(removed) => {
            info!(
                "Removed joke #{} submitted by {}",
                removed.position, removed.joke.author
            );
            Reply::Removed {
                user,
                position: removed.position,
            }
        }
        Err(e) => {
            info!("Remove rejected for {:?}: {}", position, e);
            Reply::InvalidPosition { user }
        }
    }
}

/// GET /remove-from-jokes?position=..
pub async fn remove_from_query(
    State(store): State<SharedStore>,
    query: Result<Query<RemoveQuery>, QueryRejection>,
) -> Reply {
    let query = query_or_default("/remove-from-jokes", query);
    execute(query.position.as_deref().unwrap_or_default(), None, &store)
}

/// POST /remove-from-jokes with a JSON chat message, `message` being
/// `!removejokes <n>` or a bare number
pub async fn remove_from_json(
    State(store): State<SharedStore>,
    body: Result<Json<ChatMessage>, JsonRejection>,
) -> Reply {
    let body = json_or_default("/remove-from-jokes", body);
    let position = body.message.map(|m| m.to_string()).unwrap_or_default();
    execute(&position, body.user, &store)
}
