//! Listing and moderation endpoints

use axum::extract::State;
use tracing::info;

use crate::protocol::{Reply, SharedStore};

/// GET /
pub async fn welcome() -> Reply {
    Reply::Welcome
}

/// GET /jokes
pub async fn list(State(store): State<SharedStore>) -> Reply {
    Reply::List(store.list())
}

/// GET /open-jokes
pub async fn open(State(store): State<SharedStore>) -> Reply {
    store.set_submissions_open(true);
    info!("Joke submissions opened");
    Reply::SubmissionsToggled { open: true }
}

/// GET /close-jokes
pub async fn close(State(store): State<SharedStore>) -> Reply {
    store.set_submissions_open(false);
    info!("Joke submissions closed");
    Reply::SubmissionsToggled { open: false }
}

/// GET /clear-jokes
pub async fn clear(State(store): State<SharedStore>) -> Reply {
    let count = store.clear();
    info!("Cleared {} jokes", count);
    Reply::Cleared { count }
}
