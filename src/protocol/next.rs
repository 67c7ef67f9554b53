use axum::extract::State;
use tracing::info;

use crate::protocol::{Reply, SharedStore};

/// GET /next
pub async fn next(State(store): State<SharedStore>) -> Reply {
    match store.pick_random() {
        Some(picked) => {
            info!("Serving joke #{}", picked.position);
            Reply::RandomJoke(picked)
        }
        None => {
            info!("Joke requested but the list is empty");
            Reply::Empty
        }
    }
}
