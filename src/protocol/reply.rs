use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::store::PickedJoke;

/// Plain-text replies sent back to the chat bot.
///
/// Expected failures (closed submissions, bad positions, ...) are replies like
/// any other and share the same `200 OK` status.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Landing page text
    Welcome,
    /// A randomly chosen joke
    RandomJoke(PickedJoke),
    /// The joke list has no entries
    Empty,
    /// Joke accepted, with the new total
    Added { user: String, count: usize },
    /// Submissions are currently closed
    SubmissionsClosed { user: String },
    /// The message carried no joke text
    EmptyJoke { user: String },
    /// Joke removed; `user` is set when the request came from a chat message
    Removed { user: Option<String>, position: usize },
    /// Position missing, malformed, or out of range
    InvalidPosition { user: Option<String> },
    /// Every stored joke, in order
    List(Vec<PickedJoke>),
    /// Submissions flag changed
    SubmissionsToggled { open: bool },
    /// Collection wiped, with the number of jokes dropped
    Cleared { count: usize },
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Welcome => write!(
                f,
                "Welcome to the Nightbot Jokes Manager! Use /jokes, /add-to-jokes, /clear-jokes, /open-jokes, /close-jokes, or /next."
            ),
            Reply::RandomJoke(picked) => write!(
                f,
                "Random joke: {} (Submitted by: {})",
                picked.joke.text, picked.joke.author
            ),
            Reply::Empty => write!(f, "The jokes list is currently empty."),
            Reply::Added { user, count } => write!(
                f,
                "@{}, your joke has been added! Current jokes count: {} jokes.",
                user, count
            ),
            Reply::SubmissionsClosed { user } => write!(
                f,
                "@{}, jokes submissions are currently closed. You cannot add jokes right now.",
                user
            ),
            Reply::EmptyJoke { user } => write!(
                f,
                "@{}, please provide a joke to add. Usage: !jokes <your joke>",
                user
            ),
            Reply::Removed {
                user: Some(user),
                position,
            } => write!(f, "@{}, joke #{} has been removed!", user, position),
            Reply::Removed {
                user: None,
                position,
            } => write!(f, "Joke #{} has been removed!", position),
            Reply::InvalidPosition { user: Some(user) } => write!(
                f,
                "@{}, invalid position. Please provide a valid joke number to remove.",
                user
            ),
            Reply::InvalidPosition { user: None } => write!(
                f,
                "Invalid position. Please provide a valid joke number to remove."
            ),
            Reply::List(jokes) if jokes.is_empty() => write!(f, "The jokes list is currently empty."),
            Reply::List(jokes) => {
                for (i, picked) in jokes.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(
                        f,
                        "#{}: {} (Submitted by: {})",
                        picked.position, picked.joke.text, picked.joke.author
                    )?;
                }
                Ok(())
            }
            Reply::SubmissionsToggled { open: true } => write!(f, "Jokes submissions are now open."),
            Reply::SubmissionsToggled { open: false } => write!(f, "Jokes submissions are now closed."),
            Reply::Cleared { count } => write!(f, "All jokes have been cleared! ({} removed)", count),
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.to_string()).into_response()
    }
}
