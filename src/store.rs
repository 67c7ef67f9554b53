use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::storage::JokeFile;

/// Command token that prefixes a joke submission
pub const ADD_COMMAND: &str = "!jokes";

/// Command token that may prefix a removal request
pub const REMOVE_COMMAND: &str = "!removejokes";

/// A submitted joke
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Joke {
    /// Submitter, stored as `user` to stay readable by older deployments
    #[serde(rename = "user")]
    pub author: String,
    #[serde(rename = "joke")]
    pub text: String,
}

impl Joke {
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
        }
    }
}

/// A joke together with its 1-based position in the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedJoke {
    pub position: usize,
    pub joke: Joke,
}

/// Expected failures of store operations, rendered to users as plain text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("joke submissions are closed")]
    SubmissionsClosed,
    #[error("joke text is empty")]
    EmptyJoke,
    #[error("invalid joke position")]
    InvalidPosition,
}

struct Inner {
    entries: Vec<Joke>,
    submissions_open: bool,
}

/// Ordered joke collection persisted to a JSON file.
///
/// Every successful mutation is flushed to the backing file before the
/// operation returns. A failed flush is logged and the in-memory list stays
/// authoritative until the next successful save.
pub struct JokeStore {
    inner: Mutex<Inner>,
    file: JokeFile,
}

impl JokeStore {
    /// Open the store backed by `path`, starting empty if the file is absent or unreadable
    pub fn open(path: impl Into<PathBuf>, submissions_open: bool) -> Self {
        let file = JokeFile::new(path);

        let entries = match file.load() {
            Ok(Some(mut entries)) => {
                let stored = entries.len();
                entries.retain(|joke| !joke.text.trim().is_empty());
                if entries.len() < stored {
                    warn!(
                        "Dropped {} blank jokes from {}",
                        stored - entries.len(),
                        file.path().display()
                    );
                }
                info!("Loaded {} jokes from {}", entries.len(), file.path().display());
                entries
            }
            Ok(None) => {
                info!("No jokes file at {}, starting empty", file.path().display());
                Vec::new()
            }
            Err(e) => {
                error!("Error loading jokes, starting empty: {}", e);
                Vec::new()
            }
        };

        Self {
            inner: Mutex::new(Inner {
                entries,
                submissions_open,
            }),
            file,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, entries: &[Joke]) {
        if let Err(e) = self.file.save(entries) {
            error!("Error saving jokes: {}", e);
        }
    }

    /// Add the joke carried by `raw_message`, returning the new joke count
    pub fn add(&self, author: &str, raw_message: &str) -> Result<usize, StoreError> {
        let mut inner = self.lock();
        if !inner.submissions_open {
            return Err(StoreError::SubmissionsClosed);
        }

        let text = strip_command(raw_message, ADD_COMMAND);
        if text.is_empty() {
            return Err(StoreError::EmptyJoke);
        }

        inner.entries.push(Joke::new(author, text));
        self.persist(&inner.entries);
        Ok(inner.entries.len())
    }

    /// Remove the joke at the 1-based `position` and return it with that position
    pub fn remove(&self, position: &str) -> Result<PickedJoke, StoreError> {
        let mut inner = self.lock();
        let index = parse_position(position, inner.entries.len()).ok_or_else(|| {
            warn!("Rejected joke position {:?}", position);
            StoreError::InvalidPosition
        })?;

        let joke = inner.entries.remove(index);
        self.persist(&inner.entries);
        Ok(PickedJoke {
            position: index + 1,
            joke,
        })
    }

    /// Pick a joke uniformly at random, `None` when the list is empty
    pub fn pick_random(&self) -> Option<PickedJoke> {
        let inner = self.lock();
        if inner.entries.is_empty() {
            return None;
        }

        let index = rand::rng().random_range(0..inner.entries.len());
        Some(PickedJoke {
            position: index + 1,
            joke: inner.entries[index].clone(),
        })
    }

    /// Snapshot of all jokes in insertion order
    pub fn list(&self) -> Vec<PickedJoke> {
        self
            .lock()
            .entries
            .iter()
            .enumerate()
            .map(|(i, joke)| PickedJoke {
                position: i + 1,
                joke: joke.clone(),
            })
            .collect()
    }

    /// Remove every joke, returning how many were dropped
    pub fn clear(&self) -> usize {
        let mut inner = self.lock();
        let removed = inner.entries.len();
        inner.entries.clear();
        self.persist(&inner.entries);
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn submissions_open(&self) -> bool {
        self.lock().submissions_open
    }

    pub fn set_submissions_open(&self, open: bool) {
        self.lock().submissions_open = open;
    }
}

/// Trim `message` and drop a leading `command` token
fn strip_command<'a>(message: &'a str, command: &str) -> &'a str {
    let message = message.trim();
    match message.strip_prefix(command) {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
        _ => message,
    }
}

/// Map a user-supplied 1-based position to an index into a list of `len` items
fn parse_position(raw: &str, len: usize) -> Option<usize> {
    let position: i64 = strip_command(raw, REMOVE_COMMAND).parse().ok()?;
    let position = usize::try_from(position).ok()?;
    (1..=len).contains(&position).then(|| position - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, JokeStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JokeStore::open(dir.path().join("jokes.json"), true);
        (dir, store)
    }

    fn store_with(texts: &[&str]) -> (TempDir, JokeStore) {
        let (dir, store) = open_store();
        for text in texts {
            store.add("tester", &format!("!jokes {}", text)).unwrap();
        }
        (dir, store)
    }

    fn texts(store: &JokeStore) -> Vec<String> {
        store.list().into_iter().map(|p| p.joke.text).collect()
    }

    fn reload(dir: &TempDir) -> JokeStore {
        JokeStore::open(dir.path().join("jokes.json"), true)
    }

    #[test]
    fn test_add_first_joke() {
        let (_dir, store) = open_store();
        let count = store
            .add("alice", "!jokes why did the chicken cross the road")
            .unwrap();

        assert_eq!(count, 1);
        assert_eq!(
            store.list(),
            vec![PickedJoke {
                position: 1,
                joke: Joke::new("alice", "why did the chicken cross the road"),
            }]
        );
    }

    #[test]
    fn test_add_preserves_call_order() {
        let (_dir, store) = open_store();
        for (i, text) in ["one", "two", "three", "four"].iter().enumerate() {
            assert_eq!(store.add("alice", &format!("!jokes {}", text)), Ok(i + 1));
        }

        assert_eq!(store.len(), 4);
        assert_eq!(texts(&store), vec!["one", "two", "three", "four"]);
        let positions: Vec<usize> = store.list().iter().map(|p| p.position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_add_persists_before_returning() {
        let (dir, store) = open_store();
        store.add("alice", "!jokes persisted").unwrap();

        let reloaded = reload(&dir);
        assert_eq!(reloaded.list(), store.list());
    }

    #[test]
    fn test_add_when_closed() {
        let (dir, store) = store_with(&["existing"]);
        store.set_submissions_open(false);

        assert_eq!(store.add("bob", "!jokes test"), Err(StoreError::SubmissionsClosed));
        assert_eq!(store.add("bob", "!jokes "), Err(StoreError::SubmissionsClosed));
        assert_eq!(texts(&store), vec!["existing"]);
        assert_eq!(texts(&reload(&dir)), vec!["existing"]);
    }

    #[test]
    fn test_add_empty_joke() {
        let (dir, store) = open_store();

        for message in ["!jokes", "!jokes ", "!jokes    \t ", "", "   "] {
            assert_eq!(store.add("alice", message), Err(StoreError::EmptyJoke));
        }
        assert!(store.is_empty());
        assert!(!dir.path().join("jokes.json").exists());
    }

    #[test]
    fn test_add_strips_only_leading_command() {
        let (_dir, store) = open_store();
        store.add("alice", "  !jokes   spaced out  ").unwrap();
        store.add("alice", "no command here").unwrap();
        store.add("alice", "!jokesmith is a word").unwrap();
        store.add("alice", "!jokes quoting !jokes inside").unwrap();

        assert_eq!(
            texts(&store),
            vec![
                "spaced out",
                "no command here",
                "!jokesmith is a word",
                "quoting !jokes inside",
            ]
        );
    }

    #[test]
    fn test_reopen_submissions() {
        let (_dir, store) = open_store();
        store.set_submissions_open(false);
        assert!(!store.submissions_open());

        store.set_submissions_open(true);
        assert!(store.submissions_open());
        assert_eq!(store.add("bob", "!jokes back again"), Ok(1));
    }

    #[test]
    fn test_remove_middle_shifts_later_entries() {
        let (dir, store) = store_with(&["first", "second", "third"]);

        let removed = store.remove("2").unwrap();
        assert_eq!(removed.position, 2);
        assert_eq!(removed.joke, Joke::new("tester", "second"));
        assert_eq!(texts(&store), vec!["first", "third"]);
        assert_eq!(store.list()[1].position, 2);
        assert_eq!(texts(&reload(&dir)), vec!["first", "third"]);
    }

    #[test]
    fn test_remove_bounds() {
        let (_dir, store) = store_with(&["first", "second"]);

        assert_eq!(store.remove("1").unwrap().joke.text, "first");
        assert_eq!(store.remove("1").unwrap().joke.text, "second");
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_invalid_positions() {
        let (dir, store) = store_with(&["first", "second"]);

        for raw in ["5", "3", "0", "-1", "abc", "", "1.5", "2abc", "99999999999999999999"] {
            assert_eq!(store.remove(raw), Err(StoreError::InvalidPosition), "{:?}", raw);
        }
        assert_eq!(texts(&store), vec!["first", "second"]);
        assert_eq!(texts(&reload(&dir)), vec!["first", "second"]);
    }

    #[test]
    fn test_remove_accepts_command_prefix() {
        let (_dir, store) = store_with(&["first", "second"]);

        assert_eq!(store.remove("!removejokes 2").unwrap().joke.text, "second");
        assert_eq!(store.remove(" 1 ").unwrap().joke.text, "first");
    }

    #[test]
    fn test_remove_from_empty_store() {
        let (_dir, store) = open_store();
        assert_eq!(store.remove("1"), Err(StoreError::InvalidPosition));
    }

    #[test]
    fn test_pick_random_empty() {
        let (_dir, store) = open_store();
        assert_eq!(store.pick_random(), None);
    }

    #[test]
    fn test_pick_random_returns_stored_entry() {
        let (_dir, store) = store_with(&["a", "b", "c"]);
        let listed = store.list();

        for _ in 0..100 {
            let picked = store.pick_random().unwrap();
            assert_eq!(listed[picked.position - 1], picked);
        }
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_pick_random_reaches_every_entry() {
        let (_dir, store) = store_with(&["a", "b", "c"]);
        let mut seen = [false; 3];

        for _ in 0..1000 {
            seen[store.pick_random().unwrap().position - 1] = true;
        }
        assert_eq!(seen, [true; 3]);
    }

    #[test]
    fn test_clear() {
        let (dir, store) = store_with(&["a", "b"]);

        assert_eq!(store.clear(), 2);
        assert!(store.is_empty());
        assert!(reload(&dir).is_empty());
    }

    #[test]
    fn test_open_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jokes.json");
        std::fs::write(&path, "this is not json").unwrap();

        let store = JokeStore::open(&path, true);
        assert!(store.is_empty());
        assert_eq!(store.add("alice", "!jokes fresh start"), Ok(1));
    }

    #[test]
    fn test_open_drops_blank_jokes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jokes.json");
        std::fs::write(
            &path,
            r#"[{"user":"a","joke":"   "},{"user":"b","joke":""},{"user":"c","joke":"kept"}]"#,
        )
        .unwrap();

        let store = JokeStore::open(&path, true);
        assert_eq!(
            store.list(),
            vec![PickedJoke {
                position: 1,
                joke: Joke::new("c", "kept"),
            }]
        );
        assert_eq!(store.pick_random().unwrap().joke.text, "kept");
    }

    #[test]
    fn test_open_unreadable_path_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jokes.json");
        std::fs::create_dir(&path).unwrap();

        let store = JokeStore::open(&path, true);
        assert!(store.is_empty());
        assert_eq!(store.pick_random(), None);
    }

    #[test]
    fn test_failed_save_keeps_memory_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = JokeStore::open(dir.path().join("missing").join("jokes.json"), true);

        assert_eq!(store.add("alice", "!jokes only in memory"), Ok(1));
        assert_eq!(texts(&store), vec!["only in memory"]);
        assert_eq!(store.remove("1").unwrap().joke.text, "only in memory");
    }

    #[test]
    fn test_round_trip_through_file() {
        let (dir, store) = open_store();
        store.add("alice", "!jokes one").unwrap();
        store.add("anonymous", "!jokes two").unwrap();
        store.add("bob", "!jokes three").unwrap();
        store.remove("1").unwrap();

        assert_eq!(reload(&dir).list(), store.list());
    }

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("1", 3), Some(0));
        assert_eq!(parse_position("3", 3), Some(2));
        assert_eq!(parse_position("+2", 3), Some(1));
        assert_eq!(parse_position("4", 3), None);
        assert_eq!(parse_position("-3", 3), None);
        assert_eq!(parse_position("!removejokes", 3), None);
    }
}
