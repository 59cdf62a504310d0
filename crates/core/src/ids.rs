use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a grid row.
///
/// Persisted rows may carry ids minted elsewhere (`row_0`, `imported_...`),
/// so the id is an opaque string rather than a parsed UUID.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RowId({})", self.0)
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Mints row ids of the form `<prefix>_<session>_<n>`.
///
/// `session` is taken once per generator from a v7 UUID and `n` is a
/// monotonic counter, so two calls never produce the same id regardless of
/// clock resolution. Callers pass a predicate for ids already in use; taken
/// ids are skipped.
#[derive(Debug, Clone)]
pub struct RowIdGenerator {
    prefix: String,
    session: String,
    next: u64,
}

impl RowIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        let simple = Uuid::now_v7().simple().to_string();
        // The low half of a v7 UUID is random; the high half is the timestamp.
        let session = simple[simple.len() - 8..].to_string();
        Self::with_session(prefix, session)
    }

    pub fn with_session(prefix: impl Into<String>, session: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            session: session.into(),
            next: 0,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn next_id(&mut self, is_taken: impl Fn(&RowId) -> bool) -> RowId {
        loop {
            let id = RowId(format!("{}_{}_{}", self.prefix, self.session, self.next));
            self.next += 1;
            if !is_taken(&id) {
                return id;
            }
        }
    }
}
