use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::Account;

/// Persisted login session.
///
/// Wire shape is `{"me": "<account>", "ts": <millis>}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub me: Account,
    pub ts: i64,
}

impl Session {
    pub fn start(me: Account) -> Self {
        Session {
            me,
            ts: Utc::now().timestamp_millis(),
        }
    }

    /// Parse a stored session. Unknown accounts and malformed JSON yield `None`.
    pub fn from_stored(raw: &str) -> Option<Self> {
        match serde_json::from_str::<Option<Session>>(raw) {
            Ok(session) => session,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unreadable session record");
                None
            }
        }
    }
}
