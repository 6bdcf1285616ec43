use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_NOTICE_TTL_SECS: i64 = 6;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoticeKind {
    Info,
    Warning,
    Critical,
    Success,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NoticeKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Transient notices. Expiry is driven by the caller's clock.
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    notices: Vec<Notice>,
    next_id: u64,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: NoticeKind, message: impl Into<String>, now: DateTime<Utc>) -> String {
        self.next_id += 1;
        let id = format!("notice-{}", self.next_id);
        self.notices.push(Notice {
            id: id.clone(),
            kind,
            message: message.into(),
            timestamp: now,
        });
        id
    }

    pub fn dismiss(&mut self, id: &str) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    /// Drop notices at least `ttl` old. Returns how many went.
    pub fn expire(&mut self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let before = self.notices.len();
        self.notices.retain(|n| now - n.timestamp < ttl);
        before - self.notices.len()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.notices.last()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}
