//! Read access to the host's achievement activity.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;
use tracing::debug;

use crate::core::date::{parse_datetime, DateFilter};
use crate::error::{ReportError, Result};

/// A kind of achievement (e.g. "Badge"), each of which gets its own report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementType {
    pub id: u64,
    /// Post type name of its achievements; doubles as the report slug.
    pub slug: String,
    pub singular: String,
    pub plural: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: u64,
    pub achievement_type: String,
    pub title: String,
}

/// An activity log post. Entries whose title mentions "unlocked" and which
/// reference an achievement are unlocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub user_id: u64,
    #[serde(default)]
    pub achievement_id: Option<u64>,
    pub title: String,
    /// Stored `YYYY-MM-DD HH:MM:SS`.
    pub date: String,
}

impl LogEntry {
    pub fn is_unlock(&self) -> bool {
        self.achievement_id.is_some() && self.title.to_lowercase().contains("unlocked")
    }

    pub fn posted_at(&self) -> Option<PrimitiveDateTime> {
        parse_datetime(&self.date).map(|at| PrimitiveDateTime::new(at.date(), at.time()))
    }

    pub fn within(&self, filter: &DateFilter) -> bool {
        self.posted_at().is_some_and(|at| filter.matches(at))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    /// Registration date, stored like [`LogEntry::date`].
    pub registered: String,
}

pub trait ActivityStore: Send + Sync {
    fn achievement_types(&self) -> Result<Vec<AchievementType>>;

    /// Achievements of one type, ordered by id.
    fn achievements(&self, achievement_type: &str) -> Result<Vec<Achievement>>;

    fn achievement(&self, id: u64) -> Result<Option<Achievement>>;

    /// Every unlock log entry, oldest first.
    fn unlocks(&self) -> Result<Vec<LogEntry>>;

    /// Users ordered by id.
    fn users(&self) -> Result<Vec<User>>;

    fn user_count(&self) -> Result<usize> {
        Ok(self.users()?.len())
    }
}

/// A store held entirely in memory, loadable from a JSON snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryStore {
    pub achievement_types: Vec<AchievementType>,
    pub achievements: Vec<Achievement>,
    pub log_entries: Vec<LogEntry>,
    pub users: Vec<User>,
}

impl MemoryStore {
    /// Parses a snapshot. The top level must be a JSON object; missing
    /// tables read as empty.
    pub fn from_json(raw: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|err| ReportError::Store(err.to_string()))?;
        if !value.is_object() {
            return Err(ReportError::Store(
                "activity snapshot must be a JSON object".into(),
            ));
        }
        serde_json::from_value(value).map_err(|err| ReportError::Store(err.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|err| ReportError::Store(format!("{}: {err}", path.display())))?;
        let store = Self::from_json(&raw)?;
        debug!(
            path = %path.display(),
            users = store.users.len(),
            log_entries = store.log_entries.len(),
            "loaded activity snapshot"
        );
        Ok(store)
    }
}

impl ActivityStore for MemoryStore {
    fn achievement_types(&self) -> Result<Vec<AchievementType>> {
        Ok(self.achievement_types.clone())
    }

    fn achievements(&self, achievement_type: &str) -> Result<Vec<Achievement>> {
        let mut found: Vec<Achievement> = self
            .achievements
            .iter()
            .filter(|achievement| achievement.achievement_type == achievement_type)
            .cloned()
            .collect();
        found.sort_by_key(|achievement| achievement.id);
        Ok(found)
    }

    fn achievement(&self, id: u64) -> Result<Option<Achievement>> {
        Ok(self.achievements.iter().find(|a| a.id == id).cloned())
    }

    fn unlocks(&self) -> Result<Vec<LogEntry>> {
        let mut unlocks: Vec<LogEntry> = self
            .log_entries
            .iter()
            .filter(|entry| entry.is_unlock())
            .cloned()
            .collect();
        unlocks.sort_by(|a, b| a.posted_at().cmp(&b.posted_at()).then(a.id.cmp(&b.id)));
        Ok(unlocks)
    }

    fn users(&self) -> Result<Vec<User>> {
        let mut users = self.users.clone();
        users.sort_by_key(|user| user.id);
        Ok(users)
    }
}
