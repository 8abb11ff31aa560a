use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while loading a library snapshot.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Failed to read library file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid library JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Library file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Episode
// ============================================================================

/// Stable identity of an episode: guid when present, link otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EpisodeKey {
    Guid(String),
    Link(String),
}

/// A single feed item.
///
/// Field names on the wire follow the library snapshot format (`pubDate`,
/// `readed`), so snapshots exported by the store load unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Episode {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub guid: Option<String>,
    #[serde(default, rename = "pubDate")]
    pub pub_date: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "readed", alias = "read")]
    pub read: bool,
}

impl Episode {
    /// Identity used for highlighting and navigation.
    ///
    /// Empty strings count as absent. Returns `None` when the episode has
    /// neither a guid nor a link; such episodes can be shown but never found
    /// again by identity.
    pub fn key(&self) -> Option<EpisodeKey> {
        if let Some(guid) = non_empty(&self.guid) {
            return Some(EpisodeKey::Guid(guid.to_string()));
        }
        non_empty(&self.link).map(|link| EpisodeKey::Link(link.to_string()))
    }

    /// True when both episodes have an identity and it is the same.
    pub fn same_identity(&self, other: &Episode) -> bool {
        match (self.key(), other.key()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Publication time as a Unix timestamp, `None` if `pubDate` is missing
    /// or unparseable.
    pub fn published(&self) -> Option<i64> {
        parse_pub_date(&self.pub_date)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Parse the date formats feeds commonly carry.
///
/// Date-only values are taken as midnight UTC.
pub fn parse_pub_date(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.timestamp());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.and_utc().timestamp());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}

// ============================================================================
// Source and Library
// ============================================================================

/// A feed grouping episodes.
///
/// `episodes` is shared behind an `Arc` so the app and the store can hold the
/// same snapshot; the store copies on write.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Source {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub episodes: Arc<Vec<Episode>>,
}

impl Source {
    pub fn unread_count(&self) -> usize {
        self.episodes.iter().filter(|e| !e.read).count()
    }
}

/// On-disk shapes accepted for a library snapshot.
#[derive(Deserialize)]
#[serde(untagged)]
enum LibraryFile {
    Sources { sources: Vec<Source> },
    Episodes(Vec<Episode>),
}

/// Snapshot of every source and its episodes.
#[derive(Debug, Clone, Default)]
pub struct Library {
    pub sources: Vec<Source>,
}

impl Library {
    /// Maximum snapshot size (64 MB).
    const MAX_FILE_SIZE: u64 = 64 * 1_048_576;

    /// Build a library from sources, filling in missing ids and titles.
    pub fn new(mut sources: Vec<Source>) -> Self {
        for (i, source) in sources.iter_mut().enumerate() {
            if source.id.trim().is_empty() {
                source.id = format!("source-{}", i);
            }
            if source.title.trim().is_empty() {
                source.title = source
                    .url
                    .clone()
                    .unwrap_or_else(|| format!("Source {}", i + 1));
            }
        }
        Self { sources }
    }

    /// Parse a snapshot from JSON text.
    pub fn from_json(content: &str) -> Result<Self, LibraryError> {
        let file: LibraryFile = serde_json::from_str(content)?;
        let sources = match file {
            LibraryFile::Sources { sources } => sources,
            LibraryFile::Episodes(episodes) => vec![Source {
                id: "episodes".to_string(),
                title: "Episodes".to_string(),
                url: None,
                episodes: Arc::new(episodes),
            }],
        };
        Ok(Self::new(sources))
    }

    /// Load a snapshot from disk.
    pub fn load(path: &Path) -> Result<Self, LibraryError> {
        let meta = std::fs::metadata(path)?;
        if meta.len() > Self::MAX_FILE_SIZE {
            return Err(LibraryError::TooLarge(format!(
                "Library file is {} bytes (max {} bytes)",
                meta.len(),
                Self::MAX_FILE_SIZE
            )));
        }
        let content = std::fs::read_to_string(path)?;
        let library = Self::from_json(&content)?;
        tracing::info!(
            path = %path.display(),
            sources = library.sources.len(),
            episodes = library.episode_count(),
            "Loaded library"
        );
        Ok(library)
    }

    pub fn episode_count(&self) -> usize {
        self.sources.iter().map(|s| s.episodes.len()).sum()
    }

    pub fn source(&self, id: &str) -> Option<&Source> {
        self.sources.iter().find(|s| s.id == id)
    }

    /// Mark every episode of a source as read.
    ///
    /// Returns the number of episodes that changed, or `None` if the source
    /// is unknown.
    pub fn mark_source_read(&mut self, id: &str) -> Option<usize> {
        let source = self.sources.iter_mut().find(|s| s.id == id)?;
        let changed = source.episodes.iter().filter(|e| !e.read).count();
        if changed > 0 {
            for episode in Arc::make_mut(&mut source.episodes).iter_mut() {
                episode.read = true;
            }
        }
        Some(changed)
    }

    /// Mark a single episode as read. Returns true if its state changed.
    pub fn mark_episode_read(&mut self, id: &str, key: &EpisodeKey) -> bool {
        let Some(source) = self.sources.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        let Some(pos) = source
            .episodes
            .iter()
            .position(|e| !e.read && e.key().as_ref() == Some(key))
        else {
            return false;
        };
        Arc::make_mut(&mut source.episodes)[pos].read = true;
        true
    }
}

// ============================================================================
// Tests
// ============================================================================
