// src/model.rs

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A commit as read from the repository history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    /// Full commit id
    pub id: git2::Oid,
    /// Unique abbreviated hash, used for artifact names and metadata keys
    pub short_hash: String,
    /// Committer date as `YYYY-MM-DD`, in the commit's own timezone
    pub date: String,
    /// Commit subject: the first paragraph of the message on one line
    pub message: String,
}

/// Metadata recorded for one processed commit.
///
/// The hash is the key of the enclosing map in `metadata.json`, so it is not
/// repeated in the serialized value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    #[serde(skip)]
    pub hash: String,
    pub date: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<String>,
}

impl CommitRecord {
    pub fn new(commit: &CommitSummary, errors: Option<String>) -> Self {
        Self {
            hash: commit.short_hash.clone(),
            date: commit.date.clone(),
            message: commit.message.clone(),
            errors,
        }
    }
}

/// Contents of `metadata.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDocument {
    /// Run date as `YYYY-MM-DD`
    pub created: String,
    /// Records keyed by short hash, in processing order
    pub commits: IndexMap<String, CommitRecord>,
}

impl MetadataDocument {
    pub fn new(created: impl Into<String>) -> Self {
        Self {
            created: created.into(),
            commits: IndexMap::new(),
        }
    }

    /// Starts a document stamped with today's local date
    pub fn today() -> Self {
        Self::new(chrono::Local::now().format("%Y-%m-%d").to_string())
    }

    pub fn push(&mut self, record: CommitRecord) {
        self.commits.insert(record.hash.clone(), record);
    }

    /// Parses a document, restoring each record's hash from its key
    #[cfg(test)]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut doc: Self = serde_json::from_str(json)?;
        for (hash, record) in doc.commits.iter_mut() {
            record.hash = hash.clone();
        }
        Ok(doc)
    }
}

/// Captured result of running the analysis script on one checkout.
///
/// Output is kept as raw bytes so the artifact is exactly what the script
/// printed, whatever its encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisOutput {
    /// stdout and stderr interleaved in the order the chunks arrived
    pub combined: Vec<u8>,
    /// stderr on its own, used to decide whether the commit failed
    pub stderr: Vec<u8>,
    pub success: bool,
    pub exit_code: Option<i32>,
}

impl AnalysisOutput {
    /// Output for a script that could not be started at all
    pub fn not_started(message: &str) -> Self {
        Self {
            combined: message.as_bytes().to_vec(),
            stderr: message.as_bytes().to_vec(),
            success: false,
            exit_code: None,
        }
    }

    /// Error text for the metadata record, if the run counts as failed.
    ///
    /// A run fails when the script exits unsuccessfully or writes anything to stderr.
    pub fn errors(&self) -> Option<String> {
        let stderr = String::from_utf8_lossy(&self.stderr);
        let stderr = stderr.trim();
        if !stderr.is_empty() {
            return Some(stderr.to_string());
        }
        if self.success {
            return None;
        }
        Some(match self.exit_code {
            Some(code) => format!("script exited with status {}", code),
            None => "script terminated by signal".to_string(),
        })
    }
}

/// Outcome of a complete run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Commits in the repository history
    pub total_commits: usize,
    /// Sampled commits that were checked out and analyzed
    pub processed: usize,
    /// Processed commits whose record carries an `errors` field
    pub failed: usize,
}
