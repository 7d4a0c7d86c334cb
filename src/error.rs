// src/error.rs

//! Error types for sampling, git access, script execution and artifact output.
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error for a sampling run. Every variant is fatal to the run;
/// per-commit script failures are recorded in the metadata instead.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Sampling error: {0}")]
    Sample(#[from] SampleError),

    #[error("Git error: {0}")]
    History(#[from] HistoryError),

    #[error("Script error: {0}")]
    Runner(#[from] RunnerError),

    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Output directory {0} must not contain the repository")]
    OutputIsRepository(PathBuf),

    #[error("Script {script} lives inside output directory {output}, which is wiped before the run")]
    ScriptInOutput { script: PathBuf, output: PathBuf },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SampleError {
    #[error("Sample size must be at least 1")]
    ZeroSampleSize,

    #[error("Cannot sample from an empty history")]
    EmptyHistory,
}

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Not a git repository: {path}: {source}")]
    NotARepository {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("Repository at {0} has no commits")]
    NoCommits(PathBuf),

    #[error("Repository at {0} is bare and has no working tree")]
    Bare(PathBuf),

    #[error("Working tree has uncommitted changes in {0}; commit or stash them, or pass --force")]
    Dirty(String),

    #[error("Commit timestamp {0} is out of range")]
    InvalidTimestamp(i64),

    #[error("Failed to check out commit {commit}: {source}")]
    Checkout {
        commit: String,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to restore HEAD to {target}: {source}")]
    Restore {
        target: String,
        #[source]
        source: git2::Error,
    },

    #[error(transparent)]
    Git(#[from] git2::Error),
}

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Script not found: {0}")]
    NotFound(PathBuf),

    #[error("Script is not a regular file: {0}")]
    NotAFile(PathBuf),

    #[error("Script is not executable: {0} (make it executable or pass --interpreter)")]
    NotExecutable(PathBuf),

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Failed to prepare output directory {path}: {source}")]
    Prepare {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize metadata: {0}")]
    Serialize(#[from] serde_json::Error),
}
