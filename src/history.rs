// src/history.rs

use crate::error::HistoryError;
use crate::model::CommitSummary;
use crate::orchestrator::Workspace;
use chrono::{FixedOffset, Offset, TimeZone, Utc};
use git2::build::CheckoutBuilder;
use git2::{Commit, ErrorCode, Oid, Repository, Sort, StatusOptions};
use std::path::{Path, PathBuf};

/// What HEAD pointed at before the run started
#[derive(Debug, Clone)]
enum OriginalHead {
    Branch(String),
    Detached(Oid),
}

/// A repository whose working tree gets moved between commits
pub struct History {
    repo: Repository,
    workdir: PathBuf,
    original_head: OriginalHead,
}

impl History {
    pub fn open(repo_path: &Path) -> Result<Self, HistoryError> {
        let repo = Repository::open(repo_path).map_err(|source| HistoryError::NotARepository {
            path: repo_path.to_path_buf(),
            source,
        })?;

        let workdir = repo
            .workdir()
            .ok_or_else(|| HistoryError::Bare(repo_path.to_path_buf()))?
            .to_path_buf();

        let original_head = {
            let head = match repo.head() {
                Ok(head) => head,
                Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                    return Err(HistoryError::NoCommits(repo_path.to_path_buf()));
                }
                Err(e) => return Err(e.into()),
            };
            match (head.is_branch(), head.name()) {
                (true, Some(name)) => OriginalHead::Branch(name.to_string()),
                _ => OriginalHead::Detached(head.peel_to_commit()?.id()),
            }
        };

        tracing::info!("Opened git repository at: {}", workdir.display());
        Ok(Self {
            repo,
            workdir,
            original_head,
        })
    }

    /// Root of the working tree
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Fails if tracked files differ from HEAD. Untracked and ignored files are
    /// left alone by checkouts, so they don't count.
    pub fn ensure_clean(&self) -> Result<(), HistoryError> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(false).include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut opts))?;
        let dirty: Vec<String> = statuses
            .iter()
            .filter_map(|entry| entry.path().map(String::from))
            .collect();

        if dirty.is_empty() {
            Ok(())
        } else {
            Err(HistoryError::Dirty(dirty.join(", ")))
        }
    }

    /// All commits reachable from HEAD along first parents, oldest first
    pub fn commits(&self) -> Result<Vec<CommitSummary>, HistoryError> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.push_head()?;
        revwalk.simplify_first_parent()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

        let mut commits = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            commits.push(summarize(&commit)?);
        }
        commits.reverse(); // Walk from the first commit to the last

        tracing::debug!("Found {} commits in history", commits.len());
        Ok(commits)
    }

    /// Puts HEAD back where it was when the repository was opened
    pub fn restore(&self) -> Result<(), HistoryError> {
        let target = match &self.original_head {
            OriginalHead::Branch(name) => name.clone(),
            OriginalHead::Detached(oid) => oid.to_string(),
        };
        let to_restore_error = |source: git2::Error| HistoryError::Restore {
            target: target.clone(),
            source,
        };

        match &self.original_head {
            OriginalHead::Branch(name) => {
                let commit = self
                    .repo
                    .find_reference(name)
                    .and_then(|reference| reference.peel_to_commit())
                    .map_err(to_restore_error)?;
                self.force_checkout(&commit).map_err(to_restore_error)?;
                self.repo.set_head(name).map_err(to_restore_error)?;
            }
            OriginalHead::Detached(oid) => {
                let commit = self.repo.find_commit(*oid).map_err(to_restore_error)?;
                self.force_checkout(&commit).map_err(to_restore_error)?;
                self.repo.set_head_detached(*oid).map_err(to_restore_error)?;
            }
        }

        tracing::info!("Restored HEAD to {}", target);
        Ok(())
    }

    fn force_checkout(&self, commit: &Commit) -> Result<(), git2::Error> {
        let mut checkout = CheckoutBuilder::new();
        checkout.force();
        self.repo.checkout_tree(commit.as_object(), Some(&mut checkout))
    }
}

impl Workspace for History {
    fn path(&self) -> &Path {
        &self.workdir
    }

    fn checkout(&mut self, commit: &CommitSummary) -> Result<(), HistoryError> {
        let to_checkout_error = |source: git2::Error| HistoryError::Checkout {
            commit: commit.short_hash.clone(),
            source,
        };

        let target = self.repo.find_commit(commit.id).map_err(to_checkout_error)?;
        self.force_checkout(&target).map_err(to_checkout_error)?;
        self.repo
            .set_head_detached(commit.id)
            .map_err(to_checkout_error)?;

        tracing::debug!("Checked out {}", commit.short_hash);
        Ok(())
    }
}

fn summarize(commit: &Commit) -> Result<CommitSummary, HistoryError> {
    let short_id = commit.as_object().short_id()?;
    let short_hash = short_id.as_str().unwrap_or_default().to_string();

    // Same as `git log --format=%s`: the first paragraph, joined onto one line.
    let message = commit.summary().unwrap_or("").trim().to_string();

    Ok(CommitSummary {
        id: commit.id(),
        short_hash,
        date: format_commit_date(commit.time())?,
        message,
    })
}

/// Formats a git timestamp as `YYYY-MM-DD` in the timezone it was recorded in.
/// An offset chrono cannot represent falls back to UTC.
fn format_commit_date(time: git2::Time) -> Result<String, HistoryError> {
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60).unwrap_or_else(|| {
        tracing::debug!("Commit offset of {} minutes is out of range, using UTC", time.offset_minutes());
        Utc.fix()
    });
    offset
        .timestamp_opt(time.seconds(), 0)
        .single()
        .map(|datetime| datetime.format("%Y-%m-%d").to_string())
        .ok_or(HistoryError::InvalidTimestamp(time.seconds()))
}
