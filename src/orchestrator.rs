// src/orchestrator.rs

use crate::artifacts::ArtifactStore;
use crate::cli::Args;
use crate::error::{HistoryError, RunError};
use crate::history::History;
use crate::model::*;
use crate::runner::{Analyzer, ScriptRunner};
use crate::sampler;
use indicatif::ProgressBar;
use std::fs;
use std::path::Path;

/// A working tree that can be moved from one commit to another.
///
/// There is only one working tree per repository, so commits are visited
/// strictly one after another.
pub trait Workspace {
    fn path(&self) -> &Path;
    fn checkout(&mut self, commit: &CommitSummary) -> Result<(), HistoryError>;
}

/// Validates everything, samples the history of `args.repo` and analyzes each
/// sampled commit. HEAD is put back where it was afterwards, also on failure.
pub fn run(args: &Args) -> Result<RunSummary, RunError> {
    let analyzer = ScriptRunner::new(&args.script, args.interpreter.as_deref())?;

    let mut history = History::open(&args.repo)?;
    if args.force {
        tracing::warn!("--force given, uncommitted changes to tracked files will be overwritten");
    } else {
        history.ensure_clean()?;
    }
    ensure_output_is_disposable(&args.output, history.workdir(), analyzer.script())?;

    let commits = history.commits()?;
    let sampled = sampler::select(&commits, args.max_commits as usize)?;
    tracing::info!(
        "Total commits in the repository: {}, sampling {}",
        commits.len(),
        sampled.len()
    );

    let store = ArtifactStore::create(&args.output)?;
    tracing::info!(
        "Running {} against each sample, writing artefacts to {}",
        analyzer.script().display(),
        store.dir().display()
    );
    let progress = if args.no_progress {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(sampled.len() as u64)
    };

    let result = process_commits(&sampled, &mut history, &analyzer, &store, &progress);
    let restored = history.restore();

    let mut summary = match (result, restored) {
        (Ok(summary), Ok(())) => summary,
        (Ok(_), Err(e)) => return Err(e.into()),
        (Err(e), Ok(())) => return Err(e),
        (Err(e), Err(restore_err)) => {
            tracing::error!("{}", restore_err);
            return Err(e);
        }
    };
    summary.total_commits = commits.len();
    Ok(summary)
}

/// Checks out and analyzes each commit in order, writing one output file per
/// commit and `metadata.json` at the end.
///
/// A failing script is recorded in the commit's `errors` field and the run
/// goes on. A failing checkout stops the run, but the metadata gathered up to
/// that point is still written.
pub fn process_commits<W, A>(
    commits: &[CommitSummary],
    workspace: &mut W,
    analyzer: &A,
    store: &ArtifactStore,
    progress: &ProgressBar,
) -> Result<RunSummary, RunError>
where
    W: Workspace,
    A: Analyzer,
{
    let mut metadata = MetadataDocument::today();
    let result = visit_commits(commits, workspace, analyzer, store, progress, &mut metadata);

    match (store.write_metadata(&metadata), &result) {
        (Ok(path), _) => tracing::debug!(
            "Wrote {} records to {}",
            metadata.commits.len(),
            path.display()
        ),
        (Err(e), Ok(_)) => return Err(e.into()),
        (Err(e), Err(_)) => tracing::error!("Could not save partial metadata: {}", e),
    }
    result
}

fn visit_commits<W, A>(
    commits: &[CommitSummary],
    workspace: &mut W,
    analyzer: &A,
    store: &ArtifactStore,
    progress: &ProgressBar,
    metadata: &mut MetadataDocument,
) -> Result<RunSummary, RunError>
where
    W: Workspace,
    A: Analyzer,
{
    let mut summary = RunSummary::default();
    progress.set_message("Analyzing commits");

    for commit in commits {
        progress.suspend(|| {
            tracing::info!(
                "Processing commit {} - {} ({})",
                commit.short_hash,
                commit.message,
                commit.date
            )
        });

        workspace.checkout(commit)?;

        let output = analyzer
            .analyze(workspace.path())
            .unwrap_or_else(|e| AnalysisOutput::not_started(&e.to_string()));
        let errors = output.errors();
        if let Some(errors) = &errors {
            summary.failed += 1;
            progress.suspend(|| {
                tracing::warn!("Analysis of {} reported errors: {}", commit.short_hash, errors)
            });
        }

        store.write_output(&commit.short_hash, &output.combined)?;
        metadata.push(CommitRecord::new(commit, errors));
        summary.processed += 1;

        progress.inc(1);
    }
    progress.finish_with_message("Analysis complete");

    Ok(summary)
}

/// The output directory is wiped at the start of a run, so it must not hold
/// the repository or the script. `script` is expected to be canonical already.
fn ensure_output_is_disposable(output: &Path, workdir: &Path, script: &Path) -> Result<(), RunError> {
    let Ok(output) = fs::canonicalize(output) else {
        // Not created yet, so it cannot hold anything.
        return Ok(());
    };
    let workdir = fs::canonicalize(workdir).unwrap_or_else(|_| workdir.to_path_buf());

    if workdir.starts_with(&output) {
        return Err(RunError::OutputIsRepository(output));
    }
    if script.starts_with(&output) {
        return Err(RunError::ScriptInOutput {
            script: script.to_path_buf(),
            output,
        });
    }
    Ok(())
}
