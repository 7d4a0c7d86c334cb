// src/cli.rs

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run an analysis script against evenly spaced commits of a git repository", long_about = None)]
pub struct Args {
    /// Path to the analysis script, run with the checked-out working tree as its current directory
    #[arg(long, env = "GIT_SAMPLE_SCRIPT")]
    pub script: PathBuf,

    /// Path to the git repository to sample
    #[arg(long, env = "GIT_SAMPLE_REPO")]
    pub repo: PathBuf,

    /// Number of commits to sample, always including the first and the last one
    #[arg(long, env = "GIT_SAMPLE_MAX_COMMITS", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_commits: u32,

    /// Directory for the per-commit output and metadata.json. Recreated on every run
    #[arg(short, long, env = "GIT_SAMPLE_OUTPUT", default_value = "artefacts")]
    pub output: PathBuf,

    /// Run the script through this program (e.g. `bash`) instead of executing it directly
    #[arg(long, env = "GIT_SAMPLE_INTERPRETER")]
    pub interpreter: Option<PathBuf>,

    /// Check out commits even if tracked files have uncommitted changes (they will be lost)
    #[arg(long)]
    pub force: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}
