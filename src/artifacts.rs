// src/artifacts.rs

use crate::error::ArtifactError;
use crate::model::MetadataDocument;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const METADATA_FILE: &str = "metadata.json";

/// Output directory holding one `<short-hash>.txt` per commit plus `metadata.json`
#[derive(Debug)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Wipes `dir` if it exists and creates it empty, so nothing from an
    /// earlier run survives.
    pub fn create(dir: &Path) -> Result<Self, ArtifactError> {
        let to_prepare_error = |source: std::io::Error| ArtifactError::Prepare {
            path: dir.to_path_buf(),
            source,
        };

        if dir.exists() {
            tracing::debug!("Removing previous artifacts in {}", dir.display());
            fs::remove_dir_all(dir).map_err(to_prepare_error)?;
        }
        fs::create_dir_all(dir).map_err(to_prepare_error)?;

        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn output_path(&self, short_hash: &str) -> PathBuf {
        self.dir.join(format!("{}.txt", short_hash))
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }

    /// Stores the raw analysis output for one commit, byte for byte
    pub fn write_output(&self, short_hash: &str, output: &[u8]) -> Result<PathBuf, ArtifactError> {
        let path = self.output_path(short_hash);
        write(&path, output)?;
        Ok(path)
    }

    pub fn write_metadata(&self, metadata: &MetadataDocument) -> Result<PathBuf, ArtifactError> {
        let path = self.metadata_path();

        let mut json = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut json, formatter);
        metadata.serialize(&mut serializer)?;
        json.push(b'\n');

        write(&path, &json)?;
        Ok(path)
    }
}

fn write(path: &Path, contents: &[u8]) -> Result<(), ArtifactError> {
    fs::write(path, contents).map_err(|source| ArtifactError::Write {
        path: path.to_path_buf(),
        source,
    })
}
