// src/fixtures.rs

//! Scratch repositories for tests.

use git2::{Commit, Oid, Repository, Signature, Time};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub struct FixtureRepo {
    pub dir: TempDir,
    pub repo: Repository,
}

impl FixtureRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Commits on top of HEAD. `None` content deletes the file.
    pub fn commit(&self, files: &[(&str, Option<&str>)], message: &str, seconds: i64) -> Oid {
        let mut index = self.repo.index().unwrap();
        for (name, content) in files {
            let path = self.path().join(name);
            match content {
                Some(content) => {
                    fs::write(&path, content).unwrap();
                    index.add_path(Path::new(name)).unwrap();
                }
                None => {
                    fs::remove_file(&path).unwrap();
                    index.remove_path(Path::new(name)).unwrap();
                }
            }
        }
        index.write().unwrap();

        let tree_id = index.write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();
        let signature = Signature::new("Test", "test@example.com", &Time::new(seconds, 0)).unwrap();

        let parents: Vec<Commit> = match self.repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => Vec::new(),
        };
        let parent_refs: Vec<&Commit> = parents.iter().collect();

        self.repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parent_refs)
            .unwrap()
    }
}
