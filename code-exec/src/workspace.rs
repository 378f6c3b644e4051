use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{error::Error, languages::LanguageProfile};

const DIR_PREFIX: &str = "code-run-";

/// Scratch directory owned by exactly one execution.
///
/// Removal happens in [`Workspace::release`] or, if that is never reached
/// (early return, panic, dropped future), in `Drop`. Either way it runs once.
#[derive(Debug)]
pub struct Workspace {
    root_dir: PathBuf,
    source_file: PathBuf,
    artifact_file: Option<PathBuf>,
    released: bool,
}

impl Workspace {
    /// Create a uniquely named directory under `base` holding an empty source file.
    pub async fn acquire(base: &Path, profile: &LanguageProfile) -> Result<Self, Error> {
        let root_dir = base.join(format!("{}{}", DIR_PREFIX, Uuid::new_v4()));

        // `create_dir` rather than `create_dir_all`: an existing path is a collision, not a reuse.
        fs::create_dir(&root_dir)
            .await
            .map_err(|source| Error::WorkspaceCreation {
                path: root_dir.clone(),
                source,
            })?;

        let source_file = root_dir.join(profile.source_file_name());
        let mut workspace = Workspace {
            root_dir,
            source_file,
            artifact_file: None,
            released: false,
        };

        if let Err(source) = fs::File::create(&workspace.source_file).await {
            let path = workspace.source_file.clone();
            workspace.cleanup();
            return Err(Error::WorkspaceCreation { path, source });
        }

        debug!("Acquired workspace {:?}", workspace.root_dir);
        Ok(workspace)
    }

    pub async fn write_source(&self, code: &str) -> Result<(), Error> {
        fs::write(&self.source_file, code)
            .await
            .map_err(|source| Error::WorkspaceWrite {
                path: self.source_file.clone(),
                source,
            })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn source_file(&self) -> &Path {
        &self.source_file
    }

    pub fn artifact_file(&self) -> Option<&Path> {
        self.artifact_file.as_deref()
    }

    /// Record the artifact produced by a successful build so release removes it.
    pub fn set_artifact(&mut self, path: PathBuf) {
        self.artifact_file = Some(path);
    }

    /// Remove everything this workspace created. Never fails outward.
    pub async fn release(mut self) {
        if self.released {
            return;
        }
        self.released = true;

        log_removal(fs::remove_file(&self.source_file).await, &self.source_file);
        if let Some(artifact) = &self.artifact_file {
            log_removal(fs::remove_file(artifact).await, artifact);
        }
        // Toolchains may leave intermediates behind; take the whole tree.
        log_removal(fs::remove_dir_all(&self.root_dir).await, &self.root_dir);
        debug!("Released workspace {:?}", self.root_dir);
    }

    /// Blocking variant for paths that cannot await: `Drop` and failed acquisition.
    fn cleanup(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        log_removal(std::fs::remove_file(&self.source_file), &self.source_file);
        if let Some(artifact) = &self.artifact_file {
            log_removal(std::fs::remove_file(artifact), artifact);
        }
        log_removal(std::fs::remove_dir_all(&self.root_dir), &self.root_dir);
        debug!("Released workspace {:?} on drop", self.root_dir);
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// A path that is already gone is not an error at cleanup time.
fn log_removal(result: std::io::Result<()>, path: &Path) {
    match result {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {:?}: {}", path, e),
    }
}
