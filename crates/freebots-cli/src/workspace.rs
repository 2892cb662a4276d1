//! Directory-backed workspace loader

use async_trait::async_trait;
use freebots_core::error::{FreebotsError, FreebotsResult};
use freebots_core::handoff::{LoadRequest, WorkspaceLoader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Workspace that materialises each loaded bot as `<name>.xml` in a directory
#[derive(Debug, Clone)]
pub struct DirectoryWorkspace {
    root: PathBuf,
}

impl DirectoryWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Where a bot with `display_name` is written
    pub fn target_path(&self, display_name: &str) -> PathBuf {
        let stem: String = display_name
            .trim()
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c => c,
            })
            .collect();
        let stem = if stem.is_empty() || stem.starts_with('.') {
            format!("bot{}", stem)
        } else {
            stem
        };
        self.root.join(format!("{}.xml", stem))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl WorkspaceLoader for DirectoryWorkspace {
    fn is_ready(&self) -> bool {
        self.root.is_dir()
    }

    async fn load(&self, request: LoadRequest) -> FreebotsResult<()> {
        let path = self.target_path(&request.display_name);
        tokio::fs::write(&path, request.xml_text.as_bytes())
            .await
            .map_err(|e| {
                FreebotsError::io_with_path(
                    format!("Failed to write bot into workspace: {}", e),
                    path.display().to_string(),
                )
            })?;
        debug!(path = %path.display(), "workspace file written");
        Ok(())
    }
}
