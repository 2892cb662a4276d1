//! Single-file resolution

use super::open_cache;
use crate::console::CLIConsole;
use freebots_core::config::FreebotsConfig;
use freebots_core::error::{ErrorCategory, FreebotsError, FreebotsResult};
use std::path::Path;

/// Resolve `file` and print or write its XML
pub async fn fetch(config: &FreebotsConfig, file: &str, output: Option<&Path>) -> FreebotsResult<()> {
    let console = CLIConsole::new(true);
    let cache = open_cache(config)?;

    let resolved = match cache.resolve_detailed(file).await {
        Ok(resolved) => resolved,
        Err(e) => {
            match e.category() {
                ErrorCategory::NotFound => console.warn(&format!("{file} does not exist in the store")),
                ErrorCategory::Transient => {
                    console.error(&format!("Could not reach the store for {file}: {e}"));
                    console.warn("The failure was not cached; try again later");
                }
                _ => console.error(&format!("Failed to resolve {file}: {e}")),
            }
            return Err(e);
        }
    };

    match output {
        Some(path) => {
            tokio::fs::write(path, resolved.xml.as_bytes())
                .await
                .map_err(|e| {
                    FreebotsError::io_with_path(
                        format!("Failed to write XML: {}", e),
                        path.display().to_string(),
                    )
                })?;
            console.success(&format!(
                "Wrote {} ({} bytes, from {})",
                path.display(),
                resolved.xml.len(),
                resolved.source
            ));
        }
        None => {
            println!("{}", resolved.xml);
            tracing::info!(file, source = %resolved.source, "resolved");
        }
    }

    Ok(())
}
