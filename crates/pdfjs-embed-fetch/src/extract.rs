use std::path::Path;

use crate::error::FetchError;

/// Unpacks a downloaded archive into an existing directory.
#[async_trait::async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, archive: &Path, dest: &Path) -> Result<(), FetchError>;
}

/// Runs the platform's archive tool as a child process: `unzip` on
/// Unix-like systems, PowerShell's `Expand-Archive` on Windows.
#[derive(Debug, Clone)]
pub struct SystemExtractor {
    unzip: String,
}

impl SystemExtractor {
    pub fn new() -> Self {
        Self {
            unzip: "unzip".to_owned(),
        }
    }

    /// Use a different `unzip` binary (ignored on Windows).
    pub fn with_unzip(program: impl Into<String>) -> Self {
        Self {
            unzip: program.into(),
        }
    }

    /// Program and arguments used to unpack `archive` into `dest`.
    pub fn invocation(&self, archive: &Path, dest: &Path) -> (String, Vec<String>) {
        if cfg!(windows) {
            let script = format!(
                "Expand-Archive -Force '{}' '{}'",
                ps_quote(archive),
                ps_quote(dest)
            );
            ("powershell".to_owned(), vec!["-Command".to_owned(), script])
        } else {
            (
                self.unzip.clone(),
                vec![
                    "-q".to_owned(),
                    archive.to_string_lossy().into_owned(),
                    "-d".to_owned(),
                    dest.to_string_lossy().into_owned(),
                ],
            )
        }
    }
}

impl Default for SystemExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Extractor for SystemExtractor {
    async fn extract(&self, archive: &Path, dest: &Path) -> Result<(), FetchError> {
        let (program, args) = self.invocation(archive, dest);

        let output = tokio::process::Command::new(&program)
            .args(&args)
            .output()
            .await
            .map_err(|e| FetchError::Extraction(format!("could not run {program}: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FetchError::Extraction(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// Single quotes inside a PowerShell single-quoted string are doubled.
fn ps_quote(path: &Path) -> String {
    path.to_string_lossy().replace('\'', "''")
}
