//! Compilation manager: persist source bytes and produce a runnable binary.
//!
//! Artifact paths are derived from the submission's v4 UUID, so concurrent
//! compilations can never collide. Nothing here deletes artifacts; they are
//! left on disk for whatever retention process owns the work directory.

use std::path::PathBuf;
use std::time::Duration;

use tokio::fs;
use tokio::process::Command;
use tracing::{debug, warn};

use gavel_common::error::JudgeError;
use gavel_common::types::Submission;

/// The compiled form of a submission.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub source_path: PathBuf,
    pub binary_path: PathBuf,
}

pub struct Compiler {
    work_dir: PathBuf,
    compiler: PathBuf,
    timeout: Duration,
}

impl Compiler {
    pub fn new(work_dir: PathBuf, compiler: PathBuf, timeout: Duration) -> Self {
        Self {
            work_dir,
            compiler,
            timeout,
        }
    }

    /// Write the submission's source verbatim and invoke the external
    /// compiler on it.
    ///
    /// Failure modes: any filesystem error is a `PersistFailure`; a spawn
    /// error, non-zero exit, or blown wall-clock cap is a `CompileFailure`.
    /// Compiler diagnostics are logged, not parsed.
    pub async fn compile(&self, submission: &Submission) -> Result<Artifact, JudgeError> {
        fs::create_dir_all(&self.work_dir)
            .await
            .map_err(|e| JudgeError::Persist {
                path: self.work_dir.clone(),
                source: e,
            })?;

        let source_path = self.work_dir.join(format!("{}.cpp", submission.id));
        let binary_path = self.work_dir.join(format!("{}.bin", submission.id));

        fs::write(&source_path, &submission.source_bytes)
            .await
            .map_err(|e| JudgeError::Persist {
                path: source_path.clone(),
                source: e,
            })?;

        debug!(
            submission_id = %submission.id,
            source = %source_path.display(),
            source_size = submission.source_bytes.len(),
            declared_size = submission.declared_size,
            "source persisted, invoking compiler"
        );

        let invocation = Command::new(&self.compiler)
            .arg(&source_path)
            .arg("-o")
            .arg(&binary_path)
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, invocation).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(JudgeError::compile(format!(
                    "failed to spawn {}: {}",
                    self.compiler.display(),
                    e
                )))
            }
            Err(_) => {
                return Err(JudgeError::compile(format!(
                    "compiler exceeded {}ms",
                    self.timeout.as_millis()
                )))
            }
        };

        if !output.status.success() {
            warn!(
                submission_id = %submission.id,
                exit = ?output.status.code(),
                diagnostics = String::from_utf8_lossy(&output.stderr).lines().next().unwrap_or(""),
                "compilation failed"
            );
            return Err(JudgeError::compile(format!(
                "compiler exited with {}",
                output.status
            )));
        }

        debug!(submission_id = %submission.id, binary = %binary_path.display(), "compilation succeeded");

        Ok(Artifact {
            source_path,
            binary_path,
        })
    }
}
