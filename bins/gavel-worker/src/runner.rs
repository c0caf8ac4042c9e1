//! Test runner: execute a compiled artifact against a question's test cases.
//!
//! **Core responsibility:** spawn one fresh process per test case, feed it
//! the case's input on stdin, capture its combined stdout+stderr, and
//! compare byte-for-byte against the expected output. No trimming, no
//! normalization.
//!
//! **Execution rules:**
//! - Test cases run strictly sequentially, one process lifetime at a time;
//!   `outcomes[i]` always corresponds to `tests[i]`.
//! - The stdin write runs on its own task, concurrent with the child, and
//!   is joined before the outcome is recorded. Writing before the child
//!   drains would deadlock both sides on a pipe-sized input.
//! - Every child is capped at a wall-clock limit; on expiry it is killed
//!   and the case is recorded as `TimedOut`.
//! - A spawn failure or non-zero exit aborts the submission as a
//!   `RunFailure`. A crash is not a wrong answer.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, warn};

use gavel_common::error::JudgeError;
use gavel_common::types::{TestCase, TestOutcome};

use crate::compile::Artifact;

pub struct TestRunner {
    timeout: Duration,
}

impl TestRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run every test case in order against the artifact.
    pub async fn run(
        &self,
        artifact: &Artifact,
        tests: &[TestCase],
    ) -> Result<Vec<TestOutcome>, JudgeError> {
        let mut outcomes = Vec::with_capacity(tests.len());

        for test in tests {
            let started = Instant::now();
            let outcome = self.run_one(artifact, test).await?;

            debug!(
                test_id = test.id,
                outcome = ?outcome,
                execution_ms = started.elapsed().as_millis() as u64,
                "test executed"
            );

            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    async fn run_one(&self, artifact: &Artifact, test: &TestCase) -> Result<TestOutcome, JudgeError> {
        let mut child = Command::new(&artifact.binary_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                JudgeError::run(format!(
                    "failed to spawn {}: {}",
                    artifact.binary_path.display(),
                    e
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| JudgeError::run("child has no stdin handle"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| JudgeError::run("child has no stdout handle"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| JudgeError::run("child has no stderr handle"))?;

        // Feed the input concurrently with execution and close the pipe to
        // signal end-of-input. A write error means the child exited without
        // draining stdin; grading proceeds on whatever it produced.
        let input = test.input.clone().into_bytes();
        let feeder = tokio::spawn(async move {
            let _ = stdin.write_all(&input).await;
            let _ = stdin.shutdown().await;
        });

        // Drain both pipes while waiting, so a chatty child cannot fill a
        // pipe buffer and stall against our wait().
        let stdout_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stdout.read_to_end(&mut buf).await;
            buf
        });
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            buf
        });

        let status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                feeder.abort();
                return Err(JudgeError::run(format!("failed to reap child: {}", e)));
            }
            Err(_) => {
                warn!(
                    test_id = test.id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "test exceeded wall-clock cap, killing"
                );
                if let Err(e) = child.kill().await {
                    warn!(test_id = test.id, error = %e, "failed to kill timed-out child");
                }
                feeder.abort();
                return Ok(TestOutcome::TimedOut);
            }
        };

        // The writer is joined before any outcome is recorded.
        let _ = feeder.await;

        let mut combined = stdout_task
            .await
            .map_err(|e| JudgeError::run(format!("stdout collector failed: {}", e)))?;
        combined.extend(
            stderr_task
                .await
                .map_err(|e| JudgeError::run(format!("stderr collector failed: {}", e)))?,
        );

        if !status.success() {
            return Err(JudgeError::run(format!(
                "tested process exited with {}",
                status
            )));
        }

        Ok(if combined == test.output.as_bytes() {
            TestOutcome::Passed
        } else {
            TestOutcome::Failed
        })
    }
}
