use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Every way one submission's pipeline run can fail.
///
/// Each kind is scoped to the submission that triggered it: the worker loop
/// logs it, publishes an unjudgeable verdict where a submission exists, and
/// keeps consuming messages.
#[derive(Debug, Error)]
pub enum JudgeError {
    /// Question id absent from the bank, or its example list does not parse
    /// into the test-case shape.
    #[error("question '{question_id}' cannot be resolved: {reason}")]
    Lookup { question_id: String, reason: String },

    /// Inbound message body is missing a field or has the wrong shape.
    #[error("submission payload is malformed: {reason}")]
    Decode { reason: String },

    /// Source bytes could not be written to disk.
    #[error("failed to persist source at {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Compiler could not be spawned, exceeded its wall-clock cap, or
    /// exited non-zero.
    #[error("compilation failed: {reason}")]
    Compile { reason: String },

    /// Tested process could not be spawned or exited non-zero. Distinct
    /// from a wrong answer, which is an ordinary `Failed` outcome.
    #[error("test execution failed: {reason}")]
    Run { reason: String },
}

impl JudgeError {
    pub fn lookup(question_id: &str, reason: impl Into<String>) -> Self {
        Self::Lookup {
            question_id: question_id.to_string(),
            reason: reason.into(),
        }
    }

    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    pub fn compile(reason: impl Into<String>) -> Self {
        Self::Compile {
            reason: reason.into(),
        }
    }

    pub fn run(reason: impl Into<String>) -> Self {
        Self::Run {
            reason: reason.into(),
        }
    }
}
