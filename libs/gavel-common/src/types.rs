use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::JudgeError;

/// One inbound unit of work: a submitted program and the question it targets.
///
/// Built by the decoder from a raw message body and passed through the
/// pipeline by value; nothing holds onto it after its run completes. The
/// `id` is minted at decode time and is the only uniqueness source for
/// artifact names and the verdict key.
#[derive(Debug, Clone)]
pub struct Submission {
    pub id: Uuid,
    pub question_id: String,
    pub source_bytes: Vec<u8>,
    /// Size hint supplied by the sender. Logged, never validated against
    /// `source_bytes.len()`.
    pub declared_size: u64,
}

/// One input/expected-output pair belonging to a question.
///
/// `id` is ordinal within the question, not globally unique. `output` is
/// compared verbatim against the combined stdout+stderr of the tested
/// process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: u32,
    pub input: String,
    pub output: String,
}

/// Per-test outcome. A crashing process is not one of these; that aborts
/// the submission as a `RunFailure` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestOutcome {
    Passed,
    Failed,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    /// Every test case ran; `outcomes[i]` corresponds to test case `i`.
    Judged,
    /// A pipeline stage failed for this submission alone; `outcomes` is
    /// empty and `error` says why.
    Unjudgeable,
}

/// The published result of judging one submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictReport {
    pub submission_id: Uuid,
    pub question_id: String,
    pub status: VerdictStatus,
    pub outcomes: Vec<TestOutcome>,
    pub error: Option<String>,
    pub judged_at: DateTime<Utc>,
}

impl VerdictReport {
    pub fn judged(submission: &Submission, outcomes: Vec<TestOutcome>) -> Self {
        Self {
            submission_id: submission.id,
            question_id: submission.question_id.clone(),
            status: VerdictStatus::Judged,
            outcomes,
            error: None,
            judged_at: Utc::now(),
        }
    }

    pub fn unjudgeable(submission: &Submission, error: &JudgeError) -> Self {
        Self {
            submission_id: submission.id,
            question_id: submission.question_id.clone(),
            status: VerdictStatus::Unjudgeable,
            outcomes: Vec::new(),
            error: Some(error.to_string()),
            judged_at: Utc::now(),
        }
    }

    /// Number of passing test cases.
    pub fn passed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| **o == TestOutcome::Passed)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_submission() -> Submission {
        Submission {
            id: Uuid::new_v4(),
            question_id: "Q1".to_string(),
            source_bytes: b"int main() {}".to_vec(),
            declared_size: 13,
        }
    }

    #[test]
    fn test_judged_report_carries_outcomes_in_order() {
        let submission = make_submission();
        let report = VerdictReport::judged(
            &submission,
            vec![TestOutcome::Passed, TestOutcome::Failed, TestOutcome::TimedOut],
        );

        assert_eq!(report.status, VerdictStatus::Judged);
        assert_eq!(report.submission_id, submission.id);
        assert_eq!(report.question_id, "Q1");
        assert_eq!(
            report.outcomes,
            vec![TestOutcome::Passed, TestOutcome::Failed, TestOutcome::TimedOut]
        );
        assert_eq!(report.passed(), 1);
        assert!(report.error.is_none());
    }

    #[test]
    fn test_unjudgeable_report_has_no_outcomes() {
        let submission = make_submission();
        let error = JudgeError::Compile {
            reason: "compiler exited with exit status: 1".to_string(),
        };
        let report = VerdictReport::unjudgeable(&submission, &error);

        assert_eq!(report.status, VerdictStatus::Unjudgeable);
        assert!(report.outcomes.is_empty());
        assert_eq!(report.passed(), 0);
        assert!(report.error.as_deref().unwrap().contains("compiler exited"));
    }
}
