//! Submission pipeline: decode -> bank lookup -> compile -> run -> verdict.
//!
//! This module is the glue layer - it knows nothing about:
//! - How processes execute (runner's job)
//! - How artifacts are produced (compiler's job)
//! - Where verdicts go (the worker loop publishes them)
//!
//! Failure scoping: a decode failure is the only `Err` out of `handle`,
//! because there is no submission to report against. Every later stage
//! failure is logged with the offending question id and folded into an
//! `Unjudgeable` verdict for that submission alone; the worker never dies
//! for one bad submission.

use tracing::{info, warn};

use gavel_common::error::JudgeError;
use gavel_common::types::{Submission, TestOutcome, VerdictReport};

use crate::bank::QuestionBank;
use crate::compile::Compiler;
use crate::decode;
use crate::runner::TestRunner;

pub struct Pipeline {
    bank: QuestionBank,
    compiler: Compiler,
    runner: TestRunner,
}

impl Pipeline {
    pub fn new(bank: QuestionBank, compiler: Compiler, runner: TestRunner) -> Self {
        Self {
            bank,
            compiler,
            runner,
        }
    }

    /// Entry point for one raw message body.
    pub async fn handle(&self, raw: &str) -> Result<VerdictReport, JudgeError> {
        let submission = decode::decode(raw)?;

        info!(
            submission_id = %submission.id,
            question_id = %submission.question_id,
            source_size = submission.source_bytes.len(),
            declared_size = submission.declared_size,
            "submission received"
        );

        Ok(self.judge(submission).await)
    }

    async fn judge(&self, submission: Submission) -> VerdictReport {
        match self.try_judge(&submission).await {
            Ok(outcomes) => {
                let report = VerdictReport::judged(&submission, outcomes);
                info!(
                    submission_id = %submission.id,
                    question_id = %submission.question_id,
                    passed = report.passed(),
                    total = report.outcomes.len(),
                    "submission judged"
                );
                report
            }
            Err(e) => {
                warn!(
                    submission_id = %submission.id,
                    question_id = %submission.question_id,
                    error = %e,
                    "submission could not be judged"
                );
                VerdictReport::unjudgeable(&submission, &e)
            }
        }
    }

    async fn try_judge(&self, submission: &Submission) -> Result<Vec<TestOutcome>, JudgeError> {
        let tests = self.bank.lookup(&submission.question_id)?;
        let artifact = self.compiler.compile(submission).await?;
        self.runner.run(&artifact, &tests).await
    }
}
