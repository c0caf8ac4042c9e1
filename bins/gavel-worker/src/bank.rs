// Question bank: read-only mapping from question id to its test cases,
// built once at boot and never reloaded.
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

use gavel_common::error::JudgeError;
use gavel_common::types::TestCase;

/// The bank retains the parsed document and resolves each question's
/// examples at lookup time, so one question's malformed example list only
/// fails lookups for that question.
///
/// Document shape: `{ "<question id>": { "examples": [ {id, input, output} ] } }`
pub struct QuestionBank {
    doc: serde_json::Value,
}

impl QuestionBank {
    /// Load the bank document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("question bank not found: {}", path.display());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        Self::from_document(&content)
    }

    /// Build the bank from an already-read document string.
    pub fn from_document(content: &str) -> Result<Self> {
        let doc: serde_json::Value =
            serde_json::from_str(content).context("question bank is not valid JSON")?;

        if !doc.is_object() {
            bail!("question bank root must be an object keyed by question id");
        }

        Ok(Self { doc })
    }

    /// Resolve a question's test cases, in document order.
    pub fn lookup(&self, question_id: &str) -> Result<Vec<TestCase>, JudgeError> {
        let question = self
            .doc
            .get(question_id)
            .ok_or_else(|| JudgeError::lookup(question_id, "not present in bank"))?;

        let examples = question
            .get("examples")
            .ok_or_else(|| JudgeError::lookup(question_id, "entry has no examples list"))?;

        serde_json::from_value(examples.clone())
            .map_err(|e| JudgeError::lookup(question_id, format!("examples do not parse: {}", e)))
    }

    /// Number of questions in the bank.
    pub fn len(&self) -> usize {
        self.doc.as_object().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DOC: &str = r#"{
        "sum-two": {
            "examples": [
                { "id": 1, "input": "2 3\n", "output": "5\n" },
                { "id": 2, "input": "10 -4\n", "output": "6\n" }
            ]
        },
        "echo": {
            "examples": [
                { "id": 1, "input": "3\n", "output": "3\n" }
            ]
        },
        "no-examples": {},
        "bad-examples": { "examples": [ { "id": "not-a-number" } ] }
    }"#;

    fn bank() -> QuestionBank {
        QuestionBank::from_document(DOC).unwrap()
    }

    #[test]
    fn test_lookup_returns_examples_in_document_order() {
        let cases = bank().lookup("sum-two").unwrap();

        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].id, 1);
        assert_eq!(cases[0].input, "2 3\n");
        assert_eq!(cases[0].output, "5\n");
        assert_eq!(cases[1].id, 2);
        assert_eq!(cases[1].output, "6\n");
    }

    #[test]
    fn test_lookup_unknown_question_fails() {
        let err = bank().lookup("does-not-exist").unwrap_err();
        assert!(matches!(err, JudgeError::Lookup { ref question_id, .. } if question_id == "does-not-exist"));
    }

    #[test]
    fn test_lookup_entry_without_examples_fails() {
        let err = bank().lookup("no-examples").unwrap_err();
        assert!(matches!(err, JudgeError::Lookup { .. }));
    }

    #[test]
    fn test_lookup_malformed_examples_fails_without_poisoning_others() {
        let bank = bank();
        assert!(bank.lookup("bad-examples").is_err());
        // The rest of the bank is still usable.
        assert_eq!(bank.lookup("echo").unwrap().len(), 1);
    }

    #[test]
    fn test_from_document_rejects_invalid_json() {
        assert!(QuestionBank::from_document("{ not json").is_err());
        assert!(QuestionBank::from_document("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DOC.as_bytes()).unwrap();

        let bank = QuestionBank::load(file.path()).unwrap();
        assert_eq!(bank.len(), 4);
        assert!(!bank.is_empty());
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(QuestionBank::load(Path::new("/no/such/questions.json")).is_err());
    }
}
