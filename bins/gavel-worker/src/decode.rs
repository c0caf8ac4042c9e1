// Inbound payload decoding: raw message body -> Submission.
use serde::Deserialize;
use uuid::Uuid;

use gavel_common::error::JudgeError;
use gavel_common::types::Submission;

/// Wire contract (frozen): the three submission fields sit under a `data`
/// wrapper. A flat layout is rejected, not auto-detected.
///
/// ```json
/// { "data": { "byteArray": [104, 105], "size": 2, "questionNumber": "Q1" } }
/// ```
#[derive(Debug, Deserialize)]
struct Envelope {
    data: Payload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Payload {
    /// Source text as numeric byte values; anything outside 0..=255 is a
    /// decode failure.
    byte_array: Vec<u8>,
    size: u64,
    question_number: String,
}

/// Decode one raw message body. Pure apart from minting the submission id.
pub fn decode(raw: &str) -> Result<Submission, JudgeError> {
    let envelope: Envelope =
        serde_json::from_str(raw).map_err(|e| JudgeError::decode(e.to_string()))?;

    let payload = envelope.data;

    Ok(Submission {
        id: Uuid::new_v4(),
        question_id: payload.question_number,
        source_bytes: payload.byte_array,
        declared_size: payload.size,
    })
}
