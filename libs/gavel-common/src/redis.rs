use crate::types::VerdictReport;
use redis::{AsyncCommands, RedisResult};

/// Redis queue and verdict-key semantics - defines only semantics, not
/// runtime logic. Ensures producers and the worker never drift and keys
/// stay deterministic.

pub const QUEUE_KEY: &str = "gavel:queue:submissions";
pub const VERDICT_PREFIX: &str = "gavel:verdict";

/// Verdicts expire after 24 hours.
pub const VERDICT_TTL_SECS: u64 = 86400;

/// Generate the verdict key for a submission
pub fn verdict_key(submission_id: &uuid::Uuid) -> String {
    format!("{}:{}", VERDICT_PREFIX, submission_id)
}

/// Push a raw submission body onto the queue.
/// Uses RPUSH for FIFO semantics; the producer side of the wire contract.
pub async fn push_submission(
    conn: &mut redis::aio::ConnectionManager,
    body: &str,
) -> RedisResult<()> {
    conn.rpush(QUEUE_KEY, body).await
}

/// Pop one raw submission body from the queue.
///
/// Uses BLPOP with a timeout so the caller can interleave shutdown checks.
/// Popping removes the element: receipt is the acknowledgment, and a crash
/// later in the pipeline loses that submission's verdict (at-most-once).
/// The body is returned undecoded; interpreting it is the pipeline's job.
pub async fn pop_submission(
    conn: &mut redis::aio::ConnectionManager,
    timeout_seconds: f64,
) -> RedisResult<Option<String>> {
    let result: Option<(String, String)> = conn.blpop(QUEUE_KEY, timeout_seconds).await?;
    Ok(result.map(|(_key, body)| body))
}

/// Publish a verdict report under its submission's key with a TTL.
pub async fn store_verdict(
    conn: &mut redis::aio::ConnectionManager,
    report: &VerdictReport,
) -> RedisResult<()> {
    let key = verdict_key(&report.submission_id);
    let payload = serde_json::to_string(report).map_err(|e| {
        redis::RedisError::from((
            redis::ErrorKind::TypeError,
            "serialization error",
            e.to_string(),
        ))
    })?;

    conn.set_ex(&key, payload, VERDICT_TTL_SECS).await
}

/// Retrieve a previously published verdict report.
pub async fn get_verdict(
    conn: &mut redis::aio::ConnectionManager,
    submission_id: &uuid::Uuid,
) -> RedisResult<Option<VerdictReport>> {
    let key = verdict_key(submission_id);
    let payload: Option<String> = conn.get(&key).await?;

    match payload {
        Some(data) => {
            let report: VerdictReport = serde_json::from_str(&data).map_err(|e| {
                redis::RedisError::from((
                    redis::ErrorKind::TypeError,
                    "deserialization error",
                    e.to_string(),
                ))
            })?;
            Ok(Some(report))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TestOutcome, VerdictStatus};
    use uuid::Uuid;

    #[test]
    fn test_verdict_key_deterministic() {
        let id = Uuid::new_v4();
        let key1 = verdict_key(&id);
        let key2 = verdict_key(&id);
        assert_eq!(key1, key2);
        assert!(key1.starts_with("gavel:verdict:"));
        assert!(key1.contains(&id.to_string()));
    }

    #[test]
    fn test_queue_key_namespaced() {
        assert_eq!(QUEUE_KEY, "gavel:queue:submissions");
    }

    #[tokio::test]
    #[ignore] // Requires a running Redis instance
    async fn test_queue_and_verdict_round_trip() {
        let client =
            redis::Client::open("redis://127.0.0.1:6379").expect("failed to create Redis client");
        let mut conn = redis::aio::ConnectionManager::new(client)
            .await
            .expect("failed to connect to Redis");

        let body = r#"{ "data": { "byteArray": [104], "size": 1, "questionNumber": "Q1" } }"#;
        push_submission(&mut conn, body).await.unwrap();

        let popped = pop_submission(&mut conn, 1.0).await.unwrap();
        assert_eq!(popped.as_deref(), Some(body));

        let report = VerdictReport {
            submission_id: Uuid::new_v4(),
            question_id: "Q1".to_string(),
            status: VerdictStatus::Judged,
            outcomes: vec![TestOutcome::Passed],
            error: None,
            judged_at: chrono::Utc::now(),
        };
        store_verdict(&mut conn, &report).await.unwrap();

        let fetched = get_verdict(&mut conn, &report.submission_id)
            .await
            .unwrap()
            .expect("verdict should be stored");
        assert_eq!(fetched.submission_id, report.submission_id);
        assert_eq!(fetched.outcomes, vec![TestOutcome::Passed]);
    }
}
