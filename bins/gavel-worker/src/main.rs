mod bank;
mod compile;
mod config;
mod decode;
mod pipeline;
mod runner;

use std::time::{Duration, Instant};

use gavel_common::redis as queue;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::bank::QuestionBank;
use crate::compile::Compiler;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use crate::runner::TestRunner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .init();

    info!("Gavel worker booting...");

    let settings = Settings::from_env();

    let bank = QuestionBank::load(&settings.bank_path).map_err(|e| {
        error!("Failed to load question bank: {}", e);
        error!("Make sure {} exists", settings.bank_path.display());
        e
    })?;

    info!(
        questions = bank.len(),
        bank = %settings.bank_path.display(),
        "Question bank loaded"
    );

    let client = redis::Client::open(settings.redis_url.as_str())?;
    let conn = redis::aio::ConnectionManager::new(client).await?;

    info!("Connected to Redis: {}", settings.redis_url);
    info!(
        work_dir = %settings.work_dir.display(),
        compiler = %settings.compiler.display(),
        compile_timeout_ms = settings.compile_timeout.as_millis() as u64,
        test_timeout_ms = settings.test_timeout.as_millis() as u64,
        "Worker configured"
    );

    let pipeline = Pipeline::new(
        bank,
        Compiler::new(
            settings.work_dir.clone(),
            settings.compiler.clone(),
            settings.compile_timeout,
        ),
        TestRunner::new(settings.test_timeout),
    );

    // Handoff channel between the broker listener and the judge task, so
    // message receipt is never blocked on compile-and-test latency.
    let (tx, rx) = mpsc::unbounded_channel::<String>();

    // Setup graceful shutdown
    let shutdown = async {
        signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C signal handler");
        warn!("Received shutdown signal, stopping...");
    };

    tokio::select! {
        _ = listen_loop(conn.clone(), tx) => {},
        _ = judge_loop(conn, pipeline, rx) => {},
        _ = shutdown => {},
    }

    info!("Worker shutdown complete");
    Ok(())
}

/// Pull raw message bodies from the broker and hand them off.
///
/// BLPOP removes the element at receipt, so delivery is at-most-once: a
/// crash mid-pipeline loses that submission's verdict, never wedges the
/// queue.
async fn listen_loop(mut conn: redis::aio::ConnectionManager, tx: mpsc::UnboundedSender<String>) {
    loop {
        // BLPOP with 5 second timeout for graceful shutdown
        match queue::pop_submission(&mut conn, 5.0).await {
            Ok(Some(body)) => {
                debug!(bytes = body.len(), "message received");
                if tx.send(body).is_err() {
                    // Judge task is gone; nothing left to feed.
                    return;
                }
            }
            Ok(None) => continue,
            Err(e) => {
                error!(error = %e, "Redis error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}

/// Judge submissions one at a time, end-to-end, and publish each verdict.
async fn judge_loop(
    mut conn: redis::aio::ConnectionManager,
    pipeline: Pipeline,
    mut rx: mpsc::UnboundedReceiver<String>,
) {
    while let Some(body) = rx.recv().await {
        let started = Instant::now();

        match pipeline.handle(&body).await {
            Ok(report) => {
                info!(
                    submission_id = %report.submission_id,
                    question_id = %report.question_id,
                    status = ?report.status,
                    passed = report.passed(),
                    total = report.outcomes.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "verdict ready"
                );

                match queue::store_verdict(&mut conn, &report).await {
                    Ok(()) => {
                        debug!(submission_id = %report.submission_id, "verdict published");
                    }
                    Err(e) => {
                        // Non-fatal - worker continues
                        error!(
                            submission_id = %report.submission_id,
                            error = %e,
                            "failed to publish verdict"
                        );
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "discarding undecodable message");
            }
        }
    }
}
