// Worker settings, read once at boot from the environment
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_COMPILE_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_TEST_TIMEOUT_MS: u64 = 2_000;

#[derive(Debug, Clone)]
pub struct Settings {
    pub redis_url: String,
    /// Question bank document, loaded once at boot.
    pub bank_path: PathBuf,
    /// Directory for source files and compiled binaries. Artifacts are left
    /// behind after judging; retention is an external concern.
    pub work_dir: PathBuf,
    pub compiler: PathBuf,
    pub compile_timeout: Duration,
    pub test_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            bank_path: std::env::var("QUESTION_BANK_PATH")
                .unwrap_or_else(|_| "config/questions.json".to_string())
                .into(),
            work_dir: std::env::var("GAVEL_WORK_DIR")
                .unwrap_or_else(|_| "artifacts".to_string())
                .into(),
            compiler: std::env::var("GAVEL_CXX")
                .unwrap_or_else(|_| "g++".to_string())
                .into(),
            compile_timeout: millis_from_env("GAVEL_COMPILE_TIMEOUT_MS", DEFAULT_COMPILE_TIMEOUT_MS),
            test_timeout: millis_from_env("GAVEL_TEST_TIMEOUT_MS", DEFAULT_TEST_TIMEOUT_MS),
        }
    }
}

fn millis_from_env(var: &str, default_ms: u64) -> Duration {
    let ms = std::env::var(var)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default_ms);
    Duration::from_millis(ms)
}
