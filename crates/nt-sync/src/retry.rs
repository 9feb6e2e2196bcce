//! Exponential-backoff retry for remote transport calls (§7: "Retry the
//! affected object a bounded number of times (3) with exponential
//! backoff").

use crate::error::SyncError;
use std::future::Future;
use std::time::Duration;

const MAX_RETRIES: u32 = 3;
const INITIAL_DELAY_MS: u64 = 100;
const MAX_DELAY_MS: u64 = 10_000;

/// Run `operation`, retrying up to [`MAX_RETRIES`] times with the delay
/// doubling (capped at [`MAX_DELAY_MS`]) between attempts. The final
/// failure is returned as-is; objects already uploaded before it remain on
/// the remote as garbage for a later `gc` (§7 recovery policy).
pub async fn with_retry<F, Fut, T>(operation_name: &str, mut operation: F) -> Result<T, SyncError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SyncError>>,
{
    let mut attempt = 0;
    let mut delay_ms = INITIAL_DELAY_MS;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt >= MAX_RETRIES {
                    return Err(err);
                }
                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    max_retries = MAX_RETRIES,
                    delay_ms,
                    error = %err,
                    "remote operation failed, retrying"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                delay_ms = (delay_ms * 2).min(MAX_DELAY_MS);
            }
        }
    }
}
