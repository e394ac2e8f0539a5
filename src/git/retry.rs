// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Retry with exponential backoff for read-only VCS calls.
//!
//! ```text
//! attempt 0 --fail(transient)--> sleep base --> attempt 1
//!           --fail(transient)--> sleep 2*base --> attempt 2 ...
//! ```
//!
//! Only [`VcsErrorKind::is_transient`] failures are retried. Mutating calls
//! must never go through here.
//!
//! [`VcsErrorKind::is_transient`]: crate::error::VcsErrorKind::is_transient

use std::time::Duration;

use tracing::{info, warn};

use crate::config::types::RetryConfig;
use crate::error::VcsResult;

/// Run `op` up to `1 + retry.attempts` times.
///
/// # Errors
///
/// Returns the last error if every attempt fails, or the first
/// non-transient error.
pub fn retry_read_only<T>(
    retry: &RetryConfig,
    name: &str,
    op: impl FnMut() -> VcsResult<T>,
) -> VcsResult<T> {
    retry_with_sleep(retry, name, op, std::thread::sleep)
}

pub(crate) fn retry_with_sleep<T>(
    retry: &RetryConfig,
    name: &str,
    mut op: impl FnMut() -> VcsResult<T>,
    mut sleep: impl FnMut(Duration),
) -> VcsResult<T> {
    let mut attempt = 0;
    loop {
        match op() {
            Ok(value) => {
                if attempt > 0 {
                    info!(operation = name, attempt, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if e.kind.is_transient() && attempt < retry.attempts => {
                let delay = retry.delay_for(attempt);
                warn!(
                    operation = name,
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %e,
                    "transient failure, retrying"
                );
                sleep(delay);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
