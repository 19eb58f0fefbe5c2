//! Restart loop around monitoring passes.

use crate::config::SupervisorConfig;
use crate::error::{Error, Result};
use crate::pipeline::PassSummary;
use crate::shutdown::ShutdownSignal;
use std::time::Duration;
use tracing::{error, info};

/// When and how often passes are restarted.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Wait after a successful pass.
    pub restart_delay: Duration,
    /// Wait after the first failure in a streak.
    pub initial_backoff: Duration,
    /// Growth factor per further consecutive failure.
    pub backoff_multiplier: f64,
    /// Upper bound on any failure wait.
    pub max_backoff: Duration,
    /// Consecutive failures tolerated before giving up.
    pub max_consecutive_failures: u32,
    /// Stop after this many passes; `None` runs until shutdown.
    pub max_passes: Option<u32>,
}

impl From<&SupervisorConfig> for RetryPolicy {
    fn from(config: &SupervisorConfig) -> Self {
        Self {
            restart_delay: Duration::from_millis(config.restart_delay_ms),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            backoff_multiplier: config.backoff_multiplier,
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            max_consecutive_failures: config.max_consecutive_failures,
            max_passes: config.max_passes,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&SupervisorConfig::default())
    }
}

impl RetryPolicy {
    /// Wait after the `failures`-th consecutive failure (1-based).
    pub fn backoff_for(&self, failures: u32) -> Duration {
        let exponent = i32::try_from(failures.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let capped = secs.min(self.max_backoff.as_secs_f64());
        if capped.is_finite() && capped >= 0.0 {
            Duration::from_secs_f64(capped)
        } else {
            self.max_backoff
        }
    }
}

/// How the supervisor loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorReport {
    /// Passes started.
    pub passes: u32,
    /// Passes that returned an error.
    pub failed_passes: u32,
    /// Whether shutdown ended the loop.
    pub interrupted: bool,
}

/// Run `pass` repeatedly under `policy`.
///
/// `pass` receives the 1-based pass number. Returns when the pass limit is
/// reached or shutdown is requested, and fails with
/// [`Error::RetriesExhausted`] once the failure streak reaches its limit.
/// If the final pass of a bounded run failed, its error is returned.
pub fn supervise<F>(
    policy: &RetryPolicy,
    shutdown: &ShutdownSignal,
    mut pass: F,
) -> Result<SupervisorReport>
where
    F: FnMut(u32) -> Result<PassSummary>,
{
    let mut report = SupervisorReport {
        passes: 0,
        failed_passes: 0,
        interrupted: false,
    };
    let mut streak = 0u32;

    loop {
        if shutdown.is_requested() {
            report.interrupted = true;
            break;
        }

        report.passes += 1;
        info!("Starting anomaly detection pass {}...", report.passes);

        let last_error = match pass(report.passes) {
            Ok(summary) => {
                streak = 0;
                info!(
                    "Pass {} complete: {} rows, {} anomalies, {} spill checks, {} spills in {:.1}s",
                    report.passes,
                    summary.rows,
                    summary.anomalies,
                    summary.spill_checks,
                    summary.spills,
                    summary.duration_secs
                );
                if summary.interrupted {
                    report.interrupted = true;
                    break;
                }
                None
            }
            Err(e) => {
                streak += 1;
                report.failed_passes += 1;
                error!(
                    "Pass {} failed ({}/{}): {}",
                    report.passes, streak, policy.max_consecutive_failures, e
                );
                if streak >= policy.max_consecutive_failures {
                    return Err(Error::RetriesExhausted {
                        attempts: streak,
                        last: e.to_string(),
                    });
                }
                Some(e)
            }
        };

        if policy.max_passes.is_some_and(|max| report.passes >= max) {
            if let Some(e) = last_error {
                return Err(e);
            }
            break;
        }

        let delay = if streak == 0 {
            policy.restart_delay
        } else {
            policy.backoff_for(streak)
        };
        info!("Restarting in {:.1}s...", delay.as_secs_f64());
        if !shutdown.sleep(delay) {
            report.interrupted = true;
            break;
        }
    }

    info!(
        "Supervisor stopped after {} passes ({} failed)",
        report.passes, report.failed_passes
    );
    Ok(report)
}
