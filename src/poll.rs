//! Bounded polling of asynchronous remote tasks.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tokio::time::{sleep, timeout_at, Instant};
use tracing::debug;

use crate::error::{QuarkError, Result, Stage};
use crate::models::TaskData;

/// Backoff and limits applied while waiting for a remote task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
    pub deadline: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            max_attempts: 30,
            deadline: Duration::from_secs(120),
        }
    }
}

/// Poll settings as written in the config file, all optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PollSettings {
    pub initial_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
    pub max_attempts: Option<u32>,
    pub deadline_secs: Option<u64>,
}

impl From<&PollSettings> for PollPolicy {
    fn from(settings: &PollSettings) -> Self {
        let defaults = PollPolicy::default();
        Self {
            initial_delay: settings
                .initial_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.initial_delay),
            max_delay: settings
                .max_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.max_delay),
            max_attempts: settings.max_attempts.unwrap_or(defaults.max_attempts).max(1),
            deadline: settings
                .deadline_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.deadline),
        }
    }
}

impl PollPolicy {
    /// Delay before the poll following one that waited `current`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        (current * 2).min(self.max_delay)
    }

    /// Call `check` until the task reports done, doubling the delay between
    /// polls. Gives up with [`QuarkError::TaskTimeout`] once the attempt cap or
    /// the deadline is reached. A poll still in flight at the deadline is
    /// cancelled.
    pub async fn run<F, Fut>(&self, stage: Stage, task_id: &str, mut check: F) -> Result<TaskData>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<TaskData>>,
    {
        let started = Instant::now();
        let deadline_at = started + self.deadline;
        let mut delay = self.initial_delay;
        let mut attempts = 0;

        loop {
            let polled = timeout_at(deadline_at, check(attempts)).await;
            attempts += 1;
            let task = match polled {
                Ok(task) => task?,
                Err(_) => {
                    return Err(QuarkError::TaskTimeout {
                        stage,
                        task_id: task_id.to_string(),
                        attempts,
                        elapsed: started.elapsed(),
                    });
                }
            };
            debug!(%stage, task_id, attempts, status = task.status, "polled task");
            if task.is_done() {
                return Ok(task);
            }

            let elapsed = started.elapsed();
            if attempts >= self.max_attempts || elapsed + delay > self.deadline {
                return Err(QuarkError::TaskTimeout {
                    stage,
                    task_id: task_id.to_string(),
                    attempts,
                    elapsed,
                });
            }

            sleep(delay).await;
            delay = self.next_delay(delay);
        }
    }
}
