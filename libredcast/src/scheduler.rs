//! Daily scheduler
//!
//! One recurring job per configured `HH:MM` slot. Each job is armed for its
//! next occurrence; [`Scheduler::run_pending`] fires every job whose time has
//! arrived, in registration order, and re-arms it for the following day.
//! Job failures are logged and never unregister a job or stop the loop.

use chrono::{Duration as ChronoDuration, Local, NaiveDateTime, NaiveTime};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::{Config, POST_TIME_FORMAT};
use crate::error::{RedcastError, Result};
use crate::generator::ContentGenerator;
use crate::publisher::Publisher;
use crate::types::PublishResult;

/// Default polling resolution of [`Scheduler::run`]
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Parse a poll interval such as `"60s"`, `"5m"` or `"1h 30m"`
///
/// # Errors
///
/// Returns `InvalidInput` for unparseable or zero durations.
pub fn parse_poll_interval(input: &str) -> Result<Duration> {
    let interval = humantime::parse_duration(input.trim()).map_err(|e| {
        RedcastError::InvalidInput(format!("Could not parse poll interval '{}': {}", input, e))
    })?;
    if interval.as_secs() == 0 {
        return Err(RedcastError::InvalidInput(
            "Poll interval must be at least one second".to_string(),
        ));
    }
    Ok(interval)
}

/// Source of local wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Manually driven clock for tests; clones share the same time
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<NaiveDateTime>>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, at: NaiveDateTime) {
        *self.now.lock().unwrap() = at;
    }

    pub fn advance(&self, by: ChronoDuration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap()
    }
}

/// A daily job fixed to one time of day
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub at: NaiveTime,
    pub next_run: NaiveDateTime,
    pub last_run: Option<NaiveDateTime>,
}

impl Job {
    pub fn new(at: NaiveTime, now: NaiveDateTime) -> Self {
        Self {
            at,
            next_run: next_occurrence(at, now),
            last_run: None,
        }
    }

    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        now >= self.next_run
    }

    fn mark_run(&mut self, now: NaiveDateTime) {
        self.last_run = Some(now);
        self.next_run = next_occurrence(self.at, now);
    }
}

/// Today at `at` if that is still ahead of `now`, else tomorrow at `at`
pub fn next_occurrence(at: NaiveTime, now: NaiveDateTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + ChronoDuration::days(1)
    }
}

/// What one run of the job did
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// Generation failed; nothing was saved
    Skipped,
    /// Saved for manual review (auto-publish off)
    Saved { path: PathBuf },
    /// Saved and handed to the publisher
    Published { path: PathBuf, result: PublishResult },
}

pub struct Scheduler {
    generator: ContentGenerator,
    publisher: Publisher,
    post_times: Vec<NaiveTime>,
    auto_publish: bool,
    jobs: Vec<Job>,
    clock: Box<dyn Clock>,
}

impl Scheduler {
    pub fn new(config: &Config, generator: ContentGenerator, publisher: Publisher) -> Result<Self> {
        Ok(Self {
            generator,
            publisher,
            post_times: config.post_times()?,
            auto_publish: config.publish.auto_publish,
            jobs: Vec::new(),
            clock: Box::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Register one daily job per configured time
    ///
    /// Duplicate times register duplicate jobs. Returns the job count.
    pub fn setup_schedule(&mut self) -> usize {
        let now = self.clock.now();
        self.jobs = self.post_times.iter().map(|at| Job::new(*at, now)).collect();

        let times = self
            .post_times
            .iter()
            .map(|t| t.format(POST_TIME_FORMAT).to_string())
            .collect::<Vec<_>>()
            .join(", ");
        info!(
            jobs = self.jobs.len(),
            auto_publish = self.auto_publish,
            "Scheduled daily posts at {}",
            times
        );
        if let Some(next) = self.next_run() {
            info!("Next run at {}", next.format("%Y-%m-%d %H:%M"));
        }

        self.jobs.len()
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn next_run(&self) -> Option<NaiveDateTime> {
        self.jobs.iter().map(|job| job.next_run).min()
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    /// Fire every due job in registration order, returning how many ran
    pub async fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        for idx in 0..self.jobs.len() {
            let now = self.clock.now();
            if !self.jobs[idx].is_due(now) {
                continue;
            }

            info!("Running job scheduled for {}", self.jobs[idx].at.format(POST_TIME_FORMAT));
            if let Err(e) = self.job_generate_and_publish().await {
                error!("Scheduled job failed: {}", e);
            }
            self.jobs[idx].mark_run(now);
            ran += 1;
        }

        if ran > 0 {
            if let Some(next) = self.next_run() {
                info!("Next run at {}", next.format("%Y-%m-%d %H:%M"));
            }
        }
        ran
    }

    /// Generate one note, save it, then publish it if auto-publish is on
    ///
    /// A generation failure is a no-op tick and yields [`JobOutcome::Skipped`].
    pub async fn job_generate_and_publish(&mut self) -> Result<JobOutcome> {
        let content = match self.generator.generate_content(false).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Generation failed, skipping this run: {}", e);
                return Ok(JobOutcome::Skipped);
            }
        };

        let path = self.generator.save_content(&content, None)?;

        if !self.auto_publish {
            info!(path = %path.display(), "Auto-publish is off; saved for manual review");
            return Ok(JobOutcome::Saved { path });
        }

        let result = self.publisher.publish_content(&content).await;
        info!(status = %result.status, "Publish finished: {}", result.message);
        Ok(JobOutcome::Published { path, result })
    }

    /// Poll for due jobs until `shutdown` is raised
    pub async fn run(&mut self, shutdown: Arc<AtomicBool>, poll_interval: Duration) {
        if self.jobs.is_empty() {
            self.setup_schedule();
        }
        info!("Scheduler running; polling every {}s", poll_interval.as_secs());

        loop {
            if shutdown.load(Ordering::Relaxed) {
                info!("Shutdown requested, stopping scheduler");
                break;
            }

            self.run_pending().await;

            // Sleep until next poll (check shutdown every second)
            for _ in 0..poll_interval.as_secs().max(1) {
                if shutdown.load(Ordering::Relaxed) {
                    break;
                }
                sleep(Duration::from_secs(1)).await;
            }
        }
    }
}
