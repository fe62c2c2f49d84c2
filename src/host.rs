//! Event loop driving one page session from bridge input.

use std::time::Duration;

use chrono::Utc;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    time::{self, Instant, MissedTickBehavior},
};

use crate::{
    difficulty::POLL_INTERVAL,
    error::{Result, SyncError},
    events::{self, PageEvent},
    page::PageSnapshot,
    pipeline::{CycleOutcome, SyncPipeline},
    session::PageSession,
    watcher::{Outcome, RESULT_TIMEOUT},
};

/// How often an armed watch is checked for expiry.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Default, Clone, PartialEq)]
pub struct HostSummary {
    pub events: usize,
    pub malformed: usize,
    pub rejected: usize,
    pub timed_out: usize,
    pub cycles: Vec<CycleOutcome>,
}

pub struct Host<'a> {
    session: PageSession,
    pipeline: SyncPipeline<'a>,
    summary: HostSummary,
}

impl<'a> Host<'a> {
    pub fn new(session: PageSession, pipeline: SyncPipeline<'a>) -> Self {
        Self {
            session,
            pipeline,
            summary: HostSummary::default(),
        }
    }

    #[cfg(test)]
    pub fn session(&self) -> &PageSession {
        &self.session
    }

    /// Run until the input closes. The difficulty poll restarts its period
    /// whenever the problem changes.
    pub async fn run<R>(&mut self, reader: R) -> Result<HostSummary>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut tick = time::interval(TICK_INTERVAL);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut poll = time::interval(POLL_INTERVAL);
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                line = lines.next_line() => match line? {
                    Some(line) => {
                        let slug = self.session.slug().map(str::to_string);
                        self.handle_line(&line).await;
                        if self.session.slug() != slug.as_deref() {
                            poll.reset();
                        }
                    }
                    None => break,
                },
                _ = tick.tick() => self.expire(Instant::now()),
                _ = poll.tick() => {
                    if self.session.is_polling() {
                        self.session.poll_difficulty();
                    }
                }
            }
        }

        tracing::debug!(events = self.summary.events, "input closed");
        Ok(std::mem::take(&mut self.summary))
    }

    pub async fn handle_line(&mut self, line: &str) {
        match events::parse_line(line) {
            Ok(Some(event)) => self.handle_event(event, Instant::now()).await,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed event");
                self.summary.malformed += 1;
            }
        }
    }

    pub async fn handle_event(&mut self, event: PageEvent, now: Instant) {
        self.summary.events += 1;
        match event {
            PageEvent::Snapshot { url, html, editors } => {
                self.session
                    .on_snapshot(PageSnapshot::new(url, &html, editors));
            }
            PageEvent::Navigate { url } => {
                self.session.on_navigate(&url);
            }
            PageEvent::Click { button } => {
                self.session.on_click(&button, now.into_std());
            }
            PageEvent::Mutation { added } => {
                if let Some(outcome) = self.session.on_mutation(&added, now.into_std()) {
                    self.finish(outcome).await;
                }
            }
        }
    }

    pub fn expire(&mut self, now: Instant) {
        if let Some(Outcome::TimedOut) = self.session.on_tick(now.into_std()) {
            self.record_timeout();
        }
    }

    /// Abandoned silently; the judge may just be slow.
    fn record_timeout(&mut self) {
        let error = SyncError::Timeout(RESULT_TIMEOUT.as_secs());
        tracing::debug!(%error, "result watch abandoned");
        self.summary.timed_out += 1;
    }

    async fn finish(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Accepted { code } => {
                let result = self
                    .pipeline
                    .handle_success(code, &self.session, Utc::now())
                    .await;
                tracing::info!(outcome = ?result, "sync cycle finished");
                self.summary.cycles.push(result);
            }
            Outcome::Rejected => self.summary.rejected += 1,
            Outcome::TimedOut => self.record_timeout(),
        }
    }
}
