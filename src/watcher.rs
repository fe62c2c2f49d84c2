//! Submission watcher: arms on a submit click and classifies the judge result
//! from elements added to the page afterwards.

use std::{
    collections::HashSet,
    time::{Duration, Instant},
};

use crate::page::{self, PageSnapshot, text_of};

pub const RESULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Elements with this much text or more are page re-renders, not results.
pub const MAX_RESULT_TEXT: usize = 500;

pub const ACCEPTANCE_PATTERNS: [&str; 3] = ["accepted", "all test cases passed", "all tests passed"];

pub const REJECTION_PATTERNS: [&str; 5] = [
    "wrong answer",
    "time limit",
    "runtime error",
    "compile error",
    "memory limit",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected,
}

/// Classify the text of one added element. Acceptance is checked first.
pub fn classify(text: &str) -> Option<Verdict> {
    if text.chars().count() >= MAX_RESULT_TEXT {
        return None;
    }
    let lower = text.to_lowercase();
    if ACCEPTANCE_PATTERNS.iter().any(|p| lower.contains(p)) {
        Some(Verdict::Accepted)
    } else if REJECTION_PATTERNS.iter().any(|p| lower.contains(p)) {
        Some(Verdict::Rejected)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Armed { code: String, armed_at: Instant },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Carries the code captured at click time.
    Accepted { code: String },
    Rejected,
    TimedOut,
}

#[derive(Debug)]
pub struct SubmissionWatcher {
    state: WatchState,
    timeout: Duration,
}

impl Default for SubmissionWatcher {
    fn default() -> Self {
        Self::new(RESULT_TIMEOUT)
    }
}

impl SubmissionWatcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: WatchState::Idle,
            timeout,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &WatchState {
        &self.state
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, WatchState::Armed { .. })
    }

    /// Arm with the code snapshot. Returns false when a result is already
    /// pending; the earlier snapshot is kept.
    pub fn on_submit(&mut self, code: String, now: Instant) -> bool {
        if self.is_armed() {
            tracing::debug!("submit ignored, still waiting for result");
            return false;
        }
        tracing::info!("submit clicked, waiting for result");
        self.state = WatchState::Armed {
            code,
            armed_at: now,
        };
        true
    }

    /// Feed the texts of newly added elements, in DOM order.
    pub fn on_mutation<'a, I>(&mut self, added: I, now: Instant) -> Option<Outcome>
    where
        I: IntoIterator<Item = &'a str>,
    {
        if let Some(outcome) = self.on_tick(now) {
            return Some(outcome);
        }
        if !self.is_armed() {
            return None;
        }

        let verdict = added.into_iter().find_map(classify)?;
        let WatchState::Armed { code, .. } = std::mem::replace(&mut self.state, WatchState::Idle)
        else {
            return None;
        };

        match verdict {
            Verdict::Accepted => {
                tracing::info!("submission accepted");
                Some(Outcome::Accepted { code })
            }
            Verdict::Rejected => {
                tracing::info!("submission failed, not pushing");
                Some(Outcome::Rejected)
            }
        }
    }

    /// Abandon the watch once the timeout has passed.
    pub fn on_tick(&mut self, now: Instant) -> Option<Outcome> {
        match &self.state {
            WatchState::Armed { armed_at, .. }
                if now.saturating_duration_since(*armed_at) > self.timeout =>
            {
                tracing::info!("timed out waiting for result");
                self.state = WatchState::Idle;
                Some(Outcome::TimedOut)
            }
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.state = WatchState::Idle;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitButton {
    pub key: String,
    pub text: String,
    /// Green / success / primary styling seen on the button.
    pub styled: bool,
}

fn looks_styled(class: &str, style: &str) -> bool {
    let class = class.to_lowercase();
    ["green", "success", "primary"].iter().any(|c| class.contains(c))
        || style.contains("74, 222")
        || style.contains("34, 197")
}

pub fn find_submit_buttons(page: &PageSnapshot) -> Vec<SubmitButton> {
    page.select_all("button")
        .iter()
        .filter_map(|button| {
            let text = text_of(button).trim().to_lowercase();
            if !text.contains("submit") {
                return None;
            }
            let attrs = button.value();
            Some(SubmitButton {
                key: page::element_key(button),
                text,
                styled: looks_styled(
                    attrs.attr("class").unwrap_or_default(),
                    attrs.attr("style").unwrap_or_default(),
                ),
            })
        })
        .collect()
}

/// Submit buttons a click listener has been attached to.
#[derive(Debug, Default)]
pub struct ButtonRegistry {
    attached: HashSet<String>,
}

impl ButtonRegistry {
    /// Attach any submit buttons on `page` not seen before and return them.
    pub fn attach(&mut self, page: &PageSnapshot) -> Vec<SubmitButton> {
        let fresh: Vec<_> = find_submit_buttons(page)
            .into_iter()
            .filter(|b| self.attached.insert(b.key.clone()))
            .collect();
        for button in &fresh {
            tracing::debug!(
                key = %button.key,
                text = %button.text,
                styled = button.styled,
                "attached listener to submit button"
            );
        }
        fresh
    }

    pub fn is_attached(&self, key: &str) -> bool {
        self.attached.contains(key)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.attached.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }

    pub fn clear(&mut self) {
        self.attached.clear();
    }
}
