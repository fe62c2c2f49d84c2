use std::time::Duration;

use crate::{
    page::{PageSnapshot, text_of},
    problem::Difficulty,
};

pub const POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const MAX_POLL_ATTEMPTS: u32 = 15;

pub(crate) const BADGE_SELECTOR: &str = r#".difficulty-btn, [class*="difficulty-btn"]"#;

/// Colour-coded badge classes and the word each must contain.
pub(crate) const COLOR_BADGES: [(&str, Difficulty); 3] = [
    (".is-success", Difficulty::Easy),
    (".is-warning", Difficulty::Medium),
    (".is-danger", Difficulty::Hard),
];

/// Difficulty from the badge button, then from the colour-coded badges.
pub fn detect_from_badges(page: &PageSnapshot) -> Option<Difficulty> {
    if let Some(found) = page
        .select_first(&[BADGE_SELECTOR])
        .and_then(|badge| Difficulty::from_text(&text_of(&badge)))
    {
        return Some(found);
    }

    COLOR_BADGES.iter().find_map(|(css, difficulty)| {
        let badge = page.select_first(&[*css])?;
        let word = difficulty.as_str().to_lowercase();
        text_of(&badge)
            .to_lowercase()
            .contains(&word)
            .then_some(*difficulty)
    })
}

/// Difficulty for the current problem. The badge is only rendered on the
/// question tab, so the value is kept while the user moves between tabs.
#[derive(Debug, Default)]
pub struct DifficultyCache {
    cached: Option<Difficulty>,
}

impl DifficultyCache {
    pub fn current(&self) -> Option<Difficulty> {
        self.cached
    }

    pub fn reset(&mut self) {
        self.cached = None;
    }

    /// Try to fill the cache from `page`. Returns true once a value is cached.
    pub fn observe(&mut self, page: &PageSnapshot) -> bool {
        if self.cached.is_some() {
            return true;
        }
        self.cached = detect_from_badges(page);
        if let Some(difficulty) = self.cached {
            tracing::info!(%difficulty, "cached difficulty");
        }
        self.cached.is_some()
    }
}

/// Bounded retry counter for difficulty detection.
#[derive(Debug)]
pub struct DifficultyPoller {
    attempts: u32,
    max_attempts: u32,
    done: bool,
}

impl Default for DifficultyPoller {
    fn default() -> Self {
        Self::new(MAX_POLL_ATTEMPTS)
    }
}

impl DifficultyPoller {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempts: 0,
            max_attempts,
            done: false,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.done
    }

    #[cfg(test)]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn restart(&mut self) {
        self.attempts = 0;
        self.done = false;
    }

    /// Immediate attempt made when detection starts; not counted.
    pub fn start(&mut self, cache: &mut DifficultyCache, page: Option<&PageSnapshot>) {
        self.restart();
        if let Some(page) = page {
            if cache.observe(page) {
                self.done = true;
            }
        }
    }

    /// One interval tick.
    pub fn tick(&mut self, cache: &mut DifficultyCache, page: Option<&PageSnapshot>) {
        if self.done {
            return;
        }
        self.attempts += 1;
        let found = page.is_some_and(|p| cache.observe(p));
        if found || self.attempts >= self.max_attempts {
            tracing::debug!(attempts = self.attempts, found, "difficulty polling stopped");
            self.done = true;
        }
    }
}
