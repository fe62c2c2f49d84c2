//! State scoped to one open practice page.

use std::time::Instant;

use crate::{
    difficulty::{DifficultyCache, DifficultyPoller},
    extractor::CodeExtractor,
    page::{self, PageSnapshot},
    watcher::{ButtonRegistry, Outcome, SubmissionWatcher, SubmitButton},
};

#[derive(Default)]
pub struct PageSession {
    watcher: SubmissionWatcher,
    cache: DifficultyCache,
    poller: DifficultyPoller,
    registry: ButtonRegistry,
    extractor: CodeExtractor,
    slug: Option<String>,
    page: Option<PageSnapshot>,
}

impl PageSession {
    pub fn page(&self) -> Option<&PageSnapshot> {
        self.page.as_ref()
    }

    pub fn cache(&self) -> &DifficultyCache {
        &self.cache
    }

    pub fn extractor(&self) -> &CodeExtractor {
        &self.extractor
    }

    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref()
    }

    #[cfg(test)]
    pub fn is_armed(&self) -> bool {
        self.watcher.is_armed()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_active()
    }

    #[cfg(test)]
    pub fn poll_attempts(&self) -> u32 {
        self.poller.attempts()
    }

    /// The page re-rendered. Returns the submit buttons attached by this call.
    pub fn on_snapshot(&mut self, snapshot: PageSnapshot) -> Vec<SubmitButton> {
        let url = snapshot.url().to_string();
        self.page = Some(snapshot);
        self.check_navigation(&url);
        // Re-renders only count while detection is still running
        if self.poller.is_active() {
            if let Some(page) = &self.page {
                self.cache.observe(page);
            }
        }
        self.attach_buttons()
    }

    /// Location changed without a re-render.
    pub fn on_navigate(&mut self, url: &str) -> Vec<SubmitButton> {
        if let Some(page) = &mut self.page {
            page.set_url(url);
        }
        self.check_navigation(url);
        self.attach_buttons()
    }

    /// Returns true when the click armed the watcher.
    pub fn on_click(&mut self, key: &str, now: Instant) -> bool {
        if !self.registry.is_attached(key) {
            return false;
        }
        let code = self
            .page
            .as_ref()
            .map(|p| self.extractor.extract_code(p))
            .unwrap_or_default();
        self.watcher.on_submit(code, now)
    }

    /// `added` holds the outer HTML of each element added to the page.
    pub fn on_mutation(&mut self, added: &[String], now: Instant) -> Option<Outcome> {
        let texts: Vec<String> = added.iter().filter_map(|f| page::fragment_text(f)).collect();
        self.watcher
            .on_mutation(texts.iter().map(String::as_str), now)
    }

    pub fn on_tick(&mut self, now: Instant) -> Option<Outcome> {
        self.watcher.on_tick(now)
    }

    pub fn poll_difficulty(&mut self) {
        self.poller.tick(&mut self.cache, self.page.as_ref());
    }

    fn check_navigation(&mut self, url: &str) {
        let slug = page::problem_slug(url);
        if slug == self.slug {
            return;
        }
        tracing::info!(from = ?self.slug, to = ?slug, "problem changed");
        self.slug = slug;
        self.watcher.reset();
        self.registry.clear();
        self.cache.reset();
        self.poller.start(&mut self.cache, self.page.as_ref());
    }

    fn attach_buttons(&mut self) -> Vec<SubmitButton> {
        match &self.page {
            Some(page) => self.registry.attach(page),
            None => Vec::new(),
        }
    }
}
