//! Transient status feedback. Nothing reads these back.

use std::{cell::RefCell, time::Duration};

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

impl NoticeKind {
    pub fn icon(&self) -> &'static str {
        match self {
            NoticeKind::Info => "⏳",
            NoticeKind::Success => "✅",
            NoticeKind::Error => "❌",
        }
    }
}

pub trait Notifier {
    /// Show `message`, replacing whatever notice is currently visible.
    fn notify(&self, kind: NoticeKind, message: &str);

    fn info(&self, message: &str) {
        self.notify(NoticeKind::Info, message);
    }

    fn success(&self, message: &str) {
        self.notify(NoticeKind::Success, message);
    }

    fn error(&self, message: &str) {
        self.notify(NoticeKind::Error, message);
    }
}

/// Spinner on stderr for in-progress notices, coloured line once settled.
pub struct ConsoleNotifier {
    interactive: bool,
    spinner: RefCell<Option<ProgressBar>>,
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new(console::Term::stderr().is_term())
    }
}

impl ConsoleNotifier {
    pub fn new(interactive: bool) -> Self {
        Self {
            interactive,
            spinner: RefCell::new(None),
        }
    }

    /// Banner shown while the host is attached to a page.
    pub fn banner(&self) {
        eprintln!("{}", "🔗 GitHub Sync Active".cyan().bold());
    }

    fn clear(&self) {
        if let Some(spinner) = self.spinner.borrow_mut().take() {
            spinner.finish_and_clear();
        }
    }

    fn line(kind: NoticeKind, message: &str) -> String {
        let text = format!("{} {}", kind.icon(), message);
        match kind {
            NoticeKind::Info => text.cyan().to_string(),
            NoticeKind::Success => text.green().to_string(),
            NoticeKind::Error => text.red().to_string(),
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        self.clear();

        if kind == NoticeKind::Info && self.interactive {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template("{spinner:.cyan} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.set_message(message.to_string());
            spinner.enable_steady_tick(Duration::from_millis(100));
            *self.spinner.borrow_mut() = Some(spinner);
            return;
        }

        eprintln!("{}", Self::line(kind, message));
    }
}

impl Drop for ConsoleNotifier {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Keeps every notice.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: RefCell<Vec<(NoticeKind, String)>>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub fn notices(&self) -> Vec<(NoticeKind, String)> {
        self.notices.borrow().clone()
    }

    pub fn last(&self) -> Option<(NoticeKind, String)> {
        self.notices.borrow().last().cloned()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notices.borrow().iter().map(|(_, m)| m.clone()).collect()
    }
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        self.notices.borrow_mut().push((kind, message.to_string()));
    }
}
