//! Repository path and file body for a published solution.
//!
//! [`build_file_content`] and [`strip_header`] are a matched pair: the dedup
//! check strips exactly the header this module writes.

use chrono::NaiveDate;
use handlebars::Handlebars;
use serde::Serialize;

use crate::{
    error::Result,
    problem::{Layout, ProblemSubmission},
};

pub const MAX_FILE_NAME_CHARS: usize = 100;
pub const WRAP_WIDTH: usize = 70;

pub const DEFAULT_COMMIT_TEMPLATE: &str = "Add: {{title}}{{#if difficulty}} ({{difficulty}}){{/if}}";
pub const DEFAULT_UPDATE_TEMPLATE: &str = "Update: {{title}}";

const BLOCK_COMMENT_LANGUAGES: [&str; 12] = [
    "java", "cpp", "c", "cs", "js", "ts", "go", "rs", "swift", "kt", "scala", "php",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentStyle {
    pub start: &'static str,
    pub line: &'static str,
    pub end: &'static str,
}

impl CommentStyle {
    pub const BLOCK: CommentStyle = CommentStyle {
        start: "/*",
        line: " *",
        end: " */",
    };
    pub const HASH: CommentStyle = CommentStyle {
        start: "#",
        line: "#",
        end: "#",
    };

    pub fn for_language(language: &str) -> Self {
        if BLOCK_COMMENT_LANGUAGES.contains(&language) {
            Self::BLOCK
        } else {
            Self::HASH
        }
    }

    fn is_block(&self) -> bool {
        *self == Self::BLOCK
    }

    /// `text` made safe to write inside this style's header.
    fn escape(&self, text: &str) -> String {
        if self.is_block() {
            text.replace("*/", "* /")
        } else {
            text.to_string()
        }
    }
}

/// Lowercase, collapse non-alphanumeric runs to `-`, trim dashes, cap length.
///
/// Empty input gives `untitled`; input with nothing usable left gives an
/// empty string so callers can pick their own fallback.
pub fn sanitize_file_name(name: &str) -> String {
    if name.is_empty() {
        return "untitled".to_string();
    }

    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }

    let mut sanitized: String = out.chars().take(MAX_FILE_NAME_CHARS).collect();
    while sanitized.ends_with('-') {
        sanitized.pop();
    }
    sanitized
}

pub fn file_name(submission: &ProblemSubmission) -> String {
    let stem = if submission.slug.is_empty() {
        Some(sanitize_file_name(&submission.title))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "untitled".to_string())
    } else {
        submission.slug.clone()
    };
    let extension = if submission.language.is_empty() {
        "py"
    } else {
        submission.language.as_str()
    };
    format!("{stem}.{extension}")
}

pub fn build_file_path(submission: &ProblemSubmission, layout: Layout) -> String {
    let name = file_name(submission);
    match layout {
        Layout::Flat => name,
        Layout::ByDifficulty => {
            let folder = submission.difficulty.map_or("Unknown", |d| d.as_str());
            format!("{folder}/{name}")
        }
        Layout::ByTopic => {
            let folder = Some(submission.topic.as_str())
                .filter(|t| !t.is_empty())
                .map(sanitize_file_name)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "Uncategorized".to_string());
            format!("{folder}/{name}")
        }
    }
}

/// Greedy word wrap; a word longer than `width` gets a line of its own.
pub fn word_wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let current_len = current.chars().count();
        if current.is_empty() {
            current.push_str(word);
        } else if current_len + word.chars().count() + 1 <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

pub fn build_file_content(
    submission: &ProblemSubmission,
    include_description: bool,
    date: NaiveDate,
) -> String {
    let style = CommentStyle::for_language(&submission.language);
    let line = style.line;
    let mut content = String::new();

    content.push_str(&format!("{}\n", style.start));
    content.push_str(&format!("{line} Problem: {}\n", style.escape(&submission.title)));
    if let Some(difficulty) = submission.difficulty {
        content.push_str(&format!("{line} Difficulty: {difficulty}\n"));
    }
    content.push_str(&format!("{line} URL: {}\n", style.escape(&submission.url)));
    content.push_str(&format!("{line} Date: {}\n", date.format("%Y-%m-%d")));

    let description = submission
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| include_description && !d.is_empty());
    if let Some(description) = description {
        let description = style.escape(description);
        content.push_str(&format!("{line}\n"));
        content.push_str(&format!("{line} Description:\n"));
        for wrapped in word_wrap(&description, WRAP_WIDTH) {
            content.push_str(&format!("{line} {wrapped}\n"));
        }
    }

    content.push_str(&format!("{}\n\n", style.end));
    content.push_str(&submission.code);

    if !content.ends_with('\n') {
        content.push('\n');
    }
    content
}

fn is_line_comment(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("//")
}

/// Code part of a published file: leading blank lines and the first comment
/// header (a `/* ... */` block or a run of `#` / `//` rows) are removed and the
/// rest is trimmed.
pub fn strip_header(content: &str) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut i = 0;

    while i < lines.len() && lines[i].trim().is_empty() {
        i += 1;
    }

    if i < lines.len() && lines[i].trim().starts_with("/*") {
        let opening = lines[i].trim();
        let closed_on_first_line = opening[2..].contains("*/");
        i += 1;
        if !closed_on_first_line {
            while i < lines.len() {
                let closes = lines[i].contains("*/");
                i += 1;
                if closes {
                    break;
                }
            }
        }
    } else {
        while i < lines.len() && is_line_comment(lines[i].trim()) {
            i += 1;
        }
    }

    lines[i.min(lines.len())..].join("\n").trim().to_string()
}

#[derive(Serialize)]
struct CommitContext<'a> {
    title: &'a str,
    slug: &'a str,
    difficulty: Option<&'a str>,
    topic: &'a str,
    language: &'a str,
}

/// Render the create or update commit message for `submission`.
pub fn render_commit_message(
    template: &str,
    submission: &ProblemSubmission,
) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);

    let context = CommitContext {
        title: &submission.title,
        slug: &submission.slug,
        difficulty: submission.difficulty.map(|d| d.as_str()),
        topic: &submission.topic,
        language: &submission.language,
    };
    Ok(handlebars.render_template(template, &context)?)
}
