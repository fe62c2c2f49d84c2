//! Problem metadata read from the page at acceptance time.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    difficulty::{DifficultyCache, detect_from_badges},
    extractor::CodeExtractor,
    page::{self, PageSnapshot, text_of},
    problem::{Difficulty, ProblemSubmission, title_from_slug},
};

pub const DEFAULT_LANGUAGE: &str = "py";
pub const MAX_DESCRIPTION_CHARS: usize = 2000;
pub const MAX_TOPIC_CHARS: usize = 30;

/// Language names and aliases as shown by the editor, with their file extension.
pub const LANGUAGE_EXTENSIONS: [(&str, &str); 18] = [
    ("python", "py"),
    ("python3", "py"),
    ("javascript", "js"),
    ("typescript", "ts"),
    ("java", "java"),
    ("cpp", "cpp"),
    ("c++", "cpp"),
    ("c", "c"),
    ("csharp", "cs"),
    ("c#", "cs"),
    ("go", "go"),
    ("golang", "go"),
    ("rust", "rs"),
    ("ruby", "rb"),
    ("swift", "swift"),
    ("kotlin", "kt"),
    ("scala", "scala"),
    ("php", "php"),
];

const LANGUAGE_SELECTORS: [&str; 3] = [
    r#"[class*="language"]"#,
    r#"select[class*="lang"]"#,
    "[data-language]",
];

const TOPIC_SELECTOR: &str =
    r#"a[href*="/roadmap"], a[href*="/practice"], [class*="tag"], [class*="chip"]"#;

const DESCRIPTION_SELECTORS: [&str; 4] = [
    r#"[class*="description"]"#,
    r#"[class*="problem-content"]"#,
    ".prose",
    r#"[class*="markdown"]"#,
];

static DIFFICULTY_WORDS: LazyLock<[(Regex, Difficulty); 3]> = LazyLock::new(|| {
    Difficulty::ALL.map(|d| {
        let pattern = format!(r"\b{}\b", d.as_str());
        (Regex::new(&pattern).expect("valid difficulty pattern"), d)
    })
});

/// Aliases ordered longest first, so "javascript" is not read as "java".
static ALIASES_BY_LENGTH: LazyLock<Vec<(&'static str, &'static str)>> = LazyLock::new(|| {
    let mut aliases = LANGUAGE_EXTENSIONS.to_vec();
    aliases.sort_by_key(|(alias, _)| std::cmp::Reverse(alias.len()));
    aliases
});

pub fn extension_for(alias: &str) -> Option<&'static str> {
    LANGUAGE_EXTENSIONS
        .iter()
        .find(|(name, _)| *name == alias)
        .map(|(_, ext)| *ext)
}

/// Extension of the longest known alias contained in `text`.
pub fn language_from_text(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    ALIASES_BY_LENGTH
        .iter()
        .find(|(alias, _)| lower.contains(alias))
        .map(|(_, ext)| *ext)
}

pub fn detect_language(page: &PageSnapshot) -> String {
    if let Some(selector) = page.select_first(&LANGUAGE_SELECTORS) {
        let text = text_of(&selector);
        let candidate = [
            Some(text.as_str()),
            selector.value().attr("value"),
            selector.value().attr("data-language"),
        ]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty());

        if let Some(ext) = candidate.and_then(language_from_text) {
            return ext.to_string();
        }
    }

    if let Some(lang) = page.query_param("lang") {
        let lang = lang.to_lowercase();
        return extension_for(&lang)
            .map(str::to_string)
            .unwrap_or(lang);
    }

    DEFAULT_LANGUAGE.to_string()
}

/// Cached value, live badges, then a whole-word scan of the page text.
pub fn resolve_difficulty(page: &PageSnapshot, cache: &DifficultyCache) -> Option<Difficulty> {
    if let Some(cached) = cache.current() {
        tracing::debug!(%cached, "using cached difficulty");
        return Some(cached);
    }
    if let Some(live) = detect_from_badges(page) {
        return Some(live);
    }

    let body = page.body_text();
    DIFFICULTY_WORDS
        .iter()
        .find(|(pattern, _)| pattern.is_match(&body))
        .map(|(_, d)| *d)
}

pub fn detect_topic(page: &PageSnapshot) -> String {
    page.select_all(TOPIC_SELECTOR)
        .iter()
        .map(|el| text_of(el).trim().to_string())
        .find(|text| {
            !text.is_empty()
                && text.chars().count() < MAX_TOPIC_CHARS
                && !Difficulty::is_label(text)
        })
        .unwrap_or_default()
}

pub fn extract_description(page: &PageSnapshot) -> Option<String> {
    let element = page.select_first(&DESCRIPTION_SELECTORS)?;
    let text = text_of(&element);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(text.chars().take(MAX_DESCRIPTION_CHARS).collect())
}

/// Everything but the code comes from the page as it is now; callers that
/// captured code earlier overwrite `code` with their snapshot.
pub fn extract_problem_data(
    page: &PageSnapshot,
    cache: &DifficultyCache,
    extractor: &CodeExtractor,
    include_description: bool,
) -> ProblemSubmission {
    let slug = page::problem_slug(page.url()).unwrap_or_default();
    let title = title_from_slug(&slug);

    let submission = ProblemSubmission {
        title,
        difficulty: resolve_difficulty(page, cache),
        topic: detect_topic(page),
        language: detect_language(page),
        code: extractor.extract_code(page),
        description: if include_description {
            extract_description(page)
        } else {
            None
        },
        url: page::canonical_url(page.url()),
        slug,
    };

    tracing::debug!(
        slug = %submission.slug,
        difficulty = ?submission.difficulty,
        topic = %submission.topic,
        language = %submission.language,
        "extracted problem data"
    );
    submission
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn snapshot(url: &str, html: &str) -> PageSnapshot {
        PageSnapshot::new(url, html, HashMap::new())
    }

    const TWO_SUM: &str = "https://neetcode.io/problems/two-sum/submissions";

    #[test]
    fn test_language_from_selector_text() {
        let page = snapshot(TWO_SUM, r#"<button class="language-picker">C++</button>"#);
        assert_eq!(detect_language(&page), "cpp");

        let page = snapshot(TWO_SUM, r#"<div class="language-select">JavaScript</div>"#);
        assert_eq!(detect_language(&page), "js");

        let page = snapshot(TWO_SUM, r#"<div class="language-select">CSharp</div>"#);
        assert_eq!(detect_language(&page), "cs");

        let page = snapshot(TWO_SUM, r#"<div class="language-select">Golang</div>"#);
        assert_eq!(detect_language(&page), "go");
    }

    #[test]
    fn test_language_from_attributes() {
        let page = snapshot(TWO_SUM, r#"<span data-language="rust"></span>"#);
        assert_eq!(detect_language(&page), "rs");

        let page = snapshot(TWO_SUM, r#"<select class="lang" value="kotlin"></select>"#);
        assert_eq!(detect_language(&page), "kt");
    }

    #[test]
    fn test_language_from_query_param() {
        let page = snapshot("https://neetcode.io/problems/two-sum?lang=Python3", "<p></p>");
        assert_eq!(detect_language(&page), "py");

        let page = snapshot("https://neetcode.io/problems/two-sum?lang=dart", "<p></p>");
        assert_eq!(detect_language(&page), "dart");
    }

    #[test]
    fn test_language_default() {
        assert_eq!(detect_language(&snapshot(TWO_SUM, "<p></p>")), "py");
    }

    #[test]
    fn test_difficulty_prefers_cache() {
        let mut cache = DifficultyCache::default();
        cache.observe(&snapshot(TWO_SUM, r#"<b class="difficulty-btn">Hard</b>"#));

        let page = snapshot(TWO_SUM, r#"<b class="difficulty-btn">Easy</b>"#);
        assert_eq!(resolve_difficulty(&page, &cache), Some(Difficulty::Hard));
    }

    #[test]
    fn test_difficulty_body_scan_priority() {
        let cache = DifficultyCache::default();
        // Hard appears first in the text but Medium has priority over Hard.
        let page = snapshot(TWO_SUM, "<body><p>Hard mode</p><p>Medium</p></body>");
        assert_eq!(resolve_difficulty(&page, &cache), Some(Difficulty::Medium));

        // Whole words only
        let page = snapshot(TWO_SUM, "<body><p>Hardware Easygoing</p></body>");
        assert_eq!(resolve_difficulty(&page, &cache), None);
    }

    #[test]
    fn test_topic_skips_difficulty_and_long_text() {
        let page = snapshot(
            TWO_SUM,
            r#"<span class="tag">Easy</span>
               <span class="chip">This chip label is far too long to be a topic</span>
               <a href="/roadmap/arrays"> Arrays &amp; Hashing </a>"#,
        );
        assert_eq!(detect_topic(&page), "Arrays & Hashing");
        assert_eq!(detect_topic(&snapshot(TWO_SUM, "<p></p>")), "");
    }

    #[test]
    fn test_description_is_truncated() {
        let long = "word ".repeat(1000);
        let page = snapshot(TWO_SUM, &format!(r#"<div class="prose">{long}</div>"#));
        let description = extract_description(&page).unwrap();
        assert_eq!(description.chars().count(), MAX_DESCRIPTION_CHARS);
    }

    #[test]
    fn test_empty_description_is_none() {
        let empty = snapshot(TWO_SUM, r#"<div class="description"></div>"#);
        assert_eq!(extract_description(&empty), None);

        let blank = snapshot(TWO_SUM, "<div class=\"description\">\n   <span> </span></div>");
        assert_eq!(extract_description(&blank), None);

        let data = extract_problem_data(
            &empty,
            &DifficultyCache::default(),
            &CodeExtractor::default(),
            true,
        );
        assert!(data.description.is_none());
    }

    #[test]
    fn test_extract_problem_data() {
        let page = snapshot(
            TWO_SUM,
            r#"<body>
                <b class="difficulty-btn">Easy</b>
                <a href="/practice/arrays">Arrays</a>
                <div class="problem-description">Given an array of integers.</div>
                <pre><code>return []</code></pre>
            </body>"#,
        );
        let cache = DifficultyCache::default();
        let data = extract_problem_data(&page, &cache, &CodeExtractor::default(), true);

        assert_eq!(data.slug, "two-sum");
        assert_eq!(data.title, "Two Sum");
        assert_eq!(data.difficulty, Some(Difficulty::Easy));
        assert_eq!(data.topic, "Arrays");
        assert_eq!(data.language, "py");
        assert_eq!(data.code, "return []");
        assert_eq!(data.description.as_deref(), Some("Given an array of integers."));
        assert_eq!(data.url, "https://neetcode.io/problems/two-sum");

        let data = extract_problem_data(&page, &cache, &CodeExtractor::default(), false);
        assert!(data.description.is_none());
    }

    #[test]
    fn test_unparseable_slug() {
        let page = snapshot("https://neetcode.io/roadmap", "<p></p>");
        let data = extract_problem_data(
            &page,
            &DifficultyCache::default(),
            &CodeExtractor::default(),
            false,
        );
        assert_eq!(data.slug, "");
        assert_eq!(data.title, "");
    }
}
