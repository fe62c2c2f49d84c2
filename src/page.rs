//! Snapshot of the practice page as reported by the browser bridge.

use std::{collections::HashMap, sync::LazyLock};

use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Node, Selector};

/// Key under which the bridge reports a live CodeMirror value.
pub const CODEMIRROR: &str = "codemirror";
/// Key under which the bridge reports a live Ace editor value.
pub const ACE: &str = "ace";

static PROBLEM_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/problems/([^/?#]+)").expect("valid slug pattern"));

static URL_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(history|submissions|description|editorial).*$").expect("valid suffix pattern")
});

pub struct PageSnapshot {
    url: String,
    document: Html,
    editors: HashMap<String, String>,
}

impl PageSnapshot {
    pub fn new(url: impl Into<String>, html: &str, editors: HashMap<String, String>) -> Self {
        Self {
            url: url.into(),
            document: Html::parse_document(html),
            editors,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    /// Value of a live editor object, if the bridge could read one.
    pub fn editor_value(&self, widget: &str) -> Option<&str> {
        self.editors.get(widget).map(String::as_str)
    }

    pub fn select_all<'a>(&'a self, css: &str) -> Vec<ElementRef<'a>> {
        match parse_selector(css) {
            Some(selector) => self.document.select(&selector).collect(),
            None => Vec::new(),
        }
    }

    /// First element matching the first selector in `selectors` that matches anything.
    pub fn select_first<'a>(&'a self, selectors: &[&str]) -> Option<ElementRef<'a>> {
        selectors.iter().find_map(|css| {
            let selector = parse_selector(css)?;
            self.document.select(&selector).next()
        })
    }

    pub fn exists(&self, css: &str) -> bool {
        self.select_first(&[css]).is_some()
    }

    /// Approximation of `document.body.innerText`.
    pub fn body_text(&self) -> String {
        let Some(body) = self.select_first(&["body"]) else {
            return String::new();
        };

        let mut parts = Vec::new();
        for node in body.descendants() {
            if let Node::Text(text) = node.value() {
                let hidden = node.ancestors().any(|a| {
                    a.value()
                        .as_element()
                        .is_some_and(|e| matches!(e.name(), "script" | "style"))
                });
                if !hidden && !text.trim().is_empty() {
                    parts.push(text.trim());
                }
            }
        }
        parts.join(" ")
    }

    /// Value of a query parameter on the page URL.
    pub fn query_param(&self, name: &str) -> Option<String> {
        let url = Url::parse(&self.url).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

fn parse_selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::warn!(selector = css, error = %e, "invalid selector");
            None
        }
    }
}

/// textContent of an element.
pub fn text_of(element: &ElementRef<'_>) -> String {
    element.text().collect()
}

/// Structural key, e.g. `html[0]>body[0]>div[2]>button[0]`.
///
/// Each index counts preceding element siblings with the same tag name.
pub fn element_key(element: &ElementRef<'_>) -> String {
    let mut segments = Vec::new();
    let mut current = Some(**element);

    while let Some(node) = current {
        let Some(el) = node.value().as_element() else {
            break;
        };
        let name = el.name();
        let index = node
            .prev_siblings()
            .filter(|s| s.value().as_element().is_some_and(|e| e.name() == name))
            .count();
        segments.push(format!("{name}[{index}]"));
        current = node.parent();
    }

    segments.reverse();
    segments.join(">")
}

/// Text of the first element in an outer-HTML fragment; `None` for bare text.
pub fn fragment_text(fragment: &str) -> Option<String> {
    let parsed = Html::parse_fragment(fragment);
    let element = parsed.root_element().children().find_map(ElementRef::wrap)?;
    Some(text_of(&element))
}

/// Problem identity: the path segment following `/problems/`.
pub fn problem_slug(url: &str) -> Option<String> {
    PROBLEM_SLUG
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Problem URL without submission, history, description or editorial suffixes.
pub fn canonical_url(url: &str) -> String {
    URL_SUFFIX.replace(url, "").into_owned()
}
