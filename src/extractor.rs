//! Pulls the current solution text out of whichever editor widget the page renders.

use crate::page::{self, PageSnapshot, text_of};

/// One known kind of code editor widget.
pub trait CodeSource {
    fn name(&self) -> &'static str;

    /// `None` when the widget is absent or holds no text.
    fn extract(&self, page: &PageSnapshot) -> Option<String>;
}

/// Monaco renders each visual line as a `.view-line` element.
pub struct MonacoLines;

impl CodeSource for MonacoLines {
    fn name(&self) -> &'static str {
        "monaco"
    }

    fn extract(&self, page: &PageSnapshot) -> Option<String> {
        if !page.exists(".monaco-editor") {
            return None;
        }
        let lines = page.select_all(".view-line");
        if lines.is_empty() {
            return None;
        }
        Some(lines.iter().map(text_of).collect::<Vec<_>>().join("\n"))
    }
}

pub struct CodeMirrorEditor;

impl CodeSource for CodeMirrorEditor {
    fn name(&self) -> &'static str {
        "codemirror"
    }

    fn extract(&self, page: &PageSnapshot) -> Option<String> {
        if !page.exists(".CodeMirror") {
            return None;
        }
        page.editor_value(page::CODEMIRROR).map(str::to_string)
    }
}

pub struct TextArea;

impl CodeSource for TextArea {
    fn name(&self) -> &'static str {
        "textarea"
    }

    fn extract(&self, page: &PageSnapshot) -> Option<String> {
        page.select_first(&[r#"textarea[class*="code"]"#, "textarea"])
            .map(|el| text_of(&el))
    }
}

pub struct AceEditor;

impl CodeSource for AceEditor {
    fn name(&self) -> &'static str {
        "ace"
    }

    fn extract(&self, page: &PageSnapshot) -> Option<String> {
        if !page.exists(".ace_editor") {
            return None;
        }
        page.editor_value(page::ACE).map(str::to_string)
    }
}

/// Last resort: a rendered `<pre><code>` block.
pub struct StaticBlock;

impl CodeSource for StaticBlock {
    fn name(&self) -> &'static str {
        "static"
    }

    fn extract(&self, page: &PageSnapshot) -> Option<String> {
        page.select_first(&["pre code", ".code-content"])
            .map(|el| text_of(&el))
    }
}

pub struct CodeExtractor {
    sources: Vec<Box<dyn CodeSource>>,
}

impl Default for CodeExtractor {
    fn default() -> Self {
        Self::with_sources(vec![
            Box::new(MonacoLines),
            Box::new(CodeMirrorEditor),
            Box::new(TextArea),
            Box::new(AceEditor),
            Box::new(StaticBlock),
        ])
    }
}

impl CodeExtractor {
    /// Sources are tried in the given order.
    pub fn with_sources(sources: Vec<Box<dyn CodeSource>>) -> Self {
        Self { sources }
    }

    /// Code from the first source that yields non-empty text, or `""`.
    pub fn extract_code(&self, page: &PageSnapshot) -> String {
        for source in &self.sources {
            if let Some(code) = source.extract(page).filter(|c| !c.is_empty()) {
                tracing::debug!(source = source.name(), bytes = code.len(), "extracted code");
                return code;
            }
        }
        tracing::debug!("no editor widget found");
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn page(html: &str) -> PageSnapshot {
        PageSnapshot::new("https://neetcode.io/problems/two-sum", html, HashMap::new())
    }

    fn page_with_editor(html: &str, widget: &str, value: &str) -> PageSnapshot {
        let mut editors = HashMap::new();
        editors.insert(widget.to_string(), value.to_string());
        PageSnapshot::new("https://neetcode.io/problems/two-sum", html, editors)
    }

    #[test]
    fn test_monaco_lines_joined_in_dom_order() {
        let page = page(
            r#"<div class="monaco-editor"><div class="view-lines">
                <div class="view-line"><span>class Solution:</span></div>
                <div class="view-line"><span>    def twoSum(self):</span></div>
                <div class="view-line"><span>        pass</span></div>
            </div></div>"#,
        );
        assert_eq!(
            CodeExtractor::default().extract_code(&page),
            "class Solution:\n    def twoSum(self):\n        pass"
        );
    }

    #[test]
    fn test_view_lines_without_monaco_are_ignored() {
        let page = page(r#"<div class="view-line">stray</div><pre><code>fallback</code></pre>"#);
        assert_eq!(CodeExtractor::default().extract_code(&page), "fallback");
    }

    #[test]
    fn test_codemirror_needs_live_value() {
        let html = r#"<div class="CodeMirror"></div><pre><code>static</code></pre>"#;
        assert_eq!(CodeExtractor::default().extract_code(&page(html)), "static");

        let live = page_with_editor(html, page::CODEMIRROR, "fn main() {}");
        assert_eq!(CodeExtractor::default().extract_code(&live), "fn main() {}");
    }

    #[test]
    fn test_code_textarea_preferred_over_plain() {
        let page = page(
            r#"<textarea>notes</textarea><textarea class="code-input">print(1)</textarea>"#,
        );
        assert_eq!(CodeExtractor::default().extract_code(&page), "print(1)");
    }

    #[test]
    fn test_textarea_beats_ace() {
        let page = page_with_editor(
            r#"<div class="ace_editor"></div><textarea>from textarea</textarea>"#,
            page::ACE,
            "from ace",
        );
        assert_eq!(CodeExtractor::default().extract_code(&page), "from textarea");
    }

    #[test]
    fn test_ace_editor() {
        let page = page_with_editor(r#"<div class="ace_editor"></div>"#, page::ACE, "x = 1");
        assert_eq!(CodeExtractor::default().extract_code(&page), "x = 1");
    }

    #[test]
    fn test_empty_widget_falls_through() {
        let page = page(r#"<textarea class="code"></textarea><div class="code-content">kept</div>"#);
        assert_eq!(CodeExtractor::default().extract_code(&page), "kept");
    }

    #[test]
    fn test_nothing_found() {
        assert_eq!(CodeExtractor::default().extract_code(&page("<p>hi</p>")), "");
    }

    #[test]
    fn test_custom_source_runs_last() {
        struct Fixed;
        impl CodeSource for Fixed {
            fn name(&self) -> &'static str {
                "fixed"
            }
            fn extract(&self, _page: &PageSnapshot) -> Option<String> {
                Some("custom".to_string())
            }
        }

        let extractor = CodeExtractor::with_sources(vec![
            Box::new(StaticBlock),
            Box::new(Fixed),
        ]);
        assert_eq!(extractor.extract_code(&page("<p>hi</p>")), "custom");
        assert_eq!(
            extractor.extract_code(&page("<pre><code>builtin</code></pre>")),
            "builtin"
        );
    }
}
