//! Line protocol spoken by the browser bridge.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum PageEvent {
    /// Full page state after a DOM change.
    Snapshot {
        url: String,
        html: String,
        #[serde(default)]
        editors: HashMap<String, String>,
    },
    /// Outer HTML of each element added to the page.
    Mutation {
        #[serde(default)]
        added: Vec<String>,
    },
    /// `button` is the structural key of the clicked element.
    Click { button: String },
    Navigate { url: String },
}

/// Parse one line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<PageEvent>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(line)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snapshot() {
        let event = parse_line(
            r#"{"event":"snapshot","url":"https://neetcode.io/problems/two-sum","html":"<body></body>","editors":{"ace":"x = 1"}}"#,
        )
        .unwrap()
        .unwrap();

        let PageEvent::Snapshot { url, editors, .. } = event else {
            panic!("expected snapshot");
        };
        assert_eq!(url, "https://neetcode.io/problems/two-sum");
        assert_eq!(editors.get("ace").map(String::as_str), Some("x = 1"));
    }

    #[test]
    fn test_parse_other_events() {
        assert_eq!(
            parse_line(r#"{"event":"click","button":"html[0]>body[0]>button[0]"}"#).unwrap(),
            Some(PageEvent::Click {
                button: "html[0]>body[0]>button[0]".to_string()
            })
        );
        assert_eq!(
            parse_line(r#"{"event":"mutation"}"#).unwrap(),
            Some(PageEvent::Mutation { added: vec![] })
        );
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[test]
    fn test_unknown_event_is_an_error() {
        assert!(parse_line(r#"{"event":"scroll","y":10}"#).is_err());
        assert!(parse_line("not json").is_err());
    }
}
