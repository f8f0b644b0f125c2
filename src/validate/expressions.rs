//! Lexical scan for `{{ ... }}` template expressions in node parameters.
//!
//! This does not parse the expression language; it only finds delimited
//! regions and notes the ones that are empty or never closed.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::parse::types::Node;

fn expression_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{\{(.*?)\}\}").expect("static expression pattern"))
}

/// Expressions found in one node's parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpressionScan {
    /// Every well-delimited expression, including the braces.
    pub expressions: Vec<String>,
    /// Expressions whose body is blank.
    pub empty: Vec<String>,
    /// Text following a `{{` that is never closed.
    pub unterminated: Vec<String>,
}

impl ExpressionScan {
    pub fn count(&self) -> usize {
        self.expressions.len()
    }
}

/// Scan every string leaf of a node's parameters.
pub fn scan_node(node: &Node) -> ExpressionScan {
    let mut scan = ExpressionScan::default();
    for value in node.parameters.values() {
        scan_value(value, &mut scan);
    }
    scan
}

fn scan_value(value: &Value, scan: &mut ExpressionScan) {
    match value {
        Value::String(s) => scan_str(s, scan),
        Value::Array(items) => items.iter().for_each(|v| scan_value(v, scan)),
        Value::Object(map) => map.values().for_each(|v| scan_value(v, scan)),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Scan a single string. A `{{` left over between or after matches has no
/// closing delimiter.
pub fn scan_str(text: &str, scan: &mut ExpressionScan) {
    let mut cursor = 0;
    for caps in expression_regex().captures_iter(text) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        note_unterminated(&text[cursor..whole.start()], scan);
        scan.expressions.push(whole.as_str().to_string());
        if body.as_str().trim().is_empty() {
            scan.empty.push(whole.as_str().to_string());
        }
        cursor = whole.end();
    }
    note_unterminated(&text[cursor..], scan);
}

fn note_unterminated(gap: &str, scan: &mut ExpressionScan) {
    if let Some(pos) = gap.find("{{") {
        scan.unterminated.push(gap[pos..].trim_end().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(text: &str) -> ExpressionScan {
        let mut s = ExpressionScan::default();
        scan_str(text, &mut s);
        s
    }

    #[test]
    fn finds_single_expression() {
        let s = scan("Analyze sentiment: {{ $json.review_text }}");
        assert_eq!(s.expressions, vec!["{{ $json.review_text }}"]);
        assert!(s.empty.is_empty());
        assert!(s.unterminated.is_empty());
    }

    #[test]
    fn finds_multiple_expressions_in_one_string() {
        let s = scan("{{ $json.a }} and {{ $node[\"x\"].json.b }}");
        assert_eq!(s.count(), 2);
    }

    #[test]
    fn plain_text_has_no_expressions() {
        let s = scan("https://api.example.com/reviews");
        assert_eq!(s, ExpressionScan::default());
    }

    #[test]
    fn blank_body_is_empty_expression() {
        let s = scan("value: {{   }}");
        assert_eq!(s.count(), 1);
        assert_eq!(s.empty, vec!["{{   }}"]);
    }

    #[test]
    fn unclosed_open_is_unterminated() {
        let s = scan("Hello {{ $json.name");
        assert_eq!(s.count(), 0);
        assert_eq!(s.unterminated, vec!["{{ $json.name"]);
    }

    #[test]
    fn unclosed_after_valid_expression() {
        let s = scan("{{ $json.a }} then {{ $json.b");
        assert_eq!(s.count(), 1);
        assert_eq!(s.unterminated.len(), 1);
    }

    #[test]
    fn nested_parameter_strings_are_scanned() {
        let node: Node = serde_json::from_value(serde_json::json!({
            "id": "a",
            "name": "A",
            "type": "t",
            "parameters": {
                "options": { "headers": ["{{ $now }}", "static"] },
                "body": "{{ $json.x }}"
            }
        }))
        .unwrap();
        assert_eq!(scan_node(&node).count(), 2);
    }
}
