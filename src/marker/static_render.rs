//! Static rendering of markers for non-live output
//!
//! Unlike the live decorations, this pass rewrites the rendered tree: each
//! marker becomes a `span` carrying the rule class and holding only the
//! captured content. Delimiters are dropped, and no cursor or focus state is
//! involved.

use super::rule::{CompiledRule, RuleSet};

/// A node of already-rendered output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element {
        tag: String,
        class: Option<String>,
        children: Vec<Node>,
    },
}

impl Node {
    pub fn text(text: &str) -> Self {
        Node::Text(text.to_string())
    }

    pub fn element(tag: &str, class: Option<&str>, children: Vec<Node>) -> Self {
        Node::Element {
            tag: tag.to_string(),
            class: class.map(str::to_string),
            children,
        }
    }

    /// Serialize this node as HTML
    pub fn write_html(&self, out: &mut String) {
        match self {
            Node::Text(text) => escape_into(text, out),
            Node::Element { tag, class, children } => {
                out.push('<');
                out.push_str(tag);
                if let Some(class) = class {
                    out.push_str(" class=\"");
                    escape_into(class, out);
                    out.push('"');
                }
                out.push('>');
                for child in children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }
}

fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

/// Wrap the markers of every rule found in the text nodes of `nodes`
///
/// Rules run one after another, so spans produced by one rule are searched
/// by the rules that follow it.
pub fn post_process(nodes: &mut Vec<Node>, rules: &RuleSet) {
    for rule in rules.scan_order() {
        wrap_markers(nodes, rule);
    }
}

fn wrap_markers(nodes: &mut Vec<Node>, rule: &CompiledRule) {
    let mut i = 0;
    while i < nodes.len() {
        let pieces = match &mut nodes[i] {
            Node::Element { children, .. } => {
                wrap_markers(children, rule);
                None
            }
            Node::Text(text) => split_markers(text, rule),
        };

        match pieces {
            Some(pieces) => {
                let count = pieces.len();
                nodes.splice(i..=i, pieces);
                i += count;
            }
            None => i += 1,
        }
    }
}

fn split_markers(text: &str, rule: &CompiledRule) -> Option<Vec<Node>> {
    let mut pieces = Vec::new();
    let mut last = 0;

    for marker in rule.find_iter(text) {
        if marker.start > last {
            pieces.push(Node::text(&text[last..marker.start]));
        }
        let content = rule.content_range(&marker);
        let children = if content.is_empty() {
            Vec::new()
        } else {
            vec![Node::text(&text[content])]
        };
        pieces.push(Node::element("span", Some(rule.style_class()), children));
        last = marker.end;
    }

    if pieces.is_empty() {
        return None;
    }
    if last < text.len() {
        pieces.push(Node::text(&text[last..]));
    }
    Some(pieces)
}

/// Render a plain document as HTML paragraphs with markers substituted
pub fn render_document(text: &str, rules: &RuleSet) -> String {
    let mut nodes: Vec<Node> = text
        .lines()
        .map(|line| Node::element("p", None, vec![Node::text(line)]))
        .collect();

    post_process(&mut nodes, rules);

    let mut html = String::new();
    for node in &nodes {
        node.write_html(&mut html);
        html.push('\n');
    }
    html
}
