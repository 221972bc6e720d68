use crate::node::VNode;
use std::fmt::{self, Write};
use std::sync::OnceLock;

/// Deterministic tree rendering and observational equality for tests.
/// Not a public stable format.
///
/// Equivalence rules:
/// - Node kinds and element names must match.
/// - Attributes must match as a key/value set; order is ignored.
/// - Text and comment data must match exactly.
/// - Form state (`value`, `checked`, `selected`) must match unless `ignore_form_state`.
/// - Children must match in order.
/// - Routes and skip annotations never take part.
#[derive(Clone, Copy, Debug, Default)]
pub struct SnapshotOptions {
    pub ignore_form_state: bool,
}

#[derive(Debug)]
pub struct TreeSnapshot {
    lines: Vec<String>,
}

impl TreeSnapshot {
    pub fn new(root: &VNode, options: SnapshotOptions) -> Self {
        let mut lines = Vec::new();
        walk_snapshot(root, &options, 0, &mut lines);
        Self { lines }
    }

    pub fn as_lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for TreeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[derive(Debug)]
pub struct TreeMismatch<'a> {
    path: String,
    detail: String,
    expected: String,
    actual: String,
    expected_node: &'a VNode,
    actual_node: &'a VNode,
    options: SnapshotOptions,
    expected_subtree: OnceLock<String>,
    actual_subtree: OnceLock<String>,
}

impl TreeMismatch<'_> {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for TreeMismatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expected_subtree = self
            .expected_subtree
            .get_or_init(|| TreeSnapshot::new(self.expected_node, self.options).render());
        let actual_subtree = self
            .actual_subtree
            .get_or_init(|| TreeSnapshot::new(self.actual_node, self.options).render());
        writeln!(f, "tree mismatch at {}: {}", self.path, self.detail)?;
        writeln!(f, "expected: {}", self.expected)?;
        writeln!(f, "actual:   {}", self.actual)?;
        writeln!(f, "expected subtree:\n{expected_subtree}")?;
        writeln!(f, "actual subtree:\n{actual_subtree}")?;
        Ok(())
    }
}

impl std::error::Error for TreeMismatch<'_> {}

pub fn assert_tree_eq(expected: &VNode, actual: &VNode, options: SnapshotOptions) {
    if let Err(mismatch) = compare_trees(expected, actual, options) {
        panic!("{mismatch}");
    }
}

pub fn compare_trees<'a>(
    expected: &'a VNode,
    actual: &'a VNode,
    options: SnapshotOptions,
) -> Result<(), Box<TreeMismatch<'a>>> {
    let mut path = vec![node_label(expected)];
    compare_nodes(expected, actual, &options, &mut path)
}

fn compare_nodes<'a>(
    expected: &'a VNode,
    actual: &'a VNode,
    options: &SnapshotOptions,
    path: &mut Vec<String>,
) -> Result<(), Box<TreeMismatch<'a>>> {
    let fail = |path: &[String], detail: &str| {
        Err(Box::new(mismatch(path, detail, expected, actual, options)))
    };
    match (expected, actual) {
        (VNode::Element(exp), VNode::Element(act)) => {
            if exp.name != act.name {
                return fail(path, "element name");
            }
            if exp.attributes.len() != act.attributes.len() {
                return fail(path, "attribute count");
            }
            for (name, value) in exp.attributes.iter() {
                match act.attributes.get(name) {
                    None => return fail(path, &format!("missing attribute {name:?}")),
                    Some(other) if other != value => {
                        return fail(path, &format!("attribute value of {name:?}"));
                    }
                    Some(_) => {}
                }
            }
            if !options.ignore_form_state
                && (exp.value != act.value
                    || exp.checked != act.checked
                    || exp.selected != act.selected)
            {
                return fail(path, "form state");
            }
            match (&exp.children, &act.children) {
                (Some(exp_children), Some(act_children)) => {
                    compare_children(expected, actual, exp_children, act_children, options, path)
                }
                (None, None) => Ok(()),
                _ => fail(path, "void-ness"),
            }
        }
        (VNode::Text(exp), VNode::Text(act)) => {
            if exp.data != act.data {
                return fail(path, "text");
            }
            Ok(())
        }
        (VNode::Comment(exp), VNode::Comment(act)) => {
            if exp.data != act.data {
                return fail(path, "comment");
            }
            Ok(())
        }
        (VNode::Fragment(exp), VNode::Fragment(act)) => {
            compare_children(expected, actual, &exp.children, &act.children, options, path)
        }
        _ => fail(path, "node kind"),
    }
}

fn compare_children<'a>(
    expected_parent: &'a VNode,
    actual_parent: &'a VNode,
    expected: &'a [VNode],
    actual: &'a [VNode],
    options: &SnapshotOptions,
    path: &mut Vec<String>,
) -> Result<(), Box<TreeMismatch<'a>>> {
    if expected.len() != actual.len() {
        return Err(Box::new(mismatch(
            path,
            &format!(
                "child count (expected {}, actual {})",
                expected.len(),
                actual.len()
            ),
            expected_parent,
            actual_parent,
            options,
        )));
    }
    for (idx, (exp, act)) in expected.iter().zip(actual.iter()).enumerate() {
        path.push(format!("{}[{}]", node_label(exp), idx));
        let result = compare_nodes(exp, act, options, path);
        path.pop();
        result?;
    }
    Ok(())
}

fn mismatch<'a>(
    path: &[String],
    detail: &str,
    expected: &'a VNode,
    actual: &'a VNode,
    options: &SnapshotOptions,
) -> TreeMismatch<'a> {
    TreeMismatch {
        path: format!("/{}", path.join("/")),
        detail: detail.to_string(),
        expected: truncate_line(format_node_line(expected, options), 160),
        actual: truncate_line(format_node_line(actual, options), 160),
        expected_node: expected,
        actual_node: actual,
        options: *options,
        expected_subtree: OnceLock::new(),
        actual_subtree: OnceLock::new(),
    }
}

fn node_label(node: &VNode) -> String {
    let Some(element) = node.as_element() else {
        return node.node_name().to_string();
    };
    let mut label = element.name.clone();
    if let Some(id) = element.attributes.get("id").filter(|v| !v.is_empty()) {
        label.push('#');
        write_escaped(&mut label, id);
    } else if let Some(key) = element.attributes.get("data-key").filter(|v| !v.is_empty()) {
        label.push_str("[data-key=");
        write_escaped(&mut label, key);
        label.push(']');
    }
    label
}

fn truncate_line(mut line: String, max_len: usize) -> String {
    if line.len() > max_len {
        let mut cut = max_len.saturating_sub(3);
        while !line.is_char_boundary(cut) {
            cut -= 1;
        }
        line.truncate(cut);
        line.push_str("...");
    }
    line
}

fn walk_snapshot(node: &VNode, options: &SnapshotOptions, depth: usize, out: &mut Vec<String>) {
    const INDENT_STEP: usize = 2;
    let mut line = " ".repeat(depth * INDENT_STEP);
    write_node_line(&mut line, node, options);
    out.push(line);
    for child in node.children().unwrap_or_default() {
        walk_snapshot(child, options, depth + 1, out);
    }
}

fn format_node_line(node: &VNode, options: &SnapshotOptions) -> String {
    let mut line = String::new();
    write_node_line(&mut line, node, options);
    line
}

fn write_node_line(out: &mut String, node: &VNode, options: &SnapshotOptions) {
    match node {
        VNode::Element(element) => {
            out.push('<');
            out.push_str(&element.name);
            let mut attributes: Vec<_> = element.attributes.iter().collect();
            attributes.sort_unstable();
            for (name, value) in attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                write_escaped(out, value);
                out.push('"');
            }
            if !options.ignore_form_state {
                if let Some(value) = &element.value {
                    out.push_str(" .value=\"");
                    write_escaped(out, value);
                    out.push('"');
                }
                if let Some(checked) = element.checked {
                    let _ = write!(out, " .checked={checked}");
                }
                if let Some(selected) = element.selected {
                    let _ = write!(out, " .selected={selected}");
                }
            }
            out.push('>');
        }
        VNode::Text(text) => {
            out.push('"');
            write_escaped(out, &text.data);
            out.push('"');
        }
        VNode::Comment(comment) => {
            out.push_str("<!-- ");
            write_escaped(out, &comment.data);
            out.push_str(" -->");
        }
        VNode::Fragment(_) => out.push_str("#document-fragment"),
    }
}

fn write_escaped(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ if ch.is_ascii() => out.push(ch),
            _ => {
                let _ = write!(out, "\\u{{{:X}}}", ch as u32);
            }
        }
    }
}
