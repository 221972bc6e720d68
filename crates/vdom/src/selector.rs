//! Simple selector lists used for skip rules.
//!
//! Grammar: comma-separated compound selectors, each an optional tag name (or `*`) followed by
//! any number of `#id`, `.class`, `[attr]` and `[attr=value]` parts. Values may be bare or
//! single/double quoted. Combinators and pseudo-classes are not supported.

use crate::error::SelectorError;
use crate::node::VNode;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeSelector {
    Exists(String),
    Equals(String, String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    /// `None` for `*` or when no tag was given.
    pub tag: Option<String>,
    pub ids: Vec<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<AttributeSelector>,
}

impl CompoundSelector {
    /// Matches against an element described by its name and an attribute lookup.
    pub fn matches_with<'a>(&self, name: &str, attribute: impl Fn(&str) -> Option<&'a str>) -> bool {
        if self
            .tag
            .as_ref()
            .is_some_and(|tag| !tag.eq_ignore_ascii_case(name))
        {
            return false;
        }
        if !self.ids.iter().all(|id| attribute("id") == Some(id.as_str())) {
            return false;
        }
        if !self.classes.is_empty() {
            let class_list = attribute("class").unwrap_or("");
            let has_all = self
                .classes
                .iter()
                .all(|class| class_list.split_ascii_whitespace().any(|c| c == class));
            if !has_all {
                return false;
            }
        }
        self.attributes.iter().all(|selector| match selector {
            AttributeSelector::Exists(key) => attribute(key).is_some(),
            AttributeSelector::Equals(key, value) => attribute(key) == Some(value.as_str()),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<CompoundSelector>,
    source: String,
}

impl SelectorList {
    // input: "script, style, div.ad, [data-static]"
    // output: four compound selectors, matched as a union
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut selectors = Vec::new();
        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(SelectorError::Empty(input.to_string()));
            }
            selectors.push(parse_compound(part)?);
        }
        Ok(Self {
            selectors,
            source: input.trim().to_string(),
        })
    }

    pub fn selectors(&self) -> &[CompoundSelector] {
        &self.selectors
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Virtual matcher: only elements can match.
    pub fn matches(&self, node: &VNode) -> bool {
        let Some(element) = node.as_element() else {
            return false;
        };
        self.matches_with(&element.name, |key| element.attributes.get(key))
    }

    pub fn matches_with<'a>(&self, name: &str, attribute: impl Fn(&str) -> Option<&'a str>) -> bool {
        self.selectors
            .iter()
            .any(|selector| selector.matches_with(name, &attribute))
    }
}

impl FromStr for SelectorList {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':'
}

fn take_ident<'a>(rest: &mut &'a str, selector: &str) -> Result<&'a str, SelectorError> {
    let end = rest
        .char_indices()
        .find(|&(_, c)| !is_ident_char(c))
        .map_or(rest.len(), |(i, _)| i);
    if end == 0 {
        return Err(SelectorError::ExpectedName(selector.to_string()));
    }
    let (ident, tail) = rest.split_at(end);
    *rest = tail;
    Ok(ident)
}

fn parse_compound(selector: &str) -> Result<CompoundSelector, SelectorError> {
    let mut compound = CompoundSelector::default();
    let mut rest = selector;

    if let Some(tail) = rest.strip_prefix('*') {
        rest = tail;
    } else if rest.starts_with(is_ident_char) {
        compound.tag = Some(take_ident(&mut rest, selector)?.to_string());
    }

    while let Some(c) = rest.chars().next() {
        rest = &rest[c.len_utf8()..];
        match c {
            '#' => compound.ids.push(take_ident(&mut rest, selector)?.to_string()),
            '.' => compound
                .classes
                .push(take_ident(&mut rest, selector)?.to_string()),
            '[' => {
                let close = rest
                    .find(']')
                    .ok_or_else(|| SelectorError::UnclosedAttribute(selector.to_string()))?;
                let body = &rest[..close];
                rest = &rest[close + 1..];
                compound.attributes.push(parse_attribute(body, selector)?);
            }
            other => {
                return Err(SelectorError::Unexpected {
                    selector: selector.to_string(),
                    found: other,
                });
            }
        }
    }
    Ok(compound)
}

fn parse_attribute(body: &str, selector: &str) -> Result<AttributeSelector, SelectorError> {
    let Some((key, value)) = body.split_once('=') else {
        let key = body.trim();
        if key.is_empty() {
            return Err(SelectorError::ExpectedName(selector.to_string()));
        }
        return Ok(AttributeSelector::Exists(key.to_string()));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(SelectorError::ExpectedName(selector.to_string()));
    }
    let value = value.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|&q| value.strip_prefix(q).and_then(|v| v.strip_suffix(q)))
        .unwrap_or(value);
    Ok(AttributeSelector::Equals(key.to_string(), unquoted.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Element;

    fn element(name: &str, attributes: &[(&str, &str)]) -> VNode {
        let mut element = Element::new(name);
        for (k, v) in attributes {
            element.attributes.set(*k, *v);
        }
        element.into()
    }

    #[test]
    fn tag_match_is_case_insensitive() {
        let list = SelectorList::parse("SCRIPT, style").expect("parse");
        assert!(list.matches(&element("SCRIPT", &[])));
        assert!(list.matches(&element("STYLE", &[])));
        assert!(!list.matches(&element("DIV", &[])));
    }

    #[test]
    fn compound_parts_all_have_to_match() {
        let list = SelectorList::parse("div.ad#top[data-x=\"1\"]").expect("parse");
        assert!(list.matches(&element(
            "DIV",
            &[("class", "big ad"), ("id", "top"), ("data-x", "1")]
        )));
        assert!(!list.matches(&element("DIV", &[("class", "ad"), ("id", "top")])));
        assert!(!list.matches(&element("SPAN", &[("class", "ad"), ("id", "top"), ("data-x", "1")])));
    }

    #[test]
    fn attribute_presence_and_bare_values() {
        let list = SelectorList::parse("[data-static], [role=banner]").expect("parse");
        assert!(list.matches(&element("P", &[("data-static", "")])));
        assert!(list.matches(&element("HEADER", &[("role", "banner")])));
        assert!(!list.matches(&element("HEADER", &[("role", "main")])));
    }

    #[test]
    fn universal_selector_matches_any_element_only() {
        let list = SelectorList::parse("*").expect("parse");
        assert!(list.matches(&element("ANYTHING", &[])));
        assert!(!list.matches(&VNode::text("x")));
    }

    #[test]
    fn class_matching_uses_whole_tokens() {
        let list = SelectorList::parse(".ad").expect("parse");
        assert!(!list.matches(&element("DIV", &[("class", "adverb")])));
    }

    #[test]
    fn rejects_malformed_selectors() {
        assert!(matches!(
            SelectorList::parse("div,"),
            Err(SelectorError::Empty(_))
        ));
        assert!(matches!(
            SelectorList::parse("div > p"),
            Err(SelectorError::Unexpected { found: ' ', .. })
        ));
        assert!(matches!(
            SelectorList::parse("[data-x"),
            Err(SelectorError::UnclosedAttribute(_))
        ));
        assert!(matches!(
            SelectorList::parse("div.#x"),
            Err(SelectorError::ExpectedName(_))
        ));
    }

    #[test]
    fn display_round_trips_source() {
        let list: SelectorList = " script, style ".parse().expect("parse");
        assert_eq!(list.to_string(), "script, style");
        assert_eq!(list.selectors().len(), 2);
    }
}
