//! Descendant CSS selectors
//!
//! Share pages are located with selectors such as
//! `response-container message-content .markdown`. Only the subset those need
//! is supported: compound selectors made of an optional tag (or `*`), any
//! number of `.class` parts and an optional `#id`, joined by the descendant
//! combinator (whitespace).

use super::{attr, classes, is_element};
use markup5ever_rcdom::{Handle, NodeData};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid selector '{selector}': {reason}")]
pub struct SelectorError {
    pub selector: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Compound {
    fn matches(&self, handle: &Handle) -> bool {
        if !matches!(handle.data, NodeData::Element { .. }) {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !is_element(handle, tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if attr(handle, "id").as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let present = classes(handle);
            if !self.classes.iter().all(|c| present.contains(c)) {
                return false;
            }
        }
        true
    }
}

/// A parsed descendant selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    steps: Vec<Compound>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let error = |reason: &str| SelectorError {
            selector: source.to_string(),
            reason: reason.to_string(),
        };

        let steps = source
            .split_whitespace()
            .map(|part| parse_compound(part).map_err(|reason| error(&reason)))
            .collect::<Result<Vec<_>, _>>()?;

        if steps.is_empty() {
            return Err(error("empty selector"));
        }

        Ok(Self {
            source: source.to_string(),
            steps,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Every matching element below `scope`, in document order.
    ///
    /// Ancestor steps may match `scope` itself but nothing above it.
    pub fn query_all(&self, scope: &Handle) -> Vec<Handle> {
        let mut found = Vec::new();
        let mut ancestors = vec![scope.clone()];
        self.walk(scope, &mut ancestors, &mut found);
        found
    }

    pub fn query_first(&self, scope: &Handle) -> Option<Handle> {
        self.query_all(scope).into_iter().next()
    }

    fn walk(&self, node: &Handle, ancestors: &mut Vec<Handle>, found: &mut Vec<Handle>) {
        for child in node.children.borrow().iter() {
            if !matches!(child.data, NodeData::Element { .. }) {
                continue;
            }
            if self.matches_with(child, ancestors) {
                found.push(child.clone());
            }
            ancestors.push(child.clone());
            self.walk(child, ancestors, found);
            ancestors.pop();
        }
    }

    fn matches_with(&self, handle: &Handle, ancestors: &[Handle]) -> bool {
        let Some((last, rest)) = self.steps.split_last() else {
            return false;
        };
        if !last.matches(handle) {
            return false;
        }

        // Descendant-only chains match greedily from the innermost step out.
        let mut remaining = ancestors.iter().rev();
        rest.iter()
            .rev()
            .all(|step| remaining.by_ref().any(|ancestor| step.matches(ancestor)))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn parse_compound(part: &str) -> Result<Compound, String> {
    let mut compound = Compound::default();
    let mut chars = part.chars().peekable();

    let mut tag = String::new();
    if chars.peek() == Some(&'*') {
        chars.next();
    } else {
        while let Some(&c) = chars.peek() {
            if !is_ident_char(c) {
                break;
            }
            tag.push(c.to_ascii_lowercase());
            chars.next();
        }
    }
    if !tag.is_empty() {
        compound.tag = Some(tag);
    }

    while let Some(marker) = chars.next() {
        let mut name = String::new();
        while let Some(&c) = chars.peek() {
            if !is_ident_char(c) {
                break;
            }
            name.push(c);
            chars.next();
        }
        if name.is_empty() {
            return Err(format!("expected a name after '{marker}'"));
        }
        match marker {
            '.' => compound.classes.push(name),
            '#' => compound.id = Some(name),
            other => return Err(format!("unsupported character '{other}'")),
        }
    }

    Ok(compound)
}
