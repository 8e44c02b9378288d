//! Dotted field paths and fan-out resolution

use std::fmt;
use std::str::FromStr;

use super::document::Document;
use super::value::Value;
use super::DocumentError;

/// An ordered sequence of path components, e.g. `a.b.c`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath {
    parts: Vec<String>,
}

impl FieldPath {
    /// The empty path (document root)
    pub fn root() -> Self {
        Self { parts: Vec::new() }
    }

    /// Parses a dotted path. Empty components are rejected.
    pub fn parse(dotted: &str) -> Result<Self, DocumentError> {
        if dotted.is_empty() {
            return Err(DocumentError::InvalidPath(dotted.to_string()));
        }
        let parts: Vec<String> = dotted.split('.').map(str::to_string).collect();
        if parts.iter().any(String::is_empty) {
            return Err(DocumentError::InvalidPath(dotted.to_string()));
        }
        Ok(Self { parts })
    }

    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn push(&mut self, part: impl Into<String>) {
        self.parts.push(part.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.parts.pop()
    }

    /// Returns a new path with `other` appended.
    pub fn join(&self, other: &FieldPath) -> FieldPath {
        let mut parts = self.parts.clone();
        parts.extend(other.parts.iter().cloned());
        FieldPath { parts }
    }

    /// True if `prefix` is a (non-strict) prefix of this path.
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.parts.len() >= prefix.parts.len()
            && self.parts.iter().zip(&prefix.parts).all(|(a, b)| a == b)
    }

    /// Canonical dotted form.
    pub fn dotted(&self) -> String {
        self.parts.join(".")
    }

    /// Resolves the path against a document.
    ///
    /// Returns every matching (concrete path, value) pair. Arrays on the
    /// way fan out: each object element is searched for the remaining
    /// components and its index becomes part of the concrete path. A
    /// numeric component also selects the array element at that position.
    pub fn resolve<'a>(&self, doc: &'a Document) -> Vec<(FieldPath, &'a Value)> {
        let mut out = Vec::new();
        if let Some((head, rest)) = self.parts.split_first() {
            if let Some(value) = doc.get(head) {
                let mut concrete = FieldPath::from_parts([head.as_str()]);
                resolve_value(rest, value, &mut concrete, &mut out);
            }
        }
        out
    }

    /// Expression-style extraction: missing yields `None`, one match yields
    /// that value and several matches are collected into an array.
    pub fn extract(&self, doc: &Document) -> Option<Value> {
        let mut matches = self.resolve(doc);
        match matches.len() {
            0 => None,
            1 => matches.pop().map(|(_, v)| v.clone()),
            _ => Some(Value::Array(
                matches.into_iter().map(|(_, v)| v.clone()).collect(),
            )),
        }
    }
}

fn resolve_value<'a>(
    remaining: &[String],
    value: &'a Value,
    concrete: &mut FieldPath,
    out: &mut Vec<(FieldPath, &'a Value)>,
) {
    let Some((head, rest)) = remaining.split_first() else {
        out.push((concrete.clone(), value));
        return;
    };

    match value {
        Value::Object(doc) => {
            if let Some(child) = doc.get(head) {
                concrete.push(head.as_str());
                resolve_value(rest, child, concrete, out);
                concrete.pop();
            }
        }
        Value::Array(items) => {
            if let Ok(index) = head.parse::<usize>() {
                if let Some(item) = items.get(index) {
                    concrete.push(head.as_str());
                    resolve_value(rest, item, concrete, out);
                    concrete.pop();
                }
            }
            for (i, item) in items.iter().enumerate() {
                if matches!(item, Value::Object(_)) {
                    concrete.push(i.to_string());
                    resolve_value(remaining, item, concrete, out);
                    concrete.pop();
                }
            }
        }
        _ => {}
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dotted())
    }
}

impl FromStr for FieldPath {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldPath::parse(s)
    }
}
