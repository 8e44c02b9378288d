//! Projection spec tree and the transform walk

use crate::document::{Document, Value};

/// Bound on which array elements survive a `$slice`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArraySlice {
    /// `$slice: n` with n >= 0
    First(usize),
    /// `$slice: n` with n < 0
    Last(usize),
    /// `$slice: [skip, limit]`; a negative skip counts from the end
    Window { skip: i64, limit: usize },
}

impl ArraySlice {
    pub fn apply<'a>(&self, items: &'a [Value]) -> &'a [Value] {
        let len = items.len();
        let (start, end) = match *self {
            ArraySlice::First(n) => (0, n.min(len)),
            ArraySlice::Last(n) => (len - n.min(len), len),
            ArraySlice::Window { skip, limit } => {
                let start = if skip < 0 {
                    len.saturating_sub(skip.unsigned_abs() as usize)
                } else {
                    (skip as u64).min(len as u64) as usize
                };
                (start, start.saturating_add(limit).min(len))
            }
        };
        &items[start..end]
    }
}

/// One node of the spec tree.
///
/// A plain node is a leaf decided by `include`. A special node needs the
/// live value: its named children are applied recursively and `include`
/// decides the fields it does not name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ProjectionNode {
    pub(crate) include: bool,
    pub(crate) special: bool,
    pub(crate) children: Vec<(String, ProjectionNode)>,
    pub(crate) slice: Option<ArraySlice>,
}

impl ProjectionNode {
    pub(crate) fn leaf(include: bool) -> Self {
        Self {
            include,
            special: false,
            children: Vec::new(),
            slice: None,
        }
    }

    pub(crate) fn special() -> Self {
        Self {
            include: true,
            special: true,
            children: Vec::new(),
            slice: None,
        }
    }

    pub(crate) fn child(&self, name: &str) -> Option<&ProjectionNode> {
        self.children
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    pub(crate) fn child_mut(&mut self, name: &str) -> Option<&mut ProjectionNode> {
        self.children
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    /// Sets the default for unnamed fields once the mode is known.
    ///
    /// A bare `$slice` keeps everything inside the array elements.
    pub(crate) fn resolve_defaults(&mut self, inclusion: bool) {
        if self.special {
            self.include = if self.slice.is_some() && self.children.is_empty() {
                true
            } else {
                !inclusion
            };
        }
        for (_, child) in &mut self.children {
            child.resolve_defaults(inclusion);
        }
    }

    /// Projects the fields of `doc`. `id_policy` overrides the decision for
    /// an `_id` field this node does not name.
    pub(crate) fn project_document(&self, doc: &Document, id_policy: Option<bool>) -> Document {
        let mut out = Document::with_capacity(doc.len());
        for (name, value) in doc.iter() {
            match self.child(name) {
                Some(child) if child.special => {
                    out.insert(name, child.project_value(value));
                }
                Some(child) => {
                    if child.include {
                        out.insert(name, value.clone());
                    }
                }
                None => {
                    let keep = match id_policy {
                        Some(keep) if name == "_id" => keep,
                        _ => self.include,
                    };
                    if keep {
                        out.insert(name, value.clone());
                    }
                }
            }
        }
        out
    }

    fn project_value(&self, value: &Value) -> Value {
        match value {
            Value::Object(doc) => Value::Object(self.project_document(doc, None)),
            Value::Array(items) => {
                let items = match &self.slice {
                    Some(slice) => slice.apply(items),
                    None => items.as_slice(),
                };
                Value::Array(items.iter().map(|item| self.project_element(item)).collect())
            }
            scalar => scalar.clone(),
        }
    }

    /// Arrays nested in arrays are projected element-wise without
    /// re-applying the slice.
    fn project_element(&self, item: &Value) -> Value {
        match item {
            Value::Object(doc) => Value::Object(self.project_document(doc, None)),
            Value::Array(inner) => {
                Value::Array(inner.iter().map(|v| self.project_element(v)).collect())
            }
            scalar => scalar.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().map(|v| Value::Int(*v)).collect()
    }

    #[test]
    fn test_slice_first_and_last() {
        let items = ints(&[1, 2, 3, 4, 5]);
        assert_eq!(ArraySlice::First(2).apply(&items), &ints(&[1, 2])[..]);
        assert_eq!(ArraySlice::First(9).apply(&items), &items[..]);
        assert_eq!(ArraySlice::Last(2).apply(&items), &ints(&[4, 5])[..]);
        assert_eq!(ArraySlice::Last(9).apply(&items), &items[..]);
        assert!(ArraySlice::First(0).apply(&items).is_empty());
    }

    #[test]
    fn test_slice_window() {
        let items = ints(&[1, 2, 3, 4, 5]);
        let window = |skip, limit| ArraySlice::Window { skip, limit }.apply(&items).to_vec();

        assert_eq!(window(1, 2), ints(&[2, 3]));
        assert_eq!(window(-2, 5), ints(&[4, 5]));
        assert_eq!(window(-9, 2), ints(&[1, 2]));
        assert!(window(7, 2).is_empty());
        assert_eq!(window(3, usize::MAX), ints(&[4, 5]));
    }
}
