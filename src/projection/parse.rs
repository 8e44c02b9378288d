//! Projection spec parsing
//!
//! Dotted keys and nested objects build the same tree: `{"a.b": 1}` and
//! `{"a": {"b": 1}}` are equivalent. The mode is decided over the whole
//! spec once every leaf is known.

use crate::document::{Document, Value};

use super::errors::{ProjectionError, ProjectionResult};
use super::node::{ArraySlice, ProjectionNode};

const ID_FIELD: &str = "_id";

/// Parser output consumed by `Projection`
#[derive(Debug)]
pub(crate) struct ParsedSpec {
    pub(crate) root: ProjectionNode,
    pub(crate) inclusion: bool,
    pub(crate) include_id: bool,
    pub(crate) id_explicit: bool,
}

pub(crate) fn parse_spec(spec: &Document) -> ProjectionResult<ParsedSpec> {
    let mut builder = SpecBuilder::default();
    let mut root = ProjectionNode::special();
    builder.parse_object(&mut root, spec, "")?;

    let inclusion = builder.mode()?;
    root.resolve_defaults(inclusion);

    Ok(ParsedSpec {
        root,
        inclusion,
        include_id: builder.id_flag.unwrap_or(true),
        id_explicit: builder.id_flag.is_some(),
    })
}

#[derive(Debug, Default)]
struct SpecBuilder {
    first_include: Option<String>,
    first_exclude: Option<String>,
    id_flag: Option<bool>,
}

impl SpecBuilder {
    fn parse_object(
        &mut self,
        node: &mut ProjectionNode,
        spec: &Document,
        prefix: &str,
    ) -> ProjectionResult<()> {
        for (key, value) in spec.iter() {
            let path = join(prefix, key);
            if key.split('.').any(str::is_empty) {
                return Err(ProjectionError::InvalidPath { path });
            }
            if key.starts_with('$') {
                return Err(ProjectionError::UnknownDirective {
                    path: display_prefix(prefix),
                    directive: key.to_string(),
                });
            }

            let parts: Vec<&str> = key.split('.').collect();
            let Some((last, parents)) = parts.split_last() else {
                return Err(ProjectionError::InvalidPath { path });
            };

            let mut target: &mut ProjectionNode = node;
            let mut walked = prefix.to_string();
            for part in parents {
                walked = join(&walked, part);
                target = descend(target, part, &walked)?;
            }

            let at_root = prefix.is_empty() && parents.is_empty();
            self.parse_field(target, last, value, &path, at_root)?;
        }
        Ok(())
    }

    fn parse_field(
        &mut self,
        node: &mut ProjectionNode,
        name: &str,
        value: &Value,
        path: &str,
        at_root: bool,
    ) -> ProjectionResult<()> {
        match value {
            Value::Bool(_) | Value::Int(_) | Value::Double(_) => {
                let include = is_truthy(value);
                if at_root && name == ID_FIELD {
                    if self.id_flag.is_some() || node.child(ID_FIELD).is_some() {
                        return Err(collision(path));
                    }
                    self.id_flag = Some(include);
                    return Ok(());
                }
                if node.child(name).is_some() {
                    return Err(collision(path));
                }
                self.record(path, include);
                node.children
                    .push((name.to_string(), ProjectionNode::leaf(include)));
                Ok(())
            }
            Value::Object(sub) => {
                if sub.is_empty() {
                    return Err(ProjectionError::EmptySubProjection {
                        path: path.to_string(),
                    });
                }
                if at_root && name == ID_FIELD && self.id_flag.is_some() {
                    return Err(collision(path));
                }

                if let Some(arg) = slice_argument(sub) {
                    let slice = parse_slice(path, arg)?;
                    let child = descend(node, name, path)?;
                    if child.slice.is_some() {
                        return Err(collision(path));
                    }
                    child.slice = Some(slice);
                    return Ok(());
                }

                if let Some(directive) = sub.keys().find(|k| k.starts_with('$')) {
                    return Err(ProjectionError::UnknownDirective {
                        path: path.to_string(),
                        directive: directive.to_string(),
                    });
                }
                let child = descend(node, name, path)?;
                self.parse_object(child, sub, path)
            }
            other => Err(ProjectionError::InvalidValue {
                path: path.to_string(),
                type_name: other.type_name(),
            }),
        }
    }

    fn record(&mut self, path: &str, include: bool) {
        let slot = if include {
            &mut self.first_include
        } else {
            &mut self.first_exclude
        };
        if slot.is_none() {
            *slot = Some(path.to_string());
        }
    }

    /// True for inclusion mode. A spec naming only `_id: 1` is inclusion;
    /// a spec with no leaves keeps everything.
    fn mode(&self) -> ProjectionResult<bool> {
        match (&self.first_include, &self.first_exclude) {
            (Some(inclusion), Some(exclusion)) => Err(ProjectionError::MixedProjection {
                inclusion: inclusion.clone(),
                exclusion: exclusion.clone(),
            }),
            (Some(_), None) => Ok(true),
            (None, Some(_)) => Ok(false),
            (None, None) => Ok(self.id_flag == Some(true)),
        }
    }
}

/// Returns the named child, creating a special node if absent. A plain
/// leaf already at that name is a collision.
fn descend<'a>(
    node: &'a mut ProjectionNode,
    name: &str,
    path: &str,
) -> ProjectionResult<&'a mut ProjectionNode> {
    if node.child(name).is_none() {
        node.children
            .push((name.to_string(), ProjectionNode::special()));
    }
    match node.child_mut(name) {
        Some(child) if child.special => Ok(child),
        _ => Err(collision(path)),
    }
}

/// `{"$slice": arg}` or `{"slice": arg}`
fn slice_argument(sub: &Document) -> Option<&Value> {
    if sub.len() != 1 {
        return None;
    }
    sub.get("$slice").or_else(|| sub.get("slice"))
}

fn parse_slice(path: &str, arg: &Value) -> ProjectionResult<ArraySlice> {
    let invalid = |reason: String| ProjectionError::InvalidSlice {
        path: path.to_string(),
        reason,
    };
    let integral = |v: &Value| {
        v.as_i64()
            .ok_or_else(|| invalid(format!("expected an integer, got {v}")))
    };

    match arg {
        Value::Int(_) | Value::Double(_) => {
            let n = integral(arg)?;
            let count = saturating_usize(n);
            Ok(if n >= 0 {
                ArraySlice::First(count)
            } else {
                ArraySlice::Last(count)
            })
        }
        Value::Array(items) if items.len() == 2 => Ok(ArraySlice::Window {
            skip: integral(&items[0])?,
            limit: saturating_usize(integral(&items[1])?),
        }),
        Value::Array(items) => Err(invalid(format!(
            "expected [skip, limit], got {} elements",
            items.len()
        ))),
        other => Err(invalid(format!(
            "expected a number or [skip, limit], got {}",
            other.type_name()
        ))),
    }
}

fn saturating_usize(n: i64) -> usize {
    usize::try_from(n.unsigned_abs()).unwrap_or(usize::MAX)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        other => other.as_f64().map_or(false, |n| n != 0.0),
    }
}

fn collision(path: &str) -> ProjectionError {
    ProjectionError::PathCollision {
        path: path.to_string(),
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn display_prefix(prefix: &str) -> String {
    if prefix.is_empty() {
        "<root>".to_string()
    } else {
        prefix.to_string()
    }
}
