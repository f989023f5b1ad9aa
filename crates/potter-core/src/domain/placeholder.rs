//! `${root.path}` substitution over a fixed set of typed roots.
//!
//! Only these roots exist: `item`, `entity`, `property`, `config`, `input`,
//! `params`, `metadata`. Content-model roots expose their declared fields
//! only; the map roots walk JSON objects (by key) and arrays (by index).
//! There is no expression evaluation.

use crate::domain::entities::selector::Selector;
use crate::domain::error::DomainError;
use serde_json::Value;

/// The values placeholders may reach.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub item: Selector<'a>,
    pub config: Option<&'a Value>,
    pub input: &'a Value,
    pub params: &'a Value,
    pub metadata: &'a Value,
}

impl<'a> Scope<'a> {
    pub fn new(item: Selector<'a>, input: &'a Value, params: &'a Value, metadata: &'a Value) -> Self {
        Self {
            item,
            config: None,
            input,
            params,
            metadata,
        }
    }

    pub fn with_config(mut self, config: Option<&'a Value>) -> Self {
        self.config = config;
        self
    }

    /// Resolve one dotted path, e.g. `entity.lowerName`.
    pub fn resolve(&self, path: &str) -> Result<String, DomainError> {
        let mut segments = path.split('.');
        let root = segments.next().unwrap_or_default();
        let rest: Vec<&str> = segments.collect();

        let unresolved = |reason: String| DomainError::UnresolvedPlaceholder {
            path: path.to_string(),
            reason,
        };

        let view = match root {
            "item" => self.item.to_value(),
            "entity" => self
                .item
                .entity()
                .map(|e| e.to_value())
                .ok_or_else(|| unresolved(format!("{} is not an entity", self.item)))?,
            "property" => self
                .item
                .property_ref()
                .map(|p| p.to_value())
                .ok_or_else(|| unresolved(format!("{} is not a property", self.item)))?,
            "config" => self.config.cloned().unwrap_or(Value::Null),
            "input" => self.input.clone(),
            "params" => self.params.clone(),
            "metadata" => self.metadata.clone(),
            other => return Err(unresolved(format!("unknown root '{other}'"))),
        };

        let mut current = &view;
        for segment in &rest {
            current = step(current, segment)
                .ok_or_else(|| unresolved(format!("no field '{segment}'")))?;
        }
        Ok(stringify(current))
    }
}

fn step<'v>(value: &'v Value, segment: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Replace every `${path}` in `text` using `scope`.
///
/// A `${` whose body is not a dotted identifier path is left as written.
pub fn interpolate(text: &str, scope: &Scope<'_>) -> Result<String, DomainError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or_else(|| DomainError::UnterminatedPlaceholder {
                text: text.to_string(),
            })?;

        let path = &after[..end];
        if is_path(path) {
            out.push_str(&scope.resolve(path)?);
        } else {
            out.push_str(&rest[start..start + 2 + end + 1]);
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

fn is_path(body: &str) -> bool {
    !body.is_empty()
        && body
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}
