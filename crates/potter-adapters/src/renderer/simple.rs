//! Simple variable substitution renderer.
//!
//! Two tag forms are understood:
//!
//! - `{{ a.b.c }}` looks the dotted path up in the template variables.
//!   Strings are inserted verbatim, `null` as nothing, other values as
//!   compact JSON. Paths that do not resolve are left in place.
//! - `{{> port }}` / `{{> port target }}` renders another port inline
//!   through the [`PortHook`].

use potter_core::{
    application::{
        ApplicationError,
        ports::{PortHook, TemplateRenderer},
    },
    error::PotterResult,
};
use serde_json::Value;
use tracing::instrument;

/// Simple renderer using basic variable substitution.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleRenderer;

impl SimpleRenderer {
    /// Create a new simple renderer.
    pub fn new() -> Self {
        Self
    }
}

impl TemplateRenderer for SimpleRenderer {
    #[instrument(skip_all, fields(template = %name))]
    fn render(
        &self,
        name: &str,
        source: &str,
        vars: &Value,
        hook: &dyn PortHook,
    ) -> PotterResult<String> {
        let mut out = String::with_capacity(source.len());
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                return Err(ApplicationError::RenderingFailed {
                    reason: format!("unterminated '{{{{' in template '{name}'"),
                }
                .into());
            };
            let tag = &after[..end];
            let raw = &rest[start..start + 2 + end + 2];
            rest = &after[end + 2..];

            if let Some(call) = tag.trim_start().strip_prefix('>') {
                out.push_str(&render_partial(name, call, hook)?);
                continue;
            }

            match lookup(vars, tag.trim()) {
                Some(value) => out.push_str(&display(value)),
                None => out.push_str(raw),
            }
        }
        out.push_str(rest);
        Ok(out)
    }
}

fn render_partial(name: &str, call: &str, hook: &dyn PortHook) -> PotterResult<String> {
    let mut words = call.split_whitespace();
    let port = words.next().ok_or_else(|| ApplicationError::RenderingFailed {
        reason: format!("'{{{{>}}}}' without a port name in template '{name}'"),
    })?;
    let target = words.next();
    if let Some(extra) = words.next() {
        return Err(ApplicationError::RenderingFailed {
            reason: format!("unexpected '{extra}' after '{{{{> {call}}}}}' in template '{name}'"),
        }
        .into());
    }
    hook.render_port(port, target)
}

fn lookup<'v>(vars: &'v Value, path: &str) -> Option<&'v Value> {
    if path.is_empty() {
        return None;
    }
    path.split('.').try_fold(vars, |value, segment| match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    /// Records every port request and answers with `<port:target>`.
    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<(String, Option<String>)>>,
    }

    impl PortHook for Recorder {
        fn render_port(&self, port: &str, target: Option<&str>) -> PotterResult<String> {
            self.calls
                .borrow_mut()
                .push((port.to_string(), target.map(str::to_string)));
            Ok(format!("<{}:{}>", port, target.unwrap_or("item")))
        }
    }

    fn render(source: &str, vars: Value) -> String {
        SimpleRenderer::new()
            .render("t", source, &vars, &Recorder::default())
            .unwrap()
    }

    #[test]
    fn substitutes_dotted_paths() {
        let vars = json!({ "entity": { "name": "User", "labels": { "plural": "Users" } } });
        assert_eq!(
            render("class {{ entity.name }} // {{entity.labels.plural}}", vars),
            "class User // Users"
        );
    }

    #[test]
    fn non_string_values_render_as_json() {
        let vars = json!({ "n": 3, "flag": true, "none": null, "list": [1, 2] });
        assert_eq!(render("{{n}} {{flag}} [{{none}}] {{list}}", vars), "3 true [] [1,2]");
    }

    #[test]
    fn array_segments_index() {
        let vars = json!({ "entities": [{ "name": "User" }, { "name": "Order" }] });
        assert_eq!(render("{{ entities.1.name }}", vars), "Order");
    }

    #[test]
    fn unknown_paths_are_left_in_place() {
        assert_eq!(render("a {{ missing.key }} b", json!({})), "a {{ missing.key }} b");
    }

    #[test]
    fn partials_go_through_the_hook() {
        let hook = Recorder::default();
        let out = SimpleRenderer::new()
            .render("t", "{ {{> fields properties }} }{{>header}}", &json!({}), &hook)
            .unwrap();

        assert_eq!(out, "{ <fields:properties> }<header:item>");
        assert_eq!(
            hook.calls.borrow().as_slice(),
            &[
                ("fields".to_string(), Some("properties".to_string())),
                ("header".to_string(), None),
            ]
        );
    }

    #[test]
    fn unterminated_tag_is_an_error() {
        let err = SimpleRenderer::new()
            .render("broken", "hello {{ name", &json!({}), &Recorder::default())
            .unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn partial_without_port_is_an_error() {
        assert!(
            SimpleRenderer::new()
                .render("t", "{{> }}", &json!({}), &Recorder::default())
                .is_err()
        );
    }
}
