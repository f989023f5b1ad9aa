//! Core domain layer for Potter.
//!
//! Pure logic, no I/O: the content model, rule records, selectors, the rule
//! cascade that resolves the most specific rule for a selector, and the
//! restricted placeholder resolver. Everything that touches the filesystem
//! or other processes goes through ports in the application layer.
//!
//! ## Invariants
//!
//! - **Fixed dimension order**: entity → propertyType → cardinality →
//!   propertyName → tag, for indexing and resolution alike
//! - **Resolved workers**: every indexed rule carries a worker name
//! - **Immutable model**: entities and properties never change after parsing

pub mod cascade;
pub mod common;
pub mod entities;
pub mod error;
pub mod placeholder;
pub mod value_objects;

mod validation;

pub use cascade::RuleCascade;
pub use common::RelativePath;
pub use entities::{
    Attribute, CommandSpec, ContentModel, Dimension, Entity, PathMapping, Property, PropertyRef,
    Rule, Selector, TemplateOutput, WILDCARD, ZipSpec,
};
pub use error::{DomainError, ErrorCategory};
pub use placeholder::{Scope, interpolate};
pub use validation::DomainValidator;
pub use value_objects::{Level, ROOT_PORT, worker_names};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ========================================================================
    // Resolution scenarios over parsed documents
    // ========================================================================

    fn cascade_from(level: Level, rules: serde_json::Value) -> RuleCascade {
        let mut cascade = RuleCascade::new();
        for rule in Rule::list_from_value(rules).unwrap() {
            DomainValidator::validate_rule(&rule).unwrap();
            cascade.add(level, rule);
        }
        cascade
    }

    #[test]
    fn field_type_resolves_specific_then_wildcard() {
        let model = ContentModel::from_metadata(&json!({
            "entities": [{
                "name": "User",
                "properties": [
                    { "name": "email", "type": "string" },
                    { "name": "age", "type": "int" }
                ]
            }]
        }))
        .unwrap();

        let cascade = cascade_from(
            Level::Generator,
            json!([
                { "port": "field-type", "entity": "User", "propertyType": "string",
                  "worker": "SimpleTextWorker", "text": "VARCHAR" },
                { "port": "field-type", "propertyType": "*", "text": "ANY" }
            ]),
        );

        let user = &model.entities()[0];
        let email = Selector::property(user, &user.properties()[0]);
        let age = Selector::property(user, &user.properties()[1]);

        let scope_value = json!({});
        let resolve = |sel: Selector<'_>| {
            let rule = cascade.search(&sel).unwrap();
            let scope = Scope::new(sel, &scope_value, &scope_value, &scope_value);
            interpolate(rule.text.as_deref().unwrap(), &scope).unwrap()
        };

        assert_eq!(resolve(email), "VARCHAR");
        assert_eq!(resolve(age), "ANY");
    }

    #[test]
    fn local_rule_overrides_generator_for_same_key() {
        let mut cascade = cascade_from(
            Level::Generator,
            json!([{ "port": "banner", "text": "generated" }]),
        );
        cascade.add(
            Level::Local,
            Rule::from_value(json!({ "port": "banner", "text": "custom" })).unwrap(),
        );

        let rule = cascade.search(&Selector::None).unwrap();
        assert_eq!(rule.text.as_deref(), Some("custom"));
        assert_eq!(rule.worker_name(), worker_names::SIMPLE_TEXT);
    }

    #[test]
    fn entity_tags_select_branch() {
        let model = ContentModel::from_metadata(&json!({
            "entities": [
                { "name": "Audit", "tags": ["readonly", "internal"] },
                { "name": "Order" }
            ]
        }))
        .unwrap();

        let cascade = cascade_from(
            Level::Local,
            json!([
                { "port": "page", "tag": "internal", "text": "hidden" },
                { "port": "page", "text": "public" }
            ]),
        );

        let audit = Selector::Entity(&model.entities()[0]);
        let order = Selector::Entity(&model.entities()[1]);
        assert_eq!(cascade.search(&audit).unwrap().text.as_deref(), Some("hidden"));
        assert_eq!(cascade.search(&order).unwrap().text.as_deref(), Some("public"));
    }
}
