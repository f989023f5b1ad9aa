//! Rule records as they appear in `rules.json`.
//!
//! A rule pairs up to five selector values with a payload. The payload's
//! shape decides which worker acts on it when the rule does not name one.

use crate::domain::error::DomainError;
use crate::domain::value_objects::worker_names;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wildcard key: matches any attribute value, including an absent one.
pub const WILDCARD: &str = "*";

/// One `{template, output}` pair of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateOutput {
    pub template: String,
    pub output: String,
}

/// A source directory mirrored under an output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathMapping {
    pub path: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZipSpec {
    pub file: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// A single rule for one port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub port: String,

    // selector dimensions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(rename = "propertyType", default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<String>,
    #[serde(rename = "propertyName", default, skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker: Option<String>,

    // payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(rename = "template-batch", default, skip_serializing_if = "Option::is_none")]
    pub template_batch: Option<Vec<TemplateOutput>>,
    #[serde(rename = "template-path", default, skip_serializing_if = "Option::is_none")]
    pub template_path: Option<PathMapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(rename = "copy-path", default, skip_serializing_if = "Option::is_none")]
    pub copy_path: Option<PathMapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<ZipSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmd: Option<CommandSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<Value>,

    /// Keys this type does not model; kept for custom workers.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Rule {
    /// An empty rule for `port`, matching every selector.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            entity: None,
            property_type: None,
            cardinality: None,
            property_name: None,
            tag: None,
            worker: None,
            template: None,
            output: None,
            template_batch: None,
            template_path: None,
            text: None,
            file: None,
            copy_path: None,
            chain: None,
            zip: None,
            cmd: None,
            configuration: None,
            extra: Map::new(),
        }
    }

    /// Parse a `rules.json` document (a JSON array of rules).
    pub fn list_from_value(document: Value) -> Result<Vec<Rule>, DomainError> {
        match document {
            Value::Null => Ok(Vec::new()),
            Value::Array(_) => serde_json::from_value(document)
                .map_err(|e| DomainError::InvalidRule(e.to_string())),
            _ => Err(DomainError::InvalidRule(
                "rules document must be a JSON array".into(),
            )),
        }
    }

    pub fn from_value(document: Value) -> Result<Rule, DomainError> {
        serde_json::from_value(document).map_err(|e| DomainError::InvalidRule(e.to_string()))
    }

    /// The worker this rule's payload implies.
    ///
    /// Checked in a fixed order, so a rule carrying both `template` and
    /// `file` infers the template worker.
    pub fn inferred_worker(&self) -> &'static str {
        if present(&self.template) {
            worker_names::TEMPLATE_BASED
        } else if self.template_batch.is_some() {
            worker_names::TEMPLATE_BATCH
        } else if self.template_path.is_some() {
            worker_names::TEMPLATE_PATH
        } else if present(&self.text) {
            worker_names::SIMPLE_TEXT
        } else if present(&self.file) {
            worker_names::COPY_FILE
        } else if self.copy_path.is_some() {
            worker_names::COPY_PATH
        } else if self.chain.is_some() {
            worker_names::PORT_CHAIN
        } else if self.zip.is_some() {
            worker_names::UNZIPPER
        } else {
            worker_names::DEFAULT
        }
    }

    /// Fill in the worker name if the rule does not declare one.
    pub fn ensure_worker(&mut self) {
        if !present(&self.worker) {
            self.worker = Some(self.inferred_worker().to_string());
        }
    }

    /// The declared worker, or the inferred one.
    pub fn worker_name(&self) -> &str {
        match self.worker.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self.inferred_worker(),
        }
    }

    /// The rule's key for a selector dimension, `*` when unset.
    pub fn key(&self, dimension: Dimension) -> &str {
        let value = match dimension {
            Dimension::Entity => &self.entity,
            Dimension::PropertyType => &self.property_type,
            Dimension::Cardinality => &self.cardinality,
            Dimension::PropertyName => &self.property_name,
            Dimension::Tag => &self.tag,
        };
        match value.as_deref() {
            Some(v) if !v.is_empty() => v,
            _ => WILDCARD,
        }
    }

    // builder helpers, mostly for tests and embedded rule sets

    pub fn for_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn for_property_type(mut self, kind: impl Into<String>) -> Self {
        self.property_type = Some(kind.into());
        self
    }

    pub fn for_cardinality(mut self, cardinality: impl Into<String>) -> Self {
        self.cardinality = Some(cardinality.into());
        self
    }

    pub fn for_property_name(mut self, name: impl Into<String>) -> Self {
        self.property_name = Some(name.into());
        self
    }

    pub fn for_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_worker(mut self, worker: impl Into<String>) -> Self {
        self.worker = Some(worker.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

/// The five selector dimensions, in resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Entity,
    PropertyType,
    Cardinality,
    PropertyName,
    Tag,
}

impl Dimension {
    /// Fixed, global walk order.
    pub const ORDER: [Dimension; 5] = [
        Dimension::Entity,
        Dimension::PropertyType,
        Dimension::Cardinality,
        Dimension::PropertyName,
        Dimension::Tag,
    ];

    /// Key used in rule documents.
    pub const fn rule_key(&self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::PropertyType => "propertyType",
            Self::Cardinality => "cardinality",
            Self::PropertyName => "propertyName",
            Self::Tag => "tag",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn template_wins_over_file() {
        let rule = Rule::from_value(json!({
            "port": "model",
            "template": "model.tpl",
            "file": "model.txt",
            "output": "model.ts"
        }))
        .unwrap();
        assert_eq!(rule.inferred_worker(), worker_names::TEMPLATE_BASED);
    }

    #[test]
    fn inference_follows_payload_shape() {
        let cases = [
            (json!({"port": "p", "template-batch": []}), worker_names::TEMPLATE_BATCH),
            (json!({"port": "p", "template-path": {"path": "a", "output": "b"}}), worker_names::TEMPLATE_PATH),
            (json!({"port": "p", "text": "x"}), worker_names::SIMPLE_TEXT),
            (json!({"port": "p", "file": "x", "output": "y"}), worker_names::COPY_FILE),
            (json!({"port": "p", "copy-path": {"path": "a", "output": "b"}}), worker_names::COPY_PATH),
            (json!({"port": "p", "chain": ["a", "b"]}), worker_names::PORT_CHAIN),
            (json!({"port": "p", "zip": {"file": "a.zip", "output": "b"}}), worker_names::UNZIPPER),
            (json!({"port": "p"}), worker_names::DEFAULT),
        ];
        for (doc, expected) in cases {
            assert_eq!(Rule::from_value(doc).unwrap().inferred_worker(), expected);
        }
    }

    #[test]
    fn empty_text_does_not_infer_text_worker() {
        let rule = Rule::new("p").with_text("");
        assert_eq!(rule.inferred_worker(), worker_names::DEFAULT);
    }

    #[test]
    fn explicit_worker_is_kept() {
        let mut rule = Rule::new("p").with_text("x").with_worker("CmdWorker");
        rule.ensure_worker();
        assert_eq!(rule.worker.as_deref(), Some("CmdWorker"));
    }

    #[test]
    fn ensure_worker_fills_inferred_name() {
        let mut rule = Rule::new("p").with_text("x");
        rule.ensure_worker();
        assert_eq!(rule.worker.as_deref(), Some(worker_names::SIMPLE_TEXT));
    }

    #[test]
    fn missing_dimensions_key_as_wildcard() {
        let rule = Rule::new("p").for_entity("User");
        assert_eq!(rule.key(Dimension::Entity), "User");
        assert_eq!(rule.key(Dimension::PropertyType), WILDCARD);
        assert_eq!(rule.key(Dimension::Tag), WILDCARD);
    }

    #[test]
    fn unknown_keys_are_preserved() {
        let rule = Rule::from_value(json!({"port": "p", "flavour": "vanilla"})).unwrap();
        assert_eq!(rule.extra.get("flavour"), Some(&json!("vanilla")));
    }

    #[test]
    fn rules_document_must_be_array() {
        assert!(Rule::list_from_value(json!({"port": "p"})).is_err());
        assert!(Rule::list_from_value(Value::Null).unwrap().is_empty());
        assert!(Rule::list_from_value(json!([{"text": "no port"}])).is_err());
    }
}
