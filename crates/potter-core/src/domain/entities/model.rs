//! Content model: the entities and properties a generator scaffolds from.
//!
//! Parsed once from the metadata document and immutable for the rest of the
//! run. A `Property` does not hold a pointer back to its `Entity`; it records
//! the owning entity's name, and selectors pair the two by reference (see
//! [`PropertyRef`](crate::domain::PropertyRef)).

use crate::domain::error::DomainError;
use serde::Deserialize;
use serde_json::{Map, Value, json};

/// A named type in the content model.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    name: String,
    labels: Map<String, Value>,
    properties: Vec<Property>,
    tags: Vec<String>,
}

/// A field of an [`Entity`].
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    entity: String,
    name: String,
    label: Option<String>,
    kind: Option<String>,
    target: Option<String>,
    cardinality: Option<String>,
    tags: Vec<String>,
    params: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct EntityDocument {
    name: String,
    #[serde(default)]
    labels: Map<String, Value>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    properties: Vec<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct PropertyDocument {
    name: String,
    label: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    target: Option<String>,
    cardinality: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: Map::new(),
            properties: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Parse one entry of the metadata `entities` array.
    pub fn from_document(document: &Value) -> Result<Self, DomainError> {
        let doc: EntityDocument = serde_json::from_value(document.clone())
            .map_err(|e| DomainError::InvalidMetadata(format!("entity: {e}")))?;

        let properties = doc
            .properties
            .into_iter()
            .map(|raw| Property::from_document(&doc.name, raw))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: doc.name,
            labels: doc.labels,
            properties,
            tags: doc.tags,
        })
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), Value::String(value.into()));
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Attach a property; its owning entity is rewritten to this entity.
    pub fn with_property(mut self, mut property: Property) -> Self {
        property.entity = self.name.clone();
        self.properties.push(property);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kebab-cased name: `UserAccount` becomes `user-account`.
    pub fn lower_name(&self) -> String {
        kebab_case(&self.name)
    }

    pub fn labels(&self) -> &Map<String, Value> {
        &self.labels
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// The tag, if this entity carries it.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.iter().find(|t| *t == name).map(String::as_str)
    }

    /// JSON view exposed to templates and placeholders.
    pub fn to_value(&self) -> Value {
        let properties: Vec<Value> = self
            .properties
            .iter()
            .map(|p| p.to_value_with_owner(self))
            .collect();

        let mut view = self.summary();
        if let Value::Object(map) = &mut view {
            map.insert("properties".into(), Value::Array(properties));
        }
        view
    }

    fn summary(&self) -> Value {
        json!({
            "name": self.name,
            "lowerName": self.lower_name(),
            "labels": self.labels,
            "tags": self.tags,
        })
    }
}

impl Property {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            entity: String::new(),
            name: name.into(),
            label: None,
            kind: None,
            target: None,
            cardinality: None,
            tags: Vec::new(),
            params: Map::new(),
        }
    }

    fn from_document(entity: &str, raw: Map<String, Value>) -> Result<Self, DomainError> {
        let doc: PropertyDocument = serde_json::from_value(Value::Object(raw.clone()))
            .map_err(|e| DomainError::InvalidMetadata(format!("property of '{entity}': {e}")))?;

        Ok(Self {
            entity: entity.to_string(),
            name: doc.name,
            label: doc.label,
            kind: doc.kind,
            target: doc.target,
            cardinality: doc.cardinality,
            tags: doc.tags,
            params: raw,
        })
    }

    pub fn with_type(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_relation(
        mut self,
        target: impl Into<String>,
        cardinality: impl Into<String>,
    ) -> Self {
        self.target = Some(target.into());
        self.cardinality = Some(cardinality.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Name of the owning entity.
    pub fn entity_name(&self) -> &str {
        &self.entity
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Declared type (`type` in the metadata document).
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn cardinality(&self) -> Option<&str> {
        self.cardinality.as_deref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.iter().find(|t| *t == name).map(String::as_str)
    }

    /// The raw property document, including keys not modelled above.
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub(crate) fn to_value_with_owner(&self, owner: &Entity) -> Value {
        json!({
            "name": self.name,
            "label": self.label,
            "type": self.kind,
            "target": self.target,
            "cardinality": self.cardinality,
            "tags": self.tags,
            "params": self.params,
            "entity": owner.summary(),
        })
    }
}

/// All entities of one metadata document, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentModel {
    entities: Vec<Entity>,
}

impl ContentModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the `entities` array of a metadata document.
    ///
    /// A document without `entities` yields an empty model.
    pub fn from_metadata(metadata: &Value) -> Result<Self, DomainError> {
        let mut model = Self::new();
        match metadata.get("entities") {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) => {
                for item in items {
                    model.push(Entity::from_document(item)?)?;
                }
            }
            Some(other) => {
                return Err(DomainError::InvalidMetadata(format!(
                    "'entities' must be an array, found {}",
                    json_kind(other)
                )));
            }
        }
        Ok(model)
    }

    /// Append an entity. Names are unique within a model.
    pub fn push(&mut self, entity: Entity) -> Result<(), DomainError> {
        if self.find(entity.name()).is_some() {
            return Err(DomainError::DuplicateEntity {
                name: entity.name().to_string(),
            });
        }
        self.entities.push(entity);
        Ok(())
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn find(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name() == name)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Array(self.entities.iter().map(Entity::to_value).collect())
    }
}

fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_alpha = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() && prev_alpha {
            out.push('-');
        }
        prev_alpha = c.is_ascii_alphabetic();
        out.push(c.to_ascii_lowercase());
    }
    out
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
