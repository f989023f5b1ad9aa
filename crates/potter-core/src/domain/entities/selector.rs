use super::model::{Entity, Property};
use super::rule::Dimension;
use serde_json::Value;
use std::fmt;

/// A property together with the entity that owns it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyRef<'a> {
    pub entity: &'a Entity,
    pub property: &'a Property,
}

impl<'a> PropertyRef<'a> {
    pub fn new(entity: &'a Entity, property: &'a Property) -> Self {
        Self { entity, property }
    }

    pub fn to_value(&self) -> Value {
        self.property.to_value_with_owner(self.entity)
    }
}

/// The item a port is opened for.
///
/// Resolution and port specialization match on this variant; nothing
/// inspects type names at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Selector<'a> {
    #[default]
    None,
    Entity(&'a Entity),
    Property(PropertyRef<'a>),
}

/// What a selector offers for one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute<'a> {
    Absent,
    Value(&'a str),
    /// A collection; the first member with a branch at the layer is used.
    Values(&'a [String]),
}

impl<'a> Selector<'a> {
    pub fn property(entity: &'a Entity, property: &'a Property) -> Self {
        Self::Property(PropertyRef::new(entity, property))
    }

    /// The selector's attribute for `dimension`.
    ///
    /// The entity dimension of a property is its owning entity's name.
    pub fn attribute(&self, dimension: Dimension) -> Attribute<'a> {
        let value = match (*self, dimension) {
            (Self::None, _) => None,
            (Self::Entity(e), Dimension::Entity) => Some(e.name()),
            (Self::Entity(e), Dimension::Tag) => return Attribute::Values(e.tags()),
            (Self::Entity(_), _) => None,
            (Self::Property(p), Dimension::Entity) => Some(p.entity.name()),
            (Self::Property(p), Dimension::PropertyType) => p.property.kind(),
            (Self::Property(p), Dimension::Cardinality) => p.property.cardinality(),
            (Self::Property(p), Dimension::PropertyName) => Some(p.property.name()),
            (Self::Property(p), Dimension::Tag) => return Attribute::Values(p.property.tags()),
        };
        match value {
            Some(v) if !v.is_empty() => Attribute::Value(v),
            _ => Attribute::Absent,
        }
    }

    pub fn entity(&self) -> Option<&'a Entity> {
        match *self {
            Self::Entity(e) => Some(e),
            _ => None,
        }
    }

    pub fn property_ref(&self) -> Option<PropertyRef<'a>> {
        match *self {
            Self::Property(p) => Some(p),
            _ => None,
        }
    }

    /// The entity this selector belongs to: itself, or a property's owner.
    pub fn owning_entity(&self) -> Option<&'a Entity> {
        match *self {
            Self::None => None,
            Self::Entity(e) => Some(e),
            Self::Property(p) => Some(p.entity),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// JSON view for templates; `null` for [`Selector::None`].
    pub fn to_value(&self) -> Value {
        match self {
            Self::None => Value::Null,
            Self::Entity(e) => e.to_value(),
            Self::Property(p) => p.to_value(),
        }
    }
}

impl fmt::Display for Selector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("<none>"),
            Self::Entity(e) => write!(f, "entity '{}'", e.name()),
            Self::Property(p) => write!(f, "property '{}.{}'", p.entity.name(), p.property.name()),
        }
    }
}
