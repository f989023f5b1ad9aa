pub mod model;
pub mod rule;
pub mod selector;

pub use model::{ContentModel, Entity, Property};
pub use rule::{CommandSpec, Dimension, PathMapping, Rule, TemplateOutput, WILDCARD, ZipSpec};
pub use selector::{Attribute, PropertyRef, Selector};
