use crate::domain::entities::{ContentModel, Rule, WILDCARD};
use crate::domain::error::DomainError;
use crate::domain::value_objects::worker_names;

/// Centralized domain validation.
///
/// Checks here are structural: they run when documents are loaded, before
/// anything is indexed. Payload fields that only matter on the side-effecting
/// path (such as `output`) are checked by the worker that needs them.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_rule(rule: &Rule) -> Result<(), DomainError> {
        if rule.port.trim().is_empty() {
            return Err(DomainError::MissingRuleField {
                port: rule.port.clone(),
                field: "port",
            });
        }

        let dimensions = [
            &rule.entity,
            &rule.property_type,
            &rule.cardinality,
            &rule.property_name,
            &rule.tag,
        ];
        if dimensions
            .iter()
            .any(|d| d.as_deref().is_some_and(|v| v.trim().is_empty()))
        {
            return Err(DomainError::InvalidRule(format!(
                "rule for port '{}' has an empty selector value; omit it or use '{}'",
                rule.port, WILDCARD
            )));
        }

        if let Some(chain) = &rule.chain {
            if chain.iter().any(|p| p.trim().is_empty()) {
                return Err(DomainError::InvalidRule(format!(
                    "chain of port '{}' contains an empty port name",
                    rule.port
                )));
            }
            if chain.iter().any(|p| *p == rule.port) {
                return Err(DomainError::InvalidRule(format!(
                    "port '{}' chains to itself",
                    rule.port
                )));
            }
        }

        if rule.worker.as_deref() == Some(worker_names::CMD) && rule.cmd.is_none() {
            return Err(DomainError::MissingRuleField {
                port: rule.port.clone(),
                field: "cmd",
            });
        }

        Ok(())
    }

    pub fn validate_model(model: &ContentModel) -> Result<(), DomainError> {
        for entity in model.entities() {
            if entity.name().trim().is_empty() {
                return Err(DomainError::InvalidMetadata(
                    "entity with an empty name".into(),
                ));
            }
            let mut seen = std::collections::HashSet::new();
            for property in entity.properties() {
                if !seen.insert(property.name()) {
                    return Err(DomainError::InvalidMetadata(format!(
                        "property '{}' declared twice on '{}'",
                        property.name(),
                        entity.name()
                    )));
                }
            }
        }
        Ok(())
    }
}
