//! The rule cascade: per-port specificity index over five selector dimensions.
//!
//! ```text
//! level ─┬─ entity ── propertyType ── cardinality ── propertyName ── tag ─► Rule
//!        │   "User"      "string"          "*"             "*"        "*"
//!        │   "*"  ...
//! ```
//!
//! Every layer is keyed by an attribute value or the wildcard `*`. A rule
//! that leaves a dimension unset is stored under `*` for it. Resolution walks
//! the same dimensions in the same order, trying the selector's specific key
//! before the wildcard at every layer, and backtracking into the wildcard
//! branch when the specific branch dead-ends further down.

use crate::domain::entities::rule::{Dimension, Rule, WILDCARD};
use crate::domain::entities::selector::{Attribute, Selector};
use crate::domain::value_objects::Level;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};

const LAST: usize = Dimension::ORDER.len() - 1;

#[derive(Debug, Clone, Default)]
struct Layer {
    branches: HashMap<String, Layer>,
    /// Populated only at the last dimension.
    rules: HashMap<String, Rule>,
}

impl Layer {
    fn has_key(&self, depth: usize, key: &str) -> bool {
        if depth == LAST {
            self.rules.contains_key(key)
        } else {
            self.branches.contains_key(key)
        }
    }

    fn len(&self) -> usize {
        self.rules.len() + self.branches.values().map(Layer::len).sum::<usize>()
    }
}

/// All rules registered for one port, grouped by level.
#[derive(Debug, Clone, Default)]
pub struct RuleCascade {
    levels: BTreeMap<Level, Layer>,
}

impl RuleCascade {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a rule at `level`.
    ///
    /// The rule's worker is resolved (inferred if absent) before it is
    /// stored. A rule with the same full key at the same level replaces the
    /// previous one.
    pub fn add(&mut self, level: Level, mut rule: Rule) {
        rule.ensure_worker();

        let mut layer = self.levels.entry(level).or_default();
        for dimension in &Dimension::ORDER[..LAST] {
            layer = layer
                .branches
                .entry(rule.key(*dimension).to_string())
                .or_default();
        }

        let key = rule.key(Dimension::ORDER[LAST]).to_string();
        if let Some(previous) = layer.rules.insert(key, rule) {
            trace!(port = %previous.port, %level, "rule replaced by later rule with identical key");
        }
    }

    /// Most specific rule for `selector`, trying `Local` then `Generator`.
    ///
    /// API-level rules are indexed but not part of this chain; use
    /// [`search_at`](Self::search_at) to inspect them.
    pub fn search(&self, selector: &Selector<'_>) -> Option<&Rule> {
        for level in Level::RESOLUTION_ORDER {
            if let Some(rule) = self.search_at(level, selector) {
                debug!(port = %rule.port, %level, %selector, worker = rule.worker_name(), "rule resolved");
                return Some(rule);
            }
        }

        if self.levels.contains_key(&Level::Api) {
            debug!(%selector, "only api-level rules present; not consulted by resolution");
        }
        None
    }

    /// Most specific rule for `selector` within a single level.
    pub fn search_at(&self, level: Level, selector: &Selector<'_>) -> Option<&Rule> {
        self.levels
            .get(&level)
            .and_then(|root| search_layer(root, selector, 0))
    }

    /// Levels that contributed at least one rule.
    pub fn levels(&self) -> impl Iterator<Item = Level> + '_ {
        self.levels.keys().copied()
    }

    /// Number of distinct rules stored (after overwrites).
    pub fn len(&self) -> usize {
        self.levels.values().map(Layer::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn search_layer<'r>(layer: &'r Layer, selector: &Selector<'_>, depth: usize) -> Option<&'r Rule> {
    let dimension = Dimension::ORDER[depth];
    let specific = specific_key(layer, selector.attribute(dimension), depth);

    for key in specific.into_iter().chain(std::iter::once(WILDCARD)) {
        let found = if depth == LAST {
            layer.rules.get(key)
        } else {
            layer
                .branches
                .get(key)
                .and_then(|next| search_layer(next, selector, depth + 1))
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

/// The selector's key for this layer, if it has one distinct from `*`.
fn specific_key<'s>(layer: &Layer, attribute: Attribute<'s>, depth: usize) -> Option<&'s str> {
    let key = match attribute {
        Attribute::Absent => None,
        Attribute::Value(value) => Some(value),
        Attribute::Values(values) => values
            .iter()
            .map(String::as_str)
            .find(|v| layer.has_key(depth, v)),
    };
    key.filter(|k| *k != WILDCARD)
}
