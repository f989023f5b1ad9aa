//! Ports: named extension points resolved through the rule cascade.
//!
//! ```text
//! Port::invoke(ctx, "model", Entity(User))
//!   └─ open ──► kind = Entity, params = {item, entity}
//!   └─ get_rule ──► cascade("model").search(selector)
//!   └─ registry[rule.worker].run(call)        (side effects + commit)
//!
//! Port::render(ctx, "field-type", Property(User.email))
//!   └─ same resolution
//!   └─ registry[rule.worker].render(call)     (text only)
//! ```
//!
//! Both paths push `port for selector` onto the context's dispatch stack
//! first. Reaching the same pair again while it is still on the stack is a
//! `DispatchCycle`.

use crate::application::ApplicationError;
use crate::application::context::ExecutionContext;
use crate::application::worker::{DispatchMode, Worker, WorkerCall};
use crate::domain::{DomainError, Entity, PropertyRef, Rule, Selector};
use crate::error::PotterResult;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, debug_span};

/// How a port is specialized by its selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    Generic,
    Entity,
    Property,
}

/// The parameter bag a port attaches to its resolved rule.
///
/// Generic ports carry `{item}`, entity ports `{item, entity}`, property
/// ports `{item, property}`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortParams<'a> {
    pub item: Selector<'a>,
    pub entity: Option<&'a Entity>,
    pub property: Option<PropertyRef<'a>>,
}

impl PortParams<'_> {
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("item".into(), self.item.to_value());
        if let Some(entity) = self.entity {
            map.insert("entity".into(), entity.to_value());
        }
        if let Some(property) = self.property {
            map.insert("property".into(), property.to_value());
        }
        map
    }
}

/// A rule together with the parameters of the port that resolved it.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedRule<'a> {
    pub rule: &'a Rule,
    pub params: PortParams<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct Port<'a> {
    name: &'a str,
    selector: Selector<'a>,
}

impl<'a> Port<'a> {
    /// Open `name` for `selector`; the selector's variant decides the kind.
    pub fn open(name: &'a str, selector: Selector<'a>) -> Self {
        Self { name, selector }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn selector(&self) -> Selector<'a> {
        self.selector
    }

    pub fn kind(&self) -> PortKind {
        match self.selector {
            Selector::None => PortKind::Generic,
            Selector::Entity(_) => PortKind::Entity,
            Selector::Property(_) => PortKind::Property,
        }
    }

    pub fn params(&self) -> PortParams<'a> {
        let (entity, property) = match self.selector {
            Selector::None => (None, None),
            Selector::Entity(e) => (Some(e), None),
            Selector::Property(p) => (None, Some(p)),
        };
        PortParams {
            item: self.selector,
            entity,
            property,
        }
    }

    /// Resolve this port's rule in `ctx` and attach the parameter bag.
    pub fn get_rule(&self, ctx: &'a ExecutionContext) -> Option<ResolvedRule<'a>> {
        ctx.rule(self.name, &self.selector).map(|rule| ResolvedRule {
            rule,
            params: self.params(),
        })
    }

    /// Side-effecting dispatch: resolve, look up the worker, `run` it.
    pub fn invoke(
        ctx: &'a ExecutionContext,
        name: &'a str,
        selector: Selector<'a>,
    ) -> PotterResult<()> {
        let _span = debug_span!("invoke", port = name, %selector).entered();
        let _active = ctx.enter_port(name, &selector)?;
        let (worker, call) = Self::open(name, selector).prepare(ctx, None)?;
        worker.run(&call)
    }

    /// Pure dispatch: same resolution, returns the worker's `render` output.
    ///
    /// Nested ports reached from the returned call also take this path, so
    /// rendering never writes files.
    pub fn render(
        ctx: &'a ExecutionContext,
        name: &'a str,
        selector: Selector<'a>,
    ) -> PotterResult<String> {
        let _span = debug_span!("render", port = name, %selector).entered();
        let _active = ctx.enter_port(name, &selector)?;
        let (worker, call) = Self::open(name, selector).prepare(ctx, Some(DispatchMode::Render))?;
        worker.render(&call)
    }

    fn prepare(
        &self,
        ctx: &'a ExecutionContext,
        forced: Option<DispatchMode>,
    ) -> PotterResult<(&'a Arc<dyn Worker>, WorkerCall<'a>)> {
        let resolved = self
            .get_rule(ctx)
            .ok_or_else(|| DomainError::NoMatchingRule {
                port: self.name.to_string(),
                selector: self.selector.to_string(),
            })?;

        let worker_name = resolved.rule.worker_name();
        let worker = ctx
            .workers()
            .get(worker_name)
            .ok_or_else(|| ApplicationError::UnknownWorker {
                name: worker_name.to_string(),
                port: self.name.to_string(),
            })?;

        ctx.record_dispatch();
        let mode = forced.unwrap_or_else(|| worker.mode());
        debug!(worker = worker_name, ?mode, kind = ?self.kind(), "dispatching");

        Ok((worker, WorkerCall::new(ctx, self.name, resolved, mode)))
    }
}
