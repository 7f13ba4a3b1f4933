use std::collections::BTreeSet;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::layout::constraint::{Axis, Constraint, ConstraintKey, Reference};
use crate::object::registry::{Handle, Registry};

/// Set of composite handles awaiting constraint re-resolution.
///
/// Pure set semantics: marking an already-dirty composite is a no-op and
/// insertion order is irrelevant.
#[derive(Debug, Default)]
pub(crate) struct LayoutQueue {
    dirty: BTreeSet<Handle>,
}

impl LayoutQueue {
    pub(crate) fn mark(&mut self, handle: Handle) {
        self.dirty.insert(handle);
    }

    pub(crate) fn remove(&mut self, handle: Handle) {
        self.dirty.remove(&handle);
    }

    pub(crate) fn take(&mut self) -> BTreeSet<Handle> {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.dirty.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.dirty.clear();
    }
}

/// A constraint value after reference resolution.
///
/// References are replaced by concrete sibling handles, or by the neutral
/// placeholder offset `0` when they cannot be resolved yet.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolvedConstraint {
    /// Absolute offset.
    Offset(f64),
    /// Canonical percentage form.
    Percent {
        /// Percentage part.
        percent: f64,
        /// Offset part.
        offset: f64,
    },
    /// Concrete sibling anchor.
    Sibling {
        /// Resolved sibling handle.
        target: Handle,
        /// Offset part.
        offset: f64,
    },
}

impl ResolvedConstraint {
    /// Canonical wire form: a number, `"p%"`, `"$n"`, or `[anchor, offset]`
    /// when the offset is non-zero.
    pub fn to_value(&self) -> Value {
        match self {
            ResolvedConstraint::Offset(offset) => number(*offset),
            ResolvedConstraint::Percent { percent, offset } => {
                let anchor = Value::String(format!("{percent}%"));
                if *offset == 0.0 {
                    anchor
                } else {
                    Value::Array(vec![anchor, number(*offset)])
                }
            }
            ResolvedConstraint::Sibling { target, offset } => {
                let anchor = Value::String(target.to_string());
                if *offset == 0.0 {
                    anchor
                } else {
                    Value::Array(vec![anchor, number(*offset)])
                }
            }
        }
    }
}

impl Serialize for ResolvedConstraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

fn number(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Outcome of resolving one dirty composite.
#[derive(Debug, Default)]
pub(crate) struct Resolution {
    /// Per-child resolved `layoutData` values, in child order.
    pub(crate) sets: Vec<(Handle, Value)>,
    /// Whether at least one reference stayed unresolved and the composite
    /// must be re-queued.
    pub(crate) incomplete: bool,
}

/// Resolve the constraints of every constrained child of `parent`.
///
/// Runs once per dirty composite at flush time. Never fails: unresolved
/// references degrade to the placeholder offset `0` (pairs keep their
/// offset) and flag the resolution as incomplete.
pub(crate) fn resolve_composite(registry: &Registry, parent: Handle) -> Resolution {
    let Some(composite) = registry.find(parent) else {
        return Resolution::default();
    };
    let children: Vec<Handle> = composite.children().to_vec();

    let mut resolution = Resolution::default();
    for &child in &children {
        let Some(record) = registry.find(child) else {
            continue;
        };
        let Some(spec) = record.constraints() else {
            continue;
        };

        let mut data = serde_json::Map::new();
        for (key, constraint) in trim_axes(spec.entries(), parent, child) {
            let resolved = match resolve_value(registry, &children, child, constraint) {
                Ok(value) => value,
                Err(unresolved) => {
                    tracing::debug!(
                        parent = %parent,
                        child = %child,
                        key = key.name(),
                        reference = %unresolved.reference,
                        "layout reference not resolvable yet; substituting placeholder"
                    );
                    resolution.incomplete = true;
                    ResolvedConstraint::Offset(unresolved.offset)
                }
            };
            data.insert(key.name().to_string(), resolved.to_value());
        }
        resolution.sets.push((child, Value::Object(data)));
    }
    resolution
}

// Unresolved reference, degraded to its offset part.
struct Unresolved {
    reference: Reference,
    offset: f64,
}

fn resolve_value(
    registry: &Registry,
    siblings: &[Handle],
    child: Handle,
    constraint: &Constraint,
) -> Result<ResolvedConstraint, Unresolved> {
    match constraint {
        Constraint::Offset(offset) => Ok(ResolvedConstraint::Offset(*offset)),
        Constraint::Percent(percent) => Ok(ResolvedConstraint::Percent {
            percent: *percent,
            offset: 0.0,
        }),
        Constraint::PercentOffset { percent, offset } => Ok(ResolvedConstraint::Percent {
            percent: *percent,
            offset: *offset,
        }),
        Constraint::Reference(reference) => resolve_reference(registry, siblings, child, reference)
            .map(|target| ResolvedConstraint::Sibling {
                target,
                offset: 0.0,
            })
            .ok_or_else(|| Unresolved {
                reference: reference.clone(),
                offset: 0.0,
            }),
        Constraint::ReferenceOffset { reference, offset } => {
            resolve_reference(registry, siblings, child, reference)
                .map(|target| ResolvedConstraint::Sibling {
                    target,
                    offset: *offset,
                })
                .ok_or_else(|| Unresolved {
                    reference: reference.clone(),
                    offset: *offset,
                })
        }
    }
}

/// Resolve a reference against the current sibling set of `child`, in
/// child order. The child itself never matches.
fn resolve_reference(
    registry: &Registry,
    siblings: &[Handle],
    child: Handle,
    reference: &Reference,
) -> Option<Handle> {
    match reference {
        Reference::Widget(handle) => siblings
            .iter()
            .find(|&&h| h == *handle && h != child)
            .copied(),
        Reference::Selector(selector) => siblings.iter().copied().find(|&h| {
            h != child
                && registry
                    .find(h)
                    .is_some_and(|widget| selector.matches(widget))
        }),
    }
}

/// Enforce the two-constraints-per-axis limit.
///
/// When more than two constraints share an axis, the two with the highest
/// precedence (left > right > width > centerX; top > bottom > height >
/// centerY > baseline) are kept, the rest are dropped, and one warning is
/// emitted per over-specified axis. Never an error.
fn trim_axes(
    entries: Vec<(ConstraintKey, &Constraint)>,
    parent: Handle,
    child: Handle,
) -> Vec<(ConstraintKey, &Constraint)> {
    let mut dropped: Vec<ConstraintKey> = Vec::new();
    for axis in [Axis::Horizontal, Axis::Vertical] {
        let mut on_axis: Vec<ConstraintKey> = entries
            .iter()
            .map(|(key, _)| *key)
            .filter(|key| key.axis() == axis)
            .collect();
        if on_axis.len() <= 2 {
            continue;
        }
        on_axis.sort_by_key(|key| key.precedence());
        let cut: Vec<&'static str> = on_axis[2..].iter().map(|key| key.name()).collect();
        tracing::warn!(
            parent = %parent,
            child = %child,
            axis = axis.name(),
            dropped = ?cut,
            "over-specified constraint axis; keeping the two highest-precedence entries"
        );
        dropped.extend_from_slice(&on_axis[2..]);
    }
    entries
        .into_iter()
        .filter(|(key, _)| !dropped.contains(key))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/layout/resolver.rs"]
mod tests;
