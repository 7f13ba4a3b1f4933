use std::collections::HashMap;

use crate::bridge::transport::{PropMap, WireOp};
use crate::object::registry::Handle;

#[derive(Debug, Default)]
struct PendingOps {
    create: Option<(String, PropMap)>,
    listens: Vec<(String, bool)>,
    sets: PropMap,
    calls: Vec<(String, PropMap)>,
    destroy: bool,
}

impl PendingOps {
    fn is_empty(&self) -> bool {
        self.create.is_none()
            && self.listens.is_empty()
            && self.sets.is_empty()
            && self.calls.is_empty()
            && !self.destroy
    }
}

/// Ordered buffer of pending bridge operations.
///
/// Operations are grouped by target handle. Groups drain in first-seen
/// handle order; within a group the drain order is create, listen, set,
/// call, destroy. Sets targeting the same handle merge last-write-wins per
/// property key, and a set issued while the handle's create is still
/// buffered folds into the create's initial properties.
#[derive(Debug, Default)]
pub struct OperationQueue {
    groups: HashMap<Handle, PendingOps>,
    order: Vec<Handle>,
}

impl OperationQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    fn group(&mut self, target: Handle) -> &mut PendingOps {
        let order = &mut self.order;
        self.groups.entry(target).or_insert_with(|| {
            order.push(target);
            PendingOps::default()
        })
    }

    /// Buffer a `create` carrying the initial properties.
    pub fn create(&mut self, target: Handle, kind: &str, props: PropMap) {
        let group = self.group(target);
        group.create = Some((kind.to_string(), props));
    }

    /// Buffer a `set`, merging into the pending create or set map.
    pub fn set(&mut self, target: Handle, props: PropMap) {
        let group = self.group(target);
        match &mut group.create {
            Some((_, initial)) => initial.extend(props),
            None => group.sets.extend(props),
        }
    }

    /// Buffer a `listen` toggle. A later toggle for the same event replaces
    /// the earlier one.
    pub fn listen(&mut self, target: Handle, event: &str, enabled: bool) {
        let group = self.group(target);
        match group.listens.iter_mut().find(|(name, _)| name == event) {
            Some(entry) => entry.1 = enabled,
            None => group.listens.push((event.to_string(), enabled)),
        }
    }

    /// Buffer a method invocation. Calls are never merged.
    pub fn call(&mut self, target: Handle, method: &str, args: PropMap) {
        self.group(target).calls.push((method.to_string(), args));
    }

    /// Buffer a `destroy`. It drains after every other pending operation on
    /// the handle.
    pub fn destroy(&mut self, target: Handle) {
        self.group(target).destroy = true;
    }

    /// Drop every pending operation addressed to `target`.
    pub fn discard(&mut self, target: Handle) {
        self.groups.remove(&target);
    }

    /// Whether any operation is pending.
    pub fn is_empty(&self) -> bool {
        self.groups.values().all(PendingOps::is_empty)
    }

    /// Drain the buffer into transport order.
    pub fn drain(&mut self) -> Vec<WireOp> {
        let mut ops = Vec::new();
        for target in std::mem::take(&mut self.order) {
            let Some(group) = self.groups.remove(&target) else {
                continue;
            };
            if let Some((kind, props)) = group.create {
                ops.push(WireOp::Create {
                    target,
                    kind,
                    props,
                });
            }
            for (event, enabled) in group.listens {
                ops.push(WireOp::Listen {
                    target,
                    event,
                    enabled,
                });
            }
            if !group.sets.is_empty() {
                ops.push(WireOp::Set {
                    target,
                    props: group.sets,
                });
            }
            for (method, args) in group.calls {
                ops.push(WireOp::Call {
                    target,
                    method,
                    args,
                });
            }
            if group.destroy {
                ops.push(WireOp::Destroy { target });
            }
        }
        ops
    }

    /// Drop all pending operations and forget the handle order.
    pub fn clear(&mut self) {
        self.groups.clear();
        self.order.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bridge/queue.rs"]
mod tests;
