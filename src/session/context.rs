use std::collections::HashMap;

use serde_json::{Value, json};

use crate::bridge::queue::OperationQueue;
use crate::bridge::transport::{PropMap, Transport};
use crate::foundation::error::{WeftError, WeftResult};
use crate::layout::constraint::{ConstraintSpec, Selector};
use crate::layout::resolver::{self, LayoutQueue};
use crate::object::events::{EventKind, Notification, Subscription};
use crate::object::registry::{Handle, Registry};
use crate::object::tree::{Widget, WidgetBuilder};

/// Counters describing one [`Session::flush`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Operations handed to the transport.
    pub ops: usize,
    /// Composites whose constraints resolved completely.
    pub resolved: usize,
    /// Composites re-queued because a reference stayed unresolved.
    pub requeued: usize,
    /// Whether the batch went out as one bulk message.
    pub bulk: bool,
}

/// One active bridge session.
///
/// Owns the registry, the operation queue, the layout dirty queue, the
/// read cache and the transport — there is no ambient global state; tests
/// get isolation from [`Session::reset`] or simply a fresh session.
///
/// Everything here is single-threaded and cooperative: mutations happen
/// synchronously in the caller's turn, and host-pushed occurrences re-enter
/// through [`Session::dispatch`].
pub struct Session<T: Transport> {
    registry: Registry,
    queue: OperationQueue,
    layout: LayoutQueue,
    cache: HashMap<(Handle, String), Value>,
    subscriptions: Vec<Subscription>,
    next_subscription: u64,
    notifications: Vec<Notification>,
    transport: T,
}

impl<T: Transport> Session<T> {
    /// Open a session over the given transport.
    pub fn new(transport: T) -> Self {
        Self {
            registry: Registry::new(),
            queue: OperationQueue::new(),
            layout: LayoutQueue::default(),
            cache: HashMap::new(),
            subscriptions: Vec::new(),
            next_subscription: 1,
            notifications: Vec::new(),
            transport,
        }
    }

    /// Return the session to its just-constructed state. Handle numbering
    /// restarts at `$1`. Nothing is transported.
    pub fn reset(&mut self) {
        self.registry.reset();
        self.queue.clear();
        self.layout.clear();
        self.cache.clear();
        self.subscriptions.clear();
        self.next_subscription = 1;
        self.notifications.clear();
    }

    /// Shared access to the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    // ---- lifecycle ----------------------------------------------------

    /// Register a widget and buffer its `create` operation.
    pub fn create(&mut self, builder: WidgetBuilder) -> WeftResult<Handle> {
        let (widget, props) = builder.build()?;
        let kind = widget.kind().to_string();
        // Prime the cache so initial properties read back without a
        // transport round-trip, same as an explicit set.
        let handle = self.registry.register(widget);
        for (key, value) in &props {
            self.cache.insert((handle, key.clone()), value.clone());
        }
        self.queue.create(handle, &kind, props);
        Ok(handle)
    }

    /// Dispose a widget and its subtree.
    ///
    /// Dispose notifications fire pre-order (parent before children); the
    /// subtree then detaches from the tree and exactly one `destroy` is
    /// buffered, addressed to the subtree root — the host cascades
    /// destruction of descendants.
    pub fn dispose(&mut self, root: Handle) -> WeftResult<()> {
        self.registry.ensure_live(root)?;

        let mut subtree = Vec::new();
        self.collect_subtree(root, &mut subtree);
        for &handle in &subtree {
            self.notifications.push(Notification {
                target: handle,
                kind: EventKind::Dispose,
                data: None,
            });
        }

        // Only after all descendants are logically disposed does the root
        // detach from its own parent.
        let parent = self.registry.find(root).and_then(Widget::parent);
        if let Some(parent) = parent {
            if let Some(record) = self.registry.find_mut(parent) {
                record.remove_child(root);
            }
            self.notifications.push(Notification {
                target: parent,
                kind: EventKind::RemoveChild,
                data: Some(json!({ "child": root })),
            });
            self.mark_dirty(parent);
        }

        for &handle in &subtree {
            if handle != root {
                // The host cascades destruction; pending child operations
                // are moot once the root destroy goes out.
                self.queue.discard(handle);
            }
            self.layout.remove(handle);
            self.cache.retain(|(target, _), _| *target != handle);
            self.subscriptions.retain(|sub| sub.target != handle);
            self.registry.remove(handle);
        }
        self.queue.destroy(root);
        Ok(())
    }

    // ---- properties ---------------------------------------------------

    /// Buffer property updates. Values become visible to [`Session::get`]
    /// immediately, without a transport round-trip.
    pub fn set(&mut self, target: Handle, props: PropMap) -> WeftResult<()> {
        self.registry.ensure_live(target)?;
        for (key, value) in &props {
            self.cache.insert((target, key.clone()), value.clone());
        }
        self.queue.set(target, props);
        Ok(())
    }

    /// Read one property synchronously.
    ///
    /// A cached value (primed by a preceding `set` or an earlier read) is
    /// returned directly. Otherwise pending layout work and the operation
    /// queue are flushed first, then the transport is read and the result
    /// cached until the next flush.
    pub fn get(&mut self, target: Handle, property: &str) -> WeftResult<Value> {
        self.registry.ensure_live(target)?;
        if let Some(value) = self.cache.get(&(target, property.to_string())) {
            return Ok(value.clone());
        }
        self.flush()?;
        let value = self.transport.get(target, property);
        self.cache
            .insert((target, property.to_string()), value.clone());
        Ok(value)
    }

    /// Invoke a host method synchronously, flushing pending layout work and
    /// buffered operations first.
    pub fn call(&mut self, target: Handle, method: &str, args: PropMap) -> WeftResult<Value> {
        self.registry.ensure_live(target)?;
        self.flush()?;
        Ok(self.transport.call(target, method, &args))
    }

    // ---- events -------------------------------------------------------

    /// Subscribe to an event kind on a widget.
    ///
    /// The first subscriber to a native kind buffers `listen(.., true)`;
    /// removing the last buffers `listen(.., false)`.
    pub fn subscribe(&mut self, target: Handle, kind: EventKind) -> WeftResult<Subscription> {
        self.registry.ensure_live(target)?;
        let first = !self.is_subscribed(target, kind);
        let subscription = Subscription {
            id: self.next_subscription,
            target,
            kind,
        };
        self.next_subscription += 1;
        self.subscriptions.push(subscription);
        if first && kind.is_native() {
            self.queue.listen(target, kind.wire_name(), true);
        }
        Ok(subscription)
    }

    /// Cancel a subscription. Unknown or already-cancelled tokens are
    /// ignored.
    pub fn unsubscribe(&mut self, subscription: Subscription) {
        self.subscriptions.retain(|sub| sub.id != subscription.id);
        if subscription.kind.is_native()
            && self.registry.is_live(subscription.target)
            && !self.is_subscribed(subscription.target, subscription.kind)
        {
            self.queue
                .listen(subscription.target, subscription.kind.wire_name(), false);
        }
    }

    /// Re-entry point for host-pushed occurrences (gestures, resizes,
    /// pushed property changes). Delivered only if a subscription exists.
    pub fn dispatch(
        &mut self,
        target: Handle,
        kind: EventKind,
        data: Option<Value>,
    ) -> WeftResult<()> {
        self.registry.ensure_live(target)?;
        if self.is_subscribed(target, kind) {
            self.notifications.push(Notification { target, kind, data });
        }
        Ok(())
    }

    /// Drain all pending notifications, in delivery order.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn is_subscribed(&self, target: Handle, kind: EventKind) -> bool {
        self.subscriptions
            .iter()
            .any(|sub| sub.target == target && sub.kind == kind)
    }

    // ---- tree ---------------------------------------------------------

    /// Append a child at the end of a composite's child list.
    pub fn append(&mut self, parent: Handle, child: Handle) -> WeftResult<()> {
        self.set_parent(child, parent, None)
    }

    /// Insert `child` directly before `sibling` under the sibling's parent.
    pub fn insert_before(&mut self, child: Handle, sibling: Handle) -> WeftResult<()> {
        self.registry.ensure_live(sibling)?;
        if child == sibling {
            return Err(WeftError::validation(format!(
                "cannot insert {child} before itself"
            )));
        }
        let parent = self
            .registry
            .find(sibling)
            .and_then(Widget::parent)
            .ok_or_else(|| {
                WeftError::validation(format!("sibling {sibling} is not attached to a parent"))
            })?;
        // Compute the slot after the child's own unlink, in case both share
        // the parent already.
        let mut index = self
            .registry
            .find(parent)
            .and_then(|w| w.children().iter().position(|&h| h == sibling))
            .unwrap_or(0);
        if let Some(record) = self.registry.find(child) {
            if record.parent() == Some(parent) {
                let child_index = self
                    .registry
                    .find(parent)
                    .and_then(|w| w.children().iter().position(|&h| h == child));
                if let Some(child_index) = child_index {
                    if child_index < index {
                        index -= 1;
                    }
                }
            }
        }
        self.set_parent(child, parent, Some(index))
    }

    /// Link `child` under `new_parent` at `index` (appended when `None`).
    ///
    /// A currently-attached child is unlinked first: the old parent gets a
    /// [`EventKind::RemoveChild`] notification and is marked dirty. The new
    /// parent gets the child at the requested position, a buffered
    /// `set(child, {parent})` plus `call(new_parent, "insertChild", ..)`,
    /// an [`EventKind::AddChild`] notification, and a dirty mark.
    pub fn set_parent(
        &mut self,
        child: Handle,
        new_parent: Handle,
        index: Option<usize>,
    ) -> WeftResult<()> {
        self.registry.ensure_live(child)?;
        self.registry.ensure_live(new_parent)?;
        if child == new_parent {
            return Err(WeftError::validation(format!(
                "cannot attach {child} to itself"
            )));
        }
        let composite = self
            .registry
            .find(new_parent)
            .is_some_and(Widget::is_composite);
        if !composite {
            return Err(WeftError::validation(format!(
                "{new_parent} is not a composite and cannot hold children"
            )));
        }
        if self.is_ancestor(child, new_parent) {
            return Err(WeftError::validation(format!(
                "cannot attach {child} below its own descendant {new_parent}"
            )));
        }

        // Unlink from the current parent.
        let old_parent = self.registry.find(child).and_then(Widget::parent);
        if let Some(old_parent) = old_parent {
            if let Some(record) = self.registry.find_mut(old_parent) {
                record.remove_child(child);
            }
            self.notifications.push(Notification {
                target: old_parent,
                kind: EventKind::RemoveChild,
                data: Some(json!({ "child": child })),
            });
            self.mark_dirty(old_parent);
        }

        // Link under the new parent.
        let effective_index = match self.registry.find_mut(new_parent) {
            Some(record) => record.insert_child(index, child),
            None => 0,
        };
        if let Some(record) = self.registry.find_mut(child) {
            record.parent = Some(new_parent);
        }

        let mut props = PropMap::new();
        props.insert("parent".to_string(), json!(new_parent));
        self.queue.set(child, props);
        let mut args = PropMap::new();
        args.insert("child".to_string(), json!(child));
        args.insert("index".to_string(), json!(effective_index));
        self.queue.call(new_parent, "insertChild", args);

        self.notifications.push(Notification {
            target: new_parent,
            kind: EventKind::AddChild,
            data: Some(json!({ "child": child, "index": effective_index })),
        });
        self.mark_dirty(new_parent);
        Ok(())
    }

    /// Assign (or clear, with an empty spec) a child's declarative layout
    /// constraints and mark its parent for re-resolution.
    pub fn set_constraints(&mut self, target: Handle, spec: ConstraintSpec) -> WeftResult<()> {
        self.registry.ensure_live(target)?;
        let parent = match self.registry.find_mut(target) {
            Some(record) => {
                record.constraints = if spec.is_empty() { None } else { Some(spec) };
                record.parent
            }
            None => None,
        };
        if let Some(parent) = parent {
            self.mark_dirty(parent);
        }
        Ok(())
    }

    /// Current parent of a widget.
    pub fn parent_of(&self, target: Handle) -> Option<Handle> {
        self.registry.find(target).and_then(Widget::parent)
    }

    /// Ordered children of a widget.
    pub fn children_of(&self, target: Handle) -> Vec<Handle> {
        self.registry
            .find(target)
            .map(|record| record.children().to_vec())
            .unwrap_or_default()
    }

    /// Whether the handle maps to a live widget.
    pub fn is_live(&self, target: Handle) -> bool {
        self.registry.is_live(target)
    }

    /// Read access to a live widget record.
    pub fn widget(&self, target: Handle) -> Option<&Widget> {
        self.registry.find(target)
    }

    /// All descendants of `scope` matching `selector`, depth-first in
    /// child order. The scope itself is not considered.
    pub fn find_all(&self, scope: Handle, selector: &Selector) -> Vec<Handle> {
        let mut matches = Vec::new();
        let mut stack: Vec<Handle> = self
            .children_of(scope)
            .into_iter()
            .rev()
            .collect();
        while let Some(handle) = stack.pop() {
            if let Some(record) = self.registry.find(handle) {
                if selector.matches(record) {
                    matches.push(handle);
                }
                stack.extend(record.children().iter().rev().copied());
            }
        }
        matches
    }

    // ---- flush --------------------------------------------------------

    /// Drain the layout dirty queue, then the operation queue.
    ///
    /// Layout resolution runs to completion first because it buffers the
    /// `layoutData` sets that must travel in the same batch. Composites
    /// with unresolved references are re-queued for the next flush. The
    /// read cache is invalidated once the batch is transported.
    #[tracing::instrument(skip(self))]
    pub fn flush(&mut self) -> WeftResult<FlushStats> {
        let mut stats = FlushStats {
            bulk: self.transport.supports_bulk(),
            ..FlushStats::default()
        };

        if !self.layout.is_empty() {
            for parent in self.layout.take() {
                let has_children = self
                    .registry
                    .find(parent)
                    .is_some_and(|record| !record.children().is_empty());
                if !has_children {
                    continue;
                }
                let resolution = resolver::resolve_composite(&self.registry, parent);
                for (child, data) in resolution.sets {
                    let mut props = PropMap::new();
                    props.insert("layoutData".to_string(), data);
                    self.queue.set(child, props);
                }
                if resolution.incomplete {
                    self.layout.mark(parent);
                    stats.requeued += 1;
                } else {
                    stats.resolved += 1;
                }
            }
        }

        let ops = self.queue.drain();
        self.cache.clear();
        stats.ops = ops.len();
        if !ops.is_empty() {
            self.transport.flush(&ops);
        }
        Ok(stats)
    }

    // ---- internals ----------------------------------------------------

    /// Mark a composite for re-resolution. Only composites that currently
    /// have children belong in the dirty queue.
    fn mark_dirty(&mut self, target: Handle) {
        let qualifies = self
            .registry
            .find(target)
            .is_some_and(|record| record.is_composite() && !record.children().is_empty());
        if qualifies {
            self.layout.mark(target);
        } else {
            self.layout.remove(target);
        }
    }

    /// Whether `other` is `root` itself or sits below it in the tree.
    fn is_ancestor(&self, root: Handle, other: Handle) -> bool {
        let mut cursor = Some(other);
        while let Some(handle) = cursor {
            if handle == root {
                return true;
            }
            cursor = self.registry.find(handle).and_then(Widget::parent);
        }
        false
    }

    fn collect_subtree(&self, root: Handle, out: &mut Vec<Handle>) {
        out.push(root);
        if let Some(record) = self.registry.find(root) {
            for &child in record.children() {
                self.collect_subtree(child, out);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/context.rs"]
mod tests;
