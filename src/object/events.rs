use serde_json::Value;

use crate::object::registry::Handle;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "camelCase")]
/// Closed set of event kinds a widget can emit.
///
/// Structural kinds fire locally from tree mutations. Native kinds originate
/// in the host; subscribing to one toggles the bridge `listen` operation for
/// the widget, and occurrences re-enter through [`crate::Session::dispatch`].
pub enum EventKind {
    /// A child was linked into a composite.
    AddChild,
    /// A child was unlinked from a composite.
    RemoveChild,
    /// The widget was disposed.
    Dispose,
    /// Host gesture: tap.
    Tap,
    /// Host gesture: long press.
    LongPress,
    /// The rendered bounds changed.
    Resize,
    /// The widget gained input focus.
    Focus,
    /// The widget lost input focus.
    Blur,
}

impl EventKind {
    /// Event name used on the wire for `listen` operations.
    pub fn wire_name(self) -> &'static str {
        match self {
            EventKind::AddChild => "addChild",
            EventKind::RemoveChild => "removeChild",
            EventKind::Dispose => "dispose",
            EventKind::Tap => "tap",
            EventKind::LongPress => "longPress",
            EventKind::Resize => "resize",
            EventKind::Focus => "focus",
            EventKind::Blur => "blur",
        }
    }

    /// Whether occurrences of this kind are produced by the host renderer.
    pub fn is_native(self) -> bool {
        matches!(
            self,
            EventKind::Tap
                | EventKind::LongPress
                | EventKind::Resize
                | EventKind::Focus
                | EventKind::Blur
        )
    }
}

/// Cancellation token returned by [`crate::Session::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subscription {
    pub(crate) id: u64,
    pub(crate) target: Handle,
    pub(crate) kind: EventKind,
}

impl Subscription {
    /// Widget the subscription is attached to.
    pub fn target(self) -> Handle {
        self.target
    }

    /// Subscribed event kind.
    pub fn kind(self) -> EventKind {
        self.kind
    }
}

#[derive(Clone, Debug, serde::Serialize)]
/// One delivered event occurrence, drained via
/// [`crate::Session::take_notifications`].
pub struct Notification {
    /// Widget the event fired on.
    pub target: Handle,
    /// Event kind.
    pub kind: EventKind,
    /// Event payload, if the source carried one.
    pub data: Option<Value>,
}

#[cfg(test)]
#[path = "../../tests/unit/object/events.rs"]
mod tests;
