use crate::bridge::transport::PropMap;
use crate::foundation::error::{WeftError, WeftResult};
use crate::layout::constraint::ConstraintSpec;
use crate::object::registry::Handle;

#[derive(Clone, Debug)]
/// Registry-owned record for one proxy object.
///
/// The tree is an arena: a widget stores its parent id and an ordered list
/// of child ids, and all traversal goes through the [`crate::Registry`].
/// Widgets never hold direct references to each other.
pub struct Widget {
    pub(crate) kind: String,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) composite: bool,
    pub(crate) parent: Option<Handle>,
    pub(crate) children: Vec<Handle>,
    pub(crate) constraints: Option<ConstraintSpec>,
}

impl Widget {
    pub(crate) fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: None,
            classes: Vec::new(),
            composite: false,
            parent: None,
            children: Vec::new(),
            constraints: None,
        }
    }

    /// Host-side widget type name this proxy stands in for.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Selector id, matched by `#id` references.
    pub fn selector_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Selector classes, matched by `.class` references.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Whether this widget may hold children.
    pub fn is_composite(&self) -> bool {
        self.composite
    }

    /// Current parent, if attached.
    pub fn parent(&self) -> Option<Handle> {
        self.parent
    }

    /// Ordered child handles.
    pub fn children(&self) -> &[Handle] {
        &self.children
    }

    /// Declarative layout constraints, if any were assigned.
    pub fn constraints(&self) -> Option<&ConstraintSpec> {
        self.constraints.as_ref()
    }

    /// Insert `child` at `index`, clamped to the current child count.
    /// Returns the effective index.
    pub(crate) fn insert_child(&mut self, index: Option<usize>, child: Handle) -> usize {
        let index = index.unwrap_or(self.children.len()).min(self.children.len());
        self.children.insert(index, child);
        index
    }

    /// Unlink `child` from the ordered child list, returning its position.
    pub(crate) fn remove_child(&mut self, child: Handle) -> Option<usize> {
        let position = self.children.iter().position(|&h| h == child)?;
        self.children.remove(position);
        Some(position)
    }
}

/// Builder for a widget record and its initial property map.
///
/// Consumed by [`crate::Session::create`], which registers the record and
/// buffers the bridge `create` operation carrying the initial properties.
pub struct WidgetBuilder {
    kind: String,
    id: Option<String>,
    classes: Vec<String>,
    composite: bool,
    props: PropMap,
    constraints: Option<ConstraintSpec>,
}

impl WidgetBuilder {
    /// Start a builder for a leaf widget of the given host type.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: None,
            classes: Vec::new(),
            composite: false,
            props: PropMap::new(),
            constraints: None,
        }
    }

    /// Start a builder for a composite (child-bearing) widget.
    pub fn composite(kind: impl Into<String>) -> Self {
        let mut builder = Self::new(kind);
        builder.composite = true;
        builder
    }

    /// Assign the selector id matched by `#id` references.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a selector class matched by `.class` references.
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Add one initial property.
    pub fn prop(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Merge a map of initial properties (last write wins per key).
    pub fn props(mut self, props: PropMap) -> Self {
        self.props.extend(props);
        self
    }

    /// Assign declarative layout constraints.
    pub fn constraints(mut self, spec: ConstraintSpec) -> Self {
        self.constraints = Some(spec);
        self
    }

    /// Validate and split into the widget record and its initial properties.
    pub fn build(self) -> WeftResult<(Widget, PropMap)> {
        if self.kind.trim().is_empty() {
            return Err(WeftError::validation("widget kind must be non-empty"));
        }
        let mut widget = Widget::new(self.kind);
        widget.id = self.id;
        widget.classes = self.classes;
        widget.composite = self.composite;
        widget.constraints = self.constraints;
        Ok((widget, self.props))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/object/tree.rs"]
mod tests;
