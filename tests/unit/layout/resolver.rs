use super::*;

use serde_json::json;

use crate::layout::constraint::{Constraint, ConstraintSpec, Selector};
use crate::object::tree::Widget;

fn composite(registry: &mut Registry) -> Handle {
    let mut widget = Widget::new("Composite");
    widget.composite = true;
    registry.register(widget)
}

fn attach(registry: &mut Registry, parent: Handle, mut widget: Widget) -> Handle {
    widget.parent = Some(parent);
    let child = registry.register(widget);
    if let Some(record) = registry.find_mut(parent) {
        record.insert_child(None, child);
    }
    child
}

fn constrained(kind: &str, spec: ConstraintSpec) -> Widget {
    let mut widget = Widget::new(kind);
    widget.constraints = Some(spec);
    widget
}

#[test]
fn numbers_and_percentages_pass_through() {
    let mut registry = Registry::new();
    let parent = composite(&mut registry);
    let spec = ConstraintSpec::new()
        .left(10)
        .top(Constraint::percent(25.0))
        .width(Constraint::percent_offset(50.0, -8.0));
    let child = attach(&mut registry, parent, constrained("Button", spec));

    let resolution = resolve_composite(&registry, parent);
    assert!(!resolution.incomplete);
    assert_eq!(
        resolution.sets,
        vec![(
            child,
            json!({ "left": 10.0, "top": "25%", "width": ["50%", -8.0] })
        )]
    );
}

#[test]
fn references_resolve_against_siblings() {
    let mut registry = Registry::new();
    let parent = composite(&mut registry);

    let mut anchor = Widget::new("TextView");
    anchor.id = Some("label".to_string());
    let anchor = attach(&mut registry, parent, anchor);

    let spec = ConstraintSpec::new()
        .left(Constraint::anchored(Selector::Id("label".to_string()), 10.0))
        .top(Constraint::widget(anchor))
        .baseline(Constraint::selector("TextView").unwrap());
    let child = attach(&mut registry, parent, constrained("Button", spec));

    let resolution = resolve_composite(&registry, parent);
    assert!(!resolution.incomplete);
    assert_eq!(
        resolution.sets,
        vec![(
            child,
            json!({
                "left": ["$2", 10.0],
                "top": "$2",
                "baseline": "$2",
            })
        )]
    );
}

#[test]
fn unresolved_reference_degrades_to_placeholder() {
    let mut registry = Registry::new();
    let parent = composite(&mut registry);
    let spec = ConstraintSpec::new()
        .left(Constraint::anchored(Selector::Id("missing".to_string()), 10.0))
        .top(Constraint::selector("#missing").unwrap());
    let child = attach(&mut registry, parent, constrained("Button", spec));

    let resolution = resolve_composite(&registry, parent);
    assert!(resolution.incomplete);
    // The pair keeps its offset; the bare reference becomes 0.
    assert_eq!(
        resolution.sets,
        vec![(child, json!({ "left": 10.0, "top": 0.0 }))]
    );
}

#[test]
fn a_widget_never_matches_itself() {
    let mut registry = Registry::new();
    let parent = composite(&mut registry);
    let spec = ConstraintSpec::new().left(Constraint::selector("Button").unwrap());
    let child = attach(&mut registry, parent, constrained("Button", spec));

    let resolution = resolve_composite(&registry, parent);
    assert!(resolution.incomplete);
    assert_eq!(resolution.sets, vec![(child, json!({ "left": 0.0 }))]);
}

#[test]
fn over_specified_axis_drops_by_fixed_precedence() {
    let mut registry = Registry::new();
    let parent = composite(&mut registry);
    let spec = ConstraintSpec::new().left(10).right(10).width(100);
    let child = attach(&mut registry, parent, constrained("Button", spec));

    let resolution = resolve_composite(&registry, parent);
    assert!(!resolution.incomplete);
    // left and right outrank width; width is the one dropped, every time.
    for _ in 0..3 {
        let repeat = resolve_composite(&registry, parent);
        assert_eq!(repeat.sets, resolution.sets);
    }
    assert_eq!(
        resolution.sets,
        vec![(child, json!({ "left": 10.0, "right": 10.0 }))]
    );
}

#[test]
fn both_axes_trim_independently() {
    let mut registry = Registry::new();
    let parent = composite(&mut registry);
    let spec = ConstraintSpec::new()
        .left(1)
        .width(2)
        .center_x(3)
        .top(4)
        .bottom(5)
        .height(6)
        .center_y(7);
    let child = attach(&mut registry, parent, constrained("Button", spec));

    let resolution = resolve_composite(&registry, parent);
    assert_eq!(
        resolution.sets,
        vec![(
            child,
            json!({ "left": 1.0, "width": 2.0, "top": 4.0, "bottom": 5.0 })
        )]
    );
}

#[test]
fn unconstrained_children_are_skipped() {
    let mut registry = Registry::new();
    let parent = composite(&mut registry);
    attach(&mut registry, parent, Widget::new("Button"));
    let spec = ConstraintSpec::new().left(1);
    let constrained_child = attach(&mut registry, parent, constrained("Button", spec));

    let resolution = resolve_composite(&registry, parent);
    assert_eq!(resolution.sets.len(), 1);
    assert_eq!(resolution.sets[0].0, constrained_child);
}

#[test]
fn layout_queue_has_set_semantics() {
    let mut queue = LayoutQueue::default();
    let a = Handle::from_raw(1);
    let b = Handle::from_raw(2);

    queue.mark(a);
    queue.mark(b);
    queue.mark(a);
    assert_eq!(queue.take().len(), 2);
    assert!(queue.is_empty());

    queue.mark(a);
    queue.remove(a);
    assert!(queue.is_empty());
}
