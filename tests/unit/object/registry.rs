use super::*;

#[test]
fn handles_are_distinct_and_increasing() {
    let mut registry = Registry::new();
    let a = registry.register(Widget::new("Button"));
    let b = registry.register(Widget::new("Button"));
    let c = registry.register(Widget::new("TextView"));

    assert_eq!(a.to_string(), "$1");
    assert_eq!(b.to_string(), "$2");
    assert_eq!(c.to_string(), "$3");
    assert!(a < b && b < c);
    assert_eq!(registry.len(), 3);
}

#[test]
fn removed_handles_are_never_reused() {
    let mut registry = Registry::new();
    let a = registry.register(Widget::new("Button"));
    registry.remove(a);

    let b = registry.register(Widget::new("Button"));
    assert_ne!(a, b);
    assert_eq!(b.to_string(), "$2");
}

#[test]
fn disposed_is_distinguished_from_unknown() {
    let mut registry = Registry::new();
    let a = registry.register(Widget::new("Button"));
    registry.remove(a);

    assert!(registry.is_disposed(a));
    assert!(!registry.is_live(a));
    assert!(matches!(
        registry.ensure_live(a),
        Err(WeftError::Disposed(_))
    ));

    let never = Handle::from_raw(99);
    assert!(!registry.is_disposed(never));
    assert!(matches!(
        registry.ensure_live(never),
        Err(WeftError::Registry(_))
    ));
}

#[test]
fn reset_restarts_numbering() {
    let mut registry = Registry::new();
    registry.register(Widget::new("Button"));
    registry.register(Widget::new("Button"));
    registry.reset();

    assert!(registry.is_empty());
    let a = registry.register(Widget::new("Button"));
    assert_eq!(a.to_string(), "$1");
}

#[test]
fn handle_wire_form_round_trips() {
    let handle = Handle::from_raw(42);
    let encoded = serde_json::to_value(handle).unwrap();
    assert_eq!(encoded, serde_json::json!("$42"));

    let parsed: Handle = "$42".parse().unwrap();
    assert_eq!(parsed, handle);
    assert!("42".parse::<Handle>().is_err());
    assert!("$x".parse::<Handle>().is_err());
}
