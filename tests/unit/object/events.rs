use super::*;

#[test]
fn wire_names_are_camel_case() {
    assert_eq!(EventKind::AddChild.wire_name(), "addChild");
    assert_eq!(EventKind::RemoveChild.wire_name(), "removeChild");
    assert_eq!(EventKind::Dispose.wire_name(), "dispose");
    assert_eq!(EventKind::LongPress.wire_name(), "longPress");
    assert_eq!(EventKind::Tap.wire_name(), "tap");
}

#[test]
fn only_host_kinds_are_native() {
    assert!(!EventKind::AddChild.is_native());
    assert!(!EventKind::RemoveChild.is_native());
    assert!(!EventKind::Dispose.is_native());
    assert!(EventKind::Tap.is_native());
    assert!(EventKind::LongPress.is_native());
    assert!(EventKind::Resize.is_native());
    assert!(EventKind::Focus.is_native());
    assert!(EventKind::Blur.is_native());
}

#[test]
fn notification_serializes_with_wire_names() {
    let note = Notification {
        target: Handle::from_raw(7),
        kind: EventKind::Tap,
        data: Some(serde_json::json!({ "x": 3 })),
    };
    let encoded = serde_json::to_value(&note).unwrap();
    assert_eq!(encoded["target"], serde_json::json!("$7"));
    assert_eq!(encoded["kind"], serde_json::json!("tap"));
    assert_eq!(encoded["data"]["x"], serde_json::json!(3));
}
