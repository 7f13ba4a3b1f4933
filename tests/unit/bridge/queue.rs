use super::*;

use serde_json::json;

fn props(pairs: &[(&str, serde_json::Value)]) -> PropMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn create_absorbs_sets_before_first_flush() {
    let mut queue = OperationQueue::new();
    let h = Handle::from_raw(1);

    queue.create(h, "Button", props(&[("text", json!("a"))]));
    queue.set(h, props(&[("text", json!("b")), ("enabled", json!(true))]));

    let ops = queue.drain();
    assert_eq!(
        ops,
        vec![WireOp::Create {
            target: h,
            kind: "Button".to_string(),
            props: props(&[("text", json!("b")), ("enabled", json!(true))]),
        }]
    );
}

#[test]
fn sets_after_flush_merge_last_write_wins() {
    let mut queue = OperationQueue::new();
    let h = Handle::from_raw(1);

    queue.create(h, "Button", PropMap::new());
    queue.drain();

    queue.set(h, props(&[("text", json!("a")), ("enabled", json!(false))]));
    queue.set(h, props(&[("text", json!("b"))]));

    let ops = queue.drain();
    assert_eq!(
        ops,
        vec![WireOp::Set {
            target: h,
            props: props(&[("text", json!("b")), ("enabled", json!(false))]),
        }]
    );
}

#[test]
fn group_drains_in_op_kind_order() {
    let mut queue = OperationQueue::new();
    let h = Handle::from_raw(1);

    queue.destroy(h);
    queue.call(h, "animate", PropMap::new());
    queue.listen(h, "tap", true);
    queue.create(h, "Button", PropMap::new());

    let opcodes: Vec<&str> = queue.drain().iter().map(WireOp::opcode).collect();
    assert_eq!(opcodes, ["create", "listen", "call", "destroy"]);
}

#[test]
fn listen_toggles_replace_per_event() {
    let mut queue = OperationQueue::new();
    let h = Handle::from_raw(1);

    queue.listen(h, "tap", true);
    queue.listen(h, "resize", true);
    queue.listen(h, "tap", false);

    let ops = queue.drain();
    assert_eq!(
        ops,
        vec![
            WireOp::Listen {
                target: h,
                event: "tap".to_string(),
                enabled: false,
            },
            WireOp::Listen {
                target: h,
                event: "resize".to_string(),
                enabled: true,
            },
        ]
    );
}

#[test]
fn groups_drain_in_first_seen_order() {
    let mut queue = OperationQueue::new();
    let a = Handle::from_raw(1);
    let b = Handle::from_raw(2);

    queue.set(b, props(&[("x", json!(1))]));
    queue.set(a, props(&[("x", json!(2))]));
    queue.set(b, props(&[("y", json!(3))]));

    let targets: Vec<Handle> = queue.drain().iter().map(WireOp::target).collect();
    assert_eq!(targets, [b, a]);
}

#[test]
fn discard_drops_all_pending_ops_for_a_handle() {
    let mut queue = OperationQueue::new();
    let a = Handle::from_raw(1);
    let b = Handle::from_raw(2);

    queue.create(a, "Button", PropMap::new());
    queue.create(b, "Button", PropMap::new());
    queue.discard(a);

    assert!(!queue.is_empty());
    let targets: Vec<Handle> = queue.drain().iter().map(WireOp::target).collect();
    assert_eq!(targets, [b]);
}

#[test]
fn drain_empties_the_queue() {
    let mut queue = OperationQueue::new();
    let h = Handle::from_raw(1);

    queue.create(h, "Button", PropMap::new());
    assert!(!queue.is_empty());
    queue.drain();
    assert!(queue.is_empty());
    assert!(queue.drain().is_empty());
}
