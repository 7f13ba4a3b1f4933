use super::*;

use serde_json::json;

#[test]
fn selector_forms_parse() {
    assert_eq!(
        Selector::parse("#header").unwrap(),
        Selector::Id("header".to_string())
    );
    assert_eq!(
        Selector::parse(".dim").unwrap(),
        Selector::Class("dim".to_string())
    );
    assert_eq!(
        Selector::parse("Button").unwrap(),
        Selector::Kind("Button".to_string())
    );
    assert!(Selector::parse("").is_err());
    assert!(Selector::parse("#").is_err());
    assert!(Selector::parse(".").is_err());
    assert!(Selector::parse("$1").is_err());
}

#[test]
fn plain_forms_parse() {
    assert_eq!(
        Constraint::parse(&json!(12.5)).unwrap(),
        Constraint::Offset(12.5)
    );
    assert_eq!(
        Constraint::parse(&json!("50%")).unwrap(),
        Constraint::Percent(50.0)
    );
    assert_eq!(
        Constraint::parse(&json!("$4")).unwrap(),
        Constraint::Reference(Reference::Widget(Handle::from_raw(4)))
    );
    assert_eq!(
        Constraint::parse(&json!("#sibling")).unwrap(),
        Constraint::Reference(Reference::Selector(Selector::Id("sibling".to_string())))
    );
}

#[test]
fn pair_forms_parse_and_normalize() {
    assert_eq!(
        Constraint::parse(&json!(["#a", 10])).unwrap(),
        Constraint::ReferenceOffset {
            reference: Reference::Selector(Selector::Id("a".to_string())),
            offset: 10.0,
        }
    );
    assert_eq!(
        Constraint::parse(&json!(["30%", 4])).unwrap(),
        Constraint::PercentOffset {
            percent: 30.0,
            offset: 4.0,
        }
    );

    // Degenerate forms collapse.
    assert_eq!(
        Constraint::parse(&json!([16, "0%"])).unwrap(),
        Constraint::Offset(16.0)
    );
    assert_eq!(
        Constraint::parse(&json!(["0%", 16])).unwrap(),
        Constraint::Offset(16.0)
    );
    assert_eq!(
        Constraint::parse(&json!(["#a", 0])).unwrap(),
        Constraint::Reference(Reference::Selector(Selector::Id("a".to_string())))
    );
    assert_eq!(
        Constraint::parse(&json!(["#a", "0%"])).unwrap(),
        Constraint::Reference(Reference::Selector(Selector::Id("a".to_string())))
    );
    assert_eq!(
        Constraint::parse(&json!(["40%", 0])).unwrap(),
        Constraint::Percent(40.0)
    );
}

#[test]
fn malformed_values_are_rejected() {
    assert!(Constraint::parse(&json!(["#a"])).is_err());
    assert!(Constraint::parse(&json!(["#a", 1, 2])).is_err());
    assert!(Constraint::parse(&json!([1, 2])).is_err());
    assert!(Constraint::parse(&json!(["#a", "#b"])).is_err());
    assert!(Constraint::parse(&json!(true)).is_err());
    assert!(Constraint::parse(&json!("%")).is_err());
    assert!(Constraint::parse(&json!([["#a", 1], 2])).is_err());
}

#[test]
fn canonical_json_round_trips() {
    let cases = [
        json!(12.0),
        json!("50%"),
        json!("$4"),
        json!("#sibling"),
        json!(".hint"),
        json!("Button"),
        json!(["#sibling", 10.0]),
        json!(["25%", -4.0]),
    ];
    for case in cases {
        let parsed = Constraint::parse(&case).unwrap();
        assert_eq!(parsed.to_value(), case, "round-trip failed for {case}");
    }
}

#[test]
fn spec_deserializes_from_input_map() {
    let spec: ConstraintSpec = serde_json::from_value(json!({
        "left": 10,
        "right": "10%",
        "top": ["#header", 4],
        "centerX": 0,
    }))
    .unwrap();

    assert_eq!(spec.left, Some(Constraint::Offset(10.0)));
    assert_eq!(spec.right, Some(Constraint::Percent(10.0)));
    assert_eq!(
        spec.top,
        Some(Constraint::ReferenceOffset {
            reference: Reference::Selector(Selector::Id("header".to_string())),
            offset: 4.0,
        })
    );
    assert_eq!(spec.center_x, Some(Constraint::Offset(0.0)));
    assert_eq!(spec.bottom, None);
    assert!(!spec.is_empty());
}

#[test]
fn spec_serializes_only_present_keys() {
    let spec = ConstraintSpec::new()
        .left(10)
        .center_y(Constraint::percent(50.0));
    let encoded = serde_json::to_value(&spec).unwrap();
    assert_eq!(encoded, json!({ "left": 10.0, "centerY": "50%" }));
}

#[test]
fn entries_follow_canonical_key_order() {
    let spec = ConstraintSpec::new().baseline(1).left(2).height(3);
    let keys: Vec<&str> = spec.entries().iter().map(|(k, _)| k.name()).collect();
    assert_eq!(keys, ["left", "height", "baseline"]);
}
