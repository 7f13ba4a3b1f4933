use std::fmt;

use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::foundation::error::{WeftError, WeftResult};
use crate::object::registry::Handle;
use crate::object::tree::Widget;

/// Pattern identifying widgets by selector id, class or type name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    /// `#id` — matches the widget whose selector id equals `id`.
    Id(String),
    /// `.class` — matches widgets carrying the class.
    Class(String),
    /// Bare type name — matches widgets of that host kind.
    Kind(String),
}

impl Selector {
    /// Parse a selector string (`#id`, `.class` or a bare type name).
    pub fn parse(input: &str) -> WeftResult<Self> {
        if let Some(id) = input.strip_prefix('#') {
            if id.is_empty() {
                return Err(WeftError::validation("empty id selector"));
            }
            return Ok(Selector::Id(id.to_string()));
        }
        if let Some(class) = input.strip_prefix('.') {
            if class.is_empty() {
                return Err(WeftError::validation("empty class selector"));
            }
            return Ok(Selector::Class(class.to_string()));
        }
        if input.is_empty() || input.starts_with('$') || input.ends_with('%') {
            return Err(WeftError::validation(format!("invalid selector '{input}'")));
        }
        Ok(Selector::Kind(input.to_string()))
    }

    pub(crate) fn matches(&self, widget: &Widget) -> bool {
        match self {
            Selector::Id(id) => widget.selector_id() == Some(id.as_str()),
            Selector::Class(class) => widget.classes().iter().any(|c| c == class),
            Selector::Kind(kind) => widget.kind() == kind,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Id(id) => write!(f, "#{id}"),
            Selector::Class(class) => write!(f, ".{class}"),
            Selector::Kind(kind) => write!(f, "{kind}"),
        }
    }
}

/// A constraint reference: a selector resolved among siblings at flush
/// time, or a direct sibling handle.
#[derive(Clone, Debug, PartialEq)]
pub enum Reference {
    /// Selector resolved against the sibling set.
    Selector(Selector),
    /// Direct sibling handle.
    Widget(Handle),
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Selector(selector) => selector.fmt(f),
            Reference::Widget(handle) => handle.fmt(f),
        }
    }
}

impl From<Selector> for Reference {
    fn from(selector: Selector) -> Self {
        Reference::Selector(selector)
    }
}

impl From<Handle> for Reference {
    fn from(handle: Handle) -> Self {
        Reference::Widget(handle)
    }
}

/// One edge or dimension constraint value.
///
/// The canonical forms after [normalization](Constraint::normalized):
/// a plain offset, a percentage, a reference, or a reference/percentage
/// paired with a non-zero offset.
#[derive(Clone, Debug, PartialEq)]
pub enum Constraint {
    /// Absolute offset in device-independent units.
    Offset(f64),
    /// Percentage of the parent's extent.
    Percent(f64),
    /// Anchored to a sibling.
    Reference(Reference),
    /// Percentage of the parent's extent plus an offset.
    PercentOffset {
        /// Percentage part.
        percent: f64,
        /// Offset part.
        offset: f64,
    },
    /// Sibling anchor plus an offset.
    ReferenceOffset {
        /// Anchor part.
        reference: Reference,
        /// Offset part.
        offset: f64,
    },
}

impl Constraint {
    /// Absolute offset constraint.
    pub fn offset(value: f64) -> Self {
        Constraint::Offset(value)
    }

    /// Percentage constraint.
    pub fn percent(value: f64) -> Self {
        Constraint::Percent(value)
    }

    /// Selector-anchored constraint; fails on an invalid selector string.
    pub fn selector(input: &str) -> WeftResult<Self> {
        Ok(Constraint::Reference(Reference::Selector(Selector::parse(
            input,
        )?)))
    }

    /// Sibling-anchored constraint.
    pub fn widget(handle: Handle) -> Self {
        Constraint::Reference(Reference::Widget(handle))
    }

    /// Anchor plus offset, normalized to the canonical form.
    pub fn anchored(reference: impl Into<Reference>, offset: f64) -> Self {
        Constraint::ReferenceOffset {
            reference: reference.into(),
            offset,
        }
        .normalized()
    }

    /// Percentage plus offset, normalized to the canonical form.
    pub fn percent_offset(percent: f64, offset: f64) -> Self {
        Constraint::PercentOffset { percent, offset }.normalized()
    }

    /// Collapse degenerate pair forms: a zero percentage leaves the bare
    /// offset, and a zero offset leaves the bare anchor.
    pub fn normalized(self) -> Self {
        match self {
            Constraint::PercentOffset { percent, offset } if percent == 0.0 => {
                Constraint::Offset(offset)
            }
            Constraint::PercentOffset { percent, offset } if offset == 0.0 => {
                Constraint::Percent(percent)
            }
            Constraint::ReferenceOffset { reference, offset } if offset == 0.0 => {
                Constraint::Reference(reference)
            }
            other => other,
        }
    }

    /// Parse a constraint from its language-neutral JSON form: a number, a
    /// `"p%"` string, a selector string, a `"$n"` handle string, or a
    /// 2-element pair of a reference/percentage and an offset.
    pub fn parse(value: &Value) -> WeftResult<Self> {
        Ok(parse_term(value)?.into_constraint()?.normalized())
    }

    /// Canonical JSON form, inverse of [`Constraint::parse`].
    pub fn to_value(&self) -> Value {
        match self {
            Constraint::Offset(offset) => json_number(*offset),
            Constraint::Percent(percent) => Value::String(format_percent(*percent)),
            Constraint::Reference(reference) => Value::String(reference.to_string()),
            Constraint::PercentOffset { percent, offset } => Value::Array(vec![
                Value::String(format_percent(*percent)),
                json_number(*offset),
            ]),
            Constraint::ReferenceOffset { reference, offset } => Value::Array(vec![
                Value::String(reference.to_string()),
                json_number(*offset),
            ]),
        }
    }
}

impl From<f64> for Constraint {
    fn from(value: f64) -> Self {
        Constraint::Offset(value)
    }
}

impl From<i32> for Constraint {
    fn from(value: i32) -> Self {
        Constraint::Offset(f64::from(value))
    }
}

impl From<Handle> for Constraint {
    fn from(handle: Handle) -> Self {
        Constraint::Reference(Reference::Widget(handle))
    }
}

impl From<Selector> for Constraint {
    fn from(selector: Selector) -> Self {
        Constraint::Reference(Reference::Selector(selector))
    }
}

impl Serialize for Constraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Constraint::PercentOffset { percent, offset } => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(&format_percent(*percent))?;
                seq.serialize_element(offset)?;
                seq.end()
            }
            Constraint::ReferenceOffset { reference, offset } => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(&reference.to_string())?;
                seq.serialize_element(offset)?;
                seq.end()
            }
            Constraint::Offset(offset) => serializer.serialize_f64(*offset),
            Constraint::Percent(percent) => serializer.serialize_str(&format_percent(*percent)),
            Constraint::Reference(reference) => {
                serializer.collect_str(reference)
            }
        }
    }
}

impl<'de> Deserialize<'de> for Constraint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Constraint::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// A single parsed element of a constraint expression.
enum Term {
    Number(f64),
    Percent(f64),
    Reference(Reference),
    Pair(Box<Term>, Box<Term>),
}

impl Term {
    fn into_constraint(self) -> WeftResult<Constraint> {
        match self {
            Term::Number(n) => Ok(Constraint::Offset(n)),
            Term::Percent(p) => Ok(Constraint::Percent(p)),
            Term::Reference(r) => Ok(Constraint::Reference(r)),
            Term::Pair(first, second) => pair_constraint(*first, *second),
        }
    }
}

fn pair_constraint(first: Term, second: Term) -> WeftResult<Constraint> {
    match (first, second) {
        (Term::Reference(reference), Term::Number(offset)) => {
            Ok(Constraint::ReferenceOffset { reference, offset })
        }
        (Term::Percent(percent), Term::Number(offset)) => {
            Ok(Constraint::PercentOffset { percent, offset })
        }
        // Tolerated swapped form: [offset, percentage].
        (Term::Number(offset), Term::Percent(percent)) => {
            Ok(Constraint::PercentOffset { percent, offset })
        }
        // A trailing zero percentage acts as a zero offset.
        (Term::Reference(reference), Term::Percent(p)) if p == 0.0 => {
            Ok(Constraint::ReferenceOffset {
                reference,
                offset: 0.0,
            })
        }
        _ => Err(WeftError::validation(
            "constraint pair must combine a reference or percentage with an offset",
        )),
    }
}

fn parse_term(value: &Value) -> WeftResult<Term> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(Term::Number)
            .ok_or_else(|| WeftError::validation(format!("non-finite constraint number {n}"))),
        Value::String(s) => parse_string_term(s),
        Value::Array(items) => {
            if items.len() != 2 {
                return Err(WeftError::validation(format!(
                    "constraint pair must have 2 elements, got {}",
                    items.len()
                )));
            }
            let first = parse_term(&items[0])?;
            let second = parse_term(&items[1])?;
            if matches!(first, Term::Pair(..)) || matches!(second, Term::Pair(..)) {
                return Err(WeftError::validation("constraint pairs cannot nest"));
            }
            Ok(Term::Pair(Box::new(first), Box::new(second)))
        }
        other => Err(WeftError::validation(format!(
            "unsupported constraint value: {other}"
        ))),
    }
}

fn parse_string_term(input: &str) -> WeftResult<Term> {
    if input.starts_with('$') {
        let handle: Handle = input.parse()?;
        return Ok(Term::Reference(Reference::Widget(handle)));
    }
    if let Some(digits) = input.strip_suffix('%') {
        let percent: f64 = digits
            .trim()
            .parse()
            .map_err(|_| WeftError::validation(format!("invalid percentage '{input}'")))?;
        return Ok(Term::Percent(percent));
    }
    Ok(Term::Reference(Reference::Selector(Selector::parse(
        input,
    )?)))
}

fn format_percent(percent: f64) -> String {
    format!("{percent}%")
}

fn json_number(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Per-child declarative constraint specification.
///
/// Every key is optional; references may point at siblings that do not
/// exist yet. Resolution happens at flush time, per the parent composite.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ConstraintSpec {
    /// Left edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<Constraint>,
    /// Right edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<Constraint>,
    /// Top edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<Constraint>,
    /// Bottom edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<Constraint>,
    /// Width dimension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<Constraint>,
    /// Height dimension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<Constraint>,
    /// Horizontal center.
    #[serde(rename = "centerX", skip_serializing_if = "Option::is_none")]
    pub center_x: Option<Constraint>,
    /// Vertical center.
    #[serde(rename = "centerY", skip_serializing_if = "Option::is_none")]
    pub center_y: Option<Constraint>,
    /// Text baseline alignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<Constraint>,
}

impl ConstraintSpec {
    /// Empty specification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the left edge.
    pub fn left(mut self, value: impl Into<Constraint>) -> Self {
        self.left = Some(value.into().normalized());
        self
    }

    /// Set the right edge.
    pub fn right(mut self, value: impl Into<Constraint>) -> Self {
        self.right = Some(value.into().normalized());
        self
    }

    /// Set the top edge.
    pub fn top(mut self, value: impl Into<Constraint>) -> Self {
        self.top = Some(value.into().normalized());
        self
    }

    /// Set the bottom edge.
    pub fn bottom(mut self, value: impl Into<Constraint>) -> Self {
        self.bottom = Some(value.into().normalized());
        self
    }

    /// Set the width.
    pub fn width(mut self, value: impl Into<Constraint>) -> Self {
        self.width = Some(value.into().normalized());
        self
    }

    /// Set the height.
    pub fn height(mut self, value: impl Into<Constraint>) -> Self {
        self.height = Some(value.into().normalized());
        self
    }

    /// Set the horizontal center.
    pub fn center_x(mut self, value: impl Into<Constraint>) -> Self {
        self.center_x = Some(value.into().normalized());
        self
    }

    /// Set the vertical center.
    pub fn center_y(mut self, value: impl Into<Constraint>) -> Self {
        self.center_y = Some(value.into().normalized());
        self
    }

    /// Set the baseline anchor.
    pub fn baseline(mut self, value: impl Into<Constraint>) -> Self {
        self.baseline = Some(value.into().normalized());
        self
    }

    /// Whether no constraint is present.
    pub fn is_empty(&self) -> bool {
        ConstraintKey::ALL.iter().all(|k| self.get(*k).is_none())
    }

    /// Constraint stored under `key`, if present.
    pub fn get(&self, key: ConstraintKey) -> Option<&Constraint> {
        match key {
            ConstraintKey::Left => self.left.as_ref(),
            ConstraintKey::Right => self.right.as_ref(),
            ConstraintKey::Top => self.top.as_ref(),
            ConstraintKey::Bottom => self.bottom.as_ref(),
            ConstraintKey::Width => self.width.as_ref(),
            ConstraintKey::Height => self.height.as_ref(),
            ConstraintKey::CenterX => self.center_x.as_ref(),
            ConstraintKey::CenterY => self.center_y.as_ref(),
            ConstraintKey::Baseline => self.baseline.as_ref(),
        }
    }

    /// Present `(key, constraint)` entries in declaration-independent
    /// canonical key order.
    pub fn entries(&self) -> Vec<(ConstraintKey, &Constraint)> {
        ConstraintKey::ALL
            .iter()
            .filter_map(|k| self.get(*k).map(|c| (*k, c)))
            .collect()
    }
}

/// Keys of a [`ConstraintSpec`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintKey {
    /// `left`
    Left,
    /// `right`
    Right,
    /// `top`
    Top,
    /// `bottom`
    Bottom,
    /// `width`
    Width,
    /// `height`
    Height,
    /// `centerX`
    CenterX,
    /// `centerY`
    CenterY,
    /// `baseline`
    Baseline,
}

impl ConstraintKey {
    /// All keys, in canonical order.
    pub const ALL: [ConstraintKey; 9] = [
        ConstraintKey::Left,
        ConstraintKey::Right,
        ConstraintKey::Top,
        ConstraintKey::Bottom,
        ConstraintKey::Width,
        ConstraintKey::Height,
        ConstraintKey::CenterX,
        ConstraintKey::CenterY,
        ConstraintKey::Baseline,
    ];

    /// Wire name of the key.
    pub fn name(self) -> &'static str {
        match self {
            ConstraintKey::Left => "left",
            ConstraintKey::Right => "right",
            ConstraintKey::Top => "top",
            ConstraintKey::Bottom => "bottom",
            ConstraintKey::Width => "width",
            ConstraintKey::Height => "height",
            ConstraintKey::CenterX => "centerX",
            ConstraintKey::CenterY => "centerY",
            ConstraintKey::Baseline => "baseline",
        }
    }

    pub(crate) fn axis(self) -> Axis {
        match self {
            ConstraintKey::Left
            | ConstraintKey::Right
            | ConstraintKey::Width
            | ConstraintKey::CenterX => Axis::Horizontal,
            ConstraintKey::Top
            | ConstraintKey::Bottom
            | ConstraintKey::Height
            | ConstraintKey::CenterY
            | ConstraintKey::Baseline => Axis::Vertical,
        }
    }

    // Lower wins when an axis is over-specified.
    pub(crate) fn precedence(self) -> u8 {
        match self {
            ConstraintKey::Left | ConstraintKey::Top => 0,
            ConstraintKey::Right | ConstraintKey::Bottom => 1,
            ConstraintKey::Width | ConstraintKey::Height => 2,
            ConstraintKey::CenterX | ConstraintKey::CenterY => 3,
            ConstraintKey::Baseline => 4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Axis::Horizontal => "horizontal",
            Axis::Vertical => "vertical",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/constraint.rs"]
mod tests;
