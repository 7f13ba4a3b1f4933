use std::collections::{BTreeMap, HashMap};

use serde::ser::SerializeSeq;
use serde_json::Value;

use crate::object::registry::Handle;

/// Property map carried by `create`, `set` and `call` operations.
///
/// `BTreeMap` keeps key iteration stable, so transported payloads are
/// deterministic for a given input.
pub type PropMap = BTreeMap<String, Value>;

#[derive(Clone, Debug, PartialEq)]
/// One transport-ready operation.
///
/// Serializes to the tagged-tuple shape of the bulk flush message, e.g.
/// `["create", "$1", "Button", {"text": "Ok"}]`.
pub enum WireOp {
    /// Instantiate a host object.
    Create {
        /// Target handle.
        target: Handle,
        /// Host widget type name.
        kind: String,
        /// Merged initial properties.
        props: PropMap,
    },
    /// Update host object properties.
    Set {
        /// Target handle.
        target: Handle,
        /// Merged property values.
        props: PropMap,
    },
    /// Toggle host-side event delivery.
    Listen {
        /// Target handle.
        target: Handle,
        /// Wire event name.
        event: String,
        /// Whether delivery is enabled.
        enabled: bool,
    },
    /// Invoke a host object method.
    Call {
        /// Target handle.
        target: Handle,
        /// Method name.
        method: String,
        /// Method arguments.
        args: PropMap,
    },
    /// Release a host object and its rendered subtree.
    Destroy {
        /// Target handle.
        target: Handle,
    },
}

impl WireOp {
    /// Handle the operation is addressed to.
    pub fn target(&self) -> Handle {
        match self {
            WireOp::Create { target, .. }
            | WireOp::Set { target, .. }
            | WireOp::Listen { target, .. }
            | WireOp::Call { target, .. }
            | WireOp::Destroy { target } => *target,
        }
    }

    /// Wire opcode tag.
    pub fn opcode(&self) -> &'static str {
        match self {
            WireOp::Create { .. } => "create",
            WireOp::Set { .. } => "set",
            WireOp::Listen { .. } => "listen",
            WireOp::Call { .. } => "call",
            WireOp::Destroy { .. } => "destroy",
        }
    }
}

impl serde::Serialize for WireOp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            WireOp::Create {
                target,
                kind,
                props,
            } => {
                let mut seq = serializer.serialize_seq(Some(4))?;
                seq.serialize_element("create")?;
                seq.serialize_element(target)?;
                seq.serialize_element(kind)?;
                seq.serialize_element(props)?;
                seq.end()
            }
            WireOp::Set { target, props } => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                seq.serialize_element("set")?;
                seq.serialize_element(target)?;
                seq.serialize_element(props)?;
                seq.end()
            }
            WireOp::Listen {
                target,
                event,
                enabled,
            } => {
                let mut seq = serializer.serialize_seq(Some(4))?;
                seq.serialize_element("listen")?;
                seq.serialize_element(target)?;
                seq.serialize_element(event)?;
                seq.serialize_element(enabled)?;
                seq.end()
            }
            WireOp::Call {
                target,
                method,
                args,
            } => {
                let mut seq = serializer.serialize_seq(Some(4))?;
                seq.serialize_element("call")?;
                seq.serialize_element(target)?;
                seq.serialize_element(method)?;
                seq.serialize_element(args)?;
                seq.end()
            }
            WireOp::Destroy { target } => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element("destroy")?;
                seq.serialize_element(target)?;
                seq.end()
            }
        }
    }
}

/// Message channel to the host-owned presentation runtime.
///
/// Buffered operations reach the transport through [`Transport::flush`]; the
/// default implementation dispatches one message per operation, in order. A
/// transport that accepts the bulk message overrides `flush` and reports
/// `supports_bulk`. `call` and `get` are synchronous; the session always
/// drains its queues before issuing them. The channel is assumed reliable:
/// delivery failures are not handled at this layer.
pub trait Transport {
    /// Instantiate a host object.
    fn create(&mut self, target: Handle, kind: &str, props: &PropMap);

    /// Update host object properties.
    fn set(&mut self, target: Handle, props: &PropMap);

    /// Toggle host-side event delivery.
    fn listen(&mut self, target: Handle, event: &str, enabled: bool);

    /// Release a host object and its rendered subtree.
    fn destroy(&mut self, target: Handle);

    /// Invoke a host object method synchronously.
    fn call(&mut self, target: Handle, method: &str, args: &PropMap) -> Value;

    /// Read a host object property synchronously.
    fn get(&mut self, target: Handle, property: &str) -> Value;

    /// Whether `flush` transports the ordered list as one bulk message.
    fn supports_bulk(&self) -> bool {
        false
    }

    /// Transport a drained operation batch, preserving order.
    fn flush(&mut self, ops: &[WireOp]) {
        for op in ops {
            match op {
                WireOp::Create {
                    target,
                    kind,
                    props,
                } => self.create(*target, kind, props),
                WireOp::Set { target, props } => self.set(*target, props),
                WireOp::Listen {
                    target,
                    event,
                    enabled,
                } => self.listen(*target, event, *enabled),
                WireOp::Call {
                    target,
                    method,
                    args,
                } => {
                    self.call(*target, method, args);
                }
                WireOp::Destroy { target } => self.destroy(*target),
            }
        }
    }
}

/// In-memory transport that records every operation it receives.
///
/// Serves scripted responses for `get` and `call`, so embedders can test
/// against the bridge contract without a host renderer.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    bulk: bool,
    ops: Vec<WireOp>,
    batches: Vec<usize>,
    gets: Vec<(Handle, String)>,
    calls: Vec<(Handle, String, PropMap)>,
    get_responses: HashMap<(Handle, String), Value>,
    call_responses: HashMap<(Handle, String), Value>,
}

impl RecordingTransport {
    /// Recording transport in per-operation dispatch mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recording transport that advertises the bulk flush capability.
    pub fn bulk() -> Self {
        Self {
            bulk: true,
            ..Self::default()
        }
    }

    /// Script the value returned for a `get` on `target`/`property`.
    pub fn respond_to_get(
        &mut self,
        target: Handle,
        property: impl Into<String>,
        value: Value,
    ) {
        self.get_responses.insert((target, property.into()), value);
    }

    /// Script the value returned for a `call` of `method` on `target`.
    pub fn respond_to_call(&mut self, target: Handle, method: impl Into<String>, value: Value) {
        self.call_responses.insert((target, method.into()), value);
    }

    /// All recorded operations, in transport order.
    pub fn ops(&self) -> &[WireOp] {
        &self.ops
    }

    /// Take the recorded operations, leaving the log empty.
    pub fn take_ops(&mut self) -> Vec<WireOp> {
        self.batches.clear();
        std::mem::take(&mut self.ops)
    }

    /// Sizes of the bulk batches received so far (empty in per-op mode).
    pub fn batches(&self) -> &[usize] {
        &self.batches
    }

    /// Log of synchronous `get` reads.
    pub fn gets(&self) -> &[(Handle, String)] {
        &self.gets
    }

    /// Log of synchronous `call` invocations.
    pub fn calls(&self) -> &[(Handle, String, PropMap)] {
        &self.calls
    }

    /// Recorded operations rendered as the bulk JSON message.
    pub fn ops_json(&self) -> Value {
        serde_json::to_value(&self.ops).unwrap_or(Value::Null)
    }
}

impl Transport for RecordingTransport {
    fn create(&mut self, target: Handle, kind: &str, props: &PropMap) {
        self.ops.push(WireOp::Create {
            target,
            kind: kind.to_string(),
            props: props.clone(),
        });
    }

    fn set(&mut self, target: Handle, props: &PropMap) {
        self.ops.push(WireOp::Set {
            target,
            props: props.clone(),
        });
    }

    fn listen(&mut self, target: Handle, event: &str, enabled: bool) {
        self.ops.push(WireOp::Listen {
            target,
            event: event.to_string(),
            enabled,
        });
    }

    fn destroy(&mut self, target: Handle) {
        self.ops.push(WireOp::Destroy { target });
    }

    fn call(&mut self, target: Handle, method: &str, args: &PropMap) -> Value {
        self.calls.push((target, method.to_string(), args.clone()));
        self.call_responses
            .get(&(target, method.to_string()))
            .cloned()
            .unwrap_or(Value::Null)
    }

    fn get(&mut self, target: Handle, property: &str) -> Value {
        self.gets.push((target, property.to_string()));
        self.get_responses
            .get(&(target, property.to_string()))
            .cloned()
            .unwrap_or(Value::Null)
    }

    fn supports_bulk(&self) -> bool {
        self.bulk
    }

    fn flush(&mut self, ops: &[WireOp]) {
        if self.bulk {
            self.batches.push(ops.len());
            self.ops.extend_from_slice(ops);
        } else {
            for op in ops {
                self.ops.push(op.clone());
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bridge/transport.rs"]
mod tests;
