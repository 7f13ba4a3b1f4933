use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::foundation::error::{WeftError, WeftResult};
use crate::object::tree::Widget;

/// Opaque identifier bound 1:1 to a proxy object for its lifetime.
///
/// Handles are allocated monotonically by the [`Registry`] and are never
/// reused once retired. The wire form is `"$<n>"`, starting at `$1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Numeric value behind the handle.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

impl Serialize for Handle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Handle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl FromStr for Handle {
    type Err = WeftError;

    fn from_str(s: &str) -> WeftResult<Self> {
        let digits = s
            .strip_prefix('$')
            .ok_or_else(|| WeftError::serde(format!("handle must start with '$', got '{s}'")))?;
        let raw: u64 = digits
            .parse()
            .map_err(|_| WeftError::serde(format!("invalid handle '{s}'")))?;
        Ok(Self(raw))
    }
}

/// Owns the id ↔ object mapping for every live proxy object.
///
/// The registry is pure storage: allocation, lookup and removal. Ids are
/// process-unique within a session and retired ids are never handed out
/// again, so a missing handle below the allocation watermark is always a
/// disposed one.
#[derive(Debug, Default)]
pub struct Registry {
    objects: HashMap<Handle, Widget>,
    next: u64,
}

impl Registry {
    /// Create an empty registry. The first registration yields `$1`.
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            next: 1,
        }
    }

    /// Register an object and allocate its handle.
    pub fn register(&mut self, widget: Widget) -> Handle {
        let handle = Handle::from_raw(self.next);
        self.next += 1;
        let previous = self.objects.insert(handle, widget);
        // Duplicate ids mean the allocation counter was corrupted.
        assert!(
            previous.is_none(),
            "registry corruption: handle {handle} already in use"
        );
        handle
    }

    /// Look up a live object.
    pub fn find(&self, handle: Handle) -> Option<&Widget> {
        self.objects.get(&handle)
    }

    /// Look up a live object for mutation.
    pub fn find_mut(&mut self, handle: Handle) -> Option<&mut Widget> {
        self.objects.get_mut(&handle)
    }

    /// Remove an object, retiring its handle forever.
    pub fn remove(&mut self, handle: Handle) -> Option<Widget> {
        self.objects.remove(&handle)
    }

    /// Whether the handle maps to a live object.
    pub fn is_live(&self, handle: Handle) -> bool {
        self.objects.contains_key(&handle)
    }

    /// Whether the handle was allocated in the past and later removed.
    pub fn is_disposed(&self, handle: Handle) -> bool {
        handle.0 > 0 && handle.0 < self.next && !self.objects.contains_key(&handle)
    }

    /// Fail with the appropriate error unless the handle is live.
    pub fn ensure_live(&self, handle: Handle) -> WeftResult<()> {
        if self.is_live(handle) {
            Ok(())
        } else if self.is_disposed(handle) {
            Err(WeftError::disposed(handle.to_string()))
        } else {
            Err(WeftError::registry(format!("unknown handle {handle}")))
        }
    }

    /// Count of live objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether no objects are live.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterate over live objects in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &Widget)> {
        self.objects.iter().map(|(h, w)| (*h, w))
    }

    /// Drop all objects and restart handle numbering at `$1`.
    pub fn reset(&mut self) {
        self.objects.clear();
        self.next = 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/object/registry.rs"]
mod tests;
