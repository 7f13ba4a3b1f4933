//! Weft keeps an in-process tree of proxy widgets in sync with a host-owned
//! presentation runtime reachable only through a narrow message channel.
//!
//! The crate is the synchronization core of that split: widgets live here as
//! thin records, the host renders them, and a batched operation protocol
//! keeps both object graphs consistent.
//!
//! # Pipeline overview
//!
//! 1. **Mutate**: application code creates widgets, sets properties,
//!    attaches children and assigns declarative constraints on a
//!    [`Session`].
//! 2. **Buffer**: every lifecycle and property mutation lands in the
//!    [`OperationQueue`]; structural changes mark the affected composites
//!    dirty for layout.
//! 3. **Resolve**: at flush time the dirty composites run constraint
//!    resolution — sibling references (selectors or handles) become concrete
//!    handles, unresolvable ones degrade to a neutral placeholder and retry
//!    on the next flush.
//! 4. **Transport**: the queue drains to the [`Transport`] in object-scoped,
//!    submission-ordered batches; synchronous reads ([`Session::get`],
//!    [`Session::call`]) always flush first.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single-threaded**: one session, one cooperative turn at a time; host
//!   occurrences re-enter through [`Session::dispatch`].
//! - **No ambient globals**: registry, queues and cache live in the
//!   [`Session`], which supports an explicit [`Session::reset`].
//! - **Handles are forever**: ids are monotonic and never reused.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod bridge;
mod foundation;
mod layout;
mod object;
mod session;

pub use bridge::queue::OperationQueue;
pub use bridge::transport::{PropMap, RecordingTransport, Transport, WireOp};
pub use foundation::error::{WeftError, WeftResult};
pub use layout::constraint::{Constraint, ConstraintKey, ConstraintSpec, Reference, Selector};
pub use layout::resolver::ResolvedConstraint;
pub use object::events::{EventKind, Notification, Subscription};
pub use object::registry::{Handle, Registry};
pub use object::tree::{Widget, WidgetBuilder};
pub use session::context::{FlushStats, Session};
