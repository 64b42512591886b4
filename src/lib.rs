//! An in-process keyed cache with pluggable eviction policies, byte-volume budgets, and
//! optional read-through loading.
//!
//! The core building block is [`store::MemoryStore`], constructed via
//! [`store::MemoryStore::builder`] (an explicit-construction builder, no reflection, no
//! service locator) or [`store::MemoryStore::unbounded`] for a capacity-free cache with
//! default collaborators. [`sync::SyncStore`] wraps one in a `parking_lot::Mutex` for
//! multi-threaded callers.
//!
//! No subscriber is installed by this crate. Wire up `tracing-subscriber` (or any other
//! `tracing` subscriber) in the binary that depends on it to see the store's structured
//! logging.

pub mod attribute;
pub mod attribute_service;
pub mod builder;
pub mod entry;
pub mod error;
pub mod listener;
pub mod loader;
pub mod policy;
pub mod store;
pub mod sync;

pub use attribute::{Attribute, AttributeId, AttributeMap};
pub use attribute_service::{AttributeService, DefaultAttributeService};
pub use builder::StoreBuilder;
pub use entry::Entry;
pub use error::{AttributeError, ExceptionService, LoadError, StoreError, StoreResult, TracingExceptionService};
pub use listener::{AfterEvent, BeforeEvent, Listener, OperationKind};
pub use loader::{LoadingStore, Loader};
pub use policy::{Admission, Dependency, PolicyDependencies, ReplacementPolicy};
pub use store::{Evictor, EvictorView, MemoryStore, PutOutcome};
pub use sync::SyncStore;
