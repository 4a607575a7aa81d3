//! Sequential execution of asynchronous commands.
//!
//! [`CommandQueue`] accepts [`branchy_core::Command`]s, runs them strictly one
//! at a time in submission order, and hands each caller a
//! [`QueueItemHandle`] for the typed outcome. The queue can be paused and
//! resumed, pending items can be canceled, and items tagged with an
//! identifier can reject duplicates for a retention window after they finish.

pub mod item;
pub mod options;
pub mod queue;
pub mod registry;

pub use item::{ItemId, ItemState, QueueItem, QueueItemHandle};
pub use options::SubmitOptions;
pub use queue::CommandQueue;
pub use registry::IdentifierRegistry;
