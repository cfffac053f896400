//! Timer Queue
//!
//! Single-threaded scheduler for delayed and periodic events. Callbacks are
//! plain event values; cancelling a handle invalidates it instead of touching
//! the heap.

mod queue;

pub use queue::{TimerHandle, TimerQueue};
