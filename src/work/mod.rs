//! The unit-of-work abstraction: runnables, sources, registry, dispatch.

mod dispatch;
mod registry;
mod runnable;
mod source;

pub use dispatch::{DirectDispatcher, WorkDispatcher};
pub use registry::WorkRegistry;
pub use runnable::{Runnable, RunnableFn, RunnableRef};
pub use source::WorkSource;
