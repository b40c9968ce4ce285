//! Route handlers, one module per resource.

pub mod page;
pub mod session;
pub mod tasks;
pub mod word_count;
