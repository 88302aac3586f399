//! Orders module
//!
//! Order lifecycle management: validated status transitions for orders and
//! their payments, each applied inside one database transaction.

mod commands;
mod lifecycle;

pub use commands::*;
pub use lifecycle::OrderLifecycleHandler;
