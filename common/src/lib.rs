#[macro_use]
extern crate tracing;

use deadpool_diesel::postgres::{Object, Pool};

mod error;

pub use error::*;

/// Shared postgres connection pool
pub type DbPool = Pool;

/// A pooled postgres connection
pub type DbConn = Object;
