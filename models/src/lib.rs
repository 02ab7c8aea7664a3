//! Database model definitions

#[macro_use]
extern crate tracing;

mod museum;
mod report;
mod reservation;
mod ticket;

pub mod schema;

pub use museum::*;
pub use report::*;
pub use reservation::*;
pub use ticket::*;
