//! Core types and vote aggregation for the tablevote backend.

pub mod error;
pub mod restaurant;
pub mod results;
pub mod session;

pub use error::{Error, Result};
pub use restaurant::*;
pub use results::*;
pub use session::*;
