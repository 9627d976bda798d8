//! Foreign-function surface consumed by the mobile app.
//!
//! Device records cross the boundary as plain records with millisecond
//! timestamps; blocking work runs on the crate's global runtime.

pub mod accounts;
pub mod errors;
pub mod logging;
pub mod objects;
pub mod session;
