//! petconnect/crates/domains/src/lib.rs
//!
//! Domain model and port definitions for PetConnect: users, pets with their
//! adoption applications, and social posts with their engagement records.
//! Nothing in this crate performs I/O.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::*;
pub use models::*;
pub use ports::*;
