//! Media storage adapters.

mod local;

pub use local::{ImageKind, LocalMediaStorage};
