//! ef-core: shared foundation for epiflow.
//!
//! Contains:
//! - numeric (Real + tolerances + float checks)
//! - error (shared error types)

pub mod error;
pub mod numeric;

pub use error::{CoreError, CoreResult};
pub use numeric::*;
