//! Input/output helpers.
//!
//! - CSV series loading (`load`)
//! - date/number coercion shared with the fetchers (`dates`)
//! - CSV exports (`export`)

pub mod dates;
pub mod export;
pub mod load;

pub use export::*;
pub use load::*;
