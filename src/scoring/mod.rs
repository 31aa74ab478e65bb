//! Deterministic risk-scoring rules.
//!
//! raw field → parse → category score → per-patient assessment.
//! Each category depends only on its own raw field.

pub mod age;
pub mod aggregate;
pub mod blood_pressure;
pub mod parse;
pub mod temperature;
pub mod types;

pub use age::*;
pub use aggregate::*;
pub use blood_pressure::*;
pub use parse::*;
pub use temperature::*;
pub use types::*;
