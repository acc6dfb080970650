//! Core input types, formatting utilities, tax calculation and numbering.
//!
//! Everything here is pure: no I/O, no clocks except where an instant is
//! passed in, and randomness only in the identifier generators.

mod builder;
pub mod calc;
mod error;
pub mod format;
mod numbering;
mod types;
pub mod words;

pub use builder::*;
pub use calc::{DocumentTotals, LineAmounts, TAX_MULTIPLIER, TaxTreatment};
pub use error::*;
pub use format::{
    format_national_id, format_phone_number, generate_generation_code, generate_reference_code,
    generate_time_string, round_decimal, validate_generation_code,
};
pub use numbering::*;
pub use types::*;
pub use words::amount_to_words;
