//! # dte-sv
//!
//! Electronic tax documents (DTE) for El Salvador: turns a locally created
//! invoice into the JSON document the tax authority expects, and talks to
//! the authority-facing gateway to submit, invalidate and report it.
//!
//! All monetary values use [`rust_decimal::Decimal`] and are rounded half
//! away from zero to 2 decimals exactly once, where they are computed.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use dte_sv::core::*;
//! use dte_sv::dte::*;
//! use rust_decimal_macros::dec;
//!
//! let created = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap().and_hms_opt(9, 30, 0).unwrap();
//! let address = AddressBuilder::new("06", "14", "Colonia Escalón, San Salvador").build();
//!
//! let invoice = InvoiceBuilder::new("F-0001", created, DocumentVariant::StandardInvoice)
//!     .company(CompanyBuilder::new("Cafetería El Roble", "56101", "Restaurantes", address.clone())
//!         .nit("0614-010190-101-3").nrc("123456-7").contact("22223333", "caja@elroble.sv").build())
//!     .customer(CustomerBuilder::new("Ana López", address).national_id("012345678").build())
//!     .add_line(InvoiceLineBuilder::new("Café americano", dec!(2), dec!(11.30)).build())
//!     .build()
//!     .unwrap();
//!
//! let mut doc = map_invoice(&invoice, Environment::Test).unwrap();
//! let mut sequence = ControlNumberSequence::new(DocumentType::Invoice, "M001P001").unwrap();
//! doc.assign_identifiers(sequence.next_control_number().unwrap(), created).unwrap();
//!
//! assert!(validate_for_submission(&doc).is_empty());
//! assert_eq!(doc.total_payable(), dec!(22.60));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Input types, tax calculation, identifiers, DTE mapping and validation |
//! | `client` | Async gateway client (sync, invalidate, contingency, certificates, payments) |
//! | `contingency` | Contingency batches with per-document submission status |
//! | `production` | Build every document for the production environment ("01") |
//! | `all` | Everything except `production` |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "core")]
pub mod dte;

#[cfg(feature = "client")]
pub mod client;

#[cfg(feature = "contingency")]
pub mod batch;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
