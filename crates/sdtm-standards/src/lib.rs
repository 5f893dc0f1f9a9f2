#![deny(unsafe_code)]

//! Built-in SDTM export definitions.
//!
//! Each module defines a domain's variables and a `definition()` that works
//! over any [`sdtm_core::DomainObject`] following the conventions in
//! [`common`].

pub mod ae;
pub mod cm;
pub mod common;
pub mod dm;
pub mod error;
pub mod registry;

pub use crate::ae::Ae;
pub use crate::cm::Cm;
pub use crate::dm::Dm;
pub use crate::error::StandardsError;
pub use crate::registry::StandardDomain;
