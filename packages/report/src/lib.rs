#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Field resolution over variant case reports.
//!
//! Reconciles inconsistently-named report records into the canonical
//! [`CanonicalReport`](casewatch_report_models::CanonicalReport) schema and
//! composes display names for the people they describe.

pub mod name;
pub mod resolver;

pub use name::{compose_name, join_name};
pub use resolver::{canonicalize, canonicalize_all, resolve, resolve_named, resolve_or};
