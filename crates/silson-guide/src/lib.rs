//! Medical-indemnity (실손의료비) generation explainer.
//!
//! Classifies an enrollment date into a policy generation, composes a prompt from the
//! reference catalog, and asks the configured text-generation providers for a
//! customer-facing report, falling back to a deterministic local report.

pub mod catalog;
pub mod config;
pub mod error;
pub mod explain;
pub mod providers;
pub mod telemetry;
