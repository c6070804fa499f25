//! Audit trail for the dispatcher converter
//!
//! Every conversion rule owns one [`AuditStep`]. Rewrite operations append
//! [`AuditOperation`] records to the step they are handed, and the finished
//! steps are collected into a [`ConversionReport`] which renders the
//! Markdown summary written next to the converted tree.

pub mod error;
pub mod report;
pub mod step;

pub use error::{Error, Result};
pub use report::ConversionReport;
pub use step::{AuditOperation, AuditStep, OperationKind};
