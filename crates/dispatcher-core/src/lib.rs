//! Conversion rules and orchestration for the dispatcher converter
//!
//! This crate composes the rewrite engine into the ordered rule set that
//! migrates a managed-services dispatcher configuration to the cloud layout:
//!
//! - **Configuration**: [`ConverterConfig`], every setting defaulted
//! - **Templates**: default fragments from the SDK via [`TemplateProvider`]
//! - **Rules**: one [`ConversionRule`] per migration step
//! - **Converter**: runs the rules in order and returns the audit report
//!
//! # Architecture
//!
//! ```text
//!                 dispatcher-cli
//!                       |
//!                dispatcher-core
//!                       |
//!         +-------------+-------------+
//!         |             |             |
//! dispatcher-rewrite dispatcher-fs dispatcher-audit
//! ```

pub mod config;
pub mod converter;
pub mod error;
pub mod rule;
pub mod rules;
pub mod templates;

pub use config::{ConverterConfig, VariableRename};
pub use converter::Converter;
pub use error::{Error, Result};
pub use rule::{Context, ConversionRule};
pub use templates::{SdkTemplates, TemplateProvider};
