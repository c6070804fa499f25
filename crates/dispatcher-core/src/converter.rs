//! Running the rule set over a configuration tree

use crate::config::ConverterConfig;
use crate::rule::{Context, ConversionRule};
use crate::rules::default_rules;
use crate::templates::TemplateProvider;
use crate::{Error, Result};
use dispatcher_audit::{AuditStep, ConversionReport};
use std::path::{Path, PathBuf};

/// Converts one configuration tree in place.
pub struct Converter {
    config: ConverterConfig,
    source_root: PathBuf,
    templates: Box<dyn TemplateProvider>,
    rules: Vec<Box<dyn ConversionRule>>,
}

impl Converter {
    /// Create a converter running the full rule set.
    pub fn new(
        config: ConverterConfig,
        source_root: impl Into<PathBuf>,
        templates: impl TemplateProvider + 'static,
    ) -> Self {
        Self {
            config,
            source_root: source_root.into(),
            templates: Box::new(templates),
            rules: default_rules(),
        }
    }

    /// Replace the rule set.
    pub fn with_rules(mut self, rules: Vec<Box<dyn ConversionRule>>) -> Self {
        self.rules = rules;
        self
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Titles of the rules, in execution order.
    pub fn rule_titles(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.title()).collect()
    }

    /// Apply every rule in order and collect what they did.
    ///
    /// Individual file failures are logged by the rules and never abort
    /// the run; only a missing source tree is an error.
    pub fn run(&self) -> Result<ConversionReport> {
        if !self.source_root.is_dir() {
            return Err(Error::SourceNotFound {
                path: self.source_root.clone(),
            });
        }

        let ctx = Context::new(&self.source_root, &self.config, &*self.templates);
        let mut report = ConversionReport::new();

        for rule in &self.rules {
            tracing::info!(rule = rule.title(), "Executing rule");
            let mut step = AuditStep::new(rule.title(), rule.description());
            rule.apply(&ctx, &mut step);
            tracing::debug!(
                rule = rule.title(),
                operations = step.operations.len(),
                "Rule finished"
            );
            report.push(step);
        }

        tracing::info!(
            operations = report.operation_count(),
            "Conversion complete"
        );
        Ok(report)
    }
}
