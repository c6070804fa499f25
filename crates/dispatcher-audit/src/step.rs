//! Audit step and operation records
//!
//! A step corresponds to one conversion rule. It is "performed" as soon as
//! at least one operation was recorded against it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of change an operation made to the converted tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    /// A file was copied into the tree
    Added,
    /// A file or folder was deleted
    Deleted,
    /// A line or block was removed or commented out inside a file
    Removed,
    /// A file, folder or link target was renamed
    Renamed,
    /// A line, include or section body was replaced
    Replaced,
    /// Nothing changed, but the user has to look at something
    Warning,
}

impl OperationKind {
    /// Label used in the report table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "Added",
            Self::Deleted => "Deleted",
            Self::Removed => "Removed",
            Self::Renamed => "Renamed",
            Self::Replaced => "Replaced",
            Self::Warning => "Warning",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single change performed while executing a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditOperation {
    /// The kind of change
    pub kind: OperationKind,
    /// Where the change happened (a file, a folder, or `file:line`)
    pub location: String,
    /// Human-readable gist of the change
    pub action: String,
}

impl AuditOperation {
    /// Create a new operation record
    pub fn new(kind: OperationKind, location: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            kind,
            location: location.into(),
            action: action.into(),
        }
    }
}

/// One conversion rule and the operations it performed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// Short rule title
    pub rule: String,
    /// Longer explanation of what the rule does
    pub description: String,
    /// Operations in the order they were performed
    pub operations: Vec<AuditOperation>,
}

impl AuditStep {
    /// Create an empty step for a rule
    pub fn new(rule: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            description: description.into(),
            operations: Vec::new(),
        }
    }

    /// Append an operation
    pub fn record(
        &mut self,
        kind: OperationKind,
        location: impl Into<String>,
        action: impl Into<String>,
    ) {
        self.operations
            .push(AuditOperation::new(kind, location, action));
    }

    /// Whether at least one operation has been recorded
    pub fn is_performed(&self) -> bool {
        !self.operations.is_empty()
    }

    /// Number of operations of the given kind
    pub fn count(&self, kind: OperationKind) -> usize {
        self.operations.iter().filter(|op| op.kind == kind).count()
    }

    /// Operations flagged as warnings
    pub fn warnings(&self) -> impl Iterator<Item = &AuditOperation> {
        self.operations
            .iter()
            .filter(|op| op.kind == OperationKind::Warning)
    }
}
