//! Structural text-rewrite engine for dispatcher configuration fragments.
//!
//! Fragments are treated as ordered lines, not parsed into a syntax tree.
//! The modules locate sections by header and indentation ([`section`]),
//! rewrite include directives ([`include`]), replace or drop section content
//! ([`replace`], [`prune`]), inline and consolidate included files
//! ([`inline`]), enforce a directive whitelist ([`whitelist`]) and scrub
//! variable usage ([`variables`]). Every rewrite records what it did in an
//! [`AuditStep`](dispatcher_audit::AuditStep) and reports whether the
//! fragment changed; [`batch`] applies rewrites across folder trees.

pub mod batch;
pub mod error;
pub mod include;
pub mod indent;
pub mod inline;
pub mod prune;
pub mod replace;
pub mod section;
pub mod variables;
pub mod whitelist;

pub use error::{Error, Result};
pub use include::{IncludeReference, IncludeRewrite, IncludeSyntax};
pub use inline::IncludedContent;
pub use section::{SectionSpan, SectionSyntax};
pub use whitelist::{DisallowedUsage, Whitelist, WhitelistOutcome};
