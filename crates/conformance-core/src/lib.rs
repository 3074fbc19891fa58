//! # conformance-core
//!
//! Core framework for architectural conformance checking.
//!
//! A host static-analysis engine parses source, builds reflection
//! descriptors, and feeds syntax node occurrences to this crate one at a
//! time. The crate provides the generic substructure every concrete check
//! is built on:
//!
//! - [`TypeDescriptor`] and friends: an immutable semantic reflection model
//! - [`Selector`]: a composable predicate algebra over descriptors
//! - [`TreeSearch`] with [`SyntaxPattern`]: declarative search inside
//!   method bodies
//! - [`Dispatcher`]: routes each node occurrence to the rules registered
//!   for its category and aggregates their [`Diagnostic`]s
//!
//! ## Example
//!
//! ```ignore
//! use conformance_core::{Dispatcher, Node, NodeCategory, SemanticContext};
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.register(MyRule::new()?);
//!
//! // Per analysis unit, driven by the host:
//! let ctx = SemanticContext::new(&resolver, imports, "src/app.rs", 1);
//! let diagnostics = dispatcher.dispatch(&node, NodeCategory::TypeDecl, &ctx);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod descriptor;
mod diagnostic;
mod dispatcher;
mod imports;
mod rule;
mod search;
mod selector;
mod semantic;

pub use config::{ConfigError, RuleOptions, RuleSetConfig};
pub use context::SemanticContext;
pub use descriptor::{
    AttributeDescriptor, AttributeValue, ConstantDescriptor, LiteralValue, MethodDescriptor,
    TypeDescriptor, TypeDescriptorBuilder, Visibility,
};
pub use diagnostic::{Diagnostic, DiagnosticReport, Severity};
pub use dispatcher::{Dispatcher, RULE_FAULT_IDENTIFIER};
pub use imports::ImportContext;
pub use rule::{Node, NodeCategory, Rule, RuleBox};
pub use search::{FoundInstantiation, Receiver, SearchMatch, SyntaxPattern, TreeSearch};
pub use selector::{Selector, SelectorError};
pub use semantic::{ResolveError, SemanticModel, TypeResolver};
