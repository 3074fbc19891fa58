//! Rule trait and the node model rules are dispatched on.

use crate::context::SemanticContext;
use crate::descriptor::{MethodDescriptor, TypeDescriptor};
use crate::diagnostic::{Diagnostic, Severity};

/// The syntactic category of a dispatched node.
///
/// Registration keys on the category; the host tags every node occurrence
/// with its category when calling the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    /// A type declaration, delivered with its full descriptor.
    TypeDecl,
    /// One method of a type, delivered with its owner.
    Method,
    /// A free-standing expression subtree.
    Expression,
}

impl std::fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TypeDecl => write!(f, "type-decl"),
            Self::Method => write!(f, "method"),
            Self::Expression => write!(f, "expression"),
        }
    }
}

/// One syntax node occurrence, as supplied by the host engine.
#[derive(Debug)]
pub enum Node<'a> {
    /// A type declaration.
    TypeDecl(&'a TypeDescriptor),
    /// A method together with its declaring type.
    Method {
        /// The declaring type.
        owner: &'a TypeDescriptor,
        /// The method itself.
        method: &'a MethodDescriptor,
    },
    /// An expression subtree.
    Expression(&'a syn::Expr),
}

impl Node<'_> {
    /// The category this node actually belongs to.
    #[must_use]
    pub fn category(&self) -> NodeCategory {
        match self {
            Self::TypeDecl(_) => NodeCategory::TypeDecl,
            Self::Method { .. } => NodeCategory::Method,
            Self::Expression(_) => NodeCategory::Expression,
        }
    }
}

/// A conformance rule.
///
/// A rule is a pure function from one node occurrence (plus its semantic
/// context) to an ordered collection of diagnostics. Rules must degrade to
/// an empty result when resolution fails: never flag what cannot be
/// evaluated.
///
/// # Example
///
/// ```ignore
/// use conformance_core::{Diagnostic, Node, NodeCategory, Rule, SemanticContext};
///
/// pub struct NoAnonymousTypes;
///
/// impl Rule for NoAnonymousTypes {
///     fn identifier(&self) -> &str { "type.noAnonymous" }
///     fn category(&self) -> NodeCategory { NodeCategory::TypeDecl }
///
///     fn check(&self, node: &Node<'_>, _ctx: &SemanticContext<'_>) -> Vec<Diagnostic> {
///         let Node::TypeDecl(ty) = node else { return Vec::new() };
///         if ty.is_anonymous() {
///             vec![Diagnostic::new(self.identifier(), "Anonymous types are not allowed")]
///         } else {
///             Vec::new()
///         }
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Stable machine identifier (e.g., `"commandTest.missingCommandTester"`).
    ///
    /// Used for suppression and filtering; must not change across versions
    /// for the same rule + condition pairing.
    fn identifier(&self) -> &str;

    /// The node category this rule wants to see.
    fn category(&self) -> NodeCategory;

    /// A brief description of what this rule checks.
    fn description(&self) -> &str {
        ""
    }

    /// Default severity for diagnostics from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Checks one node occurrence.
    fn check(&self, node: &Node<'_>, ctx: &SemanticContext<'_>) -> Vec<Diagnostic>;
}

/// Type alias for boxed rule trait objects.
pub type RuleBox = Box<dyn Rule>;
