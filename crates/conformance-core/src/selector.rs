//! Composable predicates over type descriptors.
//!
//! A [`Selector`] is a value: built once when a rule is configured, then
//! evaluated any number of times. Pattern compilation happens in the
//! constructors, so a malformed pattern is a registration-time
//! [`SelectorError`] and evaluation is pure and total; it never fails for
//! a well-formed descriptor.

use crate::descriptor::{TypeDescriptor, Visibility};
use regex::Regex;
use thiserror::Error;

/// Malformed selector configuration.
///
/// Surfaced when a rule is being set up; a rule whose selectors fail to
/// compile must not be registered. Other rules are unaffected.
#[derive(Debug, Error)]
pub enum SelectorError {
    /// A name pattern failed to compile.
    #[error("invalid name pattern `{pattern}`: {reason}")]
    InvalidNamePattern {
        /// The offending pattern.
        pattern: String,
        /// Why it failed to compile.
        reason: String,
    },

    /// A path pattern failed to compile.
    #[error("invalid path pattern `{pattern}`: {reason}")]
    InvalidPathPattern {
        /// The offending pattern.
        pattern: String,
        /// Why it failed to compile.
        reason: String,
    },
}

/// A side-effect-free predicate over a [`TypeDescriptor`].
///
/// Combinators short-circuit left-to-right, so callers can order cheap
/// selectors before expensive ones.
#[derive(Debug, Clone)]
pub enum Selector {
    /// Matches when every inner selector matches.
    AllOf(Vec<Selector>),
    /// Matches when at least one inner selector matches.
    AnyOf(Vec<Selector>),
    /// Inverts the inner selector.
    Not(Box<Selector>),
    /// Matches the type name against a regular expression.
    NameMatches {
        /// Compiled pattern.
        pattern: Regex,
        /// Evaluate against the qualified name instead of the short name.
        match_qualified: bool,
    },
    /// Matches abstract types.
    IsAbstract,
    /// Matches types that strictly extend the given type.
    Extends(String),
    /// Matches types implementing the given capability (transitively).
    ImplementsCapability(String),
    /// Matches types exposing the named method anywhere on the chain.
    HasMethod {
        /// Method name.
        name: String,
        /// Required visibility of the nearest declaration, if any.
        visibility: Option<Visibility>,
    },
    /// Matches the declaring file path against a glob.
    PathMatches(glob::Pattern),
}

impl Selector {
    /// Conjunction of selectors. Empty input matches everything.
    #[must_use]
    pub fn all_of(selectors: Vec<Selector>) -> Self {
        Self::AllOf(selectors)
    }

    /// Disjunction of selectors. Empty input matches nothing.
    #[must_use]
    pub fn any_of(selectors: Vec<Selector>) -> Self {
        Self::AnyOf(selectors)
    }

    /// Negation.
    #[must_use]
    pub fn not(selector: Selector) -> Self {
        Self::Not(Box::new(selector))
    }

    /// Name pattern selector.
    ///
    /// The pattern is a regular expression applied to the full name string;
    /// anchor with `^`/`$` as needed. With `match_qualified` the qualified
    /// name (namespace separators included) is consulted, otherwise the
    /// short name.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::InvalidNamePattern`] for a malformed regex.
    pub fn name_matches(pattern: &str, match_qualified: bool) -> Result<Self, SelectorError> {
        let compiled = Regex::new(pattern).map_err(|e| SelectorError::InvalidNamePattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::NameMatches {
            pattern: compiled,
            match_qualified,
        })
    }

    /// Abstractness selector.
    #[must_use]
    pub fn is_abstract() -> Self {
        Self::IsAbstract
    }

    /// Strict inheritance selector: the type itself does not match.
    #[must_use]
    pub fn extends(qualified_name: impl Into<String>) -> Self {
        Self::Extends(qualified_name.into())
    }

    /// Capability selector; capabilities are resolved transitively.
    #[must_use]
    pub fn implements_capability(name: impl Into<String>) -> Self {
        Self::ImplementsCapability(name.into())
    }

    /// Method-presence selector over the full ancestor chain.
    #[must_use]
    pub fn has_method(name: impl Into<String>, visibility: Option<Visibility>) -> Self {
        Self::HasMethod {
            name: name.into(),
            visibility,
        }
    }

    /// File-path selector; this is how file-scoped checks are expressed.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::InvalidPathPattern`] for a malformed glob.
    pub fn path_matches(pattern: &str) -> Result<Self, SelectorError> {
        let compiled =
            glob::Pattern::new(pattern).map_err(|e| SelectorError::InvalidPathPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self::PathMatches(compiled))
    }

    /// Evaluates the selector against a descriptor.
    #[must_use]
    pub fn matches(&self, target: &TypeDescriptor) -> bool {
        match self {
            Self::AllOf(inner) => inner.iter().all(|s| s.matches(target)),
            Self::AnyOf(inner) => inner.iter().any(|s| s.matches(target)),
            Self::Not(inner) => !inner.matches(target),
            Self::NameMatches {
                pattern,
                match_qualified,
            } => {
                let name = if *match_qualified {
                    target.qualified_name()
                } else {
                    target.short_name()
                };
                pattern.is_match(name)
            }
            Self::IsAbstract => target.is_abstract(),
            Self::Extends(base) => target
                .ancestors()
                .iter()
                .any(|a| a.qualified_name() == base),
            Self::ImplementsCapability(name) => target.capabilities().contains(name),
            Self::HasMethod { name, visibility } => match target.find_method(name) {
                Some(method) => visibility.map_or(true, |v| method.visibility == v),
                None => false,
            },
            Self::PathMatches(pattern) => {
                pattern.matches(&target.file().to_string_lossy())
            }
        }
    }
}
