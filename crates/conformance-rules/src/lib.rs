//! # conformance-rules
//!
//! Built-in conformance rules for the conformance checker.
//!
//! Each rule is a small, configurable building block: a selector chooses
//! the types it applies to, the rule states one convention, and every
//! finding comes back as a [`Diagnostic`]. Project-specific rule packs are
//! assembled from these blocks, or from the bundles in [`presets`].
//!
//! ## Available Rules
//!
//! | Name | Applies to | Description |
//! |------|------------|-------------|
//! | `RequireBaseType` | type declarations | Matched types must extend a base |
//! | `ForbidBaseType` | type declarations | Matched types must not extend a base |
//! | `NameFormat` | type declarations | Matched type names must satisfy a pattern |
//! | `RequireAttribute` | type declarations | Matched types must carry an attribute, optionally with a well-formed argument |
//! | `RequireMethod` | type declarations | Matched types must expose a method, anywhere on the ancestor chain |
//! | `RequireCollaborator` | type declarations | Matched test types must drive their covered type through a collaborator |
//! | `ForbidInstantiation` | method bodies | Matched owners must not instantiate a type directly |
//! | `ForbidMethodCall` | method bodies | Matched owners must not call a method on a receiver kind |
//!
//! ## Usage
//!
//! ```ignore
//! use conformance_core::{Dispatcher, Selector};
//! use conformance_rules::RequireBaseType;
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.register(RequireBaseType::new(
//!     "integrationTest.missingBase",
//!     Selector::name_matches("Test$", false)?,
//!     "testing::IntegrationTestCase",
//! ));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod forbid_base_type;
mod forbid_instantiation;
mod forbid_method_call;
mod name_format;
mod presets;
mod require_attribute;
mod require_base_type;
mod require_collaborator;
mod require_method;

pub use forbid_base_type::ForbidBaseType;
pub use forbid_instantiation::ForbidInstantiation;
pub use forbid_method_call::ForbidMethodCall;
pub use name_format::NameFormat;
pub use presets::{all_rules, command_rules, command_test_rules, repository_rules, Preset};
pub use require_attribute::{ArgumentRequirement, RequireAttribute};
pub use require_base_type::RequireBaseType;
pub use require_collaborator::RequireCollaborator;
pub use require_method::RequireMethod;

/// Re-export core types for convenience.
pub use conformance_core::{Diagnostic, Rule, Selector, Severity};
