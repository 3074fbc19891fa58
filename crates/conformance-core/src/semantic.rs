//! Per-unit semantic resolution with memoization.
//!
//! The host analysis engine owns the real reflection data. The core only
//! sees it through the [`TypeResolver`] callback, wrapped in a
//! [`SemanticModel`] that caches every answer (hits and misses) for the
//! lifetime of one analysis unit, so repeated queries are cheap and
//! structurally equal.

use crate::descriptor::{MethodDescriptor, TypeDescriptor, Visibility};
use crate::imports::ImportContext;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Resolution failures.
///
/// `UnresolvedType` and `UnresolvedMember` are expected and common (the
/// target may live outside the analyzed set). Rules must treat them as
/// "skip, cannot evaluate", never as a violation and never as fatal.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The named type is not known to the host.
    #[error("unresolved type `{name}`")]
    UnresolvedType {
        /// The name that failed to resolve.
        name: String,
    },

    /// The named member is not known on the given type.
    #[error("unresolved member `{member}` on `{type_name}`")]
    UnresolvedMember {
        /// The owning type.
        type_name: String,
        /// The member that failed to resolve.
        member: String,
    },
}

/// Host-supplied resolution callback.
///
/// `resolve` receives a fully qualified name; short-name disambiguation
/// through the unit's import table happens in [`SemanticModel::resolve`]
/// before this is called.
pub trait TypeResolver {
    /// Resolves a qualified type name to its descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnresolvedType`] when the type is unknown.
    fn resolve(&self, qualified_name: &str) -> Result<Arc<TypeDescriptor>, ResolveError>;
}

/// Memoizing, unit-local view over a [`TypeResolver`].
///
/// Not `Sync` by design: one model per analysis unit, discarded with it.
pub struct SemanticModel<'a> {
    resolver: &'a dyn TypeResolver,
    cache: RefCell<HashMap<String, Result<Arc<TypeDescriptor>, ResolveError>>>,
}

impl<'a> SemanticModel<'a> {
    /// Creates a model over the host's resolver.
    #[must_use]
    pub fn new(resolver: &'a dyn TypeResolver) -> Self {
        Self {
            resolver,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Resolves a qualified or short type name.
    ///
    /// Short names are first disambiguated through the unit's import table;
    /// a short name with no import entry cannot be disambiguated and
    /// resolves to [`ResolveError::UnresolvedType`].
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnresolvedType`] when resolution fails.
    pub fn resolve(
        &self,
        name: &str,
        imports: &ImportContext,
    ) -> Result<Arc<TypeDescriptor>, ResolveError> {
        let Some(qualified) = imports.resolve(name) else {
            debug!(name, "short type reference has no import entry, skipping");
            return Err(ResolveError::UnresolvedType {
                name: name.to_string(),
            });
        };

        if let Some(cached) = self.cache.borrow().get(qualified.as_ref()) {
            return cached.clone();
        }

        let resolved = self.resolver.resolve(&qualified);
        self.cache
            .borrow_mut()
            .insert(qualified.into_owned(), resolved.clone());
        resolved
    }

    /// Whether `a` is `b` or a descendant of `b`. `a == b` is a subtype.
    #[must_use]
    pub fn is_subtype_of(&self, a: &TypeDescriptor, b: &str) -> bool {
        a.is_subtype_of(b)
    }

    /// Looks up a method on the type or its ancestors, nearest first.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnresolvedMember`] when no declaration
    /// exists anywhere on the chain; callers skip, exactly as for
    /// unresolved types.
    pub fn resolve_method<'t>(
        &self,
        ty: &'t TypeDescriptor,
        name: &str,
    ) -> Result<&'t MethodDescriptor, ResolveError> {
        ty.find_method(name)
            .ok_or_else(|| ResolveError::UnresolvedMember {
                type_name: ty.qualified_name().to_string(),
                member: name.to_string(),
            })
    }

    /// Whether the type exposes a method with the given name, searching the
    /// full ancestor chain. When `visibility` is given, the nearest
    /// declaration must carry exactly that visibility.
    #[must_use]
    pub fn has_method(
        &self,
        ty: &TypeDescriptor,
        name: &str,
        visibility: Option<Visibility>,
    ) -> bool {
        match self.resolve_method(ty, name) {
            Ok(method) => visibility.map_or(true, |v| method.visibility == v),
            Err(_) => false,
        }
    }
}
