//! Rule constraining the names of selected types.

use conformance_core::{
    Diagnostic, Node, NodeCategory, Rule, Selector, SelectorError, SemanticContext,
};
use regex::Regex;

/// Requires the names of matched types to satisfy a pattern.
///
/// Typical use: "data fixtures live under the `app::fixture` namespace",
/// "repository types end in `Repository`".
#[derive(Debug, Clone)]
pub struct NameFormat {
    identifier: String,
    applies_to: Selector,
    pattern: Regex,
    match_qualified: bool,
    tips: Vec<String>,
}

impl NameFormat {
    /// Creates the rule.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::InvalidNamePattern`] for a malformed
    /// pattern; the rule must then not be registered.
    pub fn new(
        identifier: impl Into<String>,
        applies_to: Selector,
        pattern: &str,
        match_qualified: bool,
    ) -> Result<Self, SelectorError> {
        let compiled = Regex::new(pattern).map_err(|e| SelectorError::InvalidNamePattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            identifier: identifier.into(),
            applies_to,
            pattern: compiled,
            match_qualified,
            tips: Vec::new(),
        })
    }

    /// Adds a remediation tip to emitted diagnostics.
    #[must_use]
    pub fn with_tip(mut self, tip: impl Into<String>) -> Self {
        self.tips.push(tip.into());
        self
    }
}

impl Rule for NameFormat {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::TypeDecl
    }

    fn description(&self) -> &str {
        "Selected types must have names matching a required pattern"
    }

    fn check(&self, node: &Node<'_>, _ctx: &SemanticContext<'_>) -> Vec<Diagnostic> {
        let Node::TypeDecl(ty) = node else {
            return Vec::new();
        };
        if !self.applies_to.matches(ty) {
            return Vec::new();
        }
        let name = if self.match_qualified {
            ty.qualified_name()
        } else {
            ty.short_name()
        };
        if self.pattern.is_match(name) {
            return Vec::new();
        }

        let mut diagnostic = Diagnostic::new(
            &self.identifier,
            format!(
                "Name of `{}` does not match required pattern `{}`",
                ty.qualified_name(),
                self.pattern.as_str()
            ),
        );
        if ty.line() > 0 {
            diagnostic = diagnostic.with_line(ty.line());
        }
        for tip in &self.tips {
            diagnostic = diagnostic.with_tip(tip.clone());
        }
        vec![diagnostic]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conformance_core::{ImportContext, ResolveError, TypeDescriptor, TypeResolver};
    use std::sync::Arc;

    struct EmptyResolver;

    impl TypeResolver for EmptyResolver {
        fn resolve(&self, name: &str) -> Result<Arc<TypeDescriptor>, ResolveError> {
            Err(ResolveError::UnresolvedType {
                name: name.to_string(),
            })
        }
    }

    #[test]
    fn malformed_pattern_fails_construction() {
        assert!(NameFormat::new("x.y", Selector::all_of(vec![]), "Fixture[", false).is_err());
    }

    #[test]
    fn flags_fixture_outside_fixture_namespace() {
        let resolver = EmptyResolver;
        let ctx = SemanticContext::new(&resolver, ImportContext::new(), "src/app.rs", 1);
        let rule = NameFormat::new(
            "dataFixture.namespace",
            Selector::name_matches("Fixture$", false).expect("static pattern"),
            "^app::fixture::",
            true,
        )
        .expect("static pattern");

        let misplaced = TypeDescriptor::builder("app::service::UserFixture").build();
        let diagnostics = rule.check(&Node::TypeDecl(&misplaced), &ctx);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("app::service::UserFixture"));

        let placed = TypeDescriptor::builder("app::fixture::UserFixture").build();
        assert!(rule.check(&Node::TypeDecl(&placed), &ctx).is_empty());
    }
}
