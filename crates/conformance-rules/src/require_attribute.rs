//! Rule requiring selected types to carry an attribute, optionally with a
//! well-formed argument.

use conformance_core::{
    AttributeValue, Diagnostic, Node, NodeCategory, Rule, Selector, SelectorError,
    SemanticContext,
};
use regex::Regex;
use tracing::debug;

/// A constraint on one argument of the required attribute.
#[derive(Debug, Clone)]
pub struct ArgumentRequirement {
    name: String,
    position: usize,
    pattern: Option<Regex>,
}

impl ArgumentRequirement {
    /// Requires the argument to be present (named or positional).
    #[must_use]
    pub fn present(name: impl Into<String>, position: usize) -> Self {
        Self {
            name: name.into(),
            position,
            pattern: None,
        }
    }

    /// Requires the argument to be a string literal matching a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::InvalidNamePattern`] for a malformed
    /// pattern.
    pub fn matching(
        name: impl Into<String>,
        position: usize,
        pattern: &str,
    ) -> Result<Self, SelectorError> {
        let compiled = Regex::new(pattern).map_err(|e| SelectorError::InvalidNamePattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            name: name.into(),
            position,
            pattern: Some(compiled),
        })
    }
}

/// Requires matched types to carry an attribute.
///
/// Typical uses: "commands must carry `AsCommand`", "the command name in
/// `AsCommand` must be kebab-case with an `app:` prefix", "commands must
/// declare a non-empty description".
#[derive(Debug, Clone)]
pub struct RequireAttribute {
    identifier: String,
    applies_to: Selector,
    attribute: String,
    argument: Option<ArgumentRequirement>,
    tips: Vec<String>,
}

impl RequireAttribute {
    /// Creates the rule.
    #[must_use]
    pub fn new(
        identifier: impl Into<String>,
        applies_to: Selector,
        attribute: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            applies_to,
            attribute: attribute.into(),
            argument: None,
            tips: Vec::new(),
        }
    }

    /// Adds an argument constraint.
    #[must_use]
    pub fn with_argument(mut self, argument: ArgumentRequirement) -> Self {
        self.argument = Some(argument);
        self
    }

    /// Adds a remediation tip to emitted diagnostics.
    #[must_use]
    pub fn with_tip(mut self, tip: impl Into<String>) -> Self {
        self.tips.push(tip.into());
        self
    }

    fn decorate(&self, mut diagnostic: Diagnostic, line: usize) -> Diagnostic {
        if line > 0 {
            diagnostic = diagnostic.with_line(line);
        }
        for tip in &self.tips {
            diagnostic = diagnostic.with_tip(tip.clone());
        }
        diagnostic
    }
}

impl Rule for RequireAttribute {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::TypeDecl
    }

    fn description(&self) -> &str {
        "Selected types must carry a required attribute"
    }

    fn check(&self, node: &Node<'_>, _ctx: &SemanticContext<'_>) -> Vec<Diagnostic> {
        let Node::TypeDecl(ty) = node else {
            return Vec::new();
        };
        if !self.applies_to.matches(ty) {
            return Vec::new();
        }

        let Some(attribute) = ty.attribute(&self.attribute) else {
            return vec![self.decorate(
                Diagnostic::new(
                    &self.identifier,
                    format!(
                        "Type `{}` is missing the `{}` attribute",
                        ty.qualified_name(),
                        self.attribute
                    ),
                ),
                ty.line(),
            )];
        };

        let Some(requirement) = &self.argument else {
            return Vec::new();
        };

        let Some(value) = attribute.argument(&requirement.name, requirement.position) else {
            return vec![self.decorate(
                Diagnostic::new(
                    &self.identifier,
                    format!(
                        "Attribute `{}` on `{}` is missing its `{}` argument",
                        self.attribute,
                        ty.qualified_name(),
                        requirement.name
                    ),
                ),
                ty.line(),
            )];
        };

        let Some(pattern) = &requirement.pattern else {
            return Vec::new();
        };
        let Some(text) = value.as_str() else {
            // Not a statically known string: cannot evaluate, never flag.
            if matches!(value, AttributeValue::Unresolved) {
                debug!(
                    attribute = %self.attribute,
                    "attribute argument is unresolved, skipping"
                );
            }
            return Vec::new();
        };
        if pattern.is_match(text) {
            return Vec::new();
        }

        vec![self.decorate(
            Diagnostic::new(
                &self.identifier,
                format!(
                    "Argument `{}` of `{}` on `{}` has value `{text}`, which does not match `{}`",
                    requirement.name,
                    self.attribute,
                    ty.qualified_name(),
                    pattern.as_str()
                ),
            ),
            ty.line(),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conformance_core::{
        AttributeDescriptor, ImportContext, LiteralValue, ResolveError, TypeDescriptor,
        TypeResolver,
    };
    use std::sync::Arc;

    struct EmptyResolver;

    impl TypeResolver for EmptyResolver {
        fn resolve(&self, name: &str) -> Result<Arc<TypeDescriptor>, ResolveError> {
            Err(ResolveError::UnresolvedType {
                name: name.to_string(),
            })
        }
    }

    fn ctx(resolver: &EmptyResolver) -> SemanticContext<'_> {
        SemanticContext::new(resolver, ImportContext::new(), "src/app.rs", 1)
    }

    fn command_selector() -> Selector {
        Selector::name_matches("Command$", false).expect("static pattern")
    }

    fn name_format_rule() -> RequireAttribute {
        RequireAttribute::new(
            "command.nameFormat",
            command_selector(),
            "AsCommand",
        )
        .with_argument(
            ArgumentRequirement::matching("name", 0, "^app:[a-z][a-z0-9-]*$")
                .expect("static pattern"),
        )
        .with_tip("Command names use the `app:` prefix and kebab-case")
    }

    #[test]
    fn flags_missing_attribute() {
        let resolver = EmptyResolver;
        let ctx = ctx(&resolver);
        let ty = TypeDescriptor::builder("app::SyncUsersCommand").build();

        let diagnostics = name_format_rule().check(&Node::TypeDecl(&ty), &ctx);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("missing the `AsCommand`"));
    }

    #[test]
    fn flags_missing_argument() {
        let resolver = EmptyResolver;
        let ctx = ctx(&resolver);
        let ty = TypeDescriptor::builder("app::SyncUsersCommand")
            .attribute(AttributeDescriptor::new("AsCommand"))
            .build();

        let diagnostics = name_format_rule().check(&Node::TypeDecl(&ty), &ctx);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("missing its `name`"));
    }

    #[test]
    fn flags_ill_formed_name_given_positionally() {
        let resolver = EmptyResolver;
        let ctx = ctx(&resolver);
        let ty = TypeDescriptor::builder("app::SyncUsersCommand")
            .attribute(AttributeDescriptor::new("AsCommand").with_positional(
                AttributeValue::Literal(LiteralValue::Str("SyncUsers".into())),
            ))
            .build();

        let diagnostics = name_format_rule().check(&Node::TypeDecl(&ty), &ctx);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("SyncUsers"));
    }

    #[test]
    fn accepts_well_formed_name_given_by_name() {
        let resolver = EmptyResolver;
        let ctx = ctx(&resolver);
        let ty = TypeDescriptor::builder("app::SyncUsersCommand")
            .attribute(AttributeDescriptor::new("AsCommand").with_named(
                "name",
                AttributeValue::Literal(LiteralValue::Str("app:sync-users".into())),
            ))
            .build();

        assert!(name_format_rule().check(&Node::TypeDecl(&ty), &ctx).is_empty());
    }

    #[test]
    fn unresolved_argument_value_is_skipped() {
        let resolver = EmptyResolver;
        let ctx = ctx(&resolver);
        let ty = TypeDescriptor::builder("app::SyncUsersCommand")
            .attribute(
                AttributeDescriptor::new("AsCommand")
                    .with_named("name", AttributeValue::Unresolved),
            )
            .build();

        assert!(name_format_rule().check(&Node::TypeDecl(&ty), &ctx).is_empty());
    }
}
