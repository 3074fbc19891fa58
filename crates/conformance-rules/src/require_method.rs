//! Rule requiring selected types to expose a method.

use conformance_core::{
    Diagnostic, Node, NodeCategory, Rule, Selector, SemanticContext, Visibility,
};

/// Requires matched types to expose a method, anywhere on the ancestor
/// chain, optionally with a required visibility.
///
/// Typical use: "integration tests hook setup through `on_set_up`, not by
/// overriding the framework's own lifecycle method".
#[derive(Debug, Clone)]
pub struct RequireMethod {
    identifier: String,
    applies_to: Selector,
    method: String,
    visibility: Option<Visibility>,
    tips: Vec<String>,
}

impl RequireMethod {
    /// Creates the rule.
    #[must_use]
    pub fn new(
        identifier: impl Into<String>,
        applies_to: Selector,
        method: impl Into<String>,
        visibility: Option<Visibility>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            applies_to,
            method: method.into(),
            visibility,
            tips: Vec::new(),
        }
    }

    /// Adds a remediation tip to emitted diagnostics.
    #[must_use]
    pub fn with_tip(mut self, tip: impl Into<String>) -> Self {
        self.tips.push(tip.into());
        self
    }
}

impl Rule for RequireMethod {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::TypeDecl
    }

    fn description(&self) -> &str {
        "Selected types must expose a required method"
    }

    fn check(&self, node: &Node<'_>, ctx: &SemanticContext<'_>) -> Vec<Diagnostic> {
        let Node::TypeDecl(ty) = node else {
            return Vec::new();
        };
        if !self.applies_to.matches(ty) {
            return Vec::new();
        }
        if ctx.model().has_method(ty, &self.method, self.visibility) {
            return Vec::new();
        }

        let mut diagnostic = Diagnostic::new(
            &self.identifier,
            format!(
                "Type `{}` must expose a `{}` method",
                ty.qualified_name(),
                self.method
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
    use conformance_core::{
        ImportContext, MethodDescriptor, ResolveError, TypeDescriptor, TypeResolver,
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

    fn rule() -> RequireMethod {
        RequireMethod::new(
            "command.missingExecute",
            Selector::name_matches("Command$", false).expect("static pattern"),
            "execute",
            Some(Visibility::Public),
        )
    }

    // A public `execute` three ancestor levels up satisfies the rule; a
    // private one does not.
    #[test]
    fn inherited_method_visibility_decides() {
        let resolver = EmptyResolver;
        let ctx = SemanticContext::new(&resolver, ImportContext::new(), "src/app.rs", 1);

        let public_root = TypeDescriptor::builder("fw::Command")
            .method(MethodDescriptor::new("execute").with_visibility(Visibility::Public))
            .build();
        let mid = TypeDescriptor::builder("fw::BaseCommand").parent(public_root).build();
        let near = TypeDescriptor::builder("app::AppCommand").parent(mid).build();
        let ok = TypeDescriptor::builder("app::SyncCommand").parent(near).build();
        assert!(rule().check(&Node::TypeDecl(&ok), &ctx).is_empty());

        let private_root = TypeDescriptor::builder("fw::Command")
            .method(MethodDescriptor::new("execute").with_visibility(Visibility::Private))
            .build();
        let mid = TypeDescriptor::builder("fw::BaseCommand").parent(private_root).build();
        let near = TypeDescriptor::builder("app::AppCommand").parent(mid).build();
        let bad = TypeDescriptor::builder("app::SyncCommand").parent(near).build();
        let diagnostics = rule().check(&Node::TypeDecl(&bad), &ctx);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].identifier, "command.missingExecute");
    }

    #[test]
    fn missing_method_is_flagged() {
        let resolver = EmptyResolver;
        let ctx = SemanticContext::new(&resolver, ImportContext::new(), "src/app.rs", 1);
        let ty = TypeDescriptor::builder("app::SyncCommand").build();

        assert_eq!(rule().check(&Node::TypeDecl(&ty), &ctx).len(), 1);
    }
}
