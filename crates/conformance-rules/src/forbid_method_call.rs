//! Rule forbidding calls of a named method inside method bodies.

use conformance_core::{
    Diagnostic, Node, NodeCategory, Receiver, Rule, Selector, SemanticContext, SyntaxPattern,
    TreeSearch,
};

/// Forbids method bodies of matched owner types from calling a named
/// method on an accepted receiver kind.
///
/// Typical uses: "repositories never manage transactions themselves
/// (`begin_transaction`, `commit`, `rollback`)", "integration tests never
/// talk to the entity manager directly". One diagnostic per occurrence.
#[derive(Debug, Clone)]
pub struct ForbidMethodCall {
    identifier: String,
    owner: Selector,
    method: String,
    receiver: Receiver,
    tips: Vec<String>,
}

impl ForbidMethodCall {
    /// Creates the rule.
    #[must_use]
    pub fn new(
        identifier: impl Into<String>,
        owner: Selector,
        method: impl Into<String>,
        receiver: Receiver,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            owner,
            method: method.into(),
            receiver,
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

impl Rule for ForbidMethodCall {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Method
    }

    fn description(&self) -> &str {
        "Method bodies of selected types must not call a forbidden method"
    }

    fn check(&self, node: &Node<'_>, ctx: &SemanticContext<'_>) -> Vec<Diagnostic> {
        let Node::Method { owner, method } = node else {
            return Vec::new();
        };
        if !self.owner.matches(owner) {
            return Vec::new();
        }
        let Some(body) = &method.body else {
            return Vec::new();
        };

        let search = TreeSearch::new(ctx.imports());
        let pattern = SyntaxPattern::MethodCall {
            method: self.method.clone(),
            receiver: self.receiver.clone(),
        };
        search
            .find_all(body, &pattern)
            .into_iter()
            .map(|found| {
                let mut diagnostic = Diagnostic::new(
                    &self.identifier,
                    format!(
                        "`{}::{}` calls forbidden method `{}` (`{}`)",
                        owner.qualified_name(),
                        method.name,
                        self.method,
                        found.text
                    ),
                )
                .with_line(ctx.absolute_line(found.line));
                for tip in &self.tips {
                    diagnostic = diagnostic.with_tip(tip.clone());
                }
                diagnostic
            })
            .collect()
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

    fn repository(body_src: &str) -> Arc<TypeDescriptor> {
        let body: syn::Block = syn::parse_str(body_src).expect("fixture must parse");
        TypeDescriptor::builder("app::UserRepository")
            .method(MethodDescriptor::new("save").with_body(body))
            .build()
    }

    fn rule() -> ForbidMethodCall {
        ForbidMethodCall::new(
            "repository.transactionHandling",
            Selector::name_matches("Repository$", false).expect("static pattern"),
            "begin_transaction",
            Receiver::CurrentInstance,
        )
        .with_tip("Let the calling service own the transaction boundary")
    }

    #[test]
    fn flags_transaction_call_on_current_instance() {
        let resolver = EmptyResolver;
        let ctx = SemanticContext::new(&resolver, ImportContext::new(), "src/repo.rs", 5);

        let owner = repository("{ self.begin_transaction(); self.em.begin_transaction(); }");
        let node = Node::Method {
            owner: &owner,
            method: &owner.methods()[0],
        };
        let diagnostics = rule().check(&node, &ctx);
        // `self.x.begin_transaction()` still acts for the current instance.
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].identifier, "repository.transactionHandling");
    }

    #[test]
    fn calls_on_locals_are_outside_a_current_instance_pattern() {
        let resolver = EmptyResolver;
        let ctx = SemanticContext::new(&resolver, ImportContext::new(), "src/repo.rs", 5);

        let owner = repository("{ helper.begin_transaction(); }");
        let node = Node::Method {
            owner: &owner,
            method: &owner.methods()[0],
        };
        assert!(rule().check(&node, &ctx).is_empty());
    }

    #[test]
    fn non_repository_owner_is_skipped() {
        let resolver = EmptyResolver;
        let ctx = SemanticContext::new(&resolver, ImportContext::new(), "src/svc.rs", 1);

        let body: syn::Block =
            syn::parse_str("{ self.begin_transaction(); }").expect("fixture must parse");
        let owner = TypeDescriptor::builder("app::UserService")
            .method(MethodDescriptor::new("save").with_body(body))
            .build();
        let node = Node::Method {
            owner: &owner,
            method: &owner.methods()[0],
        };
        assert!(rule().check(&node, &ctx).is_empty());
    }
}
