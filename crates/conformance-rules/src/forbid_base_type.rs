//! Rule forbidding selected types from extending a given base type.

use conformance_core::{Diagnostic, Node, NodeCategory, Rule, Selector, SemanticContext};

/// Forbids types matched by a selector from extending a given base.
///
/// Typical use: "service tests must not inherit the raw framework test
/// case directly; go through the shared abstract case instead".
#[derive(Debug, Clone)]
pub struct ForbidBaseType {
    identifier: String,
    applies_to: Selector,
    base: String,
    tips: Vec<String>,
}

impl ForbidBaseType {
    /// Creates the rule.
    #[must_use]
    pub fn new(
        identifier: impl Into<String>,
        applies_to: Selector,
        base: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            applies_to,
            base: base.into(),
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

impl Rule for ForbidBaseType {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::TypeDecl
    }

    fn description(&self) -> &str {
        "Selected types must not extend a forbidden base type"
    }

    fn check(&self, node: &Node<'_>, _ctx: &SemanticContext<'_>) -> Vec<Diagnostic> {
        let Node::TypeDecl(ty) = node else {
            return Vec::new();
        };
        if !self.applies_to.matches(ty) {
            return Vec::new();
        }
        if !ty
            .ancestors()
            .iter()
            .any(|a| a.qualified_name() == self.base)
        {
            return Vec::new();
        }

        let mut diagnostic = Diagnostic::new(
            &self.identifier,
            format!(
                "Type `{}` must not extend `{}`",
                ty.qualified_name(),
                self.base
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
