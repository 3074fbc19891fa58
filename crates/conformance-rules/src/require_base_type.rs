//! Rule requiring selected types to extend a given base type.

use conformance_core::{Diagnostic, Node, NodeCategory, Rule, Selector, SemanticContext};

/// Requires that every type matched by a selector extends a given base.
///
/// Typical use: "every integration test class must extend the shared
/// integration test case".
#[derive(Debug, Clone)]
pub struct RequireBaseType {
    identifier: String,
    applies_to: Selector,
    base: String,
    tips: Vec<String>,
}

impl RequireBaseType {
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

impl Rule for RequireBaseType {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::TypeDecl
    }

    fn description(&self) -> &str {
        "Selected types must extend a required base type"
    }

    fn check(&self, node: &Node<'_>, _ctx: &SemanticContext<'_>) -> Vec<Diagnostic> {
        let Node::TypeDecl(ty) = node else {
            return Vec::new();
        };
        // The base itself never needs to extend itself.
        if ty.qualified_name() == self.base || !self.applies_to.matches(ty) {
            return Vec::new();
        }
        if ty
            .ancestors()
            .iter()
            .any(|a| a.qualified_name() == self.base)
        {
            return Vec::new();
        }

        let mut diagnostic = Diagnostic::new(
            &self.identifier,
            format!(
                "Type `{}` must extend `{}`",
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
