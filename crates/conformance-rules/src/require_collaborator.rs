//! Rule requiring a test class to drive its covered type through a
//! designated collaborator.

use conformance_core::{
    Diagnostic, Node, NodeCategory, Receiver, Rule, Selector, SemanticContext, SyntaxPattern,
    TreeSearch, TypeDescriptor,
};
use tracing::debug;

/// Requires that a matched test type whose covers-attribute names a type
/// extending a given base uses a collaborator type in at least one method
/// body.
///
/// The canonical instance: a test covering a console command must exercise
/// it through the command tester rather than poking the command by hand.
/// Usage is recognized as an instantiation of the collaborator, a
/// reference to a conventionally named local, or an access of a
/// conventionally named field on the test instance.
///
/// When the covered type cannot be resolved the rule skips; a missing
/// dependency must not produce noise.
#[derive(Debug, Clone)]
pub struct RequireCollaborator {
    identifier: String,
    applies_to: Selector,
    covers_attribute: String,
    covered_base: String,
    collaborator: String,
    conventional_name: Option<String>,
    tips: Vec<String>,
}

impl RequireCollaborator {
    /// Creates the rule.
    ///
    /// `covers_attribute` names the attribute whose first argument (or
    /// `target` named argument) references the covered type;
    /// `covered_base` restricts the rule to covered types extending it;
    /// `collaborator` is the type that must be used.
    #[must_use]
    pub fn new(
        identifier: impl Into<String>,
        applies_to: Selector,
        covers_attribute: impl Into<String>,
        covered_base: impl Into<String>,
        collaborator: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            applies_to,
            covers_attribute: covers_attribute.into(),
            covered_base: covered_base.into(),
            collaborator: collaborator.into(),
            conventional_name: None,
            tips: Vec::new(),
        }
    }

    /// Also accepts a conventionally named local or instance field as
    /// evidence of use (e.g., `command_tester`).
    #[must_use]
    pub fn with_conventional_name(mut self, name: impl Into<String>) -> Self {
        self.conventional_name = Some(name.into());
        self
    }

    /// Adds a remediation tip to emitted diagnostics.
    #[must_use]
    pub fn with_tip(mut self, tip: impl Into<String>) -> Self {
        self.tips.push(tip.into());
        self
    }

    /// The covered type, when the attribute names one that extends the
    /// configured base. Any resolution gap returns `None`.
    fn covered_type(
        &self,
        ty: &TypeDescriptor,
        ctx: &SemanticContext<'_>,
    ) -> Option<std::sync::Arc<TypeDescriptor>> {
        let attribute = ty.attribute(&self.covers_attribute)?;
        let covered = attribute.argument("target", 0)?.as_type_ref()?;
        match ctx.model().resolve(covered, ctx.imports()) {
            Ok(covered_ty) => ctx
                .model()
                .is_subtype_of(&covered_ty, &self.covered_base)
                .then_some(covered_ty),
            Err(_) => {
                debug!(covered, "covered type is unresolved, skipping");
                None
            }
        }
    }

    fn uses_collaborator(&self, ty: &TypeDescriptor, ctx: &SemanticContext<'_>) -> bool {
        let search = TreeSearch::new(ctx.imports());
        let mut patterns = vec![SyntaxPattern::Instantiation {
            type_name: self.collaborator.clone(),
        }];
        if let Some(name) = &self.conventional_name {
            patterns.push(SyntaxPattern::VariableRef { name: name.clone() });
            patterns.push(SyntaxPattern::MemberAccess {
                member: name.clone(),
                receiver: Receiver::CurrentInstance,
            });
        }

        ty.methods()
            .iter()
            .filter_map(|m| m.body.as_ref())
            .any(|body| patterns.iter().any(|p| search.any(body, p)))
    }
}

impl Rule for RequireCollaborator {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::TypeDecl
    }

    fn description(&self) -> &str {
        "Tests covering selected types must drive them through a collaborator"
    }

    fn check(&self, node: &Node<'_>, ctx: &SemanticContext<'_>) -> Vec<Diagnostic> {
        let Node::TypeDecl(ty) = node else {
            return Vec::new();
        };
        if !self.applies_to.matches(ty) {
            return Vec::new();
        }
        let Some(covered) = self.covered_type(ty, ctx) else {
            return Vec::new();
        };
        if self.uses_collaborator(ty, ctx) {
            return Vec::new();
        }

        let mut diagnostic = Diagnostic::new(
            &self.identifier,
            format!(
                "Test `{}` covers `{}` but never uses `{}`",
                ty.qualified_name(),
                covered.qualified_name(),
                self.collaborator
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
