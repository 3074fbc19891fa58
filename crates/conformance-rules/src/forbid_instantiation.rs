//! Rule forbidding direct instantiation of a type inside method bodies.

use conformance_core::{
    Diagnostic, Node, NodeCategory, Rule, Selector, SemanticContext, SyntaxPattern, TreeSearch,
};
use tracing::debug;

/// Forbids method bodies of matched owner types from instantiating a given
/// type directly.
///
/// By default only the named type itself is forbidden. With
/// [`including_subtypes`](Self::including_subtypes) every constructed type
/// that resolves to a subtype of the named base is flagged too, so "tests
/// never construct a command by hand" catches `SyncUsersCommand::new()`
/// and not just the base. A constructed type that cannot be resolved is
/// skipped. One diagnostic is emitted per occurrence.
#[derive(Debug, Clone)]
pub struct ForbidInstantiation {
    identifier: String,
    owner: Selector,
    forbidden: String,
    include_subtypes: bool,
    tips: Vec<String>,
}

impl ForbidInstantiation {
    /// Creates the rule.
    #[must_use]
    pub fn new(
        identifier: impl Into<String>,
        owner: Selector,
        forbidden: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            owner,
            forbidden: forbidden.into(),
            include_subtypes: false,
            tips: Vec::new(),
        }
    }

    /// Also forbids instantiation of every resolvable subtype of the
    /// forbidden type.
    #[must_use]
    pub fn including_subtypes(mut self) -> Self {
        self.include_subtypes = true;
        self
    }

    /// Adds a remediation tip to emitted diagnostics.
    #[must_use]
    pub fn with_tip(mut self, tip: impl Into<String>) -> Self {
        self.tips.push(tip.into());
        self
    }

    fn diagnostic(&self, message: String, line: usize) -> Diagnostic {
        let mut diagnostic = Diagnostic::new(&self.identifier, message).with_line(line);
        for tip in &self.tips {
            diagnostic = diagnostic.with_tip(tip.clone());
        }
        diagnostic
    }
}

impl Rule for ForbidInstantiation {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Method
    }

    fn description(&self) -> &str {
        "Method bodies of selected types must not instantiate a forbidden type"
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
        if self.include_subtypes {
            return search
                .find_instantiations(body)
                .into_iter()
                .filter_map(|found| {
                    let constructed = match ctx.model().resolve(&found.type_name, ctx.imports())
                    {
                        Ok(ty) => ty,
                        Err(_) => {
                            debug!(
                                type_name = %found.type_name,
                                "constructed type is unresolved, skipping"
                            );
                            return None;
                        }
                    };
                    if !ctx.model().is_subtype_of(&constructed, &self.forbidden) {
                        return None;
                    }
                    Some(self.diagnostic(
                        format!(
                            "`{}::{}` instantiates `{}` (extends `{}`) directly",
                            owner.qualified_name(),
                            method.name,
                            constructed.qualified_name(),
                            self.forbidden
                        ),
                        ctx.absolute_line(found.line),
                    ))
                })
                .collect();
        }

        let pattern = SyntaxPattern::Instantiation {
            type_name: self.forbidden.clone(),
        };
        search
            .find_all(body, &pattern)
            .into_iter()
            .map(|found| {
                self.diagnostic(
                    format!(
                        "`{}::{}` instantiates `{}` directly",
                        owner.qualified_name(),
                        method.name,
                        self.forbidden
                    ),
                    ctx.absolute_line(found.line),
                )
            })
            .collect()
    }
}
