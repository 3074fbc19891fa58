//! Routes node occurrences to the rules registered for their category.

use crate::config::RuleSetConfig;
use crate::context::SemanticContext;
use crate::diagnostic::{Diagnostic, Severity};
use crate::rule::{Node, NodeCategory, Rule, RuleBox};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, error, warn};

/// Identifier carried by fault-isolation diagnostics.
pub const RULE_FAULT_IDENTIFIER: &str = "internal.ruleFault";

/// Static registry of rules, keyed by node category.
///
/// Registration happens once at engine start; after that the dispatcher is
/// read-only and units may be dispatched from parallel workers, each with
/// its own [`SemanticContext`]. Within one unit, rules run sequentially in
/// registration order so diagnostic ordering is deterministic.
#[derive(Default)]
pub struct Dispatcher {
    rules: HashMap<NodeCategory, Vec<RuleBox>>,
    config: RuleSetConfig,
}

impl Dispatcher {
    /// Creates a dispatcher with no configuration overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a dispatcher honoring the given rule-set configuration.
    #[must_use]
    pub fn with_config(config: RuleSetConfig) -> Self {
        Self {
            rules: HashMap::new(),
            config,
        }
    }

    /// Registers a rule for its own category.
    ///
    /// A rule disabled by configuration is dropped here, once, instead of
    /// being consulted on every node.
    pub fn register<R: Rule + 'static>(&mut self, rule: R) {
        self.register_box(Box::new(rule));
    }

    /// Registers a boxed rule.
    pub fn register_box(&mut self, rule: RuleBox) {
        if !self.config.is_enabled(rule.identifier()) {
            debug!(identifier = rule.identifier(), "skipping disabled rule");
            return;
        }
        self.rules.entry(rule.category()).or_default().push(rule);
    }

    /// Number of registered (enabled) rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    /// Dispatches one node occurrence to every rule registered for its
    /// category and concatenates their diagnostics.
    ///
    /// A node whose actual shape contradicts the host-supplied category is
    /// a host contract violation: the unit is abandoned with an empty
    /// result and an error log, and the next unit is unaffected. A rule
    /// that panics is isolated into a single [`RULE_FAULT_IDENTIFIER`]
    /// diagnostic; the remaining rules still run. Diagnostic severity is
    /// the configured override when one exists, otherwise the rule's
    /// [`Rule::default_severity`].
    #[must_use]
    pub fn dispatch(
        &self,
        node: &Node<'_>,
        category: NodeCategory,
        ctx: &SemanticContext<'_>,
    ) -> Vec<Diagnostic> {
        if node.category() != category {
            error!(
                file = %ctx.file().display(),
                supplied = %category,
                actual = %node.category(),
                "host supplied an inconsistent node/category pairing, abandoning unit"
            );
            return Vec::new();
        }

        let Some(rules) = self.rules.get(&category) else {
            return Vec::new();
        };

        let mut diagnostics = Vec::new();
        for rule in rules {
            match catch_unwind(AssertUnwindSafe(|| rule.check(node, ctx))) {
                Ok(mut produced) => {
                    // Severity is assigned centrally: a configuration
                    // override wins, otherwise the rule's default applies.
                    let severity = self
                        .config
                        .severity_override(rule.identifier())
                        .unwrap_or_else(|| rule.default_severity());
                    for diagnostic in &mut produced {
                        diagnostic.severity = severity;
                    }
                    diagnostics.extend(produced);
                }
                Err(payload) => {
                    let reason = panic_message(payload.as_ref());
                    warn!(
                        identifier = rule.identifier(),
                        reason, "rule raised an internal fault, continuing with remaining rules"
                    );
                    diagnostics.push(
                        Diagnostic::new(
                            RULE_FAULT_IDENTIFIER,
                            format!(
                                "Rule `{}` raised an internal fault: {reason}",
                                rule.identifier()
                            ),
                        )
                        .with_severity(Severity::Warning),
                    );
                }
            }
        }
        diagnostics
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
