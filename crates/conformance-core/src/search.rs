//! Declarative search for code shapes inside a syntax subtree.
//!
//! One general-purpose visitor, parameterized by a [`SyntaxPattern`],
//! replaces per-rule ad-hoc traversals. Traversal is pre-order: a node is
//! tested before its children, siblings left-to-right, so the first match
//! of [`TreeSearch::find_first`] is well defined. Nested and anonymous
//! scopes (closures, nested functions) are searched unless excluded.

use crate::imports::ImportContext;
use quote::ToTokens;
use syn::spanned::Spanned;
use syn::visit::Visit;
use syn::{Expr, ExprCall, ExprField, ExprMethodCall, ExprPath, ExprStruct};

/// Which receiver identities a member-access or method-call pattern accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receiver {
    /// The current instance (`self`, or a field of `self`).
    CurrentInstance,
    /// A named local binding.
    Local(String),
    /// Any local binding, regardless of name.
    AnyLocal,
    /// A static, type-qualified access on the given type.
    Static(String),
    /// Any receiver.
    Any,
}

/// A declarative description of a tree-search target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxPattern {
    /// Construction of the given type (`Type { .. }` or `Type::new(..)`).
    Instantiation {
        /// Short or qualified type name.
        type_name: String,
    },
    /// A call of the named method on an accepted receiver.
    MethodCall {
        /// Method name.
        method: String,
        /// Accepted receiver kinds.
        receiver: Receiver,
    },
    /// An access of the named member on an accepted receiver.
    MemberAccess {
        /// Member name.
        member: String,
        /// Accepted receiver kinds.
        receiver: Receiver,
    },
    /// A reference to the named local binding.
    VariableRef {
        /// Binding name.
        name: String,
    },
}

/// One found occurrence of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    /// 1-indexed line within the searched source.
    pub line: usize,
    /// The matched expression, rendered back to text.
    pub text: String,
}

/// One found construction expression, with the constructed type reference
/// as written in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundInstantiation {
    /// The constructed type, short or qualified as written.
    pub type_name: String,
    /// 1-indexed line within the searched source.
    pub line: usize,
    /// The matched expression, rendered back to text.
    pub text: String,
}

/// Pattern search over a method body.
///
/// Short type references on either side of a comparison are normalized
/// through the unit's import table before comparing; a short reference that
/// cannot be disambiguated keeps its short form, so a short candidate never
/// matches a qualified target (false negative preferred over false
/// positive). There is no substring matching.
pub struct TreeSearch<'a> {
    imports: &'a ImportContext,
    include_nested_scopes: bool,
}

impl<'a> TreeSearch<'a> {
    /// Creates a search over the given import context.
    #[must_use]
    pub fn new(imports: &'a ImportContext) -> Self {
        Self {
            imports,
            include_nested_scopes: true,
        }
    }

    /// Excludes closures and nested functions from the traversal.
    #[must_use]
    pub fn exclude_nested_scopes(mut self) -> Self {
        self.include_nested_scopes = false;
        self
    }

    /// Finds every occurrence of the pattern, in pre-order.
    ///
    /// One traversal per call; the result is finite and owned.
    #[must_use]
    pub fn find_all(&self, subtree: &syn::Block, pattern: &SyntaxPattern) -> Vec<SearchMatch> {
        let mut visitor = PatternVisitor {
            search: self,
            pattern,
            matches: Vec::new(),
            stop_after_first: false,
        };
        visitor.visit_block(subtree);
        visitor.matches
    }

    /// Finds the first occurrence in pre-order, if any.
    #[must_use]
    pub fn find_first(
        &self,
        subtree: &syn::Block,
        pattern: &SyntaxPattern,
    ) -> Option<SearchMatch> {
        let mut visitor = PatternVisitor {
            search: self,
            pattern,
            matches: Vec::new(),
            stop_after_first: true,
        };
        visitor.visit_block(subtree);
        visitor.matches.into_iter().next()
    }

    /// Whether the pattern occurs at all.
    #[must_use]
    pub fn any(&self, subtree: &syn::Block, pattern: &SyntaxPattern) -> bool {
        self.find_first(subtree, pattern).is_some()
    }

    /// Finds every construction expression, whatever the constructed type.
    ///
    /// Callers that need semantic filtering (e.g. "any subtype of a base")
    /// resolve the returned type references themselves; the references are
    /// returned as written, not normalized.
    #[must_use]
    pub fn find_instantiations(&self, subtree: &syn::Block) -> Vec<FoundInstantiation> {
        let mut collector = InstantiationCollector {
            include_nested_scopes: self.include_nested_scopes,
            found: Vec::new(),
        };
        collector.visit_block(subtree);
        collector.found
    }

    fn match_expr(&self, expr: &Expr, pattern: &SyntaxPattern) -> bool {
        match pattern {
            SyntaxPattern::Instantiation { type_name } => self.match_instantiation(expr, type_name),
            SyntaxPattern::MethodCall { method, receiver } => {
                self.match_method_call(expr, method, receiver)
            }
            SyntaxPattern::MemberAccess { member, receiver } => {
                self.match_member_access(expr, member, receiver)
            }
            SyntaxPattern::VariableRef { name } => match expr {
                Expr::Path(path) => single_segment(path).is_some_and(|ident| ident == *name),
                _ => false,
            },
        }
    }

    fn match_instantiation(&self, expr: &Expr, type_name: &str) -> bool {
        instantiation_target(expr).is_some_and(|c| self.same_type(&c, type_name))
    }

    fn match_method_call(&self, expr: &Expr, method: &str, receiver: &Receiver) -> bool {
        match expr {
            Expr::MethodCall(ExprMethodCall {
                receiver: actual,
                method: name,
                ..
            }) => name == method && self.accepts(receiver, &classify_receiver(actual)),
            // Type-qualified call: `Type::method(..)`.
            Expr::Call(ExprCall { func, .. }) => {
                let Expr::Path(expr_path) = func.as_ref() else {
                    return false;
                };
                let Some((prefix, last)) = split_qualified(expr_path) else {
                    return false;
                };
                last == method && self.accepts(receiver, &ActualReceiver::Static(prefix))
            }
            _ => false,
        }
    }

    fn match_member_access(&self, expr: &Expr, member: &str, receiver: &Receiver) -> bool {
        match expr {
            Expr::Field(ExprField {
                base,
                member: syn::Member::Named(name),
                ..
            }) => name == member && self.accepts(receiver, &classify_receiver(base)),
            // Type-qualified access: `Type::MEMBER`.
            Expr::Path(expr_path) => {
                let Some((prefix, last)) = split_qualified(expr_path) else {
                    return false;
                };
                last == member && self.accepts(receiver, &ActualReceiver::Static(prefix))
            }
            _ => false,
        }
    }

    fn accepts(&self, wanted: &Receiver, actual: &ActualReceiver) -> bool {
        match wanted {
            Receiver::Any => true,
            Receiver::CurrentInstance => matches!(actual, ActualReceiver::CurrentInstance),
            Receiver::AnyLocal => matches!(actual, ActualReceiver::Local(_)),
            Receiver::Local(name) => {
                matches!(actual, ActualReceiver::Local(actual_name) if actual_name == name)
            }
            Receiver::Static(type_name) => {
                matches!(actual, ActualReceiver::Static(actual_type)
                    if self.same_type(actual_type, type_name))
            }
        }
    }

    /// Compares two type references after normalizing both through the
    /// import table. An undisambiguated short reference keeps its short
    /// form, so it can only match an identical short reference.
    fn same_type(&self, candidate: &str, target: &str) -> bool {
        let normalize = |name: &str| -> String {
            self.imports
                .resolve(name)
                .map_or_else(|| name.to_string(), |q| q.into_owned())
        };
        normalize(candidate) == normalize(target)
    }
}

/// The receiver identity actually present in the tree.
#[derive(Debug)]
enum ActualReceiver {
    CurrentInstance,
    Local(String),
    Static(String),
    Other,
}

fn classify_receiver(expr: &Expr) -> ActualReceiver {
    match expr {
        Expr::Path(path) => match single_segment(path) {
            Some(ident) if ident == "self" => ActualReceiver::CurrentInstance,
            Some(ident) => ActualReceiver::Local(ident),
            None => split_qualified(path)
                .map_or(ActualReceiver::Other, |(prefix, _)| {
                    ActualReceiver::Static(prefix)
                }),
        },
        // A field of the current instance still acts for the instance.
        Expr::Field(ExprField { base, .. }) => match classify_receiver(base) {
            ActualReceiver::CurrentInstance => ActualReceiver::CurrentInstance,
            _ => ActualReceiver::Other,
        },
        _ => ActualReceiver::Other,
    }
}

fn single_segment(path: &ExprPath) -> Option<String> {
    if path.qself.is_none() && path.path.segments.len() == 1 {
        Some(path.path.segments[0].ident.to_string())
    } else {
        None
    }
}

/// Splits `a::b::last` into (`a::b`, `last`). Requires two or more segments.
fn split_qualified(path: &ExprPath) -> Option<(String, String)> {
    if path.qself.is_some() || path.path.segments.len() < 2 {
        return None;
    }
    let segments: Vec<String> = path
        .path
        .segments
        .iter()
        .map(|s| s.ident.to_string())
        .collect();
    let (last, prefix) = segments.split_last()?;
    Some((prefix.join("::"), last.clone()))
}

fn path_to_name(path: &syn::Path) -> String {
    path.segments
        .iter()
        .map(|s| s.ident.to_string())
        .collect::<Vec<_>>()
        .join("::")
}

/// The constructed type of a `Type::new(..)` call, if the path is one.
fn constructor_target(path: &ExprPath) -> Option<String> {
    let (prefix, last) = split_qualified(path)?;
    (last == "new").then_some(prefix)
}

/// The type constructed by the expression: a struct literal or a
/// `Type::new(..)` call. The reference is returned as written.
fn instantiation_target(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Struct(ExprStruct { path, .. }) => Some(path_to_name(path)),
        Expr::Call(ExprCall { func, .. }) => match func.as_ref() {
            Expr::Path(expr_path) => constructor_target(expr_path),
            _ => None,
        },
        _ => None,
    }
}

struct InstantiationCollector {
    include_nested_scopes: bool,
    found: Vec<FoundInstantiation>,
}

impl<'ast> Visit<'ast> for InstantiationCollector {
    fn visit_expr(&mut self, expr: &'ast Expr) {
        if let Some(type_name) = instantiation_target(expr) {
            self.found.push(FoundInstantiation {
                type_name,
                line: expr.span().start().line,
                text: expr.to_token_stream().to_string(),
            });
        }
        if !self.include_nested_scopes && matches!(expr, Expr::Closure(_)) {
            return;
        }
        syn::visit::visit_expr(self, expr);
    }

    fn visit_item_fn(&mut self, item: &'ast syn::ItemFn) {
        if !self.include_nested_scopes {
            return;
        }
        syn::visit::visit_item_fn(self, item);
    }
}

struct PatternVisitor<'a> {
    search: &'a TreeSearch<'a>,
    pattern: &'a SyntaxPattern,
    matches: Vec<SearchMatch>,
    stop_after_first: bool,
}

impl<'a> PatternVisitor<'a> {
    fn done(&self) -> bool {
        self.stop_after_first && !self.matches.is_empty()
    }
}

impl<'a, 'ast> Visit<'ast> for PatternVisitor<'a> {
    fn visit_expr(&mut self, expr: &'ast Expr) {
        if self.done() {
            return;
        }
        if self.search.match_expr(expr, self.pattern) {
            self.matches.push(SearchMatch {
                line: expr.span().start().line,
                text: expr.to_token_stream().to_string(),
            });
            if self.done() {
                return;
            }
        }
        if !self.search.include_nested_scopes && matches!(expr, Expr::Closure(_)) {
            return;
        }
        syn::visit::visit_expr(self, expr);
    }

    fn visit_item_fn(&mut self, item: &'ast syn::ItemFn) {
        if self.done() || !self.search.include_nested_scopes {
            return;
        }
        syn::visit::visit_item_fn(self, item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(code: &str) -> syn::Block {
        syn::parse_str(&format!("{{ {code} }}")).expect("fixture must parse")
    }

    fn empty_imports() -> ImportContext {
        ImportContext::new()
    }

    // Scenario: `new CommandTester(...)` is found exactly once, and a
    // CommandTesterFactory instantiation is not a substring match.
    #[test]
    fn instantiation_has_no_substring_match() {
        let imports = empty_imports();
        let search = TreeSearch::new(&imports);
        let pattern = SyntaxPattern::Instantiation {
            type_name: "CommandTester".to_string(),
        };

        let hit = body("let tester = CommandTester::new(command);");
        assert_eq!(search.find_all(&hit, &pattern).len(), 1);

        let miss = body("let factory = CommandTesterFactory::new();");
        assert!(search.find_all(&miss, &pattern).is_empty());
    }

    #[test]
    fn instantiation_matches_struct_literal() {
        let imports = empty_imports();
        let search = TreeSearch::new(&imports);
        let pattern = SyntaxPattern::Instantiation {
            type_name: "Options".to_string(),
        };

        let block = body("let o = Options { verbose: true };");
        assert_eq!(search.find_all(&block, &pattern).len(), 1);
    }

    #[test]
    fn instantiation_resolves_short_names_through_imports() {
        let imports = ImportContext::new()
            .with_import("CommandTester", "console::tester::CommandTester");
        let search = TreeSearch::new(&imports);
        let pattern = SyntaxPattern::Instantiation {
            type_name: "console::tester::CommandTester".to_string(),
        };

        let block = body("let t = CommandTester::new(command);");
        assert_eq!(search.find_all(&block, &pattern).len(), 1);
    }

    #[test]
    fn undisambiguated_short_reference_does_not_match_qualified_target() {
        let imports = empty_imports();
        let search = TreeSearch::new(&imports);
        let pattern = SyntaxPattern::Instantiation {
            type_name: "console::tester::CommandTester".to_string(),
        };

        let block = body("let t = CommandTester::new(command);");
        assert!(search.find_all(&block, &pattern).is_empty());
    }

    #[test]
    fn empty_subtree_yields_no_matches() {
        let imports = empty_imports();
        let search = TreeSearch::new(&imports);
        let block = body("");
        let pattern = SyntaxPattern::VariableRef {
            name: "anything".to_string(),
        };
        assert!(search.find_all(&block, &pattern).is_empty());
    }

    #[test]
    fn subtree_without_requested_category_yields_no_matches() {
        let imports = empty_imports();
        let search = TreeSearch::new(&imports);
        let block = body("let x = 1 + 2; let y = x * 3;");
        let pattern = SyntaxPattern::MethodCall {
            method: "execute".to_string(),
            receiver: Receiver::Any,
        };
        assert!(search.find_all(&block, &pattern).is_empty());
    }

    #[test]
    fn method_call_distinguishes_receiver_kinds() {
        let imports = empty_imports();
        let search = TreeSearch::new(&imports);
        let block = body("self.flush(); tester.flush(); other.flush();");

        let on_instance = SyntaxPattern::MethodCall {
            method: "flush".to_string(),
            receiver: Receiver::CurrentInstance,
        };
        assert_eq!(search.find_all(&block, &on_instance).len(), 1);

        let on_named = SyntaxPattern::MethodCall {
            method: "flush".to_string(),
            receiver: Receiver::Local("tester".to_string()),
        };
        assert_eq!(search.find_all(&block, &on_named).len(), 1);

        let on_any_local = SyntaxPattern::MethodCall {
            method: "flush".to_string(),
            receiver: Receiver::AnyLocal,
        };
        assert_eq!(search.find_all(&block, &on_any_local).len(), 2);

        let on_any = SyntaxPattern::MethodCall {
            method: "flush".to_string(),
            receiver: Receiver::Any,
        };
        assert_eq!(search.find_all(&block, &on_any).len(), 3);
    }

    #[test]
    fn method_call_matches_type_qualified_calls() {
        let imports = empty_imports();
        let search = TreeSearch::new(&imports);
        let block = body("Registry::flush();");

        let pattern = SyntaxPattern::MethodCall {
            method: "flush".to_string(),
            receiver: Receiver::Static("Registry".to_string()),
        };
        assert_eq!(search.find_all(&block, &pattern).len(), 1);

        let wrong_type = SyntaxPattern::MethodCall {
            method: "flush".to_string(),
            receiver: Receiver::Static("Cache".to_string()),
        };
        assert!(search.find_all(&block, &wrong_type).is_empty());
    }

    #[test]
    fn member_access_on_current_instance_includes_instance_fields() {
        let imports = empty_imports();
        let search = TreeSearch::new(&imports);
        let block = body("let t = self.command_tester; let o = local.command_tester;");

        let pattern = SyntaxPattern::MemberAccess {
            member: "command_tester".to_string(),
            receiver: Receiver::CurrentInstance,
        };
        assert_eq!(search.find_all(&block, &pattern).len(), 1);
    }

    #[test]
    fn searches_inside_closures_by_default() {
        let imports = empty_imports();
        let search = TreeSearch::new(&imports);
        let block = body("let run = || { let t = CommandTester::new(command); };");
        let pattern = SyntaxPattern::Instantiation {
            type_name: "CommandTester".to_string(),
        };
        assert_eq!(search.find_all(&block, &pattern).len(), 1);
    }

    #[test]
    fn nested_scopes_can_be_excluded() {
        let imports = empty_imports();
        let search = TreeSearch::new(&imports).exclude_nested_scopes();
        let block = body("let run = || { let t = CommandTester::new(command); };");
        let pattern = SyntaxPattern::Instantiation {
            type_name: "CommandTester".to_string(),
        };
        assert!(search.find_all(&block, &pattern).is_empty());
    }

    #[test]
    fn find_first_returns_the_preorder_first_match() {
        let imports = empty_imports();
        let search = TreeSearch::new(&imports);
        let block = body("first.run(); second.run();");
        let pattern = SyntaxPattern::MethodCall {
            method: "run".to_string(),
            receiver: Receiver::AnyLocal,
        };

        let first = search.find_first(&block, &pattern).expect("must match");
        assert!(first.text.contains("first"));
    }

    #[test]
    fn find_instantiations_collects_every_construction() {
        let imports = empty_imports();
        let search = TreeSearch::new(&imports);
        let block = body(
            "let a = SyncUsersCommand::new(); let b = Options { verbose: true }; a.run();",
        );

        let found = search.find_instantiations(&block);
        let names: Vec<&str> = found.iter().map(|f| f.type_name.as_str()).collect();
        assert_eq!(names, vec!["SyncUsersCommand", "Options"]);
    }

    #[test]
    fn variable_ref_matches_exact_name_only() {
        let imports = empty_imports();
        let search = TreeSearch::new(&imports);
        let block = body("let x = command_tester; let y = command_tester_backup;");
        let pattern = SyntaxPattern::VariableRef {
            name: "command_tester".to_string(),
        };
        assert_eq!(search.find_all(&block, &pattern).len(), 1);
    }
}
