//! Import/alias table for short-name disambiguation.
//!
//! Tree search and semantic resolution both compare type references by
//! qualified name. The enclosing unit's `use` items decide what a short
//! reference means; a short name with no entry cannot be disambiguated and
//! is conservatively treated as unresolved (false negative over false
//! positive).

use std::borrow::Cow;
use std::collections::HashMap;

/// The enclosing unit's import/alias table.
#[derive(Debug, Clone, Default)]
pub struct ImportContext {
    aliases: HashMap<String, String>,
}

impl ImportContext {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a short name or alias for a qualified name.
    #[must_use]
    pub fn with_import(
        mut self,
        alias: impl Into<String>,
        qualified: impl Into<String>,
    ) -> Self {
        self.aliases.insert(alias.into(), qualified.into());
        self
    }

    /// Resolves a type reference to a qualified name.
    ///
    /// Already-qualified names (containing `::`) pass through unchanged.
    /// Short names resolve through the alias table; `None` means the
    /// reference cannot be disambiguated.
    #[must_use]
    pub fn resolve<'a>(&self, name: &'a str) -> Option<Cow<'a, str>> {
        if name.contains("::") {
            return Some(Cow::Borrowed(name));
        }
        self.aliases
            .get(name)
            .map(|qualified| Cow::Owned(qualified.clone()))
    }

    /// Builds a table from a parsed file's `use` items.
    ///
    /// Handles plain paths, renames, and groups; glob imports carry no
    /// alias information and are ignored.
    #[must_use]
    pub fn from_file(file: &syn::File) -> Self {
        let mut ctx = Self::new();
        for item in &file.items {
            if let syn::Item::Use(item_use) = item {
                collect_use_tree(&item_use.tree, &mut Vec::new(), &mut ctx.aliases);
            }
        }
        ctx
    }
}

fn collect_use_tree(
    tree: &syn::UseTree,
    prefix: &mut Vec<String>,
    aliases: &mut HashMap<String, String>,
) {
    match tree {
        syn::UseTree::Path(path) => {
            prefix.push(path.ident.to_string());
            collect_use_tree(&path.tree, prefix, aliases);
            prefix.pop();
        }
        syn::UseTree::Name(name) => {
            let ident = name.ident.to_string();
            let mut segments = prefix.clone();
            segments.push(ident.clone());
            aliases.insert(ident, segments.join("::"));
        }
        syn::UseTree::Rename(rename) => {
            let mut segments = prefix.clone();
            segments.push(rename.ident.to_string());
            aliases.insert(rename.rename.to_string(), segments.join("::"));
        }
        syn::UseTree::Group(group) => {
            for item in &group.items {
                collect_use_tree(item, prefix, aliases);
            }
        }
        syn::UseTree::Glob(_) => {}
    }
}
