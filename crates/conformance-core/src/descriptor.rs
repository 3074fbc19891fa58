//! Immutable reflection descriptors for declared types.
//!
//! A [`TypeDescriptor`] is the core's read-only view of one declared type:
//! identity, hierarchy, capabilities, attributes, and members. Descriptors
//! are built once per analysis unit by the host (via [`TypeDescriptorBuilder`])
//! and never mutated afterwards; rules only read them.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Member visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Visible everywhere.
    Public,
    /// Visible to the type and its descendants.
    Protected,
    /// Visible to the declaring type only.
    Private,
}

/// A statically known literal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralValue {
    /// A string literal.
    Str(String),
    /// An integer literal.
    Int(i64),
    /// A boolean literal.
    Bool(bool),
}

impl LiteralValue {
    /// Returns the string content if this is a string literal.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// One argument value of an attached attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// A literal the host could evaluate statically.
    Literal(LiteralValue),
    /// A reference to a type, by qualified name.
    TypeRef(String),
    /// An expression the host could not evaluate.
    Unresolved,
}

impl AttributeValue {
    /// Returns the literal string content, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Literal(lit) => lit.as_str(),
            _ => None,
        }
    }

    /// Returns the referenced type name, if any.
    #[must_use]
    pub fn as_type_ref(&self) -> Option<&str> {
        match self {
            Self::TypeRef(name) => Some(name),
            _ => None,
        }
    }
}

/// An attribute (annotation) attached to a type or method, with its
/// positional and named argument values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescriptor {
    /// Attribute name, as written (short or qualified).
    pub name: String,
    /// Positional arguments in declaration order.
    pub positional: Vec<AttributeValue>,
    /// Named arguments.
    pub named: Vec<(String, AttributeValue)>,
}

impl AttributeDescriptor {
    /// Creates an attribute with no arguments.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            positional: Vec::new(),
            named: Vec::new(),
        }
    }

    /// Adds a positional argument.
    #[must_use]
    pub fn with_positional(mut self, value: AttributeValue) -> Self {
        self.positional.push(value);
        self
    }

    /// Adds a named argument.
    #[must_use]
    pub fn with_named(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.named.push((name.into(), value));
        self
    }

    /// Looks up an argument by name first, then by position.
    ///
    /// Attributes are attached with either call convention; rules should not
    /// have to care which one was used.
    #[must_use]
    pub fn argument(&self, name: &str, position: usize) -> Option<&AttributeValue> {
        self.named
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .or_else(|| self.positional.get(position))
    }
}

/// A method declared on a type.
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    /// Method name.
    pub name: String,
    /// Declared visibility.
    pub visibility: Visibility,
    /// Whether the method is abstract (no body).
    pub is_abstract: bool,
    /// Attributes attached to the method.
    pub attributes: Vec<AttributeDescriptor>,
    /// Parsed body, when the host supplies one.
    pub body: Option<syn::Block>,
}

impl MethodDescriptor {
    /// Creates a public, concrete method with no body.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            is_abstract: false,
            attributes: Vec::new(),
            body: None,
        }
    }

    /// Sets the visibility.
    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Marks the method abstract.
    #[must_use]
    pub fn abstract_method(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Attaches an attribute.
    #[must_use]
    pub fn with_attribute(mut self, attribute: AttributeDescriptor) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Sets the parsed body.
    #[must_use]
    pub fn with_body(mut self, body: syn::Block) -> Self {
        self.body = Some(body);
        self
    }
}

/// A constant declared on a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantDescriptor {
    /// Constant name.
    pub name: String,
    /// Literal value, if statically known.
    pub value: Option<LiteralValue>,
}

impl ConstantDescriptor {
    /// Creates a constant descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, value: Option<LiteralValue>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Read-only view of one declared type.
///
/// The ancestor chain is embedded and already transitive (nearest first),
/// and the capability set is resolved transitively, so hierarchy queries
/// never re-enter the resolver. Construct with [`TypeDescriptor::builder`].
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    qualified_name: String,
    file: PathBuf,
    line: usize,
    is_abstract: bool,
    is_final: bool,
    is_anonymous: bool,
    ancestors: Vec<Arc<TypeDescriptor>>,
    capabilities: BTreeSet<String>,
    attributes: Vec<AttributeDescriptor>,
    methods: Vec<MethodDescriptor>,
    constants: Vec<ConstantDescriptor>,
}

impl TypeDescriptor {
    /// Starts building a descriptor for the given qualified name.
    #[must_use]
    pub fn builder(qualified_name: impl Into<String>) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder::new(qualified_name)
    }

    /// Qualified name, `::`-separated, unique within a compilation.
    #[must_use]
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Name after the last `::` separator.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.qualified_name
            .rsplit("::")
            .next()
            .unwrap_or(&self.qualified_name)
    }

    /// File the type is declared in.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// 1-indexed declaration start line.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Whether the type is abstract.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Whether the type is final.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Whether the type is anonymous.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.is_anonymous
    }

    /// Ancestors, nearest first. Already transitive.
    #[must_use]
    pub fn ancestors(&self) -> &[Arc<TypeDescriptor>] {
        &self.ancestors
    }

    /// Direct parent, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<TypeDescriptor>> {
        self.ancestors.first()
    }

    /// Implemented capability names, resolved transitively.
    #[must_use]
    pub fn capabilities(&self) -> &BTreeSet<String> {
        &self.capabilities
    }

    /// Attributes attached to the type declaration.
    #[must_use]
    pub fn attributes(&self) -> &[AttributeDescriptor] {
        &self.attributes
    }

    /// Finds an attached attribute by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Declared methods, in declaration order.
    #[must_use]
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Declared constants, in declaration order.
    #[must_use]
    pub fn constants(&self) -> &[ConstantDescriptor] {
        &self.constants
    }

    /// Finds a constant on this type or any ancestor, nearest first.
    #[must_use]
    pub fn find_constant(&self, name: &str) -> Option<&ConstantDescriptor> {
        self.constants
            .iter()
            .find(|c| c.name == name)
            .or_else(|| {
                self.ancestors
                    .iter()
                    .find_map(|a| a.constants.iter().find(|c| c.name == name))
            })
    }

    /// Finds a method on this type or any ancestor.
    ///
    /// The nearest declaration wins: an override on the type itself shadows
    /// an ancestor's declaration.
    #[must_use]
    pub fn find_method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods
            .iter()
            .find(|m| m.name == name)
            .or_else(|| {
                self.ancestors
                    .iter()
                    .find_map(|a| a.methods.iter().find(|m| m.name == name))
            })
    }

    /// Whether the type extends (strictly) or is the given type.
    #[must_use]
    pub fn is_subtype_of(&self, qualified_name: &str) -> bool {
        self.qualified_name == qualified_name
            || self
                .ancestors
                .iter()
                .any(|a| a.qualified_name == qualified_name)
    }
}

/// Builder for [`TypeDescriptor`].
///
/// `parent` folds the parent's own ancestors and capabilities in, so the
/// finished descriptor's hierarchy data is transitive by construction.
#[derive(Debug)]
pub struct TypeDescriptorBuilder {
    inner: TypeDescriptor,
}

impl TypeDescriptorBuilder {
    fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            inner: TypeDescriptor {
                qualified_name: qualified_name.into(),
                file: PathBuf::new(),
                line: 0,
                is_abstract: false,
                is_final: false,
                is_anonymous: false,
                ancestors: Vec::new(),
                capabilities: BTreeSet::new(),
                attributes: Vec::new(),
                methods: Vec::new(),
                constants: Vec::new(),
            },
        }
    }

    /// Sets the declaring file and start line.
    #[must_use]
    pub fn declared_at(mut self, file: impl Into<PathBuf>, line: usize) -> Self {
        self.inner.file = file.into();
        self.inner.line = line;
        self
    }

    /// Marks the type abstract.
    #[must_use]
    pub fn abstract_type(mut self) -> Self {
        self.inner.is_abstract = true;
        self
    }

    /// Marks the type final.
    #[must_use]
    pub fn final_type(mut self) -> Self {
        self.inner.is_final = true;
        self
    }

    /// Marks the type anonymous.
    #[must_use]
    pub fn anonymous(mut self) -> Self {
        self.inner.is_anonymous = true;
        self
    }

    /// Sets the direct parent, folding in its ancestors and capabilities.
    #[must_use]
    pub fn parent(mut self, parent: Arc<TypeDescriptor>) -> Self {
        self.inner
            .capabilities
            .extend(parent.capabilities.iter().cloned());
        let grandparents = parent.ancestors.clone();
        self.inner.ancestors.push(parent);
        self.inner.ancestors.extend(grandparents);
        self
    }

    /// Adds a directly implemented capability.
    #[must_use]
    pub fn capability(mut self, name: impl Into<String>) -> Self {
        self.inner.capabilities.insert(name.into());
        self
    }

    /// Attaches an attribute to the type.
    #[must_use]
    pub fn attribute(mut self, attribute: AttributeDescriptor) -> Self {
        self.inner.attributes.push(attribute);
        self
    }

    /// Declares a method.
    #[must_use]
    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.inner.methods.push(method);
        self
    }

    /// Declares a constant.
    #[must_use]
    pub fn constant(mut self, constant: ConstantDescriptor) -> Self {
        self.inner.constants.push(constant);
        self
    }

    /// Finishes the descriptor, wrapped for sharing across queries.
    #[must_use]
    pub fn build(self) -> Arc<TypeDescriptor> {
        Arc::new(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_strips_namespace() {
        let ty = TypeDescriptor::builder("app::command::SyncUsersCommand").build();
        assert_eq!(ty.short_name(), "SyncUsersCommand");

        let plain = TypeDescriptor::builder("SyncUsersCommand").build();
        assert_eq!(plain.short_name(), "SyncUsersCommand");
    }

    #[test]
    fn parent_folds_in_transitive_ancestors() {
        let grandparent = TypeDescriptor::builder("framework::Command")
            .capability("framework::Runnable")
            .build();
        let parent = TypeDescriptor::builder("app::BaseCommand")
            .parent(grandparent)
            .build();
        let child = TypeDescriptor::builder("app::SyncUsersCommand")
            .parent(parent)
            .build();

        let names: Vec<&str> = child
            .ancestors()
            .iter()
            .map(|a| a.qualified_name())
            .collect();
        assert_eq!(names, vec!["app::BaseCommand", "framework::Command"]);
        assert!(child.capabilities().contains("framework::Runnable"));
    }

    #[test]
    fn is_subtype_of_is_reflexive() {
        let ty = TypeDescriptor::builder("app::Thing").build();
        assert!(ty.is_subtype_of("app::Thing"));
        assert!(!ty.is_subtype_of("app::Other"));
    }

    #[test]
    fn find_method_nearest_declaration_wins() {
        let base = TypeDescriptor::builder("app::Base")
            .method(MethodDescriptor::new("execute").with_visibility(Visibility::Public))
            .build();
        let child = TypeDescriptor::builder("app::Child")
            .parent(base)
            .method(MethodDescriptor::new("execute").with_visibility(Visibility::Private))
            .build();

        let found = child.find_method("execute").unwrap();
        assert_eq!(found.visibility, Visibility::Private);
    }

    #[test]
    fn attribute_argument_named_takes_precedence_over_positional() {
        let attr = AttributeDescriptor::new("AsCommand")
            .with_positional(AttributeValue::Literal(LiteralValue::Str(
                "positional".into(),
            )))
            .with_named(
                "name",
                AttributeValue::Literal(LiteralValue::Str("named".into())),
            );

        let value = attr.argument("name", 0).unwrap();
        assert_eq!(value.as_str(), Some("named"));
    }

    #[test]
    fn attribute_argument_falls_back_to_position() {
        let attr = AttributeDescriptor::new("AsCommand").with_positional(AttributeValue::Literal(
            LiteralValue::Str("app:sync-users".into()),
        ));

        let value = attr.argument("name", 0).unwrap();
        assert_eq!(value.as_str(), Some("app:sync-users"));
        assert!(attr.argument("description", 1).is_none());
    }

    #[test]
    fn find_constant_checks_ancestors() {
        let base = TypeDescriptor::builder("app::Base")
            .constant(ConstantDescriptor::new(
                "NAME",
                Some(LiteralValue::Str("base".into())),
            ))
            .build();
        let child = TypeDescriptor::builder("app::Child").parent(base).build();

        let found = child.find_constant("NAME").unwrap();
        assert_eq!(found.value, Some(LiteralValue::Str("base".into())));
    }
}
