//! Class-like declarations and the resolver seam.
//!
//! Parsing and symbol resolution live outside this crate. A front end hands
//! the engine a flat list of [`ClassDecl`] values whose type and expression
//! positions carry opaque tokens, plus a [`TypeResolver`] that maps each
//! token to a fully qualified name where resolution succeeded. Resolution is
//! best-effort: an unresolved token is normal and the engine skips it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of a class-like declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
}

/// Opaque token for a syntactic type position (supertype, field type,
/// signature type, local declaration, created type).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef(pub String);

/// Opaque token for an expression whose static type the front end may know
/// (a call receiver or the target of a field access).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExprRef(pub String);

/// Outcome of resolving a token to a fully qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(String),
    Unresolved,
}

impl Resolution {
    /// The resolved name, if any.
    pub fn ok(self) -> Option<String> {
        match self {
            Resolution::Resolved(fqn) => Some(fqn),
            Resolution::Unresolved => None,
        }
    }
}

/// Best-effort mapping from syntactic tokens to fully qualified names.
///
/// Implementations never fail hard: anything the front end could not resolve
/// comes back as [`Resolution::Unresolved`] and is skipped by the weigher.
pub trait TypeResolver {
    /// Fully qualified name behind a type position.
    fn resolve_type(&self, ty: &TypeRef) -> Resolution;

    /// Static type of an expression. For a method call this is the receiver's
    /// type, not the declaring type of the invoked member.
    fn resolve_expr(&self, expr: &ExprRef) -> Resolution;
}

/// One statement-level reference inside a method body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BodyRef {
    /// Local variable declaration. Field declarations are modeled on the
    /// class itself and must not be reported here.
    LocalDecl(TypeRef),
    /// Construction of a type (`new T(...)` in the source language).
    ObjectCreation(TypeRef),
    /// Method call. Calls without an explicit receiver carry `None` and
    /// contribute nothing to the dependency graph.
    MethodCall { receiver: Option<ExprRef> },
    /// Access of a field on the given expression.
    FieldAccess(ExprRef),
}

/// Field declaration: name plus declared type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
}

/// Method declaration: signature types plus body references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    /// `None` for constructors and void methods.
    pub return_type: Option<TypeRef>,
    pub parameters: Vec<TypeRef>,
    pub body: Vec<BodyRef>,
}

impl MethodDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: None,
            parameters: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_return_type(mut self, ty: TypeRef) -> Self {
        self.return_type = Some(ty);
        self
    }

    pub fn with_parameter(mut self, ty: TypeRef) -> Self {
        self.parameters.push(ty);
        self
    }

    pub fn with_body_ref(mut self, body_ref: BodyRef) -> Self {
        self.body.push(body_ref);
        self
    }
}

/// One class-like declaration as reported by the front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDecl {
    pub qualified_name: String,
    pub simple_name: String,
    pub project_id: String,
    pub kind: ClassKind,
    pub supertypes: Vec<TypeRef>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
}

impl ClassDecl {
    /// Create a declaration, deriving the simple name from the last dotted
    /// segment of the qualified name.
    pub fn new(
        qualified_name: impl Into<String>,
        project_id: impl Into<String>,
        kind: ClassKind,
    ) -> Self {
        let qualified_name = qualified_name.into();
        let simple_name = qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(qualified_name.as_str())
            .to_string();
        Self {
            qualified_name,
            simple_name,
            project_id: project_id.into(),
            kind,
            supertypes: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_supertype(mut self, ty: TypeRef) -> Self {
        self.supertypes.push(ty);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.fields.push(FieldDecl {
            name: name.into(),
            ty,
        });
        self
    }

    pub fn with_method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }
}

/// Resolver backed by pre-computed token tables.
///
/// Hosts that resolve symbols up front load the tables once per snapshot;
/// tests use it to script resolution outcomes. Missing tokens resolve to
/// [`Resolution::Unresolved`].
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    types: HashMap<String, String>,
    exprs: HashMap<String, String>,
}

impl MapResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, token: impl Into<String>, fqn: impl Into<String>) -> Self {
        self.types.insert(token.into(), fqn.into());
        self
    }

    pub fn with_expr(mut self, token: impl Into<String>, fqn: impl Into<String>) -> Self {
        self.exprs.insert(token.into(), fqn.into());
        self
    }
}

impl TypeResolver for MapResolver {
    fn resolve_type(&self, ty: &TypeRef) -> Resolution {
        match self.types.get(&ty.0) {
            Some(fqn) => Resolution::Resolved(fqn.clone()),
            None => Resolution::Unresolved,
        }
    }

    fn resolve_expr(&self, expr: &ExprRef) -> Resolution {
        match self.exprs.get(&expr.0) {
            Some(fqn) => Resolution::Resolved(fqn.clone()),
            None => Resolution::Unresolved,
        }
    }
}
