//! Input model consumed from the parsing/resolution front end.

pub mod declaration;

pub use declaration::{
    BodyRef, ClassDecl, ClassKind, ExprRef, FieldDecl, MapResolver, MethodDecl, Resolution,
    TypeRef, TypeResolver,
};
