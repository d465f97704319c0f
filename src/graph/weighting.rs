//! Reference weighing for a single class declaration.
//!
//! Walks one declaration and tallies, per referenced type, how the reference
//! was made: a method call on a receiver of that type, a field access, an
//! object creation, or a plain type reference (supertypes, field types,
//! signature types, locals). One unresolved token never aborts the rest of
//! the traversal.

use crate::core::{BodyRef, ClassDecl, Resolution, TypeResolver};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-target tally of relationship kinds.
///
/// The edge weight is always the sum of the four counters; nothing else ever
/// contributes to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightBreakdown {
    pub method_calls: u32,
    pub field_accesses: u32,
    pub object_creations: u32,
    pub type_references: u32,
}

impl WeightBreakdown {
    /// Total reference count across all kinds.
    pub fn total(&self) -> u32 {
        self.method_calls + self.field_accesses + self.object_creations + self.type_references
    }
}

/// Tally every resolvable reference made by `decl`, keyed by target fqn.
///
/// A single target accumulates across all categories: a class that is both
/// constructed and called on ends up with one entry carrying both counters.
pub fn weigh_references(
    decl: &ClassDecl,
    resolver: &dyn TypeResolver,
) -> HashMap<String, WeightBreakdown> {
    let mut weights: HashMap<String, WeightBreakdown> = HashMap::new();

    for supertype in &decl.supertypes {
        add_type_reference(&mut weights, resolver.resolve_type(supertype));
    }

    for field in &decl.fields {
        add_type_reference(&mut weights, resolver.resolve_type(&field.ty));
    }

    for method in &decl.methods {
        if let Some(return_type) = &method.return_type {
            add_type_reference(&mut weights, resolver.resolve_type(return_type));
        }
        for parameter in &method.parameters {
            add_type_reference(&mut weights, resolver.resolve_type(parameter));
        }
        for body_ref in &method.body {
            add_body_reference(&mut weights, resolver, body_ref);
        }
    }

    weights
}

fn add_body_reference(
    weights: &mut HashMap<String, WeightBreakdown>,
    resolver: &dyn TypeResolver,
    body_ref: &BodyRef,
) {
    match body_ref {
        BodyRef::LocalDecl(ty) => add_type_reference(weights, resolver.resolve_type(ty)),
        BodyRef::ObjectCreation(ty) => {
            if let Resolution::Resolved(fqn) = resolver.resolve_type(ty) {
                weights.entry(fqn).or_default().object_creations += 1;
            }
        }
        BodyRef::MethodCall {
            receiver: Some(expr),
        } => {
            // Attributed to the receiver's static type, not the member's
            // declaring type.
            if let Resolution::Resolved(fqn) = resolver.resolve_expr(expr) {
                weights.entry(fqn).or_default().method_calls += 1;
            }
        }
        // Calls without an explicit receiver stay inside the declaring class.
        BodyRef::MethodCall { receiver: None } => {}
        BodyRef::FieldAccess(expr) => {
            if let Resolution::Resolved(fqn) = resolver.resolve_expr(expr) {
                weights.entry(fqn).or_default().field_accesses += 1;
            }
        }
    }
}

fn add_type_reference(weights: &mut HashMap<String, WeightBreakdown>, resolution: Resolution) {
    match resolution {
        Resolution::Resolved(fqn) => weights.entry(fqn).or_default().type_references += 1,
        Resolution::Unresolved => log::trace!("skipping unresolved type reference"),
    }
}
