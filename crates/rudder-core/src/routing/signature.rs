//! Signature matching
//!
//! Pure comparison used both to map proxy invocations to controller
//! handlers and to check that a routing target is declared by a screen
//! type. Matching is exact: no variance, no optional-parameter skipping.

use rudder_domain::types::{MethodSignature, TypeKey};

/// Exact method-signature comparison.
pub struct SignatureMatcher;

impl SignatureMatcher {
    /// Whether `candidate` matches the given name (when supplied), return
    /// type and positional parameter types, all by exact equality.
    pub fn matches(
        candidate: &MethodSignature,
        name: Option<&str>,
        return_type: &TypeKey,
        parameter_types: &[TypeKey],
    ) -> bool {
        if let Some(name) = name {
            if candidate.name != name {
                return false;
            }
        }
        candidate.return_type == *return_type
            && candidate.parameter_types.as_slice() == parameter_types
    }
}
