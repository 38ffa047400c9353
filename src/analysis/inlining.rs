//! Inlining inference by elimination.
//!
//! The method's statically-known call list says which calls the intermediate code
//! contains; the decoded instructions say which calls the JIT actually emitted.
//! Every known call that still appears as an `Out`-classified instruction was not
//! inlined; whatever never appears is reported.
//!
//! This is a heuristic, not a proof: a call can also disappear because it was
//! dead-code-eliminated, and the two causes are indistinguishable from the native
//! code alone. The ambiguity is inherent and deliberately preserved.

use crate::model::{DecompiledMethod, JumpDirection, MethodSignature};

/// Report which statically-expected calls vanished from the method's native code.
///
/// Scans the instructions in order; each instruction classified
/// [`JumpDirection::Out`] eliminates the first remaining candidate whose signature
/// matches its first operand's display text. Scanning stops early once every
/// candidate is eliminated. The remaining candidates are returned in their original
/// order.
///
/// A returned signature means "inlined or eliminated" — see the module docs.
pub fn detect_inlining(method: &DecompiledMethod) -> Vec<MethodSignature> {
    let mut candidates: Vec<MethodSignature> = method.calls.clone();

    for instruction in &method.instructions {
        if candidates.is_empty() {
            break;
        }
        if instruction.direction != JumpDirection::Out {
            continue;
        }
        let Some(arg) = instruction.args.first() else {
            continue;
        };
        let text = arg.display_text();
        if let Some(position) = candidates.iter().position(|c| c.matches(text)) {
            candidates.remove(position);
        }
    }

    candidates
}

impl MethodSignature {
    /// Whether an operand's display text names this signature: either the canonical
    /// signature string or the short `Type.Name` form symbol resolution produces.
    pub fn matches(&self, text: &str) -> bool {
        text == self.to_string() || text == format!("{}.{}", self.declaring_type, self.name)
    }
}
