//! The canonical, language-agnostic decompiled-method data model.
//!
//! Every producer (the live-runtime pipeline in [`crate::pipeline`], the textual-assembly
//! front end in [`crate::listing`]) populates one [`DecompiledMethod`], and every
//! downstream consumer (guides, inlining inference, annotation) reads and mutates that
//! same instance in place. A method instance is owned exclusively by the pipeline run
//! that created it and is discarded after rendering; there is no pooling or caching
//! across requests.
//!
//! # Key Types
//! - [`DecompiledMethod`] - One method's decoded native code plus metadata
//! - [`AssemblyInstruction`] - A single decoded instruction with derived jump fields
//! - [`InstructionArg`] - One operand with optional resolved-symbol data
//! - [`MethodSignature`] - A statically-known call, compared by field equality
//!
//! # Invariants
//! - `instructions[i].ordinal_index == i` for all `i`
//! - Addresses are non-decreasing across the sequence for a single pass
//! - The reference address is meaningful only when an arg's resolved flag is set
//! - Jump direction is derived by [`DecompiledMethod::derive_jump_metadata`], never set
//!   ad hoc

mod instruction;
mod method;
mod signature;

pub use instruction::{
    AssemblyInstruction, GuideGlyph, InstructionArg, InstructionKind, JumpDirection,
};
pub use method::{DecompiledMethod, MethodFlags};
pub use signature::MethodSignature;
