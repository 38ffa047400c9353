//! # jitscope Prelude
//!
//! Convenient access to the most commonly used types and functions. Import this
//! module to drive the full pipeline without spelling out every path:
//!
//! ```rust
//! use jitscope::prelude::*;
//! ```

/// The main error type for all jitscope operations
pub use crate::Error;

/// The result type used throughout jitscope
pub use crate::Result;

/// Flat configuration record for the layout and annotation stages
pub use crate::options::DecompileOptions;

/// The canonical decompiled-method model
pub use crate::model::{
    AssemblyInstruction, DecompiledMethod, GuideGlyph, InstructionArg, InstructionKind,
    JumpDirection, MethodFlags, MethodSignature,
};

/// Runtime introspection surface and native-code location
pub use crate::runtime::{
    compare_tiers, resolve, resolve_symbol, InMemoryTarget, MethodIdentity, NativeCode,
    OffsetPair, ResolvedMethod, ResolvedSymbol, RuntimeSession, RuntimeTarget, SymbolCache,
    Tiering,
};

/// Machine-code decoding
pub use crate::disassembler::{decode, DecodedInstruction, DecodedOperand, FlowKind};

/// Analysis passes
pub use crate::analysis::{
    annotate, annotate_method, detect_inlining, documentation_column, format_address,
    populate_guides,
};

/// Pipeline orchestration
pub use crate::pipeline::{decompile, decompile_batch, resolve_tiers};

/// Textual-assembly front end
pub use crate::listing::{method_from_listing, ListingLine};
