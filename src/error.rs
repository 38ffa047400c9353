use thiserror::Error;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers the fatal failure modes of the decompilation pipeline. Conditions the
/// specification treats as recoverable decoration failures (a symbol that does not resolve,
/// an instruction that cannot be annotated, a method with too many jumps for guide rendering)
/// are deliberately *not* part of this enum: they surface as `Option`s, neutral results or
/// diagnostic messages on the affected [`crate::model::DecompiledMethod`].
///
/// # Error Categories
///
/// ## Native-Code Resolution
/// - [`Error::NotYetCompiled`] - The method has no native code yet
/// - [`Error::UnresolvedGeneric`] - Generic instantiation failed both lookup paths
///
/// ## Runtime Target Access
/// - [`Error::OutOfBounds`] - Attempted to read beyond the target's code region
/// - [`Error::Empty`] - Empty input provided where code bytes were expected
///
/// ## Annotation
/// - [`Error::Annotation`] - A per-instruction annotation handler failed; callers catch
///   this per instruction and continue
#[derive(Error, Debug)]
pub enum Error {
    /// The method has not been JIT-compiled yet.
    ///
    /// Resolution requires that the method has been invoked or explicitly prepared at
    /// least once. This error is fatal for the one method but is recovered at the batch
    /// level: sibling methods in the same batch continue processing.
    #[error("Method has no native code yet (invoke or prepare it first) - {method}")]
    NotYetCompiled {
        /// Canonical identity of the method that has not been compiled
        method: String,
    },

    /// A generic-method instantiation could not be resolved.
    ///
    /// Standard method-to-native-code mapping is unavailable for generic instantiations;
    /// the locator falls back to the lower-level table/slot lookup. This error is raised
    /// only when that fallback also fails.
    #[error("Could not resolve generic instantiation via table/slot lookup - {method}")]
    UnresolvedGeneric {
        /// Canonical identity of the generic instantiation that failed resolution
        method: String,
    },

    /// An out of bound access was attempted while reading code bytes.
    ///
    /// This error occurs when reading data beyond the end of the target's code region.
    /// It's a safety check to prevent reads outside the mapped native code.
    #[error("Out of bound read would have occurred!")]
    OutOfBounds,

    /// Provided input was empty.
    ///
    /// This error occurs when an empty code buffer is provided where native code bytes
    /// were expected.
    #[error("Provided input was empty")]
    Empty,

    /// A semantic-annotation handler failed for one instruction.
    ///
    /// Annotation is best-effort decoration. This error never escapes
    /// [`crate::analysis::annotate_method`]: it is caught per instruction, logged as a
    /// warning, and the affected line simply renders without a comment.
    #[error("Annotation failed - {0}")]
    Annotation(String),
}
