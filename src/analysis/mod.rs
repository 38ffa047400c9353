//! Downstream analysis passes over one populated [`crate::model::DecompiledMethod`].
//!
//! The three passes are independent consumers of the same method instance and may be
//! invoked in any order by the renderer: [`populate_guides`] lays out the ASCII
//! jump-guide margin, [`detect_inlining`] reports statically-expected calls that
//! vanished from the native code, and [`annotate_method`] attaches pseudocode
//! comments. All of them mutate fields in place on a single owned instance and are
//! not safe to run concurrently against the *same* instance; independent method
//! instances share no state.

mod annotator;
mod guides;
mod inlining;

pub use annotator::{annotate, annotate_method, documentation_column, format_address};
pub(crate) use annotator::is_branch_mnemonic;
pub use guides::populate_guides;
pub use inlining::detect_inlining;
