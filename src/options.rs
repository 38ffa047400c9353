//! Configuration consumed by the layout and annotation stages.
//!
//! A single flat record, constructed once per decompilation request and passed by
//! reference into [`crate::pipeline::decompile`] and the individual analysis passes.
//! The core performs no file or network I/O; loading these options from disk or the
//! command line is a front-end concern.

/// Options controlling guide layout, annotation and address rendering.
#[derive(Debug, Clone)]
pub struct DecompileOptions {
    /// Paint ASCII-art jump guides connecting intra-method jumps to their targets.
    pub show_guides: bool,

    /// Attach pseudocode comments to recognized instruction shapes.
    pub show_documentation: bool,

    /// Column at which pseudocode comments start. `0` selects automatic placement,
    /// computed from the trimmed mean rendered-line length across the method.
    pub documentation_column_offset: usize,

    /// Render addresses cut down to their trailing hex digits.
    pub shorten_addresses: bool,

    /// Number of trailing hex digits kept when [`Self::shorten_addresses`] is set.
    pub address_cut_length: usize,

    /// Render addresses relative to the method's base address instead of absolute.
    pub use_relative_addresses: bool,

    /// Inject source/IL annotation lines from the offset map into the instruction
    /// sequence.
    pub show_source_map_lines: bool,

    /// Upper bound on guide columns per method. A method whose in-range jumps would
    /// need this many columns (two per jump) forgoes guides entirely instead of
    /// producing an oversized margin.
    pub max_guide_columns: usize,
}

impl Default for DecompileOptions {
    fn default() -> Self {
        DecompileOptions {
            show_guides: true,
            show_documentation: true,
            documentation_column_offset: 0,
            shorten_addresses: false,
            address_cut_length: 4,
            use_relative_addresses: false,
            show_source_map_lines: false,
            max_guide_columns: 64,
        }
    }
}
