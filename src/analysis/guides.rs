//! Jump-guide layout: nested ASCII-art brackets connecting jumps to their targets.
//!
//! The engine paints a per-instruction glyph buffer so rendered listings visually
//! connect a jump instruction to its target, the way bracket nesting connects
//! matching delimiters. Each in-range jump occupies two columns: one for its
//! vertical connector, one reserved so a following jump never touches it. The
//! longest-span jump takes the outermost (lowest) column; shorter jumps nest inside
//! without visual collision.

use crate::{
    model::{DecompiledMethod, GuideGlyph},
    options::DecompileOptions,
};

struct Jump {
    source: usize,
    target: usize,
    size: usize,
}

/// Lay out guide glyphs for every in-range jump of `method`.
///
/// Derives jump metadata first (idempotent), then:
/// 1. counts in-range jumps and aborts neutrally — `(0, 0)`, no glyphs painted —
///    when two columns per jump would meet or exceed
///    [`DecompileOptions::max_guide_columns`]; a diagnostic message records the
///    abort,
/// 2. orders jumps by descending span so the longest bracket lands in column 0,
/// 3. paints corner, fill, start-bullet, vertical, cross and arrow glyphs.
///
/// Returns `(longest_jump_size, total_columns_used)`. Callers reserve
/// `total_columns_used` cells of left margin for every line of the method,
/// including lines with no jump at all.
pub fn populate_guides(
    method: &mut DecompiledMethod,
    options: &DecompileOptions,
) -> (usize, usize) {
    method.derive_jump_metadata();

    let mut jumps: Vec<Jump> = method
        .instructions
        .iter()
        .filter(|i| i.is_in_range_jump())
        .map(|i| Jump {
            source: i.ordinal_index,
            target: i.jump_index.unwrap_or(i.ordinal_index),
            size: i.jump_size,
        })
        .collect();

    if jumps.is_empty() {
        return (0, 0);
    }

    let width = jumps.len() * 2;
    if width >= options.max_guide_columns {
        method.push_message(format!(
            "guide rendering disabled: {} jumps need {} columns (cap {})",
            jumps.len(),
            width,
            options.max_guide_columns
        ));
        return (0, 0);
    }

    for instruction in &mut method.instructions {
        instruction.guides = vec![GuideGlyph::Empty; width];
    }

    // Longest span first; ties keep source order so layout is deterministic.
    jumps.sort_by(|a, b| b.size.cmp(&a.size).then(a.source.cmp(&b.source)));
    let longest = jumps[0].size;

    for (slot, jump) in jumps.iter().enumerate() {
        let column = slot * 2;
        let top = jump.source.min(jump.target);
        let bottom = jump.source.max(jump.target);

        let (source_corner, target_corner) = if jump.source < jump.target {
            (GuideGlyph::CornerDown, GuideGlyph::CornerUp)
        } else {
            (GuideGlyph::CornerUp, GuideGlyph::CornerDown)
        };

        paint_terminal(
            &mut method.instructions[jump.source].guides,
            column,
            width,
            source_corner,
            GuideGlyph::Start,
        );

        for row in top + 1..bottom {
            let guides = &mut method.instructions[row].guides;
            guides[column] = if column > 0 && guides[column - 1] == GuideGlyph::Horizontal {
                // An enclosing bracket's fill runs through this row.
                GuideGlyph::Cross
            } else {
                GuideGlyph::Vertical
            };
        }

        paint_terminal(
            &mut method.instructions[jump.target].guides,
            column,
            width,
            target_corner,
            GuideGlyph::Arrow,
        );
        let guides = &mut method.instructions[jump.target].guides;
        if column > 0 && guides[column - 1] == GuideGlyph::Horizontal {
            // Another guide also terminates at this row.
            guides[column - 1] = GuideGlyph::Arrow;
        }
    }

    (longest, width)
}

fn paint_terminal(
    guides: &mut [GuideGlyph],
    column: usize,
    width: usize,
    corner: GuideGlyph,
    terminal: GuideGlyph,
) {
    guides[column] = corner;
    for cell in guides.iter_mut().take(width - 1).skip(column + 1) {
        *cell = GuideGlyph::Horizontal;
    }
    guides[width - 1] = terminal;
}
