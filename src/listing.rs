//! Textual-assembly front end.
//!
//! Some toolchains emit a human-readable assembly dump instead of exposing live
//! process memory. This module accepts pre-tokenized lines — the tokenizer itself is
//! a front-end concern — and builds the same [`DecompiledMethod`] the live pipeline
//! produces, so every downstream pass works unchanged.
//!
//! A dump carries no symbol tables and no final instruction length; the method's
//! code region is closed one byte past the last line's address. Branch operands that
//! parse as an address are treated like decoded branch targets; operands that do
//! not (named labels) are tagged [`JumpDirection::Label`].

use crate::{
    analysis,
    model::{AssemblyInstruction, DecompiledMethod, InstructionArg, JumpDirection},
    options::DecompileOptions,
};

/// One pre-tokenized line of a textual assembly dump.
#[derive(Debug, Clone)]
pub struct ListingLine {
    /// Virtual address of the instruction
    pub address: u64,
    /// Mnemonic text
    pub mnemonic: String,
    /// Operands in listing order
    pub operands: Vec<String>,
    /// Back-reference into the originating source, when the dump carries one
    pub source_ref: Option<String>,
}

impl ListingLine {
    /// A line with no source back-reference.
    pub fn new(address: u64, mnemonic: &str, operands: &[&str]) -> Self {
        ListingLine {
            address,
            mnemonic: mnemonic.to_string(),
            operands: operands.iter().map(ToString::to_string).collect(),
            source_ref: None,
        }
    }

    /// Attach a source back-reference.
    pub fn with_source_ref(mut self, source_ref: &str) -> Self {
        self.source_ref = Some(source_ref.to_string());
        self
    }
}

/// Build a [`DecompiledMethod`] from pre-tokenized listing lines and run the
/// configured analysis passes over it.
pub fn method_from_listing(
    declaring_type: &str,
    name: &str,
    return_type: &str,
    parameters: &[String],
    lines: &[ListingLine],
    options: &DecompileOptions,
) -> DecompiledMethod {
    let base_address = lines.first().map_or(0, |l| l.address);
    let length = lines
        .last()
        .map_or(0, |l| (l.address - base_address + 1) as u32);

    let mut method = DecompiledMethod::new(
        declaring_type,
        name,
        return_type,
        parameters,
        base_address,
        length,
    );

    for line in lines {
        if options.show_source_map_lines {
            if let Some(source_ref) = &line.source_ref {
                method.instructions.push(AssemblyInstruction::annotation_line(
                    0,
                    line.address,
                    source_ref.clone(),
                ));
            }
        }

        let mut instruction = AssemblyInstruction::new(0, line.address, line.mnemonic.clone());
        for operand in &line.operands {
            let trimmed = operand.trim();
            let mut argument = InstructionArg::text(trimmed);
            argument.is_memory = trimmed.starts_with('[');
            instruction.args.push(argument);
        }

        if analysis::is_branch_mnemonic(&line.mnemonic) {
            if let Some(first) = line.operands.first() {
                match parse_listing_address(first) {
                    Some(address) => {
                        instruction.ref_address = Some(address);
                        if let Some(argument) = instruction.args.first_mut() {
                            argument.has_reference = true;
                        }
                    }
                    None => instruction.direction = JumpDirection::Label,
                }
            }
        }

        method.instructions.push(instruction);
    }

    method.reindex();
    method.derive_jump_metadata();
    if options.show_guides {
        analysis::populate_guides(&mut method, options);
    }
    if options.show_documentation {
        analysis::annotate_method(&mut method, options);
    }

    method
}

/// Parse a branch operand as an address: `0x` prefix, trailing `h` radix marker,
/// or a bare hex string of at least four digits. Anything else is a named label.
fn parse_listing_address(text: &str) -> Option<u64> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).ok();
    }
    if let Some(hex) = text.strip_suffix('h').or_else(|| text.strip_suffix('H')) {
        return u64::from_str_radix(hex, 16).ok();
    }
    if text.len() >= 4 && text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return u64::from_str_radix(text, 16).ok();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InstructionKind;

    fn lines() -> Vec<ListingLine> {
        vec![
            ListingLine::new(0x4000, "xor", &["eax", "eax"]).with_source_ref("Program.cs:12"),
            ListingLine::new(0x4002, "cmp", &["eax", "5"]),
            ListingLine::new(0x4005, "jge", &["400Bh"]),
            ListingLine::new(0x4007, "inc", &["eax"]),
            ListingLine::new(0x4009, "jmp", &["0x4002"]),
            ListingLine::new(0x400B, "ret", &[]),
        ]
    }

    #[test]
    fn builds_aligned_model() {
        let method = method_from_listing(
            "Program",
            "Loop",
            "int",
            &[],
            &lines(),
            &DecompileOptions::default(),
        );

        assert_eq!(method.base_address, 0x4000);
        assert_eq!(method.instructions.len(), 6);
        for (i, instruction) in method.instructions.iter().enumerate() {
            assert_eq!(instruction.ordinal_index, i);
        }
    }

    #[test]
    fn address_operands_become_jumps() {
        let method = method_from_listing(
            "Program",
            "Loop",
            "int",
            &[],
            &lines(),
            &DecompileOptions::default(),
        );

        let forward = &method.instructions[2];
        assert_eq!(forward.direction, JumpDirection::Down);
        assert_eq!(forward.jump_index, Some(5));

        let backward = &method.instructions[4];
        assert_eq!(backward.direction, JumpDirection::Up);
        assert_eq!(backward.jump_index, Some(1));
    }

    #[test]
    fn named_label_tagged_label() {
        let lines = vec![
            ListingLine::new(0x4000, "jmp", &[".L_exit"]),
            ListingLine::new(0x4002, "ret", &[]),
        ];
        let method = method_from_listing(
            "Program",
            "Bail",
            "void",
            &[],
            &lines,
            &DecompileOptions::default(),
        );

        assert_eq!(method.instructions[0].direction, JumpDirection::Label);
        assert_eq!(method.instructions[0].ref_address, None);
    }

    #[test]
    fn source_refs_injected_on_request() {
        let options = DecompileOptions {
            show_source_map_lines: true,
            ..DecompileOptions::default()
        };
        let method = method_from_listing("Program", "Loop", "int", &[], &lines(), &options);

        assert_eq!(method.instructions[0].kind, InstructionKind::Annotation);
        assert_eq!(method.instructions[0].args[0].text, "Program.cs:12");
        assert_eq!(method.instructions.len(), 7);
    }

    #[test]
    fn analysis_passes_run_over_listing() {
        let method = method_from_listing(
            "Program",
            "Loop",
            "int",
            &[],
            &lines(),
            &DecompileOptions::default(),
        );

        // Two in-range jumps produce a four-column guide margin.
        assert_eq!(method.instructions[0].guides.len(), 4);
        assert_eq!(
            method.instructions[1].annotation.as_deref(),
            Some("if(eax >= 5)")
        );
        assert_eq!(
            method.instructions[5].annotation.as_deref(),
            Some("return;")
        );
    }
}
