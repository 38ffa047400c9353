//! Semantic annotation: pseudocode comments for common instruction shapes.
//!
//! A pure per-instruction pattern table. Each recognized mnemonic maps to a handler
//! variant in a closed dispatch table; unrecognized instructions simply render
//! without a comment. Compare instructions look one instruction ahead for the branch
//! that consumes their flags; everything else is a function of mnemonic and operands
//! alone.
//!
//! Annotation is best-effort decoration: a failure while annotating one instruction
//! is caught locally, logged, and never prevents annotation of the remaining
//! instructions.

use crate::{
    model::{AssemblyInstruction, DecompiledMethod, InstructionArg, InstructionKind, JumpDirection},
    options::DecompileOptions,
    Error, Result,
};

/// Pointer width of the decoded code, in bytes. Stack pop/push counts divide by it.
const POINTER_SIZE: u64 = 8;

/// Smallest automatic documentation column.
const MIN_DOC_COLUMN: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    Mov,
    Lea,
    Shl,
    Shr,
    Inc,
    Add,
    Sub,
    Xor,
    Push,
    Pop,
    Ret,
    Call,
    Compare,
    Branch,
}

/// Closed dispatch surface: mnemonic → handler variant.
static PATTERNS: &[(&str, Pattern)] = &[
    ("mov", Pattern::Mov),
    ("lea", Pattern::Lea),
    ("shl", Pattern::Shl),
    ("shr", Pattern::Shr),
    ("inc", Pattern::Inc),
    ("add", Pattern::Add),
    ("sub", Pattern::Sub),
    ("xor", Pattern::Xor),
    ("push", Pattern::Push),
    ("pop", Pattern::Pop),
    ("ret", Pattern::Ret),
    ("call", Pattern::Call),
    ("cmp", Pattern::Compare),
    ("test", Pattern::Compare),
    ("jmp", Pattern::Branch),
    ("je", Pattern::Branch),
    ("jz", Pattern::Branch),
    ("jne", Pattern::Branch),
    ("jnz", Pattern::Branch),
    ("jl", Pattern::Branch),
    ("jle", Pattern::Branch),
    ("jg", Pattern::Branch),
    ("jge", Pattern::Branch),
    ("jb", Pattern::Branch),
    ("jbe", Pattern::Branch),
    ("ja", Pattern::Branch),
    ("jae", Pattern::Branch),
    ("js", Pattern::Branch),
    ("jns", Pattern::Branch),
    ("jo", Pattern::Branch),
    ("jno", Pattern::Branch),
    ("jp", Pattern::Branch),
    ("jnp", Pattern::Branch),
];

/// Branch mnemonic → comparison operator, signed and unsigned variants separately.
static COMPARE_OPERATORS: &[(&str, &str)] = &[
    ("je", "=="),
    ("jz", "=="),
    ("jne", "!="),
    ("jnz", "!="),
    // signed
    ("jl", "<"),
    ("jg", ">"),
    ("jle", "<="),
    ("jge", ">="),
    // unsigned
    ("jb", "<"),
    ("ja", ">"),
    ("jbe", "<="),
    ("jae", ">="),
];

/// Name fragments marking runtime fail helpers; calls to those annotate as `throw`.
static FAIL_HELPER_MARKERS: &[&str] = &["Throw", "Fail", "RngChk"];

fn pattern_for(mnemonic: &str) -> Option<Pattern> {
    PATTERNS
        .iter()
        .find(|(m, _)| *m == mnemonic)
        .map(|(_, p)| *p)
}

pub(crate) fn is_branch_mnemonic(mnemonic: &str) -> bool {
    pattern_for(mnemonic) == Some(Pattern::Branch)
}

/// Attach pseudocode comments to every code instruction of `method`.
///
/// Failures are caught per instruction: the offending line stays unannotated, a
/// warning is logged, and annotation continues with the next instruction.
pub fn annotate_method(method: &mut DecompiledMethod, options: &DecompileOptions) {
    for i in 0..method.instructions.len() {
        if method.instructions[i].kind != InstructionKind::Code {
            continue;
        }
        let annotation = {
            let instruction = &method.instructions[i];
            let next = method.instructions[i + 1..]
                .iter()
                .find(|x| x.kind == InstructionKind::Code);
            let previous = method.instructions[..i]
                .iter()
                .rev()
                .find(|x| x.kind == InstructionKind::Code);
            annotate(instruction, previous, next, method.base_address, options)
        };
        match annotation {
            Ok(text) => method.instructions[i].annotation = text,
            Err(e) => {
                log::warn!(
                    "annotation failed at {:#x} ({}): {e}",
                    method.instructions[i].address,
                    method.instructions[i].mnemonic
                );
            }
        }
    }
}

/// Annotate a single instruction.
///
/// `previous` and `next` are the neighboring *code* instructions: a compare needs
/// the branch that follows it, a branch needs to know whether a compare precedes it
/// (in which case the compare line carries the comment and the branch stays bare).
///
/// # Errors
///
/// [`Error::Annotation`] when the instruction is missing an operand its pattern
/// requires, or a stack-pointer adjustment carries an unparsable amount. Callers
/// treat this as a per-line condition, not a pipeline failure.
pub fn annotate(
    instruction: &AssemblyInstruction,
    previous: Option<&AssemblyInstruction>,
    next: Option<&AssemblyInstruction>,
    base_address: u64,
    options: &DecompileOptions,
) -> Result<Option<String>> {
    let Some(pattern) = pattern_for(&instruction.mnemonic) else {
        return Ok(None);
    };

    match pattern {
        Pattern::Mov => {
            let (d, s) = binary(instruction)?;
            Ok(Some(format!("{d} = {s}")))
        }
        Pattern::Lea => {
            // Effective address: the bracketed source is already the value.
            let d = shaped(arg(instruction, 0)?);
            let s = strip_brackets(arg(instruction, 1)?.display_text());
            Ok(Some(format!("{d} = {s}")))
        }
        Pattern::Shl => {
            let (d, s) = binary(instruction)?;
            Ok(Some(format!("{d} << {s}")))
        }
        Pattern::Shr => {
            let (d, s) = binary(instruction)?;
            Ok(Some(format!("{d} >> {s}")))
        }
        Pattern::Inc => {
            let d = shaped(arg(instruction, 0)?);
            Ok(Some(format!("{d}++")))
        }
        Pattern::Add => annotate_add_sub(instruction, "+=", "stack.pop_times"),
        Pattern::Sub => annotate_add_sub(instruction, "-=", "stack.push_times"),
        Pattern::Xor => {
            let first = arg(instruction, 0)?.display_text().trim().to_string();
            let second = arg(instruction, 1)?.display_text().trim();
            if first.eq_ignore_ascii_case(second) {
                Ok(Some(format!("{first} = 0")))
            } else {
                let (d, s) = binary(instruction)?;
                Ok(Some(format!("{d} ^= {s}")))
            }
        }
        Pattern::Push => {
            let v = shaped(arg(instruction, 0)?);
            Ok(Some(format!("stack.push({v})")))
        }
        Pattern::Pop => {
            let d = shaped(arg(instruction, 0)?);
            Ok(Some(format!("{d} = stack.pop()")))
        }
        Pattern::Ret => Ok(Some("return;".to_string())),
        Pattern::Call => {
            let Some(target) = instruction.args.first() else {
                return Ok(None);
            };
            if is_fail_helper(target.display_text()) {
                Ok(Some("throw".to_string()))
            } else {
                Ok(None)
            }
        }
        Pattern::Compare => annotate_compare(instruction, next),
        Pattern::Branch => annotate_branch(instruction, previous, base_address, options),
    }
}

fn annotate_add_sub(
    instruction: &AssemblyInstruction,
    operator: &str,
    stack_call: &str,
) -> Result<Option<String>> {
    let destination = arg(instruction, 0)?.display_text().trim().to_string();
    let source = arg(instruction, 1)?;

    if is_stack_pointer(&destination) {
        let amount = literal_value(source.display_text()).ok_or_else(|| {
            Error::Annotation(format!(
                "non-literal stack adjustment '{}'",
                source.display_text()
            ))
        })?;
        return Ok(Some(format!("{stack_call}({})", amount / POINTER_SIZE)));
    }

    let (d, s) = binary(instruction)?;
    Ok(Some(format!("{d} {operator} {s}")))
}

fn annotate_compare(
    instruction: &AssemblyInstruction,
    next: Option<&AssemblyInstruction>,
) -> Result<Option<String>> {
    let Some(branch) = next else {
        return Ok(None);
    };
    let Some(operator) = COMPARE_OPERATORS
        .iter()
        .find(|(m, _)| *m == branch.mnemonic)
        .map(|(_, op)| *op)
    else {
        return Ok(None);
    };
    let (d, s) = binary(instruction)?;
    Ok(Some(format!("if({d} {operator} {s})")))
}

fn annotate_branch(
    instruction: &AssemblyInstruction,
    previous: Option<&AssemblyInstruction>,
    base_address: u64,
    options: &DecompileOptions,
) -> Result<Option<String>> {
    // The compare line carries the comment when this branch consumes its flags.
    if previous.is_some_and(|p| pattern_for(&p.mnemonic) == Some(Pattern::Compare)) {
        return Ok(None);
    }

    let target_arg = arg(instruction, 0)?;
    let target = if let Some(name) = &target_arg.alt_text {
        name.clone()
    } else if let Some(address) = instruction.ref_address {
        format_address(address, base_address, options)
    } else {
        target_arg.text.trim().to_string()
    };

    let arrow = match instruction.direction {
        JumpDirection::Up => '↑',
        JumpDirection::Down | JumpDirection::Label => '↓',
        _ => '→',
    };
    Ok(Some(format!("goto {target} {arrow}")))
}

fn arg(instruction: &AssemblyInstruction, index: usize) -> Result<&InstructionArg> {
    instruction.args.get(index).ok_or_else(|| {
        Error::Annotation(format!(
            "'{}' is missing operand {index}",
            instruction.mnemonic
        ))
    })
}

fn binary(instruction: &AssemblyInstruction) -> Result<(String, String)> {
    Ok((
        shaped(arg(instruction, 0)?),
        shaped(arg(instruction, 1)?),
    ))
}

/// Shape an operand for substitution: trim, convert radix-marked literals to
/// decimal, tag memory addressing modes.
///
/// The memory tag keys off the operand's memory flag, not the text shape: the
/// formatter prefixes a size keyword (`byte ptr [rcx]`) whenever the register
/// operands leave the width ambiguous, and the keyword drops out of the
/// pseudocode.
fn shaped(argument: &InstructionArg) -> String {
    let text = argument.display_text().trim();
    if let Some(value) = literal_value(text) {
        return value.to_string();
    }
    if argument.is_memory || text.starts_with('[') {
        let bracket = text.find('[').unwrap_or(0);
        return format!("Memory{}", &text[bracket..]);
    }
    text.to_string()
}

fn strip_brackets(text: &str) -> String {
    text.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .to_string()
}

/// Parse a numeric literal, honoring the trailing `h` radix marker the decoder's
/// formatter emits for hexadecimal values.
fn literal_value(text: &str) -> Option<u64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(hex) = text.strip_suffix('h').or_else(|| text.strip_suffix('H')) {
        return u64::from_str_radix(hex, 16).ok();
    }
    if text.bytes().all(|b| b.is_ascii_digit()) {
        return text.parse().ok();
    }
    None
}

fn is_stack_pointer(text: &str) -> bool {
    matches!(text, "rsp" | "esp" | "sp")
}

fn is_fail_helper(name: &str) -> bool {
    FAIL_HELPER_MARKERS.iter().any(|m| name.contains(m))
}

/// Format a referenced address for display, honoring the relative and shortening
/// options.
pub fn format_address(address: u64, base_address: u64, options: &DecompileOptions) -> String {
    if options.use_relative_addresses && address >= base_address {
        return format!("{:X}h", address - base_address);
    }
    let mut text = format!("{address:016X}");
    if options.shorten_addresses && options.address_cut_length < text.len() {
        text = text[text.len() - options.address_cut_length..].to_string();
    }
    format!("{text}h")
}

/// Column at which pseudocode comments start for `method`.
///
/// A non-zero [`DecompileOptions::documentation_column_offset`] wins; zero selects
/// automatic placement from the trimmed mean rendered-line length across the
/// method (the top and bottom deciles are dropped so one very long line does not
/// push every comment off screen).
pub fn documentation_column(method: &DecompiledMethod, options: &DecompileOptions) -> usize {
    if options.documentation_column_offset != 0 {
        return options.documentation_column_offset;
    }

    let mut lengths: Vec<usize> = method
        .instructions
        .iter()
        .filter(|i| i.kind == InstructionKind::Code)
        .map(|i| i.to_string().chars().count())
        .collect();
    if lengths.is_empty() {
        return MIN_DOC_COLUMN;
    }

    lengths.sort_unstable();
    let trim = lengths.len() / 10;
    let kept = &lengths[trim..lengths.len() - trim];
    let mean = kept.iter().sum::<usize>() / kept.len();
    let column = (mean + 4) & !3;
    column.max(MIN_DOC_COLUMN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AssemblyInstruction;

    fn instruction(mnemonic: &str, operands: &[&str]) -> AssemblyInstruction {
        let mut instruction = AssemblyInstruction::new(0, 0x1000, mnemonic);
        for operand in operands {
            instruction.args.push(InstructionArg::text(*operand));
        }
        instruction
    }

    fn comment(mnemonic: &str, operands: &[&str]) -> Option<String> {
        annotate(
            &instruction(mnemonic, operands),
            None,
            None,
            0x1000,
            &DecompileOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn mov_assigns() {
        assert_eq!(comment("mov", &["eax", "ebx"]).unwrap(), "eax = ebx");
    }

    #[test]
    fn mov_memory_tagged() {
        assert_eq!(
            comment("mov", &["eax", "[rcx+8]"]).unwrap(),
            "eax = Memory[rcx+8]"
        );
    }

    #[test]
    fn size_qualified_memory_operand_keeps_tag() {
        // The formatter emits a size keyword when a memory destination takes an
        // immediate; the flag, not the text shape, drives the tag.
        let mut store = instruction("mov", &["byte ptr [rcx]", "1"]);
        store.args[0].is_memory = true;
        let result = annotate(&store, None, None, 0x1000, &DecompileOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(result, "Memory[rcx] = 1");
    }

    #[test]
    fn mov_literal_converted_to_decimal() {
        assert_eq!(comment("mov", &["eax", "2Ah"]).unwrap(), "eax = 42");
    }

    #[test]
    fn lea_strips_brackets_without_memory_tag() {
        assert_eq!(comment("lea", &["rax", "[rcx+8]"]).unwrap(), "rax = rcx+8");
    }

    #[test]
    fn shifts() {
        assert_eq!(comment("shl", &["eax", "2"]).unwrap(), "eax << 2");
        assert_eq!(comment("shr", &["eax", "1"]).unwrap(), "eax >> 1");
    }

    #[test]
    fn inc_increments() {
        assert_eq!(comment("inc", &["eax"]).unwrap(), "eax++");
    }

    #[test]
    fn add_sub_plain() {
        assert_eq!(comment("add", &["eax", "2"]).unwrap(), "eax += 2");
        assert_eq!(comment("sub", &["ecx", "ebx"]).unwrap(), "ecx -= ebx");
    }

    #[test]
    fn stack_pointer_adjustments() {
        assert_eq!(
            comment("add", &["rsp", "28h"]).unwrap(),
            "stack.pop_times(5)"
        );
        assert_eq!(
            comment("sub", &["rsp", "20h"]).unwrap(),
            "stack.push_times(4)"
        );
    }

    #[test]
    fn xor_self_clears() {
        assert_eq!(comment("xor", &["eax", "eax"]).unwrap(), "eax = 0");
        assert_eq!(comment("xor", &["eax", "ecx"]).unwrap(), "eax ^= ecx");
    }

    #[test]
    fn push_pop_ret() {
        assert_eq!(comment("push", &["rbx"]).unwrap(), "stack.push(rbx)");
        assert_eq!(comment("pop", &["rbx"]).unwrap(), "rbx = stack.pop()");
        assert_eq!(comment("ret", &[]).unwrap(), "return;");
    }

    #[test]
    fn call_fail_helper_throws() {
        let mut call = instruction("call", &["7FF800001000h"]);
        call.args[0].alt_text = Some("CORINFO_HELP_RngChkFail".to_string());
        let result = annotate(&call, None, None, 0x1000, &DecompileOptions::default()).unwrap();
        assert_eq!(result.unwrap(), "throw");

        // Ordinary calls stay bare.
        assert_eq!(comment("call", &["7FF800001000h"]), None);
    }

    #[test]
    fn compare_pairs_with_signed_branch() {
        let cmp = instruction("cmp", &["eax", "1"]);
        let branch = instruction("je", &["1010h"]);
        let result = annotate(
            &cmp,
            None,
            Some(&branch),
            0x1000,
            &DecompileOptions::default(),
        )
        .unwrap();
        assert_eq!(result.unwrap(), "if(eax == 1)");
    }

    #[test]
    fn compare_pairs_with_unsigned_branch() {
        let cmp = instruction("cmp", &["ecx", "0Ah"]);
        let branch = instruction("ja", &["1010h"]);
        let result = annotate(
            &cmp,
            None,
            Some(&branch),
            0x1000,
            &DecompileOptions::default(),
        )
        .unwrap();
        assert_eq!(result.unwrap(), "if(ecx > 10)");
    }

    #[test]
    fn test_pairs_with_branch() {
        let test = instruction("test", &["eax", "eax"]);
        let branch = instruction("jnz", &["1010h"]);
        let result = annotate(
            &test,
            None,
            Some(&branch),
            0x1000,
            &DecompileOptions::default(),
        )
        .unwrap();
        assert_eq!(result.unwrap(), "if(eax != eax)");
    }

    #[test]
    fn branch_after_compare_stays_bare() {
        let cmp = instruction("cmp", &["eax", "1"]);
        let branch = instruction("je", &["1010h"]);
        let result = annotate(
            &branch,
            Some(&cmp),
            None,
            0x1000,
            &DecompileOptions::default(),
        )
        .unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn bare_branch_becomes_goto() {
        let mut jump = instruction("jmp", &["1020h"]);
        jump.args[0].has_reference = true;
        jump.ref_address = Some(0x1020);
        jump.direction = JumpDirection::Down;
        let result = annotate(&jump, None, None, 0x1000, &DecompileOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(result, "goto 0000000000001020h ↓");
    }

    #[test]
    fn goto_honors_relative_addresses() {
        let mut jump = instruction("jmp", &["1020h"]);
        jump.args[0].has_reference = true;
        jump.ref_address = Some(0x1020);
        jump.direction = JumpDirection::Up;
        let options = DecompileOptions {
            use_relative_addresses: true,
            ..DecompileOptions::default()
        };
        let result = annotate(&jump, None, None, 0x1000, &options).unwrap().unwrap();
        assert_eq!(result, "goto 20h ↑");
    }

    #[test]
    fn goto_honors_shortened_addresses() {
        let options = DecompileOptions {
            shorten_addresses: true,
            address_cut_length: 4,
            ..DecompileOptions::default()
        };
        assert_eq!(format_address(0x7FF8_1234_5678, 0, &options), "5678h");
    }

    #[test]
    fn unrecognized_mnemonic_unannotated() {
        assert_eq!(comment("vfmadd231ps", &["xmm0", "xmm1", "xmm2"]), None);
    }

    #[test]
    fn failure_is_caught_per_instruction() {
        let mut method = crate::model::DecompiledMethod::new("T", "M", "void", &[], 0x1000, 0x10);
        // A jump with no operand fails its handler; the mov after it must still
        // receive its comment.
        method.instructions.push(instruction("jmp", &[]));
        method.instructions.push(instruction("mov", &["eax", "ebx"]));
        method.reindex();

        annotate_method(&mut method, &DecompileOptions::default());

        assert_eq!(method.instructions[0].annotation, None);
        assert_eq!(
            method.instructions[1].annotation.as_deref(),
            Some("eax = ebx")
        );
    }

    #[test]
    fn documentation_column_override_wins() {
        let method = crate::model::DecompiledMethod::new("T", "M", "void", &[], 0x1000, 0);
        let options = DecompileOptions {
            documentation_column_offset: 40,
            ..DecompileOptions::default()
        };
        assert_eq!(documentation_column(&method, &options), 40);
    }

    #[test]
    fn documentation_column_auto_has_floor() {
        let mut method = crate::model::DecompiledMethod::new("T", "M", "void", &[], 0x1000, 0);
        method.instructions.push(instruction("ret", &[]));
        method.reindex();
        let column = documentation_column(&method, &DecompileOptions::default());
        assert!(column >= MIN_DOC_COLUMN);
        assert_eq!(column % 4, 0);
    }
}
