use std::fmt;

use strum::Display;

/// Direction of a jump relative to its owning instruction.
///
/// Derived, never set ad hoc: `Up`/`Down` only when the target address lies within
/// the owning method's `[base, base + length)` range, `Out` otherwise. `Label` is
/// produced only by the textual-assembly front end for branches whose target is a
/// named label rather than an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum JumpDirection {
    /// Not a jump, or the reference never resolved
    None,
    /// Target lies at a lower address inside the method
    Up,
    /// Target lies at a higher address inside the method
    Down,
    /// Target lies outside the method (a call or tail jump)
    Out,
    /// Target is a textual label (textual front end only)
    Label,
}

/// One cell of an instruction's guide-glyph buffer.
///
/// `Empty` is the sentinel value every cell starts out as; the layout engine paints
/// over it. [`GuideGlyph::as_char`] maps each role to its rendering character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum GuideGlyph {
    /// Unpainted cell
    Empty,
    /// Upper corner of a bracket (the topmost row of a jump span)
    CornerDown,
    /// Lower corner of a bracket (the bottommost row of a jump span)
    CornerUp,
    /// Vertical connector between a jump and its target
    Vertical,
    /// Horizontal fill from a bracket column towards the instruction text
    Horizontal,
    /// Two guides crossing at this cell
    Cross,
    /// Bullet marking the jump-source end of a bracket
    Start,
    /// Arrowhead marking the jump-target end of a bracket
    Arrow,
}

impl GuideGlyph {
    /// The character this glyph renders as.
    pub fn as_char(self) -> char {
        match self {
            GuideGlyph::Empty => ' ',
            GuideGlyph::CornerDown => '┌',
            GuideGlyph::CornerUp => '└',
            GuideGlyph::Vertical => '│',
            GuideGlyph::Horizontal => '─',
            GuideGlyph::Cross => '┼',
            GuideGlyph::Start => '●',
            GuideGlyph::Arrow => '►',
        }
    }
}

/// Distinguishes a real decoded instruction from an injected annotation line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionKind {
    /// A machine instruction decoded from native code
    Code,
    /// An injected source/IL annotation line sharing the address of the following
    /// instruction
    Annotation,
}

/// One operand of a decoded instruction.
#[derive(Debug, Clone, Default)]
pub struct InstructionArg {
    /// Raw display text as the decoder formatted it
    pub text: String,
    /// Alternate display text, set when the operand resolved to a symbol name
    pub alt_text: Option<String>,
    /// Native entry address of the resolved callee, when the operand resolved to a
    /// method
    pub call_address: Option<u64>,
    /// Native code length of the resolved callee
    pub call_length: Option<u32>,
    /// Whether a reference address was actually resolved for this operand
    pub has_reference: bool,
    /// Whether this operand uses a memory addressing mode
    pub is_memory: bool,
}

impl InstructionArg {
    /// An operand carrying only display text.
    pub fn text(text: impl Into<String>) -> Self {
        InstructionArg {
            text: text.into(),
            ..InstructionArg::default()
        }
    }

    /// The text a renderer should show: the resolved symbol when present, the raw
    /// operand text otherwise.
    pub fn display_text(&self) -> &str {
        self.alt_text.as_deref().unwrap_or(&self.text)
    }
}

/// A single decoded instruction inside a [`crate::model::DecompiledMethod`].
#[derive(Debug, Clone)]
pub struct AssemblyInstruction {
    /// Position of this instruction in the owning sequence; always equals its index
    pub ordinal_index: usize,
    /// Virtual address of the first byte
    pub address: u64,
    /// Mnemonic text, lowercase
    pub mnemonic: String,
    /// Operands in listing order
    pub args: Vec<InstructionArg>,
    /// Resolved reference address (jump or call target); meaningful only when an arg
    /// has its resolved flag set
    pub ref_address: Option<u64>,
    /// Derived jump direction
    pub direction: JumpDirection,
    /// Absolute distance in ordinal positions to the jump target, `0` if none
    pub jump_size: usize,
    /// Ordinal index of the jump target, when the target lies inside the method
    pub jump_index: Option<usize>,
    /// Guide-glyph buffer, sized by the layout engine to two cells per in-range jump
    pub guides: Vec<GuideGlyph>,
    /// Whether this is a real instruction or an injected annotation line
    pub kind: InstructionKind,
    /// Pseudocode comment attached by the semantic annotator
    pub annotation: Option<String>,
}

impl AssemblyInstruction {
    /// Create a code instruction with no derived jump data.
    pub fn new(ordinal_index: usize, address: u64, mnemonic: impl Into<String>) -> Self {
        AssemblyInstruction {
            ordinal_index,
            address,
            mnemonic: mnemonic.into(),
            args: Vec::new(),
            ref_address: None,
            direction: JumpDirection::None,
            jump_size: 0,
            jump_index: None,
            guides: Vec::new(),
            kind: InstructionKind::Code,
            annotation: None,
        }
    }

    /// Create an injected annotation line at the given address.
    pub fn annotation_line(ordinal_index: usize, address: u64, text: impl Into<String>) -> Self {
        let mut instruction = AssemblyInstruction::new(ordinal_index, address, ";");
        instruction.args.push(InstructionArg::text(text));
        instruction.kind = InstructionKind::Annotation;
        instruction
    }

    /// Whether this instruction jumps within its owning method.
    pub fn is_in_range_jump(&self) -> bool {
        matches!(self.direction, JumpDirection::Up | JumpDirection::Down)
            && self.jump_index.is_some()
    }
}

impl fmt::Display for AssemblyInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i == 0 {
                write!(f, " {}", arg.display_text())?;
            } else {
                write!(f, ", {}", arg.display_text())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_operands() {
        let mut instruction = AssemblyInstruction::new(0, 0x1000, "mov");
        instruction.args.push(InstructionArg::text("eax"));
        instruction.args.push(InstructionArg::text("ebx"));

        assert_eq!(instruction.to_string(), "mov eax, ebx");
    }

    #[test]
    fn display_prefers_resolved_symbol() {
        let mut instruction = AssemblyInstruction::new(0, 0x1000, "call");
        let mut arg = InstructionArg::text("7FF8000012A0h");
        arg.alt_text = Some("System.Console.WriteLine".to_string());
        arg.has_reference = true;
        instruction.args.push(arg);

        assert_eq!(instruction.to_string(), "call System.Console.WriteLine");
    }

    #[test]
    fn annotation_line_kind() {
        let line = AssemblyInstruction::annotation_line(3, 0x1010, "IL_0004");
        assert_eq!(line.kind, InstructionKind::Annotation);
        assert_eq!(line.args[0].text, "IL_0004");
    }

    #[test]
    fn glyph_characters() {
        assert_eq!(GuideGlyph::Empty.as_char(), ' ');
        assert_eq!(GuideGlyph::Cross.as_char(), '┼');
        assert_eq!(GuideGlyph::Arrow.as_char(), '►');
    }
}
