use iced_x86::{
    Decoder, DecoderOptions, FlowControl, Formatter, Instruction, MasmFormatter, OpKind,
};

/// How an instruction affects control flow, reduced to what the pipeline needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    /// Falls through to the next instruction
    Sequential,
    /// Unconditional direct jump
    Branch,
    /// Conditional direct jump
    ConditionalBranch,
    /// Direct call
    Call,
    /// Return
    Return,
    /// Indirect call or jump through a register or memory slot
    Indirect,
}

/// One formatted operand of a decoded instruction.
#[derive(Debug, Clone)]
pub struct DecodedOperand {
    /// Display text, trimmed
    pub text: String,
    /// Whether the operand uses a memory addressing mode
    pub is_memory: bool,
}

/// One decoded instruction.
#[derive(Debug, Clone)]
pub struct DecodedInstruction {
    /// Virtual address: base address plus the cumulative length of prior instructions
    pub address: u64,
    /// Encoded length in bytes
    pub length: usize,
    /// Mnemonic text, lowercase
    pub mnemonic: String,
    /// Operands in listing order
    pub operands: Vec<DecodedOperand>,
    /// Control-flow classification
    pub flow: FlowKind,
    /// Branch or call target: the direct target for near branches, the referenced
    /// memory slot for RIP-relative indirect flow
    pub target: Option<u64>,
}

/// Decode `bytes` starting at `base_address` into a lazy instruction sequence.
///
/// The iterator terminates when the buffer is exhausted or an undecodable byte
/// sequence is reached; the latter is logged and swallowed, never an error.
pub fn decode(bytes: &[u8], base_address: u64) -> InstructionIter<'_> {
    let mut formatter = MasmFormatter::new();
    // Pinned number shape: uppercase hex digits with a trailing `h` radix marker,
    // so the annotator's literal handling is deterministic.
    formatter.options_mut().set_hex_prefix("");
    formatter.options_mut().set_hex_suffix("h");
    formatter.options_mut().set_uppercase_hex(true);
    formatter.options_mut().set_space_after_operand_separator(false);
    formatter.options_mut().set_show_branch_size(false);

    InstructionIter {
        decoder: Decoder::with_ip(64, bytes, base_address, DecoderOptions::NONE),
        formatter,
        scratch: Instruction::default(),
        output: String::new(),
        done: bytes.is_empty(),
    }
}

/// Lazy, finite, forward-only instruction iterator over one code buffer.
pub struct InstructionIter<'a> {
    decoder: Decoder<'a>,
    formatter: MasmFormatter,
    scratch: Instruction,
    output: String,
    done: bool,
}

impl InstructionIter<'_> {
    fn flow_kind(instruction: &Instruction) -> FlowKind {
        match instruction.flow_control() {
            FlowControl::UnconditionalBranch => FlowKind::Branch,
            FlowControl::ConditionalBranch => FlowKind::ConditionalBranch,
            FlowControl::Call => FlowKind::Call,
            FlowControl::Return => FlowKind::Return,
            FlowControl::IndirectBranch | FlowControl::IndirectCall => FlowKind::Indirect,
            _ => FlowKind::Sequential,
        }
    }

    fn branch_target(instruction: &Instruction, flow: FlowKind) -> Option<u64> {
        for i in 0..instruction.op_count() {
            if matches!(
                instruction.op_kind(i),
                OpKind::NearBranch16 | OpKind::NearBranch32 | OpKind::NearBranch64
            ) {
                return Some(instruction.near_branch_target());
            }
        }
        // Indirect flow through a RIP-relative slot: surface the slot address so the
        // symbol resolver's pointer-indirection step can take it from there.
        if matches!(flow, FlowKind::Indirect) && instruction.is_ip_rel_memory_operand() {
            return Some(instruction.ip_rel_memory_address());
        }
        None
    }
}

impl Iterator for InstructionIter<'_> {
    type Item = DecodedInstruction;

    fn next(&mut self) -> Option<DecodedInstruction> {
        if self.done || !self.decoder.can_decode() {
            return None;
        }
        self.decoder.decode_out(&mut self.scratch);
        if self.scratch.is_invalid() {
            // Padding or metadata tail past the last real instruction.
            log::debug!(
                "stopping decode at undecodable bytes, address {:#x}",
                self.scratch.ip()
            );
            self.done = true;
            return None;
        }

        self.output.clear();
        self.formatter
            .format_mnemonic(&self.scratch, &mut self.output);
        let mnemonic = self.output.trim().to_string();

        let mut operands = Vec::new();
        let count = self.formatter.operand_count(&self.scratch);
        for op in 0..count {
            self.output.clear();
            if self
                .formatter
                .format_operand(&self.scratch, &mut self.output, op)
                .is_err()
            {
                continue;
            }
            let is_memory = matches!(
                self.formatter.get_instruction_operand(&self.scratch, op),
                Ok(Some(i)) if self.scratch.op_kind(i) == OpKind::Memory
            );
            operands.push(DecodedOperand {
                text: self.output.trim().to_string(),
                is_memory,
            });
        }

        let flow = Self::flow_kind(&self.scratch);
        Some(DecodedInstruction {
            address: self.scratch.ip(),
            length: self.scratch.len(),
            mnemonic,
            operands,
            flow,
            target: Self::branch_target(&self.scratch, flow),
        })
    }
}
