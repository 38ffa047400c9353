use bitflags::bitflags;

use crate::model::{
    AssemblyInstruction, InstructionKind, JumpDirection, MethodSignature,
};

bitflags! {
    /// Attribute flags carried by a [`DecompiledMethod`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MethodFlags: u8 {
        /// The method is visible to the renderer (not filtered out)
        const VISIBLE = 1;
        /// The method is a generic instantiation resolved via the table/slot path
        const GENERIC_INSTANTIATION = 1 << 1;
    }
}

/// One method's decoded native code plus the metadata every downstream pass consumes.
///
/// Constructed once per decompilation request by the locator/decoder/resolver;
/// instructions and messages may be appended afterwards by downstream passes; the
/// guide buffers are filled exactly once by the layout engine. The instance is owned
/// by the pipeline run that created it and discarded after rendering.
#[derive(Debug, Clone)]
pub struct DecompiledMethod {
    /// Simple method name
    pub name: String,
    /// Declaring type name
    pub declaring_type: String,
    /// Return type name
    pub return_type: String,
    /// Ordered parameter type names
    pub parameters: Vec<String>,
    /// Base address of the native code
    pub base_address: u64,
    /// Byte length of the native code
    pub length: u32,
    /// Decoded instructions, index-aligned with their ordinal indices
    pub instructions: Vec<AssemblyInstruction>,
    /// Statically-known calls, matched against decoded instructions by the inlining
    /// engine
    pub calls: Vec<MethodSignature>,
    /// Free-text diagnostic messages accumulated by the passes
    pub messages: Vec<String>,
    /// Attribute flags
    pub flags: MethodFlags,
}

impl DecompiledMethod {
    /// Create an empty method shell for the given identity and code region.
    pub fn new(
        declaring_type: &str,
        name: &str,
        return_type: &str,
        parameters: &[String],
        base_address: u64,
        length: u32,
    ) -> Self {
        DecompiledMethod {
            name: name.to_string(),
            declaring_type: declaring_type.to_string(),
            return_type: return_type.to_string(),
            parameters: parameters.to_vec(),
            base_address,
            length,
            instructions: Vec::new(),
            calls: Vec::new(),
            messages: Vec::new(),
            flags: MethodFlags::VISIBLE,
        }
    }

    /// Canonical `Type.Name` display of the method.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.declaring_type, self.name)
    }

    /// Whether `address` lies within this method's native code.
    pub fn contains_address(&self, address: u64) -> bool {
        address >= self.base_address && address < self.base_address + u64::from(self.length)
    }

    /// Ordinal index of the code instruction starting at `address`, skipping injected
    /// annotation lines that share an address with their successor.
    pub fn instruction_index_at(&self, address: u64) -> Option<usize> {
        self.instructions
            .iter()
            .position(|i| i.address == address && i.kind == InstructionKind::Code)
    }

    /// Number of instructions classified as in-range jumps.
    pub fn in_range_jump_count(&self) -> usize {
        self.instructions
            .iter()
            .filter(|i| i.is_in_range_jump())
            .count()
    }

    /// Append a diagnostic message.
    pub fn push_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Re-number ordinal indices after instructions were inserted or removed, keeping
    /// the `instructions[i].ordinal_index == i` invariant.
    pub fn reindex(&mut self) {
        for (i, instruction) in self.instructions.iter_mut().enumerate() {
            instruction.ordinal_index = i;
        }
    }

    /// Derive jump direction, span and target ordinal for every instruction with a
    /// resolved reference address.
    ///
    /// Classification rule: `Out` if the target lies outside `[base, base + length)`;
    /// otherwise `Up` when the instruction's address is greater than the target's,
    /// `Down` when it is smaller. Instructions tagged [`JumpDirection::Label`] by the
    /// textual front end are left untouched. Idempotent.
    pub fn derive_jump_metadata(&mut self) {
        for idx in 0..self.instructions.len() {
            let (address, target, resolved, labelled) = {
                let instruction = &self.instructions[idx];
                (
                    instruction.address,
                    instruction.ref_address,
                    instruction.args.iter().any(|a| a.has_reference),
                    instruction.direction == JumpDirection::Label,
                )
            };
            if labelled {
                continue;
            }
            let Some(target) = target else { continue };
            if target == 0 || !resolved {
                continue;
            }

            if !self.contains_address(target) {
                let instruction = &mut self.instructions[idx];
                instruction.direction = JumpDirection::Out;
                instruction.jump_size = 0;
                instruction.jump_index = None;
                continue;
            }

            let jump_index = self.instruction_index_at(target);
            let instruction = &mut self.instructions[idx];
            instruction.direction = if address > target {
                JumpDirection::Up
            } else if address < target {
                JumpDirection::Down
            } else {
                JumpDirection::None
            };
            instruction.jump_index = jump_index;
            instruction.jump_size = match jump_index {
                Some(j) => idx.abs_diff(j),
                None => 0,
            };
        }
    }
}
