//! Machine-code decoding into structured instructions.
//!
//! A thin wrapper around `iced-x86` that decodes a byte buffer starting at a virtual
//! address into a lazy, finite, forward-only sequence of `(mnemonic, operand-list,
//! length)` tuples. Instruction boundaries are preserved exactly: every decoded
//! address is the base address plus the sum of the preceding instruction lengths, with
//! no overlap and no gaps. Malformed trailing bytes (padding or metadata tails) do not
//! fail the sequence; decoding simply stops.
//!
//! # Key Types
//! - [`DecodedInstruction`] - Address, mnemonic, operands, flow kind, branch target
//! - [`DecodedOperand`] - Display text plus memory-addressing flag
//! - [`InstructionIter`] - The lazy decoding iterator returned by [`decode`]
//!
//! # Example
//! ```rust
//! use jitscope::disassembler::decode;
//!
//! let code = [0x31, 0xC0, 0xC3]; // xor eax, eax; ret
//! let instructions: Vec<_> = decode(&code, 0x1000).collect();
//! assert_eq!(instructions.len(), 2);
//! assert_eq!(instructions[0].mnemonic, "xor");
//! assert_eq!(instructions[1].address, 0x1002);
//! ```

mod decoder;

pub use decoder::{decode, DecodedInstruction, DecodedOperand, FlowKind, InstructionIter};
