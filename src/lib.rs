// Copyright 2026 jitscope contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
#![allow(dead_code)]

//! # jitscope
//!
//! A framework for inspecting, annotating and navigating the native code a managed
//! runtime's just-in-time compiler produced for a method. `jitscope` resolves where a
//! method's native code lives, decodes it into structured instructions, symbolizes
//! referenced addresses, lays out ASCII control-flow guides for intra-method jumps,
//! infers which statically-expected calls were optimized away, and attaches semantic
//! pseudocode comments to common instruction shapes.
//!
//! ## Features
//!
//! - **Native-code location** - Resolve address, length and IL-to-native offset map of a
//!   method's current compilation, including the table/slot fallback for generic
//!   instantiations
//! - **Structured decoding** - Lazy, boundary-exact x86/x64 decoding with per-operand
//!   display text
//! - **Symbolization** - Ordered fallback chain from runtime-helper tables down to
//!   pointer indirection
//! - **Jump guides** - Nested ASCII-art brackets connecting every in-range jump to its
//!   target
//! - **Inlining inference** - Elimination heuristic reporting which known calls vanished
//!   from the final code
//! - **Pseudocode annotation** - Closed per-mnemonic dispatch producing comments such as
//!   `eax = ebx` or `if(eax == 1)`
//!
//! ## Quick Start
//!
//! ```rust
//! use jitscope::prelude::*;
//!
//! # fn main() -> jitscope::Result<()> {
//! let mut target = InMemoryTarget::new();
//! // ... populate the synthetic target with code and symbol tables ...
//! let session = RuntimeSession::open(&mut target)?;
//! let identity = MethodIdentity::new("Program", "Main", "void", &[]);
//! let options = DecompileOptions::default();
//! match decompile(&session, &identity, &options) {
//!     Ok(method) => println!("{} instructions", method.instructions.len()),
//!     Err(Error::NotYetCompiled { method }) => eprintln!("skipping {method}"),
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The [`model`] module defines the canonical [`model::DecompiledMethod`] every other
//! component reads and writes. The [`runtime`] module locates native code and resolves
//! symbols through an explicit [`runtime::RuntimeTarget`] context (no ambient globals, so
//! the whole pipeline runs against a synthetic in-memory buffer in tests). The
//! [`disassembler`] decodes raw bytes; the [`analysis`] passes (guides, inlining,
//! annotation) are independent downstream consumers of one populated method instance.
//! [`pipeline`] wires them together for live targets, [`listing`] feeds the same model
//! from pre-tokenized textual assembly.

/// Prelude module for convenient imports
pub mod prelude;

/// Canonical decompiled-method data model
pub mod model;

/// Runtime introspection: target trait, session scoping, native-code location, symbols
pub mod runtime;

/// Machine-code decoding into structured instructions
pub mod disassembler;

/// Downstream analysis passes: jump guides, inlining inference, semantic annotation
pub mod analysis;

/// Orchestration of the full locate-decode-symbolize-analyze pipeline
pub mod pipeline;

/// Textual-assembly front end feeding the same model
pub mod listing;

/// Flat configuration record consumed by the layout and annotation stages
pub mod options;

mod error;

/// Convenience `Result` alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

pub use error::Error;
pub use options::DecompileOptions;
