//! Orchestration of the locate → decode → symbolize → analyze pipeline.
//!
//! One [`decompile`] call produces one fully populated
//! [`crate::model::DecompiledMethod`]: the locator finds the native code, the
//! decoder turns its bytes into instructions, the symbol resolver names referenced
//! addresses, and the analysis passes (guides, annotation, inlining inference) run
//! per the supplied [`DecompileOptions`].
//!
//! Batch processing never lets one method's failure abort its siblings: a method
//! that has not been compiled yet is skipped with its error preserved in the result
//! vector. Independent method instances share no state, so the batch runs them in
//! parallel.

use rayon::prelude::*;

use crate::{
    analysis,
    disassembler::decode,
    model::{AssemblyInstruction, DecompiledMethod, InstructionArg, MethodFlags},
    options::DecompileOptions,
    runtime::{
        self, resolve_symbol, MethodIdentity, NativeCode, OffsetPair, RuntimeSession,
        RuntimeTarget, SymbolCache, Tiering,
    },
    Result,
};

/// Decompile one method on the session's target.
///
/// # Errors
///
/// - [`crate::Error::NotYetCompiled`] when the method has no native code yet
/// - [`crate::Error::UnresolvedGeneric`] when a generic instantiation fails both
///   lookup paths
/// - [`crate::Error::OutOfBounds`] / [`crate::Error::Empty`] when the target cannot
///   produce the located code bytes
pub fn decompile<T: RuntimeTarget>(
    session: &RuntimeSession<'_, T>,
    identity: &MethodIdentity,
    options: &DecompileOptions,
) -> Result<DecompiledMethod> {
    let code = runtime::resolve(session, identity)?;
    let bytes = session.target().read_code(code.address, code.length)?;

    let mut method = DecompiledMethod::new(
        &identity.declaring_type,
        &identity.name,
        &identity.return_type,
        &identity.parameters,
        code.address,
        code.length,
    );
    if identity.is_generic_instantiation() {
        method.flags |= MethodFlags::GENERIC_INSTANTIATION;
    }
    method.calls = session.target().known_calls(identity);

    let cache = SymbolCache::new();
    for decoded in decode(&bytes, code.address) {
        let ordinal = method.instructions.len();
        let mut instruction =
            AssemblyInstruction::new(ordinal, decoded.address, decoded.mnemonic);
        for operand in &decoded.operands {
            let mut argument = InstructionArg::text(operand.text.clone());
            argument.is_memory = operand.is_memory;
            instruction.args.push(argument);
        }

        if let Some(target_address) = decoded.target {
            if method.contains_address(target_address) {
                // In-range jump; no symbol exists, the address itself is the reference.
                instruction.ref_address = Some(target_address);
                if let Some(argument) = instruction.args.first_mut() {
                    argument.has_reference = true;
                }
            } else if let Some(symbol) =
                resolve_symbol(session.target(), &cache, target_address)
            {
                instruction.ref_address = Some(target_address);
                if let Some(argument) = instruction.args.first_mut() {
                    argument.has_reference = true;
                    argument.alt_text = Some(symbol.name);
                    argument.call_address = symbol.call_address;
                    argument.call_length = symbol.call_length;
                }
            }
            // A miss leaves the raw numeric text and an unset resolved flag.
        }

        method.instructions.push(instruction);
    }

    if options.show_source_map_lines {
        if let Some(map) = &code.offset_map {
            inject_offset_annotations(&mut method, map);
        }
    }

    method.derive_jump_metadata();
    if options.show_guides {
        analysis::populate_guides(&mut method, options);
    }
    if options.show_documentation {
        analysis::annotate_method(&mut method, options);
    }
    for vanished in analysis::detect_inlining(&method) {
        method.push_message(format!(
            "call not present in native code (inlined or eliminated): {vanished}"
        ));
    }

    Ok(method)
}

/// Decompile many methods, in parallel, preserving input order.
///
/// Per-method failures stay in their slot of the result vector; no error aborts
/// processing of sibling methods.
pub fn decompile_batch<T>(
    session: &RuntimeSession<'_, T>,
    identities: &[MethodIdentity],
    options: &DecompileOptions,
) -> Vec<Result<DecompiledMethod>>
where
    T: RuntimeTarget + Sync,
{
    identities
        .par_iter()
        .map(|identity| decompile(session, identity, options))
        .collect()
}

/// Re-resolve a method and report whether it re-tiered since `previous` was
/// captured.
///
/// With no prior capture, the current resolution is the single known tier. With
/// one, identical addresses report [`Tiering::Single`] (the same compilation still
/// stands — it must not be presented twice); differing addresses report the
/// captured and current compilations as a Tier0/Tier1 pair.
pub fn resolve_tiers<T: RuntimeTarget>(
    session: &RuntimeSession<'_, T>,
    identity: &MethodIdentity,
    previous: Option<NativeCode>,
) -> Result<Tiering> {
    let current = runtime::resolve(session, identity)?;
    Ok(match previous {
        Some(previous) => runtime::compare_tiers(previous, current),
        None => Tiering::Single(current),
    })
}

/// Inject one `IL_xxxx` annotation line in front of every instruction the offset
/// map marks as an IL boundary, then restore ordinal alignment.
fn inject_offset_annotations(method: &mut DecompiledMethod, map: &[OffsetPair]) {
    let mut pairs: Vec<OffsetPair> = map.to_vec();
    pairs.sort_by_key(|p| p.native_offset);

    // Insert back to front so earlier indices stay valid.
    for pair in pairs.iter().rev() {
        let address = method.base_address + u64::from(pair.native_offset);
        if let Some(index) = method.instruction_index_at(address) {
            let line = AssemblyInstruction::annotation_line(
                0,
                address,
                format!("IL_{:04X}", pair.il_offset),
            );
            method.instructions.insert(index, line);
        }
    }
    method.reindex();
}
