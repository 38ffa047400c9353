//! End-to-end pipeline integration tests.
//!
//! These tests drive the full decompilation pipeline over a hand-assembled x64
//! method hosted by an [`InMemoryTarget`]: locate, decode, resolve symbols, lay
//! out jump guides, annotate, and infer inlining, all from one entry point.

use jitscope::prelude::*;

/// A small loop with one forward branch, one backward branch, and one
/// out-of-range call:
///
/// ```text
/// 1000: 31 C0             xor  eax, eax
/// 1002: 83 F8 05          cmp  eax, 5
/// 1005: 7D 02             jge  1009h
/// 1007: FF C0             inc  eax
/// 1009: E8 F2 0F 00 00    call 2000h        ; Helpers.Work
/// 100E: EB F2             jmp  1002h
/// 1010: C3                ret
/// ```
fn loop_target() -> (InMemoryTarget, MethodIdentity) {
    let code = vec![
        0x31, 0xC0, // xor eax, eax
        0x83, 0xF8, 0x05, // cmp eax, 5
        0x7D, 0x02, // jge +2
        0xFF, 0xC0, // inc eax
        0xE8, 0xF2, 0x0F, 0x00, 0x00, // call rel32 -> 0x2000
        0xEB, 0xF2, // jmp -14
        0xC3, // ret
    ];
    let length = code.len() as u32;

    let mut target = InMemoryTarget::new();
    target.set_code(0x1000, code);

    let identity = MethodIdentity::new("Program", "CountUp", "int", &[]);
    target.add_method(
        identity.clone(),
        NativeCode {
            address: 0x1000,
            length,
            offset_map: None,
        },
    );
    target.add_method(
        MethodIdentity::new("Helpers", "Work", "void", &[]),
        NativeCode {
            address: 0x2000,
            length: 0x10,
            offset_map: None,
        },
    );
    target.add_known_calls(
        identity.clone(),
        vec![
            MethodSignature::new("Helpers", "Work", "void", &[]),
            MethodSignature::new("Inlined", "Gone", "void", &[]),
        ],
    );
    (target, identity)
}

#[test]
fn test_decode_and_jump_classification() {
    let (mut target, identity) = loop_target();
    let session = RuntimeSession::open(&mut target).unwrap();

    let method = decompile(&session, &identity, &DecompileOptions::default()).unwrap();

    assert_eq!(method.full_name(), "Program.CountUp");
    let mnemonics: Vec<&str> = method
        .instructions
        .iter()
        .map(|i| i.mnemonic.as_str())
        .collect();
    assert_eq!(mnemonics, ["xor", "cmp", "jge", "inc", "call", "jmp", "ret"]);
    for (i, instruction) in method.instructions.iter().enumerate() {
        assert_eq!(instruction.ordinal_index, i);
    }

    // Forward conditional: jge at ordinal 2 lands on the call at ordinal 4.
    let jge = &method.instructions[2];
    assert_eq!(jge.direction, JumpDirection::Down);
    assert_eq!(jge.ref_address, Some(0x1009));
    assert_eq!(jge.jump_index, Some(4));
    assert_eq!(jge.jump_size, 2);

    // Backward unconditional: jmp at ordinal 5 returns to the cmp at ordinal 1.
    let jmp = &method.instructions[5];
    assert_eq!(jmp.direction, JumpDirection::Up);
    assert_eq!(jmp.ref_address, Some(0x1002));
    assert_eq!(jmp.jump_index, Some(1));
    assert_eq!(jmp.jump_size, 4);

    assert_eq!(method.in_range_jump_count(), 2);
}

#[test]
fn test_out_of_range_call_resolves_symbol() {
    let (mut target, identity) = loop_target();
    let session = RuntimeSession::open(&mut target).unwrap();

    let method = decompile(&session, &identity, &DecompileOptions::default()).unwrap();

    let call = &method.instructions[4];
    assert_eq!(call.direction, JumpDirection::Out);
    assert_eq!(call.ref_address, Some(0x2000));
    let arg = &call.args[0];
    assert!(arg.has_reference);
    assert_eq!(arg.alt_text.as_deref(), Some("Helpers.Work"));
    assert_eq!(arg.call_address, Some(0x2000));
    assert_eq!(arg.call_length, Some(0x10));
    assert_eq!(arg.display_text(), "Helpers.Work");
}

#[test]
fn test_guide_layout_nests_by_span() {
    let (mut target, identity) = loop_target();
    let session = RuntimeSession::open(&mut target).unwrap();

    let method = decompile(&session, &identity, &DecompileOptions::default()).unwrap();

    // Two jumps, two columns each; the span-4 jmp takes the outer column.
    for instruction in &method.instructions {
        assert_eq!(instruction.guides.len(), 4);
    }
    let row = |i: usize| -> String {
        method.instructions[i]
            .guides
            .iter()
            .map(|g| g.as_char())
            .collect()
    };
    assert_eq!(row(0), "    ");
    assert_eq!(row(1), "┌──►"); // jmp target
    assert_eq!(row(2), "│ ┌●"); // jge source inside the jmp bracket
    assert_eq!(row(3), "│ │ ");
    assert_eq!(row(4), "│ └►"); // jge target
    assert_eq!(row(5), "└──●"); // jmp source
    assert_eq!(row(6), "    ");
}

#[test]
fn test_annotations_read_as_pseudocode() {
    let (mut target, identity) = loop_target();
    let session = RuntimeSession::open(&mut target).unwrap();

    let method = decompile(&session, &identity, &DecompileOptions::default()).unwrap();

    let annotation = |i: usize| method.instructions[i].annotation.as_deref();
    assert_eq!(annotation(0), Some("eax = 0"));
    assert_eq!(annotation(1), Some("if(eax >= 5)"));
    // The compare line carries the condition; the branch itself stays bare.
    assert_eq!(annotation(2), None);
    assert_eq!(annotation(3), Some("eax++"));
    assert_eq!(annotation(4), None);
    assert_eq!(annotation(5), Some("goto 0000000000001002h ↑"));
    assert_eq!(annotation(6), Some("return;"));
}

#[test]
fn test_inlining_reports_only_vanished_calls() {
    let (mut target, identity) = loop_target();
    let session = RuntimeSession::open(&mut target).unwrap();

    let method = decompile(&session, &identity, &DecompileOptions::default()).unwrap();

    // Helpers.Work is present as a call instruction; Inlined.Gone is not.
    assert_eq!(method.messages.len(), 1);
    assert_eq!(
        method.messages[0],
        "call not present in native code (inlined or eliminated): void Inlined.Gone()"
    );
}

#[test]
fn test_batch_preserves_order_and_isolates_failures() {
    let (mut target, identity) = loop_target();
    let missing = MethodIdentity::new("Program", "NeverRun", "void", &[]);
    let session = RuntimeSession::open(&mut target).unwrap();

    let results = decompile_batch(
        &session,
        &[missing.clone(), identity],
        &DecompileOptions::default(),
    );

    assert_eq!(results.len(), 2);
    assert!(matches!(results[0], Err(Error::NotYetCompiled { .. })));
    let method = results[1].as_ref().unwrap();
    assert_eq!(method.full_name(), "Program.CountUp");
}

#[test]
fn test_tier_resolution_single_and_pair() {
    let (mut target, identity) = loop_target();
    let session = RuntimeSession::open(&mut target).unwrap();

    let single = resolve_tiers(&session, &identity, None).unwrap();
    let current = match single {
        Tiering::Single(code) => code,
        Tiering::Pair { .. } => panic!("one resolution cannot be a pair"),
    };
    assert_eq!(current.address, 0x1000);

    // Same address twice collapses back to a single tier.
    let again = resolve_tiers(&session, &identity, Some(current)).unwrap();
    assert!(matches!(again, Tiering::Single(_)));

    // A differing previous address reports a genuine tier pair.
    let earlier = NativeCode {
        address: 0x500,
        length: 0x20,
        offset_map: None,
    };
    let tiers = resolve_tiers(&session, &identity, Some(earlier)).unwrap();
    match tiers {
        Tiering::Pair { tier0, tier1 } => {
            assert_eq!(tier0.address, 0x500);
            assert_eq!(tier1.address, 0x1000);
        }
        Tiering::Single(_) => panic!("differing addresses must report both tiers"),
    }
}

#[test]
fn test_generic_instantiation_falls_back_to_slot_lookup() {
    let mut target = InMemoryTarget::new();
    // xor eax, eax; ret
    target.set_code(0x3000, vec![0x31, 0xC0, 0xC3]);
    let identity =
        MethodIdentity::new("Holder", "Read", "T", &["int"]).with_generic_args(&["int"]);
    target.add_instantiation(identity.clone(), 0x3000, 3);
    let session = RuntimeSession::open(&mut target).unwrap();

    let method = decompile(&session, &identity, &DecompileOptions::default()).unwrap();

    assert!(method.flags.contains(MethodFlags::GENERIC_INSTANTIATION));
    assert_eq!(method.instructions.len(), 2);
    assert_eq!(method.instructions[1].mnemonic, "ret");
}
