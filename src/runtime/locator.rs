//! Native-code location and tier comparison.
//!
//! Ordinary methods resolve through the runtime's standard method-to-native-code
//! mapping and carry an exact IL-to-native offset map. Generic instantiations cannot:
//! for those a lower-level table/slot lookup supplies address and length only, and
//! the absent offset map is represented as absent ([`NativeCode::offset_map`] is
//! `None`) rather than faked.

use crate::{
    runtime::target::{MethodIdentity, RuntimeSession, RuntimeTarget},
    Error, Result,
};

/// One IL-offset-to-native-offset correspondence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetPair {
    /// Offset into the method's intermediate code
    pub il_offset: u32,
    /// Offset into the method's native code
    pub native_offset: u32,
}

/// The located native code of one method compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeCode {
    /// Base address of the native code
    pub address: u64,
    /// Byte length of the native code
    pub length: u32,
    /// IL-to-native offset map; `None` for table/slot resolutions (generic
    /// instantiations), which cannot produce one
    pub offset_map: Option<Vec<OffsetPair>>,
}

/// Result of re-resolving a method against a previously captured resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tiering {
    /// Both resolutions returned the same address: only one tier exists and must be
    /// reported as such, not duplicated
    Single(NativeCode),
    /// The addresses differ: a legitimate pair of successive compilation tiers
    Pair {
        /// The earlier, less optimized compilation
        tier0: NativeCode,
        /// The current compilation
        tier1: NativeCode,
    },
}

/// Resolve the native code of `identity` on the session's target.
///
/// Ordinary methods go through the standard mapping. Generic instantiations fall
/// back to the table/slot path when the standard mapping yields nothing.
///
/// # Errors
///
/// - [`Error::NotYetCompiled`] when an ordinary method has no native code yet; fatal
///   for this method only, batch callers skip it and continue
/// - [`Error::UnresolvedGeneric`] when a generic instantiation fails both paths
pub fn resolve<T: RuntimeTarget>(
    session: &RuntimeSession<'_, T>,
    identity: &MethodIdentity,
) -> Result<NativeCode> {
    if let Some(code) = session.target().native_code(identity)? {
        return Ok(code);
    }

    if identity.is_generic_instantiation() {
        match session.target().instantiation_code(identity)? {
            Some((address, length)) => Ok(NativeCode {
                address,
                length,
                offset_map: None,
            }),
            None => Err(Error::UnresolvedGeneric {
                method: identity.to_string(),
            }),
        }
    } else {
        Err(Error::NotYetCompiled {
            method: identity.to_string(),
        })
    }
}

/// Compare a freshly resolved compilation against a previously captured one.
///
/// Identical addresses mean the method has not re-tiered; the single current
/// resolution is returned. Differing addresses are a Tier0/Tier1 pair suitable for
/// side-by-side presentation.
pub fn compare_tiers(previous: NativeCode, current: NativeCode) -> Tiering {
    if previous.address == current.address {
        Tiering::Single(current)
    } else {
        Tiering::Pair {
            tier0: previous,
            tier1: current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::target::InMemoryTarget;

    fn code_at(address: u64) -> NativeCode {
        NativeCode {
            address,
            length: 0x20,
            offset_map: Some(vec![OffsetPair {
                il_offset: 0,
                native_offset: 0,
            }]),
        }
    }

    #[test]
    fn ordinary_method_resolves_with_offset_map() {
        let mut target = InMemoryTarget::new();
        let identity = MethodIdentity::new("T", "M", "void", &[]);
        target.add_method(identity.clone(), code_at(0x1000));

        let session = RuntimeSession::open(&mut target).unwrap();
        let code = resolve(&session, &identity).unwrap();

        assert_eq!(code.address, 0x1000);
        assert!(code.offset_map.is_some());
    }

    #[test]
    fn missing_method_is_not_yet_compiled() {
        let mut target = InMemoryTarget::new();
        let identity = MethodIdentity::new("T", "Cold", "void", &[]);

        let session = RuntimeSession::open(&mut target).unwrap();
        assert!(matches!(
            resolve(&session, &identity),
            Err(Error::NotYetCompiled { .. })
        ));
    }

    #[test]
    fn instantiation_falls_back_without_offset_map() {
        let mut target = InMemoryTarget::new();
        let identity =
            MethodIdentity::new("T", "M", "void", &["T0"]).with_generic_args(&["int"]);
        target.add_instantiation(identity.clone(), 0x3000, 0x40);

        let session = RuntimeSession::open(&mut target).unwrap();
        let code = resolve(&session, &identity).unwrap();

        assert_eq!(code.address, 0x3000);
        assert_eq!(code.length, 0x40);
        // Deliberate capability reduction of the table/slot path.
        assert!(code.offset_map.is_none());
    }

    #[test]
    fn instantiation_failing_both_paths() {
        let mut target = InMemoryTarget::new();
        let identity =
            MethodIdentity::new("T", "M", "void", &["T0"]).with_generic_args(&["string"]);

        let session = RuntimeSession::open(&mut target).unwrap();
        assert!(matches!(
            resolve(&session, &identity),
            Err(Error::UnresolvedGeneric { .. })
        ));
    }

    #[test]
    fn same_address_reports_single_tier() {
        match compare_tiers(code_at(0x1000), code_at(0x1000)) {
            Tiering::Single(code) => assert_eq!(code.address, 0x1000),
            other => panic!("expected Single, got {other:?}"),
        }
    }

    #[test]
    fn different_address_reports_pair() {
        match compare_tiers(code_at(0x1000), code_at(0x5000)) {
            Tiering::Pair { tier0, tier1 } => {
                assert_eq!(tier0.address, 0x1000);
                assert_eq!(tier1.address, 0x5000);
            }
            other => panic!("expected Pair, got {other:?}"),
        }
    }
}
