//! Symbol resolution with an ordered fallback chain.
//!
//! An operand address is tried against progressively more generic lookups until one
//! succeeds. Order matters and is part of the contract: helper and metadata
//! addresses must be classified before the address-to-method fallback gets a chance
//! to misreport them as ordinary methods.
//!
//! 1. runtime-helper name table
//! 2. type-metadata name table
//! 3. direct method-descriptor lookup
//! 4. address-to-method lookup
//! 5. one level of pointer indirection, retrying step 4 on the dereferenced value
//!
//! A miss is not an error: the operand keeps its raw numeric text and its resolved
//! flag stays false.

use dashmap::DashMap;

use crate::runtime::target::RuntimeTarget;

/// A successfully resolved operand address.
#[derive(Debug, Clone)]
pub struct ResolvedSymbol {
    /// Human-readable name
    pub name: String,
    /// Native entry address of the resolved callee, when the symbol is a method
    pub call_address: Option<u64>,
    /// Native code length of the resolved callee
    pub call_length: Option<u32>,
}

impl ResolvedSymbol {
    fn named(name: String) -> Self {
        ResolvedSymbol {
            name,
            call_address: None,
            call_length: None,
        }
    }
}

/// Per-session cache of resolution results, hits and misses alike.
///
/// Valid only for the session it was created in: once new code is generated, cached
/// addresses go stale, which is exactly why sessions are scoped and exclusive.
#[derive(Debug, Default)]
pub struct SymbolCache {
    entries: DashMap<u64, Option<ResolvedSymbol>>,
}

impl SymbolCache {
    /// An empty cache.
    pub fn new() -> Self {
        SymbolCache::default()
    }

    /// Number of cached addresses.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve `address` to a symbol through the fixed fallback chain, consulting and
/// filling `cache`.
pub fn resolve_symbol<T: RuntimeTarget>(
    target: &T,
    cache: &SymbolCache,
    address: u64,
) -> Option<ResolvedSymbol> {
    if address == 0 {
        return None;
    }
    if let Some(cached) = cache.entries.get(&address) {
        return cached.clone();
    }

    let resolved = resolve_uncached(target, address);
    if resolved.is_none() {
        log::debug!("no symbol for address {address:#x}");
    }
    cache.entries.insert(address, resolved.clone());
    resolved
}

fn resolve_uncached<T: RuntimeTarget>(target: &T, address: u64) -> Option<ResolvedSymbol> {
    if let Some(name) = target.helper_name(address) {
        return Some(ResolvedSymbol::named(name));
    }
    if let Some(name) = target.type_name(address) {
        return Some(ResolvedSymbol::named(name));
    }
    if let Some(method) = target.method_for_descriptor(address) {
        return Some(ResolvedSymbol {
            name: method.name,
            call_address: Some(method.address),
            call_length: Some(method.length),
        });
    }
    if let Some(method) = target.method_at_address(address) {
        return Some(ResolvedSymbol {
            name: method.name,
            call_address: Some(method.address),
            call_length: Some(method.length),
        });
    }
    if let Some(indirect) = target.read_pointer(address) {
        if let Some(method) = target.method_at_address(indirect) {
            return Some(ResolvedSymbol {
                name: method.name,
                call_address: Some(method.address),
                call_length: Some(method.length),
            });
        }
    }
    None
}
