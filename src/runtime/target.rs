use std::collections::HashMap;
use std::fmt;

use crate::{
    model::MethodSignature,
    runtime::locator::NativeCode,
    Error, Result,
};

/// Identity of a method to resolve, as the front end names it.
///
/// Resolution requires the method to have been invoked or explicitly prepared at
/// least once; otherwise the locator signals [`Error::NotYetCompiled`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodIdentity {
    /// Declaring type name
    pub declaring_type: String,
    /// Simple method name
    pub name: String,
    /// Return type name
    pub return_type: String,
    /// Ordered parameter type names
    pub parameters: Vec<String>,
    /// Generic type arguments of an instantiation, empty for ordinary methods
    pub generic_args: Vec<String>,
}

impl MethodIdentity {
    /// Identity of an ordinary (non-generic) method.
    pub fn new(declaring_type: &str, name: &str, return_type: &str, parameters: &[&str]) -> Self {
        MethodIdentity {
            declaring_type: declaring_type.to_string(),
            name: name.to_string(),
            return_type: return_type.to_string(),
            parameters: parameters.iter().map(ToString::to_string).collect(),
            generic_args: Vec::new(),
        }
    }

    /// Turn this identity into a generic instantiation with the given type arguments.
    pub fn with_generic_args(mut self, generic_args: &[&str]) -> Self {
        self.generic_args = generic_args.iter().map(ToString::to_string).collect();
        self
    }

    /// Whether this identity names a generic-method instantiation.
    pub fn is_generic_instantiation(&self) -> bool {
        !self.generic_args.is_empty()
    }
}

impl fmt::Display for MethodIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring_type, self.name)?;
        if !self.generic_args.is_empty() {
            write!(f, "<{}>", self.generic_args.join(", "))?;
        }
        write!(f, "({})", self.parameters.join(", "))
    }
}

/// A method found by address- or descriptor-based lookup on the target.
#[derive(Debug, Clone)]
pub struct ResolvedMethod {
    /// Canonical display name
    pub name: String,
    /// Native entry address
    pub address: u64,
    /// Native code length
    pub length: u32,
}

/// The introspection surface of a running process (or a synthetic stand-in).
///
/// All lookups are read-only; [`RuntimeTarget::flush_jit_caches`] is the single
/// mutating operation and is invoked exactly once, when a session opens.
pub trait RuntimeTarget {
    /// Flush pending JIT caches so subsequent address lookups see current code.
    fn flush_jit_caches(&mut self) -> Result<()>;

    /// Standard method-to-native-code mapping. `Ok(None)` means the method exists but
    /// has no native code via this path (not yet compiled, or a generic
    /// instantiation).
    fn native_code(&self, identity: &MethodIdentity) -> Result<Option<NativeCode>>;

    /// Secondary table/slot lookup for generic instantiations. Yields address and
    /// length but never an offset map; that capability reduction is inherent to the
    /// path, not an omission.
    fn instantiation_code(&self, identity: &MethodIdentity) -> Result<Option<(u64, u32)>>;

    /// Runtime-helper name table (array/throw helpers and the like).
    fn helper_name(&self, address: u64) -> Option<String>;

    /// Type-metadata name table.
    fn type_name(&self, address: u64) -> Option<String>;

    /// Direct method-descriptor lookup.
    fn method_for_descriptor(&self, address: u64) -> Option<ResolvedMethod>;

    /// Address-to-method lookup for any address inside a method's native code.
    fn method_at_address(&self, address: u64) -> Option<ResolvedMethod>;

    /// Read one pointer-sized value at `address`, for the indirection step of symbol
    /// resolution.
    fn read_pointer(&self, address: u64) -> Option<u64>;

    /// Read `length` code bytes starting at `address`.
    fn read_code(&self, address: u64, length: u32) -> Result<Vec<u8>>;

    /// The statically-known call list of a method, used to seed inlining inference.
    fn known_calls(&self, identity: &MethodIdentity) -> Vec<MethodSignature>;
}

/// Scoped, exclusive access to a [`RuntimeTarget`].
///
/// Opening flushes pending JIT caches; the mutable borrow guarantees no second
/// session can exist for the same target while this one lives, and release happens
/// on every exit path including unwinding.
pub struct RuntimeSession<'t, T: RuntimeTarget> {
    target: &'t mut T,
}

impl<'t, T: RuntimeTarget> RuntimeSession<'t, T> {
    /// Open a session, flushing the target's pending JIT caches first.
    pub fn open(target: &'t mut T) -> Result<Self> {
        target.flush_jit_caches()?;
        log::debug!("runtime session opened");
        Ok(RuntimeSession { target })
    }

    /// The target this session scopes.
    pub fn target(&self) -> &T {
        self.target
    }
}

impl<T: RuntimeTarget> Drop for RuntimeSession<'_, T> {
    fn drop(&mut self) {
        log::debug!("runtime session closed");
    }
}

/// A synthetic [`RuntimeTarget`] over plain in-memory buffers.
///
/// Lets the entire pipeline run without a live process: tests assemble code bytes
/// and symbol tables by hand, and front-end adapters can stage captured data.
#[derive(Debug, Default)]
pub struct InMemoryTarget {
    code: Vec<u8>,
    code_base: u64,
    methods: HashMap<MethodIdentity, NativeCode>,
    instantiations: HashMap<MethodIdentity, (u64, u32)>,
    helpers: HashMap<u64, String>,
    types: HashMap<u64, String>,
    descriptors: HashMap<u64, ResolvedMethod>,
    by_address: Vec<ResolvedMethod>,
    pointers: HashMap<u64, u64>,
    calls: HashMap<MethodIdentity, Vec<MethodSignature>>,
    flushed: bool,
}

impl InMemoryTarget {
    /// An empty target with no code region.
    pub fn new() -> Self {
        InMemoryTarget::default()
    }

    /// Install the backing code region.
    pub fn set_code(&mut self, base: u64, bytes: Vec<u8>) {
        self.code_base = base;
        self.code = bytes;
    }

    /// Register a method resolvable through the standard mapping.
    pub fn add_method(&mut self, identity: MethodIdentity, code: NativeCode) {
        self.by_address.push(ResolvedMethod {
            name: format!("{}.{}", identity.declaring_type, identity.name),
            address: code.address,
            length: code.length,
        });
        self.methods.insert(identity, code);
    }

    /// Register a generic instantiation resolvable only through table/slot lookup.
    pub fn add_instantiation(&mut self, identity: MethodIdentity, address: u64, length: u32) {
        self.by_address.push(ResolvedMethod {
            name: identity.to_string(),
            address,
            length,
        });
        self.instantiations.insert(identity, (address, length));
    }

    /// Register a runtime-helper name.
    pub fn add_helper(&mut self, address: u64, name: &str) {
        self.helpers.insert(address, name.to_string());
    }

    /// Register a type-metadata name.
    pub fn add_type(&mut self, address: u64, name: &str) {
        self.types.insert(address, name.to_string());
    }

    /// Register a method descriptor.
    pub fn add_descriptor(&mut self, address: u64, method: ResolvedMethod) {
        self.descriptors.insert(address, method);
    }

    /// Register a readable pointer slot.
    pub fn add_pointer(&mut self, address: u64, value: u64) {
        self.pointers.insert(address, value);
    }

    /// Register the statically-known call list of a method.
    pub fn add_known_calls(&mut self, identity: MethodIdentity, calls: Vec<MethodSignature>) {
        self.calls.insert(identity, calls);
    }

    /// Whether the JIT caches were flushed (a session was opened).
    pub fn was_flushed(&self) -> bool {
        self.flushed
    }
}

impl RuntimeTarget for InMemoryTarget {
    fn flush_jit_caches(&mut self) -> Result<()> {
        self.flushed = true;
        Ok(())
    }

    fn native_code(&self, identity: &MethodIdentity) -> Result<Option<NativeCode>> {
        Ok(self.methods.get(identity).cloned())
    }

    fn instantiation_code(&self, identity: &MethodIdentity) -> Result<Option<(u64, u32)>> {
        Ok(self.instantiations.get(identity).copied())
    }

    fn helper_name(&self, address: u64) -> Option<String> {
        self.helpers.get(&address).cloned()
    }

    fn type_name(&self, address: u64) -> Option<String> {
        self.types.get(&address).cloned()
    }

    fn method_for_descriptor(&self, address: u64) -> Option<ResolvedMethod> {
        self.descriptors.get(&address).cloned()
    }

    fn method_at_address(&self, address: u64) -> Option<ResolvedMethod> {
        self.by_address
            .iter()
            .find(|m| address >= m.address && address < m.address + u64::from(m.length))
            .cloned()
    }

    fn read_pointer(&self, address: u64) -> Option<u64> {
        self.pointers.get(&address).copied()
    }

    fn read_code(&self, address: u64, length: u32) -> Result<Vec<u8>> {
        if self.code.is_empty() {
            return Err(Error::Empty);
        }
        let start = address
            .checked_sub(self.code_base)
            .ok_or(Error::OutOfBounds)? as usize;
        let end = start + length as usize;
        if end > self.code.len() {
            return Err(Error::OutOfBounds);
        }
        Ok(self.code[start..end].to_vec())
    }

    fn known_calls(&self, identity: &MethodIdentity) -> Vec<MethodSignature> {
        self.calls.get(identity).cloned().unwrap_or_default()
    }
}
