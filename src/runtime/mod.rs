//! Runtime introspection surface: target abstraction, session scoping, native-code
//! location and symbol resolution.
//!
//! There is no ambient global session: the introspection surface is an explicit
//! context object ([`RuntimeTarget`]) passed into the locator and resolver, so the
//! whole pipeline can run against a synthetic in-memory buffer ([`InMemoryTarget`])
//! in tests.
//!
//! Attaching to a target is a scoped, exclusive resource: stale cached addresses
//! become invalid once new code is generated, so the contract is "open session →
//! flush pending JIT caches → resolve one or more methods → close session".
//! [`RuntimeSession`] enforces this with a mutable borrow for exclusivity and
//! guaranteed release on all exit paths.
//!
//! # Key Types
//! - [`RuntimeTarget`] - The introspection surface the locator and resolver consume
//! - [`RuntimeSession`] - Scoped exclusive access with cache flush on open
//! - [`InMemoryTarget`] - Synthetic target over plain buffers, for tests and adapters
//! - [`NativeCode`] - Address, length and optional IL-to-native offset map
//! - [`Tiering`] - Result of comparing two resolutions of the same method

mod locator;
mod symbols;
mod target;

pub use locator::{compare_tiers, resolve, NativeCode, OffsetPair, Tiering};
pub use symbols::{resolve_symbol, ResolvedSymbol, SymbolCache};
pub use target::{
    InMemoryTarget, MethodIdentity, ResolvedMethod, RuntimeSession, RuntimeTarget,
};
