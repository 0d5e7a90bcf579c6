//! # Common Types

/// A byte offset into the working corpus.
///
/// Corpus length is bounded by `u32` at construction, so positions never
/// need more than 32 bits even for multi-gigabyte training runs.
pub type Pos = u32;

/// A vocabulary token id.
///
/// Ids are dense and contiguous from 0: the 127 base bytes first, then one
/// id per accepted merge, in merge order.
pub type TokenId = u32;

/// An interned symbol handle; see [`crate::SymbolTable`].
///
/// The 256 single-byte symbols intern to their byte value; merged symbols
/// are assigned monotonically on first sighting. Pair maps key on two of
/// these instead of re-hashing symbol bytes on every probe.
pub type Sym = u32;

/// An ordered pair of adjacent symbols.
pub type Pair = (Sym, Sym);

/// The word-boundary marker byte.
///
/// Never part of any merged symbol; pairs touching it are never indexed.
pub const BOUNDARY: u8 = b'#';

/// The [`BOUNDARY`] byte as an interned symbol.
pub const BOUNDARY_SYM: Sym = BOUNDARY as Sym;

/// Type Alias for hash maps in this crate.
pub type CommonHashMap<K, V> = ahash::AHashMap<K, V>;

/// Type Alias for hash sets in this crate.
pub type CommonHashSet<V> = ahash::AHashSet<V>;
