#![warn(missing_docs, unused)]
//! # `wordseam` Boundary-Aware BPE Trainer
//!
//! `wordseam` trains byte-pair-encoding vocabularies over large text
//! corpora, and segments text with the trained vocabulary.
//!
//! The corpus normaliser collapses every punctuation/whitespace run to a
//! `"# "` boundary, so no learned symbol ever straddles a natural word
//! boundary; the retained space becomes a trainable prefix for the next
//! word. Training then works position-wise over the whole corpus:
//!
//! * [`SegTable`] records, per corpus position, the length of the symbol
//!   starting there — the authoritative segmentation state.
//! * [`PairIndex`] maps each adjacent symbol pair to its (possibly stale)
//!   occurrence positions, plus a believed-live count.
//! * The [`Trainer`] pops the most frequent pair from a lazily-validated
//!   max-heap, rewrites every live occurrence, and grows the [`Vocab`]
//!   one merge at a time.
//!
//! The [`Encoder`] is the same merge engine run against a frozen
//! vocabulary: merges are replayed smallest-id-first, which reproduces the
//! training segmentation.
//!
//! ## Training Example
//!
//! ```rust
//! use wordseam::{CorpusBuilder, Encoder, TrainerOptions};
//!
//! let corpus = CorpusBuilder::from_chunks([" ab ab ab ab "])
//!     .build()
//!     .unwrap();
//!
//! let vocab = TrainerOptions::new(130)
//!     .with_min_freq(2)
//!     .init(corpus)
//!     .train();
//!
//! let encoder = Encoder::new(vocab);
//! let ids = encoder.encode(" ab").unwrap();
//! assert_eq!(ids.len(), 1);
//! ```
//!
//! ## Vocabulary Files
//!
//! Vocabularies serialise as a human-readable symbol-to-id map, sorted by
//! descending id for diffability; see [`vocab_io`].

pub mod vocab_io;

mod encoder;
mod errors;
mod normalize;
mod pair_index;
mod seg_table;
mod symbols;
mod trainer;
mod types;
mod vocab;

#[doc(inline)]
pub use encoder::Encoder;
#[doc(inline)]
pub use errors::*;
#[doc(inline)]
pub use normalize::{Corpus, CorpusBuilder};
#[doc(inline)]
pub use pair_index::PairIndex;
#[doc(inline)]
pub use seg_table::SegTable;
#[doc(inline)]
pub use symbols::SymbolTable;
#[doc(inline)]
pub use trainer::{Trainer, TrainerOptions};
#[doc(inline)]
pub use types::*;
#[doc(inline)]
pub use vocab::Vocab;
