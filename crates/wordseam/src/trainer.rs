//! # Vocab Trainer
//!
//! Trains a BPE vocabulary by repeatedly merging the most frequent
//! adjacent symbol pair across the whole corpus. The frequency queue is
//! allowed to lag reality: popped entries are validated against the pair
//! index's believed-live counts, and stale position lists are compacted
//! only when their live/stored ratio drops below the configured threshold,
//! which amortises reconciliation across merges.

use core::cmp::Ordering;

use dary_heap::OctonaryHeap;

use crate::normalize::Corpus;
use crate::pair_index::{PairIndex, retain_non_overlapping};
use crate::seg_table::SegTable;
use crate::symbols::SymbolTable;
use crate::types::{BOUNDARY, BOUNDARY_SYM, CommonHashMap, Pair, Pos, Sym};
use crate::vocab::Vocab;

/// Options for [`Trainer`].
#[derive(Debug, Clone)]
pub struct TrainerOptions {
    /// Stop once the vocabulary reaches this size.
    pub vocab_size: usize,

    /// Skip pairs with fewer live occurrences than this.
    pub min_freq: u32,

    /// Compact a pair's position list when its live/stored ratio falls
    /// below this value.
    pub compress_threshold: f64,

    /// Count single characters adjacent to the boundary marker during
    /// seeding; `false` restricts seeding to interior pairs only.
    pub single_char: bool,

    /// Emit per-epoch progress diagnostics.
    pub verbose: bool,
}

impl TrainerOptions {
    /// Create options with the default knobs.
    ///
    /// ## Arguments
    /// * `vocab_size` - the target vocabulary size.
    pub fn new(vocab_size: usize) -> Self {
        Self {
            vocab_size,
            min_freq: 1,
            compress_threshold: 0.3,
            single_char: true,
            verbose: false,
        }
    }

    /// Sets the minimum live pair frequency.
    pub fn with_min_freq(self, min_freq: u32) -> Self {
        Self { min_freq, ..self }
    }

    /// Sets the compaction trigger ratio.
    pub fn with_compress_threshold(self, compress_threshold: f64) -> Self {
        Self {
            compress_threshold,
            ..self
        }
    }

    /// Sets the boundary-adjacent single-character seeding rule.
    pub fn with_single_char(self, single_char: bool) -> Self {
        Self {
            single_char,
            ..self
        }
    }

    /// Sets progress diagnostics.
    pub fn with_verbose(self, verbose: bool) -> Self {
        Self { verbose, ..self }
    }

    /// Initializes a [`Trainer`] over `corpus` from these options.
    pub fn init(self, corpus: Corpus) -> Trainer {
        Trainer::new(self, corpus)
    }
}

/// Info about a [`Pair`] that could be merged.
///
/// Max-heap by count; frequency ties break toward the larger pair
/// (deterministic, and byte order for single-byte symbols).
#[derive(Debug, Eq)]
struct MergeJob {
    /// The cached occurrence count of this pair.
    count: u32,

    /// The pair to merge.
    pair: Pair,
}

impl MergeJob {
    fn heap_key(&self) -> (u32, Pair) {
        (self.count, self.pair)
    }
}

impl PartialEq for MergeJob {
    fn eq(&self, other: &Self) -> bool {
        self.heap_key() == other.heap_key()
    }
}

impl PartialOrd for MergeJob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MergeJob {
    fn cmp(&self, other: &Self) -> Ordering {
        self.heap_key().cmp(&other.heap_key())
    }
}

/// Incremental BPE trainer.
///
/// Owns the whole training state: the immutable corpus, the segmentation
/// table, the pair index, the frequency queue, the interner, and the
/// growing vocabulary. See [`TrainerOptions::init`].
pub struct Trainer {
    options: TrainerOptions,
    corpus: Corpus,
    seg: SegTable,
    pairs: PairIndex,
    queue: OctonaryHeap<MergeJob>,
    symbols: SymbolTable,
    vocab: Vocab,
    word_count: CommonHashMap<Sym, i64>,
    epoch: usize,
}

impl Trainer {
    /// Initializes a [`Trainer`]: walks the corpus once to seed the pair
    /// index, the frequency queue, and the word counts.
    pub fn new(options: TrainerOptions, corpus: Corpus) -> Self {
        let bytes = corpus.as_bytes();
        let mut raw: CommonHashMap<Pair, Vec<Pos>> = CommonHashMap::default();
        let mut word_count: CommonHashMap<Sym, i64> = CommonHashMap::default();

        let upper = bytes.len().saturating_sub(1);
        if options.single_char {
            for i in 0..upper {
                let (x, y) = (bytes[i], bytes[i + 1]);
                if x == BOUNDARY {
                    continue;
                }
                // Boundary-adjacent bytes still count here, giving them
                // extra weight relative to the pairs-only rule.
                *word_count.entry(x as Sym).or_insert(0) += 1;
                if y == BOUNDARY {
                    continue;
                }
                raw.entry((x as Sym, y as Sym)).or_default().push(i as Pos);
            }
        } else {
            for i in 0..upper {
                let (x, y) = (bytes[i], bytes[i + 1]);
                if x == BOUNDARY || y == BOUNDARY {
                    continue;
                }
                raw.entry((x as Sym, y as Sym)).or_default().push(i as Pos);
            }
        }

        let seeded = raw.len();
        let mut pairs = PairIndex::new();
        let mut queue = OctonaryHeap::with_capacity(seeded);
        for (pair, positions) in raw {
            let count = positions.len() as u32;
            if count >= options.min_freq {
                pairs.extend(pair, positions);
                queue.push(MergeJob { count, pair });
            }
        }

        log::info!(
            "seeded {} of {} pairs over {} corpus bytes",
            pairs.len(),
            seeded,
            bytes.len(),
        );

        let seg = SegTable::new(corpus.len());
        Trainer {
            options,
            corpus,
            seg,
            pairs,
            queue,
            symbols: SymbolTable::new(),
            vocab: Vocab::base(),
            word_count,
            epoch: 0,
        }
    }

    /// Run the merge loop to completion and return the vocabulary.
    ///
    /// Stops when the vocabulary reaches the target size, or when no pair
    /// with frequency >= `min_freq` remains — the latter returns a
    /// smaller-than-requested vocabulary, which is success, not an error.
    pub fn train(mut self) -> Vocab {
        while self.vocab.len() < self.options.vocab_size {
            if !self.step() {
                break;
            }
        }
        log::info!(
            "final vocab size: {} in {} merges",
            self.vocab.len(),
            self.epoch,
        );
        self.vocab
    }

    /// Apply the single best merge; `false` when the queue has starved.
    fn step(&mut self) -> bool {
        let Some((pair, freq)) = self.pop_best() else {
            return false;
        };
        if freq < self.options.min_freq {
            return false;
        }
        if self.options.verbose && (freq > 100_000 || self.epoch % 50 == 0) {
            log::info!(
                "epoch: {}\tcomb: {} + {}\tfreq: {}",
                self.epoch,
                String::from_utf8_lossy(self.symbols.bytes(pair.0)),
                String::from_utf8_lossy(self.symbols.bytes(pair.1)),
                freq,
            );
        }
        self.merge_pair(pair, freq);
        self.epoch += 1;
        true
    }

    /// Pop until a valid entry surfaces: one whose cached count matches
    /// the believed-live count.
    ///
    /// Stale entries still above `min_freq` are re-pushed with their
    /// ground count, compacting first when the live/stored ratio has
    /// dropped below the threshold; stale entries at or below `min_freq`
    /// are erased from the index outright.
    fn pop_best(&mut self) -> Option<(Pair, u32)> {
        while let Some(job) = self.queue.pop() {
            let ground = self.pairs.live_count(job.pair);
            if job.count == ground {
                return Some((job.pair, job.count));
            }
            if ground > self.options.min_freq {
                if self.pairs.ratio(job.pair) < self.options.compress_threshold {
                    let la = self.symbols.len_of(job.pair.0);
                    let lb = self.symbols.len_of(job.pair.1);
                    self.pairs.compact(job.pair, la, lb, &self.seg);
                }
                self.queue.push(MergeJob {
                    count: ground,
                    pair: job.pair,
                });
            } else {
                self.pairs.remove(job.pair);
            }
        }
        None
    }

    /// Materialise one merge: rewrite every live occurrence of `pair`
    /// into the combined symbol, reconstructing neighbour pairs as it
    /// goes, then commit the new pairs and the new vocabulary entry.
    fn merge_pair(&mut self, pair: Pair, freq: u32) {
        let (a, b) = pair;
        let la = self.symbols.len_of(a);
        let lb = self.symbols.len_of(b);
        let lc = la + lb;
        if lc > u8::MAX as u32 {
            // The combined symbol would not fit a segmentation cell.
            log::debug!("discarding over-long merge ({la} + {lb} bytes)");
            self.pairs.remove(pair);
            return;
        }

        let c_bytes = self.symbols.concat(a, b);
        let c = self.symbols.intern(&c_bytes);

        let Some(mut positions) = self.pairs.remove(pair) else {
            return;
        };
        positions.sort_unstable();
        if positions.len() as u32 > freq {
            // Stale stragglers would confuse the overlap analysis.
            let seg = &self.seg;
            positions.retain(|&i| {
                seg.start_len(i) == la as u8 && seg.start_len(i + la) == lb as u8
            });
        }
        if a == b {
            retain_non_overlapping(&mut positions, la);
        }

        let consumed = positions.len() as i64;
        *self.word_count.entry(a).or_insert(0) -= consumed;
        *self.word_count.entry(b).or_insert(0) -= consumed;

        // Neighbour observations accumulate here; the segmentation table
        // is rewritten position by position, strictly left to right, so
        // later iterations see every earlier merge of this same pass.
        let mut new_pairs: CommonHashMap<Pair, Vec<Pos>> = CommonHashMap::default();
        let corpus = self.corpus.as_bytes();

        for &i in &positions {
            if self.seg.start_len(i) != la as u8 || self.seg.start_len(i + la) != lb as u8 {
                continue;
            }

            let pre_start = self.seg.symbol_start_before(i);
            let nxt_start = i + lc;
            let nxt_end = self.seg.symbol_end_at(nxt_start);
            let pre_sym = self
                .symbols
                .intern(&corpus[pre_start as usize..i as usize]);
            let nxt_sym = self
                .symbols
                .intern(&corpus[nxt_start as usize..nxt_end as usize]);

            if pre_sym != BOUNDARY_SYM {
                self.pairs.decrement((pre_sym, a));
                let three_way = pre_sym == b && {
                    let before_start = self.seg.symbol_start_before(pre_start);
                    let before = &corpus[before_start as usize..pre_start as usize];
                    self.symbols.intern(before) == a
                };
                if three_way {
                    // "a b a b" with the left occurrence unmerged: the
                    // neighbour pair is really (c, c) one step left.
                    new_pairs.entry((c, c)).or_default().push(pre_start - la);
                } else {
                    new_pairs.entry((pre_sym, c)).or_default().push(pre_start);
                }
            }

            if nxt_sym != BOUNDARY_SYM {
                let chains_forward = nxt_sym == a && {
                    let succ_end = self.seg.symbol_end_at(nxt_end);
                    let succ = &corpus[nxt_end as usize..succ_end as usize];
                    self.symbols.intern(succ) == b
                };
                // A forward chain would double-count against the next
                // merge step's own self-overlap handling.
                if !chains_forward {
                    self.pairs.decrement((b, nxt_sym));
                    new_pairs.entry((c, nxt_sym)).or_default().push(i);
                }
            }

            self.seg.mark_merge(i, la, lb, lc);
        }

        for (q, v) in new_pairs {
            if v.len() as u32 >= self.options.min_freq {
                self.pairs.extend(q, v);
                self.queue.push(MergeJob {
                    count: self.pairs.live_count(q),
                    pair: q,
                });
            }
        }

        self.vocab.insert(c_bytes);
        self.word_count.insert(c, freq as i64);
    }

    /// The interner backing this trainer's pair keys.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Per-symbol occurrence counts, maintained across merges.
    pub fn word_counts(&self) -> &CommonHashMap<Sym, i64> {
        &self.word_count
    }
}
