//! # Encoder
//!
//! The training algorithm run against a frozen vocabulary. Instead of
//! frequencies, the heap is keyed by vocabulary id — lower id means the
//! merge was learned earlier, therefore higher priority — so merges replay
//! in the order the trainer created them and reproduce the training
//! segmentation.

use core::cmp::Reverse;
use std::collections::BinaryHeap;

use rayon::prelude::*;

use crate::errors::{WordseamError, WsResult};
use crate::normalize::wrap_text;
use crate::pair_index::{PairIndex, retain_non_overlapping};
use crate::seg_table::SegTable;
use crate::symbols::SymbolTable;
use crate::types::{CommonHashMap, Pair, Pos, Sym, TokenId};
use crate::vocab::Vocab;

/// Segments text against a trained [`Vocab`].
#[derive(Debug, Clone)]
pub struct Encoder {
    vocab: Vocab,
}

impl Encoder {
    /// Create an encoder over a trained or loaded vocabulary.
    pub fn new(vocab: Vocab) -> Self {
        Self { vocab }
    }

    /// The vocabulary this encoder segments with.
    pub fn vocab(&self) -> &Vocab {
        &self.vocab
    }

    /// Encode `text` into token ids.
    ///
    /// The text is boundary-wrapped and run-collapsed exactly like the
    /// training corpus, merged smallest-id-first until no recognised pair
    /// remains, then emitted symbol by symbol (the sentinels excluded).
    ///
    /// ## Returns
    /// The id sequence, or [`WordseamError::SymbolNotInVocab`] when a
    /// final segment has no vocabulary entry.
    pub fn encode(&self, text: &str) -> WsResult<Vec<TokenId>> {
        let corpus = wrap_text(text);
        if corpus.len() > u32::MAX as usize {
            return Err(WordseamError::CorpusTooLarge { len: corpus.len() });
        }
        let len = corpus.len();

        let mut symbols = SymbolTable::new();
        let mut seg = SegTable::new(len);
        let mut index = PairIndex::new();
        let mut queue: BinaryHeap<Reverse<(TokenId, Pair)>> = BinaryHeap::new();

        // Seed single-byte pairs; only vocabulary-recognised
        // concatenations enter the index, which excludes every
        // boundary-adjacent pair for free.
        let mut raw: CommonHashMap<Pair, Vec<Pos>> = CommonHashMap::default();
        for i in 0..len - 1 {
            let pair = (corpus[i] as Sym, corpus[i + 1] as Sym);
            raw.entry(pair).or_default().push(i as Pos);
        }
        for (pair, positions) in raw {
            if let Some(id) = self.vocab.get(&[pair.0 as u8, pair.1 as u8]) {
                index.extend(pair, positions);
                queue.push(Reverse((id, pair)));
            }
        }

        while let Some(Reverse((_, pair))) = queue.pop() {
            let Some(mut positions) = index.remove(pair) else {
                // Re-recorded pair already consumed by an earlier pop.
                continue;
            };
            self.merge(
                pair,
                &mut positions,
                &corpus,
                &mut symbols,
                &mut seg,
                &mut index,
                &mut queue,
            );
        }

        // Walk the final segmentation, skipping both sentinels.
        let mut out = Vec::new();
        let mut i = 1usize;
        while i < len - 1 {
            let step = seg.start_len(i as Pos) as usize;
            let symbol = &corpus[i..i + step];
            let id = self
                .vocab
                .get(symbol)
                .ok_or_else(|| WordseamError::SymbolNotInVocab {
                    symbol: symbol.to_vec(),
                })?;
            out.push(id);
            i += step;
        }
        Ok(out)
    }

    /// Apply one merge at every live position of `pair`.
    #[allow(clippy::too_many_arguments)]
    fn merge(
        &self,
        pair: Pair,
        positions: &mut Vec<Pos>,
        corpus: &[u8],
        symbols: &mut SymbolTable,
        seg: &mut SegTable,
        index: &mut PairIndex,
        queue: &mut BinaryHeap<Reverse<(TokenId, Pair)>>,
    ) {
        let (a, b) = pair;
        let la = symbols.len_of(a);
        let lb = symbols.len_of(b);
        let lc = la + lb;
        if lc > u8::MAX as u32 {
            return;
        }
        let c = symbols.intern(&symbols.concat(a, b));

        positions.sort_unstable();
        if a == b {
            retain_non_overlapping(positions, la);
        }

        let mut new_pairs: CommonHashMap<Pair, (TokenId, Vec<Pos>)> = CommonHashMap::default();
        for &i in positions.iter() {
            if seg.start_len(i) != la as u8 || seg.start_len(i + la) != lb as u8 {
                continue;
            }

            let pre_start = seg.symbol_start_before(i);
            let nxt_start = i + lc;
            let nxt_end = seg.symbol_end_at(nxt_start);
            let pre = &corpus[pre_start as usize..i as usize];
            let nxt = &corpus[nxt_start as usize..nxt_end as usize];

            let mut joined = Vec::with_capacity(pre.len() + lc as usize);
            joined.extend_from_slice(pre);
            joined.extend_from_slice(symbols.bytes(c));
            if let Some(id) = self.vocab.get(&joined) {
                let pre_sym = symbols.intern(pre);
                new_pairs
                    .entry((pre_sym, c))
                    .or_insert_with(|| (id, Vec::new()))
                    .1
                    .push(pre_start);
            }

            let mut joined = Vec::with_capacity(lc as usize + nxt.len());
            joined.extend_from_slice(symbols.bytes(c));
            joined.extend_from_slice(nxt);
            if let Some(id) = self.vocab.get(&joined) {
                let nxt_sym = symbols.intern(nxt);
                new_pairs
                    .entry((c, nxt_sym))
                    .or_insert_with(|| (id, Vec::new()))
                    .1
                    .push(i);
            }

            seg.mark_merge(i, la, lb, lc);
        }

        for (q, (id, v)) in new_pairs {
            index.extend(q, v);
            queue.push(Reverse((id, q)));
        }
    }

    /// Encode a batch of texts, in parallel for its own sake: each text
    /// is an independent encoder run.
    pub fn encode_batch<S>(&self, texts: &[S]) -> WsResult<Vec<Vec<TokenId>>>
    where
        S: AsRef<str> + Sync,
    {
        texts
            .par_iter()
            .map(|text| self.encode(text.as_ref()))
            .collect()
    }

    /// Decode ids back into bytes by concatenating their symbols.
    ///
    /// ## Returns
    /// The byte string, or [`WordseamError::UnknownTokenId`] naming the
    /// first id with no vocabulary entry.
    pub fn decode(&self, ids: &[TokenId]) -> WsResult<Vec<u8>> {
        let mut out = Vec::new();
        for &id in ids {
            let symbol = self
                .vocab
                .symbol(id)
                .ok_or(WordseamError::UnknownTokenId { id })?;
            out.extend_from_slice(symbol);
        }
        Ok(out)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_vocab(extra: &[&str]) -> Vocab {
        let mut vocab = Vocab::base();
        for symbol in extra {
            vocab.insert(symbol.as_bytes().to_vec());
        }
        vocab
    }

    #[test]
    fn test_empty_text() {
        let encoder = Encoder::new(toy_vocab(&[]));
        assert_eq!(encoder.encode("").unwrap(), Vec::<TokenId>::new());
    }

    #[test]
    fn test_whitespace_only_text() {
        let encoder = Encoder::new(toy_vocab(&[]));
        assert_eq!(encoder.encode(" ").unwrap(), vec![b' ' as TokenId]);
        assert_eq!(encoder.encode(" \t \n ").unwrap(), vec![b' ' as TokenId]);
    }

    #[test]
    fn test_single_bytes_without_merges() {
        let encoder = Encoder::new(toy_vocab(&[]));
        assert_eq!(
            encoder.encode("ab").unwrap(),
            vec![b'a' as TokenId, b'b' as TokenId],
        );
    }

    #[test]
    fn test_self_overlap_encoding() {
        // vocab {a -> 97, aa -> 127}: "aaaa" must become [127, 127].
        let encoder = Encoder::new(toy_vocab(&["aa"]));
        assert_eq!(encoder.encode("aaaa").unwrap(), vec![127, 127]);
        assert_eq!(
            encoder.encode("aaa").unwrap(),
            vec![b'a' as TokenId, 127],
        );
    }

    #[test]
    fn test_lowest_id_merges_first() {
        // "ab" learned before "bc": in "abc" the (a,b) merge wins and
        // leaves a bare c.
        let encoder = Encoder::new(toy_vocab(&["ab", "bc"]));
        assert_eq!(
            encoder.encode("abc").unwrap(),
            vec![127, b'c' as TokenId],
        );
    }

    #[test]
    fn test_merge_chain_to_word() {
        let encoder = Encoder::new(toy_vocab(&["bc", "abc"]));
        assert_eq!(encoder.encode("abc").unwrap(), vec![128]);
    }

    #[test]
    fn test_boundaries_are_hard() {
        // Tokens never span the collapsed boundary.
        let encoder = Encoder::new(toy_vocab(&["ab"]));
        let ids = encoder.encode("ab ab").unwrap();
        assert_eq!(
            ids,
            vec![
                127,
                b'#' as TokenId,
                b' ' as TokenId,
                127,
            ],
        );
    }

    #[test]
    fn test_decode_round_trip_is_normalised() {
        let encoder = Encoder::new(toy_vocab(&["ab"]));
        let ids = encoder.encode("ab.ab").unwrap();
        assert_eq!(encoder.decode(&ids).unwrap(), b"ab# ab");
    }

    #[test]
    fn test_decode_unknown_id_names_it() {
        let encoder = Encoder::new(toy_vocab(&[]));
        let err = encoder.decode(&[1000]).unwrap_err();
        assert!(matches!(err, WordseamError::UnknownTokenId { id: 1000 }));
        assert!(err.to_string().contains("1000"));
    }

    #[test]
    fn test_unknown_symbol_errors() {
        // 0x80.. bytes have no base vocabulary entry.
        let encoder = Encoder::new(toy_vocab(&[]));
        assert!(matches!(
            encoder.encode("é"),
            Err(WordseamError::SymbolNotInVocab { .. }),
        ));
    }

    #[test]
    fn test_encode_is_deterministic() {
        let encoder = Encoder::new(toy_vocab(&["ab", " a", " ab"]));
        let first = encoder.encode("the ab abab").unwrap();
        for _ in 0..4 {
            assert_eq!(encoder.encode("the ab abab").unwrap(), first);
        }
    }

    #[test]
    fn test_encode_batch_matches_encode() {
        let encoder = Encoder::new(toy_vocab(&["ab"]));
        let texts = ["ab", "ab ab", ""];
        let batch = encoder.encode_batch(&texts).unwrap();
        for (text, ids) in texts.iter().zip(&batch) {
            assert_eq!(ids, &encoder.encode(text).unwrap());
        }
    }
}
