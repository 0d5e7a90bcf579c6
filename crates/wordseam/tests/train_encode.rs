//! End-to-end train/encode/decode scenarios.

use wordseam::{
    CorpusBuilder, Encoder, TokenId, TrainerOptions, Vocab, WordseamError, vocab_io,
};

fn train(text: &str, vocab_size: usize, min_freq: u32) -> Vocab {
    let corpus = CorpusBuilder::from_chunks([text]).build().unwrap();
    TrainerOptions::new(vocab_size)
        .with_min_freq(min_freq)
        .init(corpus)
        .train()
}

#[test]
fn scenario_space_ab() {
    // " ab ab ab ab ": (a,b) -> 127 first, then (" ", "ab") -> 128.
    let vocab = train(" ab ab ab ab ", 130, 2);
    assert_eq!(vocab.get(b"ab"), Some(127));
    assert_eq!(vocab.get(b" ab"), Some(128));

    let encoder = Encoder::new(vocab);
    assert_eq!(encoder.encode(" ab").unwrap(), vec![128]);
}

#[test]
fn scenario_self_overlap() {
    // "xxxx": (x,x) -> 127; (xx,xx) sits at frequency 1 and is rejected.
    let vocab = train("xxxx", 129, 2);
    assert_eq!(vocab.get(b"xx"), Some(127));
    assert_eq!(vocab.get(b"xxxx"), None);

    let encoder = Encoder::new(vocab);
    assert_eq!(encoder.encode("xxxx").unwrap(), vec![127, 127]);
}

#[test]
fn scenario_abc_convergence() {
    // "abcabcabc" converges on a two-merge spelling of "abc".
    let vocab = train("abcabcabc", 130, 1);
    let spelled_ab = vocab.get(b"ab") == Some(127) && vocab.get(b"abc") == Some(128);
    let spelled_bc = vocab.get(b"bc") == Some(127) && vocab.get(b"abc") == Some(128);
    assert!(spelled_ab || spelled_bc);

    let encoder = Encoder::new(vocab);
    assert_eq!(encoder.encode("abc").unwrap(), vec![128]);
}

#[test]
fn scenario_decode_unknown_id() {
    let encoder = Encoder::new(train("ab ab", 130, 1));
    let err = encoder.decode(&[9999]).unwrap_err();
    assert!(matches!(err, WordseamError::UnknownTokenId { id: 9999 }));
    assert!(err.to_string().contains("9999"));
}

#[test]
fn scenario_min_freq_starvation() {
    // min_freq above every pair frequency: the base vocabulary unchanged.
    let vocab = train("some short text", 500, 1000);
    assert_eq!(vocab.len(), 127);
    for id in 0..127u8 {
        assert_eq!(vocab.symbol(id as TokenId), Some(&[id][..]));
    }
}

#[test]
fn scenario_english_text_merges() {
    // Reduced-scale stand-in for a real English corpus: the space-t,
    // space-th, th-e merges must all surface early.
    let text = "the quick brown fox jumps over the lazy dog and then the \
                thin thrush thanked the other one "
        .repeat(40);
    let vocab = train(&text, 200, 2);
    assert!(vocab.get(b"th").is_some());
    assert!(vocab.get(b"the").is_some());
    assert!(vocab.get(b" the").is_some());
}

#[test]
fn round_trip_is_normalised() {
    // R1: decode . encode collapses whitespace/punctuation to "# ".
    let encoder = Encoder::new(train("the cat sat on the mat", 180, 1));
    let cases = [
        ("the cat", &b"the# cat"[..]),
        ("the... cat!", b"the# cat# "),
        // The leading run folds into the unemitted sentinel.
        ("  the cat  ", b" the# cat# "),
    ];
    for (text, expected) in cases {
        let ids = encoder.encode(text).unwrap();
        assert_eq!(encoder.decode(&ids).unwrap(), expected, "text: {text:?}");
    }
}

#[test]
fn encode_is_deterministic() {
    // R2: repeated runs yield identical id sequences.
    let encoder = Encoder::new(train("abab baba abab baba", 140, 1));
    let first = encoder.encode("abab baba").unwrap();
    for _ in 0..5 {
        assert_eq!(encoder.encode("abab baba").unwrap(), first);
    }
}

#[test]
fn boundaries_are_hard() {
    // R3: tokens left of a boundary are independent of what follows it.
    let encoder = Encoder::new(train("the cat sat on the mat the dog", 200, 1));

    let cat = encoder.encode("the cat").unwrap();
    let dog = encoder.encode("the dog").unwrap();

    let boundary = b'#' as TokenId;
    let cut = cat.iter().position(|&id| id == boundary).unwrap();
    assert_eq!(dog.iter().position(|&id| id == boundary), Some(cut));
    assert_eq!(cat[..=cut], dog[..=cut]);
}

#[test]
fn empty_and_whitespace_texts() {
    // B1 / B2.
    let encoder = Encoder::new(train("ab ab", 130, 1));
    assert_eq!(encoder.encode("").unwrap(), Vec::<TokenId>::new());
    assert_eq!(encoder.encode("   ").unwrap(), vec![b' ' as TokenId]);
}

#[test]
fn compaction_threshold_does_not_change_results() {
    // Compaction is a space/time trade-off; the trained vocabulary must
    // not depend on when it fires.
    let text = "the quick brown fox jumps over the lazy dog ".repeat(20);
    let mut vocabs = Vec::new();
    for threshold in [0.0, 0.3, 0.5, 1.0] {
        let corpus = CorpusBuilder::from_chunks([text.as_str()]).build().unwrap();
        let vocab = TrainerOptions::new(250)
            .with_compress_threshold(threshold)
            .init(corpus)
            .train();
        vocabs.push(vocab);
    }
    for vocab in &vocabs[1..] {
        assert_eq!(vocab.len(), vocabs[0].len());
        for (symbol, id) in vocabs[0].iter() {
            assert_eq!(vocab.get(symbol), Some(id));
        }
    }
}

#[test]
fn saved_vocab_encodes_identically() {
    let vocab = train("the cat sat on the mat", 170, 1);

    let mut buf = Vec::new();
    vocab_io::save_vocab_writer(&vocab, &mut buf).unwrap();
    let reloaded = vocab_io::load_vocab_reader(buf.as_slice()).unwrap();

    let before = Encoder::new(vocab);
    let after = Encoder::new(reloaded);
    for text in ["the cat", "a mat on the cat", "sat sat sat"] {
        assert_eq!(
            before.encode(text).unwrap(),
            after.encode(text).unwrap(),
            "text: {text:?}",
        );
    }
}

#[test]
fn multi_chunk_corpus_trains() {
    let corpus = CorpusBuilder::from_chunks(["the cat", "the dog", "the cat"])
        .build()
        .unwrap();
    let vocab = TrainerOptions::new(160).with_min_freq(2).init(corpus).train();
    assert!(vocab.len() > 127);
    assert!(vocab.get(b"th").is_some() || vocab.get(b" t").is_some() || vocab.get(b"he").is_some());
}
