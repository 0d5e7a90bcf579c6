//! # Corpus Normaliser
//!
//! Transforms raw input text into the working corpus: every run of
//! punctuation/whitespace collapses to `"# "`, so the boundary marker
//! separates natural words while the retained space stays trainable as a
//! word prefix. The corpus is prefixed and suffixed with `#`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{WordseamError, WsResult};
use crate::types::{BOUNDARY, CommonHashSet};

/// The characters collapsed into a word boundary: ASCII punctuation,
/// space, tab, newline, and the fullwidth punctuation set.
static BOUNDARY_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"[ \t\n.,?!;:()"'<>\[\]~"#,
        "　。，？！；：、（）「」“”‘’《》【】…—～",
        "]+",
    ))
    .expect("boundary pattern compilation failed")
});

/// Collapse every boundary run in `text` to `"# "`.
fn collapse_runs(text: &str) -> String {
    BOUNDARY_RUN.replace_all(text, "# ").into_owned()
}

/// The immutable working corpus.
///
/// Built once by [`CorpusBuilder`], never mutated afterwards. The first and
/// last bytes are always the `#` boundary marker, and the length fits the
/// `u32` position space.
#[derive(Debug, Clone)]
pub struct Corpus {
    bytes: Vec<u8>,
}

impl Corpus {
    /// View the corpus bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The corpus length in bytes.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }
}

/// Accumulates text chunks into a [`Corpus`].
///
/// Chunks are concatenated with a single `\n` between them, plus a leading
/// and trailing `\n`, before the boundary collapse runs over the joined
/// text. Duplicate full lines are counted and reported, but never removed.
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    text: String,
}

impl CorpusBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder pre-loaded from an iterator of chunks.
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut builder = Self::new();
        for chunk in chunks {
            builder.push_chunk(chunk.as_ref());
        }
        builder
    }

    /// Append one text chunk (e.g. one file's contents).
    pub fn push_chunk(&mut self, chunk: &str) {
        self.text.push('\n');
        self.text.push_str(chunk);
    }

    /// Normalise the accumulated text into the working [`Corpus`].
    ///
    /// ## Returns
    /// The corpus, or [`WordseamError::CorpusTooLarge`] when its length
    /// leaves the `u32` position space.
    pub fn build(mut self) -> WsResult<Corpus> {
        self.text.push('\n');
        self.report_duplicate_lines();

        let mut bytes = collapse_runs(&self.text).into_bytes();
        bytes.push(BOUNDARY);

        if bytes.len() > u32::MAX as usize {
            return Err(WordseamError::CorpusTooLarge { len: bytes.len() });
        }

        debug_assert_eq!(bytes.first(), Some(&BOUNDARY));
        debug_assert_eq!(bytes.last(), Some(&BOUNDARY));

        log::info!("normalised corpus: {} bytes", bytes.len());
        Ok(Corpus { bytes })
    }

    /// Count unique input lines and report the duplicate ratio.
    ///
    /// The count is informational only; the corpus keeps every line.
    fn report_duplicate_lines(&self) {
        let mut total = 0usize;
        let mut unique: CommonHashSet<&str> = CommonHashSet::default();
        for line in self.text.split('\n') {
            total += 1;
            unique.insert(line);
        }
        log::debug!(
            "lines: {} unique: {} ratio: {:.3}",
            total,
            unique.len(),
            unique.len() as f64 / total as f64,
        );
    }
}

/// Wrap `text` for encoding: collapse boundary runs, then sentinel both
/// ends with `#`.
///
/// The leading sentinel is skipped when the collapsed text already starts
/// with one (leading whitespace becomes `"# "`, matching the training
/// corpus); the trailing sentinel is always appended.
pub(crate) fn wrap_text(text: &str) -> Vec<u8> {
    let collapsed = collapse_runs(text);

    let mut bytes = Vec::with_capacity(collapsed.len() + 2);
    if !collapsed.as_bytes().first().is_some_and(|&b| b == BOUNDARY) {
        bytes.push(BOUNDARY);
    }
    bytes.extend_from_slice(collapsed.as_bytes());
    bytes.push(BOUNDARY);
    bytes
}
