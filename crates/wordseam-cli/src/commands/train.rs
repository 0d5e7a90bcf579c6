use std::fs;

use wordseam::{CorpusBuilder, TrainerOptions, vocab_io};

use crate::logging::LogArgs;

/// Args for the train command.
#[derive(clap::Args, Debug)]
pub struct TrainArgs {
    /// Input text files.
    files: Vec<String>,

    #[clap(flatten)]
    pub logging: LogArgs,

    /// Max vocab size.
    #[arg(long, default_value = "50000")]
    vocab_size: usize,

    /// Skip pairs with fewer live occurrences.
    #[arg(long, default_value = "1")]
    min_freq: u32,

    /// Compact a pair's position list below this live/stored ratio.
    #[arg(long, default_value = "0.3")]
    compress_threshold: f64,

    /// Seed interior pairs only, skipping boundary-adjacent character
    /// counts.
    #[arg(long)]
    pairs_only: bool,

    /// Output vocabulary path.
    #[arg(short, long, default_value = "vocab.json")]
    output: String,
}

impl TrainArgs {
    /// Run the train command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(2)?;

        let mut builder = CorpusBuilder::new();
        log::info!("Reading shards:");
        for (idx, path) in self.files.iter().enumerate() {
            log::info!("{idx}: {path}");
            builder.push_chunk(&fs::read_to_string(path)?);
        }
        let corpus = builder.build()?;

        log::info!("Training vocabulary...");
        let vocab = TrainerOptions::new(self.vocab_size)
            .with_min_freq(self.min_freq)
            .with_compress_threshold(self.compress_threshold)
            .with_single_char(!self.pairs_only)
            .with_verbose(true)
            .init(corpus)
            .train();

        log::info!("Vocabulary size: {}", vocab.len());
        log::info!("output: {}", self.output);
        vocab_io::save_vocab_path(&vocab, &self.output)?;

        Ok(())
    }
}
