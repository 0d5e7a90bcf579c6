use std::io::Write;

use wordseam::{Encoder, vocab_io};

use crate::logging::LogArgs;

/// Args for the decode command.
#[derive(clap::Args, Debug)]
pub struct DecodeArgs {
    /// Token ids to decode.
    ids: Vec<wordseam::TokenId>,

    #[clap(flatten)]
    pub logging: LogArgs,

    /// Trained vocabulary path.
    #[arg(long, default_value = "vocab.json")]
    vocab: String,
}

impl DecodeArgs {
    /// Run the decode command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(1)?;

        let vocab = vocab_io::load_vocab_path(&self.vocab)?;
        let encoder = Encoder::new(vocab);

        let bytes = encoder.decode(&self.ids)?;

        let stdout = std::io::stdout();
        let mut writer = stdout.lock();
        writer.write_all(&bytes)?;
        writeln!(writer)?;

        Ok(())
    }
}
