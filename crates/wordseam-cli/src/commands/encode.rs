use std::fs;
use std::io::Write;

use wordseam::{Encoder, vocab_io};

use crate::logging::LogArgs;

/// Args for the encode command.
#[derive(clap::Args, Debug)]
pub struct EncodeArgs {
    /// Text to encode; omit to encode --file instead.
    text: Option<String>,

    #[clap(flatten)]
    pub logging: LogArgs,

    /// Trained vocabulary path.
    #[arg(long, default_value = "vocab.json")]
    vocab: String,

    /// Encode a file's contents instead of the text argument.
    #[arg(long)]
    file: Option<String>,
}

impl EncodeArgs {
    /// Run the encode command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(1)?;

        let vocab = vocab_io::load_vocab_path(&self.vocab)?;
        let encoder = Encoder::new(vocab);

        let text = match (&self.text, &self.file) {
            (Some(text), _) => text.clone(),
            (None, Some(path)) => fs::read_to_string(path)?,
            (None, None) => return Err("nothing to encode: pass text or --file".into()),
        };

        let tokens = encoder.encode(&text)?;

        let stdout = std::io::stdout();
        let mut writer = stdout.lock();
        for (idx, token) in tokens.iter().enumerate() {
            write!(writer, "{}{}", if idx == 0 { "" } else { " " }, token)?;
        }
        writeln!(writer)?;

        Ok(())
    }
}
