use crate::commands::{decode::DecodeArgs, encode::EncodeArgs, train::TrainArgs};

pub mod decode;
pub mod encode;
pub mod train;

/// Subcommands for wordseam-cli
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Train a vocabulary from text files.
    Train(TrainArgs),

    /// Encode text into token ids.
    Encode(EncodeArgs),

    /// Decode token ids back into text.
    Decode(DecodeArgs),
}

impl Commands {
    /// Run the subcommand.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Commands::Train(cmd) => cmd.run(),
            Commands::Encode(cmd) => cmd.run(),
            Commands::Decode(cmd) => cmd.run(),
        }
    }
}
