use stderrlog::Timestamp;

/// Stderr logging flags shared by every subcommand.
#[derive(clap::Args, Debug)]
pub struct LogArgs {
    /// Suppress all log output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Raise the log level (-v, -vv, ...).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Prefix log lines with a timestamp.
    #[arg(long)]
    pub timestamps: bool,
}

impl LogArgs {
    /// Initialise stderr logging.
    ///
    /// Each subcommand passes its own `base` level (0 = errors only,
    /// 2 = info, 3 = debug); every `-v` bumps it one step further.
    pub fn setup_logging(&self, base: usize) -> Result<(), Box<dyn std::error::Error>> {
        let level = base.saturating_add(self.verbose as usize);

        stderrlog::new()
            .quiet(self.quiet)
            .verbosity(level)
            .timestamp(if self.timestamps {
                Timestamp::Second
            } else {
                Timestamp::Off
            })
            .init()?;

        Ok(())
    }
}
