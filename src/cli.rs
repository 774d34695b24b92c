use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "syncline", about = "Headless realtime sync core for a team chat client")]
pub struct Cli {
    /// Path to config file (default: ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Connect as the given identity and stream events until interrupted
    Run {
        /// User id the live connection is opened for
        identity: String,

        /// Channel treated as active: remote activity in it triggers a
        /// refresh of its message list
        #[arg(short = 'n', long)]
        channel: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command};

    #[test]
    fn parses_run_with_identity() {
        let cli = Cli::parse_from(["syncline", "run", "42"]);

        let Command::Run { identity, channel } = cli.command;
        assert_eq!(identity, "42");
        assert_eq!(channel, None);
    }

    #[test]
    fn parses_active_channel_and_config_path() {
        let cli = Cli::parse_from([
            "syncline",
            "run",
            "42",
            "--channel",
            "3",
            "--config",
            "custom.toml",
        ]);

        let Command::Run { channel, .. } = cli.command;
        assert_eq!(channel, Some("3".to_owned()));
        assert_eq!(
            cli.config
                .as_deref()
                .map(|p| p.to_string_lossy().to_string()),
            Some("custom.toml".to_owned())
        );
    }
}
