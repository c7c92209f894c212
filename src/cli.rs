//! CLI definitions for the f1-driver binary.

use clap::{Parser, Subcommand};

/// Traktor Kontrol F1 driver
#[derive(Parser)]
#[command(name = "f1-driver")]
#[command(author, version, long_about = None)]
#[command(about = "Linux driver for the Native Instruments Traktor Kontrol F1")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List attached F1 controllers
    #[command(visible_alias = "ls")]
    List,

    /// Print every control event until Ctrl-C
    #[command(visible_aliases = ["events", "mon"])]
    Monitor {
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,

        /// Event queue capacity; events are dropped while it is full
        #[arg(long, default_value_t = kontrol_transport::DEFAULT_SUBSCRIBER_CAPACITY)]
        capacity: usize,
    },

    /// Interactive demo: pads cycle colors, the dial drives the display
    Demo,

    /// Mute-key layout with press, hold and release handlers
    Layout {
        /// Hold threshold in milliseconds
        #[arg(long, default_value_t = 250)]
        hold_ms: u64,

        /// LED refresh rate in Hz
        #[arg(long, default_value_t = kontrol_layout::DEFAULT_REFRESH_HZ)]
        refresh_hz: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_monitor_flags() {
        let cli =
            Cli::try_parse_from(["f1-driver", "monitor", "--json", "--capacity", "8"]).unwrap();
        match cli.command {
            Some(Commands::Monitor { json, capacity }) => {
                assert!(json);
                assert_eq!(capacity, 8);
            }
            _ => panic!("expected monitor"),
        }
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["f1-driver", "layout"]).unwrap();
        assert_eq!(cli.log_level, "info");
        assert!(matches!(
            cli.command,
            Some(Commands::Layout {
                hold_ms: 250,
                refresh_hz: 60
            })
        ));
        let cli = Cli::try_parse_from(["f1-driver", "ls", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_level, "debug");
        assert!(matches!(cli.command, Some(Commands::List)));
    }
}
