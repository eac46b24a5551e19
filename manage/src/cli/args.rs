//! CLI argument definitions.

use clap::builder::FalseyValueParser;
use clap::{Parser, Subcommand};

use common::{DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, ENV_CONFIG_SELECTOR, ENV_COVERAGE};

/// SoConn management tool
#[derive(Parser, Debug)]
#[command(name = "manage")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration profile (dev, test, prod, heroku, unix)
    #[arg(short, long, global = true, env = ENV_CONFIG_SELECTOR)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Manage database migrations
    Db(DbArgs),

    /// Open an interactive shell in the application context
    Shell,

    /// Print the resolved settings
    Config(ConfigArgs),

    /// Run the test suite
    Test(TestArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = DEFAULT_SERVER_HOST, env = "SERVER_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_SERVER_PORT, env = "SERVER_PORT")]
    pub port: u16,
}

/// Arguments for the db command
#[derive(Parser, Debug)]
pub struct DbArgs {
    #[command(subcommand)]
    pub action: DbAction,
}

/// Migration actions
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbAction {
    /// Run pending migrations
    Up,
    /// Roll back applied migrations
    Down {
        /// Number of migrations to roll back
        #[arg(short = 'n', long, default_value_t = 1)]
        steps: u32,
    },
    /// Show migration status
    Status,
    /// Drop everything and re-run all migrations
    Fresh,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the test command
#[derive(Parser, Debug)]
pub struct TestArgs {
    /// Collect branch coverage
    #[arg(long, env = ENV_COVERAGE, value_parser = FalseyValueParser::new())]
    pub coverage: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("manage").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_serve_defaults() {
        let cli = parse(&["serve"]);
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.host, "0.0.0.0");
                assert_eq!(args.port, 5000);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = parse(&["db", "status", "--config", "heroku", "-v"]);
        assert_eq!(cli.config.as_deref(), Some("heroku"));
        assert!(cli.verbose);
    }

    #[test]
    fn test_db_down_steps() {
        let cli = parse(&["db", "down", "-n", "3"]);
        match cli.command {
            Commands::Db(args) => assert_eq!(args.action, DbAction::Down { steps: 3 }),
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = parse(&["db", "down"]);
        match cli.command {
            Commands::Db(args) => assert_eq!(args.action, DbAction::Down { steps: 1 }),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(Cli::try_parse_from(["manage", "runserver"]).is_err());
    }
}
