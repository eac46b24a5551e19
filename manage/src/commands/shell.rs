//! Shell command - Interactive shell over the configured application.
//!
//! Reads one command per line from stdin until `exit`, `quit` or EOF.

use std::fmt::Write as _;
use std::io::Write as _;
use std::str::FromStr;

use tokio::io::{AsyncBufReadExt, BufReader};

use bootstrap::{Application, Profile};
use common::AppResult;

use crate::database::Database;

const PROMPT: &str = "soconn> ";

const HELP: &str = "\
Commands:
  help          show this message
  env           active environment and its lineage
  settings      all resolved settings
  get <key>     one setting, e.g. `get mail.server`
  handlers      attached log handlers
  wrappers      entry point wrappers
  db            check database connectivity
  exit, quit    leave the shell";

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Empty,
    Help,
    Env,
    Settings,
    Get(String),
    Handlers,
    Wrappers,
    Db,
    Exit,
}

impl FromStr for ShellCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(ShellCommand::Empty);
        };

        let command = match head {
            "help" | "?" => ShellCommand::Help,
            "env" => ShellCommand::Env,
            "settings" => ShellCommand::Settings,
            "get" => match words.next() {
                Some(key) => ShellCommand::Get(key.to_string()),
                None => return Err("usage: get <key>".to_string()),
            },
            "handlers" => ShellCommand::Handlers,
            "wrappers" => ShellCommand::Wrappers,
            "db" => ShellCommand::Db,
            "exit" | "quit" => ShellCommand::Exit,
            other => return Err(format!("unknown command '{}', try `help`", other)),
        };

        match words.next() {
            Some(extra) => Err(format!("unexpected argument '{}'", extra)),
            None => Ok(command),
        }
    }
}

/// Render the output of a command that needs no I/O.
///
/// Returns `None` for `Db`, `Exit` and `Empty`.
pub fn render(command: &ShellCommand, app: &Application, profile: &Profile) -> Option<String> {
    let mut out = String::new();

    match command {
        ShellCommand::Help => out.push_str(HELP),
        ShellCommand::Env => {
            let _ = write!(
                out,
                "{} ({})",
                app.environment(),
                profile.lineage().join(" -> ")
            );
        }
        ShellCommand::Settings => {
            for (key, value) in app.settings().entries() {
                let _ = writeln!(out, "{} = {}", key, value);
            }
            out.truncate(out.trim_end().len());
        }
        ShellCommand::Get(key) => match app.settings().get(key) {
            Some(value) => {
                let _ = write!(out, "{}", value);
            }
            None => {
                let _ = write!(out, "no setting named '{}'", key);
            }
        },
        ShellCommand::Handlers => {
            if app.log_handlers().is_empty() {
                out.push_str("(none)");
            }
            let lines: Vec<String> = app.log_handlers().iter().map(|h| h.to_string()).collect();
            out.push_str(&lines.join("\n"));
        }
        ShellCommand::Wrappers => {
            if app.entry_point_wrappers().is_empty() {
                out.push_str("(none)");
            }
            out.push_str(&app.entry_point_wrappers().join("\n"));
        }
        ShellCommand::Db | ShellCommand::Exit | ShellCommand::Empty => return None,
    }

    Some(out)
}

/// Execute the shell command
pub async fn execute(app: Application, profile: &Profile) -> AppResult<()> {
    println!(
        "SoConn shell [{}]. Type `help` for commands.",
        app.environment()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{}", PROMPT);
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        let command = match line.parse::<ShellCommand>() {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        match command {
            ShellCommand::Exit => break,
            ShellCommand::Empty => {}
            ShellCommand::Db => {
                let url = &app.settings().database.url;
                match ping(url).await {
                    Ok(()) => println!("{}: ok", url),
                    Err(e) => println!("{}: {}", url, e),
                }
            }
            other => {
                if let Some(output) = render(&other, &app, profile) {
                    println!("{}", output);
                }
            }
        }
    }

    Ok(())
}

async fn ping(url: &str) -> AppResult<()> {
    Database::connect(url).await?.ping().await
}
