use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_DB_URL: &str = "sqlite://progress.sqlite3";

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { command: &'static str, name: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { command, name } => {
                write!(f, "{command} requires <{name}>")
            }
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Visit { location: String },
    Render { location: String },
    Overview,
    Export { out_dir: PathBuf },
    Import { file: PathBuf },
    Reset,
    Repair,
    Help,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Visit { .. } => "visit",
            Command::Render { .. } => "render",
            Command::Overview => "overview",
            Command::Export { .. } => "export",
            Command::Import { .. } => "import",
            Command::Reset => "reset",
            Command::Repair => "repair",
            Command::Help => "help",
        }
    }
}

/// Settings resolved from flags, then environment, then defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_url: String,
    pub curriculum: Option<PathBuf>,
    pub base_path: String,
}

impl Config {
    fn from_env() -> Self {
        Self {
            db_url: std::env::var("PROGRESS_DB_URL")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url),
            curriculum: std::env::var_os("PROGRESS_CURRICULUM").map(PathBuf::from),
            base_path: std::env::var("PROGRESS_BASE_PATH").unwrap_or_else(|_| "/".into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub config: Config,
    pub command: Command,
    /// Answer yes to every confirmation.
    pub assume_yes: bool,
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        Self::parse_with(Config::from_env(), args)
    }

    fn parse_with(
        mut config: Config,
        args: impl IntoIterator<Item = String>,
    ) -> Result<Self, ArgsError> {
        let mut args = args.into_iter();
        let mut positional = Vec::new();
        let mut assume_yes = false;
        let mut out_dir = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    config.db_url = normalize_sqlite_url(value);
                }
                "--curriculum" => {
                    config.curriculum = Some(require_value(&mut args, "--curriculum")?.into());
                }
                "--base-path" => {
                    config.base_path = require_value(&mut args, "--base-path")?;
                }
                "--out" => {
                    out_dir = Some(PathBuf::from(require_value(&mut args, "--out")?));
                }
                "--yes" | "-y" => assume_yes = true,
                "--help" | "-h" => {
                    return Ok(Self {
                        config,
                        command: Command::Help,
                        assume_yes,
                    });
                }
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        let command = match positional.next().as_deref() {
            None | Some("help") => Command::Help,
            Some("visit") => Command::Visit {
                location: positional.next().ok_or(ArgsError::MissingArgument {
                    command: "visit",
                    name: "PATH",
                })?,
            },
            Some("render") => Command::Render {
                location: positional.next().ok_or(ArgsError::MissingArgument {
                    command: "render",
                    name: "PATH",
                })?,
            },
            Some("overview") => Command::Overview,
            Some("export") => Command::Export {
                out_dir: out_dir.take().unwrap_or_else(|| PathBuf::from(".")),
            },
            Some("import") => Command::Import {
                file: positional
                    .next()
                    .map(PathBuf::from)
                    .ok_or(ArgsError::MissingArgument {
                        command: "import",
                        name: "FILE",
                    })?,
            },
            Some("reset") => Command::Reset,
            Some("repair") => Command::Repair,
            Some(other) => return Err(ArgsError::UnknownCommand(other.to_string())),
        };

        if let Some(extra) = positional.next() {
            return Err(ArgsError::UnknownArg(extra));
        }
        if out_dir.is_some() {
            return Err(ArgsError::UnknownArg(format!("--out (not valid for {})", command.name())));
        }

        Ok(Self {
            config,
            command,
            assume_yes,
        })
    }
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app visit <PATH>           record a page visit and report completions");
    eprintln!("  app render <PATH>          visit a page and print it with progress views");
    eprintln!("  app overview               print per-stage progress");
    eprintln!("  app export [--out <DIR>]   write a progress backup file");
    eprintln!("  app import <FILE> [--yes]  replace progress with a backup file");
    eprintln!("  app reset [--yes]          clear all progress");
    eprintln!("  app repair                 drop pages that belong to no stage");
    eprintln!();
    eprintln!("Global options:");
    eprintln!("  --db <sqlite_url>          default {DEFAULT_DB_URL}");
    eprintln!("  --curriculum <FILE>        curriculum JSON; default is the built-in Zephyr path");
    eprintln!("  --base-path <PATH>         site prefix, default /");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PROGRESS_DB_URL, PROGRESS_CURRICULUM, PROGRESS_BASE_PATH, RUST_LOG");
}

pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}
