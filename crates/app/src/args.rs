use std::fmt;
use std::path::PathBuf;

use curriculum_core::model::{ModuleId, ParseIdError, PhaseId, SectionId};

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { command: &'static str, name: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidId { raw: String, source: ParseIdError },
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
            ArgsError::InvalidId { raw, source } => write!(f, "invalid id {raw:?}: {source}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status,
    Show(ModuleId),
    Section {
        module: ModuleId,
        section: SectionId,
        completed: bool,
    },
    Complete(ModuleId),
    Incomplete(ModuleId),
    Bookmark(ModuleId),
    Bookmarks,
    Read { phase: PhaseId, module: ModuleId },
    Reset,
    Help,
}

#[derive(Debug, Clone)]
pub struct Args {
    pub db_url: String,
    pub manifest: PathBuf,
    pub content_root: Option<PathBuf>,
    pub command: Command,
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app [--db <sqlite_url>] [--curriculum <manifest.json>] [--content <dir>] <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  status                              overall and per-phase progress (default)");
    eprintln!("  show <module>                       sections, completion and bookmark for a module");
    eprintln!("  section <module> <section> [--undone]");
    eprintln!("  complete <module> | incomplete <module>");
    eprintln!("  bookmark <module>                   toggle a bookmark");
    eprintln!("  bookmarks                           list bookmarked modules");
    eprintln!("  read <phase> <module>               print a module's markdown");
    eprintln!("  reset                               clear all progress");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:progress.sqlite3");
    eprintln!("  --curriculum curriculum.json");
    eprintln!("  --content <directory of the manifest>");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  CURRICULUM_DB_URL, CURRICULUM_MANIFEST, CURRICULUM_CONTENT_ROOT, RUST_LOG");
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn require_id<T>(
    positional: &mut impl Iterator<Item = String>,
    command: &'static str,
    name: &'static str,
) -> Result<T, ArgsError>
where
    T: std::str::FromStr<Err = ParseIdError>,
{
    let raw = positional
        .next()
        .ok_or(ArgsError::MissingArgument { command, name })?;
    raw.parse()
        .map_err(|source| ArgsError::InvalidId { raw, source })
}

impl Args {
    /// Parse process arguments, falling back to `CURRICULUM_*` variables.
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        Self::parse_from(args, |name| std::env::var(name).ok())
    }

    pub fn parse_from(
        args: impl IntoIterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = env("CURRICULUM_DB_URL").unwrap_or_else(|| "sqlite:progress.sqlite3".into());
        let mut manifest = env("CURRICULUM_MANIFEST")
            .map_or_else(|| PathBuf::from("curriculum.json"), PathBuf::from);
        let mut content_root = env("CURRICULUM_CONTENT_ROOT").map(PathBuf::from);
        let mut undone = false;
        let mut help = false;
        let mut positional = Vec::new();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--curriculum" => manifest = require_value(&mut args, "--curriculum")?.into(),
                "--content" => content_root = Some(require_value(&mut args, "--content")?.into()),
                "--undone" => undone = true,
                "--help" | "-h" => help = true,
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positional.push(arg),
            }
        }

        let command = if help {
            Command::Help
        } else {
            parse_command(positional, undone)?
        };

        Ok(Self {
            db_url: normalize_sqlite_url(db_url),
            manifest,
            content_root,
            command,
        })
    }

    /// Markdown files resolve against `--content`, or the manifest's directory.
    pub fn content_root(&self) -> PathBuf {
        self.content_root.clone().unwrap_or_else(|| {
            self.manifest
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), std::path::Path::to_path_buf)
        })
    }
}

fn parse_command(positional: Vec<String>, undone: bool) -> Result<Command, ArgsError> {
    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        None | Some("status") => Command::Status,
        Some("help") => Command::Help,
        Some("show") => Command::Show(require_id(&mut positional, "show", "module")?),
        Some("section") => Command::Section {
            module: require_id(&mut positional, "section", "module")?,
            section: require_id(&mut positional, "section", "section")?,
            completed: !undone,
        },
        Some("complete") => Command::Complete(require_id(&mut positional, "complete", "module")?),
        Some("incomplete") => {
            Command::Incomplete(require_id(&mut positional, "incomplete", "module")?)
        }
        Some("bookmark") => Command::Bookmark(require_id(&mut positional, "bookmark", "module")?),
        Some("bookmarks") => Command::Bookmarks,
        Some("read") => Command::Read {
            phase: require_id(&mut positional, "read", "phase")?,
            module: require_id(&mut positional, "read", "module")?,
        },
        Some("reset") => Command::Reset,
        Some(other) => return Err(ArgsError::UnknownCommand(other.to_string())),
    };

    if undone && !matches!(command, Command::Section { .. }) {
        return Err(ArgsError::UnknownArg("--undone".to_string()));
    }
    if let Some(extra) = positional.next() {
        return Err(ArgsError::UnknownArg(extra));
    }
    Ok(command)
}

/// Accepts `sqlite::memory:`, `sqlite://<path>` or a bare/`sqlite:` file path,
/// and returns an absolute `sqlite://` URL for file databases.
pub fn normalize_sqlite_url(raw: String) -> String {
    let raw = raw.trim();
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw.to_string();
    }

    let path = std::path::Path::new(raw.strip_prefix("sqlite:").unwrap_or(raw));
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// File behind a normalised URL; `None` for the in-memory database.
pub fn sqlite_file_path(db_url: &str) -> Result<Option<PathBuf>, ArgsError> {
    if db_url == "sqlite::memory:" {
        return Ok(None);
    }
    let invalid = || ArgsError::InvalidDbUrl {
        raw: db_url.to_string(),
    };
    let rest = db_url.strip_prefix("sqlite://").ok_or_else(invalid)?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() {
        return Err(invalid());
    }
    Ok(Some(PathBuf::from(path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        Args::parse_from(args.iter().map(|s| (*s).to_string()), |_| None)
    }

    #[test]
    fn defaults_to_status() {
        let args = parse(&["--db", "sqlite::memory:"]).unwrap();
        assert_eq!(args.command, Command::Status);
        assert_eq!(args.db_url, "sqlite::memory:");
    }

    #[test]
    fn parses_section_with_undone_flag() {
        let args = parse(&["section", "m1.1", "intro", "--undone"]).unwrap();
        assert_eq!(
            args.command,
            Command::Section {
                module: ModuleId::new("m1.1").unwrap(),
                section: SectionId::new("intro").unwrap(),
                completed: false,
            }
        );
    }

    #[test]
    fn read_requires_both_ids() {
        let err = parse(&["read", "phase-1"]).unwrap_err();
        assert!(matches!(
            err,
            ArgsError::MissingArgument { command: "read", name: "module" }
        ));
    }

    #[test]
    fn rejects_unknown_command_and_extra_args() {
        assert!(matches!(
            parse(&["launch"]).unwrap_err(),
            ArgsError::UnknownCommand(_)
        ));
        assert!(matches!(
            parse(&["complete", "a", "b"]).unwrap_err(),
            ArgsError::UnknownArg(_)
        ));
    }

    #[test]
    fn content_root_defaults_to_manifest_dir() {
        let args = parse(&["--curriculum", "course/curriculum.json"]).unwrap();
        assert_eq!(args.content_root(), PathBuf::from("course"));
    }

    #[test]
    fn relative_sqlite_path_becomes_absolute_url() {
        let url = normalize_sqlite_url("sqlite:data/progress.sqlite3".to_string());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/progress.sqlite3"));
    }

    #[test]
    fn help_flag_wins_anywhere() {
        assert_eq!(parse(&["complete", "a", "--help"]).unwrap().command, Command::Help);
        assert_eq!(parse(&["-h"]).unwrap().command, Command::Help);
        assert_eq!(parse(&["launch", "-h"]).unwrap().command, Command::Help);
    }

    #[test]
    fn undone_only_applies_to_section() {
        let err = parse(&["complete", "a", "--undone"]).unwrap_err();
        assert!(matches!(err, ArgsError::UnknownArg(arg) if arg == "--undone"));
    }

    #[test]
    fn environment_supplies_defaults_and_flags_override() {
        let env = |name: &str| match name {
            "CURRICULUM_MANIFEST" => Some("course/curriculum.json".to_string()),
            "CURRICULUM_CONTENT_ROOT" => Some("/srv/content".to_string()),
            _ => None,
        };
        let args = Args::parse_from(["status".to_string()], env).unwrap();
        assert_eq!(args.manifest, PathBuf::from("course/curriculum.json"));
        assert_eq!(args.content_root(), PathBuf::from("/srv/content"));

        let args = Args::parse_from(
            ["--content".to_string(), "docs".to_string()],
            env,
        )
        .unwrap();
        assert_eq!(args.content_root(), PathBuf::from("docs"));
    }

    #[test]
    fn sqlite_file_path_strips_query() {
        assert_eq!(sqlite_file_path("sqlite::memory:").unwrap(), None);
        assert_eq!(
            sqlite_file_path("sqlite:///tmp/p.sqlite3?mode=rwc").unwrap(),
            Some(PathBuf::from("/tmp/p.sqlite3"))
        );
        assert!(sqlite_file_path("postgres://x").is_err());
    }
}
