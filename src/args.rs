//! Command line surface.
//!
//! Only `--databases` is needed to start a run; everything else has a
//! default matching a local server reachable as `root` without a password.
//! Unknown flags are dropped before parsing and a repeated flag keeps its
//! last value.

use crate::{error::BackupError, MError};
use clap::{Arg, CommandFactory, Parser};
use std::{ffi::OsString, path::PathBuf};

/// Token that selects every database on the server.
pub const ALL_DATABASES: &str = "*";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "mysql-backup",
    version,
    about = "Back up server settings, grants and databases into a timestamped directory",
    args_override_self = true
)]
pub struct Cli {
    /// Comma separated database names, or `*` for all of them
    #[arg(long)]
    pub databases: Option<String>,

    /// Server host
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Server port
    #[arg(long, default_value_t = 3306)]
    pub port: u16,

    /// User for the metadata queries
    #[arg(long, default_value = "root")]
    pub user: String,

    /// Password for the metadata queries
    #[arg(long, env = "MYSQL_BACKUP_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,

    /// Prompt for the metadata password instead of using --password
    #[arg(long)]
    pub ask_pass: bool,

    /// Dump program, looked up on PATH
    #[arg(long, default_value = "mysqldump")]
    pub dump_tool: String,

    /// User the dump program authenticates as
    #[arg(long, default_value = "root")]
    pub dump_user: String,

    /// Password for the dump program, handed over through MYSQL_PWD
    #[arg(long, env = "MYSQL_BACKUP_DUMP_PASSWORD", default_value = "", hide_env_values = true)]
    pub dump_password: String,

    /// Directory the backup directory is created in (defaults to the current one)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Overwrite existing dump files without asking
    #[arg(long)]
    pub overwrite: bool,

    /// Log level for diagnostics written to stderr
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Stray positional arguments, ignored
    #[arg(hide = true)]
    pub ignored: Vec<String>,
}

impl Cli {
    /// Parses `args` (program name first), dropping flags this tool doesn't know.
    pub fn parse_lenient<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let command = Cli::command();
        let known: Vec<&str> = command
            .get_arguments()
            .filter_map(Arg::get_long)
            .chain(["help", "version"])
            .collect();

        let args = args
            .into_iter()
            .map(Into::into)
            .enumerate()
            .filter(|(i, arg)| *i == 0 || is_known(arg, &known))
            .map(|(_, arg)| arg);
        Cli::parse_from(args)
    }
}

fn is_known(arg: &OsString, known: &[&str]) -> bool {
    let Some(arg) = arg.to_str() else {
        return true;
    };
    if arg == "--" || arg == "-" || !arg.starts_with('-') {
        return true;
    }
    match arg.strip_prefix("--") {
        Some(flag) => known.contains(&flag.split('=').next().unwrap_or(flag)),
        None => matches!(arg, "-h" | "-V"),
    }
}

/// Connection settings for the metadata queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

/// How the external dump program is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpOptions {
    pub tool: String,
    pub user: String,
    pub password: String,
}

/// What to do when the backup directory already holds dump files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overwrite {
    Always,
    Ask,
}

/// Everything a run needs, resolved from [`Cli`].
#[derive(Debug, Clone)]
pub struct Options {
    pub databases: Vec<String>,
    pub connect: ConnectOptions,
    pub dump: DumpOptions,
    pub output_dir: PathBuf,
    pub overwrite: Overwrite,
}

impl Options {
    /// Resolves the parsed flags. A missing `--databases` is a usage error.
    pub fn from_cli(cli: Cli, cwd: PathBuf) -> MError<Self> {
        let databases = cli.databases.as_deref().map(split_list).ok_or(BackupError::Usage)?;
        Ok(Options {
            databases,
            connect: ConnectOptions {
                host: cli.host,
                port: cli.port,
                user: cli.user,
                password: cli.password,
            },
            dump: DumpOptions {
                tool: cli.dump_tool,
                user: cli.dump_user,
                password: cli.dump_password,
            },
            output_dir: cli.output_dir.unwrap_or(cwd),
            overwrite: if cli.overwrite { Overwrite::Always } else { Overwrite::Ask },
        })
    }
}

/// Splits a comma separated flag value, dropping empty pieces.
/// Order and duplicates are kept.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .trim()
        .split(',')
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
