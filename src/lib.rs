pub mod args;
pub mod backup_dir;
pub mod dump;
pub mod error;
pub mod metadata;
pub mod report;
pub mod select;
pub mod traits;
pub mod utils;

use args::{Options, Overwrite};
use backup_dir::{AlwaysOverwrite, Confirm, TerminalPrompt};
use crossterm::{style::Print, tty::IsTty, ExecutableCommand};
use dump::Dumper;
use error::BackupError;
use std::{io::Write, path::PathBuf};
use time::OffsetDateTime;
use tracing::info;
use traits::Server;

pub type MError<T> = Result<T, BackupError>;

/// Connects with `opts` and backs up to the terminal, prompting on stdin
/// unless overwriting was requested.
pub fn backup(opts: &Options) -> MError<PathBuf> {
    let mut conn = metadata::connect(&opts.connect)?;
    let mut stdout = std::io::stdout().lock();
    let at = backup_dir::now();
    match opts.overwrite {
        Overwrite::Always => run(&mut conn, opts, &mut AlwaysOverwrite, &mut stdout, at),
        Overwrite::Ask => {
            let mut prompt = TerminalPrompt::new(std::io::stdin().is_tty());
            run(&mut conn, opts, &mut prompt, &mut stdout, at)
        }
    }
}

/// Full backup pipeline against an already connected server.
///
/// Nothing touches the filesystem until the metadata is collected and the
/// selection is known to be non-empty. Returns the backup directory.
pub fn run<S, C, W>(
    server: &mut S,
    opts: &Options,
    confirm: &mut C,
    out: &mut W,
    at: OffsetDateTime,
) -> MError<PathBuf>
where
    S: Server,
    C: Confirm,
    W: Write,
{
    let mut say = |text: String| out.execute(Print(text)).map(|_| ()).map_err(BackupError::Output);

    let meta = metadata::collect(server)?;
    let available = metadata::databases(server)?;
    let selected = select::select_databases(&opts.databases, &available)?;

    say("> Selected databases:\n".into())?;
    for database in &selected {
        say(format!("  - {database}\n"))?;
    }
    say("\n".into())?;

    let dir = opts
        .output_dir
        .join(backup_dir::dir_name(at, &meta.basedir, &meta.datadir));
    if backup_dir::prepare(&dir)? {
        say(format!("> Created directory {}.\n", dir.display()))?;
    }

    let existing = backup_dir::existing_dumps(&dir).map_err(|source| BackupError::ScanDir {
        path: dir.clone(),
        source,
    })?;
    if !existing.is_empty() {
        info!(dir = %dir.display(), files = existing.len(), "backup directory already holds dumps");
        say(format!("> Error: Directory {} already contains backup files.\n\n", dir.display()))?;
        if !confirm.confirm_overwrite(&dir)? {
            say("\n".into())?;
            return Err(BackupError::Cancelled);
        }
    }

    for report in report::render(&meta)? {
        say(format!("\n> Backuping {} to {}... ", report.what, report.file))?;
        report.write_to(&dir)?;
        say("done.\n".into())?;
    }

    let dumper = Dumper::new(&opts.dump);
    for database in &selected {
        say(format!("\n> Backuping database {database} to {}... ", dir.display()))?;
        dumper.dump(database, &dir)?;
        say("done.\n".into())?;
    }

    say("\n> Backup finished.\n".into())?;
    info!(dir = %dir.display(), databases = selected.len(), "backup finished");
    Ok(dir)
}
