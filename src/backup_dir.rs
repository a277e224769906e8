//! Naming, creating and guarding the per-run backup directory.

use crate::{error::BackupError, utils::str_to_filename, MError};
use crossterm::{style::Print, ExecutableCommand};
use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};
use time::{macros::format_description, OffsetDateTime};
use tracing::{info, warn};

/// Extension of the files written by the dump tool.
pub const DUMP_EXTENSION: &str = "sql";

/// Local time of the run, falling back to UTC when the local offset is unknown.
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|e| {
        warn!(error = %e, "local offset unavailable, using UTC");
        OffsetDateTime::now_utc()
    })
}

/// `backup-db_<YYYY-MM-DD_HH-MM-SS>_basedir[<basedir>]_datadir[<datadir>]`
pub fn dir_name(at: OffsetDateTime, basedir: &str, datadir: &str) -> String {
    let stamp = at
        .format(format_description!(
            "[year]-[month]-[day]_[hour]-[minute]-[second]"
        ))
        .unwrap_or_default();
    format!(
        "backup-db_{stamp}_basedir[{}]_datadir[{}]",
        str_to_filename(basedir),
        str_to_filename(datadir)
    )
}

/// Makes sure `dir` exists as a directory, creating it when missing.
/// Returns whether it had to be created.
pub fn prepare(dir: &Path) -> MError<bool> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => return Ok(false),
        Ok(_) => return Err(BackupError::NameCollision(dir.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(BackupError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })
        }
    }

    create(dir).map_err(|source| BackupError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    info!(dir = %dir.display(), "created backup directory");
    Ok(true)
}

#[cfg(unix)]
fn create(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().mode(0o776).create(dir)
}

#[cfg(not(unix))]
fn create(dir: &Path) -> io::Result<()> {
    fs::create_dir(dir)
}

/// Dump files already present in `dir`, sorted by name.
pub fn existing_dumps(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == DUMP_EXTENSION) {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

/// Decides whether existing dump files may be overwritten.
pub trait Confirm {
    fn confirm_overwrite(&mut self, dir: &Path) -> MError<bool>;
}

/// Never asks; existing files are overwritten.
pub struct AlwaysOverwrite;

impl Confirm for AlwaysOverwrite {
    fn confirm_overwrite(&mut self, _dir: &Path) -> MError<bool> {
        Ok(true)
    }
}

/// Asks on the given streams.
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Prompt { input, output }
    }
}

impl<R: BufRead, W: Write> Confirm for Prompt<R, W> {
    fn confirm_overwrite(&mut self, _dir: &Path) -> MError<bool> {
        self.output
            .execute(Print("Overwrite existing files? (y/n) [default n]: "))
            .map_err(BackupError::Prompt)?;
        let mut answer = String::new();
        self.input.read_line(&mut answer).map_err(BackupError::Prompt)?;
        Ok(answer.trim().eq_ignore_ascii_case("y"))
    }
}

/// Prompts on the terminal, or declines when stdin is not one.
pub struct TerminalPrompt {
    interactive: bool,
}

impl TerminalPrompt {
    /// `interactive` tells whether stdin is attached to a terminal.
    pub fn new(interactive: bool) -> Self {
        TerminalPrompt { interactive }
    }
}

impl Confirm for TerminalPrompt {
    fn confirm_overwrite(&mut self, dir: &Path) -> MError<bool> {
        if !self.interactive {
            warn!(dir = %dir.display(), "stdin is not a terminal; pass --overwrite to replace dumps");
            return Ok(false);
        }
        Prompt::new(io::stdin().lock(), io::stdout().lock()).confirm_overwrite(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn name_is_stamped_and_sanitized() {
        let at = datetime!(2024-03-05 07:08:09 UTC);
        assert_eq!(
            dir_name(at, r"C:\Program Files\MariaDB 10.6\", "C:/data dir/"),
            "backup-db_2024-03-05_07-08-09_basedir[C.Program_Files.MariaDB_10.6]_datadir[C-.data_dir]"
        );
        assert_eq!(
            dir_name(at, "/usr", "/var/lib/mysql/"),
            "backup-db_2024-03-05_07-08-09_basedir[usr]_datadir[var.lib.mysql]"
        );
    }

    #[test]
    fn creates_missing_dir() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("backup");
        assert!(prepare(&dir).unwrap());
        assert!(dir.is_dir());
        assert!(!prepare(&dir).unwrap());
    }

    #[test]
    fn file_in_the_way_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("backup");
        fs::write(&dir, "x").unwrap();
        assert!(matches!(prepare(&dir), Err(BackupError::NameCollision(_))));
    }

    #[test]
    fn missing_parent_is_create_error() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nope").join("backup");
        assert!(matches!(prepare(&dir), Err(BackupError::CreateDir { .. })));
    }

    #[test]
    fn finds_only_sql_files() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("PERMISSIONS.txt"), "").unwrap();
        assert!(existing_dumps(root.path()).unwrap().is_empty());
        fs::write(root.path().join("b.sql"), "").unwrap();
        fs::write(root.path().join("a.sql"), "").unwrap();
        fs::create_dir(root.path().join("c.sql")).unwrap();
        assert_eq!(
            existing_dumps(root.path()).unwrap(),
            vec![root.path().join("a.sql"), root.path().join("b.sql")]
        );
    }

    #[test]
    fn unreadable_dir_is_an_io_error() {
        let root = tempfile::tempdir().unwrap();
        assert!(existing_dumps(&root.path().join("missing")).is_err());
    }

    #[test]
    fn detached_stdin_declines() {
        let mut prompt = TerminalPrompt::new(false);
        assert!(!prompt.confirm_overwrite(Path::new(".")).unwrap());
    }

    #[test]
    fn prompt_accepts_only_y() {
        for (answer, expected) in [("y\n", true), ("  Y \n", true), ("n\n", false), ("yes\n", false), ("", false)] {
            let mut out = Vec::new();
            let ok = Prompt::new(answer.as_bytes(), &mut out)
                .confirm_overwrite(Path::new("."))
                .unwrap();
            assert_eq!(ok, expected, "answer {answer:?}");
            assert_eq!(String::from_utf8(out).unwrap(), "Overwrite existing files? (y/n) [default n]: ");
        }
    }
}
