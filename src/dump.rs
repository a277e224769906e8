//! Runs the external dump tool, one database at a time.

use crate::{args::DumpOptions, backup_dir::DUMP_EXTENSION, error::BackupError, MError};
use std::{
    fs::File,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};
use tracing::{debug, error, info};

/// Flags asking for routines, triggers and a consistent snapshot.
pub const DUMP_FLAGS: [&str; 3] = ["--routines", "--triggers", "--single-transaction"];

pub struct Dumper<'a> {
    opts: &'a DumpOptions,
}

impl<'a> Dumper<'a> {
    pub fn new(opts: &'a DumpOptions) -> Self {
        Dumper { opts }
    }

    fn command(&self, database: &str) -> Command {
        let mut command = Command::new(&self.opts.tool);
        command
            .args(DUMP_FLAGS)
            .args(["-u", self.opts.user.as_str(), database]);
        if !self.opts.password.is_empty() {
            command.env("MYSQL_PWD", &self.opts.password);
        }
        command
    }

    /// Dumps `database` into `<dir>/<database>.sql`, failing when the tool
    /// can't start or exits unsuccessfully.
    pub fn dump(&self, database: &str, dir: &Path) -> MError<PathBuf> {
        let path = dir.join(format!("{database}.{DUMP_EXTENSION}"));
        let spawn_error = |source| BackupError::DumpSpawn {
            tool: self.opts.tool.clone(),
            database: database.to_string(),
            source,
        };

        let out = File::create(&path).map_err(|source| BackupError::CreateDump {
            path: path.clone(),
            source,
        })?;

        let mut command = self.command(database);
        debug!(?command, "running dump tool");
        let output = command
            .stdout(Stdio::from(out))
            .stderr(Stdio::piped())
            .output()
            .map_err(spawn_error)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!(database, status = %output.status, %stderr, "dump failed");
            return Err(BackupError::DumpFailed {
                database: database.to_string(),
                status: output.status,
                stderr,
            });
        }

        let bytes = path.metadata().map(|m| m.len()).unwrap_or_default();
        info!(database, bytes, "dump complete");
        Ok(path)
    }
}
