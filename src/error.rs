//! Error type shared by every stage of a backup run.

use std::{io, path::PathBuf, process::ExitStatus};
use thiserror::Error;

/// Boxed error coming out of a [`crate::traits::Server`] implementation.
pub type DriverError = Box<dyn std::error::Error + Send + Sync>;

/// Everything that can stop a backup run.
///
/// Inner components only ever return these; the binary turns them into a
/// `> `-prefixed message and a non-zero exit status.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Usage:\n  mysql-backup --databases=*\n  mysql-backup --databases=db1,db2")]
    Usage,

    #[error("Error connecting to database server.  (driver message: {0})")]
    Connect(#[source] DriverError),

    #[error("{purpose}  (driver message: {source})")]
    Query {
        purpose: &'static str,
        #[source]
        source: DriverError,
    },

    #[error("No databases found.")]
    NoDatabases,

    #[error("No database(s) selected.")]
    NothingSelected,

    #[error("Error: Directory {} could not be created because a file with the same name already exists.", .0.display())]
    NameCollision(PathBuf),

    #[error("Error: Directory {} could not be created. {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error: Directory {} could not be read. {source}", path.display())]
    ScanDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Backup cancelled.")]
    Cancelled,

    #[error("Error reading overwrite confirmation: {0}")]
    Prompt(#[source] io::Error),

    #[error("Error writing progress output: {0}")]
    Output(#[source] io::Error),

    #[error("Error writing {}: {source}", path.display())]
    WriteReport {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error starting dump tool `{tool}` for database {database}: {source}")]
    DumpSpawn {
        tool: String,
        database: String,
        #[source]
        source: io::Error,
    },

    #[error("Error creating dump file {}: {source}", path.display())]
    CreateDump {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Dump of database {database} failed ({status}): {stderr}")]
    DumpFailed {
        database: String,
        status: ExitStatus,
        stderr: String,
    },
}

impl BackupError {
    pub(crate) fn query(purpose: &'static str) -> impl FnOnce(DriverError) -> Self {
        move |source| BackupError::Query { purpose, source }
    }
}
