use crate::{error::BackupError, metadata::Metadata, traits::Record, utils::records_to_csv, MError};
use std::{fs, io, path::Path};
use tracing::debug;

pub const SYSTEM_VARIABLES_FILE: &str = "SYSTEM_VARIABLES.txt";
pub const USERS_HOSTS_FILE: &str = "USERS_HOSTS.txt";
pub const PERMISSIONS_FILE: &str = "PERMISSIONS.txt";

/// One report file and what it holds, as shown in the progress output.
pub struct Report {
    pub file: &'static str,
    pub what: &'static str,
    pub contents: String,
}

/// Renders the three metadata reports in the order they are written.
pub fn render(meta: &Metadata) -> MError<Vec<Report>> {
    let csv = |file: &'static str, records: &[Record]| {
        records_to_csv(records).map_err(|e| BackupError::WriteReport {
            path: file.into(),
            source: io::Error::other(e),
        })
    };

    Ok(vec![
        Report {
            file: SYSTEM_VARIABLES_FILE,
            what: "system variables",
            contents: csv(SYSTEM_VARIABLES_FILE, &meta.system_variables)?,
        },
        Report {
            file: USERS_HOSTS_FILE,
            what: "users and hosts",
            contents: csv(USERS_HOSTS_FILE, &meta.user_hosts)?,
        },
        Report {
            file: PERMISSIONS_FILE,
            what: "grants",
            contents: meta.grants.clone(),
        },
    ])
}

impl Report {
    pub fn write_to(&self, dir: &Path) -> MError<()> {
        let path = dir.join(self.file);
        fs::write(&path, &self.contents).map_err(|source| BackupError::WriteReport { path, source })?;
        debug!(file = self.file, bytes = self.contents.len(), "wrote report");
        Ok(())
    }
}
