//! Connection setup and the read-only queries that snapshot the server.

use crate::{
    args::ConnectOptions,
    error::BackupError,
    traits::{Record, Server},
    utils::{push_grants, sql_quote},
    MError,
};
use mysql::OptsBuilder;
use tracing::{debug, info};

/// Server state captured before any file is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub basedir: String,
    pub datadir: String,
    pub system_variables: Vec<Record>,
    pub user_hosts: Vec<Record>,
    /// Grant statements grouped per `user@host`, ready for PERMISSIONS.txt.
    pub grants: String,
}

pub fn connect(opts: &ConnectOptions) -> MError<mysql::Conn> {
    info!(host = %opts.host, port = opts.port, user = %opts.user, "connecting");
    mysql::Conn::new(
        OptsBuilder::new()
            .ip_or_hostname(Some(opts.host.as_str()))
            .tcp_port(opts.port)
            .user(Some(opts.user.as_str()))
            .pass(Some(opts.password.as_str())),
    )
    .map_err(|e| BackupError::Connect(Box::new(e)))
}

fn run<T>(
    purpose: &'static str,
    query: &str,
    exec: impl FnOnce(&str) -> Result<T, crate::error::DriverError>,
) -> MError<T> {
    debug!(query, "running");
    exec(query).map_err(BackupError::query(purpose))
}

/// Runs the fixed metadata queries, then one grants query per user/host.
pub fn collect<S: Server>(server: &mut S) -> MError<Metadata> {
    let basedir = run("Error retrieving @@GLOBAL.basedir.", "select @@GLOBAL.basedir as basedir", |q| {
        server.query_scalar(q)
    })?;
    let datadir = run("Error retrieving @@GLOBAL.datadir.", "select @@GLOBAL.datadir as datadir", |q| {
        server.query_scalar(q)
    })?;
    let system_variables =
        run("Error retrieving system variables.", "show variables", |q| server.query_records(q))?;
    let user_hosts = run(
        "Error retrieving users and hosts.",
        "select distinct u.user as user, u.host as host from mysql.user u",
        |q| server.query_records(q),
    )?;

    let mut grants = String::new();
    for record in &user_hosts {
        let user = field(record, "user");
        let host = field(record, "host");
        let query = format!("show grants for {}@{}", sql_quote(user), sql_quote(host));
        let statements = run("Error retrieving grants.", &query, |q| server.query_column(q))?;
        push_grants(&mut grants, user, host, &statements);
    }

    info!(
        variables = system_variables.len(),
        accounts = user_hosts.len(),
        "collected server metadata"
    );

    Ok(Metadata {
        basedir,
        datadir,
        system_variables,
        user_hosts,
        grants,
    })
}

/// Lists every database the server exposes.
pub fn databases<S: Server>(server: &mut S) -> MError<Vec<String>> {
    run("Error retrieving databases list.", "show databases", |q| server.query_column(q))
}

fn field<'a>(record: &'a Record, column: &str) -> &'a str {
    record
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(column))
        .map(|(_, value)| value.as_str())
        .unwrap_or_default()
}
