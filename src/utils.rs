use crate::traits::Record;
use regex::Regex;
use std::{fmt::Display, process, sync::LazyLock};

static DRIVE_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r":\\").unwrap());
static FORBIDDEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9\-_.]").unwrap());
static DOTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.+").unwrap());
static BLANKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static UNDERSCORES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_+").unwrap());
static DASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").unwrap());

/// Turns a server path such as `C:\Program Files\MariaDB 10.6\` into a
/// fragment that is safe inside a directory name (`C.Program_Files.MariaDB_10.6`).
pub fn str_to_filename(raw: &str) -> String {
    let s = DRIVE_PREFIX.replace_all(raw, ".");
    let s = s.replace('\\', ".").replace('/', ".").replace(' ', "_");
    let s = FORBIDDEN.replace_all(&s, "-");
    let s = DOTS.replace_all(&s, ".");
    let s = BLANKS.replace_all(&s, " ");
    let s = UNDERSCORES.replace_all(&s, "_");
    let s = DASHES.replace_all(&s, "-");
    s.trim_matches(|c| matches!(c, '.' | '_' | '-')).trim().to_string()
}

/// Serializes uniform records as CSV: a header row taken from the first
/// record's column order, then one row per record. Values are written
/// verbatim, never quoted. No records, no output.
pub fn records_to_csv(records: &[Record]) -> csv::Result<String> {
    let Some(first) = records.first() else {
        return Ok(String::new());
    };

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(Vec::new());

    // write column names
    writer.write_record(first.iter().map(|(column, _)| column))?;

    // write values
    for record in records {
        writer.write_record(record.iter().map(|(_, value)| value))?;
    }

    let bytes = writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Appends one `user@host` section of the permissions report.
pub fn push_grants(out: &mut String, user: &str, host: &str, grants: &[String]) {
    out.push_str(&format!("{user}@{host}\n\n"));
    for grant in grants {
        out.push_str(grant);
        out.push('\n');
    }
    out.push_str("\n\n");
}

/// Quotes `value` as a single-quoted SQL string literal.
///
/// Backslashes are always doubled, so the literal is wrong on a server
/// running with `NO_BACKSLASH_ESCAPES` in `sql_mode`.
pub fn sql_quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}

/// Top-level handler: print the message and terminate with a failure status.
pub fn exit_on_error<T, E: Display>(res: Result<T, E>) -> T {
    match res {
        Ok(v) => v,
        Err(e) => {
            println!("> {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn unix_paths() {
        assert_eq!(str_to_filename("/usr/"), "usr");
        assert_eq!(str_to_filename("/var/lib/mysql/"), "var.lib.mysql");
    }

    #[test]
    fn windows_paths() {
        assert_eq!(
            str_to_filename(r"C:\Program Files\MariaDB 10.6\"),
            "C.Program_Files.MariaDB_10.6"
        );
        assert_eq!(str_to_filename(r"D:\data\\db"), "D.data.db");
        assert_ne!(str_to_filename(r"C:\data"), str_to_filename(r"D:\data"));
    }

    #[test]
    fn forbidden_symbols_become_single_dash() {
        assert_eq!(str_to_filename("a$%b"), "a-b");
        assert_eq!(str_to_filename("[x]"), "x");
        assert_eq!(str_to_filename("  "), "");
    }

    #[test]
    fn csv_header_follows_first_record() {
        let csv = records_to_csv(&[
            record(&[("Variable_name", "port"), ("Value", "3306")]),
            record(&[("Variable_name", "version"), ("Value", "10.6.12-MariaDB")]),
        ])
        .unwrap();
        assert_eq!(csv, "Variable_name,Value\nport,3306\nversion,10.6.12-MariaDB\n");
    }

    #[test]
    fn csv_of_nothing_is_empty() {
        assert_eq!(records_to_csv(&[]).unwrap(), "");
    }

    #[test]
    fn csv_writes_values_verbatim() {
        let csv = records_to_csv(&[
            record(&[("Variable_name", "sql_mode"), ("Value", "STRICT_TRANS_TABLES,NO_ENGINE_SUBSTITUTION")]),
            record(&[("Variable_name", "ft_boolean_syntax"), ("Value", r#"+ -><()~*:""&|"#)]),
        ])
        .unwrap();
        assert_eq!(
            csv,
            "Variable_name,Value\n\
             sql_mode,STRICT_TRANS_TABLES,NO_ENGINE_SUBSTITUTION\n\
             ft_boolean_syntax,+ -><()~*:\"\"&|\n"
        );
    }

    #[test]
    fn grants_section_layout() {
        let mut out = String::new();
        push_grants(&mut out, "root", "localhost", &["GRANT ALL".into(), "GRANT PROXY".into()]);
        push_grants(&mut out, "app", "%", &[]);
        assert_eq!(out, "root@localhost\n\nGRANT ALL\nGRANT PROXY\n\n\napp@%\n\n\n\n");
    }

    #[test]
    fn quoting_escapes_quotes() {
        assert_eq!(sql_quote("o'neil"), "'o''neil'");
        assert_eq!(sql_quote("%"), "'%'");
        assert_eq!(sql_quote(r"a\b"), r"'a\\b'");
    }

    proptest! {
        #[test]
        fn sanitized_names_use_safe_charset(raw in ".*") {
            let name = str_to_filename(&raw);
            prop_assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')));
            prop_assert!(!name.starts_with(['.', '_', '-']));
            prop_assert!(!name.ends_with(['.', '_', '-']));
        }

        #[test]
        fn sanitizing_is_idempotent(raw in r"[A-Za-z]:\\[ -~]{0,40}|.{0,40}") {
            let once = str_to_filename(&raw);
            prop_assert_eq!(str_to_filename(&once), once);
        }
    }
}
