use crate::{args::ALL_DATABASES, error::BackupError, MError};

/// Picks the databases to dump out of `available`, the server's own list.
///
/// `*` anywhere in `requested` selects everything. Otherwise the result keeps
/// the server's order and drops requested names the server doesn't have.
pub fn select_databases(requested: &[String], available: &[String]) -> MError<Vec<String>> {
    if available.is_empty() {
        return Err(BackupError::NoDatabases);
    }

    let selected: Vec<String> = if requested.iter().any(|r| r == ALL_DATABASES) {
        available.to_vec()
    } else {
        available
            .iter()
            .filter(|db| requested.contains(db))
            .cloned()
            .collect()
    };

    if selected.is_empty() {
        return Err(BackupError::NothingSelected);
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn wildcard_takes_everything_in_order() {
        let available = list(&["mysql", "app", "test"]);
        assert_eq!(select_databases(&list(&["*"]), &available).unwrap(), available);
    }

    #[test]
    fn wildcard_wins_over_names() {
        let available = list(&["app", "test"]);
        assert_eq!(select_databases(&list(&["test", "*"]), &available).unwrap(), available);
    }

    #[test]
    fn unknown_names_are_dropped() {
        let selected = select_databases(&list(&["db1", "dbX"]), &list(&["db1", "db2"])).unwrap();
        assert_eq!(selected, list(&["db1"]));
    }

    #[test]
    fn server_order_and_no_duplicates() {
        let selected =
            select_databases(&list(&["b", "a", "b"]), &list(&["a", "b", "c"])).unwrap();
        assert_eq!(selected, list(&["a", "b"]));
    }

    #[test]
    fn empty_request_is_fatal() {
        let err = select_databases(&[], &list(&["db1"])).unwrap_err();
        assert!(matches!(err, BackupError::NothingSelected));
    }

    #[test]
    fn no_match_is_fatal() {
        let err = select_databases(&list(&["missing"]), &list(&["app"])).unwrap_err();
        assert!(matches!(err, BackupError::NothingSelected));
    }

    #[test]
    fn empty_server_is_fatal() {
        let err = select_databases(&list(&["*"]), &[]).unwrap_err();
        assert!(matches!(err, BackupError::NoDatabases));
    }
}
