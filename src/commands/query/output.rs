//! Output formatting for query command results.

use super::execute::QueryResult;
use crate::output::{Outputable, render_rows};

impl Outputable for QueryResult {
    fn to_table(&self) -> String {
        match (&self.rows, self.affected) {
            (Some(rows), _) => render_rows(rows),
            (None, Some(n)) => format!("OK, {} row{} affected", n, if n == 1 { "" } else { "s" }),
            (None, None) => "OK".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Record;
    use rstest::rstest;

    #[rstest]
    #[case(Some(1), "OK, 1 row affected")]
    #[case(Some(0), "OK, 0 rows affected")]
    #[case(None, "OK")]
    fn test_to_table_without_rows(#[case] affected: Option<u64>, #[case] expected: &str) {
        let result = QueryResult {
            sql: "DELETE FROM users".into(),
            rows: None,
            affected,
        };
        assert_eq!(result.to_table(), expected);
    }

    #[rstest]
    fn test_to_table_with_rows() {
        let result = QueryResult {
            sql: "SELECT 1 AS one".into(),
            rows: Some(vec![Record::new().with("one", 1)]),
            affected: None,
        };
        assert_eq!(result.to_table(), "one\n---\n1\n\n(1 row)");
    }
}
