//! CLI parsing tests for query command.

#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use crate::db::SqlValue;
    use clap::Parser;
    use rstest::rstest;

    crate::cli_required_arg_test! {
        command: "query",
        test_name: test_query_requires_sql,
        required_arg: "--sql",
    }

    crate::cli_option_test! {
        command: "query",
        variant: Query,
        test_name: test_query_params_in_order,
        args: ["--sql", "SELECT $1, $2", "-p", "18", "-p", "victor"],
        field: params,
        expected: vec![SqlValue::Int(18), SqlValue::Text("victor".into())],
    }

    crate::cli_option_test! {
        command: "query",
        variant: Query,
        test_name: test_query_without_params,
        args: ["--sql", "SELECT 1"],
        field: params,
        expected: Vec::<SqlValue>::new(),
    }
}
