//! CLI parsing tests for select command.

#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use crate::db::Condition;
    use crate::output::OutputFormat;
    use clap::Parser;
    use rstest::rstest;

    crate::cli_required_arg_test! {
        command: "select",
        test_name: test_select_requires_table,
        required_arg: "--table",
    }

    crate::cli_option_test! {
        command: "select",
        variant: Select,
        test_name: test_select_with_table,
        args: ["--table", "public.users"],
        field: table,
        expected: "public.users",
    }

    crate::cli_error_test! {
        command: "select",
        test_name: test_select_rejects_bad_condition_column,
        args: ["--table", "users", "--where", "age;drop>1"],
    }

    #[rstest]
    fn test_select_where_is_repeatable() {
        let args = Args::try_parse_from([
            "quickdao", "select", "-t", "users", "-w", "age>18", "-w", "name like v%",
        ])
        .unwrap();
        match args.command {
            crate::commands::Command::Select(cmd) => assert_eq!(
                cmd.filter.conditions,
                vec![Condition::gt("age", 18), Condition::like("name", "v%")]
            ),
            _ => panic!("Expected Select command"),
        }
    }

    #[rstest]
    fn test_global_format_after_subcommand() {
        let args = Args::try_parse_from(["quickdao", "select", "-t", "users", "--format", "json"]).unwrap();
        assert_eq!(args.format, OutputFormat::Json);
    }
}
