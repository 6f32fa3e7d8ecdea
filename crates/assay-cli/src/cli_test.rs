use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn test_run_args() {
    let cli = Cli::parse_from([
        "assay",
        "run",
        "-p",
        "project",
        "--tables",
        "orders,refunds",
        "--fail-fast",
        "--timeout-secs",
        "5",
    ]);
    assert_eq!(cli.global.project_dir, "project");
    match cli.command {
        Commands::Run(args) => {
            assert_eq!(args.tables.as_deref(), Some("orders,refunds"));
            assert!(args.fail_fast);
            assert_eq!(args.timeout_secs, Some(5));
        }
        other => panic!("expected run, got {other:?}"),
    }
}

#[test]
fn test_validators_defaults_to_table_output() {
    let cli = Cli::parse_from(["assay", "validators"]);
    match cli.command {
        Commands::Validators(args) => assert_eq!(args.output, ValidatorsOutput::Table),
        other => panic!("expected validators, got {other:?}"),
    }
}
