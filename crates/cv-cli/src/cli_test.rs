use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn test_analyze_defaults() {
    let cli = Cli::parse_from(["caravan", "analyze", "Finance"]);
    match cli.command {
        Commands::Analyze(args) => {
            assert_eq!(args.seed, "Finance");
            assert_eq!(args.output, OutputFormat::Table);
        }
        other => panic!("expected analyze, got {other:?}"),
    }
    assert_eq!(cli.global.config, "caravan.yml");
    assert!(!cli.global.verbose);
}

#[test]
fn test_migrate_flags() {
    let cli = Cli::parse_from([
        "caravan",
        "migrate",
        "Finance",
        "--deploy",
        "--force-refresh",
        "--config",
        "custom.yml",
    ]);
    match cli.command {
        Commands::Migrate(args) => {
            assert_eq!(args.seed, "Finance");
            assert!(args.deploy);
            assert!(args.force_refresh);
            assert!(!args.skip_refresh);
        }
        other => panic!("expected migrate, got {other:?}"),
    }
    assert_eq!(cli.global.config, "custom.yml");
}
