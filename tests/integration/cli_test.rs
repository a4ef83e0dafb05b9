use clap::Parser;
use leakscope::cli::{args::OutputFormat, Args, Command};
use std::path::PathBuf;

#[test]
fn test_cli_args_parsing() {
    let args = Args::parse_from(["leakscope"]);
    assert_eq!(args.file, None);
    assert_eq!(args.output, None);
    assert_eq!(args.output_file, None);
    assert!(!args.quiet);
    assert!(!args.verbose);
    assert!(!args.compile_only);
    assert!(!args.check_tools);

    let args = Args::parse_from([
        "leakscope",
        "src/leak.c",
        "--binary",
        "build/leak",
        "--output",
        "json",
        "--output-file",
        "report.json",
        "--timeout",
        "120",
        "--strict-reachable",
        "--quiet",
    ]);

    assert_eq!(args.file, Some(PathBuf::from("src/leak.c")));
    assert_eq!(args.binary, Some(PathBuf::from("build/leak")));
    assert_eq!(args.output, Some(OutputFormat::Json));
    assert_eq!(args.output_file, Some(PathBuf::from("report.json")));
    assert_eq!(args.timeout, Some(120));
    assert!(args.strict_reachable);
    assert!(args.quiet);
}

#[test]
fn test_cli_rejects_unknown_format() {
    assert!(Args::try_parse_from(["leakscope", "leak.c", "--output", "xml"]).is_err());
}

#[test]
fn test_cli_config_option() {
    let args = Args::parse_from(["leakscope", "--config", "custom-config.toml", "leak.c"]);
    assert_eq!(args.config, Some(PathBuf::from("custom-config.toml")));
}

#[test]
fn test_missing_input_is_a_usage_error() {
    let command = Command::from_args(Args::parse_from(["leakscope"]));
    assert_eq!(command.run(), 2);
}

#[test]
fn test_missing_source_file_exits_with_error() {
    let command = Command::from_args(Args::parse_from([
        "leakscope",
        "/nonexistent/leakscope/leak.c",
        "--no-progress",
    ]));
    assert_eq!(command.run(), 1);
}
