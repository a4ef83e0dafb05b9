use leakscope::config::{create_default_config, parse_config_content, ConfigBuilder};
use leakscope::models::config::{OutputFormat, StrategyKind};
use leakscope::LeakscopeError;
use tempfile::tempdir;

#[test]
fn test_windows_style_config() {
    let partial = parse_config_content(
        r#"
            indirection_command = "wsl.exe"
            strategies = ["indirection", "direct"]
            compiler_flags = ["-g", "-O0", "-Wall"]
            still_reachable_is_leak = true
        "#,
        "windows.toml",
    )
    .unwrap();

    let settings = ConfigBuilder::new().merge(partial).build().unwrap();

    assert_eq!(settings.indirection_command, "wsl.exe");
    assert_eq!(settings.strategies, vec![StrategyKind::Indirection, StrategyKind::Direct]);
    assert_eq!(settings.compiler_flags, vec!["-g", "-O0", "-Wall"]);
    assert!(settings.still_reachable_is_leak);
    assert_eq!(settings.output_format, OutputFormat::Text);
}

#[test]
fn test_unknown_strategy_is_a_parse_error() {
    let err = parse_config_content("strategies = [\"ssh\"]", "bad.toml").unwrap_err();
    assert!(matches!(err, LeakscopeError::ConfigParse { .. }));
}

#[test]
fn test_default_template_matches_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(".leakscope.toml");
    create_default_config(&path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let settings = ConfigBuilder::new()
        .merge(parse_config_content(&content, &path).unwrap())
        .build()
        .unwrap();

    assert_eq!(settings, leakscope::Settings::default());
}
