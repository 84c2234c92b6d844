use super::*;

// =============================================================================
// parse_base_url
// =============================================================================

#[test]
fn base_url_defaults_to_localhost() {
    assert_eq!(parse_base_url(None).unwrap(), DEFAULT_BASE_URL);
}

#[test]
fn base_url_trims_trailing_slashes() {
    assert_eq!(parse_base_url(Some("https://kb.example.com//")).unwrap(), "https://kb.example.com");
}

#[test]
fn base_url_rejects_missing_scheme() {
    let err = parse_base_url(Some("kb.example.com")).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { var: "KB_BASE_URL", .. }));
}

// =============================================================================
// normalize_prefix
// =============================================================================

#[test]
fn prefix_defaults_to_api() {
    assert_eq!(normalize_prefix(None), "/api");
}

#[test]
fn prefix_gains_leading_slash_and_loses_trailing() {
    assert_eq!(normalize_prefix(Some("backend/api/")), "/backend/api");
}

#[test]
fn prefix_may_be_empty() {
    assert_eq!(normalize_prefix(Some("/")), "");
    assert_eq!(normalize_prefix(Some("")), "");
}

// =============================================================================
// env_parse_u64: unique env var names avoid races with parallel tests.
// =============================================================================

#[test]
fn env_u64_parses_value() {
    let key = "__TEST_KB_U64_OK_3141__";
    unsafe { std::env::set_var(key, " 1500 ") };
    assert_eq!(env_parse_u64(key, 7), 1500);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_u64_falls_back_on_garbage() {
    let key = "__TEST_KB_U64_BAD_2718__";
    unsafe { std::env::set_var(key, "soon") };
    assert_eq!(env_parse_u64(key, 7), 7);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_u64_unset_uses_default() {
    assert_eq!(env_parse_u64("__TEST_KB_U64_SURELY_UNSET_1618__", 42), 42);
}

// =============================================================================
// paths
// =============================================================================

#[test]
fn credentials_path_under_home() {
    assert_eq!(
        default_credentials_path(Some("/home/ada")),
        PathBuf::from("/home/ada/.kb/credentials.json")
    );
}

#[test]
fn credentials_path_without_home_is_local() {
    assert_eq!(default_credentials_path(None), PathBuf::from(".kb-credentials.json"));
    assert_eq!(default_credentials_path(Some("")), PathBuf::from(".kb-credentials.json"));
}

#[test]
fn api_root_joins_base_and_prefix() {
    let config = ClientConfig {
        base_url: "https://kb.example.com".into(),
        api_prefix: "/api".into(),
        ..ClientConfig::default()
    };
    assert_eq!(config.api_root(), "https://kb.example.com/api");
}
