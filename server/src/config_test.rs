use std::collections::HashMap;

use super::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key: &str| map.get(key).cloned()
}

// =============================================================================
// parse_bool / env_parse
// =============================================================================

#[test]
fn parse_bool_true_variants() {
    for val in ["1", "true", "yes", "on", "TRUE", "On", "  true  "] {
        assert_eq!(parse_bool(val), Some(true), "expected true for {val:?}");
    }
}

#[test]
fn parse_bool_false_variants() {
    for val in ["0", "false", "no", "off", "NO"] {
        assert_eq!(parse_bool(val), Some(false), "expected false for {val:?}");
    }
}

#[test]
fn parse_bool_rejects_other_values() {
    assert_eq!(parse_bool("maybe"), None);
    assert_eq!(parse_bool(""), None);
}

#[test]
fn env_parse_defaults_when_unset_or_malformed() {
    let env = lookup(&[("N", "abc"), ("M", " 7 ")]);
    assert_eq!(env_parse(&env, "UNSET", 3_u32), 3);
    assert_eq!(env_parse(&env, "N", 3_u32), 3);
    assert_eq!(env_parse(&env, "M", 3_u32), 7);
}

// =============================================================================
// ServerConfig
// =============================================================================

#[test]
fn database_url_is_required() {
    let err = ServerConfig::from_lookup(&lookup(&[])).unwrap_err();
    assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
}

#[test]
fn malformed_port_is_an_error() {
    let env = lookup(&[("DATABASE_URL", "postgres://x"), ("PORT", "eighty")]);
    assert!(matches!(ServerConfig::from_lookup(&env), Err(ConfigError::Invalid { key: "PORT", .. })));
}

#[test]
fn defaults_follow_account_policy() {
    let config = ServerConfig::from_lookup(&lookup(&[("DATABASE_URL", "postgres://x")])).unwrap();
    assert_eq!(config.port, 3000);
    assert!(config.accounts.send_verification_email);
    assert!(!config.accounts.forbid_client_account_creation);
    assert_eq!(config.accounts.login_expiration_days, 30);
    assert_eq!(config.rate_limits.login_limit, 5);
    assert_eq!(config.rate_limits.create_user_limit, 3);
    assert_eq!(config.rate_limits.window.as_secs(), 60);
    assert!(config.email.resend_api_key.is_none());
    assert!(!config.cookie_secure);
}

#[test]
fn overrides_are_applied() {
    let env = lookup(&[
        ("DATABASE_URL", "postgres://x"),
        ("PORT", "8080"),
        ("SITE_NAME", "Acme"),
        ("EMAIL_FROM", "Acme <hi@acme.test>"),
        ("RESEND_API_KEY", "re_123"),
        ("PUBLIC_BASE_URL", "https://acme.test/"),
        ("SEND_VERIFICATION_EMAIL", "off"),
        ("FORBID_CLIENT_ACCOUNT_CREATION", "yes"),
        ("LOGIN_EXPIRATION_DAYS", "7"),
        ("RATE_LIMIT_LOGIN", "10"),
    ]);
    let config = ServerConfig::from_lookup(&env).unwrap();
    assert_eq!(config.port, 8080);
    assert_eq!(config.email.site_name, "Acme");
    assert_eq!(config.email.from, "Acme <hi@acme.test>");
    assert_eq!(config.email.resend_api_key.as_deref(), Some("re_123"));
    assert_eq!(config.email.public_base_url, "https://acme.test");
    assert!(!config.accounts.send_verification_email);
    assert!(config.accounts.forbid_client_account_creation);
    assert_eq!(config.accounts.login_expiration_days, 7);
    assert_eq!(config.rate_limits.login_limit, 10);
    // HTTPS origin implies secure cookies unless overridden.
    assert!(config.cookie_secure);
}

#[test]
fn explicit_cookie_secure_wins() {
    let env = lookup(&[
        ("DATABASE_URL", "postgres://x"),
        ("PUBLIC_BASE_URL", "https://acme.test"),
        ("COOKIE_SECURE", "false"),
    ]);
    assert!(!ServerConfig::from_lookup(&env).unwrap().cookie_secure);
}

#[test]
fn non_positive_expiration_falls_back() {
    let env = lookup(&[("DATABASE_URL", "postgres://x"), ("LOGIN_EXPIRATION_DAYS", "0")]);
    assert_eq!(ServerConfig::from_lookup(&env).unwrap().accounts.login_expiration_days, 30);
}

#[test]
fn blank_api_key_is_treated_as_absent() {
    let env = lookup(&[("DATABASE_URL", "postgres://x"), ("RESEND_API_KEY", "   ")]);
    assert!(ServerConfig::from_lookup(&env).unwrap().email.resend_api_key.is_none());
}
