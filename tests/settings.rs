//! Settings loading and router assembly.

use std::io::Write;

use translation_router::{BackendKind, Error, RouterSettings};

const SETTINGS: &str = r#"
route:
  primary: deepl-a
  fallback: [deepl-b, google]
  cache_ttl_secs: 3600
cache:
  max_entries: 100
  namespace: tr-test
backends:
  - { id: deepl-a, kind: deepl, api_key: "a:fx", endpoint: "http://127.0.0.1:9" }
  - { id: deepl-b, kind: deepl, api_key_env: SETTINGS_TEST_UNSET_KEY_VAR }
  - { id: google, kind: google, api_key: g, daily_quota: 500000 }
"#;

#[test]
fn test_settings_build_router_and_skip_backends_without_keys() {
    let settings: RouterSettings = serde_yaml::from_str(SETTINGS).unwrap();
    assert_eq!(settings.backends[0].kind, BackendKind::DeepL);

    let router = settings.into_router().unwrap();
    // deepl-b has no key anywhere and is left out
    assert_eq!(router.provider_ids(), vec!["deepl-a", "google"]);
    assert_eq!(router.effective_sequence(), vec!["deepl-a", "google"]);
    assert_eq!(router.config().cache_ttl_secs, 3600);
}

#[test]
fn test_from_path_reads_yaml_file() {
    let path = std::env::temp_dir().join(format!("translate-router-{}.yaml", std::process::id()));
    {
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"route:\n  primary: google\nbackends: []\n").unwrap();
    }
    let settings = RouterSettings::from_path(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(settings.route.primary, "google");
    assert!(settings.route.cache_enabled);
    assert!(settings.backends.is_empty());
}

#[test]
fn test_missing_file_is_configuration_error() {
    let err = RouterSettings::from_path("/nonexistent/router.yaml").unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
}

#[test]
fn test_malformed_yaml_is_settings_error() {
    let err = RouterSettings::from_yaml_str("route: 42\n").unwrap_err();
    assert!(matches!(err, Error::Settings(_)));
}
