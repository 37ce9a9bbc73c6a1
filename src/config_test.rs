use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn from_lookup_defaults() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg.base_url, DEFAULT_API_BASE_URL);
    assert_eq!(cfg.refresh_path, DEFAULT_REFRESH_PATH);
    assert_eq!(cfg.login_path, DEFAULT_LOGIN_PATH);
    assert_eq!(cfg.session_file, PathBuf::from(DEFAULT_SESSION_FILE));
    assert_eq!(cfg.request_timeout_secs, None);
    assert_eq!(cfg.connect_timeout_secs, None);
}

#[test]
fn from_lookup_parses_overrides() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[
        ("STRUCTRA_API_BASE_URL", "https://api.structra.test/v2/"),
        ("STRUCTRA_REFRESH_PATH", "auth/refresh"),
        ("STRUCTRA_LOGIN_PATH", "/auth/login/"),
        ("STRUCTRA_SESSION_FILE", "/tmp/session.json"),
        ("STRUCTRA_REQUEST_TIMEOUT_SECS", "30"),
        ("STRUCTRA_CONNECT_TIMEOUT_SECS", " 5 "),
    ]))
    .unwrap();

    assert_eq!(cfg.base_url, "https://api.structra.test/v2");
    assert_eq!(cfg.refresh_path, "/auth/refresh");
    assert_eq!(cfg.login_path, "/auth/login/");
    assert_eq!(cfg.session_file, PathBuf::from("/tmp/session.json"));
    assert_eq!(cfg.request_timeout_secs, Some(30));
    assert_eq!(cfg.connect_timeout_secs, Some(5));
}

#[test]
fn from_lookup_ignores_unparseable_timeouts() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[("STRUCTRA_REQUEST_TIMEOUT_SECS", "soon")])).unwrap();
    assert_eq!(cfg.request_timeout_secs, None);
}

#[test]
fn from_lookup_rejects_non_http_base_url() {
    let err = ClientConfig::from_lookup(lookup_from(&[("STRUCTRA_API_BASE_URL", "ftp://files")])).unwrap_err();
    assert!(err.to_string().contains("must be an http(s) URL"));
}

#[test]
fn new_rejects_missing_host() {
    let err = ClientConfig::new("https://").unwrap_err();
    assert!(err.to_string().contains("missing a host"));
}

#[test]
fn endpoint_joins_base_and_path() {
    let cfg = ClientConfig::new("http://localhost:8000/api/").unwrap();
    assert_eq!(cfg.endpoint("/workspaces/"), "http://localhost:8000/api/workspaces/");
    assert_eq!(cfg.endpoint("workspaces/"), "http://localhost:8000/api/workspaces/");
    assert_eq!(cfg.refresh_url(), "http://localhost:8000/api/auth/token/refresh/");
    assert_eq!(cfg.login_url(), "http://localhost:8000/api/auth/token/");
}

#[test]
fn endpoint_passes_absolute_urls_through() {
    let cfg = ClientConfig::new("http://localhost:8000/api").unwrap();
    assert_eq!(cfg.endpoint("https://cdn.structra.test/x"), "https://cdn.structra.test/x");
}

#[test]
fn http_client_builds_with_timeouts() {
    let mut cfg = ClientConfig::new("http://localhost:8000").unwrap();
    cfg.request_timeout_secs = Some(3);
    cfg.connect_timeout_secs = Some(1);
    assert!(cfg.http_client().is_ok());
}
