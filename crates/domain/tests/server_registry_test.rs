use dnschat_domain::config::{normalize_server_host, ServerEntry, ServerRegistry};
use dnschat_domain::DnsErrorKind;

#[test]
fn test_default_registry_has_single_default() {
    let registry = ServerRegistry::default();
    let defaults: Vec<_> = registry.entries().iter().filter(|e| e.default).collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(registry.default_entry().host, "ch.at");
    assert!(!registry.default_entry().doh);
}

#[test]
fn test_resolve_none_returns_default() {
    let registry = ServerRegistry::default();
    assert_eq!(registry.resolve(None).unwrap().host, "ch.at");
}

#[test]
fn test_resolve_normalizes_case_and_trailing_dots() {
    let registry = ServerRegistry::default();
    let entry = registry.resolve(Some("  LLM.Pieter.COM.. ")).unwrap();
    assert_eq!(entry.host, "llm.pieter.com");
}

#[test]
fn test_resolve_refuses_unknown_host() {
    let registry = ServerRegistry::default();
    let err = registry.resolve(Some("evil.example")).unwrap_err();
    assert_eq!(err.kind, DnsErrorKind::QueryFailed);
    assert!(err.message.contains("not allowed"));
    assert!(!registry.is_allowed("evil.example"));
}

#[test]
fn test_normalize_server_host_rejects_empty() {
    assert!(normalize_server_host("   ").is_err());
    assert!(normalize_server_host("...").is_err());
    assert_eq!(normalize_server_host("Example.COM...").unwrap(), "example.com");
}

#[test]
fn test_new_rejects_missing_default() {
    let entries = vec![ServerEntry::new("ch.at", "ch.at")];
    assert!(ServerRegistry::new(entries).is_err());
}

#[test]
fn test_new_rejects_duplicates_after_normalization() {
    let mut first = ServerEntry::new("ch.at", "ch.at");
    first.default = true;
    let second = ServerEntry::new("CH.AT.", "again");
    let err = ServerRegistry::new(vec![first, second]).unwrap_err();
    assert!(err.message.contains("Duplicate"));
}
