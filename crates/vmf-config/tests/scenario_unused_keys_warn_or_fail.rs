use vmf_config::{load_layered_yaml_from_strings, report_unused_keys, UnusedKeyPolicy};

/// scenario_unused_keys_warn_or_fail
///
/// Validates:
/// 1) Unused keys are reported under Warn without error.
/// 2) Unused keys fail under Fail.
/// 3) Everything below `/folders` is consumed.
/// 4) Unused pointers come back sorted.

#[test]
fn warn_mode_reports_unused_keys_without_error() {
    let yaml = r#"
driver:
  default_datacenter: DC1
  retries: 3
vcenter:
  host: vc.example.internal
"#;

    let loaded = load_layered_yaml_from_strings(&[yaml]).expect("config load must succeed");
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)
        .expect("warn mode must not error");

    assert!(!report.is_clean());
    assert_eq!(
        report.unused_leaf_pointers,
        vec!["/driver/retries".to_string(), "/vcenter/host".to_string()]
    );
}

#[test]
fn fail_mode_errors_on_unused_keys() {
    let yaml = r#"
driver:
  call_timeout: 30
"#;

    let loaded = load_layered_yaml_from_strings(&[yaml]).expect("config load must succeed");
    let result = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail);

    let msg = format!("{:?}", result.expect_err("fail policy must error"));
    assert!(msg.contains("CONFIG_UNUSED_KEYS"));
    assert!(msg.contains("/driver/call_timeout"));
}

#[test]
fn folders_subtree_is_consumed() {
    let yaml = r#"
driver:
  default_datacenter: DC1
  call_timeout_secs: 10
folders:
  build:
    datacenter: DC2
    parent: /eng
    name: build
"#;

    let loaded = load_layered_yaml_from_strings(&[yaml]).expect("config load must succeed");
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail)
        .expect("fully consumed config must pass under Fail");

    assert!(report.is_clean());
    assert_eq!(report.consumed_prefixes.len(), 3);
}

#[test]
fn deterministic_unused_pointer_ordering() {
    let yaml = r#"
unused:
  b: 2
  a: 1
"#;

    let loaded = load_layered_yaml_from_strings(&[yaml]).expect("config load must succeed");
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)
        .expect("warn mode must not error");

    assert_eq!(
        report.unused_leaf_pointers,
        vec!["/unused/a".to_string(), "/unused/b".to_string()]
    );
}
