//! Typed folder declarations from layered config.
//!
//! GREEN when:
//! - Folders without a datacenter inherit driver.default_datacenter.
//! - A folder with neither fails, naming the folder key.
//! - Invalid names are rejected at load time.
//! - Misspelled field keys are rejected, even under a valid folder key.
//! - Declarations iterate in key order.

use std::time::Duration;

use vmf_config::{load_layered_yaml_from_strings, DriverConfig};
use vmf_folder::FolderSpec;

#[test]
fn default_datacenter_fills_missing_datacenter() {
    let yaml = r#"
driver:
  default_datacenter: DC1
  call_timeout_secs: 15
folders:
  build:
    parent: /eng
    name: build
  dr:
    datacenter: DC2
    parent: /
    name: dr
"#;
    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
    let cfg = DriverConfig::from_loaded(&loaded).unwrap();

    assert_eq!(cfg.call_timeout, Some(Duration::from_secs(15)));
    assert_eq!(cfg.folders["build"].spec, FolderSpec::new("DC1", "/eng", "build"));
    assert_eq!(cfg.folders["dr"].spec, FolderSpec::new("DC2", "/", "dr"));
    let keys: Vec<&str> = cfg.folders.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["build", "dr"]);
}

#[test]
fn missing_datacenter_without_default_fails() {
    let yaml = r#"
folders:
  build:
    parent: /eng
    name: build
"#;
    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
    let err = DriverConfig::from_loaded(&loaded).unwrap_err();

    let msg = format!("{err:#}");
    assert!(msg.contains("folders.build"), "got: {msg}");
    assert!(msg.contains("default_datacenter"), "got: {msg}");
}

#[test]
fn slash_in_name_is_rejected() {
    let yaml = r#"
driver:
  default_datacenter: DC1
folders:
  bad:
    parent: /
    name: a/b
"#;
    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
    let err = DriverConfig::from_loaded(&loaded).unwrap_err();

    assert!(format!("{err:#}").contains("folders.bad"));
}

#[test]
fn overlay_can_move_a_declared_folder() {
    let base = r#"
driver:
  default_datacenter: DC1
folders:
  build:
    parent: /eng
    name: build
"#;
    let overlay = r#"
folders:
  build:
    parent: /ops
"#;
    let loaded = load_layered_yaml_from_strings(&[base, overlay]).unwrap();
    let cfg = DriverConfig::from_loaded(&loaded).unwrap();

    assert_eq!(cfg.folders["build"].spec.parent, "/ops");
    assert_eq!(cfg.folders["build"].spec.name, "build");
}

#[test]
fn misspelled_parent_key_is_rejected() {
    let yaml = r#"
driver:
  default_datacenter: DC1
folders:
  build:
    parnet: /eng
    name: build
"#;
    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
    let err = DriverConfig::from_loaded(&loaded).unwrap_err();
    let chain = format!("{err:#}");

    assert!(chain.contains("folders.build"), "{chain}");
    assert!(chain.contains("unknown field `parnet`"), "{chain}");
}
