//! Config consumption map + unused-key guard.
//!
//! "Consumed pointers" are JSON Pointer prefixes. A leaf under any consumed
//! prefix is consumed; anything else is reported as unused. Callers decide
//! whether that is a warning or an error.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    /// Consumed JSON-pointer prefixes used for this analysis (sorted, unique)
    pub consumed_prefixes: Vec<String>,
    /// Unused leaf pointers (sorted)
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// Pointers read by [`crate::DriverConfig::from_loaded`]. Keep in step with
/// that function: a key listed here must actually be read.
pub fn consumed_pointers() -> &'static [&'static str] {
    &[
        "/driver/default_datacenter",
        "/driver/call_timeout_secs",
        "/folders",
    ]
}

/// Produce an unused-key report.
/// With `UnusedKeyPolicy::Fail`, unused keys are an error.
pub fn report_unused_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let consumed: BTreeSet<String> = consumed_pointers()
        .iter()
        .map(|p| normalize_pointer(p))
        .collect();
    let consumed_prefixes: Vec<String> = consumed.into_iter().collect();

    let mut leaves: Vec<String> = Vec::new();
    collect_leaf_pointers(config_json, "", &mut leaves);

    let mut unused: Vec<String> = leaves
        .into_iter()
        .filter(|leaf| !consumed_prefixes.iter().any(|cp| is_prefix_pointer(cp, leaf)))
        .collect();
    unused.sort();
    unused.dedup();

    let report = UnusedKeyReport {
        consumed_prefixes,
        unused_leaf_pointers: unused,
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        bail!(
            "CONFIG_UNUSED_KEYS: {} unused config leaf key(s) detected. \
            Remove them or update the consumed registry. First few: {}",
            report.unused_leaf_pointers.len(),
            preview_list(&report.unused_leaf_pointers, 12)
        );
    }

    Ok(report)
}

/// Leading "/" required; no trailing "/" unless the pointer is just "/".
fn normalize_pointer(p: &str) -> String {
    let mut s = p.trim().to_string();
    if s.is_empty() {
        return "/".to_string();
    }
    if !s.starts_with('/') {
        s.insert(0, '/');
    }
    while s.ends_with('/') && s.len() > 1 {
        s.pop();
    }
    s
}

/// "/a/b" consumes "/a/b" and "/a/b/c" but not "/a/bc". "/" consumes all.
fn is_prefix_pointer(prefix: &str, leaf: &str) -> bool {
    if prefix == "/" || leaf == prefix {
        return true;
    }
    leaf.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with('/'))
}

fn collect_leaf_pointers(v: &Value, prefix: &str, out: &mut Vec<String>) {
    match v {
        Value::Object(map) => {
            for (k, vv) in map.iter() {
                let next = format!("{}/{}", prefix, escape_pointer_token(k));
                collect_leaf_pointers(vv, &next, out);
            }
        }
        Value::Array(arr) => {
            for (i, vv) in arr.iter().enumerate() {
                let next = format!("{}/{}", prefix, i);
                collect_leaf_pointers(vv, &next, out);
            }
        }
        _ => {
            let p = if prefix.is_empty() {
                "/".to_string()
            } else {
                prefix.to_string()
            };
            out.push(p);
        }
    }
}

fn escape_pointer_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}

fn preview_list(items: &[String], n: usize) -> String {
    let take = items.iter().take(n).cloned().collect::<Vec<_>>();
    format!("{:?}", take)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_requires_segment_boundary() {
        assert!(is_prefix_pointer("/folders", "/folders/build/name"));
        assert!(is_prefix_pointer("/folders", "/folders"));
        assert!(!is_prefix_pointer("/folders", "/folders_old/x"));
        assert!(is_prefix_pointer("/", "/anything"));
    }

    #[test]
    fn pointer_tokens_are_escaped() {
        let v = serde_json::json!({"a/b": {"c~d": 1}});
        let mut out = Vec::new();
        collect_leaf_pointers(&v, "", &mut out);
        assert_eq!(out, vec!["/a~1b/c~0d".to_string()]);
    }

    #[test]
    fn normalize_pointer_adds_leading_and_strips_trailing_slash() {
        assert_eq!(normalize_pointer("driver/"), "/driver");
        assert_eq!(normalize_pointer(""), "/");
        assert_eq!(normalize_pointer("/"), "/");
    }
}
