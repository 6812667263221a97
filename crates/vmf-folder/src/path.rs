//! Inventory path resolver.
//!
//! Declarative parent paths are relative to a datacenter's `vm` folder and
//! always carry exactly one leading slash and no trailing slash (`/` is the
//! root). Inventory lookups use `<datacenter>/vm<parent>`.
//!
//! The canonical form is re-derived on every conversion so a stored value and
//! an observed value can only be compared after both went through
//! [`normalize_parent`].

/// Name of the datacenter folder that holds virtual machines.
pub const VM_ROOT: &str = "vm";

/// Canonical declarative form: one leading slash, no trailing slash, empty
/// segments dropped.
///
/// `""`, `"/"` and `"//"` all become `"/"`; `"eng/ci/"` becomes `"/eng/ci"`.
pub fn normalize_parent(raw: &str) -> String {
    let segments: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

/// Lookup path for a parent folder, e.g. `("DC1", "/eng")` → `DC1/vm/eng`.
pub fn to_fully_qualified(datacenter: &str, parent: &str) -> String {
    let parent = normalize_parent(parent);
    if parent == "/" {
        format!("{datacenter}/{VM_ROOT}")
    } else {
        format!("{datacenter}/{VM_ROOT}{parent}")
    }
}

/// Convert an observed inventory path back to declarative form.
///
/// Accepts paths with or without a leading slash (`/DC1/vm/eng` or
/// `DC1/vm/eng`). Returns `None` when the path is not under the datacenter's
/// `vm` folder.
pub fn to_declarative(observed: &str, datacenter: &str) -> Option<String> {
    let trimmed = observed.trim_start_matches('/');
    let prefix = format!("{datacenter}/{VM_ROOT}");
    let rest = trimmed.strip_prefix(prefix.as_str())?;
    // "/DC1/vmware" must not match the "DC1/vm" prefix.
    if !rest.is_empty() && !rest.starts_with('/') {
        return None;
    }
    Some(normalize_parent(rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_adds_leading_and_strips_trailing_slash() {
        assert_eq!(normalize_parent("eng"), "/eng");
        assert_eq!(normalize_parent("/eng/"), "/eng");
        assert_eq!(normalize_parent("eng/ci"), "/eng/ci");
        assert_eq!(normalize_parent("//eng//ci//"), "/eng/ci");
    }

    #[test]
    fn empty_segments_mean_root() {
        assert_eq!(normalize_parent(""), "/");
        assert_eq!(normalize_parent("/"), "/");
        assert_eq!(normalize_parent("///"), "/");
    }

    #[test]
    fn fully_qualified_matches_lookup_convention() {
        assert_eq!(to_fully_qualified("DC1", "/eng"), "DC1/vm/eng");
        assert_eq!(to_fully_qualified("DC1", "/eng/ci"), "DC1/vm/eng/ci");
        assert_eq!(to_fully_qualified("DC1", "/"), "DC1/vm");
        assert_eq!(to_fully_qualified("DC1", "eng/"), "DC1/vm/eng");
    }

    #[test]
    fn declarative_strips_datacenter_prefix() {
        assert_eq!(to_declarative("/DC1/vm/eng", "DC1").as_deref(), Some("/eng"));
        assert_eq!(to_declarative("DC1/vm/eng/ci", "DC1").as_deref(), Some("/eng/ci"));
        assert_eq!(to_declarative("/DC1/vm", "DC1").as_deref(), Some("/"));
        assert_eq!(to_declarative("/DC1/vm/", "DC1").as_deref(), Some("/"));
    }

    #[test]
    fn declarative_rejects_foreign_paths() {
        assert_eq!(to_declarative("/DC2/vm/eng", "DC1"), None);
        assert_eq!(to_declarative("/DC1/vmware/eng", "DC1"), None);
        assert_eq!(to_declarative("/DC1/host/eng", "DC1"), None);
    }

    #[test]
    fn round_trip_is_identity_for_normalized_paths() {
        let samples = ["/", "/eng", "/eng/ci", "/a/b/c/d", "/with space", "/ünïcode/x"];
        for dc in ["DC1", "Lab DC"] {
            for p in samples {
                let fq = to_fully_qualified(dc, p);
                assert_eq!(
                    to_declarative(&fq, dc).as_deref(),
                    Some(p),
                    "round trip failed for dc={dc} parent={p}"
                );
                assert_eq!(
                    to_declarative(&format!("/{fq}"), dc).as_deref(),
                    Some(p),
                    "round trip failed for absolute path of dc={dc} parent={p}"
                );
            }
        }
    }
}
