//! Shared utility functions for dotkeep crates

use crate::error::{Error, Result};
use camino::Utf8PathBuf;
use serde_json::{Map, Value};

/// Get the user's home directory
///
/// Prefers the HOME environment variable over dirs::home_dir() so that
/// tests and sandboxed shells can redirect every dotkeep path at once.
pub fn get_home_dir() -> Result<Utf8PathBuf> {
    let home = match std::env::var_os("HOME") {
        Some(home) if !home.is_empty() => std::path::PathBuf::from(home),
        _ => dirs::home_dir().ok_or(Error::NoHomeDir)?,
    };

    Utf8PathBuf::try_from(home)
        .map_err(|e| Error::non_utf8_path(e.into_path_buf().display().to_string()))
}

/// Recursively merge `src` into `dest`.
///
/// Keys present in both maps are overwritten by `src`, except when both
/// values are objects, in which case they are merged key by key. Keys only
/// in `dest` are kept.
pub fn recursive_merge(dest: &mut Map<String, Value>, src: &Map<String, Value>) {
    for (key, src_value) in src {
        match (dest.get_mut(key), src_value) {
            (Some(Value::Object(dest_map)), Value::Object(src_map)) => {
                recursive_merge(dest_map, src_map);
            }
            _ => {
                dest.insert(key.clone(), src_value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    #[serial]
    fn test_get_home_dir_from_env() {
        // HOME is typically set in CI/test environments
        if std::env::var("HOME").is_ok() {
            let home = get_home_dir().unwrap();
            assert!(!home.as_str().is_empty());
        }
    }

    #[test]
    fn test_recursive_merge_overrides_scalars() {
        let mut dest = as_map(json!({"name": "default", "keep": 1}));
        let src = as_map(json!({"name": "user"}));

        recursive_merge(&mut dest, &src);

        assert_eq!(Value::Object(dest), json!({"name": "user", "keep": 1}));
    }

    #[test]
    fn test_recursive_merge_nested_objects() {
        let mut dest = as_map(json!({
            "dotkeep": {"os": "linux", "arch": "x86_64"},
            "email": "old@example.com"
        }));
        let src = as_map(json!({
            "dotkeep": {"os": "freebsd", "extra": {"deep": true}},
            "work": false
        }));

        recursive_merge(&mut dest, &src);

        assert_eq!(
            Value::Object(dest),
            json!({
                "dotkeep": {"os": "freebsd", "arch": "x86_64", "extra": {"deep": true}},
                "email": "old@example.com",
                "work": false
            })
        );
    }

    #[test]
    fn test_recursive_merge_object_replaces_scalar() {
        let mut dest = as_map(json!({"git": "git"}));
        let src = as_map(json!({"git": {"command": "/usr/bin/git"}}));

        recursive_merge(&mut dest, &src);

        assert_eq!(dest["git"], json!({"command": "/usr/bin/git"}));
    }
}
