//! Local mirror of a subscribed location, kept current from `put` and `patch`
//! events.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::event_stream::ServerEvent;
use crate::error::{ChatterError, ChatterResult};
use crate::models::Snapshot;

#[derive(Debug, Clone, PartialEq)]
pub enum TreeEvent {
    Put { path: String, data: Value },
    Patch { path: String, data: Value },
    KeepAlive,
    Cancel(String),
    AuthRevoked,
    Other(String),
}

#[derive(Debug, Deserialize)]
struct PathData {
    path: String,
    data: Value,
}

impl TreeEvent {
    pub fn from_server_event(event: &ServerEvent) -> ChatterResult<Self> {
        match event.event.as_str() {
            "put" | "patch" => {
                let payload: PathData = serde_json::from_str(&event.data).map_err(|e| {
                    ChatterError::InvalidPayload(format!("{} event: {}", event.event, e))
                })?;
                if event.event == "put" {
                    Ok(TreeEvent::Put {
                        path: payload.path,
                        data: payload.data,
                    })
                } else {
                    Ok(TreeEvent::Patch {
                        path: payload.path,
                        data: payload.data,
                    })
                }
            }
            "keep-alive" => Ok(TreeEvent::KeepAlive),
            "cancel" => {
                let reason = serde_json::from_str::<String>(&event.data)
                    .unwrap_or_else(|_| event.data.clone());
                Ok(TreeEvent::Cancel(reason))
            }
            "auth_revoked" => Ok(TreeEvent::AuthRevoked),
            other => Ok(TreeEvent::Other(other.to_string())),
        }
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn is_vacant(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn set_at(node: &mut Value, path: &[&str], data: Value) {
    let Some((head, rest)) = path.split_first() else {
        *node = data;
        return;
    };

    if !node.is_object() {
        if data.is_null() {
            return;
        }
        *node = Value::Object(Map::new());
    }

    let emptied = match node {
        Value::Object(map) => {
            let child = map.entry(head.to_string()).or_insert(Value::Null);
            set_at(child, rest, data);
            if is_vacant(child) {
                map.remove(*head);
            }
            map.is_empty()
        }
        _ => false,
    };

    if emptied {
        *node = Value::Null;
    }
}

/// Replace the value at `path`. `null` deletes, and parents left empty
/// disappear with it.
pub fn apply_put(root: &mut Value, path: &str, data: Value) {
    set_at(root, &segments(path), data);
}

/// Merge each child of `data` under `path`.
pub fn apply_patch(root: &mut Value, path: &str, data: Value) -> ChatterResult<()> {
    let Value::Object(children) = data else {
        return Err(ChatterError::InvalidPayload(format!(
            "patch at {} carried a non-object",
            path
        )));
    };

    let base = segments(path);
    for (key, value) in children {
        let mut full = base.clone();
        full.extend(segments(&key));
        set_at(root, &full, value);
    }
    Ok(())
}

pub fn snapshot_from_value(value: &Value) -> Snapshot {
    match value {
        Value::Object(map) if !map.is_empty() => Some(
            map.iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
        ),
        Value::Array(items) => {
            let map: BTreeMap<_, _> = items
                .iter()
                .enumerate()
                .filter(|(_, v)| !v.is_null())
                .map(|(i, v)| (i.to_string(), v.clone()))
                .collect();
            (!map.is_empty()).then_some(map)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_put_root_replaces_everything() {
        let mut root = json!({"old": {"user": "x"}});
        apply_put(&mut root, "/", json!({"a": {"user": "ann"}}));
        assert_eq!(root, json!({"a": {"user": "ann"}}));

        apply_put(&mut root, "/", Value::Null);
        assert_eq!(root, Value::Null);
        assert_eq!(snapshot_from_value(&root), None);
    }

    #[test]
    fn test_put_child_inserts_into_empty_tree() {
        let mut root = Value::Null;
        apply_put(&mut root, "/-Nabc", json!({"user": "bob", "text": "hi"}));

        assert_eq!(root, json!({"-Nabc": {"user": "bob", "text": "hi"}}));
    }

    #[test]
    fn test_put_nested_path() {
        let mut root = json!({"a": {"user": "ann", "text": "yo"}});
        apply_put(&mut root, "/a/text", json!("edited"));

        assert_eq!(root, json!({"a": {"user": "ann", "text": "edited"}}));
    }

    #[test]
    fn test_put_null_deletes_and_prunes() {
        let mut root = json!({"a": {"text": "yo"}, "b": {"text": "hi"}});
        apply_put(&mut root, "/a/text", Value::Null);
        assert_eq!(root, json!({"b": {"text": "hi"}}));

        apply_put(&mut root, "/b", Value::Null);
        assert_eq!(root, Value::Null);
    }

    #[test]
    fn test_put_null_on_missing_path_is_noop() {
        let mut root = json!({"a": 1});
        apply_put(&mut root, "/x/y", Value::Null);
        assert_eq!(root, json!({"a": 1}));
    }

    #[test]
    fn test_patch_merges_children() {
        let mut root = json!({"a": {"user": "ann", "text": "yo"}});
        apply_patch(
            &mut root,
            "/",
            json!({"b": {"user": "bob", "text": "hi"}, "a/text": "edited"}),
        )
        .unwrap();

        assert_eq!(
            root,
            json!({
                "a": {"user": "ann", "text": "edited"},
                "b": {"user": "bob", "text": "hi"}
            })
        );
    }

    #[test]
    fn test_patch_nested_with_null_removes() {
        let mut root = json!({"a": {"user": "ann", "text": "yo"}});
        apply_patch(&mut root, "/a", json!({"text": null, "user": "anna"})).unwrap();
        assert_eq!(root, json!({"a": {"user": "anna"}}));
    }

    #[test]
    fn test_patch_rejects_non_object() {
        let mut root = Value::Null;
        assert!(apply_patch(&mut root, "/", json!(5)).is_err());
    }

    #[test]
    fn test_snapshot_keys_sorted() {
        let root = json!({"b": {"n": 2}, "a": {"n": 1}});
        let snapshot = snapshot_from_value(&root).unwrap();
        let keys: Vec<_> = snapshot.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_snapshot_of_array() {
        let root = json!([null, {"n": 1}]);
        let snapshot = snapshot_from_value(&root).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains_key("1"));
    }

    #[test]
    fn test_tree_event_parsing() {
        let put = ServerEvent::new("put", r#"{"path":"/","data":{"a":1}}"#);
        assert_eq!(
            TreeEvent::from_server_event(&put).unwrap(),
            TreeEvent::Put {
                path: "/".to_string(),
                data: json!({"a": 1})
            }
        );

        let cancel = ServerEvent::new("cancel", r#""Permission denied""#);
        assert_eq!(
            TreeEvent::from_server_event(&cancel).unwrap(),
            TreeEvent::Cancel("Permission denied".to_string())
        );

        let keep = ServerEvent::new("keep-alive", "null");
        assert_eq!(TreeEvent::from_server_event(&keep).unwrap(), TreeEvent::KeepAlive);

        let revoked = ServerEvent::new("auth_revoked", "credential is no longer valid");
        assert_eq!(
            TreeEvent::from_server_event(&revoked).unwrap(),
            TreeEvent::AuthRevoked
        );

        let bad = ServerEvent::new("put", "not json");
        assert!(matches!(
            TreeEvent::from_server_event(&bad),
            Err(ChatterError::InvalidPayload(_))
        ));
    }
}
