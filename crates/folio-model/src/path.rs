//! Dot-path access into JSON maps: `group.field`, `repeater.0.caption`.

use serde_json::{Map, Value};

use crate::error::{ModelError, Result};

pub fn get<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = map.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(inner) => inner.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Sets `value` at `path`, creating intermediate objects as needed.
/// A scalar in the way is replaced by an object.
pub fn set(map: &mut Map<String, Value>, path: &str, value: Value) -> Result<()> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(ModelError::InvalidPath(path.to_string()));
    }
    let Some((last, parents)) = segments.split_last() else {
        return Err(ModelError::InvalidPath(path.to_string()));
    };
    let Some((root, rest)) = parents.split_first() else {
        map.insert(last.to_string(), value);
        return Ok(());
    };

    let mut current = map
        .entry(root.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    for segment in rest {
        current = child_mut(current, segment);
    }
    put(current, last, value);
    Ok(())
}

fn array_index(node: &Value, segment: &str, allow_append: bool) -> Option<usize> {
    match node {
        Value::Array(items) => segment.parse::<usize>().ok().filter(|i| {
            *i < items.len() || (allow_append && *i == items.len())
        }),
        _ => None,
    }
}

fn child_mut<'a>(node: &'a mut Value, segment: &str) -> &'a mut Value {
    let index = array_index(node, segment, false);
    if index.is_none() && !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match (node, index) {
        (Value::Array(items), Some(i)) => &mut items[i],
        (Value::Object(inner), _) => inner
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new())),
        (other, _) => other,
    }
}

fn put(node: &mut Value, key: &str, value: Value) {
    let index = array_index(node, key, true);
    if index.is_none() && !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match (node, index) {
        (Value::Array(items), Some(i)) if i < items.len() => items[i] = value,
        (Value::Array(items), Some(_)) => items.push(value),
        (Value::Object(inner), _) => {
            inner.insert(key.to_string(), value);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_get_nested() {
        let data = map(json!({
            "seo": {"title": "Home"},
            "gallery": [{"caption": "first"}, {"caption": "second"}]
        }));
        assert_eq!(get(&data, "seo.title"), Some(&json!("Home")));
        assert_eq!(get(&data, "gallery.1.caption"), Some(&json!("second")));
        assert_eq!(get(&data, "gallery.5.caption"), None);
        assert_eq!(get(&data, "seo.title.x"), None);
        assert_eq!(get(&data, "missing"), None);
    }

    #[test]
    fn test_set_creates_objects() {
        let mut data = Map::new();
        set(&mut data, "seo.meta.title", json!("Hi")).unwrap();
        assert_eq!(Value::Object(data), json!({"seo": {"meta": {"title": "Hi"}}}));
    }

    #[test]
    fn test_set_into_arrays() {
        let mut data = map(json!({"gallery": [{"caption": "a"}]}));
        set(&mut data, "gallery.0.caption", json!("b")).unwrap();
        set(&mut data, "gallery.1", json!({"caption": "c"})).unwrap();
        assert_eq!(
            data["gallery"],
            json!([{"caption": "b"}, {"caption": "c"}])
        );
    }

    #[test]
    fn test_set_replaces_scalars() {
        let mut data = map(json!({"seo": "plain"}));
        set(&mut data, "seo.title", json!("x")).unwrap();
        assert_eq!(data["seo"], json!({"title": "x"}));
    }

    #[test]
    fn test_set_rejects_empty_segments() {
        let mut data = Map::new();
        assert!(matches!(
            set(&mut data, "seo..title", json!(1)),
            Err(ModelError::InvalidPath(_))
        ));
        assert!(set(&mut data, "", json!(1)).is_err());
        assert!(data.is_empty());
    }
}
