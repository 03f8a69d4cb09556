//! Path-addressed reads and writes on JSON resource documents.
//!
//! Every function takes a [`Path`] and the root JSON object of a resource.
//! Arrays met before the last path element fan out over their elements, and
//! value filters select among the elements of multi-valued attributes.
//! Attribute names are matched case-insensitively; writes keep the spelling
//! of an existing key.
//!
//! A path qualified by a schema URN addresses the extension object stored
//! under that URN. Core schema URNs, and URNs without an extension object,
//! address the top level of the resource.
//!
//! ```rust
//! use scim_path::{Path, accessor};
//! use serde_json::json;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut user = json!({
//!         "emails": [
//!             {"type": "work", "value": "bjensen@example.com"},
//!             {"type": "home", "value": "babs@example.org"}
//!         ]
//!     });
//!
//!     let work: Path = r#"emails[type eq "work"].value"#.parse()?;
//!     assert_eq!(accessor::get_values(&work, &user)?, vec![json!("bjensen@example.com")]);
//!
//!     accessor::replace_value(&work, &mut user, json!("barbara@example.com"))?;
//!     accessor::add_values(&"nickNames".parse::<Path>()?, &mut user, json!("Babs"))?;
//!     assert_eq!(user["nickNames"], json!(["Babs"]));
//!     Ok(())
//! }
//! ```

use crate::error::{ScimError, ScimResult};
use crate::evaluator::FilterEvaluator;
use crate::path::{Element, Path};
use log::trace;
use serde_json::{Map, Value};

type Object = Map<String, Value>;

/// All values addressed by `path`.
///
/// An unfiltered multi-valued attribute at the end of the path comes back as
/// one array value; a filtered one yields each matching element separately.
/// Missing attributes produce an empty result.
pub fn get_values(path: &Path, root: &Value) -> ScimResult<Vec<Value>> {
    get_values_with(&FilterEvaluator::default(), path, root)
}

/// The single value addressed by `path`, or `None` if there is none.
///
/// Fails with [`ScimError::Ambiguous`] if the path addresses several values.
pub fn get_value(path: &Path, root: &Value) -> ScimResult<Option<Value>> {
    let mut values = get_values(path, root)?;
    if values.len() > 1 {
        return Err(ScimError::ambiguous(format!(
            "Path '{}' matches {} values",
            path,
            values.len()
        )));
    }
    Ok(values.pop())
}

/// Replace the value(s) addressed by `path`.
///
/// Missing intermediate objects are created. When both the existing value and
/// `value` are objects the supplied sub-attributes are merged in and the
/// others are left alone. A value filter that matches nothing is a
/// [`ScimError::NoTarget`] error.
pub fn replace_value(path: &Path, root: &mut Value, value: Value) -> ScimResult<()> {
    replace_value_with(&FilterEvaluator::default(), path, root, value)
}

/// Add `values` to the multi-valued attribute addressed by `path`.
///
/// A non-array `values` is treated as a single value. The attribute is
/// created if absent, and values already present are skipped.
pub fn add_values(path: &Path, root: &mut Value, values: Value) -> ScimResult<()> {
    add_values_with(&FilterEvaluator::default(), path, root, values)
}

/// Remove the value(s) addressed by `path` and return them.
///
/// Removing something that does not exist is not an error. A multi-valued
/// attribute emptied by a filtered removal is removed from its parent.
pub fn remove_values(path: &Path, root: &mut Value) -> ScimResult<Vec<Value>> {
    remove_values_with(&FilterEvaluator::default(), path, root)
}

pub(crate) fn get_values_with(
    evaluator: &FilterEvaluator,
    path: &Path,
    root: &Value,
) -> ScimResult<Vec<Value>> {
    trace!("Getting values at '{}'", path);
    let nodes = select(evaluator, path, root, &Path::root())?;
    Ok(nodes.into_iter().cloned().collect())
}

/// References to the nodes addressed by `path`. `prefix` is the path of
/// `root` itself, used to resolve case-exact attributes in value filters.
pub(crate) fn select<'a>(
    evaluator: &FilterEvaluator,
    path: &Path,
    root: &'a Value,
    prefix: &Path,
) -> ScimResult<Vec<&'a Value>> {
    let mut nodes = vec![read_base(path, root)];
    let mut prefix = prefix.clone();
    let last = path.size().saturating_sub(1);

    for (i, element) in path.elements().iter().enumerate() {
        prefix = prefix.child(element.attribute());
        let mut next = Vec::new();

        for node in nodes {
            let Some(child) = node.as_object().and_then(|o| lookup(o, element.attribute())) else {
                continue;
            };
            match (child, element.value_filter()) {
                (Value::Null, _) => {}
                (Value::Array(items), Some(filter)) => {
                    for item in items {
                        if evaluator.matches_element(filter, item, &prefix)? {
                            next.push(item);
                        }
                    }
                }
                (Value::Array(items), None) if i < last => next.extend(items.iter()),
                (other, Some(filter)) => {
                    if evaluator.matches_element(filter, other, &prefix)? {
                        next.push(other);
                    }
                }
                (other, None) => next.push(other),
            }
        }

        nodes = next;
    }

    Ok(nodes)
}

pub(crate) fn replace_value_with(
    evaluator: &FilterEvaluator,
    path: &Path,
    root: &mut Value,
    value: Value,
) -> ScimResult<()> {
    trace!("Replacing value at '{}'", path);
    let object = root_object(root)?;
    let base = write_base(path, object, true)?;

    let Some((leaf, parents)) = path.elements().split_last() else {
        let Value::Object(fields) = &value else {
            return Err(ScimError::invalid_value(
                "Replacing the root of a resource requires a JSON object",
            ));
        };
        merge_objects(base, fields);
        return Ok(());
    };

    let mut replaced = 0usize;
    let mut action = |parent: &mut Object, prefix: &Path| -> ScimResult<()> {
        let name = leaf.attribute();
        let Some(filter) = leaf.value_filter() else {
            let key = find_key(parent, name).unwrap_or_else(|| name.to_string());
            match parent.get_mut(&key) {
                Some(existing) => replace_in_place(existing, &value),
                None => {
                    parent.insert(key, value.clone());
                }
            }
            replaced += 1;
            return Ok(());
        };

        let prefix = prefix.child(name);
        let Some(key) = find_key(parent, name) else {
            return Ok(());
        };
        let Some(child) = parent.get_mut(&key) else {
            return Ok(());
        };
        match child {
            Value::Array(items) => {
                for item in items.iter_mut() {
                    if evaluator.matches_element(filter, item, &prefix)? {
                        replace_in_place(item, &value);
                        replaced += 1;
                    }
                }
            }
            Value::Null => {}
            other => {
                if evaluator.matches_element(filter, other, &prefix)? {
                    replace_in_place(other, &value);
                    replaced += 1;
                }
            }
        }
        Ok(())
    };

    walk_parents(evaluator, base, parents, &Path::root(), true, &mut action)?;

    if replaced > 0 {
        return Ok(());
    }
    // Nothing was reached: a filter matched nothing, or every parent along
    // the path is an empty or scalar-only array.
    Err(ScimError::no_target(match leaf.value_filter() {
        Some(_) => format!("The value filter in path '{}' matched no values", path),
        None => format!("Path '{}' reaches no complex values to replace", path),
    }))
}

pub(crate) fn add_values_with(
    evaluator: &FilterEvaluator,
    path: &Path,
    root: &mut Value,
    values: Value,
) -> ScimResult<()> {
    trace!("Adding values at '{}'", path);
    let Some((leaf, parents)) = path.elements().split_last() else {
        return Err(ScimError::invalid_path(
            "Values cannot be added to the root of a resource",
        ));
    };
    if leaf.value_filter().is_some() {
        return Err(ScimError::invalid_path(format!(
            "Path '{}' must not end with a value filter when adding values",
            path
        )));
    }

    let values = match values {
        Value::Array(values) => values,
        other => vec![other],
    };
    let object = root_object(root)?;
    let base = write_base(path, object, true)?;

    let mut action = |parent: &mut Object, _prefix: &Path| -> ScimResult<()> {
        let name = leaf.attribute();
        let key = find_key(parent, name).unwrap_or_else(|| name.to_string());
        match parent.get_mut(&key) {
            Some(Value::Array(existing)) => append_distinct(existing, &values),
            None | Some(Value::Null) => {
                let mut created = Vec::with_capacity(values.len());
                append_distinct(&mut created, &values);
                parent.insert(key, Value::Array(created));
            }
            Some(_) => {
                return Err(ScimError::invalid_value(format!(
                    "Attribute '{}' is not multi-valued",
                    path
                )));
            }
        }
        Ok(())
    };

    walk_parents(evaluator, base, parents, &Path::root(), true, &mut action)
}

pub(crate) fn remove_values_with(
    evaluator: &FilterEvaluator,
    path: &Path,
    root: &mut Value,
) -> ScimResult<Vec<Value>> {
    trace!("Removing values at '{}'", path);
    let object = root_object(root)?;

    let Some((leaf, parents)) = path.elements().split_last() else {
        return remove_extension(path, object);
    };
    let base = write_base(path, object, false)?;

    let mut removed = Vec::new();
    let mut action = |parent: &mut Object, prefix: &Path| -> ScimResult<()> {
        let name = leaf.attribute();
        let Some(key) = find_key(parent, name) else {
            return Ok(());
        };
        let Some(filter) = leaf.value_filter() else {
            if let Some(value) = parent.shift_remove(&key) {
                removed.push(value);
            }
            return Ok(());
        };

        let prefix = prefix.child(name);
        let emptied = match parent.get_mut(&key) {
            Some(Value::Array(items)) => {
                let matched = items
                    .iter()
                    .map(|item| evaluator.matches_element(filter, item, &prefix))
                    .collect::<ScimResult<Vec<bool>>>()?;
                let mut kept = Vec::with_capacity(items.len());
                for (item, matched) in std::mem::take(items).into_iter().zip(matched) {
                    if matched {
                        removed.push(item);
                    } else {
                        kept.push(item);
                    }
                }
                *items = kept;
                items.is_empty()
            }
            Some(Value::Null) | None => false,
            Some(other) => evaluator.matches_element(filter, other, &prefix)?,
        };

        if emptied {
            if let Some(value) = parent.shift_remove(&key) {
                // A removed single value is reported; an emptied array is not.
                if !value.is_array() {
                    removed.push(value);
                }
            }
        }
        Ok(())
    };

    walk_parents(evaluator, base, parents, &Path::root(), false, &mut action)?;
    Ok(removed)
}

/// A root path is only removable when it names an extension object.
fn remove_extension(path: &Path, object: &mut Object) -> ScimResult<Vec<Value>> {
    let Some(urn) = path.schema_urn() else {
        return Err(ScimError::invalid_path(
            "The root of a resource cannot be removed",
        ));
    };
    let key = object.keys().find(|key| urn.matches(key)).cloned();
    Ok(key
        .and_then(|key| object.shift_remove(&key))
        .into_iter()
        .collect())
}

/// Calls `action` on every object that holds the attribute named by the
/// last path element, walking `elements` from `object`.
///
/// With `create`, missing intermediate objects are added and a value filter
/// that matches nothing is a [`ScimError::NoTarget`] error. Without it,
/// anything missing is skipped.
fn walk_parents(
    evaluator: &FilterEvaluator,
    object: &mut Object,
    elements: &[Element],
    prefix: &Path,
    create: bool,
    action: &mut dyn FnMut(&mut Object, &Path) -> ScimResult<()>,
) -> ScimResult<()> {
    let Some((element, rest)) = elements.split_first() else {
        return action(object, prefix);
    };
    let name = element.attribute();
    let filter = element.value_filter();
    let prefix = prefix.child(name);

    let key = match find_key(object, name) {
        Some(key) => key,
        None if create && filter.is_none() => {
            object.insert(name.to_string(), Value::Object(Map::new()));
            name.to_string()
        }
        None => return missing_target(element, create),
    };
    let Some(child) = object.get_mut(&key) else {
        return Ok(());
    };
    if child.is_null() {
        if !create || filter.is_some() {
            return missing_target(element, create);
        }
        *child = Value::Object(Map::new());
    }

    match child {
        Value::Object(_) => {
            if let Some(filter) = filter {
                if !evaluator.matches_element(filter, child, &prefix)? {
                    return missing_target(element, create);
                }
            }
            match child {
                Value::Object(inner) => walk_parents(evaluator, inner, rest, &prefix, create, action),
                _ => Ok(()),
            }
        }
        Value::Array(items) => {
            let mut found = false;
            for item in items.iter_mut() {
                if let Some(filter) = filter {
                    if !evaluator.matches_element(filter, item, &prefix)? {
                        continue;
                    }
                }
                if let Value::Object(inner) = item {
                    found = true;
                    walk_parents(evaluator, inner, rest, &prefix, create, action)?;
                }
            }
            if filter.is_some() && !found {
                return missing_target(element, create);
            }
            Ok(())
        }
        _ if create => Err(ScimError::invalid_path(format!(
            "Attribute '{}' is not a complex attribute",
            name
        ))),
        _ => Ok(()),
    }
}

fn missing_target(element: &Element, create: bool) -> ScimResult<()> {
    if create && element.value_filter().is_some() {
        return Err(ScimError::no_target(format!(
            "No values match '{}'",
            element
        )));
    }
    Ok(())
}

fn root_object(root: &mut Value) -> ScimResult<&mut Object> {
    root.as_object_mut()
        .ok_or_else(|| ScimError::invalid_value("The resource must be a JSON object"))
}

/// The node a path is read from: the extension object keyed by the path's
/// schema URN when there is one, otherwise the document itself.
fn read_base<'a>(path: &Path, root: &'a Value) -> &'a Value {
    if let (Some(urn), Value::Object(object)) = (path.schema_urn(), root) {
        if let Some((_, extension)) = object.iter().find(|(key, _)| urn.matches(key)) {
            return extension;
        }
    }
    root
}

/// The object a path is written to. With `create`, a missing extension object
/// for a non-core schema URN is added.
fn write_base<'a>(path: &Path, root: &'a mut Object, create: bool) -> ScimResult<&'a mut Object> {
    let Some(urn) = path.schema_urn() else {
        return Ok(root);
    };
    let existing = root.keys().find(|key| urn.matches(key)).cloned();
    let key = match existing {
        Some(key) => key,
        None if create && !urn.is_core() => urn.as_str().to_string(),
        None => return Ok(root),
    };

    let extension = root
        .entry(key)
        .or_insert_with(|| Value::Object(Map::new()));
    if create && extension.is_null() {
        *extension = Value::Object(Map::new());
    }
    extension.as_object_mut().ok_or_else(|| {
        ScimError::invalid_value(format!("Extension '{}' is not a JSON object", urn))
    })
}

pub(crate) fn lookup<'a>(object: &'a Object, name: &str) -> Option<&'a Value> {
    object.get(name).or_else(|| {
        object
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

/// The existing key spelling for `name`, preferring an exact match.
fn find_key(object: &Object, name: &str) -> Option<String> {
    if object.contains_key(name) {
        return Some(name.to_string());
    }
    object
        .keys()
        .find(|key| key.eq_ignore_ascii_case(name))
        .cloned()
}

fn replace_in_place(target: &mut Value, value: &Value) {
    match (target, value) {
        (Value::Object(existing), Value::Object(fields)) => merge_objects(existing, fields),
        (target, value) => *target = value.clone(),
    }
}

fn merge_objects(target: &mut Object, fields: &Object) {
    for (name, value) in fields {
        let key = find_key(target, name).unwrap_or_else(|| name.clone());
        match target.get_mut(&key) {
            Some(existing) => replace_in_place(existing, value),
            None => {
                target.insert(key, value.clone());
            }
        }
    }
}

fn append_distinct(existing: &mut Vec<Value>, values: &[Value]) {
    for value in values {
        if !existing.contains(value) {
            existing.push(value.clone());
        }
    }
}
