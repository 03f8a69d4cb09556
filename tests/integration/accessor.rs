//! Path-addressed reads and writes.

use crate::common::{self, fixtures, path, strings};
use scim_path::{ScimError, accessor};
use serde_json::json;

const ENTERPRISE: &str = "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User";

#[test]
fn test_simple_path_get_scenario() {
    common::init_logging();
    let user = fixtures::rfc_examples::user_with_friends();

    let friends = accessor::get_values(&path("friends"), &user).unwrap();
    assert_eq!(friends, vec![json!(["Amy", "Beth", "Carol"])]);

    let beth = accessor::get_values(&path(r#"friends[value eq "Beth"]"#), &user).unwrap();
    assert_eq!(beth, vec![json!("Beth")]);

    assert_eq!(
        accessor::get_value(&path("name"), &user).unwrap(),
        Some(json!("Bob"))
    );
}

#[test]
fn test_complex_value_filter_scenario() {
    let user = fixtures::rfc_examples::user_with_emails();

    let work = accessor::get_values(&path(r#"emails[type eq "work"].value"#), &user).unwrap();
    assert_eq!(work, vec![json!("a@x.com")]);

    let all = accessor::get_values(&path("emails.value"), &user).unwrap();
    assert_eq!(strings(&all), vec!["a@x.com", "b@x.com"]);

    let result = accessor::get_value(&path("emails.value"), &user);
    assert_scim_error!(result, ScimError::Ambiguous { .. });
}

#[test]
fn test_add_vs_replace_scenario() {
    let tags = path("tags");
    let mut document = json!({});

    accessor::add_values(&tags, &mut document, json!("x")).unwrap();
    assert_eq!(document, json!({"tags": ["x"]}));

    accessor::add_values(&tags, &mut document, json!("y")).unwrap();
    assert_eq!(document, json!({"tags": ["x", "y"]}));

    accessor::add_values(&tags, &mut document, json!(["y", "x"])).unwrap();
    assert_eq!(document, json!({"tags": ["x", "y"]}));

    accessor::replace_value(&tags, &mut document, json!(["z"])).unwrap();
    assert_eq!(document, json!({"tags": ["z"]}));
}

#[test]
fn test_removal_is_idempotent() {
    let mut user = fixtures::enterprise_user();
    let work = path(r#"emails[type eq "work"]"#);

    let removed = accessor::remove_values(&work, &mut user).unwrap();
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0]["value"], json!("bjensen@example.com"));

    let snapshot = user.clone();
    let removed = accessor::remove_values(&work, &mut user).unwrap();
    assert!(removed.is_empty());
    assert_eq!(user, snapshot);

    let removed = accessor::remove_values(&path("nickName"), &mut user).unwrap();
    assert_eq!(removed, vec![json!("Babs")]);
    assert!(accessor::remove_values(&path("nickName"), &mut user).unwrap().is_empty());
    assert!(user.get("nickName").is_none());
}

#[test]
fn test_removing_last_element_drops_attribute() {
    let mut user = fixtures::rfc_examples::user_with_emails();
    accessor::remove_values(&path(r#"emails[type eq "work"]"#), &mut user).unwrap();
    accessor::remove_values(&path(r#"emails[type eq "home"]"#), &mut user).unwrap();
    assert_eq!(user, json!({}));
}

#[test]
fn test_remove_sub_attribute_of_filtered_elements() {
    let mut user = fixtures::enterprise_user();
    accessor::remove_values(&path(r#"phoneNumbers[type eq "mobile"].type"#), &mut user).unwrap();

    assert_eq!(user["phoneNumbers"][0]["type"], json!("work"));
    assert_eq!(user["phoneNumbers"][1], json!({"value": "555-555-4444"}));
}

#[test]
fn test_extension_attributes() {
    let mut user = fixtures::rfc_examples::user_minimal();
    let department = path(&format!("{}:department", ENTERPRISE));

    assert!(accessor::get_values(&department, &user).unwrap().is_empty());

    accessor::replace_value(&department, &mut user, json!("Engineering")).unwrap();
    assert_eq!(user[ENTERPRISE]["department"], json!("Engineering"));
    assert_eq!(
        accessor::get_values(&department, &user).unwrap(),
        vec![json!("Engineering")]
    );

    // A core URN addresses the top level.
    let core_user_name = path("urn:ietf:params:scim:schemas:core:2.0:User:userName");
    assert_eq!(
        accessor::get_value(&core_user_name, &user).unwrap(),
        Some(json!("bjensen@example.com"))
    );

    let removed = accessor::remove_values(&path(&format!("{}:", ENTERPRISE)), &mut user).unwrap();
    assert_eq!(removed, vec![json!({"department": "Engineering"})]);
    assert!(user.get(ENTERPRISE).is_none());
}

#[test]
fn test_writes_keep_existing_spelling() {
    let mut user = fixtures::rfc_examples::user_minimal();
    accessor::replace_value(&path("USERNAME"), &mut user, json!("babs")).unwrap();

    assert_eq!(user["userName"], json!("babs"));
    assert!(user.get("USERNAME").is_none());
}

#[test]
fn test_replace_merges_objects() {
    let mut user = fixtures::enterprise_user();
    accessor::replace_value(&path("name"), &mut user, json!({"givenName": "Babs", "nickName": "B"}))
        .unwrap();

    assert_eq!(user["name"]["givenName"], json!("Babs"));
    assert_eq!(user["name"]["familyName"], json!("Jensen"));
    assert_eq!(user["name"]["nickName"], json!("B"));
}

#[test]
fn test_replace_through_filter() {
    let mut group = fixtures::rfc_examples::group_basic();
    let display = path(r#"members[value eq "902c246b-6245-4190-8e05-00816be7344a"].display"#);

    accessor::replace_value(&display, &mut group, json!("Mandy P.")).unwrap();
    assert_eq!(group["members"][1]["display"], json!("Mandy P."));
    assert_eq!(group["members"][0]["display"], json!("Babs Jensen"));

    let missing = path(r#"members[value eq "nobody"].display"#);
    let result = accessor::replace_value(&missing, &mut group, json!("x"));
    assert_scim_error!(result, ScimError::NoTarget { .. });
}

#[test]
fn test_write_errors() {
    let mut user = fixtures::rfc_examples::user_minimal();

    let result = accessor::replace_value(&path("userName.first"), &mut user, json!("x"));
    assert_scim_error!(result, ScimError::InvalidPath { .. });

    let result = accessor::add_values(&path("userName"), &mut user, json!("x"));
    assert_scim_error!(result, ScimError::InvalidValue { .. });

    let result = accessor::remove_values(&path(""), &mut user);
    assert_scim_error!(result, ScimError::InvalidPath { .. });

    let mut not_an_object = json!([1, 2]);
    let result = accessor::replace_value(&path("a"), &mut not_an_object, json!(1));
    assert_scim_error!(result, ScimError::InvalidValue { .. });
}

#[test]
fn test_replace_without_reachable_parent() {
    let mut user = json!({"userName": "bjensen", "emails": []});
    let result = accessor::replace_value(&path("emails.value"), &mut user, json!("x"));
    assert_scim_error!(result, ScimError::NoTarget { .. });
    assert_eq!(user["emails"], json!([]));
}
