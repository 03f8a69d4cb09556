//! Typed access through `GenericScimResource`.

use crate::common::{fixtures, filter};
use chrono::{TimeZone, Utc};
use scim_path::{GenericScimResource, ScimError};
use serde_json::json;

fn enterprise_user() -> GenericScimResource {
    serde_json::from_value(fixtures::enterprise_user()).unwrap()
}

#[test]
fn test_typed_reads_on_rfc_user() {
    let user = enterprise_user();

    assert_eq!(user.id(), Some("2819c223-7f76-453a-919d-413861904646"));
    assert_eq!(user.external_id(), Some("701984"));
    assert_eq!(user.schemas().len(), 2);
    assert_eq!(user.get_boolean_value("active").unwrap(), Some(true));
    assert_eq!(
        user.get_string_value("urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:manager.displayName")
            .unwrap()
            .as_deref(),
        Some("John Smith")
    );
    assert_eq!(
        user.get_date_time_value("meta.created").unwrap(),
        Some(Utc.with_ymd_and_hms(2010, 1, 23, 4, 56, 22).unwrap())
    );
    assert_eq!(
        user.get_string_values("phoneNumbers.type").unwrap(),
        vec!["work", "mobile"]
    );
    assert_eq!(user.meta().unwrap()["resourceType"], json!("User"));
}

#[test]
fn test_type_mismatches() {
    let user = enterprise_user();

    assert!(matches!(
        user.get_integer_value("userName"),
        Err(ScimError::InvalidValue { .. })
    ));
    assert!(matches!(
        user.get_date_time_value("displayName"),
        Err(ScimError::InvalidValue { .. })
    ));
    assert!(matches!(
        user.get_string_value("emails.value"),
        Err(ScimError::Ambiguous { .. })
    ));
    assert!(user.get_string_value("not valid").is_err());
}

#[test]
fn test_writes_and_matching() {
    let mut user = GenericScimResource::with_schemas(["urn:ietf:params:scim:schemas:core:2.0:User"]);
    user.set_id("1234").unwrap();
    user.replace_value("userName", "babs").unwrap();
    user.add_values("emails", json!([{"type": "work", "value": "babs@example.com"}]))
        .unwrap();
    user.replace_date_time_value("meta.lastModified", Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
        .unwrap();
    user.replace_binary_value("x509Certificates", b"cert").unwrap();

    assert_eq!(user.get_binary_value("x509Certificates").unwrap(), Some(b"cert".to_vec()));
    assert_eq!(user.as_value()["meta"]["lastModified"], json!("2024-03-01T12:00:00Z"));

    assert!(user.matches(&filter(r#"emails[type eq "work"] and meta.lastModified gt "2024-01-01T00:00:00Z""#)).unwrap());
    assert!(!user.matches(&filter("title pr")).unwrap());

    let removed = user.remove_values("emails").unwrap();
    assert_eq!(removed.len(), 1);
    assert_eq!(user.into_value()["id"], json!("1234"));
}

#[test]
fn test_rejects_non_objects() {
    assert!(serde_json::from_value::<GenericScimResource>(json!("user")).is_err());
    assert!(GenericScimResource::try_from(json!([1])).is_err());

    let round_trip = serde_json::to_value(enterprise_user()).unwrap();
    assert_eq!(round_trip, fixtures::enterprise_user());
}

#[test]
fn test_core_accessors_ignore_attribute_case() {
    let user = GenericScimResource::try_from(json!({
        "SCHEMAS": ["urn:ietf:params:scim:schemas:core:2.0:User"],
        "ID": "2819c223",
        "ExternalId": "bjensen",
        "Meta": {"resourceType": "User"}
    }))
    .unwrap();

    assert_eq!(user.id(), Some("2819c223"));
    assert_eq!(user.external_id(), Some("bjensen"));
    assert_eq!(user.schemas(), vec!["urn:ietf:params:scim:schemas:core:2.0:User"]);
    assert_eq!(user.meta().unwrap()["resourceType"], json!("User"));
    assert_eq!(user.get_string_value("id").unwrap(), user.id().map(String::from));
}
