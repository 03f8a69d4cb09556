//! PATCH requests as they arrive over the wire (RFC 7644 Section 3.5.2).

use crate::common::{self, fixtures, path};
use scim_path::messages::{ErrorResponse, PatchOpType, PatchOperation, PatchRequest};
use scim_path::{GenericScimResource, ScimError};
use serde_json::{Value, json};

const ENTERPRISE: &str = "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User";

fn request(operations: Value) -> PatchRequest {
    serde_json::from_value(json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
        "Operations": operations
    }))
    .expect("valid PATCH body")
}

#[test]
fn test_add_members_to_group() {
    common::init_logging();
    let mut group = fixtures::rfc_examples::group_basic();

    request(json!([{
        "op": "add",
        "path": "members",
        "value": [{
            "display": "James Smith",
            "$ref": "https://example.com/v2/Users/08e1d05d-121c-4561-8b96-473d93df9210",
            "value": "08e1d05d-121c-4561-8b96-473d93df9210"
        }]
    }]))
    .apply(&mut group)
    .unwrap();

    let members = group["members"].as_array().unwrap();
    assert_eq!(members.len(), 3);
    assert_eq!(members[2]["display"], json!("James Smith"));
}

#[test]
fn test_add_without_path() {
    let mut user = fixtures::enterprise_user();

    request(json!([{
        "op": "Add",
        "value": {
            "emails": [{"value": "babs@jensen.org", "type": "home"}, {"value": "b@other.org", "type": "other"}],
            "nickname": "Barbie"
        }
    }]))
    .apply(&mut user)
    .unwrap();

    // The duplicate home address is not added twice.
    assert_eq!(user["emails"].as_array().unwrap().len(), 3);
    assert_eq!(user["nickName"], json!("Barbie"));
    assert!(user.get("nickname").is_none());
}

#[test]
fn test_remove_single_member() {
    let mut group = fixtures::rfc_examples::group_basic();

    request(json!([{
        "op": "remove",
        "path": "members[value eq \"2819c223-7f76-453a-919d-413861904646\"]"
    }]))
    .apply(&mut group)
    .unwrap();

    let members = group["members"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["display"], json!("Mandy Pepperidge"));
}

#[test]
fn test_remove_all_members_then_add() {
    let mut group = fixtures::rfc_examples::group_basic();

    request(json!([
        {"op": "remove", "path": "members"},
        {"op": "add", "path": "members", "value": [{"value": "08e1d05d", "display": "James Smith"}]}
    ]))
    .apply(&mut group)
    .unwrap();

    assert_eq!(group["members"], json!([{"value": "08e1d05d", "display": "James Smith"}]));
}

#[test]
fn test_replace_examples() {
    let mut user = fixtures::enterprise_user();

    request(json!([
        {
            "op": "replace",
            "path": "addresses[type eq \"work\"]",
            "value": {"streetAddress": "911 Universal City Plaza", "primary": true}
        },
        {
            "op": "replace",
            "path": "emails[type eq \"work\"].value",
            "value": "barbara@example.com"
        },
        {
            "op": "replace",
            "value": {"userName": "babs", ENTERPRISE: {"department": "Marketing"}}
        }
    ]))
    .apply(&mut user)
    .unwrap();

    assert_eq!(user["addresses"][0]["streetAddress"], json!("911 Universal City Plaza"));
    assert_eq!(user["addresses"][0]["locality"], json!("Hollywood"));
    assert_eq!(user["emails"][0]["value"], json!("barbara@example.com"));
    assert_eq!(user["userName"], json!("babs"));
    assert_eq!(user[ENTERPRISE]["department"], json!("Marketing"));
    assert_eq!(user[ENTERPRISE]["costCenter"], json!("4130"));
    assert_eq!(user["schemas"].as_array().unwrap().len(), 2);
}

#[test]
fn test_failed_request_leaves_resource_unchanged() {
    let mut user = fixtures::enterprise_user();
    let original = user.clone();

    let err = request(json!([
        {"op": "replace", "path": "displayName", "value": "Babs"},
        {"op": "replace", "path": "phoneNumbers[type eq \"fax\"].value", "value": "555-555-0000"}
    ]))
    .apply(&mut user)
    .unwrap_err();

    assert!(matches!(err, ScimError::NoTarget { .. }));
    assert_eq!(user, original);

    let body = serde_json::to_value(ErrorResponse::from(&err)).unwrap();
    assert_eq!(body["status"], json!("400"));
    assert_eq!(body["scimType"], json!("noTarget"));
    assert_eq!(
        body["schemas"],
        json!(["urn:ietf:params:scim:api:messages:2.0:Error"])
    );
}

#[test]
fn test_malformed_requests() {
    let unsupported = serde_json::from_value::<PatchRequest>(json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
        "Operations": [{"op": "move", "path": "title"}]
    }));
    assert!(unsupported.is_err());

    let bad_path = serde_json::from_value::<PatchRequest>(json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
        "Operations": [{"op": "remove", "path": "emails[type eq]"}]
    }));
    assert!(bad_path.is_err());

    let mut user = fixtures::rfc_examples::user_minimal();
    let missing_value = request(json!([{"op": "replace", "path": "title"}])).apply(&mut user);
    assert_scim_error!(missing_value, ScimError::InvalidSyntax { .. });

    let pathless_scalar = request(json!([{"op": "add", "value": "Babs"}])).apply(&mut user);
    assert_scim_error!(pathless_scalar, ScimError::InvalidValue { .. });
}

#[test]
fn test_operations_built_in_code() {
    let mut resource = GenericScimResource::try_from(fixtures::rfc_examples::user_minimal()).unwrap();
    let patch = PatchRequest::new(vec![
        PatchOperation::add(Some(path("nickNames")), json!(["Babs"])),
        PatchOperation::replace(Some(path("name.givenName")), json!("Barbara")),
        PatchOperation::remove(path("meta.version")),
    ]);
    assert_eq!(patch.operations[2].op, PatchOpType::Remove);

    resource.apply_patch(&patch).unwrap();

    assert_eq!(resource.get_string_values("nickNames").unwrap(), vec!["Babs"]);
    assert_eq!(resource.get_string_value("name.givenName").unwrap().as_deref(), Some("Barbara"));
    assert!(resource.get_value("meta.version").unwrap().is_none());
    assert_eq!(resource.id(), Some("2819c223-7f76-453a-919d-413861904646"));
}
