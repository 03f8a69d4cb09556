//! PATCH and Query Walkthrough
//!
//! This example applies a PATCH request to a User resource, then runs a
//! search over a small in-memory collection. Run with `RUST_LOG=debug` to see
//! each PATCH operation as it is applied.

use scim_path::{
    FilterEvaluator, GenericScimResource, Path, PatchRequest, SearchRequest,
    messages::{ErrorResponse, SortOrder},
};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("🩹 SCIM PATCH Walkthrough");
    println!("=========================\n");

    let mut user = GenericScimResource::try_from(json!({
        "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
        "id": "2819c223-7f76-453a-919d-413861904646",
        "userName": "bjensen",
        "name": {"givenName": "Barbara", "familyName": "Jensen"},
        "emails": [
            {"type": "work", "value": "bjensen@example.com", "primary": true},
            {"type": "home", "value": "babs@jensen.org"}
        ],
        "phoneNumbers": [{"type": "fax", "value": "555-555-4444"}]
    }))?;

    let patch: PatchRequest = serde_json::from_value(json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
        "Operations": [
            {"op": "replace", "path": "emails[type eq \"work\"].value", "value": "barbara@example.com"},
            {"op": "add", "value": {
                "nickName": "Babs",
                "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User": {"employeeNumber": "701984"}
            }},
            {"op": "remove", "path": "phoneNumbers[type eq \"fax\"]"}
        ]
    }))?;

    user.apply_patch(&patch)?;
    println!("✅ Patched resource:");
    println!("{}\n", serde_json::to_string_pretty(user.as_value())?);
    println!("   schemas: {:?}\n", user.schemas());

    // A failing request leaves the resource untouched
    let bad: PatchRequest = serde_json::from_value(json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
        "Operations": [
            {"op": "replace", "path": "userName", "value": "babs"},
            {"op": "replace", "path": "addresses[type eq \"work\"].locality", "value": "Hollywood"}
        ]
    }))?;
    if let Err(e) = user.apply_patch(&bad) {
        let body = ErrorResponse::from(&e);
        println!("❌ Rejected PATCH: {}", serde_json::to_string(&body)?);
        println!("   userName is still {:?}\n", user.get_string_value("userName")?);
    }

    println!("🔍 SCIM Query Walkthrough");
    println!("=========================\n");

    let users = vec![
        user.into_value(),
        json!({"userName": "alice", "active": true, "emails": [{"value": "alice@example.com"}]}),
        json!({"userName": "carol", "active": false, "emails": [{"value": "carol@example.org"}]}),
    ];

    let evaluator = FilterEvaluator::default().with_case_exact(Path::parse("userName")?);
    let response = SearchRequest::new()
        .with_filter(r#"emails[value ew "example.com"]"#.parse()?)
        .with_sort_by(Path::parse("userName")?, SortOrder::Descending)
        .with_count(10)
        .apply_with(&evaluator, users)?;

    println!("✅ {} of {} resources matched:", response.items_per_page, response.total_results);
    for resource in &response.resources {
        println!("   - {}", resource["userName"]);
    }

    Ok(())
}
