//! Test fixtures for resources used across the integration tests.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

/// Cache for loaded fixtures to avoid repeated file I/O
static FIXTURE_CACHE: OnceLock<Mutex<HashMap<String, Value>>> = OnceLock::new();

/// Load a fixture from the fixtures directory with caching
pub fn load_fixture(path: &str) -> Value {
    let cache = FIXTURE_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut cache = cache.lock().unwrap();

    if let Some(cached) = cache.get(path) {
        return cached.clone();
    }

    let fixture_path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), path);
    let content = std::fs::read_to_string(&fixture_path)
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", fixture_path));
    let value: Value = serde_json::from_str(&content)
        .unwrap_or_else(|_| panic!("Failed to parse JSON fixture: {}", fixture_path));

    cache.insert(path.to_string(), value.clone());
    value
}

/// RFC 7643 Section 8.3 - Enterprise User
pub fn enterprise_user() -> Value {
    load_fixture("resources/enterprise_user.json")
}

/// RFC 7643 examples and small documents used by the scenarios
pub mod rfc_examples {
    use serde_json::{Value, json};

    /// RFC 7643 Section 8.1 - Minimal User representation
    pub fn user_minimal() -> Value {
        json!({
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
            "id": "2819c223-7f76-453a-919d-413861904646",
            "userName": "bjensen@example.com",
            "meta": {
                "resourceType": "User",
                "created": "2010-01-23T04:56:22Z",
                "lastModified": "2011-05-13T04:42:34Z",
                "version": "W/\"3694e05e9dff590\"",
                "location": "https://example.com/v2/Users/2819c223-7f76-453a-919d-413861904646"
            }
        })
    }

    /// RFC 7643 Section 8.4 - Group representation
    pub fn group_basic() -> Value {
        json!({
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:Group"],
            "id": "e9e30dba-f08f-4109-8486-d5c6a331660a",
            "displayName": "Tour Guides",
            "members": [
                {
                    "value": "2819c223-7f76-453a-919d-413861904646",
                    "$ref": "https://example.com/v2/Users/2819c223-7f76-453a-919d-413861904646",
                    "display": "Babs Jensen"
                },
                {
                    "value": "902c246b-6245-4190-8e05-00816be7344a",
                    "$ref": "https://example.com/v2/Users/902c246b-6245-4190-8e05-00816be7344a",
                    "display": "Mandy Pepperidge"
                }
            ]
        })
    }

    /// A user with a multi-valued list of plain strings
    pub fn user_with_friends() -> Value {
        json!({"name": "Bob", "friends": ["Amy", "Beth", "Carol"]})
    }

    /// A user with work and home emails
    pub fn user_with_emails() -> Value {
        json!({
            "emails": [
                {"type": "work", "value": "a@x.com"},
                {"type": "home", "value": "b@x.com"}
            ]
        })
    }
}
