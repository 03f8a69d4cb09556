//! Filter evaluation against RFC 7643 resources.

use crate::common::{self, filter, fixtures, path};
use scim_path::{FilterEvaluator, ScimError};
use serde_json::{Value, json};

fn matches(text: &str, resource: &Value) -> bool {
    FilterEvaluator::default()
        .evaluate(&filter(text), resource)
        .unwrap_or_else(|e| panic!("'{}' failed: {}", text, e))
}

#[test]
fn test_complex_value_filter_scenario() {
    common::init_logging();
    let user = fixtures::rfc_examples::user_with_emails();

    assert!(matches(r#"emails[type eq "work"]"#, &user));
    assert!(!matches(r#"emails[type eq "other"]"#, &user));
    assert!(matches(r#"emails[type eq "home" and value ew "x.com"]"#, &user));
    assert!(!matches(r#"emails[type eq "home" and value eq "a@x.com"]"#, &user));
}

#[test]
fn test_enterprise_user_filters() {
    let user = fixtures::enterprise_user();

    assert!(matches(r#"userName eq "BJENSEN@EXAMPLE.COM""#, &user));
    assert!(matches(r#"name.familyName co "ens""#, &user));
    assert!(matches(r#"title pr and userType eq "Employee""#, &user));
    assert!(matches(
        r#"urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:department sw "Tour""#,
        &user
    ));
    assert!(matches(
        r#"urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:manager.displayName eq "John Smith""#,
        &user
    ));
    assert!(matches(
        r#"schemas eq "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User""#,
        &user
    ));
    assert!(matches(r#"meta.created lt "2011-01-01T00:00:00Z""#, &user));
    assert!(matches(r#"addresses[postalCode eq "91608" and primary eq true]"#, &user));
    assert!(!matches(r#"phoneNumbers[type eq "fax"]"#, &user));
    assert!(matches(r#"not(phoneNumbers[type eq "fax"])"#, &user));
}

#[test]
fn test_simple_path_get_scenario_as_filter() {
    let user = fixtures::rfc_examples::user_with_friends();
    assert!(matches(r#"friends eq "beth""#, &user));
    assert!(matches(r#"friends[value eq "Beth"]"#, &user));
    assert!(!matches(r#"friends[value eq "Dan"]"#, &user));
}

#[test]
fn test_precedence_is_observable() {
    // With a=0 only the left-grouped reading holds.
    let resource = json!({"a": 0, "b": 0, "c": 1});
    assert!(matches("a eq 1 and b eq 1 or c eq 1", &resource));
    assert!(matches("(a eq 1 and b eq 1) or c eq 1", &resource));
    assert!(!matches("a eq 1 and (b eq 1 or c eq 1)", &resource));
}

#[test]
fn test_null_and_missing_are_equivalent() {
    for resource in [
        json!({}),
        json!({"nickName": null}),
        json!({"nickName": []}),
    ] {
        assert!(matches("nickName eq null", &resource), "{}", resource);
        assert!(!matches("nickName pr", &resource), "{}", resource);
        assert!(!matches("nickName ne null", &resource), "{}", resource);
    }

    let present = json!({"nickName": "Babs"});
    assert!(matches("nickName pr", &present));
    assert!(!matches("nickName eq null", &present));
}

#[test]
fn test_ordering_rejects_booleans() {
    let user = fixtures::enterprise_user();
    let evaluator = FilterEvaluator::default();

    let result = evaluator.evaluate(&filter("active gt true"), &user);
    assert_scim_error!(result, ScimError::InvalidFilter { .. });

    // The error is not swallowed by surrounding logic.
    let result = evaluator.evaluate(&filter(r#"userName pr and (active lt false or title pr)"#), &user);
    assert_error_message_contains!(result, "boolean");
}

#[test]
fn test_type_mismatches_are_false() {
    let resource = json!({"loginCount": 5, "userName": "5"});
    assert!(!matches(r#"loginCount eq "5""#, &resource));
    assert!(!matches("userName eq 5", &resource));
    assert!(!matches(r#"loginCount gt "4""#, &resource));
    assert!(matches("loginCount gt 4.5", &resource));
}

#[test]
fn test_case_exact_evaluator() {
    let user = fixtures::enterprise_user();
    let evaluator = FilterEvaluator::new().with_case_exact(path("id"));

    assert!(evaluator.is_case_exact(&path("ID")));
    assert!(!evaluator.is_case_exact(&path("userName")));

    let upper = filter(r#"id eq "2819C223-7F76-453A-919D-413861904646""#);
    assert!(!evaluator.evaluate(&upper, &user).unwrap());
    assert!(FilterEvaluator::default().evaluate(&upper, &user).unwrap());
}
