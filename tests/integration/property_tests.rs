//! Property-based tests for paths and filters.
//!
//! Generated paths and filters are printed and parsed again; the result must
//! be the same tree, and evaluating it must give the same answer.

use proptest::prelude::*;
use scim_path::{Filter, FilterEvaluator, Path, accessor};
use serde_json::{Value, json};

const KEYWORDS: &[&str] = &["and", "or", "not", "NOT", "pr", "eq", "true", "null"];

/// Strategy for attribute names, including names that spell filter keywords
fn attribute_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-zA-Z][a-zA-Z0-9_]{0,7}",
        1 => prop::sample::select(KEYWORDS).prop_map(String::from),
    ]
}

fn comparison_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-zA-Z0-9 @.:'-]{0,12}".prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        Just(Value::Null),
    ]
}

fn operator_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["eq", "ne", "co", "sw", "ew", "gt", "ge", "lt", "le"])
}

prop_compose! {
    fn simple_path_strategy()
        (names in prop::collection::vec(attribute_name_strategy(), 1..3))
        -> Path {
        names.iter().fold(Path::root(), |path, name| path.attribute(name).unwrap())
    }
}

prop_compose! {
    fn comparison_strategy()
        (attribute in simple_path_strategy(),
         operator in operator_strategy(),
         value in comparison_value_strategy())
        -> Filter {
        Filter::parse(&format!("{} {} {}", attribute, operator, value)).unwrap()
    }
}

fn leaf_filter_strategy() -> impl Strategy<Value = Filter> {
    prop_oneof![
        4 => comparison_strategy(),
        1 => simple_path_strategy().prop_map(Filter::pr),
    ]
}

/// Filters without complex value filters, usable inside `[...]`
fn value_filter_strategy() -> impl Strategy<Value = Filter> {
    leaf_filter_strategy().prop_recursive(3, 12, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 2..4).prop_map(Filter::And),
            prop::collection::vec(inner.clone(), 2..4).prop_map(Filter::Or),
            inner.prop_map(Filter::not),
        ]
    })
}

fn filter_strategy() -> impl Strategy<Value = Filter> {
    let leaf = prop_oneof![
        3 => leaf_filter_strategy(),
        1 => (attribute_name_strategy(), value_filter_strategy()).prop_map(|(name, inner)| {
            Filter::has_complex_value(Path::root().attribute(&name).unwrap(), inner)
        }),
    ];
    leaf.prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 2..4).prop_map(Filter::And),
            prop::collection::vec(inner.clone(), 2..4).prop_map(Filter::Or),
            inner.prop_map(Filter::not),
        ]
    })
}

prop_compose! {
    fn filtered_path_strategy()
        (name in attribute_name_strategy(),
         value_filter in proptest::option::of(value_filter_strategy()),
         sub_attribute in proptest::option::of(attribute_name_strategy()))
        -> Path {
        let path = match value_filter {
            Some(value_filter) => Path::root().attribute_with_filter(&name, value_filter).unwrap(),
            None => Path::root().attribute(&name).unwrap(),
        };
        match sub_attribute {
            Some(sub) => path.attribute(&sub).unwrap(),
            None => path,
        }
    }
}

prop_compose! {
    fn document_strategy()
        (names in prop::collection::vec(attribute_name_strategy(), 1..5),
         values in prop::collection::vec(comparison_value_strategy(), 5))
        -> Value {
        let mut document = serde_json::Map::new();
        for (name, value) in names.into_iter().zip(values) {
            document.insert(name, value);
        }
        Value::Object(document)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn paths_print_and_parse_back(path in filtered_path_strategy()) {
        let printed = path.to_string();
        let parsed = Path::parse(&printed).unwrap();
        prop_assert_eq!(&parsed, &path);
        prop_assert_eq!(parsed.to_string(), printed);
    }

    #[test]
    fn filters_print_and_parse_back(filter in filter_strategy()) {
        let once = Filter::parse(&filter.to_string()).unwrap();
        let twice = Filter::parse(&once.to_string()).unwrap();
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.to_string(), twice.to_string());
    }

    #[test]
    fn reparsed_filters_evaluate_alike(filter in value_filter_strategy(), document in document_strategy()) {
        let evaluator = FilterEvaluator::default();
        let reparsed = Filter::parse(&filter.to_string()).unwrap();
        let original = evaluator.evaluate(&filter, &document).ok();
        prop_assert_eq!(original, evaluator.evaluate(&reparsed, &document).ok());
    }

    #[test]
    fn not_negates(filter in leaf_filter_strategy(), document in document_strategy()) {
        let evaluator = FilterEvaluator::default();
        if let Ok(matched) = evaluator.evaluate(&filter, &document) {
            prop_assert_eq!(evaluator.evaluate(&Filter::not(filter), &document).unwrap(), !matched);
        }
    }

    #[test]
    fn removal_is_idempotent(path in simple_path_strategy(), document in document_strategy()) {
        let mut document = document;
        accessor::remove_values(&path, &mut document).unwrap();
        let snapshot = document.clone();
        prop_assert!(accessor::remove_values(&path, &mut document).unwrap().is_empty());
        prop_assert_eq!(document, snapshot);
    }

    #[test]
    fn add_then_get_finds_value(name in attribute_name_strategy(), value in "[a-z]{1,8}") {
        let mut document = json!({});
        let path = Path::root().attribute(&name).unwrap();
        accessor::add_values(&path, &mut document, json!(value.clone())).unwrap();
        accessor::add_values(&path, &mut document, json!(value.clone())).unwrap();
        prop_assert_eq!(accessor::get_values(&path, &document).unwrap(), vec![json!([value])]);
    }
}
