//! Tests for `remove`.

use super::fixture_chain;
use crate::chain::InheritOptions;
use crate::error::EnvChainError;

#[test]
fn test_deletes_field() {
    let chain = fixture_chain();
    chain.add("VARIABLE_1", "test").remove("VARIABLE_1");
    assert!(!chain.names().contains(&"VARIABLE_1".to_string()));
    assert!(chain.get("VARIABLE_1").unwrap().is_none());
}

#[test]
fn test_can_remove_and_add_back() {
    let chain = fixture_chain();
    chain
        .add("VARIABLE_1", "test")
        .remove("VARIABLE_1")
        .add("VARIABLE_1", "test");
    assert_eq!(chain.get_str("VARIABLE_1").unwrap().as_deref(), Some("variable_1"));
}

#[test]
fn test_removing_absent_name_is_noop() {
    let chain = fixture_chain();
    chain.add("VARIABLE_1", "test").add("VARIABLE_2", "test");
    let before = chain.render().unwrap();

    chain.remove("NOT_DECLARED").remove("render");

    assert_eq!(chain.render().unwrap(), before);
    assert_eq!(chain.len(), 2);
}

#[test]
fn test_removed_source_fails_strict_inheritance() {
    let chain = fixture_chain();
    chain
        .add("VARIABLE_1", "test")
        .inherit("VARIABLE_2", "VARIABLE_1", InheritOptions::default())
        .unwrap()
        .remove("VARIABLE_1");

    // The dependent survives removal; the failure shows up on read.
    assert!(chain.contains("VARIABLE_2"));
    assert!(matches!(
        chain.get("VARIABLE_2"),
        Err(EnvChainError::MissingInheritedValue { ref name, ref from })
            if name == "VARIABLE_2" && from == "VARIABLE_1"
    ));
}

#[test]
fn test_quiet_inheritance_reads_unset() {
    let chain = fixture_chain();
    chain
        .add("VARIABLE_1", "test")
        .inherit("VARIABLE_2", "VARIABLE_1", InheritOptions::quiet())
        .unwrap()
        .remove("VARIABLE_1");

    assert!(chain.get("VARIABLE_2").unwrap().is_none());
}

#[test]
fn test_re_adding_source_restores_inheritance() {
    let chain = fixture_chain();
    chain
        .add("VARIABLE_1", "test")
        .inherit("COPY", "VARIABLE_1", InheritOptions::default())
        .unwrap()
        .remove("VARIABLE_1")
        .add("VARIABLE_1", "again");
    assert_eq!(chain.get_str("COPY").unwrap().as_deref(), Some("variable_1"));
}
