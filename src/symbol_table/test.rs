use super::*;
use crate::value::DataType;

#[test]
fn test_block_bindings_disappear() {
    let mut table = SymbolTable::new();
    table.declare("x", Value::Int(1));

    table.enter_scope();
    table.declare("y", Value::Int(2));
    assert!(table.is_declared("x"));
    assert!(table.is_declared("y"));
    table.leave_scope();

    assert!(!table.is_declared("y"));
    assert_eq!(table.get("y"), Err(ScopeError::Undeclared("y".to_string())));
    assert_eq!(table.depth(), 1);
}

#[test]
fn test_shadowing_reads_and_writes_nearest() {
    let mut table = SymbolTable::new();
    table.declare("x", Value::Int(1));
    table.enter_scope();
    assert!(!table.is_declared_in_scope("x"));
    table.declare("x", Value::Int(10));

    assert_eq!(table.get("x"), Ok(&Value::Int(10)));
    table.update("x", Value::Int(11)).unwrap();
    assert_eq!(table.get("x"), Ok(&Value::Int(11)));
    assert_eq!(table.resolve("x"), Some(ScopeHandle(0)));

    table.leave_scope();
    assert_eq!(table.get("x"), Ok(&Value::Int(1)));
}

#[test]
fn test_update_undeclared_fails() {
    let mut table: SymbolTable<Value> = SymbolTable::new();
    assert_eq!(
        table.update("ghost", Value::Int(0)),
        Err(ScopeError::Undeclared("ghost".to_string()))
    );
}

#[test]
fn test_handles_count_hops() {
    let mut table = SymbolTable::new();
    table.declare("a", Value::Int(1));
    table.enter_scope();
    table.enter_scope();
    table.declare("b", Value::Int(2));

    assert_eq!(table.resolve("a"), Some(ScopeHandle(2)));
    assert_eq!(table.resolve("b"), Some(ScopeHandle(0)));
    assert_eq!(table.get_at(ScopeHandle(2), "a"), Some(&Value::Int(1)));
    assert_eq!(table.get_at(ScopeHandle(1), "a"), None);
}

#[test]
fn test_scope_under_hides_callers_scopes() {
    let mut table = SymbolTable::new();
    table.declare("x", Value::Int(1));

    // caller block shadows x
    table.enter_scope();
    table.declare("x", Value::Str("shadow".to_string()));

    // a call into a function declared at the root
    let handle = ScopeHandle(1);
    table.enter_scope_under(handle);
    assert_eq!(table.get("x"), Ok(&Value::Int(1)));
    assert_eq!(table.resolve("x"), Some(ScopeHandle(1)));
    table.leave_scope();

    assert_eq!(table.get("x"), Ok(&Value::Str("shadow".to_string())));
}

#[test]
fn test_assign_keeps_declared_type() {
    let mut table = SymbolTable::new();
    table.declare("d", Value::zero(DataType::Double));

    let stored = table.assign(ScopeHandle(0), "d", Value::Int(4)).unwrap();
    assert_eq!(stored, Value::Double(4.0));
    assert_eq!(table.get("d").unwrap().data_type(), DataType::Double);
}

#[test]
#[should_panic]
fn test_root_is_never_left() {
    let mut table: SymbolTable<Value> = SymbolTable::new();
    table.leave_scope();
}

#[test]
#[should_panic(expected = "reaches past the root scope")]
fn test_enter_under_unknown_scope_panics() {
    let mut table: SymbolTable<Value> = SymbolTable::new();
    table.enter_scope();
    table.enter_scope_under(ScopeHandle(2));
}
