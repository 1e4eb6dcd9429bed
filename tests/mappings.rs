use std::sync::Arc;

use modforge::descriptor::{BindingPolicy, FieldSymbol, MethodSymbol, ValueType};
use modforge::error::BuildError;
use modforge::mappings::{MappingTable, SymbolResolver};

const TABLE: &str = "\
# comment lines and blanks are skipped

CLASS demo/Thing named/Thing Thing
CLASS demo/Helper named/Helper Helper
METHOD named/Thing (I)V runNamed run
FIELD named/Thing countNamed count
";

fn table() -> Arc<MappingTable> {
    Arc::new(MappingTable::parse(TABLE).expect("fixture table parses"))
}

fn method_sym(binding: BindingPolicy) -> MethodSymbol {
    MethodSymbol {
        owner: "demo.Thing".to_string(),
        name: "run".to_string(),
        params: vec![ValueType::Int],
        ret: ValueType::Void,
        is_static: false,
        owner_is_interface: false,
        binding,
    }
}

#[test]
fn parse_counts_rows() {
    let table = MappingTable::parse(TABLE).unwrap();
    assert_eq!(table.len(), 4);
}

#[test]
fn parse_rejects_unknown_row_kind() {
    let err = MappingTable::parse("BOGUS a b c").unwrap_err();
    match err {
        BuildError::MappingParse { line, .. } => assert_eq!(line, 1),
        other => panic!("expected MappingParse, got {other:?}"),
    }
}

#[test]
fn parse_rejects_wrong_token_count() {
    let err = MappingTable::parse("CLASS demo/Thing Thing").unwrap_err();
    assert!(matches!(err, BuildError::MappingParse { line: 1, .. }));
}

#[test]
fn default_binding_slashes_the_internal_name() {
    let resolver = SymbolResolver::new(None);
    assert_eq!(resolver.resolve_class("java.lang.Object").unwrap(), "java/lang/Object");

    let resolved = resolver.resolve_method(&method_sym(BindingPolicy::Default)).unwrap();
    assert_eq!(resolved.owner, "demo/Thing");
    assert_eq!(resolved.name, "run");
}

#[test]
fn direct_binding_splits_the_qualified_name() {
    let resolver = SymbolResolver::new(None);
    let resolved = resolver
        .resolve_method(&method_sym(BindingPolicy::Direct("java.lang.Math.max".to_string())))
        .unwrap();
    assert_eq!(resolved.owner, "java/lang/Math");
    assert_eq!(resolved.name, "max");
}

#[test]
fn mapping_table_binding_renames_class_and_members() {
    let mut resolver = SymbolResolver::new(Some(table()));
    resolver.bind_class("demo.Thing", BindingPolicy::MappingTable(None));

    assert_eq!(resolver.resolve_class("demo.Thing").unwrap(), "named/Thing");

    let method = resolver
        .resolve_method(&method_sym(BindingPolicy::MappingTable(None)))
        .unwrap();
    assert_eq!(method.owner, "named/Thing");
    assert_eq!(method.name, "runNamed");

    let field = resolver
        .resolve_field(&FieldSymbol {
            owner: "demo.Thing".to_string(),
            name: "count".to_string(),
            ty: ValueType::Int,
            is_static: false,
            binding: BindingPolicy::MappingTable(None),
        })
        .unwrap();
    assert_eq!(field.owner, "named/Thing");
    assert_eq!(field.name, "countNamed");
}

#[test]
fn mapping_table_binding_honors_explicit_key() {
    let mut resolver = SymbolResolver::new(Some(table()));
    resolver.bind_class(
        "demo.Renamed",
        BindingPolicy::MappingTable(Some("demo.Helper".to_string())),
    );
    assert_eq!(resolver.resolve_class("demo.Renamed").unwrap(), "named/Helper");
}

#[test]
fn missing_row_is_fatal() {
    let mut resolver = SymbolResolver::new(Some(table()));
    resolver.bind_class("demo.Absent", BindingPolicy::MappingTable(None));
    let err = resolver.resolve_class("demo.Absent").unwrap_err();
    assert!(matches!(err, BuildError::UnresolvedSymbol { .. }));
}

#[test]
fn unbound_class_resolves_without_the_table() {
    let resolver = SymbolResolver::new(Some(table()));
    // No binding attached, so the table is never consulted.
    assert_eq!(resolver.resolve_class("demo.Absent").unwrap(), "demo/Absent");
}

#[test]
fn for_version_caches_per_version() {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("modforge-mappings-{}.txt", std::process::id()));
    std::fs::write(&path, TABLE).unwrap();

    let first = MappingTable::for_version("test-1.0", &path).unwrap();
    let second = MappingTable::for_version("test-1.0", &path).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    std::fs::remove_file(&path).ok();
}

#[test]
fn load_reports_missing_file() {
    let err = MappingTable::load("/nonexistent/mappings.txt").unwrap_err();
    assert!(matches!(err, BuildError::MappingLoad(_)));
}
