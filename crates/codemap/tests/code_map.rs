//! Integration tests for code map persistence.
//!
//! These tests go through the file system: generate, save, load, restore.

use std::fs;

use codemap::code_map::{CODE_MAP_FILE_NAME, json_schema};
use codemap::{
    CodeMap, DependencyGraph, DependencyKind, Error, Location, SourceLocation, Symbol,
    SymbolKind, SymbolRegistry, ValidationError,
};
use proptest::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

fn populated() -> (SymbolRegistry, DependencyGraph) {
    let mut registry = SymbolRegistry::new();
    let mut graph = DependencyGraph::new();

    let symbols = [
        Symbol::new("auth", SymbolKind::Module, SourceLocation::new("auth.py", 1)),
        Symbol::new("auth.Session", SymbolKind::Class, SourceLocation::new("auth.py", 10))
            .with_docstring("A login session."),
        Symbol::new(
            "auth.Session.refresh",
            SymbolKind::Method,
            SourceLocation::new("auth.py", 14).with_column(4),
        )
        .with_signature("def refresh(self) -> None"),
        Symbol::new("main.run", SymbolKind::Function, SourceLocation::new("main.py", 3)),
    ];
    for symbol in symbols {
        graph.add_symbol(&symbol);
        registry.add(symbol);
    }

    graph.add_dependency(
        "main.run",
        "auth.Session.refresh",
        DependencyKind::Calls,
        Some(Location::new("main.py", 5)),
    );
    graph.add_dependency(
        "main.run",
        "auth.Session.refresh",
        DependencyKind::Calls,
        Some(Location::new("main.py", 9)),
    );
    graph.add_dependency(
        "main.run",
        "auth",
        DependencyKind::Imports,
        Some(Location::new("main.py", 1)),
    );
    graph.add_dependency("auth.Session", "object", DependencyKind::Inherits, None);

    (registry, graph)
}

fn write_json(dir: &TempDir, value: &Value) -> std::path::PathBuf {
    let path = dir.path().join(CODE_MAP_FILE_NAME);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

#[test]
fn save_load_restore_preserves_symbols_and_dependencies() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".codemap").join(CODE_MAP_FILE_NAME);

    let (registry, graph) = populated();
    CodeMap::generate(&graph, &registry, "src").save(&path).unwrap();

    let (restored_registry, restored_graph) = CodeMap::load(&path).unwrap().into_parts();

    for symbol in registry.iter() {
        let restored = restored_registry.get(&symbol.qualified_name).unwrap();
        assert_eq!(restored, symbol);
    }
    assert_eq!(restored_registry.len(), registry.len());

    let mut original_edges = graph.get_edges();
    let mut restored_edges = restored_graph.get_edges();
    original_edges.sort();
    restored_edges.sort();
    assert_eq!(original_edges, restored_edges);

    for (from, to, edge) in graph.edges() {
        assert_eq!(restored_graph.edge(from, to), Some(edge));
    }
}

#[test]
fn saved_document_is_canonical() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CODE_MAP_FILE_NAME);

    let (registry, graph) = populated();
    CodeMap::generate(&graph, &registry, "src").save(&path).unwrap();

    let document: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(document["schema"], "http://json-schema.org/draft-07/schema#");
    assert_eq!(document["version"], "1.0");
    assert_eq!(document["source_root"], "src");

    let names: Vec<&str> = document["symbols"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["qualified_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["auth", "auth.Session", "auth.Session.refresh", "main.run"]);

    let refresh = &document["symbols"][2];
    assert_eq!(refresh["column"], 4);
    assert_eq!(refresh["signature"], "def refresh(self) -> None");
    assert!(document["symbols"][0].get("column").is_none());

    let first_dependency = &document["dependencies"][0];
    assert_eq!(first_dependency["from_sym"], "auth.Session");
    assert_eq!(first_dependency["kind"], "inherits");
    assert!(first_dependency.get("locations").is_none());

    let calls = &document["dependencies"][2];
    assert_eq!(calls["to_sym"], "auth.Session.refresh");
    assert_eq!(
        calls["locations"],
        json!([{"file": "main.py", "line": 5}, {"file": "main.py", "line": 9}])
    );
}

#[test]
fn generated_at_is_utc_seconds() {
    let (registry, graph) = populated();
    let map = CodeMap::generate(&graph, &registry, ".");
    let text = map.to_json_pretty().unwrap();

    let document: Value = serde_json::from_str(&text).unwrap();
    let stamp = document["generated_at"].as_str().unwrap();
    assert!(stamp.ends_with('Z'), "expected UTC timestamp, got {stamp}");
    assert!(!stamp.contains('.'), "expected second precision, got {stamp}");
}

#[test]
fn missing_dependencies_key_is_named() {
    let dir = TempDir::new().unwrap();
    let path = write_json(
        &dir,
        &json!({
            "version": "1.0",
            "generated_at": "2026-01-15T10:30:00Z",
            "source_root": ".",
            "symbols": []
        }),
    );

    match CodeMap::load(&path) {
        Err(Error::Validation(ValidationError::MissingField { field, context })) => {
            assert_eq!(field, "dependencies");
            assert_eq!(context, "code map");
        }
        other => panic!("expected missing field error, got {other:?}"),
    }
}

#[test]
fn symbol_without_qualified_name_is_named() {
    let dir = TempDir::new().unwrap();
    let path = write_json(
        &dir,
        &json!({
            "version": "1.0",
            "generated_at": "2026-01-15T10:30:00Z",
            "source_root": ".",
            "symbols": [
                {"qualified_name": "a", "kind": "function", "file": "a.py", "line": 1},
                {"kind": "function", "file": "b.py", "line": 1}
            ],
            "dependencies": []
        }),
    );

    let message = CodeMap::load(&path).unwrap_err().to_string();
    assert!(message.contains("qualified_name"), "{message}");
    assert!(message.contains("symbols[1]"), "{message}");
}

#[test]
fn non_mapping_document_is_distinguished() {
    let dir = TempDir::new().unwrap();
    let path = write_json(&dir, &json!("CODE_MAP"));

    assert!(matches!(
        CodeMap::load(&path),
        Err(Error::Validation(ValidationError::NotAMapping { .. }))
    ));
}

#[test]
fn document_from_older_writer_loads() {
    let dir = TempDir::new().unwrap();
    let path = write_json(
        &dir,
        &json!({
            "schema": "http://json-schema.org/draft-07/schema#",
            "version": "1.0",
            "generated_at": "2025-11-02T08:00:00+00:00",
            "source_root": "/home/dev/project",
            "symbols": [
                {"qualified_name": "app.main", "kind": "function", "file": "app.py", "line": 7,
                 "task_links": ["1.2"]}
            ],
            "dependencies": [
                {"from_sym": "app.main", "to_sym": "db.connect", "kind": "calls",
                 "locations": [{"file": "app.py", "line": 9}]}
            ]
        }),
    );

    let map = CodeMap::load(&path).unwrap();
    assert_eq!(map.symbols[0].task_links, Some(vec!["1.2".to_string()]));

    let (_, graph) = map.into_parts();
    assert_eq!(graph.get_callers("db.connect", None), vec!["app.main"]);
}

#[test]
fn schema_lists_symbol_kinds() {
    let schema = json_schema().to_string();
    for kind in ["module", "class", "function", "method"] {
        assert!(schema.contains(&format!("\"{kind}\"")), "schema lacks {kind}");
    }
}

fn kind_strategy() -> impl Strategy<Value = SymbolKind> {
    prop::sample::select(SymbolKind::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Generating from a restored map reproduces the same symbols and edges.
    #[test]
    fn prop_generate_restore_round_trip(
        symbols in prop::collection::btree_map(
            "[a-z]{1,4}(\\.[a-z]{1,4}){0,2}",
            (kind_strategy(), 1u32..500),
            0..15,
        ),
        edges in prop::collection::vec(("[a-z]{1,3}", "[a-z]{1,3}"), 0..20),
    ) {
        let mut registry = SymbolRegistry::new();
        let mut graph = DependencyGraph::new();
        for (name, (kind, line)) in &symbols {
            let symbol = Symbol::new(name.as_str(), *kind, SourceLocation::new("m.py", *line));
            graph.add_symbol(&symbol);
            registry.add(symbol);
        }
        for (from, to) in &edges {
            graph.add_call(from, to);
        }

        let map = CodeMap::generate(&graph, &registry, ".");
        let reloaded = CodeMap::from_json_str(&map.to_json_pretty().unwrap()).unwrap();
        prop_assert_eq!(&reloaded, &map);

        let (registry2, graph2) = reloaded.into_parts();
        let regenerated = CodeMap::generate(&graph2, &registry2, ".");
        prop_assert_eq!(regenerated.symbols, map.symbols);
        prop_assert_eq!(regenerated.dependencies, map.dependencies);
    }
}
