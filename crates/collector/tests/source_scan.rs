use inject_collector::{Collector, GoModResolver, ModuleResolver, SourceCollector, DEFAULT_FILTERS};
use inject_graph::GraphBuilder;
use std::fs;
use std::path::Path;

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn sample_module() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "go.mod", "module github.com/acme/shop\n\ngo 1.22\n");
    write(
        root,
        "store/store.go",
        r#"package store

type Repository struct{}

// NewRepository opens the repository.
// @A provide index=0
func NewRepository() *Repository {
	return &Repository{}
}
"#,
    );
    write(
        root,
        "api/api.go",
        r#"package api

import "github.com/acme/shop/store"

// @A inject index=0
// @A invoke
func Serve(repo *store.Repository) {
}

// @A todo owner=ops
func helper() {}
"#,
    );
    write(
        root,
        "api/api_test.go",
        "package api\n\n// @A provide index=0\nfunc fake() *store.Repository { return nil }\n",
    );
    write(
        root,
        "vendor/x/x.go",
        "package x\n\n// @A provide index=0\nfunc X() *Y { return nil }\n",
    );
    dir
}

fn default_filters() -> Vec<String> {
    DEFAULT_FILTERS.iter().map(|s| s.to_string()).collect()
}

#[test]
fn collects_annotated_functions_from_module() {
    let dir = sample_module();

    let entries = SourceCollector::default()
        .collect(dir.path(), &default_filters())
        .unwrap();

    let names: Vec<(&str, &str)> = entries
        .iter()
        .map(|e| (e.path.as_str(), e.func_name()))
        .collect();
    assert_eq!(
        names,
        [
            ("github.com/acme/shop/api", "Serve"),
            ("github.com/acme/shop/store", "NewRepository"),
        ]
    );
    assert_eq!(entries[0].module, "github.com/acme/shop");
    assert_eq!(entries[0].file.as_deref(), Some("api/api.go"));
}

#[test]
fn collected_entries_build_a_graph() {
    let dir = sample_module();
    let entries = SourceCollector::default()
        .collect(dir.path(), &default_filters())
        .unwrap();

    let out = GraphBuilder::default().build(&entries).unwrap();

    let provider = out.graph.vertex("*store.Repository_").unwrap();
    let consumers: Vec<&str> = provider.adjacent().iter().map(|v| v.key()).collect();
    assert_eq!(consumers, ["github.com/acme/shop/api_Serve"]);
    assert_eq!(out.report.invokers, ["github.com/acme/shop/api_Serve"]);
}

#[test]
fn module_resolves_from_nested_package() {
    let dir = sample_module();
    let module = GoModResolver::default().resolve(&dir.path().join("store")).unwrap();
    assert_eq!(module, "github.com/acme/shop");
}
