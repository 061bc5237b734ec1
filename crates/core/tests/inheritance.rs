//! End-to-end behaviour of `extends` through the public entry point.

use platon_core::{
    load_registry, parse_file, FullPath, InMemoryResolver, LocationResult, ParseOptions,
    ParserError, BUILTIN_PLUGINS,
};
use serde_json::json;

const HEADER: &str = "author = A\nversion = 1\ntitle = T\nstatement = S\nformState =\n";

fn parse(resolver: &InMemoryResolver, path: &str) -> Result<platon_core::ParserOutput, ParserError> {
    let file = resolver.contents(0, path).unwrap().to_vec();
    parse_file(&file, FullPath::new(0, path), 0, resolver)
}

#[test]
fn extends_position_decides_who_wins() {
    let resolver = InMemoryResolver::new()
        .with_file(0, "base.pl", &*format!("{HEADER}color = blue\n"))
        .with_file(0, "before.pl", "color = red\nextends = base.pl\n")
        .with_file(0, "after.pl", "extends = base.pl\ncolor = red\n");

    let before = parse(&resolver, "before.pl").unwrap();
    assert_eq!(before.data["color"], json!("blue"));
    assert!(before.warnings.is_empty());

    let after = parse(&resolver, "after.pl").unwrap();
    assert_eq!(after.data["color"], json!("red"));
    assert_eq!(after.warnings.len(), 1);
}

#[test]
fn nested_maps_merge_across_three_levels() {
    let resolver = InMemoryResolver::new()
        .with_file(0, "root.pl", &*format!("{HEADER}cfg.a = 1\ncfg.deep.x = root\n"))
        .with_file(0, "mid.pl", "extends = root.pl\ncfg.b = 2\ncfg.deep.y = mid\n")
        .with_file(0, "leaf.pl", "cfg.deep.x = leaf\nextends = mid.pl\ncfg.c = 3\n");
    let out = parse(&resolver, "leaf.pl").unwrap();
    assert_eq!(
        out.data["cfg"],
        json!({"a": 1, "b": 2, "c": 3, "deep": {"x": "root", "y": "mid"}})
    );
}

#[test]
fn ancestor_warnings_are_kept() {
    let resolver = InMemoryResolver::new()
        .with_file(0, "base.pl", &*format!("{HEADER}title = Again\n"))
        .with_file(0, "child.pl", "extends = base.pl\n");
    let out = parse(&resolver, "child.pl").unwrap();
    assert_eq!(out.warnings, vec!["Overwriting existing value at key \"title\""]);
}

#[test]
fn loop_through_three_files_reports_full_chain() {
    let resolver = InMemoryResolver::new()
        .with_file(0, "a.pl", "extends = b.pl\n")
        .with_file(0, "b.pl", "extends = c.pl\n")
        .with_file(0, "c.pl", "extends = a.pl\n");
    let err = parse(&resolver, "a.pl").unwrap_err();
    let json = err.to_json_value();
    assert_eq!(json["kind"], "inheritance_loop");
    let chain: Vec<_> = json["chain"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["path"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(chain, vec!["a.pl", "b.pl", "c.pl", "a.pl"]);
    assert!(err.to_string().contains("0:a.pl \u{2192} 0:b.pl"));
}

#[test]
fn error_in_ancestor_aborts_the_whole_parse() {
    let resolver = InMemoryResolver::new()
        .with_file(0, "base.pl", "ok = 1\n!!!\n")
        .with_file(0, "child.pl", &*format!("{HEADER}extends = base.pl\n"));
    let err = parse(&resolver, "child.pl").unwrap_err();
    assert_eq!(err.path(), &FullPath::new(0, "base.pl"));
    assert_eq!(err.line_number(), Some(2));
}

#[test]
fn resolution_is_relative_to_each_file() {
    let resolver = InMemoryResolver::new()
        .with_file(0, "lib/base.pl", &*format!("{HEADER}@ tools/grader.py\n"))
        .with_file(0, "lib/tools/grader.py", "")
        .with_file(0, "exos/a/ex.pl", "extends = ../../lib/base.pl\n@ local.py\n")
        .with_file(0, "exos/a/local.py", "");
    let out = parse(&resolver, "exos/a/ex.pl").unwrap();
    let paths: Vec<_> = out.dependencies.iter().map(|d| d.path.path.as_str()).collect();
    assert_eq!(paths, vec!["exos/a/local.py", "lib/tools/grader.py"]);
}

#[test]
fn repositories_are_part_of_file_identity() {
    // Same path in two repositories is not a loop.
    let resolver = |uri: &str, _dir: &str, rid: i64, cid: i64| match (uri, rid) {
        ("ex.pl", 0) => Some(LocationResult {
            file: b"shared = yes\n".to_vec(),
            path: FullPath::new(1, "ex.pl"),
            circle_id: cid,
        }),
        _ => None,
    };
    let src = format!("{HEADER}extends = ex.pl\n");
    let out = parse_file(src.as_bytes(), FullPath::new(0, "ex.pl"), 0, &resolver).unwrap();
    assert_eq!(out.data["shared"], json!("yes"));
}

#[test]
fn depth_limit_through_registry_options() {
    let mut resolver = InMemoryResolver::new();
    for i in 0..10 {
        resolver = resolver.with_file(0, &format!("l{i}.pl"), &*format!("extends = l{}.pl\n", i + 1));
    }
    resolver = resolver.with_file(0, "l10.pl", HEADER);

    let file = resolver.contents(0, "l0.pl").unwrap().to_vec();
    let registry = load_registry(&BUILTIN_PLUGINS);
    let ok = registry.parse_file_with(
        &file,
        FullPath::new(0, "l0.pl"),
        0,
        &resolver,
        ParseOptions::default().with_max_inheritance_depth(11),
    );
    assert!(ok.is_ok());

    let err = registry
        .parse_file_with(
            &file,
            FullPath::new(0, "l0.pl"),
            0,
            &resolver,
            ParseOptions::default().with_max_inheritance_depth(10),
        )
        .unwrap_err();
    match err {
        ParserError::InheritanceTooDeep { chain, limit, .. } => {
            assert_eq!(limit, 10);
            assert_eq!(chain.len(), 11);
            assert_eq!(chain.last(), Some(&FullPath::new(0, "l10.pl")));
        }
        other => panic!("unexpected {other:?}"),
    }
}
