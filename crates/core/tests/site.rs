use docscope_api::{
    BucketKey, Diagnostic, EntryKind, HierarchyService, NavState, NavigationService, NodePath, NodeRef,
    SearchService,
};
use docscope_core::search::DirShardSource;
use docscope_core::{DocscopeConfig, DocscopeError, Site};
use std::fs;
use std::path::Path;

const NAVTREE: &str = r#"/*
 @licstart  The following is the entire license notice for the JavaScript code in this file.
 @licend
*/
var NAVTREE =
[
  [ "mimic++", "index.html", [
    [ "Introduction", "index.html#intro", [
      [ "Core Design", "index.html#autotoc_md3", null ]
    ] ],
    [ "Namespaces", "namespaces.html", "namespaces" ],
    [ "Classes", "annotated.html", "annotated" ],
    [ "Files", "files.html", "files" ]
  ] ]
];

var NAVTREEINDEX =
[
"index.html"
];

var SYNCONMSG = 'click to disable panel synchronisation';
var SYNCOFFMSG = 'click to enable panel synchronisation';
"#;

const NAMESPACES: &str = r#"var namespaces =
[
    [ "mimicpp", "namespacemimicpp.html", "namespacemimicpp" ]
];
"#;

const NAMESPACE_MIMICPP: &str = r#"var namespacemimicpp =
[
    [ "Mock", "classmimicpp_1_1Mock.html", null ],
    [ "Sequence", "classmimicpp_1_1Sequence.html", null ]
];
"#;

const ANNOTATED: &str = r#"var annotated =
[
    [ "mimicpp", "namespacemimicpp.html", "namespacemimicpp" ]
];
"#;

const HIERARCHY: &str = r#"var hierarchy =
[
    [ "mimicpp::Mock&lt; Signatures &gt;", "classmimicpp_1_1Mock.html", null ],
    [ "std::false_type", null, [
      [ "mimicpp::is_overload_set&lt; T &gt;", "structmimicpp_1_1is__overload__set.html", null ]
    ] ],
    [ "mimicpp::Sequence", "classmimicpp_1_1Sequence.html", [
      [ "mimicpp::LazySequence", "classmimicpp_1_1LazySequence.html", null ]
    ] ],
    [ "mimicpp::SequenceBase", "classmimicpp_1_1SequenceBase.html", [
      [ "mimicpp::LazySequence", "classmimicpp_1_1LazySequence.html", null ]
    ] ]
];
"#;

const SEARCH_DATA: &str = r#"var indexSectionsWithContent =
{
  0: "ms"
};

var indexSectionNames =
{
  0: "all"
};
"#;

const ALL_0: &str = r#"var searchData=
[
  ['mock_0',['Mock',['../classmimicpp_1_1Mock.html',1,'mimicpp']]],
  ['mocksettings_1',['MockSettings',['../structmimicpp_1_1MockSettings.html',1,'mimicpp']]],
  ['moderncpp_2',['ModernCpp',['../index.html#autotoc_md3',1,'']]],
  ['mimicpp_5fscoped_5fexpectation_3',['MIMICPP_SCOPED_EXPECTATION',['../ScopedSequence_8hpp.html#a1',1,'ScopedSequence.hpp']]]
];
"#;

const ALL_1: &str = r#"var searchData=
[
  ['sequence_0',['Sequence',['../classmimicpp_1_1Sequence.html',1,'mimicpp']]],
  ['sequenceconfig_1',['SequenceConfig',['../structmimicpp_1_1SequenceConfig.html',1,'mimicpp']]]
];
"#;

fn write(root: &Path, name: &str, content: &str) {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "navtreedata.js", NAVTREE);
    write(root, "namespaces.js", NAMESPACES);
    write(root, "namespacemimicpp.js", NAMESPACE_MIMICPP);
    write(root, "annotated.js", ANNOTATED);
    write(root, "hierarchy.js", HIERARCHY);
    write(root, "search/searchdata.js", SEARCH_DATA);
    write(root, "search/all_0.js", ALL_0);
    write(root, "search/all_1.js", ALL_1);
    dir
}

fn path(steps: &[usize]) -> NodePath {
    NodePath(steps.to_vec())
}

#[tokio::test]
async fn test_open_missing_site_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = Site::open(dir.path().join("nope"), DocscopeConfig::default()).await;
    assert!(matches!(result, Err(DocscopeError::SiteNotFound(_))));
}

#[tokio::test]
async fn test_navigation_attaches_deferred_tables() {
    let dir = fixture();
    let site = Site::open_default(dir.path()).await.unwrap();

    let mut state = NavState::default();
    let found = site.sync_to(&mut state, "classmimicpp_1_1Sequence.html");
    assert_eq!(found, Some(path(&[0, 1, 0, 1])));
    assert!(state.is_open(&path(&[0])));
    assert!(state.is_open(&path(&[0, 1])));
    assert!(state.is_open(&path(&[0, 1, 0])));
    assert_eq!(state.selected, Some(path(&[0, 1, 0, 1])));

    let crumbs = site.breadcrumb(&path(&[0, 1, 0, 1])).unwrap();
    assert_eq!(crumbs, vec!["mimic++", "Namespaces", "mimicpp", "Sequence"]);

    // The same table is spliced under both namespace entries.
    let classes = site.nav().node(&path(&[0, 2, 0])).unwrap();
    assert_eq!(classes.children.len(), 2);

    // "files.js" is absent: the node stays deferred and a diagnostic is kept.
    assert_eq!(site.nav().pending_tables(), vec!["files"]);
    assert!(
        site.diagnostics()
            .iter()
            .any(|d| d.to_string().contains("files.js"))
    );
}

#[tokio::test]
async fn test_sync_to_unknown_page_keeps_state() {
    let dir = fixture();
    let site = Site::open_default(dir.path()).await.unwrap();

    let mut state = NavState::default();
    site.sync_to(&mut state, "index.html#intro");
    let before = state.clone();
    assert_eq!(site.sync_to(&mut state, "globals.html"), None);
    assert_eq!(state, before);

    let rows = site.visible_rows(&state);
    let titles: Vec<_> = rows.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["mimic++", "Introduction", "Namespaces", "Classes", "Files"]
    );
    assert!(rows[1].selected);
}

#[tokio::test]
async fn test_hierarchy_loaded_from_site() {
    let dir = fixture();
    let site = Site::open_default(dir.path()).await.unwrap();

    let roots: Vec<_> = site
        .hierarchy_roots()
        .into_iter()
        .map(|n| n.node.label)
        .collect();
    assert_eq!(
        roots,
        vec![
            "mimicpp::Mock< Signatures >",
            "mimicpp::Sequence",
            "mimicpp::SequenceBase",
            "std::false_type",
        ]
    );

    let lazy = site.hierarchy_lookup("mimicpp::LazySequence");
    assert_eq!(lazy.len(), 1);
    let parents: Vec<_> = lazy[0].parents.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(parents, vec!["mimicpp::Sequence", "mimicpp::SequenceBase"]);

    let external = site.hierarchy().node(&NodeRef::new("std::false_type", "")).unwrap();
    assert!(external.node.is_external());
    assert_eq!(external.children.len(), 1);
    assert!(site.hierarchy_diagnostics().is_empty());
}

#[tokio::test]
async fn test_search_through_site() {
    let dir = fixture();
    let site = Site::open_default(dir.path()).await.unwrap();

    let response = site.search("mo").await.unwrap().into_response().unwrap();
    let labels: Vec<_> = response.entries.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["Mock", "MockSettings", "ModernCpp"]);
    assert_eq!(response.entries[0].kind, EntryKind::Class);
    assert_eq!(response.entries[0].target.path, "classmimicpp_1_1Mock.html");

    let macros = site.search("scoped").await.unwrap().into_response().unwrap();
    assert!(macros.entries.is_empty(), "only the 's' shard is searched");

    let completions = site.complete("seq", 5).await.unwrap();
    assert_eq!(completions, vec!["Sequence", "SequenceConfig"]);

    let missing = site.search("zeta").await.unwrap().into_response().unwrap();
    assert!(missing.entries.is_empty());
    assert_eq!(missing.diagnostics.len(), 1);
}

#[tokio::test]
async fn test_config_file_redirects_paths() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "docscope.json",
        r#"{ "search_dir": "idx", "hierarchy_file": "edges.json", "max_results": 1 }"#,
    );
    write(root, "navtreedata.js", NAVTREE);
    write(root, "idx/all_0.js", ALL_0);
    write(
        root,
        "edges.json",
        r#"[
            {"child": {"label": "B", "target": "b.html"}, "parent": {"label": "A", "target": "a.html"}},
            {"child": {"label": "A", "target": "a.html"}, "parent": {"label": "B", "target": "b.html"}}
        ]"#,
    );

    let site = Site::open_default(root).await.unwrap();
    assert_eq!(site.config().max_results, 1);

    let response = site.search("mo").await.unwrap().into_response().unwrap();
    assert_eq!(response.entries.len(), 1);

    assert_eq!(site.hierarchy().len(), 2);
    assert_eq!(site.hierarchy_diagnostics().len(), 1);
    assert_eq!(site.hierarchy_roots().len(), 1);
}

#[tokio::test]
async fn test_latest_generated_file_wins() {
    let dir = tempfile::tempdir().unwrap();
    let search = dir.path().join("search");
    write(
        &search,
        "all_10.js",
        "var searchData=[['stale_0',['Stale',['../stale.html',1,'']]]];",
    );
    write(
        &search,
        "all_12.js",
        "var searchData=[['sequence_0',['Sequence',['../seq.html',1,'']]]];",
    );
    write(
        &search,
        "all_d.js",
        "var searchData=[['mock_0',['Mock',['../mock.html',1,'']]]];",
    );

    let source = DirShardSource::new(&search);
    let catalog = source.catalog().await;
    let files = catalog.files_for(BucketKey::Letter('s'));
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("all_12.js"));
    assert_eq!(catalog.files_for(BucketKey::Letter('m')).len(), 1);
}

#[tokio::test]
async fn test_json_shard_overrides_bucket() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "search/all_0.js", ALL_0);
    write(
        root,
        "search/m.json",
        r#"[{"label": "Matcher", "kind": "concept", "target": {"path": "concept.html"}}]"#,
    );

    let site = Site::open_default(root).await.unwrap();
    let response = site.search("m").await.unwrap().into_response().unwrap();
    let labels: Vec<_> = response.entries.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["Matcher"]);
    assert_eq!(response.entries[0].kind, EntryKind::Concept);
}

#[tokio::test]
async fn test_reload_picks_up_regenerated_file() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "search/all_1.js",
        "var searchData=[['mock_0',['Mock',['../mock.html',1,'']]]];",
    );

    let site = Site::open_default(root).await.unwrap();
    let response = site.search("m").await.unwrap().into_response().unwrap();
    let labels: Vec<_> = response.entries.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["Mock"]);

    write(
        root,
        "search/all_2.js",
        "var searchData=[['matcher_0',['Matcher',['../matcher.html',1,'']]]];",
    );
    let shard = site.search_index().reload(BucketKey::Letter('m')).await.unwrap();
    assert_eq!(shard.entries.len(), 1);
    assert_eq!(shard.entries[0].label, "Matcher");

    let response = site.search("m").await.unwrap().into_response().unwrap();
    let labels: Vec<_> = response.entries.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["Matcher"]);
}

#[tokio::test]
async fn test_skipped_rows_reach_query_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "search/all_0.js",
        "var searchData=[['mock_0',['Mock',['../mock.html',1,'']]],['mo_1',[null,['../x.html',1,'']]]];",
    );

    let site = Site::open_default(root).await.unwrap();
    let response = site.search("mo").await.unwrap().into_response().unwrap();
    assert_eq!(response.entries.len(), 1);
    assert_eq!(response.diagnostics.len(), 1);
    assert!(matches!(
        response.diagnostics[0],
        Diagnostic::MalformedEntry { .. }
    ));
}

#[tokio::test]
async fn test_table_reached_again_later_is_attached() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "navtreedata.js",
        r#"var NAVTREE = [
  [ "Docs", "index.html", [
    [ "A", "a.html", "ta" ],
    [ "B", "b.html", "tb" ]
  ] ]
];"#,
    );
    write(root, "ta.js", r#"var ta = [ [ "X", "x.html", "tx" ] ];"#);
    write(root, "tb.js", r#"var tb = [ [ "Leaf", "leaf.html", null ] ];"#);
    write(root, "tx.js", r#"var tx = [ [ "AgainB", "again.html", "tb" ] ];"#);

    let site = Site::open_default(root).await.unwrap();
    assert!(site.nav().pending_tables().is_empty());

    let again = site.nav().node(&path(&[0, 0, 0, 0])).unwrap();
    assert_eq!(again.title, "AgainB");
    assert_eq!(again.children.len(), 1);

    let mut state = NavState::default();
    assert_eq!(
        site.sync_to(&mut state, "leaf.html"),
        Some(path(&[0, 0, 0, 0, 0]))
    );
    assert!(state.is_open(&path(&[0, 0, 0, 0])));
    assert_eq!(
        site.breadcrumb(&path(&[0, 1, 0])).unwrap(),
        vec!["Docs", "B", "Leaf"]
    );
    assert_eq!(site.nav().len(), 7);
}
