use std::io::Write;
use strata_cli::config::StrataConfig;
use strata_cli::driver::Session;
use strata_hnsw::PruneScope;

#[test]
fn test_yaml_session() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "seed: 11\npoints: 120\nqueries: 15\ncanvas:\n  width: 640\n  height: 480\nindex:\n  max_neighbors: 6\n  prune_scope: inserted_only\n"
    )
    .unwrap();

    let config = StrataConfig::load_from_file(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.index.prune_scope, PruneScope::InsertedOnly);

    let mut session = Session::new(config).unwrap();
    let summary = session.run().unwrap();
    assert_eq!(summary.nodes, 120);
    assert_eq!(summary.queries, 15);
    assert!(summary.recall() >= 0.8, "recall {}", summary.recall());

    let snapshot = session.index().snapshot();
    for id in snapshot.marks.path() {
        assert!(snapshot.marks.is_visited(*id));
    }
}

#[test]
fn test_env_defaults() {
    let config = StrataConfig::from_lookup(|_| None).unwrap();
    assert_eq!(config, StrataConfig::default());
}
