use crate::snapshot::*;
use crate::store::{MemoryConnector, MemoryState};
use bson::oid::ObjectId;
use bson::spec::BinarySubtype;
use bson::{Binary, DateTime, doc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const URI: &str = "mongodb://memory";

async fn run_import<F: ArtifactFs>(
    state: &Arc<MemoryState>,
    fs: &F,
    root: &Path,
    options: JobOptions,
) -> Result<Report, SnapshotError> {
    let connector = MemoryConnector::new(Arc::clone(state));
    import_job(
        &connector,
        fs,
        URI,
        root,
        &options,
        &CancellationToken::new(),
    )
    .await
}

fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

#[tokio::test]
async fn test_export_then_import_round_trip() {
    let source = MemoryState::new();
    let orders = vec![
        doc! {
            "_id": ObjectId::parse_str("65a1b2c3d4e5f60718293a4b").unwrap(),
            "total": 1_250_i64,
            "rate": 0.25_f64,
            "placed": DateTime::from_millis(1_700_000_000_123),
            "blob": Binary { subtype: BinarySubtype::Generic, bytes: vec![1, 2, 3] },
            "lines": [{ "sku": "a", "qty": 2_i32 }],
            "note": null,
        },
        doc! { "_id": ObjectId::parse_str("65a1b2c3d4e5f60718293a4c").unwrap() },
    ];
    source.put("shop", "orders", orders.clone());
    source.put("shop", "empty", vec![]);
    source.put("admin", "system.users", vec![doc! { "user": "root" }]);
    let temp_dir = TempDir::new().unwrap();
    let fs = LocalFs::new();

    export_job(
        &MemoryConnector::new(Arc::clone(&source)),
        &fs,
        URI,
        temp_dir.path(),
        &JobOptions::default(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    let target = MemoryState::new();
    let report = run_import(&target, &fs, temp_dir.path(), JobOptions::default())
        .await
        .unwrap();

    assert_eq!(
        report.text(),
        "empty.json (shop) ✅ (0 documents imported)\n\
         orders.json (shop) ✅ 2 documents imported"
    );
    assert_eq!(target.documents("shop", "orders"), Some(orders));
    assert_eq!(target.documents("shop", "empty"), None);
    assert_eq!(target.documents("admin", "system.users"), None);
    assert_eq!(target.insert_calls(), 1);
}

#[tokio::test]
async fn test_import_empty_array_skips_insert() {
    let state = MemoryState::new();
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "shop/empty.json", "[]");

    let report = run_import(&state, &LocalFs::new(), temp_dir.path(), JobOptions::default())
        .await
        .unwrap();

    assert_eq!(report.text(), "empty.json (shop) ✅ (0 documents imported)");
    assert_eq!(state.insert_calls(), 0);
}

#[tokio::test]
async fn test_import_malformed_file_is_isolated() {
    let state = MemoryState::new();
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "shop/broken.json", "[{\"a\": ");
    write_file(
        temp_dir.path(),
        "shop/good.json",
        r#"[{"n": {"$numberLong": "5"}}, {"n": {"$numberLong": "6"}}]"#,
    );

    let report = run_import(&state, &LocalFs::new(), temp_dir.path(), JobOptions::default())
        .await
        .unwrap();

    assert_eq!(report.len(), 2);
    assert!(matches!(
        report.records()[0].outcome,
        Outcome::Failed(UnitError::Codec(CodecError::Parse { .. }))
    ));
    assert!(
        report.records()[0]
            .to_string()
            .starts_with("broken.json (shop) ❌ JSON parse error:")
    );
    assert_eq!(
        report.records()[1].to_string(),
        "good.json (shop) ✅ 2 documents imported"
    );
    assert_eq!(
        state.documents("shop", "good"),
        Some(vec![doc! { "n": 5_i64 }, doc! { "n": 6_i64 }])
    );
}

#[tokio::test]
async fn test_import_non_array_is_shape_error() {
    let state = MemoryState::new();
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "shop/single.json", r#"{"a": 1}"#);

    let report = run_import(&state, &LocalFs::new(), temp_dir.path(), JobOptions::default())
        .await
        .unwrap();

    assert_eq!(
        report.text(),
        "single.json (shop) ❌ Data is not an array, skipping"
    );
    assert_eq!(state.insert_calls(), 0);
}

#[tokio::test]
async fn test_import_insert_failure_is_isolated() {
    let state = MemoryState::new();
    state.fail_writes_to("shop", "a");
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "shop/a.json", r#"[{"x": 1}]"#);
    write_file(temp_dir.path(), "shop/b.json", r#"[{"x": 2}]"#);

    let report = run_import(&state, &LocalFs::new(), temp_dir.path(), JobOptions::default())
        .await
        .unwrap();

    assert_eq!(
        report.text(),
        "a.json (shop) ❌ Failed to write shop.a: E11000 duplicate key error\n\
         b.json (shop) ✅ 1 document imported"
    );
    assert_eq!(state.insert_calls(), 2);
    assert_eq!(state.close_calls(), 1);
}

#[tokio::test]
async fn test_import_read_failure_is_isolated() {
    let state = MemoryState::new();
    let mut fs = MockArtifactFs::new();
    fs.expect_walk_json_files().times(1).returning(|root| {
        Ok(vec![root.join("shop/locked.json"), root.join("shop/ok.json")])
    });
    fs.expect_read_to_string().times(2).returning(|path| {
        if path.ends_with("locked.json") {
            Err(FsError::Read {
                path: path.to_path_buf(),
                message: "Permission denied".to_string(),
            })
        } else {
            Ok("[{\"ok\": true}]".to_string())
        }
    });

    let report = run_import(&state, &fs, Path::new("/in"), JobOptions::default())
        .await
        .unwrap();

    assert_eq!(
        report.text(),
        "locked.json (shop) ❌ Failed to read /in/shop/locked.json: Permission denied\n\
         ok.json (shop) ✅ 1 document imported"
    );
}

#[tokio::test]
async fn test_import_maps_directory_to_database() {
    let state = MemoryState::new();
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "db1/coll1.json", r#"[{"k": "v"}]"#);

    run_import(&state, &LocalFs::new(), temp_dir.path(), JobOptions::default())
        .await
        .unwrap();

    assert_eq!(
        state.documents("db1", "coll1"),
        Some(vec![doc! { "k": "v" }])
    );
}

#[tokio::test]
async fn test_import_deeper_file_uses_first_segment_when_lenient() {
    let state = MemoryState::new();
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "db1/extra/coll1.json", r#"[{"k": "v"}]"#);

    let report = run_import(&state, &LocalFs::new(), temp_dir.path(), JobOptions::default())
        .await
        .unwrap();

    assert_eq!(report.text(), "coll1.json (db1) ✅ 1 document imported");
    assert!(state.documents("db1", "coll1").is_some());
    assert!(state.documents("extra", "coll1").is_none());
}

#[tokio::test]
async fn test_import_strict_layout_rejects_misplaced_files() {
    let state = MemoryState::new();
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "db1/extra/coll1.json", r#"[{"k": "v"}]"#);
    write_file(temp_dir.path(), "db1/coll2.json", r#"[{"k": "w"}]"#);
    write_file(temp_dir.path(), "stray.json", "[]");

    let report = run_import(
        &state,
        &LocalFs::new(),
        temp_dir.path(),
        JobOptions::default().with_layout(ImportLayout::Strict),
    )
    .await
    .unwrap();

    let lines: Vec<String> = report.records().iter().map(ToString::to_string).collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "coll2.json (db1) ✅ 1 document imported");
    assert!(lines[1].starts_with("coll1.json (db1) ❌ Unexpected location"));
    assert!(lines[2].starts_with("stray.json () ❌ Unexpected location"));
    assert!(state.documents("db1", "coll1").is_none());
}

#[tokio::test]
async fn test_import_missing_root_is_fatal_and_releases_connection() {
    let state = MemoryState::new();
    let temp_dir = TempDir::new().unwrap();
    let missing: PathBuf = temp_dir.path().join("mongo-exports");

    let result = run_import(&state, &LocalFs::new(), &missing, JobOptions::default()).await;

    assert!(matches!(
        result,
        Err(SnapshotError::Filesystem(FsError::MissingRoot { .. }))
    ));
    assert_eq!(state.close_calls(), 1);
}

#[tokio::test]
async fn test_import_ping_failure_is_fatal_and_releases_connection() {
    let state = MemoryState::new();
    state.fail_ping();
    let mut fs = MockArtifactFs::new();
    fs.expect_walk_json_files().never();

    let result = run_import(&state, &fs, Path::new("/in"), JobOptions::default()).await;

    assert!(matches!(result, Err(SnapshotError::Connectivity(_))));
    assert_eq!(state.close_calls(), 1);
}

#[tokio::test]
async fn test_import_releases_connection_once_with_partial_failure() {
    let state = MemoryState::new();
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "shop/bad.json", "not json");
    write_file(temp_dir.path(), "shop/good.json", "[{}]");

    let report = run_import(&state, &LocalFs::new(), temp_dir.path(), JobOptions::default())
        .await
        .unwrap();

    assert_eq!(report.failed(), 1);
    assert_eq!(state.open_calls(), 1);
    assert_eq!(state.close_calls(), 1);
}
