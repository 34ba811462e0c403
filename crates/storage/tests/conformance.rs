use hrdesk_storage::conformance::run_conformance_suite;
use hrdesk_storage::{JsonFileStorage, MemoryStorage};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_backend_conformance() {
    let report = run_conformance_suite(|| async { MemoryStorage::new() }).await;
    assert!(report.total > 0);
    assert_eq!(report.failed, 0, "{report}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn json_file_backend_conformance() {
    let root = tempfile::tempdir().expect("tempdir");
    let counter = std::sync::atomic::AtomicUsize::new(0);
    let report = run_conformance_suite(|| {
        let n = counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let dir = root.path().join(format!("case-{n}"));
        async move {
            JsonFileStorage::open(dir)
                .await
                .expect("open json storage")
        }
    })
    .await;
    assert!(report.total > 0);
    assert_eq!(report.failed, 0, "{report}");
}
