//! Registry built from configuration inside a host runtime

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::settled_stats;
use strand_core::executor::SharedPool;
use strand_core::port::error_handler::mocks::RecordingErrorHandler;
use strand_core::{
    ExclusiveQueueExt, QueueError, QueueFactory, QueueRegistry, QueueSpec, QueueSystemConfig,
    Strategy,
};

const CONFIG: &str = r#"{
    "pool": { "max_threads": 4, "thread_name": "host-pool" },
    "queues": [
        { "name": "ui", "strategy": "affinity_primary" },
        { "name": "overlay", "strategy": "affinity_secondary" },
        { "name": "script", "strategy": "dedicated_worker" },
        { "name": "io", "strategy": "shared_pool" }
    ]
}"#;

fn host_registry() -> (Arc<QueueRegistry>, Arc<RecordingErrorHandler>) {
    let config: QueueSystemConfig = serde_json::from_str(CONFIG).unwrap();
    let pool = SharedPool::current().expect("test runs inside a runtime");
    let factory = QueueFactory::new(config.pool.clone()).with_pool(pool);
    let handler = Arc::new(RecordingErrorHandler::new());
    let registry =
        QueueRegistry::from_config_with_factory(&config, factory, handler.clone()).unwrap();
    (Arc::new(registry), handler)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_registry_serves_configured_queues() {
    let (registry, handler) = host_registry();
    assert_eq!(registry.names(), vec!["io", "overlay", "script", "ui"]);

    let ran = Arc::new(AtomicUsize::new(0));
    let worker = Arc::clone(&registry);
    let counter = Arc::clone(&ran);
    tokio::task::spawn_blocking(move || {
        for name in worker.names() {
            let queue = worker.get(&name).unwrap();
            for _ in 0..50 {
                let counter = Arc::clone(&counter);
                queue
                    .post_fn(move || {
                        counter.fetch_add(1, Ordering::SeqCst);
                    })
                    .unwrap();
            }
            queue.post(|| Err("expected".into())).unwrap();
            settled_stats(queue.as_ref());
        }
    })
    .await
    .unwrap();

    assert_eq!(ran.load(Ordering::SeqCst), 200);
    assert_eq!(handler.count(), 4);
    for stats in registry.stats() {
        assert_eq!(stats.completed, 51, "{}", stats.name);
        assert_eq!(stats.failed, 1, "{}", stats.name);
    }

    let disposing = Arc::clone(&registry);
    tokio::task::spawn_blocking(move || disposing.dispose_all())
        .await
        .unwrap();
    assert!(registry.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_duplicate_names_are_rejected() {
    let (registry, _) = host_registry();

    let err = registry
        .create(QueueSpec::new("script", Strategy::SharedPool).unwrap())
        .unwrap_err();
    assert!(matches!(err, QueueError::DuplicateQueue(_)));

    let disposing = Arc::clone(&registry);
    tokio::task::spawn_blocking(move || disposing.dispose_all())
        .await
        .unwrap();
}

#[test]
fn test_unknown_strategy_in_config_is_rejected() {
    let result: Result<QueueSystemConfig, _> = serde_json::from_str(
        r#"{ "queues": [ { "name": "x", "strategy": "thread_per_action" } ] }"#,
    );
    let err = result.unwrap_err();
    assert!(err.to_string().contains("thread_per_action"));
}
