/*!
 * Tests for the shared model handle cache
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use indicmt::translation::ModelRef;
use indicmt::translation::cache::ModelCache;

#[tokio::test]
async fn test_getOrLoad_withConcurrentFirstUse_shouldConvergeOnOneHandle() {
    let cache: ModelCache<String> = ModelCache::new();
    let loads = Arc::new(AtomicUsize::new(0));
    let model = ModelRef::Hub { id: "Helsinki-NLP/opus-mt-en-hi".to_string() };

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let cache = cache.clone();
        let loads = Arc::clone(&loads);
        let model = model.clone();
        tasks.push(tokio::spawn(async move {
            cache
                .get_or_load(&model, |m| {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(format!("handle for {}", m))
                })
                .unwrap()
        }));
    }

    let mut handles = Vec::new();
    for task in tasks {
        handles.push(task.await.unwrap());
    }

    assert_eq!(cache.len(), 1);
    assert!(loads.load(Ordering::SeqCst) >= 1);
    let stored = cache
        .get_or_load(&model, |_| -> Result<String, String> { panic!("handle should be cached") })
        .unwrap();
    assert!(handles.iter().all(|h| **h == *stored));
}

#[test]
fn test_getOrLoad_withDistinctModels_shouldKeepSeparateEntries() {
    let cache: ModelCache<usize> = ModelCache::new();
    let hub = ModelRef::Hub { id: "a".to_string() };
    let local = ModelRef::Local { path: "models/local/en-hi".into() };

    assert_eq!(*cache.get_or_load(&hub, |_| Ok::<_, ()>(1)).unwrap(), 1);
    assert_eq!(*cache.get_or_load(&local, |_| Ok::<_, ()>(2)).unwrap(), 2);
    assert_eq!(*cache.get_or_load(&hub, |_| Ok::<_, ()>(3)).unwrap(), 1);

    let (hits, loads) = cache.stats();
    assert_eq!((hits, loads), (1, 2));
}
