use repono::cache::{CacheBackend, CacheConfig, CacheFactory, RuntimeEnv};
use repono::doc;
use repono_int_test::test_util::{cleanup, create_test_context, insert_articles, run_test};
use std::sync::Arc;
use std::thread;

#[test]
fn test_cache_in_front_of_repository() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            let ids = insert_articles(&repository, 3)?;
            let factory = CacheFactory::new(CacheConfig::new(RuntimeEnv::Gae, 2))?;
            let cache = factory.get_cache(repository.name());

            for id in &ids {
                if cache.get(id).is_none() {
                    if let Some(document) = repository.get(id)? {
                        cache.put(id, document);
                    }
                }
            }
            assert_eq!(cache.len(), 2);
            assert_eq!(cache.miss_count(), 3);

            let cached = cache.get(&ids[2]).unwrap();
            assert_eq!(Some(cached), repository.get(&ids[2])?);
            assert_eq!(cache.hit_count(), 1);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_factory_shared_between_threads() {
    let factory = CacheFactory::new(CacheConfig::default()).unwrap();
    assert_eq!(factory.backend(), CacheBackend::LocalLru);

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let factory = factory.clone();
            thread::spawn(move || {
                let cache = factory.get_cache("shared");
                cache.put(&format!("key-{}", worker), doc! { "worker": worker });
                cache
            })
        })
        .collect();

    let caches: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for cache in &caches {
        assert!(Arc::ptr_eq(cache, &caches[0]));
    }
    assert_eq!(factory.get_cache("shared").len(), 4);
    assert_eq!(factory.cache_names(), vec!["shared"]);
}
