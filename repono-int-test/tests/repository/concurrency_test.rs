use repono::doc;
use repono_int_test::test_util::{cleanup, create_test_context, run_test};
use std::collections::HashSet;
use std::thread;

#[test]
fn test_concurrent_adds_get_distinct_ids() {
    run_test(
        create_test_context,
        |ctx| {
            let mut handles = Vec::new();
            for worker in 0..8 {
                let repository = ctx.repository();
                handles.push(thread::spawn(move || {
                    let mut ids = Vec::new();
                    for seq in 0..50 {
                        ids.push(repository.add(&doc! { "worker": worker, "seq": seq })?);
                    }
                    Ok::<_, repono::RepositoryError>(ids)
                }));
            }

            let mut all_ids = Vec::new();
            for handle in handles {
                all_ids.extend(handle.join().unwrap()?);
            }

            let distinct: HashSet<_> = all_ids.iter().collect();
            assert_eq!(distinct.len(), 400);
            assert_eq!(ctx.repository().count()?, 400);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_concurrent_readers_and_writers() {
    run_test(
        create_test_context,
        |ctx| {
            let writer = {
                let repository = ctx.repository();
                thread::spawn(move || {
                    for seq in 0..100 {
                        repository.update(&format!("{:013}", seq), &doc! { "seq": seq })?;
                    }
                    Ok::<_, repono::RepositoryError>(())
                })
            };

            let reader = {
                let repository = ctx.repository();
                thread::spawn(move || {
                    for _ in 0..20 {
                        let page = repository.get_page(1, 10)?;
                        assert!(page.len() <= 10);
                        repository.get_randomly(5)?;
                    }
                    Ok::<_, repono::RepositoryError>(())
                })
            };

            writer.join().unwrap()?;
            reader.join().unwrap()?;
            assert_eq!(ctx.repository().count()?, 100);
            Ok(())
        },
        cleanup,
    );
}
