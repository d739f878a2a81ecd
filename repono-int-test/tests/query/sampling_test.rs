use repono::config::RepositoryConfig;
use repono::query::SamplingStrategy;
use repono_int_test::test_util::{
    cleanup, create_test_context, create_test_context_with, insert_articles, run_test,
    TestContext, StoreOp,
};
use repono::errors::{ErrorKind, RepositoryResult};
use std::collections::HashSet;

fn reservoir_context() -> RepositoryResult<TestContext> {
    create_test_context_with(
        RepositoryConfig::builder()
            .sampling_strategy(SamplingStrategy::Reservoir)
            .build()?,
    )
}

fn check_sampling_bounds(ctx: TestContext) -> RepositoryResult<()> {
    let repository = ctx.repository();
    insert_articles(&repository, 12)?;

    let all = repository.get_randomly(12)?;
    assert_eq!(all.len(), 12);
    let distinct: HashSet<_> = all.iter().map(|d| d.id().unwrap().to_string()).collect();
    assert_eq!(distinct.len(), 12);

    let more = repository.get_randomly(100)?;
    assert_eq!(more.len(), 12);

    for fetch_size in 1..12 {
        let sample = repository.get_randomly(fetch_size)?;
        assert_eq!(sample.len(), fetch_size);
        let distinct: HashSet<_> = sample.iter().map(|d| d.id().unwrap().to_string()).collect();
        assert_eq!(distinct.len(), fetch_size);
    }
    Ok(())
}

#[test]
fn test_positional_sampling_bounds() {
    run_test(create_test_context, check_sampling_bounds, cleanup);
}

#[test]
fn test_reservoir_sampling_bounds() {
    run_test(reservoir_context, check_sampling_bounds, cleanup);
}

#[test]
fn test_sampling_empty_repository() {
    run_test(
        create_test_context,
        |ctx| {
            assert!(ctx.repository().get_randomly(5)?.is_empty());
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_sample_is_scoped_to_kind() {
    run_test(
        create_test_context,
        |ctx| {
            let comments = ctx.factory().get_repository("comment")?;
            insert_articles(&comments, 5)?;
            insert_articles(&ctx.repository(), 3)?;

            assert_eq!(ctx.repository().get_randomly(10)?.len(), 3);
            assert_eq!(comments.get_randomly(10)?.len(), 5);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_sample_documents_are_complete() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            insert_articles(&repository, 6)?;
            for document in repository.get_randomly(3)? {
                let id = document.id().unwrap().to_string();
                assert_eq!(repository.get(&id)?, Some(document));
            }
            Ok(())
        },
        cleanup,
    );
}

fn check_scan_failure_surfaces(ctx: TestContext) -> RepositoryResult<()> {
    let repository = ctx.repository();
    insert_articles(&repository, 8)?;

    for position in [0, 3, 7] {
        ctx.store().fail_scan_at(position);
        for fetch_size in [1, 2, 5, 8, 20] {
            let err = repository.get_randomly(fetch_size).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::PersistenceFailure);
            assert_eq!(err.root_cause().kind(), &ErrorKind::BackendError);
        }
    }
    assert!(ctx.store().calls(StoreOp::ScanAll) > 0);
    Ok(())
}

#[test]
fn test_positional_sampling_reports_scan_failure() {
    run_test(create_test_context, check_scan_failure_surfaces, cleanup);
}

#[test]
fn test_reservoir_sampling_reports_scan_failure() {
    run_test(reservoir_context, check_scan_failure_surfaces, cleanup);
}
