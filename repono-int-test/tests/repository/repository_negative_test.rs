use repono::common::Value;
use repono::doc;
use repono::errors::ErrorKind;
use repono::query::{field, Filter, Sort};
use repono_int_test::test_util::{cleanup, create_test_context, run_test, StoreOp};

#[test]
fn test_unsupported_type_is_not_persisted() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            let mut document = doc! { "title": "a" };
            document.put("meta", Value::Object(Default::default()))?;

            let err = repository.add(&document).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::UnsupportedType);
            assert!(err.message().contains("meta"));
            assert_eq!(ctx.store().calls(StoreOp::Put), 0);
            assert_eq!(ctx.store().entity_count(), 0);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_unsupported_operator_never_reaches_store() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            let filters = vec![field("viewCount").gt(1), Filter::raw("title", "STARTS_WITH", "a")];

            let err = repository
                .get_page_filtered(1, 10, &[], &filters)
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::UnsupportedOperator);
            assert!(err.message().contains("STARTS_WITH"));
            assert_eq!(ctx.store().total_calls(), 0);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_invalid_page_parameters_never_reach_store() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            assert_eq!(
                repository.get_page(1, 0).unwrap_err().kind(),
                &ErrorKind::InvalidPageSize
            );
            assert_eq!(
                repository.get_page_sorted(0, 10, &[Sort::asc("title")]).unwrap_err().kind(),
                &ErrorKind::InvalidPageNumber
            );
            assert_eq!(ctx.store().total_calls(), 0);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_empty_ids_are_rejected() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            assert_eq!(repository.get("").unwrap_err().kind(), &ErrorKind::InvalidId);
            assert_eq!(repository.has("").unwrap_err().kind(), &ErrorKind::InvalidId);
            assert_eq!(repository.remove("").unwrap_err().kind(), &ErrorKind::InvalidId);
            assert_eq!(
                repository.update("", &doc! { "a": 1 }).unwrap_err().kind(),
                &ErrorKind::InvalidId
            );
            assert_eq!(
                repository.add(&doc! { "oId": "" }).unwrap_err().kind(),
                &ErrorKind::InvalidId
            );
            assert_eq!(ctx.store().total_calls(), 0);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_backend_failures_become_persistence_failures() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            let id = repository.add(&doc! { "title": "a" })?;

            let store = ctx.store();
            store.fail_on(StoreOp::Put);
            store.fail_on(StoreOp::Get);
            store.fail_on(StoreOp::Delete);
            store.fail_on(StoreOp::Count);
            store.fail_on(StoreOp::ScanAll);

            for err in [
                repository.add(&doc! { "title": "b" }).unwrap_err(),
                repository.update(&id, &doc! { "title": "c" }).unwrap_err(),
                repository.get(&id).unwrap_err(),
                repository.remove(&id).unwrap_err(),
                repository.has(&id).unwrap_err(),
                repository.count().unwrap_err(),
                repository.get_page(1, 10).unwrap_err(),
                repository.get_randomly(1).unwrap_err(),
            ] {
                assert_eq!(err.kind(), &ErrorKind::PersistenceFailure);
                assert_eq!(err.root_cause().kind(), &ErrorKind::BackendError);
            }
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_unindexed_filter_value_is_a_persistence_failure() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            repository.add(&doc! { "title": "a" })?;

            let filters = vec![field("title").eq(Value::Text("a".into()))];
            let err = repository.get_page_filtered(1, 10, &[], &filters).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::PersistenceFailure);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_non_string_id_is_rejected() {
    run_test(
        create_test_context,
        |ctx| {
            let err = ctx.repository().add(&doc! { "oId": 42 }).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidId);
            Ok(())
        },
        cleanup,
    );
}
