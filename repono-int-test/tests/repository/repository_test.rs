use repono::common::{Value, MAX_STRING_PROPERTY_LENGTH};
use repono::doc;
use repono_int_test::test_util::{
    cleanup, create_test_context, generate_article, run_test, StoreOp,
};

#[test]
fn test_add_and_get() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            let article = generate_article();
            let id = repository.add(&article)?;

            let mut expected = article.clone();
            expected.set_id(&id);
            assert_eq!(repository.get(&id)?, Some(expected));
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_add_without_id_generates_ordered_ids() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            let first = repository.add(&doc! { "title": "first" })?;
            let second = repository.add(&doc! { "title": "second" })?;

            assert!(!first.is_empty());
            assert!(!second.is_empty());
            assert_ne!(first, second);
            assert!(second > first);
            assert!(second.parse::<u64>().unwrap() > first.parse::<u64>().unwrap());
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_update_creates_missing_record() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            repository.update("1300000000000", &doc! { "oId": "ignored", "title": "upsert" })?;

            let stored = repository.get("1300000000000")?.unwrap();
            assert_eq!(stored, doc! { "oId": "1300000000000", "title": "upsert" });
            assert_eq!(repository.count()?, 1);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_update_replaces_whole_document() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            let id = repository.add(&doc! { "title": "a", "viewCount": 1 })?;
            repository.update(&id, &doc! { "title": "b" })?;

            let stored = repository.get(&id)?.unwrap();
            assert_eq!(stored.get("title"), Some(&Value::from("b")));
            assert!(!stored.contains_key("viewCount"));
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_remove_missing_id_twice() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            repository.remove("1234567890123")?;
            repository.remove("1234567890123")?;
            assert!(!repository.has("1234567890123")?);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_get_missing_is_none() {
    run_test(
        create_test_context,
        |ctx| {
            assert!(ctx.repository().get("404")?.is_none());
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_has_counts_instead_of_fetching() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            let id = repository.add(&generate_article())?;
            ctx.store().reset_calls();

            assert!(repository.has(&id)?);
            assert_eq!(ctx.store().calls(StoreOp::Count), 1);
            assert_eq!(ctx.store().calls(StoreOp::Get), 0);
            assert_eq!(ctx.store().calls(StoreOp::FetchPage), 0);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_oversized_string_round_trip() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            let body = "ä".repeat(MAX_STRING_PROPERTY_LENGTH + 1);
            let id = repository.add(&doc! { "body": body.clone() })?;

            let stored = repository.get(&id)?.unwrap();
            assert_eq!(stored.get("body"), Some(&Value::String(body)));
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_all_supported_types_round_trip() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            let mut article = generate_article();
            article.put("thumbnail", vec![0u8, 255, 7])?;
            article.put("summary", "s".repeat(MAX_STRING_PROPERTY_LENGTH))?;

            let id = repository.add(&article)?;
            article.set_id(&id);
            assert_eq!(repository.get(&id)?, Some(article));
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_document_from_json_round_trip() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            let json = serde_json::json!({
                "oId": "1291812345678",
                "articleTitle": "Hello",
                "articleViewCount": 3,
                "articleIsPublished": true
            });
            let document = repono::Document::from_json(&json)?;
            let id = repository.add(&document)?;
            assert_eq!(id, "1291812345678");

            let stored = repository.get(&id)?.unwrap();
            assert_eq!(stored.to_json(), json);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_has_finds_ids_longer_than_string_limit() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            let added = "i".repeat(MAX_STRING_PROPERTY_LENGTH + 1);
            let updated = "u".repeat(MAX_STRING_PROPERTY_LENGTH * 2);

            assert_eq!(repository.add(&doc! { "oId": added.clone(), "t": "x" })?, added);
            repository.update(&updated, &doc! { "t": "y" })?;

            for id in [&added, &updated] {
                assert!(repository.get(id)?.is_some());
                assert!(repository.has(id)?);
            }
            Ok(())
        },
        cleanup,
    );
}
