use repono::common::Value;
use repono::doc;
use repono_int_test::test_util::{cleanup, create_test_context, run_test};

#[test]
fn test_factory_memoizes_per_name() {
    run_test(
        create_test_context,
        |ctx| {
            let factory = ctx.factory();
            let comments = factory.get_repository("comment")?;
            let id = comments.add(&doc! { "text": "nice" })?;

            let again = factory.get_repository("comment")?;
            assert_eq!(again.get(&id)?.unwrap().get("text"), Some(&Value::from("nice")));
            assert!(factory.has_repository("comment"));
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_factory_lists_names() {
    run_test(
        create_test_context,
        |ctx| {
            let factory = ctx.factory();
            for name in ["user", "article", "comment"] {
                factory.get_repository(name)?;
            }
            assert_eq!(factory.repository_names(), vec!["article", "comment", "user"]);

            factory.remove_repository("user");
            assert_eq!(factory.repository_names(), vec!["article", "comment"]);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_factory_repository_sees_context_repository_data() {
    run_test(
        create_test_context,
        |ctx| {
            let id = ctx.repository().add(&doc! { "title": "shared" })?;
            let article = ctx.factory().get_repository("article")?;
            assert!(article.has(&id)?);
            assert_eq!(article.count()?, 1);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_removed_registration_keeps_documents() {
    run_test(
        create_test_context,
        |ctx| {
            let factory = ctx.factory();
            let id = factory.get_repository("comment")?.add(&doc! { "text": "kept" })?;
            assert!(factory.remove_repository("comment"));

            let recreated = factory.get_repository("comment")?;
            assert!(recreated.has(&id)?);
            Ok(())
        },
        cleanup,
    );
}
