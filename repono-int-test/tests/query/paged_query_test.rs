use repono::common::Value;
use repono::doc;
use repono::query::{field, Sort};
use repono_int_test::test_util::{
    cleanup, create_test_context, insert_articles, run_test, StoreOp,
};

fn seqs(documents: &[repono::Document]) -> Vec<i64> {
    documents
        .iter()
        .map(|d| *d.get("seq").and_then(|v| v.as_i64()).unwrap())
        .collect()
}

#[test]
fn test_empty_repository_page() {
    run_test(
        create_test_context,
        |ctx| {
            let page = ctx.repository().get_page(1, 10)?;
            assert_eq!(page.page_count(), 0);
            assert!(page.is_empty());
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_pagination_math() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            insert_articles(&repository, 25)?;

            let third = repository.get_page(3, 10)?;
            assert_eq!(third.page_count(), 3);
            assert_eq!(third.len(), 5);

            ctx.store().reset_calls();
            let fourth = repository.get_page(4, 10)?;
            assert_eq!(fourth.page_count(), 3);
            assert!(fourth.is_empty());
            assert_eq!(ctx.store().calls(StoreOp::Count), 1);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_pages_cover_every_record_once() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            insert_articles(&repository, 23)?;

            let mut seen = Vec::new();
            for page_number in 1..=3 {
                let page = repository.get_page_sorted(page_number, 10, &[Sort::asc("seq")])?;
                seen.extend(seqs(page.results()));
            }
            assert_eq!(seen, (0..23).collect::<Vec<i64>>());
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_sort_precedence() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            for (group, seq) in [(1, 0), (2, 1), (1, 2), (2, 3)] {
                repository.add(&doc! { "group": group, "seq": seq })?;
            }

            let page = repository.get_page_sorted(
                1,
                10,
                &[Sort::desc("group"), Sort::asc("seq")],
            )?;
            assert_eq!(seqs(page.results()), vec![1, 3, 0, 2]);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_filtered_and_sorted_page() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            insert_articles(&repository, 30)?;

            let page = repository.get_page_filtered(
                2,
                5,
                &[Sort::desc("seq")],
                &[field("seq").gte(10), field("seq").lt(25)],
            )?;
            assert_eq!(page.page_count(), 3);
            assert_eq!(seqs(page.results()), vec![19, 18, 17, 16, 15]);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_not_equal_filter() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            repository.add(&doc! { "status": "draft", "seq": 0 })?;
            repository.add(&doc! { "status": "live", "seq": 1 })?;
            repository.add(&doc! { "seq": 2 })?;

            let page = repository.get_page_filtered(1, 10, &[], &[field("status").ne("draft")])?;
            // records without the field never match
            assert_eq!(seqs(page.results()), vec![1]);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_sorting_on_missing_field_skips_records() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            repository.add(&doc! { "rank": 2, "seq": 0 })?;
            repository.add(&doc! { "seq": 1 })?;
            repository.add(&doc! { "rank": 1, "seq": 2 })?;

            let page = repository.get_page_sorted(1, 10, &[Sort::asc("rank")])?;
            assert_eq!(seqs(page.results()), vec![2, 0]);
            assert_eq!(page.page_count(), 1);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_large_text_is_not_filterable() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            let body = "b".repeat(501);
            repository.add(&doc! { "body": body.clone(), "seq": 0 })?;

            let page = repository.get_page_filtered(1, 10, &[], &[field("body").eq(body)])?;
            assert!(page.is_empty());
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_envelope_json() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository();
            let id = repository.add(&doc! { "title": "a" })?;

            let json = repository.get_page(1, 10)?.to_json();
            assert_eq!(json["pagination"]["paginationPageCount"], 1);
            assert_eq!(json["rslts"][0]["oId"], Value::from(id).to_json());
            assert_eq!(json["rslts"][0]["title"], "a");
            Ok(())
        },
        cleanup,
    );
}
