use medbook_core::entity::{Column, EntityDescriptor, IdSource, ID};
use medbook_core::{ColumnKind, ListQuery, SqlValue};
use proptest::prelude::*;

static REASON: EntityDescriptor = EntityDescriptor {
    name: "reason",
    table: "reasons",
    id: Column::new(ID, ColumnKind::Uuid),
    id_source: IdSource::Client,
    columns: &[
        Column::new("name", ColumnKind::Text),
        Column::new("image_url", ColumnKind::Text),
    ],
    generated: &[],
};

fn arb_list_query() -> impl Strategy<Value = ListQuery> {
    (
        0u64..50,
        0u64..200,
        prop_oneof![Just(String::new()), "[a-zA-Z0-9+%_ ]{1,12}"],
        prop_oneof![Just(""), Just("name"), Just("created_at"), Just("id")],
        any::<bool>(),
    )
        .prop_map(|(page, limit, value, order_by, deleted)| ListQuery {
            field: "name".to_string(),
            value,
            page,
            limit,
            order_by: order_by.to_string(),
            include_soft_deleted: deleted,
        })
}

proptest! {
    /// Property: the count statement carries exactly the page statement's filter arguments
    #[test]
    fn prop_count_mirrors_page_filters(query in arb_list_query()) {
        let select = query.select(&REASON).unwrap();
        let page = select.build().unwrap();
        let count = select.count().build().unwrap();

        let paging_args = if query.pagination().is_some() { 2 } else { 0 };
        prop_assert_eq!(page.args.len(), count.args.len() + paging_args);
        prop_assert_eq!(&page.args[..count.args.len()], &count.args[..]);

        prop_assert!(!count.sql.contains("LIMIT"));
        prop_assert!(!count.sql.contains("ORDER BY"));
        let page_where = page.sql.split(" FROM ").nth(1).unwrap();
        let count_where = count.sql.split(" FROM ").nth(1).unwrap();
        prop_assert!(page_where.starts_with(count_where));
    }

    /// Property: LIMIT is the caller's limit and OFFSET is limit * (page - 1)
    #[test]
    fn prop_limit_and_offset(page in 1u64..10_000, limit in 1u64..1_000) {
        let stmt = ListQuery::page(page, limit).select(&REASON).unwrap().build().unwrap();
        let n = stmt.args.len();
        prop_assert_eq!(&stmt.args[n - 2], &SqlValue::BigInt(Some(limit as i64)));
        prop_assert_eq!(&stmt.args[n - 1], &SqlValue::BigInt(Some((limit * (page - 1)) as i64)));
    }

    /// Property: arbitrary order-by input never reaches the SQL unless it is a known column
    #[test]
    fn prop_order_by_allow_list(key in "[a-z_;\\- ]{1,24}") {
        let result = ListQuery::page(1, 10).ordered_by(key.clone()).select(&REASON);
        let known = ["id", "name", "image_url", "created_at", "updated_at", "deleted_at"];
        let key = key.trim();
        prop_assert_eq!(result.is_ok(), key.is_empty() || known.contains(&key));
    }
}
