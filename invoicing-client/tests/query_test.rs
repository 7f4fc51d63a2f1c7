//! Query resolution: filter, search, sort, count and slice.

mod common;

use common::{persisted, twelve_invoices};
use invoicing_client::{
    resolve, InvoiceCollection, InvoiceQuery, PageControls, Pagination, PaymentFilter,
    PaymentStatus, Reconciliation, SortDirection, SortKey,
};
use std::collections::BTreeMap;

fn no_statuses() -> BTreeMap<i64, PaymentStatus> {
    BTreeMap::new()
}

fn ids(page: &invoicing_client::ResultPage) -> Vec<i64> {
    page.items.iter().filter_map(|invoice| invoice.id()).collect()
}

#[test]
fn first_page_of_twelve() {
    let collection = twelve_invoices();
    let query = InvoiceQuery::default()
        .with_sort(SortKey::Date, SortDirection::Ascending)
        .with_filter(PaymentFilter::All)
        .with_pagination(Pagination::new(0, 10).unwrap());

    let page = resolve(&collection, &query, &no_statuses());

    assert_eq!(page.items.len(), 10);
    assert_eq!(page.total_count, 12);
    assert_eq!(ids(&page), (1..=10).collect::<Vec<_>>());

    let controls = PageControls::new(query.pagination, page.total_count);
    assert_eq!(controls.page_count, 2);
    assert_eq!(controls.page_index, 1);
    assert!(!controls.has_previous);
    assert!(controls.has_next);

    let next = query.clone().with_pagination(query.pagination.next());
    let second = resolve(&collection, &next, &no_statuses());
    assert_eq!(ids(&second), vec![11, 12]);
    assert!(!PageControls::new(next.pagination, second.total_count).has_next);
}

#[test]
fn paid_invoice_is_excluded_from_unpaid_search() {
    let collection = vec![
        persisted(1, "INV-1", "Acme", "2024-01-01", "10.00"),
        persisted(2, "INV-2", "Globex", "2024-01-02", "20.00"),
    ];
    let statuses: BTreeMap<i64, PaymentStatus> = BTreeMap::from([(1, PaymentStatus::Paid)]);
    let query = InvoiceQuery::default()
        .with_search("acme")
        .with_filter(PaymentFilter::Unpaid);

    let page = resolve(&collection, &query, &statuses);

    assert_eq!(page.total_count, 0);
    assert!(page.items.is_empty());

    let paid = resolve(
        &collection,
        &query.clone().with_filter(PaymentFilter::Paid),
        &statuses,
    );
    assert_eq!(ids(&paid), vec![1]);
}

#[test]
fn unknown_status_counts_as_unpaid() {
    let collection = twelve_invoices();
    let statuses: BTreeMap<i64, PaymentStatus> =
        BTreeMap::from([(3, PaymentStatus::Paid), (4, PaymentStatus::Unpaid)]);

    let unpaid = resolve(
        &collection,
        &InvoiceQuery::default().with_filter(PaymentFilter::Unpaid),
        &statuses,
    );
    assert_eq!(unpaid.total_count, 11);
    assert!(!ids(&unpaid).contains(&3));
}

#[test]
fn resolving_twice_is_identical() {
    let collection = twelve_invoices();
    let query = InvoiceQuery::default()
        .with_search("customer 1")
        .with_sort(SortKey::TotalAmount, SortDirection::Descending)
        .with_pagination(Pagination::new(1, 2).unwrap());

    let first = resolve(&collection, &query, &no_statuses());
    let second = resolve(&collection, &query, &no_statuses());
    assert_eq!(first, second);
}

#[test]
fn offset_past_the_end_is_empty_not_an_error() {
    let collection = twelve_invoices();
    for offset in [12, 13, 1_000] {
        let query = InvoiceQuery::default().with_pagination(Pagination::new(offset, 10).unwrap());
        let page = resolve(&collection, &query, &no_statuses());
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 12);
    }

    let page = resolve(&[], &InvoiceQuery::default(), &no_statuses());
    assert!(page.items.is_empty());
    assert_eq!(page.total_count, 0);
}

#[test]
fn equal_keys_are_ordered_by_id_regardless_of_input_order() {
    let collection = vec![
        persisted(9, "INV-9", "Acme", "2024-03-01", "50.00"),
        persisted(2, "INV-2", "Acme", "2024-03-01", "50.00"),
        persisted(5, "INV-5", "Acme", "2024-01-01", "50.00"),
        persisted(7, "INV-7", "Acme", "2024-03-01", "10.00"),
    ];

    let by_date = resolve(&collection, &InvoiceQuery::default(), &no_statuses());
    assert_eq!(ids(&by_date), vec![5, 2, 7, 9]);

    let by_total = resolve(
        &collection,
        &InvoiceQuery::default().with_sort(SortKey::TotalAmount, SortDirection::Ascending),
        &no_statuses(),
    );
    assert_eq!(ids(&by_total), vec![7, 2, 5, 9]);

    // Direction flips the key only; ties stay ascending by id.
    let by_total_desc = resolve(
        &collection,
        &InvoiceQuery::default().with_sort(SortKey::TotalAmount, SortDirection::Descending),
        &no_statuses(),
    );
    assert_eq!(ids(&by_total_desc), vec![2, 5, 9, 7]);

    let mut reversed = collection.clone();
    reversed.reverse();
    assert_eq!(
        resolve(&reversed, &InvoiceQuery::default(), &no_statuses()),
        by_date
    );
}

#[test]
fn search_is_case_insensitive_and_needs_every_term() {
    let collection = vec![
        persisted(1, "INV-100", "Acme Corp", "2024-01-01", "10.00"),
        persisted(2, "INV-200", "Acme Labs", "2024-01-02", "10.00"),
        persisted(3, "ACME-300", "Globex", "2024-01-03", "10.00"),
        persisted(4, "INV-400", "Initech", "2024-01-04", "10.00"),
    ];

    let search = |text: &str| {
        ids(&resolve(
            &collection,
            &InvoiceQuery::default().with_search(text),
            &no_statuses(),
        ))
    };

    assert_eq!(search("ACME"), vec![1, 2, 3]);
    assert_eq!(search("acme labs"), vec![2]);
    assert_eq!(search("inv-4"), vec![4]);
    assert_eq!(search("   "), vec![1, 2, 3, 4]);
    assert_eq!(search(""), vec![1, 2, 3, 4]);
    assert!(search("umbrella").is_empty());
}

#[test]
fn text_sort_keys() {
    let collection = vec![
        persisted(1, "INV-3", "Charlie", "2024-01-01", "10.00"),
        persisted(2, "INV-1", "Alpha", "2024-01-01", "10.00"),
        persisted(3, "INV-2", "Bravo", "2024-01-01", "10.00"),
    ];

    let by_customer = resolve(
        &collection,
        &InvoiceQuery::default().with_sort(SortKey::CustomerName, SortDirection::Ascending),
        &no_statuses(),
    );
    assert_eq!(ids(&by_customer), vec![2, 3, 1]);

    let by_number_desc = resolve(
        &collection,
        &InvoiceQuery::default().with_sort(SortKey::InvoiceNumber, SortDirection::Descending),
        &no_statuses(),
    );
    assert_eq!(ids(&by_number_desc), vec![1, 3, 2]);
}

#[test]
fn collection_reconciliation_touches_only_the_target() {
    let mut collection = InvoiceCollection::new(twelve_invoices());
    let before = collection.clone();

    let created = persisted(13, "INV-013", "Newco", "2024-02-01", "5.00");
    assert!(collection.reconcile(&Reconciliation::Created(created.clone())));
    assert_eq!(collection.len(), 13);
    assert_eq!(collection.as_slice()[0], created);
    assert_eq!(&collection.as_slice()[1..], before.as_slice());

    let updated = persisted(5, "INV-005", "Renamed", "2024-01-05", "99.00");
    assert!(collection.reconcile(&Reconciliation::Updated(updated.clone())));
    assert_eq!(collection.get(5), Some(&updated));
    for (index, invoice) in collection.as_slice()[1..].iter().enumerate() {
        if invoice.id() != Some(5) {
            assert_eq!(invoice, &before.as_slice()[index]);
        }
    }

    let missing = persisted(77, "INV-077", "Nobody", "2024-01-05", "1.00");
    assert!(!collection.reconcile(&Reconciliation::Updated(missing)));
    assert_eq!(collection.len(), 13);

    assert!(collection.remove(13));
    assert!(!collection.remove(13));
    assert_eq!(collection.len(), 12);
}
