use chrono::Utc;
use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;
use todo_items::database_api;
use todo_items::database_api::SqliteItemStore;
use todo_items::item_model::NewItem;
use todo_items::item_store::ItemFilter;
use todo_items::item_store::ItemStore;
use todo_items::item_store::RequestContext;
use todo_items::item_store::SortDirection;

/// Test the performance of counting and reading one page of items,
/// the two store calls made for every listing request.
fn criterion_benchmark(c: &mut Criterion) {
    let pool = database_api::open_in_memory_pool().unwrap();
    let store = SqliteItemStore::new(pool).unwrap();
    let ctx = RequestContext::background();
    for i in 0..10_000 {
        let now = Utc::now();
        let item = NewItem {
            title: format!("Item {}", i),
            description: "benchmark row".to_string(),
            created_at: now,
            updated_at: now,
        };
        store.create(&ctx, item).unwrap();
    }
    let filter = ItemFilter::visible();

    c.bench_function("count and list a middle page of 10k items", |b| {
        b.iter(|| {
            let total = store.count(&ctx, &filter).unwrap();
            let page = store
                .list_page(&ctx, &filter, 5_000, 10, SortDirection::Descending)
                .unwrap();
            assert_eq!(total, 10_000);
            assert_eq!(page.len(), 10);
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
