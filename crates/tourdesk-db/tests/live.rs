//! Live integration tests for tourdesk-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/tourdesk-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tourdesk_core::{
    catalog::parse_catalog, plan_itinerary, ItemType, PlanStop, PriceSource, TourStatus,
};
use tourdesk_db::{
    add_itinerary_item, create_location, create_route, create_tour, delete_itinerary_item,
    get_itinerary_day, get_route, get_tour, get_tour_financials, list_itinerary_days,
    list_itinerary_items, list_locations, list_routes, list_tour_cost_lines, list_tours,
    replace_itinerary, seed_catalog, update_tour_status, upsert_tour_financials, DbError,
    LocationRow, NewItineraryItem, NewLocation, NewRoute, NewTour, TourRow,
};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

async fn insert_test_location(pool: &sqlx::PgPool, name: &str) -> LocationRow {
    create_location(
        pool,
        &NewLocation {
            name,
            country: Some("Sri Lanka"),
            description: None,
        },
    )
    .await
    .unwrap_or_else(|e| panic!("create_location failed for '{name}': {e}"))
}

async fn insert_test_tour(pool: &sqlx::PgPool) -> TourRow {
    create_tour(
        pool,
        &NewTour {
            name: "Test Tour",
            start_date: date(2024, 1, 1),
            duration_days: Some(3),
            total_pax: 2,
        },
    )
    .await
    .expect("create_tour failed")
}

fn plan_stop(location: &LocationRow, nights: u32) -> PlanStop {
    PlanStop {
        location_id: location.id,
        location_name: location.name.clone(),
        nights,
        inbound_route: None,
    }
}

// ---------------------------------------------------------------------------
// Section 1: Catalog
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn location_names_are_unique_case_insensitively(pool: sqlx::PgPool) {
    insert_test_location(&pool, "Kandy").await;

    let err = create_location(
        &pool,
        &NewLocation {
            name: "KANDY",
            country: None,
            description: None,
        },
    )
    .await
    .expect_err("duplicate name should fail");

    assert!(err.is_unique_violation());
}

#[sqlx::test(migrations = "../../migrations")]
async fn routes_are_directional(pool: sqlx::PgPool) {
    let kandy = insert_test_location(&pool, "Kandy").await;
    let ella = insert_test_location(&pool, "Ella").await;

    create_route(
        &pool,
        &NewRoute {
            origin_id: kandy.id,
            destination_id: ella.id,
            description: Some("Scenic train"),
            duration: Some("7h"),
            cost_price: Decimal::from(40),
            sales_price: Decimal::from(55),
        },
    )
    .await
    .expect("create_route failed");

    let forward = get_route(&pool, kandy.id, ella.id)
        .await
        .expect("get_route failed");
    assert!(forward.is_some());

    let reverse = get_route(&pool, ella.id, kandy.id)
        .await
        .expect("get_route failed");
    assert!(reverse.is_none(), "reverse direction is a separate route");
}

#[sqlx::test(migrations = "../../migrations")]
async fn seed_catalog_is_idempotent(pool: sqlx::PgPool) {
    let catalog = parse_catalog(
        r#"
locations:
  - name: Colombo
  - name: Kandy
routes:
  - origin: Colombo
    destination: Kandy
    duration: "3h"
    cost_price: "40.00"
    sales_price: "55.00"
    bidirectional: true
"#,
    )
    .expect("valid catalog");

    let first = seed_catalog(&pool, &catalog).await.expect("first seed");
    assert_eq!(first.locations, 2);
    assert_eq!(first.routes, 2);

    let second = seed_catalog(&pool, &catalog).await.expect("second seed");
    assert_eq!(second, first);

    let locations = list_locations(&pool).await.expect("list_locations");
    assert_eq!(locations.len(), 2);
    let routes = list_routes(&pool).await.expect("list_routes");
    assert_eq!(routes.len(), 2);
    assert!(routes
        .iter()
        .all(|r| r.duration.as_deref() == Some("3h") && r.cost_price == Decimal::from(40)));
}

// ---------------------------------------------------------------------------
// Section 2: Tours
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn new_tour_starts_as_draft_and_status_updates(pool: sqlx::PgPool) {
    let tour = insert_test_tour(&pool).await;
    assert_eq!(tour.tour_status().unwrap(), TourStatus::Draft);

    let updated = update_tour_status(&pool, tour.id, TourStatus::Confirmed)
        .await
        .expect("update_tour_status failed");
    assert_eq!(updated.tour_status().unwrap(), TourStatus::Confirmed);

    let confirmed = list_tours(&pool, Some(TourStatus::Confirmed), 10)
        .await
        .expect("list_tours failed");
    assert_eq!(confirmed.len(), 1);
    let drafts = list_tours(&pool, Some(TourStatus::Draft), 10)
        .await
        .expect("list_tours failed");
    assert!(drafts.is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn update_status_of_missing_tour_is_not_found(pool: sqlx::PgPool) {
    let err = update_tour_status(&pool, Uuid::new_v4(), TourStatus::Cancelled)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound));
}

// ---------------------------------------------------------------------------
// Section 3: Itinerary generation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn replace_itinerary_writes_contiguous_days(pool: sqlx::PgPool) {
    let tour = insert_test_tour(&pool).await;
    let a = insert_test_location(&pool, "A").await;
    let b = insert_test_location(&pool, "B").await;

    let plan = plan_itinerary(tour.start_date, &[plan_stop(&a, 2), plan_stop(&b, 1)])
        .expect("plan");
    let created = replace_itinerary(&pool, tour.id, &plan)
        .await
        .expect("replace_itinerary failed");
    assert_eq!(created, 3);

    let days = list_itinerary_days(&pool, tour.id).await.expect("list days");
    assert_eq!(
        days.iter().map(|d| d.day_number).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(
        days.iter().map(|d| d.date).collect::<Vec<_>>(),
        vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)]
    );
    assert_eq!(days[2].location_id, Some(b.id));
    assert_eq!(days[2].title, "Arrival in B");

    let items = list_itinerary_items(&pool, tour.id).await.expect("list items");
    assert_eq!(items.len(), 1, "only the arrival pickup is generated");
    assert_eq!(items[0].day_id, days[0].id);
    assert_eq!(items[0].kind().unwrap(), ItemType::Transfer);
}

#[sqlx::test(migrations = "../../migrations")]
async fn regenerating_replaces_previous_itinerary(pool: sqlx::PgPool) {
    let tour = insert_test_tour(&pool).await;
    let a = insert_test_location(&pool, "A").await;
    let b = insert_test_location(&pool, "B").await;

    let first = plan_itinerary(tour.start_date, &[plan_stop(&a, 4)]).unwrap();
    replace_itinerary(&pool, tour.id, &first).await.unwrap();

    let second = plan_itinerary(tour.start_date, &[plan_stop(&b, 2)]).unwrap();
    replace_itinerary(&pool, tour.id, &second).await.unwrap();

    let days = list_itinerary_days(&pool, tour.id).await.unwrap();
    assert_eq!(days.len(), 2);
    assert!(days.iter().all(|d| d.location_id == Some(b.id)));

    let items = list_itinerary_items(&pool, tour.id).await.unwrap();
    assert_eq!(items.len(), 1, "old items cascade away with their days");
}

#[sqlx::test(migrations = "../../migrations")]
async fn replace_itinerary_for_missing_tour_writes_nothing(pool: sqlx::PgPool) {
    let a = insert_test_location(&pool, "A").await;
    let plan = plan_itinerary(date(2024, 1, 1), &[plan_stop(&a, 1)]).unwrap();

    let err = replace_itinerary(&pool, Uuid::new_v4(), &plan)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM itinerary_days")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn deleted_location_leaves_day_with_null_location(pool: sqlx::PgPool) {
    let tour = insert_test_tour(&pool).await;
    let a = insert_test_location(&pool, "A").await;
    let plan = plan_itinerary(tour.start_date, &[plan_stop(&a, 1)]).unwrap();
    replace_itinerary(&pool, tour.id, &plan).await.unwrap();

    sqlx::query("DELETE FROM locations WHERE id = $1")
        .bind(a.id)
        .execute(&pool)
        .await
        .unwrap();

    let days = list_itinerary_days(&pool, tour.id).await.unwrap();
    assert_eq!(days.len(), 1);
    assert!(days[0].location_id.is_none());
}

// ---------------------------------------------------------------------------
// Section 4: Item edits
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn added_items_append_in_sort_order(pool: sqlx::PgPool) {
    let tour = insert_test_tour(&pool).await;
    let a = insert_test_location(&pool, "A").await;
    let plan = plan_itinerary(tour.start_date, &[plan_stop(&a, 2)]).unwrap();
    replace_itinerary(&pool, tour.id, &plan).await.unwrap();

    let days = list_itinerary_days(&pool, tour.id).await.unwrap();
    let second_day = days[1].id;

    let hotel = add_itinerary_item(
        &pool,
        second_day,
        &NewItineraryItem {
            item_type: ItemType::Accommodation,
            title: "Hill hotel",
            description: None,
            cost_price: Decimal::from(100),
            sales_price: Decimal::from(130),
        },
    )
    .await
    .expect("add hotel");
    assert_eq!(hotel.sort_order, 0, "first item on an empty day");

    let dinner = add_itinerary_item(
        &pool,
        second_day,
        &NewItineraryItem {
            item_type: ItemType::Meal,
            title: "Dinner",
            description: Some("Rice and curry"),
            cost_price: Decimal::from(15),
            sales_price: Decimal::from(20),
        },
    )
    .await
    .expect("add dinner");
    assert_eq!(dinner.sort_order, 1);

    let day = get_itinerary_day(&pool, second_day).await.unwrap();
    assert!(day.is_some());

    delete_itinerary_item(&pool, hotel.id).await.expect("delete");
    let err = delete_itinerary_item(&pool, hotel.id).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound));
}

// ---------------------------------------------------------------------------
// Section 5: Financials
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn cost_lines_cover_every_item_of_the_tour(pool: sqlx::PgPool) {
    let tour = insert_test_tour(&pool).await;
    let other = insert_test_tour(&pool).await;
    let a = insert_test_location(&pool, "A").await;

    for t in [&tour, &other] {
        let plan = plan_itinerary(t.start_date, &[plan_stop(&a, 1)]).unwrap();
        replace_itinerary(&pool, t.id, &plan).await.unwrap();
    }

    let day = list_itinerary_days(&pool, tour.id).await.unwrap()[0].id;
    for cost in [100, 200, 50] {
        add_itinerary_item(
            &pool,
            day,
            &NewItineraryItem {
                item_type: ItemType::Activity,
                title: "Activity",
                description: None,
                cost_price: Decimal::from(cost),
                sales_price: Decimal::ZERO,
            },
        )
        .await
        .unwrap();
    }

    let lines = list_tour_cost_lines(&pool, tour.id).await.unwrap();
    assert_eq!(lines.len(), 4, "three activities plus the arrival pickup");
    let total: Decimal = lines.iter().map(|l| l.cost_price).sum();
    assert_eq!(total, Decimal::from(350));
}

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_tour_financials_keeps_one_row(pool: sqlx::PgPool) {
    let tour = insert_test_tour(&pool).await;

    upsert_tour_financials(
        &pool,
        tour.id,
        Decimal::from(300),
        Decimal::from(20),
        Decimal::from(420),
        PriceSource::Margin,
    )
    .await
    .expect("first upsert");

    let second = upsert_tour_financials(
        &pool,
        tour.id,
        Decimal::from(300),
        Decimal::from(20),
        Decimal::from(500),
        PriceSource::Manual,
    )
    .await
    .expect("second upsert");
    assert_eq!(second.selling_price, Decimal::from(500));
    assert_eq!(second.source().unwrap(), PriceSource::Manual);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tour_financials WHERE tour_id = $1")
        .bind(tour.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    let saved = get_tour_financials(&pool, tour.id)
        .await
        .unwrap()
        .expect("row exists");
    assert_eq!(saved.profit_margin, Decimal::from(20));
}

#[sqlx::test(migrations = "../../migrations")]
async fn deleting_tour_cascades_to_itinerary_and_financials(pool: sqlx::PgPool) {
    let tour = insert_test_tour(&pool).await;
    let a = insert_test_location(&pool, "A").await;
    let plan = plan_itinerary(tour.start_date, &[plan_stop(&a, 2)]).unwrap();
    replace_itinerary(&pool, tour.id, &plan).await.unwrap();
    upsert_tour_financials(
        &pool,
        tour.id,
        Decimal::ZERO,
        Decimal::ZERO,
        Decimal::ZERO,
        PriceSource::Margin,
    )
    .await
    .unwrap();

    sqlx::query("DELETE FROM tours WHERE id = $1")
        .bind(tour.id)
        .execute(&pool)
        .await
        .unwrap();

    assert!(get_tour(&pool, tour.id).await.unwrap().is_none());
    assert!(list_itinerary_days(&pool, tour.id).await.unwrap().is_empty());
    assert!(get_tour_financials(&pool, tour.id).await.unwrap().is_none());
}
