//! End-to-end behaviour of the order lifecycle and line-item edits.

mod common;

use distrib_core::{Actor, CoreError, DiscountKind, SaleStatus, StockShortage};
use distrib_sales::dto::{
    AddItemRequest, CreateSaleRequest, ListSalesRequest, StockCheckLine, UpdateItemRequest,
    UpdateSaleRequest,
};
use distrib_sales::SalesError;

const MISSING: &str = "00000000-0000-4000-8000-000000000000";

fn seller() -> Actor {
    Actor::salesperson("u-ana")
}

fn core(err: SalesError) -> CoreError {
    match err {
        SalesError::Core(e) => e,
        other => panic!("expected a domain error, got {other:?}"),
    }
}

fn create(customer_id: &str, items: Vec<AddItemRequest>) -> CreateSaleRequest {
    CreateSaleRequest {
        customer_id: customer_id.to_string(),
        items,
        ..Default::default()
    }
}

// =============================================================================
// Reservation and release
// =============================================================================

#[tokio::test]
async fn test_confirm_reserves_and_cancel_releases() {
    let fx = common::in_memory().await;
    let product = fx.product("PAN001", 1000, 5).await;
    let orders = fx.service.orders();

    let sale = orders
        .create_sale(&seller(), create(&fx.customer_id, vec![AddItemRequest::new(&product, 5)]))
        .await
        .unwrap();
    assert_eq!(sale.sale.status, SaleStatus::Draft);
    assert_eq!(sale.items[0].total_cents, 5000);
    assert_eq!(sale.sale.subtotal_cents, 5000);
    assert_eq!(fx.stock(&product).await, 5);

    let id = sale.sale.id.clone();
    orders.submit(&seller(), &id).await.unwrap();
    let confirmed = orders.confirm(&seller(), &id).await.unwrap();
    assert_eq!(confirmed.sale.status, SaleStatus::Confirmed);
    assert_eq!(fx.stock(&product).await, 0);

    let cancelled = orders.cancel(&seller(), &id).await.unwrap();
    assert_eq!(cancelled.sale.status, SaleStatus::Cancelled);
    assert!(cancelled.sale.cancelled_at.is_some());
    assert_eq!(fx.stock(&product).await, 5);
}

#[tokio::test]
async fn test_cancel_unconfirmed_sale_leaves_stock_alone() {
    let fx = common::in_memory().await;
    let product = fx.product("CX001", 550, 8).await;
    let orders = fx.service.orders();

    let sale = orders
        .create_sale(&seller(), create(&fx.customer_id, vec![AddItemRequest::new(&product, 3)]))
        .await
        .unwrap();
    orders.submit(&seller(), &sale.sale.id).await.unwrap();
    orders.cancel(&seller(), &sale.sale.id).await.unwrap();

    assert_eq!(fx.stock(&product).await, 8);

    let draft = orders
        .create_sale(&seller(), create(&fx.customer_id, vec![AddItemRequest::new(&product, 8)]))
        .await
        .unwrap();
    let cancelled = orders.cancel(&seller(), &draft.sale.id).await.unwrap();
    assert_eq!(cancelled.sale.status, SaleStatus::Cancelled);
    assert_eq!(fx.stock(&product).await, 8);

    let err = core(orders.cancel(&seller(), &sale.sale.id).await.unwrap_err());
    assert!(matches!(
        err,
        CoreError::InvalidStateTransition {
            current: SaleStatus::Cancelled,
            ..
        }
    ));
}

#[tokio::test]
async fn test_confirm_shortage_is_all_or_nothing() {
    let fx = common::in_memory().await;
    let tape = fx.product("FIT001", 890, 10).await;
    let glue = fx.product("COL001", 450, 4).await;
    let orders = fx.service.orders();

    let sale = orders
        .create_sale(
            &seller(),
            create(
                &fx.customer_id,
                vec![AddItemRequest::new(&tape, 6), AddItemRequest::new(&glue, 4)],
            ),
        )
        .await
        .unwrap();
    orders.submit(&seller(), &sale.sale.id).await.unwrap();

    // Stock consumed elsewhere between add and confirm.
    fx.db().inventory().set_stock(&glue, 1, 2, None).await.unwrap();

    let err = core(orders.confirm(&seller(), &sale.sale.id).await.unwrap_err());
    match err {
        CoreError::InsufficientStock(shortages) => {
            assert_eq!(shortages, vec![StockShortage::new(glue.clone(), 4, 1)]);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(fx.stock(&tape).await, 10);
    assert_eq!(fx.stock(&glue).await, 1);
    let stored = fx.service.get_sale(&seller(), &sale.sale.id).await.unwrap();
    assert_eq!(stored.sale.status, SaleStatus::Pending);
}

#[tokio::test]
async fn test_complete_keeps_stock_and_is_terminal() {
    let fx = common::in_memory().await;
    let product = fx.product("LIQ001", 29999, 3).await;
    let orders = fx.service.orders();

    let sale = orders
        .create_sale(&seller(), create(&fx.customer_id, vec![AddItemRequest::new(&product, 2)]))
        .await
        .unwrap();
    let id = sale.sale.id;

    let err = core(orders.complete(&seller(), &id).await.unwrap_err());
    assert!(matches!(err, CoreError::InvalidStateTransition { .. }));

    orders.submit(&seller(), &id).await.unwrap();
    orders.confirm(&seller(), &id).await.unwrap();
    let completed = orders.complete(&seller(), &id).await.unwrap();

    assert_eq!(completed.sale.status, SaleStatus::Completed);
    assert!(completed.sale.completed_at.is_some());
    assert_eq!(fx.stock(&product).await, 1);

    let err = core(orders.cancel(&seller(), &id).await.unwrap_err());
    match err {
        CoreError::InvalidStateTransition { allowed, .. } => assert_eq!(
            allowed,
            vec![SaleStatus::Draft, SaleStatus::Pending, SaleStatus::Confirmed]
        ),
        other => panic!("unexpected error: {other:?}"),
    }
}

// =============================================================================
// Transition preconditions
// =============================================================================

#[tokio::test]
async fn test_empty_sale_cannot_advance() {
    let fx = common::in_memory().await;
    let orders = fx.service.orders();

    let sale = orders
        .create_sale(&seller(), create(&fx.customer_id, vec![]))
        .await
        .unwrap();
    assert_eq!(sale.sale.total_cents, 0);

    let err = core(orders.submit(&seller(), &sale.sale.id).await.unwrap_err());
    assert!(matches!(err, CoreError::EmptySale(id) if id == sale.sale.id));
}

#[tokio::test]
async fn test_confirm_rejects_pending_sale_emptied_after_submit() {
    let fx = common::in_memory().await;
    let product = fx.product("PAN003", 1500, 5).await;
    let orders = fx.service.orders();

    let sale = orders
        .create_sale(&seller(), create(&fx.customer_id, vec![AddItemRequest::new(&product, 2)]))
        .await
        .unwrap();
    let id = sale.sale.id.clone();
    orders.submit(&seller(), &id).await.unwrap();

    let emptied = fx
        .service
        .line_items()
        .remove_item(&seller(), &id, &sale.items[0].id)
        .await
        .unwrap();
    assert_eq!(emptied.sale.status, SaleStatus::Pending);
    assert!(emptied.items.is_empty());
    assert_eq!(emptied.sale.total_cents, 0);

    let err = core(orders.confirm(&seller(), &id).await.unwrap_err());
    assert!(matches!(err, CoreError::EmptySale(ref sale_id) if *sale_id == id));

    assert_eq!(fx.stock(&product).await, 5);
    let stored = fx.service.get_sale(&seller(), &id).await.unwrap();
    assert_eq!(stored.sale.status, SaleStatus::Pending);
}

#[tokio::test]
async fn test_confirm_requires_pending() {
    let fx = common::in_memory().await;
    let product = fx.product("PAN002", 18990, 10).await;
    let orders = fx.service.orders();

    let sale = orders
        .create_sale(&seller(), create(&fx.customer_id, vec![AddItemRequest::new(&product, 1)]))
        .await
        .unwrap();

    let err = core(orders.confirm(&seller(), &sale.sale.id).await.unwrap_err());
    match err {
        CoreError::InvalidStateTransition {
            current, allowed, ..
        } => {
            assert_eq!(current, SaleStatus::Draft);
            assert_eq!(allowed, vec![SaleStatus::Pending]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(fx.stock(&product).await, 10);
}

#[tokio::test]
async fn test_create_rejects_unknown_or_inactive_customer() {
    let fx = common::in_memory().await;
    let orders = fx.service.orders();

    let err = core(orders.create_sale(&seller(), create(MISSING, vec![])).await.unwrap_err());
    assert!(matches!(err, CoreError::NotFound { entity: "Customer", .. }));

    let customer = fx.customer("Cliente Inativo").await;
    fx.db().catalog().set_customer_active(&customer, false).await.unwrap();
    let err = core(orders.create_sale(&seller(), create(&customer, vec![])).await.unwrap_err());
    assert!(matches!(err, CoreError::NotFound { entity: "Customer", .. }));
}

#[tokio::test]
async fn test_create_with_bad_item_writes_nothing() {
    let fx = common::in_memory().await;
    let ok = fx.product("FIT002", 890, 10).await;
    let scarce = fx.product("FIT003", 990, 1).await;

    let err = core(
        fx.service
            .orders()
            .create_sale(
                &seller(),
                create(
                    &fx.customer_id,
                    vec![AddItemRequest::new(&ok, 1), AddItemRequest::new(&scarce, 2)],
                ),
            )
            .await
            .unwrap_err(),
    );
    assert!(matches!(err, CoreError::InsufficientStock(_)));

    let listed = fx
        .service
        .list_sales(&Actor::admin("u-admin"), ListSalesRequest::default())
        .await
        .unwrap();
    assert_eq!(listed.pagination.total, 0);
}

// =============================================================================
// Line items
// =============================================================================

#[tokio::test]
async fn test_sale_total_includes_discount_and_tax() {
    let fx = common::in_memory().await;
    let product = fx.product("LIQ002", 1000, 20).await;

    let sale = fx
        .service
        .orders()
        .create_sale(
            &seller(),
            CreateSaleRequest {
                customer_id: fx.customer_id.clone(),
                discount_cents: 500,
                tax_cents: 200,
                items: vec![AddItemRequest::new(&product, 5)],
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(sale.sale.total_cents, 4700);

    let updated = fx
        .service
        .line_items()
        .update_sale(
            &seller(),
            &sale.sale.id,
            UpdateSaleRequest {
                tax_cents: Some(300),
                notes: Some("Entrega na doca 3".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.sale.total_cents, 4800);
    assert_eq!(updated.sale.notes.as_deref(), Some("Entrega na doca 3"));
}

#[tokio::test]
async fn test_add_update_remove_recompute_totals() {
    let fx = common::in_memory().await;
    let a = fx.product("CAD001", 2500, 50).await;
    let b = fx.product("CAD002", 1200, 50).await;
    let items = fx.service.line_items();

    let sale = fx
        .service
        .orders()
        .create_sale(&seller(), create(&fx.customer_id, vec![]))
        .await
        .unwrap();
    let id = sale.sale.id;

    let s = items
        .add_item(&seller(), &id, AddItemRequest::new(&a, 2).discount(500))
        .await
        .unwrap();
    assert_eq!(s.sale.subtotal_cents, 4500);

    let s = items
        .add_item(&seller(), &id, AddItemRequest::new(&b, 1).unit_price(1000))
        .await
        .unwrap();
    assert_eq!(s.sale.subtotal_cents, 5500);
    let b_item = s.items.iter().find(|i| i.product_id == b).unwrap().id.clone();

    let s = items
        .update_item(
            &seller(),
            &id,
            &b_item,
            UpdateItemRequest {
                quantity: Some(3),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(s.sale.subtotal_cents, 7500);
    assert_eq!(s.sale.total_cents, 7500);

    let s = items.remove_item(&seller(), &id, &b_item).await.unwrap();
    assert_eq!(s.items.len(), 1);
    assert_eq!(s.sale.total_cents, 4500);
    assert_eq!(fx.stock(&b).await, 50);
}

#[tokio::test]
async fn test_duplicate_and_missing_items() {
    let fx = common::in_memory().await;
    let product = fx.product("PAN003", 4590, 10).await;
    let items = fx.service.line_items();

    let sale = fx
        .service
        .orders()
        .create_sale(&seller(), create(&fx.customer_id, vec![AddItemRequest::new(&product, 1)]))
        .await
        .unwrap();

    let err = core(
        items
            .add_item(&seller(), &sale.sale.id, AddItemRequest::new(&product, 2))
            .await
            .unwrap_err(),
    );
    assert!(matches!(err, CoreError::DuplicateItem { .. }));

    let err = core(items.remove_item(&seller(), &sale.sale.id, MISSING).await.unwrap_err());
    assert!(matches!(err, CoreError::NotFound { entity: "Sale item", .. }));

    let err = core(
        items
            .add_item(&seller(), MISSING, AddItemRequest::new(&product, 1))
            .await
            .unwrap_err(),
    );
    assert!(matches!(err, CoreError::NotFound { entity: "Sale", .. }));

    // Ids are looked up verbatim, so padding is refused before any query.
    let padded = format!(" {}", sale.sale.id);
    let err = core(fx.service.get_sale(&seller(), &padded).await.unwrap_err());
    assert!(matches!(err, CoreError::Validation(_)));
    let err = core(
        items
            .add_item(&seller(), &sale.sale.id, AddItemRequest::new(format!("{product} "), 1))
            .await
            .unwrap_err(),
    );
    assert!(matches!(err, CoreError::Validation(_)));
}

#[tokio::test]
async fn test_add_item_catalog_and_stock_checks() {
    let fx = common::in_memory().await;
    let retired = fx.product("OLD001", 100, 10).await;
    let scarce = fx.product("RAR001", 100, 2).await;
    fx.db().catalog().set_product_active(&retired, false).await.unwrap();
    let items = fx.service.line_items();

    let sale = fx
        .service
        .orders()
        .create_sale(&seller(), create(&fx.customer_id, vec![]))
        .await
        .unwrap();
    let id = sale.sale.id;

    let err = core(items.add_item(&seller(), &id, AddItemRequest::new(&retired, 1)).await.unwrap_err());
    assert!(matches!(err, CoreError::ProductInactive(p) if p == retired));

    let err = core(items.add_item(&seller(), &id, AddItemRequest::new(MISSING, 1)).await.unwrap_err());
    assert!(matches!(err, CoreError::NotFound { entity: "Product", .. }));

    let err = core(items.add_item(&seller(), &id, AddItemRequest::new(&scarce, 3)).await.unwrap_err());
    assert!(matches!(err, CoreError::InsufficientStock(ref s) if s[0].available == 2));

    let s = items.add_item(&seller(), &id, AddItemRequest::new(&scarce, 2)).await.unwrap();
    let item_id = s.items[0].id.clone();
    let err = core(
        items
            .update_item(
                &seller(),
                &id,
                &item_id,
                UpdateItemRequest {
                    quantity: Some(3),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err(),
    );
    assert!(matches!(err, CoreError::InsufficientStock(_)));
}

#[tokio::test]
async fn test_unit_price_is_frozen_on_the_item() {
    let fx = common::in_memory().await;
    let product = fx.product("ARR001", 2990, 10).await;

    let sale = fx
        .service
        .orders()
        .create_sale(&seller(), create(&fx.customer_id, vec![AddItemRequest::new(&product, 2)]))
        .await
        .unwrap();
    assert_eq!(sale.items[0].unit_price_cents, 2990);

    fx.db().catalog().set_product_price(&product, 3490).await.unwrap();

    let stored = fx.service.get_sale(&seller(), &sale.sale.id).await.unwrap();
    assert_eq!(stored.items[0].unit_price_cents, 2990);
    assert_eq!(stored.sale.total_cents, 5980);
}

/// Tries every edit on `id` and expects each to be refused in `status`.
async fn assert_edits_rejected(
    fx: &common::Fixture,
    id: &str,
    item_id: &str,
    other_product: &str,
    status: SaleStatus,
) {
    let items = fx.service.line_items();
    let before = fx.service.get_sale(&seller(), id).await.unwrap();
    let refused = |err: SalesError| match core(err) {
        CoreError::InvalidStateTransition {
            current, allowed, ..
        } => {
            assert_eq!(current, status);
            assert_eq!(allowed, vec![SaleStatus::Draft, SaleStatus::Pending]);
        }
        other => panic!("unexpected error in {status:?}: {other:?}"),
    };

    refused(
        items
            .add_item(&seller(), id, AddItemRequest::new(other_product, 1))
            .await
            .unwrap_err(),
    );
    refused(
        items
            .update_item(
                &seller(),
                id,
                item_id,
                UpdateItemRequest {
                    quantity: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err(),
    );
    refused(items.remove_item(&seller(), id, item_id).await.unwrap_err());
    refused(
        items
            .update_sale(
                &seller(),
                id,
                UpdateSaleRequest {
                    discount_cents: Some(10),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err(),
    );
    refused(
        items
            .apply_discount(&seller(), id, DiscountKind::Percentage(1000))
            .await
            .unwrap_err(),
    );

    let after = fx.service.get_sale(&seller(), id).await.unwrap();
    assert_eq!(after.items, before.items);
    assert_eq!(after.sale.total_cents, before.sale.total_cents);
}

#[tokio::test]
async fn test_edits_rejected_outside_draft_and_pending() {
    let fx = common::in_memory().await;
    let a = fx.product("SAB001", 350, 10).await;
    let b = fx.product("SAB002", 420, 10).await;
    let orders = fx.service.orders();

    let sale = orders
        .create_sale(&seller(), create(&fx.customer_id, vec![AddItemRequest::new(&a, 1)]))
        .await
        .unwrap();
    let id = sale.sale.id;
    let item_id = sale.items[0].id.clone();
    orders.submit(&seller(), &id).await.unwrap();

    // Still editable while pending.
    let added = fx
        .service
        .line_items()
        .add_item(&seller(), &id, AddItemRequest::new(&b, 1))
        .await
        .unwrap();
    let b_item = added.items.iter().find(|i| i.product_id == b).unwrap().id.clone();
    fx.service
        .line_items()
        .remove_item(&seller(), &id, &b_item)
        .await
        .unwrap();

    orders.confirm(&seller(), &id).await.unwrap();
    assert_edits_rejected(&fx, &id, &item_id, &b, SaleStatus::Confirmed).await;

    orders.complete(&seller(), &id).await.unwrap();
    assert_edits_rejected(&fx, &id, &item_id, &b, SaleStatus::Completed).await;

    let other = orders
        .create_sale(&seller(), create(&fx.customer_id, vec![AddItemRequest::new(&a, 2)]))
        .await
        .unwrap();
    orders.cancel(&seller(), &other.sale.id).await.unwrap();
    assert_edits_rejected(&fx, &other.sale.id, &other.items[0].id, &b, SaleStatus::Cancelled)
        .await;

    assert_eq!(fx.stock(&a).await, 9);
    assert_eq!(fx.stock(&b).await, 10);
}

#[tokio::test]
async fn test_pending_quantity_update_is_reserved_and_released() {
    let fx = common::in_memory().await;
    let product = fx.product("FRI001", 1000, 10).await;
    let items = fx.service.line_items();
    let orders = fx.service.orders();

    let mut request = create(&fx.customer_id, vec![AddItemRequest::new(&product, 2)]);
    request.items[0].discount_cents = 100;
    request.tax_cents = 50;
    let sale = orders.create_sale(&seller(), request).await.unwrap();
    let id = sale.sale.id;
    orders.submit(&seller(), &id).await.unwrap();

    let updated = items
        .update_item(
            &seller(),
            &id,
            &sale.items[0].id,
            UpdateItemRequest {
                quantity: Some(7),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.items[0].total_cents, 6900);
    assert_eq!(updated.sale.total_cents, 6950);

    orders.confirm(&seller(), &id).await.unwrap();
    assert_eq!(fx.stock(&product).await, 3);

    orders.cancel(&seller(), &id).await.unwrap();
    assert_eq!(fx.stock(&product).await, 10);
}

#[tokio::test]
async fn test_discounts_never_drive_total_negative() {
    let fx = common::in_memory().await;
    let product = fx.product("DET001", 1000, 10).await;
    let items = fx.service.line_items();

    let sale = fx
        .service
        .orders()
        .create_sale(&seller(), create(&fx.customer_id, vec![AddItemRequest::new(&product, 5)]))
        .await
        .unwrap();
    let id = sale.sale.id;

    let s = items
        .apply_discount(&seller(), &id, DiscountKind::Percentage(1000))
        .await
        .unwrap();
    assert_eq!(s.sale.discount_cents, 500);
    assert_eq!(s.sale.total_cents, 4500);

    let err = core(
        items
            .update_sale(
                &seller(),
                &id,
                UpdateSaleRequest {
                    discount_cents: Some(6000),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err(),
    );
    assert!(matches!(err, CoreError::InvalidAmount { .. }));

    // Removing the only line would leave 0 - 5.00.
    let err = core(items.remove_item(&seller(), &id, &sale.items[0].id).await.unwrap_err());
    assert!(matches!(err, CoreError::InvalidAmount { .. }));
    assert_eq!(fx.service.get_sale(&seller(), &id).await.unwrap().items.len(), 1);
}

// =============================================================================
// Access policy
// =============================================================================

#[tokio::test]
async fn test_salesperson_only_acts_on_own_sales() {
    let fx = common::in_memory().await;
    let product = fx.product("PAN004", 1000, 5).await;
    let orders = fx.service.orders();
    let owner = seller();
    let other = Actor::salesperson("u-bruno");

    let sale = orders
        .create_sale(&owner, create(&fx.customer_id, vec![AddItemRequest::new(&product, 5)]))
        .await
        .unwrap();
    let id = sale.sale.id;
    orders.submit(&owner, &id).await.unwrap();

    let err = core(orders.confirm(&other, &id).await.unwrap_err());
    assert!(matches!(err, CoreError::PermissionDenied { ref action, .. } if action == "confirm"));
    assert_eq!(fx.stock(&product).await, 5);

    let err = core(fx.service.get_sale(&other, &id).await.unwrap_err());
    assert!(matches!(err, CoreError::PermissionDenied { .. }));

    // Elevated roles act on any sale.
    orders.confirm(&Actor::manager("u-gerente"), &id).await.unwrap();
    orders.cancel(&Actor::admin("u-admin"), &id).await.unwrap();
    assert_eq!(fx.stock(&product).await, 5);
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn test_list_sales_scoping_filters_and_summary() {
    let fx = common::in_memory().await;
    let product = fx.product("LIS001", 1000, 100).await;
    let orders = fx.service.orders();
    let ana = seller();
    let bruno = Actor::salesperson("u-bruno");

    for (actor, quantity) in [(&ana, 1), (&ana, 2), (&bruno, 4)] {
        orders
            .create_sale(actor, create(&fx.customer_id, vec![AddItemRequest::new(&product, quantity)]))
            .await
            .unwrap();
    }

    // A salesperson cannot widen the listing with an owner filter.
    let own = fx
        .service
        .list_sales(
            &ana,
            ListSalesRequest {
                user_id: Some("u-bruno".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(own.pagination.total, 2);
    assert!(own.data.iter().all(|s| s.user_id == "u-ana"));
    assert_eq!(own.summary.total_revenue_cents, 3000);
    assert_eq!(own.summary.average_order_value_cents, 1500);
    assert_eq!(own.summary.total_quantity, 3);

    let manager = Actor::manager("u-gerente");
    let all = fx
        .service
        .list_sales(
            &manager,
            ListSalesRequest {
                limit: Some(2),
                sort_by: Some(distrib_db::SaleSort::Total),
                sort_order: Some(distrib_db::SortOrder::Asc),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(all.pagination.total, 3);
    assert_eq!(all.pagination.pages, 2);
    assert!(all.pagination.has_next);
    assert_eq!(
        all.data.iter().map(|s| s.total_cents).collect::<Vec<_>>(),
        vec![1000, 2000]
    );

    let big = fx
        .service
        .list_sales(
            &manager,
            ListSalesRequest {
                min_total_cents: Some(2500),
                status: Some(SaleStatus::Draft),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(big.pagination.total, 1);
    assert_eq!(big.data[0].user_id, "u-bruno");
}

#[tokio::test]
async fn test_validate_stock_preview() {
    let fx = common::in_memory().await;
    let plenty = fx.product("PRE001", 100, 10).await;
    let scarce = fx.product("PRE002", 100, 1).await;

    let preview = fx
        .service
        .validate_stock(&[StockCheckLine::new(&plenty, 10), StockCheckLine::new(&scarce, 2)])
        .await
        .unwrap();

    assert!(!preview.can_proceed);
    assert!(preview.items[0].valid);
    assert_eq!(preview.items[1].available, 1);
    assert_eq!(preview.items[1].reason.as_deref(), Some("Insufficient stock"));

    let unknown = fx
        .service
        .validate_stock(&[StockCheckLine::new(MISSING, 1)])
        .await
        .unwrap();
    assert_eq!(unknown.items[0].reason.as_deref(), Some("Product not found"));

    // Preview never reserves.
    assert_eq!(fx.stock(&plenty).await, 10);
}
