//! Route definitions for the Retail POS Platform

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - item catalog
        .nest("/items", item_routes())
        // Protected routes - purchases and breakdowns
        .nest("/purchases", purchase_routes())
        // Protected routes - batches and stock adjustments
        .nest("/inventory", inventory_routes())
        // Protected routes - point of sale
        .nest("/sales", sale_routes())
        // Protected routes - profit reports
        .nest("/reports", report_routes())
        // Protected routes - cashier shifts
        .nest("/shifts", shift_routes())
        // Protected routes - credit accounts
        .nest("/credit", credit_routes())
}

/// Item catalog routes (protected)
fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_items).post(handlers::create_item))
        .route("/low-stock", get(handlers::list_low_stock))
        .route(
            "/:item_id",
            get(handlers::get_item).put(handlers::update_item),
        )
        .route("/:item_id/deactivate", post(handlers::deactivate_item))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Purchase management routes (protected)
fn purchase_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_purchases).post(handlers::create_purchase),
        )
        .route("/:purchase_id", get(handlers::get_purchase))
        .route(
            "/line-items/:line_item_id/breakdown",
            post(handlers::breakdown_line_item),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Inventory batch and adjustment routes (protected)
fn inventory_routes() -> Router<AppState> {
    Router::new()
        // Batches
        .route("/batches", post(handlers::create_batch))
        .route("/items/:item_id/batches", get(handlers::list_item_batches))
        .route("/items/:item_id/fifo-preview", get(handlers::fifo_preview))
        .route("/items/:item_id/cost", get(handlers::resolved_item_cost))
        // Adjustments
        .route(
            "/adjustments",
            get(handlers::list_adjustments).post(handlers::adjust_stock),
        )
        .route("/stock-take", post(handlers::stock_take))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Point of sale routes (protected)
fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::record_sale))
        .route("/:sale_id", get(handlers::get_sale))
        .route("/:sale_id/void", post(handlers::void_sale))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Reporting routes (protected)
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/profit", get(handlers::profit_report))
        .route("/profit/export", get(handlers::export_profit_report))
        .route("/daily-profit", get(handlers::daily_profit))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Cashier shift routes (protected)
fn shift_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_shifts))
        .route("/open", post(handlers::open_shift))
        .route("/current", get(handlers::current_shift))
        .route("/:shift_id/close", post(handlers::close_shift))
        .route("/:shift_id/cash-inflow", post(handlers::record_cash_inflow))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Credit account routes (protected)
fn credit_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/accounts",
            get(handlers::list_credit_accounts).post(handlers::create_credit_account),
        )
        .route(
            "/accounts/:account_id/payments",
            post(handlers::record_credit_payment),
        )
        .route(
            "/accounts/:account_id/transactions",
            get(handlers::list_credit_transactions),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}
