mod assets;
mod errors;
mod handlers;
mod middleware;
mod state;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

pub use middleware::CSRF_HEADER;
pub use state::{HttpState, generate_csrf_token};

pub fn router(state: HttpState) -> Router<()> {
    let api = Router::new()
        .route("/import", post(handlers::import))
        .route("/report", post(handlers::report))
        .route("/report_snapshot", post(handlers::report_snapshot))
        .route(
            "/report_snapshots_list",
            post(handlers::report_snapshots_list),
        )
        .route("/locations_list", post(handlers::locations_list))
        .route(
            "/locations_clear_data",
            post(handlers::locations_clear_data),
        )
        .route("/locations_delete", post(handlers::locations_delete))
        .route("/mapping_list", post(handlers::mapping_list))
        .route("/mapping_replace", post(handlers::mapping_replace))
        .route("/settings_get", post(handlers::settings_get))
        .route("/settings_put", post(handlers::settings_put))
        .route("/pos_test_connection", post(handlers::pos_test_connection))
        .route("/pos_pull_sales", post(handlers::pos_pull_sales))
        .route("/pos_pull_categories", post(handlers::pos_pull_categories))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_csrf,
        ));

    Router::new()
        .nest("/api", api)
        .route("/report", get(handlers::report_page))
        .fallback(handlers::ui_fallback)
        .with_state(state)
}

#[cfg(test)]
mod tests;
