use axum::{
    body::Body,
    extract::{Json, Query, State},
    http::{Method, Request, StatusCode, header::CONTENT_TYPE},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use app_api::{
    AppContext, ImportRequest, LocationRequest, MappingReplaceRequest, PosConnectionRequest,
    PosPullCategoriesRequest, PosPullSalesRequest, ReportRequest, ReportSnapshotRequest,
    SettingsPutRequest,
};
use sales_app::{Result as AppResult, escape_html};

use crate::{assets, errors::HttpError, state::HttpState};

/// Runs a service call off the async runtime; used for file, CSV and POS work.
async fn run_blocking<T, F>(state: &HttpState, call: F) -> Result<T, HttpError>
where
    T: Send + 'static,
    F: FnOnce(&AppContext) -> AppResult<T> + Send + 'static,
{
    let context = state.context.clone();
    let result = tokio::task::spawn_blocking(move || call(&context))
        .await
        .map_err(|err| HttpError::internal(err.to_string()))?;
    Ok(result?)
}

pub async fn import(
    State(state): State<HttpState>,
    Json(req): Json<ImportRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let stats = run_blocking(&state, move |ctx| app_api::import(ctx, req)).await?;
    Ok(Json(stats))
}

pub async fn report(
    State(state): State<HttpState>,
    Json(req): Json<ReportRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::report(&state.context, req)?;
    Ok(Json(response))
}

pub async fn report_snapshot(
    State(state): State<HttpState>,
    Json(req): Json<ReportSnapshotRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::report_snapshot(&state.context, req)?;
    Ok(Json(response))
}

pub async fn report_snapshots_list(
    State(state): State<HttpState>,
    Json(req): Json<LocationRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::report_snapshots_list(&state.context, req)?;
    Ok(Json(response))
}

pub async fn locations_list(
    State(state): State<HttpState>,
    Json(_): Json<app_api::EmptyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::locations_list(&state.context)?;
    Ok(Json(response))
}

pub async fn locations_clear_data(
    State(state): State<HttpState>,
    Json(req): Json<LocationRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::locations_clear_data(&state.context, req)?;
    Ok(Json(response))
}

pub async fn locations_delete(
    State(state): State<HttpState>,
    Json(req): Json<LocationRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::locations_delete(&state.context, req)?;
    Ok(Json(response))
}

pub async fn mapping_list(
    State(state): State<HttpState>,
    Json(_): Json<app_api::EmptyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::mapping_list(&state.context)?;
    Ok(Json(response))
}

pub async fn mapping_replace(
    State(state): State<HttpState>,
    Json(req): Json<MappingReplaceRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::mapping_replace(&state.context, req)?;
    Ok(Json(response))
}

pub async fn settings_get(
    State(state): State<HttpState>,
    Json(_): Json<app_api::EmptyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::settings_get(&state.context)?;
    Ok(Json(response))
}

pub async fn settings_put(
    State(state): State<HttpState>,
    Json(req): Json<SettingsPutRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::settings_put(&state.context, req)?;
    Ok(Json(response))
}

pub async fn pos_test_connection(
    State(state): State<HttpState>,
    Json(req): Json<PosConnectionRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = run_blocking(&state, move |ctx| app_api::pos_test_connection(ctx, req)).await?;
    Ok(Json(response))
}

pub async fn pos_pull_sales(
    State(state): State<HttpState>,
    Json(req): Json<PosPullSalesRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let stats = run_blocking(&state, move |ctx| app_api::pos_pull_sales(ctx, req)).await?;
    Ok(Json(stats))
}

pub async fn pos_pull_categories(
    State(state): State<HttpState>,
    Json(req): Json<PosPullCategoriesRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = run_blocking(&state, move |ctx| app_api::pos_pull_categories(ctx, req)).await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct ReportPageQuery {
    pub location: String,
    pub date: Option<String>,
    pub interval: Option<u32>,
}

/// Standalone HTML table for a location, suitable for printing.
pub async fn report_page(
    State(state): State<HttpState>,
    Query(query): Query<ReportPageQuery>,
) -> Result<Html<String>, HttpError> {
    let req = ReportRequest {
        location: query.location,
        date: query.date,
        interval_minutes: query.interval,
        ..ReportRequest::default()
    };
    let response = app_api::report_preview(&state.context, req)?;
    let title = match &response.business_date {
        Some(date) => format!("{} {}", response.location, date),
        None => response.location.clone(),
    };
    Ok(Html(format!(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>{}</title>\
         <link rel=\"stylesheet\" href=\"/style.css\"></head><body>{}</body></html>\n",
        escape_html(&title),
        response.table_html
    )))
}

pub async fn ui_fallback(
    State(state): State<HttpState>,
    req: Request<Body>,
) -> Result<Response, HttpError> {
    if req.method() != Method::GET && req.method() != Method::HEAD {
        return Err(HttpError::new(
            StatusCode::METHOD_NOT_ALLOWED,
            "method not allowed",
            None,
        ));
    }

    let path = req.uri().path().trim_start_matches('/');
    if path.is_empty() {
        return render_index(&state.csrf_token);
    }

    if let Some(asset) = assets::asset(path) {
        return Ok(asset_response(asset));
    }

    Err(HttpError::new(
        StatusCode::NOT_FOUND,
        "not found",
        Some("not_found".to_string()),
    ))
}

fn render_index(csrf_token: &str) -> Result<Response, HttpError> {
    let index = assets::index_asset().ok_or_else(|| HttpError::internal("missing index.html"))?;
    let html = std::str::from_utf8(index.bytes)
        .map_err(|_| HttpError::internal("invalid index.html encoding"))?;
    let injected = inject_csrf(html, csrf_token);
    Ok(([(CONTENT_TYPE, index.mime)], injected).into_response())
}

fn inject_csrf(html: &str, csrf_token: &str) -> String {
    let snippet = format!(
        "<script>window.__SALES_COUNT_CSRF__=\"{}\";</script>",
        csrf_token
    );
    if html.contains("</head>") {
        html.replacen("</head>", &format!("{snippet}</head>"), 1)
    } else {
        format!("{html}{snippet}")
    }
}

fn asset_response(asset: &'static assets::EmbeddedAsset) -> Response {
    ([(CONTENT_TYPE, asset.mime)], asset.bytes).into_response()
}
