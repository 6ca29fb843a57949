use ingest::ImportStats;
use sales_app::{
    AppError, PullSalesParams, PullStats, RenderOptions, ReportParams, Result, render_html,
};
use sales_core::{ReportSnapshot, format_timestamp};

use crate::{
    AppContext, ClearedResponse, ConnectionResponse, DeletedResponse, ImportFilesRequest,
    ImportRequest, LocationRequest, LocationsResponse, MappingReplaceRequest, MappingResponse,
    OkResponse, PosConnectionRequest, PosPullCategoriesRequest, PosPullSalesRequest,
    ReportRequest, ReportResponse, ReportSnapshotRequest, SettingsPutRequest, SettingsResponse,
    SnapshotEntry, SnapshotsResponse, UpdatedResponse, resolve_export_path,
};

fn optional_location(location: Option<String>) -> Option<String> {
    location
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required_location(location: &str) -> Result<&str> {
    let location = location.trim();
    if location.is_empty() {
        return Err(AppError::InvalidInput("location is required".to_string()));
    }
    Ok(location)
}

pub fn import(ctx: &AppContext, req: ImportRequest) -> Result<ImportStats> {
    let location = optional_location(req.location);
    ctx.app_state.services.imports.import_csv(
        &req.items_csv,
        &req.modifiers_csv,
        location.as_deref(),
    )
}

pub fn import_files(ctx: &AppContext, req: ImportFilesRequest) -> Result<ImportStats> {
    let items_path = resolve_export_path(&req.items_path, "items export")?;
    let modifiers_path = resolve_export_path(&req.modifiers_path, "modifiers export")?;
    let location = optional_location(req.location);
    ctx.app_state
        .services
        .imports
        .import_files(&items_path, &modifiers_path, location.as_deref())
}

pub fn report(ctx: &AppContext, req: ReportRequest) -> Result<ReportResponse> {
    build_report(ctx, req, true)
}

/// Renders a report without saving a snapshot.
pub fn report_preview(ctx: &AppContext, req: ReportRequest) -> Result<ReportResponse> {
    build_report(ctx, req, false)
}

fn build_report(ctx: &AppContext, req: ReportRequest, persist: bool) -> Result<ReportResponse> {
    let location = required_location(&req.location)?.to_string();
    let params = ReportParams {
        location,
        date: req.date,
        start: req.start,
        end: req.end,
        interval_minutes: req.interval_minutes,
        fill: req.fill,
    };
    let reports = &ctx.app_state.services.reports;
    let generated = if persist {
        reports.generate(&params)?
    } else {
        reports.preview(&params)?
    };
    let options = RenderOptions {
        title: Some(match &generated.business_date {
            Some(date) => format!("{} {}", generated.location, date),
            None => generated.location.clone(),
        }),
        service_subtotals: req.subtotals.unwrap_or(true),
    };
    let table_html = render_html(&generated.report, &options);
    Ok(ReportResponse {
        location: generated.location,
        business_date: generated.business_date,
        start: generated.span.map(|span| format_timestamp(span.start)),
        end: generated.span.map(|span| format_timestamp(span.end)),
        last_updated_at: generated.last_updated_at,
        report: generated.report,
        table_html,
    })
}

pub fn report_snapshot(ctx: &AppContext, req: ReportSnapshotRequest) -> Result<ReportSnapshot> {
    let location = required_location(&req.location)?;
    ctx.app_state
        .services
        .reports
        .snapshot(location, &req.date, req.interval_minutes)
}

pub fn report_snapshots_list(ctx: &AppContext, req: LocationRequest) -> Result<SnapshotsResponse> {
    let location = required_location(&req.location)?;
    let snapshots = ctx
        .app_state
        .services
        .reports
        .list_snapshots(location)?
        .into_iter()
        .map(|summary| SnapshotEntry {
            business_date: summary.business_date,
            interval_minutes: summary.interval_minutes,
            created_at: summary.created_at,
        })
        .collect();
    Ok(SnapshotsResponse {
        location: location.to_string(),
        snapshots,
    })
}

pub fn locations_list(ctx: &AppContext) -> Result<LocationsResponse> {
    Ok(LocationsResponse {
        locations: ctx.app_state.services.locations.list()?,
    })
}

pub fn locations_clear_data(ctx: &AppContext, req: LocationRequest) -> Result<ClearedResponse> {
    let location = required_location(&req.location)?;
    ctx.app_state.services.locations.clear_data(location)?;
    Ok(ClearedResponse {
        cleared: location.to_string(),
    })
}

pub fn locations_delete(ctx: &AppContext, req: LocationRequest) -> Result<DeletedResponse> {
    let location = required_location(&req.location)?;
    ctx.app_state.services.locations.delete(location)?;
    Ok(DeletedResponse {
        deleted: location.to_string(),
    })
}

pub fn mapping_list(ctx: &AppContext) -> Result<MappingResponse> {
    Ok(MappingResponse {
        categories: ctx.app_state.services.mappings.list()?,
    })
}

pub fn mapping_replace(ctx: &AppContext, req: MappingReplaceRequest) -> Result<UpdatedResponse> {
    let count = ctx.app_state.services.mappings.replace(&req.categories)?;
    Ok(UpdatedResponse {
        updated: count as i64,
    })
}

pub fn settings_get(ctx: &AppContext) -> Result<SettingsResponse> {
    let snapshot = ctx.app_state.services.settings.get()?;
    Ok(SettingsResponse {
        default_interval_minutes: snapshot.default_interval_minutes,
        columns: snapshot.columns,
        api_configured: snapshot.api_configured,
        db_path: ctx.app_state.config.db_path.to_string_lossy().to_string(),
        mapping_defaults_path: ctx
            .app_state
            .config
            .mapping_defaults_path
            .to_string_lossy()
            .to_string(),
        app_data_dir: ctx.app_data_dir.to_string_lossy().to_string(),
    })
}

pub fn settings_put(ctx: &AppContext, req: SettingsPutRequest) -> Result<SettingsResponse> {
    ctx.app_state
        .services
        .settings
        .update(req.default_interval_minutes, req.columns.as_ref())?;
    settings_get(ctx)
}

pub fn pos_test_connection(
    ctx: &AppContext,
    req: PosConnectionRequest,
) -> Result<ConnectionResponse> {
    let ok = ctx.app_state.services.pos.test_connection(req.connection)?;
    Ok(ConnectionResponse { ok })
}

pub fn pos_pull_sales(ctx: &AppContext, req: PosPullSalesRequest) -> Result<PullStats> {
    let params = PullSalesParams {
        location: req.location,
        start_date: req.start_date,
        end_date: req.end_date,
        restaurant_guid: req.restaurant_guid,
    };
    ctx.app_state
        .services
        .pos
        .pull_sales(&params, req.connection)
}

pub fn pos_pull_categories(
    ctx: &AppContext,
    req: PosPullCategoriesRequest,
) -> Result<MappingResponse> {
    let categories = ctx
        .app_state
        .services
        .pos
        .pull_categories(req.connection, req.apply.unwrap_or(false))?;
    Ok(MappingResponse { categories })
}

pub fn ok() -> OkResponse {
    OkResponse { ok: true }
}
