mod args;
mod config;
mod dirs;

use std::fs::OpenOptions;
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::process::Command as ProcessCommand;
use std::sync::Arc;

use app_api::{
    AppContext, ImportFilesRequest, PosPullCategoriesRequest, PosPullSalesRequest, ReportRequest,
};
use http_api::HttpState;
use sales_app::{AppConfig, AppPaths, AppState, RenderOptions, ensure_app_data_dir, render_text};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::args::{Command, ReportArgs, ReportFormat};

const LOG_FILE_NAME: &str = "sales-count.log";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let command = args::parse_args().map_err(|err| {
        eprintln!("{err}");
        args::print_help();
        io::Error::new(io::ErrorKind::InvalidInput, "invalid arguments")
    })?;
    if command == Command::Help {
        args::print_help();
        return Ok(());
    }

    let config = config::load_or_create().map_err(io::Error::other)?;
    let data_dir = dirs::resolve_data_dir().map_err(io::Error::other)?;
    let paths = AppPaths::new(data_dir.dir.clone());
    ensure_app_data_dir(&paths).map_err(|err| io::Error::other(err.to_string()))?;
    init_tracing(&paths.app_data_dir)?;

    if config.created {
        tracing::info!(
            path = %config.paths.file.display(),
            port = config.config.port,
            "created default config"
        );
    }
    tracing::info!(
        dir = %data_dir.dir.display(),
        from_env = data_dir.from_env,
        "using data dir"
    );

    let mut app_config = AppConfig::new(paths.db_path, paths.mapping_defaults_path);
    app_config.api = config.config.api.clone();
    app_config.columns = config.config.columns.clone();
    let app_state = AppState::with_config(app_config);
    app_state
        .initialize()
        .map_err(|err| io::Error::other(format!("failed to initialize: {}", err)))?;

    let context = AppContext {
        app_state,
        app_data_dir: data_dir.dir,
    };

    match command {
        Command::Serve { port, no_open } => {
            let port = port.unwrap_or(config.config.port);
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(serve(context, port, no_open))?;
        }
        Command::Import {
            items,
            modifiers,
            location,
        } => {
            let stats = app_api::import_files(
                &context,
                ImportFilesRequest {
                    items_path: items,
                    modifiers_path: modifiers,
                    location,
                },
            )?;
            println!(
                "Read {} rows: {} inserted, {} voided, {} skipped.",
                stats.rows_read, stats.rows_inserted, stats.rows_voided, stats.rows_skipped
            );
            if !stats.locations.is_empty() {
                println!("Locations: {}", stats.locations.join(", "));
            }
            for issue in &stats.issues {
                eprintln!("{} line {}: {}", issue.source, issue.line, issue.message);
            }
        }
        Command::Report(report) => print_report(&context, report)?,
        Command::Locations => {
            let response = app_api::locations_list(&context)?;
            if response.locations.is_empty() {
                println!("No locations yet.");
            }
            for location in response.locations {
                println!(
                    "{}\t{} rows\tupdated {}\tdates {}",
                    location.name,
                    location.row_count,
                    location.last_updated_at.as_deref().unwrap_or("never"),
                    location.dates.join(",")
                );
            }
        }
        Command::PullSales {
            location,
            start_date,
            end_date,
            restaurant_guid,
        } => {
            let stats = app_api::pos_pull_sales(
                &context,
                PosPullSalesRequest {
                    location,
                    start_date,
                    end_date,
                    restaurant_guid,
                    connection: None,
                },
            )?;
            println!(
                "Pulled {} records: {} stored, {} dropped.",
                stats.records_read, stats.rows_inserted, stats.records_dropped
            );
        }
        Command::PullCategories { apply } => {
            let response = app_api::pos_pull_categories(
                &context,
                PosPullCategoriesRequest {
                    connection: None,
                    apply: Some(apply),
                },
            )?;
            for rule in &response.categories {
                println!("{}: {}", rule.category, rule.product_ids.join(", "));
            }
            if apply {
                println!("Replaced mapping with {} categories.", response.categories.len());
            }
        }
        Command::Help => args::print_help(),
    }

    Ok(())
}

fn print_report(context: &AppContext, args: ReportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let response = app_api::report(
        context,
        ReportRequest {
            location: args.location,
            date: args.date,
            start: args.start,
            end: args.end,
            interval_minutes: args.interval,
            fill: Some(args.fill),
            subtotals: Some(!args.no_subtotals),
        },
    )?;
    match args.format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
        ReportFormat::Html => println!("{}", response.table_html),
        ReportFormat::Text => {
            let title = match &response.business_date {
                Some(date) => format!("{} {}", response.location, date),
                None => response.location.clone(),
            };
            let options = RenderOptions {
                title: Some(title),
                service_subtotals: !args.no_subtotals,
            };
            print!("{}", render_text(&response.report, &options));
            println!(
                "Last updated: {}",
                response.last_updated_at.as_deref().unwrap_or("never")
            );
        }
    }
    Ok(())
}

/// Logs to stderr and to a plain-text file in the data dir.
fn init_tracing(app_data_dir: &Path) -> Result<(), io::Error> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(app_data_dir.join(LOG_FILE_NAME))?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(log_file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}

async fn serve(context: AppContext, port: u16, no_open: bool) -> Result<(), io::Error> {
    let state = HttpState::with_random_token(context);
    let router = http_api::router(state);

    let (listener, actual_port, used_fallback) = bind_port(port).await?;
    let url = format!("http://127.0.0.1:{actual_port}");

    if used_fallback {
        tracing::warn!(port, actual_port, "configured port unavailable, using fallback");
    }

    println!("Sales Count is running at {url}");
    println!("Press Ctrl+C to stop.");

    if !no_open && let Err(err) = open_url(&url) {
        tracing::warn!(error = %err, "failed to open browser");
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn bind_port(port: u16) -> Result<(tokio::net::TcpListener, u16, bool), io::Error> {
    if port == 0 {
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let actual_port = listener.local_addr()?.port();
        return Ok((listener, actual_port, false));
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => Ok((listener, port, false)),
        Err(_) => {
            let listener =
                tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
            let actual_port = listener.local_addr()?.port();
            Ok((listener, actual_port, true))
        }
    }
}

fn open_url(url: &str) -> Result<(), io::Error> {
    let mut command = if cfg!(target_os = "macos") {
        ProcessCommand::new("open")
    } else if cfg!(target_os = "windows") {
        let mut command = ProcessCommand::new("cmd");
        command.args(["/C", "start", ""]);
        command
    } else {
        ProcessCommand::new("xdg-open")
    };
    let status = command.arg(url).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other("open command failed"))
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
