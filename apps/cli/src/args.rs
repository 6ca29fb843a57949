use std::env;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Html,
    Json,
}

impl ReportFormat {
    fn parse(value: &str) -> Result<Self, String> {
        match value {
            "text" => Ok(Self::Text),
            "html" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            _ => Err(format!("invalid format: {value} (expected text, html or json)")),
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReportArgs {
    pub location: String,
    pub date: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub interval: Option<u32>,
    pub fill: bool,
    pub no_subtotals: bool,
    pub format: ReportFormat,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Serve {
        port: Option<u16>,
        no_open: bool,
    },
    Import {
        items: String,
        modifiers: String,
        location: Option<String>,
    },
    Report(ReportArgs),
    Locations,
    PullSales {
        location: String,
        start_date: String,
        end_date: Option<String>,
        restaurant_guid: Option<String>,
    },
    PullCategories {
        apply: bool,
    },
    Help,
}

pub fn parse_args() -> Result<Command, String> {
    parse_from(env::args().skip(1))
}

/// With no subcommand the dashboard is served, so bare `sales-count` and
/// `sales-count --port 4000` both start the server.
pub fn parse_from<I>(args: I) -> Result<Command, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter().peekable();
    let has_subcommand = args.peek().is_some_and(|first| !first.starts_with('-'));
    let subcommand = if has_subcommand { args.next() } else { None };
    let rest = args.collect::<Vec<_>>();
    if rest.iter().any(|arg| arg == "--help" || arg == "-h") {
        return Ok(Command::Help);
    }

    match subcommand.as_deref() {
        None | Some("serve") => parse_serve(rest),
        Some("import") => parse_import(rest),
        Some("report") => parse_report(rest),
        Some("locations") => {
            expect_no_args(&rest)?;
            Ok(Command::Locations)
        }
        Some("pull-sales") => parse_pull_sales(rest),
        Some("pull-categories") => {
            let mut apply = false;
            for arg in rest {
                match arg.as_str() {
                    "--apply" => apply = true,
                    _ => return Err(format!("unknown argument: {arg}")),
                }
            }
            Ok(Command::PullCategories { apply })
        }
        Some("help") => Ok(Command::Help),
        Some(other) => Err(format!("unknown command: {other}")),
    }
}

fn expect_no_args(rest: &[String]) -> Result<(), String> {
    match rest.first() {
        Some(arg) => Err(format!("unknown argument: {arg}")),
        None => Ok(()),
    }
}

fn value_for(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    args.next()
        .ok_or_else(|| format!("missing value for {flag}"))
}

fn required(value: Option<String>, flag: &str) -> Result<String, String> {
    value.ok_or_else(|| format!("{flag} is required"))
}

fn parse_serve(rest: Vec<String>) -> Result<Command, String> {
    let mut args = rest.into_iter();
    let mut port = None;
    let mut no_open = false;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--port" => {
                let value = value_for(&mut args, "--port")?;
                let parsed = value
                    .parse::<u16>()
                    .map_err(|_| format!("invalid port value: {value}"))?;
                port = Some(parsed);
            }
            "--no-open" => no_open = true,
            _ => return Err(format!("unknown argument: {arg}")),
        }
    }
    Ok(Command::Serve { port, no_open })
}

fn parse_import(rest: Vec<String>) -> Result<Command, String> {
    let mut args = rest.into_iter();
    let mut items = None;
    let mut modifiers = None;
    let mut location = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--items" => items = Some(value_for(&mut args, "--items")?),
            "--modifiers" => modifiers = Some(value_for(&mut args, "--modifiers")?),
            "--location" => location = Some(value_for(&mut args, "--location")?),
            _ => return Err(format!("unknown argument: {arg}")),
        }
    }
    Ok(Command::Import {
        items: required(items, "--items")?,
        modifiers: required(modifiers, "--modifiers")?,
        location,
    })
}

fn parse_report(rest: Vec<String>) -> Result<Command, String> {
    let mut args = rest.into_iter();
    let mut location = None;
    let mut report = ReportArgs::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--location" => location = Some(value_for(&mut args, "--location")?),
            "--date" => report.date = Some(value_for(&mut args, "--date")?),
            "--start" => report.start = Some(value_for(&mut args, "--start")?),
            "--end" => report.end = Some(value_for(&mut args, "--end")?),
            "--interval" => {
                let value = value_for(&mut args, "--interval")?;
                let minutes = value
                    .parse::<u32>()
                    .map_err(|_| format!("invalid interval: {value}"))?;
                report.interval = Some(minutes);
            }
            "--fill" => report.fill = true,
            "--no-subtotals" => report.no_subtotals = true,
            "--format" => report.format = ReportFormat::parse(&value_for(&mut args, "--format")?)?,
            _ => return Err(format!("unknown argument: {arg}")),
        }
    }
    report.location = required(location, "--location")?;
    Ok(Command::Report(report))
}

fn parse_pull_sales(rest: Vec<String>) -> Result<Command, String> {
    let mut args = rest.into_iter();
    let mut location = None;
    let mut start_date = None;
    let mut end_date = None;
    let mut restaurant_guid = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--location" => location = Some(value_for(&mut args, "--location")?),
            "--start" => start_date = Some(value_for(&mut args, "--start")?),
            "--end" => end_date = Some(value_for(&mut args, "--end")?),
            "--restaurant" => restaurant_guid = Some(value_for(&mut args, "--restaurant")?),
            _ => return Err(format!("unknown argument: {arg}")),
        }
    }
    Ok(Command::PullSales {
        location: required(location, "--location")?,
        start_date: required(start_date, "--start")?,
        end_date,
        restaurant_guid,
    })
}

pub fn print_help() {
    println!(
        "Sales Count\n\n\
Usage:\n  sales-count [serve] [--port <port>] [--no-open]\n  \
sales-count import --items <csv> --modifiers <csv> [--location <name>]\n  \
sales-count report --location <name> [--date <YYYY-MM-DD> | --start <ts> --end <ts>]\n                     \
[--interval 60|30] [--fill] [--no-subtotals] [--format text|html|json]\n  \
sales-count locations\n  \
sales-count pull-sales --location <name> --start <YYYY-MM-DD> [--end <YYYY-MM-DD>] [--restaurant <guid>]\n  \
sales-count pull-categories [--apply]\n\n\
Options:\n  --port <port>  Override the configured port for this run only\n  --no-open      Do not open the browser automatically\n  -h, --help     Show this help message\n"
    );
}
