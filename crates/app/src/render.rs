use sales_core::Report;

/// Presentation switches shared by the text and HTML renderers.
#[derive(Clone, Debug, Default)]
pub struct RenderOptions {
    pub title: Option<String>,
    /// Insert Lunch/Dinner subtotal rows before the final total.
    pub service_subtotals: bool,
}

pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        let text = format!("{:.2}", value);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

struct TableRow {
    label: String,
    counts: Vec<f64>,
    summary: bool,
}

fn table_rows(report: &Report, options: &RenderOptions) -> Vec<TableRow> {
    let mut rows = report
        .buckets
        .iter()
        .map(|bucket| TableRow {
            label: bucket.label.clone(),
            counts: bucket.counts.clone(),
            summary: false,
        })
        .collect::<Vec<_>>();
    if options.service_subtotals {
        for subtotal in report.service_totals() {
            rows.push(TableRow {
                label: format!("{} Total", subtotal.service.as_str()),
                counts: subtotal.counts,
                summary: true,
            });
        }
    }
    rows.push(TableRow {
        label: "Total".to_string(),
        counts: report.totals.clone(),
        summary: true,
    });
    rows
}

fn header(report: &Report) -> Vec<String> {
    let mut columns = Vec::with_capacity(report.categories.len() + 2);
    columns.push("Interval".to_string());
    columns.extend(report.categories.iter().cloned());
    columns.push("Total".to_string());
    columns
}

fn row_cells(row: &TableRow) -> Vec<String> {
    let mut cells = Vec::with_capacity(row.counts.len() + 2);
    cells.push(row.label.clone());
    cells.extend(row.counts.iter().map(|value| format_quantity(*value)));
    cells.push(format_quantity(row.counts.iter().sum()));
    cells
}

/// Fixed-width table for terminals.
pub fn render_text(report: &Report, options: &RenderOptions) -> String {
    let header = header(report);
    let rows = table_rows(report, options);
    let cells = rows.iter().map(row_cells).collect::<Vec<_>>();
    let mut widths = header
        .iter()
        .map(|name| name.chars().count())
        .collect::<Vec<_>>();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |values: &[String]| {
        values
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(index, (value, width))| {
                if index == 0 {
                    format!("{:<width$}", value, width = *width)
                } else {
                    format!("{:>width$}", value, width = *width)
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    if let Some(title) = &options.title {
        out.push_str(title);
        out.push('\n');
    }
    out.push_str(&format_line(&header));
    out.push('\n');
    let rule_width = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    for (row, values) in rows.iter().zip(&cells) {
        if row.summary {
            out.push_str(&"-".repeat(rule_width));
            out.push('\n');
        }
        out.push_str(&format_line(values));
        out.push('\n');
    }
    out
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// `<table>` fragment; every piece of text is escaped.
pub fn render_html(report: &Report, options: &RenderOptions) -> String {
    let mut out = String::from("<table class=\"sales-report\">\n");
    if let Some(title) = &options.title {
        out.push_str(&format!("<caption>{}</caption>\n", escape_html(title)));
    }
    out.push_str("<thead><tr>");
    for name in header(report) {
        out.push_str(&format!("<th>{}</th>", escape_html(&name)));
    }
    out.push_str("</tr></thead>\n<tbody>\n");
    for row in table_rows(report, options) {
        let class = if row.summary { " class=\"total\"" } else { "" };
        out.push_str(&format!("<tr{}>", class));
        for (index, cell) in row_cells(&row).iter().enumerate() {
            let tag = if index == 0 { "th" } else { "td" };
            out.push_str(&format!("<{tag}>{}</{tag}>", escape_html(cell)));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
    out
}
