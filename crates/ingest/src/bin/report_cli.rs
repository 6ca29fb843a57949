use std::collections::BTreeMap;
use std::env;
use std::fs::File;
use std::io::BufReader;

use ingest::{ExportColumns, parse_export};
use sales_core::ItemKind;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("usage: report_cli <items.csv> <modifiers.csv>");
        std::process::exit(2);
    }

    let columns = ExportColumns::default();
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for (path, kind) in [
        (&args[1], ItemKind::LineItem),
        (&args[2], ItemKind::Modifier),
    ] {
        let file = File::open(path).unwrap_or_else(|err| {
            eprintln!("failed to open {}: {}", path, err);
            std::process::exit(1);
        });
        let parsed = parse_export(BufReader::new(file), kind, &columns, Some("-"))
            .unwrap_or_else(|err| {
                eprintln!("failed to parse {}: {}", path, err);
                std::process::exit(1);
            });
        println!(
            "{} rows_read {} kept {} voided {} skipped {}",
            kind.as_str(),
            parsed.rows_read,
            parsed.items.len(),
            parsed.rows_voided,
            parsed.rows_skipped
        );
        for issue in &parsed.issues {
            eprintln!("{}:{} {}", issue.source, issue.line, issue.message);
        }
        for item in parsed.items {
            *totals.entry(item.product_id).or_insert(0.0) += item.quantity;
        }
    }

    if totals.is_empty() {
        eprintln!("no rows found");
        std::process::exit(3);
    }
    for (product_id, quantity) in totals {
        println!("plu {} qty {}", product_id, quantity);
    }
}
