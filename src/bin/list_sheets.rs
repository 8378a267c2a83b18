use calamine::{open_workbook_auto, Reader};
use std::{env, path::Path, process::exit};
use ventas_etl::{process::DEFAULT_SHEET, range::column_letters};

fn main() {
    // Expect one or more workbook paths.
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <WORKBOOK>...", args[0]);
        exit(1);
    }
    let mut failed = false;
    for file_path in &args[1..] {
        if let Err(e) = list_sheets(Path::new(file_path)) {
            eprintln!("Error: {}: {}", file_path, e);
            failed = true;
        }
    }
    if failed {
        exit(1);
    }
}

/// Print every sheet with its used range in A1 notation, marking the one the ETL reads.
fn list_sheets(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names();

    println!("=== {} ===", path.display());
    for name in &names {
        let range = workbook.worksheet_range(name)?;
        let used = match (range.start(), range.end()) {
            (Some((r0, c0)), Some((r1, c1))) => format!(
                "{}{}:{}{}",
                column_letters(c0),
                r0 + 1,
                column_letters(c1),
                r1 + 1
            ),
            _ => "<empty>".to_string(),
        };
        let marker = if name == DEFAULT_SHEET { " *" } else { "" };
        println!("- {:<30} {}{}", name, used, marker);
    }
    if !names.iter().any(|n| n == DEFAULT_SHEET) {
        println!("(no `{}` sheet: this file would be skipped)", DEFAULT_SHEET);
    }
    println!();
    Ok(())
}
