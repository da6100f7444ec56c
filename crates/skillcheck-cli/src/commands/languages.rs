//! The `skillcheck languages` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use skillcheck_core::languages::LanguageRegistry;

pub fn execute() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Language", "Name", "Judge ID"]);

    for lang in LanguageRegistry::builtin().list() {
        table.add_row(vec![
            Cell::new(&lang.display_name),
            Cell::new(&lang.name),
            Cell::new(lang.id),
        ]);
    }

    println!("{table}");
    println!("Unknown languages run on the JavaScript backend.");
    Ok(())
}
