//! The `assessly validate` command.

use std::path::PathBuf;

use anyhow::Result;

use assessly_core::parser;

pub fn execute(bank_path: PathBuf) -> Result<()> {
    let banks = if bank_path.is_dir() {
        parser::load_bank_directory(&bank_path)?
    } else {
        vec![parser::parse_bank(&bank_path)?]
    };

    let mut total_warnings = 0;

    for bank in &banks {
        println!(
            "Bank: {} [{}] ({} questions)",
            bank.title(),
            bank.selection(),
            bank.len()
        );

        let warnings = parser::validate_bank(bank);
        for w in &warnings {
            let prefix = w
                .question
                .map(|i| format!("  [Q{}]", i + 1))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if banks.is_empty() {
        println!("No banks found.");
    } else if total_warnings == 0 {
        println!("All banks valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
