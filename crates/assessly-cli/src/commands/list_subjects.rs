//! The `assessly list-subjects` command.

use std::path::PathBuf;

use anyhow::Result;

use assessly_providers::{create_provider, load_config_from};

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let provider = create_provider(&config.bank_source)?;
    let subjects = provider.available_subjects();

    println!("Provider: {}", provider.name());
    if subjects.is_empty() {
        println!("No subjects available. Run `assessly init` to create an example bank.");
        return Ok(());
    }

    for subject in &subjects {
        let difficulties: Vec<String> = subject.difficulties.iter().map(|d| d.to_string()).collect();
        println!(
            "  {} ({}): {}",
            subject.id,
            subject.name,
            difficulties.join(", ")
        );
    }

    Ok(())
}
