//! The `assessly init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create assessly.toml
    if std::path::Path::new("assessly.toml").exists() {
        println!("assessly.toml already exists, skipping.");
    } else {
        std::fs::write("assessly.toml", SAMPLE_CONFIG)?;
        println!("Created assessly.toml");
    }

    // Create example bank
    std::fs::create_dir_all("banks")?;
    let example_path = std::path::Path::new("banks/example.toml");
    if example_path.exists() {
        println!("banks/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_BANK)?;
        println!("Created banks/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Add your own questions under banks/");
    println!("  2. Run: assessly validate --bank banks");
    println!("  3. Run: assessly take --subject physics --difficulty beginner");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# assessly configuration

# Countdown length for each attempt, in seconds
duration_secs = 600

# Where finished assessment reports are written
output_dir = "./assessly-results"

# default_subject = "physics"
default_difficulty = "beginner"

[bank_source]
type = "directory"
path = "banks"
"#;

const EXAMPLE_BANK: &str = r#"[bank]
subject = "physics"
difficulty = "beginner"
title = "Physics warm-up"
description = "A short example bank to get started"

[[questions]]
prompt = "Which of the following represents simple harmonic motion?"
options = ["x = A sin(ωt + φ)", "x = At + B", "x = Ae^(-t)", "x = A log(t)"]
correct = 0
explanation = "Simple harmonic motion follows the sinusoidal pattern x = A sin(ωt + φ)"

[[questions]]
prompt = "What is the SI unit of force?"
options = ["Joule", "Newton", "Watt", "Pascal"]
correct = 1
explanation = "One newton accelerates one kilogram at one metre per second squared"

[[questions]]
prompt = "An object in free fall near Earth's surface accelerates at roughly"
options = ["1.6 m/s²", "3.7 m/s²", "9.8 m/s²", "24.8 m/s²"]
correct = 2
explanation = "Standard gravity is about 9.81 m/s²"
"#;
