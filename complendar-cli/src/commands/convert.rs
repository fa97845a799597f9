use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use complendar_core::source::{csv_url, fetch_csv};
use complendar_core::{ComplendarConfig, convert_csv};
use owo_colors::OwoColorize;
use uuid::Uuid;

use super::create_spinner;
use crate::render::{Render, pluralize, render_skipped};

pub async fn run(source: &str, output: Option<PathBuf>, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;

    let csv = read_source(source).await?;

    println!("Parsing CSV…");
    let report = convert_csv(&csv, &config);

    if let Some(headers) = &report.guessed_headers {
        println!("{}", headers.render());
    }
    for line in render_skipped(&report.skipped, tracing::enabled!(tracing::Level::INFO)) {
        println!("{line}");
    }

    let Some(document) = report.document.as_deref() else {
        bail!(
            "{}",
            report.error.as_deref().unwrap_or("Conversion failed")
        );
    };

    println!("Converting to ICS…");
    let path = output.unwrap_or_else(default_output_path);
    std::fs::write(&path, document).with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "{} {} {}. Saved to {}",
        "✅ Done.".green(),
        report.event_count,
        pluralize("birthday", report.event_count),
        path.display().bold()
    );

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ComplendarConfig> {
    match path {
        Some(path) => {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            Ok(ComplendarConfig::load_from(path)?)
        }
        None => Ok(ComplendarConfig::load()?),
    }
}

async fn read_source(source: &str) -> Result<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read CSV from stdin")?;
        return Ok(text);
    }

    if source.starts_with("http://") || source.starts_with("https://") {
        let url = csv_url(source)?;
        println!("Fetching CSV from: {}", url.dimmed());

        let spinner = create_spinner("Downloading".to_string());
        let result = fetch_csv(&url).await;
        spinner.finish_and_clear();

        return Ok(result?);
    }

    std::fs::read_to_string(source).with_context(|| format!("Failed to read {source}"))
}

fn default_output_path() -> PathBuf {
    PathBuf::from(format!("complendar_{}.ics", Uuid::new_v4().simple()))
}
