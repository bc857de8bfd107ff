use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use garage_engine::{DiscardOutcome, GarageConfig, RecordBook};
use garage_store::FileRecordStore;
use garage_types::{OwnerId, StoredAssetRecord};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    let config = load_config(cli.config.as_deref())?;
    let store = FileRecordStore::open(&cli.data_dir).with_context(|| {
        format!("cannot open data directory {}", cli.data_dir.display())
    })?;
    debug!(data_dir = %cli.data_dir.display(), "record directory opened");
    let book = RecordBook::new(store);

    match cli.command {
        Command::List(args) => cmd_list(&book, &config, args, format),
        Command::Show(args) => cmd_show(&book, args, format),
        Command::Discard(args) => cmd_discard(&book, args, format),
        Command::Path(args) => cmd_path(&book, args, format),
        Command::Verify => cmd_verify(&book, format),
    }
}

/// Read and validate the garage configuration, or fall back to defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<GarageConfig> {
    let Some(path) = path else {
        return Ok(GarageConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read config {}", path.display()))?;
    let config: GarageConfig =
        toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))?;
    config.validate()?;
    debug!(path = %path.display(), max_per_owner = config.max_per_owner, "config loaded");
    Ok(config)
}

fn owner(raw: &str) -> anyhow::Result<OwnerId> {
    OwnerId::new(raw).context("owner id must not be empty")
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn summary_line(index: usize, record: &StoredAssetRecord) -> String {
    let items = record.contents.total_items();
    let noun = if items == 1 { "item" } else { "items" };
    format!(
        "[{}] {}  {} {}  key {}",
        index,
        record.display_name().bold(),
        items,
        noun,
        record.key_id.cyan()
    )
}

fn cmd_list(
    book: &RecordBook<FileRecordStore>,
    config: &GarageConfig,
    args: OwnerArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let owner = owner(&args.owner)?;
    let records = book.list(&owner)?;

    if format == OutputFormat::Json {
        return print_json(&json!({
            "owner": owner.as_str(),
            "capacity": config.max_per_owner,
            "vehicles": records,
        }));
    }

    let used = format!("{}/{}", records.len(), config.max_per_owner);
    let used = if records.len() >= config.max_per_owner {
        used.red()
    } else {
        used.green()
    };
    println!("Garage of {} ({})", owner.as_str().yellow(), used);
    if records.is_empty() {
        println!("  No stored vehicles.");
    }
    for (index, record) in records.iter().enumerate() {
        println!("  {}", summary_line(index, record));
    }
    Ok(())
}

fn cmd_show(
    book: &RecordBook<FileRecordStore>,
    args: RecordArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let owner = owner(&args.owner)?;
    let records = book.list(&owner)?;
    let Some(record) = records.get(args.index) else {
        bail!(
            "{} has no vehicle at index {} ({} stored)",
            owner,
            args.index,
            records.len()
        );
    };

    if format == OutputFormat::Json {
        return print_json(&serde_json::to_value(record)?);
    }

    println!("{}", summary_line(args.index, record));
    println!("  Template: {}", record.template_ref);
    println!("  Key code: {}", record.key_code.dimmed());
    if record.contents.is_empty() {
        println!("  Cargo: {}", "empty".dimmed());
    } else {
        println!("  Cargo:");
        for entry in &record.contents {
            println!("    {:>4} x {}", entry.count, entry.template_ref);
        }
    }
    Ok(())
}

fn cmd_discard(
    book: &RecordBook<FileRecordStore>,
    args: RecordArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let owner = owner(&args.owner)?;
    match book.discard(&owner, args.index)? {
        DiscardOutcome::Discarded(record) => {
            if format == OutputFormat::Json {
                return print_json(&json!({ "discarded": record }));
            }
            println!(
                "{} Discarded {} from {}",
                "✓".green().bold(),
                record.display_name().bold(),
                owner.as_str().yellow()
            );
            Ok(())
        }
        DiscardOutcome::IndexOutOfRange => {
            warn!(owner = %owner, index = args.index, "no record to discard");
            bail!("{} has no vehicle at index {}", owner, args.index)
        }
    }
}

fn cmd_path(
    book: &RecordBook<FileRecordStore>,
    args: OwnerArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let owner = owner(&args.owner)?;
    let path = book.store().path_for(&owner);
    if format == OutputFormat::Json {
        return print_json(&json!({
            "owner": owner.as_str(),
            "path": path.display().to_string(),
            "exists": path.is_file(),
        }));
    }
    println!("{}", path.display());
    Ok(())
}

fn cmd_verify(book: &RecordBook<FileRecordStore>, format: OutputFormat) -> anyhow::Result<()> {
    let entries = book.store().scan()?;
    let damaged: Vec<_> = entries.iter().filter(|e| e.result.is_err()).collect();
    let vehicles: usize = entries
        .iter()
        .filter_map(|e| e.result.as_ref().ok())
        .map(|c| c.len())
        .sum();

    if format == OutputFormat::Json {
        print_json(&json!({
            "documents": entries.len(),
            "vehicles": vehicles,
            "damaged": damaged
                .iter()
                .map(|e| json!({
                    "path": e.path.display().to_string(),
                    "error": e.result.as_ref().err().map(ToString::to_string),
                }))
                .collect::<Vec<_>>(),
        }))?;
    } else {
        for entry in &damaged {
            if let Err(e) = &entry.result {
                println!("{} {}: {}", "✗".red().bold(), entry.path.display(), e);
            }
        }
        let status = if damaged.is_empty() {
            "✓".green().bold()
        } else {
            "✗".red().bold()
        };
        println!(
            "{} {} documents, {} vehicles, {} damaged",
            status,
            entries.len(),
            vehicles,
            damaged.len()
        );
    }

    info!(
        documents = entries.len(),
        vehicles,
        damaged = damaged.len(),
        "record directory checked"
    );
    if !damaged.is_empty() {
        bail!("{} damaged record document(s)", damaged.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use garage_types::{KeyCredential, Manifest, ManifestEntry};

    #[test]
    fn missing_config_path_uses_defaults() {
        assert_eq!(load_config(None).unwrap(), GarageConfig::default());
    }

    #[test]
    fn config_file_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.toml");
        fs::write(&good, "max_per_owner = 4\nstore_radius = 25.0\n").unwrap();
        let config = load_config(Some(&good)).unwrap();
        assert_eq!(config.max_per_owner, 4);
        assert_eq!(config.store_radius, 25.0);

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "max_per_owner = 0\n").unwrap();
        assert!(load_config(Some(&bad)).is_err());

        assert!(load_config(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn summary_line_names_vehicle() {
        colored::control::set_override(false);
        let record = StoredAssetRecord::new(
            "{259EE7B78C51B624}Prefabs/Vehicles/Wheeled/UAZ469/UAZ469.et",
            Manifest::from_entries(vec![ManifestEntry::new("fuel.et", 3)]).unwrap(),
            KeyCredential::new("K1", "0001"),
        );
        assert_eq!(summary_line(2, &record), "[2] UAZ469  3 items  key K1");
    }

    #[test]
    fn verify_and_discard_report_failures() {
        let dir = tempfile::tempdir().unwrap();
        let book = RecordBook::new(FileRecordStore::open(dir.path()).unwrap());
        assert!(cmd_verify(&book, OutputFormat::Json).is_ok());

        fs::write(dir.path().join("P1.json"), "{ broken").unwrap();
        let err = cmd_verify(&book, OutputFormat::Json).unwrap_err();
        assert!(err.to_string().contains("1 damaged"));

        let args = RecordArgs {
            owner: "P2".into(),
            index: 0,
        };
        assert!(cmd_discard(&book, args, OutputFormat::Text).is_err());
    }
}
