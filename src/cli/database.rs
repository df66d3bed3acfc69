use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};

use crate::catalog::labels::LabelDecoder;
use crate::catalog::store::ReferenceDatabase;
use crate::cli::{OutputFormat, SourceArgs};

#[derive(Args)]
pub struct DatabaseArgs {
    #[command(subcommand)]
    pub command: DatabaseCommands,
}

#[derive(Subcommand)]
pub enum DatabaseCommands {
    /// List records in scan order
    List {
        #[command(flatten)]
        source: SourceArgs,

        /// Show at most this many records
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show one record
    Show {
        /// Record index (0-based scan position)
        #[arg(required = true)]
        index: usize,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Summarize records per color and shape class
    Stats {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Export the database to a JSON snapshot
    Export {
        /// Output file path
        #[arg(required = true)]
        output: PathBuf,

        #[command(flatten)]
        source: SourceArgs,
    },
}

/// Execute database subcommand
///
/// # Errors
///
/// Returns an error if the database cannot be loaded or the output written.
pub fn run(args: DatabaseArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    match args.command {
        DatabaseCommands::List { source, limit } => run_list(&source, limit, format, verbose),
        DatabaseCommands::Show { index, source } => run_show(&source, index, format),
        DatabaseCommands::Stats { source } => run_stats(&source, format),
        DatabaseCommands::Export { output, source } => run_export(&source, &output, verbose),
    }
}

/// Best available display name for a record
fn display_name(
    database: &ReferenceDatabase,
    decoder: Option<&LabelDecoder>,
    index: usize,
) -> Option<String> {
    let record = database.get(index)?;
    decoder
        .and_then(|d| d.decode(record.name_key).ok())
        .or_else(|| database.stored_name(index))
        .map(str::to_string)
}

fn run_list(
    source: &SourceArgs,
    limit: Option<usize>,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let database = source.load_database()?;
    let decoder = source.load_decoder(&database)?;

    if verbose {
        eprintln!("Loaded database with {} records", database.len());
    }

    let shown = limit.unwrap_or(database.len()).min(database.len());
    let rows: Vec<(usize, Option<String>)> = (0..shown)
        .map(|i| (i, display_name(&database, decoder.as_ref(), i)))
        .collect();

    match format {
        OutputFormat::Text => {
            let imprint_width = database.records()[..shown]
                .iter()
                .map(|r| r.imprint.chars().count().min(30))
                .max()
                .unwrap_or(7)
                .max(7);

            println!("Drug Database ({} records)\n", database.len());
            println!(
                "{:>8} {:<imp_w$} {:>6} {:>6} {:>8}  Name",
                "Index",
                "Imprint",
                "Color",
                "Shape",
                "NameKey",
                imp_w = imprint_width
            );
            println!("{}", "-".repeat(imprint_width + 50));

            for (i, name) in &rows {
                let record = &database.records()[*i];
                println!(
                    "{:>8} {:<imp_w$} {:>6} {:>6} {:>8}  {}",
                    i,
                    truncate(&record.imprint, imprint_width),
                    record.color_class,
                    record.shape_class,
                    record.name_key,
                    name.as_deref().unwrap_or("-"),
                    imp_w = imprint_width
                );
            }

            if shown < database.len() {
                println!("\n... and {} more records", database.len() - shown);
            }
        }
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = rows
                .iter()
                .map(|(i, name)| {
                    let record = &database.records()[*i];
                    serde_json::json!({
                        "index": i,
                        "imprint": record.imprint,
                        "color_class": record.color_class,
                        "shape_class": record.shape_class,
                        "name_key": record.name_key,
                        "name": name,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("index\timprint\tcolor\tshape\tname_key\tname");
            for (i, name) in &rows {
                let record = &database.records()[*i];
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    i,
                    record.imprint,
                    record.color_class,
                    record.shape_class,
                    record.name_key,
                    name.as_deref().unwrap_or("")
                );
            }
        }
    }

    Ok(())
}

fn run_show(source: &SourceArgs, index: usize, format: OutputFormat) -> anyhow::Result<()> {
    let database = source.load_database()?;
    let decoder = source.load_decoder(&database)?;

    let record = database.get(index).ok_or_else(|| {
        anyhow::anyhow!(
            "Record {} not found (database has {} records)",
            index,
            database.len()
        )
    })?;
    let name = display_name(&database, decoder.as_ref(), index);

    match format {
        OutputFormat::Text => {
            println!("Record: {index}\n");
            println!("Name:     {}", name.as_deref().unwrap_or("-"));
            println!("Name key: {}", record.name_key);
            println!("Color:    {}", record.color_class);
            println!("Shape:    {}", record.shape_class);
            if record.has_imprint() {
                println!("Imprint:  {}", record.imprint);
            } else {
                println!("Imprint:  (none)");
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "index": index,
                "record": record,
                "name": name,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("index\timprint\tcolor\tshape\tname_key\tname");
            println!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                index,
                record.imprint,
                record.color_class,
                record.shape_class,
                record.name_key,
                name.as_deref().unwrap_or("")
            );
        }
    }

    Ok(())
}

fn run_stats(source: &SourceArgs, format: OutputFormat) -> anyhow::Result<()> {
    let database = source.load_database()?;
    let summary = database.summary();

    match format {
        OutputFormat::Text => {
            println!("Records:            {}", summary.record_count);
            println!("Distinct drugs:     {}", summary.distinct_name_keys);
            println!("Without imprint:    {}", summary.empty_imprints);

            println!("\nColor classes:");
            for (class, count) in &summary.color_classes {
                println!("   {class:>4}  {count}");
            }
            println!("\nShape classes:");
            for (class, count) in &summary.shape_classes {
                println!("   {class:>4}  {count}");
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Tsv => {
            println!("kind\tclass\tcount");
            for (class, count) in &summary.color_classes {
                println!("color\t{class}\t{count}");
            }
            for (class, count) in &summary.shape_classes {
                println!("shape\t{class}\t{count}");
            }
        }
    }

    Ok(())
}

fn run_export(source: &SourceArgs, output: &Path, verbose: bool) -> anyhow::Result<()> {
    let database = source.load_database()?;
    let json = database.to_json()?;
    std::fs::write(output, json)
        .with_context(|| format!("writing snapshot {}", output.display()))?;

    if verbose {
        eprintln!(
            "Exported {} records to {}",
            database.len(),
            output.display()
        );
    }

    Ok(())
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
