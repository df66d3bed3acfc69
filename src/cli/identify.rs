use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::{OutputFormat, SourceArgs};
use crate::core::prediction::Prediction;
use crate::matching::engine::{MatchingConfig, MatchingEngine, DEFAULT_PARALLEL_THRESHOLD};
use crate::matching::report::{identify, Candidate, IdentificationReport};
use crate::matching::scoring::ScoringWeights;
use crate::parsing::ocr::{join_detections, parse_detections, DEFAULT_SEPARATOR};
use crate::utils::validation::validate_imprint;

#[derive(Args)]
pub struct IdentifyArgs {
    /// Predicted color class index
    #[arg(long)]
    pub color: u32,

    /// Predicted shape class index
    #[arg(long)]
    pub shape: u32,

    /// Imprint text as extracted by OCR (empty when the pill has none)
    #[arg(long, conflicts_with = "ocr")]
    pub imprint: Option<String>,

    /// JSON file of raw OCR detections to join into the imprint
    #[arg(long)]
    pub ocr: Option<PathBuf>,

    /// Separator placed between OCR detections
    #[arg(long, default_value = DEFAULT_SEPARATOR)]
    pub separator: String,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Number of candidates to show
    #[arg(short = 'n', long, default_value = "1")]
    pub max_matches: usize,

    // === Scoring weight options ===
    /// Credit for a color class match (default 0.5)
    #[arg(long, default_value = "0.5")]
    pub weight_color: f64,

    /// Credit for a shape class match (default 0.5)
    #[arg(long, default_value = "0.5")]
    pub weight_shape: f64,

    /// Database size at which scoring runs in parallel
    #[arg(long, default_value_t = DEFAULT_PARALLEL_THRESHOLD)]
    pub parallel_threshold: usize,
}

/// Execute identify subcommand
///
/// # Errors
///
/// Returns an error if the inputs cannot be loaded or identification fails.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: IdentifyArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let imprint = resolve_imprint(&args)?;
    validate_imprint(&imprint)?;

    let scoring_weights = ScoringWeights {
        color: args.weight_color,
        shape: args.weight_shape,
        ..ScoringWeights::default()
    };
    if !scoring_weights.is_valid() {
        anyhow::bail!("Scoring weights must be finite and non-negative");
    }

    let (database, decoder) = args.source.load()?;

    if verbose {
        eprintln!(
            "Loaded {} records and {} labels from {}",
            database.len(),
            decoder.len(),
            args.source.database.display()
        );
        eprintln!(
            "Scoring weights: {} color, {} shape (max total {})",
            scoring_weights.color,
            scoring_weights.shape,
            scoring_weights.max_total()
        );
    }

    let prediction = Prediction::new(args.color, args.shape, imprint);
    let config = MatchingConfig {
        scoring_weights,
        parallel_threshold: args.parallel_threshold,
    };
    let engine = MatchingEngine::with_config(&database, &decoder, config);
    let report = identify(&engine, &prediction, args.max_matches)?;

    match format {
        OutputFormat::Text => {
            print_text_results(&report, engine.config().scoring_weights.max_total());
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Tsv => print_tsv_results(&report.candidates),
    }

    Ok(())
}

fn resolve_imprint(args: &IdentifyArgs) -> anyhow::Result<String> {
    if let Some(path) = &args.ocr {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading OCR detections {}", path.display()))?;
        let detections = parse_detections(&content)?;
        return Ok(join_detections(&detections, &args.separator));
    }
    Ok(args.imprint.clone().unwrap_or_default())
}

fn print_text_results(report: &IdentificationReport, max_total: f64) {
    println!(
        "Prediction: color {}, shape {}, imprint \"{}\"",
        report.predicted_color, report.predicted_shape, report.predicted_imprint
    );

    for (i, candidate) in report.candidates.iter().enumerate() {
        if i > 0 {
            println!("\n{}", "─".repeat(60));
        }
        print_candidate(candidate, max_total);
    }

    println!();
}

fn print_candidate(candidate: &Candidate, max_total: f64) {
    let score = &candidate.score;
    println!("\n#{} {}", candidate.rank, candidate.name);
    println!("   Record: {} (name key {})", candidate.index, candidate.name_key);
    println!(
        "   Color: {}  Shape: {}  Imprint: \"{}\"",
        candidate.color_class, candidate.shape_class, candidate.imprint
    );
    println!(
        "\n   Score: {:.3} / {:.1} = {:.2} color + {:.2} shape + {:.3} edit + {:.3} overlap",
        score.total,
        max_total,
        score.color_match,
        score.shape_match,
        score.edit_similarity,
        score.overlap_similarity,
    );
}

fn print_tsv_results(candidates: &[Candidate]) {
    println!("rank\tindex\tname_key\tname\timprint\tcolor\tshape\tscore\tcolor_match\tshape_match\tedit_similarity\toverlap_similarity");
    for c in candidates {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.4}\t{:.4}\t{:.4}\t{:.4}\t{:.4}",
            c.rank,
            c.index,
            c.name_key,
            c.name,
            c.imprint,
            c.color_class,
            c.shape_class,
            c.score.total,
            c.score.color_match,
            c.score.shape_match,
            c.score.edit_similarity,
            c.score.overlap_similarity,
        );
    }
}
