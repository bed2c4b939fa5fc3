use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use phoxi_filter::{
    aggregate, compare, filters, matched, output, tsv_reader,
    types::{CombinedSite, DifferentialSite, SiteVaf, Thresholds},
};
use std::path::Path;

#[derive(Parser)]
#[command(name = "phoxi-filter")]
#[command(version)]
#[command(about = "Filter PhOxi-seq pileup tables for THUMPD3-dependent sites", long_about = None)]
struct Args {
    /// Control treated pileup table (TSV)
    #[arg(long)]
    control_treated: String,

    /// Control untreated pileup table (TSV)
    #[arg(long)]
    control_untreated: String,

    /// THUMPD3 knockdown treated pileup table (TSV)
    #[arg(long)]
    thumpd3_kd_treated: String,

    /// THUMPD3 knockdown untreated pileup table (TSV)
    #[arg(long)]
    thumpd3_kd_untreated: String,

    /// Output CSV for sites passing both conditions
    #[arg(long)]
    output_combined: String,

    /// Output CSV for the control condition
    #[arg(long)]
    output_control: String,

    /// Output CSV for the knockdown condition
    #[arg(long)]
    output_thumpd3_kd: String,

    /// Minimum read depth per pileup row
    #[arg(long, default_value = "50")]
    min_depth: u32,

    /// Disable the multiallelic/deletion signature filter on the control
    /// treated table
    #[arg(long)]
    no_signature_filter: bool,

    /// Minimum aggregated treated VAF in the control condition
    #[arg(long, default_value = "0.1")]
    min_treated_vaf: f64,

    /// Maximum matched untreated VAF in both conditions
    #[arg(long, default_value = "0.05")]
    max_untreated_vaf: f64,

    /// Required control VAF excess of treated over untreated
    #[arg(long, default_value = "0.1")]
    min_treated_vs_untreated: f64,

    /// Required VAF excess of control treated over knockdown treated
    #[arg(long, default_value = "0.05")]
    min_control_vs_kd: f64,

    /// Number of threads for parallel processing
    #[arg(long, default_value_t = num_cpus())]
    threads: usize,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

macro_rules! progress {
    ($quiet:expr) => {
        if !$quiet {
            eprintln!();
        }
    };
    ($quiet:expr, $($arg:tt)*) => {
        if !$quiet {
            eprintln!($($arg)*);
        }
    };
}

fn make_spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("  {spinner} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Configure rayon thread pool
    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build_global()
        .unwrap();

    let inputs = [
        ("control treated", &args.control_treated),
        ("control untreated", &args.control_untreated),
        ("THUMPD3 kd treated", &args.thumpd3_kd_treated),
        ("THUMPD3 kd untreated", &args.thumpd3_kd_untreated),
    ];
    for (label, path) in &inputs {
        if !Path::new(path.as_str()).exists() {
            anyhow::bail!("Input file not found ({}): {}", label, path);
        }
    }

    let thresholds = Thresholds {
        min_depth: args.min_depth,
        signature_filter: !args.no_signature_filter,
        min_treated_vaf: args.min_treated_vaf,
        max_untreated_vaf: args.max_untreated_vaf,
        min_treated_vs_untreated: args.min_treated_vs_untreated,
        min_control_vs_kd: args.min_control_vs_kd,
    };

    progress!(args.quiet, "PhOxi-seq THUMPD3 Site Filter");
    progress!(args.quiet, "=========================================");
    progress!(args.quiet, "Control treated: {}", args.control_treated);
    progress!(args.quiet, "Control untreated: {}", args.control_untreated);
    progress!(args.quiet, "THUMPD3 kd treated: {}", args.thumpd3_kd_treated);
    progress!(args.quiet, "THUMPD3 kd untreated: {}", args.thumpd3_kd_untreated);
    progress!(args.quiet, "Combined output: {}", args.output_combined);
    progress!(args.quiet, "Control output: {}", args.output_control);
    progress!(args.quiet, "Knockdown output: {}", args.output_thumpd3_kd);
    progress!(args.quiet, "Min depth: {}", args.min_depth);
    if thresholds.signature_filter {
        progress!(args.quiet, "Signature filter: enabled");
    } else {
        progress!(args.quiet, "Signature filter: disabled");
    }
    progress!(args.quiet, "Min treated VAF: {}", args.min_treated_vaf);
    progress!(args.quiet, "Max untreated VAF: {}", args.max_untreated_vaf);
    progress!(args.quiet, "Min treated vs untreated: {}", args.min_treated_vs_untreated);
    progress!(args.quiet, "Min control vs kd: {}", args.min_control_vs_kd);
    progress!(args.quiet, "Threads: {}", args.threads);
    progress!(args.quiet);

    // Step 1: Load the four pileup tables
    progress!(args.quiet, "Step 1: Loading pileup tables...");
    let pb_load = make_spinner(args.quiet);
    pb_load.set_message("loading pileup tables");
    let ((control_treated, control_untreated), (kd_treated, kd_untreated)) = rayon::join(
        || {
            rayon::join(
                || tsv_reader::read_pileup_table(Path::new(&args.control_treated)),
                || tsv_reader::read_pileup_table(Path::new(&args.control_untreated)),
            )
        },
        || {
            rayon::join(
                || tsv_reader::read_pileup_table(Path::new(&args.thumpd3_kd_treated)),
                || tsv_reader::read_pileup_table(Path::new(&args.thumpd3_kd_untreated)),
            )
        },
    );
    let control_treated = control_treated?;
    let control_untreated = control_untreated?;
    let kd_treated = kd_treated?;
    let kd_untreated = kd_untreated?;
    pb_load.finish_and_clear();

    progress!(args.quiet, "  Control treated rows: {}", control_treated.len());
    progress!(args.quiet, "  Control untreated rows: {}", control_untreated.len());
    progress!(args.quiet, "  THUMPD3 kd treated rows: {}", kd_treated.len());
    progress!(args.quiet, "  THUMPD3 kd untreated rows: {}", kd_untreated.len());

    // The knockdown treated table sheds reference-matching rows once, up
    // front; no other table gets this treatment.
    let kd_treated = filters::drop_reference_matches(kd_treated);
    progress!(args.quiet, "  THUMPD3 kd treated variant rows: {}", kd_treated.len());

    // Step 2: Control condition
    progress!(args.quiet);
    progress!(args.quiet, "Step 2: Filtering the control condition...");
    let treated = filters::retain_min_depth(control_treated, &thresholds);
    progress!(args.quiet, "  Treated rows at depth >= {}: {}", thresholds.min_depth, treated.len());
    let treated = if thresholds.signature_filter {
        let kept = filters::retain_signature(treated);
        progress!(args.quiet, "  Treated rows with variant signature: {}", kept.len());
        kept
    } else {
        treated
    };
    let untreated = filters::retain_min_depth(control_untreated, &thresholds);
    progress!(args.quiet, "  Untreated rows at depth >= {}: {}", thresholds.min_depth, untreated.len());

    let sites = aggregate::aggregate_sites(&treated);
    let sites = aggregate::retain_min_vaf(sites, &thresholds);
    progress!(args.quiet, "  Aggregated sites at VAF >= {}: {}", thresholds.min_treated_vaf, sites.len());
    preview(args.quiet, &sites, fmt_site);

    let matched_sites = matched::match_untreated(&sites, &untreated);
    progress!(args.quiet, "  Matched untreated sites: {}", matched_sites.len());
    preview(args.quiet, &matched_sites, fmt_site);
    let control = compare::combine_treated_untreated(&sites, &matched_sites);
    let control = compare::retain_control_enriched(control, &thresholds);
    progress!(args.quiet, "  Control sites passing both masks: {}", control.len());
    preview(args.quiet, &control, fmt_combined);

    // Step 3: Knockdown condition
    progress!(args.quiet);
    progress!(args.quiet, "Step 3: Filtering the THUMPD3 knockdown condition...");
    let treated = filters::retain_min_depth(kd_treated, &thresholds);
    progress!(args.quiet, "  Treated rows at depth >= {}: {}", thresholds.min_depth, treated.len());
    let untreated = filters::retain_min_depth(kd_untreated, &thresholds);
    progress!(args.quiet, "  Untreated rows at depth >= {}: {}", thresholds.min_depth, untreated.len());

    let sites = aggregate::aggregate_sites(&treated);
    progress!(args.quiet, "  Aggregated sites: {}", sites.len());
    preview(args.quiet, &sites, fmt_site);

    let matched_sites = matched::match_untreated(&sites, &untreated);
    progress!(args.quiet, "  Matched untreated sites: {}", matched_sites.len());
    preview(args.quiet, &matched_sites, fmt_site);
    let matched_sites = compare::retain_untreated_ceiling(matched_sites, &thresholds);
    progress!(args.quiet, "  Matched sites with untreated VAF <= {}: {}", thresholds.max_untreated_vaf, matched_sites.len());

    let knockdown = compare::combine_treated_untreated(&sites, &matched_sites);
    progress!(args.quiet, "  Knockdown sites: {}", knockdown.len());
    preview(args.quiet, &knockdown, fmt_combined);

    // Step 4: Cross-condition combination
    progress!(args.quiet);
    progress!(args.quiet, "Step 4: Combining conditions...");
    let differential = compare::combine_control_knockdown(&control, &knockdown);
    progress!(args.quiet, "  Sites present in both conditions: {}", differential.len());
    preview(args.quiet, &differential, fmt_differential);
    let differential = compare::retain_differential(differential, &thresholds);
    progress!(args.quiet, "  Sites with control excess >= {}: {}", thresholds.min_control_vs_kd, differential.len());
    let differential = compare::dedup_exact(differential);
    progress!(args.quiet, "  Unique sites after duplicate removal: {}", differential.len());
    preview(args.quiet, &differential, fmt_differential);

    // Step 5: Write results
    progress!(args.quiet);
    progress!(args.quiet, "Step 5: Writing results...");
    output::write_condition_csv(&control, Path::new(&args.output_control))?;
    progress!(args.quiet, "  Control sites written to: {}", args.output_control);
    output::write_condition_csv(&knockdown, Path::new(&args.output_thumpd3_kd))?;
    progress!(args.quiet, "  Knockdown sites written to: {}", args.output_thumpd3_kd);
    output::write_differential_csv(&differential, Path::new(&args.output_combined))?;
    progress!(args.quiet, "  Combined sites written to: {}", args.output_combined);

    progress!(args.quiet);
    progress!(args.quiet, "Done!");

    Ok(())
}

const PREVIEW_ROWS: usize = 5;

/// Print the first few rows of an intermediate table to stderr.
fn preview<T>(quiet: bool, rows: &[T], fmt: impl Fn(&T) -> String) {
    if quiet {
        return;
    }
    for row in rows.iter().take(PREVIEW_ROWS) {
        eprintln!("    {}", fmt(row));
    }
    if rows.len() > PREVIEW_ROWS {
        eprintln!("    ... {} more rows", rows.len() - PREVIEW_ROWS);
    }
}

fn fmt_site(site: &SiteVaf) -> String {
    format!(
        "{}:{} ref {} | vaf {:.4} depth {}",
        site.chrom, site.position, site.ref_base, site.vaf, site.depth,
    )
}

fn fmt_combined(site: &CombinedSite) -> String {
    format!(
        "{}:{} ref {} | treated vaf {:.4} depth {} | untreated vaf {:.4} depth {}",
        site.treated.chrom,
        site.treated.position,
        site.treated.ref_base,
        site.treated.vaf,
        site.treated.depth,
        site.untreated.vaf,
        site.untreated.depth,
    )
}

fn fmt_differential(site: &DifferentialSite) -> String {
    format!(
        "{}:{} ref {} | control treated vaf {:.4} | kd treated vaf {:.4}",
        site.control.treated.chrom,
        site.control.treated.position,
        site.control.treated.ref_base,
        site.control.treated.vaf,
        site.knockdown.treated.vaf,
    )
}
