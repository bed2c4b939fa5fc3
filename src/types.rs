/// One observed-allele record at a genomic position in one sample.
///
/// A position appears on several rows when more than one alternate base was
/// observed there (multiallelic) or when a deletion record is present, in
/// which case `base` carries a `-` marker in bam-readcount style.
#[derive(Debug, Clone, PartialEq)]
pub struct PileupRow {
    pub chrom: String,
    pub position: u64,
    pub ref_base: String,
    pub base: String,
    pub vaf: f64,
    pub depth: u32,
}

/// Per-site VAF summary: one row per (chrom, position, ref) group.
///
/// Two derivations share this shape. Aggregating a treated table sums VAF
/// over the group and takes the maximum depth; matching an untreated table
/// against treated sites sums VAF over variant-bearing rows only and takes
/// the depth of the first matched row.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteVaf {
    pub chrom: String,
    pub position: u64,
    pub ref_base: String,
    pub vaf: f64,
    pub depth: u32,
}

/// A treated/untreated pair joined on (chrom, position) within one condition.
///
/// Both sides carry the join key: `treated.chrom == untreated.chrom` and
/// `treated.position == untreated.position` by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedSite {
    pub treated: SiteVaf,
    pub untreated: SiteVaf,
}

/// A control/knockdown pair joined on (chrom, position) across conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferentialSite {
    pub control: CombinedSite,
    pub knockdown: CombinedSite,
}

/// Filter thresholds, built once from the CLI and handed to each stage.
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// Minimum per-row sequencing depth, applied to all four tables.
    pub min_depth: u32,
    /// Whether the multiallelic/deletion signature filter runs on the
    /// control-treated table.
    pub signature_filter: bool,
    /// Minimum aggregated VAF for a control-treated site to stay in play.
    pub min_treated_vaf: f64,
    /// Maximum untreated VAF, enforced in both conditions.
    pub max_untreated_vaf: f64,
    /// Margin by which control-treated VAF must exceed its untreated VAF.
    pub min_treated_vs_untreated: f64,
    /// Margin by which control-treated VAF must exceed knockdown-treated VAF.
    pub min_control_vs_kd: f64,
}
