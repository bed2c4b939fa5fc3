use crate::types::{PileupRow, SiteVaf, Thresholds};
use std::collections::BTreeMap;

/// Collapse filtered rows to one summary per (chrom, position, ref) group.
///
/// VAF is the sum over the group; depth is the group maximum. Output follows
/// ascending group-key order, so downstream joins see a stable row order.
pub fn aggregate_sites(rows: &[PileupRow]) -> Vec<SiteVaf> {
    let mut groups: BTreeMap<(String, u64, String), (f64, u32)> = BTreeMap::new();
    for row in rows {
        let entry = groups
            .entry((row.chrom.clone(), row.position, row.ref_base.clone()))
            .or_insert((0.0, 0));
        entry.0 += row.vaf;
        entry.1 = entry.1.max(row.depth);
    }

    groups
        .into_iter()
        .map(|((chrom, position, ref_base), (vaf, depth))| SiteVaf {
            chrom,
            position,
            ref_base,
            vaf,
            depth,
        })
        .collect()
}

/// Retain aggregated sites at or above the treated VAF floor.
///
/// Control branch only; the knockdown-treated aggregate is never floored.
pub fn retain_min_vaf(mut sites: Vec<SiteVaf>, thresholds: &Thresholds) -> Vec<SiteVaf> {
    sites.retain(|site| site.vaf >= thresholds.min_treated_vaf);
    sites
}
