use crate::types::{PileupRow, SiteVaf};
use std::collections::HashMap;

/// For each treated site, summarize the untreated evidence at the same
/// (chrom, position).
///
/// Candidates are the depth-filtered untreated rows at that position, in
/// table order; a treated site with no candidate contributes no output row.
/// The summary VAF adds the candidates whose observed base differs from
/// their own reference (0 when every candidate matches it). Depth is the
/// first candidate's depth, taken before the variant filter, unlike the
/// aggregation maximum.
///
/// Treated sites that share (chrom, position) under different refs each
/// resolve independently against the same candidate list.
pub fn match_untreated(treated: &[SiteVaf], untreated: &[PileupRow]) -> Vec<SiteVaf> {
    let mut candidates_by_position: HashMap<(&str, u64), Vec<&PileupRow>> = HashMap::new();
    for row in untreated {
        candidates_by_position
            .entry((row.chrom.as_str(), row.position))
            .or_default()
            .push(row);
    }

    let mut matched = Vec::with_capacity(treated.len());
    for site in treated {
        let candidates = match candidates_by_position.get(&(site.chrom.as_str(), site.position)) {
            Some(rows) => rows,
            None => continue,
        };

        let vaf: f64 = candidates
            .iter()
            .filter(|row| row.ref_base != row.base)
            .map(|row| row.vaf)
            .sum();

        matched.push(SiteVaf {
            chrom: site.chrom.clone(),
            position: site.position,
            ref_base: site.ref_base.clone(),
            vaf,
            depth: candidates[0].depth,
        });
    }

    matched
}
