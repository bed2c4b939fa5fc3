use crate::types::{CombinedSite, DifferentialSite, SiteVaf, Thresholds};
use std::collections::{HashMap, HashSet};

/// Inner join of aggregated treated sites with their matched untreated
/// summaries on (chrom, position).
///
/// Output preserves treated order; untreated partners appear in their own
/// order within a key. Keys that repeat on both sides pair exhaustively,
/// so a site can emit more than one row.
pub fn combine_treated_untreated(treated: &[SiteVaf], untreated: &[SiteVaf]) -> Vec<CombinedSite> {
    let mut untreated_by_position: HashMap<(&str, u64), Vec<&SiteVaf>> = HashMap::new();
    for site in untreated {
        untreated_by_position
            .entry((site.chrom.as_str(), site.position))
            .or_default()
            .push(site);
    }

    let mut combined = Vec::with_capacity(treated.len());
    for site in treated {
        let partners = match untreated_by_position.get(&(site.chrom.as_str(), site.position)) {
            Some(sites) => sites,
            None => continue,
        };
        for partner in partners {
            combined.push(CombinedSite {
                treated: site.clone(),
                untreated: (*partner).clone(),
            });
        }
    }

    combined
}

/// Keep control sites where treatment raised the VAF by at least the
/// configured margin over a near-silent untreated background. Both bounds
/// are inclusive.
pub fn retain_control_enriched(sites: Vec<CombinedSite>, thresholds: &Thresholds) -> Vec<CombinedSite> {
    sites
        .into_iter()
        .filter(|site| {
            site.treated.vaf >= site.untreated.vaf + thresholds.min_treated_vs_untreated
                && site.untreated.vaf <= thresholds.max_untreated_vaf
        })
        .collect()
}

/// Knockdown acceptance: the matched untreated VAF may not exceed the
/// ceiling. Applied to the matched side alone, before pairing; the
/// knockdown treated VAF is deliberately left unconstrained.
pub fn retain_untreated_ceiling(sites: Vec<SiteVaf>, thresholds: &Thresholds) -> Vec<SiteVaf> {
    sites
        .into_iter()
        .filter(|site| site.vaf <= thresholds.max_untreated_vaf)
        .collect()
}

/// Inner join of the per-condition survivor sets on (chrom, position),
/// with the same ordering and duplicate-key rules as
/// [`combine_treated_untreated`].
pub fn combine_control_knockdown(
    control: &[CombinedSite],
    knockdown: &[CombinedSite],
) -> Vec<DifferentialSite> {
    let mut knockdown_by_position: HashMap<(&str, u64), Vec<&CombinedSite>> = HashMap::new();
    for site in knockdown {
        knockdown_by_position
            .entry((site.treated.chrom.as_str(), site.treated.position))
            .or_default()
            .push(site);
    }

    let mut differential = Vec::new();
    for site in control {
        let partners =
            match knockdown_by_position.get(&(site.treated.chrom.as_str(), site.treated.position)) {
                Some(sites) => sites,
                None => continue,
            };
        for partner in partners {
            differential.push(DifferentialSite {
                control: site.clone(),
                knockdown: (*partner).clone(),
            });
        }
    }

    differential
}

/// Keep sites where the control treated VAF beats the knockdown treated
/// VAF by at least the configured margin (inclusive). Untreated VAFs play
/// no part here.
pub fn retain_differential(sites: Vec<DifferentialSite>, thresholds: &Thresholds) -> Vec<DifferentialSite> {
    sites
        .into_iter()
        .filter(|site| {
            site.control.treated.vaf >= site.knockdown.treated.vaf + thresholds.min_control_vs_kd
        })
        .collect()
}

type SiteKey = (String, u64, String, u64, u32);

fn site_key(site: &SiteVaf) -> SiteKey {
    (
        site.chrom.clone(),
        site.position,
        site.ref_base.clone(),
        site.vaf.to_bits(),
        site.depth,
    )
}

/// Drop rows whose every field repeats an earlier row exactly, keeping the
/// first occurrence. VAFs compare at full bit precision. Rows differing in
/// any single field both survive.
pub fn dedup_exact(sites: Vec<DifferentialSite>) -> Vec<DifferentialSite> {
    let mut seen = HashSet::new();
    sites
        .into_iter()
        .filter(|site| {
            let key = (
                (site_key(&site.control.treated), site_key(&site.control.untreated)),
                (site_key(&site.knockdown.treated), site_key(&site.knockdown.untreated)),
            );
            seen.insert(key)
        })
        .collect()
}
