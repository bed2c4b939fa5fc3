use crate::types::{PileupRow, Thresholds};
use std::collections::HashMap;

/// Retain rows sequenced at or above the depth threshold.
pub fn retain_min_depth(mut rows: Vec<PileupRow>, thresholds: &Thresholds) -> Vec<PileupRow> {
    rows.retain(|row| row.depth >= thresholds.min_depth);
    rows
}

/// Retain rows carrying a multiallelic or deletion signature.
///
/// A row passes if its (chrom, position) occurs more than once in the table
/// (several alleles observed at the site) or if its `base` contains the
/// deletion marker `-`. Runs on the depth-filtered control-treated table;
/// occurrence counts therefore reflect the post-depth-filter table.
pub fn retain_signature(rows: Vec<PileupRow>) -> Vec<PileupRow> {
    let mut occurrences: HashMap<(&str, u64), u32> = HashMap::new();
    for row in &rows {
        *occurrences
            .entry((row.chrom.as_str(), row.position))
            .or_insert(0) += 1;
    }

    let keep: Vec<bool> = rows
        .iter()
        .map(|row| {
            occurrences[&(row.chrom.as_str(), row.position)] > 1 || row.base.contains('-')
        })
        .collect();

    rows.into_iter()
        .zip(keep)
        .filter_map(|(row, kept)| kept.then_some(row))
        .collect()
}

/// Drop rows whose observed base equals the reference.
///
/// Applied exactly once, to the knockdown-treated table right after load:
/// that table ships reference-matching rows the other three do not carry.
pub fn drop_reference_matches(mut rows: Vec<PileupRow>) -> Vec<PileupRow> {
    rows.retain(|row| row.ref_base != row.base);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(chrom: &str, position: u64, ref_base: &str, base: &str, depth: u32) -> PileupRow {
        PileupRow {
            chrom: chrom.to_string(),
            position,
            ref_base: ref_base.to_string(),
            base: base.to_string(),
            vaf: 0.1,
            depth,
        }
    }

    fn thresholds(min_depth: u32) -> Thresholds {
        Thresholds {
            min_depth,
            signature_filter: true,
            min_treated_vaf: 0.1,
            max_untreated_vaf: 0.05,
            min_treated_vs_untreated: 0.1,
            min_control_vs_kd: 0.05,
        }
    }

    #[test]
    fn test_depth_threshold_is_inclusive() {
        let rows = vec![
            row("chr1", 100, "A", "T", 49),
            row("chr1", 101, "A", "T", 50),
            row("chr1", 102, "A", "T", 51),
        ];
        let kept = retain_min_depth(rows, &thresholds(50));
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].position, 101);
        assert_eq!(kept[1].position, 102);
    }

    #[test]
    fn test_depth_filter_is_monotonic() {
        let rows: Vec<PileupRow> = (0..20)
            .map(|i| row("chr1", 100 + i, "A", "T", 40 + i as u32))
            .collect();

        let mut previous = rows.len();
        for min_depth in [40u32, 45, 50, 55, 60, 65] {
            let kept = retain_min_depth(rows.clone(), &thresholds(min_depth)).len();
            assert!(
                kept <= previous,
                "raising the threshold to {} grew the table ({} -> {})",
                min_depth,
                previous,
                kept
            );
            previous = kept;
        }
    }

    #[test]
    fn test_signature_keeps_multiallelic_sites() {
        let rows = vec![
            row("chr1", 100, "A", "T", 60),
            row("chr1", 100, "A", "G", 60),
            row("chr1", 200, "C", "T", 60),
        ];
        let kept = retain_signature(rows);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| r.position == 100));
    }

    #[test]
    fn test_signature_keeps_deletion_marker() {
        let rows = vec![
            row("chr1", 100, "A", "-AG", 60),
            row("chr1", 200, "C", "T", 60),
        ];
        let kept = retain_signature(rows);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].base, "-AG");
    }

    #[test]
    fn test_signature_drops_lone_substitution() {
        let rows = vec![row("chr1", 100, "A", "T", 60)];
        assert!(retain_signature(rows).is_empty());
    }

    #[test]
    fn test_signature_counts_positions_per_chromosome() {
        // Same position on two chromosomes is not multiallelic.
        let rows = vec![
            row("chr1", 100, "A", "T", 60),
            row("chr2", 100, "A", "G", 60),
        ];
        assert!(retain_signature(rows).is_empty());
    }

    #[test]
    fn test_drop_reference_matches() {
        let rows = vec![
            row("chr1", 100, "A", "A", 60),
            row("chr1", 100, "A", "T", 60),
            row("chr1", 101, "G", "G", 60),
        ];
        let kept = drop_reference_matches(rows);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].base, "T");
    }

    #[test]
    fn test_empty_table_flows_through() {
        assert!(retain_min_depth(Vec::new(), &thresholds(50)).is_empty());
        assert!(retain_signature(Vec::new()).is_empty());
        assert!(drop_reference_matches(Vec::new()).is_empty());
    }
}
