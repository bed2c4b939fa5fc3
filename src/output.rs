use crate::types::{CombinedSite, DifferentialSite};
use anyhow::{Context, Result};
use csv::Writer;
use std::path::Path;

/// Write one condition's surviving sites (treated paired with untreated).
///
/// An empty slice still produces the file with its header row.
pub fn write_condition_csv(sites: &[CombinedSite], path: &Path) -> Result<()> {
    let mut wtr = Writer::from_path(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;

    wtr.write_record(&[
        "chrom",
        "position",
        "ref_treated",
        "vaf_treated",
        "depth_treated",
        "ref_untreated",
        "vaf_untreated",
        "depth_untreated",
    ])?;

    for site in sites {
        wtr.write_record(&[
            &site.treated.chrom,
            &site.treated.position.to_string(),
            &site.treated.ref_base,
            &site.treated.vaf.to_string(),
            &site.treated.depth.to_string(),
            &site.untreated.ref_base,
            &site.untreated.vaf.to_string(),
            &site.untreated.depth.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the cross-condition survivors, control columns before knockdown.
pub fn write_differential_csv(sites: &[DifferentialSite], path: &Path) -> Result<()> {
    let mut wtr = Writer::from_path(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;

    wtr.write_record(&[
        "chrom",
        "position",
        "ref_treated_control",
        "vaf_treated_control",
        "depth_treated_control",
        "ref_untreated_control",
        "vaf_untreated_control",
        "depth_untreated_control",
        "ref_treated_THUMPD3_kd",
        "vaf_treated_THUMPD3_kd",
        "depth_treated_THUMPD3_kd",
        "ref_untreated_THUMPD3_kd",
        "vaf_untreated_THUMPD3_kd",
        "depth_untreated_THUMPD3_kd",
    ])?;

    for site in sites {
        wtr.write_record(&[
            &site.control.treated.chrom,
            &site.control.treated.position.to_string(),
            &site.control.treated.ref_base,
            &site.control.treated.vaf.to_string(),
            &site.control.treated.depth.to_string(),
            &site.control.untreated.ref_base,
            &site.control.untreated.vaf.to_string(),
            &site.control.untreated.depth.to_string(),
            &site.knockdown.treated.ref_base,
            &site.knockdown.treated.vaf.to_string(),
            &site.knockdown.treated.depth.to_string(),
            &site.knockdown.untreated.ref_base,
            &site.knockdown.untreated.vaf.to_string(),
            &site.knockdown.untreated.depth.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SiteVaf;
    use std::fs;
    use tempfile::tempdir;

    fn site(chrom: &str, position: u64, ref_base: &str, vaf: f64, depth: u32) -> SiteVaf {
        SiteVaf {
            chrom: chrom.to_string(),
            position,
            ref_base: ref_base.to_string(),
            vaf,
            depth,
        }
    }

    #[test]
    fn test_condition_csv_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("control.csv");
        let sites = vec![CombinedSite {
            treated: site("chr1", 100, "G", 0.3, 80),
            untreated: site("chr1", 100, "G", 0.02, 70),
        }];
        write_condition_csv(&sites, &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(
            lines[0],
            "chrom,position,ref_treated,vaf_treated,depth_treated,\
             ref_untreated,vaf_untreated,depth_untreated"
        );
        assert_eq!(lines[1], "chr1,100,G,0.3,80,G,0.02,70");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_empty_condition_csv_keeps_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_condition_csv(&[], &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 1);
        assert!(written.starts_with("chrom,position,"));
    }

    #[test]
    fn test_differential_csv_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("combined.csv");
        let sites = vec![DifferentialSite {
            control: CombinedSite {
                treated: site("chr1", 100, "G", 0.3, 80),
                untreated: site("chr1", 100, "G", 0.02, 70),
            },
            knockdown: CombinedSite {
                treated: site("chr1", 100, "G", 0.1, 60),
                untreated: site("chr1", 100, "G", 0.01, 50),
            },
        }];
        write_differential_csv(&sites, &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(
            lines[0],
            "chrom,position,\
             ref_treated_control,vaf_treated_control,depth_treated_control,\
             ref_untreated_control,vaf_untreated_control,depth_untreated_control,\
             ref_treated_THUMPD3_kd,vaf_treated_THUMPD3_kd,depth_treated_THUMPD3_kd,\
             ref_untreated_THUMPD3_kd,vaf_untreated_THUMPD3_kd,depth_untreated_THUMPD3_kd"
        );
        assert_eq!(lines[1], "chr1,100,G,0.3,80,G,0.02,70,G,0.1,60,G,0.01,50");
    }

    #[test]
    fn test_create_failure_names_path() {
        let err = write_condition_csv(&[], Path::new("/no/such/dir/out.csv")).unwrap_err();
        assert!(err.to_string().contains("/no/such/dir/out.csv"));
    }
}
