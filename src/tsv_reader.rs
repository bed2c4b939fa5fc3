use crate::types::PileupRow;
use anyhow::{Context, Result};
use std::path::Path;

/// Column indices resolved from a table's header row.
struct Columns {
    chrom: usize,
    position: usize,
    ref_base: usize,
    base: usize,
    vaf: usize,
    depth: usize,
}

impl Columns {
    /// Locate the required columns by name. Column order is free and extra
    /// columns are ignored; a missing name fails with the file named.
    fn resolve(headers: &csv::StringRecord, path: &Path) -> Result<Columns> {
        let find = |name: &str| -> Result<usize> {
            headers.iter().position(|h| h == name).with_context(|| {
                format!(
                    "Required column '{}' missing from {}",
                    name,
                    path.display()
                )
            })
        };

        Ok(Columns {
            chrom: find("chrom")?,
            position: find("position")?,
            ref_base: find("ref")?,
            base: find("base")?,
            vaf: find("vaf")?,
            depth: find("depth")?,
        })
    }
}

/// Read one tab-separated pileup table into rows.
///
/// Required columns: `chrom`, `position`, `ref`, `base`, `vaf`, `depth`.
/// Any malformed row aborts the load with the file, row, and column named.
pub fn read_pileup_table(path: &Path) -> Result<Vec<PileupRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("Failed to open input table: {}", path.display()))?;

    let headers = rdr.headers()?.clone();
    let columns = Columns::resolve(&headers, path)?;

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record
            .with_context(|| format!("{}: failed to read row {}", path.display(), i + 1))?;
        rows.push(parse_row(&record, &columns, i + 1, path)?);
    }

    Ok(rows)
}

fn parse_row(
    record: &csv::StringRecord,
    columns: &Columns,
    row: usize,
    path: &Path,
) -> Result<PileupRow> {
    let field = |idx: usize, name: &str| -> Result<&str> {
        record
            .get(idx)
            .with_context(|| format!("{}: row {} has no '{}' field", path.display(), row, name))
    };
    let bad = |name: &str| format!("{}: row {}: invalid '{}' value", path.display(), row, name);

    Ok(PileupRow {
        chrom: field(columns.chrom, "chrom")?.to_string(),
        position: field(columns.position, "position")?
            .parse()
            .with_context(|| bad("position"))?,
        ref_base: field(columns.ref_base, "ref")?.to_string(),
        base: field(columns.base, "base")?.to_string(),
        vaf: field(columns.vaf, "vaf")?
            .parse()
            .with_context(|| bad("vaf"))?,
        depth: field(columns.depth, "depth")?
            .parse()
            .with_context(|| bad("depth"))?,
    })
}
