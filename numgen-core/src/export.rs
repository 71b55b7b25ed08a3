use crate::generalize::AttributeGeneralization;
use crate::mapping::{range_label, BinAssignment};
use crate::partition::Bin;
use numgen_common::{NumgenError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRecord {
    pub original_value: i64,
    pub range_label: String,
    pub mean: f64,
}

/// On-disk form of one attribute's mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingDocument {
    pub schema_version: u32,
    pub attribute: String,
    pub min_bin_size: u64,
    pub missing_value_count: Option<u64>,
    pub sentinel: Option<i64>,
    pub neutral_value: i64,
    #[serde(default)]
    pub null_count: u64,
    pub bins: Vec<Bin>,
    pub records: Vec<MappingRecord>,
}

impl MappingDocument {
    pub fn from_generalization(g: &AttributeGeneralization) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            attribute: g.attribute.clone(),
            min_bin_size: g.min_bin_size,
            missing_value_count: g.missing_value_count,
            sentinel: g.sentinel,
            neutral_value: g.neutral_value,
            null_count: g.null_count,
            bins: g.partition.bins.clone(),
            records: g
                .mapping
                .iter()
                .map(|(v, a)| MappingRecord {
                    original_value: v,
                    range_label: a.range_label.clone(),
                    mean: a.mean,
                })
                .collect(),
        }
    }

    /// Records keyed by original value.
    pub fn lookup_table(&self) -> BTreeMap<i64, BinAssignment> {
        self.records
            .iter()
            .map(|r| {
                (
                    r.original_value,
                    BinAssignment { range_label: r.range_label.clone(), mean: r.mean },
                )
            })
            .collect()
    }
}

pub fn write_mapping_json(output_path: &Path, g: &AttributeGeneralization) -> Result<()> {
    let doc = MappingDocument::from_generalization(g);
    let mut file = std::fs::File::create(output_path)?;
    serde_json::to_writer_pretty(&mut file, &doc)?;
    writeln!(file)?;
    Ok(())
}

pub fn read_mapping_json(path: &Path) -> Result<MappingDocument> {
    let content = std::fs::read_to_string(path)?;
    let doc: MappingDocument = serde_json::from_str(&content)?;
    if doc.schema_version != SCHEMA_VERSION {
        return Err(NumgenError::Other(format!(
            "unsupported mapping schema version {} (expected {SCHEMA_VERSION})",
            doc.schema_version
        )));
    }
    Ok(doc)
}

// csv-escape: wrap in quotes if contains comma, quote, or newline
fn csv_field(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

pub fn write_mapping_csv(output_path: &Path, g: &AttributeGeneralization) -> Result<()> {
    let mut file = std::fs::File::create(output_path)?;
    writeln!(file, "original_value,range_label,mean")?;
    for (value, a) in g.mapping.iter() {
        writeln!(file, "{},{},{}", value, csv_field(&a.range_label), a.mean)?;
    }
    Ok(())
}

pub fn print_summary(doc: &MappingDocument) {
    println!("{:<16} {}", "Attribute:", doc.attribute);
    println!("{:<16} {}", "Min bin size:", doc.min_bin_size);
    println!("{:<16} {}", "Values:", doc.records.len());
    println!("{:<16} {}", "Bins:", doc.bins.len());
    let records = doc.bins.iter().fold(0u64, |acc, b| acc.saturating_add(b.count));
    println!("{:<16} {}", "Records:", records);
    if let Some(missing) = doc.missing_value_count {
        println!("{:<16} {}", "Missing:", missing);
    }
    if let Some(marker) = doc.sentinel {
        println!("{:<16} {} (published as {})", "Marker:", marker, doc.neutral_value);
    }
    if doc.null_count > 0 {
        println!("{:<16} {}", "Skipped nulls:", doc.null_count);
    }
    println!();
    println!("{:<24} {:>12} {:>14}", "range", "records", "mean");
    for b in &doc.bins {
        println!("{}", bin_row(b, doc.min_bin_size));
    }
}

/// One summary line; undersized bins are flagged with `*`.
fn bin_row(b: &Bin, min_bin_size: u64) -> String {
    let flag = if b.count < min_bin_size { " *" } else { "" };
    format!("{:<24} {:>12} {:>14.4}{flag}", range_label(b.low, b.high), b.count, b.mean)
}
