use crate::frequency::FrequencyTable;
use crate::partition::Partition;
use numgen_common::{NumgenError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The generalized form of one original value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinAssignment {
    pub range_label: String, // "v" for a single-value bin, otherwise "low-high"
    pub mean: f64,
}

/// Total mapping from every observed distinct value to its bin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueBinMapping {
    entries: BTreeMap<i64, BinAssignment>,
}

impl ValueBinMapping {
    pub fn get(&self, value: i64) -> Option<&BinAssignment> {
        self.entries.get(&value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending order of original value.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &BinAssignment)> {
        self.entries.iter().map(|(v, a)| (*v, a))
    }

    pub(crate) fn from_entries(entries: BTreeMap<i64, BinAssignment>) -> Self {
        Self { entries }
    }
}

pub(crate) fn range_label(first: i64, endpoint: i64) -> String {
    if first == endpoint {
        first.to_string()
    } else {
        format!("{first}-{endpoint}")
    }
}

/// Map every value of `table` onto the bin described by the aligned `endpoints`/`means`.
///
/// Both slices must come from partitioning the same table; any disagreement between them
/// and the table is reported as [`NumgenError::InternalConsistency`].
pub fn build_mapping(table: &FrequencyTable, endpoints: &[i64], means: &[f64]) -> Result<ValueBinMapping> {
    if endpoints.len() != means.len() {
        return Err(NumgenError::InternalConsistency(format!(
            "{} endpoints but {} means",
            endpoints.len(),
            means.len()
        )));
    }
    let mut entries = BTreeMap::new();
    let mut index = 0;
    let mut current: Option<BinAssignment> = None;

    for entry in table.entries() {
        let Some(&endpoint) = endpoints.get(index) else {
            return Err(NumgenError::InternalConsistency(format!(
                "value {} lies above the last endpoint",
                entry.value
            )));
        };
        if entry.value > endpoint {
            return Err(NumgenError::InternalConsistency(format!(
                "value {} skipped past endpoint {endpoint}, which is not an input value",
                entry.value
            )));
        }
        let assignment = current.get_or_insert_with(|| BinAssignment {
            range_label: range_label(entry.value, endpoint),
            mean: means[index],
        });
        entries.insert(entry.value, assignment.clone());
        if entry.value == endpoint {
            index += 1;
            current = None;
        }
    }

    if index != endpoints.len() {
        return Err(NumgenError::InternalConsistency(format!(
            "{} of {} endpoints matched no input value",
            endpoints.len() - index,
            endpoints.len()
        )));
    }
    Ok(ValueBinMapping::from_entries(entries))
}

/// [`build_mapping`] over a [`Partition`] of the same table.
pub fn map_partition(table: &FrequencyTable, partition: &Partition) -> Result<ValueBinMapping> {
    build_mapping(table, &partition.endpoints(), &partition.means())
}
