use crate::mapping::{map_partition, BinAssignment, ValueBinMapping};
use crate::partition::{partition, Partition};
use crate::sentinel::prepare_table;
use crate::source::FrequencySource;
use log::{info, warn};
use numgen_common::{AttributeSpec, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Binning result for one attribute, plus the bookkeeping a consumer needs to apply it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeGeneralization {
    pub attribute: String,
    pub min_bin_size: u64,
    pub partition: Partition,
    pub mapping: ValueBinMapping,
    pub missing_value_count: Option<u64>,
    pub sentinel: Option<i64>,
    pub neutral_value: i64,
    pub null_count: u64,
}

impl AttributeGeneralization {
    pub fn lookup(&self, value: i64) -> Option<&BinAssignment> {
        self.mapping.get(value)
    }

    /// Mean to publish for `value`; a binned marker is replaced by the neutral value.
    pub fn output_mean(&self, value: i64) -> Option<f64> {
        if self.sentinel == Some(value) {
            return Some(self.neutral_value as f64);
        }
        self.mapping.get(value).map(|a| a.mean)
    }
}

pub fn generalize_attribute<S: FrequencySource + ?Sized>(
    source: &S,
    spec: &AttributeSpec,
) -> Result<AttributeGeneralization> {
    let raw = source.frequency_table(&spec.column)?;
    let prepared = prepare_table(raw, spec)?;
    let partition = partition(&prepared.table, spec.min_bin_size)?;
    let mapping = map_partition(&prepared.table, &partition)?;
    for bin in partition.undersized() {
        warn!(
            "{}: last bin {}..={} holds {} records, below threshold {}",
            spec.column, bin.low, bin.high, bin.count, spec.min_bin_size
        );
    }
    info!(
        "{}: {} values in {} bins (min size {}, {} records)",
        spec.column,
        mapping.len(),
        partition.bins.len(),
        spec.min_bin_size,
        partition.total_count()
    );
    Ok(AttributeGeneralization {
        attribute: spec.column.clone(),
        min_bin_size: spec.min_bin_size,
        partition,
        mapping,
        missing_value_count: prepared.missing_value_count,
        sentinel: prepared.sentinel,
        neutral_value: spec.neutral_value,
        null_count: prepared.null_count,
    })
}

/// Generalize independent attributes in parallel; results keep the order of `specs`.
pub fn generalize_attributes<S: FrequencySource + ?Sized>(
    source: &S,
    specs: &[AttributeSpec],
) -> Result<Vec<AttributeGeneralization>> {
    specs
        .par_iter()
        .map(|spec| generalize_attribute(source, spec))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::FrequencyTable;
    use numgen_common::{NumgenError, SentinelPolicy};
    use std::collections::HashMap;

    fn spec(column: &str, min_bin_size: u64, sentinel: SentinelPolicy) -> AttributeSpec {
        AttributeSpec {
            column: column.into(),
            min_bin_size,
            sentinel,
            marker: 9999,
            neutral_value: 0,
            null_as_sentinel: false,
        }
    }

    fn source() -> HashMap<String, FrequencyTable> {
        let mut m = HashMap::new();
        m.insert("YoB".into(), FrequencyTable::from_counts([(9999, 7), (1980, 10), (1981, 10), (1990, 10)]).unwrap());
        m.insert("posts".into(), FrequencyTable::from_counts([(0, 30), (1, 10), (9999, 5)]).unwrap());
        m
    }

    #[test]
    fn excluded_marker_is_not_mapped() {
        let g = generalize_attribute(&source(), &spec("YoB", 10, SentinelPolicy::Exclude)).unwrap();
        assert_eq!(g.missing_value_count, Some(7));
        assert!(g.lookup(9999).is_none());
        assert_eq!(g.partition.endpoints(), vec![1980, 1981, 1990]);
    }

    #[test]
    fn included_marker_is_neutralized() {
        let g = generalize_attribute(&source(), &spec("posts", 10, SentinelPolicy::Include)).unwrap();
        assert_eq!(g.lookup(9999).unwrap().range_label, "1-9999");
        assert_eq!(g.output_mean(9999), Some(0.0));
        assert_eq!(g.output_mean(0), Some(0.0));
        assert_eq!(g.output_mean(1), Some(g.lookup(1).unwrap().mean));
        assert_eq!(g.output_mean(42), None);
    }

    #[test]
    fn parallel_keeps_order() {
        let specs = vec![spec("posts", 10, SentinelPolicy::Include), spec("YoB", 10, SentinelPolicy::Exclude)];
        let out = generalize_attributes(&source(), &specs).unwrap();
        assert_eq!(out[0].attribute, "posts");
        assert_eq!(out[1].attribute, "YoB");
    }

    #[test]
    fn one_failure_fails_all() {
        let specs = vec![spec("YoB", 10, SentinelPolicy::None), spec("zip", 10, SentinelPolicy::None)];
        assert!(matches!(generalize_attributes(&source(), &specs), Err(NumgenError::UnknownColumn(_))));
    }

    #[test] fn zero_bin_size_fails() { assert!(matches!(generalize_attribute(&source(), &spec("YoB", 0, SentinelPolicy::None)), Err(NumgenError::InvalidBinSize(0)))); }
}
