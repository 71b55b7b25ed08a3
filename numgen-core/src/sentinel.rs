use crate::frequency::{FrequencyTable, RawFrequencies};
use log::warn;
use numgen_common::{AttributeSpec, Result, SentinelPolicy};

/// A frequency table ready for binning, with the marker bookkeeping split out.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedTable {
    pub table: FrequencyTable,
    /// Records holding the marker, when the marker is excluded from binning.
    pub missing_value_count: Option<u64>,
    /// The marker, when it is binned but must be neutralized on output.
    pub sentinel: Option<i64>,
    /// Records with no value that were left out of the table.
    pub null_count: u64,
}

pub fn prepare_table(raw: RawFrequencies, spec: &AttributeSpec) -> Result<PreparedTable> {
    let RawFrequencies { mut table, null_count } = raw;
    let mut skipped_nulls = 0;
    if null_count > 0 {
        if spec.null_as_sentinel {
            table = table.with_added(spec.marker, null_count)?;
        } else {
            warn!("{}: {null_count} null records left out of binning", spec.column);
            skipped_nulls = null_count;
        }
    }
    let prepared = match spec.sentinel {
        SentinelPolicy::Exclude => {
            let (rest, removed) = table.without(spec.marker);
            PreparedTable {
                table: rest,
                missing_value_count: Some(removed.unwrap_or(0)),
                sentinel: None,
                null_count: skipped_nulls,
            }
        }
        SentinelPolicy::Include => PreparedTable {
            table,
            missing_value_count: None,
            sentinel: Some(spec.marker),
            null_count: skipped_nulls,
        },
        SentinelPolicy::None => PreparedTable {
            table,
            missing_value_count: None,
            sentinel: None,
            null_count: skipped_nulls,
        },
    };
    Ok(prepared)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(sentinel: SentinelPolicy, null_as_sentinel: bool) -> AttributeSpec {
        AttributeSpec {
            column: "x".into(),
            min_bin_size: 10,
            sentinel,
            marker: 9999,
            neutral_value: 0,
            null_as_sentinel,
        }
    }

    fn raw(nulls: u64) -> RawFrequencies {
        RawFrequencies {
            table: FrequencyTable::from_counts([(1, 4), (9999, 6)]).unwrap(),
            null_count: nulls,
        }
    }

    #[test]
    fn exclude_strips_marker() {
        let p = prepare_table(raw(0), &spec(SentinelPolicy::Exclude, false)).unwrap();
        assert_eq!(p.missing_value_count, Some(6));
        assert_eq!(p.table.get(9999), None);
        assert_eq!(p.table.total_count(), 4);
    }

    #[test]
    fn exclude_counts_nulls_as_missing() {
        let p = prepare_table(raw(3), &spec(SentinelPolicy::Exclude, true)).unwrap();
        assert_eq!(p.missing_value_count, Some(9));
        assert_eq!(p.null_count, 0);
    }

    #[test]
    fn include_keeps_marker() {
        let p = prepare_table(raw(2), &spec(SentinelPolicy::Include, true)).unwrap();
        assert_eq!(p.table.get(9999), Some(8));
        assert_eq!(p.sentinel, Some(9999));
        assert_eq!(p.missing_value_count, None);
    }

    #[test]
    fn nulls_skipped_without_folding() {
        let p = prepare_table(raw(5), &spec(SentinelPolicy::None, false)).unwrap();
        assert_eq!(p.null_count, 5);
        assert_eq!(p.table.total_count(), 10);
        assert_eq!(p.sentinel, None);
    }

    #[test]
    fn folding_nulls_past_u64_is_rejected() {
        let r = RawFrequencies { table: FrequencyTable::new([(9999, u64::MAX)]).unwrap(), null_count: 1 };
        assert!(matches!(prepare_table(r, &spec(SentinelPolicy::Include, true)), Err(numgen_common::NumgenError::InvalidInput(_))));
    }

    #[test] fn exclude_absent_marker_is_zero() { let r = RawFrequencies { table: FrequencyTable::from_counts([(1, 1)]).unwrap(), null_count: 0 }; assert_eq!(prepare_table(r, &spec(SentinelPolicy::Exclude, false)).unwrap().missing_value_count, Some(0)); }
}
