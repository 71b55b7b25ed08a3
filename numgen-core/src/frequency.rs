use numgen_common::{NumgenError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One distinct attribute value and the number of records holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub value: i64,
    pub count: u64,
}

impl From<(i64, u64)> for FrequencyEntry {
    fn from((value, count): (i64, u64)) -> Self {
        Self { value, count }
    }
}

/// Frequency distribution of one attribute, strictly ascending by value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrequencyTable {
    entries: Vec<FrequencyEntry>,
    total: u64,
}

fn count_overflow() -> NumgenError {
    NumgenError::InvalidInput("total record count overflows u64".into())
}

impl FrequencyTable {
    /// Validate an already-ordered sequence. Unsorted or duplicate values are rejected,
    /// as is a table whose counts do not sum within `u64`.
    pub fn new<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (i64, u64)>,
    {
        Self::from_entries(entries.into_iter().map(FrequencyEntry::from).collect())
    }

    pub fn from_entries(entries: Vec<FrequencyEntry>) -> Result<Self> {
        for (i, pair) in entries.windows(2).enumerate() {
            if pair[1].value == pair[0].value {
                return Err(NumgenError::InvalidInput(format!(
                    "duplicate value {} at position {}",
                    pair[1].value,
                    i + 1
                )));
            }
            if pair[1].value < pair[0].value {
                return Err(NumgenError::InvalidInput(format!(
                    "value {} at position {} is not greater than preceding value {}",
                    pair[1].value,
                    i + 1,
                    pair[0].value
                )));
            }
        }
        let total = entries
            .iter()
            .try_fold(0u64, |acc, e| acc.checked_add(e.count))
            .ok_or_else(count_overflow)?;
        Ok(Self { entries, total })
    }

    /// Build a table from (value, count) pairs in any order, summing repeated values.
    pub fn from_counts<I>(counts: I) -> Result<Self>
    where
        I: IntoIterator<Item = (i64, u64)>,
    {
        let mut map: BTreeMap<i64, u64> = BTreeMap::new();
        for (value, count) in counts {
            let slot = map.entry(value).or_insert(0);
            *slot = slot.checked_add(count).ok_or_else(count_overflow)?;
        }
        Self::from_entries(
            map.into_iter()
                .map(|(value, count)| FrequencyEntry { value, count })
                .collect(),
        )
    }

    pub fn entries(&self) -> &[FrequencyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_count(&self) -> u64 {
        self.total
    }

    pub fn get(&self, value: i64) -> Option<u64> {
        self.entries
            .binary_search_by_key(&value, |e| e.value)
            .ok()
            .map(|i| self.entries[i].count)
    }

    /// Split off the entry for `value`, returning the remaining table and the removed count.
    pub fn without(&self, value: i64) -> (Self, Option<u64>) {
        match self.entries.binary_search_by_key(&value, |e| e.value) {
            Ok(i) => {
                let mut entries = self.entries.clone();
                let removed = entries.remove(i);
                let total = self.total - removed.count;
                (Self { entries, total }, Some(removed.count))
            }
            Err(_) => (self.clone(), None),
        }
    }

    /// Add `count` records to `value`, inserting it in order if absent.
    pub fn with_added(&self, value: i64, count: u64) -> Result<Self> {
        let total = self.total.checked_add(count).ok_or_else(count_overflow)?;
        let mut entries = self.entries.clone();
        match entries.binary_search_by_key(&value, |e| e.value) {
            Ok(i) => entries[i].count += count,
            Err(i) => entries.insert(i, FrequencyEntry { value, count }),
        }
        Ok(Self { entries, total })
    }
}

/// Frequencies as read from a store: the value counts plus records with no value at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFrequencies {
    pub table: FrequencyTable,
    pub null_count: u64,
}

impl From<FrequencyTable> for RawFrequencies {
    fn from(table: FrequencyTable) -> Self {
        Self { table, null_count: 0 }
    }
}

/// Streaming value counter used while scanning a column.
pub struct FrequencyCounter {
    map: BTreeMap<i64, u64>,
    nulls: u64,
}

impl FrequencyCounter {
    pub fn new() -> Self {
        Self {
            map: BTreeMap::new(),
            nulls: 0,
        }
    }
    pub fn add(&mut self, value: i64) {
        *self.map.entry(value).or_insert(0) += 1;
    }
    pub fn add_null(&mut self) {
        self.nulls += 1;
    }
    pub fn merge(&mut self, other: FrequencyCounter) {
        for (v, c) in other.map {
            *self.map.entry(v).or_insert(0) += c;
        }
        self.nulls += other.nulls;
    }
    pub fn finish(self) -> Result<RawFrequencies> {
        Ok(RawFrequencies {
            table: FrequencyTable::from_counts(self.map)?,
            null_count: self.nulls,
        })
    }
}

impl Default for FrequencyCounter {
    fn default() -> Self { Self::new() }
}
