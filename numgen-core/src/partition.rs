//! Greedy bin partitioning of a frequency table.
//!
//! A single left-to-right pass closes a bin as soon as it holds at least
//! `min_bin_size` records *and* the records still unassigned could fill
//! another bin of that size. Once the unassigned remainder can no longer
//! support a second bin, every remaining value is folded into one final bin.
//! The last bin is therefore the only one that may fall below the threshold,
//! and only when the whole table holds too few records.

use crate::frequency::{FrequencyEntry, FrequencyTable};
use log::debug;
use numgen_common::{NumgenError, Result};
use serde::{Deserialize, Serialize};

/// A contiguous range of distinct values, `low..=high`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub low: i64,
    pub high: i64, // endpoint
    pub count: u64,
    pub mean: f64,
}

impl Bin {
    pub fn is_singleton(&self) -> bool {
        self.low == self.high
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub min_bin_size: u64,
    pub bins: Vec<Bin>,
}

impl Partition {
    /// Inclusive upper bound of each bin, strictly increasing.
    pub fn endpoints(&self) -> Vec<i64> {
        self.bins.iter().map(|b| b.high).collect()
    }

    /// Count-weighted mean of each bin, aligned with `endpoints()`.
    pub fn means(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.mean).collect()
    }

    pub fn total_count(&self) -> u64 {
        self.bins.iter().map(|b| b.count).sum()
    }

    /// Bins below the threshold; at most the last one.
    pub fn undersized(&self) -> impl Iterator<Item = &Bin> {
        self.bins.iter().filter(move |b| b.count < self.min_bin_size)
    }
}

#[derive(Default)]
struct BinAccumulator {
    low: Option<i64>,
    high: i64,
    count: u64,
    weighted_sum: i128,
    value_sum: i128,
    distinct: u64,
}

impl BinAccumulator {
    fn add(&mut self, entry: &FrequencyEntry) {
        self.low.get_or_insert(entry.value);
        self.high = entry.value;
        self.count += entry.count; // bounded by the table total
        self.weighted_sum += entry.value as i128 * entry.count as i128;
        self.value_sum += entry.value as i128;
        self.distinct += 1;
    }

    fn mean(&self) -> f64 {
        if self.count > 0 {
            self.weighted_sum as f64 / self.count as f64
        } else {
            // zero-count values only: fall back to the plain mean of the distinct values
            self.value_sum as f64 / self.distinct as f64
        }
    }

    /// Close the bin and reset for the next one. Only called after at least one `add`.
    fn close(&mut self) -> Bin {
        let bin = Bin {
            low: self.low.unwrap_or(self.high),
            high: self.high,
            count: self.count,
            mean: self.mean(),
        };
        *self = Self::default();
        bin
    }
}

pub fn partition(table: &FrequencyTable, min_bin_size: u64) -> Result<Partition> {
    if min_bin_size == 0 {
        return Err(NumgenError::InvalidBinSize(min_bin_size));
    }
    let entries = table.entries();
    let mut bins = Vec::new();
    let mut remaining = table.total_count();
    let mut acc = BinAccumulator::default();

    for (i, entry) in entries.iter().enumerate() {
        acc.add(entry);
        let running = acc.count;
        // running never exceeds remaining: both count the same unassigned records
        let after = remaining - running;
        if running >= min_bin_size && after >= min_bin_size {
            let bin = acc.close();
            debug!("closed bin {}..={} with {} records", bin.low, bin.high, bin.count);
            bins.push(bin);
            remaining = after;
        } else if after <= min_bin_size {
            for rest in &entries[i + 1..] {
                acc.add(rest);
            }
            let bin = acc.close();
            debug!(
                "closed tail bin {}..={} with {} records (threshold {min_bin_size})",
                bin.low, bin.high, bin.count
            );
            bins.push(bin);
            break;
        }
    }

    Ok(Partition { min_bin_size, bins })
}

/// Endpoint/mean form of [`partition`] over raw pairs, validating order first.
pub fn find_bin_endpoints(entries: &[(i64, u64)], min_bin_size: u64) -> Result<(Vec<i64>, Vec<f64>)> {
    if min_bin_size == 0 {
        return Err(NumgenError::InvalidBinSize(min_bin_size));
    }
    let table = FrequencyTable::new(entries.iter().copied())?;
    let p = partition(&table, min_bin_size)?;
    Ok((p.endpoints(), p.means()))
}
