//! Rounding facility counts up to 3-smooth numbers (2^a * 3^b)
//!
//! Counts of that shape split evenly into power-of-two and power-of-three
//! sub-layouts when laying out a production line.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{CalcError, Result};

/// Largest count the rounder accepts.
pub const MAX_ROUNDABLE: u64 = 1 << 20;

/// Lookup table mapping every integer up to a power-of-two ceiling to the
/// smallest 3-smooth number not below it.
///
/// The table grows on demand and is swapped in whole, so readers never see
/// a partially built table.
#[derive(Debug)]
pub struct SmoothRounder {
    table: RwLock<Arc<Vec<u64>>>,
}

impl Default for SmoothRounder {
    fn default() -> Self {
        Self::new()
    }
}

impl SmoothRounder {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Smallest 3-smooth integer >= `n`. Anything below 1 rounds to 1.
    pub fn round_up(&self, n: f64) -> Result<u64> {
        if n.is_nan() || n > MAX_ROUNDABLE as f64 {
            return Err(CalcError::OutOfRange {
                value: n,
                ceiling: MAX_ROUNDABLE,
            });
        }
        if n < 1.0 {
            return Ok(1);
        }

        let target = n.ceil() as u64;
        let table = self.table_covering(target);
        Ok(table[target as usize])
    }

    /// Highest integer the current table covers, or `None` before the
    /// first lookup.
    pub fn ceiling(&self) -> Option<u64> {
        let table = self.table.read();
        (table.len() as u64).checked_sub(1)
    }

    fn table_covering(&self, target: u64) -> Arc<Vec<u64>> {
        {
            let table = self.table.read();
            if (target as usize) < table.len() {
                return Arc::clone(&*table);
            }
        }

        let mut table = self.table.write();
        // Another caller may have extended it while we waited.
        if (target as usize) >= table.len() {
            let ceiling = target.next_power_of_two();
            *table = Arc::new(build_table(ceiling));
            debug!(ceiling, "regenerated smooth-number table");
        }
        Arc::clone(&*table)
    }
}

/// All 3-smooth numbers <= `limit`, ascending.
fn smooth_numbers(limit: u64) -> Vec<u64> {
    let mut numbers = Vec::new();
    let mut two = 1u64;
    while two <= limit {
        let mut value = two;
        while value <= limit {
            numbers.push(value);
            value *= 3;
        }
        two *= 2;
    }
    numbers.sort_unstable();
    numbers
}

/// `ceiling` must itself be 3-smooth so every slot has an answer.
fn build_table(ceiling: u64) -> Vec<u64> {
    let smooth = smooth_numbers(ceiling);
    let mut table = Vec::with_capacity(ceiling as usize + 1);
    let mut next = 0;
    for i in 0..=ceiling {
        while smooth[next] < i {
            next += 1;
        }
        table.push(smooth[next]);
    }
    table
}
