//! Multi-series synchronizer — merges N timestamp-ordered axes into one
//! strictly increasing global tick sequence.
//!
//! Per tick, each axis reports whether it updated and the index of its most
//! recent known entry. Axes with equal timestamps collapse into the same
//! tick. Exhaustion is signalled by `advance()` returning `None`.

use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Debug)]
pub struct Synchronizer<'a> {
    axes: Vec<&'a [NaiveDateTime]>,
    next: Vec<usize>,
    last: Vec<Option<usize>>,
    updated: Vec<bool>,
    current: Option<NaiveDateTime>,
}

impl<'a> Synchronizer<'a> {
    /// Build a cursor over the given timestamp axes. Each axis must be
    /// strictly increasing.
    pub fn new(axes: Vec<&'a [NaiveDateTime]>) -> Result<Self, SyncError> {
        for (axis, stamps) in axes.iter().enumerate() {
            for (i, pair) in stamps.windows(2).enumerate() {
                if pair[1] <= pair[0] {
                    return Err(SyncError::NonMonotonicAxis {
                        axis,
                        index: i + 1,
                        prev: pair[0],
                        next: pair[1],
                    });
                }
            }
        }
        let n = axes.len();
        Ok(Self {
            axes,
            next: vec![0; n],
            last: vec![None; n],
            updated: vec![false; n],
            current: None,
        })
    }

    /// Step to the next global tick. Returns its timestamp, or `None` once
    /// every axis is exhausted.
    pub fn advance(&mut self) -> Option<NaiveDateTime> {
        let mut tick: Option<NaiveDateTime> = None;
        for (axis, stamps) in self.axes.iter().enumerate() {
            if let Some(&t) = stamps.get(self.next[axis]) {
                if tick.map_or(true, |best| t < best) {
                    tick = Some(t);
                }
            }
        }
        let tick = tick?;
        for axis in 0..self.axes.len() {
            let hit = self.axes[axis].get(self.next[axis]) == Some(&tick);
            self.updated[axis] = hit;
            if hit {
                self.last[axis] = Some(self.next[axis]);
                self.next[axis] += 1;
            }
        }
        self.current = Some(tick);
        Some(tick)
    }

    /// Did this axis produce an entry at the current tick?
    pub fn updated(&self, axis: usize) -> bool {
        self.updated[axis]
    }

    /// Index of the axis's most recent known entry, if any has been seen.
    pub fn last_index(&self, axis: usize) -> Option<usize> {
        self.last[axis]
    }

    pub fn current(&self) -> Option<NaiveDateTime> {
        self.current
    }

    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SyncError {
    #[error("axis {axis} is not strictly increasing at index {index} ({prev} then {next})")]
    NonMonotonicAxis {
        axis: usize,
        index: usize,
        prev: NaiveDateTime,
        next: NaiveDateTime,
    },
}
