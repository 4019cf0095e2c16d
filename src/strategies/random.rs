// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Injectable randomness for planning and pacing.

use crate::config::Span;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use std::time::Duration;

/// Source of uniform integers. Production uses [`StdRng`]; tests script it.
pub trait RandomSource: RngCore + Send {
    /// Uniform integer in `[low, high]`.
    fn between(&mut self, low: u64, high: u64) -> u64 {
        if low >= high {
            low
        } else {
            self.gen_range(low..=high)
        }
    }

    /// Uniform index into a non-empty collection of `len` items.
    fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        self.between(0, len.saturating_sub(1) as u64) as usize
    }

    fn in_span(&mut self, span: Span) -> u64 {
        self.between(span.min, span.max)
    }
}

impl RandomSource for StdRng {}

pub fn shuffle<T>(items: &mut [T], rng: &mut dyn RandomSource) {
    items.shuffle(rng);
}

/// Random pause in whole seconds drawn from `span`.
pub fn draw_pause(span: Span, rng: &mut dyn RandomSource) -> Duration {
    Duration::from_secs(rng.in_span(span))
}

/// Replays a fixed sequence of draws. Degenerate ranges consume nothing.
#[cfg(test)]
pub struct Scripted(pub std::collections::VecDeque<u64>);

#[cfg(test)]
impl Scripted {
    pub fn new(values: &[u64]) -> Self {
        Self(values.iter().copied().collect())
    }
}

#[cfg(test)]
impl RngCore for Scripted {
    fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.0.pop_front().expect("script exhausted")
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
impl RandomSource for Scripted {
    fn between(&mut self, low: u64, high: u64) -> u64 {
        if low >= high {
            return low;
        }
        let value = self.next_u64();
        assert!(
            (low..=high).contains(&value),
            "scripted {value} outside [{low}, {high}]"
        );
        value
    }
}
