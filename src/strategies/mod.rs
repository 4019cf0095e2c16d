// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Swap planning and randomness.

pub mod planner;
pub mod random;

pub use planner::{Holding, SwapIntent, SwapMode, SwapPlanner};
pub use random::{draw_pause, shuffle, RandomSource};
