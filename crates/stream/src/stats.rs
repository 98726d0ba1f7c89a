use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;

use crate::grid::RegionCoord;

/// Per-tick streaming statistics for instrumentation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickStats {
    pub tick: u64,
    pub current_region: Option<RegionCoord>,
    pub regions_evicted: usize,
    pub handles_released: usize,
    pub regions_populated: usize,
    pub handles_spawned: usize,
    pub live_regions: usize,
    pub live_handles: usize,
    pub tick_time: Duration,
}

/// Rolling window over the most recent ticks' stats.
///
/// Keeps only what the summaries need: how long each tick took and how much
/// streaming work it did. Older ticks fall out once `window` is reached.
#[derive(Debug)]
pub struct TickHistory {
    window: usize,
    ticks: VecDeque<TickSample>,
    total_ticks: u64,
}

#[derive(Debug, Clone, Copy)]
struct TickSample {
    time: Duration,
    populated: usize,
    evicted: usize,
}

impl TickHistory {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            ticks: VecDeque::with_capacity(window.min(1024)),
            total_ticks: 0,
        }
    }

    pub fn record(&mut self, stats: &TickStats) {
        if self.ticks.len() == self.window {
            self.ticks.pop_front();
        }
        self.ticks.push_back(TickSample {
            time: stats.tick_time,
            populated: stats.regions_populated,
            evicted: stats.regions_evicted,
        });
        self.total_ticks += 1;
    }

    /// Ticks currently in the window.
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Ticks recorded since creation, including those that left the window.
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    pub fn average_time(&self) -> Duration {
        match u32::try_from(self.ticks.len()) {
            Ok(0) | Err(_) => Duration::ZERO,
            Ok(n) => self.ticks.iter().map(|t| t.time).sum::<Duration>() / n,
        }
    }

    pub fn max_time(&self) -> Duration {
        self.ticks.iter().map(|t| t.time).max().unwrap_or(Duration::ZERO)
    }

    pub fn regions_populated(&self) -> usize {
        self.ticks.iter().map(|t| t.populated).sum()
    }

    pub fn regions_evicted(&self) -> usize {
        self.ticks.iter().map(|t| t.evicted).sum()
    }

    /// Ticks in the window that did no streaming work at all.
    pub fn idle_ticks(&self) -> usize {
        self.ticks
            .iter()
            .filter(|t| t.populated == 0 && t.evicted == 0)
            .count()
    }
}
