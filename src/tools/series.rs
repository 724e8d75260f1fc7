//! Bounded chart series

use serde::Serialize;
use std::collections::VecDeque;

/// A point that can be plotted as `(x, y)`
pub trait ChartPoint {
    fn xy(&self) -> (f64, f64);
}

/// Append-only sequence that evicts its oldest points past a capacity
#[derive(Debug, Clone)]
pub struct Series<T> {
    points: VecDeque<T>,
    capacity: usize,
}

impl<T> Series<T> {
    pub fn bounded(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, point: T) {
        if self.capacity == 0 {
            return;
        }
        while self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn last(&self) -> Option<&T> {
        self.points.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.points.iter()
    }
}

impl<T: ChartPoint> Series<T> {
    /// Points in `(x, y)` form for chart rendering
    pub fn xy(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(ChartPoint::xy).collect()
    }
}

/// One polling-rate chart point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateSample {
    /// Seconds since the active sub-session started, to one decimal
    pub elapsed_secs: f64,
    pub rate_hz: u32,
}

impl ChartPoint for RateSample {
    fn xy(&self) -> (f64, f64) {
        (self.elapsed_secs, self.rate_hz as f64)
    }
}

/// Cumulative clicks at a whole-second bucket of a click-speed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClickSample {
    pub time_secs: u32,
    pub clicks: u32,
}

impl ClickSample {
    /// Clicks per second at this point; bucket 0 counts as 0.1 s
    pub fn displayed_rate(&self) -> f64 {
        let time = if self.time_secs == 0 {
            0.1
        } else {
            self.time_secs as f64
        };
        self.clicks as f64 / time
    }
}

impl ChartPoint for ClickSample {
    fn xy(&self) -> (f64, f64) {
        (self.time_secs as f64, self.displayed_rate())
    }
}

/// One reaction trial as a chart point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LagSample {
    /// 1-based attempt number
    pub attempt: usize,
    pub lag_ms: f64,
}

impl ChartPoint for LagSample {
    fn xy(&self) -> (f64, f64) {
        (self.attempt as f64, self.lag_ms)
    }
}

/// Distance of one precision click from its target
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeviationSample {
    /// 1-based click number
    pub click: usize,
    pub deviation: f64,
}

impl ChartPoint for DeviationSample {
    fn xy(&self) -> (f64, f64) {
        (self.click as f64, self.deviation)
    }
}
