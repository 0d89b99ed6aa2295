use std::{collections::VecDeque, time::Duration};

pub const DEFAULT_WINDOW: usize = 30;

/// Rolling average of recent frame times.
#[derive(Clone, Debug)]
pub struct FpsMeter {
    window: usize,
    samples: VecDeque<Duration>,
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl FpsMeter {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            samples: VecDeque::with_capacity(window),
        }
    }

    pub fn record(&mut self, frame_time: Duration) {
        self.samples.push_back(frame_time);
        if self.samples.len() > self.window {
            self.samples.pop_front();
        }
    }

    pub fn fps(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let total: Duration = self.samples.iter().sum();
        let average = total.as_secs_f64() / self.samples.len() as f64;
        if average > 0.0 { 1.0 / average } else { 0.0 }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_meter_reports_zero() {
        assert_eq!(FpsMeter::default().fps(), 0.0);
    }

    #[test]
    fn averages_frame_times() {
        let mut meter = FpsMeter::default();
        meter.record(Duration::from_millis(20));
        meter.record(Duration::from_millis(30));
        assert!((meter.fps() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn keeps_only_the_window() {
        let mut meter = FpsMeter::new(3);
        for _ in 0..10 {
            meter.record(Duration::from_millis(100));
        }
        for _ in 0..3 {
            meter.record(Duration::from_millis(10));
        }
        assert_eq!(meter.len(), 3);
        assert!((meter.fps() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn zero_durations_do_not_divide_by_zero() {
        let mut meter = FpsMeter::new(2);
        meter.record(Duration::ZERO);
        assert_eq!(meter.fps(), 0.0);
    }
}
