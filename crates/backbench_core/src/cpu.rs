//! System CPU sampling around restore steps.

use std::thread;
use std::time::Duration;
use sysinfo::System;

/// Reports system-wide CPU utilisation.
pub trait CpuSampler {
    /// Returns CPU usage in percent, averaged over the sampler's window.
    fn sample(&mut self) -> f32;
}

/// [`CpuSampler`] backed by `sysinfo`.
///
/// Each sample blocks for the configured window: usage is the difference
/// between two refreshes, so one refresh alone always reads zero.
pub struct SystemCpuSampler {
    system: System,
    interval: Duration,
}

impl SystemCpuSampler {
    /// Creates a sampler that measures over `interval`.
    ///
    /// Windows shorter than sysinfo's minimum update interval are widened.
    pub fn new(interval: Duration) -> Self {
        Self {
            system: System::new(),
            interval: interval.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL),
        }
    }

    /// The effective measurement window.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl CpuSampler for SystemCpuSampler {
    fn sample(&mut self) -> f32 {
        self.system.refresh_cpu();
        thread::sleep(self.interval);
        self.system.refresh_cpu();
        self.system.global_cpu_info().cpu_usage()
    }
}
