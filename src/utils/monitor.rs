use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, System};

/// Wall-clock time spent in one pipeline phase.
#[derive(Debug, Clone)]
pub struct PhaseTiming {
    pub phase: String,
    pub elapsed: Duration,
    pub memory_mb: Option<u64>,
}

/// Records how long each pipeline phase takes and, with the `cli` feature,
/// the resident memory of the process at the end of the phase.
pub struct PhaseMonitor {
    enabled: bool,
    started: Instant,
    last_mark: Instant,
    timings: Vec<PhaseTiming>,
    peak_memory_mb: u64,
    #[cfg(feature = "cli")]
    process: Option<(System, Pid)>,
}

impl PhaseMonitor {
    pub fn new(enabled: bool) -> Self {
        let now = Instant::now();
        Self {
            enabled,
            started: now,
            last_mark: now,
            timings: Vec::new(),
            peak_memory_mb: 0,
            #[cfg(feature = "cli")]
            process: if enabled {
                sysinfo::get_current_pid()
                    .ok()
                    .map(|pid| (System::new(), pid))
            } else {
                None
            },
        }
    }

    #[cfg(feature = "cli")]
    fn sample_memory_mb(&mut self) -> Option<u64> {
        let (system, pid) = self.process.as_mut()?;
        system.refresh_all();
        let memory_mb = system.process(*pid)?.memory() / 1024 / 1024;
        Some(memory_mb)
    }

    #[cfg(not(feature = "cli"))]
    fn sample_memory_mb(&mut self) -> Option<u64> {
        None
    }

    /// 標記一個階段結束
    pub fn mark(&mut self, phase: &str) {
        if !self.enabled {
            return;
        }

        let now = Instant::now();
        let elapsed = now.duration_since(self.last_mark);
        self.last_mark = now;

        let memory_mb = self.sample_memory_mb();
        if let Some(mb) = memory_mb {
            self.peak_memory_mb = self.peak_memory_mb.max(mb);
        }

        match memory_mb {
            Some(mb) => tracing::info!("📊 {} - Time: {:?}, Memory: {}MB", phase, elapsed, mb),
            None => tracing::info!("📊 {} - Time: {:?}", phase, elapsed),
        }

        self.timings.push(PhaseTiming {
            phase: phase.to_string(),
            elapsed,
            memory_mb,
        });
    }

    pub fn log_final_stats(&self) {
        if !self.enabled {
            return;
        }
        tracing::info!(
            "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB",
            self.started.elapsed(),
            self.peak_memory_mb
        );
        for timing in &self.timings {
            match timing.memory_mb {
                Some(mb) => tracing::debug!("   {}: {:?} ({}MB)", timing.phase, timing.elapsed, mb),
                None => tracing::debug!("   {}: {:?}", timing.phase, timing.elapsed),
            }
        }
    }
}

impl Default for PhaseMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
