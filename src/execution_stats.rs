// Loss of precision is allowable in this module's use cases.
#![allow(clippy::cast_precision_loss)]

use std::time::{Duration, Instant};

use bytesize::ByteSize;
use humantime::format_duration;
use log::{debug, error, info};
use serde_derive::Serialize;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// How frequently we update the max memory used value.
const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Final resource figures for a run. Per-cell figures are zero when there are no cells.
#[derive(Clone, Debug, Serialize)]
pub struct ExecutionStatistics {
    pub max_memory_usage: u64,
    pub cpu_time: Duration,
    pub wall_time: Duration,
    pub days: u64,

    // Per cell stats
    pub cells: usize,
    pub memory_per_cell: u64,
    /// Cell updates (cells × days) per second of wall time.
    pub cell_updates_per_second: f64,
    pub wall_time_per_day: Duration,
}

pub struct ExecutionProfilingCollector {
    start_time: Instant,
    /// Lets callers invoke [`ExecutionProfilingCollector::refresh`] every day without
    /// tracking the polling interval themselves.
    last_refresh: Instant,
    /// Accumulated CPU time of the process, in CPU-milliseconds, when collection started.
    start_cpu_time: u64,
    /// The maximum resident memory seen by `sysinfo` during the run.
    max_memory_usage: u64,
    system: System,
    /// `None` on platforms where `sysinfo` cannot identify the current process.
    process_id: Option<Pid>,
}

impl Default for ExecutionProfilingCollector {
    fn default() -> Self {
        ExecutionProfilingCollector::new()
    }
}

impl ExecutionProfilingCollector {
    pub fn new() -> ExecutionProfilingCollector {
        let process_id = sysinfo::get_current_pid().ok();
        let now = Instant::now();

        let mut collector = ExecutionProfilingCollector {
            start_time: now,
            last_refresh: now,
            start_cpu_time: 0,
            max_memory_usage: 0,
            system: System::new(),
            process_id,
        };
        if let Some(process_id) = process_id {
            debug!("Process ID: {}", process_id);
            collector.update_system_info(ProcessRefreshKind::nothing().with_cpu().with_memory());
            if let Some(process) = collector.system.process(process_id) {
                collector.max_memory_usage = process.memory();
                collector.start_cpu_time = process.accumulated_cpu_time();
            }
        }

        collector
    }

    /// Polls memory usage if at least `REFRESH_INTERVAL` has passed since the previous poll.
    #[inline]
    pub fn refresh(&mut self) {
        if self.last_refresh.elapsed() >= REFRESH_INTERVAL {
            self.poll_memory();
            self.last_refresh = Instant::now();
        }
    }

    fn poll_memory(&mut self) {
        if let Some(pid) = self.process_id {
            self.update_system_info(ProcessRefreshKind::nothing().with_memory());
            if let Some(process) = self.system.process(pid) {
                self.max_memory_usage = self.max_memory_usage.max(process.memory());
            }
        }
    }

    /// CPU-milliseconds used by the process since collection started.
    pub fn cpu_time(&mut self) -> u64 {
        let Some(pid) = self.process_id else {
            return 0;
        };
        self.update_system_info(ProcessRefreshKind::nothing().with_cpu());
        self.system
            .process(pid)
            .map_or(0, |process| {
                process
                    .accumulated_cpu_time()
                    .saturating_sub(self.start_cpu_time)
            })
    }

    #[inline]
    fn update_system_info(&mut self, process_refresh_kind: ProcessRefreshKind) {
        if let Some(pid) = self.process_id {
            if self.system.refresh_processes_specifics(
                ProcessesToUpdate::Some(&[pid]),
                true,
                process_refresh_kind,
            ) < 1
            {
                error!("could not refresh process statistics");
            }
        }
    }

    /// Computes the final summary for a run over `cells` cells lasting `days` days.
    pub fn compute_final_statistics(&mut self, cells: usize, days: u64) -> ExecutionStatistics {
        let mut cpu_time_millis = 0;

        if let Some(pid) = self.process_id {
            self.update_system_info(ProcessRefreshKind::nothing().with_cpu().with_memory());
            if let Some(process) = self.system.process(pid) {
                self.max_memory_usage = self.max_memory_usage.max(process.memory());
                cpu_time_millis = process
                    .accumulated_cpu_time()
                    .saturating_sub(self.start_cpu_time);
            }
        }

        let cpu_time = Duration::from_millis(cpu_time_millis);
        let wall_time = self.start_time.elapsed();

        let memory_per_cell = if cells > 0 {
            self.max_memory_usage / cells as u64
        } else {
            0
        };
        let wall_seconds = wall_time.as_secs_f64();
        let cell_updates_per_second = if cells > 0 && wall_seconds > 0.0 {
            (cells as f64 * days as f64) / wall_seconds
        } else {
            0.0
        };
        let wall_time_per_day = if days > 0 {
            Duration::from_secs_f64(wall_seconds / days as f64)
        } else {
            Duration::ZERO
        };

        ExecutionStatistics {
            max_memory_usage: self.max_memory_usage,
            cpu_time,
            wall_time,
            days,
            cells,
            memory_per_cell,
            cell_updates_per_second,
            wall_time_per_day,
        }
    }
}

/// Prints execution statistics to the console.
pub fn print_execution_statistics(summary: &ExecutionStatistics) {
    println!("━━━━ Execution Summary ━━━━");
    if summary.max_memory_usage == 0 {
        println!("Memory and CPU statistics are not available on your platform.");
    } else {
        println!(
            "{:<25}{}",
            "Max memory usage:",
            ByteSize::b(summary.max_memory_usage)
        );
        println!("{:<25}{}", "CPU time:", format_duration(summary.cpu_time));
    }

    println!("{:<25}{}", "Wall time:", format_duration(summary.wall_time));
    println!("{:<25}{}", "Days:", summary.days);

    if summary.cells > 0 {
        println!("{:<25}{}", "Cells:", summary.cells);
        if summary.max_memory_usage > 0 {
            println!(
                "{:<25}{}",
                "Memory per cell:",
                ByteSize::b(summary.memory_per_cell)
            );
        }
        println!(
            "{:<25}{:.0}",
            "Cell updates per second:", summary.cell_updates_per_second
        );
    }
    if summary.days > 0 {
        println!(
            "{:<25}{}",
            "Wall time per day:",
            format_duration(summary.wall_time_per_day)
        );
    }
}

/// Logs execution statistics at `info`.
pub fn log_execution_statistics(stats: &ExecutionStatistics) {
    info!("Execution complete.");
    if stats.max_memory_usage == 0 {
        info!("Memory and CPU statistics are not available on your platform.");
    } else {
        info!("Max memory usage: {}", ByteSize::b(stats.max_memory_usage));
        info!("CPU time: {}", format_duration(stats.cpu_time));
    }
    info!("Wall time: {}", format_duration(stats.wall_time));
    info!("Days: {}", stats.days);

    if stats.cells > 0 {
        info!("Cells: {}", stats.cells);
        if stats.max_memory_usage > 0 {
            info!("Memory per cell: {}", ByteSize::b(stats.memory_per_cell));
        }
        info!(
            "Cell updates per second: {:.0}",
            stats.cell_updates_per_second
        );
    }
}
