//! Default logging setup for the chainmap binaries
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(missing_docs)]

use std::{
    fmt,
    io::Write,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::{Duration, Instant},
};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
struct Bytes(usize);

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self, f)
    }
}

impl fmt::Display for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 1000 {
            write!(f, "{:5}B", self.0)
        } else if self.0 < 1000 << 10 {
            write!(f, "{:5.1}K", self.0 as f64 / (1u64 << 10) as f64)
        } else if self.0 < 1000 << 20 {
            write!(f, "{:5.1}M", self.0 as f64 / (1u64 << 20) as f64)
        } else {
            write!(f, "{:5.1}G", self.0 as f64 / (1u64 << 30) as f64)
        }
    }
}

/// Memory usage of the current process. Unavailable figures are reported as zero.
#[derive(Clone, Copy, Debug, Default)]
struct MemoryUsage {
    resident: Bytes,
    peak: Bytes,
}

impl MemoryUsage {
    fn now() -> Self {
        Self {
            resident: Bytes(resident_bytes().unwrap_or(0)),
            peak: Bytes(peak_resident_bytes().unwrap_or(0)),
        }
    }
}

#[cfg(all(target_os = "linux", not(miri)))]
fn resident_bytes() -> Option<usize> {
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let pages: usize = statm.split_ascii_whitespace().nth(1)?.parse().ok()?;
    // SAFETY: standard way to obtain page size
    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    Some(pages * usize::try_from(page_size).ok()?)
}

#[cfg(not(all(target_os = "linux", not(miri))))]
fn resident_bytes() -> Option<usize> {
    None
}

#[cfg(all(unix, not(miri)))]
fn peak_resident_bytes() -> Option<usize> {
    // SAFETY: rusage is plain old data so all zeros is valid
    let mut rusage: libc::rusage = unsafe { std::mem::zeroed() };
    // SAFETY: getrusage is safe to call as long as it can safely write to the passed pointer
    if unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut rusage) } < 0 {
        return None;
    }
    let max_rss = usize::try_from(rusage.ru_maxrss).ok()?;
    // macOS reports bytes, everything else kilobytes
    Some(if cfg!(target_os = "macos") {
        max_rss
    } else {
        max_rss * 1024
    })
}

#[cfg(not(all(unix, not(miri))))]
fn peak_resident_bytes() -> Option<usize> {
    None
}

const TIMESTAMP_STYLE: anstyle::Style =
    anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::BrightBlack)));

const MEMORY_STYLE: anstyle::Style =
    anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Blue)));
const MEMORY_NEW_PEAK_STYLE: anstyle::Style =
    anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red)));
const MEMORY_PEAK_STYLE: anstyle::Style =
    anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::BrightBlack)));

const TARGET_STYLE: anstyle::Style =
    anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Magenta)));

/// Elapsed time and memory usage printed in front of every log line.
struct Prefix {
    elapsed: Duration,
    usage: MemoryUsage,
    new_peak: bool,
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let peak_style = if self.new_peak {
            MEMORY_NEW_PEAK_STYLE
        } else {
            MEMORY_PEAK_STYLE
        };
        write!(
            f,
            "{ts}{elapsed:>9.2?}{ts:#} {ms}{resident}{ms:#} {ps}{peak}{ps:#}",
            ts = TIMESTAMP_STYLE,
            elapsed = self.elapsed,
            ms = MEMORY_STYLE,
            resident = self.usage.resident,
            ps = peak_style,
            peak = self.usage.peak,
        )
    }
}

/// Environment variables and defaults consulted by [`setup_with`].
#[derive(Clone, Debug)]
pub struct LogOptions {
    /// Variable holding the `env_logger` filter directives.
    pub filter_var: &'static str,
    /// Variable selecting whether output is styled (`auto`, `always` or `never`).
    pub style_var: &'static str,
    /// Filter used when `filter_var` is unset.
    pub default_filter: &'static str,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            filter_var: "CHAINMAP_LOG",
            style_var: "CHAINMAP_LOG_STYLE",
            default_filter: "info",
        }
    }
}

/// Perform the default logging setup, configured by `CHAINMAP_LOG` and `CHAINMAP_LOG_STYLE`.
pub fn setup() {
    setup_with(&LogOptions::default())
}

/// Perform the default logging setup using the given environment variables.
///
/// Every record is prefixed with the time since setup and the current and peak resident memory.
/// Whenever the target changes from the previous record, a header line naming it is written
/// first.
pub fn setup_with(options: &LogOptions) {
    let start_time = Instant::now();
    let peak = AtomicUsize::new(MemoryUsage::now().peak.0);
    let last_target = Mutex::new(String::new());

    env_logger::Builder::from_env(
        env_logger::Env::new()
            .filter_or(options.filter_var, options.default_filter)
            .write_style(options.style_var),
    )
    .format(move |buf, record| {
        let usage = MemoryUsage::now();
        let new_peak = peak.fetch_max(usage.peak.0, Ordering::Relaxed) < usage.peak.0;
        let prefix = Prefix {
            elapsed: start_time.elapsed(),
            usage,
            new_peak,
        };

        let target = record.target();
        {
            let mut last_target = last_target
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if *last_target != target {
                last_target.clear();
                last_target.push_str(target);
                writeln!(buf, "{prefix} {style}{target}{style:#}", style = TARGET_STYLE)?;
            }
        }

        let level = record.level();
        writeln!(
            buf,
            "{prefix} {style}{level}{style:#} {args}",
            style = buf.default_level_style(level),
            args = record.args(),
        )
    })
    .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_amounts_are_scaled() {
        assert_eq!(Bytes(0).to_string(), "    0B");
        assert_eq!(Bytes(999).to_string(), "  999B");
        assert_eq!(Bytes(1000).to_string(), "  1.0K");
        assert_eq!(Bytes(3 << 20).to_string(), "  3.0M");
        assert_eq!(Bytes(5 << 30).to_string(), "  5.0G");
    }

    #[test]
    fn default_options_use_chainmap_variables() {
        let options = LogOptions::default();
        assert_eq!(options.filter_var, "CHAINMAP_LOG");
        assert_eq!(options.style_var, "CHAINMAP_LOG_STYLE");
        assert_eq!(options.default_filter, "info");
    }

    #[cfg(all(target_os = "linux", not(miri)))]
    #[test]
    fn memory_usage_is_reported_on_linux() {
        let usage = MemoryUsage::now();
        assert!(usage.resident.0 > 0);
        assert!(usage.peak.0 > 0);
    }
}
