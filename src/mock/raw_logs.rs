//! Synthetic raw log text: CPU climbs, requests time out, the JVM stalls.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::fmt::Write as _;

/// Levels the backend's line parser recognises.
pub const LEVELS: [&str; 5] = ["INFO", "WARN", "ERROR", "CRITICAL", "METRICS"];

/// Generate log text ending at the current time.
pub fn generate_raw_logs() -> String {
    generate_raw_logs_from(Utc::now() - Duration::minutes(15))
}

/// Generate log text starting at `start`, one line per simulated step.
///
/// Every line has the `[timestamp] [LEVEL] [Component] message` layout, and
/// metric lines carry `CPU: N%`, `MEM: NMB` and `Duration: Nms` tokens.
pub fn generate_raw_logs_from(start: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let mut out = String::new();
    let mut at = start;

    line(&mut out, at, "INFO", "API", "Application startup complete on port 8080.");

    // Phase 1: load ramps up, CPU climbs.
    for step in 0..8u32 {
        at += Duration::seconds(30);
        let cpu = 20 + step * 9 + rng.gen_range(0..4);
        let mem = 450 + step * 64 + rng.gen_range(0..32);
        let conns = 5 + step * 6;
        let latency = 80 + step * 45 + rng.gen_range(0..20);
        line(
            &mut out,
            at,
            "METRICS",
            "System",
            &format!("CPU: {}% | MEM: {}MB | DB_CONN: {} | Duration: {}ms", cpu, mem, conns, latency),
        );
        if step == 5 {
            line(
                &mut out,
                at,
                "WARN",
                "Database",
                &format!("Slow query detected. Query execution time: {}ms", 850 + rng.gen_range(0..150)),
            );
        }
    }

    // Phase 2: the pool runs dry and requests time out.
    at += Duration::seconds(20);
    line(
        &mut out,
        at,
        "ERROR",
        "Database",
        "ConnectionTimeoutException: Database pool exhausted. Active connections: 50/50.",
    );
    at += Duration::seconds(2);
    line(
        &mut out,
        at,
        "METRICS",
        "System",
        &format!(
            "CPU: {}% | MEM: 1024MB | DB_CONN: 50 (MAX) | Duration: {}ms",
            93 + rng.gen_range(0..6),
            3100 + rng.gen_range(0..900)
        ),
    );
    for attempt in 0..3 {
        at += Duration::seconds(3);
        line(
            &mut out,
            at,
            "ERROR",
            "API",
            &format!(
                "Request timeout on /api/orders after 5000ms (retry {}). Upstream database unavailable.",
                attempt + 1
            ),
        );
    }

    // Phase 3: stop-the-world GC.
    at += Duration::seconds(5);
    line(
        &mut out,
        at,
        "CRITICAL",
        "JVM",
        &format!(
            "Garbage Collection (Stop-the-world) triggered. Duration: {}ms.",
            1200 + rng.gen_range(0..600)
        ),
    );
    at += Duration::seconds(10);
    line(
        &mut out,
        at,
        "WARN",
        "JVM",
        "Heap usage at 96% after GC. Consider increasing -Xmx.",
    );
    at += Duration::seconds(30);
    line(
        &mut out,
        at,
        "INFO",
        "API",
        "Health check recovered. Request latency back under 300ms.",
    );

    out
}

fn line(out: &mut String, at: DateTime<Utc>, level: &str, component: &str, msg: &str) {
    let _ = writeln!(
        out,
        "[{}] [{}] [{}] {}",
        at.format("%Y-%m-%dT%H:%M:%S"),
        level,
        component,
        msg
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 27, 14, 0, 0).unwrap()
    }

    #[test]
    fn test_every_line_is_tagged() {
        let logs = generate_raw_logs_from(start());
        for l in logs.lines() {
            assert!(l.starts_with("[2025-11-27T14:"), "bad timestamp: {}", l);
            let level = l.split("] [").nth(1).unwrap();
            assert!(LEVELS.contains(&level), "unexpected level in {}", l);
        }
    }

    #[test]
    fn test_contains_critical_and_pool_exhaustion() {
        let logs = generate_raw_logs_from(start());
        assert!(logs.contains("[CRITICAL]"));
        assert!(logs.contains("Database pool exhausted"));
        assert!(logs.contains("Stop-the-world"));
    }

    #[test]
    fn test_cpu_rises_before_timeouts() {
        let logs = generate_raw_logs_from(start());
        let first_cpu = logs.find("CPU: ").unwrap();
        let first_timeout = logs.find("Request timeout").unwrap();
        assert!(first_cpu < first_timeout);
        assert!(logs.contains("DB_CONN: 50 (MAX)"));
    }

    #[test]
    fn test_default_generator_produces_text() {
        assert!(generate_raw_logs().lines().count() > 10);
    }
}
