//! Raw endpoint payload -> chart point.

use chrono::{DateTime, Local, TimeZone};

use crate::types::{ChartPoint, MemCheckResponse};

const BYTES_PER_MB: f64 = 1_048_576.0;

pub fn bytes_to_mb(b: f64) -> u64 {
    (b / BYTES_PER_MB).round().max(0.0) as u64
}

/// Project a response into the chart's flat shape, labelled in the viewer's local time.
pub fn to_chart_point(r: &MemCheckResponse) -> ChartPoint {
    to_chart_point_in(r, &Local)
}

pub fn to_chart_point_in<Tz: TimeZone>(r: &MemCheckResponse, tz: &Tz) -> ChartPoint
where
    Tz::Offset: std::fmt::Display,
{
    let d = &r.data;
    ChartPoint {
        timestamp: d.timestamp.clone(),
        time: time_label_in(&d.timestamp, tz),
        memory_rss: bytes_to_mb(d.memory_usage.rss),
        memory_heap_used: bytes_to_mb(d.memory_usage.heap_used),
        memory_heap_total: bytes_to_mb(d.memory_usage.heap_total),
        memory_external: bytes_to_mb(d.memory_usage.external),
        cpu_user: d.cpu_usage.user,
        cpu_system: d.cpu_usage.system,
        uptime: d.process.uptime,
    }
}

// "5:09:40 PM"; falls back to the raw string when it is not RFC 3339
pub fn time_label_in<Tz: TimeZone>(iso: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match DateTime::parse_from_rfc3339(iso) {
        Ok(t) => t.with_timezone(tz).format("%-I:%M:%S %p").to_string(),
        Err(_) => iso.to_string(),
    }
}
