//! Synthetic mem-check samples, used when the endpoint cannot be reached and in demo mode.

use async_trait::async_trait;
use chrono::{DateTime, Local, SecondsFormat, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Instant;

use crate::fetch::{FetchError, SampleSource};
use crate::normalize::bytes_to_mb;
use crate::types::{
    CpuUsage, Environment, MemCheckData, MemCheckResponse, MemoryUsage, ProcessInfo,
    RequestMeta, ResourceUsage,
};

const BASE_MEMORY: f64 = 200_000_000.0;
const MEMORY_VARIATION: f64 = 50_000_000.0;
const ARRAY_BUFFERS: f64 = 1_945_007.0;
const CPU_USER_BASE: f64 = 2_884_297.0;
const CPU_SYSTEM_BASE: f64 = 531_100.0;

fn mb_label(b: f64) -> Option<String> {
    Some(format!("{} MB", bytes_to_mb(b)))
}

fn local_timezone_label() -> String {
    std::env::var("TZ")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| Local::now().format("UTC%:z").to_string())
}

/// Plausible pseudo-random sample stamped at `now`.
pub fn synthetic_sample<R: Rng>(
    rng: &mut R,
    now: DateTime<Utc>,
    uptime_secs: f64,
) -> MemCheckResponse {
    let v = rng.gen_range(0.0..MEMORY_VARIATION);
    let rss = BASE_MEMORY + v;
    let heap_used = BASE_MEMORY * 0.5 + v * 0.3;
    let heap_total = BASE_MEMORY * 0.6 + v * 0.4;
    let external = BASE_MEMORY * 0.02 + v * 0.1;

    MemCheckResponse {
        success: true,
        data: MemCheckData {
            memory_usage: MemoryUsage {
                rss,
                heap_used,
                heap_total,
                external,
                array_buffers: ARRAY_BUFFERS,
                rss_formatted: mb_label(rss),
                heap_used_formatted: mb_label(heap_used),
                heap_total_formatted: mb_label(heap_total),
                external_formatted: mb_label(external),
                array_buffers_formatted: mb_label(ARRAY_BUFFERS),
            },
            process: ProcessInfo {
                pid: std::process::id(),
                ppid: 0,
                platform: std::env::consts::OS.to_string(),
                arch: std::env::consts::ARCH.to_string(),
                node_version: format!("memwatch v{}", env!("CARGO_PKG_VERSION")),
                uptime: uptime_secs,
                uptime_formatted: Some(format!("{} seconds", uptime_secs.round() as u64)),
            },
            cpu_usage: CpuUsage {
                user: CPU_USER_BASE + rng.gen_range(0.0..1_000_000.0),
                system: CPU_SYSTEM_BASE + rng.gen_range(0.0..200_000.0),
            },
            resource_usage: ResourceUsage {
                user_cpu_time: 2_884_309.0,
                system_cpu_time: 531_109.0,
                max_rss: 410_048.0,
                minor_page_fault: 26_622.0,
                ipc_sent: 26_612.0,
                ipc_received: 77.0,
                voluntary_context_switches: 10_700.0,
                involuntary_context_switches: 8_033.0,
                ..Default::default()
            },
            environment: Environment {
                timezone: local_timezone_label(),
                locale: "en-US".into(),
            },
            hrtime: now
                .timestamp_nanos_opt()
                .map(|n| n.to_string())
                .unwrap_or_default(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        },
        meta: RequestMeta {
            request_duration: format!("{:.2}ms", rng.gen_range(0.0..2.0)),
            endpoint: "/mem-check".into(),
        },
    }
}

/// Source that never touches the network.
pub struct SyntheticSource {
    rng: Mutex<StdRng>,
    started: Instant,
}

impl SyntheticSource {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            started: Instant::now(),
        }
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SampleSource for SyntheticSource {
    async fn fetch(&self, _endpoint: &str) -> Result<MemCheckResponse, FetchError> {
        let uptime = self.started.elapsed().as_secs_f64();
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        Ok(synthetic_sample(&mut *rng, Utc::now(), uptime))
    }
}
