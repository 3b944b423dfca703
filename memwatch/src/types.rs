//! Types that mirror the mem-check endpoint's JSON schema, plus the chart projection.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    // byte counts; JS numbers, so fractional values are possible
    pub rss: f64,
    pub heap_used: f64,
    pub heap_total: f64,
    pub external: f64,
    #[serde(default)]
    pub array_buffers: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rss_formatted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heap_used_formatted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heap_total_formatted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_formatted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_buffers_formatted: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInfo {
    #[serde(default)]
    pub pid: u32,
    #[serde(default)]
    pub ppid: u32,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub arch: String,
    #[serde(default)]
    pub node_version: String,
    pub uptime: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime_formatted: Option<String>,
}

/// Accumulated CPU time in microseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuUsage {
    pub user: f64,
    pub system: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceUsage {
    #[serde(rename = "userCPUTime")]
    pub user_cpu_time: f64,
    #[serde(rename = "systemCPUTime")]
    pub system_cpu_time: f64,
    #[serde(rename = "maxRSS")]
    pub max_rss: f64,
    pub shared_memory_size: f64,
    pub unshared_data_size: f64,
    pub unshared_stack_size: f64,
    pub minor_page_fault: f64,
    pub major_page_fault: f64,
    pub swapped_out: f64,
    pub fs_read: f64,
    pub fs_write: f64,
    pub ipc_sent: f64,
    pub ipc_received: f64,
    pub signals_count: f64,
    pub voluntary_context_switches: f64,
    pub involuntary_context_switches: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    pub timezone: String,
    pub locale: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemCheckData {
    pub memory_usage: MemoryUsage,
    pub process: ProcessInfo,
    pub cpu_usage: CpuUsage,
    #[serde(default)]
    pub resource_usage: ResourceUsage,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub hrtime: String,
    // ISO-8601
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestMeta {
    pub request_duration: String,
    pub endpoint: String,
}

/// Full response envelope of GET /mem-check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemCheckResponse {
    #[serde(default)]
    pub success: bool,
    pub data: MemCheckData,
    #[serde(default)]
    pub meta: RequestMeta,
}

/// Flat, chart-ready projection of one response. Memory in MB, CPU in raw microseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub timestamp: String,
    pub time: String,
    #[serde(rename = "memoryRSS")]
    pub memory_rss: u64,
    pub memory_heap_used: u64,
    pub memory_heap_total: u64,
    pub memory_external: u64,
    pub cpu_user: f64,
    pub cpu_system: f64,
    pub uptime: f64,
}

/// Outcome of the most recent fetch attempt only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionState {
    pub is_connected: bool,
    pub last_error: Option<String>,
}
