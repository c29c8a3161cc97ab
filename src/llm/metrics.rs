// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Latency, retry and token accounting for the generation gateway

use std::time::Duration;

use serde::Serialize;

/// Raw accumulator owned by one gateway
#[derive(Debug, Clone, Default)]
pub struct GatewayMetrics {
    pub total_calls: u64,
    pub latencies: Vec<Duration>,
    pub retry_count: u64,
    pub fallback_count: u64,
    pub total_tokens: u64,
}

/// Derived figures reported by `GenerationGateway::metrics()`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub total_calls: u64,
    /// Seconds
    pub avg_latency: f64,
    /// Seconds
    pub p50_latency: f64,
    /// Seconds
    pub p95_latency: f64,
    pub total_retries: u64,
    pub total_fallbacks: u64,
    pub total_tokens: u64,
}

impl GatewayMetrics {
    pub fn record_call(&mut self) {
        self.total_calls += 1;
    }

    pub fn record_success(&mut self, latency: Duration, tokens: Option<u32>) {
        self.latencies.push(latency);
        if let Some(tokens) = tokens {
            self.total_tokens += u64::from(tokens);
        }
    }

    pub fn record_retries(&mut self, retries: u32) {
        self.retry_count += u64::from(retries);
    }

    pub fn record_fallback(&mut self) {
        self.fallback_count += 1;
    }

    /// Compute averages and percentiles over the recorded latency samples
    pub fn summary(&self) -> MetricsSummary {
        let mut sorted: Vec<f64> = self.latencies.iter().map(Duration::as_secs_f64).collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let (avg, p50, p95) = if sorted.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            let count = sorted.len();
            let avg = sorted.iter().sum::<f64>() / count as f64;
            let p50 = sorted[count / 2];
            let p95 = sorted[((count as f64 * 0.95) as usize).min(count - 1)];
            (avg, p50, p95)
        };

        MetricsSummary {
            total_calls: self.total_calls,
            avg_latency: avg,
            p50_latency: p50,
            p95_latency: p95,
            total_retries: self.retry_count,
            total_fallbacks: self.fallback_count,
            total_tokens: self.total_tokens,
        }
    }
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "calls={} avg={:.2}s p50={:.2}s p95={:.2}s retries={} fallbacks={} tokens={}",
            self.total_calls,
            self.avg_latency,
            self.p50_latency,
            self.p95_latency,
            self.total_retries,
            self.total_fallbacks,
            self.total_tokens
        )
    }
}
