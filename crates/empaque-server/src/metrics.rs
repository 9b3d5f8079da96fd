// SPDX-License-Identifier: Apache-2.0

use axum::http::StatusCode;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Default)]
pub struct RequestMetrics {
    counts: Mutex<HashMap<(String, String, u16), u64>>,
    latency_ns: Mutex<HashMap<String, Vec<u64>>>,
}

impl RequestMetrics {
    pub async fn observe_request(
        &self,
        route: &str,
        method: &str,
        status: StatusCode,
        latency: Duration,
    ) {
        let mut counts = self.counts.lock().await;
        *counts
            .entry((route.to_string(), method.to_string(), status.as_u16()))
            .or_insert(0) += 1;
        drop(counts);
        let mut latency_map = self.latency_ns.lock().await;
        let samples = latency_map.entry(route.to_string()).or_default();
        samples.push(u64::try_from(latency.as_nanos()).unwrap_or(u64::MAX));
        // Bounded; p95 over the most recent window is enough.
        if samples.len() > 4096 {
            let excess = samples.len() - 4096;
            samples.drain(..excess);
        }
    }

    /// Prometheus text exposition.
    pub async fn render(&self) -> String {
        let counts = self.counts.lock().await.clone();
        let mut keys: Vec<_> = counts.keys().cloned().collect();
        keys.sort();
        let mut body = String::new();
        body.push_str("# TYPE http_requests_total counter\n");
        for key in keys {
            let (route, method, status) = &key;
            let count = counts[&key];
            body.push_str(&format!(
                "http_requests_total{{route=\"{route}\",method=\"{method}\",status=\"{status}\"}} {count}\n"
            ));
        }
        let latency = self.latency_ns.lock().await.clone();
        let mut routes: Vec<_> = latency.keys().cloned().collect();
        routes.sort();
        body.push_str("# TYPE http_request_latency_p95_seconds gauge\n");
        for route in routes {
            let p95 = percentile_ns(&latency[&route], 0.95);
            body.push_str(&format!(
                "http_request_latency_p95_seconds{{route=\"{route}\"}} {:.6}\n",
                p95 as f64 / 1_000_000_000.0
            ));
        }
        body
    }
}

fn percentile_ns(samples: &[u64], q: f64) -> u64 {
    if samples.is_empty() {
        return 0;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    let rank = ((sorted.len() as f64 - 1.0) * q).round() as usize;
    sorted[rank.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn render_includes_counts_and_latency() {
        let metrics = RequestMetrics::default();
        metrics
            .observe_request(
                "/api/products",
                "GET",
                StatusCode::OK,
                Duration::from_millis(3),
            )
            .await;
        metrics
            .observe_request(
                "/api/products",
                "GET",
                StatusCode::OK,
                Duration::from_millis(5),
            )
            .await;
        let body = metrics.render().await;
        assert!(body
            .contains("http_requests_total{route=\"/api/products\",method=\"GET\",status=\"200\"} 2"));
        assert!(body.contains("http_request_latency_p95_seconds{route=\"/api/products\"}"));
    }

    #[test]
    fn percentile_handles_edges() {
        assert_eq!(percentile_ns(&[], 0.95), 0);
        assert_eq!(percentile_ns(&[7], 0.95), 7);
    }
}
