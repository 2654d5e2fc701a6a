//! InfluxDB v2 metrics sink.
//!
//! Points are rendered as line protocol and written in a detached task with a
//! short timeout. Nothing here ever reports failure to the caller; a write
//! that fails is logged at debug level and dropped.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::debug;

use fx_types::{FieldValue, MetricsSink};

const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct InfluxMetrics {
    http: reqwest::Client,
    write_url: String,
    org: String,
    bucket: String,
    token: String,
}

impl InfluxMetrics {
    /// Returns `None` unless every connection setting is non-empty.
    pub fn new(url: &str, token: &str, org: &str, bucket: &str) -> Option<Self> {
        if [url, token, org, bucket].iter().any(|s| s.trim().is_empty()) {
            return None;
        }
        let http = reqwest::Client::builder()
            .timeout(WRITE_TIMEOUT)
            .build()
            .ok()?;
        Some(Self {
            http,
            write_url: format!("{}/api/v2/write", url.trim_end_matches('/')),
            org: org.to_string(),
            bucket: bucket.to_string(),
            token: token.to_string(),
        })
    }

    async fn write(&self, body: String) {
        let result = self
            .http
            .post(&self.write_url)
            .query(&[
                ("org", self.org.as_str()),
                ("bucket", self.bucket.as_str()),
                ("precision", "ms"),
            ])
            .header("Authorization", format!("Token {}", self.token))
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body)
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => debug!(status = resp.status().as_u16(), "metrics write rejected"),
            Err(e) => debug!(error = %e, "metrics write failed"),
        }
    }
}

impl MetricsSink for InfluxMetrics {
    fn record(&self, measurement: &str, fields: &[(&str, FieldValue)], tags: &[(&str, &str)]) {
        let Some(line) = line_protocol(measurement, fields, tags, now_millis()) else {
            return;
        };
        // Outside a runtime there is nowhere to send from; drop the point.
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let sink = self.clone();
        handle.spawn(async move { sink.write(line).await });
    }
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// Renders one point: `measurement[,tag=v...] field=v[,field=v...] ts`.
///
/// Tag keys and values have spaces and commas replaced by `_`. Returns `None`
/// when there are no fields, which line protocol forbids.
pub fn line_protocol(
    measurement: &str,
    fields: &[(&str, FieldValue)],
    tags: &[(&str, &str)],
    timestamp_ms: u128,
) -> Option<String> {
    if fields.is_empty() {
        return None;
    }

    let mut line = measurement.to_string();
    for (k, v) in tags {
        line.push(',');
        line.push_str(&sanitize_tag(k));
        line.push('=');
        line.push_str(&sanitize_tag(v));
    }

    let fields = fields
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",");

    line.push(' ');
    line.push_str(&fields);
    line.push(' ');
    line.push_str(&timestamp_ms.to_string());
    Some(line)
}

fn sanitize_tag(s: &str) -> String {
    s.replace([' ', ','], "_")
}
