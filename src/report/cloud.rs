use std::collections::BTreeMap;

use anyhow::{bail, Context};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::debug;

use crate::config::{CloudConfig, Identity, LabelScheme};

/// Submits one scalar point per call to a monitoring endpoint. At-most-once:
/// a failed submission is reported to the caller and the point is dropped.
pub trait MetricSink {
    fn report(&mut self, value: f64, at: DateTime<Utc>) -> anyhow::Result<()>;
}

// Wire types for the Monitoring v3 REST encoding of
// projects.timeSeries.create.

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CreateTimeSeriesRequest {
    time_series: [TimeSeries; 1],
}

#[derive(Serialize, Debug)]
struct TimeSeries {
    metric: Metric,
    resource: MonitoredResource,
    points: [Point; 1],
}

#[derive(Serialize, Debug)]
struct Metric {
    #[serde(rename = "type")]
    metric_type: String,
    labels: BTreeMap<&'static str, String>,
}

#[derive(Serialize, Debug)]
struct MonitoredResource {
    #[serde(rename = "type")]
    resource_type: &'static str,
    labels: BTreeMap<&'static str, String>,
}

#[derive(Serialize, Debug)]
struct Point {
    interval: TimeInterval,
    value: TypedValue,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct TimeInterval {
    start_time: String,
    end_time: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct TypedValue {
    double_value: f64,
}

pub struct MonitoringClient {
    http: reqwest::blocking::Client,
    url: String,
    token: Option<String>,
    metric_type: String,
    scheme: LabelScheme,
    identity: Identity,
}

impl MonitoringClient {
    pub fn new(config: &CloudConfig, identity: &Identity) -> anyhow::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .build()
            .context("building http client")?;
        let url = format!(
            "{}/v3/projects/{}/timeSeries",
            config.endpoint.trim_end_matches('/'),
            config.project
        );
        Ok(MonitoringClient {
            http,
            url,
            token: config.token.clone(),
            metric_type: config.metric.clone(),
            scheme: config.scheme,
            identity: identity.clone(),
        })
    }

    fn time_series(&self, value: f64, at: DateTime<Utc>) -> TimeSeries {
        let (resource_type, metric_labels, resource_labels) =
            labels_for(self.scheme, &self.identity);
        let stamp = at.to_rfc3339_opts(SecondsFormat::Secs, true);
        TimeSeries {
            metric: Metric {
                metric_type: self.metric_type.clone(),
                labels: metric_labels,
            },
            resource: MonitoredResource {
                resource_type,
                labels: resource_labels,
            },
            points: [Point {
                // An instantaneous point, not an interval.
                interval: TimeInterval {
                    start_time: stamp.clone(),
                    end_time: stamp,
                },
                value: TypedValue {
                    double_value: value,
                },
            }],
        }
    }
}

type Labels = BTreeMap<&'static str, String>;

fn labels_for(scheme: LabelScheme, identity: &Identity) -> (&'static str, Labels, Labels) {
    match scheme {
        LabelScheme::GenericNode => (
            "generic_node",
            Labels::new(),
            Labels::from([
                ("node_id", identity.device.clone()),
                ("namespace", identity.sensor.clone()),
                ("location", identity.location.clone()),
            ]),
        ),
        LabelScheme::Global => (
            "global",
            Labels::from([
                ("device", identity.device.clone()),
                ("sensor", identity.sensor.clone()),
            ]),
            Labels::new(),
        ),
    }
}

impl MetricSink for MonitoringClient {
    fn report(&mut self, value: f64, at: DateTime<Utc>) -> anyhow::Result<()> {
        let request = CreateTimeSeriesRequest {
            time_series: [self.time_series(value, at)],
        };
        debug!(value, "submitting point");

        let mut call = self.http.post(&self.url).json(&request);
        if let Some(token) = &self.token {
            call = call.bearer_auth(token);
        }
        let response = call.send().context("posting time series")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("monitoring api returned {status}: {body}");
        }
        Ok(())
    }
}
