use std::time::Duration;

use opentelemetry::KeyValue;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{Instrument, instrument};

use crate::config::Config;
use crate::telemetry::metrics::KEEP_ALIVE_PINGS;

/// Periodically requests `url` so hosted deployments that idle on inactivity stay warm.
#[derive(Clone)]
pub struct KeepAlive {
    client: reqwest::Client,
    url: String,
    interval: Duration,
}

impl KeepAlive {
    pub fn new(url: impl Into<String>, interval: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            interval,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(
            config.keep_alive_url.clone(),
            Duration::from_secs(config.keep_alive_interval_secs.max(1)),
        )
    }

    /// Spawns the ping loop; it exits when `shutdown` fires.
    pub fn spawn(self, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        let span = tracing::info_span!("job.keep_alive", url = %self.url);

        tokio::spawn(
            async move {
                tracing::info!(interval_secs = self.interval.as_secs(), "Keep-alive job started");

                let mut interval = tokio::time::interval(self.interval);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                // The first tick completes immediately; skip it so the server is up first.
                interval.tick().await;

                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            if let Err(e) = self.ping().await {
                                tracing::error!(error = %e, "Keep-alive ping failed");
                            }
                        }
                        _ = shutdown.recv() => {
                            tracing::info!("Keep-alive job received shutdown signal");
                            break;
                        }
                    }
                }
            }
            .instrument(span),
        )
    }

    #[instrument(name = "job.keep_alive.ping", skip(self))]
    async fn ping(&self) -> anyhow::Result<()> {
        let result = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status());

        match result {
            Ok(resp) => {
                KEEP_ALIVE_PINGS.add(1, &[KeyValue::new("outcome", "success")]);
                tracing::info!(status = resp.status().as_u16(), "Keep-alive ping sent");
                Ok(())
            }
            Err(e) => {
                KEEP_ALIVE_PINGS.add(1, &[KeyValue::new("outcome", "failure")]);
                Err(e.into())
            }
        }
    }
}
