use crate::{Error, PrometheusClient};
use conf::Conf;
use std::time::Duration;

/// Configures our prometheus API client
#[derive(Clone, Conf, Debug)]
pub struct ClientConfig {
    /// Address of prometheus host. Should start with http and usually indicate port 9090
    #[conf(long, env)]
    pub prometheus_host: String,
    /// Deadline for connecting, and for each whole request
    #[conf(long, env, default_value = "10s", value_parser = humantime::parse_duration)]
    pub prometheus_timeout: Duration,
}

impl ClientConfig {
    /// Build a client from this config
    pub fn into_client(self) -> Result<PrometheusClient, Error> {
        PrometheusClient::from_config(&self)
    }
}
