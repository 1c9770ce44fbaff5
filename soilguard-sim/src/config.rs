//! Simulator configuration
//!
//! A JSON document describing the node and its probes. Every field has a
//! default, so `{}` is a valid file and yields the two-probe bench setup:
//!
//! ```json
//! {
//!   "node": { "report_interval_ms": 5000, "format": "raw", "missing": "sentinel" },
//!   "probes": [
//!     { "channel": { "pin": 0, "power_pin": 7 }, "model": { "base_raw": 612 } },
//!     { "channel": { "pin": 1 }, "model": { "base_raw": 480,
//!       "disconnect": { "from_ms": 30000, "until_ms": 50000 } } }
//!   ]
//! }
//! ```

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use soilguard_core::{constants::MAX_CHANNELS, ChannelConfig, NodeConfig};

use crate::probe::{ProbeModel, Window};

/// One probe: how it is wired and how it behaves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSetup {
    pub channel: ChannelConfig,
    pub model: ProbeModel,
}

impl Default for ProbeSetup {
    fn default() -> Self {
        Self {
            channel: ChannelConfig::new(0),
            model: ProbeModel::default(),
        }
    }
}

/// Whole simulated node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub node: NodeConfig,
    pub probes: Vec<ProbeSetup>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            node: NodeConfig::default(),
            probes: vec![
                ProbeSetup {
                    channel: ChannelConfig::new(0).with_power_pin(7),
                    model: ProbeModel {
                        base_raw: 612,
                        drift_per_min: 2,
                        noise: 4,
                        spike_chance: 0.05,
                        disconnect: None,
                        seed: 7,
                    },
                },
                ProbeSetup {
                    channel: ChannelConfig::new(1),
                    model: ProbeModel {
                        base_raw: 480,
                        drift_per_min: 1,
                        noise: 3,
                        spike_chance: 0.05,
                        disconnect: Some(Window {
                            from_ms: 30_000,
                            until_ms: 50_000,
                        }),
                        seed: 11,
                    },
                },
            ],
        }
    }
}

impl SimConfig {
    /// Read and check a JSON description
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let config: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject setups the node would refuse
    pub fn validate(&self) -> anyhow::Result<()> {
        self.node.validate().context("node")?;
        ensure!(!self.probes.is_empty(), "at least one probe is required");
        ensure!(
            self.probes.len() <= MAX_CHANNELS,
            "{} probes configured, the node supports {}",
            self.probes.len(),
            MAX_CHANNELS
        );
        for probe in &self.probes {
            probe
                .channel
                .validate()
                .with_context(|| format!("probe A{}", probe.channel.pin))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soilguard_core::{MissingPolicy, ReportFormat};

    #[test]
    fn default_is_valid() {
        SimConfig::default().validate().unwrap();
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config: SimConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn partial_document() {
        let config: SimConfig = serde_json::from_str(
            r#"{
                "node": { "format": "raw_with_percent", "missing": "omit_channel", "banner": false },
                "probes": [ { "channel": { "pin": 2, "samples": 7 }, "model": { "base_raw": 700 } } ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.node.format, ReportFormat::RawWithPercent);
        assert_eq!(config.node.missing, MissingPolicy::OmitChannel);
        assert_eq!(config.node.report_interval_ms, 5000);
        assert_eq!(config.probes[0].channel.samples, 7);
        assert_eq!(config.probes[0].model.noise, 3);
        config.validate().unwrap();
    }

    #[test]
    fn rejects_inverted_calibration() {
        let config: SimConfig = serde_json::from_str(
            r#"{ "probes": [ { "channel": { "calibration": { "dry": 300, "wet": 900 } } } ] }"#,
        )
        .unwrap();

        assert!(config.validate().is_err());
    }
}
