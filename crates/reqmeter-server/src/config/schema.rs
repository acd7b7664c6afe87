use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use reqmeter_core::error::{Error, Result};
use reqmeter_core::opts::{is_valid_label_name, validate_buckets};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(Error::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.server.validate()?;
        self.metrics.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(Error::Config("server.port must be between 1 and 65535".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Label pairs in the order they appear in the YAML map.
    #[serde(default = "default_labels", deserialize_with = "ordered_labels")]
    pub default_labels: Vec<(String, String)>,

    #[serde(default = "default_duration_buckets")]
    pub duration_buckets: Vec<f64>,

    #[serde(default = "default_true")]
    pub process_metrics: bool,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            default_labels: default_labels(),
            duration_buckets: default_duration_buckets(),
            process_metrics: true,
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        validate_buckets("metrics.duration_buckets", &self.duration_buckets)
            .map_err(|e| Error::Config(e.to_string()))?;
        for (i, (name, _)) in self.default_labels.iter().enumerate() {
            if !is_valid_label_name(name) || name == "le" {
                return Err(Error::Config(format!(
                    "metrics.default_labels: {name:?} is not a valid label name"
                )));
            }
            if self.default_labels[..i].iter().any(|(n, _)| n == name) {
                return Err(Error::Config(format!(
                    "metrics.default_labels: {name:?} set twice"
                )));
            }
        }
        Ok(())
    }

    /// Default labels as ordered pairs for the registry.
    pub fn default_label_pairs(&self) -> Vec<(String, String)> {
        self.default_labels.clone()
    }
}

fn default_port() -> u16 {
    3000
}
fn default_labels() -> Vec<(String, String)> {
    vec![("app".to_string(), "my-express-app".to_string())]
}
fn default_duration_buckets() -> Vec<f64> {
    vec![0.1, 0.5, 1.0, 2.0, 5.0]
}
fn default_true() -> bool {
    true
}

/// Read a YAML map into pairs without sorting its keys.
fn ordered_labels<'de, D>(de: D) -> std::result::Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct LabelMap;

    impl<'de> Visitor<'de> for LabelMap {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of label names to string values")
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut out = Vec::new();
            while let Some(pair) = map.next_entry::<String, String>()? {
                out.push(pair);
            }
            Ok(out)
        }
    }

    de.deserialize_map(LabelMap)
}
