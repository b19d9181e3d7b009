use serde::Deserialize;

/// `[metrics]` section: whether to install the Prometheus recorder and where to expose it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl MetricsConfig {
    /// Scrape path with a guaranteed leading slash
    pub fn route(&self) -> String {
        if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: MetricsConfig = serde_json::from_str(r#"{"enabled": false}"#).unwrap();

        assert!(!config.enabled);
        assert_eq!(config.path, "/metrics");
    }

    #[test]
    fn test_route_adds_leading_slash() {
        let config = MetricsConfig {
            enabled: true,
            path: "prometheus".to_string(),
        };
        assert_eq!(config.route(), "/prometheus");
        assert_eq!(MetricsConfig::default().route(), "/metrics");
    }
}
