//! Command line configuration file
//!
//! ```toml
//! base_url = "http://localhost:8000/fixtures/"
//!
//! [tracker]
//! count_mode = "cumulative"
//!
//! [http]
//! timeout_secs = 10
//! ```

use anyhow::Context;
use docload_http::HttpConfig;
use docload_proxies::ProxyConfig;
use serde::Deserialize;
use std::path::Path;

/// Everything the `docload` binary can read from its config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct CliConfig {
    #[serde(flatten)]
    pub(crate) proxies: ProxyConfig,
    pub(crate) http: HttpConfig,
}

impl CliConfig {
    pub(crate) fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::from_toml_str(&text)
    }

    /// Command line `--base` wins over the file
    #[must_use]
    pub(crate) fn with_base_url(mut self, base_url: Option<&String>) -> Self {
        if let Some(base_url) = base_url {
            self.proxies.base_url = Some(base_url.clone());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docload_proxies::CountMode;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn reads_all_sections() {
        let config = CliConfig::from_toml_str(
            r#"
            base_url = "http://localhost/fixtures/"

            [tracker]
            count_mode = "per_wave"

            [http]
            timeout_secs = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.proxies.base_url.as_deref(), Some("http://localhost/fixtures/"));
        assert_eq!(config.proxies.tracker.count_mode, CountMode::PerWave);
        assert_eq!(config.http.timeout_secs, 3);
    }

    #[test]
    fn command_line_base_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url = \"http://file.example/\"").unwrap();

        let config = CliConfig::load(file.path())
            .unwrap()
            .with_base_url(Some(&"http://cli.example/".to_string()));
        assert_eq!(config.proxies.base_url.as_deref(), Some("http://cli.example/"));
    }

    #[test]
    fn missing_file_has_context() {
        let err = CliConfig::load(Path::new("/nonexistent/docload.toml")).unwrap_err();
        assert!(err.to_string().contains("cannot read config file"));
    }
}
