//! `fetch` and `resolve` subcommands

use crate::config::CliConfig;
use anyhow::{Context, bail};
use docload_host::{Constructor, Request};
use docload_http::HttpRequestConstructor;
use docload_proxies::{BaseLocation, BaseUrlRequestProxy, CompletionTrackingProxy};
use serde::Serialize;
use std::fmt;

/// Result of one `fetch` run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FetchReport {
    pub(crate) base_url: String,
    pub(crate) total_count: usize,
    pub(crate) requests: Vec<FetchOutcome>,
}

impl FetchReport {
    /// True when every request got a non-error HTTP response
    #[must_use]
    pub(crate) fn succeeded(&self) -> bool {
        self.requests.iter().all(FetchOutcome::succeeded)
    }
}

impl fmt::Display for FetchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for request in &self.requests {
            writeln!(f, "{request}")?;
        }
        write!(f, "Finished {} request(s)", self.total_count)
    }
}

/// One fetched locator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FetchOutcome {
    pub(crate) locator: String,
    pub(crate) resolved: String,
    pub(crate) status: Option<u16>,
    pub(crate) bytes: usize,
    pub(crate) error: Option<String>,
}

impl FetchOutcome {
    #[must_use]
    pub(crate) fn succeeded(&self) -> bool {
        matches!(self.status, Some(status) if status < 400)
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: ", self.locator, self.resolved)?;
        match (self.status, &self.error) {
            (Some(status), _) => write!(f, "{} ({} bytes)", status, self.bytes),
            (None, Some(error)) => write!(f, "failed ({error})"),
            (None, None) => write!(f, "aborted"),
        }
    }
}

/// Load every locator through a tracked, base-url-resolving request
/// constructor and wait until all of them have finished.
///
/// # Errors
/// - no base url configured, or an invalid one
/// - a locator cannot be opened or sent
pub(crate) async fn fetch(
    config: &CliConfig,
    method: &str,
    locators: &[String],
) -> anyhow::Result<FetchReport> {
    let Some(base_url) = config.proxies.base_url.as_deref() else {
        bail!("no base url configured; pass --base or set base_url in the config file");
    };
    let base = BaseLocation::parse(base_url)?;
    let requests = HttpRequestConstructor::new(config.http.clone())?;
    let proxy = CompletionTrackingProxy::with_config(
        BaseUrlRequestProxy::with_base(requests, base.clone()),
        config.proxies.tracker,
    );

    let mut inflight = Vec::with_capacity(locators.len());
    for locator in locators {
        let xhr = proxy.construct()?;
        xhr.open(method, locator)
            .with_context(|| format!("cannot open '{locator}'"))?;
        xhr.send(None)
            .with_context(|| format!("cannot send '{locator}'"))?;
        inflight.push((locator, xhr));
    }
    tracing::info!("Started {} request(s) against {}", inflight.len(), base.url());

    let finished = proxy.wait_for_requests_to_finish().await?;

    let requests = inflight
        .into_iter()
        .map(|(locator, xhr)| {
            let http = xhr.get_ref().get_ref();
            FetchOutcome {
                locator: locator.clone(),
                resolved: base.resolve(locator),
                status: xhr.status(),
                bytes: xhr.response_text().map_or(0, |text| text.len()),
                error: http.error(),
            }
        })
        .collect();

    Ok(FetchReport {
        base_url: base.url().to_string(),
        total_count: finished.total_count,
        requests,
    })
}

/// Resolve locators against `base_url` without loading anything
///
/// # Errors
/// - `base_url` is not an absolute URL
pub(crate) fn resolve(base_url: &str, locators: &[String]) -> anyhow::Result<Vec<String>> {
    let base = BaseLocation::parse(base_url)?;
    Ok(locators.iter().map(|locator| base.resolve(locator)).collect())
}
