//! reqwest-backed requests

use crate::config::HttpConfig;
use docload_host::{
    Constructor, EventDispatch, EventKind, EventTarget, HostError, Listener, ReadyState, Request,
};
use parking_lot::Mutex;
use reqwest::{Method, Url};
use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Builds [`HttpRequest`]s sharing one connection pool
#[derive(Debug, Clone)]
pub struct HttpRequestConstructor {
    client: reqwest::Client,
    config: HttpConfig,
}

impl HttpRequestConstructor {
    /// Create a constructor with its own client
    ///
    /// # Errors
    /// - `HostError::Transport` if the client cannot be initialized
    pub fn new(config: HttpConfig) -> Result<Self, HostError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|err| HostError::Transport(err.to_string()))?;
        Ok(Self { client, config })
    }

    /// Client settings
    #[inline]
    #[must_use]
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }
}

impl Constructor for HttpRequestConstructor {
    type Instance = HttpRequest;

    fn construct(&self) -> Result<HttpRequest, HostError> {
        Ok(HttpRequest {
            shared: Arc::new(Shared {
                client: self.client.clone(),
                events: EventDispatch::new(),
                state: Mutex::new(HttpState::default()),
            }),
        })
    }
}

#[derive(Default)]
struct HttpState {
    method: Option<Method>,
    url: Option<Url>,
    ready_state: ReadyState,
    status: Option<u16>,
    body: Option<String>,
    error: Option<String>,
    task: Option<JoinHandle<()>>,
}

struct Shared {
    client: reqwest::Client,
    events: EventDispatch,
    state: Mutex<HttpState>,
}

/// An HTTP request driven by a spawned tokio task
///
/// Fires exactly one terminal event: `load` for any HTTP response (including
/// error statuses), `error` when the transfer fails, `abort` when cancelled.
/// Clones refer to the same request.
#[derive(Clone)]
pub struct HttpRequest {
    shared: Arc<Shared>,
}

impl HttpRequest {
    /// Transport failure message, if the request ended with `error`
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.shared.state.lock().error.clone()
    }

    /// URL the request was opened with
    #[must_use]
    pub fn url(&self) -> Option<Url> {
        self.shared.state.lock().url.clone()
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("HttpRequest")
            .field("method", &state.method)
            .field("url", &state.url.as_ref().map(Url::as_str))
            .field("ready_state", &state.ready_state)
            .field("status", &state.status)
            .finish_non_exhaustive()
    }
}

impl EventTarget for HttpRequest {
    fn add_event_listener(&self, kind: EventKind, listener: Listener) -> Result<(), HostError> {
        self.shared.events.add_listener(kind, listener);
        Ok(())
    }

    fn set_handler(&self, kind: EventKind, handler: Option<Listener>) {
        self.shared.events.set_handler(kind, handler);
    }

    fn handler(&self, kind: EventKind) -> Option<Listener> {
        self.shared.events.handler(kind)
    }
}

impl Request for HttpRequest {
    fn open(&self, method: &str, url: &str) -> Result<(), HostError> {
        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .map_err(|_| HostError::invalid_state(format!("invalid method '{method}'")))?;
        let url = Url::parse(url).map_err(|err| HostError::InvalidUrl {
            url: url.to_string(),
            reason: err.to_string(),
        })?;

        let mut state = self.shared.state.lock();
        if state.ready_state == ReadyState::Loading {
            return Err(HostError::invalid_state("request is already in flight"));
        }
        *state = HttpState {
            method: Some(method),
            url: Some(url),
            ready_state: ReadyState::Opened,
            ..HttpState::default()
        };
        Ok(())
    }

    fn send(&self, body: Option<Vec<u8>>) -> Result<(), HostError> {
        let runtime = Handle::try_current()
            .map_err(|_| HostError::invalid_state("send requires a tokio runtime"))?;

        let mut state = self.shared.state.lock();
        let (Some(method), Some(url), ReadyState::Opened) =
            (state.method.clone(), state.url.clone(), state.ready_state)
        else {
            return Err(HostError::invalid_state("request must be opened before send"));
        };

        tracing::debug!("Sending {} {}", method, url);
        let mut request = self.shared.client.request(method, url);
        if let Some(body) = body {
            request = request.body(body);
        }

        state.ready_state = ReadyState::Loading;
        state.task = Some(runtime.spawn(transfer(Arc::clone(&self.shared), request)));
        Ok(())
    }

    fn abort(&self) {
        let task = {
            let mut state = self.shared.state.lock();
            if state.ready_state != ReadyState::Loading {
                return;
            }
            state.ready_state = ReadyState::Done;
            state.task.take()
        };
        if let Some(task) = task {
            task.abort();
        }
        tracing::debug!("Request aborted");
        self.shared.events.dispatch(EventKind::Abort);
    }

    fn ready_state(&self) -> ReadyState {
        self.shared.state.lock().ready_state
    }

    fn status(&self) -> Option<u16> {
        self.shared.state.lock().status
    }

    fn response_text(&self) -> Option<String> {
        self.shared.state.lock().body.clone()
    }
}

async fn transfer(shared: Arc<Shared>, request: reqwest::RequestBuilder) {
    let outcome = match request.send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            response.text().await.map(|text| (status, text))
        }
        Err(err) => Err(err),
    };

    let kind = {
        let mut state = shared.state.lock();
        if state.ready_state != ReadyState::Loading {
            return;
        }
        state.ready_state = ReadyState::Done;
        state.task = None;
        match outcome {
            Ok((status, text)) => {
                tracing::debug!("Response {} ({} bytes)", status, text.len());
                state.status = Some(status);
                state.body = Some(text);
                EventKind::Load
            }
            Err(err) => {
                tracing::warn!("Request failed: {}", err);
                state.error = Some(err.to_string());
                EventKind::Error
            }
        }
    };
    shared.events.dispatch(kind);
}
