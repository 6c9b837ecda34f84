//! Testing utilities for docload workspace
//!
//! Deterministic stand-ins for host resource constructors. Every constructor
//! records the instances it hands out so a test can drive their completion
//! by hand, the way a browser test mocks `XMLHttpRequest` and `Image`.

#![allow(missing_docs)]

use docload_host::{
    is_src_attribute, Constructor, EventDispatch, EventKind, EventTarget, HostError, Listener,
    MediaElement, ReadyState, Request,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

/// Document location mock media elements normalize `src` against
pub const DOCUMENT_URL: &str = "http://document.test/page/index.html";

#[derive(Debug, Default)]
struct MockRequestState {
    method: Option<String>,
    url: Option<String>,
    ready_state: ReadyState,
    status: Option<u16>,
    body: Option<String>,
    send_count: usize,
}

#[derive(Debug)]
struct MockRequestInner {
    id: usize,
    listeners_supported: bool,
    events: EventDispatch,
    state: Mutex<MockRequestState>,
}

/// Request mock; clones share the same instance
#[derive(Debug, Clone)]
pub struct MockRequest {
    inner: Arc<MockRequestInner>,
}

impl MockRequest {
    fn new(id: usize, listeners_supported: bool) -> Self {
        Self {
            inner: Arc::new(MockRequestInner {
                id,
                listeners_supported,
                events: EventDispatch::new(),
                state: Mutex::new(MockRequestState::default()),
            }),
        }
    }

    /// Creation order within the owning constructor
    pub fn id(&self) -> usize {
        self.inner.id
    }

    /// URL passed to `open`
    pub fn opened_url(&self) -> Option<String> {
        self.inner.state.lock().url.clone()
    }

    /// Method passed to `open`
    pub fn opened_method(&self) -> Option<String> {
        self.inner.state.lock().method.clone()
    }

    /// How many times `send` was called
    pub fn send_count(&self) -> usize {
        self.inner.state.lock().send_count
    }

    /// Listeners registered for `kind`
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.inner.events.listener_count(kind)
    }

    /// Finish with a 200 response and fire `load`
    pub fn mock_done(&self) {
        self.mock_done_with(200, "");
    }

    /// Finish with the given response and fire `load`
    pub fn mock_done_with(&self, status: u16, body: &str) {
        {
            let mut state = self.inner.state.lock();
            state.ready_state = ReadyState::Done;
            state.status = Some(status);
            state.body = Some(body.to_string());
        }
        self.inner.events.dispatch(EventKind::Load);
    }

    /// Fail at the transport level and fire `error`
    pub fn mock_fail(&self) {
        self.inner.state.lock().ready_state = ReadyState::Done;
        self.inner.events.dispatch(EventKind::Error);
    }
}

impl EventTarget for MockRequest {
    fn add_event_listener(&self, kind: EventKind, listener: Listener) -> Result<(), HostError> {
        if !self.inner.listeners_supported {
            return Err(HostError::Unsupported("addEventListener"));
        }
        self.inner.events.add_listener(kind, listener);
        Ok(())
    }

    fn set_handler(&self, kind: EventKind, handler: Option<Listener>) {
        self.inner.events.set_handler(kind, handler);
    }

    fn handler(&self, kind: EventKind) -> Option<Listener> {
        self.inner.events.handler(kind)
    }
}

impl Request for MockRequest {
    fn open(&self, method: &str, url: &str) -> Result<(), HostError> {
        let mut state = self.inner.state.lock();
        state.method = Some(method.to_string());
        state.url = Some(url.to_string());
        state.ready_state = ReadyState::Opened;
        Ok(())
    }

    fn send(&self, _body: Option<Vec<u8>>) -> Result<(), HostError> {
        let mut state = self.inner.state.lock();
        state.send_count += 1;
        state.ready_state = ReadyState::Loading;
        Ok(())
    }

    fn abort(&self) {
        {
            let mut state = self.inner.state.lock();
            if state.ready_state != ReadyState::Loading {
                return;
            }
            state.ready_state = ReadyState::Done;
        }
        self.inner.events.dispatch(EventKind::Abort);
    }

    fn ready_state(&self) -> ReadyState {
        self.inner.state.lock().ready_state
    }

    fn status(&self) -> Option<u16> {
        self.inner.state.lock().status
    }

    fn response_text(&self) -> Option<String> {
        self.inner.state.lock().body.clone()
    }
}

/// Constructor for [`MockRequest`] that remembers every instance
#[derive(Debug, Clone)]
pub struct MockRequestConstructor {
    listeners_supported: bool,
    fail_with: Option<String>,
    created: Arc<Mutex<Vec<MockRequest>>>,
}

impl MockRequestConstructor {
    /// Instances support `add_event_listener`
    pub fn new() -> Self {
        Self {
            listeners_supported: true,
            fail_with: None,
            created: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Instances only offer `on*` handler slots
    pub fn single_handler() -> Self {
        Self {
            listeners_supported: false,
            ..Self::new()
        }
    }

    /// Every construction fails with a transport error
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::new()
        }
    }

    /// All instances created so far
    pub fn instances(&self) -> Vec<MockRequest> {
        self.created.lock().clone()
    }

    /// Instance number `index`
    ///
    /// # Panics
    /// If fewer instances were created
    pub fn instance(&self, index: usize) -> MockRequest {
        self.created.lock()[index].clone()
    }

    /// Number of instances created
    pub fn created_count(&self) -> usize {
        self.created.lock().len()
    }
}

impl Default for MockRequestConstructor {
    fn default() -> Self {
        Self::new()
    }
}

impl Constructor for MockRequestConstructor {
    type Instance = MockRequest;

    fn construct(&self) -> Result<MockRequest, HostError> {
        if let Some(message) = &self.fail_with {
            return Err(HostError::Transport(message.clone()));
        }
        let mut created = self.created.lock();
        let request = MockRequest::new(created.len(), self.listeners_supported);
        created.push(request.clone());
        Ok(request)
    }
}

#[derive(Debug, Default)]
struct MockMediaState {
    attributes: HashMap<String, String>,
    load_requests: Vec<String>,
}

#[derive(Debug)]
struct MockMediaInner {
    document: Url,
    events: EventDispatch,
    state: Mutex<MockMediaState>,
}

/// Media element mock; clones share the same element
///
/// Behaves like a host image element: `src()` reports the attribute
/// normalized against the document location, and every assignment of the
/// locator starts a load that the test finishes with [`MockMedia::finish_load`].
#[derive(Debug, Clone)]
pub struct MockMedia {
    inner: Arc<MockMediaInner>,
}

impl MockMedia {
    fn new(document: Url) -> Self {
        Self {
            inner: Arc::new(MockMediaInner {
                document,
                events: EventDispatch::new(),
                state: Mutex::new(MockMediaState::default()),
            }),
        }
    }

    /// Every locator a load was started for, in order
    pub fn load_requests(&self) -> Vec<String> {
        self.inner.state.lock().load_requests.clone()
    }

    /// Locator of the most recent load
    pub fn last_load_request(&self) -> Option<String> {
        self.inner.state.lock().load_requests.last().cloned()
    }

    /// Fire `load`
    pub fn finish_load(&self) {
        self.inner.events.dispatch(EventKind::Load);
    }

    /// Fire `error`
    pub fn fail_load(&self) {
        self.inner.events.dispatch(EventKind::Error);
    }

    fn store_src(&self, value: &str) {
        let mut state = self.inner.state.lock();
        state
            .attributes
            .insert(docload_host::SRC_ATTRIBUTE.to_string(), value.to_string());
        let absolute = self
            .inner
            .document
            .join(value)
            .map_or_else(|_| value.to_string(), String::from);
        state.load_requests.push(absolute);
    }
}

impl EventTarget for MockMedia {
    fn add_event_listener(&self, kind: EventKind, listener: Listener) -> Result<(), HostError> {
        self.inner.events.add_listener(kind, listener);
        Ok(())
    }

    fn set_handler(&self, kind: EventKind, handler: Option<Listener>) {
        self.inner.events.set_handler(kind, handler);
    }

    fn handler(&self, kind: EventKind) -> Option<Listener> {
        self.inner.events.handler(kind)
    }
}

impl MediaElement for MockMedia {
    fn src(&self) -> String {
        let state = self.inner.state.lock();
        match state.attributes.get(docload_host::SRC_ATTRIBUTE) {
            Some(value) => self
                .inner
                .document
                .join(value)
                .map_or_else(|_| value.clone(), String::from),
            None => String::new(),
        }
    }

    fn set_src(&self, value: &str) {
        self.store_src(value);
    }

    fn get_attribute(&self, name: &str) -> Option<String> {
        self.inner
            .state
            .lock()
            .attributes
            .get(&name.to_ascii_lowercase())
            .cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        if is_src_attribute(name) {
            self.store_src(value);
            return;
        }
        self.inner
            .state
            .lock()
            .attributes
            .insert(name.to_ascii_lowercase(), value.to_string());
    }

    fn remove_attribute(&self, name: &str) {
        self.inner
            .state
            .lock()
            .attributes
            .remove(&name.to_ascii_lowercase());
    }
}

/// Constructor for [`MockMedia`] that remembers every element
#[derive(Debug, Clone)]
pub struct MockMediaConstructor {
    document: Url,
    created: Arc<Mutex<Vec<MockMedia>>>,
}

impl MockMediaConstructor {
    /// Elements live in a document at [`DOCUMENT_URL`]
    ///
    /// # Panics
    /// Never; the document location is a valid constant
    pub fn new() -> Self {
        Self {
            document: Url::parse(DOCUMENT_URL).expect("document url constant is valid"),
            created: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Element number `index`
    ///
    /// # Panics
    /// If fewer elements were created
    pub fn instance(&self, index: usize) -> MockMedia {
        self.created.lock()[index].clone()
    }

    /// Number of elements created
    pub fn created_count(&self) -> usize {
        self.created.lock().len()
    }
}

impl Default for MockMediaConstructor {
    fn default() -> Self {
        Self::new()
    }
}

impl Constructor for MockMediaConstructor {
    type Instance = MockMedia;

    fn construct(&self) -> Result<MockMedia, HostError> {
        let media = MockMedia::new(self.document.clone());
        self.created.lock().push(media.clone());
        Ok(media)
    }
}

/// Listener that counts how often it fired
pub fn counting_listener() -> (Listener, Arc<Mutex<Vec<EventKind>>>) {
    let fired = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&fired);
    let listener: Listener = Arc::new(move |kind| sink.lock().push(kind));
    (listener, fired)
}
