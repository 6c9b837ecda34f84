//! Request-completion tracking
//!
//! [`CompletionTrackingProxy`] wraps a constructor and counts every instance
//! it produces until that instance signals a terminal event (`load`, `error`
//! or `abort`). [`CompletionTrackingProxy::wait_for_requests_to_finish`]
//! resolves the next time nothing is pending, no matter how many requests
//! were created before or after the query.
//!
//! The tracker observes instances through `add_event_listener` when the host
//! supports it. Hosts that only offer `on*` handler slots get a chained
//! handler instead. The [`Tracked`] wrapper keeps the caller's handler in its
//! own slot and the installed composite runs it before the tracker's
//! observer.

use crate::config::{CountMode, TrackerConfig};
use crate::error::ProxyError;
use docload_host::{
    Constructor, EventKind, EventTarget, HostError, Listener, MediaElement, ReadyState, Request,
};
use futures::channel::oneshot;
use futures::FutureExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

/// Result of a completion query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishedRequests {
    /// Requests started through the proxy when pending reached zero
    pub total_count: usize,
}

/// Caller-visible handlers of a chained instance, indexed by [`EventKind::index`]
type HandlerSlots = Mutex<[Option<Listener>; 3]>;

#[derive(Debug, Default)]
struct TrackerState {
    pending: usize,
    total_started: usize,
    next_id: u64,
    waiters: Vec<oneshot::Sender<FinishedRequests>>,
}

#[derive(Debug)]
struct Tracker {
    config: TrackerConfig,
    state: Mutex<TrackerState>,
}

impl Tracker {
    fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(TrackerState::default()),
        }
    }

    /// Count a new instance, returning its id
    fn start(&self) -> u64 {
        let mut state = self.state.lock();
        if state.pending == 0 && self.config.count_mode == CountMode::PerWave {
            state.total_started = 0;
        }
        state.pending += 1;
        state.total_started += 1;
        state.next_id += 1;

        tracing::debug!(
            "Tracked request #{} started ({} pending)",
            state.next_id,
            state.pending
        );
        state.next_id
    }

    /// Undo [`Tracker::start`] for an instance that could not be observed
    fn revert(&self, id: u64) {
        tracing::debug!("Tracked request #{} reverted", id);
        self.release(|state| {
            state.total_started = state.total_started.saturating_sub(1);
        });
    }

    /// First terminal event of instance `id`
    fn finish(&self, id: u64, kind: EventKind) {
        tracing::debug!("Tracked request #{} finished with {}", id, kind);
        self.release(|_| {});
    }

    fn release(&self, adjust: impl FnOnce(&mut TrackerState)) {
        let (waiters, report) = {
            let mut state = self.state.lock();
            // start() always precedes release() for the same instance
            state.pending = state.pending.saturating_sub(1);
            adjust(&mut state);
            if state.pending > 0 {
                return;
            }
            let report = FinishedRequests {
                total_count: state.total_started,
            };
            (std::mem::take(&mut state.waiters), report)
        };

        if waiters.is_empty() {
            return;
        }
        tracing::info!(
            "All {} tracked requests finished, notifying {} waiter(s)",
            report.total_count,
            waiters.len()
        );
        for waiter in waiters {
            // A dropped receiver just means nobody is listening anymore
            let _ = waiter.send(report);
        }
    }

    fn wait(&self) -> WaitForRequests {
        let (tx, rx) = oneshot::channel();
        let (pending, immediate) = {
            let mut state = self.state.lock();
            if state.pending == 0 {
                (0, Some((tx, state.total_started)))
            } else {
                state.waiters.push(tx);
                (state.pending, None)
            }
        };

        if let Some((tx, total_count)) = immediate {
            let _ = tx.send(FinishedRequests { total_count });
        }
        WaitForRequests { rx, pending }
    }
}

/// Future returned by [`CompletionTrackingProxy::wait_for_requests_to_finish`]
///
/// Resolves once no tracked request is pending. If a tracked request never
/// finishes, neither does this future. It only fails when the proxy and every
/// tracked instance were dropped while it was still queued.
#[derive(Debug)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct WaitForRequests {
    rx: oneshot::Receiver<FinishedRequests>,
    pending: usize,
}

impl Future for WaitForRequests {
    type Output = Result<FinishedRequests, ProxyError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let pending = self.pending;
        self.rx
            .poll_unpin(cx)
            .map(|result| result.map_err(|_| ProxyError::Abandoned { pending }))
    }
}

/// Constructor proxy that tracks completion of every produced instance
///
/// Clones share one tracker; separate calls to [`CompletionTrackingProxy::new`]
/// never do.
pub struct CompletionTrackingProxy<C> {
    ctor: Arc<C>,
    tracker: Arc<Tracker>,
}

impl<C> CompletionTrackingProxy<C> {
    /// Wrap `ctor` with cumulative counting
    #[inline]
    #[must_use]
    pub fn new(ctor: C) -> Self {
        Self::with_config(ctor, TrackerConfig::default())
    }

    /// Wrap `ctor` with explicit tracker settings
    #[must_use]
    pub fn with_config(ctor: C, config: TrackerConfig) -> Self {
        Self {
            ctor: Arc::new(ctor),
            tracker: Arc::new(Tracker::new(config)),
        }
    }

    /// Resolve once every request created through this proxy has finished
    ///
    /// Resolves immediately when nothing is pending, including when no
    /// request was ever created. Otherwise resolves at the next moment the
    /// pending count drops to zero, reporting the total observed then.
    pub fn wait_for_requests_to_finish(&self) -> WaitForRequests {
        self.tracker.wait()
    }

    /// Requests created but not yet finished
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tracker.state.lock().pending
    }

    /// Requests counted towards the next reported total
    #[must_use]
    pub fn total_started(&self) -> usize {
        self.tracker.state.lock().total_started
    }

    /// Tracker settings
    #[inline]
    #[must_use]
    pub fn config(&self) -> TrackerConfig {
        self.tracker.config
    }

    /// Wrapped constructor
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &C {
        &self.ctor
    }
}

impl<C> Clone for CompletionTrackingProxy<C> {
    fn clone(&self) -> Self {
        Self {
            ctor: Arc::clone(&self.ctor),
            tracker: Arc::clone(&self.tracker),
        }
    }
}

impl<C> fmt::Debug for CompletionTrackingProxy<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.tracker.state.lock();
        f.debug_struct("CompletionTrackingProxy")
            .field("pending", &state.pending)
            .field("total_started", &state.total_started)
            .field("waiters", &state.waiters.len())
            .field("config", &self.tracker.config)
            .finish_non_exhaustive()
    }
}

impl<C> Constructor for CompletionTrackingProxy<C>
where
    C: Constructor,
    C::Instance: EventTarget,
{
    type Instance = Tracked<C::Instance>;

    fn construct(&self) -> Result<Self::Instance, HostError> {
        let instance = self.ctor.construct()?;
        let id = self.tracker.start();

        let chained = observe(&self.tracker, id, &instance)?;
        Ok(Tracked {
            inner: instance,
            id,
            chained,
        })
    }
}

/// Attach the one-shot completion observer for instance `id`
///
/// On failure the start of `id` is reverted, unless the host already
/// finished the instance while listeners were being registered.
fn observe<T: EventTarget>(
    tracker: &Arc<Tracker>,
    id: u64,
    instance: &T,
) -> Result<Option<Arc<HandlerSlots>>, HostError> {
    let finished = Arc::new(AtomicBool::new(false));
    let observer: Listener = {
        let tracker = Arc::clone(tracker);
        let finished = Arc::clone(&finished);
        Arc::new(move |kind: EventKind| {
            if finished.swap(true, Ordering::AcqRel) {
                tracing::trace!("Ignoring repeated {} for tracked request #{}", kind, id);
                return;
            }
            tracker.finish(id, kind);
        })
    };

    let registered = register(instance, &observer);
    // Listeners registered before the failure must stay inert
    if registered.is_err() && !finished.swap(true, Ordering::AcqRel) {
        tracker.revert(id);
    }
    registered
}

fn register<T: EventTarget>(
    instance: &T,
    observer: &Listener,
) -> Result<Option<Arc<HandlerSlots>>, HostError> {
    match instance.add_event_listener(EventKind::Load, Arc::clone(observer)) {
        Ok(()) => {
            for kind in [EventKind::Error, EventKind::Abort] {
                instance.add_event_listener(kind, Arc::clone(observer))?;
            }
            Ok(None)
        }
        Err(err) if err.is_unsupported() => Ok(Some(chain(instance, observer))),
        Err(err) => Err(err),
    }
}

/// Install composite handlers for hosts without listener support
fn chain<T: EventTarget>(instance: &T, observer: &Listener) -> Arc<HandlerSlots> {
    let slots: Arc<HandlerSlots> = Arc::new(Mutex::new(Default::default()));

    for kind in EventKind::TERMINAL {
        slots.lock()[kind.index()] = instance.handler(kind);

        let user_slots = Arc::clone(&slots);
        let observer = Arc::clone(observer);
        let composite: Listener = Arc::new(move |fired: EventKind| {
            let user = user_slots.lock()[fired.index()].clone();
            if let Some(user) = user {
                user(fired);
            }
            observer(fired);
        });
        instance.set_handler(kind, Some(composite));
    }
    slots
}

/// Instance produced by [`CompletionTrackingProxy`]
///
/// Forwards every capability of the wrapped instance. On hosts without
/// listener support, handler assignment lands in a wrapper-owned slot so it
/// composes with the tracker's observer instead of replacing it.
pub struct Tracked<T> {
    inner: T,
    id: u64,
    chained: Option<Arc<HandlerSlots>>,
}

impl<T> Tracked<T> {
    /// Wrapped instance
    ///
    /// When [`Tracked::is_chained`], the instance's handler slots belong to
    /// the tracker; assign handlers through the wrapper.
    #[inline]
    #[must_use]
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Unwrap the instance; it stays tracked
    ///
    /// # Errors
    /// Returns the wrapper unchanged when completion is observed through
    /// chained handlers. Handler assignment on the bare instance would
    /// replace the tracker's observer.
    pub fn into_inner(self) -> Result<T, Self> {
        if self.chained.is_some() {
            return Err(self);
        }
        Ok(self.inner)
    }

    /// Creation sequence number within the owning proxy
    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether completion is observed through chained handlers
    #[inline]
    #[must_use]
    pub fn is_chained(&self) -> bool {
        self.chained.is_some()
    }
}

impl<T: fmt::Debug> fmt::Debug for Tracked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracked")
            .field("id", &self.id)
            .field("chained", &self.is_chained())
            .field("inner", &self.inner)
            .finish()
    }
}

impl<T: EventTarget> EventTarget for Tracked<T> {
    fn add_event_listener(&self, kind: EventKind, listener: Listener) -> Result<(), HostError> {
        self.inner.add_event_listener(kind, listener)
    }

    fn set_handler(&self, kind: EventKind, handler: Option<Listener>) {
        match &self.chained {
            Some(slots) => slots.lock()[kind.index()] = handler,
            None => self.inner.set_handler(kind, handler),
        }
    }

    fn handler(&self, kind: EventKind) -> Option<Listener> {
        match &self.chained {
            Some(slots) => slots.lock()[kind.index()].clone(),
            None => self.inner.handler(kind),
        }
    }
}

impl<T: Request> Request for Tracked<T> {
    fn open(&self, method: &str, url: &str) -> Result<(), HostError> {
        self.inner.open(method, url)
    }

    fn send(&self, body: Option<Vec<u8>>) -> Result<(), HostError> {
        self.inner.send(body)
    }

    fn abort(&self) {
        self.inner.abort();
    }

    fn ready_state(&self) -> ReadyState {
        self.inner.ready_state()
    }

    fn status(&self) -> Option<u16> {
        self.inner.status()
    }

    fn response_text(&self) -> Option<String> {
        self.inner.response_text()
    }
}

impl<T: MediaElement> MediaElement for Tracked<T> {
    fn src(&self) -> String {
        self.inner.src()
    }

    fn set_src(&self, value: &str) {
        self.inner.set_src(value);
    }

    fn get_attribute(&self, name: &str) -> Option<String> {
        self.inner.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.inner.set_attribute(name, value);
    }

    fn remove_attribute(&self, name: &str) {
        self.inner.remove_attribute(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docload_test_utils::{counting_listener, MockRequestConstructor};
    use pretty_assertions::assert_eq;

    fn resolved(wait: WaitForRequests) -> Option<FinishedRequests> {
        wait.now_or_never().map(|result| result.unwrap())
    }

    #[test]
    fn notifies_when_pending_request_finishes() {
        let mocks = MockRequestConstructor::new();
        let proxy = CompletionTrackingProxy::new(mocks.clone());
        let xhr = proxy.construct().unwrap();
        xhr.send(None).unwrap();

        let mut wait = proxy.wait_for_requests_to_finish();
        assert!((&mut wait).now_or_never().is_none());

        mocks.instance(0).mock_done();
        assert_eq!(resolved(wait), Some(FinishedRequests { total_count: 1 }));
    }

    #[test]
    fn notifies_only_after_last_of_several_requests() {
        let mocks = MockRequestConstructor::new();
        let proxy = CompletionTrackingProxy::new(mocks.clone());
        let first = proxy.construct().unwrap();
        first.send(None).unwrap();
        let second = proxy.construct().unwrap();
        second.send(None).unwrap();

        let mut wait = proxy.wait_for_requests_to_finish();

        mocks.instance(0).mock_done();
        assert!((&mut wait).now_or_never().is_none());

        mocks.instance(1).mock_done();
        assert_eq!(resolved(wait), Some(FinishedRequests { total_count: 2 }));
    }

    #[test]
    fn finishes_immediately_without_requests() {
        let proxy = CompletionTrackingProxy::new(MockRequestConstructor::new());
        assert_eq!(
            resolved(proxy.wait_for_requests_to_finish()),
            Some(FinishedRequests { total_count: 0 })
        );
    }

    #[test]
    fn notifies_when_queried_after_everything_finished() {
        let mocks = MockRequestConstructor::new();
        let proxy = CompletionTrackingProxy::new(mocks.clone());
        proxy.construct().unwrap().send(None).unwrap();
        mocks.instance(0).mock_done();

        assert_eq!(
            resolved(proxy.wait_for_requests_to_finish()),
            Some(FinishedRequests { total_count: 1 })
        );
    }

    #[test]
    fn counts_requests_created_after_the_query() {
        let mocks = MockRequestConstructor::new();
        let proxy = CompletionTrackingProxy::new(mocks.clone());
        proxy.construct().unwrap();

        let wait = proxy.wait_for_requests_to_finish();
        proxy.construct().unwrap();

        mocks.instance(0).mock_done();
        mocks.instance(1).mock_done();
        assert_eq!(resolved(wait), Some(FinishedRequests { total_count: 2 }));
    }

    #[test]
    fn user_handler_fires_once_alongside_tracker() {
        let mocks = MockRequestConstructor::new();
        let proxy = CompletionTrackingProxy::new(mocks.clone());
        let xhr = proxy.construct().unwrap();
        let (onload, fired) = counting_listener();
        xhr.set_handler(EventKind::Load, Some(onload));
        xhr.send(None).unwrap();

        let wait = proxy.wait_for_requests_to_finish();
        mocks.instance(0).mock_done();

        assert_eq!(*fired.lock(), vec![EventKind::Load]);
        assert_eq!(resolved(wait), Some(FinishedRequests { total_count: 1 }));
    }

    #[test]
    fn chains_handlers_on_single_handler_hosts() {
        let mocks = MockRequestConstructor::single_handler();
        let proxy = CompletionTrackingProxy::new(mocks.clone());
        let xhr = proxy.construct().unwrap();
        assert!(xhr.is_chained());

        let (onload, fired) = counting_listener();
        xhr.set_handler(EventKind::Load, Some(Arc::clone(&onload)));
        assert!(Arc::ptr_eq(&xhr.handler(EventKind::Load).unwrap(), &onload));

        let wait = proxy.wait_for_requests_to_finish();
        mocks.instance(0).mock_done();

        assert_eq!(*fired.lock(), vec![EventKind::Load]);
        assert_eq!(resolved(wait), Some(FinishedRequests { total_count: 1 }));
    }

    #[test]
    fn replacing_chained_handler_keeps_tracking() {
        let mocks = MockRequestConstructor::single_handler();
        let proxy = CompletionTrackingProxy::new(mocks.clone());
        let xhr = proxy.construct().unwrap();

        let (first, first_fired) = counting_listener();
        let (second, second_fired) = counting_listener();
        xhr.set_handler(EventKind::Load, Some(first));
        xhr.set_handler(EventKind::Load, Some(second));
        mocks.instance(0).mock_done();

        assert!(first_fired.lock().is_empty());
        assert_eq!(second_fired.lock().len(), 1);
        assert_eq!(proxy.pending(), 0);
    }

    #[test]
    fn chained_instance_cannot_be_unwrapped() {
        let mocks = MockRequestConstructor::single_handler();
        let proxy = CompletionTrackingProxy::new(mocks.clone());

        let Err(xhr) = proxy.construct().unwrap().into_inner() else {
            panic!("chained instance must stay wrapped");
        };
        let (onload, fired) = counting_listener();
        xhr.set_handler(EventKind::Load, Some(onload));
        let wait = proxy.wait_for_requests_to_finish();
        mocks.instance(0).mock_done();

        assert_eq!(fired.lock().len(), 1);
        assert_eq!(resolved(wait), Some(FinishedRequests { total_count: 1 }));
    }

    #[test]
    fn unwrapped_listener_instance_stays_tracked() {
        let mocks = MockRequestConstructor::new();
        let proxy = CompletionTrackingProxy::new(mocks.clone());
        let Ok(xhr) = proxy.construct().unwrap().into_inner() else {
            panic!("listener-observed instance unwraps");
        };

        let (onload, _) = counting_listener();
        xhr.set_handler(EventKind::Load, Some(onload));
        mocks.instance(0).mock_done();
        assert_eq!(proxy.pending(), 0);
    }

    #[test]
    fn error_and_abort_finish_requests() {
        let mocks = MockRequestConstructor::new();
        let proxy = CompletionTrackingProxy::new(mocks.clone());
        let failing = proxy.construct().unwrap();
        failing.send(None).unwrap();
        let aborted = proxy.construct().unwrap();
        aborted.send(None).unwrap();

        let wait = proxy.wait_for_requests_to_finish();
        mocks.instance(0).mock_fail();
        aborted.abort();

        assert_eq!(resolved(wait), Some(FinishedRequests { total_count: 2 }));
    }

    #[test]
    fn repeated_completion_does_not_double_count() {
        let mocks = MockRequestConstructor::new();
        let proxy = CompletionTrackingProxy::new(mocks.clone());
        proxy.construct().unwrap();
        proxy.construct().unwrap();

        let wait = proxy.wait_for_requests_to_finish();
        mocks.instance(0).mock_done();
        mocks.instance(0).mock_done();
        mocks.instance(0).mock_fail();

        assert_eq!(proxy.pending(), 1);
        assert!(wait.now_or_never().is_none());
    }

    #[test]
    fn multiple_waiters_resolve_together() {
        let mocks = MockRequestConstructor::new();
        let proxy = CompletionTrackingProxy::new(mocks.clone());
        proxy.construct().unwrap();

        let first = proxy.wait_for_requests_to_finish();
        let second = proxy.wait_for_requests_to_finish();
        mocks.instance(0).mock_done();

        let expected = Some(FinishedRequests { total_count: 1 });
        assert_eq!(resolved(first), expected);
        assert_eq!(resolved(second), expected);
    }

    struct WakeLog {
        id: usize,
        log: Arc<Mutex<Vec<usize>>>,
    }

    impl futures::task::ArcWake for WakeLog {
        fn wake_by_ref(arc_self: &Arc<Self>) {
            arc_self.log.lock().push(arc_self.id);
        }
    }

    #[test]
    fn waiters_resolve_in_query_order() {
        let mocks = MockRequestConstructor::new();
        let proxy = CompletionTrackingProxy::new(mocks.clone());
        proxy.construct().unwrap();

        let log = Arc::new(Mutex::new(Vec::new()));
        let mut waits: Vec<_> = (0..3).map(|_| proxy.wait_for_requests_to_finish()).collect();
        // polled back to front so wake order cannot just mirror poll order
        for (id, wait) in waits.iter_mut().enumerate().rev() {
            let waker = futures::task::waker(Arc::new(WakeLog {
                id,
                log: Arc::clone(&log),
            }));
            let mut cx = Context::from_waker(&waker);
            assert!(Pin::new(wait).poll(&mut cx).is_pending());
        }

        mocks.instance(0).mock_done();
        assert_eq!(*log.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn cumulative_total_spans_waves() {
        let mocks = MockRequestConstructor::new();
        let proxy = CompletionTrackingProxy::new(mocks.clone());
        proxy.construct().unwrap();
        mocks.instance(0).mock_done();

        proxy.construct().unwrap();
        let wait = proxy.wait_for_requests_to_finish();
        mocks.instance(1).mock_done();

        assert_eq!(resolved(wait), Some(FinishedRequests { total_count: 2 }));
    }

    #[test]
    fn per_wave_total_restarts_after_drain() {
        let mocks = MockRequestConstructor::new();
        let config = TrackerConfig::new().with_count_mode(CountMode::PerWave);
        let proxy = CompletionTrackingProxy::with_config(mocks.clone(), config);
        proxy.construct().unwrap();
        proxy.construct().unwrap();
        mocks.instance(0).mock_done();
        mocks.instance(1).mock_done();

        assert_eq!(
            resolved(proxy.wait_for_requests_to_finish()),
            Some(FinishedRequests { total_count: 2 })
        );

        proxy.construct().unwrap();
        let wait = proxy.wait_for_requests_to_finish();
        mocks.instance(2).mock_done();
        assert_eq!(resolved(wait), Some(FinishedRequests { total_count: 1 }));
    }

    #[test]
    fn constructor_failure_propagates_untracked() {
        let proxy = CompletionTrackingProxy::new(MockRequestConstructor::failing("no network"));

        let err = proxy.construct().unwrap_err();
        assert!(matches!(err, HostError::Transport(message) if message == "no network"));
        assert_eq!(proxy.total_started(), 0);
        assert_eq!(proxy.pending(), 0);
    }

    /// Reports `load` while its load listener is being registered, then
    /// rejects the remaining listeners
    struct EagerHost {
        eager: bool,
        events: docload_host::EventDispatch,
    }

    impl EventTarget for EagerHost {
        fn add_event_listener(&self, kind: EventKind, listener: Listener) -> Result<(), HostError> {
            if !self.eager {
                self.events.add_listener(kind, listener);
                return Ok(());
            }
            match kind {
                EventKind::Load => {
                    listener(EventKind::Load);
                    Ok(())
                }
                _ => Err(HostError::invalid_state("listeners closed")),
            }
        }

        fn set_handler(&self, kind: EventKind, handler: Option<Listener>) {
            self.events.set_handler(kind, handler);
        }

        fn handler(&self, kind: EventKind) -> Option<Listener> {
            self.events.handler(kind)
        }
    }

    #[test]
    fn failed_registration_after_early_finish_keeps_other_counts() {
        let created = std::sync::atomic::AtomicUsize::new(0);
        let proxy = CompletionTrackingProxy::new(docload_host::from_fn(move || {
            Ok(EagerHost {
                eager: created.fetch_add(1, Ordering::SeqCst) == 1,
                events: docload_host::EventDispatch::new(),
            })
        }));

        let steady = proxy.construct().unwrap();
        assert!(matches!(proxy.construct(), Err(HostError::InvalidState(_))));
        assert_eq!(proxy.pending(), 1);

        let wait = proxy.wait_for_requests_to_finish();
        steady.get_ref().events.dispatch(EventKind::Load);
        assert_eq!(resolved(wait), Some(FinishedRequests { total_count: 2 }));
    }

    #[test]
    fn separate_proxies_do_not_share_state() {
        let mocks = MockRequestConstructor::new();
        let busy = CompletionTrackingProxy::new(mocks.clone());
        let idle = CompletionTrackingProxy::new(mocks);
        busy.construct().unwrap();

        assert_eq!(busy.pending(), 1);
        assert_eq!(
            resolved(idle.wait_for_requests_to_finish()),
            Some(FinishedRequests { total_count: 0 })
        );
    }

    #[test]
    fn clones_share_state() {
        let mocks = MockRequestConstructor::new();
        let proxy = CompletionTrackingProxy::new(mocks.clone());
        let shared = proxy.clone();
        shared.construct().unwrap();

        let wait = proxy.wait_for_requests_to_finish();
        mocks.instance(0).mock_done();
        assert_eq!(resolved(wait), Some(FinishedRequests { total_count: 1 }));
    }

    #[test]
    fn abandoned_waiter_reports_error() {
        let mocks = MockRequestConstructor::new();
        let proxy = CompletionTrackingProxy::new(mocks.clone());
        proxy.construct().unwrap();
        let wait = proxy.wait_for_requests_to_finish();

        drop(proxy);
        drop(mocks);

        let result = wait.now_or_never().unwrap();
        assert!(matches!(result, Err(ProxyError::Abandoned { pending: 1 })));
    }

    #[test]
    fn finished_requests_serializes_camel_case() {
        let json = serde_json::to_string(&FinishedRequests { total_count: 2 }).unwrap();
        assert_eq!(json, r#"{"totalCount":2}"#);
    }
}
