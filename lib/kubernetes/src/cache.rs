//! Local, watch driven mirrors of Kubernetes object collections.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::{Arc, Weak};

use futures::channel::mpsc::{UnboundedSender, unbounded};
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::{FutureExt, Stream, StreamExt};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::resource::{Resource, object_key};
use crate::watch::Event;

/// A change applied to a cache.
#[derive(Debug)]
pub enum Change<R> {
    Added(Arc<R>),
    Updated { old: Arc<R>, new: Arc<R> },
    Deleted(Arc<R>),
}

impl<R> Clone for Change<R> {
    fn clone(&self) -> Self {
        match self {
            Change::Added(obj) => Change::Added(Arc::clone(obj)),
            Change::Updated { old, new } => Change::Updated {
                old: Arc::clone(old),
                new: Arc::clone(new),
            },
            Change::Deleted(obj) => Change::Deleted(Arc::clone(obj)),
        }
    }
}

/// A change together with the cache revision it produced.
#[derive(Clone, Debug)]
pub struct Notification<R> {
    pub revision: u64,
    pub change: Change<R>,
}

/// Everything a cache holds at one revision, ordered by object key.
#[derive(Debug)]
pub struct Snapshot<R> {
    pub revision: u64,
    pub objects: Vec<Arc<R>>,
}

/// Handlers are called synchronously, in mutation order, while the cache is
/// locked. They must not call back into the cache.
pub type Handler<R> = Box<dyn Fn(Notification<R>) + Send + Sync>;

/// Read access to a synchronized collection of objects.
pub trait Cache<R>: Send + Sync {
    /// All cached objects and the revision they reflect.
    fn list(&self) -> Snapshot<R>;

    /// Point lookup from the local snapshot.
    fn get(&self, namespace: &str, name: &str) -> Option<Arc<R>>;

    /// Whether the initial listing has completed.
    fn has_synced(&self) -> bool;

    /// Registers `handler` for every following change, until the returned
    /// `Subscription` is dropped.
    fn subscribe(&self, handler: Handler<R>) -> Subscription;

    /// The watch loop, it runs until `shutdown` is cancelled or the
    /// underlying stream ends.
    fn run(&self, shutdown: CancellationToken) -> BoxFuture<'static, ()>;
}

trait Unsubscribe: Send + Sync {
    fn unsubscribe(&self, id: u64);
}

/// Keeps a handler registered, dropping it unregisters the handler.
pub struct Subscription {
    id: u64,
    registry: Weak<dyn Unsubscribe>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.unsubscribe(self.id);
        }
    }
}

struct State<R> {
    objects: BTreeMap<String, Arc<R>>,
    // buffered objects between `Init` and `InitDone`
    relist: Option<BTreeMap<String, Arc<R>>>,
    revision: u64,
    synced: bool,

    next_handler: u64,
    handlers: Vec<(u64, Handler<R>)>,
}

impl<R> State<R> {
    fn notify(&mut self, change: Change<R>) {
        self.revision += 1;

        for (_id, handler) in &self.handlers {
            handler(Notification {
                revision: self.revision,
                change: change.clone(),
            });
        }
    }

    /// Replace the content with a fresh listing, anything not listed is
    /// considered deleted.
    fn replace(&mut self, listed: BTreeMap<String, Arc<R>>) {
        let old = std::mem::take(&mut self.objects);

        for (key, obj) in &old {
            if !listed.contains_key(key) {
                self.notify(Change::Deleted(Arc::clone(obj)));
            }
        }

        for (key, obj) in &listed {
            let change = match old.get(key) {
                Some(old) => Change::Updated {
                    old: Arc::clone(old),
                    new: Arc::clone(obj),
                },
                None => Change::Added(Arc::clone(obj)),
            };

            self.notify(change);
        }

        self.objects = listed;
    }
}

type Source<R> = BoxStream<'static, Result<Event<R>, String>>;

struct Inner<R> {
    state: Mutex<State<R>>,
    source: Mutex<Option<Source<R>>>,
}

impl<R: Send + Sync> Unsubscribe for Inner<R> {
    fn unsubscribe(&self, id: u64) {
        self.state
            .lock()
            .handlers
            .retain(|(handler_id, _)| *handler_id != id);
    }
}

/// An in-memory cache adapter fed by a stream of watch events.
pub struct Store<R> {
    inner: Arc<Inner<R>>,
}

impl<R> Clone for Store<R> {
    fn clone(&self) -> Self {
        Store {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> Store<R>
where
    R: Resource + Send + Sync + 'static,
{
    /// Creates a store which mirrors `stream` once it runs. Stream errors are
    /// logged and skipped, recovering the stream is up to the stream itself.
    pub fn new<S, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<Event<R>, E>> + Send + 'static,
        E: Display,
    {
        let source = stream.map(|result| result.map_err(|err| err.to_string()));

        Store {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    objects: BTreeMap::new(),
                    relist: None,
                    revision: 0,
                    synced: false,
                    next_handler: 0,
                    handlers: vec![],
                }),
                source: Mutex::new(Some(source.boxed())),
            }),
        }
    }

    /// Creates a store fed by an in-process channel, events sent before `run`
    /// is called are buffered.
    pub fn channel() -> (Self, UnboundedSender<Event<R>>) {
        let (tx, rx) = unbounded();
        let store = Store::new(rx.map(Ok::<_, std::convert::Infallible>));

        (store, tx)
    }

    /// Applies one watch event.
    pub fn apply(&self, event: Event<R>) {
        let mut state = self.inner.state.lock();

        match event {
            Event::Apply(obj) => {
                let obj = Arc::new(obj);
                let change = match state.objects.insert(obj.metadata().key(), Arc::clone(&obj)) {
                    Some(old) => Change::Updated { old, new: obj },
                    None => Change::Added(obj),
                };

                state.notify(change);
            }
            Event::Deleted(obj) => {
                let key = obj.metadata().key();
                if state.objects.remove(&key).is_none() {
                    debug!(message = "delete unknown object", kind = R::KIND, %key);
                    return;
                }

                state.notify(Change::Deleted(Arc::new(obj)));
            }
            Event::Init => {
                state.relist = Some(BTreeMap::new());
            }
            Event::InitApply(obj) => match state.relist.as_mut() {
                Some(relist) => {
                    relist.insert(obj.metadata().key(), Arc::new(obj));
                }
                None => {
                    debug!(message = "listed object without init", kind = R::KIND);
                }
            },
            Event::InitDone => {
                if let Some(relist) = state.relist.take() {
                    state.replace(relist);
                }

                if !state.synced {
                    state.synced = true;
                    info!(
                        message = "cache synced",
                        kind = R::KIND,
                        objects = state.objects.len()
                    );
                }
            }
        }
    }
}

impl<R> Cache<R> for Store<R>
where
    R: Resource + Send + Sync + 'static,
{
    fn list(&self) -> Snapshot<R> {
        let state = self.inner.state.lock();

        Snapshot {
            revision: state.revision,
            objects: state.objects.values().cloned().collect(),
        }
    }

    fn get(&self, namespace: &str, name: &str) -> Option<Arc<R>> {
        self.inner
            .state
            .lock()
            .objects
            .get(&object_key(namespace, name))
            .cloned()
    }

    fn has_synced(&self) -> bool {
        self.inner.state.lock().synced
    }

    fn subscribe(&self, handler: Handler<R>) -> Subscription {
        let id = {
            let mut state = self.inner.state.lock();
            let id = state.next_handler;
            state.next_handler += 1;
            state.handlers.push((id, handler));
            id
        };

        let inner: Arc<dyn Unsubscribe> = self.inner.clone();
        Subscription {
            id,
            registry: Arc::downgrade(&inner),
        }
    }

    fn run(&self, shutdown: CancellationToken) -> BoxFuture<'static, ()> {
        let store = self.clone();

        async move {
            let Some(mut stream) = store.inner.source.lock().take() else {
                warn!(message = "watch loop is already running", kind = R::KIND);
                return;
            };

            debug!(message = "start watching", kind = R::KIND);

            loop {
                let event = tokio::select! {
                    biased;

                    _ = shutdown.cancelled() => break,
                    result = stream.next() => match result {
                        Some(Ok(event)) => event,
                        Some(Err(err)) => {
                            warn!(message = "watch event failed", %err, kind = R::KIND);
                            continue;
                        }
                        None => break,
                    }
                };

                store.apply(event);
            }

            debug!(message = "stop watching", kind = R::KIND);
        }
        .boxed()
    }
}
