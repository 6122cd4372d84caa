//! Handler registry and the worker pool that drains the update queue.
//!
//! Handlers live in numbered groups, run in ascending group order. Within a
//! group the first handler whose kind and filter match gets the update; its
//! result steers the rest of the pass:
//!
//! | Result                               | Effect                               |
//! |--------------------------------------|--------------------------------------|
//! | `Ok(())` or `Err(Failed(_))`         | move on to the next group            |
//! | `Err(ContinuePropagation)`           | try the next handler of this group   |
//! | `Err(StopPropagation)`               | end the pass                         |
//!
//! Every worker holds a shared lock on the group table for the whole pass;
//! adding or removing a handler takes it exclusively, so an edit waits for
//! running passes and holds back new ones until it is done. An edit made from
//! inside a handler cannot wait for its own pass: it is queued and applied,
//! still exclusively, as soon as that pass releases the table.

use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError};

use tokio::sync::{Mutex, RwLock, mpsc};
use tokio_util::task::TaskTracker;

use crate::cache::BoundedCache;
use crate::errors::HandlerError;
use crate::peers::PeerCache;
use crate::transport::BoxFuture;
use crate::update::{Envelope, MessageCache, Update, classify};

/// Upper bound on the default worker count.
const MAX_DEFAULT_WORKERS: usize = 32;

/// `min(32, cores + 4)`.
pub fn default_workers() -> usize {
    let cores = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
    MAX_DEFAULT_WORKERS.min(cores + 4)
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

/// Which updates a handler receives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    NewMessage,
    MessageEdited,
    MessageDeleted,
    CallbackQuery,
    UserStatus,
    InlineQuery,
    ChosenInlineResult,
    Poll,
    ChatMember,
    JoinRequest,
    Story,
    Reaction,
    BusinessConnection,
    /// Every update, as [`Update::Raw`] with its reference tables.
    Raw,
}

impl Update {
    pub fn kind(&self) -> HandlerKind {
        match self {
            Self::NewMessage(_) => HandlerKind::NewMessage,
            Self::MessageEdited(_) => HandlerKind::MessageEdited,
            Self::MessageDeleted(_) => HandlerKind::MessageDeleted,
            Self::CallbackQuery(_) => HandlerKind::CallbackQuery,
            Self::UserStatus(_) => HandlerKind::UserStatus,
            Self::InlineQuery(_) => HandlerKind::InlineQuery,
            Self::ChosenInlineResult(_) => HandlerKind::ChosenInlineResult,
            Self::Poll(_) => HandlerKind::Poll,
            Self::ChatMember(_) => HandlerKind::ChatMember,
            Self::JoinRequest(_) => HandlerKind::JoinRequest,
            Self::Story(_) => HandlerKind::Story,
            Self::Reaction(_) => HandlerKind::Reaction,
            Self::BusinessConnection(_) => HandlerKind::BusinessConnection,
            Self::Raw(_) => HandlerKind::Raw,
        }
    }
}

type Callback = Arc<dyn Fn(Update) -> BoxFuture<'static, Result<(), HandlerError>> + Send + Sync>;
type Filter = Arc<dyn Fn(&Update) -> bool + Send + Sync>;

/// A callback plus what it accepts.
#[derive(Clone)]
pub struct Handler {
    kind:     HandlerKind,
    filter:   Option<Filter>,
    callback: Callback,
}

impl Handler {
    pub fn new<F, Fut>(kind: HandlerKind, callback: F) -> Self
    where
        F: Fn(Update) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        Self { kind, filter: None, callback: Arc::new(move |u| Box::pin(callback(u))) }
    }

    /// Only accept updates for which `filter` returns `true`.
    pub fn filter(mut self, filter: impl Fn(&Update) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn kind(&self) -> HandlerKind {
        self.kind
    }

    fn accepts(&self, update: &Update) -> bool {
        self.filter.as_ref().is_none_or(|f| f(update))
    }
}

/// Returned by [`Dispatcher::add_handler`]; pass it back to remove.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

struct Registered {
    id:      HandlerId,
    handler: Handler,
}

enum Edit {
    Add(i32, Registered),
    Remove(HandlerId),
}

impl Edit {
    fn apply(self, groups: &mut BTreeMap<i32, Vec<Registered>>) {
        match self {
            Self::Add(group, registered) => groups.entry(group).or_default().push(registered),
            Self::Remove(id) => groups.retain(|_, handlers| {
                handlers.retain(|r| r.id != id);
                !handlers.is_empty()
            }),
        }
    }
}

tokio::task_local! {
    /// Set while a dispatch pass runs its handlers.
    static IN_PASS: ();
}

fn in_pass() -> bool {
    IN_PASS.try_with(|_| ()).is_ok()
}

// ─── Dispatcher ───────────────────────────────────────────────────────────────

pub struct Dispatcher {
    groups:   RwLock<BTreeMap<i32, Vec<Registered>>>,
    /// Edits made by handlers, applied in order after their pass.
    deferred: std::sync::Mutex<Vec<Edit>>,
    /// Registered ids, queued additions included.
    live:     std::sync::Mutex<HashSet<HandlerId>>,
    next_id:  AtomicU64,
    peers:    Arc<PeerCache>,
    messages: MessageCache,
    workers:  TaskTracker,
}

impl Dispatcher {
    /// `message_cache_size` bounds the recently-seen messages attached to
    /// edits and deletions.
    pub fn new(peers: Arc<PeerCache>, message_cache_size: usize) -> Self {
        Self {
            groups:   RwLock::new(BTreeMap::new()),
            deferred: std::sync::Mutex::new(Vec::new()),
            live:     std::sync::Mutex::new(HashSet::new()),
            next_id:  AtomicU64::new(1),
            peers,
            messages: std::sync::Mutex::new(BoundedCache::new(message_cache_size)),
            workers:  TaskTracker::new(),
        }
    }

    /// Register `handler` in `group`. Waits for in-flight passes to finish;
    /// called from a handler, it returns at once and the handler joins from
    /// the next pass on.
    pub async fn add_handler(&self, group: i32, handler: Handler) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.live.lock().unwrap_or_else(PoisonError::into_inner).insert(id);
        self.edit(Edit::Add(group, Registered { id, handler })).await;
        id
    }

    /// Returns `false` if no handler with `id` is registered. Same waiting
    /// rules as [`Self::add_handler`].
    pub async fn remove_handler(&self, id: HandlerId) -> bool {
        let known = self.live.lock().unwrap_or_else(PoisonError::into_inner).remove(&id);
        if known {
            self.edit(Edit::Remove(id)).await;
        }
        known
    }

    async fn edit(&self, edit: Edit) {
        if in_pass() {
            tracing::debug!("[courier] handler edit from inside a pass; deferring it");
            self.deferred.lock().unwrap_or_else(PoisonError::into_inner).push(edit);
            return;
        }
        let mut groups = self.groups.write().await;
        // Earlier deferred edits go first.
        let mut edits = std::mem::take(&mut *self.deferred.lock().unwrap_or_else(PoisonError::into_inner));
        edits.push(edit);
        for edit in edits {
            edit.apply(&mut groups);
        }
    }

    async fn apply_deferred(&self) {
        if self.deferred.lock().unwrap_or_else(PoisonError::into_inner).is_empty() {
            return;
        }
        let mut groups = self.groups.write().await;
        let edits = std::mem::take(&mut *self.deferred.lock().unwrap_or_else(PoisonError::into_inner));
        for edit in edits {
            edit.apply(&mut groups);
        }
    }

    pub async fn handler_count(&self) -> usize {
        self.groups.read().await.values().map(Vec::len).sum()
    }

    /// Spawn `workers` tasks sharing `queue`. They exit once every sender of
    /// the queue is dropped and the queue is drained.
    pub fn start(self: &Arc<Self>, queue: mpsc::UnboundedReceiver<Envelope>, workers: usize) {
        let queue = Arc::new(Mutex::new(queue));
        let workers = workers.max(1);
        for _ in 0..workers {
            let this = Arc::clone(self);
            let queue = Arc::clone(&queue);
            self.workers.spawn(async move {
                loop {
                    let next = queue.lock().await.recv().await;
                    let Some(env) = next else { break };
                    this.dispatch(env).await;
                }
            });
        }
        tracing::info!("[courier] started {workers} update worker(s)");
    }

    /// Wait for the workers to drain the queue and exit.
    pub async fn stop(&self) {
        self.workers.close();
        self.workers.wait().await;
        tracing::info!("[courier] update workers stopped");
    }

    /// One dispatch pass over all groups.
    pub async fn dispatch(&self, env: Envelope) {
        IN_PASS.scope((), self.pass(env)).await;
        self.apply_deferred().await;
    }

    async fn pass(&self, env: Envelope) {
        let raw = env.clone();
        let update = classify(env, &self.peers, &self.messages);
        let kind = update.kind();

        let groups = self.groups.read().await;
        'groups: for (group, handlers) in groups.iter() {
            for registered in handlers {
                let event = match registered.handler.kind {
                    HandlerKind::Raw => Update::Raw(raw.clone()),
                    k if k == kind => update.clone(),
                    _ => continue,
                };
                if !registered.handler.accepts(&event) {
                    continue;
                }
                match (registered.handler.callback)(event).await {
                    Ok(()) => {}
                    Err(HandlerError::ContinuePropagation) => continue,
                    Err(HandlerError::StopPropagation) => break 'groups,
                    Err(HandlerError::Failed(e)) => {
                        tracing::error!("[courier] handler in group {group} failed: {e}");
                    }
                }
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use courier_tl_types::types;

    #[test]
    fn default_worker_count_is_capped() {
        let n = default_workers();
        assert!((5..=32).contains(&n));
    }

    #[tokio::test]
    async fn removing_the_last_handler_drops_the_group() {
        let d = Dispatcher::new(Arc::new(PeerCache::new(Arc::new(MemoryStorage::new()))), 8);
        let a = d.add_handler(0, Handler::new(HandlerKind::Raw, |_| async { Ok(()) })).await;
        let b = d.add_handler(0, Handler::new(HandlerKind::Raw, |_| async { Ok(()) })).await;
        assert_eq!(d.handler_count().await, 2);

        assert!(d.remove_handler(a).await);
        assert!(!d.remove_handler(a).await);
        assert!(d.remove_handler(b).await);
        assert!(d.groups.read().await.is_empty());

        // Dispatching with no handlers is a no-op.
        d.dispatch(Envelope::bare(types::UpdateMessageId { id: 1, random_id: 1 }.into())).await;
    }
}
