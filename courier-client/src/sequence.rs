//! Update sequencing: gap detection and difference-based recovery.
//!
//! Every scope (the account-wide state, or one channel) carries a local
//! **pts**. A scoped update with `pts` and `pts_count` is applied only when
//! `local == pts - pts_count`. Anything older is a duplicate; anything newer
//! means updates were missed and the scope is recovered with
//! `updates.getDifference` / `updates.getChannelDifference` before live
//! processing resumes.
//!
//! The [`Sequencer`] is owned by a single task, so the read-check-write of a
//! gap test never races with another one.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Arc;

use courier_tl_types::{enums, functions, types};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::errors::InvocationError;
use crate::peers::{self, PeerCache};
use crate::session::Push;
use crate::storage::{GLOBAL_SCOPE, Storage, UpdateState};
use crate::update::{Envelope, tables};

const BOT_CHANNEL_LIMIT: i32 = 10_000;
const USER_CHANNEL_LIMIT: i32 = 100;

/// Where recovery fetches differences from.
pub trait DifferenceSource: Send + Sync + 'static {
    fn get_state(&self) -> impl Future<Output = Result<enums::updates::State, InvocationError>> + Send;

    fn get_difference(
        &self,
        req: functions::updates::GetDifference,
    ) -> impl Future<Output = Result<enums::updates::Difference, InvocationError>> + Send;

    fn get_channel_difference(
        &self,
        req: functions::updates::GetChannelDifference,
    ) -> impl Future<Output = Result<enums::updates::ChannelDifference, InvocationError>> + Send;
}

// ─── Gap check ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GapCheck {
    Apply,
    /// Already seen.
    Duplicate,
    /// `local` is behind the `expected` predecessor.
    Gap { local: i32, expected: i32 },
}

/// `local` is `None` when the scope has no state yet; the first update then
/// becomes the baseline.
pub fn check_gap(local: Option<i32>, pts: i32, pts_count: i32) -> GapCheck {
    let Some(local) = local else { return GapCheck::Apply };
    let expected = pts - pts_count;
    if local == expected {
        GapCheck::Apply
    } else if local > expected {
        GapCheck::Duplicate
    } else {
        GapCheck::Gap { local, expected }
    }
}

/// `(scope, pts, pts_count)` of an update that is pts-sequenced.
fn sequencing(update: &enums::Update) -> Option<(i64, i32, i32)> {
    use enums::Update as U;
    let channel_of = |m: &enums::Message| match m.peer_id() {
        Some(p @ enums::Peer::Channel(_)) => peers::marked_id(p),
        _ => GLOBAL_SCOPE,
    };
    match update {
        U::NewMessage(u) => Some((GLOBAL_SCOPE, u.pts, u.pts_count)),
        U::EditMessage(u) => Some((GLOBAL_SCOPE, u.pts, u.pts_count)),
        U::DeleteMessages(u) => Some((GLOBAL_SCOPE, u.pts, u.pts_count)),
        U::NewChannelMessage(u) => Some((channel_of(&u.message), u.pts, u.pts_count)),
        U::EditChannelMessage(u) => Some((channel_of(&u.message), u.pts, u.pts_count)),
        U::DeleteChannelMessages(u) => Some((peers::channel_marked(u.channel_id), u.pts, u.pts_count)),
        _ => None,
    }
}

/// `qts` of bot-facing updates, which is tracked but not gap-checked.
fn qts_of(update: &enums::Update) -> Option<i32> {
    use enums::Update as U;
    match update {
        U::MessagePollVote(u) => Some(u.qts),
        U::ChatParticipant(u) => Some(u.qts),
        U::ChannelParticipant(u) => Some(u.qts),
        U::BotChatInviteRequester(u) => Some(u.qts),
        U::BotMessageReaction(u) => Some(u.qts),
        U::BotBusinessConnect(u) => Some(u.qts),
        U::BotNewBusinessMessage(u) => Some(u.qts),
        U::BotEditBusinessMessage(u) => Some(u.qts),
        U::BotDeleteBusinessMessage(u) => Some(u.qts),
        _ => None,
    }
}

fn short_message(m: types::UpdateShortMessage) -> enums::Update {
    let peer: enums::Peer = types::PeerUser { user_id: m.user_id }.into();
    // Outgoing short messages were sent by us, not by `user_id`.
    let from_id = (!m.out).then(|| peer.clone());
    let message = types::Message {
        out:          m.out,
        mentioned:    m.mentioned,
        media_unread: m.media_unread,
        silent:       m.silent,
        from_id,
        fwd_from:     m.fwd_from,
        via_bot_id:   m.via_bot_id,
        reply_to:     m.reply_to,
        entities:     m.entities,
        ttl_period:   m.ttl_period,
        ..types::Message::new(m.id, peer, m.date, m.message)
    };
    types::UpdateNewMessage { message: message.into(), pts: m.pts, pts_count: m.pts_count }.into()
}

fn short_chat_message(m: types::UpdateShortChatMessage) -> enums::Update {
    let peer: enums::Peer = types::PeerChat { chat_id: m.chat_id }.into();
    let message = types::Message {
        out:          m.out,
        mentioned:    m.mentioned,
        media_unread: m.media_unread,
        silent:       m.silent,
        from_id:      Some(types::PeerUser { user_id: m.from_id }.into()),
        fwd_from:     m.fwd_from,
        via_bot_id:   m.via_bot_id,
        reply_to:     m.reply_to,
        entities:     m.entities,
        ttl_period:   m.ttl_period,
        ..types::Message::new(m.id, peer, m.date, m.message)
    };
    types::UpdateNewMessage { message: message.into(), pts: m.pts, pts_count: m.pts_count }.into()
}

// ─── Sequencer ────────────────────────────────────────────────────────────────

pub struct SequencerConfig {
    pub is_bot:  bool,
    /// Persist accepted state and recover from it at start.
    pub persist: bool,
}

/// Turns raw pushes into gap-free [`Envelope`]s.
pub struct Sequencer<S> {
    source:  S,
    peers:   Arc<PeerCache>,
    storage: Arc<dyn Storage>,
    config:  SequencerConfig,
    states:  HashMap<i64, UpdateState>,
    out:     mpsc::UnboundedSender<Envelope>,
}

impl<S: DifferenceSource> Sequencer<S> {
    pub fn new(
        source:  S,
        peers:   Arc<PeerCache>,
        storage: Arc<dyn Storage>,
        config:  SequencerConfig,
        out:     mpsc::UnboundedSender<Envelope>,
    ) -> Self {
        Self { source, peers, storage, config, states: HashMap::new(), out }
    }

    /// Local state of `scope`, if any.
    pub fn state(&self, scope: i64) -> Option<UpdateState> {
        self.states.get(&scope).copied()
    }

    /// Load persisted state and catch up on everything missed while offline.
    /// Does nothing unless state is persisted.
    pub async fn resume(&mut self) {
        if !self.config.persist {
            return;
        }
        match self.storage.states() {
            Ok(states) => {
                for state in states {
                    self.states.insert(state.scope, state);
                }
            }
            Err(e) => tracing::warn!("[courier] could not load update state: {e}"),
        }
        tracing::info!("[courier] resuming {} update scope(s)", self.states.len());
        self.recover_all().await;
    }

    /// Consume pushes until `cancel` fires or the session side closes.
    pub async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Push>, cancel: CancellationToken) {
        loop {
            let push = tokio::select! {
                _ = cancel.cancelled() => return,
                push = rx.recv() => push,
            };
            match push {
                Some(push) => self.handle(push).await,
                None => return,
            }
        }
    }

    pub async fn handle(&mut self, push: Push) {
        match push {
            Push::Updates(updates) => self.handle_updates(updates).await,
            Push::SessionCreated | Push::Reconnected => self.recover_all().await,
        }
    }

    async fn handle_updates(&mut self, updates: enums::Updates) {
        match updates {
            enums::Updates::TooLong(_) => {
                tracing::info!("[courier] updatesTooLong; fetching difference");
                self.recover(GLOBAL_SCOPE).await;
            }
            enums::Updates::UpdateShortMessage(m) => {
                let date = m.date;
                self.process(Envelope::bare(short_message(m)), date).await;
            }
            enums::Updates::UpdateShortChatMessage(m) => {
                let date = m.date;
                self.process(Envelope::bare(short_chat_message(m)), date).await;
            }
            enums::Updates::UpdateShort(u) => self.process(Envelope::bare(u.update), u.date).await,
            enums::Updates::Combined(u) => {
                self.batch(u.updates, &u.users, &u.chats, u.date, u.seq_start, u.seq).await;
            }
            enums::Updates::Updates(u) => {
                self.batch(u.updates, &u.users, &u.chats, u.date, u.seq, u.seq).await;
            }
            enums::Updates::UpdateShortSentMessage(s) => {
                // Only the pts advances; there is nothing to dispatch.
                match check_gap(self.pts(GLOBAL_SCOPE), s.pts, s.pts_count) {
                    GapCheck::Apply => self.advance(GLOBAL_SCOPE, |st| {
                        st.pts = s.pts;
                        st.date = s.date;
                    }),
                    GapCheck::Duplicate => {}
                    GapCheck::Gap { .. } => self.recover(GLOBAL_SCOPE).await,
                }
            }
        }
    }

    async fn batch(
        &mut self,
        updates:   Vec<enums::Update>,
        users:     &[enums::User],
        chats:     &[enums::Chat],
        date:      i32,
        seq_start: i32,
        seq:       i32,
    ) {
        self.remember_peers(users, chats);

        // seq = 0 means the container is not seq-ordered.
        if seq != 0 {
            let local = self.states.get(&GLOBAL_SCOPE).map(|s| s.seq).filter(|s| *s != 0);
            match local {
                Some(local) if seq_start <= local => {
                    tracing::debug!("[courier] duplicate updates container (seq {seq_start}..={seq}, local {local})");
                    return;
                }
                Some(local) if seq_start > local + 1 => {
                    tracing::warn!("[courier] seq gap: local {local}, container starts at {seq_start}");
                    self.recover(GLOBAL_SCOPE).await;
                    return;
                }
                _ => {}
            }
        }

        let (users, chats) = tables(users, chats);
        for update in updates {
            self.process(Envelope::new(update, Arc::clone(&users), Arc::clone(&chats)), date).await;
        }
        if seq != 0 {
            self.advance(GLOBAL_SCOPE, |st| {
                st.seq = seq;
                st.date = st.date.max(date);
            });
        }
    }

    async fn process(&mut self, env: Envelope, date: i32) {
        if let enums::Update::ChannelTooLong(u) = &env.update {
            let scope = peers::channel_marked(u.channel_id);
            tracing::info!("[courier] channel {} too long; fetching difference", u.channel_id);
            self.recover_in(scope, &env.chats).await;
            return;
        }
        if let Some(qts) = qts_of(&env.update) {
            self.advance(GLOBAL_SCOPE, |st| st.qts = st.qts.max(qts));
        }
        let Some((scope, pts, pts_count)) = sequencing(&env.update) else {
            self.emit(env);
            return;
        };

        match check_gap(self.pts(scope), pts, pts_count) {
            GapCheck::Apply => {}
            GapCheck::Duplicate => {
                tracing::debug!("[courier] duplicate update in scope {scope} (pts {pts})");
                return;
            }
            GapCheck::Gap { local, expected } => {
                tracing::warn!("[courier] gap in scope {scope}: local pts {local}, expected {expected}");
                self.recover_in(scope, &env.chats).await;
                // Recovery may have delivered this update already, or reset
                // the scope so that this update is its new baseline.
                if check_gap(self.pts(scope), pts, pts_count) != GapCheck::Apply {
                    return;
                }
            }
        }
        self.advance(scope, |st| {
            st.pts = pts;
            if scope == GLOBAL_SCOPE && date != 0 {
                st.date = date;
            }
        });
        self.emit(env);
    }

    // ─── State ────────────────────────────────────────────────────────────────

    fn pts(&self, scope: i64) -> Option<i32> {
        self.states.get(&scope).map(|s| s.pts)
    }

    fn advance(&mut self, scope: i64, edit: impl FnOnce(&mut UpdateState)) {
        let state = self.states.entry(scope).or_insert(UpdateState { scope, ..Default::default() });
        edit(state);
        let state = *state;
        self.persist(state);
    }

    fn persist(&self, state: UpdateState) {
        if self.config.persist {
            if let Err(e) = self.storage.set_state(state) {
                tracing::warn!("[courier] could not persist state of scope {}: {e}", state.scope);
            }
        }
    }

    fn remember_peers(&self, users: &[enums::User], chats: &[enums::Chat]) {
        if let Err(e) = self.peers.upsert_users(users).and_then(|_| self.peers.upsert_chats(chats)) {
            tracing::warn!("[courier] could not cache peers: {e}");
        }
    }

    fn emit(&self, env: Envelope) {
        if self.out.send(env).is_err() {
            tracing::debug!("[courier] update dropped: dispatcher is gone");
        }
    }

    fn inject(
        &self,
        messages: Vec<enums::Message>,
        others:   Vec<enums::Update>,
        users:    &[enums::User],
        chats:    &[enums::Chat],
        pts:      i32,
    ) -> Vec<i64> {
        self.remember_peers(users, chats);
        let (users, chats) = tables(users, chats);
        let envelope = |update| Envelope::new(update, Arc::clone(&users), Arc::clone(&chats));

        for message in messages {
            let update: enums::Update = match message.peer_id() {
                Some(enums::Peer::Channel(_)) => {
                    types::UpdateNewChannelMessage { message, pts, pts_count: -1 }.into()
                }
                _ => types::UpdateNewMessage { message, pts, pts_count: -1 }.into(),
            };
            self.emit(envelope(update));
        }

        let mut too_long = Vec::new();
        for update in others {
            match update {
                enums::Update::ChannelTooLong(u) => too_long.push(peers::channel_marked(u.channel_id)),
                other => self.emit(envelope(other)),
            }
        }
        too_long
    }

    // ─── Recovery ─────────────────────────────────────────────────────────────

    /// Catch up every known scope.
    pub async fn recover_all(&mut self) {
        let mut scopes: Vec<i64> = self.states.keys().copied().collect();
        // Global first; channel scopes are negative.
        scopes.sort_unstable_by(|a, b| b.cmp(a));
        for scope in scopes {
            self.recover(scope).await;
        }
    }

    /// Recover `scope` and every channel the server reports as too long
    /// along the way.
    pub async fn recover(&mut self, scope: i64) {
        self.recover_in(scope, &HashMap::new()).await;
    }

    /// [`Self::recover`], taking channel access data missing from the cache
    /// from `chats`, the table of the update that triggered recovery.
    async fn recover_in(&mut self, scope: i64, chats: &HashMap<i64, enums::Chat>) {
        let mut queue = VecDeque::from([scope]);
        while let Some(scope) = queue.pop_front() {
            let result = if scope == GLOBAL_SCOPE {
                self.recover_global().await
            } else {
                self.recover_channel(scope, chats).await
            };
            match result {
                Ok(more) => {
                    for scope in more {
                        if !queue.contains(&scope) {
                            queue.push_back(scope);
                        }
                    }
                }
                // Updates in a layout this schema cannot read are lost;
                // resume from the server's current state instead.
                Err(InvocationError::Deserialize(e)) if scope == GLOBAL_SCOPE => {
                    tracing::warn!("[courier] difference did not decode ({e}); adopting the server state");
                    if let Err(e) = self.rebase_global().await {
                        tracing::warn!("[courier] could not fetch the server state: {e}");
                    }
                }
                Err(e) => tracing::warn!("[courier] recovery of scope {scope} failed: {e}"),
            }
        }
    }

    async fn rebase_global(&mut self) -> Result<(), InvocationError> {
        let enums::updates::State::State(s) = self.source.get_state().await?;
        self.advance(GLOBAL_SCOPE, |st| {
            st.pts = s.pts;
            st.qts = s.qts;
            st.date = s.date;
            st.seq = s.seq;
        });
        Ok(())
    }

    async fn recover_global(&mut self) -> Result<Vec<i64>, InvocationError> {
        let Some(mut state) = self.states.get(&GLOBAL_SCOPE).copied() else {
            // Nothing to recover from: adopt the server's state as baseline.
            self.rebase_global().await?;
            return Ok(Vec::new());
        };

        let mut channels = Vec::new();
        let (mut messages, mut others) = (0usize, 0usize);
        loop {
            let req = functions::updates::GetDifference {
                pts:             state.pts,
                pts_limit:       None,
                pts_total_limit: None,
                date:            state.date,
                qts:             state.qts,
                qts_limit:       None,
            };
            match self.source.get_difference(req).await? {
                enums::updates::Difference::Empty(d) => {
                    state.date = d.date;
                    state.seq = d.seq;
                    break;
                }
                enums::updates::Difference::Difference(d) => {
                    let enums::updates::State::State(s) = d.state;
                    messages += d.new_messages.len();
                    others += d.other_updates.len();
                    channels.extend(self.inject(d.new_messages, d.other_updates, &d.users, &d.chats, s.pts));
                    (state.pts, state.qts, state.date, state.seq) = (s.pts, s.qts, s.date, s.seq);
                    break;
                }
                enums::updates::Difference::Slice(d) => {
                    let enums::updates::State::State(s) = d.intermediate_state;
                    messages += d.new_messages.len();
                    others += d.other_updates.len();
                    channels.extend(self.inject(d.new_messages, d.other_updates, &d.users, &d.chats, s.pts));
                    if s.pts == state.pts {
                        tracing::warn!("[courier] difference made no progress at pts {}; giving up", s.pts);
                        break;
                    }
                    (state.pts, state.qts, state.date, state.seq) = (s.pts, s.qts, s.date, s.seq);
                    // Confirmed progress survives an interrupted recovery.
                    self.states.insert(GLOBAL_SCOPE, state);
                    self.persist(state);
                }
                enums::updates::Difference::TooLong(d) => {
                    tracing::warn!("[courier] difference too long; skipping to pts {}", d.pts);
                    state.pts = d.pts;
                    break;
                }
            }
        }
        self.states.insert(GLOBAL_SCOPE, state);
        self.persist(state);
        tracing::info!("[courier] recovered {messages} message(s) and {others} update(s)");
        Ok(channels)
    }

    /// Access data for the channel behind `scope`: the cache first, then the
    /// triggering update's own table (`min` records included).
    fn input_channel(&self, scope: i64, chats: &HashMap<i64, enums::Chat>) -> Option<enums::InputChannel> {
        self.peers.input_channel(scope).or_else(|| match chats.get(&scope)? {
            enums::Chat::Channel(c) => {
                let access_hash = c.access_hash?;
                Some(types::InputChannel { channel_id: c.id, access_hash }.into())
            }
            enums::Chat::ChannelForbidden(c) => {
                Some(types::InputChannel { channel_id: c.id, access_hash: c.access_hash }.into())
            }
            _ => None,
        })
    }

    async fn recover_channel(
        &mut self,
        scope: i64,
        chats: &HashMap<i64, enums::Chat>,
    ) -> Result<Vec<i64>, InvocationError> {
        let Some(channel) = self.input_channel(scope, chats) else {
            // Unrecoverable: the next update of the scope becomes its baseline.
            tracing::warn!("[courier] cannot recover channel {scope}: no access hash known; resetting its state");
            self.states.remove(&scope);
            return Ok(Vec::new());
        };
        let Some(mut state) = self.states.get(&scope).copied() else {
            tracing::debug!("[courier] channel {scope} has no local state; nothing to recover");
            return Ok(Vec::new());
        };
        let limit = if self.config.is_bot { BOT_CHANNEL_LIMIT } else { USER_CHANNEL_LIMIT };

        loop {
            let req = functions::updates::GetChannelDifference {
                force:   false,
                channel: channel.clone(),
                filter:  types::ChannelMessagesFilterEmpty {}.into(),
                pts:     state.pts,
                limit,
            };
            match self.source.get_channel_difference(req).await? {
                enums::updates::ChannelDifference::Empty(d) => {
                    state.pts = d.pts;
                    break;
                }
                enums::updates::ChannelDifference::TooLong(d) => {
                    let pts = d.pts().unwrap_or(state.pts);
                    tracing::warn!("[courier] channel {scope} difference too long; resetting to pts {pts}");
                    self.inject(d.messages, Vec::new(), &d.users, &d.chats, pts);
                    state.pts = pts;
                    break;
                }
                enums::updates::ChannelDifference::Difference(d) => {
                    self.inject(d.new_messages, d.other_updates, &d.users, &d.chats, d.pts);
                    if d.pts == state.pts {
                        tracing::warn!("[courier] channel {scope} difference made no progress; giving up");
                        break;
                    }
                    state.pts = d.pts;
                    self.states.insert(scope, state);
                    self.persist(state);
                    if d.r#final {
                        break;
                    }
                }
            }
        }
        self.states.insert(scope, state);
        self.persist(state);
        Ok(Vec::new())
    }
}
