//! Classified update events handed to handlers.
//!
//! The sequencer produces [`Envelope`]s: one raw `Update` plus the user and
//! chat records the server sent alongside it. [`classify`] turns an envelope
//! into an [`Update`], resolving every referenced id through the envelope's
//! tables first and the [`PeerCache`] second.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use courier_tl_types::{enums, types};

use crate::cache::BoundedCache;
use crate::peers::{self, PeerCache, PeerEntry};

// ─── Envelope ─────────────────────────────────────────────────────────────────

/// A pushed update together with its reference tables.
#[derive(Clone, Debug)]
pub struct Envelope {
    pub update: enums::Update,
    /// Keyed by user id.
    pub users:  Arc<HashMap<i64, enums::User>>,
    /// Keyed by marked chat id.
    pub chats:  Arc<HashMap<i64, enums::Chat>>,
}

impl Envelope {
    pub fn new(update: enums::Update, users: Arc<HashMap<i64, enums::User>>, chats: Arc<HashMap<i64, enums::Chat>>) -> Self {
        Self { update, users, chats }
    }

    /// An envelope without reference tables.
    pub fn bare(update: enums::Update) -> Self {
        Self { update, users: Arc::default(), chats: Arc::default() }
    }
}

/// Index `users` and `chats` the way [`Envelope`] expects.
pub fn tables(
    users: &[enums::User],
    chats: &[enums::Chat],
) -> (Arc<HashMap<i64, enums::User>>, Arc<HashMap<i64, enums::Chat>>) {
    let users = users.iter().map(|u| (u.id(), u.clone())).collect();
    let chats = chats.iter().map(|c| (peers::marked_chat_id(c), c.clone())).collect();
    (Arc::new(users), Arc::new(chats))
}

// ─── Peers ────────────────────────────────────────────────────────────────────

/// A peer referenced by an update, resolved as far as possible.
#[derive(Clone, Debug, PartialEq)]
pub enum Peer {
    User(enums::User),
    Chat(enums::Chat),
    /// Not in the update; only the cached access data is known.
    Cached(PeerEntry),
    /// Known by marked id only.
    Unknown(i64),
}

impl Peer {
    /// Marked id.
    pub fn id(&self) -> i64 {
        match self {
            Self::User(u) => u.id(),
            Self::Chat(c) => peers::marked_chat_id(c),
            Self::Cached(e) => e.id,
            Self::Unknown(id) => *id,
        }
    }
}

struct Resolver<'a> {
    env:   &'a Envelope,
    cache: &'a PeerCache,
}

impl Resolver<'_> {
    fn id(&self, marked: i64) -> Peer {
        let found = if marked > 0 {
            self.env.users.get(&marked).cloned().map(Peer::User)
        } else {
            self.env.chats.get(&marked).cloned().map(Peer::Chat)
        };
        found
            .or_else(|| self.cache.lookup(marked).map(Peer::Cached))
            .unwrap_or(Peer::Unknown(marked))
    }

    fn peer(&self, peer: &enums::Peer) -> Peer {
        self.id(peers::marked_id(peer))
    }
}

// ─── Events ───────────────────────────────────────────────────────────────────

/// A new or edited message.
#[derive(Clone, Debug)]
pub struct Message {
    pub raw:                    enums::Message,
    pub chat:                   Option<Peer>,
    pub sender:                 Option<Peer>,
    /// Set for messages received through a business connection.
    pub business_connection_id: Option<String>,
    pub scheduled:              bool,
    /// For edits: the copy seen before the edit, if it is still cached.
    pub previous:               Option<enums::Message>,
}

impl Message {
    pub fn id(&self) -> i32 {
        self.raw.id()
    }

    /// Text of the message; empty for service and empty messages.
    pub fn text(&self) -> &str {
        match &self.raw {
            enums::Message::Message(m) => &m.message,
            _ => "",
        }
    }

    pub fn outgoing(&self) -> bool {
        match &self.raw {
            enums::Message::Message(m) => m.out,
            enums::Message::Service(m) => m.out,
            enums::Message::Empty(_) => false,
        }
    }
}

/// One or more messages were deleted.
#[derive(Clone, Debug)]
pub struct MessageDeletion {
    pub message_ids:            Vec<i32>,
    /// Marked id; `None` for private chats and basic groups.
    pub channel_id:             Option<i64>,
    pub business_connection_id: Option<String>,
    /// Copies of the deleted messages still in the message cache.
    pub cached:                 Vec<enums::Message>,
}

/// An inline keyboard button was pressed.
#[derive(Clone, Debug)]
pub struct CallbackQuery {
    pub query_id:        i64,
    pub user:            Peer,
    pub chat:            Peer,
    pub message_id:      i32,
    pub chat_instance:   i64,
    pub data:            Option<Vec<u8>>,
    pub game_short_name: Option<String>,
    /// The message carrying the button, if cached.
    pub message:         Option<enums::Message>,
}

impl CallbackQuery {
    /// Button data as UTF-8, if valid.
    pub fn data_str(&self) -> Option<&str> {
        self.data.as_deref().and_then(|d| std::str::from_utf8(d).ok())
    }
}

#[derive(Clone, Debug)]
pub struct UserStatus {
    pub user:   Peer,
    pub status: enums::UserStatus,
}

/// `@bot query` typed in any chat.
#[derive(Clone, Debug)]
pub struct InlineQuery {
    pub query_id: i64,
    pub user:     Peer,
    pub query:    String,
    pub offset:   String,
}

/// The user picked one of the bot's inline results.
#[derive(Clone, Debug)]
pub struct ChosenInlineResult {
    pub user:      Peer,
    pub query:     String,
    pub result_id: String,
}

#[derive(Clone, Debug)]
pub enum PollUpdate {
    Results { poll_id: i64, total_voters: i32 },
    Vote { poll_id: i64, voter: Peer, options: Vec<Vec<u8>> },
}

/// Someone joined, left, or was promoted in a group or channel.
#[derive(Clone, Debug)]
pub struct ChatMemberUpdated {
    pub chat:  Peer,
    pub actor: Peer,
    pub user:  Peer,
    pub date:  i32,
}

#[derive(Clone, Debug)]
pub struct JoinRequest {
    pub chat:  Peer,
    pub user:  Peer,
    pub about: String,
    pub date:  i32,
}

#[derive(Clone, Debug)]
pub struct Story {
    pub peer:     Peer,
    pub story_id: i32,
}

#[derive(Clone, Debug)]
pub struct Reaction {
    pub chat:       Peer,
    pub actor:      Peer,
    pub message_id: i32,
    pub date:       i32,
}

#[derive(Clone, Debug)]
pub struct BusinessConnection {
    pub connection_id: String,
    pub user:          Peer,
    pub dc_id:         i32,
    pub date:          i32,
    pub disabled:      bool,
}

/// A classified update.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub enum Update {
    NewMessage(Message),
    MessageEdited(Message),
    MessageDeleted(MessageDeletion),
    CallbackQuery(CallbackQuery),
    UserStatus(UserStatus),
    InlineQuery(InlineQuery),
    ChosenInlineResult(ChosenInlineResult),
    Poll(PollUpdate),
    ChatMember(ChatMemberUpdated),
    JoinRequest(JoinRequest),
    Story(Story),
    Reaction(Reaction),
    BusinessConnection(BusinessConnection),
    /// Anything without a dedicated category, with its reference tables.
    Raw(Envelope),
}

// ─── Classification ───────────────────────────────────────────────────────────

pub type MessageCache = Mutex<BoundedCache<(i64, i32), enums::Message>>;

/// Cache key: channel messages are scoped by channel, everything else shares
/// the account-wide id space.
fn message_key(channel: Option<i64>, id: i32) -> (i64, i32) {
    (channel.unwrap_or(0), id)
}

fn message_channel(msg: &enums::Message) -> Option<i64> {
    match msg.peer_id() {
        Some(p @ enums::Peer::Channel(_)) => Some(peers::marked_id(p)),
        _ => None,
    }
}

fn sender(msg: &enums::Message) -> Option<&enums::Peer> {
    match msg {
        enums::Message::Message(m) => m.from_id.as_ref().or(Some(&m.peer_id)),
        enums::Message::Service(m) => m.from_id.as_ref().or(Some(&m.peer_id)),
        enums::Message::Empty(_) => None,
    }
}

/// Resolve and categorize one envelope.
///
/// New and edited messages are recorded in `messages` so later edits and
/// deletions can carry the earlier copy.
pub fn classify(env: Envelope, cache: &PeerCache, messages: &MessageCache) -> Update {
    let r = Resolver { env: &env, cache };
    let remember = |msg: &enums::Message| {
        let key = message_key(message_channel(msg), msg.id());
        messages.lock().unwrap_or_else(PoisonError::into_inner).insert(key, msg.clone())
    };
    let message = |raw: enums::Message, business: Option<String>, scheduled: bool, previous: Option<enums::Message>| Message {
        chat: raw.peer_id().map(|p| r.peer(p)),
        sender: sender(&raw).map(|p| r.peer(p)),
        raw,
        business_connection_id: business,
        scheduled,
        previous,
    };

    use enums::Update as U;
    match &env.update {
        U::NewMessage(types::UpdateNewMessage { message: m, .. })
        | U::NewChannelMessage(types::UpdateNewChannelMessage { message: m, .. }) => {
            remember(m);
            Update::NewMessage(message(m.clone(), None, false, None))
        }
        U::NewScheduledMessage(u) => Update::NewMessage(message(u.message.clone(), None, true, None)),
        U::BotNewBusinessMessage(u) => {
            remember(&u.message);
            Update::NewMessage(message(u.message.clone(), Some(u.connection_id.clone()), false, None))
        }
        U::EditMessage(types::UpdateEditMessage { message: m, .. })
        | U::EditChannelMessage(types::UpdateEditChannelMessage { message: m, .. }) => {
            let previous = remember(m);
            Update::MessageEdited(message(m.clone(), None, false, previous))
        }
        U::BotEditBusinessMessage(u) => {
            let previous = remember(&u.message);
            Update::MessageEdited(message(u.message.clone(), Some(u.connection_id.clone()), false, previous))
        }
        U::DeleteMessages(u) => Update::MessageDeleted(deletion(messages, &u.messages, None, None)),
        U::DeleteChannelMessages(u) => {
            let channel = peers::channel_marked(u.channel_id);
            Update::MessageDeleted(deletion(messages, &u.messages, Some(channel), None))
        }
        U::BotDeleteBusinessMessage(u) => {
            let channel = matches!(u.peer, enums::Peer::Channel(_)).then(|| peers::marked_id(&u.peer));
            Update::MessageDeleted(deletion(messages, &u.messages, channel, Some(u.connection_id.clone())))
        }
        U::BotCallbackQuery(u) => {
            let chat = r.peer(&u.peer);
            let channel = matches!(u.peer, enums::Peer::Channel(_)).then(|| chat.id());
            let cached = messages
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(&message_key(channel, u.msg_id))
                .cloned();
            Update::CallbackQuery(CallbackQuery {
                query_id:        u.query_id,
                user:            r.id(u.user_id),
                chat,
                message_id:      u.msg_id,
                chat_instance:   u.chat_instance,
                data:            u.data.clone(),
                game_short_name: u.game_short_name.clone(),
                message:         cached,
            })
        }
        U::UserStatus(u) => Update::UserStatus(UserStatus { user: r.id(u.user_id), status: u.status.clone() }),
        U::BotInlineQuery(u) => Update::InlineQuery(InlineQuery {
            query_id: u.query_id,
            user:     r.id(u.user_id),
            query:    u.query.clone(),
            offset:   u.offset.clone(),
        }),
        U::BotInlineSend(u) => Update::ChosenInlineResult(ChosenInlineResult {
            user:      r.id(u.user_id),
            query:     u.query.clone(),
            result_id: u.id.clone(),
        }),
        U::MessagePoll(u) => {
            let enums::PollResults::PollResults(results) = &u.results;
            Update::Poll(PollUpdate::Results { poll_id: u.poll_id, total_voters: results.total_voters.unwrap_or(0) })
        }
        U::MessagePollVote(u) => Update::Poll(PollUpdate::Vote {
            poll_id: u.poll_id,
            voter:   r.peer(&u.peer),
            options: u.options.clone(),
        }),
        U::ChatParticipant(u) => Update::ChatMember(ChatMemberUpdated {
            chat:  r.id(peers::chat_marked(u.chat_id)),
            actor: r.id(u.actor_id),
            user:  r.id(u.user_id),
            date:  u.date,
        }),
        U::ChannelParticipant(u) => Update::ChatMember(ChatMemberUpdated {
            chat:  r.id(peers::channel_marked(u.channel_id)),
            actor: r.id(u.actor_id),
            user:  r.id(u.user_id),
            date:  u.date,
        }),
        U::BotChatInviteRequester(u) => Update::JoinRequest(JoinRequest {
            chat:  r.peer(&u.peer),
            user:  r.id(u.user_id),
            about: u.about.clone(),
            date:  u.date,
        }),
        U::Story(u) => Update::Story(Story { peer: r.peer(&u.peer), story_id: u.story.id() }),
        U::BotMessageReaction(u) => Update::Reaction(Reaction {
            chat:       r.peer(&u.peer),
            actor:      r.peer(&u.actor),
            message_id: u.msg_id,
            date:       u.date,
        }),
        U::BotBusinessConnect(u) => {
            let enums::BotBusinessConnection::BotBusinessConnection(c) = &u.connection;
            Update::BusinessConnection(BusinessConnection {
                connection_id: c.connection_id.clone(),
                user:          r.id(c.user_id),
                dc_id:         c.dc_id,
                date:          c.date,
                disabled:      c.disabled,
            })
        }
        U::MessageId(_) | U::ChannelTooLong(_) => Update::Raw(env.clone()),
    }
}

fn deletion(
    messages: &MessageCache,
    ids:      &[i32],
    channel:  Option<i64>,
    business: Option<String>,
) -> MessageDeletion {
    let mut cache = messages.lock().unwrap_or_else(PoisonError::into_inner);
    let cached = ids.iter().filter_map(|id| cache.remove(&message_key(channel, *id))).collect();
    MessageDeletion { message_ids: ids.to_vec(), channel_id: channel, business_connection_id: business, cached }
}
