use std::fmt::Debug;

use courier_tl_types::deserialize::Error;
use courier_tl_types::{
    Cursor, Deserializable, Identifiable, LogicalMessage, RawVec, Serializable, enums, functions,
    types,
};

// ── Primitives ────────────────────────────────────────────────────────────────

#[test]
fn bool_uses_boxed_tags() {
    assert_eq!(true.to_bytes(), 0x997275b5u32.to_le_bytes());
    assert_eq!(false.to_bytes(), 0xbc799737u32.to_le_bytes());
    assert_eq!(
        bool::from_bytes(&0x1234u32.to_le_bytes()),
        Err(Error::UnexpectedConstructor { id: 0x1234 })
    );
}

#[test]
fn integers_are_little_endian() {
    assert_eq!(0x01020304i32.to_bytes(), [4, 3, 2, 1]);
    assert_eq!(i64::from_bytes(&(-2i64).to_bytes()).unwrap(), -2);
}

#[test]
fn truncated_integer_is_eof() {
    assert_eq!(i32::from_bytes(&[0x01, 0x02]), Err(Error::UnexpectedEof));
}

// ── Bytes / strings ───────────────────────────────────────────────────────────

#[test]
fn short_bytes_have_one_byte_header_and_padding() {
    let bytes = b"abc".to_vec().to_bytes();
    assert_eq!(bytes, [3, b'a', b'b', b'c']);

    let bytes = b"abcd".to_vec().to_bytes();
    assert_eq!(bytes, [4, b'a', b'b', b'c', b'd', 0, 0, 0]);
}

#[test]
fn bytes_over_253_use_long_header() {
    let data = vec![7u8; 254];
    let bytes = data.to_bytes();
    assert_eq!(&bytes[..4], &[0xfe, 254, 0, 0]);
    assert_eq!(bytes.len() % 4, 0);
    assert_eq!(Vec::<u8>::from_bytes(&bytes).unwrap(), data);
}

#[test]
fn boundary_253_stays_short() {
    let bytes = vec![1u8; 253].to_bytes();
    assert_eq!(bytes[0], 253);
    assert_eq!(bytes.len(), 256);
}

#[test]
fn invalid_utf8_string_is_rejected() {
    let bytes = vec![0xffu8, 0xfe].to_bytes();
    assert_eq!(String::from_bytes(&bytes), Err(Error::InvalidUtf8));
}

// ── Vectors ───────────────────────────────────────────────────────────────────

#[test]
fn boxed_vector_has_header() {
    let bytes = vec![5i32, 6].to_bytes();
    assert_eq!(&bytes[..4], &0x1cb5c415u32.to_le_bytes());
    assert_eq!(&bytes[4..8], &2i32.to_le_bytes());
    assert_eq!(Vec::<i32>::from_bytes(&bytes).unwrap(), vec![5, 6]);
}

#[test]
fn bare_vector_has_no_header() {
    let bytes = RawVec(vec![9i64]).to_bytes();
    assert_eq!(bytes.len(), 12);
    assert_eq!(RawVec::<i64>::from_bytes(&bytes).unwrap(), RawVec(vec![9]));
}

#[test]
fn oversized_vector_count_is_eof() {
    let mut bytes = Vec::new();
    0x1cb5c415u32.serialize(&mut bytes);
    1_000_000i32.serialize(&mut bytes);
    assert_eq!(Vec::<i32>::from_bytes(&bytes), Err(Error::UnexpectedEof));
}

// ── Schema ────────────────────────────────────────────────────────────────────

#[test]
fn bare_constructor_serializes_with_tag() {
    let peer = types::PeerChannel { channel_id: 77 };
    let bytes = peer.to_bytes();
    assert_eq!(&bytes[..4], &types::PeerChannel::CONSTRUCTOR_ID.to_le_bytes());

    let boxed = enums::Peer::from_bytes(&bytes).unwrap();
    assert_eq!(boxed, enums::Peer::Channel(peer));
    assert_eq!(boxed.constructor_id(), 0xa2a5371e);
}

#[test]
fn unknown_constructor_in_enum_is_reported() {
    assert_eq!(
        enums::Peer::from_bytes(&0x11223344u32.to_le_bytes()),
        Err(Error::UnexpectedConstructor { id: 0x11223344 })
    );
}

#[test]
fn absent_flag_fields_are_not_written() {
    let user = types::User { id: 10, first_name: Some("Ann".into()), ..Default::default() };
    let bytes = user.to_bytes();
    // tag, flags, flags2, id, "Ann"
    assert_eq!(bytes.len(), 4 + 4 + 4 + 8 + 4);
    assert_eq!(u32::from_bytes(&bytes[4..8]).unwrap(), 1 << 1);

    match enums::User::from_bytes(&bytes).unwrap() {
        enums::User::User(u) => {
            assert_eq!(u.first_name.as_deref(), Some("Ann"));
            assert_eq!(u.access_hash, None);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn min_channel_flag_survives() {
    let channel = types::Channel {
        megagroup: true,
        min: true,
        id: 5,
        title: "group".into(),
        ..Default::default()
    };
    let back = enums::Chat::from_bytes(&channel.to_bytes()).unwrap();
    assert_eq!(back, enums::Chat::Channel(channel));
    assert_eq!(back.id(), 5);
}

#[test]
fn get_difference_flag_layout() {
    let req = functions::updates::GetDifference {
        pts: 100,
        pts_limit: None,
        pts_total_limit: Some(1000),
        date: 5,
        qts: 0,
        qts_limit: None,
    };
    let bytes = req.to_bytes();
    assert_eq!(u32::from_bytes(&bytes[4..8]).unwrap(), 1);
    assert_eq!(i32::from_bytes(&bytes[8..12]).unwrap(), 100);
    assert_eq!(i32::from_bytes(&bytes[12..16]).unwrap(), 1000);
}

#[test]
fn wrapper_nests_query_after_header() {
    let inner = functions::help::GetNearestDc {};
    let wrapped = functions::InvokeWithLayer { layer: courier_tl_types::LAYER, query: inner.clone() };
    let bytes = wrapped.to_bytes();
    assert_eq!(&bytes[..4], &0xda9b0d0du32.to_le_bytes());
    assert_eq!(&bytes[8..], inner.to_bytes().as_slice());
}

// ── Cursor ────────────────────────────────────────────────────────────────────

#[test]
fn peek_does_not_advance() {
    let bytes = 0xaabbccddu32.to_le_bytes();
    let mut cursor = Cursor::from_slice(&bytes);
    assert_eq!(cursor.peek_id().unwrap(), 0xaabbccdd);
    assert_eq!(cursor.pos(), 0);
    assert_eq!(u32::deserialize(&mut cursor).unwrap(), 0xaabbccdd);
    assert_eq!(cursor.remaining(), 0);
}

// ── Envelopes ─────────────────────────────────────────────────────────────────

#[test]
fn gzip_packed_inflates() {
    let payload = types::Pong { msg_id: 1, ping_id: 2 }.to_bytes();
    let packed = types::GzipPacked::compress(&payload);
    assert_eq!(packed.decompress().unwrap(), payload);

    let msg = LogicalMessage::decode(&packed.to_bytes()).unwrap();
    assert_eq!(msg, LogicalMessage::Gzip(packed));
}

#[test]
fn corrupt_gzip_fails() {
    let packed = types::GzipPacked { packed_data: vec![1, 2, 3, 4, 5] };
    assert_eq!(packed.decompress(), Err(Error::Decompress));
}

#[test]
fn rpc_result_keeps_raw_body() {
    let err = types::RpcError { error_code: 420, error_message: "FLOOD_WAIT_3".into() };
    let msg = LogicalMessage::RpcResult { req_msg_id: 99, result: err.to_bytes() };
    let bytes = msg.encode();
    assert_eq!(LogicalMessage::decode(&bytes).unwrap(), msg);
}

#[test]
fn updates_push_is_recognised() {
    let push = types::UpdateShortMessage {
        id: 1,
        user_id: 42,
        message: "hi".into(),
        pts: 10,
        pts_count: 1,
        ..Default::default()
    };
    match LogicalMessage::decode(&push.to_bytes()).unwrap() {
        LogicalMessage::Updates(enums::Updates::UpdateShortMessage(u)) => assert_eq!(u, push),
        other => panic!("unexpected {other:?}"),
    }
}

// ── Wire fixtures ─────────────────────────────────────────────────────────────

/// Builds TL bytes by hand, independently of the crate's serializers.
#[derive(Default)]
struct Wire(Vec<u8>);

impl Wire {
    fn tag(self, id: u32) -> Self {
        self.raw(&id.to_le_bytes())
    }

    fn int(self, v: i32) -> Self {
        self.raw(&v.to_le_bytes())
    }

    fn long(self, v: i64) -> Self {
        self.raw(&v.to_le_bytes())
    }

    /// Short form only: one length byte, padded to four.
    fn string(mut self, s: &str) -> Self {
        assert!(s.len() < 254);
        self.0.push(s.len() as u8);
        self.0.extend_from_slice(s.as_bytes());
        while self.0.len() % 4 != 0 {
            self.0.push(0);
        }
        self
    }

    fn vector(self, len: i32) -> Self {
        self.tag(0x1cb5c415).int(len)
    }

    fn raw(mut self, bytes: &[u8]) -> Self {
        self.0.extend_from_slice(bytes);
        self
    }
}

const DATE: i32 = 1_700_000_000;

#[test]
fn plain_message_decodes_from_real_layout() {
    // message flags=0 flags2=0 id=7 peer_id=peerUser(5) date message="hi"
    let wire = Wire::default()
        .tag(0x94345242)
        .int(0)
        .int(0)
        .int(7)
        .tag(0x59511722)
        .long(5)
        .int(DATE)
        .string("hi")
        .0;

    let message = enums::Message::from_bytes(&wire).unwrap();
    let expected = types::Message::new(7, types::PeerUser { user_id: 5 }.into(), DATE, "hi");
    assert_eq!(message, enums::Message::Message(expected));
    assert_eq!(message.id(), 7);
    assert_eq!(message.to_bytes(), wire);
}

#[test]
fn empty_message_peer_is_flagged() {
    let wire = Wire::default().tag(0x90a6ca84).int(1).int(9).tag(0xa2a5371e).long(3).0;
    let message = enums::Message::from_bytes(&wire).unwrap();
    assert_eq!(
        message,
        enums::Message::Empty(types::MessageEmpty { id: 9, peer_id: Some(types::PeerChannel { channel_id: 3 }.into()) })
    );
    assert_eq!(message.to_bytes(), wire);
}

#[test]
fn user_vector_decodes_from_real_layout() {
    let wire = Wire::default()
        .vector(2)
        // access_hash | status
        .tag(0x215c4438)
        .int(1 | 1 << 6)
        .int(0)
        .long(100)
        .long(1000)
        .tag(0x008c703f)
        .int(DATE)
        // access_hash | first_name | status, self (bit 10)
        .tag(0x215c4438)
        .int(1 | 1 << 1 | 1 << 6 | 1 << 10)
        .int(0)
        .long(200)
        .long(2000)
        .string("Ann")
        .tag(0x7b197dc8)
        .int(1)
        .0;

    let users = Vec::<enums::User>::from_bytes(&wire).unwrap();
    let [enums::User::User(first), enums::User::User(second)] = users.as_slice() else {
        panic!("unexpected {users:?}");
    };
    assert_eq!((first.id, first.access_hash), (100, Some(1000)));
    assert_eq!(first.status, Some(types::UserStatusOffline { was_online: DATE }.into()));
    assert!(!first.is_self);
    assert_eq!((second.id, second.access_hash), (200, Some(2000)));
    assert_eq!(second.first_name.as_deref(), Some("Ann"));
    assert_eq!(second.status, Some(types::UserStatusRecently { by_me: true }.into()));
    assert!(second.is_self);
    assert_eq!(users.to_bytes(), wire);
}

#[test]
fn unmodelled_field_is_reported() {
    // storyItem media_areas (flags.14) carries a type outside this schema.
    let wire = Wire::default()
        .tag(0xedf164f1)
        .int(1 << 14)
        .int(1)
        .int(DATE)
        .int(DATE + 86_400)
        .tag(0x3ded6320)
        .vector(1)
        .tag(0xcafe_f00d)
        .0;
    assert_eq!(enums::StoryItem::from_bytes(&wire), Err(Error::UnexpectedConstructor { id: 0x1cb5c415 }));
}

fn decodes_as(wire: &[u8]) -> enums::Updates {
    match LogicalMessage::decode(wire).unwrap() {
        LogicalMessage::Updates(updates) => {
            assert_eq!(updates.to_bytes(), wire);
            updates
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn every_updates_container_decodes_from_real_layout() {
    let too_long = Wire::default().tag(0xe317af7e).0;
    assert!(matches!(decodes_as(&too_long), enums::Updates::TooLong(_)));

    // out, id=3, user_id=42, "yo", pts=10, pts_count=1, date
    let short = Wire::default().tag(0x313bc7f8).int(1 << 1).int(3).long(42).string("yo").int(10).int(1).int(DATE).0;
    let enums::Updates::UpdateShortMessage(m) = decodes_as(&short) else { panic!("expected updateShortMessage") };
    assert!(m.out);
    assert_eq!((m.id, m.user_id, m.message.as_str(), m.pts, m.pts_count), (3, 42, "yo", 10, 1));

    // silent, via_bot_id=77
    let chat = Wire::default()
        .tag(0x4d6deea5)
        .int(1 << 13 | 1 << 11)
        .int(4)
        .long(42)
        .long(9)
        .string("hey")
        .int(11)
        .int(1)
        .int(DATE)
        .long(77)
        .0;
    let enums::Updates::UpdateShortChatMessage(m) = decodes_as(&chat) else { panic!("expected updateShortChatMessage") };
    assert!(m.silent && !m.out);
    assert_eq!((m.from_id, m.chat_id, m.via_bot_id), (42, 9, Some(77)));

    let message_id = Wire::default().tag(0x4e90bfd6).int(5).long(-1).0;
    let update_short = Wire::default().tag(0x78d4dec1).raw(&message_id).int(DATE).0;
    let enums::Updates::UpdateShort(u) = decodes_as(&update_short) else { panic!("expected updateShort") };
    assert_eq!(u.update, types::UpdateMessageId { id: 5, random_id: -1 }.into());

    // updates=[updateMessageID] users=[userEmpty] chats=[chatForbidden]
    let body = |w: Wire| {
        w.vector(1)
            .raw(&message_id)
            .vector(1)
            .tag(0xd3bc4b7a)
            .long(8)
            .vector(1)
            .tag(0x6592a1a7)
            .long(6)
            .string("old group")
            .int(DATE)
    };
    let combined = body(Wire::default().tag(0x725b04c3)).int(20).int(21).0;
    let enums::Updates::Combined(u) = decodes_as(&combined) else { panic!("expected updatesCombined") };
    assert_eq!((u.seq_start, u.seq), (20, 21));
    assert_eq!(u.users, [types::UserEmpty { id: 8 }.into()]);
    assert_eq!(u.chats, [types::ChatForbidden { id: 6, title: "old group".into() }.into()]);

    let updates = body(Wire::default().tag(0x74ae4240)).int(22).0;
    let enums::Updates::Updates(u) = decodes_as(&updates) else { panic!("expected updates") };
    assert_eq!((u.date, u.seq, u.updates.len()), (DATE, 22, 1));

    // out, ttl_period=60
    let sent = Wire::default().tag(0x9015e101).int(1 << 1 | 1 << 25).int(12).int(30).int(1).int(DATE).int(60).0;
    let enums::Updates::UpdateShortSentMessage(s) = decodes_as(&sent) else { panic!("expected updateShortSentMessage") };
    assert_eq!((s.out, s.id, s.pts, s.ttl_period), (true, 12, 30, Some(60)));
}

// ── Round trips ───────────────────────────────────────────────────────────────

fn round_trip<T: Serializable + Deserializable + PartialEq + Debug>(value: &T) {
    assert_eq!(&T::from_bytes(&value.to_bytes()).unwrap(), value);
}

fn user_peer(user_id: i64) -> enums::Peer {
    types::PeerUser { user_id }.into()
}

fn rich_message() -> enums::Message {
    types::Message {
        out: true,
        silent: true,
        pinned: true,
        offline: true,
        from_id: Some(user_peer(1)),
        fwd_from: Some(
            types::MessageFwdHeader {
                imported: false,
                saved_out: false,
                from_id: Some(user_peer(2)),
                from_name: None,
                date: DATE - 60,
                channel_post: None,
                post_author: Some("ed".into()),
                saved_from_peer: None,
                saved_from_msg_id: None,
                saved_from_id: None,
                saved_from_name: None,
                saved_date: None,
                psa_type: None,
            }
            .into(),
        ),
        via_bot_id: Some(3),
        via_business_bot_id: Some(4),
        reply_to: Some(types::MessageReplyHeader { reply_to_msg_id: Some(5), ..Default::default() }.into()),
        media: Some(
            types::MessageMediaGeo {
                geo: types::GeoPoint { long: 2.35, lat: 48.85, access_hash: 6, accuracy_radius: Some(10) }.into(),
            }
            .into(),
        ),
        entities: Some(vec![types::MessageEntityBold { offset: 0, length: 2 }.into()]),
        views: Some(100),
        forwards: Some(2),
        edit_date: Some(DATE + 5),
        grouped_id: Some(77),
        ttl_period: Some(86_400),
        effect: Some(8),
        paid_message_stars: Some(9),
        ..types::Message::new(10, user_peer(1), DATE, "hi there")
    }
    .into()
}

fn service_message() -> enums::Message {
    types::MessageService {
        out: false,
        mentioned: false,
        media_unread: false,
        reactions_are_possible: true,
        silent: false,
        post: false,
        legacy: false,
        id: 11,
        from_id: Some(user_peer(1)),
        peer_id: types::PeerChat { chat_id: 2 }.into(),
        saved_peer_id: None,
        reply_to: None,
        date: DATE,
        action: types::MessageActionChatCreate { title: "team".into(), users: vec![1, 2] }.into(),
        reactions: None,
        ttl_period: None,
    }
    .into()
}

fn text(s: &str) -> enums::TextWithEntities {
    types::TextWithEntities { text: s.into(), entities: Vec::new() }.into()
}

fn invite() -> enums::ExportedChatInvite {
    types::ChatInviteExported {
        revoked: false,
        permanent: true,
        request_needed: true,
        link: "https://t.me/+abc".into(),
        admin_id: 1,
        date: DATE,
        start_date: None,
        expire_date: Some(DATE + 3600),
        usage_limit: Some(10),
        usage: None,
        requested: Some(1),
        subscription_expired: None,
        title: Some("friends".into()),
        subscription_pricing: None,
    }
    .into()
}

fn story() -> enums::StoryItem {
    types::StoryItem {
        pinned: true,
        public: true,
        close_friends: false,
        min: false,
        noforwards: false,
        edited: true,
        contacts: false,
        selected_contacts: false,
        out: false,
        id: 4,
        date: DATE,
        from_id: None,
        fwd_from: None,
        expire_date: DATE + 86_400,
        caption: Some("sunset".into()),
        entities: None,
        media: types::MessageMediaEmpty {}.into(),
        privacy: None,
        views: Some(
            types::StoryViews {
                has_viewers: true,
                views_count: 12,
                forwards_count: None,
                reactions: None,
                reactions_count: Some(3),
                recent_viewers: Some(vec![1, 2]),
            }
            .into(),
        ),
        sent_reaction: Some(types::ReactionEmoji { emoticon: "🔥".into() }.into()),
        albums: None,
    }
    .into()
}

fn every_update() -> Vec<enums::Update> {
    vec![
        types::UpdateNewMessage { message: rich_message(), pts: 1, pts_count: 1 }.into(),
        types::UpdateNewChannelMessage { message: service_message(), pts: 2, pts_count: 1 }.into(),
        types::UpdateEditMessage { message: rich_message(), pts: 3, pts_count: 1 }.into(),
        types::UpdateEditChannelMessage {
            message: types::MessageEmpty { id: 5, peer_id: None }.into(),
            pts: 4,
            pts_count: 1,
        }
        .into(),
        types::UpdateDeleteMessages { messages: vec![1, 2], pts: 6, pts_count: 2 }.into(),
        types::UpdateDeleteChannelMessages { channel_id: 7, messages: vec![3], pts: 7, pts_count: 1 }.into(),
        types::UpdateChannelTooLong { channel_id: 7, pts: Some(8) }.into(),
        types::UpdateChannelTooLong { channel_id: 7, pts: None }.into(),
        types::UpdateNewScheduledMessage { message: rich_message() }.into(),
        types::UpdateMessageId { id: 9, random_id: 10 }.into(),
        types::UpdateUserStatus { user_id: 1, status: types::UserStatusOnline { expires: DATE }.into() }.into(),
        types::UpdateBotCallbackQuery {
            query_id: 1,
            user_id: 2,
            peer: user_peer(2),
            msg_id: 3,
            chat_instance: 4,
            data: Some(b"press".to_vec()),
            game_short_name: None,
        }
        .into(),
        types::UpdateBotInlineQuery {
            query_id: 5,
            user_id: 2,
            query: "cats".into(),
            geo: Some(types::GeoPointEmpty {}.into()),
            peer_type: Some(types::InlineQueryPeerTypePm {}.into()),
            offset: "20".into(),
        }
        .into(),
        types::UpdateBotInlineSend {
            user_id: 2,
            query: "cats".into(),
            geo: None,
            id: "result-1".into(),
            msg_id: Some(types::InputBotInlineMessageId64 { dc_id: 2, owner_id: 3, id: 4, access_hash: 5 }.into()),
        }
        .into(),
        types::UpdateMessagePoll {
            poll_id: 6,
            poll: Some(
                types::Poll {
                    id: 6,
                    closed: false,
                    public_voters: true,
                    multiple_choice: false,
                    quiz: false,
                    question: text("tea or coffee?"),
                    answers: vec![
                        types::PollAnswer { text: text("tea"), option: vec![0] }.into(),
                        types::PollAnswer { text: text("coffee"), option: vec![1] }.into(),
                    ],
                    close_period: None,
                    close_date: Some(DATE + 60),
                }
                .into(),
            ),
            results: types::PollResults {
                results: Some(vec![
                    types::PollAnswerVoters { chosen: true, correct: false, option: vec![0], voters: 3 }.into(),
                ]),
                total_voters: Some(3),
                recent_voters: Some(vec![user_peer(1)]),
                ..Default::default()
            }
            .into(),
        }
        .into(),
        types::UpdateMessagePollVote { poll_id: 6, peer: user_peer(1), options: vec![vec![0]], qts: 1 }.into(),
        types::UpdateChatParticipant {
            chat_id: 2,
            date: DATE,
            actor_id: 1,
            user_id: 3,
            prev_participant: None,
            new_participant: Some(types::ChatParticipant { user_id: 3, inviter_id: 1, date: DATE }.into()),
            invite: Some(invite()),
            qts: 2,
        }
        .into(),
        types::UpdateChannelParticipant {
            via_chatlist: true,
            channel_id: 7,
            date: DATE,
            actor_id: 1,
            user_id: 3,
            prev_participant: Some(
                types::ChannelParticipant { user_id: 3, date: DATE - 10, subscription_until_date: None }.into(),
            ),
            new_participant: None,
            invite: None,
            qts: 3,
        }
        .into(),
        types::UpdateBotChatInviteRequester {
            peer: types::PeerChannel { channel_id: 7 }.into(),
            date: DATE,
            user_id: 3,
            about: "let me in".into(),
            invite: invite(),
            qts: 4,
        }
        .into(),
        types::UpdateStory { peer: user_peer(1), story: story() }.into(),
        types::UpdateStory { peer: user_peer(1), story: types::StoryItemDeleted { id: 4 }.into() }.into(),
        types::UpdateBotMessageReaction {
            peer: user_peer(1),
            msg_id: 10,
            date: DATE,
            actor: user_peer(2),
            old_reactions: Vec::new(),
            new_reactions: vec![types::ReactionEmoji { emoticon: "👍".into() }.into()],
            qts: 5,
        }
        .into(),
        types::UpdateBotBusinessConnect {
            connection: types::BotBusinessConnection {
                disabled: false,
                connection_id: "conn".into(),
                user_id: 1,
                dc_id: 2,
                date: DATE,
                rights: Some(types::BusinessBotRights { flags: 1 }.into()),
            }
            .into(),
            qts: 6,
        }
        .into(),
        types::UpdateBotNewBusinessMessage {
            connection_id: "conn".into(),
            message: rich_message(),
            reply_to_message: Some(service_message()),
            qts: 7,
        }
        .into(),
        types::UpdateBotEditBusinessMessage {
            connection_id: "conn".into(),
            message: rich_message(),
            reply_to_message: None,
            qts: 8,
        }
        .into(),
        types::UpdateBotDeleteBusinessMessage {
            connection_id: "conn".into(),
            peer: user_peer(1),
            messages: vec![10],
            qts: 9,
        }
        .into(),
    ]
}

fn every_user() -> Vec<enums::User> {
    vec![
        types::UserEmpty { id: 1 }.into(),
        types::User {
            is_self: true,
            bot: true,
            bot_info_version: Some(3),
            restricted: true,
            restriction_reason: Some(vec![
                types::RestrictionReason { platform: "ios".into(), reason: "porn".into(), text: "no".into() }.into(),
            ]),
            premium: true,
            bot_business: true,
            id: 2,
            access_hash: Some(20),
            first_name: Some("Ann".into()),
            last_name: Some("Lee".into()),
            username: Some("ann".into()),
            phone: Some("447700900".into()),
            photo: Some(
                types::UserProfilePhoto {
                    has_video: true,
                    personal: false,
                    photo_id: 5,
                    stripped_thumb: Some(vec![1, 2, 3]),
                    dc_id: 4,
                }
                .into(),
            ),
            status: Some(types::UserStatusRecently { by_me: false }.into()),
            lang_code: Some("en".into()),
            emoji_status: Some(types::EmojiStatus { document_id: 6, until: Some(DATE) }.into()),
            usernames: Some(vec![types::Username { editable: true, active: true, username: "ann".into() }.into()]),
            stories_max_id: Some(4),
            color: Some(types::PeerColor { color: Some(1), background_emoji_id: None }.into()),
            bot_active_users: Some(100),
            ..Default::default()
        }
        .into(),
    ]
}

fn every_chat() -> Vec<enums::Chat> {
    vec![
        types::ChatEmpty { id: 1 }.into(),
        types::Chat {
            creator: true,
            id: 2,
            title: "team".into(),
            photo: types::ChatPhoto { has_video: false, photo_id: 3, stripped_thumb: None, dc_id: 2 }.into(),
            participants_count: 5,
            date: DATE,
            version: 1,
            migrated_to: Some(types::InputChannel { channel_id: 9, access_hash: 10 }.into()),
            admin_rights: Some(types::ChatAdminRights { flags: 0b101 }.into()),
            ..Default::default()
        }
        .into(),
        types::ChatForbidden { id: 3, title: "gone".into() }.into(),
        types::Channel {
            broadcast: true,
            verified: true,
            signatures: true,
            id: 4,
            access_hash: Some(40),
            title: "news".into(),
            username: Some("news".into()),
            date: DATE,
            banned_rights: Some(types::ChatBannedRights { flags: 1 << 1, until_date: DATE }.into()),
            participants_count: Some(1_000),
            level: Some(2),
            ..Default::default()
        }
        .into(),
        types::ChannelForbidden {
            broadcast: false,
            megagroup: true,
            id: 5,
            access_hash: 50,
            title: "banned".into(),
            until_date: Some(DATE),
        }
        .into(),
    ]
}

#[test]
fn every_update_variant_round_trips() {
    let updates = every_update();
    for update in &updates {
        round_trip(update);
    }
    round_trip(&updates);
}

#[test]
fn every_updates_variant_round_trips() {
    let containers: Vec<enums::Updates> = vec![
        types::UpdatesTooLong {}.into(),
        types::UpdateShortMessage {
            mentioned: true,
            id: 1,
            user_id: 2,
            message: "hi".into(),
            pts: 3,
            pts_count: 1,
            date: DATE,
            reply_to: Some(types::MessageReplyHeader { reply_to_msg_id: Some(1), ..Default::default() }.into()),
            entities: Some(vec![types::MessageEntityBold { offset: 0, length: 2 }.into()]),
            ttl_period: Some(60),
            ..Default::default()
        }
        .into(),
        types::UpdateShortChatMessage {
            media_unread: true,
            id: 4,
            from_id: 2,
            chat_id: 5,
            message: "yo".into(),
            pts: 4,
            pts_count: 1,
            date: DATE,
            via_bot_id: Some(6),
            ..Default::default()
        }
        .into(),
        types::UpdateShort { update: every_update().remove(0), date: DATE }.into(),
        types::UpdatesCombined {
            updates: every_update(),
            users: every_user(),
            chats: every_chat(),
            date: DATE,
            seq_start: 1,
            seq: 2,
        }
        .into(),
        types::Updates { updates: every_update(), users: every_user(), chats: every_chat(), date: DATE, seq: 3 }.into(),
        types::UpdateShortSentMessage {
            out: true,
            id: 7,
            pts: 8,
            pts_count: 1,
            date: DATE,
            media: Some(types::MessageMediaEmpty {}.into()),
            entities: None,
            ttl_period: None,
        }
        .into(),
    ];
    for updates in &containers {
        round_trip(updates);
    }
}

#[test]
fn every_user_and_chat_variant_round_trips() {
    for user in &every_user() {
        round_trip(user);
    }
    for chat in &every_chat() {
        round_trip(chat);
    }
}

#[test]
fn every_difference_variant_round_trips() {
    let state = |pts| types::updates::State { pts, qts: 1, date: DATE, seq: 2, unread_count: 0 };
    let differences: Vec<enums::updates::Difference> = vec![
        types::updates::DifferenceEmpty { date: DATE, seq: 1 }.into(),
        types::updates::Difference {
            new_messages: vec![rich_message(), service_message()],
            new_encrypted_messages: Vec::new(),
            other_updates: every_update(),
            chats: every_chat(),
            users: every_user(),
            state: state(10).into(),
        }
        .into(),
        types::updates::DifferenceSlice {
            new_messages: vec![rich_message()],
            new_encrypted_messages: Vec::new(),
            other_updates: Vec::new(),
            chats: Vec::new(),
            users: every_user(),
            intermediate_state: state(5).into(),
        }
        .into(),
        types::updates::DifferenceTooLong { pts: 99 }.into(),
    ];
    for difference in &differences {
        round_trip(difference);
    }

    let dialog: enums::Dialog = types::Dialog {
        pinned: false,
        unread_mark: true,
        view_forum_as_messages: false,
        peer: types::PeerChannel { channel_id: 4 }.into(),
        top_message: 10,
        read_inbox_max_id: 9,
        read_outbox_max_id: 8,
        unread_count: 1,
        unread_mentions_count: 0,
        unread_reactions_count: 0,
        notify_settings: types::PeerNotifySettings { mute_until: Some(DATE), ..Default::default() }.into(),
        pts: Some(44),
        draft: None,
        folder_id: Some(1),
        ttl_period: None,
    }
    .into();
    let too_long = types::updates::ChannelDifferenceTooLong {
        r#final: true,
        timeout: Some(30),
        dialog,
        messages: vec![rich_message()],
        chats: every_chat(),
        users: Vec::new(),
    };
    assert_eq!(too_long.pts(), Some(44));

    let channel_differences: Vec<enums::updates::ChannelDifference> = vec![
        types::updates::ChannelDifferenceEmpty { r#final: true, pts: 3, timeout: None }.into(),
        too_long.into(),
        types::updates::ChannelDifference {
            r#final: false,
            pts: 12,
            timeout: Some(5),
            new_messages: vec![service_message()],
            other_updates: every_update(),
            chats: Vec::new(),
            users: every_user(),
        }
        .into(),
    ];
    for difference in &channel_differences {
        round_trip(difference);
    }
}

#[test]
fn every_upload_variant_round_trips() {
    let files: Vec<enums::upload::File> = vec![
        types::upload::File { r#type: types::storage::FileJpeg {}.into(), mtime: DATE, bytes: vec![0xff, 0xd8] }.into(),
        types::upload::FileCdnRedirect {
            dc_id: 203,
            file_token: vec![1; 8],
            encryption_key: vec![2; 32],
            encryption_iv: vec![3; 16],
            file_hashes: vec![types::FileHash { offset: 0, limit: 131_072, hash: vec![4; 32] }.into()],
        }
        .into(),
    ];
    for file in &files {
        round_trip(file);
    }

    let cdn_files: Vec<enums::upload::CdnFile> = vec![
        types::upload::CdnFileReuploadNeeded { request_token: vec![5; 12] }.into(),
        types::upload::CdnFile { bytes: vec![6; 300] }.into(),
    ];
    for file in &cdn_files {
        round_trip(file);
    }
}
