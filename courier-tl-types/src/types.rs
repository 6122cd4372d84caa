//! Concrete constructors (bare types).
//!
//! Every constructor serializes with its own id in front, so a value taken
//! out of a boxed enum can be re-sent unchanged.

use crate::deserialize::{Buffer, Result};
use crate::{Deserializable, Identifiable, Serializable, enums, flag, has, read_if, unsupported};

// ─── MTProto: key exchange ───────────────────────────────────────────────────

tl_struct! {
    /// `resPQ`: server answer to `req_pq_multi`.
    pub struct ResPq = 0x05162463 {
        pub nonce: [u8; 16],
        pub server_nonce: [u8; 16],
        pub pq: Vec<u8>,
        pub server_public_key_fingerprints: Vec<i64>,
    }
}

tl_struct! {
    /// `p_q_inner_data`
    pub struct PQInnerData = 0x83c95aec {
        pub pq: Vec<u8>,
        pub p: Vec<u8>,
        pub q: Vec<u8>,
        pub nonce: [u8; 16],
        pub server_nonce: [u8; 16],
        pub new_nonce: [u8; 32],
    }
}

tl_struct! {
    /// `p_q_inner_data_dc`: like [`PQInnerData`] but bound to a DC id.
    pub struct PQInnerDataDc = 0xa9f55f95 {
        pub pq: Vec<u8>,
        pub p: Vec<u8>,
        pub q: Vec<u8>,
        pub nonce: [u8; 16],
        pub server_nonce: [u8; 16],
        pub new_nonce: [u8; 32],
        pub dc: i32,
    }
}

tl_struct! {
    pub struct ServerDhParamsFail = 0x79cb045d {
        pub nonce: [u8; 16],
        pub server_nonce: [u8; 16],
        pub new_nonce_hash: [u8; 16],
    }
}

tl_struct! {
    pub struct ServerDhParamsOk = 0xd0e8075c {
        pub nonce: [u8; 16],
        pub server_nonce: [u8; 16],
        pub encrypted_answer: Vec<u8>,
    }
}

tl_struct! {
    /// Decrypted contents of `server_DH_params_ok.encrypted_answer`.
    pub struct ServerDhInnerData = 0xb5890dba {
        pub nonce: [u8; 16],
        pub server_nonce: [u8; 16],
        pub g: i32,
        pub dh_prime: Vec<u8>,
        pub g_a: Vec<u8>,
        pub server_time: i32,
    }
}

tl_struct! {
    pub struct ClientDhInnerData = 0x6643b654 {
        pub nonce: [u8; 16],
        pub server_nonce: [u8; 16],
        pub retry_id: i64,
        pub g_b: Vec<u8>,
    }
}

tl_struct! {
    pub struct DhGenOk = 0x3bcbf734 {
        pub nonce: [u8; 16],
        pub server_nonce: [u8; 16],
        pub new_nonce_hash1: [u8; 16],
    }
}

tl_struct! {
    pub struct DhGenRetry = 0x46dc1fb9 {
        pub nonce: [u8; 16],
        pub server_nonce: [u8; 16],
        pub new_nonce_hash2: [u8; 16],
    }
}

tl_struct! {
    pub struct DhGenFail = 0xa69dae02 {
        pub nonce: [u8; 16],
        pub server_nonce: [u8; 16],
        pub new_nonce_hash3: [u8; 16],
    }
}

// ─── MTProto: service messages ───────────────────────────────────────────────

tl_struct! {
    pub struct RpcError = 0x2144ca19 {
        pub error_code: i32,
        pub error_message: String,
    }
}

tl_struct! {
    pub struct MsgsAck = 0x62d6b459 {
        pub msg_ids: Vec<i64>,
    }
}

tl_struct! {
    pub struct BadMsgNotification = 0xa7eff811 {
        pub bad_msg_id: i64,
        pub bad_msg_seqno: i32,
        pub error_code: i32,
    }
}

tl_struct! {
    pub struct BadServerSalt = 0xedab447b {
        pub bad_msg_id: i64,
        pub bad_msg_seqno: i32,
        pub error_code: i32,
        pub new_server_salt: i64,
    }
}

tl_struct! {
    pub struct NewSessionCreated = 0x9ec20908 {
        pub first_msg_id: i64,
        pub unique_id: i64,
        pub server_salt: i64,
    }
}

tl_struct! {
    pub struct Pong = 0x347773c5 {
        pub msg_id: i64,
        pub ping_id: i64,
    }
}

tl_struct! {
    pub struct MsgDetailedInfo = 0x276d3ec6 {
        pub msg_id: i64,
        pub answer_msg_id: i64,
        pub bytes: i32,
        pub status: i32,
    }
}

tl_struct! {
    pub struct MsgNewDetailedInfo = 0x809db6df {
        pub answer_msg_id: i64,
        pub bytes: i32,
        pub status: i32,
    }
}

tl_struct! {
    /// `gzip_packed`: a gzip-compressed serialized object.
    pub struct GzipPacked = 0x3072cfa1 {
        pub packed_data: Vec<u8>,
    }
}

impl GzipPacked {
    /// Compress an already-serialized object.
    pub fn compress(unpacked: &[u8]) -> Self {
        use std::io::Write;
        let mut enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        // Writing into a Vec cannot fail.
        let _ = enc.write_all(unpacked);
        let packed_data = enc.finish().unwrap_or_default();
        Self { packed_data }
    }

    /// Inflate the packed object. Some servers emit raw zlib streams, so that
    /// is tried when the gzip header is missing.
    pub fn decompress(&self) -> Result<Vec<u8>> {
        use std::io::Read;
        let mut out = Vec::new();
        if flate2::read::GzDecoder::new(self.packed_data.as_slice()).read_to_end(&mut out).is_ok()
            && !out.is_empty()
        {
            return Ok(out);
        }
        out.clear();
        flate2::read::ZlibDecoder::new(self.packed_data.as_slice())
            .read_to_end(&mut out)
            .map_err(|_| crate::deserialize::Error::Decompress)?;
        Ok(out)
    }
}

// ─── Peers ───────────────────────────────────────────────────────────────────

tl_struct! { pub struct PeerUser = 0x59511722 { pub user_id: i64 } }
tl_struct! { pub struct PeerChat = 0x36c6019a { pub chat_id: i64 } }
tl_struct! { pub struct PeerChannel = 0xa2a5371e { pub channel_id: i64 } }

tl_struct! { pub struct InputPeerEmpty = 0x7f3b18ea {} }
tl_struct! { pub struct InputPeerSelf = 0x7da07ec9 {} }
tl_struct! { pub struct InputPeerChat = 0x35a95cb9 { pub chat_id: i64 } }
tl_struct! { pub struct InputPeerUser = 0xdde8a54c { pub user_id: i64, pub access_hash: i64 } }
tl_struct! { pub struct InputPeerChannel = 0x27bcbbfc { pub channel_id: i64, pub access_hash: i64 } }

tl_struct! { pub struct InputChannelEmpty = 0xee8c1e86 {} }
tl_struct! { pub struct InputChannel = 0xf35aec28 { pub channel_id: i64, pub access_hash: i64 } }

// ─── Users ───────────────────────────────────────────────────────────────────

tl_struct! { pub struct UserEmpty = 0xd3bc4b7a { pub id: i64 } }

/// `user`.
///
/// `min` users carry no usable access hash and must not replace cached data.
/// `bot` shares its flag bit with `bot_info_version`, and `restricted` with
/// `restriction_reason`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct User {
    pub is_self: bool,
    pub contact: bool,
    pub mutual_contact: bool,
    pub deleted: bool,
    pub bot: bool,
    pub bot_chat_history: bool,
    pub bot_nochats: bool,
    pub verified: bool,
    pub restricted: bool,
    pub min: bool,
    pub bot_inline_geo: bool,
    pub support: bool,
    pub scam: bool,
    pub apply_min_photo: bool,
    pub fake: bool,
    pub bot_attach_menu: bool,
    pub premium: bool,
    pub attach_menu_enabled: bool,
    pub bot_can_edit: bool,
    pub close_friend: bool,
    pub stories_hidden: bool,
    pub stories_unavailable: bool,
    pub contact_require_premium: bool,
    pub bot_business: bool,
    pub bot_has_main_app: bool,
    pub id: i64,
    pub access_hash: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub photo: Option<enums::UserProfilePhoto>,
    pub status: Option<enums::UserStatus>,
    pub bot_info_version: Option<i32>,
    pub restriction_reason: Option<Vec<enums::RestrictionReason>>,
    pub bot_inline_placeholder: Option<String>,
    pub lang_code: Option<String>,
    pub emoji_status: Option<enums::EmojiStatus>,
    pub usernames: Option<Vec<enums::Username>>,
    pub stories_max_id: Option<i32>,
    pub color: Option<enums::PeerColor>,
    pub profile_color: Option<enums::PeerColor>,
    pub bot_active_users: Option<i32>,
    pub bot_verification_icon: Option<i64>,
    pub send_paid_messages_stars: Option<i64>,
}

impl Identifiable for User {
    const CONSTRUCTOR_ID: u32 = 0x215c4438;
}

impl Serializable for User {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let bot = self.bot || self.bot_info_version.is_some();
        let restricted = self.restricted || self.restriction_reason.is_some();
        let flags = flag(self.access_hash.is_some(), 0)
            | flag(self.first_name.is_some(), 1)
            | flag(self.last_name.is_some(), 2)
            | flag(self.username.is_some(), 3)
            | flag(self.phone.is_some(), 4)
            | flag(self.photo.is_some(), 5)
            | flag(self.status.is_some(), 6)
            | flag(self.is_self, 10)
            | flag(self.contact, 11)
            | flag(self.mutual_contact, 12)
            | flag(self.deleted, 13)
            | flag(bot, 14)
            | flag(self.bot_chat_history, 15)
            | flag(self.bot_nochats, 16)
            | flag(self.verified, 17)
            | flag(restricted, 18)
            | flag(self.bot_inline_placeholder.is_some(), 19)
            | flag(self.min, 20)
            | flag(self.bot_inline_geo, 21)
            | flag(self.lang_code.is_some(), 22)
            | flag(self.support, 23)
            | flag(self.scam, 24)
            | flag(self.apply_min_photo, 25)
            | flag(self.fake, 26)
            | flag(self.bot_attach_menu, 27)
            | flag(self.premium, 28)
            | flag(self.attach_menu_enabled, 29)
            | flag(self.emoji_status.is_some(), 30);
        let flags2 = flag(self.usernames.is_some(), 0)
            | flag(self.bot_can_edit, 1)
            | flag(self.close_friend, 2)
            | flag(self.stories_hidden, 3)
            | flag(self.stories_unavailable, 4)
            | flag(self.stories_max_id.is_some(), 5)
            | flag(self.color.is_some(), 8)
            | flag(self.profile_color.is_some(), 9)
            | flag(self.contact_require_premium, 10)
            | flag(self.bot_business, 11)
            | flag(self.bot_active_users.is_some(), 12)
            | flag(self.bot_has_main_app, 13)
            | flag(self.bot_verification_icon.is_some(), 14)
            | flag(self.send_paid_messages_stars.is_some(), 15);
        flags.serialize(buf);
        flags2.serialize(buf);
        self.id.serialize(buf);
        self.access_hash.serialize(buf);
        self.first_name.serialize(buf);
        self.last_name.serialize(buf);
        self.username.serialize(buf);
        self.phone.serialize(buf);
        self.photo.serialize(buf);
        self.status.serialize(buf);
        if bot {
            self.bot_info_version.unwrap_or_default().serialize(buf);
        }
        if restricted {
            self.restriction_reason.clone().unwrap_or_default().serialize(buf);
        }
        self.bot_inline_placeholder.serialize(buf);
        self.lang_code.serialize(buf);
        self.emoji_status.serialize(buf);
        self.usernames.serialize(buf);
        self.stories_max_id.serialize(buf);
        self.color.serialize(buf);
        self.profile_color.serialize(buf);
        self.bot_active_users.serialize(buf);
        self.bot_verification_icon.serialize(buf);
        self.send_paid_messages_stars.serialize(buf);
    }
}

impl Deserializable for User {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        let flags2 = u32::deserialize(buf)?;
        Ok(Self {
            is_self: has(flags, 10),
            contact: has(flags, 11),
            mutual_contact: has(flags, 12),
            deleted: has(flags, 13),
            bot: has(flags, 14),
            bot_chat_history: has(flags, 15),
            bot_nochats: has(flags, 16),
            verified: has(flags, 17),
            restricted: has(flags, 18),
            min: has(flags, 20),
            bot_inline_geo: has(flags, 21),
            support: has(flags, 23),
            scam: has(flags, 24),
            apply_min_photo: has(flags, 25),
            fake: has(flags, 26),
            bot_attach_menu: has(flags, 27),
            premium: has(flags, 28),
            attach_menu_enabled: has(flags, 29),
            bot_can_edit: has(flags2, 1),
            close_friend: has(flags2, 2),
            stories_hidden: has(flags2, 3),
            stories_unavailable: has(flags2, 4),
            contact_require_premium: has(flags2, 10),
            bot_business: has(flags2, 11),
            bot_has_main_app: has(flags2, 13),
            id: i64::deserialize(buf)?,
            access_hash: read_if(flags, 0, buf)?,
            first_name: read_if(flags, 1, buf)?,
            last_name: read_if(flags, 2, buf)?,
            username: read_if(flags, 3, buf)?,
            phone: read_if(flags, 4, buf)?,
            photo: read_if(flags, 5, buf)?,
            status: read_if(flags, 6, buf)?,
            bot_info_version: read_if(flags, 14, buf)?,
            restriction_reason: read_if(flags, 18, buf)?,
            bot_inline_placeholder: read_if(flags, 19, buf)?,
            lang_code: read_if(flags, 22, buf)?,
            emoji_status: read_if(flags, 30, buf)?,
            usernames: read_if(flags2, 0, buf)?,
            stories_max_id: read_if(flags2, 5, buf)?,
            color: read_if(flags2, 8, buf)?,
            profile_color: read_if(flags2, 9, buf)?,
            bot_active_users: read_if(flags2, 12, buf)?,
            bot_verification_icon: read_if(flags2, 14, buf)?,
            send_paid_messages_stars: read_if(flags2, 15, buf)?,
        })
    }
}

/// `username`: one of several collectible usernames.
#[derive(Clone, Debug, PartialEq)]
pub struct Username {
    pub editable: bool,
    pub active: bool,
    pub username: String,
}

impl Identifiable for Username {
    const CONSTRUCTOR_ID: u32 = 0xb4073647;
}

impl Serializable for Username {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        (flag(self.editable, 0) | flag(self.active, 1)).serialize(buf);
        self.username.serialize(buf);
    }
}

impl Deserializable for Username {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self { editable: has(flags, 0), active: has(flags, 1), username: String::deserialize(buf)? })
    }
}

tl_struct! { pub struct UserProfilePhotoEmpty = 0x4f11bae1 {} }

/// `userProfilePhoto`
#[derive(Clone, Debug, PartialEq)]
pub struct UserProfilePhoto {
    pub has_video: bool,
    pub personal: bool,
    pub photo_id: i64,
    pub stripped_thumb: Option<Vec<u8>>,
    pub dc_id: i32,
}

impl Identifiable for UserProfilePhoto {
    const CONSTRUCTOR_ID: u32 = 0x82d1f706;
}

impl Serializable for UserProfilePhoto {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        (flag(self.has_video, 0) | flag(self.stripped_thumb.is_some(), 1) | flag(self.personal, 2)).serialize(buf);
        self.photo_id.serialize(buf);
        self.stripped_thumb.serialize(buf);
        self.dc_id.serialize(buf);
    }
}

impl Deserializable for UserProfilePhoto {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            has_video: has(flags, 0),
            personal: has(flags, 2),
            photo_id: i64::deserialize(buf)?,
            stripped_thumb: read_if(flags, 1, buf)?,
            dc_id: i32::deserialize(buf)?,
        })
    }
}

tl_struct! { pub struct UserStatusEmpty = 0x09d05049 {} }
tl_struct! { pub struct UserStatusOnline = 0xedb93949 { pub expires: i32 } }
tl_struct! { pub struct UserStatusOffline = 0x008c703f { pub was_online: i32 } }

/// `userStatusRecently`, `userStatusLastWeek` and `userStatusLastMonth` share
/// one layout: a flags word whose bit 0 is `by_me`.
macro_rules! approximate_status {
    ($($name:ident = $id:literal),+ $(,)?) => {$(
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name {
            pub by_me: bool,
        }

        impl Identifiable for $name {
            const CONSTRUCTOR_ID: u32 = $id;
        }

        impl Serializable for $name {
            fn serialize(&self, buf: &mut impl Extend<u8>) {
                Self::CONSTRUCTOR_ID.serialize(buf);
                flag(self.by_me, 0).serialize(buf);
            }
        }

        impl Deserializable for $name {
            fn deserialize(buf: Buffer) -> Result<Self> {
                Ok(Self { by_me: has(u32::deserialize(buf)?, 0) })
            }
        }
    )+};
}

approximate_status! {
    UserStatusRecently = 0x7b197dc8,
    UserStatusLastWeek = 0x541a1d1a,
    UserStatusLastMonth = 0x65899777,
}

tl_struct! { pub struct EmojiStatusEmpty = 0x2de11aae {} }

/// `emojiStatus`
#[derive(Clone, Debug, PartialEq)]
pub struct EmojiStatus {
    pub document_id: i64,
    pub until: Option<i32>,
}

impl Identifiable for EmojiStatus {
    const CONSTRUCTOR_ID: u32 = 0xe7ff068a;
}

impl Serializable for EmojiStatus {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        flag(self.until.is_some(), 0).serialize(buf);
        self.document_id.serialize(buf);
        self.until.serialize(buf);
    }
}

impl Deserializable for EmojiStatus {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self { document_id: i64::deserialize(buf)?, until: read_if(flags, 0, buf)? })
    }
}

/// `emojiStatusCollectible`: a status backed by a collectible gift.
#[derive(Clone, Debug, PartialEq)]
pub struct EmojiStatusCollectible {
    pub collectible_id: i64,
    pub document_id: i64,
    pub title: String,
    pub slug: String,
    pub pattern_document_id: i64,
    pub center_color: i32,
    pub edge_color: i32,
    pub pattern_color: i32,
    pub text_color: i32,
    pub until: Option<i32>,
}

impl Identifiable for EmojiStatusCollectible {
    const CONSTRUCTOR_ID: u32 = 0x7184603b;
}

impl Serializable for EmojiStatusCollectible {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        flag(self.until.is_some(), 0).serialize(buf);
        self.collectible_id.serialize(buf);
        self.document_id.serialize(buf);
        self.title.serialize(buf);
        self.slug.serialize(buf);
        self.pattern_document_id.serialize(buf);
        self.center_color.serialize(buf);
        self.edge_color.serialize(buf);
        self.pattern_color.serialize(buf);
        self.text_color.serialize(buf);
        self.until.serialize(buf);
    }
}

impl Deserializable for EmojiStatusCollectible {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            collectible_id: i64::deserialize(buf)?,
            document_id: i64::deserialize(buf)?,
            title: String::deserialize(buf)?,
            slug: String::deserialize(buf)?,
            pattern_document_id: i64::deserialize(buf)?,
            center_color: i32::deserialize(buf)?,
            edge_color: i32::deserialize(buf)?,
            pattern_color: i32::deserialize(buf)?,
            text_color: i32::deserialize(buf)?,
            until: read_if(flags, 0, buf)?,
        })
    }
}

/// `peerColor`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PeerColor {
    pub color: Option<i32>,
    pub background_emoji_id: Option<i64>,
}

impl Identifiable for PeerColor {
    const CONSTRUCTOR_ID: u32 = 0xb54b5acf;
}

impl Serializable for PeerColor {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        (flag(self.color.is_some(), 0) | flag(self.background_emoji_id.is_some(), 1)).serialize(buf);
        self.color.serialize(buf);
        self.background_emoji_id.serialize(buf);
    }
}

impl Deserializable for PeerColor {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self { color: read_if(flags, 0, buf)?, background_emoji_id: read_if(flags, 1, buf)? })
    }
}

tl_struct! {
    pub struct RestrictionReason = 0xd072acb4 {
        pub platform: String,
        pub reason: String,
        pub text: String,
    }
}

// ─── Chats ───────────────────────────────────────────────────────────────────

tl_struct! { pub struct ChatPhotoEmpty = 0x37c1011c {} }

/// `chatPhoto`
#[derive(Clone, Debug, PartialEq)]
pub struct ChatPhoto {
    pub has_video: bool,
    pub photo_id: i64,
    pub stripped_thumb: Option<Vec<u8>>,
    pub dc_id: i32,
}

impl Identifiable for ChatPhoto {
    const CONSTRUCTOR_ID: u32 = 0x1c6e1c11;
}

impl Serializable for ChatPhoto {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        (flag(self.has_video, 0) | flag(self.stripped_thumb.is_some(), 1)).serialize(buf);
        self.photo_id.serialize(buf);
        self.stripped_thumb.serialize(buf);
        self.dc_id.serialize(buf);
    }
}

impl Deserializable for ChatPhoto {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            has_video: has(flags, 0),
            photo_id: i64::deserialize(buf)?,
            stripped_thumb: read_if(flags, 1, buf)?,
            dc_id: i32::deserialize(buf)?,
        })
    }
}

tl_struct! {
    /// `chatAdminRights`: the rights are the bits of `flags`.
    pub struct ChatAdminRights = 0x5fb224d5 { pub flags: u32 }
}

tl_struct! {
    /// `chatBannedRights`: the restrictions are the bits of `flags`.
    pub struct ChatBannedRights = 0x9f120418 { pub flags: u32, pub until_date: i32 }
}

tl_struct! { pub struct ChatEmpty = 0x29562865 { pub id: i64 } }

/// `chat`: a basic group.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Chat {
    pub creator: bool,
    pub left: bool,
    pub deactivated: bool,
    pub call_active: bool,
    pub call_not_empty: bool,
    pub noforwards: bool,
    pub id: i64,
    pub title: String,
    pub photo: enums::ChatPhoto,
    pub participants_count: i32,
    pub date: i32,
    pub version: i32,
    pub migrated_to: Option<enums::InputChannel>,
    pub admin_rights: Option<enums::ChatAdminRights>,
    pub default_banned_rights: Option<enums::ChatBannedRights>,
}

impl Identifiable for Chat {
    const CONSTRUCTOR_ID: u32 = 0x41cbf256;
}

impl Serializable for Chat {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let flags = flag(self.creator, 0)
            | flag(self.left, 2)
            | flag(self.deactivated, 5)
            | flag(self.migrated_to.is_some(), 6)
            | flag(self.admin_rights.is_some(), 14)
            | flag(self.default_banned_rights.is_some(), 18)
            | flag(self.call_active, 23)
            | flag(self.call_not_empty, 24)
            | flag(self.noforwards, 25);
        flags.serialize(buf);
        self.id.serialize(buf);
        self.title.serialize(buf);
        self.photo.serialize(buf);
        self.participants_count.serialize(buf);
        self.date.serialize(buf);
        self.version.serialize(buf);
        self.migrated_to.serialize(buf);
        self.admin_rights.serialize(buf);
        self.default_banned_rights.serialize(buf);
    }
}

impl Deserializable for Chat {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            creator: has(flags, 0),
            left: has(flags, 2),
            deactivated: has(flags, 5),
            call_active: has(flags, 23),
            call_not_empty: has(flags, 24),
            noforwards: has(flags, 25),
            id: i64::deserialize(buf)?,
            title: String::deserialize(buf)?,
            photo: enums::ChatPhoto::deserialize(buf)?,
            participants_count: i32::deserialize(buf)?,
            date: i32::deserialize(buf)?,
            version: i32::deserialize(buf)?,
            migrated_to: read_if(flags, 6, buf)?,
            admin_rights: read_if(flags, 14, buf)?,
            default_banned_rights: read_if(flags, 18, buf)?,
        })
    }
}

tl_struct! { pub struct ChatForbidden = 0x6592a1a7 { pub id: i64, pub title: String } }

/// `channel`: a broadcast channel or a supergroup (`megagroup`).
///
/// `restricted` shares its flag bit with `restriction_reason`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Channel {
    pub creator: bool,
    pub left: bool,
    pub broadcast: bool,
    pub verified: bool,
    pub megagroup: bool,
    pub restricted: bool,
    pub signatures: bool,
    pub min: bool,
    pub scam: bool,
    pub has_link: bool,
    pub has_geo: bool,
    pub slowmode_enabled: bool,
    pub call_active: bool,
    pub call_not_empty: bool,
    pub fake: bool,
    pub gigagroup: bool,
    pub noforwards: bool,
    pub join_to_send: bool,
    pub join_request: bool,
    pub forum: bool,
    pub stories_hidden: bool,
    pub stories_hidden_min: bool,
    pub stories_unavailable: bool,
    pub signature_profiles: bool,
    pub autotranslation: bool,
    pub broadcast_messages_allowed: bool,
    pub monoforum: bool,
    pub forum_tabs: bool,
    pub id: i64,
    pub access_hash: Option<i64>,
    pub title: String,
    pub username: Option<String>,
    pub photo: enums::ChatPhoto,
    pub date: i32,
    pub restriction_reason: Option<Vec<enums::RestrictionReason>>,
    pub admin_rights: Option<enums::ChatAdminRights>,
    pub banned_rights: Option<enums::ChatBannedRights>,
    pub default_banned_rights: Option<enums::ChatBannedRights>,
    pub participants_count: Option<i32>,
    pub usernames: Option<Vec<enums::Username>>,
    pub stories_max_id: Option<i32>,
    pub color: Option<enums::PeerColor>,
    pub profile_color: Option<enums::PeerColor>,
    pub emoji_status: Option<enums::EmojiStatus>,
    pub level: Option<i32>,
    pub subscription_until_date: Option<i32>,
    pub bot_verification_icon: Option<i64>,
    pub send_paid_messages_stars: Option<i64>,
    pub linked_monoforum_id: Option<i64>,
}

impl Identifiable for Channel {
    const CONSTRUCTOR_ID: u32 = 0xfe685355;
}

impl Serializable for Channel {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let restricted = self.restricted || self.restriction_reason.is_some();
        let flags = flag(self.creator, 0)
            | flag(self.left, 2)
            | flag(self.broadcast, 5)
            | flag(self.username.is_some(), 6)
            | flag(self.verified, 7)
            | flag(self.megagroup, 8)
            | flag(restricted, 9)
            | flag(self.signatures, 11)
            | flag(self.min, 12)
            | flag(self.access_hash.is_some(), 13)
            | flag(self.admin_rights.is_some(), 14)
            | flag(self.banned_rights.is_some(), 15)
            | flag(self.participants_count.is_some(), 17)
            | flag(self.default_banned_rights.is_some(), 18)
            | flag(self.scam, 19)
            | flag(self.has_link, 20)
            | flag(self.has_geo, 21)
            | flag(self.slowmode_enabled, 22)
            | flag(self.call_active, 23)
            | flag(self.call_not_empty, 24)
            | flag(self.fake, 25)
            | flag(self.gigagroup, 26)
            | flag(self.noforwards, 27)
            | flag(self.join_to_send, 28)
            | flag(self.join_request, 29)
            | flag(self.forum, 30);
        let flags2 = flag(self.usernames.is_some(), 0)
            | flag(self.stories_hidden, 1)
            | flag(self.stories_hidden_min, 2)
            | flag(self.stories_unavailable, 3)
            | flag(self.stories_max_id.is_some(), 4)
            | flag(self.color.is_some(), 7)
            | flag(self.profile_color.is_some(), 8)
            | flag(self.emoji_status.is_some(), 9)
            | flag(self.level.is_some(), 10)
            | flag(self.subscription_until_date.is_some(), 11)
            | flag(self.signature_profiles, 12)
            | flag(self.bot_verification_icon.is_some(), 13)
            | flag(self.send_paid_messages_stars.is_some(), 14)
            | flag(self.autotranslation, 15)
            | flag(self.broadcast_messages_allowed, 16)
            | flag(self.monoforum, 17)
            | flag(self.linked_monoforum_id.is_some(), 18)
            | flag(self.forum_tabs, 19);
        flags.serialize(buf);
        flags2.serialize(buf);
        self.id.serialize(buf);
        self.access_hash.serialize(buf);
        self.title.serialize(buf);
        self.username.serialize(buf);
        self.photo.serialize(buf);
        self.date.serialize(buf);
        if restricted {
            self.restriction_reason.clone().unwrap_or_default().serialize(buf);
        }
        self.admin_rights.serialize(buf);
        self.banned_rights.serialize(buf);
        self.default_banned_rights.serialize(buf);
        self.participants_count.serialize(buf);
        self.usernames.serialize(buf);
        self.stories_max_id.serialize(buf);
        self.color.serialize(buf);
        self.profile_color.serialize(buf);
        self.emoji_status.serialize(buf);
        self.level.serialize(buf);
        self.subscription_until_date.serialize(buf);
        self.bot_verification_icon.serialize(buf);
        self.send_paid_messages_stars.serialize(buf);
        self.linked_monoforum_id.serialize(buf);
    }
}

impl Deserializable for Channel {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        let flags2 = u32::deserialize(buf)?;
        Ok(Self {
            creator: has(flags, 0),
            left: has(flags, 2),
            broadcast: has(flags, 5),
            verified: has(flags, 7),
            megagroup: has(flags, 8),
            restricted: has(flags, 9),
            signatures: has(flags, 11),
            min: has(flags, 12),
            scam: has(flags, 19),
            has_link: has(flags, 20),
            has_geo: has(flags, 21),
            slowmode_enabled: has(flags, 22),
            call_active: has(flags, 23),
            call_not_empty: has(flags, 24),
            fake: has(flags, 25),
            gigagroup: has(flags, 26),
            noforwards: has(flags, 27),
            join_to_send: has(flags, 28),
            join_request: has(flags, 29),
            forum: has(flags, 30),
            stories_hidden: has(flags2, 1),
            stories_hidden_min: has(flags2, 2),
            stories_unavailable: has(flags2, 3),
            signature_profiles: has(flags2, 12),
            autotranslation: has(flags2, 15),
            broadcast_messages_allowed: has(flags2, 16),
            monoforum: has(flags2, 17),
            forum_tabs: has(flags2, 19),
            id: i64::deserialize(buf)?,
            access_hash: read_if(flags, 13, buf)?,
            title: String::deserialize(buf)?,
            username: read_if(flags, 6, buf)?,
            photo: enums::ChatPhoto::deserialize(buf)?,
            date: i32::deserialize(buf)?,
            restriction_reason: read_if(flags, 9, buf)?,
            admin_rights: read_if(flags, 14, buf)?,
            banned_rights: read_if(flags, 15, buf)?,
            default_banned_rights: read_if(flags, 18, buf)?,
            participants_count: read_if(flags, 17, buf)?,
            usernames: read_if(flags2, 0, buf)?,
            stories_max_id: read_if(flags2, 4, buf)?,
            color: read_if(flags2, 7, buf)?,
            profile_color: read_if(flags2, 8, buf)?,
            emoji_status: read_if(flags2, 9, buf)?,
            level: read_if(flags2, 10, buf)?,
            subscription_until_date: read_if(flags2, 11, buf)?,
            bot_verification_icon: read_if(flags2, 13, buf)?,
            send_paid_messages_stars: read_if(flags2, 14, buf)?,
            linked_monoforum_id: read_if(flags2, 18, buf)?,
        })
    }
}

/// `channelForbidden`: a channel the account was banned from.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelForbidden {
    pub broadcast: bool,
    pub megagroup: bool,
    pub id: i64,
    pub access_hash: i64,
    pub title: String,
    pub until_date: Option<i32>,
}

impl Identifiable for ChannelForbidden {
    const CONSTRUCTOR_ID: u32 = 0x17d493d5;
}

impl Serializable for ChannelForbidden {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        (flag(self.broadcast, 5) | flag(self.megagroup, 8) | flag(self.until_date.is_some(), 16)).serialize(buf);
        self.id.serialize(buf);
        self.access_hash.serialize(buf);
        self.title.serialize(buf);
        self.until_date.serialize(buf);
    }
}

impl Deserializable for ChannelForbidden {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            broadcast: has(flags, 5),
            megagroup: has(flags, 8),
            id: i64::deserialize(buf)?,
            access_hash: i64::deserialize(buf)?,
            title: String::deserialize(buf)?,
            until_date: read_if(flags, 16, buf)?,
        })
    }
}

// ─── Message entities ────────────────────────────────────────────────────────

tl_struct! { pub struct MessageEntityUnknown = 0xbb92ba95 { pub offset: i32, pub length: i32 } }
tl_struct! { pub struct MessageEntityMention = 0xfa04579d { pub offset: i32, pub length: i32 } }
tl_struct! { pub struct MessageEntityHashtag = 0x6f635b0d { pub offset: i32, pub length: i32 } }
tl_struct! { pub struct MessageEntityBotCommand = 0x6cef8ac7 { pub offset: i32, pub length: i32 } }
tl_struct! { pub struct MessageEntityUrl = 0x6ed02538 { pub offset: i32, pub length: i32 } }
tl_struct! { pub struct MessageEntityEmail = 0x64e475c2 { pub offset: i32, pub length: i32 } }
tl_struct! { pub struct MessageEntityBold = 0xbd610bc9 { pub offset: i32, pub length: i32 } }
tl_struct! { pub struct MessageEntityItalic = 0x826f8b60 { pub offset: i32, pub length: i32 } }
tl_struct! { pub struct MessageEntityCode = 0x28a20571 { pub offset: i32, pub length: i32 } }
tl_struct! { pub struct MessageEntityPhone = 0x9b69e34b { pub offset: i32, pub length: i32 } }
tl_struct! { pub struct MessageEntityCashtag = 0x4c4e743f { pub offset: i32, pub length: i32 } }
tl_struct! { pub struct MessageEntityUnderline = 0x9c4e7e8b { pub offset: i32, pub length: i32 } }
tl_struct! { pub struct MessageEntityStrike = 0xbf0693d4 { pub offset: i32, pub length: i32 } }
tl_struct! { pub struct MessageEntityBankCard = 0x761e6af4 { pub offset: i32, pub length: i32 } }
tl_struct! { pub struct MessageEntitySpoiler = 0x32ca960f { pub offset: i32, pub length: i32 } }

tl_struct! {
    pub struct MessageEntityPre = 0x73924be0 {
        pub offset: i32,
        pub length: i32,
        pub language: String,
    }
}

tl_struct! {
    pub struct MessageEntityTextUrl = 0x76a6d327 {
        pub offset: i32,
        pub length: i32,
        pub url: String,
    }
}

tl_struct! {
    pub struct MessageEntityMentionName = 0xdc7b1140 {
        pub offset: i32,
        pub length: i32,
        pub user_id: i64,
    }
}

tl_struct! {
    pub struct MessageEntityCustomEmoji = 0xc8cf05f8 {
        pub offset: i32,
        pub length: i32,
        pub document_id: i64,
    }
}

/// `messageEntityBlockquote`
#[derive(Clone, Debug, PartialEq)]
pub struct MessageEntityBlockquote {
    pub collapsed: bool,
    pub offset: i32,
    pub length: i32,
}

impl Identifiable for MessageEntityBlockquote {
    const CONSTRUCTOR_ID: u32 = 0xf1ccaaac;
}

impl Serializable for MessageEntityBlockquote {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        flag(self.collapsed, 0).serialize(buf);
        self.offset.serialize(buf);
        self.length.serialize(buf);
    }
}

impl Deserializable for MessageEntityBlockquote {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self { collapsed: has(flags, 0), offset: i32::deserialize(buf)?, length: i32::deserialize(buf)? })
    }
}

tl_struct! {
    pub struct TextWithEntities = 0x751f3146 {
        pub text: String,
        pub entities: Vec<enums::MessageEntity>,
    }
}

// ─── Message headers ─────────────────────────────────────────────────────────

/// `messageFwdHeader`: where a forwarded message came from.
///
/// `saved_from_peer` and `saved_from_msg_id` share flag bit 4; the pair is
/// written only when the peer is present.
#[derive(Clone, Debug, PartialEq)]
pub struct MessageFwdHeader {
    pub imported: bool,
    pub saved_out: bool,
    pub from_id: Option<enums::Peer>,
    pub from_name: Option<String>,
    pub date: i32,
    pub channel_post: Option<i32>,
    pub post_author: Option<String>,
    pub saved_from_peer: Option<enums::Peer>,
    pub saved_from_msg_id: Option<i32>,
    pub saved_from_id: Option<enums::Peer>,
    pub saved_from_name: Option<String>,
    pub saved_date: Option<i32>,
    pub psa_type: Option<String>,
}

impl Identifiable for MessageFwdHeader {
    const CONSTRUCTOR_ID: u32 = 0x4e4df4bb;
}

impl Serializable for MessageFwdHeader {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let flags = flag(self.from_id.is_some(), 0)
            | flag(self.channel_post.is_some(), 2)
            | flag(self.post_author.is_some(), 3)
            | flag(self.saved_from_peer.is_some(), 4)
            | flag(self.from_name.is_some(), 5)
            | flag(self.psa_type.is_some(), 6)
            | flag(self.imported, 7)
            | flag(self.saved_from_id.is_some(), 8)
            | flag(self.saved_from_name.is_some(), 9)
            | flag(self.saved_date.is_some(), 10)
            | flag(self.saved_out, 11);
        flags.serialize(buf);
        self.from_id.serialize(buf);
        self.from_name.serialize(buf);
        self.date.serialize(buf);
        self.channel_post.serialize(buf);
        self.post_author.serialize(buf);
        if let Some(peer) = &self.saved_from_peer {
            peer.serialize(buf);
            self.saved_from_msg_id.unwrap_or_default().serialize(buf);
        }
        self.saved_from_id.serialize(buf);
        self.saved_from_name.serialize(buf);
        self.saved_date.serialize(buf);
        self.psa_type.serialize(buf);
    }
}

impl Deserializable for MessageFwdHeader {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            imported: has(flags, 7),
            saved_out: has(flags, 11),
            from_id: read_if(flags, 0, buf)?,
            from_name: read_if(flags, 5, buf)?,
            date: i32::deserialize(buf)?,
            channel_post: read_if(flags, 2, buf)?,
            post_author: read_if(flags, 3, buf)?,
            saved_from_peer: read_if(flags, 4, buf)?,
            saved_from_msg_id: read_if(flags, 4, buf)?,
            saved_from_id: read_if(flags, 8, buf)?,
            saved_from_name: read_if(flags, 9, buf)?,
            saved_date: read_if(flags, 10, buf)?,
            psa_type: read_if(flags, 6, buf)?,
        })
    }
}

/// `messageReplyHeader`: what a message replies to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MessageReplyHeader {
    pub reply_to_scheduled: bool,
    pub forum_topic: bool,
    pub quote: bool,
    pub reply_to_msg_id: Option<i32>,
    pub reply_to_peer_id: Option<enums::Peer>,
    pub reply_from: Option<enums::MessageFwdHeader>,
    pub reply_media: Option<enums::MessageMedia>,
    pub reply_to_top_id: Option<i32>,
    pub quote_text: Option<String>,
    pub quote_entities: Option<Vec<enums::MessageEntity>>,
    pub quote_offset: Option<i32>,
    pub todo_item_id: Option<i32>,
}

impl Identifiable for MessageReplyHeader {
    const CONSTRUCTOR_ID: u32 = 0x6917560b;
}

impl Serializable for MessageReplyHeader {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let flags = flag(self.reply_to_peer_id.is_some(), 0)
            | flag(self.reply_to_top_id.is_some(), 1)
            | flag(self.reply_to_scheduled, 2)
            | flag(self.forum_topic, 3)
            | flag(self.reply_to_msg_id.is_some(), 4)
            | flag(self.reply_from.is_some(), 5)
            | flag(self.quote_text.is_some(), 6)
            | flag(self.quote_entities.is_some(), 7)
            | flag(self.reply_media.is_some(), 8)
            | flag(self.quote, 9)
            | flag(self.quote_offset.is_some(), 10)
            | flag(self.todo_item_id.is_some(), 11);
        flags.serialize(buf);
        self.reply_to_msg_id.serialize(buf);
        self.reply_to_peer_id.serialize(buf);
        self.reply_from.serialize(buf);
        self.reply_media.serialize(buf);
        self.reply_to_top_id.serialize(buf);
        self.quote_text.serialize(buf);
        self.quote_entities.serialize(buf);
        self.quote_offset.serialize(buf);
        self.todo_item_id.serialize(buf);
    }
}

impl Deserializable for MessageReplyHeader {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            reply_to_scheduled: has(flags, 2),
            forum_topic: has(flags, 3),
            quote: has(flags, 9),
            reply_to_msg_id: read_if(flags, 4, buf)?,
            reply_to_peer_id: read_if(flags, 0, buf)?,
            reply_from: read_if(flags, 5, buf)?,
            reply_media: read_if(flags, 8, buf)?,
            reply_to_top_id: read_if(flags, 1, buf)?,
            quote_text: read_if(flags, 6, buf)?,
            quote_entities: read_if(flags, 7, buf)?,
            quote_offset: read_if(flags, 10, buf)?,
            todo_item_id: read_if(flags, 11, buf)?,
        })
    }
}

tl_struct! {
    pub struct MessageReplyStoryHeader = 0x0e5af939 {
        pub peer: enums::Peer,
        pub story_id: i32,
    }
}

/// `messageReplies`: the comment or reply thread attached to a message.
///
/// `comments` shares flag bit 0 with `channel_id`.
#[derive(Clone, Debug, PartialEq)]
pub struct MessageReplies {
    pub comments: bool,
    pub replies: i32,
    pub replies_pts: i32,
    pub recent_repliers: Option<Vec<enums::Peer>>,
    pub channel_id: Option<i64>,
    pub max_id: Option<i32>,
    pub read_max_id: Option<i32>,
}

impl Identifiable for MessageReplies {
    const CONSTRUCTOR_ID: u32 = 0x83d60fc2;
}

impl Serializable for MessageReplies {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let comments = self.comments || self.channel_id.is_some();
        let flags = flag(comments, 0)
            | flag(self.recent_repliers.is_some(), 1)
            | flag(self.max_id.is_some(), 2)
            | flag(self.read_max_id.is_some(), 3);
        flags.serialize(buf);
        self.replies.serialize(buf);
        self.replies_pts.serialize(buf);
        self.recent_repliers.serialize(buf);
        if comments {
            self.channel_id.unwrap_or_default().serialize(buf);
        }
        self.max_id.serialize(buf);
        self.read_max_id.serialize(buf);
    }
}

impl Deserializable for MessageReplies {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            comments: has(flags, 0),
            replies: i32::deserialize(buf)?,
            replies_pts: i32::deserialize(buf)?,
            recent_repliers: read_if(flags, 1, buf)?,
            channel_id: read_if(flags, 0, buf)?,
            max_id: read_if(flags, 2, buf)?,
            read_max_id: read_if(flags, 3, buf)?,
        })
    }
}

// ─── Reactions ───────────────────────────────────────────────────────────────

tl_struct! { pub struct ReactionEmpty = 0x79f5d419 {} }
tl_struct! { pub struct ReactionEmoji = 0x1b2286b8 { pub emoticon: String } }
tl_struct! { pub struct ReactionCustomEmoji = 0x8935fc73 { pub document_id: i64 } }
tl_struct! { pub struct ReactionPaid = 0x523da4eb {} }

/// `reactionCount`
#[derive(Clone, Debug, PartialEq)]
pub struct ReactionCount {
    pub chosen_order: Option<i32>,
    pub reaction: enums::Reaction,
    pub count: i32,
}

impl Identifiable for ReactionCount {
    const CONSTRUCTOR_ID: u32 = 0xa3d1cb80;
}

impl Serializable for ReactionCount {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        flag(self.chosen_order.is_some(), 0).serialize(buf);
        self.chosen_order.serialize(buf);
        self.reaction.serialize(buf);
        self.count.serialize(buf);
    }
}

impl Deserializable for ReactionCount {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            chosen_order: read_if(flags, 0, buf)?,
            reaction: enums::Reaction::deserialize(buf)?,
            count: i32::deserialize(buf)?,
        })
    }
}

/// `messagePeerReaction`
#[derive(Clone, Debug, PartialEq)]
pub struct MessagePeerReaction {
    pub big: bool,
    pub unread: bool,
    pub my: bool,
    pub peer_id: enums::Peer,
    pub date: i32,
    pub reaction: enums::Reaction,
}

impl Identifiable for MessagePeerReaction {
    const CONSTRUCTOR_ID: u32 = 0x8c79b63c;
}

impl Serializable for MessagePeerReaction {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        (flag(self.big, 0) | flag(self.unread, 1) | flag(self.my, 2)).serialize(buf);
        self.peer_id.serialize(buf);
        self.date.serialize(buf);
        self.reaction.serialize(buf);
    }
}

impl Deserializable for MessagePeerReaction {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            big: has(flags, 0),
            unread: has(flags, 1),
            my: has(flags, 2),
            peer_id: enums::Peer::deserialize(buf)?,
            date: i32::deserialize(buf)?,
            reaction: enums::Reaction::deserialize(buf)?,
        })
    }
}

/// `messageReactor`: a sender of paid reactions.
#[derive(Clone, Debug, PartialEq)]
pub struct MessageReactor {
    pub top: bool,
    pub my: bool,
    pub anonymous: bool,
    pub peer_id: Option<enums::Peer>,
    pub count: i32,
}

impl Identifiable for MessageReactor {
    const CONSTRUCTOR_ID: u32 = 0x4ba3a95a;
}

impl Serializable for MessageReactor {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let flags = flag(self.top, 0) | flag(self.my, 1) | flag(self.anonymous, 2) | flag(self.peer_id.is_some(), 3);
        flags.serialize(buf);
        self.peer_id.serialize(buf);
        self.count.serialize(buf);
    }
}

impl Deserializable for MessageReactor {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            top: has(flags, 0),
            my: has(flags, 1),
            anonymous: has(flags, 2),
            peer_id: read_if(flags, 3, buf)?,
            count: i32::deserialize(buf)?,
        })
    }
}

/// `messageReactions`
#[derive(Clone, Debug, PartialEq)]
pub struct MessageReactions {
    pub min: bool,
    pub can_see_list: bool,
    pub reactions_as_tags: bool,
    pub results: Vec<enums::ReactionCount>,
    pub recent_reactions: Option<Vec<enums::MessagePeerReaction>>,
    pub top_reactors: Option<Vec<enums::MessageReactor>>,
}

impl Identifiable for MessageReactions {
    const CONSTRUCTOR_ID: u32 = 0x0a339f0b;
}

impl Serializable for MessageReactions {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let flags = flag(self.min, 0)
            | flag(self.recent_reactions.is_some(), 1)
            | flag(self.can_see_list, 2)
            | flag(self.reactions_as_tags, 3)
            | flag(self.top_reactors.is_some(), 4);
        flags.serialize(buf);
        self.results.serialize(buf);
        self.recent_reactions.serialize(buf);
        self.top_reactors.serialize(buf);
    }
}

impl Deserializable for MessageReactions {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            min: has(flags, 0),
            can_see_list: has(flags, 2),
            reactions_as_tags: has(flags, 3),
            results: Vec::deserialize(buf)?,
            recent_reactions: read_if(flags, 1, buf)?,
            top_reactors: read_if(flags, 4, buf)?,
        })
    }
}

// ─── Message extras ──────────────────────────────────────────────────────────

/// `factCheck`
///
/// `country` and `text` share flag bit 1 and are written only as a pair.
#[derive(Clone, Debug, PartialEq)]
pub struct FactCheck {
    pub need_check: bool,
    pub country: Option<String>,
    pub text: Option<enums::TextWithEntities>,
    pub hash: i64,
}

impl Identifiable for FactCheck {
    const CONSTRUCTOR_ID: u32 = 0xb89bfccf;
}

impl Serializable for FactCheck {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let checked = match (&self.country, &self.text) {
            (Some(country), Some(text)) => Some((country, text)),
            _ => None,
        };
        (flag(self.need_check, 0) | flag(checked.is_some(), 1)).serialize(buf);
        if let Some((country, text)) = checked {
            country.serialize(buf);
            text.serialize(buf);
        }
        self.hash.serialize(buf);
    }
}

impl Deserializable for FactCheck {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            need_check: has(flags, 0),
            country: read_if(flags, 1, buf)?,
            text: read_if(flags, 1, buf)?,
            hash: i64::deserialize(buf)?,
        })
    }
}

tl_struct! { pub struct StarsAmount = 0xbbb6b4a3 { pub amount: i64, pub nanos: i32 } }
tl_struct! { pub struct StarsTonAmount = 0x74aee3e0 { pub amount: i64 } }

/// `suggestedPost`
#[derive(Clone, Debug, PartialEq)]
pub struct SuggestedPost {
    pub accepted: bool,
    pub rejected: bool,
    pub price: Option<enums::StarsAmount>,
    pub schedule_date: Option<i32>,
}

impl Identifiable for SuggestedPost {
    const CONSTRUCTOR_ID: u32 = 0x0e8e37e5;
}

impl Serializable for SuggestedPost {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let flags = flag(self.schedule_date.is_some(), 0)
            | flag(self.accepted, 1)
            | flag(self.rejected, 2)
            | flag(self.price.is_some(), 3);
        flags.serialize(buf);
        self.price.serialize(buf);
        self.schedule_date.serialize(buf);
    }
}

impl Deserializable for SuggestedPost {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            accepted: has(flags, 1),
            rejected: has(flags, 2),
            price: read_if(flags, 3, buf)?,
            schedule_date: read_if(flags, 0, buf)?,
        })
    }
}

// ─── Media: geo ──────────────────────────────────────────────────────────────

tl_struct! { pub struct GeoPointEmpty = 0x1117dd5f {} }

/// `geoPoint`
#[derive(Clone, Debug, PartialEq)]
pub struct GeoPoint {
    pub long: f64,
    pub lat: f64,
    pub access_hash: i64,
    pub accuracy_radius: Option<i32>,
}

impl Identifiable for GeoPoint {
    const CONSTRUCTOR_ID: u32 = 0xb2a2f663;
}

impl Serializable for GeoPoint {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        flag(self.accuracy_radius.is_some(), 0).serialize(buf);
        self.long.serialize(buf);
        self.lat.serialize(buf);
        self.access_hash.serialize(buf);
        self.accuracy_radius.serialize(buf);
    }
}

impl Deserializable for GeoPoint {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            long: f64::deserialize(buf)?,
            lat: f64::deserialize(buf)?,
            access_hash: i64::deserialize(buf)?,
            accuracy_radius: read_if(flags, 0, buf)?,
        })
    }
}

// ─── Media: photos ───────────────────────────────────────────────────────────

tl_struct! { pub struct PhotoSizeEmpty = 0x0e17e23c { pub r#type: String } }

tl_struct! {
    pub struct PhotoSize = 0x75c78e60 {
        pub r#type: String,
        pub w: i32,
        pub h: i32,
        pub size: i32,
    }
}

tl_struct! {
    pub struct PhotoCachedSize = 0x021e1ad6 {
        pub r#type: String,
        pub w: i32,
        pub h: i32,
        pub bytes: Vec<u8>,
    }
}

tl_struct! { pub struct PhotoStrippedSize = 0xe0b0bc2e { pub r#type: String, pub bytes: Vec<u8> } }

tl_struct! {
    pub struct PhotoSizeProgressive = 0xfa3efb95 {
        pub r#type: String,
        pub w: i32,
        pub h: i32,
        pub sizes: Vec<i32>,
    }
}

tl_struct! { pub struct PhotoPathSize = 0xd8214d41 { pub r#type: String, pub bytes: Vec<u8> } }

/// `videoSize`
#[derive(Clone, Debug, PartialEq)]
pub struct VideoSize {
    pub r#type: String,
    pub w: i32,
    pub h: i32,
    pub size: i32,
    pub video_start_ts: Option<f64>,
}

impl Identifiable for VideoSize {
    const CONSTRUCTOR_ID: u32 = 0xde33b094;
}

impl Serializable for VideoSize {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        flag(self.video_start_ts.is_some(), 0).serialize(buf);
        self.r#type.serialize(buf);
        self.w.serialize(buf);
        self.h.serialize(buf);
        self.size.serialize(buf);
        self.video_start_ts.serialize(buf);
    }
}

impl Deserializable for VideoSize {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            r#type: String::deserialize(buf)?,
            w: i32::deserialize(buf)?,
            h: i32::deserialize(buf)?,
            size: i32::deserialize(buf)?,
            video_start_ts: read_if(flags, 0, buf)?,
        })
    }
}

tl_struct! {
    pub struct VideoSizeEmojiMarkup = 0xf85c413c {
        pub emoji_id: i64,
        pub background_colors: Vec<i32>,
    }
}

tl_struct! {
    pub struct VideoSizeStickerMarkup = 0x0da082fe {
        pub stickerset: enums::InputStickerSet,
        pub sticker_id: i64,
        pub background_colors: Vec<i32>,
    }
}

tl_struct! { pub struct PhotoEmpty = 0x2331b22d { pub id: i64 } }

/// `photo`
#[derive(Clone, Debug, PartialEq)]
pub struct Photo {
    pub has_stickers: bool,
    pub id: i64,
    pub access_hash: i64,
    pub file_reference: Vec<u8>,
    pub date: i32,
    pub sizes: Vec<enums::PhotoSize>,
    pub video_sizes: Option<Vec<enums::VideoSize>>,
    pub dc_id: i32,
}

impl Identifiable for Photo {
    const CONSTRUCTOR_ID: u32 = 0xfb197a65;
}

impl Serializable for Photo {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        (flag(self.has_stickers, 0) | flag(self.video_sizes.is_some(), 1)).serialize(buf);
        self.id.serialize(buf);
        self.access_hash.serialize(buf);
        self.file_reference.serialize(buf);
        self.date.serialize(buf);
        self.sizes.serialize(buf);
        self.video_sizes.serialize(buf);
        self.dc_id.serialize(buf);
    }
}

impl Deserializable for Photo {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            has_stickers: has(flags, 0),
            id: i64::deserialize(buf)?,
            access_hash: i64::deserialize(buf)?,
            file_reference: Vec::deserialize(buf)?,
            date: i32::deserialize(buf)?,
            sizes: Vec::deserialize(buf)?,
            video_sizes: read_if(flags, 1, buf)?,
            dc_id: i32::deserialize(buf)?,
        })
    }
}

// ─── Media: documents ────────────────────────────────────────────────────────

tl_struct! { pub struct InputStickerSetEmpty = 0xffb62b95 {} }
tl_struct! { pub struct InputStickerSetId = 0x9de7a269 { pub id: i64, pub access_hash: i64 } }
tl_struct! { pub struct InputStickerSetShortName = 0x861cc8a0 { pub short_name: String } }
tl_struct! { pub struct InputStickerSetAnimatedEmoji = 0x028703c8 {} }
tl_struct! { pub struct InputStickerSetDice = 0xe67f520e { pub emoticon: String } }

tl_struct! {
    pub struct MaskCoords = 0xaed6dbb2 {
        pub n: i32,
        pub x: f64,
        pub y: f64,
        pub zoom: f64,
    }
}

tl_struct! { pub struct DocumentAttributeImageSize = 0x6c37c15c { pub w: i32, pub h: i32 } }
tl_struct! { pub struct DocumentAttributeAnimated = 0x11b58939 {} }
tl_struct! { pub struct DocumentAttributeFilename = 0x15590068 { pub file_name: String } }
tl_struct! { pub struct DocumentAttributeHasStickers = 0x9801d2f7 {} }

/// `documentAttributeSticker`
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentAttributeSticker {
    pub mask: bool,
    pub alt: String,
    pub stickerset: enums::InputStickerSet,
    pub mask_coords: Option<enums::MaskCoords>,
}

impl Identifiable for DocumentAttributeSticker {
    const CONSTRUCTOR_ID: u32 = 0x6319d612;
}

impl Serializable for DocumentAttributeSticker {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        (flag(self.mask_coords.is_some(), 0) | flag(self.mask, 1)).serialize(buf);
        self.alt.serialize(buf);
        self.stickerset.serialize(buf);
        self.mask_coords.serialize(buf);
    }
}

impl Deserializable for DocumentAttributeSticker {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            mask: has(flags, 1),
            alt: String::deserialize(buf)?,
            stickerset: enums::InputStickerSet::deserialize(buf)?,
            mask_coords: read_if(flags, 0, buf)?,
        })
    }
}

/// `documentAttributeVideo`
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentAttributeVideo {
    pub round_message: bool,
    pub supports_streaming: bool,
    pub nosound: bool,
    pub duration: f64,
    pub w: i32,
    pub h: i32,
    pub preload_prefix_size: Option<i32>,
    pub video_start_ts: Option<f64>,
    pub video_codec: Option<String>,
}

impl Identifiable for DocumentAttributeVideo {
    const CONSTRUCTOR_ID: u32 = 0x43c57c48;
}

impl Serializable for DocumentAttributeVideo {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let flags = flag(self.round_message, 0)
            | flag(self.supports_streaming, 1)
            | flag(self.preload_prefix_size.is_some(), 2)
            | flag(self.nosound, 3)
            | flag(self.video_start_ts.is_some(), 4)
            | flag(self.video_codec.is_some(), 5);
        flags.serialize(buf);
        self.duration.serialize(buf);
        self.w.serialize(buf);
        self.h.serialize(buf);
        self.preload_prefix_size.serialize(buf);
        self.video_start_ts.serialize(buf);
        self.video_codec.serialize(buf);
    }
}

impl Deserializable for DocumentAttributeVideo {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            round_message: has(flags, 0),
            supports_streaming: has(flags, 1),
            nosound: has(flags, 3),
            duration: f64::deserialize(buf)?,
            w: i32::deserialize(buf)?,
            h: i32::deserialize(buf)?,
            preload_prefix_size: read_if(flags, 2, buf)?,
            video_start_ts: read_if(flags, 4, buf)?,
            video_codec: read_if(flags, 5, buf)?,
        })
    }
}

/// `documentAttributeAudio`
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentAttributeAudio {
    pub voice: bool,
    pub duration: i32,
    pub title: Option<String>,
    pub performer: Option<String>,
    pub waveform: Option<Vec<u8>>,
}

impl Identifiable for DocumentAttributeAudio {
    const CONSTRUCTOR_ID: u32 = 0x9852f9c6;
}

impl Serializable for DocumentAttributeAudio {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let flags = flag(self.title.is_some(), 0)
            | flag(self.performer.is_some(), 1)
            | flag(self.waveform.is_some(), 2)
            | flag(self.voice, 10);
        flags.serialize(buf);
        self.duration.serialize(buf);
        self.title.serialize(buf);
        self.performer.serialize(buf);
        self.waveform.serialize(buf);
    }
}

impl Deserializable for DocumentAttributeAudio {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            voice: has(flags, 10),
            duration: i32::deserialize(buf)?,
            title: read_if(flags, 0, buf)?,
            performer: read_if(flags, 1, buf)?,
            waveform: read_if(flags, 2, buf)?,
        })
    }
}

/// `documentAttributeCustomEmoji`
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentAttributeCustomEmoji {
    pub free: bool,
    pub text_color: bool,
    pub alt: String,
    pub stickerset: enums::InputStickerSet,
}

impl Identifiable for DocumentAttributeCustomEmoji {
    const CONSTRUCTOR_ID: u32 = 0xfd149899;
}

impl Serializable for DocumentAttributeCustomEmoji {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        (flag(self.free, 0) | flag(self.text_color, 1)).serialize(buf);
        self.alt.serialize(buf);
        self.stickerset.serialize(buf);
    }
}

impl Deserializable for DocumentAttributeCustomEmoji {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            free: has(flags, 0),
            text_color: has(flags, 1),
            alt: String::deserialize(buf)?,
            stickerset: enums::InputStickerSet::deserialize(buf)?,
        })
    }
}

tl_struct! { pub struct DocumentEmpty = 0x36f8c871 { pub id: i64 } }

/// `document`
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub id: i64,
    pub access_hash: i64,
    pub file_reference: Vec<u8>,
    pub date: i32,
    pub mime_type: String,
    pub size: i64,
    pub thumbs: Option<Vec<enums::PhotoSize>>,
    pub video_thumbs: Option<Vec<enums::VideoSize>>,
    pub dc_id: i32,
    pub attributes: Vec<enums::DocumentAttribute>,
}

impl Identifiable for Document {
    const CONSTRUCTOR_ID: u32 = 0x8fd4c4d8;
}

impl Serializable for Document {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        (flag(self.thumbs.is_some(), 0) | flag(self.video_thumbs.is_some(), 1)).serialize(buf);
        self.id.serialize(buf);
        self.access_hash.serialize(buf);
        self.file_reference.serialize(buf);
        self.date.serialize(buf);
        self.mime_type.serialize(buf);
        self.size.serialize(buf);
        self.thumbs.serialize(buf);
        self.video_thumbs.serialize(buf);
        self.dc_id.serialize(buf);
        self.attributes.serialize(buf);
    }
}

impl Deserializable for Document {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            id: i64::deserialize(buf)?,
            access_hash: i64::deserialize(buf)?,
            file_reference: Vec::deserialize(buf)?,
            date: i32::deserialize(buf)?,
            mime_type: String::deserialize(buf)?,
            size: i64::deserialize(buf)?,
            thumbs: read_if(flags, 0, buf)?,
            video_thumbs: read_if(flags, 1, buf)?,
            dc_id: i32::deserialize(buf)?,
            attributes: Vec::deserialize(buf)?,
        })
    }
}

// ─── Media: web pages ────────────────────────────────────────────────────────

/// `webPageEmpty`
#[derive(Clone, Debug, PartialEq)]
pub struct WebPageEmpty {
    pub id: i64,
    pub url: Option<String>,
}

impl Identifiable for WebPageEmpty {
    const CONSTRUCTOR_ID: u32 = 0x211a1788;
}

impl Serializable for WebPageEmpty {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        flag(self.url.is_some(), 0).serialize(buf);
        self.id.serialize(buf);
        self.url.serialize(buf);
    }
}

impl Deserializable for WebPageEmpty {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self { id: i64::deserialize(buf)?, url: read_if(flags, 0, buf)? })
    }
}

/// `webPagePending`
#[derive(Clone, Debug, PartialEq)]
pub struct WebPagePending {
    pub id: i64,
    pub url: Option<String>,
    pub date: i32,
}

impl Identifiable for WebPagePending {
    const CONSTRUCTOR_ID: u32 = 0xb0d13e47;
}

impl Serializable for WebPagePending {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        flag(self.url.is_some(), 0).serialize(buf);
        self.id.serialize(buf);
        self.url.serialize(buf);
        self.date.serialize(buf);
    }
}

impl Deserializable for WebPagePending {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self { id: i64::deserialize(buf)?, url: read_if(flags, 0, buf)?, date: i32::deserialize(buf)? })
    }
}

/// `webPage`: a link preview.
///
/// Instant-view pages (`cached_page`, bit 10) and preview attributes
/// (bit 12) are not modelled; a preview carrying either fails to decode.
/// `embed_url`/`embed_type` share bit 5 and `embed_width`/`embed_height`
/// share bit 6; each pair is written only when both halves are present.
#[derive(Clone, Debug, PartialEq)]
pub struct WebPage {
    pub has_large_media: bool,
    pub video_cover_photo: bool,
    pub id: i64,
    pub url: String,
    pub display_url: String,
    pub hash: i32,
    pub r#type: Option<String>,
    pub site_name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub photo: Option<enums::Photo>,
    pub embed_url: Option<String>,
    pub embed_type: Option<String>,
    pub embed_width: Option<i32>,
    pub embed_height: Option<i32>,
    pub duration: Option<i32>,
    pub author: Option<String>,
    pub document: Option<enums::Document>,
}

impl Identifiable for WebPage {
    const CONSTRUCTOR_ID: u32 = 0xe89c45b2;
}

impl Serializable for WebPage {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let embed = self.embed_url.as_ref().zip(self.embed_type.as_ref());
        let size = self.embed_width.zip(self.embed_height);
        let flags = flag(self.r#type.is_some(), 0)
            | flag(self.site_name.is_some(), 1)
            | flag(self.title.is_some(), 2)
            | flag(self.description.is_some(), 3)
            | flag(self.photo.is_some(), 4)
            | flag(embed.is_some(), 5)
            | flag(size.is_some(), 6)
            | flag(self.duration.is_some(), 7)
            | flag(self.author.is_some(), 8)
            | flag(self.document.is_some(), 9)
            | flag(self.has_large_media, 13)
            | flag(self.video_cover_photo, 14);
        flags.serialize(buf);
        self.id.serialize(buf);
        self.url.serialize(buf);
        self.display_url.serialize(buf);
        self.hash.serialize(buf);
        self.r#type.serialize(buf);
        self.site_name.serialize(buf);
        self.title.serialize(buf);
        self.description.serialize(buf);
        self.photo.serialize(buf);
        if let Some((url, kind)) = embed {
            url.serialize(buf);
            kind.serialize(buf);
        }
        if let Some((width, height)) = size {
            width.serialize(buf);
            height.serialize(buf);
        }
        self.duration.serialize(buf);
        self.author.serialize(buf);
        self.document.serialize(buf);
    }
}

impl Deserializable for WebPage {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        let page = Self {
            has_large_media: has(flags, 13),
            video_cover_photo: has(flags, 14),
            id: i64::deserialize(buf)?,
            url: String::deserialize(buf)?,
            display_url: String::deserialize(buf)?,
            hash: i32::deserialize(buf)?,
            r#type: read_if(flags, 0, buf)?,
            site_name: read_if(flags, 1, buf)?,
            title: read_if(flags, 2, buf)?,
            description: read_if(flags, 3, buf)?,
            photo: read_if(flags, 4, buf)?,
            embed_url: read_if(flags, 5, buf)?,
            embed_type: read_if(flags, 5, buf)?,
            embed_width: read_if(flags, 6, buf)?,
            embed_height: read_if(flags, 6, buf)?,
            duration: read_if(flags, 7, buf)?,
            author: read_if(flags, 8, buf)?,
            document: read_if(flags, 9, buf)?,
        };
        if has(flags, 10) || has(flags, 12) {
            return unsupported(buf);
        }
        Ok(page)
    }
}

/// `webPageNotModified`
#[derive(Clone, Debug, PartialEq)]
pub struct WebPageNotModified {
    pub cached_page_views: Option<i32>,
}

impl Identifiable for WebPageNotModified {
    const CONSTRUCTOR_ID: u32 = 0x7311ca11;
}

impl Serializable for WebPageNotModified {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        flag(self.cached_page_views.is_some(), 0).serialize(buf);
        self.cached_page_views.serialize(buf);
    }
}

impl Deserializable for WebPageNotModified {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self { cached_page_views: read_if(flags, 0, buf)? })
    }
}

// ─── Media: message attachments ──────────────────────────────────────────────

tl_struct! { pub struct MessageMediaEmpty = 0x3ded6320 {} }
tl_struct! { pub struct MessageMediaUnsupported = 0x9f84f49e {} }
tl_struct! { pub struct MessageMediaGeo = 0x56e0d474 { pub geo: enums::GeoPoint } }
tl_struct! { pub struct MessageMediaDice = 0x3f7ee58b { pub value: i32, pub emoticon: String } }

tl_struct! {
    pub struct MessageMediaContact = 0x70322949 {
        pub phone_number: String,
        pub first_name: String,
        pub last_name: String,
        pub vcard: String,
        pub user_id: i64,
    }
}

tl_struct! {
    pub struct MessageMediaVenue = 0x2ec0533f {
        pub geo: enums::GeoPoint,
        pub title: String,
        pub address: String,
        pub provider: String,
        pub venue_id: String,
        pub venue_type: String,
    }
}

/// `messageMediaPhoto`
#[derive(Clone, Debug, PartialEq)]
pub struct MessageMediaPhoto {
    pub spoiler: bool,
    pub photo: Option<enums::Photo>,
    pub ttl_seconds: Option<i32>,
}

impl Identifiable for MessageMediaPhoto {
    const CONSTRUCTOR_ID: u32 = 0x695150d7;
}

impl Serializable for MessageMediaPhoto {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        (flag(self.photo.is_some(), 0) | flag(self.ttl_seconds.is_some(), 2) | flag(self.spoiler, 3)).serialize(buf);
        self.photo.serialize(buf);
        self.ttl_seconds.serialize(buf);
    }
}

impl Deserializable for MessageMediaPhoto {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self { spoiler: has(flags, 3), photo: read_if(flags, 0, buf)?, ttl_seconds: read_if(flags, 2, buf)? })
    }
}

/// `messageMediaDocument`
#[derive(Clone, Debug, PartialEq)]
pub struct MessageMediaDocument {
    pub nopremium: bool,
    pub spoiler: bool,
    pub video: bool,
    pub round: bool,
    pub voice: bool,
    pub document: Option<enums::Document>,
    pub alt_documents: Option<Vec<enums::Document>>,
    pub video_cover: Option<enums::Photo>,
    pub video_timestamp: Option<i32>,
    pub ttl_seconds: Option<i32>,
}

impl Identifiable for MessageMediaDocument {
    const CONSTRUCTOR_ID: u32 = 0x52d8ccd9;
}

impl Serializable for MessageMediaDocument {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let flags = flag(self.document.is_some(), 0)
            | flag(self.ttl_seconds.is_some(), 2)
            | flag(self.nopremium, 3)
            | flag(self.spoiler, 4)
            | flag(self.alt_documents.is_some(), 5)
            | flag(self.video, 6)
            | flag(self.round, 7)
            | flag(self.voice, 8)
            | flag(self.video_cover.is_some(), 9)
            | flag(self.video_timestamp.is_some(), 10);
        flags.serialize(buf);
        self.document.serialize(buf);
        self.alt_documents.serialize(buf);
        self.video_cover.serialize(buf);
        self.video_timestamp.serialize(buf);
        self.ttl_seconds.serialize(buf);
    }
}

impl Deserializable for MessageMediaDocument {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            nopremium: has(flags, 3),
            spoiler: has(flags, 4),
            video: has(flags, 6),
            round: has(flags, 7),
            voice: has(flags, 8),
            document: read_if(flags, 0, buf)?,
            alt_documents: read_if(flags, 5, buf)?,
            video_cover: read_if(flags, 9, buf)?,
            video_timestamp: read_if(flags, 10, buf)?,
            ttl_seconds: read_if(flags, 2, buf)?,
        })
    }
}

/// `messageMediaWebPage`
#[derive(Clone, Debug, PartialEq)]
pub struct MessageMediaWebPage {
    pub force_large_media: bool,
    pub force_small_media: bool,
    pub manual: bool,
    pub safe: bool,
    pub webpage: enums::WebPage,
}

impl Identifiable for MessageMediaWebPage {
    const CONSTRUCTOR_ID: u32 = 0xddf10c3b;
}

impl Serializable for MessageMediaWebPage {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let flags = flag(self.force_large_media, 0)
            | flag(self.force_small_media, 1)
            | flag(self.manual, 3)
            | flag(self.safe, 4);
        flags.serialize(buf);
        self.webpage.serialize(buf);
    }
}

impl Deserializable for MessageMediaWebPage {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            force_large_media: has(flags, 0),
            force_small_media: has(flags, 1),
            manual: has(flags, 3),
            safe: has(flags, 4),
            webpage: enums::WebPage::deserialize(buf)?,
        })
    }
}

/// `messageMediaGeoLive`
#[derive(Clone, Debug, PartialEq)]
pub struct MessageMediaGeoLive {
    pub geo: enums::GeoPoint,
    pub heading: Option<i32>,
    pub period: i32,
    pub proximity_notification_radius: Option<i32>,
}

impl Identifiable for MessageMediaGeoLive {
    const CONSTRUCTOR_ID: u32 = 0xb940c666;
}

impl Serializable for MessageMediaGeoLive {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        (flag(self.heading.is_some(), 0) | flag(self.proximity_notification_radius.is_some(), 1)).serialize(buf);
        self.geo.serialize(buf);
        self.heading.serialize(buf);
        self.period.serialize(buf);
        self.proximity_notification_radius.serialize(buf);
    }
}

impl Deserializable for MessageMediaGeoLive {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            geo: enums::GeoPoint::deserialize(buf)?,
            heading: read_if(flags, 0, buf)?,
            period: i32::deserialize(buf)?,
            proximity_notification_radius: read_if(flags, 1, buf)?,
        })
    }
}

tl_struct! { pub struct InputMediaEmpty = 0x9664f57f {} }

// ─── Reply markup ────────────────────────────────────────────────────────────

tl_struct! { pub struct InlineQueryPeerTypeSameBotPm = 0x3081ed9d {} }
tl_struct! { pub struct InlineQueryPeerTypePm = 0x833c0fac {} }
tl_struct! { pub struct InlineQueryPeerTypeChat = 0xd766c50a {} }
tl_struct! { pub struct InlineQueryPeerTypeMegagroup = 0x5ec4be43 {} }
tl_struct! { pub struct InlineQueryPeerTypeBroadcast = 0x6334ee9a {} }
tl_struct! { pub struct InlineQueryPeerTypeBotPm = 0x0e3b2d0c {} }

tl_struct! { pub struct KeyboardButton = 0xa2fa4880 { pub text: String } }
tl_struct! { pub struct KeyboardButtonUrl = 0x258aff05 { pub text: String, pub url: String } }
tl_struct! { pub struct KeyboardButtonRequestPhone = 0xb16a6c29 { pub text: String } }
tl_struct! { pub struct KeyboardButtonRequestGeoLocation = 0xfc796b3f { pub text: String } }
tl_struct! { pub struct KeyboardButtonGame = 0x50f41ccf { pub text: String } }
tl_struct! { pub struct KeyboardButtonBuy = 0xafd93fbb { pub text: String } }
tl_struct! { pub struct KeyboardButtonUserProfile = 0x308660c1 { pub text: String, pub user_id: i64 } }
tl_struct! { pub struct KeyboardButtonWebView = 0x13767230 { pub text: String, pub url: String } }
tl_struct! { pub struct KeyboardButtonSimpleWebView = 0xa0c0505c { pub text: String, pub url: String } }
tl_struct! { pub struct KeyboardButtonCopy = 0x75d2698e { pub text: String, pub copy_text: String } }

/// `keyboardButtonCallback`
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardButtonCallback {
    pub requires_password: bool,
    pub text: String,
    pub data: Vec<u8>,
}

impl Identifiable for KeyboardButtonCallback {
    const CONSTRUCTOR_ID: u32 = 0x35bbdb6b;
}

impl Serializable for KeyboardButtonCallback {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        flag(self.requires_password, 0).serialize(buf);
        self.text.serialize(buf);
        self.data.serialize(buf);
    }
}

impl Deserializable for KeyboardButtonCallback {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self { requires_password: has(flags, 0), text: String::deserialize(buf)?, data: Vec::deserialize(buf)? })
    }
}

/// `keyboardButtonSwitchInline`
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardButtonSwitchInline {
    pub same_peer: bool,
    pub text: String,
    pub query: String,
    pub peer_types: Option<Vec<enums::InlineQueryPeerType>>,
}

impl Identifiable for KeyboardButtonSwitchInline {
    const CONSTRUCTOR_ID: u32 = 0x93b9fbb5;
}

impl Serializable for KeyboardButtonSwitchInline {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        (flag(self.same_peer, 0) | flag(self.peer_types.is_some(), 1)).serialize(buf);
        self.text.serialize(buf);
        self.query.serialize(buf);
        self.peer_types.serialize(buf);
    }
}

impl Deserializable for KeyboardButtonSwitchInline {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            same_peer: has(flags, 0),
            text: String::deserialize(buf)?,
            query: String::deserialize(buf)?,
            peer_types: read_if(flags, 1, buf)?,
        })
    }
}

/// `keyboardButtonUrlAuth`
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardButtonUrlAuth {
    pub text: String,
    pub fwd_text: Option<String>,
    pub url: String,
    pub button_id: i32,
}

impl Identifiable for KeyboardButtonUrlAuth {
    const CONSTRUCTOR_ID: u32 = 0x10b78d29;
}

impl Serializable for KeyboardButtonUrlAuth {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        flag(self.fwd_text.is_some(), 0).serialize(buf);
        self.text.serialize(buf);
        self.fwd_text.serialize(buf);
        self.url.serialize(buf);
        self.button_id.serialize(buf);
    }
}

impl Deserializable for KeyboardButtonUrlAuth {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            text: String::deserialize(buf)?,
            fwd_text: read_if(flags, 0, buf)?,
            url: String::deserialize(buf)?,
            button_id: i32::deserialize(buf)?,
        })
    }
}

/// `keyboardButtonRequestPoll`
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardButtonRequestPoll {
    pub quiz: Option<bool>,
    pub text: String,
}

impl Identifiable for KeyboardButtonRequestPoll {
    const CONSTRUCTOR_ID: u32 = 0xbbc7515d;
}

impl Serializable for KeyboardButtonRequestPoll {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        flag(self.quiz.is_some(), 0).serialize(buf);
        self.quiz.serialize(buf);
        self.text.serialize(buf);
    }
}

impl Deserializable for KeyboardButtonRequestPoll {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self { quiz: read_if(flags, 0, buf)?, text: String::deserialize(buf)? })
    }
}

tl_struct! { pub struct KeyboardButtonRow = 0x77608b83 { pub buttons: Vec<enums::KeyboardButton> } }

/// `replyKeyboardHide`
#[derive(Clone, Debug, PartialEq)]
pub struct ReplyKeyboardHide {
    pub selective: bool,
}

impl Identifiable for ReplyKeyboardHide {
    const CONSTRUCTOR_ID: u32 = 0xa03e5b85;
}

impl Serializable for ReplyKeyboardHide {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        flag(self.selective, 2).serialize(buf);
    }
}

impl Deserializable for ReplyKeyboardHide {
    fn deserialize(buf: Buffer) -> Result<Self> {
        Ok(Self { selective: has(u32::deserialize(buf)?, 2) })
    }
}

/// `replyKeyboardForceReply`
#[derive(Clone, Debug, PartialEq)]
pub struct ReplyKeyboardForceReply {
    pub single_use: bool,
    pub selective: bool,
    pub placeholder: Option<String>,
}

impl Identifiable for ReplyKeyboardForceReply {
    const CONSTRUCTOR_ID: u32 = 0x86b40b08;
}

impl Serializable for ReplyKeyboardForceReply {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        (flag(self.single_use, 1) | flag(self.selective, 2) | flag(self.placeholder.is_some(), 3)).serialize(buf);
        self.placeholder.serialize(buf);
    }
}

impl Deserializable for ReplyKeyboardForceReply {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self { single_use: has(flags, 1), selective: has(flags, 2), placeholder: read_if(flags, 3, buf)? })
    }
}

/// `replyKeyboardMarkup`
#[derive(Clone, Debug, PartialEq)]
pub struct ReplyKeyboardMarkup {
    pub resize: bool,
    pub single_use: bool,
    pub selective: bool,
    pub persistent: bool,
    pub rows: Vec<enums::KeyboardButtonRow>,
    pub placeholder: Option<String>,
}

impl Identifiable for ReplyKeyboardMarkup {
    const CONSTRUCTOR_ID: u32 = 0x85dd99d1;
}

impl Serializable for ReplyKeyboardMarkup {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let flags = flag(self.resize, 0)
            | flag(self.single_use, 1)
            | flag(self.selective, 2)
            | flag(self.placeholder.is_some(), 3)
            | flag(self.persistent, 4);
        flags.serialize(buf);
        self.rows.serialize(buf);
        self.placeholder.serialize(buf);
    }
}

impl Deserializable for ReplyKeyboardMarkup {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            resize: has(flags, 0),
            single_use: has(flags, 1),
            selective: has(flags, 2),
            persistent: has(flags, 4),
            rows: Vec::deserialize(buf)?,
            placeholder: read_if(flags, 3, buf)?,
        })
    }
}

tl_struct! { pub struct ReplyInlineMarkup = 0x48a30254 { pub rows: Vec<enums::KeyboardButtonRow> } }

// ─── Service actions ─────────────────────────────────────────────────────────

tl_struct! { pub struct MessageActionEmpty = 0xb6aef7b0 {} }
tl_struct! { pub struct MessageActionChatCreate = 0xbd47cbad { pub title: String, pub users: Vec<i64> } }
tl_struct! { pub struct MessageActionChatEditTitle = 0xb5a1ce5a { pub title: String } }
tl_struct! { pub struct MessageActionChatEditPhoto = 0x7fcb13a8 { pub photo: enums::Photo } }
tl_struct! { pub struct MessageActionChatDeletePhoto = 0x95e3fbef {} }
tl_struct! { pub struct MessageActionChatAddUser = 0x15cefd00 { pub users: Vec<i64> } }
tl_struct! { pub struct MessageActionChatDeleteUser = 0xa43f30cc { pub user_id: i64 } }
tl_struct! { pub struct MessageActionChatJoinedByLink = 0x031224c3 { pub inviter_id: i64 } }
tl_struct! { pub struct MessageActionChannelCreate = 0x95d2ac92 { pub title: String } }
tl_struct! { pub struct MessageActionChatMigrateTo = 0xe1037f92 { pub channel_id: i64 } }
tl_struct! { pub struct MessageActionChannelMigrateFrom = 0xea3948e9 { pub title: String, pub chat_id: i64 } }
tl_struct! { pub struct MessageActionPinMessage = 0x94bd38ed {} }
tl_struct! { pub struct MessageActionHistoryClear = 0x9fbab604 {} }
tl_struct! { pub struct MessageActionScreenshotTaken = 0x4792929b {} }
tl_struct! { pub struct MessageActionCustomAction = 0xfae69f56 { pub message: String } }
tl_struct! { pub struct MessageActionContactSignUp = 0xf3f25f76 {} }
tl_struct! { pub struct MessageActionChatJoinedByRequest = 0xebbca3cb {} }

/// `messageActionSetMessagesTTL`
#[derive(Clone, Debug, PartialEq)]
pub struct MessageActionSetMessagesTtl {
    pub period: i32,
    pub auto_setting_from: Option<i64>,
}

impl Identifiable for MessageActionSetMessagesTtl {
    const CONSTRUCTOR_ID: u32 = 0x3c134d7b;
}

impl Serializable for MessageActionSetMessagesTtl {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        flag(self.auto_setting_from.is_some(), 0).serialize(buf);
        self.period.serialize(buf);
        self.auto_setting_from.serialize(buf);
    }
}

impl Deserializable for MessageActionSetMessagesTtl {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self { period: i32::deserialize(buf)?, auto_setting_from: read_if(flags, 0, buf)? })
    }
}

// ─── Messages ────────────────────────────────────────────────────────────────

/// `messageEmpty`: a deleted or inaccessible message.
#[derive(Clone, Debug, PartialEq)]
pub struct MessageEmpty {
    pub id: i32,
    pub peer_id: Option<enums::Peer>,
}

impl Identifiable for MessageEmpty {
    const CONSTRUCTOR_ID: u32 = 0x90a6ca84;
}

impl Serializable for MessageEmpty {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        flag(self.peer_id.is_some(), 0).serialize(buf);
        self.id.serialize(buf);
        self.peer_id.serialize(buf);
    }
}

impl Deserializable for MessageEmpty {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self { id: i32::deserialize(buf)?, peer_id: read_if(flags, 0, buf)? })
    }
}

/// `message`: a regular message.
///
/// `views` and `forwards` share flag bit 10; setting either writes both.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub out: bool,
    pub mentioned: bool,
    pub media_unread: bool,
    pub silent: bool,
    pub post: bool,
    pub from_scheduled: bool,
    pub legacy: bool,
    pub edit_hide: bool,
    pub pinned: bool,
    pub noforwards: bool,
    pub invert_media: bool,
    pub offline: bool,
    pub video_processing_pending: bool,
    pub paid_suggested_post_stars: bool,
    pub paid_suggested_post_ton: bool,
    pub id: i32,
    pub from_id: Option<enums::Peer>,
    pub from_boosts_applied: Option<i32>,
    pub peer_id: enums::Peer,
    pub saved_peer_id: Option<enums::Peer>,
    pub fwd_from: Option<enums::MessageFwdHeader>,
    pub via_bot_id: Option<i64>,
    pub via_business_bot_id: Option<i64>,
    pub reply_to: Option<enums::MessageReplyHeader>,
    pub date: i32,
    pub message: String,
    pub media: Option<enums::MessageMedia>,
    pub reply_markup: Option<enums::ReplyMarkup>,
    pub entities: Option<Vec<enums::MessageEntity>>,
    pub views: Option<i32>,
    pub forwards: Option<i32>,
    pub replies: Option<enums::MessageReplies>,
    pub edit_date: Option<i32>,
    pub post_author: Option<String>,
    pub grouped_id: Option<i64>,
    pub reactions: Option<enums::MessageReactions>,
    pub restriction_reason: Option<Vec<enums::RestrictionReason>>,
    pub ttl_period: Option<i32>,
    pub quick_reply_shortcut_id: Option<i32>,
    pub effect: Option<i64>,
    pub factcheck: Option<enums::FactCheck>,
    pub report_delivery_until_date: Option<i32>,
    pub paid_message_stars: Option<i64>,
    pub suggested_post: Option<enums::SuggestedPost>,
}

impl Message {
    /// A plain text message with every optional field unset.
    pub fn new(id: i32, peer_id: enums::Peer, date: i32, message: impl Into<String>) -> Self {
        Self {
            out: false,
            mentioned: false,
            media_unread: false,
            silent: false,
            post: false,
            from_scheduled: false,
            legacy: false,
            edit_hide: false,
            pinned: false,
            noforwards: false,
            invert_media: false,
            offline: false,
            video_processing_pending: false,
            paid_suggested_post_stars: false,
            paid_suggested_post_ton: false,
            id,
            from_id: None,
            from_boosts_applied: None,
            peer_id,
            saved_peer_id: None,
            fwd_from: None,
            via_bot_id: None,
            via_business_bot_id: None,
            reply_to: None,
            date,
            message: message.into(),
            media: None,
            reply_markup: None,
            entities: None,
            views: None,
            forwards: None,
            replies: None,
            edit_date: None,
            post_author: None,
            grouped_id: None,
            reactions: None,
            restriction_reason: None,
            ttl_period: None,
            quick_reply_shortcut_id: None,
            effect: None,
            factcheck: None,
            report_delivery_until_date: None,
            paid_message_stars: None,
            suggested_post: None,
        }
    }
}

impl Identifiable for Message {
    const CONSTRUCTOR_ID: u32 = 0x94345242;
}

impl Serializable for Message {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let counted = self.views.is_some() || self.forwards.is_some();
        let flags = flag(self.out, 1)
            | flag(self.fwd_from.is_some(), 2)
            | flag(self.reply_to.is_some(), 3)
            | flag(self.mentioned, 4)
            | flag(self.media_unread, 5)
            | flag(self.reply_markup.is_some(), 6)
            | flag(self.entities.is_some(), 7)
            | flag(self.from_id.is_some(), 8)
            | flag(self.media.is_some(), 9)
            | flag(counted, 10)
            | flag(self.via_bot_id.is_some(), 11)
            | flag(self.silent, 13)
            | flag(self.post, 14)
            | flag(self.edit_date.is_some(), 15)
            | flag(self.post_author.is_some(), 16)
            | flag(self.grouped_id.is_some(), 17)
            | flag(self.from_scheduled, 18)
            | flag(self.legacy, 19)
            | flag(self.reactions.is_some(), 20)
            | flag(self.edit_hide, 21)
            | flag(self.restriction_reason.is_some(), 22)
            | flag(self.replies.is_some(), 23)
            | flag(self.pinned, 24)
            | flag(self.ttl_period.is_some(), 25)
            | flag(self.noforwards, 26)
            | flag(self.invert_media, 27)
            | flag(self.saved_peer_id.is_some(), 28)
            | flag(self.from_boosts_applied.is_some(), 29)
            | flag(self.quick_reply_shortcut_id.is_some(), 30);
        let flags2 = flag(self.via_business_bot_id.is_some(), 0)
            | flag(self.offline, 1)
            | flag(self.effect.is_some(), 2)
            | flag(self.factcheck.is_some(), 3)
            | flag(self.video_processing_pending, 4)
            | flag(self.report_delivery_until_date.is_some(), 5)
            | flag(self.paid_message_stars.is_some(), 6)
            | flag(self.suggested_post.is_some(), 7)
            | flag(self.paid_suggested_post_stars, 8)
            | flag(self.paid_suggested_post_ton, 9);
        flags.serialize(buf);
        flags2.serialize(buf);
        self.id.serialize(buf);
        self.from_id.serialize(buf);
        self.from_boosts_applied.serialize(buf);
        self.peer_id.serialize(buf);
        self.saved_peer_id.serialize(buf);
        self.fwd_from.serialize(buf);
        self.via_bot_id.serialize(buf);
        self.via_business_bot_id.serialize(buf);
        self.reply_to.serialize(buf);
        self.date.serialize(buf);
        self.message.serialize(buf);
        self.media.serialize(buf);
        self.reply_markup.serialize(buf);
        self.entities.serialize(buf);
        if counted {
            self.views.unwrap_or_default().serialize(buf);
            self.forwards.unwrap_or_default().serialize(buf);
        }
        self.replies.serialize(buf);
        self.edit_date.serialize(buf);
        self.post_author.serialize(buf);
        self.grouped_id.serialize(buf);
        self.reactions.serialize(buf);
        self.restriction_reason.serialize(buf);
        self.ttl_period.serialize(buf);
        self.quick_reply_shortcut_id.serialize(buf);
        self.effect.serialize(buf);
        self.factcheck.serialize(buf);
        self.report_delivery_until_date.serialize(buf);
        self.paid_message_stars.serialize(buf);
        self.suggested_post.serialize(buf);
    }
}

impl Deserializable for Message {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        let flags2 = u32::deserialize(buf)?;
        Ok(Self {
            out: has(flags, 1),
            mentioned: has(flags, 4),
            media_unread: has(flags, 5),
            silent: has(flags, 13),
            post: has(flags, 14),
            from_scheduled: has(flags, 18),
            legacy: has(flags, 19),
            edit_hide: has(flags, 21),
            pinned: has(flags, 24),
            noforwards: has(flags, 26),
            invert_media: has(flags, 27),
            offline: has(flags2, 1),
            video_processing_pending: has(flags2, 4),
            paid_suggested_post_stars: has(flags2, 8),
            paid_suggested_post_ton: has(flags2, 9),
            id: i32::deserialize(buf)?,
            from_id: read_if(flags, 8, buf)?,
            from_boosts_applied: read_if(flags, 29, buf)?,
            peer_id: enums::Peer::deserialize(buf)?,
            saved_peer_id: read_if(flags, 28, buf)?,
            fwd_from: read_if(flags, 2, buf)?,
            via_bot_id: read_if(flags, 11, buf)?,
            via_business_bot_id: read_if(flags2, 0, buf)?,
            reply_to: read_if(flags, 3, buf)?,
            date: i32::deserialize(buf)?,
            message: String::deserialize(buf)?,
            media: read_if(flags, 9, buf)?,
            reply_markup: read_if(flags, 6, buf)?,
            entities: read_if(flags, 7, buf)?,
            views: read_if(flags, 10, buf)?,
            forwards: read_if(flags, 10, buf)?,
            replies: read_if(flags, 23, buf)?,
            edit_date: read_if(flags, 15, buf)?,
            post_author: read_if(flags, 16, buf)?,
            grouped_id: read_if(flags, 17, buf)?,
            reactions: read_if(flags, 20, buf)?,
            restriction_reason: read_if(flags, 22, buf)?,
            ttl_period: read_if(flags, 25, buf)?,
            quick_reply_shortcut_id: read_if(flags, 30, buf)?,
            effect: read_if(flags2, 2, buf)?,
            factcheck: read_if(flags2, 3, buf)?,
            report_delivery_until_date: read_if(flags2, 5, buf)?,
            paid_message_stars: read_if(flags2, 6, buf)?,
            suggested_post: read_if(flags2, 7, buf)?,
        })
    }
}

/// `messageService`: a service message (join, pin, …).
#[derive(Clone, Debug, PartialEq)]
pub struct MessageService {
    pub out: bool,
    pub mentioned: bool,
    pub media_unread: bool,
    pub reactions_are_possible: bool,
    pub silent: bool,
    pub post: bool,
    pub legacy: bool,
    pub id: i32,
    pub from_id: Option<enums::Peer>,
    pub peer_id: enums::Peer,
    pub saved_peer_id: Option<enums::Peer>,
    pub reply_to: Option<enums::MessageReplyHeader>,
    pub date: i32,
    pub action: enums::MessageAction,
    pub reactions: Option<enums::MessageReactions>,
    pub ttl_period: Option<i32>,
}

impl Identifiable for MessageService {
    const CONSTRUCTOR_ID: u32 = 0x7a800e0a;
}

impl Serializable for MessageService {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let flags = flag(self.out, 1)
            | flag(self.reply_to.is_some(), 3)
            | flag(self.mentioned, 4)
            | flag(self.media_unread, 5)
            | flag(self.from_id.is_some(), 8)
            | flag(self.reactions_are_possible, 9)
            | flag(self.silent, 13)
            | flag(self.post, 14)
            | flag(self.legacy, 19)
            | flag(self.reactions.is_some(), 20)
            | flag(self.ttl_period.is_some(), 25)
            | flag(self.saved_peer_id.is_some(), 28);
        flags.serialize(buf);
        self.id.serialize(buf);
        self.from_id.serialize(buf);
        self.peer_id.serialize(buf);
        self.saved_peer_id.serialize(buf);
        self.reply_to.serialize(buf);
        self.date.serialize(buf);
        self.action.serialize(buf);
        self.reactions.serialize(buf);
        self.ttl_period.serialize(buf);
    }
}

impl Deserializable for MessageService {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            out: has(flags, 1),
            mentioned: has(flags, 4),
            media_unread: has(flags, 5),
            reactions_are_possible: has(flags, 9),
            silent: has(flags, 13),
            post: has(flags, 14),
            legacy: has(flags, 19),
            id: i32::deserialize(buf)?,
            from_id: read_if(flags, 8, buf)?,
            peer_id: enums::Peer::deserialize(buf)?,
            saved_peer_id: read_if(flags, 28, buf)?,
            reply_to: read_if(flags, 3, buf)?,
            date: i32::deserialize(buf)?,
            action: enums::MessageAction::deserialize(buf)?,
            reactions: read_if(flags, 20, buf)?,
            ttl_period: read_if(flags, 25, buf)?,
        })
    }
}

// ─── Polls ───────────────────────────────────────────────────────────────────

tl_struct! {
    pub struct PollAnswer = 0xff16e2ca {
        pub text: enums::TextWithEntities,
        pub option: Vec<u8>,
    }
}

/// `poll`: unlike most constructors, `id` comes before the flags word.
#[derive(Clone, Debug, PartialEq)]
pub struct Poll {
    pub id: i64,
    pub closed: bool,
    pub public_voters: bool,
    pub multiple_choice: bool,
    pub quiz: bool,
    pub question: enums::TextWithEntities,
    pub answers: Vec<enums::PollAnswer>,
    pub close_period: Option<i32>,
    pub close_date: Option<i32>,
}

impl Identifiable for Poll {
    const CONSTRUCTOR_ID: u32 = 0x58747131;
}

impl Serializable for Poll {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        self.id.serialize(buf);
        let flags = flag(self.closed, 0)
            | flag(self.public_voters, 1)
            | flag(self.multiple_choice, 2)
            | flag(self.quiz, 3)
            | flag(self.close_period.is_some(), 4)
            | flag(self.close_date.is_some(), 5);
        flags.serialize(buf);
        self.question.serialize(buf);
        self.answers.serialize(buf);
        self.close_period.serialize(buf);
        self.close_date.serialize(buf);
    }
}

impl Deserializable for Poll {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let id = i64::deserialize(buf)?;
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            id,
            closed: has(flags, 0),
            public_voters: has(flags, 1),
            multiple_choice: has(flags, 2),
            quiz: has(flags, 3),
            question: enums::TextWithEntities::deserialize(buf)?,
            answers: Vec::deserialize(buf)?,
            close_period: read_if(flags, 4, buf)?,
            close_date: read_if(flags, 5, buf)?,
        })
    }
}

/// `pollAnswerVoters`
#[derive(Clone, Debug, PartialEq)]
pub struct PollAnswerVoters {
    pub chosen: bool,
    pub correct: bool,
    pub option: Vec<u8>,
    pub voters: i32,
}

impl Identifiable for PollAnswerVoters {
    const CONSTRUCTOR_ID: u32 = 0x3b6ddad2;
}

impl Serializable for PollAnswerVoters {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        (flag(self.chosen, 0) | flag(self.correct, 1)).serialize(buf);
        self.option.serialize(buf);
        self.voters.serialize(buf);
    }
}

impl Deserializable for PollAnswerVoters {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            chosen: has(flags, 0),
            correct: has(flags, 1),
            option: Vec::deserialize(buf)?,
            voters: i32::deserialize(buf)?,
        })
    }
}

/// `pollResults`
///
/// `solution` and `solution_entities` share flag bit 4 and are written only
/// as a pair.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PollResults {
    pub min: bool,
    pub results: Option<Vec<enums::PollAnswerVoters>>,
    pub total_voters: Option<i32>,
    pub recent_voters: Option<Vec<enums::Peer>>,
    pub solution: Option<String>,
    pub solution_entities: Option<Vec<enums::MessageEntity>>,
}

impl Identifiable for PollResults {
    const CONSTRUCTOR_ID: u32 = 0x7adf2420;
}

impl Serializable for PollResults {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let solution = self.solution.as_ref().zip(self.solution_entities.as_ref());
        let flags = flag(self.min, 0)
            | flag(self.results.is_some(), 1)
            | flag(self.total_voters.is_some(), 2)
            | flag(self.recent_voters.is_some(), 3)
            | flag(solution.is_some(), 4);
        flags.serialize(buf);
        self.results.serialize(buf);
        self.total_voters.serialize(buf);
        self.recent_voters.serialize(buf);
        if let Some((text, entities)) = solution {
            text.serialize(buf);
            entities.serialize(buf);
        }
    }
}

impl Deserializable for PollResults {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            min: has(flags, 0),
            results: read_if(flags, 1, buf)?,
            total_voters: read_if(flags, 2, buf)?,
            recent_voters: read_if(flags, 3, buf)?,
            solution: read_if(flags, 4, buf)?,
            solution_entities: read_if(flags, 4, buf)?,
        })
    }
}

// ─── Participants and invites ────────────────────────────────────────────────

tl_struct! {
    pub struct ChatParticipant = 0xc02d4007 {
        pub user_id: i64,
        pub inviter_id: i64,
        pub date: i32,
    }
}

tl_struct! { pub struct ChatParticipantCreator = 0xe46bcee4 { pub user_id: i64 } }

tl_struct! {
    pub struct ChatParticipantAdmin = 0xa0933f5b {
        pub user_id: i64,
        pub inviter_id: i64,
        pub date: i32,
    }
}

/// `channelParticipant`
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelParticipant {
    pub user_id: i64,
    pub date: i32,
    pub subscription_until_date: Option<i32>,
}

impl Identifiable for ChannelParticipant {
    const CONSTRUCTOR_ID: u32 = 0xcb397619;
}

impl Serializable for ChannelParticipant {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        flag(self.subscription_until_date.is_some(), 0).serialize(buf);
        self.user_id.serialize(buf);
        self.date.serialize(buf);
        self.subscription_until_date.serialize(buf);
    }
}

impl Deserializable for ChannelParticipant {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            user_id: i64::deserialize(buf)?,
            date: i32::deserialize(buf)?,
            subscription_until_date: read_if(flags, 0, buf)?,
        })
    }
}

/// `channelParticipantSelf`
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelParticipantSelf {
    pub via_request: bool,
    pub user_id: i64,
    pub inviter_id: i64,
    pub date: i32,
    pub subscription_until_date: Option<i32>,
}

impl Identifiable for ChannelParticipantSelf {
    const CONSTRUCTOR_ID: u32 = 0x4f607bef;
}

impl Serializable for ChannelParticipantSelf {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        (flag(self.via_request, 0) | flag(self.subscription_until_date.is_some(), 1)).serialize(buf);
        self.user_id.serialize(buf);
        self.inviter_id.serialize(buf);
        self.date.serialize(buf);
        self.subscription_until_date.serialize(buf);
    }
}

impl Deserializable for ChannelParticipantSelf {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            via_request: has(flags, 0),
            user_id: i64::deserialize(buf)?,
            inviter_id: i64::deserialize(buf)?,
            date: i32::deserialize(buf)?,
            subscription_until_date: read_if(flags, 1, buf)?,
        })
    }
}

/// `channelParticipantCreator`
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelParticipantCreator {
    pub user_id: i64,
    pub admin_rights: enums::ChatAdminRights,
    pub rank: Option<String>,
}

impl Identifiable for ChannelParticipantCreator {
    const CONSTRUCTOR_ID: u32 = 0x2fe601d3;
}

impl Serializable for ChannelParticipantCreator {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        flag(self.rank.is_some(), 0).serialize(buf);
        self.user_id.serialize(buf);
        self.admin_rights.serialize(buf);
        self.rank.serialize(buf);
    }
}

impl Deserializable for ChannelParticipantCreator {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            user_id: i64::deserialize(buf)?,
            admin_rights: enums::ChatAdminRights::deserialize(buf)?,
            rank: read_if(flags, 0, buf)?,
        })
    }
}

/// `channelParticipantAdmin`
///
/// `is_self` shares flag bit 1 with `inviter_id`.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelParticipantAdmin {
    pub can_edit: bool,
    pub is_self: bool,
    pub user_id: i64,
    pub inviter_id: Option<i64>,
    pub promoted_by: i64,
    pub date: i32,
    pub admin_rights: enums::ChatAdminRights,
    pub rank: Option<String>,
}

impl Identifiable for ChannelParticipantAdmin {
    const CONSTRUCTOR_ID: u32 = 0x34c3bb53;
}

impl Serializable for ChannelParticipantAdmin {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let is_self = self.is_self || self.inviter_id.is_some();
        (flag(self.can_edit, 0) | flag(is_self, 1) | flag(self.rank.is_some(), 2)).serialize(buf);
        self.user_id.serialize(buf);
        if is_self {
            self.inviter_id.unwrap_or_default().serialize(buf);
        }
        self.promoted_by.serialize(buf);
        self.date.serialize(buf);
        self.admin_rights.serialize(buf);
        self.rank.serialize(buf);
    }
}

impl Deserializable for ChannelParticipantAdmin {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            can_edit: has(flags, 0),
            is_self: has(flags, 1),
            user_id: i64::deserialize(buf)?,
            inviter_id: read_if(flags, 1, buf)?,
            promoted_by: i64::deserialize(buf)?,
            date: i32::deserialize(buf)?,
            admin_rights: enums::ChatAdminRights::deserialize(buf)?,
            rank: read_if(flags, 2, buf)?,
        })
    }
}

/// `channelParticipantBanned`
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelParticipantBanned {
    pub left: bool,
    pub peer: enums::Peer,
    pub kicked_by: i64,
    pub date: i32,
    pub banned_rights: enums::ChatBannedRights,
}

impl Identifiable for ChannelParticipantBanned {
    const CONSTRUCTOR_ID: u32 = 0x6df8014e;
}

impl Serializable for ChannelParticipantBanned {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        flag(self.left, 0).serialize(buf);
        self.peer.serialize(buf);
        self.kicked_by.serialize(buf);
        self.date.serialize(buf);
        self.banned_rights.serialize(buf);
    }
}

impl Deserializable for ChannelParticipantBanned {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            left: has(flags, 0),
            peer: enums::Peer::deserialize(buf)?,
            kicked_by: i64::deserialize(buf)?,
            date: i32::deserialize(buf)?,
            banned_rights: enums::ChatBannedRights::deserialize(buf)?,
        })
    }
}

tl_struct! { pub struct ChannelParticipantLeft = 0x1b03f006 { pub peer: enums::Peer } }

tl_struct! { pub struct StarsSubscriptionPricing = 0x05416d58 { pub period: i32, pub amount: i64 } }

/// `chatInviteExported`
#[derive(Clone, Debug, PartialEq)]
pub struct ChatInviteExported {
    pub revoked: bool,
    pub permanent: bool,
    pub request_needed: bool,
    pub link: String,
    pub admin_id: i64,
    pub date: i32,
    pub start_date: Option<i32>,
    pub expire_date: Option<i32>,
    pub usage_limit: Option<i32>,
    pub usage: Option<i32>,
    pub requested: Option<i32>,
    pub subscription_expired: Option<i32>,
    pub title: Option<String>,
    pub subscription_pricing: Option<enums::StarsSubscriptionPricing>,
}

impl Identifiable for ChatInviteExported {
    const CONSTRUCTOR_ID: u32 = 0xa22cbd96;
}

impl Serializable for ChatInviteExported {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let flags = flag(self.revoked, 0)
            | flag(self.expire_date.is_some(), 1)
            | flag(self.usage_limit.is_some(), 2)
            | flag(self.usage.is_some(), 3)
            | flag(self.start_date.is_some(), 4)
            | flag(self.permanent, 5)
            | flag(self.request_needed, 6)
            | flag(self.requested.is_some(), 7)
            | flag(self.title.is_some(), 8)
            | flag(self.subscription_pricing.is_some(), 9)
            | flag(self.subscription_expired.is_some(), 10);
        flags.serialize(buf);
        self.link.serialize(buf);
        self.admin_id.serialize(buf);
        self.date.serialize(buf);
        self.start_date.serialize(buf);
        self.expire_date.serialize(buf);
        self.usage_limit.serialize(buf);
        self.usage.serialize(buf);
        self.requested.serialize(buf);
        self.subscription_expired.serialize(buf);
        self.title.serialize(buf);
        self.subscription_pricing.serialize(buf);
    }
}

impl Deserializable for ChatInviteExported {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            revoked: has(flags, 0),
            permanent: has(flags, 5),
            request_needed: has(flags, 6),
            link: String::deserialize(buf)?,
            admin_id: i64::deserialize(buf)?,
            date: i32::deserialize(buf)?,
            start_date: read_if(flags, 4, buf)?,
            expire_date: read_if(flags, 1, buf)?,
            usage_limit: read_if(flags, 2, buf)?,
            usage: read_if(flags, 3, buf)?,
            requested: read_if(flags, 7, buf)?,
            subscription_expired: read_if(flags, 10, buf)?,
            title: read_if(flags, 8, buf)?,
            subscription_pricing: read_if(flags, 9, buf)?,
        })
    }
}

tl_struct! { pub struct ChatInvitePublicJoinRequests = 0xed107ab7 {} }

// ─── Stories ─────────────────────────────────────────────────────────────────

tl_struct! { pub struct PrivacyValueAllowContacts = 0xfffe1bac {} }
tl_struct! { pub struct PrivacyValueAllowAll = 0x65427b82 {} }
tl_struct! { pub struct PrivacyValueAllowUsers = 0xb8905fb2 { pub users: Vec<i64> } }
tl_struct! { pub struct PrivacyValueDisallowContacts = 0xf888fa1a {} }
tl_struct! { pub struct PrivacyValueDisallowAll = 0x8b73e763 {} }
tl_struct! { pub struct PrivacyValueDisallowUsers = 0xe4621141 { pub users: Vec<i64> } }
tl_struct! { pub struct PrivacyValueAllowChatParticipants = 0x6b134e8e { pub chats: Vec<i64> } }
tl_struct! { pub struct PrivacyValueDisallowChatParticipants = 0x41c87565 { pub chats: Vec<i64> } }
tl_struct! { pub struct PrivacyValueAllowCloseFriends = 0xf7e8d89b {} }
tl_struct! { pub struct PrivacyValueAllowPremium = 0xece9814b {} }
tl_struct! { pub struct PrivacyValueAllowBots = 0x21461b5d {} }
tl_struct! { pub struct PrivacyValueDisallowBots = 0xf6a5f82f {} }

/// `storyViews`
#[derive(Clone, Debug, PartialEq)]
pub struct StoryViews {
    pub has_viewers: bool,
    pub views_count: i32,
    pub forwards_count: Option<i32>,
    pub reactions: Option<Vec<enums::ReactionCount>>,
    pub reactions_count: Option<i32>,
    pub recent_viewers: Option<Vec<i64>>,
}

impl Identifiable for StoryViews {
    const CONSTRUCTOR_ID: u32 = 0x8d595cd6;
}

impl Serializable for StoryViews {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let flags = flag(self.recent_viewers.is_some(), 0)
            | flag(self.has_viewers, 1)
            | flag(self.forwards_count.is_some(), 2)
            | flag(self.reactions.is_some(), 3)
            | flag(self.reactions_count.is_some(), 4);
        flags.serialize(buf);
        self.views_count.serialize(buf);
        self.forwards_count.serialize(buf);
        self.reactions.serialize(buf);
        self.reactions_count.serialize(buf);
        self.recent_viewers.serialize(buf);
    }
}

impl Deserializable for StoryViews {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            has_viewers: has(flags, 1),
            views_count: i32::deserialize(buf)?,
            forwards_count: read_if(flags, 2, buf)?,
            reactions: read_if(flags, 3, buf)?,
            reactions_count: read_if(flags, 4, buf)?,
            recent_viewers: read_if(flags, 0, buf)?,
        })
    }
}

/// `storyFwdHeader`
#[derive(Clone, Debug, PartialEq)]
pub struct StoryFwdHeader {
    pub modified: bool,
    pub from: Option<enums::Peer>,
    pub from_name: Option<String>,
    pub story_id: Option<i32>,
}

impl Identifiable for StoryFwdHeader {
    const CONSTRUCTOR_ID: u32 = 0xb826e150;
}

impl Serializable for StoryFwdHeader {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let flags = flag(self.from.is_some(), 0)
            | flag(self.from_name.is_some(), 1)
            | flag(self.story_id.is_some(), 2)
            | flag(self.modified, 3);
        flags.serialize(buf);
        self.from.serialize(buf);
        self.from_name.serialize(buf);
        self.story_id.serialize(buf);
    }
}

impl Deserializable for StoryFwdHeader {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            modified: has(flags, 3),
            from: read_if(flags, 0, buf)?,
            from_name: read_if(flags, 1, buf)?,
            story_id: read_if(flags, 2, buf)?,
        })
    }
}

tl_struct! { pub struct StoryItemDeleted = 0x51e6ee4f { pub id: i32 } }

/// `storyItemSkipped`
#[derive(Clone, Debug, PartialEq)]
pub struct StoryItemSkipped {
    pub close_friends: bool,
    pub id: i32,
    pub date: i32,
    pub expire_date: i32,
}

impl Identifiable for StoryItemSkipped {
    const CONSTRUCTOR_ID: u32 = 0xffadc913;
}

impl Serializable for StoryItemSkipped {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        flag(self.close_friends, 8).serialize(buf);
        self.id.serialize(buf);
        self.date.serialize(buf);
        self.expire_date.serialize(buf);
    }
}

impl Deserializable for StoryItemSkipped {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            close_friends: has(flags, 8),
            id: i32::deserialize(buf)?,
            date: i32::deserialize(buf)?,
            expire_date: i32::deserialize(buf)?,
        })
    }
}

/// `storyItem`
///
/// Interactive media areas (bit 14) are not modelled; a story carrying them
/// fails to decode.
#[derive(Clone, Debug, PartialEq)]
pub struct StoryItem {
    pub pinned: bool,
    pub public: bool,
    pub close_friends: bool,
    pub min: bool,
    pub noforwards: bool,
    pub edited: bool,
    pub contacts: bool,
    pub selected_contacts: bool,
    pub out: bool,
    pub id: i32,
    pub date: i32,
    pub from_id: Option<enums::Peer>,
    pub fwd_from: Option<enums::StoryFwdHeader>,
    pub expire_date: i32,
    pub caption: Option<String>,
    pub entities: Option<Vec<enums::MessageEntity>>,
    pub media: enums::MessageMedia,
    pub privacy: Option<Vec<enums::PrivacyRule>>,
    pub views: Option<enums::StoryViews>,
    pub sent_reaction: Option<enums::Reaction>,
    pub albums: Option<Vec<i32>>,
}

impl Identifiable for StoryItem {
    const CONSTRUCTOR_ID: u32 = 0xedf164f1;
}

impl Serializable for StoryItem {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let flags = flag(self.caption.is_some(), 0)
            | flag(self.entities.is_some(), 1)
            | flag(self.privacy.is_some(), 2)
            | flag(self.views.is_some(), 3)
            | flag(self.pinned, 5)
            | flag(self.public, 7)
            | flag(self.close_friends, 8)
            | flag(self.min, 9)
            | flag(self.noforwards, 10)
            | flag(self.edited, 11)
            | flag(self.contacts, 12)
            | flag(self.selected_contacts, 13)
            | flag(self.sent_reaction.is_some(), 15)
            | flag(self.out, 16)
            | flag(self.fwd_from.is_some(), 17)
            | flag(self.from_id.is_some(), 18)
            | flag(self.albums.is_some(), 19);
        flags.serialize(buf);
        self.id.serialize(buf);
        self.date.serialize(buf);
        self.from_id.serialize(buf);
        self.fwd_from.serialize(buf);
        self.expire_date.serialize(buf);
        self.caption.serialize(buf);
        self.entities.serialize(buf);
        self.media.serialize(buf);
        self.privacy.serialize(buf);
        self.views.serialize(buf);
        self.sent_reaction.serialize(buf);
        self.albums.serialize(buf);
    }
}

impl Deserializable for StoryItem {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        let id = i32::deserialize(buf)?;
        let date = i32::deserialize(buf)?;
        let from_id = read_if(flags, 18, buf)?;
        let fwd_from = read_if(flags, 17, buf)?;
        let expire_date = i32::deserialize(buf)?;
        let caption = read_if(flags, 0, buf)?;
        let entities = read_if(flags, 1, buf)?;
        let media = enums::MessageMedia::deserialize(buf)?;
        if has(flags, 14) {
            return unsupported(buf);
        }
        Ok(Self {
            pinned: has(flags, 5),
            public: has(flags, 7),
            close_friends: has(flags, 8),
            min: has(flags, 9),
            noforwards: has(flags, 10),
            edited: has(flags, 11),
            contacts: has(flags, 12),
            selected_contacts: has(flags, 13),
            out: has(flags, 16),
            id,
            date,
            from_id,
            fwd_from,
            expire_date,
            caption,
            entities,
            media,
            privacy: read_if(flags, 2, buf)?,
            views: read_if(flags, 3, buf)?,
            sent_reaction: read_if(flags, 15, buf)?,
            albums: read_if(flags, 19, buf)?,
        })
    }
}

// ─── Inline bots ─────────────────────────────────────────────────────────────

tl_struct! {
    pub struct InputBotInlineMessageId = 0x890c3d89 {
        pub dc_id: i32,
        pub id: i64,
        pub access_hash: i64,
    }
}

tl_struct! {
    pub struct InputBotInlineMessageId64 = 0xb6d915d7 {
        pub dc_id: i32,
        pub owner_id: i64,
        pub id: i32,
        pub access_hash: i64,
    }
}

// ─── Business bots ───────────────────────────────────────────────────────────

tl_struct! {
    /// `businessBotRights`: the rights are the bits of `flags`.
    pub struct BusinessBotRights = 0xa0624cf7 { pub flags: u32 }
}

/// `botBusinessConnection`
#[derive(Clone, Debug, PartialEq)]
pub struct BotBusinessConnection {
    pub disabled: bool,
    pub connection_id: String,
    pub user_id: i64,
    pub dc_id: i32,
    pub date: i32,
    pub rights: Option<enums::BusinessBotRights>,
}

impl Identifiable for BotBusinessConnection {
    const CONSTRUCTOR_ID: u32 = 0x8f34b2f5;
}

impl Serializable for BotBusinessConnection {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        (flag(self.disabled, 1) | flag(self.rights.is_some(), 2)).serialize(buf);
        self.connection_id.serialize(buf);
        self.user_id.serialize(buf);
        self.dc_id.serialize(buf);
        self.date.serialize(buf);
        self.rights.serialize(buf);
    }
}

impl Deserializable for BotBusinessConnection {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            disabled: has(flags, 1),
            connection_id: String::deserialize(buf)?,
            user_id: i64::deserialize(buf)?,
            dc_id: i32::deserialize(buf)?,
            date: i32::deserialize(buf)?,
            rights: read_if(flags, 2, buf)?,
        })
    }
}

// ─── Dialogs ─────────────────────────────────────────────────────────────────

tl_struct! { pub struct NotificationSoundDefault = 0x97e8bebe {} }
tl_struct! { pub struct NotificationSoundNone = 0x6f0c34df {} }
tl_struct! { pub struct NotificationSoundLocal = 0x830b9ae4 { pub title: String, pub data: String } }
tl_struct! { pub struct NotificationSoundRingtone = 0xff6c8049 { pub id: i64 } }

/// `peerNotifySettings`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PeerNotifySettings {
    pub show_previews: Option<bool>,
    pub silent: Option<bool>,
    pub mute_until: Option<i32>,
    pub ios_sound: Option<enums::NotificationSound>,
    pub android_sound: Option<enums::NotificationSound>,
    pub other_sound: Option<enums::NotificationSound>,
    pub stories_muted: Option<bool>,
    pub stories_hide_sender: Option<bool>,
    pub stories_ios_sound: Option<enums::NotificationSound>,
    pub stories_android_sound: Option<enums::NotificationSound>,
    pub stories_other_sound: Option<enums::NotificationSound>,
}

impl Identifiable for PeerNotifySettings {
    const CONSTRUCTOR_ID: u32 = 0x99622c0c;
}

impl Serializable for PeerNotifySettings {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let flags = flag(self.show_previews.is_some(), 0)
            | flag(self.silent.is_some(), 1)
            | flag(self.mute_until.is_some(), 2)
            | flag(self.ios_sound.is_some(), 3)
            | flag(self.android_sound.is_some(), 4)
            | flag(self.other_sound.is_some(), 5)
            | flag(self.stories_muted.is_some(), 6)
            | flag(self.stories_hide_sender.is_some(), 7)
            | flag(self.stories_ios_sound.is_some(), 8)
            | flag(self.stories_android_sound.is_some(), 9)
            | flag(self.stories_other_sound.is_some(), 10);
        flags.serialize(buf);
        self.show_previews.serialize(buf);
        self.silent.serialize(buf);
        self.mute_until.serialize(buf);
        self.ios_sound.serialize(buf);
        self.android_sound.serialize(buf);
        self.other_sound.serialize(buf);
        self.stories_muted.serialize(buf);
        self.stories_hide_sender.serialize(buf);
        self.stories_ios_sound.serialize(buf);
        self.stories_android_sound.serialize(buf);
        self.stories_other_sound.serialize(buf);
    }
}

impl Deserializable for PeerNotifySettings {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            show_previews: read_if(flags, 0, buf)?,
            silent: read_if(flags, 1, buf)?,
            mute_until: read_if(flags, 2, buf)?,
            ios_sound: read_if(flags, 3, buf)?,
            android_sound: read_if(flags, 4, buf)?,
            other_sound: read_if(flags, 5, buf)?,
            stories_muted: read_if(flags, 6, buf)?,
            stories_hide_sender: read_if(flags, 7, buf)?,
            stories_ios_sound: read_if(flags, 8, buf)?,
            stories_android_sound: read_if(flags, 9, buf)?,
            stories_other_sound: read_if(flags, 10, buf)?,
        })
    }
}

/// `inputReplyTo`
#[derive(Clone, Debug, PartialEq)]
pub struct InputReplyToMessage {
    pub reply_to_msg_id: i32,
    pub top_msg_id: Option<i32>,
    pub reply_to_peer_id: Option<enums::InputPeer>,
    pub quote_text: Option<String>,
    pub quote_entities: Option<Vec<enums::MessageEntity>>,
    pub quote_offset: Option<i32>,
    pub monoforum_peer_id: Option<enums::InputPeer>,
    pub todo_item_id: Option<i32>,
}

impl Identifiable for InputReplyToMessage {
    const CONSTRUCTOR_ID: u32 = 0x869fbe10;
}

impl Serializable for InputReplyToMessage {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let flags = flag(self.top_msg_id.is_some(), 0)
            | flag(self.reply_to_peer_id.is_some(), 1)
            | flag(self.quote_text.is_some(), 2)
            | flag(self.quote_entities.is_some(), 3)
            | flag(self.quote_offset.is_some(), 4)
            | flag(self.monoforum_peer_id.is_some(), 5)
            | flag(self.todo_item_id.is_some(), 6);
        flags.serialize(buf);
        self.reply_to_msg_id.serialize(buf);
        self.top_msg_id.serialize(buf);
        self.reply_to_peer_id.serialize(buf);
        self.quote_text.serialize(buf);
        self.quote_entities.serialize(buf);
        self.quote_offset.serialize(buf);
        self.monoforum_peer_id.serialize(buf);
        self.todo_item_id.serialize(buf);
    }
}

impl Deserializable for InputReplyToMessage {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            reply_to_msg_id: i32::deserialize(buf)?,
            top_msg_id: read_if(flags, 0, buf)?,
            reply_to_peer_id: read_if(flags, 1, buf)?,
            quote_text: read_if(flags, 2, buf)?,
            quote_entities: read_if(flags, 3, buf)?,
            quote_offset: read_if(flags, 4, buf)?,
            monoforum_peer_id: read_if(flags, 5, buf)?,
            todo_item_id: read_if(flags, 6, buf)?,
        })
    }
}

tl_struct! {
    pub struct InputReplyToStory = 0x5881323a {
        pub peer: enums::InputPeer,
        pub story_id: i32,
    }
}

tl_struct! { pub struct InputReplyToMonoForum = 0x69d66c45 { pub monoforum_peer_id: enums::InputPeer } }

/// `draftMessageEmpty`
#[derive(Clone, Debug, PartialEq)]
pub struct DraftMessageEmpty {
    pub date: Option<i32>,
}

impl Identifiable for DraftMessageEmpty {
    const CONSTRUCTOR_ID: u32 = 0x1b0c841a;
}

impl Serializable for DraftMessageEmpty {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        flag(self.date.is_some(), 0).serialize(buf);
        self.date.serialize(buf);
    }
}

impl Deserializable for DraftMessageEmpty {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self { date: read_if(flags, 0, buf)? })
    }
}

/// `draftMessage`
#[derive(Clone, Debug, PartialEq)]
pub struct DraftMessage {
    pub no_webpage: bool,
    pub invert_media: bool,
    pub reply_to: Option<enums::InputReplyTo>,
    pub message: String,
    pub entities: Option<Vec<enums::MessageEntity>>,
    pub media: Option<enums::InputMedia>,
    pub date: i32,
    pub effect: Option<i64>,
    pub suggested_post: Option<enums::SuggestedPost>,
}

impl Identifiable for DraftMessage {
    const CONSTRUCTOR_ID: u32 = 0x96eaa5eb;
}

impl Serializable for DraftMessage {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let flags = flag(self.no_webpage, 1)
            | flag(self.entities.is_some(), 3)
            | flag(self.reply_to.is_some(), 4)
            | flag(self.media.is_some(), 5)
            | flag(self.invert_media, 6)
            | flag(self.effect.is_some(), 7)
            | flag(self.suggested_post.is_some(), 8);
        flags.serialize(buf);
        self.reply_to.serialize(buf);
        self.message.serialize(buf);
        self.entities.serialize(buf);
        self.media.serialize(buf);
        self.date.serialize(buf);
        self.effect.serialize(buf);
        self.suggested_post.serialize(buf);
    }
}

impl Deserializable for DraftMessage {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            no_webpage: has(flags, 1),
            invert_media: has(flags, 6),
            reply_to: read_if(flags, 4, buf)?,
            message: String::deserialize(buf)?,
            entities: read_if(flags, 3, buf)?,
            media: read_if(flags, 5, buf)?,
            date: i32::deserialize(buf)?,
            effect: read_if(flags, 7, buf)?,
            suggested_post: read_if(flags, 8, buf)?,
        })
    }
}

/// `dialog`: one entry of the chat list, carrying the channel pts when the
/// peer is a channel.
#[derive(Clone, Debug, PartialEq)]
pub struct Dialog {
    pub pinned: bool,
    pub unread_mark: bool,
    pub view_forum_as_messages: bool,
    pub peer: enums::Peer,
    pub top_message: i32,
    pub read_inbox_max_id: i32,
    pub read_outbox_max_id: i32,
    pub unread_count: i32,
    pub unread_mentions_count: i32,
    pub unread_reactions_count: i32,
    pub notify_settings: enums::PeerNotifySettings,
    pub pts: Option<i32>,
    pub draft: Option<enums::DraftMessage>,
    pub folder_id: Option<i32>,
    pub ttl_period: Option<i32>,
}

impl Identifiable for Dialog {
    const CONSTRUCTOR_ID: u32 = 0xd58a08c6;
}

impl Serializable for Dialog {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let flags = flag(self.pts.is_some(), 0)
            | flag(self.draft.is_some(), 1)
            | flag(self.pinned, 2)
            | flag(self.unread_mark, 3)
            | flag(self.folder_id.is_some(), 4)
            | flag(self.ttl_period.is_some(), 5)
            | flag(self.view_forum_as_messages, 6);
        flags.serialize(buf);
        self.peer.serialize(buf);
        self.top_message.serialize(buf);
        self.read_inbox_max_id.serialize(buf);
        self.read_outbox_max_id.serialize(buf);
        self.unread_count.serialize(buf);
        self.unread_mentions_count.serialize(buf);
        self.unread_reactions_count.serialize(buf);
        self.notify_settings.serialize(buf);
        self.pts.serialize(buf);
        self.draft.serialize(buf);
        self.folder_id.serialize(buf);
        self.ttl_period.serialize(buf);
    }
}

impl Deserializable for Dialog {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            pinned: has(flags, 2),
            unread_mark: has(flags, 3),
            view_forum_as_messages: has(flags, 6),
            peer: enums::Peer::deserialize(buf)?,
            top_message: i32::deserialize(buf)?,
            read_inbox_max_id: i32::deserialize(buf)?,
            read_outbox_max_id: i32::deserialize(buf)?,
            unread_count: i32::deserialize(buf)?,
            unread_mentions_count: i32::deserialize(buf)?,
            unread_reactions_count: i32::deserialize(buf)?,
            notify_settings: enums::PeerNotifySettings::deserialize(buf)?,
            pts: read_if(flags, 0, buf)?,
            draft: read_if(flags, 1, buf)?,
            folder_id: read_if(flags, 4, buf)?,
            ttl_period: read_if(flags, 5, buf)?,
        })
    }
}

// ─── Secret chats ────────────────────────────────────────────────────────────

tl_struct! { pub struct EncryptedFileEmpty = 0xc21f497e {} }

tl_struct! {
    pub struct EncryptedFile = 0xa8008cd8 {
        pub id: i64,
        pub access_hash: i64,
        pub size: i64,
        pub dc_id: i32,
        pub key_fingerprint: i32,
    }
}

tl_struct! {
    /// `encryptedMessage`: an end-to-end payload the client core passes through
    /// without decrypting.
    pub struct EncryptedMessage = 0xed18c118 {
        pub random_id: i64,
        pub chat_id: i32,
        pub date: i32,
        pub bytes: Vec<u8>,
        pub file: enums::EncryptedFile,
    }
}

tl_struct! {
    pub struct EncryptedMessageService = 0x23734b06 {
        pub random_id: i64,
        pub chat_id: i32,
        pub date: i32,
        pub bytes: Vec<u8>,
    }
}

// ─── Updates: pts-sequenced ──────────────────────────────────────────────────

tl_struct! {
    pub struct UpdateNewMessage = 0x1f2b0afd {
        pub message: enums::Message,
        pub pts: i32,
        pub pts_count: i32,
    }
}

tl_struct! {
    pub struct UpdateNewChannelMessage = 0x62ba04d9 {
        pub message: enums::Message,
        pub pts: i32,
        pub pts_count: i32,
    }
}

tl_struct! {
    pub struct UpdateEditMessage = 0xe40370a3 {
        pub message: enums::Message,
        pub pts: i32,
        pub pts_count: i32,
    }
}

tl_struct! {
    pub struct UpdateEditChannelMessage = 0x1b3f4df7 {
        pub message: enums::Message,
        pub pts: i32,
        pub pts_count: i32,
    }
}

tl_struct! {
    pub struct UpdateDeleteMessages = 0xa20db0e5 {
        pub messages: Vec<i32>,
        pub pts: i32,
        pub pts_count: i32,
    }
}

tl_struct! {
    pub struct UpdateDeleteChannelMessages = 0xc32d5b12 {
        pub channel_id: i64,
        pub messages: Vec<i32>,
        pub pts: i32,
        pub pts_count: i32,
    }
}

/// `updateChannelTooLong`: the channel's own difference must be fetched.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateChannelTooLong {
    pub channel_id: i64,
    pub pts: Option<i32>,
}

impl Identifiable for UpdateChannelTooLong {
    const CONSTRUCTOR_ID: u32 = 0x108d941f;
}

impl Serializable for UpdateChannelTooLong {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        flag(self.pts.is_some(), 0).serialize(buf);
        self.channel_id.serialize(buf);
        self.pts.serialize(buf);
    }
}

impl Deserializable for UpdateChannelTooLong {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self { channel_id: i64::deserialize(buf)?, pts: read_if(flags, 0, buf)? })
    }
}

// ─── Updates: unsequenced ────────────────────────────────────────────────────

tl_struct! { pub struct UpdateNewScheduledMessage = 0x39a51dfb { pub message: enums::Message } }
tl_struct! { pub struct UpdateMessageId = 0x4e90bfd6 { pub id: i32, pub random_id: i64 } }

tl_struct! {
    pub struct UpdateUserStatus = 0xe5bdf8de {
        pub user_id: i64,
        pub status: enums::UserStatus,
    }
}

/// `updateBotCallbackQuery`: an inline keyboard button was pressed.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateBotCallbackQuery {
    pub query_id: i64,
    pub user_id: i64,
    pub peer: enums::Peer,
    pub msg_id: i32,
    pub chat_instance: i64,
    pub data: Option<Vec<u8>>,
    pub game_short_name: Option<String>,
}

impl Identifiable for UpdateBotCallbackQuery {
    const CONSTRUCTOR_ID: u32 = 0xb9cfc48d;
}

impl Serializable for UpdateBotCallbackQuery {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        (flag(self.data.is_some(), 0) | flag(self.game_short_name.is_some(), 1)).serialize(buf);
        self.query_id.serialize(buf);
        self.user_id.serialize(buf);
        self.peer.serialize(buf);
        self.msg_id.serialize(buf);
        self.chat_instance.serialize(buf);
        self.data.serialize(buf);
        self.game_short_name.serialize(buf);
    }
}

impl Deserializable for UpdateBotCallbackQuery {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            query_id: i64::deserialize(buf)?,
            user_id: i64::deserialize(buf)?,
            peer: enums::Peer::deserialize(buf)?,
            msg_id: i32::deserialize(buf)?,
            chat_instance: i64::deserialize(buf)?,
            data: read_if(flags, 0, buf)?,
            game_short_name: read_if(flags, 1, buf)?,
        })
    }
}

/// `updateBotInlineQuery`
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateBotInlineQuery {
    pub query_id: i64,
    pub user_id: i64,
    pub query: String,
    pub geo: Option<enums::GeoPoint>,
    pub peer_type: Option<enums::InlineQueryPeerType>,
    pub offset: String,
}

impl Identifiable for UpdateBotInlineQuery {
    const CONSTRUCTOR_ID: u32 = 0x496f379c;
}

impl Serializable for UpdateBotInlineQuery {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        (flag(self.geo.is_some(), 0) | flag(self.peer_type.is_some(), 1)).serialize(buf);
        self.query_id.serialize(buf);
        self.user_id.serialize(buf);
        self.query.serialize(buf);
        self.geo.serialize(buf);
        self.peer_type.serialize(buf);
        self.offset.serialize(buf);
    }
}

impl Deserializable for UpdateBotInlineQuery {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            query_id: i64::deserialize(buf)?,
            user_id: i64::deserialize(buf)?,
            query: String::deserialize(buf)?,
            geo: read_if(flags, 0, buf)?,
            peer_type: read_if(flags, 1, buf)?,
            offset: String::deserialize(buf)?,
        })
    }
}

/// `updateBotInlineSend`: the user picked one of the bot's inline results.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateBotInlineSend {
    pub user_id: i64,
    pub query: String,
    pub geo: Option<enums::GeoPoint>,
    pub id: String,
    pub msg_id: Option<enums::InputBotInlineMessageId>,
}

impl Identifiable for UpdateBotInlineSend {
    const CONSTRUCTOR_ID: u32 = 0x12f12a07;
}

impl Serializable for UpdateBotInlineSend {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        (flag(self.geo.is_some(), 0) | flag(self.msg_id.is_some(), 1)).serialize(buf);
        self.user_id.serialize(buf);
        self.query.serialize(buf);
        self.geo.serialize(buf);
        self.id.serialize(buf);
        self.msg_id.serialize(buf);
    }
}

impl Deserializable for UpdateBotInlineSend {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            user_id: i64::deserialize(buf)?,
            query: String::deserialize(buf)?,
            geo: read_if(flags, 0, buf)?,
            id: String::deserialize(buf)?,
            msg_id: read_if(flags, 1, buf)?,
        })
    }
}

/// `updateMessagePoll`
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateMessagePoll {
    pub poll_id: i64,
    pub poll: Option<enums::Poll>,
    pub results: enums::PollResults,
}

impl Identifiable for UpdateMessagePoll {
    const CONSTRUCTOR_ID: u32 = 0xaca1657b;
}

impl Serializable for UpdateMessagePoll {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        flag(self.poll.is_some(), 0).serialize(buf);
        self.poll_id.serialize(buf);
        self.poll.serialize(buf);
        self.results.serialize(buf);
    }
}

impl Deserializable for UpdateMessagePoll {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            poll_id: i64::deserialize(buf)?,
            poll: read_if(flags, 0, buf)?,
            results: enums::PollResults::deserialize(buf)?,
        })
    }
}

tl_struct! {
    pub struct UpdateMessagePollVote = 0x24f40e77 {
        pub poll_id: i64,
        pub peer: enums::Peer,
        pub options: Vec<Vec<u8>>,
        pub qts: i32,
    }
}

/// `updateChatParticipant`
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateChatParticipant {
    pub chat_id: i64,
    pub date: i32,
    pub actor_id: i64,
    pub user_id: i64,
    pub prev_participant: Option<enums::ChatParticipant>,
    pub new_participant: Option<enums::ChatParticipant>,
    pub invite: Option<enums::ExportedChatInvite>,
    pub qts: i32,
}

impl Identifiable for UpdateChatParticipant {
    const CONSTRUCTOR_ID: u32 = 0xd087663a;
}

impl Serializable for UpdateChatParticipant {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let flags = flag(self.prev_participant.is_some(), 0)
            | flag(self.new_participant.is_some(), 1)
            | flag(self.invite.is_some(), 2);
        flags.serialize(buf);
        self.chat_id.serialize(buf);
        self.date.serialize(buf);
        self.actor_id.serialize(buf);
        self.user_id.serialize(buf);
        self.prev_participant.serialize(buf);
        self.new_participant.serialize(buf);
        self.invite.serialize(buf);
        self.qts.serialize(buf);
    }
}

impl Deserializable for UpdateChatParticipant {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            chat_id: i64::deserialize(buf)?,
            date: i32::deserialize(buf)?,
            actor_id: i64::deserialize(buf)?,
            user_id: i64::deserialize(buf)?,
            prev_participant: read_if(flags, 0, buf)?,
            new_participant: read_if(flags, 1, buf)?,
            invite: read_if(flags, 2, buf)?,
            qts: i32::deserialize(buf)?,
        })
    }
}

/// `updateChannelParticipant`
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateChannelParticipant {
    pub via_chatlist: bool,
    pub channel_id: i64,
    pub date: i32,
    pub actor_id: i64,
    pub user_id: i64,
    pub prev_participant: Option<enums::ChannelParticipant>,
    pub new_participant: Option<enums::ChannelParticipant>,
    pub invite: Option<enums::ExportedChatInvite>,
    pub qts: i32,
}

impl Identifiable for UpdateChannelParticipant {
    const CONSTRUCTOR_ID: u32 = 0x985d3abb;
}

impl Serializable for UpdateChannelParticipant {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let flags = flag(self.prev_participant.is_some(), 0)
            | flag(self.new_participant.is_some(), 1)
            | flag(self.invite.is_some(), 2)
            | flag(self.via_chatlist, 3);
        flags.serialize(buf);
        self.channel_id.serialize(buf);
        self.date.serialize(buf);
        self.actor_id.serialize(buf);
        self.user_id.serialize(buf);
        self.prev_participant.serialize(buf);
        self.new_participant.serialize(buf);
        self.invite.serialize(buf);
        self.qts.serialize(buf);
    }
}

impl Deserializable for UpdateChannelParticipant {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            via_chatlist: has(flags, 3),
            channel_id: i64::deserialize(buf)?,
            date: i32::deserialize(buf)?,
            actor_id: i64::deserialize(buf)?,
            user_id: i64::deserialize(buf)?,
            prev_participant: read_if(flags, 0, buf)?,
            new_participant: read_if(flags, 1, buf)?,
            invite: read_if(flags, 2, buf)?,
            qts: i32::deserialize(buf)?,
        })
    }
}

tl_struct! {
    pub struct UpdateBotChatInviteRequester = 0x11dfa986 {
        pub peer: enums::Peer,
        pub date: i32,
        pub user_id: i64,
        pub about: String,
        pub invite: enums::ExportedChatInvite,
        pub qts: i32,
    }
}

tl_struct! {
    pub struct UpdateStory = 0x75b3b798 {
        pub peer: enums::Peer,
        pub story: enums::StoryItem,
    }
}

tl_struct! {
    pub struct UpdateBotMessageReaction = 0xac21d3ce {
        pub peer: enums::Peer,
        pub msg_id: i32,
        pub date: i32,
        pub actor: enums::Peer,
        pub old_reactions: Vec<enums::Reaction>,
        pub new_reactions: Vec<enums::Reaction>,
        pub qts: i32,
    }
}

tl_struct! {
    pub struct UpdateBotBusinessConnect = 0x8ae5c97a {
        pub connection: enums::BotBusinessConnection,
        pub qts: i32,
    }
}

/// `updateBotNewBusinessMessage` and `updateBotEditBusinessMessage` share one
/// layout.
macro_rules! business_message_update {
    ($($(#[$meta:meta])* $name:ident = $id:literal),+ $(,)?) => {$(
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name {
            pub connection_id: String,
            pub message: enums::Message,
            pub reply_to_message: Option<enums::Message>,
            pub qts: i32,
        }

        impl Identifiable for $name {
            const CONSTRUCTOR_ID: u32 = $id;
        }

        impl Serializable for $name {
            fn serialize(&self, buf: &mut impl Extend<u8>) {
                Self::CONSTRUCTOR_ID.serialize(buf);
                flag(self.reply_to_message.is_some(), 0).serialize(buf);
                self.connection_id.serialize(buf);
                self.message.serialize(buf);
                self.reply_to_message.serialize(buf);
                self.qts.serialize(buf);
            }
        }

        impl Deserializable for $name {
            fn deserialize(buf: Buffer) -> Result<Self> {
                let flags = u32::deserialize(buf)?;
                Ok(Self {
                    connection_id: String::deserialize(buf)?,
                    message: enums::Message::deserialize(buf)?,
                    reply_to_message: read_if(flags, 0, buf)?,
                    qts: i32::deserialize(buf)?,
                })
            }
        }
    )+};
}

business_message_update! {
    UpdateBotNewBusinessMessage = 0x9ddb347c,
    UpdateBotEditBusinessMessage = 0x07df587c,
}

tl_struct! {
    pub struct UpdateBotDeleteBusinessMessage = 0xa02a982e {
        pub connection_id: String,
        pub peer: enums::Peer,
        pub messages: Vec<i32>,
        pub qts: i32,
    }
}

// ─── Updates containers ──────────────────────────────────────────────────────

tl_struct! {
    /// Too many updates queued server-side; the client must fetch the difference.
    pub struct UpdatesTooLong = 0xe317af7e {}
}

/// `updateShortMessage`: a private message packed without reference tables.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateShortMessage {
    pub out: bool,
    pub mentioned: bool,
    pub media_unread: bool,
    pub silent: bool,
    pub id: i32,
    pub user_id: i64,
    pub message: String,
    pub pts: i32,
    pub pts_count: i32,
    pub date: i32,
    pub fwd_from: Option<enums::MessageFwdHeader>,
    pub via_bot_id: Option<i64>,
    pub reply_to: Option<enums::MessageReplyHeader>,
    pub entities: Option<Vec<enums::MessageEntity>>,
    pub ttl_period: Option<i32>,
}

impl Identifiable for UpdateShortMessage {
    const CONSTRUCTOR_ID: u32 = 0x313bc7f8;
}

impl Serializable for UpdateShortMessage {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let flags = flag(self.out, 1)
            | flag(self.fwd_from.is_some(), 2)
            | flag(self.reply_to.is_some(), 3)
            | flag(self.mentioned, 4)
            | flag(self.media_unread, 5)
            | flag(self.entities.is_some(), 7)
            | flag(self.via_bot_id.is_some(), 11)
            | flag(self.silent, 13)
            | flag(self.ttl_period.is_some(), 25);
        flags.serialize(buf);
        self.id.serialize(buf);
        self.user_id.serialize(buf);
        self.message.serialize(buf);
        self.pts.serialize(buf);
        self.pts_count.serialize(buf);
        self.date.serialize(buf);
        self.fwd_from.serialize(buf);
        self.via_bot_id.serialize(buf);
        self.reply_to.serialize(buf);
        self.entities.serialize(buf);
        self.ttl_period.serialize(buf);
    }
}

impl Deserializable for UpdateShortMessage {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            out: has(flags, 1),
            mentioned: has(flags, 4),
            media_unread: has(flags, 5),
            silent: has(flags, 13),
            id: i32::deserialize(buf)?,
            user_id: i64::deserialize(buf)?,
            message: String::deserialize(buf)?,
            pts: i32::deserialize(buf)?,
            pts_count: i32::deserialize(buf)?,
            date: i32::deserialize(buf)?,
            fwd_from: read_if(flags, 2, buf)?,
            via_bot_id: read_if(flags, 11, buf)?,
            reply_to: read_if(flags, 3, buf)?,
            entities: read_if(flags, 7, buf)?,
            ttl_period: read_if(flags, 25, buf)?,
        })
    }
}

/// `updateShortChatMessage`: a basic-group message packed without reference tables.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateShortChatMessage {
    pub out: bool,
    pub mentioned: bool,
    pub media_unread: bool,
    pub silent: bool,
    pub id: i32,
    pub from_id: i64,
    pub chat_id: i64,
    pub message: String,
    pub pts: i32,
    pub pts_count: i32,
    pub date: i32,
    pub fwd_from: Option<enums::MessageFwdHeader>,
    pub via_bot_id: Option<i64>,
    pub reply_to: Option<enums::MessageReplyHeader>,
    pub entities: Option<Vec<enums::MessageEntity>>,
    pub ttl_period: Option<i32>,
}

impl Identifiable for UpdateShortChatMessage {
    const CONSTRUCTOR_ID: u32 = 0x4d6deea5;
}

impl Serializable for UpdateShortChatMessage {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let flags = flag(self.out, 1)
            | flag(self.fwd_from.is_some(), 2)
            | flag(self.reply_to.is_some(), 3)
            | flag(self.mentioned, 4)
            | flag(self.media_unread, 5)
            | flag(self.entities.is_some(), 7)
            | flag(self.via_bot_id.is_some(), 11)
            | flag(self.silent, 13)
            | flag(self.ttl_period.is_some(), 25);
        flags.serialize(buf);
        self.id.serialize(buf);
        self.from_id.serialize(buf);
        self.chat_id.serialize(buf);
        self.message.serialize(buf);
        self.pts.serialize(buf);
        self.pts_count.serialize(buf);
        self.date.serialize(buf);
        self.fwd_from.serialize(buf);
        self.via_bot_id.serialize(buf);
        self.reply_to.serialize(buf);
        self.entities.serialize(buf);
        self.ttl_period.serialize(buf);
    }
}

impl Deserializable for UpdateShortChatMessage {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            out: has(flags, 1),
            mentioned: has(flags, 4),
            media_unread: has(flags, 5),
            silent: has(flags, 13),
            id: i32::deserialize(buf)?,
            from_id: i64::deserialize(buf)?,
            chat_id: i64::deserialize(buf)?,
            message: String::deserialize(buf)?,
            pts: i32::deserialize(buf)?,
            pts_count: i32::deserialize(buf)?,
            date: i32::deserialize(buf)?,
            fwd_from: read_if(flags, 2, buf)?,
            via_bot_id: read_if(flags, 11, buf)?,
            reply_to: read_if(flags, 3, buf)?,
            entities: read_if(flags, 7, buf)?,
            ttl_period: read_if(flags, 25, buf)?,
        })
    }
}

tl_struct! {
    pub struct UpdateShort = 0x78d4dec1 {
        pub update: enums::Update,
        pub date: i32,
    }
}

tl_struct! {
    pub struct UpdatesCombined = 0x725b04c3 {
        pub updates: Vec<enums::Update>,
        pub users: Vec<enums::User>,
        pub chats: Vec<enums::Chat>,
        pub date: i32,
        pub seq_start: i32,
        pub seq: i32,
    }
}

tl_struct! {
    pub struct Updates = 0x74ae4240 {
        pub updates: Vec<enums::Update>,
        pub users: Vec<enums::User>,
        pub chats: Vec<enums::Chat>,
        pub date: i32,
        pub seq: i32,
    }
}

/// `updateShortSentMessage`: result of sending a message, carrying only its pts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateShortSentMessage {
    pub out: bool,
    pub id: i32,
    pub pts: i32,
    pub pts_count: i32,
    pub date: i32,
    pub media: Option<enums::MessageMedia>,
    pub entities: Option<Vec<enums::MessageEntity>>,
    pub ttl_period: Option<i32>,
}

impl Identifiable for UpdateShortSentMessage {
    const CONSTRUCTOR_ID: u32 = 0x9015e101;
}

impl Serializable for UpdateShortSentMessage {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        let flags = flag(self.out, 1)
            | flag(self.entities.is_some(), 7)
            | flag(self.media.is_some(), 9)
            | flag(self.ttl_period.is_some(), 25);
        flags.serialize(buf);
        self.id.serialize(buf);
        self.pts.serialize(buf);
        self.pts_count.serialize(buf);
        self.date.serialize(buf);
        self.media.serialize(buf);
        self.entities.serialize(buf);
        self.ttl_period.serialize(buf);
    }
}

impl Deserializable for UpdateShortSentMessage {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            out: has(flags, 1),
            id: i32::deserialize(buf)?,
            pts: i32::deserialize(buf)?,
            pts_count: i32::deserialize(buf)?,
            date: i32::deserialize(buf)?,
            media: read_if(flags, 9, buf)?,
            entities: read_if(flags, 7, buf)?,
            ttl_period: read_if(flags, 25, buf)?,
        })
    }
}

// ─── Files ───────────────────────────────────────────────────────────────────

tl_struct! {
    /// SHA-256 of one `limit`-sized slice of a CDN file starting at `offset`.
    pub struct FileHash = 0xf39b035c {
        pub offset: i64,
        pub limit: i32,
        pub hash: Vec<u8>,
    }
}

tl_struct! {
    pub struct InputFile = 0xf52ff27f {
        pub id: i64,
        pub parts: i32,
        pub name: String,
        pub md5_checksum: String,
    }
}

tl_struct! {
    pub struct InputFileBig = 0xfa4f0bb5 {
        pub id: i64,
        pub parts: i32,
        pub name: String,
    }
}

tl_struct! {
    pub struct InputDocumentFileLocation = 0xbad07584 {
        pub id: i64,
        pub access_hash: i64,
        pub file_reference: Vec<u8>,
        pub thumb_size: String,
    }
}

tl_struct! {
    pub struct InputPhotoFileLocation = 0x40181ffe {
        pub id: i64,
        pub access_hash: i64,
        pub file_reference: Vec<u8>,
        pub thumb_size: String,
    }
}

// ─── Misc ────────────────────────────────────────────────────────────────────

tl_struct! {
    pub struct NearestDc = 0x8e1a1775 {
        pub country: String,
        pub this_dc: i32,
        pub nearest_dc: i32,
    }
}

tl_struct! { pub struct ChannelMessagesFilterEmpty = 0x94d42ee7 {} }

// ─── updates.* ───────────────────────────────────────────────────────────────

pub mod updates {
    use crate::deserialize::{Buffer, Result};
    use crate::{Deserializable, Identifiable, Serializable, enums, flag, has, read_if};

    tl_struct! {
        pub struct State = 0xa56c2a3e {
            pub pts: i32,
            pub qts: i32,
            pub date: i32,
            pub seq: i32,
            pub unread_count: i32,
        }
    }

    tl_struct! { pub struct DifferenceEmpty = 0x5d75a138 { pub date: i32, pub seq: i32 } }

    tl_struct! {
        pub struct Difference = 0x00f49ca0 {
            pub new_messages: Vec<enums::Message>,
            pub new_encrypted_messages: Vec<enums::EncryptedMessage>,
            pub other_updates: Vec<enums::Update>,
            pub chats: Vec<enums::Chat>,
            pub users: Vec<enums::User>,
            pub state: enums::updates::State,
        }
    }

    tl_struct! {
        pub struct DifferenceSlice = 0xa8fb1981 {
            pub new_messages: Vec<enums::Message>,
            pub new_encrypted_messages: Vec<enums::EncryptedMessage>,
            pub other_updates: Vec<enums::Update>,
            pub chats: Vec<enums::Chat>,
            pub users: Vec<enums::User>,
            pub intermediate_state: enums::updates::State,
        }
    }

    tl_struct! { pub struct DifferenceTooLong = 0x4afe8f6d { pub pts: i32 } }

    /// `updates.channelDifferenceEmpty`
    #[derive(Clone, Debug, PartialEq)]
    pub struct ChannelDifferenceEmpty {
        pub r#final: bool,
        pub pts: i32,
        pub timeout: Option<i32>,
    }

    impl Identifiable for ChannelDifferenceEmpty {
        const CONSTRUCTOR_ID: u32 = 0x3e11affb;
    }

    impl Serializable for ChannelDifferenceEmpty {
        fn serialize(&self, buf: &mut impl Extend<u8>) {
            Self::CONSTRUCTOR_ID.serialize(buf);
            (flag(self.r#final, 0) | flag(self.timeout.is_some(), 1)).serialize(buf);
            self.pts.serialize(buf);
            self.timeout.serialize(buf);
        }
    }

    impl Deserializable for ChannelDifferenceEmpty {
        fn deserialize(buf: Buffer) -> Result<Self> {
            let flags = u32::deserialize(buf)?;
            Ok(Self {
                r#final: has(flags, 0),
                pts: i32::deserialize(buf)?,
                timeout: read_if(flags, 1, buf)?,
            })
        }
    }

    /// `updates.channelDifferenceTooLong`: local channel state is too old.
    /// The client restarts from the pts carried by `dialog`.
    #[derive(Clone, Debug, PartialEq)]
    pub struct ChannelDifferenceTooLong {
        pub r#final: bool,
        pub timeout: Option<i32>,
        pub dialog: enums::Dialog,
        pub messages: Vec<enums::Message>,
        pub chats: Vec<enums::Chat>,
        pub users: Vec<enums::User>,
    }

    impl ChannelDifferenceTooLong {
        /// The channel pts to restart from, if the dialog carries one.
        pub fn pts(&self) -> Option<i32> {
            let enums::Dialog::Dialog(dialog) = &self.dialog;
            dialog.pts
        }
    }

    impl Identifiable for ChannelDifferenceTooLong {
        const CONSTRUCTOR_ID: u32 = 0xa4bcc6fe;
    }

    impl Serializable for ChannelDifferenceTooLong {
        fn serialize(&self, buf: &mut impl Extend<u8>) {
            Self::CONSTRUCTOR_ID.serialize(buf);
            (flag(self.r#final, 0) | flag(self.timeout.is_some(), 1)).serialize(buf);
            self.timeout.serialize(buf);
            self.dialog.serialize(buf);
            self.messages.serialize(buf);
            self.chats.serialize(buf);
            self.users.serialize(buf);
        }
    }

    impl Deserializable for ChannelDifferenceTooLong {
        fn deserialize(buf: Buffer) -> Result<Self> {
            let flags = u32::deserialize(buf)?;
            Ok(Self {
                r#final: has(flags, 0),
                timeout: read_if(flags, 1, buf)?,
                dialog: enums::Dialog::deserialize(buf)?,
                messages: Vec::deserialize(buf)?,
                chats: Vec::deserialize(buf)?,
                users: Vec::deserialize(buf)?,
            })
        }
    }

    /// `updates.channelDifference`
    #[derive(Clone, Debug, PartialEq)]
    pub struct ChannelDifference {
        pub r#final: bool,
        pub pts: i32,
        pub timeout: Option<i32>,
        pub new_messages: Vec<enums::Message>,
        pub other_updates: Vec<enums::Update>,
        pub chats: Vec<enums::Chat>,
        pub users: Vec<enums::User>,
    }

    impl Identifiable for ChannelDifference {
        const CONSTRUCTOR_ID: u32 = 0x2064674e;
    }

    impl Serializable for ChannelDifference {
        fn serialize(&self, buf: &mut impl Extend<u8>) {
            Self::CONSTRUCTOR_ID.serialize(buf);
            (flag(self.r#final, 0) | flag(self.timeout.is_some(), 1)).serialize(buf);
            self.pts.serialize(buf);
            self.timeout.serialize(buf);
            self.new_messages.serialize(buf);
            self.other_updates.serialize(buf);
            self.chats.serialize(buf);
            self.users.serialize(buf);
        }
    }

    impl Deserializable for ChannelDifference {
        fn deserialize(buf: Buffer) -> Result<Self> {
            let flags = u32::deserialize(buf)?;
            Ok(Self {
                r#final: has(flags, 0),
                pts: i32::deserialize(buf)?,
                timeout: read_if(flags, 1, buf)?,
                new_messages: Vec::deserialize(buf)?,
                other_updates: Vec::deserialize(buf)?,
                chats: Vec::deserialize(buf)?,
                users: Vec::deserialize(buf)?,
            })
        }
    }
}

// ─── upload.* ────────────────────────────────────────────────────────────────

pub mod upload {
    use crate::enums;

    tl_struct! {
        pub struct File = 0x096a18d5 {
            pub r#type: enums::storage::FileType,
            pub mtime: i32,
            pub bytes: Vec<u8>,
        }
    }

    tl_struct! {
        /// The file lives on a CDN DC; fetch it there and decrypt with the given key.
        pub struct FileCdnRedirect = 0xf18cda44 {
            pub dc_id: i32,
            pub file_token: Vec<u8>,
            pub encryption_key: Vec<u8>,
            pub encryption_iv: Vec<u8>,
            pub file_hashes: Vec<enums::FileHash>,
        }
    }

    tl_struct! { pub struct CdnFileReuploadNeeded = 0xeea8e46e { pub request_token: Vec<u8> } }
    tl_struct! { pub struct CdnFile = 0xa99fca4f { pub bytes: Vec<u8> } }
}

// ─── auth.* ──────────────────────────────────────────────────────────────────

pub mod auth {
    tl_struct! {
        pub struct ExportedAuthorization = 0xb434e2b8 {
            pub id: i64,
            pub bytes: Vec<u8>,
        }
    }
}

// ─── storage.* ───────────────────────────────────────────────────────────────

pub mod storage {
    tl_struct! { pub struct FileUnknown = 0xaa963b05 {} }
    tl_struct! { pub struct FilePartial = 0x40bc6f52 {} }
    tl_struct! { pub struct FileJpeg = 0x007efe0e {} }
    tl_struct! { pub struct FileGif = 0xcae1aadf {} }
    tl_struct! { pub struct FilePng = 0x0a4f63c0 {} }
    tl_struct! { pub struct FilePdf = 0xae1e508d {} }
    tl_struct! { pub struct FileMp3 = 0x528a0677 {} }
    tl_struct! { pub struct FileMov = 0x4b09ebbc {} }
    tl_struct! { pub struct FileMp4 = 0xb3cea0e4 {} }
    tl_struct! { pub struct FileWebp = 0x1081464c {} }
}
