//! RPC functions. Each one implements [`RemoteCall`] so the caller knows what
//! the server answers with.

use crate::{Identifiable, RemoteCall, Serializable, enums};

// ─── MTProto ─────────────────────────────────────────────────────────────────

tl_function! {
    /// First step of the auth-key exchange.
    pub struct ReqPqMulti = 0xbe7e8ef1 -> enums::ResPq {
        pub nonce: [u8; 16],
    }
}

tl_function! {
    pub struct ReqDhParams = 0xd712e4be -> enums::ServerDhParams {
        pub nonce: [u8; 16],
        pub server_nonce: [u8; 16],
        pub p: Vec<u8>,
        pub q: Vec<u8>,
        pub public_key_fingerprint: i64,
        pub encrypted_data: Vec<u8>,
    }
}

tl_function! {
    pub struct SetClientDhParams = 0xf5045f1f -> enums::SetClientDhParamsAnswer {
        pub nonce: [u8; 16],
        pub server_nonce: [u8; 16],
        pub encrypted_data: Vec<u8>,
    }
}

tl_function! {
    pub struct Ping = 0x7abe77ec -> enums::Pong {
        pub ping_id: i64,
    }
}

tl_function! {
    /// Ping that also asks the server to drop the connection if no further
    /// ping arrives within `disconnect_delay` seconds.
    pub struct PingDelayDisconnect = 0xf3427b8c -> enums::Pong {
        pub ping_id: i64,
        pub disconnect_delay: i32,
    }
}

// ─── Wrappers ────────────────────────────────────────────────────────────────

/// `invokeWithLayer`: pins the API layer for the wrapped query.
#[derive(Clone, Debug, PartialEq)]
pub struct InvokeWithLayer<X> {
    pub layer: i32,
    pub query: X,
}

impl<X> Identifiable for InvokeWithLayer<X> {
    const CONSTRUCTOR_ID: u32 = 0xda9b0d0d;
}

impl<X: Serializable> Serializable for InvokeWithLayer<X> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        self.layer.serialize(buf);
        self.query.serialize(buf);
    }
}

impl<X: RemoteCall> RemoteCall for InvokeWithLayer<X> {
    type Return = X::Return;
}

/// `initConnection`: announces the client to the server. Sent once per
/// connection, wrapped in [`InvokeWithLayer`].
#[derive(Clone, Debug, PartialEq)]
pub struct InitConnection<X> {
    pub api_id: i32,
    pub device_model: String,
    pub system_version: String,
    pub app_version: String,
    pub system_lang_code: String,
    pub lang_pack: String,
    pub lang_code: String,
    pub query: X,
}

impl<X> Identifiable for InitConnection<X> {
    const CONSTRUCTOR_ID: u32 = 0xc1cd5ea9;
}

impl<X: Serializable> Serializable for InitConnection<X> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        // No proxy or params.
        0u32.serialize(buf);
        self.api_id.serialize(buf);
        self.device_model.serialize(buf);
        self.system_version.serialize(buf);
        self.app_version.serialize(buf);
        self.system_lang_code.serialize(buf);
        self.lang_pack.serialize(buf);
        self.lang_code.serialize(buf);
        self.query.serialize(buf);
    }
}

impl<X: RemoteCall> RemoteCall for InitConnection<X> {
    type Return = X::Return;
}

/// `invokeWithBusinessConnection`: runs the query on behalf of a business
/// account connected to the bot.
#[derive(Clone, Debug, PartialEq)]
pub struct InvokeWithBusinessConnection<X> {
    pub connection_id: String,
    pub query: X,
}

impl<X> Identifiable for InvokeWithBusinessConnection<X> {
    const CONSTRUCTOR_ID: u32 = 0xdd289f8e;
}

impl<X: Serializable> Serializable for InvokeWithBusinessConnection<X> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        self.connection_id.serialize(buf);
        self.query.serialize(buf);
    }
}

impl<X: RemoteCall> RemoteCall for InvokeWithBusinessConnection<X> {
    type Return = X::Return;
}

// ─── help.* ──────────────────────────────────────────────────────────────────

pub mod help {
    use crate::enums;

    tl_function! {
        pub struct GetNearestDc = 0x1fb33026 -> enums::NearestDc {}
    }
}

// ─── updates.* ───────────────────────────────────────────────────────────────

pub mod updates {
    use crate::deserialize::{Buffer, Result};
    use crate::{Deserializable, Identifiable, RemoteCall, Serializable, enums, flag, read_if};

    tl_function! {
        pub struct GetState = 0xedd4882a -> enums::updates::State {}
    }

    /// `updates.getDifference`
    #[derive(Clone, Debug, PartialEq)]
    pub struct GetDifference {
        pub pts: i32,
        pub pts_limit: Option<i32>,
        pub pts_total_limit: Option<i32>,
        pub date: i32,
        pub qts: i32,
        pub qts_limit: Option<i32>,
    }

    impl Identifiable for GetDifference {
        const CONSTRUCTOR_ID: u32 = 0x19c2f763;
    }

    impl Serializable for GetDifference {
        fn serialize(&self, buf: &mut impl Extend<u8>) {
            Self::CONSTRUCTOR_ID.serialize(buf);
            let flags = flag(self.pts_total_limit.is_some(), 0)
                | flag(self.pts_limit.is_some(), 1)
                | flag(self.qts_limit.is_some(), 2);
            flags.serialize(buf);
            self.pts.serialize(buf);
            self.pts_limit.serialize(buf);
            self.pts_total_limit.serialize(buf);
            self.date.serialize(buf);
            self.qts.serialize(buf);
            self.qts_limit.serialize(buf);
        }
    }

    impl Deserializable for GetDifference {
        fn deserialize(buf: Buffer) -> Result<Self> {
            let flags = u32::deserialize(buf)?;
            Ok(Self {
                pts: i32::deserialize(buf)?,
                pts_limit: read_if(flags, 1, buf)?,
                pts_total_limit: read_if(flags, 0, buf)?,
                date: i32::deserialize(buf)?,
                qts: i32::deserialize(buf)?,
                qts_limit: read_if(flags, 2, buf)?,
            })
        }
    }

    impl RemoteCall for GetDifference {
        type Return = enums::updates::Difference;
    }

    /// `updates.getChannelDifference`
    #[derive(Clone, Debug, PartialEq)]
    pub struct GetChannelDifference {
        pub force: bool,
        pub channel: enums::InputChannel,
        pub filter: enums::ChannelMessagesFilter,
        pub pts: i32,
        pub limit: i32,
    }

    impl Identifiable for GetChannelDifference {
        const CONSTRUCTOR_ID: u32 = 0x03173d78;
    }

    impl Serializable for GetChannelDifference {
        fn serialize(&self, buf: &mut impl Extend<u8>) {
            Self::CONSTRUCTOR_ID.serialize(buf);
            flag(self.force, 0).serialize(buf);
            self.channel.serialize(buf);
            self.filter.serialize(buf);
            self.pts.serialize(buf);
            self.limit.serialize(buf);
        }
    }

    impl Deserializable for GetChannelDifference {
        fn deserialize(buf: Buffer) -> Result<Self> {
            let flags = u32::deserialize(buf)?;
            Ok(Self {
                force: flags & 1 != 0,
                channel: enums::InputChannel::deserialize(buf)?,
                filter: enums::ChannelMessagesFilter::deserialize(buf)?,
                pts: i32::deserialize(buf)?,
                limit: i32::deserialize(buf)?,
            })
        }
    }

    impl RemoteCall for GetChannelDifference {
        type Return = enums::updates::ChannelDifference;
    }
}

// ─── upload.* ────────────────────────────────────────────────────────────────

pub mod upload {
    use crate::deserialize::{Buffer, Result};
    use crate::{Deserializable, Identifiable, RemoteCall, Serializable, enums, flag};

    /// `upload.getFile`
    #[derive(Clone, Debug, PartialEq)]
    pub struct GetFile {
        pub precise: bool,
        pub cdn_supported: bool,
        pub location: enums::InputFileLocation,
        pub offset: i64,
        pub limit: i32,
    }

    impl Identifiable for GetFile {
        const CONSTRUCTOR_ID: u32 = 0xbe5335be;
    }

    impl Serializable for GetFile {
        fn serialize(&self, buf: &mut impl Extend<u8>) {
            Self::CONSTRUCTOR_ID.serialize(buf);
            (flag(self.precise, 0) | flag(self.cdn_supported, 1)).serialize(buf);
            self.location.serialize(buf);
            self.offset.serialize(buf);
            self.limit.serialize(buf);
        }
    }

    impl Deserializable for GetFile {
        fn deserialize(buf: Buffer) -> Result<Self> {
            let flags = u32::deserialize(buf)?;
            Ok(Self {
                precise: flags & 1 != 0,
                cdn_supported: flags & 2 != 0,
                location: enums::InputFileLocation::deserialize(buf)?,
                offset: i64::deserialize(buf)?,
                limit: i32::deserialize(buf)?,
            })
        }
    }

    impl RemoteCall for GetFile {
        type Return = enums::upload::File;
    }

    tl_function! {
        pub struct GetCdnFile = 0x395f69da -> enums::upload::CdnFile {
            pub file_token: Vec<u8>,
            pub offset: i64,
            pub limit: i32,
        }
    }

    tl_function! {
        pub struct ReuploadCdnFile = 0x9b2754a8 -> Vec<enums::FileHash> {
            pub file_token: Vec<u8>,
            pub request_token: Vec<u8>,
        }
    }

    tl_function! {
        pub struct GetCdnFileHashes = 0x91dc3f31 -> Vec<enums::FileHash> {
            pub file_token: Vec<u8>,
            pub offset: i64,
        }
    }

    tl_function! {
        pub struct SaveFilePart = 0xb304a621 -> bool {
            pub file_id: i64,
            pub file_part: i32,
            pub bytes: Vec<u8>,
        }
    }

    tl_function! {
        pub struct SaveBigFilePart = 0xde7b673d -> bool {
            pub file_id: i64,
            pub file_part: i32,
            pub file_total_parts: i32,
            pub bytes: Vec<u8>,
        }
    }
}

// ─── auth.* ──────────────────────────────────────────────────────────────────

pub mod auth {
    use crate::{Blob, enums};

    tl_function! {
        pub struct ExportAuthorization = 0xe5bfffcd -> enums::auth::ExportedAuthorization {
            pub dc_id: i32,
        }
    }

    tl_function! {
        /// Answers with `auth.Authorization`, which the client core does not
        /// inspect; success is all that matters.
        pub struct ImportAuthorization = 0xa57a7dad -> Blob {
            pub id: i64,
            pub bytes: Vec<u8>,
        }
    }

    tl_function! {
        /// Answers with the raw `auth.Authorization`; `flags` is always `0`.
        pub struct ImportBotAuthorization = 0x67a3ff2c -> Blob {
            pub flags: i32,
            pub api_id: i32,
            pub api_hash: String,
            pub bot_auth_token: String,
        }
    }
}
