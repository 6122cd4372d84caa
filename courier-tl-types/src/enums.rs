//! Boxed types. Deserializing reads the constructor id and dispatches to the
//! matching variant; an unknown id is an error, never a silent skip.

use crate::types;

// ─── MTProto ─────────────────────────────────────────────────────────────────

tl_enum! {
    pub enum ResPq {
        ResPq(types::ResPq),
    }
}

tl_enum! {
    pub enum PQInnerData {
        PQInnerData(types::PQInnerData),
        Dc(types::PQInnerDataDc),
    }
}

tl_enum! {
    pub enum ServerDhParams {
        Fail(types::ServerDhParamsFail),
        Ok(types::ServerDhParamsOk),
    }
}

tl_enum! {
    pub enum ServerDhInnerData {
        ServerDhInnerData(types::ServerDhInnerData),
    }
}

tl_enum! {
    pub enum ClientDhInnerData {
        ClientDhInnerData(types::ClientDhInnerData),
    }
}

tl_enum! {
    pub enum SetClientDhParamsAnswer {
        DhGenOk(types::DhGenOk),
        DhGenRetry(types::DhGenRetry),
        DhGenFail(types::DhGenFail),
    }
}

tl_enum! {
    pub enum RpcError {
        RpcError(types::RpcError),
    }
}

tl_enum! {
    pub enum MsgsAck {
        MsgsAck(types::MsgsAck),
    }
}

tl_enum! {
    pub enum BadMsgNotification {
        BadMsgNotification(types::BadMsgNotification),
        BadServerSalt(types::BadServerSalt),
    }
}

tl_enum! {
    pub enum NewSession {
        Created(types::NewSessionCreated),
    }
}

tl_enum! {
    pub enum Pong {
        Pong(types::Pong),
    }
}

tl_enum! {
    pub enum MsgDetailedInfo {
        Info(types::MsgDetailedInfo),
        New(types::MsgNewDetailedInfo),
    }
}

// ─── Peers ───────────────────────────────────────────────────────────────────

tl_enum! {
    pub enum Peer {
        User(types::PeerUser),
        Chat(types::PeerChat),
        Channel(types::PeerChannel),
    }
}

tl_enum! {
    pub enum InputPeer {
        Empty(types::InputPeerEmpty),
        PeerSelf(types::InputPeerSelf),
        Chat(types::InputPeerChat),
        User(types::InputPeerUser),
        Channel(types::InputPeerChannel),
    }
}

tl_enum! {
    pub enum InputChannel {
        Empty(types::InputChannelEmpty),
        Channel(types::InputChannel),
    }
}

// ─── Users ───────────────────────────────────────────────────────────────────

tl_enum! {
    pub enum User {
        Empty(types::UserEmpty),
        User(types::User),
    }
}

impl User {
    pub fn id(&self) -> i64 {
        match self {
            Self::Empty(u) => u.id,
            Self::User(u) => u.id,
        }
    }
}

tl_enum! {
    pub enum Username {
        Username(types::Username),
    }
}

tl_enum! {
    pub enum UserProfilePhoto {
        Empty(types::UserProfilePhotoEmpty),
        Photo(types::UserProfilePhoto),
    }
}

tl_enum! {
    pub enum UserStatus {
        Empty(types::UserStatusEmpty),
        Online(types::UserStatusOnline),
        Offline(types::UserStatusOffline),
        Recently(types::UserStatusRecently),
        LastWeek(types::UserStatusLastWeek),
        LastMonth(types::UserStatusLastMonth),
    }
}

tl_enum! {
    pub enum EmojiStatus {
        Empty(types::EmojiStatusEmpty),
        Status(types::EmojiStatus),
        Collectible(types::EmojiStatusCollectible),
    }
}

tl_enum! {
    pub enum PeerColor {
        PeerColor(types::PeerColor),
    }
}

tl_enum! {
    pub enum RestrictionReason {
        RestrictionReason(types::RestrictionReason),
    }
}

// ─── Chats ───────────────────────────────────────────────────────────────────

tl_enum! {
    pub enum ChatPhoto {
        Empty(types::ChatPhotoEmpty),
        Photo(types::ChatPhoto),
    }
}

impl Default for ChatPhoto {
    fn default() -> Self {
        Self::Empty(types::ChatPhotoEmpty {})
    }
}

tl_enum! {
    pub enum ChatAdminRights {
        ChatAdminRights(types::ChatAdminRights),
    }
}

tl_enum! {
    pub enum ChatBannedRights {
        ChatBannedRights(types::ChatBannedRights),
    }
}

tl_enum! {
    pub enum Chat {
        Empty(types::ChatEmpty),
        Chat(types::Chat),
        Forbidden(types::ChatForbidden),
        Channel(types::Channel),
        ChannelForbidden(types::ChannelForbidden),
    }
}

impl Chat {
    pub fn id(&self) -> i64 {
        match self {
            Self::Empty(c) => c.id,
            Self::Chat(c) => c.id,
            Self::Forbidden(c) => c.id,
            Self::Channel(c) => c.id,
            Self::ChannelForbidden(c) => c.id,
        }
    }
}

tl_enum! {
    pub enum ChatParticipant {
        Participant(types::ChatParticipant),
        Creator(types::ChatParticipantCreator),
        Admin(types::ChatParticipantAdmin),
    }
}

tl_enum! {
    pub enum ChannelParticipant {
        Participant(types::ChannelParticipant),
        ParticipantSelf(types::ChannelParticipantSelf),
        Creator(types::ChannelParticipantCreator),
        Admin(types::ChannelParticipantAdmin),
        Banned(types::ChannelParticipantBanned),
        Left(types::ChannelParticipantLeft),
    }
}

tl_enum! {
    pub enum StarsSubscriptionPricing {
        StarsSubscriptionPricing(types::StarsSubscriptionPricing),
    }
}

tl_enum! {
    pub enum ExportedChatInvite {
        Exported(types::ChatInviteExported),
        PublicJoinRequests(types::ChatInvitePublicJoinRequests),
    }
}

// ─── Message content ─────────────────────────────────────────────────────────

tl_enum! {
    pub enum MessageEntity {
        Unknown(types::MessageEntityUnknown),
        Mention(types::MessageEntityMention),
        Hashtag(types::MessageEntityHashtag),
        BotCommand(types::MessageEntityBotCommand),
        Url(types::MessageEntityUrl),
        Email(types::MessageEntityEmail),
        Bold(types::MessageEntityBold),
        Italic(types::MessageEntityItalic),
        Code(types::MessageEntityCode),
        Pre(types::MessageEntityPre),
        TextUrl(types::MessageEntityTextUrl),
        MentionName(types::MessageEntityMentionName),
        Phone(types::MessageEntityPhone),
        Cashtag(types::MessageEntityCashtag),
        Underline(types::MessageEntityUnderline),
        Strike(types::MessageEntityStrike),
        BankCard(types::MessageEntityBankCard),
        Spoiler(types::MessageEntitySpoiler),
        CustomEmoji(types::MessageEntityCustomEmoji),
        Blockquote(types::MessageEntityBlockquote),
    }
}

tl_enum! {
    pub enum TextWithEntities {
        TextWithEntities(types::TextWithEntities),
    }
}

tl_enum! {
    pub enum MessageFwdHeader {
        MessageFwdHeader(types::MessageFwdHeader),
    }
}

tl_enum! {
    pub enum MessageReplyHeader {
        Header(types::MessageReplyHeader),
        Story(types::MessageReplyStoryHeader),
    }
}

tl_enum! {
    pub enum MessageReplies {
        MessageReplies(types::MessageReplies),
    }
}

tl_enum! {
    pub enum Reaction {
        Empty(types::ReactionEmpty),
        Emoji(types::ReactionEmoji),
        CustomEmoji(types::ReactionCustomEmoji),
        Paid(types::ReactionPaid),
    }
}

tl_enum! {
    pub enum ReactionCount {
        ReactionCount(types::ReactionCount),
    }
}

tl_enum! {
    pub enum MessagePeerReaction {
        MessagePeerReaction(types::MessagePeerReaction),
    }
}

tl_enum! {
    pub enum MessageReactor {
        MessageReactor(types::MessageReactor),
    }
}

tl_enum! {
    pub enum MessageReactions {
        MessageReactions(types::MessageReactions),
    }
}

tl_enum! {
    pub enum FactCheck {
        FactCheck(types::FactCheck),
    }
}

tl_enum! {
    pub enum StarsAmount {
        Stars(types::StarsAmount),
        Ton(types::StarsTonAmount),
    }
}

tl_enum! {
    pub enum SuggestedPost {
        SuggestedPost(types::SuggestedPost),
    }
}

// ─── Media ───────────────────────────────────────────────────────────────────

tl_enum! {
    pub enum GeoPoint {
        Empty(types::GeoPointEmpty),
        GeoPoint(types::GeoPoint),
    }
}

tl_enum! {
    pub enum PhotoSize {
        Empty(types::PhotoSizeEmpty),
        Size(types::PhotoSize),
        Cached(types::PhotoCachedSize),
        Stripped(types::PhotoStrippedSize),
        Progressive(types::PhotoSizeProgressive),
        Path(types::PhotoPathSize),
    }
}

tl_enum! {
    pub enum VideoSize {
        Size(types::VideoSize),
        EmojiMarkup(types::VideoSizeEmojiMarkup),
        StickerMarkup(types::VideoSizeStickerMarkup),
    }
}

tl_enum! {
    pub enum Photo {
        Empty(types::PhotoEmpty),
        Photo(types::Photo),
    }
}

tl_enum! {
    pub enum InputStickerSet {
        Empty(types::InputStickerSetEmpty),
        Id(types::InputStickerSetId),
        ShortName(types::InputStickerSetShortName),
        AnimatedEmoji(types::InputStickerSetAnimatedEmoji),
        Dice(types::InputStickerSetDice),
    }
}

tl_enum! {
    pub enum MaskCoords {
        MaskCoords(types::MaskCoords),
    }
}

tl_enum! {
    pub enum DocumentAttribute {
        ImageSize(types::DocumentAttributeImageSize),
        Animated(types::DocumentAttributeAnimated),
        Sticker(types::DocumentAttributeSticker),
        Video(types::DocumentAttributeVideo),
        Audio(types::DocumentAttributeAudio),
        Filename(types::DocumentAttributeFilename),
        HasStickers(types::DocumentAttributeHasStickers),
        CustomEmoji(types::DocumentAttributeCustomEmoji),
    }
}

tl_enum! {
    pub enum Document {
        Empty(types::DocumentEmpty),
        Document(types::Document),
    }
}

tl_enum! {
    pub enum WebPage {
        Empty(types::WebPageEmpty),
        Pending(types::WebPagePending),
        WebPage(types::WebPage),
        NotModified(types::WebPageNotModified),
    }
}

tl_enum! {
    pub enum MessageMedia {
        Empty(types::MessageMediaEmpty),
        Photo(types::MessageMediaPhoto),
        Geo(types::MessageMediaGeo),
        Contact(types::MessageMediaContact),
        Unsupported(types::MessageMediaUnsupported),
        Document(types::MessageMediaDocument),
        WebPage(types::MessageMediaWebPage),
        Venue(types::MessageMediaVenue),
        GeoLive(types::MessageMediaGeoLive),
        Dice(types::MessageMediaDice),
    }
}

tl_enum! {
    pub enum InputMedia {
        Empty(types::InputMediaEmpty),
    }
}

// ─── Reply markup ────────────────────────────────────────────────────────────

tl_enum! {
    pub enum InlineQueryPeerType {
        SameBotPm(types::InlineQueryPeerTypeSameBotPm),
        Pm(types::InlineQueryPeerTypePm),
        Chat(types::InlineQueryPeerTypeChat),
        Megagroup(types::InlineQueryPeerTypeMegagroup),
        Broadcast(types::InlineQueryPeerTypeBroadcast),
        BotPm(types::InlineQueryPeerTypeBotPm),
    }
}

tl_enum! {
    pub enum KeyboardButton {
        Button(types::KeyboardButton),
        Url(types::KeyboardButtonUrl),
        Callback(types::KeyboardButtonCallback),
        RequestPhone(types::KeyboardButtonRequestPhone),
        RequestGeoLocation(types::KeyboardButtonRequestGeoLocation),
        SwitchInline(types::KeyboardButtonSwitchInline),
        Game(types::KeyboardButtonGame),
        Buy(types::KeyboardButtonBuy),
        UrlAuth(types::KeyboardButtonUrlAuth),
        RequestPoll(types::KeyboardButtonRequestPoll),
        UserProfile(types::KeyboardButtonUserProfile),
        WebView(types::KeyboardButtonWebView),
        SimpleWebView(types::KeyboardButtonSimpleWebView),
        Copy(types::KeyboardButtonCopy),
    }
}

tl_enum! {
    pub enum KeyboardButtonRow {
        KeyboardButtonRow(types::KeyboardButtonRow),
    }
}

tl_enum! {
    pub enum ReplyMarkup {
        Hide(types::ReplyKeyboardHide),
        ForceReply(types::ReplyKeyboardForceReply),
        Markup(types::ReplyKeyboardMarkup),
        Inline(types::ReplyInlineMarkup),
    }
}

// ─── Messages ────────────────────────────────────────────────────────────────

tl_enum! {
    pub enum MessageAction {
        Empty(types::MessageActionEmpty),
        ChatCreate(types::MessageActionChatCreate),
        ChatEditTitle(types::MessageActionChatEditTitle),
        ChatEditPhoto(types::MessageActionChatEditPhoto),
        ChatDeletePhoto(types::MessageActionChatDeletePhoto),
        ChatAddUser(types::MessageActionChatAddUser),
        ChatDeleteUser(types::MessageActionChatDeleteUser),
        ChatJoinedByLink(types::MessageActionChatJoinedByLink),
        ChannelCreate(types::MessageActionChannelCreate),
        ChatMigrateTo(types::MessageActionChatMigrateTo),
        ChannelMigrateFrom(types::MessageActionChannelMigrateFrom),
        PinMessage(types::MessageActionPinMessage),
        HistoryClear(types::MessageActionHistoryClear),
        ScreenshotTaken(types::MessageActionScreenshotTaken),
        CustomAction(types::MessageActionCustomAction),
        ContactSignUp(types::MessageActionContactSignUp),
        ChatJoinedByRequest(types::MessageActionChatJoinedByRequest),
        SetMessagesTtl(types::MessageActionSetMessagesTtl),
    }
}

tl_enum! {
    pub enum Message {
        Empty(types::MessageEmpty),
        Message(types::Message),
        Service(types::MessageService),
    }
}

impl Message {
    pub fn id(&self) -> i32 {
        match self {
            Self::Empty(m) => m.id,
            Self::Message(m) => m.id,
            Self::Service(m) => m.id,
        }
    }

    /// The chat the message lives in. `messageEmpty` may omit it.
    pub fn peer_id(&self) -> Option<&Peer> {
        match self {
            Self::Empty(m) => m.peer_id.as_ref(),
            Self::Message(m) => Some(&m.peer_id),
            Self::Service(m) => Some(&m.peer_id),
        }
    }
}

// ─── Polls ───────────────────────────────────────────────────────────────────

tl_enum! {
    pub enum PollAnswer {
        PollAnswer(types::PollAnswer),
    }
}

tl_enum! {
    pub enum Poll {
        Poll(types::Poll),
    }
}

tl_enum! {
    pub enum PollAnswerVoters {
        PollAnswerVoters(types::PollAnswerVoters),
    }
}

tl_enum! {
    pub enum PollResults {
        PollResults(types::PollResults),
    }
}

// ─── Stories ─────────────────────────────────────────────────────────────────

tl_enum! {
    pub enum PrivacyRule {
        AllowContacts(types::PrivacyValueAllowContacts),
        AllowAll(types::PrivacyValueAllowAll),
        AllowUsers(types::PrivacyValueAllowUsers),
        DisallowContacts(types::PrivacyValueDisallowContacts),
        DisallowAll(types::PrivacyValueDisallowAll),
        DisallowUsers(types::PrivacyValueDisallowUsers),
        AllowChatParticipants(types::PrivacyValueAllowChatParticipants),
        DisallowChatParticipants(types::PrivacyValueDisallowChatParticipants),
        AllowCloseFriends(types::PrivacyValueAllowCloseFriends),
        AllowPremium(types::PrivacyValueAllowPremium),
        AllowBots(types::PrivacyValueAllowBots),
        DisallowBots(types::PrivacyValueDisallowBots),
    }
}

tl_enum! {
    pub enum StoryViews {
        StoryViews(types::StoryViews),
    }
}

tl_enum! {
    pub enum StoryFwdHeader {
        StoryFwdHeader(types::StoryFwdHeader),
    }
}

tl_enum! {
    pub enum StoryItem {
        Deleted(types::StoryItemDeleted),
        Skipped(types::StoryItemSkipped),
        Item(types::StoryItem),
    }
}

impl StoryItem {
    pub fn id(&self) -> i32 {
        match self {
            Self::Deleted(s) => s.id,
            Self::Skipped(s) => s.id,
            Self::Item(s) => s.id,
        }
    }
}

// ─── Bots ────────────────────────────────────────────────────────────────────

tl_enum! {
    pub enum InputBotInlineMessageId {
        Id(types::InputBotInlineMessageId),
        Id64(types::InputBotInlineMessageId64),
    }
}

tl_enum! {
    pub enum BusinessBotRights {
        BusinessBotRights(types::BusinessBotRights),
    }
}

tl_enum! {
    pub enum BotBusinessConnection {
        BotBusinessConnection(types::BotBusinessConnection),
    }
}

// ─── Dialogs ─────────────────────────────────────────────────────────────────

tl_enum! {
    pub enum NotificationSound {
        Default(types::NotificationSoundDefault),
        None(types::NotificationSoundNone),
        Local(types::NotificationSoundLocal),
        Ringtone(types::NotificationSoundRingtone),
    }
}

tl_enum! {
    pub enum PeerNotifySettings {
        PeerNotifySettings(types::PeerNotifySettings),
    }
}

tl_enum! {
    pub enum InputReplyTo {
        Message(types::InputReplyToMessage),
        Story(types::InputReplyToStory),
        MonoForum(types::InputReplyToMonoForum),
    }
}

tl_enum! {
    pub enum DraftMessage {
        Empty(types::DraftMessageEmpty),
        Draft(types::DraftMessage),
    }
}

tl_enum! {
    pub enum Dialog {
        Dialog(types::Dialog),
    }
}

// ─── Secret chats ────────────────────────────────────────────────────────────

tl_enum! {
    pub enum EncryptedFile {
        Empty(types::EncryptedFileEmpty),
        File(types::EncryptedFile),
    }
}

tl_enum! {
    pub enum EncryptedMessage {
        Message(types::EncryptedMessage),
        Service(types::EncryptedMessageService),
    }
}

// ─── Updates ─────────────────────────────────────────────────────────────────

tl_enum! {
    pub enum Update {
        NewMessage(types::UpdateNewMessage),
        NewChannelMessage(types::UpdateNewChannelMessage),
        EditMessage(types::UpdateEditMessage),
        EditChannelMessage(types::UpdateEditChannelMessage),
        DeleteMessages(types::UpdateDeleteMessages),
        DeleteChannelMessages(types::UpdateDeleteChannelMessages),
        ChannelTooLong(types::UpdateChannelTooLong),
        NewScheduledMessage(types::UpdateNewScheduledMessage),
        MessageId(types::UpdateMessageId),
        UserStatus(types::UpdateUserStatus),
        BotCallbackQuery(types::UpdateBotCallbackQuery),
        BotInlineQuery(types::UpdateBotInlineQuery),
        BotInlineSend(types::UpdateBotInlineSend),
        MessagePoll(types::UpdateMessagePoll),
        MessagePollVote(types::UpdateMessagePollVote),
        ChatParticipant(types::UpdateChatParticipant),
        ChannelParticipant(types::UpdateChannelParticipant),
        BotChatInviteRequester(types::UpdateBotChatInviteRequester),
        Story(types::UpdateStory),
        BotMessageReaction(types::UpdateBotMessageReaction),
        BotBusinessConnect(types::UpdateBotBusinessConnect),
        BotNewBusinessMessage(types::UpdateBotNewBusinessMessage),
        BotEditBusinessMessage(types::UpdateBotEditBusinessMessage),
        BotDeleteBusinessMessage(types::UpdateBotDeleteBusinessMessage),
    }
}

tl_enum! {
    pub enum Updates {
        TooLong(types::UpdatesTooLong),
        UpdateShortMessage(types::UpdateShortMessage),
        UpdateShortChatMessage(types::UpdateShortChatMessage),
        UpdateShort(types::UpdateShort),
        Combined(types::UpdatesCombined),
        Updates(types::Updates),
        UpdateShortSentMessage(types::UpdateShortSentMessage),
    }
}

// ─── Files ───────────────────────────────────────────────────────────────────

tl_enum! {
    pub enum FileHash {
        FileHash(types::FileHash),
    }
}

tl_enum! {
    pub enum InputFile {
        File(types::InputFile),
        Big(types::InputFileBig),
    }
}

tl_enum! {
    pub enum InputFileLocation {
        Document(types::InputDocumentFileLocation),
        Photo(types::InputPhotoFileLocation),
    }
}

tl_enum! {
    pub enum NearestDc {
        NearestDc(types::NearestDc),
    }
}

tl_enum! {
    pub enum ChannelMessagesFilter {
        Empty(types::ChannelMessagesFilterEmpty),
    }
}

// ─── updates.* ───────────────────────────────────────────────────────────────

pub mod updates {
    use crate::types::updates as t;

    tl_enum! {
        pub enum State {
            State(t::State),
        }
    }

    tl_enum! {
        pub enum Difference {
            Empty(t::DifferenceEmpty),
            Difference(t::Difference),
            Slice(t::DifferenceSlice),
            TooLong(t::DifferenceTooLong),
        }
    }

    tl_enum! {
        pub enum ChannelDifference {
            Empty(t::ChannelDifferenceEmpty),
            TooLong(t::ChannelDifferenceTooLong),
            Difference(t::ChannelDifference),
        }
    }
}

// ─── upload.* ────────────────────────────────────────────────────────────────

pub mod upload {
    use crate::types::upload as t;

    tl_enum! {
        pub enum File {
            File(t::File),
            CdnRedirect(t::FileCdnRedirect),
        }
    }

    tl_enum! {
        pub enum CdnFile {
            ReuploadNeeded(t::CdnFileReuploadNeeded),
            File(t::CdnFile),
        }
    }
}

// ─── auth.* ──────────────────────────────────────────────────────────────────

pub mod auth {
    tl_enum! {
        pub enum ExportedAuthorization {
            ExportedAuthorization(crate::types::auth::ExportedAuthorization),
        }
    }
}

// ─── storage.* ───────────────────────────────────────────────────────────────

pub mod storage {
    use crate::types::storage as t;

    tl_enum! {
        pub enum FileType {
            Unknown(t::FileUnknown),
            Partial(t::FilePartial),
            Jpeg(t::FileJpeg),
            Gif(t::FileGif),
            Png(t::FilePng),
            Pdf(t::FilePdf),
            Mp3(t::FileMp3),
            Mov(t::FileMov),
            Mp4(t::FileMp4),
            Webp(t::FileWebp),
        }
    }
}
