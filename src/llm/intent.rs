//! Intent vocabulary and the structured result of classifying an utterance

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Slot carrying the display name of the entity a command targets
pub const TARGET_NAME: &str = "target_name";
/// Slot carrying the text of a poll option
pub const OPTION_TEXT: &str = "option_text";
/// Slot carrying a poll option's 1-based position ("the second option")
pub const OPTION_INDEX: &str = "option_index";
/// Slot carrying a reaction emoji
pub const EMOJI: &str = "emoji";

/// Raw command text as typed or transcribed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance(String);

impl Utterance {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Utterance {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Classified purpose of a command
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Intent {
    AcceptRequest,
    DeclineRequest,
    AddFriend,
    OpenProfile,
    Unfriend,
    GoBack,
    ReloadPage,
    OpenAdsCenter,
    OpenMessages,
    OpenRoomsHub,
    OpenAudioRooms,
    OpenVideoRooms,
    OpenFriends,
    OpenFeed,
    ScrollUp,
    ScrollDown,
    StopScroll,
    ReactToPost,
    LikePost,
    VotePoll,
    /// Any tag outside the vocabulary, kept verbatim for logging
    Unrecognized(String),
}

/// Wire tags, in the order the prompt lists them
pub const KNOWN_TAGS: &[&str] = &[
    "intent_accept_request",
    "intent_decline_request",
    "intent_add_friend",
    "intent_open_profile",
    "intent_unfriend_user",
    "intent_go_back",
    "intent_reload_page",
    "intent_open_ads_center",
    "intent_open_messages",
    "intent_open_rooms_hub",
    "intent_open_audio_rooms",
    "intent_open_video_rooms",
    "intent_open_friends_page",
    "intent_open_feed",
    "intent_scroll_up",
    "intent_scroll_down",
    "intent_stop_scroll",
    "intent_react_to_post",
    "intent_like",
    "intent_vote_poll",
];

impl Intent {
    /// Parse a wire tag; unknown tags become `Unrecognized`
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "intent_accept_request" => Intent::AcceptRequest,
            "intent_decline_request" => Intent::DeclineRequest,
            "intent_add_friend" => Intent::AddFriend,
            "intent_open_profile" => Intent::OpenProfile,
            "intent_unfriend_user" => Intent::Unfriend,
            "intent_go_back" => Intent::GoBack,
            "intent_reload_page" => Intent::ReloadPage,
            "intent_open_ads_center" => Intent::OpenAdsCenter,
            "intent_open_messages" => Intent::OpenMessages,
            "intent_open_rooms_hub" => Intent::OpenRoomsHub,
            "intent_open_audio_rooms" => Intent::OpenAudioRooms,
            "intent_open_video_rooms" => Intent::OpenVideoRooms,
            "intent_open_friends_page" => Intent::OpenFriends,
            "intent_open_feed" => Intent::OpenFeed,
            "intent_scroll_up" => Intent::ScrollUp,
            "intent_scroll_down" => Intent::ScrollDown,
            "intent_stop_scroll" => Intent::StopScroll,
            "intent_react_to_post" => Intent::ReactToPost,
            "intent_like" => Intent::LikePost,
            "intent_vote_poll" => Intent::VotePoll,
            other => Intent::Unrecognized(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Intent::AcceptRequest => "intent_accept_request",
            Intent::DeclineRequest => "intent_decline_request",
            Intent::AddFriend => "intent_add_friend",
            Intent::OpenProfile => "intent_open_profile",
            Intent::Unfriend => "intent_unfriend_user",
            Intent::GoBack => "intent_go_back",
            Intent::ReloadPage => "intent_reload_page",
            Intent::OpenAdsCenter => "intent_open_ads_center",
            Intent::OpenMessages => "intent_open_messages",
            Intent::OpenRoomsHub => "intent_open_rooms_hub",
            Intent::OpenAudioRooms => "intent_open_audio_rooms",
            Intent::OpenVideoRooms => "intent_open_video_rooms",
            Intent::OpenFriends => "intent_open_friends_page",
            Intent::OpenFeed => "intent_open_feed",
            Intent::ScrollUp => "intent_scroll_up",
            Intent::ScrollDown => "intent_scroll_down",
            Intent::StopScroll => "intent_stop_scroll",
            Intent::ReactToPost => "intent_react_to_post",
            Intent::LikePost => "intent_like",
            Intent::VotePoll => "intent_vote_poll",
            Intent::Unrecognized(tag) => tag,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Intent::Unrecognized(_))
    }
}

/// A slot value: names and free text, or numbers such as option indices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotValue {
    Text(String),
    Number(f64),
}

impl SlotValue {
    /// Text form used for name matching; numbers render without a fraction when integral
    pub fn as_text(&self) -> String {
        match self {
            SlotValue::Text(s) => s.clone(),
            SlotValue::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
            SlotValue::Number(n) => n.to_string(),
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            SlotValue::Number(n) if *n >= 0.0 && n.fract() == 0.0 => Some(*n as usize),
            SlotValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

pub type Slots = BTreeMap<String, SlotValue>;

/// Outcome of classifying one utterance
#[derive(Debug, Clone, PartialEq)]
pub struct IntentResult {
    pub intent: Intent,
    pub slots: Slots,
}

impl IntentResult {
    pub fn new(intent: Intent) -> Self {
        Self {
            intent,
            slots: Slots::new(),
        }
    }

    pub fn with_slot(mut self, name: &str, value: SlotValue) -> Self {
        self.slots.insert(name.to_string(), value);
        self
    }

    /// Sentinel used whenever the NLU collaborator fails or times out
    pub fn unrecognized() -> Self {
        Self::new(Intent::Unrecognized(String::new()))
    }

    pub fn slot(&self, name: &str) -> Option<&SlotValue> {
        self.slots.get(name)
    }

    /// The name-like slot used for entity binding
    pub fn target_name(&self) -> Option<String> {
        self.slot(TARGET_NAME).map(SlotValue::as_text)
    }
}

impl Default for IntentResult {
    fn default() -> Self {
        Self::unrecognized()
    }
}

/// Wire shape returned by the NLU collaborator
#[derive(Debug, Deserialize)]
pub(crate) struct RawIntent {
    pub intent: String,
    #[serde(default)]
    pub slots: Option<Slots>,
}

impl From<RawIntent> for IntentResult {
    fn from(raw: RawIntent) -> Self {
        Self {
            intent: Intent::from_tag(&raw.intent),
            slots: raw.slots.unwrap_or_default(),
        }
    }
}
