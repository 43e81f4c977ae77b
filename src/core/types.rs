//! Core type definitions shared by the screens, the backend and the pipeline

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for users
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for posts
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostId(pub String);

impl PostId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for PostId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for PostId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Relationship between the signed-in user and another user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendshipStatus {
    #[default]
    NotFriends,
    RequestSent,
    PendingApproval,
    Friends,
}

/// Who may send this user a friend request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendRequestPrivacy {
    #[default]
    Everyone,
    FriendsOfFriends,
}

/// A user as the controller sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub friend_request_privacy: FriendRequestPrivacy,
    /// Only populated on suggestion lists
    #[serde(default)]
    pub friendship_status: Option<FriendshipStatus>,
}

impl User {
    pub fn new(name: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            name: name.into(),
            username: username.into(),
            friend_request_privacy: FriendRequestPrivacy::Everyone,
            friendship_status: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = UserId(id.into());
        self
    }

    pub fn author(&self) -> Author {
        Author {
            id: self.id.clone(),
            name: self.name.clone(),
            username: self.username.clone(),
        }
    }
}

/// Minimal author reference embedded in posts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: UserId,
    pub name: String,
    pub username: String,
}

/// One option of a poll attached to a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    pub text: String,
    pub votes: u32,
    pub voted_by: Vec<UserId>,
}

impl PollOption {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            votes: 0,
            voted_by: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub question: String,
    pub options: Vec<PollOption>,
}

impl Poll {
    /// Index of the option this user voted for, if any
    pub fn voted_option(&self, user: &UserId) -> Option<usize> {
        self.options.iter().position(|o| o.voted_by.contains(user))
    }

    pub fn total_votes(&self) -> u32 {
        self.options.iter().map(|o| o.votes).sum()
    }
}

/// A feed post, reduced to the fields the controller reads or writes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author: Author,
    pub caption: String,
    /// user id -> emoji
    #[serde(default)]
    pub reactions: AHashMap<UserId, String>,
    #[serde(default)]
    pub poll: Option<Poll>,
}

impl Post {
    pub fn new(author: Author, caption: impl Into<String>) -> Self {
        Self {
            id: PostId::new(),
            author,
            caption: caption.into(),
            reactions: AHashMap::new(),
            poll: None,
        }
    }

    pub fn reaction_of(&self, user: &UserId) -> Option<&str> {
        self.reactions.get(user).map(String::as_str)
    }

    pub fn reaction_count(&self) -> usize {
        self.reactions.len()
    }
}

/// Top-level views the navigator can switch to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppView {
    Feed,
    Explore,
    Profile,
    Friends,
    Conversations,
    AdsCenter,
    RoomsHub,
    RoomsList,
    VideoRoomsList,
    Settings,
}

/// Discrete scroll command driving the scroll animator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollState {
    #[default]
    None,
    Up,
    Down,
}

impl ScrollState {
    /// Sign of the per-frame offset, `None` when idle
    pub fn direction(self) -> Option<f64> {
        match self {
            ScrollState::None => None,
            ScrollState::Up => Some(-1.0),
            ScrollState::Down => Some(1.0),
        }
    }
}
