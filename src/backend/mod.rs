//! Remote store collaborator
//!
//! Reads return `Result`; mutations return a `MutationResult` whose failure
//! side says why the store refused, so the optimistic executor can pick
//! the caption.

pub mod memory;

use crate::core::error::Result;
use crate::core::types::{FriendshipStatus, Post, PostId, User, UserId};
use async_trait::async_trait;
use std::fmt;

pub use memory::MemoryBackend;

/// Named policy that blocked a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyBlock {
    /// Target only accepts requests from friends of friends
    FriendsOfFriends,
}

impl PolicyBlock {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyBlock::FriendsOfFriends => "friends_of_friends",
        }
    }
}

/// Why a mutation did not go through
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationFailure {
    Policy(PolicyBlock),
    /// The store refused without a named policy
    Rejected(String),
    /// The store could not be reached
    Unavailable(String),
}

impl fmt::Display for MutationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationFailure::Policy(block) => write!(f, "blocked by policy: {}", block.as_str()),
            MutationFailure::Rejected(reason) => write!(f, "rejected: {}", reason),
            MutationFailure::Unavailable(reason) => write!(f, "unavailable: {}", reason),
        }
    }
}

pub type MutationResult = std::result::Result<(), MutationFailure>;

#[async_trait]
pub trait SocialBackend: Send + Sync {
    async fn user_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn friend_requests(&self, user: &UserId) -> Result<Vec<User>>;

    async fn friends(&self, user: &UserId) -> Result<Vec<User>>;

    /// Suggestions, each carrying its `friendship_status`
    async fn recommended_friends(&self, user: &UserId) -> Result<Vec<User>>;

    async fn friendship_status(&self, current: &UserId, other: &UserId) -> Result<FriendshipStatus>;

    async fn feed_posts(&self, user: &UserId) -> Result<Vec<Post>>;

    async fn accept_friend_request(&self, current: &UserId, requester: &UserId) -> MutationResult;

    async fn decline_friend_request(&self, current: &UserId, requester: &UserId) -> MutationResult;

    async fn add_friend(&self, current: &UserId, target: &UserId) -> MutationResult;

    async fn unfriend(&self, current: &UserId, target: &UserId) -> MutationResult;

    /// Toggle semantics: reacting with the current emoji removes the reaction
    async fn react_to_post(&self, post: &PostId, user: &UserId, emoji: &str) -> MutationResult;

    async fn vote_on_poll(&self, user: &UserId, post: &PostId, option_index: usize) -> MutationResult;
}
