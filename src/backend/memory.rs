//! In-memory social store
//!
//! Mirrors the remote store's rules closely enough to drive the terminal
//! harness and the integration tests: pending requests, symmetric
//! friendships, friend-request privacy and toggle reactions. The store can
//! be marked unreachable to exercise transport failures.

use crate::backend::{MutationFailure, MutationResult, PolicyBlock, SocialBackend};
use crate::core::error::{Result, VoxError};
use crate::core::types::{
    FriendRequestPrivacy, FriendshipStatus, Poll, Post, PostId, User, UserId,
};
use ahash::{AHashMap, AHashSet};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Store {
    users: AHashMap<UserId, User>,
    /// Insertion order, for stable listings
    user_order: Vec<UserId>,
    friends: AHashMap<UserId, AHashSet<UserId>>,
    /// recipient -> senders, oldest first
    requests: AHashMap<UserId, Vec<UserId>>,
    posts: Vec<Post>,
}

impl Store {
    fn are_friends(&self, a: &UserId, b: &UserId) -> bool {
        self.friends.get(a).is_some_and(|set| set.contains(b))
    }

    fn has_request(&self, from: &UserId, to: &UserId) -> bool {
        self.requests.get(to).is_some_and(|list| list.contains(from))
    }

    fn has_mutual_friend(&self, a: &UserId, b: &UserId) -> bool {
        match (self.friends.get(a), self.friends.get(b)) {
            (Some(fa), Some(fb)) => fa.iter().any(|f| fb.contains(f)),
            _ => false,
        }
    }

    fn remove_request(&mut self, from: &UserId, to: &UserId) -> bool {
        let Some(list) = self.requests.get_mut(to) else {
            return false;
        };
        let before = list.len();
        list.retain(|id| id != from);
        before != list.len()
    }

    fn link(&mut self, a: &UserId, b: &UserId) {
        self.friends.entry(a.clone()).or_default().insert(b.clone());
        self.friends.entry(b.clone()).or_default().insert(a.clone());
    }

    fn unlink(&mut self, a: &UserId, b: &UserId) -> bool {
        let removed_a = self.friends.get_mut(a).is_some_and(|s| s.remove(b));
        let removed_b = self.friends.get_mut(b).is_some_and(|s| s.remove(a));
        removed_a || removed_b
    }

    fn status(&self, current: &UserId, other: &UserId) -> FriendshipStatus {
        if self.are_friends(current, other) {
            FriendshipStatus::Friends
        } else if self.has_request(current, other) {
            FriendshipStatus::RequestSent
        } else if self.has_request(other, current) {
            FriendshipStatus::PendingApproval
        } else {
            FriendshipStatus::NotFriends
        }
    }

    fn users_in_order<'a>(&'a self, ids: impl Fn(&UserId) -> bool + 'a) -> impl Iterator<Item = &'a User> + 'a {
        self.user_order
            .iter()
            .filter(move |id| ids(id))
            .filter_map(|id| self.users.get(id))
    }

    fn post_mut(&mut self, id: &PostId) -> Option<&mut Post> {
        self.posts.iter_mut().find(|p| &p.id == id)
    }
}

/// Thread-safe in-memory implementation of `SocialBackend`
#[derive(Debug, Default)]
pub struct MemoryBackend {
    store: RwLock<Store>,
    unreachable: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, user: User) -> UserId {
        let mut store = self.store.write().await;
        let id = user.id.clone();
        if !store.users.contains_key(&id) {
            store.user_order.push(id.clone());
        }
        store.users.insert(id.clone(), user);
        id
    }

    pub async fn make_friends(&self, a: &UserId, b: &UserId) {
        self.store.write().await.link(a, b);
    }

    pub async fn send_request(&self, from: &UserId, to: &UserId) {
        let mut store = self.store.write().await;
        let list = store.requests.entry(to.clone()).or_default();
        if !list.contains(from) {
            list.push(from.clone());
        }
    }

    pub async fn add_post(&self, post: Post) -> PostId {
        let id = post.id.clone();
        self.store.write().await.posts.push(post);
        id
    }

    pub async fn post(&self, id: &PostId) -> Option<Post> {
        self.store
            .read()
            .await
            .posts
            .iter()
            .find(|p| &p.id == id)
            .cloned()
    }

    pub async fn are_friends(&self, a: &UserId, b: &UserId) -> bool {
        self.store.read().await.are_friends(a, b)
    }

    /// While unreachable, reads fail with `VoxError::Backend` and mutations
    /// with `MutationFailure::Unavailable`
    pub fn set_reachable(&self, reachable: bool) {
        self.unreachable.store(!reachable, Ordering::SeqCst);
    }

    fn connect(&self) -> Result<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(VoxError::Backend("store unreachable".into()));
        }
        Ok(())
    }

    fn connect_for_mutation(&self) -> MutationResult {
        self.connect()
            .map_err(|err| MutationFailure::Unavailable(err.to_string()))
    }
}

fn rejected(reason: &str) -> MutationResult {
    Err(MutationFailure::Rejected(reason.to_string()))
}

#[async_trait]
impl SocialBackend for MemoryBackend {
    async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.connect()?;
        let store = self.store.read().await;
        Ok(store
            .users
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn friend_requests(&self, user: &UserId) -> Result<Vec<User>> {
        self.connect()?;
        let store = self.store.read().await;
        let senders = store.requests.get(user).cloned().unwrap_or_default();
        Ok(senders
            .iter()
            .filter_map(|id| store.users.get(id).cloned())
            .collect())
    }

    async fn friends(&self, user: &UserId) -> Result<Vec<User>> {
        self.connect()?;
        let store = self.store.read().await;
        if !store.users.contains_key(user) {
            return Err(VoxError::UserNotFound(user.to_string()));
        }
        Ok(store
            .users_in_order(|id| store.are_friends(user, id))
            .cloned()
            .collect())
    }

    async fn recommended_friends(&self, user: &UserId) -> Result<Vec<User>> {
        self.connect()?;
        let store = self.store.read().await;
        if !store.users.contains_key(user) {
            return Err(VoxError::UserNotFound(user.to_string()));
        }
        Ok(store
            .users_in_order(|id| {
                id != user
                    && !store.are_friends(user, id)
                    && !store.has_request(id, user)
            })
            .map(|u| {
                let mut suggestion = u.clone();
                suggestion.friendship_status = Some(store.status(user, &u.id));
                suggestion
            })
            .collect())
    }

    async fn friendship_status(&self, current: &UserId, other: &UserId) -> Result<FriendshipStatus> {
        self.connect()?;
        Ok(self.store.read().await.status(current, other))
    }

    async fn feed_posts(&self, _user: &UserId) -> Result<Vec<Post>> {
        self.connect()?;
        Ok(self.store.read().await.posts.clone())
    }

    async fn accept_friend_request(&self, current: &UserId, requester: &UserId) -> MutationResult {
        self.connect_for_mutation()?;
        let mut store = self.store.write().await;
        if !store.remove_request(requester, current) {
            return rejected("no pending request");
        }
        store.link(current, requester);
        Ok(())
    }

    async fn decline_friend_request(&self, current: &UserId, requester: &UserId) -> MutationResult {
        self.connect_for_mutation()?;
        let mut store = self.store.write().await;
        if !store.remove_request(requester, current) {
            return rejected("no pending request");
        }
        Ok(())
    }

    async fn add_friend(&self, current: &UserId, target: &UserId) -> MutationResult {
        self.connect_for_mutation()?;
        let mut store = self.store.write().await;
        let Some(target_user) = store.users.get(target) else {
            return rejected("user not found");
        };
        if current == target {
            return rejected("cannot befriend yourself");
        }
        if store.are_friends(current, target) {
            return rejected("already friends");
        }
        if target_user.friend_request_privacy == FriendRequestPrivacy::FriendsOfFriends
            && !store.has_mutual_friend(current, target)
        {
            return Err(MutationFailure::Policy(PolicyBlock::FriendsOfFriends));
        }
        let list = store.requests.entry(target.clone()).or_default();
        if !list.contains(current) {
            list.push(current.clone());
        }
        Ok(())
    }

    async fn unfriend(&self, current: &UserId, target: &UserId) -> MutationResult {
        self.connect_for_mutation()?;
        let mut store = self.store.write().await;
        if !store.unlink(current, target) {
            return rejected("not friends");
        }
        Ok(())
    }

    async fn react_to_post(&self, post: &PostId, user: &UserId, emoji: &str) -> MutationResult {
        self.connect_for_mutation()?;
        let mut store = self.store.write().await;
        let Some(post) = store.post_mut(post) else {
            return rejected("post not found");
        };
        if post.reactions.get(user).is_some_and(|e| e == emoji) {
            post.reactions.remove(user);
        } else {
            post.reactions.insert(user.clone(), emoji.to_string());
        }
        Ok(())
    }

    async fn vote_on_poll(&self, user: &UserId, post: &PostId, option_index: usize) -> MutationResult {
        self.connect_for_mutation()?;
        let mut store = self.store.write().await;
        let Some(poll) = store.post_mut(post).and_then(|p| p.poll.as_mut()) else {
            return rejected("poll not found");
        };
        cast_vote(poll, user, option_index)
    }
}

/// Record a vote; shared by the store and the feed screen's optimistic path
pub fn cast_vote(poll: &mut Poll, user: &UserId, option_index: usize) -> MutationResult {
    if poll.voted_option(user).is_some() {
        return rejected("already voted");
    }
    let Some(option) = poll.options.get_mut(option_index) else {
        return rejected("no such option");
    };
    option.votes += 1;
    option.voted_by.push(user.clone());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PollOption;

    async fn seeded() -> (MemoryBackend, UserId, UserId, UserId) {
        let backend = MemoryBackend::new();
        let me = backend.add_user(User::new("Me", "me").with_id("me")).await;
        let alice = backend.add_user(User::new("Alice", "alice").with_id("alice")).await;
        let mut bob = User::new("Bob", "bob").with_id("bob");
        bob.friend_request_privacy = FriendRequestPrivacy::FriendsOfFriends;
        let bob = backend.add_user(bob).await;
        (backend, me, alice, bob)
    }

    #[tokio::test]
    async fn test_accept_creates_friendship() {
        let (backend, me, alice, _) = seeded().await;
        backend.send_request(&alice, &me).await;

        assert_eq!(
            backend.friendship_status(&me, &alice).await.unwrap(),
            FriendshipStatus::PendingApproval
        );
        backend.accept_friend_request(&me, &alice).await.unwrap();
        assert!(backend.are_friends(&me, &alice).await);
        assert!(backend.friend_requests(&me).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_accept_without_request_is_rejected() {
        let (backend, me, alice, _) = seeded().await;
        assert!(matches!(
            backend.accept_friend_request(&me, &alice).await,
            Err(MutationFailure::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn test_friends_of_friends_policy() {
        let (backend, me, alice, bob) = seeded().await;
        assert_eq!(
            backend.add_friend(&me, &bob).await,
            Err(MutationFailure::Policy(PolicyBlock::FriendsOfFriends))
        );

        backend.make_friends(&me, &alice).await;
        backend.make_friends(&alice, &bob).await;
        assert_eq!(backend.add_friend(&me, &bob).await, Ok(()));
        assert_eq!(
            backend.friendship_status(&me, &bob).await.unwrap(),
            FriendshipStatus::RequestSent
        );
    }

    #[tokio::test]
    async fn test_recommendations_exclude_friends_and_incoming() {
        let (backend, me, alice, bob) = seeded().await;
        backend.make_friends(&me, &alice).await;
        backend.send_request(&bob, &me).await;

        let recs = backend.recommended_friends(&me).await.unwrap();
        assert!(recs.is_empty());
    }

    #[tokio::test]
    async fn test_reaction_toggles() {
        let (backend, me, alice, _) = seeded().await;
        let post = Post::new(User::new("Alice", "alice").with_id("alice").author(), "hi");
        let post_id = backend.add_post(post).await;

        backend.react_to_post(&post_id, &me, "👍").await.unwrap();
        backend.react_to_post(&post_id, &alice, "❤️").await.unwrap();
        assert_eq!(backend.post(&post_id).await.unwrap().reaction_count(), 2);

        backend.react_to_post(&post_id, &me, "👍").await.unwrap();
        let post = backend.post(&post_id).await.unwrap();
        assert_eq!(post.reaction_of(&me), None);
        assert_eq!(post.reaction_of(&alice), Some("❤️"));
    }

    #[tokio::test]
    async fn test_vote_once() {
        let (backend, me, alice, _) = seeded().await;
        let mut post = Post::new(User::new("Alice", "alice").with_id("alice").author(), "lunch?");
        post.poll = Some(Poll {
            question: "Lunch?".into(),
            options: vec![PollOption::new("Pizza"), PollOption::new("Rice")],
        });
        let post_id = backend.add_post(post).await;

        backend.vote_on_poll(&me, &post_id, 0).await.unwrap();
        assert!(backend.vote_on_poll(&me, &post_id, 1).await.is_err());
        assert!(backend.vote_on_poll(&alice, &post_id, 7).await.is_err());

        let poll = backend.post(&post_id).await.unwrap().poll.unwrap();
        assert_eq!(poll.options[0].votes, 1);
        assert_eq!(poll.total_votes(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_store_fails_reads_and_mutations() {
        let (backend, me, alice, _) = seeded().await;
        backend.send_request(&alice, &me).await;
        backend.set_reachable(false);

        assert!(matches!(
            backend.friend_requests(&me).await,
            Err(VoxError::Backend(_))
        ));
        assert!(matches!(
            backend.accept_friend_request(&me, &alice).await,
            Err(MutationFailure::Unavailable(_))
        ));
        assert!(!backend.are_friends(&me, &alice).await);

        backend.set_reachable(true);
        backend.accept_friend_request(&me, &alice).await.unwrap();
        assert!(backend.are_friends(&me, &alice).await);
    }
}
