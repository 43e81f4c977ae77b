//! Feed screen - reactions, likes and poll votes on the visible posts
//!
//! Candidates are the active post's poll options followed by the authors of
//! the loaded posts, so "vote pizza" binds an option and "react to Bob"
//! binds Bob's first post. A name that binds an entity of the wrong kind
//! for the route ("vote Bob") gets the generic failure caption.

use crate::backend::memory::cast_vote;
use crate::backend::SocialBackend;
use crate::command::context::EntityContext;
use crate::command::dispatcher::{ActionReport, IntentTable, Screen};
use crate::command::feedback::Prompt;
use crate::command::optimistic::{self, MutationOutcome, SharedState};
use crate::core::error::Result;
use crate::core::types::{AppView, Post, PostId, UserId};
use crate::llm::intent::{Intent, IntentResult, SlotValue, EMOJI, OPTION_INDEX, OPTION_TEXT};
use crate::screens::{with_navigation, with_scrolling, CommonAction, ScreenHost};
use async_trait::async_trait;
use std::sync::Arc;

/// Reaction used by "like" and by reactions without an emoji slot
pub const DEFAULT_REACTION: &str = "👍";

#[derive(Debug, Clone, Default)]
pub struct FeedState {
    pub posts: Vec<Post>,
    /// Index of the post currently in view
    pub active: usize,
}

impl FeedState {
    pub fn active_post(&self) -> Option<&Post> {
        self.posts.get(self.active)
    }

    fn post_mut(&mut self, id: &PostId) -> Option<&mut Post> {
        self.posts.iter_mut().find(|p| &p.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEntity {
    Author {
        post: PostId,
        username: String,
    },
    PollOption {
        post: PostId,
        index: usize,
        text: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedAction {
    React,
    ReactToActive,
    Like,
    Vote,
    /// Vote on the active post's poll by option position
    VoteAt,
    OpenAuthor,
    Common(CommonAction),
}

pub struct FeedScreen {
    current_user: UserId,
    state: SharedState<FeedState>,
    backend: Arc<dyn SocialBackend>,
    host: ScreenHost,
    table: IntentTable<FeedAction>,
}

impl FeedScreen {
    pub fn new(current_user: UserId, backend: Arc<dyn SocialBackend>, host: ScreenHost) -> Self {
        let table = IntentTable::new()
            .targeted_optimistic(Intent::ReactToPost, FeedAction::React)
            .targeted_on(Intent::VotePoll, OPTION_TEXT, FeedAction::Vote, true)
            .targeted(Intent::OpenProfile, FeedAction::OpenAuthor)
            .global_optimistic(Intent::ReactToPost, FeedAction::ReactToActive)
            .global_optimistic(Intent::VotePoll, FeedAction::VoteAt)
            .global_optimistic(Intent::LikePost, FeedAction::Like);
        let table = with_navigation(table, AppView::Feed, FeedAction::Common);
        let table = with_scrolling(table, FeedAction::Common);

        Self {
            current_user,
            state: optimistic::shared(FeedState::default()),
            backend,
            host,
            table,
        }
    }

    pub fn state(&self) -> SharedState<FeedState> {
        self.state.clone()
    }

    pub async fn load(&self) -> Result<()> {
        let posts = self.backend.feed_posts(&self.current_user).await?;
        let mut state = self.state.write().await;
        state.posts = posts;
        state.active = 0;
        tracing::info!(posts = state.posts.len(), "feed loaded");
        Ok(())
    }

    /// Move the active post, clamped to the loaded posts
    pub async fn set_active(&self, index: usize) {
        let mut state = self.state.write().await;
        state.active = index.min(state.posts.len().saturating_sub(1));
    }

    /// Toggle a reaction: the same emoji again removes it
    pub async fn react(&self, post: &PostId, emoji: &str) -> ActionReport {
        let user = self.current_user.clone();
        let mut removed = false;
        let outcome = optimistic::execute(
            &self.state,
            |state| {
                let post = state.post_mut(post)?;
                let previous = post.reactions.get(&user).cloned();
                if previous.as_deref() == Some(emoji) {
                    post.reactions.remove(&user);
                    removed = true;
                } else {
                    post.reactions.insert(user.clone(), emoji.to_string());
                }
                Some(previous)
            },
            |state, previous| {
                if let Some(post) = state.post_mut(post) {
                    match previous {
                        Some(emoji) => post.reactions.insert(user.clone(), emoji),
                        None => post.reactions.remove(&user),
                    };
                }
            },
            || self.backend.react_to_post(post, &self.current_user, emoji),
        )
        .await;

        match outcome {
            MutationOutcome::Applied if removed => ActionReport::succeeded(Prompt::ReactionRemoved),
            MutationOutcome::Applied => ActionReport::succeeded(Prompt::ReactionAdded {
                emoji: emoji.to_string(),
            }),
            MutationOutcome::RolledBack(failure) => {
                ActionReport::failed(failure.to_string(), Prompt::ActionFailed)
            }
            MutationOutcome::Skipped => ActionReport::not_applicable_with(Prompt::ErrorGeneric),
        }
    }

    /// React with the current reaction (or a thumbs up) on the active post
    pub async fn like_active(&self) -> ActionReport {
        let (post, emoji) = {
            let state = self.state.read().await;
            let Some(post) = state.active_post() else {
                return ActionReport::not_applicable_with(Prompt::ErrorGeneric);
            };
            let emoji = post
                .reaction_of(&self.current_user)
                .unwrap_or(DEFAULT_REACTION)
                .to_string();
            (post.id.clone(), emoji)
        };
        self.react(&post, &emoji).await
    }

    async fn react_to_active(&self, emoji: &str) -> ActionReport {
        let post = {
            let state = self.state.read().await;
            match state.active_post() {
                Some(post) => post.id.clone(),
                None => return ActionReport::not_applicable_with(Prompt::ErrorGeneric),
            }
        };
        self.react(&post, emoji).await
    }

    /// Vote once; the local count and voter list change before the store confirms
    pub async fn vote(&self, post: &PostId, index: usize) -> ActionReport {
        let (already_voted, option) = {
            let state = self.state.read().await;
            let poll = state
                .posts
                .iter()
                .find(|p| &p.id == post)
                .and_then(|p| p.poll.as_ref());
            match poll {
                Some(poll) => (
                    poll.voted_option(&self.current_user).is_some(),
                    poll.options.get(index).map(|o| o.text.clone()),
                ),
                None => return ActionReport::not_applicable_with(Prompt::ErrorGeneric),
            }
        };
        if already_voted {
            return ActionReport::not_applicable_with(Prompt::AlreadyVoted);
        }
        let Some(option) = option else {
            return ActionReport::not_applicable_with(Prompt::ErrorGeneric);
        };

        let user = self.current_user.clone();
        let outcome = optimistic::execute(
            &self.state,
            |state| {
                let poll = state.post_mut(post)?.poll.as_mut()?;
                let before = poll.clone();
                cast_vote(poll, &user, index).ok()?;
                Some(before)
            },
            |state, before| {
                if let Some(post) = state.post_mut(post) {
                    post.poll = Some(before);
                }
            },
            || self.backend.vote_on_poll(&self.current_user, post, index),
        )
        .await;

        match outcome {
            MutationOutcome::Applied => ActionReport::succeeded(Prompt::VoteRecorded { option }),
            MutationOutcome::RolledBack(failure) => {
                ActionReport::failed(failure.to_string(), Prompt::ActionFailed)
            }
            MutationOutcome::Skipped => ActionReport::not_applicable_with(Prompt::AlreadyVoted),
        }
    }

    /// Vote on the active post by 1-based option position
    async fn vote_at(&self, intent: &IntentResult) -> ActionReport {
        let index = intent
            .slot(OPTION_INDEX)
            .and_then(SlotValue::as_index)
            .and_then(|position| position.checked_sub(1));
        let post = self.state.read().await.active_post().map(|p| p.id.clone());
        match (post, index) {
            (Some(post), Some(index)) => self.vote(&post, index).await,
            _ => ActionReport::not_applicable_with(Prompt::ErrorGeneric),
        }
    }

    fn emoji_slot(intent: &IntentResult) -> String {
        intent
            .slot(EMOJI)
            .map(|v| v.as_text())
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REACTION.to_string())
    }
}

#[async_trait]
impl Screen for FeedScreen {
    type Entity = FeedEntity;
    type Action = FeedAction;

    fn name(&self) -> &'static str {
        "feed"
    }

    fn intent_table(&self) -> &IntentTable<FeedAction> {
        &self.table
    }

    async fn entity_context(&self) -> EntityContext<FeedEntity> {
        let state = self.state.read().await;
        let mut ctx = EntityContext::new();

        if let Some(post) = state.active_post() {
            if let Some(poll) = &post.poll {
                for (index, option) in poll.options.iter().enumerate() {
                    ctx.push(
                        option.text.clone(),
                        FeedEntity::PollOption {
                            post: post.id.clone(),
                            index,
                            text: option.text.clone(),
                        },
                    );
                }
            }
        }
        for post in &state.posts {
            ctx.push(
                post.author.name.clone(),
                FeedEntity::Author {
                    post: post.id.clone(),
                    username: post.author.username.clone(),
                },
            );
        }
        ctx
    }

    async fn perform(
        &self,
        action: FeedAction,
        target: Option<FeedEntity>,
        intent: &IntentResult,
    ) -> Result<ActionReport> {
        let report = match (action, target) {
            (FeedAction::React, Some(FeedEntity::Author { post, .. })) => {
                self.react(&post, &Self::emoji_slot(intent)).await
            }
            (FeedAction::ReactToActive, _) => self.react_to_active(&Self::emoji_slot(intent)).await,
            (FeedAction::Like, _) => self.like_active().await,
            (FeedAction::Vote, Some(FeedEntity::PollOption { post, index, .. })) => {
                self.vote(&post, index).await
            }
            (FeedAction::OpenAuthor, Some(FeedEntity::Author { username, .. })) => {
                self.host.navigator.open_profile(&username);
                ActionReport::silent()
            }
            (FeedAction::VoteAt, _) => self.vote_at(intent).await,
            (FeedAction::Common(common), _) => self.host.perform_common(common),
            (action, target) => {
                tracing::debug!(?action, ?target, "bound entity does not fit the action");
                ActionReport::not_applicable_with(Prompt::ErrorGeneric)
            }
        };
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemoryBackend, MutationResult};
    use crate::command::dispatcher::ActionResult;
    use crate::core::types::{FriendshipStatus, Poll, PollOption, User};
    use crate::ui::navigator::{NavigationEvent, NavigationLog};
    use crate::ui::scroll::{ScrollAnimator, ScrollPosition};
    use std::time::Duration;

    /// Delegates reads to a memory store and refuses every mutation
    struct Offline(MemoryBackend);

    #[async_trait]
    impl SocialBackend for Offline {
        async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
            self.0.user_by_username(username).await
        }
        async fn friend_requests(&self, user: &UserId) -> Result<Vec<User>> {
            self.0.friend_requests(user).await
        }
        async fn friends(&self, user: &UserId) -> Result<Vec<User>> {
            self.0.friends(user).await
        }
        async fn recommended_friends(&self, user: &UserId) -> Result<Vec<User>> {
            self.0.recommended_friends(user).await
        }
        async fn friendship_status(&self, a: &UserId, b: &UserId) -> Result<FriendshipStatus> {
            self.0.friendship_status(a, b).await
        }
        async fn feed_posts(&self, user: &UserId) -> Result<Vec<Post>> {
            self.0.feed_posts(user).await
        }
        async fn accept_friend_request(&self, _: &UserId, _: &UserId) -> MutationResult {
            offline()
        }
        async fn decline_friend_request(&self, _: &UserId, _: &UserId) -> MutationResult {
            offline()
        }
        async fn add_friend(&self, _: &UserId, _: &UserId) -> MutationResult {
            offline()
        }
        async fn unfriend(&self, _: &UserId, _: &UserId) -> MutationResult {
            offline()
        }
        async fn react_to_post(&self, _: &PostId, _: &UserId, _: &str) -> MutationResult {
            offline()
        }
        async fn vote_on_poll(&self, _: &UserId, _: &PostId, _: usize) -> MutationResult {
            offline()
        }
    }

    fn offline() -> MutationResult {
        Err(crate::backend::MutationFailure::Unavailable("offline".into()))
    }

    async fn seeded_store() -> (MemoryBackend, UserId, PostId) {
        let backend = MemoryBackend::new();
        let me = backend.add_user(User::new("Me", "me")).await;
        let bob = User::new("Bob", "bob");
        backend.add_user(bob.clone()).await;

        let mut post = Post::new(bob.author(), "Lunch?");
        post.poll = Some(Poll {
            question: "Where?".into(),
            options: vec![PollOption::new("Pizza"), PollOption::new("Sushi")],
        });
        let post = backend.add_post(post).await;
        (backend, me, post)
    }

    async fn screen_over(
        backend: Arc<dyn SocialBackend>,
        me: UserId,
    ) -> (FeedScreen, Arc<NavigationLog>, ScrollAnimator) {
        let animator =
            ScrollAnimator::spawn(Arc::new(ScrollPosition::new()), 2.0, Duration::from_millis(16));
        let navigator = Arc::new(NavigationLog::new());
        let host = ScreenHost::new(navigator.clone(), animator.handle());
        let screen = FeedScreen::new(me, backend, host);
        screen.load().await.unwrap();
        (screen, navigator, animator)
    }

    #[tokio::test]
    async fn test_context_lists_options_before_authors() {
        let (store, me, _post) = seeded_store().await;
        let (screen, _nav, _animator) = screen_over(Arc::new(store), me).await;

        let ctx = screen.entity_context().await;
        assert_eq!(
            ctx.candidate_names(),
            vec!["Pizza".to_string(), "Sushi".to_string(), "Bob".to_string()]
        );
    }

    #[tokio::test]
    async fn test_like_toggles() {
        let (store, me, post) = seeded_store().await;
        let store = Arc::new(store);
        let (screen, _nav, _animator) = screen_over(store.clone(), me.clone()).await;

        let report = screen.like_active().await;
        assert_eq!(report.feedback.as_deref(), Some("Reacted 👍."));
        assert_eq!(
            store.post(&post).await.unwrap().reaction_of(&me),
            Some(DEFAULT_REACTION)
        );

        let report = screen.like_active().await;
        assert_eq!(report.feedback.as_deref(), Some("Reaction removed."));
        assert_eq!(store.post(&post).await.unwrap().reaction_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_reaction_restores_previous_emoji() {
        let (store, me, post) = seeded_store().await;
        store.react_to_post(&post, &me, "🎉").await.unwrap();
        let (screen, _nav, _animator) = screen_over(Arc::new(Offline(store)), me.clone()).await;

        let report = screen.react(&post, "😂").await;
        assert!(matches!(report.result, ActionResult::Failed(_)));

        let state = screen.state();
        let state = state.read().await;
        assert_eq!(state.posts[0].reaction_of(&me), Some("🎉"));
    }

    #[tokio::test]
    async fn test_vote_once() {
        let (store, me, post) = seeded_store().await;
        let (screen, _nav, _animator) = screen_over(Arc::new(store), me.clone()).await;

        let report = screen.vote(&post, 1).await;
        assert_eq!(
            report.feedback.as_deref(),
            Some("Your vote for Sushi was recorded.")
        );
        let report = screen.vote(&post, 0).await;
        assert_eq!(
            report,
            ActionReport::not_applicable_with(Prompt::AlreadyVoted)
        );

        let state = screen.state();
        let state = state.read().await;
        let poll = state.posts[0].poll.as_ref().unwrap();
        assert_eq!(poll.voted_option(&me), Some(1));
        assert_eq!(poll.total_votes(), 1);
    }

    #[tokio::test]
    async fn test_failed_vote_rolls_back_counts() {
        let (store, me, post) = seeded_store().await;
        let (screen, _nav, _animator) = screen_over(Arc::new(Offline(store)), me.clone()).await;

        let report = screen.vote(&post, 0).await;
        assert!(matches!(report.result, ActionResult::Failed(_)));

        let state = screen.state();
        let state = state.read().await;
        let poll = state.posts[0].poll.as_ref().unwrap();
        assert_eq!(poll.total_votes(), 0);
        assert_eq!(poll.voted_option(&me), None);
    }

    #[tokio::test]
    async fn test_active_post_is_clamped_and_drives_context() {
        let (store, me, _post) = seeded_store().await;
        let carol = User::new("Carol", "carol");
        store.add_post(Post::new(carol.author(), "No poll here")).await;
        let (screen, _nav, _animator) = screen_over(Arc::new(store), me).await;

        screen.set_active(7).await;
        let state = screen.state();
        assert_eq!(state.read().await.active, 1);
        let ctx = screen.entity_context().await;
        assert_eq!(
            ctx.candidate_names(),
            vec!["Bob".to_string(), "Carol".to_string()]
        );

        screen.set_active(0).await;
        assert_eq!(screen.entity_context().await.len(), 4);
    }

    #[tokio::test]
    async fn test_vote_by_position_on_active_post() {
        let (store, me, post) = seeded_store().await;
        let store = Arc::new(store);
        let (screen, _nav, _animator) = screen_over(store.clone(), me.clone()).await;

        let second = IntentResult::new(Intent::VotePoll).with_slot(OPTION_INDEX, SlotValue::Number(2.0));
        let report = screen
            .perform(FeedAction::VoteAt, None, &second)
            .await
            .unwrap();
        assert_eq!(
            report.feedback.as_deref(),
            Some("Your vote for Sushi was recorded.")
        );
        let stored = store.post(&post).await.unwrap();
        assert_eq!(stored.poll.unwrap().voted_option(&me), Some(1));
    }

    #[tokio::test]
    async fn test_vote_position_out_of_range() {
        let (store, me, _post) = seeded_store().await;
        let (screen, _nav, _animator) = screen_over(Arc::new(store), me).await;

        for position in [0.0, 3.0] {
            let intent = IntentResult::new(Intent::VotePoll)
                .with_slot(OPTION_INDEX, SlotValue::Number(position));
            let report = screen
                .perform(FeedAction::VoteAt, None, &intent)
                .await
                .unwrap();
            assert_eq!(report, ActionReport::not_applicable_with(Prompt::ErrorGeneric));
        }
    }

    #[tokio::test]
    async fn test_wrong_entity_kind_reports_generic_error() {
        let (store, me, post) = seeded_store().await;
        let (screen, nav, _animator) = screen_over(Arc::new(store), me).await;

        let bob = FeedEntity::Author {
            post: post.clone(),
            username: "bob".into(),
        };
        let report = screen
            .perform(FeedAction::Vote, Some(bob), &IntentResult::new(Intent::VotePoll))
            .await
            .unwrap();
        assert_eq!(report, ActionReport::not_applicable_with(Prompt::ErrorGeneric));

        let pizza = FeedEntity::PollOption {
            post,
            index: 0,
            text: "Pizza".into(),
        };
        let report = screen
            .perform(FeedAction::OpenAuthor, Some(pizza), &IntentResult::new(Intent::OpenProfile))
            .await
            .unwrap();
        assert_eq!(report, ActionReport::not_applicable_with(Prompt::ErrorGeneric));
        assert!(nav.events().is_empty());
    }

    #[tokio::test]
    async fn test_open_author_profile() {
        let (store, me, post) = seeded_store().await;
        let (screen, nav, _animator) = screen_over(Arc::new(store), me).await;

        let target = FeedEntity::Author {
            post,
            username: "bob".into(),
        };
        let report = screen
            .perform(
                FeedAction::OpenAuthor,
                Some(target),
                &IntentResult::new(Intent::OpenProfile),
            )
            .await
            .unwrap();
        assert_eq!(report, ActionReport::silent());
        assert_eq!(nav.last(), Some(NavigationEvent::OpenProfile("bob".into())));
    }
}
