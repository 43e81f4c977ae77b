//! Friends screen - requests, suggestions and the friends list
//!
//! Requests and friends arrive from the store's real-time listener through
//! `apply_snapshot`; suggestions are fetched on `load` and `reload` and carry their own
//! friendship status, which add-friend changes optimistically.

use crate::backend::{MutationFailure, SocialBackend};
use crate::command::context::EntityContext;
use crate::command::dispatcher::{ActionReport, IntentTable, Screen};
use crate::command::feedback::Prompt;
use crate::command::optimistic::{self, MutationOutcome, SharedState};
use crate::core::error::Result;
use crate::core::types::{AppView, FriendshipStatus, User, UserId};
use crate::llm::intent::{Intent, IntentResult};
use crate::screens::{with_navigation, with_scrolling, CommonAction, ScreenHost};
use crate::ui::confirm::Confirmer;
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FriendsTab {
    #[default]
    Requests,
    Suggestions,
    AllFriends,
}

#[derive(Debug, Clone, Default)]
pub struct FriendsState {
    pub active_tab: FriendsTab,
    pub requests: Vec<User>,
    pub friends: Vec<User>,
    pub suggestions: Vec<User>,
    pub loading: bool,
}

impl FriendsState {
    /// Pending requests, minus stale entries for users who are already friends
    pub fn visible_requests(&self) -> impl Iterator<Item = &User> + '_ {
        self.requests
            .iter()
            .filter(|r| !r.id.is_empty() && !self.friends.iter().any(|f| f.id == r.id))
    }

    /// Users shown on the active tab
    pub fn visible(&self) -> Vec<&User> {
        match self.active_tab {
            FriendsTab::Requests => self.visible_requests().collect(),
            FriendsTab::Suggestions => self.suggestions.iter().collect(),
            FriendsTab::AllFriends => self.friends.iter().collect(),
        }
    }

    /// Tab to open on when none was requested
    pub fn default_tab(&self) -> FriendsTab {
        if self.visible_requests().next().is_some() {
            FriendsTab::Requests
        } else if !self.suggestions.is_empty() {
            FriendsTab::Suggestions
        } else {
            FriendsTab::AllFriends
        }
    }

    fn suggestion_mut(&mut self, id: &UserId) -> Option<&mut User> {
        self.suggestions.iter_mut().find(|u| &u.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendsAction {
    Accept,
    Decline,
    AddFriend,
    OpenProfile,
    Unfriend,
    Reload,
    Common(CommonAction),
}

pub struct FriendsScreen {
    current_user: UserId,
    state: SharedState<FriendsState>,
    backend: Arc<dyn SocialBackend>,
    host: ScreenHost,
    confirmer: Arc<dyn Confirmer>,
    initial_tab: Option<FriendsTab>,
    table: IntentTable<FriendsAction>,
}

impl FriendsScreen {
    pub fn new(
        current_user: UserId,
        backend: Arc<dyn SocialBackend>,
        host: ScreenHost,
        confirmer: Arc<dyn Confirmer>,
    ) -> Self {
        let table = IntentTable::new()
            .targeted(Intent::AcceptRequest, FriendsAction::Accept)
            .targeted(Intent::DeclineRequest, FriendsAction::Decline)
            .targeted_optimistic(Intent::AddFriend, FriendsAction::AddFriend)
            .targeted(Intent::OpenProfile, FriendsAction::OpenProfile)
            .targeted(Intent::Unfriend, FriendsAction::Unfriend)
            .global(Intent::ReloadPage, FriendsAction::Reload);
        let table = with_navigation(table, AppView::Friends, FriendsAction::Common);
        let table = with_scrolling(table, FriendsAction::Common);

        Self {
            current_user,
            state: optimistic::shared(FriendsState::default()),
            backend,
            host,
            confirmer,
            initial_tab: None,
            table,
        }
    }

    /// Open on this tab instead of picking one from the loaded lists
    pub fn with_initial_tab(mut self, tab: FriendsTab) -> Self {
        self.initial_tab = Some(tab);
        self
    }

    pub fn state(&self) -> SharedState<FriendsState> {
        self.state.clone()
    }

    pub async fn active_tab(&self) -> FriendsTab {
        self.state.read().await.active_tab
    }

    pub async fn set_tab(&self, tab: FriendsTab) {
        self.state.write().await.active_tab = tab;
    }

    /// Replace requests and friends from a real-time listener update
    pub async fn apply_snapshot(&self, requests: Vec<User>, friends: Vec<User>) {
        let mut state = self.state.write().await;
        state.requests = requests;
        state.friends = friends;
    }

    /// Fetch everything and pick the opening tab
    pub async fn load(&self) -> Result<Prompt> {
        let requests = self.backend.friend_requests(&self.current_user).await?;
        let friends = self.backend.friends(&self.current_user).await?;
        self.apply_snapshot(requests, friends).await;
        self.refresh_suggestions().await?;

        let mut state = self.state.write().await;
        let tab = self.initial_tab.unwrap_or_else(|| state.default_tab());
        state.active_tab = tab;
        tracing::info!(
            tab = ?state.active_tab,
            requests = state.requests.len(),
            friends = state.friends.len(),
            suggestions = state.suggestions.len(),
            "friends screen loaded"
        );
        Ok(Prompt::FriendsLoaded)
    }

    async fn refresh_suggestions(&self) -> Result<()> {
        self.state.write().await.loading = true;
        let fetched = self.backend.recommended_friends(&self.current_user).await;
        let mut state = self.state.write().await;
        state.loading = false;
        state.suggestions = fetched?;
        Ok(())
    }

    pub async fn reload(&self) -> Result<ActionReport> {
        self.refresh_suggestions().await?;
        Ok(ActionReport::succeeded(Prompt::ReloadingFriends))
    }

    pub async fn accept(&self, user: &User) -> ActionReport {
        match self
            .backend
            .accept_friend_request(&self.current_user, &user.id)
            .await
        {
            Ok(()) => ActionReport::succeeded(Prompt::FriendRequestAccepted {
                name: user.name.clone(),
            }),
            Err(failure) => ActionReport::failed(failure.to_string(), Prompt::ActionFailed),
        }
    }

    pub async fn decline(&self, user: &User) -> ActionReport {
        match self
            .backend
            .decline_friend_request(&self.current_user, &user.id)
            .await
        {
            Ok(()) => ActionReport::succeeded(Prompt::FriendRequestDeclined {
                name: user.name.clone(),
            }),
            Err(failure) => ActionReport::failed(failure.to_string(), Prompt::ActionFailed),
        }
    }

    /// Mark the suggestion as sent right away; restore its status if the store refuses
    pub async fn add_friend(&self, user: &User) -> ActionReport {
        let target = user.id.clone();
        let outcome = optimistic::execute(
            &self.state,
            |state| {
                let suggestion = state.suggestion_mut(&target)?;
                if suggestion.friendship_status == Some(FriendshipStatus::RequestSent) {
                    return None;
                }
                let previous = suggestion.friendship_status;
                suggestion.friendship_status = Some(FriendshipStatus::RequestSent);
                Some(previous)
            },
            |state, previous| {
                if let Some(suggestion) = state.suggestion_mut(&target) {
                    suggestion.friendship_status = previous;
                }
            },
            || self.backend.add_friend(&self.current_user, &user.id),
        )
        .await;

        let name = user.name.clone();
        match outcome {
            MutationOutcome::Applied => ActionReport::succeeded(Prompt::FriendRequestSent { name }),
            MutationOutcome::RolledBack(MutationFailure::Policy(block)) => {
                ActionReport::failed(block.as_str(), Prompt::FriendRequestPrivacyBlock { name })
            }
            MutationOutcome::RolledBack(failure) => {
                ActionReport::failed(failure.to_string(), Prompt::FriendRequestFailed)
            }
            MutationOutcome::Skipped => ActionReport::not_applicable_with(Prompt::ErrorGeneric),
        }
    }

    pub async fn unfriend(&self, user: &User) -> ActionReport {
        let question = format!(
            "Are you sure you want to remove {} from your friends?",
            user.name
        );
        if !self.confirmer.confirm(&question).await {
            return ActionReport::not_applicable();
        }
        match self.backend.unfriend(&self.current_user, &user.id).await {
            Ok(()) => ActionReport::succeeded(Prompt::FriendRemoved {
                name: user.name.clone(),
            }),
            Err(failure) => ActionReport::failed(failure.to_string(), Prompt::ActionFailed),
        }
    }

    pub fn open_profile(&self, user: &User) -> ActionReport {
        self.host.navigator.open_profile(&user.username);
        ActionReport::silent()
    }
}

#[async_trait]
impl Screen for FriendsScreen {
    type Entity = User;
    type Action = FriendsAction;

    fn name(&self) -> &'static str {
        "friends"
    }

    fn intent_table(&self) -> &IntentTable<FriendsAction> {
        &self.table
    }

    async fn entity_context(&self) -> EntityContext<User> {
        let state = self.state.read().await;
        state
            .visible()
            .into_iter()
            .map(|u| (u.name.clone(), u.clone()))
            .collect()
    }

    async fn perform(
        &self,
        action: FriendsAction,
        target: Option<User>,
        _intent: &IntentResult,
    ) -> Result<ActionReport> {
        let report = match (action, target) {
            (FriendsAction::Accept, Some(user)) => self.accept(&user).await,
            (FriendsAction::Decline, Some(user)) => self.decline(&user).await,
            (FriendsAction::AddFriend, Some(user)) => self.add_friend(&user).await,
            (FriendsAction::OpenProfile, Some(user)) => self.open_profile(&user),
            (FriendsAction::Unfriend, Some(user)) => self.unfriend(&user).await,
            (FriendsAction::Reload, _) => self.reload().await?,
            (FriendsAction::Common(common), _) => self.host.perform_common(common),
            (_, None) => ActionReport::not_applicable(),
        };
        Ok(report)
    }
}
