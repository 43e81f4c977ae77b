//! Profile screen - one user's profile and the friendship controls on it

use crate::backend::{MutationFailure, SocialBackend};
use crate::command::context::EntityContext;
use crate::command::dispatcher::{ActionReport, IntentTable, Screen};
use crate::command::feedback::Prompt;
use crate::command::optimistic::{self, MutationOutcome, SharedState};
use crate::core::error::Result;
use crate::core::types::{FriendshipStatus, User, UserId};
use crate::llm::intent::{Intent, IntentResult};
use crate::screens::{with_scrolling, CommonAction, ScreenHost};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ProfileState {
    pub profile_user: Option<User>,
    pub status: FriendshipStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileAction {
    AddFriend,
    AcceptRequest,
    DeclineRequest,
    Common(CommonAction),
}

pub struct ProfileScreen {
    current_user: UserId,
    state: SharedState<ProfileState>,
    backend: Arc<dyn SocialBackend>,
    host: ScreenHost,
    table: IntentTable<ProfileAction>,
    /// Set while an accept/decline is in flight
    answering: AtomicBool,
}

/// Clears the in-flight flag when the answer ends, even if the command is dropped
struct Answering<'a>(&'a AtomicBool);

impl<'a> Answering<'a> {
    fn claim(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for Answering<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ProfileScreen {
    pub fn new(current_user: UserId, backend: Arc<dyn SocialBackend>, host: ScreenHost) -> Self {
        let table = IntentTable::new()
            .global_optimistic(Intent::AddFriend, ProfileAction::AddFriend)
            .global(Intent::AcceptRequest, ProfileAction::AcceptRequest)
            .global(Intent::DeclineRequest, ProfileAction::DeclineRequest)
            .global(Intent::GoBack, ProfileAction::Common(CommonAction::GoBack));
        let table = with_scrolling(table, ProfileAction::Common);

        Self {
            current_user,
            state: optimistic::shared(ProfileState::default()),
            backend,
            host,
            table,
            answering: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> SharedState<ProfileState> {
        self.state.clone()
    }

    pub async fn status(&self) -> FriendshipStatus {
        self.state.read().await.status
    }

    pub fn is_answering(&self) -> bool {
        self.answering.load(Ordering::Acquire)
    }

    /// Look up a profile by username and fetch its friendship status
    ///
    /// A failed status lookup leaves the status at `NotFriends`.
    pub async fn load(&self, username: &str) -> Result<Prompt> {
        let Some(user) = self.backend.user_by_username(username).await? else {
            let mut state = self.state.write().await;
            *state = ProfileState::default();
            tracing::info!(username, "profile not found");
            return Ok(Prompt::ProfileNotFound {
                username: username.to_string(),
            });
        };

        let own = user.id == self.current_user;
        let status = if own {
            FriendshipStatus::NotFriends
        } else {
            match self
                .backend
                .friendship_status(&self.current_user, &user.id)
                .await
            {
                Ok(status) => status,
                Err(err) => {
                    tracing::warn!(username, "friendship status lookup failed: {}", err);
                    FriendshipStatus::NotFriends
                }
            }
        };

        let prompt = if own {
            Prompt::ProfileLoadedOwn
        } else {
            Prompt::ProfileLoaded {
                name: user.name.clone(),
            }
        };
        *self.state.write().await = ProfileState {
            profile_user: Some(user),
            status,
        };
        Ok(prompt)
    }

    async fn subject(&self) -> Option<User> {
        self.state.read().await.profile_user.clone()
    }

    pub async fn add_friend(&self) -> ActionReport {
        let Some(user) = self.subject().await else {
            return ActionReport::not_applicable();
        };
        if user.id == self.current_user {
            return ActionReport::not_applicable();
        }

        let outcome = optimistic::execute(
            &self.state,
            |state| {
                if state.status != FriendshipStatus::NotFriends {
                    return None;
                }
                let previous = state.status;
                state.status = FriendshipStatus::RequestSent;
                Some(previous)
            },
            |state, previous| state.status = previous,
            || self.backend.add_friend(&self.current_user, &user.id),
        )
        .await;

        let name = user.name;
        match outcome {
            MutationOutcome::Applied => ActionReport::succeeded(Prompt::FriendRequestSent { name }),
            MutationOutcome::RolledBack(MutationFailure::Policy(block)) => {
                ActionReport::failed(block.as_str(), Prompt::FriendRequestPrivacyBlock { name })
            }
            MutationOutcome::RolledBack(failure) => {
                ActionReport::failed(failure.to_string(), Prompt::FriendRequestFailed)
            }
            MutationOutcome::Skipped => ActionReport::not_applicable(),
        }
    }

    pub async fn accept(&self) -> ActionReport {
        self.answer_request(true).await
    }

    pub async fn decline(&self) -> ActionReport {
        self.answer_request(false).await
    }

    async fn answer_request(&self, accept: bool) -> ActionReport {
        let Some(_answering) = Answering::claim(&self.answering) else {
            return ActionReport::not_applicable();
        };
        let user = {
            let state = self.state.read().await;
            match &state.profile_user {
                Some(user) if state.status == FriendshipStatus::PendingApproval => user.clone(),
                _ => return ActionReport::not_applicable(),
            }
        };

        let result = if accept {
            self.backend
                .accept_friend_request(&self.current_user, &user.id)
                .await
        } else {
            self.backend
                .decline_friend_request(&self.current_user, &user.id)
                .await
        };

        let mut state = self.state.write().await;
        match result {
            Ok(()) if accept => {
                state.status = FriendshipStatus::Friends;
                ActionReport::succeeded(Prompt::FriendRequestAccepted { name: user.name })
            }
            Ok(()) => {
                state.status = FriendshipStatus::NotFriends;
                ActionReport::succeeded(Prompt::FriendRequestDeclined { name: user.name })
            }
            Err(failure) => ActionReport::failed(failure.to_string(), Prompt::ActionFailed),
        }
    }
}

#[async_trait]
impl Screen for ProfileScreen {
    type Entity = User;
    type Action = ProfileAction;

    fn name(&self) -> &'static str {
        "profile"
    }

    fn intent_table(&self) -> &IntentTable<ProfileAction> {
        &self.table
    }

    async fn entity_context(&self) -> EntityContext<User> {
        self.state
            .read()
            .await
            .profile_user
            .iter()
            .map(|u| (u.name.clone(), u.clone()))
            .collect()
    }

    async fn perform(
        &self,
        action: ProfileAction,
        _target: Option<User>,
        _intent: &IntentResult,
    ) -> Result<ActionReport> {
        let report = match action {
            ProfileAction::Common(common) => self.host.perform_common(common),
            ProfileAction::AddFriend => self.add_friend().await,
            ProfileAction::AcceptRequest => self.accept().await,
            ProfileAction::DeclineRequest => self.decline().await,
        };
        Ok(report)
    }
}
