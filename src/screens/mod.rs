//! Screens that accept commands
//!
//! Each screen owns its state, derives its entity context from it and
//! declares which intents it understands. Navigation and scrolling are
//! shared by all screens through `ScreenHost`.

pub mod feed;
pub mod friends;
pub mod profile;

use crate::command::dispatcher::{ActionReport, IntentTable};
use crate::command::feedback::Prompt;
use crate::core::types::{AppView, ScrollState};
use crate::llm::intent::Intent;
use crate::ui::navigator::Navigator;
use crate::ui::scroll::ScrollHandle;
use std::sync::Arc;

pub use feed::{FeedAction, FeedEntity, FeedScreen, FeedState};
pub use friends::{FriendsAction, FriendsScreen, FriendsState, FriendsTab};
pub use profile::{ProfileAction, ProfileScreen, ProfileState};

/// Collaborators every screen can reach
#[derive(Clone)]
pub struct ScreenHost {
    pub navigator: Arc<dyn Navigator>,
    pub scroll: ScrollHandle,
}

impl ScreenHost {
    pub fn new(navigator: Arc<dyn Navigator>, scroll: ScrollHandle) -> Self {
        Self { navigator, scroll }
    }

    pub fn perform_common(&self, action: CommonAction) -> ActionReport {
        match action {
            CommonAction::Navigate(view) => self.navigator.navigate(view),
            CommonAction::GoBack => self.navigator.go_back(),
            CommonAction::Scroll(ScrollState::None) => {
                self.scroll.set(ScrollState::None);
                return ActionReport::succeeded(Prompt::ScrollStopped);
            }
            CommonAction::Scroll(state) => {
                self.scroll.set(state);
                return ActionReport::succeeded(Prompt::ScrollStarted);
            }
        }
        ActionReport::silent()
    }
}

/// Actions that behave the same on every screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommonAction {
    Navigate(AppView),
    GoBack,
    Scroll(ScrollState),
}

fn navigation_targets() -> [(Intent, AppView); 7] {
    [
        (Intent::OpenAdsCenter, AppView::AdsCenter),
        (Intent::OpenMessages, AppView::Conversations),
        (Intent::OpenRoomsHub, AppView::RoomsHub),
        (Intent::OpenAudioRooms, AppView::RoomsList),
        (Intent::OpenVideoRooms, AppView::VideoRoomsList),
        (Intent::OpenFriends, AppView::Friends),
        (Intent::OpenFeed, AppView::Feed),
    ]
}

/// Add go-back and the top-level navigation intents, skipping `except`
pub fn with_navigation<A>(
    mut table: IntentTable<A>,
    except: AppView,
    wrap: fn(CommonAction) -> A,
) -> IntentTable<A> {
    table = table.global(Intent::GoBack, wrap(CommonAction::GoBack));
    for (intent, view) in navigation_targets() {
        if view != except {
            table = table.global(intent, wrap(CommonAction::Navigate(view)));
        }
    }
    table
}

/// Add scroll up / down / stop
pub fn with_scrolling<A>(table: IntentTable<A>, wrap: fn(CommonAction) -> A) -> IntentTable<A> {
    table
        .global(Intent::ScrollUp, wrap(CommonAction::Scroll(ScrollState::Up)))
        .global(Intent::ScrollDown, wrap(CommonAction::Scroll(ScrollState::Down)))
        .global(Intent::StopScroll, wrap(CommonAction::Scroll(ScrollState::None)))
}
