//! Feedback channel - short status captions for the caption/TTS surface

use std::fmt;

/// Presentation surface that shows or speaks a caption
///
/// Implementations must not fail; a surface that cannot present a message
/// drops it.
pub trait FeedbackSink: Send + Sync {
    fn emit(&self, message: &str);
}

impl<F> FeedbackSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn emit(&self, message: &str) {
        self(message)
    }
}

/// Caption catalogue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    FriendsLoaded,
    ReloadingFriends,
    FriendRequestAccepted { name: String },
    FriendRequestDeclined { name: String },
    FriendRequestSent { name: String },
    FriendRequestPrivacyBlock { name: String },
    FriendRequestFailed,
    FriendRemoved { name: String },
    ProfileLoaded { name: String },
    ProfileLoadedOwn,
    ProfileNotFound { username: String },
    ReactionAdded { emoji: String },
    ReactionRemoved,
    VoteRecorded { option: String },
    AlreadyVoted,
    ScrollStarted,
    ScrollStopped,
    ActionFailed,
    ErrorGeneric,
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prompt::FriendsLoaded => write!(f, "Friends page loaded."),
            Prompt::ReloadingFriends => write!(f, "Reloading friends list..."),
            Prompt::FriendRequestAccepted { name } => {
                write!(f, "You are now friends with {}.", name)
            }
            Prompt::FriendRequestDeclined { name } => {
                write!(f, "Friend request from {} declined.", name)
            }
            Prompt::FriendRequestSent { name } => write!(f, "Friend request sent to {}.", name),
            Prompt::FriendRequestPrivacyBlock { name } => write!(
                f,
                "{} only accepts friend requests from friends of friends.",
                name
            ),
            Prompt::FriendRequestFailed => {
                write!(f, "Failed to send friend request. Please try again later.")
            }
            Prompt::FriendRemoved { name } => {
                write!(f, "{} has been removed from your friends.", name)
            }
            Prompt::ProfileLoaded { name } => write!(f, "Showing {}'s profile.", name),
            Prompt::ProfileLoadedOwn => write!(f, "Showing your profile."),
            Prompt::ProfileNotFound { username } => {
                write!(f, "Profile for {} not found.", username)
            }
            Prompt::ReactionAdded { emoji } => write!(f, "Reacted {}.", emoji),
            Prompt::ReactionRemoved => write!(f, "Reaction removed."),
            Prompt::VoteRecorded { option } => write!(f, "Your vote for {} was recorded.", option),
            Prompt::AlreadyVoted => write!(f, "You have already voted in this poll."),
            Prompt::ScrollStarted => write!(f, "Scrolling."),
            Prompt::ScrollStopped => write!(f, "Stopped scrolling."),
            Prompt::ActionFailed => write!(f, "Something went wrong. Please try again."),
            Prompt::ErrorGeneric => write!(f, "Sorry, I didn't understand that."),
        }
    }
}

impl From<Prompt> for String {
    fn from(prompt: Prompt) -> Self {
        prompt.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_prompts_interpolate_names() {
        let text = Prompt::FriendRequestAccepted {
            name: "Alice".into(),
        }
        .to_string();
        assert!(text.contains("Alice"));

        let block = Prompt::FriendRequestPrivacyBlock { name: "Bob".into() }.to_string();
        assert!(block.starts_with("Bob"));
    }

    #[test]
    fn test_closure_sink() {
        let seen = Mutex::new(Vec::new());
        let sink = |m: &str| seen.lock().unwrap().push(m.to_string());
        sink.emit(&Prompt::ErrorGeneric.to_string());
        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
