//! UI-side collaborators: captions, navigation and scrolling

pub mod confirm;
pub mod navigator;
pub mod scroll;
pub mod state;

pub use confirm::{Confirmer, FixedAnswer};
pub use navigator::{NavigationEvent, NavigationLog, Navigator};
pub use scroll::{ScrollAnimator, ScrollHandle, ScrollPosition, ScrollSurface};
pub use state::{Caption, CaptionLog};
