//! Every command completes exactly once and shows exactly one caption,
//! whatever path it takes through the pipeline

use async_trait::async_trait;
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use voxfeed::backend::MemoryBackend;
use voxfeed::command::{ActionResult, CommandPipeline, CompletionSignal};
use voxfeed::core::error::{Result, VoxError};
use voxfeed::core::types::{User, UserId};
use voxfeed::llm::intent::TARGET_NAME;
use voxfeed::llm::{Intent, IntentHints, IntentResolver, IntentResult, IntentService, SlotValue, Utterance};
use voxfeed::screens::{FriendsScreen, ScreenHost};
use voxfeed::ui::{CaptionLog, FixedAnswer, NavigationLog, ScrollAnimator, ScrollPosition};

#[derive(Debug, Clone, Copy)]
enum Path {
    NluError,
    UnknownTag,
    UnresolvedSlot,
    Accept,
    HandlerError,
    GoBack,
}

impl Path {
    fn utterance(self) -> &'static str {
        match self {
            Path::NluError => "mumble",
            Path::UnknownTag => "order a pizza",
            Path::UnresolvedSlot => "accept zed",
            Path::Accept => "accept alice",
            Path::HandlerError => "reload",
            Path::GoBack => "go back",
        }
    }
}

fn path() -> impl Strategy<Value = Path> {
    prop_oneof![
        Just(Path::NluError),
        Just(Path::UnknownTag),
        Just(Path::UnresolvedSlot),
        Just(Path::Accept),
        Just(Path::HandlerError),
        Just(Path::GoBack),
    ]
}

struct Keyword;

#[async_trait]
impl IntentService for Keyword {
    async fn process_intent(&self, text: &str, _hints: &IntentHints) -> Result<IntentResult> {
        let target = |intent, name: &str| {
            IntentResult::new(intent).with_slot(TARGET_NAME, SlotValue::Text(name.into()))
        };
        match text {
            "order a pizza" => Ok(IntentResult::new(Intent::from_tag("intent_order_pizza"))),
            "accept zed" => Ok(target(Intent::AcceptRequest, "Zed")),
            "accept alice" => Ok(target(Intent::AcceptRequest, "alice")),
            "reload" => Ok(IntentResult::new(Intent::ReloadPage)),
            "go back" => Ok(IntentResult::new(Intent::GoBack)),
            _ => Err(VoxError::Nlu("no idea".into())),
        }
    }
}

async fn run_commands(paths: Vec<Path>) -> (Vec<usize>, usize, Vec<ActionResult>) {
    let backend = Arc::new(MemoryBackend::new());
    backend.add_user(User::new("Me", "me")).await;
    let alice = backend.add_user(User::new("Alice", "alice")).await;

    let animator =
        ScrollAnimator::spawn(Arc::new(ScrollPosition::new()), 2.0, Duration::from_millis(16));
    let host = ScreenHost::new(Arc::new(NavigationLog::new()), animator.handle());

    // Signed-in user unknown to the store: reload fails inside the handler
    let screen = FriendsScreen::new(
        UserId::from("ghost"),
        backend.clone(),
        host,
        Arc::new(FixedAnswer(true)),
    );
    let alice_user = User::new("Alice", "alice").with_id(alice.as_str());
    screen.apply_snapshot(vec![alice_user], Vec::new()).await;

    let captions = Arc::new(CaptionLog::new(1000));
    let pipeline = CommandPipeline::new(
        IntentResolver::new(Arc::new(Keyword), Duration::from_secs(8)),
        captions.clone(),
    );

    let mut fired = Vec::new();
    let mut results = Vec::new();
    for path in paths {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let signal: Arc<dyn CompletionSignal> = Arc::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        results.push(
            pipeline
                .handle(&screen, Utterance::new(path.utterance()), signal)
                .await,
        );
        fired.push(count.load(Ordering::SeqCst));
    }
    animator.shutdown().await;
    (fired, captions.len(), results)
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_each_command_completes_once(paths in proptest::collection::vec(path(), 1..12)) {
        let expected = paths.len();
        let (fired, _, results) = runtime().block_on(run_commands(paths));

        prop_assert_eq!(results.len(), expected);
        prop_assert!(fired.iter().all(|&n| n == 1), "completion counts: {:?}", fired);
    }

    #[test]
    fn prop_each_command_emits_at_most_one_caption(paths in proptest::collection::vec(path(), 1..12)) {
        let silent = paths.iter().filter(|p| matches!(p, Path::GoBack)).count();
        let expected = paths.len() - silent;
        let (_, captions, _) = runtime().block_on(run_commands(paths));

        prop_assert_eq!(captions, expected);
    }
}

#[test]
fn test_paths_reach_their_outcomes() {
    use Path::*;
    let (fired, captions, results) = runtime().block_on(run_commands(vec![
        NluError,
        UnknownTag,
        UnresolvedSlot,
        HandlerError,
        GoBack,
    ]));

    assert_eq!(fired, vec![1, 1, 1, 1, 1]);
    assert_eq!(captions, 4);
    assert_eq!(results[0], ActionResult::NotApplicable);
    assert_eq!(results[1], ActionResult::NotApplicable);
    assert_eq!(results[2], ActionResult::NotApplicable);
    assert!(matches!(results[3], ActionResult::Failed(_)));
    assert_eq!(results[4], ActionResult::Succeeded);
}
