//! VoxFeed - Terminal harness
//!
//! Drives one screen of the command controller from stdin against a seeded
//! in-memory store. With an LLM key configured any text is classified by
//! the model; without one, commands are typed as `intent_tag slot=value`.

use clap::{Parser, ValueEnum};
use voxfeed::backend::{MemoryBackend, SocialBackend};
use voxfeed::command::{ActionResult, CommandGate, CommandPipeline, Screen};
use voxfeed::core::config::{self, ControllerConfig};
use voxfeed::core::error::Result;
use voxfeed::core::types::{FriendRequestPrivacy, Poll, PollOption, Post, User, UserId};
use voxfeed::llm::{
    IntentResolver, IntentService, LlmClient, LlmIntentService, TaggedIntentService, Utterance,
};
use voxfeed::screens::{FeedScreen, FriendsScreen, ProfileScreen, ScreenHost};
use voxfeed::ui::{CaptionLog, FixedAnswer, NavigationLog, ScrollAnimator, ScrollPosition};

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScreenKind {
    Friends,
    Profile,
    Feed,
}

/// Command controller harness for the social feed client
#[derive(Parser, Debug)]
#[command(name = "voxfeed")]
#[command(about = "Drive a feed screen with natural-language commands")]
struct Args {
    /// Controller config (TOML); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Screen to open
    #[arg(long, value_enum, default_value = "friends")]
    screen: ScreenKind,

    /// Username of the signed-in user
    #[arg(long, default_value = "me")]
    user: String,

    /// Profile to open on the profile screen
    #[arg(long, default_value = "alice")]
    profile: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("voxfeed=info")),
        )
        .init();

    let args = Args::parse();

    let controller_config = match &args.config {
        Some(path) => ControllerConfig::load_from_toml(path)?,
        None => ControllerConfig::default(),
    };
    if config::set_config(controller_config).is_err() {
        tracing::warn!("controller config already set, keeping the first one");
    }
    let cfg = config::config();

    tracing::info!("VoxFeed starting...");
    let rt = Runtime::new()?;
    rt.block_on(run(args, cfg))
}

async fn run(args: Args, cfg: &'static ControllerConfig) -> Result<()> {
    let backend = Arc::new(MemoryBackend::new());
    let me = seed_store(&backend, &args.user).await;

    // Try to create LLM client (optional - typed intent tags work without it)
    let service: Arc<dyn IntentService> = match LlmClient::from_settings(&cfg.llm) {
        Ok(client) => {
            tracing::info!(model = client.model(), "using LLM intent service");
            Arc::new(LlmIntentService::new(client))
        }
        Err(_) => {
            tracing::warn!(
                "{} not set - type commands as `intent_tag slot=value`",
                cfg.llm.api_key_env
            );
            Arc::new(TaggedIntentService)
        }
    };

    let captions = Arc::new(CaptionLog::new(cfg.max_captions));
    let pipeline = CommandPipeline::new(
        IntentResolver::new(service, cfg.nlu_timeout),
        captions.clone(),
    );
    let gate = CommandGate::new();
    gate.start_listening();

    let surface = Arc::new(ScrollPosition::with_max(10_000.0));
    let animator = ScrollAnimator::from_config(surface.clone(), cfg);
    let navigator = Arc::new(NavigationLog::new());
    let host = ScreenHost::new(navigator.clone(), animator.handle());
    let store: Arc<dyn SocialBackend> = backend.clone();

    let harness = Harness {
        pipeline: &pipeline,
        gate: &gate,
        captions: &captions,
        navigator: &navigator,
        surface: &surface,
    };

    match args.screen {
        ScreenKind::Friends => {
            let screen = FriendsScreen::new(me, store, host, Arc::new(FixedAnswer(true)));
            let prompt = screen.load().await?;
            println!("{}", prompt);
            harness.repl(&screen).await?;
        }
        ScreenKind::Profile => {
            let screen = ProfileScreen::new(me, store, host);
            let prompt = screen.load(&args.profile).await?;
            println!("{}", prompt);
            harness.repl(&screen).await?;
        }
        ScreenKind::Feed => {
            let screen = FeedScreen::new(me, store, host);
            screen.load().await?;
            harness.repl(&screen).await?;
        }
    }

    animator.shutdown().await;
    Ok(())
}

struct Harness<'a> {
    pipeline: &'a CommandPipeline,
    gate: &'a CommandGate,
    captions: &'a CaptionLog,
    navigator: &'a NavigationLog,
    surface: &'a ScrollPosition,
}

impl Harness<'_> {
    async fn repl<S: Screen>(&self, screen: &S) -> Result<()> {
        println!("\n=== VOXFEED ({}) ===", screen.name());
        println!("Commands:");
        println!("  names           - Show names the current screen can bind");
        println!("  scroll          - Show the scroll offset");
        println!("  quit / q        - Exit");
        println!("  <any text>      - Command for the current screen");
        println!();

        loop {
            print!("> ");
            io::stdout().flush()?;

            let mut input = String::new();
            if io::stdin().read_line(&mut input)? == 0 {
                break;
            }
            let input = input.trim();

            if input.is_empty() {
                continue;
            }
            if input == "quit" || input == "q" {
                break;
            }
            if input == "names" {
                let ctx = screen.entity_context().await;
                println!("On screen: {}", ctx.candidate_names().join(", "));
                continue;
            }
            if input == "scroll" {
                println!("Scroll offset: {:.0}", self.surface.offset());
                continue;
            }

            let before = self.navigator.events().len();
            match self
                .pipeline
                .submit(self.gate, screen, Utterance::new(input))
                .await
            {
                None => println!("(still processing the previous command)"),
                Some(result) => {
                    if let Some(caption) = self.captions.latest() {
                        println!("{}", caption);
                    }
                    match result {
                        ActionResult::Succeeded => {}
                        ActionResult::Failed(reason) => println!("  failed: {}", reason),
                        ActionResult::NotApplicable => println!("  (nothing to do)"),
                    }
                }
            }
            for event in self.navigator.events().into_iter().skip(before) {
                println!("  -> {:?}", event);
            }
        }
        Ok(())
    }
}

/// Populate the store with a small social graph and feed
async fn seed_store(backend: &MemoryBackend, username: &str) -> UserId {
    let me = backend.add_user(User::new("Me", username)).await;
    let alice = backend.add_user(User::new("Alice", "alice")).await;
    let bob = User::new("Bob", "bob");
    let bob_id = backend.add_user(bob.clone()).await;
    let mut carol = User::new("Carol", "carol");
    carol.friend_request_privacy = FriendRequestPrivacy::FriendsOfFriends;
    backend.add_user(carol).await;
    backend.add_user(User::new("Dave", "dave")).await;

    backend.send_request(&alice, &me).await;
    backend.make_friends(&me, &bob_id).await;

    let mut lunch = Post::new(bob.author(), "Where should we eat?");
    lunch.poll = Some(Poll {
        question: "Lunch".into(),
        options: vec![PollOption::new("Pizza"), PollOption::new("Sushi")],
    });
    backend.add_post(lunch).await;
    backend
        .add_post(Post::new(bob.author(), "Great game last night"))
        .await;
    me
}
