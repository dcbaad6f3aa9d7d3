//! Voice Bot Demo
//!
//! Wires a handful of community features onto the YesBot router:
//!
//! | Handler          | Event        | Keys                                        | Roles        |
//! |------------------|--------------|---------------------------------------------|--------------|
//! | `voice-limit`    | message      | `bot-commands` / `!voice` / `limit`         | Yes Theory   |
//! | `voice-up`       | message      | `bot-commands` / `!voice` / `up`            | Yes Theory   |
//! | `voice-down`     | message      | `bot-commands` / `!voice` / `down`          | Yes Theory   |
//! | `decline-ticket` | reaction_add | `travel-approvals` / 🚫                     | Support      |
//! | `topic`          | message      | any channel / `!topic`                      |              |
//! | `welcome-back`   | ready        |                                             |              |
//! | `farewell`       | member_leave |                                             |              |
//!
//! Without `--replay` the bot plays a short scripted session through an
//! in-process channel source, standing in for a platform client.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package voice-bot
//! cargo run --package voice-bot -- --replay session.jsonl
//! cargo run --package voice-bot -- --catalog
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use tokio::sync::Mutex;
use tracing::{info, warn};
use yesbot::core::testing;
use yesbot::framework::catalog;
use yesbot::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "voice-bot", about = "YesBot demo: voice limits, ticket triage, topics")]
struct Args {
    /// Replay a JSON-lines recording instead of the scripted session.
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Configuration file to load on top of the defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the handler catalog as JSON and exit.
    #[arg(long)]
    catalog: bool,
}

// ============================================================================
// Services
// ============================================================================

/// Voice channel settings, keyed by channel owner.
#[async_trait]
trait VoiceChannels: Send + Sync {
    async fn limit(&self, owner: UserId) -> Option<u32>;
    async fn set_limit(&self, owner: UserId, limit: u32) -> Result<()>;
}

#[derive(Default)]
struct InMemoryVoiceChannels {
    limits: Mutex<HashMap<u64, u32>>,
}

#[async_trait]
impl VoiceChannels for InMemoryVoiceChannels {
    async fn limit(&self, owner: UserId) -> Option<u32> {
        self.limits.lock().await.get(&owner.get()).copied()
    }

    async fn set_limit(&self, owner: UserId, limit: u32) -> Result<()> {
        anyhow::ensure!(limit <= 99, "voice channel limit {limit} is above 99");
        self.limits.lock().await.insert(owner.get(), limit);
        Ok(())
    }
}

struct Topics(Vec<&'static str>);

const DEFAULT_LIMIT: u32 = 4;

// ============================================================================
// Handler Functions
// ============================================================================

async fn voice_limit(
    msg: Event<Message>,
    member: Member,
    voice: Inject<dyn VoiceChannels>,
) -> Result<()> {
    let limit: u32 = msg
        .words()
        .nth(2)
        .context("usage: !voice limit <number>")?
        .parse()
        .context("voice limit must be a number")?;
    voice.set_limit(msg.author.id, limit).await?;
    info!(user = member.display_name(), limit, "Voice channel limit set");
    Ok(())
}

async fn adjust_limit(msg: &Message, voice: &dyn VoiceChannels, up: bool) -> Result<u32> {
    let current = voice.limit(msg.author.id).await.unwrap_or(DEFAULT_LIMIT);
    let next = if up {
        current + 1
    } else {
        current.saturating_sub(1)
    };
    voice.set_limit(msg.author.id, next).await?;
    Ok(next)
}

async fn voice_up(msg: Event<Message>, voice: Inject<dyn VoiceChannels>) -> Result<()> {
    let limit = adjust_limit(&msg, &*voice, true).await?;
    info!(user = %msg.author.name, limit, "Voice channel limit raised");
    Ok(())
}

async fn voice_down(msg: Event<Message>, voice: Inject<dyn VoiceChannels>) -> Result<()> {
    let limit = adjust_limit(&msg, &*voice, false).await?;
    info!(user = %msg.author.name, limit, "Voice channel limit lowered");
    Ok(())
}

async fn decline_ticket(event: Event<ReactionEvent>, member: Member) {
    let ticket = &event.reaction.message;
    info!(
        ticket = %ticket.id,
        requester = %ticket.author.name,
        declined_by = member.display_name(),
        "Travel ticket declined"
    );
}

async fn topic(msg: Event<Message>, topics: Inject<Topics>) {
    let topics = &topics.0.0;
    if topics.is_empty() {
        warn!("No topics configured");
        return;
    }
    let pick = topics[(msg.id.get() % topics.len() as u64) as usize];
    info!(channel = ?msg.channel.as_deref().and_then(Channel::name), topic = pick, "Topic suggested");
}

async fn welcome_back(ready: Event<Ready>) {
    info!(user = %ready.user.name, guilds = ready.guilds.len(), "Connected");
}

async fn farewell(left: Event<MemberLeave>) {
    info!(user = left.member.display_name(), "Member left the server");
}

fn register_handlers(runtime: &YesBotRuntime) -> Result<()> {
    let voice = |sub: &str| {
        HandlerOptions::command("!voice")
            .sub_trigger(sub)
            .channel("bot-commands")
            .allowed_role("Yes Theory")
    };

    runtime.register(
        voice("limit")
            .name("voice-limit")
            .description("Set the user limit of your voice channel"),
        voice_limit,
    )?;
    runtime.register(voice("up").name("voice-up"), voice_up)?;
    runtime.register(voice("down").name("voice-down"), voice_down)?;
    runtime.register(
        HandlerOptions::reaction_add("🚫")
            .name("decline-ticket")
            .channel("travel-approvals")
            .allowed_role("Support")
            .description("Decline a travel ticket"),
        decline_ticket,
    )?;
    runtime.register(
        HandlerOptions::command("!topic")
            .name("topic")
            .description("Suggest a conversation topic"),
        topic,
    )?;
    runtime.register(HandlerOptions::new(EventKind::Ready).name("welcome-back"), welcome_back)?;
    runtime.register(HandlerOptions::new(EventKind::MemberLeave).name("farewell"), farewell)?;
    Ok(())
}

// ============================================================================
// Scripted Session
// ============================================================================

async fn play_script(sender: EventSender) -> Result<()> {
    let ana = testing::member(1, "ana", &["Yes Theory"]);
    let ben = testing::member(2, "ben", &[]);
    let sam = testing::member(3, "sam", &["Support"]);
    let guild = testing::guild("Yes Theory Fam", vec![ana.clone(), ben.clone(), sam.clone()]);
    let commands = testing::guild_channel(&guild, 10, "bot-commands");
    let general = testing::guild_channel(&guild, 11, "general");
    let approvals = testing::guild_channel(&guild, 12, "travel-approvals");

    sender
        .send(Ready {
            user: testing::user(99, "yesbot"),
            guilds: vec![guild.id],
        })
        .await?;
    sender.send(testing::message_event(&commands, ana.user.clone(), "!voice limit 6")).await?;
    sender.send(testing::message_event(&commands, ana.user.clone(), "!voice up")).await?;
    // Denied: ben has no role.
    sender.send(testing::message_event(&commands, ben.user.clone(), "!voice down")).await?;
    // Unmatched: voice commands only listen in bot-commands.
    sender.send(testing::message_event(&general, ana.user.clone(), "!voice up")).await?;
    sender.send(testing::message_event(&general, ben.user.clone(), "!topic please")).await?;
    sender.send(testing::reaction_add(&approvals, "🚫", sam.user.clone())).await?;
    sender
        .send(MemberLeave {
            member: ben,
            guild_id: guild.id,
        })
        .await?;
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = YesBotRuntime::builder();
    if let Some(path) = &args.config {
        builder = builder.config_file(path);
    }
    let runtime = builder.build()?;

    runtime.provide::<dyn VoiceChannels>(Arc::new(InMemoryVoiceChannels::default()))?;
    runtime.provide(Arc::new(Topics(vec![
        "What is the scariest thing you have done this year?",
        "Which stranger changed your life?",
        "Where would you go with a one-way ticket?",
    ])))?;
    register_handlers(&runtime)?;

    if args.catalog {
        println!("{}", catalog::to_json(&runtime.catalog())?);
        return Ok(());
    }

    let stats = match &args.replay {
        Some(path) => runtime.run(ReplaySource::open(path).await?).await?,
        None => {
            let (sender, source) = ChannelSource::new(runtime.config().runtime.event_buffer);
            tokio::spawn(async move {
                if let Err(e) = play_script(sender).await {
                    warn!(error = %e, "Scripted session stopped early");
                }
            });
            runtime.run(source).await?
        }
    };

    info!(
        received = stats.events_received,
        unmatched = stats.events_unmatched,
        succeeded = stats.handlers_succeeded,
        denied = stats.handlers_denied,
        failed = stats.handlers_failed,
        "Session finished"
    );
    Ok(())
}
