//! Onboarding Bot
//!
//! Drives one chat user through a small onboarding conversation and shows
//! how an out-of-band trigger waits for a blocking state to conclude.
//!
//! Key concepts:
//! - Regex intents with named parameters
//! - Entry behaviors that emit replies, and re-entry prompts
//! - Non-exitable states queue triggers until the user answers
//! - Entry redirects
//!
//! Run with: cargo run --example onboarding_bot

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use traversal::core::{Intent, Next};
use traversal::engine::{Engine, EngineConfig, TriggerOutcome};
use traversal::machine::{define_state, StateMachine, StateMap};
use traversal::transform::TextInputTransformer;
use traversal::traverser::memory::{MemoryEmitter, MemoryStore};
use uuid::Uuid;

fn say(text: &'static str, reprompt: &'static str) -> impl Fn(bool) -> String + Send + Sync {
    move |reentry| (if reentry { reprompt } else { text }).to_string()
}

fn onboarding() -> StateMap {
    let age = Arc::new(
        Intent::with_patterns("age", [r"(?P<age>\d+) year old", r"^i am (?P<age>\d+)$"]).unwrap(),
    );
    let ok = Arc::new(Intent::with_patterns("ok", ["^(ok|okay|sure|yes)$"]).unwrap());

    StateMachine::new()
        // Entry immediately hands over to the age question.
        .state(define_state("start", true, |state, ctx| {
            let ctx = ctx.clone();
            state.on_entry(move |_| {
                let ctx = ctx.clone();
                async move {
                    ctx.emit(json!("Welcome aboard!")).await?;
                    ctx.redirect("ask_age").await
                }
            })
        }))
        .state(define_state("ask_age", false, move |state, ctx| {
            let ctx = ctx.clone();
            let reply = say("How old are you?", "Sorry, I need your age in years.");
            state
                .on_entry(move |reentry| {
                    let ctx = ctx.clone();
                    let text = reply(reentry);
                    async move { ctx.emit(json!(text)).await }
                })
                .intents([Arc::clone(&age)])
                .on_transition(|_, params| {
                    match params.get("age").and_then(|a| a.parse::<u32>().ok()) {
                        Some(years) if years >= 18 => Next::goto("ready"),
                        Some(_) => Next::goto("guardian"),
                        None => Next::Stay,
                    }
                })
        }))
        .state(define_state("guardian", true, |state, ctx| {
            let ctx = ctx.clone();
            state.on_entry(move |_| {
                let ctx = ctx.clone();
                async move { ctx.emit(json!("Please ask a guardian to continue.")).await }
            })
        }))
        .state(define_state("ready", true, move |state, ctx| {
            let ctx = ctx.clone();
            state
                .on_entry(move |reentry| {
                    let ctx = ctx.clone();
                    async move {
                        if !reentry {
                            ctx.emit(json!("You're all set.")).await?;
                        }
                        Ok(())
                    }
                })
                .intents([Arc::clone(&ok)])
                .on_transition(|_, _| Next::Stay)
        }))
        .state(define_state("announcement", true, |state, ctx| {
            let ctx = ctx.clone();
            state.on_entry(move |_| {
                let ctx = ctx.clone();
                async move {
                    let payload = ctx.transition_payload().await?.unwrap_or_default();
                    ctx.emit(json!({"announcement": payload})).await
                }
            })
        }))
        .compile()
        .unwrap()
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    println!("=== Onboarding Bot Example ===\n");

    let config = EngineConfig::default().with_debounce_window(Duration::ZERO);
    let engine: Engine<str> = Engine::new(onboarding(), TextInputTransformer, config);
    let store = MemoryStore::new();
    let emitter = Arc::new(MemoryEmitter::new());
    let user = Uuid::new_v4();

    let converse = |input: &'static str| {
        let engine = engine.clone();
        let store = &store;
        let emitter = Arc::clone(&emitter);
        async move {
            println!("user> {input}");
            let report = engine
                .step(store, emitter.clone(), "chat", user, input)
                .await
                .unwrap();
            for reply in emitter.emitted() {
                println!(" bot> {reply}");
            }
            emitter.clear();
            println!("      [{}]\n", report.state());
        }
    };

    converse("hi").await;

    // The user is mid-question, so the announcement waits.
    let outcome = engine
        .trigger_state(
            &store,
            emitter.clone(),
            "chat",
            user,
            "announcement",
            json!("New features are live"),
        )
        .await
        .unwrap();
    match outcome {
        TriggerOutcome::Queued { current, reason } => {
            println!("trigger queued while in '{current}': {reason:?}\n")
        }
        TriggerOutcome::Applied { to, .. } => println!("trigger applied, now in '{to}'\n"),
    }

    converse("banana").await;
    converse("I am a 29 year old male.").await;
    converse("ok").await;

    println!("=== Example Complete ===");
}
