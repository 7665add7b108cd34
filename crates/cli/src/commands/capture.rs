use std::sync::{Arc, Mutex};

use actionlog_core::ActionId;
use actionlog_llm::LlmClient;
use actionlog_service::{CaptureEngine, CaptureError, CaptureState, TurnOutcome, session_from_payload};
use actionlog_storage::{ProfileStore, RecordStore};
use anyhow::Result;
use chrono::Utc;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt as _, BufReader};

use crate::{llm_client, open_kv};

const REVIEW_HELP: &str =
    "Review: :save to store, :fix to auto-fix, :edit <json> to replace, :back to keep talking";

/// Runs one guided capture over stdin and stores the result.
pub(crate) async fn run(action: ActionId, auto_save: bool) -> Result<()> {
    let kv = open_kv()?;
    let client = llm_client(&kv)?;
    let profile = ProfileStore::new(Arc::clone(&kv)).load();

    let saved: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&saved);
    let mut engine = CaptureEngine::new(
        action,
        client,
        Some(profile),
        Box::new(move |value| {
            if let Ok(mut slot) = sink.lock() {
                *slot = Some(value);
            }
        }),
    )?;
    engine.set_auto_save(auto_save);

    println!("{} capture. Empty line to skip, Ctrl-D to quit.", action.title());
    engine.start().await?;
    print_last_reply(&engine);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while engine.state() != CaptureState::Saved {
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match engine.state() {
            CaptureState::Review => review_command(&mut engine, line.trim()).await,
            _ => {
                let outcome = engine.send(&line).await?;
                if outcome != TurnOutcome::Ignored {
                    print_last_reply(&engine);
                }
                if matches!(outcome, TurnOutcome::Review) {
                    print_review(&engine);
                }
            },
        }
    }

    let payload = saved.lock().ok().and_then(|mut slot| slot.take());
    let Some(payload) = payload else {
        println!("Capture ended without saving.");
        return Ok(());
    };
    let session = session_from_payload(action, &payload, Utc::now())?;
    let id = session.id().to_owned();
    RecordStore::new(kv).add(session)?;
    println!("Saved {} record {id}", action.title());
    Ok(())
}

async fn review_command(engine: &mut CaptureEngine<LlmClient>, line: &str) {
    let result = match line.split_once(' ').map_or((line, ""), |(c, rest)| (c, rest.trim())) {
        (":save", _) => engine.save().map(|_| ()),
        (":fix", _) => match engine.auto_fix().await {
            Ok(_) => {
                print_review(engine);
                Ok(())
            },
            Err(e) => Err(e),
        },
        (":edit", json) => engine.edit_candidate(json).map(|_| print_review(engine)),
        (":back", _) => engine.resume_conversation().map(|()| println!("Continuing the conversation.")),
        _ => {
            println!("{REVIEW_HELP}");
            Ok(())
        },
    };
    if let Err(e) = result {
        report(&e);
    }
}

fn report(err: &CaptureError) {
    eprintln!("error: {err}");
}

fn print_last_reply(engine: &CaptureEngine<LlmClient>) {
    if let Some(turn) = engine.turns().last() {
        println!("model> {}", turn.text);
    }
}

fn print_review(engine: &CaptureEngine<LlmClient>) {
    if engine.state() != CaptureState::Review {
        return;
    }
    println!("candidate> {}", engine.candidate());
    if engine.issues().is_empty() {
        println!("No issues.");
    }
    for issue in engine.issues() {
        println!("  - {issue}");
    }
    println!("{REVIEW_HELP}");
}
