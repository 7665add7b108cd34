use std::sync::Arc;

use actionlog_service::ChatService;
use actionlog_storage::{ProfileStore, RecordStore};
use anyhow::Result;

use crate::{llm_client, open_kv};

pub(crate) async fn run_chat(text: &str) -> Result<()> {
    let kv = open_kv()?;
    let client = llm_client(&kv)?;
    let profile = ProfileStore::new(Arc::clone(&kv)).load();
    let mut chat = ChatService::new(client, RecordStore::new(kv), Some(profile));
    println!("{}", chat.chat(text).await?);
    Ok(())
}

pub(crate) async fn run_refine(id: &str, request: &str, apply: bool) -> Result<()> {
    let kv = open_kv()?;
    let client = llm_client(&kv)?;
    let mut chat = ChatService::new(client, RecordStore::new(kv), None);
    println!("{}", chat.refine(id, request).await?);
    if apply {
        let updated = chat.apply_refinement(id)?;
        println!("Applied to {}", updated.id());
    }
    Ok(())
}
