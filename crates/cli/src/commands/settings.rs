use actionlog_storage::{ProfileStore, SettingsStore};
use anyhow::Result;

use crate::{ProfileArgs, open_kv};

pub(crate) fn run_profile_show() -> Result<()> {
    let profile = ProfileStore::new(open_kv()?).load();
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

fn text(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| Some(v.trim().to_owned()).filter(|v| !v.is_empty()))
}

pub(crate) fn run_profile_set(args: ProfileArgs) -> Result<()> {
    let store = ProfileStore::new(open_kv()?);
    let mut profile = store.load();
    if let Some(name) = args.name {
        profile.name = name.trim().to_owned();
    }
    if let Some(v) = text(args.title) {
        profile.title = v;
    }
    if let Some(v) = text(args.email) {
        profile.email = v;
    }
    if let Some(v) = text(args.website) {
        profile.website = v;
    }
    if let Some(v) = text(args.bio) {
        profile.bio = v;
    }
    if let Some(expertise) = args.expertise {
        profile.expertise =
            expertise.into_iter().map(|e| e.trim().to_owned()).filter(|e| !e.is_empty()).collect();
    }
    if let Some(v) = text(args.persona) {
        profile.persona = v;
    }
    if let Some(v) = text(args.goals) {
        profile.goals = v;
    }
    if let Some(enabled) = args.use_in_prompts {
        profile.use_in_prompts = enabled;
    }
    store.save(&profile)?;
    if profile.use_in_prompts && !profile.prompts_enabled() {
        eprintln!("note: the profile is only used in prompts once a name is set");
    }
    println!("Profile saved");
    Ok(())
}

pub(crate) fn run_config_show() -> Result<()> {
    let settings = SettingsStore::new(open_kv()?).load();
    let key = match settings.api_key.as_deref() {
        Some(key) => match key.get(key.len().saturating_sub(4)..) {
            Some(tail) if key.len() > 8 => format!("set (…{tail})"),
            _ => "set".to_owned(),
        },
        None => "not set".to_owned(),
    };
    println!("api key:  {key}");
    println!("model:    {}", settings.model);
    println!("base url: {}", settings.base_url);
    Ok(())
}

pub(crate) fn run_set_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        anyhow::bail!("API key must not be empty");
    }
    SettingsStore::new(open_kv()?).set_api_key(Some(key))?;
    println!("API key saved");
    Ok(())
}

pub(crate) fn run_clear_key() -> Result<()> {
    SettingsStore::new(open_kv()?).set_api_key(None)?;
    println!("API key removed");
    Ok(())
}

pub(crate) fn run_set_model(model: &str) -> Result<()> {
    if model.trim().is_empty() {
        anyhow::bail!("model must not be empty");
    }
    SettingsStore::new(open_kv()?).set_model(model)?;
    println!("Model set to {}", model.trim());
    Ok(())
}
