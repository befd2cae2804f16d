//! Session inspection commands.

use std::path::Path;

use console::style;
use metrotube::session::SessionState;

use crate::cli::icons::{channel, dim_arrow, success, warn};

/// Report validity, routing channel and account details.
pub fn cmd_session_show(session: &SessionState, json: bool) -> anyhow::Result<()> {
    if json {
        let report = serde_json::json!({
            "valid": session.is_valid(),
            "channel": session.channel(),
            "profile": session.profile(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if session.is_valid() {
        println!("{} Session is valid", success());
    } else {
        println!("{} No valid session; only public pages are available", warn());
    }
    println!("  {} Requests use the {} channel", dim_arrow(), channel(session.channel()));

    if let Some(profile) = session.profile() {
        if let Some(name) = &profile.name {
            println!("  {} Account: {}", dim_arrow(), style(name).bold());
        }
        if let Some(email) = &profile.email {
            println!("  {} Email: {}", dim_arrow(), email);
        }
        if let Some(handle) = &profile.channel_handle {
            println!("  {} Channel: {}", dim_arrow(), handle);
        }
        if profile.uses_advanced_token {
            println!("  {} Authenticated with an advanced token", dim_arrow());
        }
    }

    Ok(())
}

/// Clear every credential and rewrite the session file.
pub fn cmd_session_clear(session: &mut SessionState, path: Option<&Path>) -> anyhow::Result<()> {
    session.clear();

    let Some(path) = path else {
        println!("{} No session file location; nothing to clear", warn());
        return Ok(());
    };
    if !path.exists() {
        println!("{} No session file at {}", warn(), path.display());
        return Ok(());
    }

    std::fs::write(path, serde_json::to_string_pretty(session)?)
        .map_err(|e| anyhow::anyhow!("Failed to write session file {}: {}", path.display(), e))?;
    println!("{} Cleared session at {}", success(), path.display());
    Ok(())
}
