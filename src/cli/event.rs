//! Event command - replay a webhook delivery

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check, cross};
use anstream::println;
use merge_me::bot::MergeBot;
use merge_me::error::Result;
use merge_me::events::Event;
use std::io::Read;
use std::path::Path;

/// Read the payload from a file, or stdin for `None` / `-`
fn read_payload(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) if path != Path::new("-") => Ok(std::fs::read(path)?),
        _ => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Run the event command
pub async fn run_event(ctx: CommandContext, name: &str, payload: Option<&Path>) -> Result<()> {
    let payload = read_payload(payload)?;
    let event = Event::from_webhook(name, &payload)?;
    let event_name = event.name();

    let bot = MergeBot::new(ctx.platform, ctx.settings);
    match bot.handle_event(&event).await? {
        None => println!("{} {}", event_name.accent(), "ignored".muted()),
        Some(true) => println!("{} {}: PR merged", check(), event_name.accent()),
        Some(false) => println!("{} {}: PR not merged", cross(), event_name.accent()),
    }

    Ok(())
}
