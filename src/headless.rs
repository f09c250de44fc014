// Headless commands
//
// Plain-text renditions of what the panel shows, for `friends`, `send`,
// `sync` and `stats`. Rendering is kept apart from the network calls so the
// output can be checked in tests.

use crate::game::{PlayerId, Timestamp};
use crate::ledger::{LogAggregates, RunMode, RunReport};
use crate::session::roster::FriendRoster;
use crate::session::{format_remaining, now, Session};
use anyhow::{Context, Result};
use std::fmt::Write;

/// Friends sorted by readiness with what each one sent
pub fn render_friends(
    roster: &FriendRoster,
    logs: &LogAggregates,
    now: Timestamp,
    cooldown_secs: i64,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>10}  {:<24} {:>8} {:>8}", "ID", "NAME", "SEND", "TOTAL");
    for (friend, remaining) in roster.by_readiness(now, cooldown_secs) {
        let status = if remaining == 0 {
            "ready".to_string()
        } else {
            format_remaining(remaining)
        };
        let _ = writeln!(
            out,
            "{:>10}  {:<24} {:>8} {:>8}",
            friend.player_id,
            friend.name,
            status,
            logs.player(friend.player_id).total
        );
    }
    out
}

/// Totals per category, then per friend
pub fn render_stats(roster: &FriendRoster, logs: &LogAggregates) -> String {
    let mut out = String::new();
    let event = logs.metadata.ses_key.as_deref().unwrap_or("-");
    let _ = writeln!(out, "Event: {}", event);
    let _ = writeln!(out, "Total received: {}", logs.total_received());
    let _ = writeln!(out);

    let _ = writeln!(out, "By category:");
    for (kind, value) in &logs.drop_type_logs {
        let _ = writeln!(out, "  {:<20} {:>8}", kind, value);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "By friend:");
    let mut senders: Vec<(PlayerId, i64, usize)> = logs
        .player_logs
        .iter()
        .map(|(id, entry)| (*id, entry.total, entry.frequency.len()))
        .collect();
    senders.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    for (id, total, times) in senders {
        let name = roster
            .get(id)
            .map(|f| f.name.clone())
            .unwrap_or_else(|| format!("#{}", id));
        let _ = writeln!(out, "  {:<20} {:>8} ({} times)", name, total, times);
    }
    out
}

pub async fn friends(session: &Session) -> Result<()> {
    session
        .sync_friends()
        .await
        .context("Could not load the friend list")?;
    let logs = session.stored_logs()?;
    print!(
        "{}",
        render_friends(
            &session.roster_snapshot(),
            &logs,
            now(),
            session.cooldown_secs()
        )
    );
    Ok(())
}

pub async fn send(session: &Session, player_id: PlayerId) -> Result<()> {
    session
        .sync_friends()
        .await
        .context("Could not load the friend list")?;

    let remaining = session.time_until_ready(player_id);
    if remaining > 0 {
        println!(
            "Player {} can receive again in {}",
            player_id,
            format_remaining(remaining)
        );
        return Ok(());
    }

    let msg = session.send_currency(player_id).await?;
    println!("{}", if msg.is_empty() { "Currency sent" } else { msg.as_str() });
    Ok(())
}

pub async fn sync(session: &Session, force: bool) -> Result<RunReport> {
    if force {
        session.mark_new_activity();
    }
    let (logs, report) = session.process_logs(RunMode::Interactive).await?;
    println!(
        "Fetched {} page(s), {} new entries, {} received in total",
        report.pages_fetched,
        report.entries_ingested,
        logs.total_received()
    );
    Ok(report)
}

/// What the panel does on open, without the panel: refresh friends, catch
/// up on logs in background mode and print the roster
pub async fn catch_up(session: &Session) -> Result<()> {
    session
        .sync_friends()
        .await
        .context("Could not load the friend list")?;
    let (logs, report) = session.process_logs(RunMode::Background).await?;
    tracing::info!(
        "Caught up: {} page(s), {} new entries",
        report.pages_fetched,
        report.entries_ingested
    );
    print!(
        "{}",
        render_friends(
            &session.roster_snapshot(),
            &logs,
            now(),
            session.cooldown_secs()
        )
    );
    Ok(())
}

pub async fn stats(session: &Session) -> Result<()> {
    if let Err(e) = session.sync_friends().await {
        tracing::warn!("Friend names unavailable: {}", e);
    }
    let logs = session.stored_logs()?;
    print!("{}", render_stats(&session.roster_snapshot(), &logs));
    Ok(())
}
