//! Human-readable output for passes, consumption outcomes, and audit events

use farepass_api::{ConsumeResult, PassInfo};
use farepass_core::{ConsumeOutcome, PassEvent};
use farepass_store::{AuditEvent, AuditEventType};
use farepass_util::{format_date, format_datetime_full};
use std::io::{self, Write};

/// One-line summary of a pass
pub fn describe_pass(info: &PassInfo) -> String {
    let mut line = format!(
        "{}  {:<20} {:<14} {:<9} trips: {}",
        info.pass_id,
        info.owner,
        info.kind_tag.to_string(),
        info.status.to_string(),
        info.remaining_trips
    );
    if let Some(expires_at) = info.expires_at {
        line.push_str(&format!("  valid until {}", format_date(&expires_at)));
    }
    line
}

/// Message shown to the rider after a consumption attempt
///
/// Time-bounded passes report their expiration date instead of a trip count.
pub fn consume_message(info: &PassInfo, result: &ConsumeResult) -> String {
    match (result, info.expires_at) {
        (ConsumeResult::Consumed(_), Some(expires_at)) => {
            format!("Trip consumed, valid until {}", format_date(&expires_at))
        }
        _ => result.to_string(),
    }
}

/// Write the outcome of a consumption attempt, including any expiry transition
pub fn write_consume(
    out: &mut impl Write,
    info: &PassInfo,
    outcome: &ConsumeOutcome,
) -> io::Result<()> {
    writeln!(out, "{}: {}", info.pass_id, consume_message(info, &outcome.result))?;
    for event in &outcome.events {
        if let PassEvent::Expired {
            pass_id,
            expired_at,
        } = event
        {
            writeln!(
                out,
                "{}: deactivated, expired at {}",
                pass_id,
                format_datetime_full(expired_at)
            )?;
        }
    }
    Ok(())
}

/// Message for an activate/deactivate result
pub fn status_message(event: &PassEvent) -> Option<String> {
    match event {
        PassEvent::StatusChanged {
            pass_id,
            status,
            changed: true,
        } => Some(format!("{} is now {}", pass_id, status)),
        PassEvent::StatusChanged {
            pass_id,
            status,
            changed: false,
        } => Some(format!("{} was already {}", pass_id, status)),
        _ => None,
    }
}

/// One-line summary of an audit event
pub fn describe_audit(event: &AuditEvent) -> String {
    let what = match &event.event {
        AuditEventType::CatalogLoaded { pass_count } => {
            format!("catalog issued ({} passes)", pass_count)
        }
        AuditEventType::PassIssued {
            pass_id,
            owner,
            kind,
        } => format!("{} issued to {} ({})", pass_id, owner, kind),
        AuditEventType::TripConsumed { pass_id, remaining } => {
            format!("{} trip consumed, {} remaining", pass_id, remaining)
        }
        AuditEventType::TripDenied { pass_id, reason } => {
            format!("{} trip denied: {}", pass_id, reason)
        }
        AuditEventType::PassExpired {
            pass_id,
            expired_at,
        } => format!("{} expired (valid until {})", pass_id, format_date(expired_at)),
        AuditEventType::PassActivated { pass_id, changed } => {
            format!("{} activated{}", pass_id, unchanged_suffix(*changed))
        }
        AuditEventType::PassDeactivated { pass_id, changed } => {
            format!("{} deactivated{}", pass_id, unchanged_suffix(*changed))
        }
    };

    format!(
        "#{:<5} {}  {}",
        event.id,
        format_datetime_full(&event.timestamp),
        what
    )
}

fn unchanged_suffix(changed: bool) -> &'static str {
    if changed { "" } else { " (no change)" }
}
