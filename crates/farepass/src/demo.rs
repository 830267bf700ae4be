//! Scripted walkthrough against an in-memory registry
//!
//! Issues one pass of each kind and exercises them the way a rider would:
//! two unlimited trips, three time-bounded trips, twelve attempts on a
//! ten-trip pass, a deactivation, and finally a trip after expiry.

use crate::report::{describe_pass, write_consume};
use anyhow::{Context, Result};
use chrono::{Duration, NaiveDateTime};
use farepass_api::PassSpec;
use farepass_core::PassRegistry;
use farepass_store::{SqliteStore, Store};
use farepass_util::{ManualClock, PassId, format_date};
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

/// How long the demo's time-bounded pass stays valid
const TIME_BOUNDED_VALIDITY_DAYS: i64 = 365 * 2;

const COUNT_BOUNDED_TRIPS: i64 = 10;

pub fn run(out: &mut impl Write, start: NaiveDateTime) -> Result<()> {
    let clock = Arc::new(ManualClock::new(start));
    let store: Arc<dyn Store> =
        Arc::new(SqliteStore::in_memory().context("Failed to open in-memory store")?);
    let mut registry = PassRegistry::new(clock.clone(), store);

    debug!(start = %start, "Running demo");

    let expires_on = format_date(&(start + Duration::days(TIME_BOUNDED_VALIDITY_DAYS)));
    let unlimited = registry.issue(&PassSpec::unlimited("Ivan Ivanov"))?;
    let time_bounded = registry.issue(&PassSpec::time_bounded("Petr Petrov", expires_on))?;
    let count_bounded =
        registry.issue(&PassSpec::count_bounded("Sidor Sidorov", COUNT_BOUNDED_TRIPS))?;

    section(out, "Unlimited pass")?;
    consume_times(&mut registry, out, unlimited, 2)?;

    section(out, "Time-bounded pass")?;
    consume_times(&mut registry, out, time_bounded, 3)?;

    section(out, "Count-bounded pass: 12 attempts on 10 trips")?;
    consume_times(&mut registry, out, count_bounded, 12)?;

    section(out, "Deactivated count-bounded pass")?;
    registry.deactivate(count_bounded)?;
    consume_times(&mut registry, out, count_bounded, 1)?;

    let expires_at = registry
        .info(time_bounded)?
        .expires_at
        .context("time-bounded pass has no expiration")?;
    clock.set(expires_at + Duration::seconds(1));

    section(out, "Time-bounded pass after its expiration")?;
    consume_times(&mut registry, out, time_bounded, 2)?;

    section(out, "Final state")?;
    for info in registry.list() {
        writeln!(out, "{}", describe_pass(&info))?;
    }

    Ok(())
}

fn section(out: &mut impl Write, title: &str) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "== {} ==", title)?;
    Ok(())
}

fn consume_times(
    registry: &mut PassRegistry,
    out: &mut impl Write,
    pass_id: PassId,
    times: usize,
) -> Result<()> {
    for _ in 0..times {
        let outcome = registry.consume(pass_id)?;
        let info = registry.info(pass_id)?;
        write_consume(out, &info, &outcome)?;
    }
    Ok(())
}
