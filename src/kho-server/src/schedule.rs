// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Wall-clock summary triggers (first pass + follow-up) in a fixed offset.

use std::sync::Arc;

use chrono::{DateTime, Days, FixedOffset, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use tokio::sync::watch;
use tokio::time;
use tracing::info;

use kho_core::Trigger;

use crate::context::BotContext;
use crate::dispatch::dispatch;
use crate::transport::ChatTransport;
use crate::wait_for_shutdown;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub first_pass: NaiveTime,
    pub follow_up: NaiveTime,
    pub utc_offset: FixedOffset,
}

impl Schedule {
    fn slots(&self) -> [(Trigger, NaiveTime); 2] {
        [
            (Trigger::FirstPass, self.first_pass),
            (Trigger::FollowUp, self.follow_up),
        ]
    }
}

fn localize(naive: NaiveDateTime, offset: FixedOffset) -> DateTime<FixedOffset> {
    let utc = naive - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
    DateTime::from_naive_utc_and_offset(utc, offset)
}

/// The soonest trigger strictly after `now`. Ties go to the first pass.
pub fn next_fire(now: DateTime<FixedOffset>, schedule: &Schedule) -> (Trigger, DateTime<FixedOffset>) {
    let local_now = now.with_timezone(&schedule.utc_offset);
    let today = local_now.date_naive();

    let mut best: Option<(Trigger, DateTime<FixedOffset>)> = None;
    for (trigger, time) in schedule.slots() {
        let mut at = localize(today.and_time(time), schedule.utc_offset);
        if at <= local_now {
            let tomorrow = today + Days::new(1);
            at = localize(tomorrow.and_time(time), schedule.utc_offset);
        }
        match best {
            Some((_, current)) if current <= at => {}
            _ => best = Some((trigger, at)),
        }
    }
    // slots() is never empty.
    best.unwrap_or((Trigger::FirstPass, local_now))
}

/// Run one trigger: compute under the lock, then dispatch without it.
pub async fn fire<T: ChatTransport>(ctx: &BotContext<T>, trigger: Trigger, at: DateTime<FixedOffset>) {
    let summary = ctx
        .tracker
        .lock()
        .await
        .run_trigger(trigger, at.naive_local());
    match summary {
        Some(summary) => {
            info!(
                "Running {} summary: {}/{} reported",
                trigger,
                summary.reported(),
                summary.total
            );
            dispatch(ctx.transport.as_ref(), &ctx.destinations, &summary.to_string()).await;
        }
        None => info!("Skipping {} summary: all sites reported at first pass", trigger),
    }
}

/// Start point for the next trigger search: the last trigger fired today,
/// so one that came due during a slow dispatch still fires (late).
pub fn resume_from(
    last_fired: Option<DateTime<FixedOffset>>,
    now: DateTime<FixedOffset>,
    schedule: &Schedule,
) -> DateTime<FixedOffset> {
    let now = now.with_timezone(&schedule.utc_offset);
    match last_fired {
        Some(last) if last.with_timezone(&schedule.utc_offset).date_naive() == now.date_naive() => {
            last
        }
        _ => now,
    }
}

pub async fn run_scheduler<T: ChatTransport>(
    ctx: Arc<BotContext<T>>,
    schedule: Schedule,
    shutdown_rx: watch::Receiver<bool>,
) {
    let mut last_fired: Option<DateTime<FixedOffset>> = None;
    loop {
        let now = Utc::now().with_timezone(&schedule.utc_offset);
        let (trigger, at) = next_fire(resume_from(last_fired, now, &schedule), &schedule);

        // Already due: fire straight away.
        let wait = (at - now).to_std().unwrap_or_default();
        if wait.is_zero() {
            info!("{} summary due at {} is overdue, firing now", trigger, at.format("%H:%M"));
        } else {
            info!("Next {} summary at {}", trigger, at.format("%d/%m/%Y %H:%M"));
        }

        tokio::select! {
            _ = time::sleep(wait) => {}
            _ = wait_for_shutdown(shutdown_rx.clone()) => return,
        }

        fire(&ctx, trigger, at).await;
        last_fired = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use kho_core::{ComplianceTracker, DatePolicy, Roster};

    use crate::transport::testing::RecordingTransport;

    fn offset() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).unwrap()
    }

    fn schedule() -> Schedule {
        Schedule {
            first_pass: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            follow_up: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            utc_offset: offset(),
        }
    }

    fn local(d: u32, h: u32, m: u32) -> DateTime<FixedOffset> {
        offset().with_ymd_and_hms(2026, 10, d, h, m, 0).unwrap()
    }

    #[test]
    fn test_next_fire_morning_is_first_pass_today() {
        assert_eq!(
            next_fire(local(16, 9, 0), &schedule()),
            (Trigger::FirstPass, local(16, 15, 0))
        );
    }

    #[test]
    fn test_next_fire_between_triggers_is_follow_up() {
        assert_eq!(
            next_fire(local(16, 15, 0), &schedule()),
            (Trigger::FollowUp, local(16, 17, 0))
        );
        assert_eq!(
            next_fire(local(16, 16, 59), &schedule()),
            (Trigger::FollowUp, local(16, 17, 0))
        );
    }

    #[test]
    fn test_next_fire_evening_rolls_to_tomorrow() {
        assert_eq!(
            next_fire(local(16, 17, 0), &schedule()),
            (Trigger::FirstPass, local(17, 15, 0))
        );
    }

    #[test]
    fn test_next_fire_converts_from_other_offset() {
        // 01:00 UTC is 08:00 in +07:00.
        let utc_now = Utc.with_ymd_and_hms(2026, 10, 16, 1, 0, 0).unwrap().fixed_offset();
        let (trigger, at) = next_fire(utc_now, &schedule());
        assert_eq!(trigger, Trigger::FirstPass);
        assert_eq!(at, local(16, 15, 0));
        assert_eq!(at.naive_local().time(), NaiveTime::from_hms_opt(15, 0, 0).unwrap());
    }

    #[test]
    fn test_trigger_due_during_slow_dispatch_is_not_skipped() {
        let tight = Schedule {
            first_pass: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            follow_up: NaiveTime::from_hms_opt(15, 1, 0).unwrap(),
            utc_offset: offset(),
        };
        // The 15:00 dispatch finished at 15:02, after the follow-up was due.
        let start = resume_from(Some(local(16, 15, 0)), local(16, 15, 2), &tight);
        let (trigger, at) = next_fire(start, &tight);
        assert_eq!(trigger, Trigger::FollowUp);
        assert_eq!(at, local(16, 15, 1));
        assert!(at < local(16, 15, 2));

        // Once the follow-up has fired, the next one is tomorrow's first pass.
        let start = resume_from(Some(local(16, 15, 1)), local(16, 15, 3), &tight);
        assert_eq!(next_fire(start, &tight), (Trigger::FirstPass, local(17, 15, 0)));
    }

    #[test]
    fn test_resume_from_ignores_previous_day() {
        let start = resume_from(Some(local(15, 17, 0)), local(16, 9, 0), &schedule());
        assert_eq!(start, local(16, 9, 0));
        assert_eq!(resume_from(None, local(16, 9, 0), &schedule()), local(16, 9, 0));
        assert_eq!(
            next_fire(start, &schedule()),
            (Trigger::FirstPass, local(16, 15, 0))
        );
    }

    fn context(transport: RecordingTransport) -> BotContext<RecordingTransport> {
        let roster = Roster::from_entries([("21000001", "Kho A")]);
        BotContext::new(
            ComplianceTracker::new(roster, DatePolicy::Ignore),
            Arc::new(transport),
            vec![-1, -2],
            offset(),
        )
    }

    #[tokio::test]
    async fn test_fire_follow_up_suppressed_after_complete_first_pass() {
        let ctx = context(RecordingTransport::default());
        ctx.tracker
            .lock()
            .await
            .handle_report("21000001 - Kho A\n1. a\n2. b\n3. c\n4. d", local(16, 8, 0).date_naive());

        fire(&ctx, Trigger::FirstPass, local(16, 15, 0)).await;
        assert_eq!(ctx.transport.sent().len(), 2);
        assert!(ctx.transport.sent_to(-1)[0].contains("15h00"));

        fire(&ctx, Trigger::FollowUp, local(16, 17, 0)).await;
        assert_eq!(ctx.transport.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_fire_follow_up_repeats_when_incomplete() {
        let ctx = context(RecordingTransport::failing_for(&[-1]));
        fire(&ctx, Trigger::FirstPass, local(16, 15, 0)).await;
        fire(&ctx, Trigger::FollowUp, local(16, 17, 0)).await;
        let sent = ctx.transport.sent_to(-2);
        assert_eq!(sent.len(), 2);
        assert!(sent[1].contains("NHẮC LẠI"));
        assert!(sent[1].contains("- 21000001 - Kho A"));
    }
}
