use super::*;
use nudge_core::test_support::{idle_record, running_record};

const HOUR_MS: u64 = 60 * 60 * 1000;
const NOW_MS: u64 = 100 * HOUR_MS;

fn hours(h: u64) -> Duration {
    Duration::from_secs(h * 3600)
}

fn timers(record: Option<&TicketRecord>) -> Vec<(TimerId, Schedule)> {
    countdown_timers(&EscalationPolicy::default(), &TicketId::new("t-1"), record, NOW_MS)
}

#[test]
fn missing_idle_and_escalated_records_need_no_timers() {
    let mut escalated = running_record("t-1", "u-1", NOW_MS - HOUR_MS, 0);
    escalated.record_alert(NOW_MS);

    assert!(timers(None).is_empty());
    assert!(timers(Some(&idle_record("t-1", "u-1"))).is_empty());
    assert!(timers(Some(&escalated)).is_empty());
}

#[test]
fn running_record_keeps_its_original_deadlines() {
    let record = running_record("t-1", "u-1", NOW_MS - 7 * HOUR_MS, 1);
    let ticket = TicketId::new("t-1");

    assert_eq!(
        timers(Some(&record)),
        vec![
            (
                TimerId::reminder(&ticket),
                Schedule::Every {
                    first: hours(5),
                    period: hours(6),
                },
            ),
            (TimerId::staff_alert(&ticket), Schedule::once(hours(17))),
        ]
    );
}

#[test]
fn slot_within_tolerance_fires_immediately() {
    let record = running_record("t-1", "u-1", NOW_MS - 6 * HOUR_MS + 100, 0);

    let timers = timers(Some(&record));

    assert_eq!(timers[0].1.first_delay(), Duration::ZERO);
}

#[test]
fn overdue_alert_fires_immediately() {
    let record = running_record("t-1", "u-1", NOW_MS - 25 * HOUR_MS, 3);
    let ticket = TicketId::new("t-1");

    assert_eq!(
        timers(Some(&record)),
        vec![(TimerId::staff_alert(&ticket), Schedule::once(Duration::ZERO))]
    );
}
