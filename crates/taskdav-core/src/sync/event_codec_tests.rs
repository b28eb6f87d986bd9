//! Tests for event_codec module.

#[cfg(test)]
mod tests {
    use super::super::event_codec::*;
    use crate::sync::types::ResourceId;
    use crate::task::Task;
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    fn lines(document: &str) -> Vec<&str> {
        document.split("\r\n").filter(|l| !l.is_empty()).collect()
    }

    #[test]
    fn timed_task_defaults_to_one_hour() {
        let start = Utc.with_ymd_and_hms(2026, 1, 3, 9, 30, 0).unwrap();
        let event = encode(&Task::new("t1", "Standup").scheduled(start), stamp()).unwrap();

        match event.timing {
            EventTiming::Timed { start: s, end } => {
                assert_eq!(s, start);
                assert_eq!(end - s, Duration::hours(1));
            }
            other => panic!("expected timed event, got {other:?}"),
        }
    }

    #[test]
    fn timed_task_uses_estimate() {
        let start = Utc.with_ymd_and_hms(2026, 1, 3, 9, 0, 0).unwrap();
        let task = Task::new("t1", "Deep work")
            .scheduled(start)
            .estimated(Duration::minutes(150));
        let event = encode(&task, stamp()).unwrap();

        let EventTiming::Timed { start: s, end } = event.timing else {
            panic!("expected timed event");
        };
        assert_eq!(end - s, Duration::minutes(150));

        let doc = event.to_document();
        assert!(doc.contains("DTSTART:20260103T090000Z\r\n"));
        assert!(doc.contains("DTEND:20260103T113000Z\r\n"));
    }

    #[test]
    fn due_time_is_used_when_not_scheduled() {
        let due = Utc.with_ymd_and_hms(2026, 3, 1, 17, 0, 0).unwrap();
        let event = encode(&Task::new("t1", "Submit").due(due), stamp()).unwrap();
        assert_eq!(
            event.timing,
            EventTiming::Timed {
                start: due,
                end: due + Duration::hours(1)
            }
        );
    }

    #[test]
    fn date_only_task_becomes_all_day_event() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 3).unwrap();
        let event = encode(&Task::new("t1", "Birthday").due_on(day), stamp()).unwrap();
        assert_eq!(event.timing, EventTiming::AllDay(day));

        let doc = event.to_document();
        assert!(doc.contains("DTSTART;VALUE=DATE:20260103\r\n"));
        assert!(doc.contains("DTEND;VALUE=DATE:20260104\r\n"));
        for line in lines(&doc).into_iter().filter(|l| l.contains(";VALUE=DATE:")) {
            let value = line.rsplit(':').next().unwrap();
            assert_eq!(value.len(), 8, "date token carries a time: {line}");
        }
    }

    #[test]
    fn timed_fields_win_over_date_only() {
        let start = Utc.with_ymd_and_hms(2026, 1, 3, 9, 0, 0).unwrap();
        let task = Task::new("t1", "x")
            .scheduled(start)
            .due_on(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert!(matches!(
            encode(&task, stamp()).unwrap().timing,
            EventTiming::Timed { .. }
        ));
    }

    #[test]
    fn unscheduled_task_is_rejected() {
        let err = encode(&Task::new("t1", "x"), stamp()).unwrap_err();
        assert_eq!(err, EncodeError::Unscheduled("t1".into()));
    }

    #[test]
    fn overflowing_end_is_rejected() {
        let start = Utc.with_ymd_and_hms(2026, 1, 3, 9, 0, 0).unwrap();
        let task = Task::new("t1", "x")
            .scheduled(start)
            .estimated(Duration::milliseconds(9_000_000_000_000_000));
        assert_eq!(
            encode(&task, stamp()).unwrap_err(),
            EncodeError::OutOfRange("t1".into())
        );

        let last = DateTime::<Utc>::MAX_UTC;
        let task = Task::new("t2", "x").due(last);
        assert_eq!(
            encode(&task, stamp()).unwrap_err(),
            EncodeError::OutOfRange("t2".into())
        );
    }

    #[test]
    fn resource_id_is_stable_across_encodes() {
        let task = Task::new("abc", "x").due_on(NaiveDate::from_ymd_opt(2026, 1, 3).unwrap());
        let first = encode(&task, stamp()).unwrap();
        let second = encode(&task, stamp() + Duration::days(3)).unwrap();
        assert_eq!(first.resource_id, ResourceId::new("sp-task-abc"));
        assert_eq!(first.resource_id, second.resource_id);
        assert_ne!(first.stamped_at, second.stamped_at);
    }

    #[test]
    fn escapes_reserved_characters() {
        assert_eq!(
            escape_text("a\\b;c,d\ne"),
            "a\\\\b\\;c\\,d\\ne"
        );
        assert_eq!(escape_text("x\r\ny\rz"), "x\\ny\\nz");
        assert_eq!(escape_text("plain text"), "plain text");
    }

    #[test]
    fn description_is_escaped_in_document() {
        let task = Task::new("t1", "Buy milk, eggs; bread")
            .due_on(NaiveDate::from_ymd_opt(2026, 1, 3).unwrap())
            .with_notes("C:\\shop; aisle 3, left\nthen checkout");
        let doc = encode(&task, stamp()).unwrap().to_document();

        assert!(doc.contains("SUMMARY:Buy milk\\, eggs\\; bread\r\n"));
        assert!(doc.contains("DESCRIPTION:C:\\\\shop\\; aisle 3\\, left\\nthen checkout\r\n"));
    }

    #[test]
    fn blank_notes_omit_description() {
        let task = Task::new("t1", "x")
            .due_on(NaiveDate::from_ymd_opt(2026, 1, 3).unwrap())
            .with_notes("   ");
        let doc = encode(&task, stamp()).unwrap().to_document();
        assert!(!doc.contains("DESCRIPTION"));
    }

    #[test]
    fn document_field_order_is_fixed() {
        let start = Utc.with_ymd_and_hms(2026, 1, 3, 9, 0, 0).unwrap();
        let task = Task::new("t1", "Review").scheduled(start).with_notes("notes");
        let doc = encode(&task, stamp()).unwrap().to_document();

        assert!(doc.ends_with("END:VCALENDAR\r\n"));
        assert!(!doc.replace("\r\n", "").contains('\n'));
        assert_eq!(
            lines(&doc),
            vec![
                "BEGIN:VCALENDAR",
                "VERSION:2.0",
                "PRODID:-//taskdav//Task Calendar Sync//EN",
                "BEGIN:VEVENT",
                "UID:sp-task-t1",
                "DTSTAMP:20260101T120000Z",
                "DTSTART:20260103T090000Z",
                "DTEND:20260103T100000Z",
                "SUMMARY:Review",
                "DESCRIPTION:notes",
                "STATUS:CONFIRMED",
                "TRANSP:OPAQUE",
                "END:VEVENT",
                "END:VCALENDAR",
            ]
        );
    }

    #[test]
    fn long_lines_are_folded_on_char_boundaries() {
        let title = "é".repeat(60);
        let task = Task::new("t1", title.clone()).due_on(NaiveDate::from_ymd_opt(2026, 1, 3).unwrap());
        let doc = encode(&task, stamp()).unwrap().to_document();

        for line in doc.split("\r\n") {
            assert!(line.len() <= 75, "line too long: {} octets", line.len());
        }
        let unfolded = doc.replace("\r\n ", "");
        assert!(unfolded.contains(&format!("SUMMARY:{title}\r\n")));
    }
}
