//! Encoding from task snapshots to iCalendar documents.
//!
//! One task becomes one `VEVENT` inside a `VCALENDAR` envelope. Field order
//! is fixed.

use chrono::{DateTime, NaiveDate, Utc};

use crate::sync::types::ResourceId;
use crate::task::{Task, TaskId};

/// Product identifier written into every document.
pub const PRODUCT_ID: &str = "-//taskdav//Task Calendar Sync//EN";

const CRLF: &str = "\r\n";
/// Maximum content line length in octets before folding.
const LINE_LIMIT: usize = 75;

/// Encoding error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("task {0} has no scheduled time, due time, or due date")]
    Unscheduled(TaskId),

    /// Start plus duration falls outside the representable date range.
    #[error("task {0} ends outside the supported date range")]
    OutOfRange(TaskId),
}

/// When the event happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTiming {
    /// Absolute UTC interval.
    Timed {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// Whole calendar day, no timezone attached.
    AllDay(NaiveDate),
}

/// A calendar event ready to be pushed.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteEvent {
    pub resource_id: ResourceId,
    pub timing: EventTiming,
    pub summary: String,
    pub description: Option<String>,
    pub stamped_at: DateTime<Utc>,
}

/// Build the calendar event for a task.
///
/// Only `now` varies between calls for the same task; it becomes `DTSTAMP`.
///
/// # Errors
///
/// Returns [`EncodeError::Unscheduled`] for tasks without any timing field
/// and [`EncodeError::OutOfRange`] when the end instant overflows.
pub fn encode(task: &Task, now: DateTime<Utc>) -> Result<RemoteEvent, EncodeError> {
    let timing = if let Some(start) = task.start_instant() {
        let end = start
            .checked_add_signed(task.duration_or_default())
            .ok_or_else(|| EncodeError::OutOfRange(task.id.clone()))?;
        EventTiming::Timed { start, end }
    } else if let Some(day) = task.due_date_only {
        EventTiming::AllDay(day)
    } else {
        return Err(EncodeError::Unscheduled(task.id.clone()));
    };

    Ok(RemoteEvent {
        resource_id: ResourceId::for_task(&task.id),
        timing,
        summary: task.title.clone(),
        description: task
            .notes
            .as_ref()
            .filter(|notes| !notes.trim().is_empty())
            .cloned(),
        stamped_at: now,
    })
}

impl RemoteEvent {
    /// Render the full `.ics` document, CRLF-terminated.
    pub fn to_document(&self) -> String {
        let mut lines = vec![
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            format!("PRODID:{PRODUCT_ID}"),
            "BEGIN:VEVENT".to_string(),
            format!("UID:{}", self.resource_id),
            format!("DTSTAMP:{}", format_instant(self.stamped_at)),
        ];

        match self.timing {
            EventTiming::Timed { start, end } => {
                lines.push(format!("DTSTART:{}", format_instant(start)));
                lines.push(format!("DTEND:{}", format_instant(end)));
            }
            EventTiming::AllDay(day) => {
                // DTEND is exclusive for DATE values.
                let next = day.succ_opt().unwrap_or(day);
                lines.push(format!("DTSTART;VALUE=DATE:{}", format_date(day)));
                lines.push(format!("DTEND;VALUE=DATE:{}", format_date(next)));
            }
        }

        lines.push(format!("SUMMARY:{}", escape_text(&self.summary)));
        if let Some(description) = &self.description {
            lines.push(format!("DESCRIPTION:{}", escape_text(description)));
        }
        lines.push("STATUS:CONFIRMED".to_string());
        lines.push("TRANSP:OPAQUE".to_string());
        lines.push("END:VEVENT".to_string());
        lines.push("END:VCALENDAR".to_string());

        let mut document = String::new();
        for line in &lines {
            document.push_str(&fold_line(line));
            document.push_str(CRLF);
        }
        document
    }
}

fn format_instant(at: DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H%M%SZ").to_string()
}

fn format_date(day: NaiveDate) -> String {
    day.format("%Y%m%d").to_string()
}

/// Escape a TEXT value: backslash, semicolon, comma and newlines.
///
/// `\r\n` and a lone `\r` both become a single escaped newline.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\\n");
            }
            c => out.push(c),
        }
    }
    out
}

/// Fold a content line at 75 octets without splitting a UTF-8 sequence.
fn fold_line(line: &str) -> String {
    if line.len() <= LINE_LIMIT {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + 3 * (line.len() / LINE_LIMIT + 1));
    let mut budget = LINE_LIMIT;
    let mut used = 0;
    for c in line.chars() {
        let width = c.len_utf8();
        if used + width > budget {
            out.push_str(CRLF);
            out.push(' ');
            // Continuation lines spend one octet on the leading space.
            budget = LINE_LIMIT - 1;
            used = 0;
        }
        out.push(c);
        used += width;
    }
    out
}
