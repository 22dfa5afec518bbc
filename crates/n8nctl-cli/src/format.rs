//! Human-readable rendering of server objects.

use chrono::{DateTime, Utc};
use n8nctl_api::types::{Execution, Workflow};

pub fn status_icon(status: &str) -> &'static str {
    match status {
        "success" => "✓",
        "error" => "✗",
        "waiting" => "⏳",
        "running" => "▶",
        _ => "?",
    }
}

/// One-line workflow summary: `[id] ✓ name (N nodes)`
pub fn workflow_line(workflow: &Workflow) -> String {
    let active = if workflow.active { "✓" } else { "✗" };
    format!(
        "[{}] {} {} ({} nodes)",
        workflow.id.as_deref().unwrap_or("-"),
        active,
        workflow.name,
        workflow.nodes.len()
    )
}

/// One fixed-width table row for an execution listing.
pub fn execution_row(execution: &Execution) -> String {
    let status = execution.status.as_deref().unwrap_or("unknown");
    format!(
        "{:<10} {} {:<8} {:<12} {:<20} {:<10}",
        execution.id,
        status_icon(status),
        status,
        execution.workflow_id.as_deref().unwrap_or("N/A"),
        timestamp(execution.started_at.as_deref()),
        duration(
            execution.started_at.as_deref(),
            execution.stopped_at.as_deref()
        ),
    )
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Server timestamps rendered as `YYYY-MM-DD HH:MM:SS`, `N/A` when absent.
pub fn timestamp(value: Option<&str>) -> String {
    match value {
        Some(raw) => match parse_timestamp(raw) {
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            // Not RFC 3339; show what the server sent, lightly trimmed
            None => raw.chars().take(19).collect::<String>().replace('T', " "),
        },
        None => "N/A".to_string(),
    }
}

pub fn duration(start: Option<&str>, stop: Option<&str>) -> String {
    let (Some(start), Some(stop)) = (
        start.and_then(parse_timestamp),
        stop.and_then(parse_timestamp),
    ) else {
        return "N/A".to_string();
    };
    let millis = (stop - start).num_milliseconds();
    if millis < 0 {
        return "N/A".to_string();
    }
    format_millis(millis)
}

pub fn format_millis(millis: i64) -> String {
    if millis < 1000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        format!("{:.1}s", millis as f64 / 1000.0)
    } else {
        let secs = millis / 1000;
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn execution(started: Option<&str>, stopped: Option<&str>) -> Execution {
        Execution {
            id: "77".to_string(),
            workflow_id: Some("w1".to_string()),
            status: Some("success".to_string()),
            mode: None,
            finished: true,
            started_at: started.map(str::to_string),
            stopped_at: stopped.map(str::to_string),
            data: None,
            extra: Map::new(),
        }
    }

    #[test]
    fn test_status_icons() {
        assert_eq!(status_icon("success"), "✓");
        assert_eq!(status_icon("error"), "✗");
        assert_eq!(status_icon("waiting"), "⏳");
        assert_eq!(status_icon("running"), "▶");
        assert_eq!(status_icon("crashed"), "?");
    }

    #[test]
    fn test_workflow_line() {
        let workflow: Workflow = serde_json::from_str(
            r#"{"id": "w1", "name": "Demo", "active": true, "nodes": [{}, {}]}"#,
        )
        .unwrap();
        assert_eq!(workflow_line(&workflow), "[w1] ✓ Demo (2 nodes)");
    }

    #[test]
    fn test_timestamp_rendering() {
        assert_eq!(
            timestamp(Some("2024-05-01T12:34:56.000Z")),
            "2024-05-01 12:34:56"
        );
        assert_eq!(timestamp(None), "N/A");
        // Unparseable input falls back to trimmed pass-through
        assert_eq!(timestamp(Some("2024-05-01T12:34:56weird")), "2024-05-01 12:34:56");
    }

    #[test]
    fn test_duration_buckets() {
        assert_eq!(format_millis(250), "250ms");
        assert_eq!(format_millis(1500), "1.5s");
        assert_eq!(format_millis(61_000), "1m 1s");
        assert_eq!(format_millis(3_599_000), "59m 59s");
    }

    #[test]
    fn test_duration_from_timestamps() {
        assert_eq!(
            duration(
                Some("2024-05-01T12:00:00.000Z"),
                Some("2024-05-01T12:00:01.300Z")
            ),
            "1.3s"
        );
        assert_eq!(duration(Some("2024-05-01T12:00:00.000Z"), None), "N/A");
        assert_eq!(duration(None, None), "N/A");
    }

    #[test]
    fn test_execution_row_contains_fields() {
        let row = execution_row(&execution(
            Some("2024-05-01T12:00:00.000Z"),
            Some("2024-05-01T12:00:00.400Z"),
        ));
        assert!(row.starts_with("77"));
        assert!(row.contains("✓"));
        assert!(row.contains("success"));
        assert!(row.contains("w1"));
        assert!(row.contains("2024-05-01 12:00:00"));
        assert!(row.contains("400ms"));
    }
}
