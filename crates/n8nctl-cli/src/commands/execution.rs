//! Execution commands - listing, inspection, debugging, statistics.

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use clap::Subcommand;
use n8nctl_api::types::Execution;
use n8nctl_api::{Client, ExecutionFilter};
use serde_json::Value;

use crate::commands::fail;
use crate::format;

#[derive(Subcommand)]
pub enum ExecutionAction {
    /// List executions
    List {
        /// Filter by workflow ID
        #[arg(short, long)]
        workflow: Option<String>,

        /// Filter by status
        #[arg(short, long, value_parser = ["success", "error", "waiting"])]
        status: Option<String>,

        /// Limit results
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },

    /// Show an execution
    Get {
        /// Execution ID
        id: String,
        /// Skip node-level data
        #[arg(long)]
        no_data: bool,
    },

    /// Detailed per-node report for an execution
    Debug {
        /// Execution ID
        id: String,
        /// Include first-item output samples and stack traces
        #[arg(long)]
        data: bool,
    },

    /// Recent failed executions
    Errors {
        /// Limit results
        #[arg(short, long, default_value = "10")]
        limit: u32,
    },

    /// Aggregate statistics over recent executions
    Stats {
        /// Filter by workflow ID
        #[arg(short, long)]
        workflow: Option<String>,
    },

    /// Delete an execution
    Delete {
        /// Execution ID
        id: String,
    },

    /// Poll for new executions
    Watch {
        /// Filter by workflow ID
        #[arg(short, long)]
        workflow: Option<String>,

        /// Poll interval in seconds
        #[arg(short, long, default_value = "5")]
        interval: u64,
    },
}

pub fn cmd_execution(client: &Client, action: ExecutionAction, json: bool) -> i32 {
    match action {
        ExecutionAction::List {
            workflow,
            status,
            limit,
        } => cmd_list(client, workflow, status, limit, json),
        ExecutionAction::Get { id, no_data } => cmd_get(client, &id, !no_data, json),
        ExecutionAction::Debug { id, data } => cmd_debug(client, &id, data, json),
        ExecutionAction::Errors { limit } => cmd_errors(client, limit, json),
        ExecutionAction::Stats { workflow } => cmd_stats(client, workflow, json),
        ExecutionAction::Delete { id } => cmd_delete(client, &id, json),
        ExecutionAction::Watch { workflow, interval } => {
            cmd_watch(client, workflow, interval, json)
        }
    }
}

fn cmd_list(
    client: &Client,
    workflow: Option<String>,
    status: Option<String>,
    limit: u32,
    json: bool,
) -> i32 {
    let filter = ExecutionFilter {
        workflow_id: workflow,
        status,
        limit: Some(limit),
        ..Default::default()
    };

    match client.list_executions(&filter) {
        Ok(page) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&page.data).unwrap());
            } else {
                println!(
                    "{:<10} {:<10} {:<12} {:<20} {:<10}",
                    "ID", "Status", "Workflow", "Started", "Duration"
                );
                println!("{}", "-".repeat(70));
                for execution in &page.data {
                    println!("{}", format::execution_row(execution));
                }
                println!("\nTotal: {} executions", page.data.len());
            }
            0
        }
        Err(e) => fail(e, json),
    }
}

fn cmd_get(client: &Client, id: &str, include_data: bool, json: bool) -> i32 {
    match client.get_execution(id, include_data) {
        Ok(execution) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&execution).unwrap());
            } else {
                print_summary(&execution);
                if let Some(error) = execution_error(&execution) {
                    println!("\n--- ERROR ---");
                    println!("Message: {}", error_message(error));
                }
            }
            0
        }
        Err(e) => fail(e, json),
    }
}

fn cmd_debug(client: &Client, id: &str, with_data: bool, json: bool) -> i32 {
    let execution = match client.get_execution(id, true) {
        Ok(execution) => execution,
        Err(e) => return fail(e, json),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&execution).unwrap());
        return 0;
    }

    println!("{}", "=".repeat(80));
    println!("EXECUTION DEBUG: {}", execution.id);
    println!("{}", "=".repeat(80));
    println!();
    print_summary(&execution);

    // Name lookup is best-effort; the execution may outlive its workflow
    if let Some(workflow_id) = &execution.workflow_id {
        if let Ok(workflow) = client.get_workflow(workflow_id) {
            println!("Workflow name: {}", workflow.name);
        }
    }

    if let Some(run_data) = result_data(&execution).and_then(|rd| rd.get("runData")) {
        if let Some(nodes) = run_data.as_object() {
            println!();
            println!("{}", "-".repeat(40));
            println!("NODE EXECUTION DETAILS");
            println!("{}", "-".repeat(40));

            // Object order is arbitrary; sort by node name for stable output
            let sorted: BTreeMap<_, _> = nodes.iter().collect();
            for (node_name, runs) in sorted {
                let Some(run) = runs.as_array().and_then(|r| r.first()) else {
                    continue;
                };
                let failed = run.get("error").is_some();
                let icon = if failed { "✗" } else { "✓" };
                let exec_time = run
                    .get("executionTime")
                    .and_then(Value::as_i64)
                    .unwrap_or(0);

                println!("\n{} {}", icon, node_name);
                println!("   Execution time: {}ms", exec_time);
                println!("   Items output: {}", items_output(run));

                if let Some(error) = run.get("error") {
                    println!("   ERROR: {}", error_message(error));
                }
                if with_data {
                    for (branch_index, sample) in output_samples(run) {
                        let rendered = serde_json::to_string(&sample).unwrap_or_default();
                        println!(
                            "   Output[{}] sample: {}",
                            branch_index,
                            truncate(&rendered, 200)
                        );
                    }
                }
            }
        }
    }

    if let Some(last_node) = result_data(&execution)
        .and_then(|rd| rd.get("lastNodeExecuted"))
        .and_then(Value::as_str)
    {
        println!("\nLast node executed: {}", last_node);
    }

    if let Some(error) = execution_error(&execution) {
        println!();
        println!("{}", "=".repeat(40));
        println!("ERROR DETAILS");
        println!("{}", "=".repeat(40));
        println!("Message: {}", error_message(error));
        if let Some(node) = error.get("node") {
            let name = node
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| node.to_string());
            println!("Node: {}", name);
        }
        if let Some(description) = error.get("description").and_then(Value::as_str) {
            println!("Description: {}", description);
        }
        if with_data {
            if let Some(stack) = error.get("stack").and_then(Value::as_str) {
                println!("\nStack trace:\n{}", stack);
            }
        }
    }

    0
}

fn cmd_errors(client: &Client, limit: u32, json: bool) -> i32 {
    let filter = ExecutionFilter {
        status: Some("error".to_string()),
        limit: Some(limit),
        ..Default::default()
    };
    let page = match client.list_executions(&filter) {
        Ok(page) => page,
        Err(e) => return fail(e, json),
    };

    if page.data.is_empty() {
        if json {
            println!("[]");
        } else {
            println!("No failed executions found");
        }
        return 0;
    }

    let mut detailed = Vec::new();
    for execution in &page.data {
        // One fetch per row: the list endpoint omits node data
        match client.get_execution(&execution.id, true) {
            Ok(full) => detailed.push(full),
            Err(e) => return fail(e, json),
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&detailed).unwrap());
        return 0;
    }

    println!("Recent failed executions (last {}):", limit);
    println!("{}", "-".repeat(80));
    for execution in &detailed {
        let last_node = result_data(execution)
            .and_then(|rd| rd.get("lastNodeExecuted"))
            .and_then(Value::as_str)
            .unwrap_or("N/A");
        let message = execution_error(execution)
            .map(error_message)
            .unwrap_or_else(|| "Unknown error".to_string());

        println!(
            "\n[{}] Workflow: {} | {}",
            execution.id,
            execution.workflow_id.as_deref().unwrap_or("N/A"),
            format::timestamp(execution.started_at.as_deref())
        );
        println!("  Last node: {}", last_node);
        println!("  Error: {}", truncate(&message, 100));
    }

    0
}

fn cmd_stats(client: &Client, workflow: Option<String>, json: bool) -> i32 {
    let filter = ExecutionFilter {
        workflow_id: workflow,
        limit: Some(100),
        ..Default::default()
    };
    let page = match client.list_executions(&filter) {
        Ok(page) => page,
        Err(e) => return fail(e, json),
    };

    if page.data.is_empty() {
        if json {
            println!("{}", serde_json::json!({ "total": 0 }));
        } else {
            println!("No executions found");
        }
        return 0;
    }

    let stats = compute_stats(&page.data);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "total": stats.total,
                "by_status": stats.by_status.iter().map(|(status, count)| {
                    serde_json::json!({ "status": status, "count": count })
                }).collect::<Vec<_>>(),
                "avg_duration_secs": stats.avg_duration_secs,
                "success_rate": stats.success_rate,
            }))
            .unwrap()
        );
    } else {
        println!("Execution statistics");
        println!("{}", "-".repeat(40));
        println!("Total executions: {}", stats.total);
        for (status, count) in &stats.by_status {
            let pct = *count as f64 / stats.total as f64 * 100.0;
            println!("  {}: {} ({:.1}%)", status, count, pct);
        }
        if let Some(avg) = stats.avg_duration_secs {
            println!("\nAverage duration: {:.2}s", avg);
        }
        if let Some(rate) = stats.success_rate {
            println!("Success rate: {:.1}%", rate);
        }
    }

    0
}

fn cmd_delete(client: &Client, id: &str, json: bool) -> i32 {
    match client.delete_execution(id) {
        Ok(_) => {
            if json {
                println!("{}", serde_json::json!({ "deleted": id }));
            } else {
                println!("Deleted execution {}", id);
            }
            0
        }
        Err(e) => fail(e, json),
    }
}

fn cmd_watch(client: &Client, workflow: Option<String>, interval: u64, json: bool) -> i32 {
    println!("Watching for executions... (Ctrl+C to stop)");
    println!("{}", "-".repeat(60));

    let filter = ExecutionFilter {
        workflow_id: workflow,
        limit: Some(10),
        ..Default::default()
    };
    let mut seen: HashSet<String> = HashSet::new();
    let mut first_batch = true;

    loop {
        let page = match client.list_executions(&filter) {
            Ok(page) => page,
            Err(e) => return fail(e, json),
        };

        // Oldest first, so new executions print in arrival order
        for execution in page.data.iter().rev() {
            if seen.insert(execution.id.clone()) && !first_batch {
                let status = execution.status.as_deref().unwrap_or("unknown");
                println!(
                    "[{}] {} execution {} - workflow {} - {}",
                    chrono::Local::now().format("%H:%M:%S"),
                    format::status_icon(status),
                    execution.id,
                    execution.workflow_id.as_deref().unwrap_or("N/A"),
                    status
                );
            }
        }
        first_batch = false;

        std::thread::sleep(Duration::from_secs(interval.max(1)));
    }
}

fn print_summary(execution: &Execution) {
    println!("Execution: {}", execution.id);
    println!(
        "Workflow:  {}",
        execution.workflow_id.as_deref().unwrap_or("N/A")
    );
    println!(
        "Status:    {}",
        execution.status.as_deref().unwrap_or("unknown")
    );
    println!("Mode:      {}", execution.mode.as_deref().unwrap_or("N/A"));
    println!(
        "Started:   {}",
        format::timestamp(execution.started_at.as_deref())
    );
    println!(
        "Stopped:   {}",
        format::timestamp(execution.stopped_at.as_deref())
    );
    println!(
        "Duration:  {}",
        format::duration(
            execution.started_at.as_deref(),
            execution.stopped_at.as_deref()
        )
    );
}

// Aggregates over one page of executions

struct ExecStats {
    total: usize,
    by_status: Vec<(String, usize)>,
    avg_duration_secs: Option<f64>,
    success_rate: Option<f64>,
}

fn compute_stats(executions: &[Execution]) -> ExecStats {
    let mut by_status: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_duration = 0.0;
    let mut with_duration = 0usize;

    for execution in executions {
        let status = execution.status.as_deref().unwrap_or("unknown").to_string();
        *by_status.entry(status).or_insert(0) += 1;

        if let (Some(start), Some(stop)) = (
            execution
                .started_at
                .as_deref()
                .and_then(format::parse_timestamp),
            execution
                .stopped_at
                .as_deref()
                .and_then(format::parse_timestamp),
        ) {
            let millis = (stop - start).num_milliseconds();
            if millis >= 0 {
                total_duration += millis as f64 / 1000.0;
                with_duration += 1;
            }
        }
    }

    let success = by_status.get("success").copied().unwrap_or(0);
    let error = by_status.get("error").copied().unwrap_or(0);
    let success_rate = (success + error > 0)
        .then(|| success as f64 / (success + error) as f64 * 100.0);
    let avg_duration_secs = (with_duration > 0).then(|| total_duration / with_duration as f64);

    ExecStats {
        total: executions.len(),
        by_status: by_status.into_iter().collect(),
        avg_duration_secs,
        success_rate,
    }
}

// Navigation into the server-owned execution data blob

fn result_data(execution: &Execution) -> Option<&Value> {
    execution.data.as_ref()?.get("resultData")
}

fn execution_error(execution: &Execution) -> Option<&Value> {
    result_data(execution)?.get("error")
}

fn error_message(error: &Value) -> String {
    error
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string())
}

/// Items across all main output branches of one node run.
fn items_output(run: &Value) -> usize {
    run.get("data")
        .and_then(|data| data.get("main"))
        .and_then(Value::as_array)
        .map(|branches| {
            branches
                .iter()
                .filter_map(Value::as_array)
                .map(Vec::len)
                .sum()
        })
        .unwrap_or(0)
}

/// First item of each non-empty main output branch.
fn output_samples(run: &Value) -> Vec<(usize, Value)> {
    run.get("data")
        .and_then(|data| data.get("main"))
        .and_then(Value::as_array)
        .map(|branches| {
            branches
                .iter()
                .enumerate()
                .filter_map(|(index, branch)| {
                    let first = branch.as_array()?.first()?;
                    Some((index, first.get("json").cloned().unwrap_or(Value::Null)))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn execution(status: &str, started: &str, stopped: &str) -> Execution {
        serde_json::from_value(json!({
            "id": "1",
            "status": status,
            "startedAt": started,
            "stoppedAt": stopped,
        }))
        .unwrap()
    }

    #[test]
    fn test_compute_stats() {
        let executions = vec![
            execution("success", "2024-05-01T12:00:00Z", "2024-05-01T12:00:02Z"),
            execution("success", "2024-05-01T12:01:00Z", "2024-05-01T12:01:04Z"),
            execution("error", "2024-05-01T12:02:00Z", "2024-05-01T12:02:00Z"),
        ];

        let stats = compute_stats(&executions);
        assert_eq!(stats.total, 3);
        assert_eq!(
            stats.by_status,
            vec![("error".to_string(), 1), ("success".to_string(), 2)]
        );
        assert_eq!(stats.avg_duration_secs, Some(2.0));
        let rate = stats.success_rate.unwrap();
        assert!((rate - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_compute_stats_without_timestamps() {
        let execution: Execution = serde_json::from_value(json!({"id": "1"})).unwrap();
        let stats = compute_stats(&[execution]);
        assert_eq!(stats.total, 1);
        assert_eq!(stats.by_status, vec![("unknown".to_string(), 1)]);
        assert_eq!(stats.avg_duration_secs, None);
        assert_eq!(stats.success_rate, None);
    }

    #[test]
    fn test_run_data_helpers() {
        let execution: Execution = serde_json::from_value(json!({
            "id": "9",
            "status": "error",
            "data": {
                "resultData": {
                    "lastNodeExecuted": "HTTP Request",
                    "error": {"message": "connection refused", "node": {"name": "HTTP Request"}},
                    "runData": {
                        "HTTP Request": [{
                            "executionTime": 12,
                            "error": {"message": "connection refused"},
                            "data": {"main": [[{"json": {"a": 1}}, {"json": {"a": 2}}], []]}
                        }]
                    }
                }
            }
        }))
        .unwrap();

        let error = execution_error(&execution).unwrap();
        assert_eq!(error_message(error), "connection refused");

        let run = &execution.data.as_ref().unwrap()["resultData"]["runData"]["HTTP Request"][0];
        assert_eq!(items_output(run), 2);

        let samples = output_samples(run);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].0, 0);
        assert_eq!(samples[0].1, json!({"a": 1}));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 100), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
