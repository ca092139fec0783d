//! Display helpers for floodctl output

use chrono::{DateTime, Utc};
use floodcare_common::api::{HealthResponse, QueueResponse, SyncResponse};
use floodcare_common::merge::SyncOutcome;
use floodcare_common::sheet_format::format_thai_timestamp;
use floodcare_common::{Announcement, AnnouncementKind, Report, RiskLevel};
use owo_colors::OwoColorize;

const KEY_WIDTH: usize = 15;
const HR: &str = "------------------------------------------------------------";

/// Risk tag as shown in the queue
pub fn risk_tag(risk: RiskLevel) -> String {
    let tag = format!("[{}]", risk);
    match risk {
        RiskLevel::Critical => tag.bright_red().bold().to_string(),
        RiskLevel::High => tag.red().to_string(),
        RiskLevel::Medium => tag.yellow().to_string(),
        RiskLevel::Low => tag.green().to_string(),
    }
}

fn kind_tag(kind: AnnouncementKind) -> String {
    let tag = format!("[{}]", kind);
    match kind {
        AnnouncementKind::Emergency => tag.bright_red().bold().to_string(),
        AnnouncementKind::Warning => tag.yellow().to_string(),
        AnnouncementKind::Info => tag.cyan().to_string(),
    }
}

/// "5m ago" style age
pub fn format_age(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = now.signed_duration_since(ts).num_seconds().max(0);
    match secs {
        0..=59 => format!("{}s ago", secs),
        60..=3599 => format!("{}m ago", secs / 60),
        3600..=86399 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86400),
    }
}

/// One-line plain summary of a report
pub fn report_line(report: &Report) -> String {
    let phone = report.phone_number.as_deref().unwrap_or("-");
    format!(
        "{}  {} ({})  {}  {}",
        report.id, report.student_name, phone, report.dormitory, report.category
    )
}

fn print_kv(key: &str, value: &str) {
    println!("{:width$} {}", key, value, width = KEY_WIDTH);
}

pub fn print_report(report: &Report) {
    let now = Utc::now();
    let status = if report.is_resolved { "resolved".dimmed().to_string() } else { String::new() };
    println!("{} {}  {}", risk_tag(report.risk_level), report_line(report), status);
    for line in report.message.lines() {
        println!("    {}", line);
    }
    if let Some(location) = &report.location {
        println!("    {}", location.maps_link().blue());
    }
    println!(
        "    {}",
        format!("{}  ({})", format_thai_timestamp(report.timestamp), format_age(report.timestamp, now))
            .dimmed()
    );
}

pub fn print_queue(queue: &QueueResponse, pending_only: bool) {
    println!();
    println!("{}  {} unresolved", "Priority queue".bold(), queue.unresolved);
    println!("{}", HR.dimmed());

    let mut shown = 0;
    for report in queue.reports.iter().filter(|r| !pending_only || !r.is_resolved) {
        print_report(report);
        shown += 1;
    }
    if shown == 0 {
        println!("{}", "No reports".dimmed());
    }
    println!();
}

pub fn print_announcements(announcements: &[Announcement]) {
    if announcements.is_empty() {
        println!("{}", "No announcements".dimmed());
        return;
    }
    let now = Utc::now();
    for a in announcements {
        println!("{} {}  {}", kind_tag(a.kind), a.title.bold(), format_age(a.timestamp, now).dimmed());
        if !a.content.is_empty() {
            println!("    {}", a.content);
        }
        println!("    {}", a.id.dimmed());
    }
}

pub fn describe_sync(response: &SyncResponse) -> String {
    match response.outcome {
        SyncOutcome::Skipped => "Sync already running, skipped".to_string(),
        SyncOutcome::NoUpdate => {
            format!("No update from sheet, kept {} local reports", response.reports)
        }
        SyncOutcome::Replaced { count } => format!("Replaced store with {} reports from sheet", count),
        SyncOutcome::Merged { count, kept_local } => {
            format!("Merged {} reports ({} local not yet in sheet)", count, kept_local)
        }
    }
}

pub fn print_health(health: &HealthResponse, server: &str) {
    println!();
    println!("{}", format!("floodcared v{}", health.version).bold());
    println!("{}", HR.dimmed());
    print_kv("server", server);
    print_kv("status", &health.status.green().to_string());
    print_kv("uptime", &format!("{}s", health.uptime_seconds));
    print_kv("reports", &format!("{} ({} unresolved)", health.reports, health.unresolved));
    print_kv("announcements", &health.announcements.to_string());
    print_kv("sync", &format!("{:?} ({})", health.sync_state, health.merge_policy).to_lowercase());
    print_kv(
        "remote",
        if health.remote_configured { "configured" } else { "offline" },
    );
    print_kv("model tier", if health.model_enabled { "enabled" } else { "disabled" });
    println!();
}

pub fn success(message: &str) {
    println!("{} {}", "[OK]".green(), message);
}

pub fn warning(message: &str) {
    println!("{} {}", "[WARN]".yellow(), message);
}

pub fn failure(message: &str) {
    eprintln!("{} {}", "[ERROR]".bright_red(), message);
}
