// Agent-friendly CLI output system
use crate::ascii_charts::{ScoreBarChart, ScoreGauge, StatsPanel, TagList};
use crate::models::{AnalysisRecord, Repository, MAX_CATEGORY_SCORE, MAX_TOTAL_SCORE};
use crate::view_model::ViewModel;
use chrono::{DateTime, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use serde::Serialize;
use std::io::{self, IsTerminal};

/// Shown in place of a missing repository description
pub const NO_DESCRIPTION: &str = "No description provided.";

/// Environment variable forcing JSON output
pub const JSON_ENV: &str = "GHCAREER_JSON";

/// Output mode for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputMode {
    /// Human-friendly output with colors
    Human,
    /// Machine-readable JSON output
    Json,
    /// Plain text without colors (for pipes/logs)
    Plain,
}

impl OutputMode {
    /// Auto-detect output mode based on environment
    pub fn auto() -> Self {
        if std::env::var(JSON_ENV).is_ok() {
            // JSON mode requested via env var
            Self::Json
        } else if !io::stdout().is_terminal() {
            // Output is piped/redirected, use plain text
            Self::Plain
        } else {
            Self::Human
        }
    }
}

/// Structured result for agent consumption
#[derive(Debug, Serialize)]
pub struct DashboardJson<'a> {
    pub record: &'a AnalysisRecord,
    pub view: &'a ViewModel,
}

/// CLI output writer with mode awareness
pub struct OutputWriter {
    mode: OutputMode,
}

impl OutputWriter {
    pub fn new(mode: OutputMode) -> Self {
        if mode != OutputMode::Human {
            colored::control::set_override(false);
        }
        Self { mode }
    }

    /// Check if output is human-friendly
    pub fn is_human(&self) -> bool {
        matches!(self.mode, OutputMode::Human)
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Human => println!("  {} {}", "✓".green(), message),
            OutputMode::Plain => println!("  [OK] {}", message),
            OutputMode::Json => {}
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => eprintln!("  {} {}", "✗".red(), message),
            OutputMode::Plain => eprintln!("  [ERROR] {}", message),
            OutputMode::Json => {
                let value = serde_json::json!({ "error": message });
                println!("{}", value);
            }
        }
    }

    /// Print a key-value table
    pub fn table(&self, rows: &[(&str, String)]) {
        match self.mode {
            OutputMode::Human => {
                let max_key_len = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
                for (key, value) in rows {
                    println!("  {:width$} │ {}", key.yellow(), value, width = max_key_len);
                }
            }
            OutputMode::Plain => {
                let max_key_len = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
                for (key, value) in rows {
                    println!("  {:width$} : {}", key, value, width = max_key_len);
                }
            }
            OutputMode::Json => {
                let map: serde_json::Map<String, serde_json::Value> = rows
                    .iter()
                    .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.clone())))
                    .collect();
                println!("{}", serde_json::Value::Object(map));
            }
        }
    }

    /// Print the full dashboard for a loaded record
    pub fn dashboard(&self, record: &AnalysisRecord, view: &ViewModel) -> anyhow::Result<()> {
        match self.mode {
            OutputMode::Json => {
                let json = serde_json::to_string_pretty(&DashboardJson { record, view })?;
                println!("{}", json);
            }
            OutputMode::Human | OutputMode::Plain => {
                print!("{}", render_dashboard(record, view, Utc::now()));
            }
        }
        Ok(())
    }
}

/// Render the text dashboard. `now` drives the "updated ... ago" column.
pub fn render_dashboard(record: &AnalysisRecord, view: &ViewModel, now: DateTime<Utc>) -> String {
    let mut out = String::new();

    let rule = "═".repeat(79);
    out.push_str(&format!("{}\n", rule.bright_black()));
    out.push_str(&format!(
        "  {}  {}\n",
        record.handle.cyan().bold(),
        record.avatar_url.bright_black()
    ));
    out.push_str(&format!("{}\n\n", rule.bright_black()));

    out.push_str(
        &ScoreGauge::new("Portfolio Score", record.total_score, MAX_TOTAL_SCORE, view.score_color)
            .with_caption(view.score_severity.name())
            .render(),
    );
    out.push('\n');

    let mut chart = ScoreBarChart::new("Performance Breakdown", MAX_CATEGORY_SCORE).with_width(40);
    for entry in &view.chart_series {
        chart.add(entry.label, entry.value, entry.color, entry.underperforming);
    }
    out.push_str(&chart.render());
    out.push('\n');

    let mut stats = StatsPanel::new("Profile Stats");
    stats.add("Total Stars", &view.summary.total_stars.to_string());
    stats.add("Total Forks", &view.summary.total_forks.to_string());
    stats.add("Repositories", &view.summary.total_repos.to_string());
    stats.add("Languages", &view.summary.language_count.to_string());
    out.push_str(&stats.render());
    out.push_str(
        &TagList {
            title: "Top Languages",
            tags: &view.top_languages,
        }
        .render(),
    );
    out.push('\n');

    out.push_str(&format!("  {}\n", "Top Repositories".bold()));
    if record.top_repos.is_empty() {
        out.push_str(&format!("  {}\n", "No repositories".dimmed()));
    } else {
        out.push_str(&repo_table(&record.top_repos, now).to_string());
        out.push('\n');
    }
    out.push('\n');

    out.push_str(&format!("  {}\n", "Actionable Feedback".yellow().bold()));
    if record.improvement_tips.is_empty() {
        out.push_str(&format!("  {}\n", "Nothing to improve right now".dimmed()));
    }
    for tip in &record.improvement_tips {
        out.push_str(&format!("  {} {}\n", "→".yellow(), tip));
    }

    out
}

fn repo_table(repos: &[Repository], now: DateTime<Utc>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Repository", "Stars", "Forks", "Language", "Updated", "Description"]);

    for repo in repos {
        table.add_row(vec![
            Cell::new(&repo.name),
            Cell::new(repo.stars),
            Cell::new(repo.forks),
            Cell::new(if repo.language.is_empty() { "-" } else { repo.language.as_str() }),
            Cell::new(format_updated(&repo.last_updated, now)),
            Cell::new(describe(repo)),
        ]);
    }
    table
}

/// Repository description with the placeholder for empty ones
pub fn describe(repo: &Repository) -> &str {
    if repo.description.trim().is_empty() {
        NO_DESCRIPTION
    } else {
        &repo.description
    }
}

/// Human-friendly age of an RFC 3339 timestamp; unparseable input is echoed
pub fn format_updated(timestamp: &str, now: DateTime<Utc>) -> String {
    let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) else {
        return if timestamp.is_empty() {
            "-".to_string()
        } else {
            timestamp.to_string()
        };
    };

    let days = (now - parsed.with_timezone(&Utc)).num_days();
    match days {
        d if d < 1 => "today".to_string(),
        1 => "yesterday".to_string(),
        d if d < 30 => format!("{}d ago", d),
        d if d < 365 => format!("{}mo ago", d / 30),
        d => format!("{}y ago", d / 365),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::record_json;
    use crate::view_model::derive;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_auto_mode() {
        let mode = OutputMode::auto();
        // Will be Plain when running in cargo test (no TTY)
        assert!(matches!(mode, OutputMode::Plain | OutputMode::Human | OutputMode::Json));
    }

    #[test]
    fn test_format_updated() {
        assert_eq!(format_updated("2026-10-19T08:00:00Z", now()), "today");
        assert_eq!(format_updated("2026-10-18T08:00:00Z", now()), "yesterday");
        assert_eq!(format_updated("2026-10-09T12:00:00Z", now()), "10d ago");
        assert_eq!(format_updated("2026-07-19T12:00:00Z", now()), "3mo ago");
        assert_eq!(format_updated("2024-10-19T12:00:00Z", now()), "2y ago");
        assert_eq!(format_updated("", now()), "-");
        assert_eq!(format_updated("last week", now()), "last week");
    }

    #[test]
    fn test_describe_uses_placeholder() {
        let record: AnalysisRecord = serde_json::from_value(record_json("octocat", 91)).unwrap();
        assert_eq!(describe(&record.top_repos[0]), "My first repository");
        assert_eq!(describe(&record.top_repos[1]), NO_DESCRIPTION);
    }

    #[test]
    fn test_render_dashboard_sections() {
        colored::control::set_override(false);
        let record: AnalysisRecord = serde_json::from_value(record_json("octocat", 91)).unwrap();
        let view = derive(&record);
        let rendered = render_dashboard(&record, &view, now());

        assert!(rendered.contains("octocat"));
        assert!(rendered.contains("91/100"));
        assert!(rendered.contains("(high)"));
        for label in ["Docs", "Structure", "Activity", "Impact", "Tech", "Pro"] {
            assert!(rendered.contains(label), "missing {}", label);
        }
        assert!(rendered.contains("[Rust] [Go] [C]"));
        assert!(rendered.contains("hello-world"));
        assert!(rendered.contains(NO_DESCRIPTION));
        assert!(rendered.contains("Try to contribute to more open source projects."));
    }

    #[test]
    fn test_dashboard_json_shape() {
        let record: AnalysisRecord = serde_json::from_value(record_json("octocat", 55)).unwrap();
        let view = derive(&record);
        let value = serde_json::to_value(DashboardJson {
            record: &record,
            view: &view,
        })
        .unwrap();
        assert_eq!(value["record"]["username"], "octocat");
        assert_eq!(value["view"]["score_severity"], "medium");
        assert_eq!(value["view"]["chart_series"].as_array().unwrap().len(), 6);
        assert_eq!(value["view"]["chart_series"][0]["category"], "documentation");
    }
}
