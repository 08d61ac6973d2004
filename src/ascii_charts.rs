//! ASCII chart rendering for the terminal dashboard
//!
//! - ScoreBarChart: horizontal bars on a fixed scale, one color per bar
//! - ScoreGauge: total score with severity color
//! - StatsPanel: key metrics in a box
//! - TagList: inline tags

use colored::{ColoredString, Colorize};

/// Box drawing characters
const BOX_H: char = '─';
const BOX_V: char = '│';
const BOX_TL: char = '╭';
const BOX_TR: char = '╮';
const BOX_BL: char = '╰';
const BOX_BR: char = '╯';

const BAR_FILLED: &str = "█";
const BAR_EMPTY: &str = "░";

/// Parse `#rrggbb` into RGB components
pub fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

fn colorize_hex(text: &str, color: &str) -> ColoredString {
    match parse_hex(color) {
        Some((r, g, b)) => text.truecolor(r, g, b),
        None => text.white(),
    }
}

/// Horizontal bar chart where every bar shares one fixed maximum
pub struct ScoreBarChart {
    pub title: String,
    pub items: Vec<ScoreBar>,
    pub max: i64,
    pub width: usize,
}

#[derive(Clone, Debug)]
pub struct ScoreBar {
    pub label: String,
    pub value: i64,
    pub color: String,
    pub flagged: bool,
}

impl ScoreBarChart {
    pub fn new(title: &str, max: i64) -> Self {
        Self {
            title: title.to_string(),
            items: Vec::new(),
            max,
            width: 30,
        }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn add(&mut self, label: &str, value: i64, color: &str, flagged: bool) {
        self.items.push(ScoreBar {
            label: label.to_string(),
            value,
            color: color.to_string(),
            flagged,
        });
    }

    fn filled(&self, value: i64) -> usize {
        if self.max <= 0 {
            return 0;
        }
        let ratio = value.clamp(0, self.max) as f64 / self.max as f64;
        ((ratio * self.width as f64).round() as usize).min(self.width)
    }

    pub fn render(&self) -> String {
        let mut output = String::new();

        if !self.title.is_empty() {
            output.push_str(&format!("  {}\n\n", self.title.bold()));
        }

        if self.items.is_empty() {
            output.push_str("  No data available\n");
            return output;
        }

        let max_label_len = self.items.iter().map(|i| i.label.len()).max().unwrap_or(10);

        for item in &self.items {
            let filled = self.filled(item.value);
            let bar = format!(
                "{}{}",
                colorize_hex(&BAR_FILLED.repeat(filled), &item.color),
                BAR_EMPTY.repeat(self.width - filled).dimmed()
            );
            let marker = if item.flagged { " ▼".red().to_string() } else { String::new() };

            output.push_str(&format!(
                "  {:width$} {} {:>2}/{}{}\n",
                item.label,
                bar,
                item.value,
                self.max,
                marker,
                width = max_label_len
            ));
        }

        output
    }
}

/// Total score gauge (20 segments)
pub struct ScoreGauge {
    pub label: String,
    pub value: i64,
    pub max: i64,
    pub color: String,
    pub caption: String,
}

impl ScoreGauge {
    pub fn new(label: &str, value: i64, max: i64, color: &str) -> Self {
        Self {
            label: label.to_string(),
            value,
            max,
            color: color.to_string(),
            caption: String::new(),
        }
    }

    pub fn with_caption(mut self, caption: &str) -> Self {
        self.caption = caption.to_string();
        self
    }

    pub fn render(&self) -> String {
        let mut output = String::new();
        let segments = 20;
        let pct = if self.max > 0 {
            (self.value as f64 / self.max as f64).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let filled = (pct * segments as f64).round() as usize;

        output.push_str(&format!("  {}\n", self.label.bold()));
        output.push_str(&format!(
            "  {}{}  {}/{}",
            colorize_hex(&BAR_FILLED.repeat(filled), &self.color),
            BAR_EMPTY.repeat(segments - filled).dimmed(),
            colorize_hex(&self.value.to_string(), &self.color).bold(),
            self.max
        ));
        if !self.caption.is_empty() {
            output.push_str(&format!(" ({})", self.caption.dimmed()));
        }
        output.push('\n');

        output
    }
}

/// Statistics panel with key metrics
pub struct StatsPanel {
    pub title: String,
    pub metrics: Vec<(String, String)>,
}

impl StatsPanel {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            metrics: Vec::new(),
        }
    }

    pub fn add(&mut self, label: &str, value: &str) {
        self.metrics.push((label.to_string(), value.to_string()));
    }

    pub fn render(&self) -> String {
        let mut output = String::new();

        let max_label = self.metrics.iter().map(|(l, _)| l.len()).max().unwrap_or(10);
        let max_value = self.metrics.iter().map(|(_, v)| v.len()).max().unwrap_or(10);
        let inner_width = max_label + max_value + 5;

        output.push_str(&format!("  {}\n", self.title.bold()));
        output.push_str(&format!(
            "  {}{}{}\n",
            BOX_TL,
            BOX_H.to_string().repeat(inner_width),
            BOX_TR
        ));

        for (label, value) in &self.metrics {
            output.push_str(&format!(
                "  {} {:lw$} : {:>vw$} {}\n",
                BOX_V,
                label,
                value.cyan(),
                BOX_V,
                lw = max_label,
                vw = max_value
            ));
        }

        output.push_str(&format!(
            "  {}{}{}\n",
            BOX_BL,
            BOX_H.to_string().repeat(inner_width),
            BOX_BR
        ));

        output
    }
}

/// Inline `[tag]` list
pub struct TagList<'a> {
    pub title: &'a str,
    pub tags: &'a [String],
}

impl TagList<'_> {
    pub fn render(&self) -> String {
        let body = if self.tags.is_empty() {
            "none".dimmed().to_string()
        } else {
            self.tags
                .iter()
                .map(|t| format!("[{}]", t).cyan().to_string())
                .collect::<Vec<_>>()
                .join(" ")
        };
        format!("  {}: {}\n", self.title.bold(), body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#3b82f6"), Some((0x3b, 0x82, 0xf6)));
        assert_eq!(parse_hex("3b82f6"), None);
        assert_eq!(parse_hex("#zzzzzz"), None);
        assert_eq!(parse_hex("#fff"), None);
    }

    #[test]
    fn test_score_bar_chart_fixed_scale() {
        plain();
        let mut chart = ScoreBarChart::new("Breakdown", 20).with_width(20);
        chart.add("Docs", 20, "#3b82f6", false);
        chart.add("Activity", 5, "#ef4444", true);
        let rendered = chart.render();

        let lines: Vec<&str> = rendered.lines().filter(|l| l.contains('/')).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].matches('█').count(), 20);
        assert_eq!(lines[1].matches('█').count(), 5);
        assert!(lines[1].contains(" 5/20"));
        assert!(lines[1].contains('▼'));
        assert!(!lines[0].contains('▼'));
    }

    #[test]
    fn test_score_bar_chart_clamps_values() {
        let chart = ScoreBarChart::new("", 20).with_width(10);
        assert_eq!(chart.filled(-3), 0);
        assert_eq!(chart.filled(45), 10);
    }

    #[test]
    fn test_gauge() {
        plain();
        let gauge = ScoreGauge::new("Score", 92, 100, "#22c55e").with_caption("high");
        let rendered = gauge.render();
        assert!(rendered.contains("92/100"));
        assert!(rendered.contains("(high)"));
        assert_eq!(rendered.matches('█').count(), 18);
    }

    #[test]
    fn test_stats_panel() {
        plain();
        let mut panel = StatsPanel::new("Profile Stats");
        panel.add("Total Stars", "1234");
        panel.add("Languages", "3");
        let rendered = panel.render();
        assert!(rendered.contains("Total Stars"));
        assert!(rendered.contains("1234"));
        assert_eq!(rendered.lines().count(), 5);
    }

    #[test]
    fn test_tag_list() {
        plain();
        let tags = vec!["Go".to_string(), "Rust".to_string()];
        let rendered = TagList { title: "Top Languages", tags: &tags }.render();
        assert!(rendered.contains("[Go] [Rust]"));
        let empty = TagList { title: "Top Languages", tags: &[] }.render();
        assert!(empty.contains("none"));
    }
}
