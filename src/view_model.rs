// Aggregate deriver - presentation-ready values computed from an analysis record
use crate::models::{AnalysisRecord, Category, MAX_TOTAL_SCORE};
use serde::Serialize;

/// Sub-scores below this are flagged as under-performing
pub const UNDERPERFORMING_THRESHOLD: i64 = 10;

/// Maximum number of language tags shown
pub const TOP_LANGUAGES_LIMIT: usize = 5;

/// Bar color for healthy categories
pub const BAR_COLOR: &str = "#3b82f6";

/// Bar color for under-performing categories
pub const UNDERPERFORMING_COLOR: &str = "#ef4444";

/// Coarse classification of the total score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Total over all integers: out-of-range scores are clamped to 0..=100 first.
    pub fn from_score(score: i64) -> Self {
        match score.clamp(0, MAX_TOTAL_SCORE) {
            80.. => Severity::High,
            50.. => Severity::Medium,
            _ => Severity::Low,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Severity::High => "#22c55e",
            Severity::Medium => "#eab308",
            Severity::Low => "#ef4444",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartEntry {
    pub category: Category,
    pub label: &'static str,
    pub value: i64,
    pub color: &'static str,
    pub underperforming: bool,
}

impl ChartEntry {
    fn new(category: Category, value: i64) -> Self {
        let underperforming = value < UNDERPERFORMING_THRESHOLD;
        Self {
            category,
            label: category.label(),
            value,
            color: if underperforming {
                UNDERPERFORMING_COLOR
            } else {
                BAR_COLOR
            },
            underperforming,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SummaryCounts {
    pub total_stars: u64,
    pub total_forks: u64,
    pub total_repos: u64,
    pub language_count: usize,
}

/// Everything a renderer needs beyond the raw record. Never stored; call
/// [`derive`] again whenever the record changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub score_severity: Severity,
    pub score_color: &'static str,
    pub chart_series: [ChartEntry; 6],
    pub top_languages: Vec<String>,
    pub summary: SummaryCounts,
}

impl ViewModel {
    pub fn underperforming(&self) -> impl Iterator<Item = &ChartEntry> {
        self.chart_series.iter().filter(|entry| entry.underperforming)
    }
}

pub fn derive(record: &AnalysisRecord) -> ViewModel {
    let score_severity = Severity::from_score(record.total_score);

    ViewModel {
        score_severity,
        score_color: score_severity.color(),
        chart_series: Category::ALL
            .map(|category| ChartEntry::new(category, record.breakdown.get(category))),
        top_languages: rank_languages(record.stats.languages.iter(), TOP_LANGUAGES_LIMIT),
        summary: SummaryCounts {
            total_stars: record.stats.total_stars,
            total_forks: record.stats.total_forks,
            total_repos: record.stats.total_repos,
            language_count: record.stats.languages.len(),
        },
    }
}

/// Sort by weight descending. The sort is stable, so ties keep source order.
fn rank_languages<'a>(entries: impl Iterator<Item = (&'a String, &'a u64)>, limit: usize) -> Vec<String> {
    let mut sorted: Vec<_> = entries.collect();
    sorted.sort_by(|a, b| b.1.cmp(a.1));
    sorted
        .into_iter()
        .take(limit)
        .map(|(name, _)| name.clone())
        .collect()
}
