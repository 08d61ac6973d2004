// Data model for profile analysis records served by the backend
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Upper bound of every breakdown category score
pub const MAX_CATEGORY_SCORE: i64 = 20;

/// Upper bound of the total score
pub const MAX_TOTAL_SCORE: i64 = 100;

/// The six fixed scoring dimensions, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Documentation,
    CodeStructure,
    Activity,
    Impact,
    Technical,
    Professionalism,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Documentation,
        Category::CodeStructure,
        Category::Activity,
        Category::Impact,
        Category::Technical,
        Category::Professionalism,
    ];

    /// Short chart label
    pub fn label(&self) -> &'static str {
        match self {
            Category::Documentation => "Docs",
            Category::CodeStructure => "Structure",
            Category::Activity => "Activity",
            Category::Impact => "Impact",
            Category::Technical => "Tech",
            Category::Professionalism => "Pro",
        }
    }
}

/// Per-category sub-scores. Missing categories deserialize as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreBreakdown {
    pub documentation: i64,
    pub code_structure: i64,
    pub activity: i64,
    pub impact: i64,
    pub technical: i64,
    pub professionalism: i64,
}

impl ScoreBreakdown {
    pub fn get(&self, category: Category) -> i64 {
        match category {
            Category::Documentation => self.documentation,
            Category::CodeStructure => self.code_structure,
            Category::Activity => self.activity,
            Category::Impact => self.impact,
            Category::Technical => self.technical,
            Category::Professionalism => self.professionalism,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileStats {
    pub total_stars: u64,
    pub total_forks: u64,
    pub total_repos: u64,
    /// Language name to usage weight, in the order the backend sent them
    #[serde(default)]
    pub languages: IndexMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub stars: u64,
    #[serde(default)]
    pub forks: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub language: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last_updated: String,
}

/// A precomputed profile analysis as returned by `GET /profile/{handle}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    #[serde(rename = "username")]
    pub handle: String,
    pub avatar_url: String,
    pub total_score: i64,
    pub breakdown: ScoreBreakdown,
    pub stats: ProfileStats,
    #[serde(default)]
    pub top_repos: Vec<Repository>,
    #[serde(default)]
    pub improvement_tips: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recruiter_feedback: Option<serde_json::Value>,
}

/// Body of the backend's `/health` endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub project: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}


#[cfg(test)]
mod tests {
    use super::fixtures::record_json;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_backend_record() {
        let record: AnalysisRecord = serde_json::from_value(record_json("octocat", 91)).unwrap();
        assert_eq!(record.handle, "octocat");
        assert_eq!(record.total_score, 91);
        assert_eq!(record.breakdown.get(Category::Impact), 20);
        assert_eq!(record.stats.total_repos, 8);
        assert_eq!(record.top_repos.len(), 2);
        assert_eq!(record.improvement_tips.len(), 1);
        assert!(record.recruiter_feedback.is_none());
    }

    #[test]
    fn test_nullable_fields_become_empty() {
        let record: AnalysisRecord = serde_json::from_value(record_json("octocat", 91)).unwrap();
        let dotfiles = &record.top_repos[1];
        assert_eq!(dotfiles.description, "");
        assert_eq!(dotfiles.language, "");
    }

    #[test]
    fn test_languages_keep_source_order() {
        let record: AnalysisRecord = serde_json::from_value(record_json("octocat", 91)).unwrap();
        let names: Vec<&str> = record.stats.languages.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Rust", "Go", "C"]);
    }

    #[test]
    fn test_missing_breakdown_category_defaults_to_zero() {
        let mut value = record_json("octocat", 50);
        value["breakdown"] = json!({ "documentation": 7 });
        let record: AnalysisRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.breakdown.get(Category::Documentation), 7);
        assert_eq!(record.breakdown.get(Category::Professionalism), 0);
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let mut value = record_json("octocat", 50);
        value.as_object_mut().unwrap().remove("total_score");
        assert!(serde_json::from_value::<AnalysisRecord>(value).is_err());
    }

    #[test]
    fn test_category_wire_names_match_breakdown_fields() {
        let breakdown = serde_json::to_value(ScoreBreakdown::default()).unwrap();
        for category in Category::ALL {
            let wire = serde_json::to_value(category).unwrap();
            let key = wire.as_str().unwrap();
            assert!(breakdown.get(key).is_some(), "no breakdown field {}", key);
        }
    }
}
