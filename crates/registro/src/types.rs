use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dimension the backend groups grade averages by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum FilterBy {
    Students,
    #[default]
    Teachers,
    Groups,
    Years,
    Subjects,
}

impl FilterBy {
    pub const ALL: [FilterBy; 5] = [
        FilterBy::Students,
        FilterBy::Teachers,
        FilterBy::Groups,
        FilterBy::Years,
        FilterBy::Subjects,
    ];

    /// Wire name sent in the `filter_by` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterBy::Students => "students",
            FilterBy::Teachers => "teachers",
            FilterBy::Groups => "groups",
            FilterBy::Years => "years",
            FilterBy::Subjects => "subjects",
        }
    }

    /// Human label for select boxes.
    pub fn label(&self) -> &'static str {
        match self {
            FilterBy::Students => "Students",
            FilterBy::Teachers => "Teachers",
            FilterBy::Groups => "Groups",
            FilterBy::Years => "Years",
            FilterBy::Subjects => "Subjects",
        }
    }
}

impl fmt::Display for FilterBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        FilterBy::ALL
            .into_iter()
            .find(|f| f.as_str() == needle)
            .ok_or_else(|| {
                format!(
                    "unknown filter '{}', expected one of: students, teachers, groups, years, subjects",
                    s
                )
            })
    }
}

/// Request body of the average-grade aggregation endpoint.
///
/// `start_date <= end_date` is not checked here; the backend decides.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct GradeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub filter_by: FilterBy,
}

impl GradeQuery {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, filter_by: FilterBy) -> Self {
        Self {
            start_date,
            end_date,
            filter_by,
        }
    }
}

impl Default for GradeQuery {
    /// 2020-12-12 to 2025-12-12, grouped by teacher.
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2020, 12, 12).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 12).unwrap_or_default(),
            filter_by: FilterBy::Teachers,
        }
    }
}

/// One (entity, average) pair returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradeAggregate {
    /// Student, teacher, group, year or subject label. Opaque.
    pub entity: String,
    pub average_grade: f64,
}

impl GradeAggregate {
    pub fn new(entity: impl Into<String>, average_grade: f64) -> Self {
        Self {
            entity: entity.into(),
            average_grade,
        }
    }

    /// `"entity: 4.26"`, the line format used in listings and exports.
    pub fn listing_line(&self) -> String {
        format!("{}: {:.2}", self.entity, self.average_grade)
    }
}

/// Person attached to a user account, as returned on login.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Default)]
pub struct PersonProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub father_name: Option<String>,
}

impl PersonProfile {
    /// Present name parts joined by spaces.
    pub fn display_name(&self) -> String {
        [&self.first_name, &self.last_name, &self.father_name]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Body of a successful `POST /auth/token`.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub person: Option<PersonProfile>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_query_serializes_three_named_fields() {
        let query = GradeQuery::new(date("2020-12-12"), date("2025-12-12"), FilterBy::Teachers);
        let value = serde_json::to_value(&query).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "start_date": "2020-12-12",
                "end_date": "2025-12-12",
                "filter_by": "teachers",
            })
        );
    }

    #[test]
    fn test_query_allows_reversed_range() {
        let query = GradeQuery::new(date("2025-01-01"), date("2024-01-01"), FilterBy::Years);
        assert!(query.start_date > query.end_date);
    }

    #[test]
    fn test_query_default_form_values() {
        let query = GradeQuery::default();
        assert_eq!(query.start_date, date("2020-12-12"));
        assert_eq!(query.end_date, date("2025-12-12"));
        assert_eq!(query.filter_by, FilterBy::Teachers);
    }

    #[test]
    fn test_filter_by_parse() {
        assert_eq!("groups".parse::<FilterBy>().unwrap(), FilterBy::Groups);
        assert_eq!(" Subjects ".parse::<FilterBy>().unwrap(), FilterBy::Subjects);
        assert!("classes".parse::<FilterBy>().is_err());
    }

    #[test]
    fn test_filter_by_wire_names_match_display() {
        for filter in FilterBy::ALL {
            let json = serde_json::to_string(&filter).unwrap();
            assert_eq!(json, format!("\"{}\"", filter));
        }
    }

    #[test]
    fn test_filter_by_default_is_teachers() {
        assert_eq!(FilterBy::default(), FilterBy::Teachers);
    }

    #[test]
    fn test_listing_line_rounds_to_two_decimals() {
        assert_eq!(GradeAggregate::new("T. Smith", 4.256).listing_line(), "T. Smith: 4.26");
        assert_eq!(GradeAggregate::new("2023", 4.0).listing_line(), "2023: 4.00");
        assert_eq!(GradeAggregate::new("", 0.0).listing_line(), ": 0.00");
    }

    #[test]
    fn test_aggregate_deserialization() {
        let json = r#"[{"entity":"T. Smith","average_grade":4.256},{"entity":"2024","average_grade":3}]"#;
        let aggregates: Vec<GradeAggregate> = serde_json::from_str(json).unwrap();

        assert_eq!(aggregates.len(), 2);
        assert_eq!(aggregates[0].entity, "T. Smith");
        assert_eq!(aggregates[1].average_grade, 3.0);
    }

    #[test]
    fn test_login_response_without_person() {
        let json = r#"{"access_token":"abc","token_type":"bearer","username":"admin","person":null}"#;
        let response: LoginResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.access_token, "abc");
        assert_eq!(response.username.as_deref(), Some("admin"));
        assert!(response.person.is_none());
    }

    #[test]
    fn test_login_response_minimal() {
        let response: LoginResponse = serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();
        assert_eq!(response.token_type, "bearer");
        assert!(response.username.is_none());
    }

    #[test]
    fn test_display_name_skips_missing_parts() {
        let profile = PersonProfile {
            first_name: Some("Ivan".to_string()),
            last_name: Some("Petrov".to_string()),
            father_name: None,
        };
        assert_eq!(profile.display_name(), "Ivan Petrov");
        assert_eq!(PersonProfile::default().display_name(), "");
    }
}
