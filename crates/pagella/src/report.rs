use registro::{ApiResult, GradeAggregate, GradeQuery};
use tracing::warn;

/// The one message users see for any failed fetch.
pub const FETCH_ERROR: &str = "Error: Unable to fetch average grades";

/// State of the reporting flow: last submitted form, current results, error banner.
#[derive(Debug, Clone, Default)]
pub struct ReportState {
    query: GradeQuery,
    aggregates: Vec<GradeAggregate>,
    error: Option<String>,
}

impl ReportState {
    /// Record a new submission. Clears the error; keeps the previous results
    /// on screen until the response arrives.
    pub fn begin(&mut self, query: GradeQuery) {
        self.query = query;
        self.error = None;
    }

    /// Apply the outcome of a submission.
    ///
    /// Success replaces the results wholesale. Failure leaves them untouched
    /// and sets [`FETCH_ERROR`].
    pub fn apply(&mut self, result: ApiResult<Vec<GradeAggregate>>) {
        match result {
            Ok(aggregates) => {
                self.aggregates = aggregates;
                self.error = None;
            }
            Err(e) => {
                warn!(error = %e, filter_by = %self.query.filter_by, "Average grade request failed");
                self.error = Some(FETCH_ERROR.to_string());
            }
        }
    }

    pub fn query(&self) -> &GradeQuery {
        &self.query
    }

    pub fn aggregates(&self) -> &[GradeAggregate] {
        &self.aggregates
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Export needs at least one result.
    pub fn can_export(&self) -> bool {
        !self.aggregates.is_empty()
    }
}

/// `"entity: value"` lines, values to two decimals, in server order.
pub fn listing(aggregates: &[GradeAggregate]) -> Vec<String> {
    aggregates.iter().map(GradeAggregate::listing_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use registro::{ApiError, FilterBy};

    fn aggregates() -> Vec<GradeAggregate> {
        vec![
            GradeAggregate::new("T. Smith", 4.256),
            GradeAggregate::new("M. Rossi", 3.5),
        ]
    }

    #[test]
    fn test_default_state_is_empty() {
        let state = ReportState::default();
        assert!(state.aggregates().is_empty());
        assert!(state.error().is_none());
        assert!(!state.can_export());
        assert_eq!(state.query().filter_by, FilterBy::Teachers);
    }

    #[test]
    fn test_success_replaces_results() {
        let mut state = ReportState::default();
        state.apply(Ok(aggregates()));
        assert_eq!(state.aggregates().len(), 2);

        state.apply(Ok(vec![GradeAggregate::new("2024", 4.0)]));
        assert_eq!(state.aggregates(), &[GradeAggregate::new("2024", 4.0)]);
        assert!(state.can_export());
    }

    #[test]
    fn test_failure_keeps_results_and_sets_error() {
        let mut state = ReportState::default();
        state.apply(Ok(aggregates()));

        state.apply(Err(ApiError::InvalidResponse("garbage".to_string())));

        assert_eq!(state.aggregates(), aggregates().as_slice());
        assert_eq!(state.error(), Some(FETCH_ERROR));
    }

    #[test]
    fn test_begin_clears_error_but_not_results() {
        let mut state = ReportState::default();
        state.apply(Ok(aggregates()));
        state.apply(Err(ApiError::Unauthorized));

        let mut query = GradeQuery::default();
        query.filter_by = FilterBy::Groups;
        state.begin(query.clone());

        assert!(state.error().is_none());
        assert_eq!(state.query(), &query);
        assert_eq!(state.aggregates().len(), 2);
    }

    #[test]
    fn test_empty_success_disables_export() {
        let mut state = ReportState::default();
        state.apply(Ok(aggregates()));
        state.apply(Ok(Vec::new()));

        assert!(!state.can_export());
        assert!(state.error().is_none());
    }

    #[test]
    fn test_overlapping_submissions_last_response_wins() {
        let mut state = ReportState::default();
        let first = GradeQuery::default();
        let mut second = GradeQuery::default();
        second.filter_by = FilterBy::Years;

        state.begin(first);
        state.begin(second.clone());
        state.apply(Ok(vec![GradeAggregate::new("2024", 4.0)]));
        state.apply(Err(ApiError::Unauthorized));

        assert_eq!(state.query(), &second);
        assert_eq!(state.aggregates(), &[GradeAggregate::new("2024", 4.0)]);
        assert_eq!(state.error(), Some(FETCH_ERROR));
    }

    #[test]
    fn test_listing_lines() {
        assert_eq!(listing(&aggregates()), vec!["T. Smith: 4.26", "M. Rossi: 3.50"]);
        assert!(listing(&[]).is_empty());
    }
}
