use maud::{html, Markup, PreEscaped, DOCTYPE};
use registro::{FilterBy, SessionState};

use crate::chart::BarChart;
use crate::report::{self, ReportState};

/// Render the analytics page.
pub fn render_page(report: &ReportState, session: &SessionState, login_error: Option<&str>) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Pagella" }
                style { (PreEscaped(CSS)) }
            }
            body {
                div.container {
                    (render_session(session, login_error))
                    h1 { "Calculate Average Grade" }
                    (render_form(report))
                    @if let Some(error) = report.error() {
                        div.error #"report-error" { (error) }
                    }
                    (render_results(report))
                }
            }
        }
    }
}

fn render_session(session: &SessionState, login_error: Option<&str>) -> Markup {
    html! {
        div.session {
            @match session.session() {
                Some(user) => {
                    span.user { (user.display_name()) }
                    form method="post" action="/logout" {
                        button type="submit" { "Log out" }
                    }
                }
                None => {
                    form.login method="post" action="/login" {
                        input type="text" name="username" placeholder="Login" required;
                        input type="password" name="password" placeholder="Password" required;
                        button type="submit" { "Log in" }
                    }
                    @if let Some(error) = login_error {
                        span.error { (error) }
                    }
                }
            }
        }
    }
}

fn render_form(report: &ReportState) -> Markup {
    let query = report.query();

    html! {
        form.query method="post" action="/report" {
            div {
                label {
                    "Start Date: "
                    input type="date" name="start_date" value=(query.start_date.format("%Y-%m-%d").to_string());
                }
            }
            div {
                label {
                    "End Date: "
                    input type="date" name="end_date" value=(query.end_date.format("%Y-%m-%d").to_string());
                }
            }
            div {
                label {
                    "Filter By: "
                    select name="filter_by" {
                        @for filter in FilterBy::ALL {
                            option value=(filter.as_str()) selected[filter == query.filter_by] {
                                (filter.label())
                            }
                        }
                    }
                }
            }
            button type="submit" { "Calculate" }
        }
    }
}

fn render_results(report: &ReportState) -> Markup {
    let aggregates = report.aggregates();

    html! {
        div.results {
            h2 { "Average Grades:" }
            @if !report.can_export() {
                p.empty-state { "No results to display." }
            } @else {
                ul.listing {
                    @for line in report::listing(aggregates) {
                        li { (line) }
                    }
                }
                div #"chart-container" {
                    (BarChart::from_aggregates(aggregates).to_svg())
                }
                a.button href="/report.pdf" download { "Save as PDF" }
            }
        }
    }
}

const CSS: &str = r#"
* {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
    background: #f6f7f9;
    color: #222;
    line-height: 1.5;
}

.container {
    max-width: 900px;
    margin: 0 auto;
    padding: 32px 24px 60px;
}

h1 {
    font-size: 1.8em;
    margin-bottom: 20px;
}

h2 {
    font-size: 1.2em;
    margin: 28px 0 12px;
}

.session {
    display: flex;
    justify-content: flex-end;
    align-items: center;
    gap: 10px;
    margin-bottom: 24px;
    font-size: 0.9em;
}

.session form {
    display: flex;
    gap: 6px;
}

form.query div {
    margin-bottom: 10px;
}

input, select, button, a.button {
    font: inherit;
    padding: 4px 10px;
    border: 1px solid #bbb;
    border-radius: 4px;
    background: #fff;
}

button, a.button {
    cursor: pointer;
    background: #4bc0c0;
    border-color: #3aa;
    color: #fff;
    text-decoration: none;
    display: inline-block;
}

.error {
    color: #c00;
    margin-top: 12px;
}

.listing {
    list-style: none;
    margin-bottom: 20px;
}

.listing li {
    padding: 2px 0;
}

#chart-container {
    background: #fff;
    border: 1px solid #ddd;
    padding: 12px;
    margin-bottom: 16px;
}

svg.chart {
    width: 100%;
    height: auto;
    font-size: 12px;
}

svg.chart .grid {
    stroke: #e5e5e5;
}

svg.chart .axis {
    stroke: #333;
}

.empty-state {
    color: #777;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use registro::{GradeAggregate, LoginResponse, Session};

    fn with_results(aggregates: Vec<GradeAggregate>) -> ReportState {
        let mut state = ReportState::default();
        state.apply(Ok(aggregates));
        state
    }

    #[test]
    fn test_empty_results_show_placeholder_without_chart_or_export() {
        let html = render_page(&ReportState::default(), &SessionState::default(), None).into_string();

        assert!(html.contains("No results to display."));
        assert!(!html.contains("id=\"chart-container\""));
        assert!(!html.contains("/report.pdf"));
    }

    #[test]
    fn test_results_render_list_chart_and_export() {
        let state = with_results(vec![
            GradeAggregate::new("T. Smith", 4.256),
            GradeAggregate::new("M. Rossi", 3.0),
        ]);
        let html = render_page(&state, &SessionState::default(), None).into_string();

        assert!(html.contains("<li>T. Smith: 4.26</li>"));
        assert!(html.contains("<li>M. Rossi: 3.00</li>"));
        assert_eq!(html.matches("class=\"bar\"").count(), 2);
        assert!(html.contains("href=\"/report.pdf\""));
        assert!(!html.contains("No results to display."));
    }

    #[test]
    fn test_form_reflects_last_query() {
        let html = render_page(&ReportState::default(), &SessionState::default(), None).into_string();

        assert!(html.contains("value=\"2020-12-12\""));
        assert!(html.contains("value=\"2025-12-12\""));
        assert!(html.contains("<option value=\"teachers\" selected>Teachers</option>"));
        assert!(html.contains("<option value=\"years\">Years</option>"));
    }

    #[test]
    fn test_error_banner() {
        let mut state = with_results(vec![GradeAggregate::new("2024", 4.0)]);
        state.apply(Err(registro::ApiError::Unauthorized));
        let html = render_page(&state, &SessionState::default(), None).into_string();

        assert!(html.contains(report::FETCH_ERROR));
        assert!(html.contains("<li>2024: 4.00</li>"));
    }

    #[test]
    fn test_entity_labels_are_escaped() {
        let state = with_results(vec![GradeAggregate::new("<script>x</script>", 2.0)]);
        let html = render_page(&state, &SessionState::default(), None).into_string();

        assert!(!html.contains("<script>x</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_session_header() {
        let anonymous =
            render_page(&ReportState::default(), &SessionState::default(), Some("Login failed"))
                .into_string();
        assert!(anonymous.contains("action=\"/login\""));
        assert!(anonymous.contains("Login failed"));

        let mut session = SessionState::default();
        session.begin(Session::from_login(
            "admin",
            LoginResponse {
                access_token: "t".to_string(),
                token_type: "bearer".to_string(),
                username: Some("admin".to_string()),
                person: None,
            },
        ));
        let logged_in = render_page(&ReportState::default(), &session, None).into_string();
        assert!(logged_in.contains("action=\"/logout\""));
        assert!(logged_in.contains("admin"));
        assert!(!logged_in.contains("action=\"/login\""));
    }
}
