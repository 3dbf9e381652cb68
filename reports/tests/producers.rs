use std::fs;
use std::path::Path;
use std::sync::Arc;

use reports::core::{Hooks, ReportSettings};
use reports::csv::CsvStore;
use reports::page::{render_page_by_slug, render_reports_index};
use reports::producers::{self, MemoryStore};
use reports::{ReportCatalog, ReportError, RequestContext};

const SNAPSHOT: &str = r#"{
  "achievement_types": [
    {"id": 1, "slug": "badges", "singular": "Badge", "plural": "Badges"}
  ],
  "achievements": [
    {"id": 10, "achievement_type": "badges", "title": "Gold Star"},
    {"id": 11, "achievement_type": "badges", "title": "Silver Star"}
  ],
  "users": [
    {"id": 1, "login": "ada", "first_name": "Ada", "last_name": "Lovelace",
     "email": "ada@example.org", "registered": "2022-12-01 00:00:00"},
    {"id": 2, "login": "grace", "first_name": "Grace", "last_name": "Hopper",
     "email": "grace@example.org", "registered": "2023-01-05 00:00:00"},
    {"id": 3, "login": "linus", "first_name": "Linus", "last_name": "T",
     "email": "linus@example.org", "registered": "2023-02-01 00:00:00"}
  ],
  "log_entries": [
    {"id": 100, "user_id": 1, "achievement_id": 10, "title": "ada unlocked Gold Star", "date": "2023-01-10 12:00:00"},
    {"id": 101, "user_id": 1, "achievement_id": 11, "title": "ada unlocked Silver Star", "date": "2023-01-31 23:00:00"},
    {"id": 102, "user_id": 2, "achievement_id": 10, "title": "grace unlocked Gold Star", "date": "2023-02-01 00:00:00"},
    {"id": 103, "user_id": 1, "achievement_id": 10, "title": "ada unlocked Gold Star", "date": "2022-06-01 08:00:00"},
    {"id": 104, "user_id": 3, "title": "linus logged in", "date": "2023-01-15 09:00:00"}
  ]
}"#;

struct Fixture {
    _dir: tempfile::TempDir,
    catalog: ReportCatalog,
    settings: Arc<ReportSettings>,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let settings = Arc::new(ReportSettings {
        uploads_dir: dir.path().to_path_buf(),
        uploads_url: Some("https://example.org/uploads".into()),
        ..ReportSettings::default()
    });
    let store = Arc::new(MemoryStore::from_json(SNAPSHOT).unwrap());

    let mut catalog = ReportCatalog::new();
    producers::register_all(&mut catalog, store).unwrap();

    Fixture {
        _dir: dir,
        catalog,
        settings,
    }
}

fn january(extra: &str) -> RequestContext {
    RequestContext::from_query(&format!("start_date=2023-01-01&end_date=2023-01-31{extra}"))
}

fn render(fixture: &Fixture, slug: &str, request: &RequestContext) -> String {
    render_page_by_slug(
        &fixture.catalog,
        slug,
        request,
        Arc::clone(&fixture.settings),
        Arc::new(Hooks::new()),
    )
    .unwrap()
}

fn read_csv(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join("reports").join(format!("{name}.csv"))).unwrap()
}

#[test]
fn registers_one_report_per_type_plus_builtins() {
    let fixture = fixture();
    let slugs: Vec<&str> = fixture.catalog.iter().map(|d| d.slug.as_str()).collect();
    assert_eq!(slugs, ["badges", "earnings-report", "active-users-report"]);

    let nav = fixture.catalog.nav_registry(&fixture.settings);
    assert_eq!(nav.submenu().count(), 2);
    assert_eq!(nav.find("earnings-report").unwrap().parent, None);

    let index = render_reports_index(&nav, &fixture.settings);
    assert!(index.contains(">Badges</a>"));
    assert!(index.contains(">Active Users Report</a>"));
}

#[test]
fn achievement_report_counts_unlocks_in_range() {
    let fixture = fixture();
    let html = render(&fixture, "badges", &january(""));

    assert!(html.contains("<h2>Badges</h2>"));
    assert!(html.contains("Total Badges Awarded"));
    assert!(html.contains("<p class=\"stat\">2</p>"));
    assert!(html.contains("<p class=\"stat\">1.00</p>"));
    assert!(html.contains("achievement_id=10"));
    assert!(html.contains("01-10-2023"));

    let csv = read_csv(
        &fixture.settings.uploads_dir,
        "badgeos-report-badges-2023_01_01-2023_01_31",
    );
    assert_eq!(
        csv,
        "Badge Name,Earning Count,Last Earned\n\
         Gold Star,1,2023-01-10 12:00:00\n\
         Silver Star,1,2023-01-31 23:00:00"
    );
}

#[test]
fn earnings_report_lists_earners_of_one_achievement() {
    let fixture = fixture();
    let html = render(&fixture, "earnings-report", &january("&achievement_id=10"));

    assert!(html.contains("Gold Star"));
    assert!(html.contains("Earnings Report"));
    assert!(html.contains("user-edit.php?user_id=1"));
    assert!(!html.contains("grace"));

    let csv = read_csv(
        &fixture.settings.uploads_dir,
        "badgeos-report-earnings-report-2023_01_01-2023_01_31",
    );
    assert_eq!(
        csv,
        "Username,First Name,Last Name,Email,Earned Count,Last Earned\n\
         ada,Ada,Lovelace,ada@example.org,1,2023-01-10 12:00:00"
    );
}

#[test]
fn earnings_report_without_achievement_has_no_table() {
    let fixture = fixture();
    let html = render(&fixture, "earnings-report", &january(""));
    assert!(html.contains("Total Users"));
    assert!(!html.contains("<table"));
}

#[test]
fn active_users_counts_recent_and_lifetime_unlocks() {
    let fixture = fixture();
    let html = render(&fixture, "active-users-report", &january(""));

    assert!(html.contains("earned achievements within this time period"));
    assert!(html.contains("<p class=\"stat\">33.33%</p>"));
    assert!(html.contains("id=\"lineChart\""));
    assert!(html.contains("Dec 01, 2022"));

    let csv = read_csv(
        &fixture.settings.uploads_dir,
        "badgeos-report-active-users-report-2023_01_01-2023_01_31",
    );
    assert_eq!(
        csv,
        "Username,First Name,Last Name,Email,Total Achievements,Achievements Earned in Range,Last Achievement Date,Date Joined\n\
         ada,Ada,Lovelace,ada@example.org,3,2,2023-01-31 23:00:00,2022-12-01 00:00:00"
    );

    let store = CsvStore::from_settings(&fixture.settings);
    assert!(store
        .url("badgeos-report-active-users-report-2023_01_01-2023_01_31")
        .unwrap()
        .starts_with("https://example.org/uploads/reports/"));
}

#[test]
fn end_day_is_fully_included() {
    let fixture = fixture();
    let html = render(
        &fixture,
        "active-users-report",
        &RequestContext::from_query("start_date=2023-02-01&end_date=2023-02-01"),
    );
    assert!(html.contains("grace"));
    assert!(!html.contains("user-edit.php?user_id=1&"));
}

#[test]
fn unknown_slug_is_an_error() {
    let fixture = fixture();
    let result = render_page_by_slug(
        &fixture.catalog,
        "nope",
        &RequestContext::default(),
        Arc::clone(&fixture.settings),
        Arc::new(Hooks::new()),
    );
    assert!(matches!(result, Err(ReportError::UnknownReport(_))));
}
