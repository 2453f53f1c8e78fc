use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use sales_dashboard::{
    load_config, CategoryAggregate, DashboardConfig, DashboardError, DatasetStore, GeoRecord,
    HeatmapCell, Opener, RatingAggregate, SalesDashboard, SalesRecord,
};

const SALES_CSV: &str = "\
date,category,sales
2024-01-01,A,100
2024-01-02,B,50
2024-01-08,A,30
";

const GEO_CSV: &str = "\
region, latitude, longitude, sales, market_share
Paris,48.8566,2.3522,1200,0.3
Lyon,45.7640,4.8357,800,0.2
Marseille,43.2965,5.3698,600,0.15
";

const FEEDBACK_CSV: &str = "\
category,rating
A,5
A,3
B,4
";

/// Records opened paths; shares the list with the test.
#[derive(Clone, Default)]
struct RecordingOpener {
    opened: Arc<Mutex<Vec<PathBuf>>>,
}

impl Opener for RecordingOpener {
    fn open(&self, path: &Path) -> Result<(), DashboardError> {
        self.opened.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

fn write_fixtures(dir: &Path, sales: &str, geo: &str, feedback: &str) {
    fs::write(dir.join("sales_data.csv"), sales).unwrap();
    fs::write(dir.join("geographic_data.csv"), geo).unwrap();
    fs::write(dir.join("customer_feedback.csv"), feedback).unwrap();
}

fn open_dashboard(dir: &Path) -> (SalesDashboard, RecordingOpener) {
    let mut config = DashboardConfig::for_dir(dir);
    config.export_dir = Some(dir.join("exports"));
    let store = DatasetStore::load(&config).unwrap();
    let opener = RecordingOpener::default();
    let dashboard =
        SalesDashboard::with_opener(config, store, Box::new(opener.clone())).unwrap();
    (dashboard, opener)
}

fn totals(dashboard: &SalesDashboard) -> Vec<CategoryAggregate> {
    CategoryAggregate::from_frame(&dashboard.views().category.by_category).unwrap()
}

fn regions(dashboard: &SalesDashboard) -> Vec<String> {
    GeoRecord::from_frame(&dashboard.views().geo.points)
        .unwrap()
        .into_iter()
        .map(|r| r.region)
        .collect()
}

#[test]
fn loads_csv_fixtures_and_exposes_options() {
    let temp = tempfile::tempdir().expect("failed creating tempdir");
    write_fixtures(temp.path(), SALES_CSV, GEO_CSV, FEEDBACK_CSV);
    let (dashboard, _) = open_dashboard(temp.path());

    let store = dashboard.synchronizer().store();
    assert_eq!(store.category_options(), vec!["All", "A", "B"]);
    assert_eq!(store.region_options(), vec!["All", "Paris", "Lyon", "Marseille"]);

    let records = SalesRecord::from_frame(store.sales()).unwrap();
    assert_eq!(records[0].day_of_week, "Monday");
    assert_eq!(records[2].date.to_string(), "2024-01-08");
}

#[test]
fn initial_views_match_the_worked_scenarios() {
    let temp = tempfile::tempdir().expect("failed creating tempdir");
    write_fixtures(temp.path(), SALES_CSV, GEO_CSV, FEEDBACK_CSV);
    let (dashboard, _) = open_dashboard(temp.path());

    assert_eq!(
        totals(&dashboard),
        vec![
            CategoryAggregate { category: "A".into(), total_sales: 130.0 },
            CategoryAggregate { category: "B".into(), total_sales: 50.0 },
        ]
    );
    assert_eq!(
        RatingAggregate::from_frame(&dashboard.views().category.ratings).unwrap(),
        vec![
            RatingAggregate { category: "A".into(), mean_rating: 4.0 },
            RatingAggregate { category: "B".into(), mean_rating: 4.0 },
        ]
    );
    assert_eq!(regions(&dashboard), vec!["Paris", "Lyon", "Marseille"]);
}

#[test]
fn category_and_region_filters_stay_independent() {
    let temp = tempfile::tempdir().expect("failed creating tempdir");
    write_fixtures(temp.path(), SALES_CSV, GEO_CSV, FEEDBACK_CSV);
    let (mut dashboard, _) = open_dashboard(temp.path());

    dashboard.select_category("A").unwrap();
    assert_eq!(
        totals(&dashboard),
        vec![CategoryAggregate { category: "A".into(), total_sales: 130.0 }]
    );
    assert_eq!(
        HeatmapCell::from_frame(&dashboard.views().category.heatmap).unwrap(),
        vec![HeatmapCell {
            day_of_week: "Monday".into(),
            category: "A".into(),
            total_sales: 130.0,
        }]
    );
    assert_eq!(regions(&dashboard).len(), 3);

    dashboard.select_region("Lyon").unwrap();
    assert_eq!(regions(&dashboard), vec!["Lyon"]);
    assert_eq!(totals(&dashboard).len(), 1);

    dashboard.select_category("All").unwrap();
    assert_eq!(totals(&dashboard).len(), 2);
    assert_eq!(regions(&dashboard), vec!["Lyon"]);
}

#[test]
fn export_writes_unfiltered_sales() {
    let temp = tempfile::tempdir().expect("failed creating tempdir");
    write_fixtures(temp.path(), SALES_CSV, GEO_CSV, FEEDBACK_CSV);
    let (mut dashboard, opener) = open_dashboard(temp.path());

    dashboard.select_category("B").unwrap();
    let path = dashboard.export().unwrap();

    assert!(path.starts_with(temp.path().join("exports")));
    assert_eq!(*opener.opened.lock().unwrap(), vec![path.clone()]);

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "date,category,sales,day_of_week");
    assert_eq!(lines.len(), 4, "all three rows despite the B filter");
    assert!(lines[1].starts_with("2024-01-01,A,"));
    assert!(lines[3].ends_with(",Monday"));

    // Export does not touch the views.
    assert_eq!(totals(&dashboard).len(), 1);
}

struct FailingOpener;

impl Opener for FailingOpener {
    fn open(&self, _path: &Path) -> Result<(), DashboardError> {
        Err(DashboardError::Export("no viewer available".into()))
    }
}

#[test]
fn failed_export_leaves_dashboard_state_untouched() {
    let temp = tempfile::tempdir().expect("failed creating tempdir");
    write_fixtures(temp.path(), SALES_CSV, GEO_CSV, FEEDBACK_CSV);
    let config = DashboardConfig::for_dir(temp.path());
    let store = DatasetStore::load(&config).unwrap();
    let mut dashboard = SalesDashboard::with_opener(config, store, Box::new(FailingOpener)).unwrap();

    dashboard.select_category("A").unwrap();
    dashboard.select_region("Lyon").unwrap();
    let selection = dashboard.synchronizer().selection().clone();
    let revision = dashboard.synchronizer().revision();
    let before = dashboard.views().clone();

    let err = dashboard.export().unwrap_err();
    assert!(matches!(err, DashboardError::Export(_)));
    assert!(err.is_recoverable());

    assert_eq!(dashboard.synchronizer().selection(), &selection);
    assert_eq!(dashboard.synchronizer().revision(), revision);
    let after = dashboard.views();
    assert!(after.category.trend.equals(&before.category.trend));
    assert!(after.category.by_category.equals(&before.category.by_category));
    assert!(after.category.heatmap.equals(&before.category.heatmap));
    assert!(after.category.ratings.equals(&before.category.ratings));
    assert!(after.geo.points.equals(&before.geo.points));

    // Still responsive to events afterwards.
    dashboard.select_category("B").unwrap();
    assert_eq!(dashboard.synchronizer().revision(), revision + 1);
}

#[test]
fn unwritable_export_dir_is_recoverable() {
    let temp = tempfile::tempdir().expect("failed creating tempdir");
    write_fixtures(temp.path(), SALES_CSV, GEO_CSV, FEEDBACK_CSV);
    let blocker = temp.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    let mut config = DashboardConfig::for_dir(temp.path());
    config.export_dir = Some(blocker.join("exports"));
    let store = DatasetStore::load(&config).unwrap();
    let opener = RecordingOpener::default();
    let dashboard =
        SalesDashboard::with_opener(config, store, Box::new(opener.clone())).unwrap();

    let err = dashboard.export().unwrap_err();
    assert!(matches!(err, DashboardError::Export(_)));
    assert!(opener.opened.lock().unwrap().is_empty());
    assert_eq!(dashboard.synchronizer().revision(), 0);
}

#[test]
fn malformed_date_aborts_startup() {
    let temp = tempfile::tempdir().expect("failed creating tempdir");
    let sales = "date,category,sales\n2024-13-45,A,1\n";
    write_fixtures(temp.path(), sales, GEO_CSV, FEEDBACK_CSV);

    let err = DatasetStore::load(&DashboardConfig::for_dir(temp.path())).unwrap_err();
    assert!(matches!(err, DashboardError::Load { ref dataset, .. } if dataset == "sales"));
    assert!(!err.is_recoverable());
}

#[test]
fn missing_feedback_file_aborts_startup() {
    let temp = tempfile::tempdir().expect("failed creating tempdir");
    fs::write(temp.path().join("sales_data.csv"), SALES_CSV).unwrap();
    fs::write(temp.path().join("geographic_data.csv"), GEO_CSV).unwrap();

    let err = SalesDashboard::open(DashboardConfig::for_dir(temp.path()))
        .err()
        .expect("load should fail");
    assert!(matches!(err, DashboardError::Load { ref dataset, .. } if dataset == "feedback"));
}

#[test]
fn config_file_drives_file_names() {
    let temp = tempfile::tempdir().expect("failed creating tempdir");
    fs::write(temp.path().join("s.csv"), "date,category,sales\n03/01/2024,A,10\n").unwrap();
    fs::write(temp.path().join("g.csv"), GEO_CSV).unwrap();
    fs::write(temp.path().join("f.csv"), FEEDBACK_CSV).unwrap();

    let config_path = temp.path().join("dashboard.toml");
    fs::write(
        &config_path,
        format!(
            "data_dir = {:?}\nsales_file = \"s.csv\"\ngeo_file = \"g.csv\"\n\
             feedback_file = \"f.csv\"\ndate_format = \"%d/%m/%Y\"\nopen_exports = false\n",
            temp.path().display().to_string()
        ),
    )
    .unwrap();

    let config = load_config(Some(&config_path)).unwrap();
    assert!(!config.open_exports);
    let dashboard = SalesDashboard::open(config).unwrap();

    let records = SalesRecord::from_frame(dashboard.synchronizer().store().sales()).unwrap();
    assert_eq!(records[0].date.to_string(), "2024-01-03");
    assert_eq!(records[0].day_of_week, "Wednesday");
}

#[test]
fn payload_reflects_current_selection() {
    let temp = tempfile::tempdir().expect("failed creating tempdir");
    write_fixtures(temp.path(), SALES_CSV, GEO_CSV, FEEDBACK_CSV);
    let (mut dashboard, _) = open_dashboard(temp.path());

    dashboard.select_region("Paris").unwrap();
    let payload = dashboard.payload().unwrap();
    assert_eq!(payload["selection"]["region"], "Paris");
    assert_eq!(payload["geo"]["region"], serde_json::json!(["Paris"]));
    assert_eq!(payload["sales_trend"]["category"].as_array().unwrap().len(), 3);
}
