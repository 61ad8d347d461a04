// Copyright 2023 Xayn AG
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::{fs, path::Path, process::Command};

use latency_report::{
    catalog::ReportConfig,
    duration::ParseMode,
    render::render_all,
    report::{build_all, dump_reports, ReportError},
    results::{BenchmarkResults, ResultsError},
};
use tempfile::TempDir;

const MINIMAL: &str = r#"{
    "tracks_media_some on poggers": {"500": "1.2s"},
    "tracks_media_some on hasura": {"500": "900ms"},
    "tracks_media_some on postgraphile": {"500": "0.05m"}
}"#;

const CATALOG: &str = r#"
[[queries]]
name = "tracks_media_some"
base_rate = 500
iterations = 2
"#;

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn minimal_setup() -> (TempDir, ReportConfig, BenchmarkResults) {
    let dir = tempfile::tempdir().unwrap();
    let config = write(dir.path(), "catalog.toml", CATALOG);
    let results = write(dir.path(), "benchmark.json", MINIMAL);
    let config = ReportConfig::resolve(Some(config.as_path()), &[] as &[&str], None).unwrap();
    let results = BenchmarkResults::load(&results).unwrap();
    (dir, config, results)
}

#[test]
fn test_minimal_fixture_gives_three_series() {
    let (_dir, config, results) = minimal_setup();
    let reports = build_all(&config, &results).unwrap();

    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.file_name, "tracks_media_some.png");
    let lines: Vec<_> = report
        .series
        .iter()
        .map(|series| (series.technology.as_str(), series.points[0].seconds))
        .collect();
    assert_eq!(
        lines,
        [("poggers", 1.2), ("hasura", 0.9), ("postgraphile", 0.05 * 60.)]
    );
}

#[test]
fn test_missing_series_aborts_the_report() {
    let (dir, config, _) = minimal_setup();
    let results = write(
        dir.path(),
        "partial.json",
        r#"{
            "tracks_media_some on hasura": {"500": "900ms"},
            "tracks_media_some on postgraphile": {"500": "1s"}
        }"#,
    );
    let results = BenchmarkResults::load(&results).unwrap();

    let error = build_all(&config, &results).unwrap_err();
    assert_eq!(
        error,
        ReportError::Missing(ResultsError::MissingSeries(
            "tracks_media_some on poggers".into()
        ))
    );
}

#[test]
fn test_extraction_is_deterministic() {
    let (dir, config, results) = minimal_setup();
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");

    dump_reports(&first, &build_all(&config, &results).unwrap()).unwrap();
    let reloaded = BenchmarkResults::load(&dir.path().join("benchmark.json")).unwrap();
    dump_reports(&second, &build_all(&config, &reloaded).unwrap()).unwrap();

    assert_eq!(fs::read(first).unwrap(), fs::read(second).unwrap());
}

#[test]
fn test_parse_mode_override() {
    let (dir, _, results) = minimal_setup();
    let config = ReportConfig::resolve(
        Some(dir.path().join("catalog.toml").as_path()),
        &["tracks_media_some"],
        Some(ParseMode::Legacy),
    )
    .unwrap();
    assert_eq!(config.parse_mode(), ParseMode::Legacy);

    let reports = build_all(&config, &results).unwrap();
    // `1.2s` loses its last digit
    assert_eq!(reports[0].series[0].points[0].seconds, 1.);
    // `0.05m` reads as `0.0` minutes
    assert_eq!(reports[0].series[2].points[0].seconds, 0.);
}

#[test]
fn test_unknown_query_filter_is_rejected() {
    let error = ReportConfig::resolve(None, &["tracks_media_all"], None).unwrap_err();
    assert!(error.to_string().contains("tracks_media_all"));
}

#[test]
fn test_missing_output_dir_is_rejected() {
    let (dir, config, results) = minimal_setup();
    let reports = build_all(&config, &results).unwrap();
    assert!(render_all(&reports, config.chart(), &dir.path().join("missing")).is_err());
}

#[test]
fn test_writes_one_png_per_query() {
    let (dir, config, results) = minimal_setup();
    let reports = build_all(&config, &results).unwrap();

    let written = render_all(&reports, config.chart(), dir.path()).unwrap();

    assert_eq!(written, [dir.path().join("tracks_media_some.png")]);
    let png = fs::read(&written[0]).unwrap();
    assert!(png.starts_with(b"\x89PNG"));
}

#[test]
fn test_plot_binary_writes_data_and_charts() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(dir.path(), "catalog.toml", CATALOG);
    let input = write(dir.path(), "benchmark.json", MINIMAL);
    let charts = dir.path().join("charts");
    fs::create_dir(&charts).unwrap();
    let data_out = dir.path().join("report.json");

    let output = Command::new(env!("CARGO_BIN_EXE_latency-plot"))
        .arg("--config")
        .arg(&config)
        .arg("--input")
        .arg(&input)
        .arg("--output-dir")
        .arg(&charts)
        .arg("--data-out")
        .arg(&data_out)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let data: serde_json::Value = serde_json::from_slice(&fs::read(&data_out).unwrap()).unwrap();
    assert_eq!(data[0]["query"], "tracks_media_some");
    assert_eq!(data[0]["series"].as_array().unwrap().len(), 3);
    let seconds = data[0]["series"][2]["points"][0]["seconds"].as_f64().unwrap();
    assert!((seconds - 3.).abs() < 1e-9, "{seconds}");

    let png = fs::read(charts.join("tracks_media_some.png")).unwrap();
    assert!(png.starts_with(b"\x89PNG"));
}

#[test]
fn test_plot_binary_writes_nothing_on_missing_series() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(dir.path(), "catalog.toml", CATALOG);
    let input = write(
        dir.path(),
        "benchmark.json",
        r#"{"tracks_media_some on poggers": {"500": "1.2s"}}"#,
    );
    let data_out = dir.path().join("report.json");

    let status = Command::new(env!("CARGO_BIN_EXE_latency-plot"))
        .arg("--config")
        .arg(&config)
        .arg("--input")
        .arg(&input)
        .arg("--output-dir")
        .arg(dir.path())
        .arg("--data-out")
        .arg(&data_out)
        .status()
        .unwrap();
    assert!(!status.success());
    assert!(!data_out.exists());
    assert!(!dir.path().join("tracks_media_some.png").exists());
}
