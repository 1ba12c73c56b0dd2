//! End-to-end pipeline tests against an in-memory SQLite database:
//! spec file → query → groups → series → figure → writer output.

#![cfg(feature = "sqlite")]

use std::io::Write;

use dbplot::plot::Mark;
use dbplot::reader::SqliteReader;
use dbplot::writer::{JsonWriter, Writer};
use dbplot::{FunctionRegistry, Plot, PlotConfig, Value};

fn seeded_reader() -> SqliteReader {
    let reader = SqliteReader::from_connection_string("sqlite://memory").unwrap();
    reader
        .execute_batch(
            "CREATE TABLE calc (functional TEXT, element TEXT, pw REAL, energy REAL);
             INSERT INTO calc VALUES ('PBE', 'Fe', 100, 4.0);
             INSERT INTO calc VALUES ('PBE', 'Fe', 200, 2.0);
             INSERT INTO calc VALUES ('PBE', 'Fe', 300, 1.0);
             INSERT INTO calc VALUES ('PBE', 'Ni', 100, 6.0);
             INSERT INTO calc VALUES ('PBE', 'Ni', 200, 3.0);
             INSERT INTO calc VALUES ('LDA', 'Fe', 100, 5.0);",
        )
        .unwrap();
    reader
}

fn spec_file(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn line_plot_from_spec_file() {
    let file = spec_file(
        r#"{
            "type": "line",
            "title": "Convergence",
            "query": "SELECT element, pw, energy FROM calc WHERE functional = ?1 ORDER BY pw",
            "x_columns": "pw",
            "y_columns": "energy",
            "group_columns": "element"
        }"#,
    );
    let config = PlotConfig::from_path(file.path()).unwrap();
    let plot = Plot::new(config, &FunctionRegistry::builtins()).unwrap();

    let reader = seeded_reader();
    let figure = plot.render(&reader, &[Value::text("PBE")]).unwrap();

    assert_eq!(figure.title, "Convergence");
    let labels: Vec<&str> = figure.series.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["Fe", "Ni"]);

    match &figure.series[0].mark {
        Mark::Line { points, .. } => {
            let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
            assert_eq!(xs, vec![100.0, 200.0, 300.0]);
        }
        _ => panic!("expected a line series"),
    }

    // Fe resolves through the element style table
    assert_eq!(figure.series[0].style.color, "darkred");
}

#[test]
fn grouped_bar_plot_with_mean() {
    let config: PlotConfig = serde_json::from_str(
        r#"{
            "type": "bar",
            "query": "SELECT element, energy FROM calc",
            "x_columns": "energy",
            "group_columns": "element",
            "aggregation_function": "mean"
        }"#,
    )
    .unwrap();
    let plot = Plot::new(config, &FunctionRegistry::builtins()).unwrap();
    let figure = plot.render(&seeded_reader(), &[]).unwrap();

    // Fe: mean(4, 2, 1, 5) = 3.0 over four rows; Ni: mean(6, 3) = 4.5
    let bars: Vec<(String, f64, usize)> = figure
        .series
        .iter()
        .map(|s| match &s.mark {
            Mark::Bars { bars } => (s.label.clone(), bars[0].height, bars[0].multiplicity),
            _ => panic!("expected bars"),
        })
        .collect();
    assert_eq!(
        bars,
        vec![("Fe".to_string(), 3.0, 4), ("Ni".to_string(), 4.5, 2)]
    );

    let ticks: Vec<&str> = figure.x_ticks.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(ticks, vec!["Fe", "Ni"]);
}

#[test]
fn derivative_post_transform_over_query_results() {
    let config: PlotConfig = serde_json::from_str(
        r#"{
            "type": "line",
            "query": "SELECT pw, energy FROM calc WHERE element = 'Fe' AND functional = 'PBE'",
            "x_columns": "pw",
            "y_columns": "energy",
            "post": ["derivative"]
        }"#,
    )
    .unwrap();
    let plot = Plot::new(config, &FunctionRegistry::builtins()).unwrap();
    let figure = plot.render(&seeded_reader(), &[]).unwrap();

    // energies 4, 2, 1 at pw 100, 200, 300; endpoints drop, one point remains
    match &figure.series[0].mark {
        Mark::Line { points, .. } => {
            assert_eq!(points.len(), 1);
            assert_eq!(points[0].x, 200.0);
            assert!((points[0].y - (-0.015)).abs() < 1e-12);
        }
        _ => panic!("expected a line series"),
    }
}

#[test]
fn json_writer_output_is_machine_readable() {
    let config: PlotConfig = serde_json::from_str(
        r#"{
            "type": "hist",
            "query": "SELECT energy FROM calc",
            "x_columns": "energy",
            "bins": 3
        }"#,
    )
    .unwrap();
    let plot = Plot::new(config, &FunctionRegistry::builtins()).unwrap();
    let figure = plot.render(&seeded_reader(), &[]).unwrap();

    let out = JsonWriter.write(&figure).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["series"][0]["mark"]["kind"], "bars");
    assert_eq!(parsed["series"][0]["mark"]["bars"].as_array().unwrap().len(), 3);
}

#[test]
fn file_backed_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jobs.db");
    {
        let reader =
            SqliteReader::from_connection_string(&format!("sqlite://{}", path.display())).unwrap();
        reader
            .execute_batch(
                "CREATE TABLE t (x REAL); INSERT INTO t VALUES (1.0); INSERT INTO t VALUES (2.0);",
            )
            .unwrap();
    }

    let config: PlotConfig = serde_json::from_str(
        r#"{"type": "bar", "query": "SELECT x FROM t", "x_columns": "x",
            "aggregation_function": "sum"}"#,
    )
    .unwrap();
    let plot = Plot::new(config, &FunctionRegistry::builtins()).unwrap();

    let reader =
        SqliteReader::from_connection_string(&format!("sqlite://{}", path.display())).unwrap();
    let figure = plot.render(&reader, &[]).unwrap();
    match &figure.series[0].mark {
        Mark::Bars { bars } => assert_eq!(bars[0].height, 3.0),
        _ => panic!("expected bars"),
    }
}
