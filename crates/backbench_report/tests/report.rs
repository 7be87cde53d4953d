//! Report generation over metrics written by real workflow runs.

use backbench_core::Strategy;
use backbench_report::{comparison_charts, load_all, render_all, ChartBody, ChartFormat};
use backbench_testkit::{FakeServer, TestWorkspace};

fn run_everything(ws: &TestWorkspace) {
    for strategy in Strategy::ALL {
        let server = FakeServer::new();
        ws.harness(&server).unwrap().run(strategy).unwrap();
    }
}

#[test]
fn loads_every_strategy() {
    let ws = TestWorkspace::new();
    run_everything(&ws);

    let data = load_all(ws.work_dir()).unwrap();
    assert_eq!(data.strategies().len(), 3);

    let full = data.get(Strategy::Full).unwrap();
    assert_eq!(full.backup.len(), 6);
    assert_eq!(full.restore.len(), 1);

    let log = data.get(Strategy::LogBased).unwrap();
    assert_eq!(log.backup.column("File Name"), Some(2));
    assert!(log.restore.to_string().contains("Log-Based Restore 5"));
}

#[test]
fn grouped_charts_cover_every_batch() {
    let ws = TestWorkspace::new();
    run_everything(&ws);
    let data = load_all(ws.work_dir()).unwrap();

    let charts = comparison_charts(&data).unwrap();
    match &charts[0].body {
        ChartBody::Grouped { series, last_batch } => {
            assert_eq!(*last_batch, 5);
            assert_eq!(series.len(), 3);
            assert!(series.iter().all(|s| s.bars.len() == 6));
        }
        other => panic!("expected grouped chart, got {other:?}"),
    }
    match &charts[2].body {
        ChartBody::Aggregate(totals) => assert_eq!(totals.len(), 3),
        other => panic!("expected aggregate chart, got {other:?}"),
    }
}

#[test]
fn renders_after_a_partial_run() {
    let ws = TestWorkspace::new();
    let server = FakeServer::new();
    ws.harness(&server).unwrap().run(Strategy::LogBased).unwrap();

    let data = load_all(ws.work_dir()).unwrap();
    assert_eq!(data.strategies().len(), 1);

    let out = ws.path("charts");
    let written = render_all(&data, &out, ChartFormat::Svg).unwrap();
    assert_eq!(written.len(), 4);
    assert!(written.iter().all(|p| p.starts_with(&out) && p.exists()));
}
