//! End-to-end workflow tests against the in-memory server.

use backbench_core::artifacts::{log_segment_file, FULL_DUMP_FILE, LOG_BASED_BASE_FILE};
use backbench_core::metrics::{BackupRow, LogBackupRow, LogRestoreRow, MetricsRow, RestoreRow};
use backbench_core::{BenchConfig, BenchError, Database, Rotation, Strategy};
use backbench_testkit::{
    with_workspace, FakeServer, ScriptedCpuSampler, TestWorkspace, EVENT_OVERHEAD_BYTES, ROW_BYTES,
};

// ============================================================================
// Full
// ============================================================================

#[test]
fn full_restore_is_lossless() {
    with_workspace(|ws, server| {
        let summary = ws.harness(server).unwrap().run(Strategy::Full).unwrap();

        assert_eq!(summary.rows_before_drop, 150);
        assert_eq!(summary.rows_expected, 150);
        assert_eq!(summary.rows_restored, 150);
        assert!(summary.is_lossless());
        assert!(summary.rotation.is_none());
        assert!(ws.path(FULL_DUMP_FILE).exists());
        assert_eq!(FULL_DUMP_FILE, "backup.sql");
        assert!(!ws.path(LOG_BASED_BASE_FILE).exists());
    });
}

#[test]
fn full_writes_one_backup_row_per_dump() {
    with_workspace(|ws, server| {
        ws.harness(server).unwrap().run(Strategy::Full).unwrap();

        let (headers, rows) = ws.read_csv(Strategy::Full.backup_log_file());
        assert_eq!(headers.iter().collect::<Vec<_>>(), BackupRow::HEADERS);
        assert_eq!(rows.len(), 6);
        for (batch, row) in rows.iter().enumerate() {
            assert_eq!(&row[0], batch.to_string());
            assert_eq!(&row[1], "full");
            assert_eq!(&row[2], (100 + 10 * batch).to_string());
        }

        let (headers, restores) = ws.read_csv(Strategy::Full.restore_log_file());
        assert_eq!(headers.iter().collect::<Vec<_>>(), RestoreRow::HEADERS);
        assert_eq!(restores.len(), 1);
        assert_eq!(&restores[0][0], "full");
        assert_eq!(&restores[0][1], "0");
        assert_eq!(restores[0][3].parse::<f64>().unwrap(), 12.5);
        assert_eq!(restores[0][4].parse::<f64>().unwrap(), 87.25);
    });
}

#[test]
fn full_does_not_need_binary_logging() {
    with_workspace(|ws, server| {
        server.disable_logging();
        let summary = ws.harness(server).unwrap().run(Strategy::Full).unwrap();
        assert!(summary.is_lossless());
    });
}

#[test]
fn full_and_incremental_logs_accumulate_across_runs() {
    with_workspace(|ws, server| {
        ws.harness(server).unwrap().run(Strategy::Full).unwrap();
        ws.harness(server).unwrap().run(Strategy::Full).unwrap();
        ws.harness(server).unwrap().run(Strategy::Incremental).unwrap();
        ws.harness(server).unwrap().run(Strategy::Incremental).unwrap();

        assert_eq!(ws.backup_rows(Strategy::Full).len(), 12);
        assert_eq!(ws.restore_rows(Strategy::Full).len(), 2);
        assert_eq!(ws.backup_rows(Strategy::Incremental).len(), 12);
        assert_eq!(ws.restore_rows(Strategy::Incremental).len(), 12);
    });
}

// ============================================================================
// Incremental
// ============================================================================

#[test]
fn incremental_rotates_once_per_batch() {
    with_workspace(|ws, server| {
        let summary = ws
            .harness(server)
            .unwrap()
            .run(Strategy::Incremental)
            .unwrap();

        assert!(summary.is_lossless());
        assert_eq!(summary.rows_restored, 150);
        assert_eq!(summary.segments_captured, 5);
        assert_eq!(server.flushes(), 5);
        assert_eq!(server.logs().len(), 6);

        let extractions = server.extractions();
        assert_eq!(extractions.len(), 5);
        assert!(extractions.iter().all(|(_, window)| window.is_none()));
        let files: Vec<&str> = extractions.iter().map(|(f, _)| f.as_str()).collect();
        assert_eq!(
            files,
            ["binlog.000002", "binlog.000003", "binlog.000004", "binlog.000005", "binlog.000006"]
        );
    });
}

#[test]
fn incremental_csv_tracks_cumulative_rows() {
    with_workspace(|ws, server| {
        ws.harness(server)
            .unwrap()
            .run(Strategy::Incremental)
            .unwrap();

        let backups = ws.backup_rows(Strategy::Incremental);
        assert_eq!(&backups[0][1], "full");
        assert_eq!(&backups[0][2], "100");
        assert_eq!(&backups[5][1], "incremental");
        assert_eq!(&backups[5][2], "150");

        let restores = ws.restore_rows(Strategy::Incremental);
        let phases: Vec<(&str, &str)> = restores.iter().map(|r| (&r[0], &r[1])).collect();
        assert_eq!(
            phases,
            [
                ("full", "0"),
                ("incremental", "1"),
                ("incremental", "2"),
                ("incremental", "3"),
                ("incremental", "4"),
                ("incremental", "5"),
            ]
        );
    });
}

#[test]
fn incremental_requires_binary_logging() {
    with_workspace(|ws, server| {
        server.disable_logging();
        let result = ws.harness(server).unwrap().run(Strategy::Incremental);
        assert!(matches!(result, Err(BenchError::MissingLogStatus)));
    });
}

// ============================================================================
// Log-based
// ============================================================================

#[test]
fn log_based_reproduces_final_count() {
    with_workspace(|ws, server| {
        let mut harness = ws.harness(server).unwrap();
        let summary = harness.run(Strategy::LogBased).unwrap();

        assert!(summary.is_consistent());
        assert!(summary.is_lossless());
        assert_eq!(summary.rows_restored, 150);
        assert_eq!(summary.segments_captured, 5);
        assert_eq!(server.flushes(), 0);
        assert_eq!(harness.database().row_count().unwrap(), 150);
        assert_eq!(server.rows(), 150);
    });
}

#[test]
fn log_based_windows_are_contiguous() {
    with_workspace(|ws, server| {
        ws.harness(server).unwrap().run(Strategy::LogBased).unwrap();

        let windows: Vec<_> = server
            .extractions()
            .into_iter()
            .map(|(_, w)| w.expect("log-based extraction is always bounded"))
            .collect();
        assert_eq!(windows.len(), 5);
        for pair in windows.windows(2) {
            assert_eq!(pair[0].stop, pair[1].start);
            assert_eq!(pair[0].file, pair[1].file);
        }
        // One 10-row insert statement per batch.
        for window in &windows {
            assert_eq!(window.len(), EVENT_OVERHEAD_BYTES + 10 * ROW_BYTES);
        }
    });
}

#[test]
fn log_based_replays_in_capture_order() {
    with_workspace(|ws, server| {
        ws.harness(server).unwrap().run(Strategy::LogBased).unwrap();

        let applied: Vec<String> = server
            .applied()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        let mut expected = vec![LOG_BASED_BASE_FILE.to_string()];
        expected.extend((1..=5).map(log_segment_file));
        assert_eq!(applied, expected);

        let restores = ws.restore_rows(Strategy::LogBased);
        let steps: Vec<&str> = restores.iter().map(|r| &r[0]).collect();
        assert_eq!(
            steps,
            [
                "Full Restore",
                "Log-Based Restore 1",
                "Log-Based Restore 2",
                "Log-Based Restore 3",
                "Log-Based Restore 4",
                "Log-Based Restore 5",
            ]
        );
        assert_eq!(&restores[0][1], LOG_BASED_BASE_FILE);
    });
}

#[test]
fn log_based_csv_layout() {
    with_workspace(|ws, server| {
        ws.harness(server).unwrap().run(Strategy::LogBased).unwrap();

        let (headers, backups) = ws.read_csv(Strategy::LogBased.backup_log_file());
        assert_eq!(headers.iter().collect::<Vec<_>>(), LogBackupRow::HEADERS);
        assert_eq!(backups.len(), 6);
        assert_eq!(&backups[0][1], "Full");
        assert_eq!(&backups[0][2], LOG_BASED_BASE_FILE);
        assert_eq!(&backups[3][0], "3");
        assert_eq!(&backups[3][1], "Log-Based");
        assert_eq!(&backups[3][2], "logbackup_batch3.sql");

        let (headers, _) = ws.read_csv(Strategy::LogBased.restore_log_file());
        assert_eq!(headers.iter().collect::<Vec<_>>(), LogRestoreRow::HEADERS);
    });
}

#[test]
fn log_based_logs_are_truncated_per_run() {
    with_workspace(|ws, server| {
        ws.harness(server).unwrap().run(Strategy::LogBased).unwrap();
        ws.harness(server).unwrap().run(Strategy::LogBased).unwrap();

        assert_eq!(ws.backup_rows(Strategy::LogBased).len(), 6);
        assert_eq!(ws.restore_rows(Strategy::LogBased).len(), 6);
    });
}

#[test]
fn rotation_stops_the_batch_loop() {
    with_workspace(|ws, server| {
        // Seed is 100 rows, so the third batch crosses 130.
        server.rotate_when_rows_reach(130);
        let summary = ws.harness(server).unwrap().run(Strategy::LogBased).unwrap();

        assert_eq!(
            summary.rotation,
            Some(Rotation {
                from: "binlog.000001".into(),
                to: "binlog.000002".into(),
                batch: 3,
            })
        );
        assert_eq!(summary.segments_captured, 2);
        assert_eq!(summary.rows_before_drop, 130);
        assert_eq!(summary.rows_expected, 120);
        assert_eq!(summary.rows_restored, 120);
        assert!(summary.is_consistent());
        assert!(!summary.is_lossless());

        assert_eq!(server.extractions().len(), 2);
        assert_eq!(ws.backup_rows(Strategy::LogBased).len(), 3);
        assert_eq!(ws.restore_rows(Strategy::LogBased).len(), 3);
        assert!(!ws.path(&log_segment_file(3)).exists());
    });
}

#[test]
fn rotation_during_seeding_is_harmless() {
    with_workspace(|ws, server| {
        server.rotate_when_rows_reach(50);
        let summary = ws.harness(server).unwrap().run(Strategy::LogBased).unwrap();

        assert!(summary.rotation.is_none());
        assert!(summary.is_lossless());
        assert!(server
            .extractions()
            .iter()
            .all(|(file, _)| file == "binlog.000002"));
    });
}

#[test]
fn log_based_requires_binary_logging() {
    with_workspace(|ws, server| {
        server.disable_logging();
        let result = ws.harness(server).unwrap().run(Strategy::LogBased);
        assert!(matches!(result, Err(BenchError::MissingLogStatus)));
    });
}

// ============================================================================
// Shared behaviour
// ============================================================================

#[test]
fn tool_failure_halts_the_run() {
    with_workspace(|ws, server| {
        server.fail_apply("ERROR 1064 (42000): You have an error in your SQL syntax");
        let result = ws.harness(server).unwrap().run(Strategy::Full);

        match result {
            Err(BenchError::ToolFailed { tool, stderr, .. }) => {
                assert_eq!(tool, "mysql");
                assert!(stderr.contains("1064"));
            }
            other => panic!("expected tool failure, got {other:?}"),
        }
        assert_eq!(ws.backup_rows(Strategy::Full).len(), 6);
        assert!(ws.restore_rows(Strategy::Full).is_empty());
        assert_eq!(server.applied().len(), 1);
    });
}

#[test]
fn zero_batches_restores_the_seed() {
    let mut ws = TestWorkspace::new();
    ws.configure(|c| c.batches(0));
    for strategy in Strategy::ALL {
        let server = FakeServer::new();
        let summary = ws.harness(&server).unwrap().run(strategy).unwrap();
        assert_eq!(summary.rows_restored, 100, "{strategy}");
        assert_eq!(summary.segments_captured, 0, "{strategy}");
    }
}

#[test]
fn cpu_samples_bracket_every_restore() {
    with_workspace(|ws, server| {
        let cpu = ScriptedCpuSampler::new(vec![5.0, 95.0]);
        let mut harness = ws.harness_with_cpu(server, cpu).unwrap();
        harness.run(Strategy::LogBased).unwrap();
        let (_, _, cpu) = harness.into_parts();

        // Full restore plus five windows, two samples each.
        assert_eq!(cpu.taken(), 12);
        for row in ws.restore_rows(Strategy::LogBased) {
            assert_eq!(row[3].parse::<f64>().unwrap(), 5.0);
            assert_eq!(row[4].parse::<f64>().unwrap(), 95.0);
        }
    });
}

#[test]
fn constant_cpu_reading_fills_every_restore_row() {
    with_workspace(|ws, server| {
        let cpu = ScriptedCpuSampler::constant(42.0);
        let mut harness = ws.harness_with_cpu(server, cpu).unwrap();
        harness.run(Strategy::Incremental).unwrap();

        let restores = ws.restore_rows(Strategy::Incremental);
        assert_eq!(restores.len(), 6);
        for row in restores {
            assert_eq!(row[3].parse::<f64>().unwrap(), 42.0);
            assert_eq!(row[4].parse::<f64>().unwrap(), 42.0);
        }
    });
}

#[test]
fn each_batch_commits_as_one_transaction() {
    with_workspace(|ws, server| {
        ws.harness(server).unwrap().run(Strategy::LogBased).unwrap();

        // Seed of 100 in chunks of 25, then five single-statement batches.
        assert_eq!(server.transactions(), 6);
        assert_eq!(server.insert_statements(), 4 + 5);
    });
}

#[test]
fn failed_insert_statement_commits_none_of_its_batch() {
    with_workspace(|ws, server| {
        server.fail_insert_at_statement(3);
        let result = ws.harness(server).unwrap().run(Strategy::Full);

        assert!(matches!(result, Err(BenchError::Io(_))));
        assert_eq!(server.rows(), 0);
        assert_eq!(server.transactions(), 0);
        assert!(server.logs()[0].events.is_empty());
        assert!(server.calls().is_empty());
    });
}

#[test]
fn invalid_config_is_rejected_before_touching_the_server() {
    let ws = TestWorkspace::with_config(BenchConfig::new().insert_chunk_size(0));
    let server = FakeServer::new();
    let result = ws.harness(&server);
    assert!(matches!(result, Err(BenchError::InvalidConfig { .. })));
    assert_eq!(server.insert_statements(), 0);
}

// ============================================================================
// Reference scenario
// ============================================================================

fn reference_workspace(initial: u64, batches: u32, per_batch: u64) -> TestWorkspace {
    TestWorkspace::with_config(
        BenchConfig::new()
            .initial_records(initial)
            .batches(batches)
            .records_per_batch(per_batch)
            .insert_chunk_size(1_000),
    )
}

#[test]
fn reference_scenario_scaled() {
    let ws = reference_workspace(400, 10, 10);
    for strategy in Strategy::ALL {
        let server = FakeServer::new();
        let summary = ws.harness(&server).unwrap().run(strategy).unwrap();
        assert_eq!(summary.rows_restored, 500, "{strategy}");
        assert!(summary.is_lossless(), "{strategy}");
    }
}

#[test]
#[ignore = "generates 500k synthetic rows per strategy"]
fn reference_scenario_full_size() {
    let ws = reference_workspace(400_000, 10, 10_000);
    for strategy in [Strategy::Full, Strategy::LogBased] {
        let server = FakeServer::new();
        let summary = ws.harness(&server).unwrap().run(strategy).unwrap();
        assert_eq!(summary.rows_restored, 500_000, "{strategy}");
    }
}
