//! Property tests over small workloads.

use backbench_core::{PositionTracker, Strategy as BackupStrategy};
use backbench_testkit::{log_walk_strategy, workload_strategy, FakeServer, TestWorkspace};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn every_strategy_restores_the_final_count(w in workload_strategy()) {
        let mut ws = TestWorkspace::new();
        ws.configure(|c| w.apply(c));
        for strategy in BackupStrategy::ALL {
            let server = FakeServer::new();
            let summary = ws.harness(&server).unwrap().run(strategy).unwrap();
            prop_assert_eq!(summary.rows_restored, w.final_rows());
            prop_assert!(summary.is_lossless());
        }
    }

    #[test]
    fn log_based_is_consistent_under_rotation(
        w in workload_strategy(),
        threshold in 1u64..250,
    ) {
        let mut ws = TestWorkspace::new();
        ws.configure(|c| w.apply(c));
        let server = FakeServer::new();
        server.rotate_when_rows_reach(threshold);

        let summary = ws.harness(&server).unwrap().run(BackupStrategy::LogBased).unwrap();

        prop_assert!(summary.is_consistent());
        prop_assert_eq!(
            summary.rows_expected,
            w.initial_records + u64::from(summary.segments_captured) * w.records_per_batch
        );
        match &summary.rotation {
            None => {
                prop_assert!(summary.is_lossless());
                prop_assert_eq!(summary.segments_captured, w.batches);
            }
            Some(rotation) => {
                prop_assert_eq!(rotation.batch, summary.segments_captured + 1);
                prop_assert!(summary.rows_restored < summary.rows_before_drop);
            }
        }
    }

    #[test]
    fn tracker_windows_tile_a_walk((start, steps) in log_walk_strategy()) {
        let mut tracker = PositionTracker::new(start.clone());
        let mut offset = start.offset;
        let mut covered = 0;
        for step in &steps {
            offset += step;
            let end = backbench_core::LogPosition::new(start.file.clone(), offset);
            match tracker.advance(end).unwrap() {
                backbench_core::Advance::Window(window) => covered += window.len(),
                backbench_core::Advance::Rotated { .. } => prop_assert!(false, "no rotation in a single-file walk"),
            }
        }
        prop_assert_eq!(covered, offset - start.offset);
        prop_assert_eq!(tracker.segments() as usize, steps.len());
    }
}
