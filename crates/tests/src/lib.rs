//! # Integration Tests
//!
//! End-to-end tests over synthetic session trees.
//!
//! Covers:
//! - clock calibration and rebasing through the real readers
//! - merge -> validate -> persist on both camera layouts
//! - output determinism and rerun behaviour

#[cfg(test)]
mod fixture {
    use std::fs;
    use std::io::Write;
    use std::path::{Path, PathBuf};

    use contracts::{AlignmentConfig, InertialPolicy, SessionConfig, Thresholds};
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use serde_json::json;
    use tempfile::TempDir;

    pub const CAMERA_START: &str = "2024-06-12 17:01:48.000000";
    pub const EYE_TRACKER_START: &str = "2024-06-12 17:01:51.500000";
    /// Eye-tracker clock runs 3.5 s behind the camera session start
    pub const OFFSET_S: f64 = 3.5;

    /// A recording session laid out on disk
    pub struct Session {
        pub root: TempDir,
        pub config: AlignmentConfig,
    }

    impl Session {
        pub fn camera_dir(&self) -> &Path {
            &self.config.session.camera_dir
        }

        pub fn output_dir(&self) -> PathBuf {
            self.config.session.output_dir()
        }
    }

    /// Builder for a session tree
    ///
    /// Timestamps are given on the camera clock; gaze and inertial records are
    /// written on the eye-tracker clock.
    #[derive(Default)]
    pub struct SessionBuilder {
        flat: Vec<u64>,
        nested: Vec<u64>,
        gaze: Vec<String>,
        imu: Vec<String>,
        policy: InertialPolicy,
        skip_camera_start: bool,
    }

    impl SessionBuilder {
        pub fn flat_image(mut self, id: u64) -> Self {
            self.flat.push(id);
            self
        }

        pub fn nested_image(mut self, id: u64) -> Self {
            self.nested.push(id);
            self
        }

        pub fn gaze(mut self, t: f64, direction: [f64; 3]) -> Self {
            self.gaze.push(
                json!({
                    "timestamp": t + OFFSET_S,
                    "type": "gaze",
                    "data": { "gaze3d": direction, "gaze2d": [0.5, 0.5] },
                })
                .to_string(),
            );
            self
        }

        pub fn raw_gaze_line(mut self, line: &str) -> Self {
            self.gaze.push(line.to_string());
            self
        }

        pub fn gyro(mut self, t: f64, gyroscope: [f64; 3]) -> Self {
            self.imu.push(
                json!({
                    "timestamp": t + OFFSET_S,
                    "type": "imu",
                    "data": { "gyroscope": gyroscope, "accelerometer": [0.0, -9.8, 0.0] },
                })
                .to_string(),
            );
            self
        }

        pub fn policy(mut self, policy: InertialPolicy) -> Self {
            self.policy = policy;
            self
        }

        pub fn without_camera_start(mut self) -> Self {
            self.skip_camera_start = true;
            self
        }

        pub fn build(self) -> Session {
            let root = tempfile::tempdir().unwrap();
            let camera_dir = root.path().join("recordings/s1/Kinect");
            let eye_dir = root.path().join("recordings/s1/Glasses3");
            fs::create_dir_all(&camera_dir).unwrap();
            fs::create_dir_all(&eye_dir).unwrap();

            if !self.skip_camera_start {
                fs::write(camera_dir.join("start_timestamp.txt"), format!("{CAMERA_START}\n"))
                    .unwrap();
            }
            fs::write(eye_dir.join("start_timestamp.txt"), format!("{EYE_TRACKER_START}\n"))
                .unwrap();

            for id in &self.flat {
                write_capture(&camera_dir, *id);
            }
            for id in &self.nested {
                let dir = camera_dir.join(id.to_string());
                fs::create_dir_all(&dir).unwrap();
                write_capture(&dir, *id);
            }

            write_gz(&eye_dir.join("gazedata.gz"), &self.gaze);
            write_gz(&eye_dir.join("imudata.gz"), &self.imu);

            let mut config = AlignmentConfig::for_session(SessionConfig::new(
                camera_dir,
                eye_dir,
                root.path().join("processed"),
            ));
            config.thresholds = Thresholds {
                gaze_time_threshold: 0.5,
                gaze_time_epsilon: 0.1,
                gaze_distance_epsilon: 0.5,
                gaze_variance_epsilon: 0.5,
            };
            config.inertial.policy = self.policy;
            config.video.enabled = false;

            Session { root, config }
        }
    }

    fn write_capture(dir: &Path, id: u64) {
        fs::write(dir.join(format!("{id}.png")), format!("png-{id}")).unwrap();
        fs::write(dir.join(format!("{id}_depth.csv")), format!("{id},1,2,3\n")).unwrap();
    }

    fn write_gz(path: &Path, lines: &[String]) {
        let file = fs::File::create(path).unwrap();
        let mut enc = GzEncoder::new(file, Compression::default());
        for line in lines {
            writeln!(enc, "{line}").unwrap();
        }
        enc.finish().unwrap();
    }

    pub fn read_json(path: &Path) -> serde_json::Value {
        serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
    }

    /// Every file under `dir`, relative path -> contents, sorted
    pub fn snapshot_tree(dir: &Path) -> Vec<(PathBuf, Vec<u8>)> {
        fn walk(base: &Path, dir: &Path, out: &mut Vec<(PathBuf, Vec<u8>)>) {
            for entry in fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    walk(base, &path, out);
                } else {
                    let rel = path.strip_prefix(base).unwrap().to_path_buf();
                    out.push((rel, fs::read(&path).unwrap()));
                }
            }
        }
        let mut out = Vec::new();
        walk(dir, dir, &mut out);
        out.sort();
        out
    }
}

#[cfg(test)]
mod calibration_tests {
    use contracts::{ContractError, EventSource, TimedEvent};
    use ingestion::{ClockCalibrator, SessionSources};

    use crate::fixture::{OFFSET_S, SessionBuilder};

    #[test]
    fn test_offset_from_start_files() {
        let session = SessionBuilder::default().flat_image(1_000_000).build();
        let offset = ClockCalibrator::calibrate_session(&session.config.session).unwrap();
        assert!((offset.seconds() - OFFSET_S).abs() < 1e-9);
    }

    #[test]
    fn test_gaze_rebased_onto_camera_clock() {
        // raw 10.0 on the eye-tracker clock
        let session = SessionBuilder::default()
            .flat_image(1_000_000)
            .raw_gaze_line(r#"{"timestamp": 10.0, "data": {"gaze3d": [0.0, 0.0, 1.0]}}"#)
            .build();

        let mut sources = SessionSources::open(&session.config).unwrap();
        let Some(TimedEvent::Gaze(sample)) = sources.gaze.next_event() else {
            panic!("expected a gaze event");
        };
        assert!((sample.timestamp - 6.5).abs() < 1e-9);
        assert_eq!(sample.raw["gaze3d"][2], 1.0);
    }

    #[test]
    fn test_missing_start_file_is_fatal() {
        let session = SessionBuilder::default()
            .flat_image(1_000_000)
            .without_camera_start()
            .build();

        let err = SessionSources::open(&session.config).err().unwrap();
        assert!(matches!(err, ContractError::Calibration { .. }));
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;

    use contracts::{AlignmentReport, InertialPolicy, RejectReason};
    use ingestion::SessionSources;
    use persister::sidecar::{GAZE_SIDECAR, IMU_SIDECAR};
    use persister::{FileSink, FileSinkConfig};
    use sync_engine::{AlignmentEngine, MergeScheduler};

    use crate::fixture::{Session, SessionBuilder, read_json, snapshot_tree};

    const NEAR_Z: [[f64; 3]; 3] = [[0.0, 0.0, 1.0], [0.01, 0.0, 1.0], [0.0, 0.01, 1.0]];

    /// Open, merge, validate and persist one session to disk
    fn align(session: &Session) -> AlignmentReport {
        let sources = SessionSources::open(&session.config).unwrap();
        let mut scheduler = MergeScheduler::new(sources.into_sources());
        let mut engine = AlignmentEngine::from_config(&session.config);
        let mut sink = FileSink::new(
            "file",
            FileSinkConfig {
                camera_dir: session.camera_dir().to_path_buf(),
                output_dir: session.output_dir(),
            },
        )
        .unwrap();
        engine.run(&mut scheduler, &mut sink).unwrap()
    }

    /// Accepted at t=1.0 (flat) and t=2.0 (nested), recency reject at t=3.0,
    /// empty window at t=5.0
    fn mixed_session() -> Session {
        SessionBuilder::default()
            .flat_image(1_000_000)
            .nested_image(2_000_000)
            .flat_image(3_000_000)
            .flat_image(5_000_000)
            .gyro(0.5, [0.1, 0.0, 0.0])
            .gaze(0.950, NEAR_Z[0])
            .gaze(0.970, NEAR_Z[1])
            .gaze(0.995, NEAR_Z[2])
            .gaze(1.950, NEAR_Z[0])
            .gaze(1.990, NEAR_Z[1])
            .gaze(2.800, NEAR_Z[0])
            .gaze(6.000, NEAR_Z[0])
            .build()
    }

    #[test]
    fn test_accepted_bundle_holds_latest_sample() {
        let session = mixed_session();
        let report = align(&session);
        assert!(report.bundles_accepted >= 1);

        let dir = session.output_dir().join("1000000");
        assert!(dir.join("1000000.png").is_file());
        assert!(dir.join("1000000_depth.csv").is_file());

        let gaze = read_json(&dir.join(GAZE_SIDECAR));
        assert_eq!(gaze["image_id"], 1_000_000);
        assert!((gaze["timestamp"].as_f64().unwrap() - 0.995).abs() < 1e-9);
        assert_eq!(gaze["gaze3d"][1], 0.01);
        assert_eq!(gaze["data"]["gaze2d"][0], 0.5);

        let imu = read_json(&dir.join(IMU_SIDECAR));
        assert_eq!(imu["gyroscope"][0], 0.1);
        assert!(imu.get("orientation").is_none());
    }

    #[test]
    fn test_gate_outcomes_per_image() {
        let session = mixed_session();
        let report = align(&session);

        assert_eq!(report.images_seen, 4);
        assert_eq!(report.bundles_accepted, 2);
        assert_eq!(report.rejected_by(RejectReason::Recency), 1);
        assert_eq!(report.rejected_by(RejectReason::EmptyWindow), 1);

        let out = session.output_dir();
        assert!(out.join("1000000").is_dir());
        assert!(out.join("2000000").join("2000000.png").is_file());
        assert!(!out.join("3000000").exists());
        assert!(!out.join("5000000").exists());
    }

    #[test]
    fn test_trailing_gaze_after_last_image_ignored() {
        let session = mixed_session();
        let report = align(&session);
        // the 6.0 sample is never dispatched once no image is pending
        assert_eq!(
            report.events_dispatched.get(&contracts::StreamKind::Gaze).copied(),
            Some(6)
        );
    }

    #[test]
    fn test_rerun_output_is_byte_identical() {
        let session = mixed_session();
        align(&session);
        let first = snapshot_tree(&session.output_dir());

        // stale files inside a bundle directory are replaced, not merged
        fs::write(session.output_dir().join("1000000").join("stale.txt"), b"x").unwrap();

        align(&session);
        let second = snapshot_tree(&session.output_dir());
        assert_eq!(first, second);
    }

    #[test]
    fn test_capture_in_both_layouts_persisted_once() {
        let session = SessionBuilder::default()
            .flat_image(1_000_000)
            .nested_image(1_000_000)
            .gaze(0.950, NEAR_Z[0])
            .gaze(0.995, NEAR_Z[1])
            .build();

        let report = align(&session);
        assert_eq!(report.images_seen, 1);
        assert_eq!(report.bundles_accepted, 1);

        let entries: Vec<_> = fs::read_dir(session.output_dir()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_malformed_records_skipped_and_counted() {
        let session = SessionBuilder::default()
            .flat_image(1_000_000)
            .gaze(0.950, NEAR_Z[0])
            .raw_gaze_line("not json")
            .raw_gaze_line(r#"{"timestamp": 4.46, "data": {}}"#)
            .gaze(0.995, NEAR_Z[1])
            .build();

        let report = align(&session);
        assert_eq!(report.bundles_accepted, 1);
        assert!(report.total_skipped() >= 1);
    }

    #[test]
    fn test_integrate_policy_writes_orientation() {
        let session = SessionBuilder::default()
            .flat_image(1_000_000)
            .policy(InertialPolicy::Integrate)
            .gyro(0.5, [1.0, 0.0, 0.0])
            .gyro(0.7, [1.0, 0.0, 0.0])
            .gyro(0.9, [1.0, 0.0, 0.0])
            .gaze(0.950, NEAR_Z[0])
            .gaze(0.995, NEAR_Z[1])
            .build();

        align(&session);
        let imu = read_json(&session.output_dir().join("1000000").join(IMU_SIDECAR));
        let x = imu["orientation"][0].as_f64().unwrap();
        assert!((x - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_session_config_from_toml() {
        let session = mixed_session();
        let toml = config_loader::ConfigLoader::to_toml(&session.config).unwrap();
        let loaded = config_loader::ConfigLoader::load_from_str(&toml, config_loader::ConfigFormat::Toml)
            .unwrap();
        assert_eq!(loaded.thresholds, session.config.thresholds);
        assert_eq!(loaded.session.output_dir(), session.output_dir());
        assert!(session.root.path().exists());
    }
}
