use std::path::{Path, PathBuf};

use clipsync_common::config::AssemblySettings;
use clipsync_common::error::ClipsyncError;
use clipsync_core::TimelineAssembler;
use clipsync_engine::{EngineCall, Operation, ScriptedEngine};

struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("temp dir"),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Create clip files whose content is their own name, one per line.
    fn clips(&self, names: &[&str]) {
        for name in names {
            std::fs::write(self.path(name), format!("{name}\n")).unwrap();
        }
    }

    fn manifest(&self, lines: &[(f64, f64, &str)]) -> PathBuf {
        let content: String = lines
            .iter()
            .map(|(start, end, name)| {
                format!("[{start}s–{end}s] (SPEAKER_00) {}\n", self.path(name).display())
            })
            .collect();
        let path = self.path("manifest.txt");
        std::fs::write(&path, content).unwrap();
        path
    }
}

fn assembler(engine: ScriptedEngine) -> TimelineAssembler<ScriptedEngine> {
    TimelineAssembler::new(engine, AssemblySettings::default())
}

fn silence_calls(engine: &ScriptedEngine) -> Vec<f64> {
    engine
        .calls_of(Operation::SynthesizeSilence)
        .into_iter()
        .filter_map(|call| match call {
            EngineCall::SynthesizeSilence { secs, .. } => Some(secs),
            _ => None,
        })
        .collect()
}

fn concat_calls(engine: &ScriptedEngine) -> Vec<(Vec<PathBuf>, PathBuf)> {
    engine
        .calls_of(Operation::Concatenate)
        .into_iter()
        .filter_map(|call| match call {
            EngineCall::Concatenate { inputs, output } => Some((inputs, output)),
            _ => None,
        })
        .collect()
}

fn scratch_dir(engine: &ScriptedEngine) -> PathBuf {
    let (_, output) = concat_calls(engine)
        .into_iter()
        .next()
        .expect("at least one concatenation");
    output.parent().unwrap().to_path_buf()
}

#[test]
fn cursor_follows_measured_track_not_nominal_end() {
    let fx = Fixture::new();
    fx.clips(&["a.wav", "b.wav"]);
    let manifest = fx.manifest(&[(0.0, 2.0, "a.wav"), (5.0, 7.0, "b.wav")]);
    let output = fx.path("out.wav");

    // The first track measures 2.4s, not the 2.0s the manifest slot implies.
    let asm = assembler(
        ScriptedEngine::new()
            .with_duration("step_0.wav", 2.4)
            .with_duration("step_1.wav", 7.3)
            .writing_outputs(),
    );
    let summary = asm.build(&manifest, &output).unwrap();

    let silences = silence_calls(asm.engine());
    assert_eq!(silences.len(), 1);
    assert!((silences[0] - 2.6).abs() < 1e-9, "gap should use measured 2.4s");

    assert_eq!(summary.duration_secs, 7.3);
    assert_eq!(summary.steps[0].track_secs, 2.4);
    assert!((summary.total_silence_secs() - 2.6).abs() < 1e-9);
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "a.wav\nsilence:2.600\nb.wav\n"
    );
}

#[test]
fn step_inputs_are_track_then_silence_then_clip() {
    let fx = Fixture::new();
    fx.clips(&["a.wav", "b.wav"]);
    let manifest = fx.manifest(&[(1.5, 3.0, "a.wav"), (4.0, 5.0, "b.wav")]);

    let asm = assembler(
        ScriptedEngine::new()
            .with_duration("step_0.wav", 3.0)
            .with_duration("step_1.wav", 5.0)
            .writing_outputs(),
    );
    asm.build(&manifest, &fx.path("out.wav")).unwrap();

    let concats = concat_calls(asm.engine());
    assert_eq!(concats.len(), 2);

    let scratch = scratch_dir(asm.engine());
    assert_eq!(
        concats[0],
        (
            vec![scratch.join("silence_0.wav"), fx.path("a.wav")],
            scratch.join("step_0.wav")
        )
    );
    assert_eq!(
        concats[1],
        (
            vec![
                scratch.join("step_0.wav"),
                scratch.join("silence_1.wav"),
                fx.path("b.wav")
            ],
            scratch.join("step_1.wav")
        )
    );
    assert_eq!(silence_calls(asm.engine()), vec![1.5, 1.0]);
}

#[test]
fn gap_within_epsilon_inserts_no_silence() {
    let fx = Fixture::new();
    fx.clips(&["a.wav", "b.wav"]);
    let manifest = fx.manifest(&[(0.0, 2.0, "a.wav"), (2.005, 4.0, "b.wav")]);

    let asm = assembler(
        ScriptedEngine::new()
            .with_duration("step_0.wav", 2.0)
            .with_duration("step_1.wav", 4.0)
            .writing_outputs(),
    );
    let summary = asm.build(&manifest, &fx.path("out.wav")).unwrap();

    assert!(silence_calls(asm.engine()).is_empty());
    assert!(summary.steps.iter().all(|s| !s.silence_inserted));
    assert_eq!(
        std::fs::read_to_string(fx.path("out.wav")).unwrap(),
        "a.wav\nb.wav\n"
    );
}

#[test]
fn gap_equal_to_epsilon_inserts_no_silence_and_larger_gap_does() {
    let fx = Fixture::new();
    fx.clips(&["a.wav", "b.wav", "c.wav"]);
    // Track ends at 2.0 and 3.0; gaps are exactly 0.5 and then 0.625.
    let manifest = fx.manifest(&[(0.0, 2.0, "a.wav"), (2.5, 3.0, "b.wav"), (3.625, 4.0, "c.wav")]);

    let asm = TimelineAssembler::new(
        ScriptedEngine::new()
            .with_duration("step_0.wav", 2.0)
            .with_duration("step_1.wav", 3.0)
            .with_duration("step_2.wav", 4.0)
            .writing_outputs(),
        AssemblySettings {
            gap_epsilon_secs: 0.5,
        },
    );
    let summary = asm.build(&manifest, &fx.path("out.wav")).unwrap();

    assert_eq!(summary.steps[1].gap_secs, 0.5);
    assert!(!summary.steps[1].silence_inserted);
    assert!(summary.steps[2].silence_inserted);
    assert_eq!(silence_calls(asm.engine()), vec![0.625]);
}

#[test]
fn gap_just_above_default_epsilon_inserts_silence() {
    let fx = Fixture::new();
    fx.clips(&["a.wav", "b.wav"]);
    let manifest = fx.manifest(&[(0.0, 2.0, "a.wav"), (2.02, 4.0, "b.wav")]);

    let asm = assembler(
        ScriptedEngine::new()
            .with_duration("step_0.wav", 2.0)
            .with_duration("step_1.wav", 4.0)
            .writing_outputs(),
    );
    let summary = asm.build(&manifest, &fx.path("out.wav")).unwrap();

    let silences = silence_calls(asm.engine());
    assert_eq!(silences.len(), 1);
    assert!((silences[0] - 0.02).abs() < 1e-9);
    assert!(summary.steps[1].silence_inserted);
}

#[test]
fn intermediates_stay_wav_and_output_is_encoded_once() {
    let fx = Fixture::new();
    fx.clips(&["a.wav", "b.wav"]);
    let manifest = fx.manifest(&[(0.0, 1.0, "a.wav"), (2.0, 3.0, "b.wav")]);
    let output = fx.path("out.mp3");

    let asm = assembler(
        ScriptedEngine::new()
            .with_duration("step_0.wav", 1.0)
            .with_duration("step_1.wav", 3.0)
            .writing_outputs(),
    );
    let summary = asm.build(&manifest, &output).unwrap();

    let scratch = scratch_dir(asm.engine());
    let concats = concat_calls(asm.engine());
    assert_eq!(concats.len(), 3);
    assert_eq!(
        concats[1],
        (
            vec![
                scratch.join("step_0.wav"),
                scratch.join("silence_1.wav"),
                fx.path("b.wav")
            ],
            scratch.join("step_1.wav")
        )
    );
    assert_eq!(
        concats[2],
        (vec![scratch.join("step_1.wav")], scratch.join("final.mp3"))
    );
    let silence_outputs: Vec<PathBuf> = asm
        .engine()
        .calls_of(Operation::SynthesizeSilence)
        .into_iter()
        .filter_map(|call| match call {
            EngineCall::SynthesizeSilence { output, .. } => Some(output),
            _ => None,
        })
        .collect();
    assert_eq!(silence_outputs, vec![scratch.join("silence_1.wav")]);

    assert_eq!(summary.duration_secs, 3.0);
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "a.wav\nsilence:1.000\nb.wav\n"
    );
    assert!(!scratch.exists());
}

#[test]
fn wav_output_is_moved_without_encoding() {
    let fx = Fixture::new();
    fx.clips(&["a.wav"]);
    let manifest = fx.manifest(&[(0.0, 1.0, "a.wav")]);

    let asm = assembler(ScriptedEngine::new().with_default_duration(1.0).writing_outputs());
    asm.build(&manifest, &fx.path("OUT.WAV")).unwrap();

    assert_eq!(concat_calls(asm.engine()).len(), 1);
    assert_eq!(
        std::fs::read_to_string(fx.path("OUT.WAV")).unwrap(),
        "a.wav\n"
    );
}

#[test]
fn overlapping_entry_is_appended_without_correction() {
    let fx = Fixture::new();
    fx.clips(&["a.wav", "b.wav"]);
    let manifest = fx.manifest(&[(0.0, 3.0, "a.wav"), (2.0, 4.0, "b.wav")]);

    let asm = assembler(
        ScriptedEngine::new()
            .with_duration("step_0.wav", 3.0)
            .with_duration("step_1.wav", 5.0)
            .writing_outputs(),
    );
    let summary = asm.build(&manifest, &fx.path("out.wav")).unwrap();

    assert!(silence_calls(asm.engine()).is_empty());
    assert_eq!(summary.overlap_count(), 1);
    assert_eq!(summary.steps[1].gap_secs, -1.0);
    let scratch = scratch_dir(asm.engine());
    assert_eq!(
        concat_calls(asm.engine())[1].0,
        vec![scratch.join("step_0.wav"), fx.path("b.wav")]
    );
}

#[test]
fn every_step_is_remeasured() {
    let fx = Fixture::new();
    fx.clips(&["a.wav", "b.wav", "c.wav"]);
    let manifest = fx.manifest(&[(0.0, 1.0, "a.wav"), (1.0, 2.0, "b.wav"), (2.0, 3.0, "c.wav")]);

    let asm = assembler(
        ScriptedEngine::new()
            .with_duration("step_0.wav", 1.0)
            .with_duration("step_1.wav", 1.5)
            .with_duration("step_2.wav", 2.5)
            .writing_outputs(),
    );
    let summary = asm.build(&manifest, &fx.path("out.wav")).unwrap();

    let measured: Vec<PathBuf> = asm
        .engine()
        .calls_of(Operation::MeasureDuration)
        .into_iter()
        .filter_map(|call| match call {
            EngineCall::MeasureDuration { file } => Some(file),
            _ => None,
        })
        .collect();
    let scratch = scratch_dir(asm.engine());
    assert_eq!(
        measured,
        vec![
            scratch.join("step_0.wav"),
            scratch.join("step_1.wav"),
            scratch.join("step_2.wav")
        ]
    );
    // Step 2 starts at 2.0 but the track is only 1.5s long.
    assert!((summary.steps[2].gap_secs - 0.5).abs() < 1e-9);
    assert_eq!(silence_calls(asm.engine()), vec![summary.steps[2].gap_secs]);
}

#[test]
fn scratch_directory_is_removed_after_success() {
    let fx = Fixture::new();
    fx.clips(&["a.wav"]);
    let manifest = fx.manifest(&[(0.0, 1.0, "a.wav")]);

    let asm = assembler(ScriptedEngine::new().with_default_duration(1.0).writing_outputs());
    asm.build(&manifest, &fx.path("nested/out.wav")).unwrap();

    assert!(fx.path("nested/out.wav").exists());
    assert!(!scratch_dir(asm.engine()).exists());
}

#[test]
fn engine_failure_aborts_and_cleans_up() {
    let fx = Fixture::new();
    fx.clips(&["a.wav", "b.wav"]);
    let manifest = fx.manifest(&[(0.0, 1.0, "a.wav"), (2.0, 3.0, "b.wav")]);
    let output = fx.path("out.wav");

    let asm = assembler(
        ScriptedEngine::new()
            .with_default_duration(1.0)
            .failing_on(Operation::Concatenate, "step_1.wav")
            .writing_outputs(),
    );
    let err = asm.build(&manifest, &output).unwrap_err();

    assert!(matches!(err, ClipsyncError::Engine { .. }));
    assert!(err.to_string().contains("entry 1"));
    assert!(!output.exists());
    assert!(!scratch_dir(asm.engine()).exists());
}

#[test]
fn measure_failure_is_fatal() {
    let fx = Fixture::new();
    fx.clips(&["a.wav"]);
    let manifest = fx.manifest(&[(0.0, 1.0, "a.wav")]);

    let asm = assembler(
        ScriptedEngine::new()
            .failing(Operation::MeasureDuration)
            .writing_outputs(),
    );
    let err = asm.build(&manifest, &fx.path("out.wav")).unwrap_err();

    assert!(matches!(err, ClipsyncError::Engine { .. }));
    assert!(!fx.path("out.wav").exists());
}

#[test]
fn empty_manifest_fails_before_any_engine_call() {
    let fx = Fixture::new();
    let manifest = fx.path("manifest.txt");
    std::fs::write(&manifest, "\n  \n").unwrap();

    let asm = assembler(ScriptedEngine::new());
    let err = asm.build(&manifest, &fx.path("out.wav")).unwrap_err();

    assert!(matches!(err, ClipsyncError::EmptyManifest { .. }));
    assert!(asm.engine().calls().is_empty());
}

#[test]
fn non_positive_entry_fails_before_any_engine_call() {
    let fx = Fixture::new();
    let manifest = fx.manifest(&[(0.0, 1.0, "a.wav"), (3.0, 2.0, "b.wav")]);

    let asm = assembler(ScriptedEngine::new().with_default_duration(1.0));
    let err = asm.build(&manifest, &fx.path("out.wav")).unwrap_err();

    assert!(matches!(err, ClipsyncError::InvalidDuration { index: 1, .. }));
    assert!(asm.engine().calls().is_empty());
}

#[test]
fn time_too_large_to_represent_is_invalid_manifest() {
    let fx = Fixture::new();
    let huge = "9".repeat(400);
    let manifest = fx.path("manifest.txt");
    std::fs::write(
        &manifest,
        format!("[{huge}s–{huge}s] (SPEAKER_00) {}\n", fx.path("a.wav").display()),
    )
    .unwrap();

    let asm = assembler(ScriptedEngine::new().with_default_duration(1.0));
    let err = asm.build(&manifest, &fx.path("out.wav")).unwrap_err();

    assert!(matches!(err, ClipsyncError::InvalidManifest { .. }));
    assert!(asm.engine().calls().is_empty());
}

#[test]
fn unreadable_manifest_is_invalid_manifest() {
    let asm = assembler(ScriptedEngine::new());
    let err = asm
        .build(Path::new("/non/existent/manifest.txt"), Path::new("out.wav"))
        .unwrap_err();
    assert!(matches!(err, ClipsyncError::InvalidManifest { .. }));
    assert!(asm.engine().calls().is_empty());
}
