use crate::core::fs::backup::backup;
use crate::core::mdp::{Stage, write_mdp_file};
use crate::engine::config::{INPUT_FILES, UmbrellaConfig};
use crate::engine::error::EngineError;
use crate::engine::gromacs::{GromppRequest, MdEngine, MdrunRequest};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::window::Window;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// What was produced for one window.
#[derive(Debug, Clone)]
pub struct WindowReport {
    pub window: Window,
    pub directory: PathBuf,
    /// Where a previous directory of the same name was moved, if there was one.
    pub backup: Option<PathBuf>,
    /// The `.mdp` files, in stage order.
    pub mdp_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct UmbrellaReport {
    pub windows: Vec<WindowReport>,
}

impl UmbrellaReport {
    pub fn backups(&self) -> impl Iterator<Item = &PathBuf> {
        self.windows.iter().filter_map(|w| w.backup.as_ref())
    }
}

/// Sets up every umbrella window and, in production mode, runs its five stages.
///
/// For each window a fresh `run-<n>` directory is created under `config.output_dir`
/// (an existing one is backed up first), the prepared inputs are copied in, and the
/// `.mdp` file of every stage is written. In production mode each stage is then
/// preprocessed and simulated before the next stage starts.
///
/// # Errors
///
/// The first failure of any kind aborts the whole run. Windows already completed are
/// left on disk.
#[instrument(skip_all, name = "umbrella_workflow", fields(windows = config.sampling.windows))]
pub fn run(
    config: &UmbrellaConfig,
    engine: &dyn MdEngine,
    reporter: &ProgressReporter,
) -> Result<UmbrellaReport, EngineError> {
    check_inputs(config)?;
    if config.production {
        engine.check_available()?;
    }
    fs::create_dir_all(&config.output_dir).map_err(EngineError::io(&config.output_dir))?;

    let windows = config.sampling.all_windows();
    info!(
        "Preparing {} umbrella windows from {} to {} nm (stride {:.4} nm){}.",
        windows.len(),
        config.sampling.min_distance,
        config.sampling.max_distance,
        config.sampling.stride(),
        if config.production { "" } else { ", parameter files only" }
    );
    reporter.report(Progress::RunStart {
        total_windows: windows.len() as u64,
    });

    let reports = run_windows(&windows, config, engine, reporter)?;

    reporter.report(Progress::RunFinish);
    info!("All {} windows finished.", reports.len());
    Ok(UmbrellaReport { windows: reports })
}

#[cfg(feature = "parallel")]
fn run_windows(
    windows: &[Window],
    config: &UmbrellaConfig,
    engine: &dyn MdEngine,
    reporter: &ProgressReporter,
) -> Result<Vec<WindowReport>, EngineError> {
    if config.parallel_windows {
        windows
            .par_iter()
            .map(|w| run_window(*w, config, engine, reporter))
            .collect()
    } else {
        windows
            .iter()
            .map(|w| run_window(*w, config, engine, reporter))
            .collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn run_windows(
    windows: &[Window],
    config: &UmbrellaConfig,
    engine: &dyn MdEngine,
    reporter: &ProgressReporter,
) -> Result<Vec<WindowReport>, EngineError> {
    windows
        .iter()
        .map(|w| run_window(*w, config, engine, reporter))
        .collect()
}

#[instrument(skip_all, fields(window = window.index))]
fn run_window(
    window: Window,
    config: &UmbrellaConfig,
    engine: &dyn MdEngine,
    reporter: &ProgressReporter,
) -> Result<WindowReport, EngineError> {
    reporter.report(Progress::WindowStart {
        index: window.index,
        position: window.position,
    });
    info!("Window {} at {} nm", window.index, window.position);

    let directory = window.dir_in(&config.output_dir);
    let backup = backup(&directory).map_err(EngineError::io(&directory))?;
    if let Some(moved) = &backup {
        reporter.report(Progress::Message(format!(
            "Moved existing {} to {}",
            directory.display(),
            moved.display()
        )));
    }
    fs::create_dir(&directory).map_err(EngineError::io(&directory))?;

    for name in INPUT_FILES {
        copy_input(&config.input_dir.join(name), &directory.join(name))?;
    }

    let pull = config.pull.at(window.position);
    let mut mdp_files = Vec::with_capacity(Stage::ALL.len());
    for stage in Stage::ALL {
        reporter.report(Progress::StageStart {
            window: window.index,
            stage,
        });
        let stem = stage.file_stem(window.index);
        mdp_files.push(write_mdp_file(&directory, &stem, stage, &pull)?);

        if config.production {
            engine.preprocess(&directory, &GromppRequest::for_stage(stage, window.index))?;
            engine.simulate(&directory, &MdrunRequest::new(stem))?;
        }
    }

    reporter.report(Progress::WindowFinish {
        index: window.index,
    });
    Ok(WindowReport {
        window,
        directory,
        backup,
        mdp_files,
    })
}

/// Copies one prepared input into a window, blaming whichever side of the copy failed.
fn copy_input(source: &Path, destination: &Path) -> Result<(), EngineError> {
    fs::copy(source, destination).map(|_| ()).map_err(|e| {
        let path = if source.is_file() { destination } else { source };
        EngineError::io(path)(e)
    })
}

fn check_inputs(config: &UmbrellaConfig) -> Result<(), EngineError> {
    for name in INPUT_FILES {
        let path = config.input_dir.join(name);
        if !path.is_file() {
            return Err(EngineError::Io {
                path,
                source: io::Error::new(io::ErrorKind::NotFound, "required input file is missing"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fs::listing::list_directory;
    use crate::engine::config::UmbrellaConfigBuilder;
    use std::sync::Mutex;
    use tempfile::{TempDir, tempdir};

    #[derive(Default)]
    struct RecordingEngine {
        calls: Mutex<Vec<String>>,
        fail_on: Option<String>,
    }

    impl RecordingEngine {
        fn failing_on(args: &str) -> Self {
            Self {
                fail_on: Some(args.to_string()),
                ..Self::default()
            }
        }

        fn record(&self, workdir: &Path, args: Vec<String>) -> Result<(), EngineError> {
            let line = format!(
                "{}: {}",
                workdir.file_name().unwrap().to_string_lossy(),
                args.join(" ")
            );
            self.calls.lock().unwrap().push(line.clone());
            if self.fail_on.as_deref().is_some_and(|f| line.contains(f)) {
                return Err(EngineError::InvalidRequest(format!("forced failure: {line}")));
            }
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl MdEngine for RecordingEngine {
        fn preprocess(&self, workdir: &Path, request: &GromppRequest) -> Result<(), EngineError> {
            self.record(workdir, request.args()?)
        }

        fn simulate(&self, workdir: &Path, request: &MdrunRequest) -> Result<(), EngineError> {
            self.record(workdir, request.args()?)
        }
    }

    struct Workspace {
        _tmp: TempDir,
        inputs: PathBuf,
        output: PathBuf,
    }

    fn workspace() -> Workspace {
        let tmp = tempdir().unwrap();
        let inputs = tmp.path().join("0-files");
        fs::create_dir(&inputs).unwrap();
        for name in INPUT_FILES {
            fs::write(inputs.join(name), format!("contents of {name}")).unwrap();
        }
        let output = tmp.path().join("work");
        Workspace {
            _tmp: tmp,
            inputs,
            output,
        }
    }

    fn config(ws: &Workspace, windows: usize, production: bool) -> UmbrellaConfig {
        UmbrellaConfigBuilder::new()
            .windows(windows)
            .min_distance(0.1)
            .max_distance(2.0)
            .input_dir(&ws.inputs)
            .output_dir(&ws.output)
            .production(production)
            .build()
            .unwrap()
    }

    #[test]
    fn dry_run_lays_out_every_window_without_running_anything() {
        let ws = workspace();
        let engine = RecordingEngine::default();

        let report = run(&config(&ws, 3, false), &engine, &ProgressReporter::new()).unwrap();

        assert!(engine.calls().is_empty());
        assert_eq!(report.windows.len(), 3);
        assert_eq!(
            list_directory(&ws.output).unwrap(),
            vec!["run-0", "run-1", "run-2"]
        );
        for n in 0..3 {
            let mut expected = vec![
                "eql.{n}.mdp",
                "eql2.{n}.mdp",
                "index.ndx",
                "ions.gro",
                "min.{n}.mdp",
                "min2.{n}.mdp",
                "prd.{n}.mdp",
                "topol.top",
            ]
            .into_iter()
            .map(|s| s.replace("{n}", &n.to_string()))
            .collect::<Vec<_>>();
            expected.sort();
            let dir = ws.output.join(format!("run-{n}"));
            assert_eq!(list_directory(&dir).unwrap(), expected);
            assert_eq!(
                fs::read_to_string(dir.join("ions.gro")).unwrap(),
                "contents of ions.gro"
            );
        }
    }

    #[test]
    fn window_positions_are_written_into_the_parameter_files() {
        let ws = workspace();
        let report = run(
            &config(&ws, 3, false),
            &RecordingEngine::default(),
            &ProgressReporter::new(),
        )
        .unwrap();

        let second = &report.windows[1];
        assert!((second.window.position - (0.1 + 1.9 / 3.0)).abs() < 1e-12);
        let prd = fs::read_to_string(second.directory.join("prd.1.mdp")).unwrap();
        assert!(prd.contains(&format!("{:?}", second.window.position)));
        assert_eq!(
            second
                .mdp_files
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                .collect::<Vec<_>>(),
            vec!["min.1.mdp", "min2.1.mdp", "eql.1.mdp", "eql2.1.mdp", "prd.1.mdp"]
        );
    }

    #[test]
    fn rerun_backs_up_existing_window_directories() {
        let ws = workspace();
        let cfg = config(&ws, 2, false);
        let engine = RecordingEngine::default();

        let first = run(&cfg, &engine, &ProgressReporter::new()).unwrap();
        assert_eq!(first.backups().count(), 0);
        fs::write(ws.output.join("run-0").join("marker"), "first run").unwrap();

        let second = run(&cfg, &engine, &ProgressReporter::new()).unwrap();

        let backup = ws.output.join("#run-0.1#");
        assert_eq!(second.windows[0].backup.as_deref(), Some(backup.as_path()));
        assert_eq!(
            fs::read_to_string(backup.join("marker")).unwrap(),
            "first run"
        );
        assert!(!ws.output.join("run-0").join("marker").exists());
        assert!(ws.output.join("#run-1.1#").is_dir());
    }

    #[test]
    fn rerun_reports_moved_directories_as_messages() {
        let ws = workspace();
        let cfg = config(&ws, 1, false);
        run(&cfg, &RecordingEngine::default(), &ProgressReporter::new()).unwrap();

        let messages = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|p| {
            if let Progress::Message(msg) = p {
                messages.lock().unwrap().push(msg);
            }
        }));
        run(&cfg, &RecordingEngine::default(), &reporter).unwrap();
        drop(reporter);

        let messages = messages.into_inner().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("#run-0.1#"), "{}", messages[0]);
    }

    #[test]
    fn copy_failures_name_the_side_that_failed() {
        let ws = workspace();
        let source = ws.inputs.join("ions.gro");

        let missing_dir = ws.output.join("absent").join("ions.gro");
        match copy_input(&source, &missing_dir) {
            Err(EngineError::Io { path, .. }) => assert_eq!(path, missing_dir),
            other => panic!("unexpected result: {other:?}"),
        }

        let missing_source = ws.inputs.join("nope.gro");
        fs::create_dir_all(&ws.output).unwrap();
        match copy_input(&missing_source, &ws.output.join("nope.gro")) {
            Err(EngineError::Io { path, .. }) => assert_eq!(path, missing_source),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn production_runs_stages_in_order_with_chained_inputs() {
        let ws = workspace();
        let engine = RecordingEngine::default();

        run(&config(&ws, 1, true), &engine, &ProgressReporter::new()).unwrap();

        let calls = engine.calls();
        assert_eq!(calls.len(), 10);
        assert!(calls[0].starts_with("run-0: grompp"));
        assert!(calls[0].ends_with("-c ions"));
        assert!(calls[1].starts_with("run-0: mdrun -deffnm min.0"));
        assert!(calls[2].ends_with("-c min.0 -t min.0 -maxwarn 1"));
        assert!(calls[3].starts_with("run-0: mdrun -deffnm min2.0"));
        assert!(calls[4].ends_with("-c min2.0 -t min2.0"));
        assert!(calls[6].ends_with("-c eql.0 -t eql.0"));
        assert!(calls[8].ends_with("-c eql2.0 -t eql2.0"));
        assert!(calls[9].starts_with("run-0: mdrun -deffnm prd.0"));
    }

    #[test]
    fn process_failure_aborts_the_run() {
        let ws = workspace();
        let engine = RecordingEngine::failing_on("mdrun -deffnm eql.0");

        let err = run(&config(&ws, 3, true), &engine, &ProgressReporter::new()).unwrap_err();

        assert!(matches!(err, EngineError::InvalidRequest(_)));
        let calls = engine.calls();
        assert!(calls.last().unwrap().contains("mdrun -deffnm eql.0"));
        assert!(!calls.iter().any(|c| c.contains("eql2.0")));
        assert!(!ws.output.join("run-1").exists());
    }

    #[test]
    fn missing_input_file_fails_before_touching_output() {
        let ws = workspace();
        fs::remove_file(ws.inputs.join("topol.top")).unwrap();

        let err = run(
            &config(&ws, 2, false),
            &RecordingEngine::default(),
            &ProgressReporter::new(),
        )
        .unwrap_err();

        match err {
            EngineError::Io { path, source } => {
                assert_eq!(path, ws.inputs.join("topol.top"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!ws.output.exists());
    }

    #[test]
    fn progress_events_cover_every_stage() {
        let ws = workspace();
        let stages = Mutex::new(0usize);
        let windows = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|p| match p {
            Progress::StageStart { .. } => *stages.lock().unwrap() += 1,
            Progress::WindowFinish { index } => windows.lock().unwrap().push(index),
            _ => {}
        }));

        run(&config(&ws, 2, false), &RecordingEngine::default(), &reporter).unwrap();
        drop(reporter);

        assert_eq!(stages.into_inner().unwrap(), 10);
        assert_eq!(windows.into_inner().unwrap(), vec![0, 1]);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_windows_produce_the_same_layout() {
        let ws = workspace();
        let cfg = UmbrellaConfig {
            parallel_windows: true,
            ..config(&ws, 4, true)
        };
        let engine = RecordingEngine::default();

        let report = run(&cfg, &engine, &ProgressReporter::new()).unwrap();

        assert_eq!(
            report.windows.iter().map(|w| w.window.index).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
        assert_eq!(engine.calls().len(), 40);
        for n in 0..4 {
            let ours: Vec<_> = engine
                .calls()
                .into_iter()
                .filter(|c| c.starts_with(&format!("run-{n}:")))
                .collect();
            assert_eq!(ours.len(), 10);
            assert!(ours[9].contains(&format!("mdrun -deffnm prd.{n}")));
        }
    }
}
