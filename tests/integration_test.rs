use anyhow::Result;
use auto_typer::job::{load_text, start_delay, validate_delays};
use auto_typer::typist::emit;
use auto_typer::{
    CancellationFlag, Config, HotkeyAction, InjectorFactory, KeyInjector, Keystroke, TyperError,
    Typist, TypingJob,
};
use std::io::Write;
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;

type Log = Arc<Mutex<Vec<Keystroke>>>;

/// Records keystrokes instead of injecting them.
struct RecordingInjector {
    log: Log,
    cancel_after: Option<(usize, CancellationFlag)>,
    entered: Option<mpsc::Sender<()>>,
    gate: Option<Receiver<()>>,
}

impl RecordingInjector {
    fn new(log: Log) -> Self {
        Self {
            log,
            cancel_after: None,
            entered: None,
            gate: None,
        }
    }
}

impl KeyInjector for RecordingInjector {
    fn send(&mut self, stroke: Keystroke) -> auto_typer::Result<()> {
        if let Some(entered) = self.entered.take() {
            let _ = entered.send(());
        }
        if let Some(gate) = self.gate.take() {
            let _ = gate.recv();
        }
        let mut log = self.log.lock().unwrap();
        log.push(stroke);
        if let Some((n, flag)) = &self.cancel_after {
            if log.len() == *n {
                flag.cancel();
            }
        }
        Ok(())
    }
}

fn recording_factory(log: Log) -> InjectorFactory {
    Arc::new(move || Ok(Box::new(RecordingInjector::new(log.clone())) as Box<dyn KeyInjector>))
}

struct Gate {
    entered: Receiver<()>,
    release: mpsc::Sender<()>,
}

/// Factory whose first injector reports and then blocks on its first
/// keystroke until released.
fn gated_factory(log: Log) -> (InjectorFactory, Gate) {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let slot = Arc::new(Mutex::new(Some((entered_tx, release_rx))));
    let factory: InjectorFactory = Arc::new(move || {
        let mut injector = RecordingInjector::new(log.clone());
        if let Some((entered, gate)) = slot.lock().unwrap().take() {
            injector.entered = Some(entered);
            injector.gate = Some(gate);
        }
        Ok(Box::new(injector) as Box<dyn KeyInjector>)
    });
    (
        factory,
        Gate {
            entered: entered_rx,
            release: release_tx,
        },
    )
}

// Emission

#[test]
fn test_alt_enter_sequence() {
    let job = TypingJob::new("ab\ncd", 0.0, 0.0, true).unwrap();
    let log = Log::default();
    let mut injector = RecordingInjector::new(log.clone());

    let report = emit(&job, &mut injector, &CancellationFlag::new()).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            Keystroke::Char('a'),
            Keystroke::Char('b'),
            Keystroke::AltEnter,
            Keystroke::Char('c'),
            Keystroke::Char('d'),
        ]
    );
    assert_eq!(report.keystrokes, 5);
    assert_eq!(report.newlines, 1);
}

#[test]
fn test_zero_delay_two_keystrokes() {
    let job = TypingJob::new("hi", 0.0, 0.0, true).unwrap();
    let log = Log::default();
    let typist = Typist::new(job, recording_factory(log.clone()));

    let started = Instant::now();
    let report = typist.emit().unwrap();

    assert_eq!(report.keystrokes, 2);
    assert_eq!(report.slept, Duration::ZERO);
    assert!(started.elapsed() < Duration::from_secs(1));
    let log = log.lock().unwrap();
    assert_eq!(*log, vec![Keystroke::Char('h'), Keystroke::Char('i')]);
    assert!(!log.contains(&Keystroke::AltEnter));
}

#[test]
fn test_unicode_characters_are_single_keystrokes() {
    let job = TypingJob::new("é→😀", 0.0, 0.0, false).unwrap();
    let log = Log::default();
    emit(&job, &mut RecordingInjector::new(log.clone()), &CancellationFlag::new()).unwrap();
    assert_eq!(log.lock().unwrap().len(), 3);
}

// Cancellation

#[test]
fn test_cancel_before_start_emits_nothing() {
    let job = TypingJob::new("hello", 0.0, 0.0, true).unwrap();
    let log = Log::default();
    let typist = Typist::new(job, recording_factory(log.clone()));

    typist.cancellation_flag().cancel();
    let report = typist.emit().unwrap();

    assert!(log.lock().unwrap().is_empty());
    assert_eq!(report.keystrokes, 0);
    assert!(report.cancelled);
}

#[test]
fn test_cancel_mid_sequence_stops_after_committed_character() {
    let job = TypingJob::new("abcdef", 0.0, 0.0, true).unwrap();
    let log = Log::default();
    let flag = CancellationFlag::new();
    let mut injector = RecordingInjector::new(log.clone());
    injector.cancel_after = Some((3, flag.clone()));

    let report = emit(&job, &mut injector, &flag).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            Keystroke::Char('a'),
            Keystroke::Char('b'),
            Keystroke::Char('c')
        ]
    );
    assert!(report.cancelled);
}

// Hotkey mode

#[test]
fn test_second_trigger_while_typing_is_dropped() {
    let job = TypingJob::new("ab", 0.0, 0.0, true).unwrap();
    let log = Log::default();
    let (factory, gate) = gated_factory(log.clone());
    let mut typist = Typist::new(job, factory);

    assert!(typist.trigger().unwrap());
    gate.entered.recv().unwrap();
    assert!(typist.is_typing());
    assert!(!typist.trigger().unwrap());

    gate.release.send(()).unwrap();
    let report = typist.wait().unwrap().expect("worker ran");

    assert_eq!(report.keystrokes, 2);
    assert_eq!(
        *log.lock().unwrap(),
        vec![Keystroke::Char('a'), Keystroke::Char('b')]
    );
}

#[test]
fn test_hotkey_loop_runs_once_and_shuts_down() {
    let job = TypingJob::new("ok", 0.0, 0.0, false).unwrap();
    let log = Log::default();
    let mut typist = Typist::new(job, recording_factory(log.clone()));

    // Cancel is only delivered once the first run has typed everything.
    let watched = log.clone();
    let mut step = 0;
    let presses = std::iter::from_fn(move || {
        step += 1;
        match step {
            1 => Some(HotkeyAction::Trigger),
            2 => {
                while watched.lock().unwrap().len() < 2 {
                    thread::sleep(Duration::from_millis(1));
                }
                Some(HotkeyAction::Cancel)
            }
            3 => Some(HotkeyAction::Trigger),
            _ => None,
        }
    });

    let report = typist.run_hotkey_loop(presses).unwrap();

    assert!(report.is_some());
    assert!(!typist.is_typing());
    assert!(typist.cancellation_flag().is_cancelled());
    // The trigger after cancel is never processed.
    assert_eq!(log.lock().unwrap().len(), 2);
}

#[test]
fn test_cancel_without_trigger_types_nothing() {
    let job = TypingJob::new("never", 0.0, 0.0, true).unwrap();
    let log = Log::default();
    let mut typist = Typist::new(job, recording_factory(log.clone()));

    let report = typist.run_hotkey_loop([HotkeyAction::Cancel]).unwrap();

    assert!(report.is_none());
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn test_shutdown_cancels_a_running_worker() {
    let job = TypingJob::new("long text that will not finish", 0.0, 0.0, true).unwrap();
    let log = Log::default();
    let (factory, gate) = gated_factory(log.clone());
    let mut typist = Typist::new(job, factory);

    assert!(typist.trigger().unwrap());
    gate.entered.recv().unwrap();
    typist.cancellation_flag().cancel();
    gate.release.send(()).unwrap();
    let report = typist.shutdown().unwrap().expect("worker ran");

    assert!(report.cancelled);
    assert_eq!(*log.lock().unwrap(), vec![Keystroke::Char('l')]);
}

// Validation

#[test]
fn test_delay_validation() {
    assert!(validate_delays(0.0, 0.0).is_ok());
    assert!(validate_delays(0.02, 0.05).is_ok());
    assert!(validate_delays(3.0, 3.0).is_ok());

    assert!(matches!(
        validate_delays(0.05, 0.02),
        Err(TyperError::InvalidDelay(_))
    ));
    assert!(matches!(
        validate_delays(-0.1, 0.02),
        Err(TyperError::InvalidDelay(_))
    ));
    assert!(matches!(
        validate_delays(0.0, -0.02),
        Err(TyperError::InvalidDelay(_))
    ));
}

#[test]
fn test_oversized_delays_are_rejected_before_typing() {
    for (min, max) in [(0.0, 1e20), (1e20, 1e20), (0.02, f64::MAX)] {
        let err = TypingJob::new("ab", min, max, true).unwrap_err();
        assert!(matches!(err, TyperError::InvalidDelay(_)), "{min}..{max}");
        assert!(err.is_validation());
    }

    assert!(matches!(start_delay(1e20), Err(TyperError::InvalidDelay(_))));
    assert!(start_delay(3.0).is_ok());
}

#[test]
fn test_oversized_config_delay_fails_validation() {
    let config = Config {
        max_delay: 1e20,
        ..Config::default()
    };
    assert!(matches!(
        config.validate(),
        Err(TyperError::ConfigValidation(_))
    ));
}

// Input files

#[test]
fn test_load_text_from_file() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all("first line\r\nsecond line\n".as_bytes())?;

    let text = load_text(file.path().to_str().unwrap())?;
    assert_eq!(text, "first line\nsecond line\n");
    Ok(())
}

#[test]
fn test_load_text_rejects_invalid_utf8() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(&[0xff, 0xfe, 0x00])?;

    let err = load_text(file.path().to_str().unwrap()).unwrap_err();
    assert!(matches!(err, TyperError::InputRead { .. }));
    assert!(err.is_validation());
    Ok(())
}

#[test]
fn test_load_text_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.txt");

    let err = load_text(path.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, TyperError::InputNotFound { .. }));
    assert!(err.to_string().contains("absent.txt"));
}

// Config files

#[test]
fn test_config_file_operations() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(
        br#"
        {
            "min_delay": 0.03,
            "max_delay": 0.12,
            "use_alt_enter": false,
            "cancel_key": "f12"
        }
        "#,
    )?;

    let config = Config::from_file(file.path().to_str().unwrap())?;

    assert_eq!(config.min_delay, 0.03);
    assert_eq!(config.max_delay, 0.12);
    assert!(!config.use_alt_enter);
    assert_eq!(config.cancel_key, "f12");
    assert!(!config.verbose);
    assert!(config.validate().is_ok());
    Ok(())
}

#[test]
fn test_config_save_load_roundtrip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("settings.json");
    let path = path.to_str().unwrap();

    let original = Config {
        min_delay: 0.01,
        max_delay: 0.2,
        use_alt_enter: false,
        cancel_key: "ctrl+q".to_string(),
        verbose: true,
    };
    original.save_to_file(path)?;

    assert_eq!(Config::from_file(path)?, original);
    Ok(())
}

#[test]
fn test_invalid_config_is_not_saved() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("settings.json");

    let config = Config {
        min_delay: 0.5,
        max_delay: 0.1,
        ..Config::default()
    };
    let err = config.save_to_file(path.to_str().unwrap()).unwrap_err();

    assert!(matches!(err, TyperError::ConfigValidation(_)));
    assert!(!path.exists());
    Ok(())
}

#[test]
fn test_config_load_errors() -> Result<()> {
    let err = Config::from_file("/no/such/settings.json").unwrap_err();
    assert!(matches!(err, TyperError::ConfigLoad { .. }));

    let mut file = NamedTempFile::new()?;
    file.write_all(b"{ not json")?;
    let err = Config::from_file(file.path().to_str().unwrap()).unwrap_err();
    assert!(matches!(err, TyperError::ConfigLoad { .. }));
    Ok(())
}
