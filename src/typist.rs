//! The typing loop and its two start modes.

use crate::error::{Result, TyperError};
use crate::global_hotkey::{HotkeyAction, HotkeyManager};
use crate::job::TypingJob;
use crate::key_sender::{enigo_factory, InjectorFactory, KeyInjector, Keystroke};
use colored::Colorize;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info};

/// One-way stop signal shared between the control thread and the worker.
///
/// Once cancelled it stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Summary of one pass over the payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmitReport {
    pub keystrokes: usize,
    pub newlines: usize,
    pub slept: Duration,
    pub cancelled: bool,
}

/// Types `job` through `injector`, pausing a random delay after every
/// keystroke. The flag is checked before each character.
pub fn emit(
    job: &TypingJob,
    injector: &mut dyn KeyInjector,
    cancel: &CancellationFlag,
) -> Result<EmitReport> {
    let mut rng = rand::thread_rng();
    let (min, max) = job.delay_bounds();
    let mut report = EmitReport::default();

    for c in job.text().chars() {
        if cancel.is_cancelled() {
            report.cancelled = true;
            break;
        }

        let stroke = Keystroke::for_char(c, job.use_alt_enter());
        injector.send(stroke)?;
        report.keystrokes += 1;
        if c == '\n' {
            report.newlines += 1;
        }

        let seconds = rng.gen_range(min..=max);
        let delay = Duration::try_from_secs_f64(seconds)
            .map_err(|e| TyperError::invalid_delay(format!("keystroke delay {seconds}: {e}")))?;
        if !delay.is_zero() {
            thread::sleep(delay);
            report.slept += delay;
        }
    }

    debug!(?report, "emission finished");
    Ok(report)
}

pub struct Typist {
    job: Arc<TypingJob>,
    factory: InjectorFactory,
    cancel: CancellationFlag,
    worker: Option<JoinHandle<Result<EmitReport>>>,
}

impl Typist {
    pub fn new(job: TypingJob, factory: InjectorFactory) -> Self {
        Self {
            job: Arc::new(job),
            factory,
            cancel: CancellationFlag::new(),
            worker: None,
        }
    }

    /// A typist that injects real keystrokes into the focused window.
    pub fn with_enigo(job: TypingJob) -> Self {
        Self::new(job, enigo_factory())
    }

    pub fn job(&self) -> &TypingJob {
        &self.job
    }

    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    /// Types the whole payload on the calling thread.
    pub fn emit(&self) -> Result<EmitReport> {
        let mut injector = (self.factory)()?;
        emit(&self.job, injector.as_mut(), &self.cancel)
    }

    pub fn start_after_delay(&self, delay: Duration) -> Result<EmitReport> {
        println!(
            "⏳ Waiting {} seconds before typing...",
            delay.as_secs_f64().to_string().bold()
        );
        thread::sleep(delay);

        println!("⌨️  Starting to type...");
        let report = self.emit()?;
        if report.cancelled {
            println!("\n{}", "Typing cancelled.".yellow());
        } else {
            println!("\n{}", "✅ Typing completed!".green());
        }
        Ok(report)
    }

    pub fn is_typing(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Starts a worker unless one is already typing.
    ///
    /// Returns `false` when the trigger was dropped. A finished worker is
    /// reaped first so its error, if any, surfaces here.
    pub fn trigger(&mut self) -> Result<bool> {
        if self.is_typing() {
            return Ok(false);
        }
        if let Some(report) = self.wait()? {
            debug!(?report, "previous run reaped");
        }

        let job = Arc::clone(&self.job);
        let factory = Arc::clone(&self.factory);
        let cancel = self.cancel.clone();

        let handle = thread::Builder::new()
            .name("typist-worker".to_string())
            .spawn(move || {
                let mut injector = factory()?;
                emit(&job, injector.as_mut(), &cancel)
            })?;

        self.worker = Some(handle);
        Ok(true)
    }

    /// Joins the current worker without cancelling it.
    pub fn wait(&mut self) -> Result<Option<EmitReport>> {
        let Some(handle) = self.worker.take() else {
            return Ok(None);
        };

        match handle.join() {
            Ok(result) => result.map(Some),
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(TyperError::worker(reason))
            }
        }
    }

    /// Cancels and joins the worker.
    pub fn shutdown(&mut self) -> Result<Option<EmitReport>> {
        self.cancel.cancel();
        self.wait()
    }

    /// Drives hotkey mode from a stream of presses until a cancel arrives
    /// or the stream ends, then shuts the worker down.
    pub fn run_hotkey_loop<I>(&mut self, actions: I) -> Result<Option<EmitReport>>
    where
        I: IntoIterator<Item = HotkeyAction>,
    {
        for action in actions {
            match action {
                HotkeyAction::Trigger => {
                    if self.trigger()? {
                        info!("typing started by hotkey");
                        println!("\n⌨️  Starting to type...");
                    } else {
                        println!("\n{}", "Already typing!".yellow());
                    }
                }
                HotkeyAction::Cancel => {
                    info!("cancel key pressed");
                    break;
                }
            }
        }

        self.shutdown()
    }

    /// Registers the trigger and cancel hotkeys and blocks until the cancel
    /// key is pressed.
    pub fn start_on_hotkey(&mut self, hotkey: &str, cancel_key: &str) -> Result<Option<EmitReport>> {
        let mut manager = HotkeyManager::new()?;
        manager.register_trigger(hotkey)?;
        manager.register_cancel(cancel_key)?;

        println!(
            "🔥 Press '{}' to start typing ({} to cancel)...",
            hotkey.bold(),
            cancel_key.to_uppercase()
        );

        let report = self.run_hotkey_loop(manager.actions()?)?;
        println!("\n👋 Exiting...");
        Ok(report)
    }
}

impl Drop for Typist {
    fn drop(&mut self) {
        if self.worker.is_some() {
            let _ = self.shutdown();
        }
    }
}
