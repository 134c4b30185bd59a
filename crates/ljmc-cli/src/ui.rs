use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use ljmc::engine::progress::{Progress, ProgressCallback};
use std::time::Duration;
use tokio::sync::{mpsc, watch};

const EVENT_CHANNEL_CAPACITY: usize = 1024;
const REDRAW_HZ: u8 = 12;

#[derive(Debug)]
pub enum UiEvent {
    Progress(Progress),
    Log(String),
}

/// The phase currently on screen: a spinner until the step count is known, then a bar.
struct ActivePhase {
    name: &'static str,
    bar: ProgressBar,
}

impl ActivePhase {
    fn clear(self) -> &'static str {
        self.bar.finish_and_clear();
        self.name
    }
}

/// Owns the terminal while a command runs; progress events and log lines arrive over a channel
/// so bars and log output never interleave mid-line.
pub struct UiManager {
    multi: MultiProgress,
    phase: Option<ActivePhase>,
    events: mpsc::Receiver<UiEvent>,
    shutdown: watch::Receiver<bool>,
}

impl UiManager {
    pub fn new() -> (Self, mpsc::Sender<UiEvent>, watch::Sender<bool>) {
        let (event_sender, events) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (shutdown_sender, shutdown) = watch::channel(false);
        let multi = MultiProgress::with_draw_target(ProgressDrawTarget::stderr_with_hz(REDRAW_HZ));
        let manager = Self {
            multi,
            phase: None,
            events,
            shutdown,
        };
        (manager, event_sender, shutdown_sender)
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(event) = self.events.recv() => self.handle_event(event),
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        // Log lines emitted just before shutdown still belong on screen.
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
        }
        if let Some(phase) = self.phase.take() {
            phase.clear();
        }
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Log(line) => self.print(line.trim_end()),
            UiEvent::Progress(progress) => self.handle_progress(progress),
        }
    }

    fn print(&self, line: &str) {
        let _ = self.multi.println(line);
    }

    fn handle_progress(&mut self, progress: Progress) {
        match progress {
            Progress::PhaseStart { name } => {
                if let Some(previous) = self.phase.take() {
                    previous.clear();
                }
                let bar = self.multi.add(ProgressBar::new_spinner());
                bar.set_style(spinner_style());
                bar.set_message(name);
                bar.enable_steady_tick(Duration::from_millis(100));
                self.phase = Some(ActivePhase { name, bar });
            }
            Progress::PhaseFinish => {
                if let Some(phase) = self.phase.take() {
                    let name = phase.clear();
                    self.print(&format!("✓ {}", name));
                }
            }
            Progress::TaskStart { total_steps } => {
                if let Some(phase) = &self.phase {
                    phase.bar.disable_steady_tick();
                    phase.bar.set_style(steps_style());
                    phase.bar.set_length(total_steps);
                    phase.bar.reset();
                }
            }
            Progress::TaskProgress { completed } => {
                if let Some(phase) = &self.phase {
                    phase.bar.set_position(completed);
                }
            }
            Progress::TaskFinish => {
                if let Some(phase) = &self.phase {
                    phase.bar.finish();
                }
            }
            Progress::StatusUpdate { text } => {
                if let Some(phase) = &self.phase {
                    phase.bar.set_message(format!("{} | {}", phase.name, text));
                }
            }
            Progress::Message(text) => self.print(&format!("  {}", text)),
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn steps_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{msg:<40} {wide_bar:.cyan/blue} {human_pos}/{human_len} [{per_sec}, eta {eta}]",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("█▉▊▋▌▍▎▏ ")
}

/// Bridges core progress callbacks onto the UI channel.
#[derive(Clone)]
pub struct CliProgressHandler {
    sender: mpsc::Sender<UiEvent>,
}

impl CliProgressHandler {
    pub fn new(sender: mpsc::Sender<UiEvent>) -> Self {
        Self { sender }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let sender = self.sender.clone();
        Box::new(move |progress: Progress| {
            // Positions are absolute, so a dropped update is corrected by the next one.
            let _ = sender.try_send(UiEvent::Progress(progress));
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_manager() -> UiManager {
        let (manager, _, _) = UiManager::new();
        manager.multi.set_draw_target(ProgressDrawTarget::hidden());
        manager
    }

    fn feed(manager: &mut UiManager, events: impl IntoIterator<Item = Progress>) {
        for event in events {
            manager.handle_event(UiEvent::Progress(event));
        }
    }

    fn active_bar(manager: &UiManager) -> &ProgressBar {
        &manager.phase.as_ref().unwrap().bar
    }

    #[test]
    fn sampling_run_moves_bar_to_absolute_positions() {
        let mut manager = quiet_manager();
        feed(
            &mut manager,
            [
                Progress::PhaseStart {
                    name: "Metropolis Sampling",
                },
                Progress::TaskStart { total_steps: 20_000 },
                Progress::TaskProgress { completed: 200 },
                Progress::TaskProgress { completed: 400 },
            ],
        );
        assert_eq!(active_bar(&manager).length(), Some(20_000));
        assert_eq!(active_bar(&manager).position(), 400);

        feed(
            &mut manager,
            [
                Progress::TaskProgress { completed: 20_000 },
                Progress::TaskFinish,
            ],
        );
        assert!(active_bar(&manager).is_finished());

        feed(&mut manager, [Progress::PhaseFinish]);
        assert!(manager.phase.is_none());
    }

    #[test]
    fn new_phase_replaces_the_previous_one() {
        let mut manager = quiet_manager();
        feed(
            &mut manager,
            [
                Progress::PhaseStart {
                    name: "Initial Placement",
                },
                Progress::PhaseStart {
                    name: "Metropolis Sampling",
                },
            ],
        );
        let phase = manager.phase.as_ref().unwrap();
        assert_eq!(phase.name, "Metropolis Sampling");
        assert_eq!(phase.bar.message(), "Metropolis Sampling");
    }

    #[test]
    fn status_updates_are_appended_to_the_phase_name() {
        let mut manager = quiet_manager();
        feed(
            &mut manager,
            [
                Progress::PhaseStart {
                    name: "Metropolis Sampling",
                },
                Progress::StatusUpdate {
                    text: "acceptance 0.512".into(),
                },
            ],
        );
        assert_eq!(
            active_bar(&manager).message(),
            "Metropolis Sampling | acceptance 0.512"
        );
    }

    #[test]
    fn events_without_a_phase_are_harmless() {
        let mut manager = quiet_manager();
        feed(
            &mut manager,
            [
                Progress::TaskStart { total_steps: 10 },
                Progress::TaskProgress { completed: 5 },
                Progress::TaskFinish,
                Progress::PhaseFinish,
                Progress::Message("Acceptance ratio: 0.500".to_string()),
            ],
        );
        manager.handle_event(UiEvent::Log("log line\n".to_string()));
        assert!(manager.phase.is_none());
    }

    #[tokio::test]
    async fn progress_handler_forwards_events() {
        let (sender, mut receiver) = mpsc::channel(1);
        let callback = CliProgressHandler::new(sender).get_callback();

        callback(Progress::TaskProgress { completed: 7 });

        assert!(matches!(
            receiver.recv().await,
            Some(UiEvent::Progress(Progress::TaskProgress { completed: 7 }))
        ));
    }

    #[tokio::test]
    async fn run_drains_pending_events_and_exits_on_shutdown() {
        let (manager, sender, shutdown) = UiManager::new();
        manager.multi.set_draw_target(ProgressDrawTarget::hidden());
        let handle = tokio::spawn(manager.run());

        sender
            .send(UiEvent::Log("before shutdown".to_string()))
            .await
            .unwrap();
        shutdown.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
