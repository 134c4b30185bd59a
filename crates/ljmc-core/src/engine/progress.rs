#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskProgress { completed: u64 },
    TaskFinish,

    StatusUpdate { text: String },
    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    #[inline]
    pub fn is_silent(&self) -> bool {
        self.callback.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn silent_reporter_drops_events() {
        let reporter = ProgressReporter::new();
        assert!(reporter.is_silent());
        reporter.report(Progress::PhaseFinish);
    }

    #[test]
    fn callback_receives_events_in_order() {
        let seen = Mutex::new(Vec::new());
        {
            let reporter = ProgressReporter::with_callback(Box::new(|event: Progress| {
                seen.lock().unwrap().push(format!("{event:?}"));
            }));
            reporter.report(Progress::TaskStart { total_steps: 3 });
            reporter.report(Progress::TaskProgress { completed: 3 });
            reporter.report(Progress::TaskFinish);
        }
        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen[0].contains("TaskStart"));
        assert!(seen[2].contains("TaskFinish"));
    }
}
