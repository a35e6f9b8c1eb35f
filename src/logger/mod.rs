//! Track logging: lifecycle state machine and CSV production.
use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};
use strum::Display;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

#[cfg(feature = "log")]
use log::{debug, error};

use crate::{
    config::LoggerConfig, epoch::log_file_name, filter::SampleFilter, sample::PositionSample,
    Error,
};

pub mod row;

/// Logging lifecycle
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Display)]
pub enum LoggingState {
    /// No log file attached
    #[default]
    Stopped,
    /// Log file attached, samples are not recorded
    Paused,
    /// Samples are appended to the log file
    Started,
}

/// Notifications emitted by the [TrackLogger]
#[derive(Debug, Clone, PartialEq)]
pub enum LoggerEvent {
    /// Emitted on every lifecycle call, with the resulting state
    StateChanged(LoggingState),
    /// A file could not be written: logging state is not modified
    WriteFailed { path: PathBuf, reason: String },
}

/// [TrackLogger] owns the logging lifecycle and appends
/// accepted samples to the session log.
#[derive(Debug)]
pub struct TrackLogger {
    cfg: LoggerConfig,
    filter: SampleFilter,
    log_path: Option<PathBuf>,
    paused: bool,
    events: Option<UnboundedSender<LoggerEvent>>,
}

impl TrackLogger {
    /// Builds a stopped [TrackLogger]
    pub fn new(cfg: LoggerConfig, filter: SampleFilter) -> Self {
        Self {
            cfg,
            filter,
            log_path: None,
            paused: false,
            events: None,
        }
    }
    /// Returns a new receiver of [LoggerEvent]s.
    /// Only the latest receiver is notified.
    pub fn events(&mut self) -> UnboundedReceiver<LoggerEvent> {
        let (tx, rx) = unbounded_channel();
        self.events = Some(tx);
        rx
    }
    /// Current [LoggingState], derived from the attached file and pause flag
    pub fn state(&self) -> LoggingState {
        match (&self.log_path, self.paused) {
            (None, _) => LoggingState::Stopped,
            (Some(_), true) => LoggingState::Paused,
            (Some(_), false) => LoggingState::Started,
        }
    }
    /// Active session log
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }
    /// Bookmark file
    pub fn bookmark_path(&self) -> PathBuf {
        self.cfg.bookmark_path()
    }
    /// Starts (or resumes) logging. A new log file name is allocated
    /// only when no log is attached.
    pub fn start(&mut self) {
        self.start_at(Local::now())
    }
    /// [Self::start] where the log file name is stamped with given time
    pub fn start_at(&mut self, t: DateTime<Local>) {
        if self.log_path.is_none() {
            let path = self.cfg.directory.join(log_file_name(&t));
            #[cfg(feature = "log")]
            debug!("new track log \"{}\"", path.display());
            self.log_path = Some(path);
        }
        self.paused = false;
        self.notify(LoggerEvent::StateChanged(self.state()));
    }
    /// Pauses logging, if a log is attached
    pub fn pause(&mut self) {
        if self.log_path.is_some() {
            self.paused = true;
        }
        self.notify(LoggerEvent::StateChanged(self.state()));
    }
    /// Stops logging and detaches from the log file
    pub fn stop(&mut self) {
        #[cfg(feature = "log")]
        if let Some(path) = &self.log_path {
            debug!("closing track log \"{}\"", path.display());
        }
        self.log_path = None;
        self.paused = false;
        self.notify(LoggerEvent::StateChanged(self.state()));
    }
    /// Filters one batch of samples, in arrival order, and appends
    /// the accepted ones to the session log while [LoggingState::Started].
    /// Returns the accepted samples, whatever the logging state.
    pub fn record<I: IntoIterator<Item = PositionSample>>(&mut self, batch: I) -> Vec<PositionSample> {
        let accepted = self.filter.filter(batch);
        if self.state() == LoggingState::Started && !accepted.is_empty() {
            self.save(&accepted, None);
        }
        accepted
    }
    /// Appends samples to `to`, or to the session log when None.
    /// Header is written first when the file does not exist yet.
    /// Each row is written independently: failures are reported
    /// and do not prevent the following rows.
    /// Returns the number of rows written.
    pub fn save(&self, samples: &[PositionSample], to: Option<&Path>) -> usize {
        let path = match to.or(self.log_path.as_deref()) {
            Some(path) => path,
            None => return 0,
        };
        let mut fd = match self.open(path) {
            Ok(fd) => fd,
            Err(e) => {
                self.failure(path, e);
                return 0;
            },
        };
        self.append_rows(path, &mut fd, samples)
    }
    /// Appends one row per sample to `w`, the opened `path`.
    /// Failing rows are reported, the following ones are still written.
    pub(crate) fn append_rows<W: Write>(
        &self,
        path: &Path,
        w: &mut W,
        samples: &[PositionSample],
    ) -> usize {
        let mut written = 0;
        for sample in samples {
            match row::encode_sample(sample).and_then(|bytes| Ok(w.write_all(&bytes)?)) {
                Ok(_) => written += 1,
                Err(e) => self.failure(path, e),
            }
        }
        written
    }
    /// Saves one sample to the bookmark file.
    /// Returns true if it was written.
    pub fn bookmark(&self, sample: &PositionSample) -> bool {
        let path = self.bookmark_path();
        self.save(std::slice::from_ref(sample), Some(&path)) == 1
    }
    /// Lists session logs present in the log directory, most recent first
    pub fn log_files(&self) -> Result<Vec<PathBuf>, Error> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.cfg.directory)? {
            let path = entry?.path();
            let is_log = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with("locations-") && name.ends_with(".csv"))
                .unwrap_or(false);
            if is_log && path.is_file() {
                files.push(path);
            }
        }
        files.sort_by(|a, b| b.cmp(a));
        Ok(files)
    }
    /// Opens given file in append mode, writing the header if needed
    fn open(&self, path: &Path) -> Result<File, Error> {
        let needs_header = std::fs::metadata(path)
            .map(|meta| meta.len() == 0)
            .unwrap_or(true);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut fd = OpenOptions::new().create(true).append(true).open(path)?;
        if needs_header {
            fd.write_all(&row::encode_header()?)?;
        }
        Ok(fd)
    }
    fn failure(&self, path: &Path, e: Error) {
        #[cfg(feature = "log")]
        error!("failed to write \"{}\": {}", path.display(), e);
        self.notify(LoggerEvent::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        });
    }
    fn notify(&self, event: LoggerEvent) {
        if let Some(tx) = &self.events {
            // receiver may be gone: nobody is listening
            let _ = tx.send(event);
        }
    }
}
