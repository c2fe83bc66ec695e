use candle_core::{Error, Result};
use enum_dispatch::enum_dispatch;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tensorboard_rs::summary_writer::SummaryWriter;
use tracing::{debug, warn};

/// Receives `(metric name, value, step)` triples. Writes are fire-and-forget.
#[enum_dispatch]
pub trait ScalarSink {
    fn add_scalar(&mut self, tag: &str, value: f32, step: usize);

    fn flush(&mut self) {}
}

#[enum_dispatch(ScalarSink)]
pub enum ScalarSinkKind {
    Tensorboard(TensorboardSink),
    Tracing(TracingSink),
    Memory(MemorySink),
}

impl Default for ScalarSinkKind {
    fn default() -> Self {
        Self::Tracing(TracingSink)
    }
}

/// Writes tensorboard event files under `<logdir>/<run_name>`.
pub struct TensorboardSink {
    writer: SummaryWriter,
    logdir: PathBuf,
}

impl TensorboardSink {
    pub fn new(logdir: impl AsRef<Path>, run_name: &str) -> Result<Self> {
        let logdir = logdir.as_ref().join(run_name);
        std::fs::create_dir_all(&logdir).map_err(Error::wrap)?;
        let writer = SummaryWriter::new(&logdir);
        Ok(Self { writer, logdir })
    }

    pub fn logdir(&self) -> &Path {
        &self.logdir
    }
}

impl ScalarSink for TensorboardSink {
    fn add_scalar(&mut self, tag: &str, value: f32, step: usize) {
        self.writer.add_scalar(tag, value, step);
    }

    /// Asks the background writer to flush. Does not wait for the write: event files are only
    /// complete once the sink is dropped.
    fn flush(&mut self) {
        self.writer.flush();
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ScalarSink for TracingSink {
    fn add_scalar(&mut self, tag: &str, value: f32, step: usize) {
        debug!(tag, value, step, "scalar");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarRecord {
    pub tag: String,
    pub value: f32,
    pub step: usize,
}

/// Keeps every scalar in a shared vector, readable while training runs.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<ScalarRecord>>>,
}

impl MemorySink {
    pub fn new(records: Arc<Mutex<Vec<ScalarRecord>>>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> Arc<Mutex<Vec<ScalarRecord>>> {
        self.records.clone()
    }
}

impl ScalarSink for MemorySink {
    fn add_scalar(&mut self, tag: &str, value: f32, step: usize) {
        match self.records.lock() {
            Ok(mut records) => records.push(ScalarRecord {
                tag: tag.into(),
                value,
                step,
            }),
            Err(_) => warn!(tag, "scalar records lock poisoned, dropping value"),
        }
    }
}
