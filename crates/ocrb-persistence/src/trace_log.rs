//! ---
//! ocrb_section: "03-persistence-logging"
//! ocrb_subsection: "module"
//! ocrb_type: "source"
//! ocrb_scope: "code"
//! ocrb_description: "Checkpoint and event trace persistence."
//! ocrb_version: "v0.0.0-prealpha"
//! ocrb_owner: "tbd"
//! ---
//! JSONL event trace files.
//!
//! The first line is a [`TraceHeader`]; every following non-empty line is one
//! [`Event`] in append order.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ocrb_events::{Event, EventTrace};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{PersistenceError, Result};

/// Current trace file format version.
pub const TRACE_FORMAT_VERSION: u16 = 1;

/// Identity line written at the top of every trace file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceHeader {
    /// Format version of the file.
    pub version: u16,
    /// Run the trace belongs to.
    pub run_id: String,
    /// Workload the run executed.
    pub workload_id: String,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
}

impl TraceHeader {
    fn new(run_id: &str, workload_id: &str) -> Self {
        Self {
            version: TRACE_FORMAT_VERSION,
            run_id: run_id.to_owned(),
            workload_id: workload_id.to_owned(),
            created_at: Utc::now(),
        }
    }
}

/// Append-only writer for a trace file.
pub struct EventTraceWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    written: usize,
}

impl EventTraceWriter {
    /// Create (or truncate) a trace file and write its header.
    pub fn create(path: &Path, run_id: &str, workload_id: &str) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        let mut writer = BufWriter::new(file);
        let header = serde_json::to_string(&TraceHeader::new(run_id, workload_id))?;
        writer.write_all(header.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            written: 0,
        })
    }

    /// Append one event and return the number of bytes written.
    ///
    /// Events with non-finite numbers are refused: JSON would store them as
    /// `null` and the reloaded trace would differ from the recorded one.
    pub fn append(&mut self, event: &Event) -> Result<usize> {
        ensure_finite(self.written, event)?;
        let line = serde_json::to_string(event)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(line.len() + 1)
    }

    /// Flush buffered writes to the underlying file handle.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Number of events appended so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Access the current path on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Streaming reader over the events of a trace file.
pub struct EventTraceReader {
    header: TraceHeader,
    lines: std::io::Lines<BufReader<File>>,
}

impl EventTraceReader {
    /// Open the file and parse its header.
    pub fn open(path: &Path) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut first_line = String::new();
        reader.read_line(&mut first_line)?;
        if first_line.trim().is_empty() {
            return Err(PersistenceError::MissingTraceHeader {
                path: path.to_path_buf(),
            });
        }
        let header = serde_json::from_str(first_line.trim_end())?;
        Ok(Self {
            header,
            lines: reader.lines(),
        })
    }

    /// Header of the opened file.
    pub fn header(&self) -> &TraceHeader {
        &self.header
    }
}

impl Iterator for EventTraceReader {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.lines.next()? {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => {
                    return Some(serde_json::from_str(&line).map_err(PersistenceError::from))
                }
                Err(err) => return Some(Err(err.into())),
            }
        }
    }
}

fn ensure_finite(index: usize, event: &Event) -> Result<()> {
    let fields = [
        ("t_utc", Some(event.t_utc)),
        ("stress_level", event.stress_level),
        ("completion_rate", event.completion_rate),
        ("work_done", event.work_done),
        ("resources_used", event.resources_used),
    ];
    match fields
        .into_iter()
        .find_map(|(field, value)| value.filter(|v| !v.is_finite()).map(|v| (field, v)))
    {
        Some((field, value)) => Err(PersistenceError::NonFiniteField {
            index,
            field,
            value,
        }),
        None => Ok(()),
    }
}

/// Write a sealed trace to `path`, replacing any existing file.
///
/// Every event is checked before the file is touched, so a trace that cannot
/// be stored faithfully leaves any previous file in place.
pub fn write_trace(path: &Path, trace: &EventTrace) -> Result<()> {
    for (index, event) in trace.events().iter().enumerate() {
        ensure_finite(index, event)?;
    }
    let mut writer = EventTraceWriter::create(path, trace.run_id(), trace.workload_id())?;
    for event in trace.events() {
        writer.append(event)?;
    }
    writer.flush()?;
    debug!(
        target: "ocrb::persistence",
        path = %path.display(),
        events = writer.written(),
        "trace written"
    );
    Ok(())
}

/// Reload a trace previously written with [`write_trace`].
pub fn load_trace(path: &Path) -> Result<EventTrace> {
    let reader = EventTraceReader::open(path)?;
    let header = reader.header().clone();
    let events = reader.collect::<Result<Vec<_>>>()?;
    debug!(
        target: "ocrb::persistence",
        path = %path.display(),
        events = events.len(),
        "trace loaded"
    );
    Ok(EventTrace::from_parts(header.run_id, header.workload_id, events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocrb_events::{EventDraft, EventLog, EventType, FailureClass};
    use tempfile::tempdir;

    #[test]
    fn reader_skips_blank_lines_and_keeps_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.jsonl");
        let mut log = EventLog::new("run-1", "W2-A");
        log.emit(EventDraft::new(EventType::RunStart).at(1.0));
        log.emit(
            EventDraft::new(EventType::Failure)
                .at(2.0)
                .failure("crash_0", FailureClass::AutonomouslyRecovered),
        );

        let mut writer = EventTraceWriter::create(&path, "run-1", "W2-A").unwrap();
        writer.append(&log.events()[0]).unwrap();
        writer.flush().unwrap();
        drop(writer);

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file).unwrap();
        writeln!(file, "{}", serde_json::to_string(&log.events()[1]).unwrap()).unwrap();

        let reader = EventTraceReader::open(&path).unwrap();
        assert_eq!(reader.header().run_id, "run-1");
        let kinds: Vec<_> = reader.map(|event| event.unwrap().kind).collect();
        assert_eq!(kinds, vec![EventType::RunStart, EventType::Failure]);
    }

    #[test]
    fn append_refuses_non_finite_numbers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.jsonl");
        let mut log = EventLog::new("run-1", "W2-A");
        log.emit(EventDraft::new(EventType::RunStart).at(1.0));
        log.emit(EventDraft::new(EventType::WorkUnitEnd).at(2.0).work(3.0, f64::INFINITY));

        let mut writer = EventTraceWriter::create(&path, "run-1", "W2-A").unwrap();
        writer.append(&log.events()[0]).unwrap();
        match writer.append(&log.events()[1]) {
            Err(PersistenceError::NonFiniteField { index, field, .. }) => {
                assert_eq!((index, field), (1, "resources_used"));
            }
            other => panic!("expected non-finite rejection, got {other:?}"),
        }
        assert_eq!(writer.written(), 1);
    }

    #[test]
    fn empty_file_has_no_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.jsonl");
        File::create(&path).unwrap();
        assert!(matches!(
            EventTraceReader::open(&path),
            Err(PersistenceError::MissingTraceHeader { .. })
        ));
    }
}
