use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::error::{EventFileError, EventStackError};
use super::event::Event;

/// Reader for a single JSON-lines event file, one event record per line.
#[derive(Debug)]
pub struct EventFile {
    reader: BufReader<File>,
}

impl EventFile {
    pub fn new(path: &Path) -> Result<Self, EventFileError> {
        if !path.exists() {
            return Err(EventFileError::BadFilePath(path.to_path_buf()));
        }
        Ok(Self {
            reader: BufReader::new(File::open(path)?),
        })
    }

    /// Get the next event in the file.
    ///
    /// Returns a `Result<Option<Event>>`. The Option is None at end of file.
    pub fn get_next_event(&mut self) -> Result<Option<Event>, EventFileError> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            if line.trim().is_empty() {
                continue;
            }
            return Ok(Some(serde_json::from_str(line.trim())?));
        }
    }
}

/// An ordered stack of event files treated as one continuous sequence.
///
/// Datasets are split across several ntuple exports per run; the stack walks
/// them in the order given, switching files transparently.
#[derive(Debug)]
pub struct EventStack {
    file_stack: VecDeque<PathBuf>,
    active_file: EventFile,
    is_ended: bool,
}

impl EventStack {
    /// Create a new EventStack over the given files, in order.
    pub fn new(paths: &[PathBuf]) -> Result<Self, EventStackError> {
        let mut stack: VecDeque<PathBuf> = paths.iter().cloned().collect();
        if let Some(file_path) = stack.pop_front() {
            Ok(EventStack {
                file_stack: stack,
                active_file: EventFile::new(&file_path)?,
                is_ended: false,
            })
        } else {
            Err(EventStackError::NoFiles)
        }
    }

    /// Get the next event in the file stack.
    ///
    /// Returns a `Result<Option<Event>>`. The Option is None if the stack
    /// has no more data.
    pub fn get_next_event(&mut self) -> Result<Option<Event>, EventStackError> {
        loop {
            if self.is_ended {
                return Ok(None);
            }

            match self.active_file.get_next_event()? {
                Some(event) => return Ok(Some(event)),
                None => self.move_to_next_file()?,
            }
        }
    }

    /// Move to the next file in the stack
    fn move_to_next_file(&mut self) -> Result<(), EventStackError> {
        if let Some(next_file_path) = self.file_stack.pop_front() {
            self.active_file = EventFile::new(&next_file_path)?;
        } else {
            self.is_ended = true;
        }
        Ok(())
    }
}

//Unit tests
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_events(path: &Path, runs: &[u32]) {
        let mut file = File::create(path).unwrap();
        for run in runs {
            let event = Event {
                run: *run,
                lumi_section: 1,
                hits: Vec::new(),
                tracks: Vec::new(),
            };
            writeln!(file, "{}", serde_json::to_string(&event).unwrap()).unwrap();
        }
    }

    #[test]
    fn test_stack_spans_files() {
        let dir = std::env::temp_dir();
        let path_a = dir.join("csc_daq_rate_stack_a.jsonl");
        let path_b = dir.join("csc_daq_rate_stack_b.jsonl");
        write_events(&path_a, &[1, 2]);
        write_events(&path_b, &[3]);

        let mut stack = EventStack::new(&[path_a.clone(), path_b.clone()]).unwrap();
        let mut runs = Vec::new();
        while let Some(event) = stack.get_next_event().unwrap() {
            runs.push(event.run);
        }
        assert_eq!(runs, vec![1, 2, 3]);

        std::fs::remove_file(path_a).unwrap();
        std::fs::remove_file(path_b).unwrap();
    }

    #[test]
    fn test_empty_stack_is_error() {
        assert!(matches!(
            EventStack::new(&[]),
            Err(EventStackError::NoFiles)
        ));
    }
}
