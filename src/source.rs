//! Observation input from the vision stage: one JSON object per line,
//! e.g. `{"regions": 1, "centroid": [120, 340], "t_ms": 100}`.

use serde::Deserialize;
use std::io::BufRead;

use crate::error::GestureError;

/// What the vision stage saw in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Observation {
    pub regions: u32,
    /// Centroid of the region, present only when exactly one was found.
    #[serde(default)]
    pub centroid: Option<(i32, i32)>,
}

impl Observation {
    pub fn new(regions: u32, centroid: Option<(i32, i32)>) -> Self {
        Self { regions, centroid }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Frame {
    #[serde(flatten)]
    pub observation: Observation,
    /// Capture time; frames without one are stamped on arrival.
    #[serde(default)]
    pub t_ms: Option<u64>,
}

pub trait ObservationSource {
    /// Next frame, or `None` once the stream has ended.
    fn next_frame(&mut self) -> Result<Option<Frame>, GestureError>;
}

pub struct JsonLinesSource<R> {
    reader: R,
    line_no: usize,
    buf: String,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> ObservationSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> Result<Option<Frame>, GestureError> {
        loop {
            self.buf.clear();
            self.line_no += 1;
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            let line = self.buf.trim();
            if line.is_empty() {
                continue;
            }
            return serde_json::from_str(line)
                .map(Some)
                .map_err(|source| GestureError::MalformedObservation {
                    line: self.line_no,
                    source,
                });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(input: &str) -> Vec<Frame> {
        let mut src = JsonLinesSource::new(input.as_bytes());
        let mut out = vec![];
        while let Some(f) = src.next_frame().unwrap() {
            out.push(f);
        }
        out
    }

    #[test]
    fn test_parses_lines() {
        let got = frames(
            "{\"regions\": 1, \"centroid\": [120, 340], \"t_ms\": 100}\n\
             \n\
             {\"regions\": 3}\n",
        );
        assert_eq!(
            got,
            vec![
                Frame {
                    observation: Observation::new(1, Some((120, 340))),
                    t_ms: Some(100),
                },
                Frame {
                    observation: Observation::new(3, None),
                    t_ms: None,
                },
            ]
        );
    }

    #[test]
    fn test_reports_line_of_bad_record() {
        let mut src = JsonLinesSource::new("{\"regions\": 0}\n\n{\"regions\": -1}\n".as_bytes());
        assert!(src.next_frame().unwrap().is_some());
        let err = src.next_frame().unwrap_err();
        assert!(matches!(err, GestureError::MalformedObservation { line: 3, .. }));
    }

    #[test]
    fn test_read_failure_is_io_error() {
        let mut src = JsonLinesSource::new(&[0xff, 0xfe, b'\n'][..]);
        let err = src.next_frame().unwrap_err();
        assert!(matches!(err, GestureError::Io(_)), "{err:?}");
    }

    #[test]
    fn test_empty_input_ends_immediately() {
        assert!(frames("").is_empty());
    }
}
