//! Line-delimited JSON output parser.

use std::io::{BufRead, Lines};

use serde::Deserialize;

use super::ResolutionEvent;
use crate::error_handling::ParseError;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DnsRecord {
    name: String,
    #[serde(rename = "type")]
    record_type: String,
    status: String,
    data: DnsData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DnsData {
    answers: Vec<DnsAnswer>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DnsAnswer {
    #[serde(rename = "type")]
    record_type: String,
    data: String,
}

impl DnsRecord {
    /// Converts a successful A query into an event; anything else yields `None`.
    fn into_event(self) -> Option<ResolutionEvent> {
        if self.record_type != "A" || self.status != "NOERROR" {
            return None;
        }

        let addresses: Vec<String> = self
            .data
            .answers
            .into_iter()
            .filter(|answer| answer.record_type == "A")
            .map(|answer| answer.data)
            .collect();

        if addresses.is_empty() {
            return None;
        }
        Some(ResolutionEvent::new(&self.name, addresses))
    }
}

/// Iterator over records in the line-delimited JSON format.
pub struct NdjsonRecords<R> {
    lines: Lines<R>,
    line_number: usize,
    finished: bool,
}

impl<R: BufRead> NdjsonRecords<R> {
    /// Wraps a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
            finished: false,
        }
    }
}

impl<R: BufRead> Iterator for NdjsonRecords<R> {
    type Item = Result<ResolutionEvent, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        for line in self.lines.by_ref() {
            self.line_number += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(ParseError::Io(e)));
                }
            };
            let record: DnsRecord = match serde_json::from_str(&line) {
                Ok(record) => record,
                Err(source) => {
                    self.finished = true;
                    return Some(Err(ParseError::Decode {
                        line: self.line_number,
                        source,
                    }));
                }
            };

            if let Some(event) = record.into_event() {
                return Some(Ok(event));
            }
        }

        self.finished = true;
        None
    }
}
