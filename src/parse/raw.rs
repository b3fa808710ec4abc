//! Raw full-text output parser.

use std::io::{BufRead, Lines};
use std::mem;

use super::{normalize_hostname, ResolutionEvent};
use crate::error_handling::ParseError;

/// Prefix of the `;; ANSWER SECTION:` header that starts every record.
const ANSWER_SECTION_MARKER: &str = ";; AN";

#[derive(Debug, Default)]
struct RawState {
    answer_start: bool,
    cname_seen: bool,
    ns_seen: bool,
    domain: String,
    addresses: Vec<String>,
}

impl RawState {
    /// Takes the pending record, if any, and resets the per-record flags.
    fn take_record(&mut self) -> Option<ResolutionEvent> {
        if self.domain.is_empty() {
            return None;
        }
        self.cname_seen = false;
        self.ns_seen = false;
        Some(ResolutionEvent {
            hostname: mem::take(&mut self.domain),
            addresses: mem::take(&mut self.addresses),
        })
    }

    /// Feeds one line and returns a record when the line closes the previous one.
    fn feed(&mut self, line: &str) -> Option<ResolutionEvent> {
        if line.is_empty() {
            return None;
        }

        if line.starts_with(ANSWER_SECTION_MARKER) {
            let record = self.take_record();
            self.answer_start = true;
            return record;
        }

        if !self.answer_start {
            return None;
        }

        let fields: Vec<&str> = line.split(' ').collect();
        let [name, _ttl, _class, record_type, value] = fields.as_slice() else {
            return None;
        };

        match *record_type {
            // Answers after an NS line belong to a delegation, not the queried name
            "NS" => self.ns_seen = true,
            // The first CNAME owner is the queried name; later ones are chain links
            "CNAME" if !self.cname_seen => {
                self.ns_seen = false;
                self.domain = normalize_hostname(name).to_string();
                self.cname_seen = true;
            }
            "A" if !self.ns_seen => {
                if !self.cname_seen && self.domain.is_empty() {
                    self.domain = normalize_hostname(name).to_string();
                }
                self.addresses.push((*value).to_string());
            }
            _ => {}
        }
        None
    }
}

/// Iterator over records in the raw full-text format.
///
/// The final record has no trailing header and is flushed at end of stream.
pub struct RawRecords<R> {
    lines: Lines<R>,
    state: RawState,
    finished: bool,
}

impl<R: BufRead> RawRecords<R> {
    /// Wraps a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            state: RawState::default(),
            finished: false,
        }
    }
}

impl<R: BufRead> Iterator for RawRecords<R> {
    type Item = Result<ResolutionEvent, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        for line in self.lines.by_ref() {
            match line {
                Ok(line) => {
                    if let Some(record) = self.state.feed(&line) {
                        return Some(Ok(record));
                    }
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(ParseError::Io(e)));
                }
            }
        }

        self.finished = true;
        self.state.take_record().map(Ok)
    }
}
