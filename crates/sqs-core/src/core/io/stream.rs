use std::io::{self, BufRead};
use tracing::{trace, warn};

/// The line that closes every structure record of an `mcsqs` output stream.
pub const RECORD_TERMINATOR: &str = "end";

/// One complete record: everything between two terminators, terminator
/// excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based position of the record in the stream.
    pub index: usize,
    pub lines: Vec<String>,
}

/// Outcome of scanning a whole stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitSummary {
    /// Number of terminated records handed to the callback.
    pub records: usize,
    /// Non-blank lines after the last terminator that never formed a record.
    pub discarded_lines: usize,
}

/// Splits a line stream into records at each terminator line.
///
/// Trailing whitespace is ignored when matching the terminator, and blank
/// lines before the first line of a record are skipped. Lines after
/// the last terminator are not emitted; once the iterator is exhausted
/// [`RecordSplitter::discarded_lines`] reports how many non-blank lines were
/// dropped.
pub struct RecordSplitter<R> {
    reader: R,
    buffer: Vec<String>,
    count: usize,
    discarded: usize,
    finished: bool,
}

impl<R: BufRead> RecordSplitter<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            count: 0,
            discarded: 0,
            finished: false,
        }
    }

    pub fn records_emitted(&self) -> usize {
        self.count
    }

    pub fn discarded_lines(&self) -> usize {
        self.discarded
    }

    fn finish(&mut self) {
        self.finished = true;
        self.discarded = self
            .buffer
            .iter()
            .filter(|line| !line.trim().is_empty())
            .count();
        self.buffer.clear();
        if self.discarded > 0 {
            warn!(
                "Ignoring {} line(s) after the last '{}' terminator (incomplete trailing record).",
                self.discarded, RECORD_TERMINATOR
            );
        }
    }
}

impl<R: BufRead> Iterator for RecordSplitter<R> {
    type Item = io::Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let mut line = String::new();
        loop {
            line.clear();
            match self.reader.read_line(&mut line) {
                Ok(0) => {
                    self.finish();
                    return None;
                }
                Ok(_) => {
                    let content = line.trim_end();
                    if content == RECORD_TERMINATOR {
                        self.count += 1;
                        trace!(
                            "Record {} terminated after {} line(s).",
                            self.count,
                            self.buffer.len()
                        );
                        return Some(Ok(RawRecord {
                            index: self.count,
                            lines: std::mem::take(&mut self.buffer),
                        }));
                    }
                    if self.buffer.is_empty() && content.is_empty() {
                        continue;
                    }
                    self.buffer.push(content.to_string());
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Drives `on_record` once per terminated record, in stream order.
///
/// Stops at the first error returned by the reader or the callback.
///
/// # Errors
///
/// Propagates I/O errors (converted into `E`) and any error from `on_record`.
pub fn split_records<R, E, F>(reader: R, mut on_record: F) -> Result<SplitSummary, E>
where
    R: BufRead,
    E: From<io::Error>,
    F: FnMut(RawRecord) -> Result<(), E>,
{
    let mut splitter = RecordSplitter::new(reader);
    for record in splitter.by_ref() {
        on_record(record?)?;
    }
    Ok(SplitSummary {
        records: splitter.records_emitted(),
        discarded_lines: splitter.discarded_lines(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TWO_RECORDS: &str = "\
1 0 0
0 1 0
0 0 1
2 0 0
0 2 0
0 0 2
0 0 0 A
end
1 0 0
0 1 0
0 0 1
3 0 0
0 3 0
0 0 3
0 0 0 B
1 1 1 B
end
";

    #[test]
    fn splits_two_records_numbered_in_file_order() {
        let records: Vec<_> = RecordSplitter::new(Cursor::new(TWO_RECORDS))
            .collect::<io::Result<_>>()
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].index, 1);
        assert_eq!(records[1].index, 2);
        assert_eq!(records[0].lines.len(), 7);
        assert_eq!(records[1].lines.len(), 8);
        assert_eq!(records[0].lines[3], "2 0 0");
        assert_eq!(records[1].lines[3], "3 0 0");
        assert!(records.iter().all(|r| !r.lines.contains(&"end".to_string())));
    }

    #[test]
    fn blank_lines_between_records_are_skipped() {
        let input = TWO_RECORDS.replacen("end\n", "end\n\n", 1);
        let records: Vec<_> = RecordSplitter::new(Cursor::new(format!("\n{}", input)))
            .collect::<io::Result<_>>()
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].lines[0], "1 0 0");
        assert_eq!(records[1].lines[0], "1 0 0");
        assert_eq!(records[1].lines.len(), 8);
    }

    #[test]
    fn unterminated_tail_is_discarded_and_counted() {
        let input = format!("{}1 0 0\n0 1 0\n", TWO_RECORDS);
        let mut splitter = RecordSplitter::new(Cursor::new(input));
        let records: Vec<_> = splitter.by_ref().collect::<io::Result<_>>().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(splitter.discarded_lines(), 2);
    }

    #[test]
    fn trailing_blank_lines_are_not_reported() {
        let input = format!("{}\n\n", TWO_RECORDS);
        let mut splitter = RecordSplitter::new(Cursor::new(input));
        assert_eq!(splitter.by_ref().count(), 2);
        assert_eq!(splitter.discarded_lines(), 0);
    }

    #[test]
    fn terminator_with_trailing_whitespace_and_crlf_is_recognized() {
        let input = "1 0 0\r\nend  \r\n0 0 0\nend";
        let records: Vec<_> = RecordSplitter::new(Cursor::new(input))
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].lines, vec!["1 0 0".to_string()]);
    }

    #[test]
    fn indented_terminator_is_not_a_terminator() {
        let input = "1 0 0\n  end\n";
        let mut splitter = RecordSplitter::new(Cursor::new(input));
        assert_eq!(splitter.by_ref().count(), 0);
        assert_eq!(splitter.discarded_lines(), 2);
    }

    #[test]
    fn empty_input_yields_no_records() {
        let mut splitter = RecordSplitter::new(Cursor::new(""));
        assert!(splitter.next().is_none());
        assert!(splitter.next().is_none());
        assert_eq!(splitter.records_emitted(), 0);
    }

    #[test]
    fn split_records_invokes_callback_per_record() {
        let mut seen = Vec::new();
        let summary = split_records::<_, io::Error, _>(Cursor::new(TWO_RECORDS), |record| {
            seen.push(record.index);
            Ok(())
        })
        .unwrap();

        assert_eq!(seen, vec![1, 2]);
        assert_eq!(
            summary,
            SplitSummary {
                records: 2,
                discarded_lines: 0
            }
        );
    }

    #[test]
    fn split_records_stops_at_first_callback_error() {
        let mut calls = 0;
        let result = split_records(Cursor::new(TWO_RECORDS), |_| {
            calls += 1;
            Err(io::Error::other("boom"))
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
