use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ByteRecord, ByteRecordsIntoIter, StringRecord};
use serde::{Deserialize, Serialize};

use crate::errors::ParserError;
use crate::model::RawRecord;
use crate::schema::Schema;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeaderSource {
    /// First line that is not a comment.
    #[default]
    FirstLine,
    /// First comment line with the comment prefix stripped (AQS "RD" extracts).
    LeadingComment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    pub delimiter: char,
    pub comment: char,
    pub missing: String,
    pub header: HeaderSource,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            delimiter: '|',
            comment: '#',
            missing: String::new(),
            header: HeaderSource::FirstLine,
        }
    }
}

impl ReaderOptions {
    /// Layout of the EPA AQS raw data extracts.
    pub fn aqs() -> Self {
        Self {
            header: HeaderSource::LeadingComment,
            ..Self::default()
        }
    }
}

pub struct DelimitedReader<R> {
    inner: csv::Reader<R>,
    options: ReaderOptions,
}

impl DelimitedReader<File> {
    pub fn from_path(path: &Path, options: &ReaderOptions) -> Result<Self, ParserError> {
        let file = File::open(path).map_err(|source| ParserError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(file, options)
    }
}

impl<'a> DelimitedReader<&'a [u8]> {
    pub fn from_text(content: &'a str, options: &ReaderOptions) -> Result<Self, ParserError> {
        Self::new(content.as_bytes(), options)
    }
}

impl<R: Read> DelimitedReader<R> {
    pub fn new(reader: R, options: &ReaderOptions) -> Result<Self, ParserError> {
        if !options.delimiter.is_ascii() {
            return Err(ParserError::InvalidOption(options.delimiter));
        }
        if !options.comment.is_ascii() {
            return Err(ParserError::InvalidOption(options.comment));
        }

        let inner = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .delimiter(options.delimiter as u8)
            .from_reader(reader);

        Ok(Self {
            inner,
            options: options.clone(),
        })
    }

    /// Consumes the header line and returns the schema together with the data records.
    /// The header line is never yielded as data.
    pub fn split_header(self) -> Result<(Schema, RawRecords<R>), ParserError> {
        let mut records = RawRecords {
            records: self.inner.into_byte_records(),
            comment: self.options.comment as u8,
            missing: self.options.missing,
            comment_lines: 0,
        };

        let header = loop {
            let line = records.next_line().ok_or(ParserError::MissingHeader)??;
            match (self.options.header, line) {
                (HeaderSource::FirstLine, Line::Comment(_)) => records.comment_lines += 1,
                (HeaderSource::FirstLine, Line::Data(record)) => {
                    break record.iter().map(|field| field.trim().to_string()).collect::<Vec<_>>();
                }
                (HeaderSource::LeadingComment, Line::Comment(record)) => {
                    break strip_comment(&record, records.comment);
                }
                (HeaderSource::LeadingComment, Line::Data(_)) => {
                    return Err(ParserError::MissingHeader)
                }
            }
        };

        Ok((Schema::from_header(header), records))
    }
}

enum Line {
    Comment(StringRecord),
    Data(StringRecord),
}

pub struct RawRecords<R> {
    records: ByteRecordsIntoIter<R>,
    comment: u8,
    missing: String,
    comment_lines: usize,
}

impl<R: Read> RawRecords<R> {
    /// Comment lines skipped so far, excluding a header taken from a comment.
    pub fn comment_lines(&self) -> usize {
        self.comment_lines
    }

    fn next_line(&mut self) -> Option<Result<Line, ParserError>> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(source) => {
                    let line = source.position().map(|pos| pos.line()).unwrap_or(0);
                    return Some(Err(ParserError::Csv { line, source }));
                }
            };

            let first = record.get(0).unwrap_or_default().trim_ascii();
            if record.len() <= 1 && first.is_empty() {
                continue;
            }
            if first.first() == Some(&self.comment) {
                return Some(Ok(Line::Comment(StringRecord::from_byte_record_lossy(record))));
            }
            let line = record.position().map(|pos| pos.line()).unwrap_or(0);
            return Some(
                StringRecord::from_byte_record(record)
                    .map(Line::Data)
                    .map_err(|err| ParserError::Undecodable {
                        line,
                        field: err.utf8_error().field() + 1,
                    }),
            );
        }
    }

    fn to_raw(&self, record: &StringRecord) -> RawRecord {
        let fields = record
            .iter()
            .map(|field| {
                let trimmed = field.trim();
                if trimmed == self.missing {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect();
        RawRecord {
            line: record.position().map(|pos| pos.line()).unwrap_or(0),
            fields,
        }
    }
}

impl<R: Read> Iterator for RawRecords<R> {
    type Item = Result<RawRecord, ParserError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.next_line()? {
                Ok(Line::Comment(_)) => self.comment_lines += 1,
                Ok(Line::Data(record)) => return Some(Ok(self.to_raw(&record))),
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

fn strip_comment(record: &StringRecord, comment: u8) -> Vec<String> {
    record
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let field = field.trim();
            if idx == 0 {
                field
                    .strip_prefix(char::from(comment))
                    .unwrap_or(field)
                    .trim()
                    .to_string()
            } else {
                field.to_string()
            }
        })
        .collect()
}
