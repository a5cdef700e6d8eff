use log::debug;
use rust_htslib::bgzf;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::{Result, VcfError};
use crate::header::Header;
use crate::variant::{VariantRecord, VariantTable, COLUMNS};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

pub(crate) fn is_gz(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

/// Open `path` for line reading. Paths ending in `.gz` must start with the
/// gzip magic bytes and are decompressed (plain gzip or BGZF).
pub fn open_text(path: &Path) -> Result<Box<dyn BufRead>> {
    let mut file = File::open(path).map_err(|e| VcfError::io(path, e))?;
    if !is_gz(path) {
        return Ok(Box::new(BufReader::new(file)));
    }
    let mut magic = [0u8; 2];
    file.read_exact(&mut magic)
        .map_err(|e| VcfError::io(path, e))?;
    if magic != GZIP_MAGIC {
        return Err(VcfError::io(
            path,
            io::Error::new(
                io::ErrorKind::InvalidData,
                "file ends in .gz but is not gzip-compressed",
            ),
        ));
    }
    drop(file);
    let reader = bgzf::Reader::from_path(path)
        .map_err(|e| VcfError::io(path, io::Error::new(io::ErrorKind::Other, e)))?;
    Ok(Box::new(BufReader::new(reader)))
}

/// Reads the header eagerly on construction, then yields one record per
/// data line. Stops after the first error.
pub struct RecordsIterator<R> {
    reader: R,
    path: PathBuf,
    header: Header,
    columns: Vec<String>,
    line_no: usize,
    buf: String,
    done: bool,
}

impl RecordsIterator<Box<dyn BufRead>> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        RecordsIterator::new(open_text(path)?, path)
    }
}

impl<R: BufRead> RecordsIterator<R> {
    /// `path` is only used to label errors.
    pub fn new(mut reader: R, path: &Path) -> Result<Self> {
        let mut text = String::new();
        let mut buf = String::new();
        let mut line_no = 0;
        loop {
            buf.clear();
            let n = reader
                .read_line(&mut buf)
                .map_err(|e| VcfError::io(path, e))?;
            if n == 0 {
                return Err(VcfError::parse(path, 0, "missing #CHROM column line"));
            }
            line_no += 1;
            if buf.starts_with('#') {
                text.push_str(&buf);
                if !buf.starts_with("##") {
                    break;
                }
            } else if !trim_newline(&buf).is_empty() {
                return Err(VcfError::parse(
                    path,
                    line_no,
                    "data line found before the #CHROM column line",
                ));
            }
        }

        let header = Header::from_text(&text).map_err(|msg| VcfError::parse(path, line_no, msg))?;
        let columns = parse_columns(header.column_line())
            .map_err(|msg| VcfError::parse(path, line_no, msg))?;

        Ok(RecordsIterator {
            reader,
            path: path.to_path_buf(),
            header,
            columns,
            line_no,
            buf,
            done: false,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl<R: BufRead> Iterator for RecordsIterator<R> {
    type Item = Result<VariantRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(VcfError::io(&self.path, e)));
                }
            }
            self.line_no += 1;
            let line = trim_newline(&self.buf);
            if line.is_empty() {
                continue;
            }
            if line.starts_with('#') {
                self.done = true;
                return Some(Err(VcfError::parse(
                    &self.path,
                    self.line_no,
                    "header line found after the #CHROM column line",
                )));
            }
            return match parse_line(line, self.columns.len()) {
                Ok(record) => Some(Ok(record)),
                Err(msg) => {
                    self.done = true;
                    Some(Err(VcfError::parse(&self.path, self.line_no, msg)))
                }
            };
        }
    }
}

fn trim_newline(line: &str) -> &str {
    line.trim_end_matches(|c: char| c == '\n' || c == '\r')
}

/// Column names from the `#CHROM` line, with the `#` dropped.
fn parse_columns(column_line: &str) -> std::result::Result<Vec<String>, String> {
    let names: Vec<String> = trim_newline(column_line)
        .trim_start_matches('#')
        .split('\t')
        .map(|s| s.to_string())
        .collect();
    if names.len() < COLUMNS.len() || names[..COLUMNS.len()] != COLUMNS {
        return Err(format!(
            "column line must start with {}, found {}",
            COLUMNS.join(" "),
            names.join(" ")
        ));
    }
    Ok(names)
}

fn parse_line(line: &str, n_columns: usize) -> std::result::Result<VariantRecord, String> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != n_columns {
        return Err(format!(
            "expected {} tab-separated fields, found {}",
            n_columns,
            fields.len()
        ));
    }
    // digits only: u64's parser would also take a leading '+'
    if fields[1].is_empty() || !fields[1].bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("POS is not an integer: {:?}", fields[1]));
    }
    let pos: u64 = fields[1]
        .parse()
        .map_err(|_| format!("POS is out of range: {:?}", fields[1]))?;
    if pos == 0 {
        return Err("POS must be 1 or greater".to_string());
    }
    for (i, name) in [(0, "CHROM"), (3, "REF"), (4, "ALT")] {
        if fields[i].is_empty() {
            return Err(format!("{} is empty", name));
        }
    }
    Ok(VariantRecord {
        chrom: fields[0].to_string(),
        pos,
        id: fields[2].to_string(),
        ref_allele: fields[3].to_string(),
        alt: fields[4].to_string(),
        qual: fields[5].to_string(),
        filter: fields[6].to_string(),
        info: fields[7].to_string(),
        samples: fields[8..].iter().map(|s| s.to_string()).collect(),
    })
}

/// Read a whole VCF (optionally gzipped) into memory.
pub fn parse<P: AsRef<Path>>(path: P) -> Result<VariantTable> {
    let path = path.as_ref();
    let mut it = RecordsIterator::from_path(path)?;
    let records = it.by_ref().collect::<Result<Vec<_>>>()?;
    debug!(
        "parsed {} records ({} columns) from {}",
        records.len(),
        it.columns.len(),
        path.display()
    );
    Ok(VariantTable::new(it.header, it.columns, records))
}

/// Every line of `path` that starts with `#`, verbatim and in order.
///
/// The collected lines must still form a valid [`Header`]: a `##` line
/// after the `#CHROM` line, or a second `#CHROM` line, is a parse error.
pub fn read_header<P: AsRef<Path>>(path: P) -> Result<Header> {
    let path = path.as_ref();
    let mut reader = open_text(path)?;
    let mut text = String::new();
    let mut buf = String::new();
    loop {
        buf.clear();
        let n = reader
            .read_line(&mut buf)
            .map_err(|e| VcfError::io(path, e))?;
        if n == 0 {
            break;
        }
        if buf.starts_with('#') {
            text.push_str(&buf);
        }
    }
    Header::from_text(&text).map_err(|msg| VcfError::parse(path, 0, msg))
}
