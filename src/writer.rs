use log::debug;
use rust_htslib::bgzf;
use std::fs::File;
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{Result, VcfError};
use crate::header::Header;
use crate::records_iterator::is_gz;
use crate::variant::{VariantTable, COLUMNS};

/// The empty block htslib appends when it closes a BGZF file.
const BGZF_EOF: [u8; 28] = [
    0x1f, 0x8b, 0x08, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0x06, 0x00, 0x42, 0x43, 0x02, 0x00,
    0x1b, 0x00, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// `EitherWriter` picks BGZF output for `.gz` paths and plain text otherwise.
pub enum EitherWriter {
    Bgzf(bgzf::Writer),
    File(BufWriter<File>),
}

impl EitherWriter {
    /// Creates or truncates `path`.
    pub fn from_path(path: &Path) -> Result<Self> {
        if is_gz(path) {
            let w = bgzf::Writer::from_path(path)
                .map_err(|e| VcfError::io(path, io::Error::new(io::ErrorKind::Other, e)))?;
            Ok(EitherWriter::Bgzf(w))
        } else {
            let f = File::create(path).map_err(|e| VcfError::io(path, e))?;
            Ok(EitherWriter::File(BufWriter::new(f)))
        }
    }

    /// Flush and close. The BGZF writer can only be closed by dropping it,
    /// which reports nothing, so the file is checked for its EOF block instead.
    pub fn finish(mut self, path: &Path) -> io::Result<()> {
        self.flush()?;
        let compressed = matches!(self, EitherWriter::Bgzf(_));
        drop(self);
        if compressed {
            check_bgzf_eof(path)?;
        }
        Ok(())
    }
}

impl Write for EitherWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            EitherWriter::Bgzf(w) => w.write(buf),
            EitherWriter::File(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            EitherWriter::Bgzf(w) => w.flush(),
            EitherWriter::File(w) => w.flush(),
        }
    }
}

fn check_bgzf_eof(path: &Path) -> io::Result<()> {
    let mut f = File::open(path)?;
    let len = f.metadata()?.len();
    let mut tail = [0u8; 28];
    if len >= tail.len() as u64 {
        f.seek(SeekFrom::End(-(tail.len() as i64)))?;
        f.read_exact(&mut tail)?;
        if tail == BGZF_EOF {
            return Ok(());
        }
    }
    Err(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "BGZF output is missing its EOF block; the file was not closed cleanly",
    ))
}

/// Write `header` verbatim and then one tab-separated line per record.
/// The table's own header is ignored; the caller decides what goes on top,
/// but its column line must name as many columns as every record has fields.
pub fn write<P: AsRef<Path>>(table: &VariantTable, header: &Header, out: P) -> Result<()> {
    let path = out.as_ref();
    let n_columns = header.column_count();
    if let Some((i, record)) = table
        .records()
        .iter()
        .enumerate()
        .find(|(_, r)| COLUMNS.len() + r.samples.len() != n_columns)
    {
        return Err(VcfError::parse(
            path,
            0,
            format!(
                "record {} ({}) has {} fields but the header names {} columns",
                i + 1,
                record.key(),
                COLUMNS.len() + record.samples.len(),
                n_columns
            ),
        ));
    }
    let mut wtr = EitherWriter::from_path(path)?;
    write_records(&mut wtr, table, header).map_err(|e| VcfError::io(path, e))?;
    wtr.finish(path).map_err(|e| VcfError::io(path, e))?;
    debug!("wrote {} records to {}", table.len(), path.display());
    Ok(())
}

fn write_records<W: Write>(wtr: &mut W, table: &VariantTable, header: &Header) -> io::Result<()> {
    wtr.write_all(header.as_str().as_bytes())?;
    for record in table.records() {
        writeln!(wtr, "{}", record)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::build_default_header;
    use crate::records_iterator::{parse, read_header};
    use chrono::NaiveDate;

    const VCF: &str = "##fileformat=VCFv4.2\n##FILTER=<ID=LowQual,Description=\"low\">\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1\n1\t100\trs1\tA\tG\t50.00\tPASS\tDP=10;AF=0.5\tGT\t0/1\n1\t200\t.\tC\tT,G\t.\tLowQual\t.\tGT\t1/2\nchrX\t3\t.\tN\t<DEL>\t7\t.\tSVTYPE=DEL\tGT\t1/1\n";

    #[test]
    fn test_round_trip_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.vcf");
        std::fs::write(&input, VCF).unwrap();

        let table = parse(&input).unwrap();
        let header = read_header(&input).unwrap();
        let output = dir.path().join("out.vcf");
        write(&table, &header, &output).unwrap();

        assert_eq!(std::fs::read_to_string(&output).unwrap(), VCF);
        assert_eq!(parse(&output).unwrap(), table);
        assert_eq!(read_header(&output).unwrap(), header);
    }

    #[test]
    fn test_round_trip_gz() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.vcf");
        std::fs::write(&input, VCF).unwrap();
        let table = parse(&input).unwrap();

        let output = dir.path().join("out.vcf.gz");
        write(&table, table.header(), &output).unwrap();
        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
        assert_eq!(&bytes[bytes.len() - 28..], &BGZF_EOF[..]);
        assert_eq!(parse(&output).unwrap(), table);
    }

    #[test]
    fn test_write_with_default_header_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.vcf");
        std::fs::write(&input, VCF).unwrap();
        let table = parse(&input).unwrap();
        let header = build_default_header(NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(), "ref.fa");

        let output = dir.path().join("out.vcf");
        std::fs::write(&output, "stale contents that must disappear\n").unwrap();
        // no records, only the header
        let empty = table.retain(|_| false);
        write(&empty, &header, &output).unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), header.as_str());
    }

    #[test]
    fn test_unwritable_destination_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.vcf");
        std::fs::write(&input, VCF).unwrap();
        let table = parse(&input).unwrap();
        let output = dir.path().join("missing-dir").join("out.vcf");
        let err = write(&table, table.header(), &output).unwrap_err();
        assert!(matches!(err, VcfError::Io { .. }));
    }

    #[test]
    fn test_default_header_keeps_sample_columns_parseable() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.vcf");
        std::fs::write(&input, VCF).unwrap();
        let table = parse(&input).unwrap();
        let date = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();

        let bare = build_default_header(date, "ref.fa");
        let output = dir.path().join("out.vcf");
        let err = write(&table, &bare, &output).unwrap_err();
        assert!(matches!(err, VcfError::Parse { .. }), "{:?}", err);
        assert!(!output.exists());

        let header = bare.with_extra_columns(&table.columns()[COLUMNS.len()..]);
        write(&table, &header, &output).unwrap();
        let back = parse(&output).unwrap();
        assert_eq!(back.records(), table.records());
        assert_eq!(back.columns(), table.columns());
        assert_eq!(back.header(), &header);
    }

    #[test]
    fn test_truncated_bgzf_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cut.vcf.gz");
        std::fs::write(&path, &BGZF_EOF[..20]).unwrap();
        assert_eq!(
            check_bgzf_eof(&path).unwrap_err().kind(),
            io::ErrorKind::UnexpectedEof
        );
        std::fs::write(&path, BGZF_EOF).unwrap();
        assert!(check_bgzf_eof(&path).is_ok());
    }
}
