use std::fmt;

use crate::header::Header;

/// The fixed leading columns of every variant line, in on-disk order.
/// `CHROM` is the logical name; the file spells it `#CHROM`.
pub const COLUMNS: [&str; 8] = ["CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO"];

/// Represents a single row of a VCF file.
///
/// Everything except `pos` is kept as the text that was read so that
/// writing a record back out reproduces it byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRecord {
    pub chrom: String,
    /// 1-based.
    pub pos: u64,
    pub id: String,
    pub ref_allele: String,
    /// May hold several comma-separated alleles; never split.
    pub alt: String,
    pub qual: String,
    pub filter: String,
    pub info: String,
    /// FORMAT and per-sample columns, if the file has any. Carried through
    /// untouched.
    pub samples: Vec<String>,
}

impl VariantRecord {
    pub fn key(&self) -> VariantKey<'_> {
        VariantKey {
            chrom: &self.chrom,
            pos: self.pos,
            ref_allele: &self.ref_allele,
            alt: &self.alt,
        }
    }
}

impl fmt::Display for VariantRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.chrom,
            self.pos,
            self.id,
            self.ref_allele,
            self.alt,
            self.qual,
            self.filter,
            self.info
        )?;
        for s in &self.samples {
            write!(f, "\t{}", s)?;
        }
        Ok(())
    }
}

/// The identity of a variant for set comparison: `(chrom, pos, ref, alt)`.
///
/// Compared structurally, so an allele containing `-` can never collide
/// with a different variant the way a joined string could.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariantKey<'a> {
    pub chrom: &'a str,
    pub pos: u64,
    pub ref_allele: &'a str,
    pub alt: &'a str,
}

impl fmt::Display for VariantKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}-{}", self.chrom, self.pos, self.ref_allele, self.alt)
    }
}

/// An ordered set of records together with the header they were read with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantTable {
    header: Header,
    columns: Vec<String>,
    records: Vec<VariantRecord>,
}

impl VariantTable {
    pub fn new(header: Header, columns: Vec<String>, records: Vec<VariantRecord>) -> Self {
        VariantTable {
            header,
            columns,
            records,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Column names with the leading `#` removed, e.g. `CHROM`, `POS`, ...
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[VariantRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Build a new table with the same header and schema but only the
    /// records for which `keep` returns true.
    pub fn retain<F>(self, mut keep: F) -> Self
    where
        F: FnMut(&VariantRecord) -> bool,
    {
        let VariantTable {
            header,
            columns,
            mut records,
        } = self;
        records.retain(|r| keep(r));
        VariantTable {
            header,
            columns,
            records,
        }
    }
}
