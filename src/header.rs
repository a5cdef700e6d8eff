use chrono::NaiveDate;
use std::fmt;

use crate::variant::COLUMNS;

/// Source tag written into headers this tool creates from scratch.
pub const DEFAULT_SOURCE: &str = "myImputationProgramV3.1";

/// The `#` lines of a VCF file, kept verbatim.
///
/// Zero or more `##` metadata lines followed by exactly one `#CHROM...`
/// column line, always ending in a newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    text: String,
}

impl Header {
    /// Validate header text. A missing final newline is added; every line
    /// must start with `#` and the last one must be the column line.
    pub fn from_text(text: &str) -> Result<Self, String> {
        let body = text.strip_suffix('\n').unwrap_or(text);
        if body.is_empty() {
            return Err("header is empty".to_string());
        }
        let lines: Vec<&str> = body.split('\n').collect();
        if let Some(bad) = lines.iter().find(|l| !l.starts_with('#')) {
            return Err(format!("header line does not start with '#': {:?}", bad));
        }
        let last = lines[lines.len() - 1];
        if last.starts_with("##") {
            return Err("header does not end with a #CHROM column line".to_string());
        }
        if let Some(extra) = lines[..lines.len() - 1]
            .iter()
            .find(|l| !l.starts_with("##"))
        {
            return Err(format!("more than one column line in header: {:?}", extra));
        }
        Ok(Header {
            text: format!("{}\n", body),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The `#CHROM...` line without its newline.
    pub fn column_line(&self) -> &str {
        let body = &self.text[..self.text.len() - 1];
        body.rsplit('\n').next().unwrap_or(body)
    }

    /// The `##` lines, without newlines.
    pub fn metadata_lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines().filter(|l| l.starts_with("##"))
    }

    /// Number of tab-separated names on the column line.
    pub fn column_count(&self) -> usize {
        self.column_line().trim_end_matches('\r').split('\t').count()
    }

    /// Append `extra` names (e.g. `FORMAT` and sample names) to the column line.
    pub fn with_extra_columns(&self, extra: &[String]) -> Header {
        if extra.is_empty() {
            return self.clone();
        }
        let column_line = self.column_line();
        let metadata = &self.text[..self.text.len() - 1 - column_line.len()];
        Header {
            text: format!(
                "{}{}\t{}\n",
                metadata,
                column_line.trim_end_matches('\r'),
                extra.join("\t")
            ),
        }
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Header used when a derived file should not inherit its input's header.
/// `now` becomes the `##fileDate` and `reference` the `##reference`.
pub fn build_default_header(now: NaiveDate, reference: &str) -> Header {
    Header {
        text: format!(
            "##fileformat=VCFv4.1\n##fileDate={}\n##source={}\n##reference={}\n#{}\n",
            now.format("%Y%m%d"),
            DEFAULT_SOURCE,
            reference,
            COLUMNS.join("\t")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_header() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let h = build_default_header(date, "data/ref.fasta");
        assert_eq!(
            h.as_str(),
            "##fileformat=VCFv4.1\n##fileDate=20240307\n##source=myImputationProgramV3.1\n##reference=data/ref.fasta\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n"
        );
        assert_eq!(h.column_line(), "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO");
        assert_eq!(h.metadata_lines().count(), 4);
        // must pass its own validation
        assert_eq!(Header::from_text(h.as_str()).unwrap(), h);
    }

    #[test]
    fn test_default_header_with_sample_columns() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let base = build_default_header(date, "ref.fa");
        assert_eq!(base.column_count(), 8);
        let extra = vec!["FORMAT".to_string(), "S1".to_string()];
        let h = base.with_extra_columns(&extra);
        assert_eq!(h.column_count(), 10);
        assert_eq!(
            h.column_line(),
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1"
        );
        assert_eq!(h.metadata_lines().count(), 4);
        assert!(h.as_str().starts_with("##fileformat=VCFv4.1\n"));
        assert_eq!(base.with_extra_columns(&[]), base);
    }

    #[test]
    fn test_from_text_adds_newline() {
        let h = Header::from_text("##x=1\n#CHROM\tPOS").unwrap();
        assert_eq!(h.as_str(), "##x=1\n#CHROM\tPOS\n");
        assert_eq!(h.column_line(), "#CHROM\tPOS");
    }

    #[test]
    fn test_from_text_column_line_only() {
        let h = Header::from_text("#CHROM\tPOS\n").unwrap();
        assert_eq!(h.column_line(), "#CHROM\tPOS");
        assert_eq!(h.metadata_lines().count(), 0);
    }

    #[test]
    fn test_from_text_rejects() {
        assert!(Header::from_text("").is_err());
        assert!(Header::from_text("##fileformat=VCFv4.1\n").is_err());
        assert!(Header::from_text("##a\nchr1\t1\n#CHROM\n").is_err());
        assert!(Header::from_text("#CHROM\n#CHROM\n").is_err());
        assert!(Header::from_text("#CHROM\n\n").is_err());
    }
}
