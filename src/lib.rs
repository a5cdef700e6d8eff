pub mod error;
pub mod filter;
pub mod header;
pub mod records_iterator;
pub mod score;
pub mod variant;
pub mod writer;

pub use error::{Result, VcfError};
pub use filter::filter_pass;
pub use header::{build_default_header, Header};
pub use records_iterator::{parse, read_header, RecordsIterator};
pub use score::{score, ConfusionCounts, Metric, Metrics};
pub use variant::{VariantKey, VariantRecord, VariantTable};
pub use writer::write;
