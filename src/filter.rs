use log::{debug, warn};

use crate::variant::VariantTable;

/// FILTER values that mean the caller accepted the variant.
pub const PASS_VALUES: [&str; 2] = ["PASS", "."];

/// Exact match only: `pass`, `PASS;q10` etc. are rejections.
pub fn is_pass(filter: &str) -> bool {
    PASS_VALUES.contains(&filter)
}

/// Keep only records whose FILTER is `PASS` or `.`, in their original order.
pub fn filter_pass(table: VariantTable) -> VariantTable {
    let before = table.len();
    let filtered = table.retain(|r| is_pass(&r.filter));
    debug!(
        "filter: kept {} of {} records ({} rejected)",
        filtered.len(),
        before,
        before - filtered.len()
    );
    if filtered.is_empty() && before > 0 {
        warn!("filter: no passing records among {} input records", before);
    }
    filtered
}
