pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// Upper bound for the `months` parameter of the status timeline
pub const MAX_TIMELINE_MONTHS: u32 = 24;

pub const MAX_CATEGORY_CODE_LENGTH: usize = 10;
