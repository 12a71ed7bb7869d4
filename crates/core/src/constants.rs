/// Decimal scale used for stored and displayed money amounts
pub const MONEY_SCALE: u32 = 2;

/// Upper bound accepted for a configured money scale
pub const MAX_MONEY_SCALE: u32 = 10;

/// Divisor for percentage fields expressed as whole percents (5 = 5%)
pub const PERCENT_BASE: u32 = 100;

/// Timezone used to bucket instants into scope dates when none is configured
pub const DEFAULT_TIMEZONE: &str = "UTC";
