pub mod decimal_utils;
pub mod time_utils;

pub use decimal_utils::{non_negative, percent_of, round_money};
pub use time_utils::{
    local_date, parse_timezone, scope_window, sort_chronologically, Chronological, ScopeUnit,
    ScopeWindow,
};
