pub mod extract;
pub mod normalize;
pub mod parse;
pub mod raw_table;
pub mod types;

pub use extract::extract;
pub use normalize::normalize;
pub use parse::{parse_tables, select_table, TableSelector};
pub use raw_table::RawTable;
pub use types::{Dataset, FieldSpec, Record, BTC_ETF_FIELDS};
