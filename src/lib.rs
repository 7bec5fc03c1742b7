pub mod analysis;
pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod run;
pub mod table;

pub use config::ScrapeConfig;
pub use error::ScrapeError;
pub use run::{run, RunReport};
pub use table::{extract, normalize, Dataset, FieldSpec, RawTable, Record};
