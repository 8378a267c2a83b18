//! Merge the `ITEM_O` worksheet of many sales workbooks into one table,
//! tag rows with the date in their file name, and chart LINEA / GRUPO.

pub mod chart;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod process;
pub mod range;
pub mod run;

pub use config::Config;
pub use dataset::{Cell, CellValue, Dataset};
pub use error::{EtlError, FileError};
pub use range::ColumnRange;
