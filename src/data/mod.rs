//! Data module - CSV loading, filtering and writing

mod loader;
mod processor;
mod table;
mod writer;

pub use loader::{DataLoader, LoaderError, SchemaError, DEFAULT_DELIMITER};
pub use processor::{DataProcessor, ProcessorError};
pub use table::{Cell, KeyTuple, Row, Table, TableError, BLANK_KEY};
pub use writer::{stat_column_names, SummaryWriter, WriteOptions, WriterError, DEFAULT_NULL_MARKER};
