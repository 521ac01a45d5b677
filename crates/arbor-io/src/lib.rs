//! CSV reading, schema sidecars, and model/report writing for arbor.

mod domain;
mod error;
mod reader;
mod schema;
mod writer;

pub use domain::{Dataset, ExperimentName};
pub use error::IoError;
pub use reader::InstanceReader;
pub use schema::{Column, ColumnKind, Schema};
pub use writer::ResultWriter;
