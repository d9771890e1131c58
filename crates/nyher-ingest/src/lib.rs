//! Input side of package validation: the JSON package spec, the CSV files
//! bound to its resources, and discovery of those files on disk.

pub mod csv_table;
pub mod discovery;
pub mod error;
pub mod spec_loader;

pub use csv_table::{CsvOptions, CsvRecord, CsvTable, read_csv_table};
pub use discovery::{find_file, list_csv_files};
pub use error::{IngestError, Result};
pub use spec_loader::{load_spec, parse_spec};
