//! Storage for the .grd file format and CSV import/export

pub(crate) mod csv;
mod parser;
mod writer;

pub use csv::{parse_csv, parse_csv_content, write_csv};
pub use parser::{parse_grd, parse_grd_content};
pub use writer::{write_grd, write_grd_content};
