//! Spreadsheet normalization: container decoding, header resolution, and
//! row extraction into canonical records

pub mod headers;
pub mod normalize;
pub mod reader;
pub mod strategy;
pub mod writer;

pub use headers::{Field, HeaderMap, locate_header_row, resolve_sheet_headers};
pub use normalize::{NormalizeOptions, NormalizedFile, normalize};
pub use reader::{is_supported_source, open_source_workbook};
pub use strategy::{SheetStrategy, select_strategy};
pub use writer::write_review_excel;
