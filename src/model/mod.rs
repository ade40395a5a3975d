//! Data model for imported rows

mod row_set;

pub use row_set::{Cell, Row, RowSet};
