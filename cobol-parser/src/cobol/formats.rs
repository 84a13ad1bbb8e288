//! Output formats for parse trees

pub mod treeviz;

pub use treeviz::{to_treeviz_str, to_treeviz_str_with_params};
