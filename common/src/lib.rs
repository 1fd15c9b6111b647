//! Barrett Common Library
//!
//! 結果ページからのRefraction抽出と、CLIで共有される患者データ型

pub mod error;
pub mod numeric;
pub mod table;
pub mod fallback;
pub mod extractor;
pub mod patient;
pub mod outcome;

pub use error::{Error, Result};
pub use table::{ExtractionKey, ResultRow, TableLayout, POWER_TOLERANCE};
pub use fallback::{default_strategies, FallbackStrategy, HighlightedRow, MarkupPattern};
pub use extractor::{ExtractionResult, ExtractionSource, RefractionExtractor, ResultPage};
pub use patient::{CellValue, Column, ColumnMap, PatientRecord};
pub use outcome::RowOutcome;
