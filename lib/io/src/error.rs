use thiserror::Error;

pub type Result<T> = std::result::Result<T, IoError>;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("Failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Failed to write workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Sheet is empty: {0}")]
    EmptySheet(String),

    #[error("Header row {row} is outside the used rows of the sheet ({first}..={last})")]
    HeaderRowOutOfRange { row: usize, first: usize, last: usize },

    #[error(transparent)]
    Core(#[from] tasador_core::Error),
}
