use thiserror::Error;

#[derive(Error, Debug)]
pub enum DaybookError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not read workbook: {0}")]
    Calamine(#[from] calamine::Error),

    #[error("Not a valid xlsx archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Malformed workbook XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Could not write workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("No header row with a 'Particulars' column was found")]
    MissingHeader,

    #[error("Required column missing from header row: {0}")]
    MissingColumn(String),

    #[error("Reduction percentage must be between 0 and 100, got {0}")]
    InvalidReduction(u32),

    #[error("Home state code must be two digits, got '{0}'")]
    InvalidHomeState(String),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, DaybookError>;
