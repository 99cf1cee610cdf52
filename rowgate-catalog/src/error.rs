use rowgate_data::{DataError, ErrorKind};

#[derive(Debug)]
pub enum CatalogError {
    /// A draft failed its field rules before any store work.
    Validation(garde::Report),
    Data(DataError),
}

impl CatalogError {
    /// `true` when the caller's input, not the store, caused the failure.
    pub fn is_client_error(&self) -> bool {
        match self {
            CatalogError::Validation(_) => true,
            CatalogError::Data(err) => err.kind().is_client_error(),
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            CatalogError::Validation(_) => None,
            CatalogError::Data(err) => Some(err.kind()),
        }
    }
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Validation(report) => write!(f, "Validation failed: {report}"),
            CatalogError::Data(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Validation(_) => None,
            CatalogError::Data(err) => Some(err),
        }
    }
}

impl From<garde::Report> for CatalogError {
    fn from(report: garde::Report) -> Self {
        CatalogError::Validation(report)
    }
}

impl From<DataError> for CatalogError {
    fn from(err: DataError) -> Self {
        CatalogError::Data(err)
    }
}
