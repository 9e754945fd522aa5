#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningCode {
    FixSkipped,
    DetectionsDiscarded,
    NonWordDetections,
    NoDatedRows,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanWarning {
    pub code: WarningCode,
    pub message: String,
    pub row: Option<usize>,
    pub count: Option<usize>,
}

impl ScanWarning {
    #[must_use]
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            row: None,
            count: None,
        }
    }

    #[must_use]
    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}
