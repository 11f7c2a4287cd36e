use thiserror::Error;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid dose: {0}")]
    InvalidDose(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),

    #[error("Invalid medicine type: {0}")]
    InvalidMedicineType(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Price list error: {0}")]
    PriceList(String),

    #[error("Bill error: {0}")]
    Bill(String),
}

pub type BillingResult<T> = Result<T, BillingError>;
