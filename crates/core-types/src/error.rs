use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// One or more of the required message fields was absent or empty.
    /// The payload lists the offending field names in declaration order.
    #[error("All fields are required")]
    MissingFields(Vec<&'static str>),
}
