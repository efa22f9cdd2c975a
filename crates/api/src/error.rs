use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum SubtrackError {
    #[error("Internal error")]
    InternalError,
    #[error("Invalid data provided: Error message: `{0}`")]
    BadClientData(String),
    #[error("There was a conflict with the request. Error message: `{0}`")]
    Conflict(String),
    #[error("Not found. Error message: `{0}`")]
    NotFound(String),
}
