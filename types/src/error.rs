use std::{backtrace::BacktraceStatus, fmt};

use dioxus::prelude::ServerFnError;
use serde_json::json;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error report paired with the HTTP status it should surface as.
///
/// Deliberately not a `std::error::Error`, so that any standard error can be
/// converted with `?`.
pub struct Error {
    status: u16,
    report: anyhow::Error,
}

impl Error {
    pub const INTERNAL: u16 = 500;

    pub fn new(status: u16, report: anyhow::Error) -> Self {
        Self { status, report }
    }

    pub fn unauthorized(message: impl fmt::Display) -> Self {
        Self::new(401, anyhow::anyhow!("{message}"))
    }

    pub fn bad_request(error: impl Into<anyhow::Error>) -> Self {
        Self::new(400, error.into())
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    pub fn chain(&self) -> Vec<String> {
        self.report.chain().map(ToString::to_string).collect()
    }

    fn backtrace(&self) -> Option<String> {
        let backtrace = self.report.backtrace();
        (backtrace.status() == BacktraceStatus::Captured).then(|| backtrace.to_string())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {:?}", self.status, self.report)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.report)
    }
}

impl<E> From<E> for Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::new(Self::INTERNAL, error.into())
    }
}

impl From<Error> for anyhow::Error {
    fn from(error: Error) -> Self {
        error.report
    }
}

impl From<Error> for ServerFnError {
    fn from(error: Error) -> Self {
        let details = json!({
            "chain": error.chain(),
            "backtrace": error.backtrace(),
        });

        ServerFnError::ServerError {
            message: error.report.to_string(),
            code: error.status,
            details: Some(details),
        }
    }
}

/// Builds an ad-hoc [`Error`] from a format string.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::Error::new(
            $crate::Error::INTERNAL,
            $crate::internal_anyhow_dont_use!($($arg)*),
        )
    };
}
