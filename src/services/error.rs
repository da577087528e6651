//! Error handling utilities for route handlers
//!
//! Domain queries surface `sqlx::Error` and the pagination engine its own
//! caller-contract errors; handlers log them with a context string and
//! answer with a bare status code. A storage failure is always a hard 500,
//! never flattened into an empty page.

use axum::http::StatusCode;

use crate::pagination::PageError;

/// Extension trait for logging errors and converting to StatusCode
pub trait LogErr<T> {
    /// Log with context and answer INTERNAL_SERVER_ERROR
    fn log_500(self, context: &str) -> Result<T, StatusCode>;

    /// Log with context and answer the given status
    fn log_status(self, context: &str, status: StatusCode) -> Result<T, StatusCode>;
}

impl<T, E: std::fmt::Display> LogErr<T> for Result<T, E> {
    fn log_500(self, context: &str) -> Result<T, StatusCode> {
        self.log_status(context, StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn log_status(self, context: &str, status: StatusCode) -> Result<T, StatusCode> {
        self.map_err(|e| {
            eprintln!("{}: {}", context, e);
            status
        })
    }
}

/// Status mapping for the pagination entry point: caller mistakes are 400,
/// storage failures 500.
pub trait LogPageErr<T> {
    fn log_page_err(self, context: &str) -> Result<T, StatusCode>;
}

impl<T> LogPageErr<T> for Result<T, PageError> {
    fn log_page_err(self, context: &str) -> Result<T, StatusCode> {
        self.map_err(|e| {
            eprintln!("{}: {}", context, e);
            match e {
                PageError::EmptyKeyword => StatusCode::BAD_REQUEST,
                PageError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_keyword_is_a_caller_error() {
        let res: Result<(), PageError> = Err(PageError::EmptyKeyword);
        assert_eq!(res.log_page_err("ctx"), Err(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn storage_failure_is_a_server_error() {
        let res: Result<(), PageError> = Err(PageError::Db(sqlx::Error::PoolTimedOut));
        assert_eq!(
            res.log_page_err("ctx"),
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        );
    }
}
