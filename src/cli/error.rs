use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error("Failed to connect to API server")]
    #[diagnostic(
        code(docsnap::cli::connection_failed),
        help(
            "Is the API server running? Try: docsnap-api --port 3000\nOr set DOCSNAP_API_URL environment variable to point to the correct server."
        )
    )]
    ConnectionFailed {
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid response from API server: {message}")]
    #[diagnostic(
        code(docsnap::cli::invalid_response),
        help(
            "The server returned data in an unexpected format. This might indicate a version mismatch."
        )
    )]
    InvalidResponse { message: String },

    #[error("API error ({status}): {message}")]
    #[diagnostic(code(docsnap::cli::api_error))]
    ApiError { status: u16, message: String },

    #[error("Unauthorized: the API server rejected the token")]
    #[diagnostic(
        code(docsnap::cli::unauthorized),
        help("Pass --token or set DOCSNAP_API_TOKEN to the server's token.")
    )]
    Unauthorized,
}

impl From<reqwest::Error> for CliError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            CliError::ConnectionFailed { source: e }
        } else {
            CliError::InvalidResponse {
                message: e.to_string(),
            }
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
