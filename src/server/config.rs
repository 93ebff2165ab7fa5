use super::RequestsLoggingLevel;

/// Runtime configuration for the HTTP server.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    pub port: u16,
    pub requests_logging_level: RequestsLoggingLevel,
    /// Directory to serve the static web client from, if any.
    pub frontend_dir_path: Option<String>,
}
