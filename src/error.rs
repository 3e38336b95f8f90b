//! Gateway-level error types shared across flows, transports, and stores.

// self
use crate::{_prelude::*, auth::CredentialError, http::ApiResponse};

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Login endpoint issued a credential that cannot be used.
	#[error("Login endpoint issued an unusable credential.")]
	Credential(#[from] CredentialError),

	/// API rejected a request that already went through a refresh-and-retry cycle.
	#[error("API rejected the retried request with status {}.", .response.status)]
	Unauthorized {
		/// The rejected (401) response.
		response: Box<ApiResponse>,
	},
	/// Refresh failed after a 401; the session must be re-established through the login entry
	/// point.
	#[error("Session expired; sign in again at `{login_path}`.")]
	SessionExpired {
		/// The original 401 response.
		response: Box<ApiResponse>,
		/// Login entry point the session was reset to.
		login_path: String,
		/// Why the refresh call failed.
		#[source]
		source: RefreshError,
	},
	/// Non-success status surfaced by [`ApiResponse::error_for_status`].
	#[error("API responded with status {}.", .response.status)]
	Status {
		/// The non-success response.
		response: Box<ApiResponse>,
	},
}
impl Error {
	/// Returns the HTTP response attached to the error, if any.
	pub fn response(&self) -> Option<&ApiResponse> {
		match self {
			Self::Unauthorized { response }
			| Self::SessionExpired { response, .. }
			| Self::Status { response } => Some(response),
			_ => None,
		}
	}
}

/// Configuration and validation failures raised by the gateway.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] ::http::Error),
	/// A request path cannot be joined onto the API base.
	#[error("Request path `{path}` cannot be resolved against the API base.")]
	InvalidPath {
		/// Offending request path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Bearer credential contains bytes that are not valid in a header value.
	#[error("Credential cannot be encoded as an Authorization header.")]
	InvalidCredentialHeader(#[from] ::http::header::InvalidHeaderValue),
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	BodySerialize(#[source] serde_json::Error),
	/// Gateway configuration failed validation.
	#[error(transparent)]
	Gateway(#[from] crate::config::GatewayConfigError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Response body failed to decode into the requested type.
#[derive(Debug, ThisError)]
#[error("Response body (status {status}) is not valid JSON for the requested type.")]
pub struct DecodeError {
	/// HTTP status of the response that failed to decode.
	pub status: u16,
	/// Structured parsing failure, including the JSON path.
	#[source]
	pub source: serde_path_to_error::Error<serde_json::Error>,
}

/// Reasons a credential refresh can fail.
#[derive(Debug, ThisError)]
pub enum RefreshError {
	/// Refresh endpoint answered with a non-success status.
	#[error("Refresh endpoint rejected the session with status {status}.")]
	Rejected {
		/// HTTP status returned by the refresh endpoint.
		status: u16,
	},
	/// Refresh endpoint response did not carry a usable credential.
	#[error("Refresh endpoint returned a malformed credential payload.")]
	Decode(#[from] DecodeError),
	/// Refresh endpoint issued an empty or non header-safe credential.
	#[error("Refresh endpoint issued an unusable credential.")]
	Credential(#[from] CredentialError),
	/// Refresh call never reached the endpoint.
	#[error("Refresh call failed in transport.")]
	Transport(#[from] TransportError),
	/// The refreshed credential could not be persisted.
	#[error("Refreshed credential could not be persisted.")]
	Storage(#[from] crate::store::StoreError),
	/// The refresh request could not be built.
	#[error("Refresh request could not be built.")]
	Config(#[from] ConfigError),
}
