//! Gateway configuration: API base, auxiliary endpoints, and refresh policy.
//!
//! A [`GatewayConfig`] is always produced through [`GatewayConfigBuilder::build`], including when
//! deserialized, so every value the gateway sees has passed validation.

// self
use crate::{_prelude::*, auth::CredentialKey, error::ConfigError};

/// How concurrent requests that hit a 401 share refresh work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
	/// Every failing request issues its own refresh call; the last write wins.
	#[default]
	Independent,
	/// Refreshes are serialized and a waiter reuses a credential another task already rotated.
	Coalesced,
}

/// Errors raised while validating a gateway configuration.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum GatewayConfigError {
	/// The API base must be an HTTP(S) URL.
	#[error("The API base must use http or https: {url}.")]
	UnsupportedScheme {
		/// Rejected URL.
		url: String,
	},
	/// The API base cannot carry relative paths (e.g. `mailto:`).
	#[error("The API base cannot be used as a base URL: {url}.")]
	CannotBeABase {
		/// Rejected URL.
		url: String,
	},
	/// An endpoint path was blank.
	#[error("The {endpoint} endpoint path cannot be empty.")]
	EmptyEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
	},
	/// The login entry point must be an absolute route.
	#[error("The login entry point must start with `/`: {path}.")]
	RelativeLoginRoute {
		/// Rejected route.
		path: String,
	},
}

/// Validated gateway configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GatewayConfigBuilder", into = "GatewayConfigBuilder")]
pub struct GatewayConfig {
	/// Origin and path prefix every application path is resolved against.
	pub api_base: Url,
	/// Unauthenticated endpoint that exchanges the session cookie for a new credential.
	pub refresh_endpoint: Url,
	/// Endpoint that exchanges username and password for a credential.
	pub login_endpoint: Url,
	/// Route the user is sent to when the session cannot be recovered.
	pub login_route: String,
	/// Storage slot holding the bearer credential.
	pub credential_key: CredentialKey,
	/// Concurrency policy for refresh calls.
	pub refresh_policy: RefreshPolicy,
}
impl GatewayConfig {
	/// Default API origin and prefix used by the pet-booking backend in development.
	pub const DEFAULT_API_BASE: &'static str = "http://127.0.0.1:8000/api";

	/// Creates a builder rooted at `api_base`.
	pub fn builder(api_base: Url) -> GatewayConfigBuilder {
		GatewayConfigBuilder::new(api_base)
	}

	/// Resolves an application path (`/orders`, `stores/7`) against the API base.
	///
	/// Absolute `http(s)` URLs are returned unchanged.
	pub fn resolve(&self, path: &str) -> Result<Url, ConfigError> {
		resolve_against(&self.api_base, path)
	}
}
impl TryFrom<GatewayConfigBuilder> for GatewayConfig {
	type Error = ConfigError;

	fn try_from(builder: GatewayConfigBuilder) -> Result<Self, Self::Error> {
		builder.build()
	}
}

/// Builder for [`GatewayConfig`] values.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfigBuilder {
	/// Origin and path prefix for application calls.
	pub api_base: Url,
	/// Refresh endpoint path, relative to the API base.
	#[serde(default = "GatewayConfigBuilder::default_refresh_path")]
	pub refresh_path: String,
	/// Login endpoint path, relative to the API base.
	#[serde(default = "GatewayConfigBuilder::default_login_path")]
	pub login_path: String,
	/// Route reported when the session is reset.
	#[serde(default = "GatewayConfigBuilder::default_login_route")]
	pub login_route: String,
	/// Storage slot for the credential.
	#[serde(default)]
	pub credential_key: CredentialKey,
	/// Refresh concurrency policy.
	#[serde(default)]
	pub refresh_policy: RefreshPolicy,
}
impl GatewayConfigBuilder {
	const DEFAULT_LOGIN_PATH: &'static str = "token";
	const DEFAULT_LOGIN_ROUTE: &'static str = "/login";
	const DEFAULT_REFRESH_PATH: &'static str = "token/refresh";

	/// Creates a builder seeded with the backend's default endpoint layout.
	pub fn new(api_base: Url) -> Self {
		Self {
			api_base,
			refresh_path: Self::default_refresh_path(),
			login_path: Self::default_login_path(),
			login_route: Self::default_login_route(),
			credential_key: CredentialKey::default(),
			refresh_policy: RefreshPolicy::default(),
		}
	}

	/// Overrides the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the login endpoint path.
	pub fn login_path(mut self, path: impl Into<String>) -> Self {
		self.login_path = path.into();

		self
	}

	/// Overrides the login entry point route.
	pub fn login_route(mut self, route: impl Into<String>) -> Self {
		self.login_route = route.into();

		self
	}

	/// Overrides the credential storage slot.
	pub fn credential_key(mut self, key: CredentialKey) -> Self {
		self.credential_key = key;

		self
	}

	/// Overrides the refresh concurrency policy.
	pub fn refresh_policy(mut self, policy: RefreshPolicy) -> Self {
		self.refresh_policy = policy;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<GatewayConfig, ConfigError> {
		let api_base = normalize_base(self.api_base)?;

		if self.refresh_path.trim().is_empty() {
			return Err(GatewayConfigError::EmptyEndpoint { endpoint: "refresh" }.into());
		}
		if self.login_path.trim().is_empty() {
			return Err(GatewayConfigError::EmptyEndpoint { endpoint: "login" }.into());
		}
		if !self.login_route.starts_with('/') {
			return Err(GatewayConfigError::RelativeLoginRoute { path: self.login_route }.into());
		}

		let refresh_endpoint = resolve_against(&api_base, &self.refresh_path)?;
		let login_endpoint = resolve_against(&api_base, &self.login_path)?;

		Ok(GatewayConfig {
			api_base,
			refresh_endpoint,
			login_endpoint,
			login_route: self.login_route,
			credential_key: self.credential_key,
			refresh_policy: self.refresh_policy,
		})
	}

	fn default_refresh_path() -> String {
		Self::DEFAULT_REFRESH_PATH.into()
	}

	fn default_login_path() -> String {
		Self::DEFAULT_LOGIN_PATH.into()
	}

	fn default_login_route() -> String {
		Self::DEFAULT_LOGIN_ROUTE.into()
	}
}
impl From<GatewayConfig> for GatewayConfigBuilder {
	fn from(config: GatewayConfig) -> Self {
		let refresh_path = relative_to(&config.api_base, &config.refresh_endpoint);
		let login_path = relative_to(&config.api_base, &config.login_endpoint);

		Self {
			api_base: config.api_base,
			refresh_path,
			login_path,
			login_route: config.login_route,
			credential_key: config.credential_key,
			refresh_policy: config.refresh_policy,
		}
	}
}

fn normalize_base(mut url: Url) -> Result<Url, GatewayConfigError> {
	if !matches!(url.scheme(), "http" | "https") {
		return Err(GatewayConfigError::UnsupportedScheme { url: url.to_string() });
	}
	if url.cannot_be_a_base() {
		return Err(GatewayConfigError::CannotBeABase { url: url.to_string() });
	}
	// `Url::join` drops the last segment unless the base ends with a slash.
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	url.set_query(None);
	url.set_fragment(None);

	Ok(url)
}

fn resolve_against(base: &Url, path: &str) -> Result<Url, ConfigError> {
	if path.starts_with("http://") || path.starts_with("https://") {
		return Url::parse(path)
			.map_err(|source| ConfigError::InvalidPath { path: path.to_owned(), source });
	}

	base.join(path.trim_start_matches('/'))
		.map_err(|source| ConfigError::InvalidPath { path: path.to_owned(), source })
}

fn relative_to(base: &Url, endpoint: &Url) -> String {
	base.make_relative(endpoint).unwrap_or_else(|| endpoint.to_string())
}
