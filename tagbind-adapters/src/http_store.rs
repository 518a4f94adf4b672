//! HTTPS client for a remote parameter store speaking the `GetParameters` JSON protocol.
//!
//! Requests are sent unsigned; point the endpoint at a signing proxy, a sidecar
//! or a local emulator that fronts the real store.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::try_join_all;
use hyper::body::to_bytes;
use hyper::client::HttpConnector;
use hyper::header::CONTENT_TYPE;
use hyper::{Body, Client, Request, Uri};
use hyper_rustls::HttpsConnector;
use rustls::{ClientConfig, OwnedTrustAnchor, RootCertStore};
use tokio::time::timeout;
use tracing::debug;
use webpki_roots::TLS_SERVER_ROOTS;

use crate::env::{EnvSource, ProcessEnv};
use crate::parameter_store::{GetParametersRequest, GetParametersResponse, ParameterStore};
use crate::traits::{ProviderError, ProviderResult};

/// Environment variable naming the default store endpoint.
pub const ENDPOINT_ENV: &str = "TAGBIND_PARAMETER_STORE_URL";

/// Largest number of names the store accepts in one `GetParameters` call.
pub const MAX_NAMES_PER_REQUEST: usize = 10;

const TARGET_HEADER: &str = "x-amz-target";
const GET_PARAMETERS_TARGET: &str = "AmazonSSM.GetParameters";
const JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

type HyperClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Configuration for [`HttpParameterStore`].
#[derive(Clone, Debug)]
pub struct HttpParameterStoreConfig {
    endpoint: Uri,
    timeout: Duration,
}

impl HttpParameterStoreConfig {
    /// Creates a configuration for the supplied endpoint with a 10 second timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Configuration`] if the endpoint is not an
    /// absolute `http` or `https` URL.
    pub fn new(endpoint: impl AsRef<str>) -> ProviderResult<Self> {
        Ok(Self {
            endpoint: parse_endpoint(endpoint.as_ref())?,
            timeout: Duration::from_secs(10),
        })
    }

    /// Reads the endpoint from [`ENDPOINT_ENV`] in the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Configuration`] if the variable is unset or invalid.
    pub fn from_env() -> ProviderResult<Self> {
        Self::from_env_source(&ProcessEnv)
    }

    /// Reads the endpoint from [`ENDPOINT_ENV`] in the supplied environment.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Configuration`] if the variable is unset or invalid.
    pub fn from_env_source(source: &impl EnvSource) -> ProviderResult<Self> {
        let endpoint = source
            .var(ENDPOINT_ENV)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ProviderError::configuration(format!("{ENDPOINT_ENV} is not set")))?;
        Self::new(endpoint)
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the configured endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &Uri {
        &self.endpoint
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// [`ParameterStore`] client issuing `GetParameters` calls over HTTP/HTTPS.
pub struct HttpParameterStore {
    client: HyperClient,
    endpoint: Uri,
    timeout: Duration,
}

impl fmt::Debug for HttpParameterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpParameterStore")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HttpParameterStore {
    /// Constructs a client from the supplied configuration.
    #[must_use]
    pub fn new(config: HttpParameterStoreConfig) -> Self {
        Self {
            client: build_https_client(),
            endpoint: config.endpoint,
            timeout: config.timeout,
        }
    }

    /// Constructs a client whose endpoint comes from [`ENDPOINT_ENV`].
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Configuration`] if the variable is unset or invalid.
    pub fn from_env() -> ProviderResult<Self> {
        HttpParameterStoreConfig::from_env().map(Self::new)
    }

    async fn send(&self, request: &GetParametersRequest) -> ProviderResult<GetParametersResponse> {
        let body = serde_json::to_vec(request).map_err(|err| {
            ProviderError::transport(format!("failed to encode GetParameters request: {err}"))
        })?;

        let req = Request::post(self.endpoint.clone())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(TARGET_HEADER, GET_PARAMETERS_TARGET)
            .body(Body::from(body))
            .map_err(|err| {
                ProviderError::transport(format!("failed to build GetParameters request: {err}"))
            })?;

        let response = timeout(self.timeout, self.client.request(req))
            .await
            .map_err(|_| ProviderError::transport("parameter store request timed out"))?
            .map_err(|err| {
                ProviderError::transport(format!("parameter store request failed: {err}"))
            })?;

        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.map_err(|err| {
            ProviderError::transport(format!("failed to read parameter store response: {err}"))
        })?;

        if !status.is_success() {
            let reason = String::from_utf8_lossy(&bytes);
            return Err(ProviderError::response(format!(
                "parameter store returned {status}: {reason}"
            )));
        }

        serde_json::from_slice(&bytes).map_err(|err| {
            ProviderError::response(format!("failed to decode GetParameters response: {err}"))
        })
    }
}

#[async_trait]
impl ParameterStore for HttpParameterStore {
    async fn get_parameters(
        &self,
        request: GetParametersRequest,
    ) -> ProviderResult<GetParametersResponse> {
        let batches = split_request(&request);
        debug!(
            names = request.names().len(),
            batches = batches.len(),
            endpoint = %self.endpoint,
            "sending GetParameters"
        );

        let responses = try_join_all(batches.iter().map(|batch| self.send(batch))).await?;
        Ok(responses
            .into_iter()
            .fold(GetParametersResponse::default(), |mut merged, response| {
                merged.merge(response);
                merged
            }))
    }
}

fn parse_endpoint(raw: &str) -> ProviderResult<Uri> {
    let uri = raw.parse::<Uri>().map_err(|err| {
        ProviderError::configuration(format!("invalid parameter store endpoint `{raw}`: {err}"))
    })?;
    match uri.scheme_str() {
        Some("http" | "https") if uri.host().is_some() => Ok(uri),
        _ => Err(ProviderError::configuration(format!(
            "parameter store endpoint `{raw}` must be an absolute http(s) URL"
        ))),
    }
}

/// Splits a request into chunks the store will accept.
fn split_request(request: &GetParametersRequest) -> Vec<GetParametersRequest> {
    request
        .names()
        .chunks(MAX_NAMES_PER_REQUEST)
        .map(|names| GetParametersRequest::new(names.to_vec(), request.with_decryption()))
        .collect()
}

fn build_https_client() -> HyperClient {
    let mut roots = RootCertStore::empty();
    roots.add_trust_anchors(TLS_SERVER_ROOTS.iter().map(|anchor| {
        OwnedTrustAnchor::from_subject_spki_name_constraints(
            anchor.subject,
            anchor.spki,
            anchor.name_constraints,
        )
    }));

    let tls = ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(roots)
        .with_no_client_auth();

    let mut http = HttpConnector::new();
    http.enforce_http(false);

    Client::builder().build::<_, Body>(HttpsConnector::from((http, Arc::new(tls))))
}
