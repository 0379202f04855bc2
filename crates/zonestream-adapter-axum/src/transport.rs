use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use url::Url;

use zonestream_core::delivery::{AdTransport, TransportError, TransportResponse};

/// Plain-HTTP [`AdTransport`] over the hyper legacy client.
///
/// TLS is terminated in front of the delivery endpoint in deployments that
/// need it; an `https` URL fails at the connector and surfaces as an
/// isolated per-zone failure like any other transport error.
pub struct HyperTransport {
    client: Client<HttpConnector, Empty<Bytes>>,
}

impl HyperTransport {
    pub fn new() -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
        }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AdTransport for HyperTransport {
    async fn get(
        &self,
        url: &Url,
        headers: &[(String, String)],
    ) -> Result<TransportResponse, TransportError> {
        let uri: hyper::Uri = url
            .as_str()
            .parse()
            .map_err(|e: hyper::http::uri::InvalidUri| TransportError::Request(e.to_string()))?;
        let mut builder = hyper::Request::builder().method(hyper::Method::GET).uri(uri);
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let request = builder
            .body(Empty::<Bytes>::new())
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        let status = response.status().as_u16();
        let collected = response
            .into_body()
            .collect()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;
        let body = String::from_utf8_lossy(&collected.to_bytes()).into_owned();
        Ok(TransportResponse { status, body })
    }
}
