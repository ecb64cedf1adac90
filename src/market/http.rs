//! [`MarketIndex`] over HTTP.
//!
//! | call              | request                                   |
//! |-------------------|-------------------------------------------|
//! | `list_to_sell`    | `POST {base}/listToSell`, urlencoded form |
//! | `del_from_market` | `GET {base}/delFromMk/{fingerprint}`      |
//! | `tx_from_market`  | `GET {base}/getTxFromMk/{fingerprint}`    |
//!
//! Any non-2xx answer is an [`IndexError::Status`].

use crate::market::{IndexError, MarketIndex};
use crate::types::hash::TxHash;
use crate::types::wrapper_types::BoxFuture;
use reqwest::{Client, Response};
use std::time::Duration;

/// Production index.
pub const DEFAULT_BASE_URL: &str = "https://nftio.io";

/// Overrides [`DEFAULT_BASE_URL`].
pub const BASE_URL_ENV: &str = "AFTERMARKET_INDEX_URL";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpMarketIndex {
    base_url: String,
    http_client: Client,
}

impl HttpMarketIndex {
    pub fn new(base_url: impl Into<String>) -> Result<Self, IndexError> {
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| IndexError::Request(e.to_string()))?;
        Ok(Self::with_client(base_url, http_client))
    }

    /// Reuses an existing client.
    pub fn with_client(base_url: impl Into<String>, http_client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http_client,
        }
    }

    /// Base URL from [`BASE_URL_ENV`], falling back to [`DEFAULT_BASE_URL`].
    pub fn from_env() -> Result<Self, IndexError> {
        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn check(response: Response) -> Result<Response, IndexError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(IndexError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn get(&self, path: &str, fingerprint: &str) -> Result<Response, IndexError> {
        let url = format!("{}/{}/{}", self.base_url, path, fingerprint);
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| IndexError::Request(e.to_string()))?;
        Self::check(response).await
    }
}

impl MarketIndex for HttpMarketIndex {
    fn list_to_sell<'a>(
        &'a self,
        wallet_address: &'a str,
        fingerprint: &'a str,
        tx_hash: &'a TxHash,
        price_ada: u64,
    ) -> BoxFuture<'a, Result<(), IndexError>> {
        Box::pin(async move {
            let url = format!("{}/listToSell", self.base_url);
            let tx_hash = tx_hash.to_hex();
            let price = price_ada.to_string();
            let form = vec![
                ("wAddr", wallet_address),
                ("fingerprint", fingerprint),
                ("txHash", tx_hash.as_str()),
                ("price", price.as_str()),
            ];
            let response = self
                .http_client
                .post(&url)
                .form(&form)
                .send()
                .await
                .map_err(|e| IndexError::Request(e.to_string()))?;
            Self::check(response).await?;
            Ok(())
        })
    }

    fn del_from_market<'a>(&'a self, fingerprint: &'a str) -> BoxFuture<'a, Result<(), IndexError>> {
        Box::pin(async move {
            self.get("delFromMk", fingerprint).await?;
            Ok(())
        })
    }

    fn tx_from_market<'a>(
        &'a self,
        fingerprint: &'a str,
    ) -> BoxFuture<'a, Result<TxHash, IndexError>> {
        Box::pin(async move {
            let body = self
                .get("getTxFromMk", fingerprint)
                .await?
                .text()
                .await
                .map_err(|e| IndexError::Request(e.to_string()))?;
            let body = body.trim();
            body.parse()
                .map_err(|_| IndexError::InvalidTxHash(body.to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    const TX: &str = "e95a73a1e03afdf74b86d10e504b64285f7afdfab7f7021a41054ae4b377ca9f";

    /// Serves one HTTP request with a canned answer and returns the raw request.
    async fn respond_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request_complete(&request) {
                    break;
                }
            }
            let answer = format!(
                "HTTP/1.1 {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(answer.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        (base, handle)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(end) = text.find("\r\n\r\n") else {
            return false;
        };
        let length = text[..end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        request.len() >= end + 4 + length
    }

    #[tokio::test]
    async fn list_to_sell_posts_form() {
        let (base, server) = respond_once("200 OK", "ok").await;
        let index = HttpMarketIndex::new(base).unwrap();
        let tx_hash: TxHash = TX.parse().unwrap();

        index
            .list_to_sell("stake_test1abc", "asset1xyz", &tx_hash, 33)
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /listToSell "));
        assert!(request.contains("application/x-www-form-urlencoded"));
        assert!(request.ends_with(&format!(
            "wAddr=stake_test1abc&fingerprint=asset1xyz&txHash={}&price=33",
            TX
        )));
    }

    #[tokio::test]
    async fn tx_from_market_parses_body() {
        let body = "e95a73a1e03afdf74b86d10e504b64285f7afdfab7f7021a41054ae4b377ca9f\n";
        let (base, server) = respond_once("200 OK", body).await;
        let index = HttpMarketIndex::new(format!("{}/", base)).unwrap();

        let tx_hash = index.tx_from_market("asset1xyz").await.unwrap();
        assert_eq!(tx_hash.to_hex(), TX);

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /getTxFromMk/asset1xyz "));
    }

    #[tokio::test]
    async fn del_from_market_hits_path() {
        let (base, server) = respond_once("200 OK", "").await;
        let index = HttpMarketIndex::new(base).unwrap();

        index.del_from_market("asset1xyz").await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /delFromMk/asset1xyz "));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (base, server) = respond_once("404 Not Found", "no listing").await;
        let index = HttpMarketIndex::new(base).unwrap();

        let err = index.tx_from_market("asset1xyz").await.unwrap_err();
        assert_eq!(
            err,
            IndexError::Status {
                status: 404,
                body: "no listing".to_string(),
            }
        );
        server.await.unwrap();
    }

    #[tokio::test]
    async fn garbage_tx_hash_is_rejected() {
        let (base, server) = respond_once("200 OK", "not a hash").await;
        let index = HttpMarketIndex::new(base).unwrap();

        assert_eq!(
            index.tx_from_market("asset1xyz").await.unwrap_err(),
            IndexError::InvalidTxHash("not a hash".to_string())
        );
        server.await.unwrap();
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let index = HttpMarketIndex::with_client("https://nftio.io/", Client::new());
        assert_eq!(index.base_url(), DEFAULT_BASE_URL);
    }
}
