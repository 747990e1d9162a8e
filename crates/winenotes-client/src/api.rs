//! Access to the remote wine collection.
//!
//! [`WineApi`] is the seam between the controller and the network: the
//! four collection operations plus photo upload. [`HttpApi`] is the real
//! implementation over `reqwest`. Any non-2xx status or transport failure
//! is an error; error bodies are not interpreted.

use std::future::Future;

use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use winenotes_shared::constants::{UPLOAD_FIELD, UPLOAD_PATH, WINES_PATH};
use winenotes_shared::{Photo, WineDraft, WineEntry, WineId};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::state::PendingPhoto;

pub trait WineApi {
    /// Base location photo paths are resolved against.
    fn base_url(&self) -> &str;

    fn list(&self) -> impl Future<Output = Result<Vec<WineEntry>, ClientError>> + Send;

    fn create(&self, draft: &WineDraft) -> impl Future<Output = Result<(), ClientError>> + Send;

    fn update(
        &self,
        id: &WineId,
        draft: &WineDraft,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    fn delete(&self, id: &WineId) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Upload one photo and return the reference to store on the entry.
    fn upload_photo(
        &self,
        photo: &PendingPhoto,
    ) -> impl Future<Output = Result<Photo, ClientError>> + Send;
}

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
}

#[derive(Debug, Clone)]
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.api_url.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn wine_url(&self, id: &WineId) -> String {
        self.url(&format!("{WINES_PATH}/{id}"))
    }
}

fn check(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(ClientError::Status(status.as_u16()))
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

impl WineApi for HttpApi {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn list(&self) -> Result<Vec<WineEntry>, ClientError> {
        let resp = check(self.http.get(self.url(WINES_PATH)).send().await?)?;
        let wines: Vec<WineEntry> = decode(resp).await?;
        debug!(count = wines.len(), "Fetched wines");
        Ok(wines)
    }

    async fn create(&self, draft: &WineDraft) -> Result<(), ClientError> {
        check(self.http.post(self.url(WINES_PATH)).json(draft).send().await?)?;
        Ok(())
    }

    async fn update(&self, id: &WineId, draft: &WineDraft) -> Result<(), ClientError> {
        check(self.http.put(self.wine_url(id)).json(draft).send().await?)?;
        Ok(())
    }

    async fn delete(&self, id: &WineId) -> Result<(), ClientError> {
        check(self.http.delete(self.wine_url(id)).send().await?)?;
        Ok(())
    }

    async fn upload_photo(&self, photo: &PendingPhoto) -> Result<Photo, ClientError> {
        let part = Part::bytes(photo.bytes.clone())
            .file_name(photo.file_name.clone())
            .mime_str(&photo.mime)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let resp = check(
            self.http
                .post(self.url(UPLOAD_PATH))
                .multipart(form)
                .send()
                .await?,
        )?;
        let body: UploadResponse = decode(resp).await?;

        debug!(file = %photo.file_name, url = %body.url, "Uploaded photo");
        Ok(Photo::from(body.url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let api = HttpApi::new("http://localhost:8000/");
        assert_eq!(api.base_url(), "http://localhost:8000");
        assert_eq!(api.url(WINES_PATH), "http://localhost:8000/api/wines");
        assert_eq!(
            api.wine_url(&WineId::new("abc")),
            "http://localhost:8000/api/wines/abc"
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = HttpApi::new(format!("http://{addr}"));
        assert!(matches!(api.list().await, Err(ClientError::Network(_))));
    }
}
