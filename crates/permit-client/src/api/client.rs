use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use permit_form::{InlinePart, StagedAsset};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::dto::{
    LoginRequest, MessageResponse, ResendOtpRequest, UploadResponse, VerifyOtpRequest,
    VerifyOtpResponse,
};
use super::{AssetUploader, Encoding, Method, SubmissionRequest, SubmissionTransport};
use crate::auth::{AuthContext, LoginResponse};
use crate::config::ClientConfig;
use crate::error::{ClientError, GENERIC_MESSAGE, server_message};
use crate::result::{CartPrediction, SubmissionResult};

pub const LOGIN_PATH: &str = "/api/users/auth/login";
pub const REGISTER_PATH: &str = "/api/users/register";
pub const VERIFY_OTP_PATH: &str = "/api/users/verify-otp";
pub const RESEND_OTP_PATH: &str = "/api/users/resend-otp";
pub const UPLOAD_IMAGE_PATH: &str = "/api/upload/image";
pub const DOCUMENT_UPLOAD_PATH: &str = "/api/users/document-submissions/upload";
pub const DOCUMENT_LIST_PATH: &str = "/api/users/document-submissions";
pub const VENDOR_APPLY_PATH: &str = "/api/vendor/apply";
pub const VENDOR_APPLICATION_PATH: &str = "/api/vendor/application";
pub const CART_PREDICT_PATH: &str = "/api/vendor/carts/predict";

/// Async HTTP client for the permit backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    auth: Arc<AuthContext>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, auth: Arc<AuthContext>) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| ClientError::Network(err.to_string()))?;
        Ok(Self::with_http(http, config.base_url.as_str(), auth))
    }

    pub fn with_http(http: Client, base_url: &str, auth: Arc<AuthContext>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    pub fn auth(&self) -> &Arc<AuthContext> {
        &self.auth
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Signs in and stores the resulting session.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let request = self
            .http
            .post(self.url(LOGIN_PATH))
            .json(&LoginRequest { email, password });
        let response: LoginResponse = self.execute_as(request, false).await?;
        self.auth.login(response.clone())?;
        Ok(response)
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        self.auth.logout()
    }

    pub async fn verify_otp(
        &self,
        email: &str,
        otp_code: &str,
    ) -> Result<VerifyOtpResponse, ClientError> {
        let request = self
            .http
            .post(self.url(VERIFY_OTP_PATH))
            .json(&VerifyOtpRequest { email, otp_code });
        self.execute_as(request, false).await
    }

    pub async fn resend_otp(&self, email: &str) -> Result<MessageResponse, ClientError> {
        let request = self
            .http
            .post(self.url(RESEND_OTP_PATH))
            .json(&ResendOtpRequest { email });
        self.execute_as(request, false).await
    }

    pub async fn upload_image(&self, asset: &StagedAsset) -> Result<String, ClientError> {
        let form = Form::new().part("file", file_part(asset).await?);
        let request = self.http.post(self.url(UPLOAD_IMAGE_PATH)).multipart(form);
        debug!(file = %asset.display_name, "uploading image");
        let response: UploadResponse = self.execute_as(request, true).await?;
        info!(file = %asset.display_name, "image uploaded");
        Ok(response.url)
    }

    pub async fn predict_cart(&self, asset: &StagedAsset) -> Result<CartPrediction, ClientError> {
        let form = Form::new().part("file", file_part(asset).await?);
        let request = self.http.post(self.url(CART_PREDICT_PATH)).multipart(form);
        self.execute_as(request, false).await
    }

    pub async fn fetch_submissions(&self) -> Result<Vec<SubmissionResult>, ClientError> {
        let request = self.http.get(self.url(DOCUMENT_LIST_PATH));
        let body = self.execute(request, true).await?;
        Ok(SubmissionResult::list_from_response(&body))
    }

    async fn execute_as<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        authenticated: bool,
    ) -> Result<T, ClientError> {
        let body = self.execute(request, authenticated).await?;
        serde_json::from_value(body).map_err(|err| ClientError::Decode(err.to_string()))
    }

    /// Sends a request and decodes the 2xx body. Failure bodies and
    /// `{"success": false}` envelopes become typed errors.
    async fn execute(
        &self,
        mut request: RequestBuilder,
        authenticated: bool,
    ) -> Result<Value, ClientError> {
        if authenticated {
            request = request.header(reqwest::header::AUTHORIZATION, self.auth.authorization()?);
        }
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(status = status.as_u16(), "response received");

        if !status.is_success() {
            return Err(ClientError::from_status(status.as_u16(), &text));
        }
        let body: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|err| ClientError::Decode(err.to_string()))?
        };
        if body.get("success").and_then(Value::as_bool) == Some(false) {
            return Err(ClientError::Server {
                status: status.as_u16(),
                message: server_message(&body).unwrap_or_else(|| GENERIC_MESSAGE.to_string()),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl AssetUploader for ApiClient {
    async fn upload(&self, asset: &StagedAsset) -> Result<String, ClientError> {
        self.upload_image(asset).await
    }
}

#[async_trait]
impl SubmissionTransport for ApiClient {
    async fn send(&self, request: SubmissionRequest) -> Result<Value, ClientError> {
        let url = self.url(&request.path);
        let builder = match request.method {
            Method::Post => self.http.post(url),
            Method::Put => self.http.put(url),
        };
        let builder = match request.encoding {
            Encoding::Json => builder.json(&request.body),
            Encoding::Multipart => builder.multipart(multipart_form(&request.body, &request.files).await?),
        };
        info!(path = %request.path, method = ?request.method, "sending submission");
        self.execute(builder, request.authenticated).await
    }
}

async fn multipart_form(
    body: &Map<String, Value>,
    files: &[InlinePart],
) -> Result<Form, ClientError> {
    let mut form = Form::new();
    for (key, value) in body {
        let text = match value {
            Value::Null => continue,
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        form = form.text(key.clone(), text);
    }
    for file in files {
        form = form.part(file.name.clone(), file_part(&file.asset).await?);
    }
    Ok(form)
}

async fn file_part(asset: &StagedAsset) -> Result<Part, ClientError> {
    let path = asset
        .local_ref
        .strip_prefix("file://")
        .unwrap_or(&asset.local_ref);
    let bytes = tokio::fs::read(Path::new(path))
        .await
        .map_err(|err| ClientError::Asset {
            name: asset.display_name.clone(),
            reason: err.to_string(),
        })?;
    Part::bytes(bytes)
        .file_name(asset.display_name.clone())
        .mime_str(&asset.mime_type)
        .map_err(|err| ClientError::Asset {
            name: asset.display_name.clone(),
            reason: err.to_string(),
        })
}
