use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, COOKIE},
    Client, StatusCode,
};
use shared::{
    domain::InstanceIndex,
    protocol::{EvaluationSubmission, FeedbackSubmission, InstancesStatus, ModelOutputsResponse},
};
use tracing::debug;
use url::Url;

pub mod error;
pub mod loader;
pub mod locale;
pub mod navigator;
pub mod session;
pub mod settings;
pub mod submit;
pub mod view;

pub use error::ReviewError;
pub use locale::Locale;
pub use navigator::{NavigationIntent, NavigationTarget};
pub use session::{LoadReport, ReviewSession, SessionContext, SessionEvent, SessionOptions};
pub use settings::{load_settings, ClientSettings};
pub use view::{Notice, NoticeAnchor, NoticeKind, NoticeLevel, ResponseForm, ReviewView};

/// Server endpoints the review page talks to.
///
/// Submit calls return the raw status so callers can tell a missing login
/// (401) apart from other rejections; transport failures are `Err`.
#[async_trait]
pub trait ReviewApi: Send + Sync {
    async fn model_outputs(&self, index: InstanceIndex) -> Result<ModelOutputsResponse>;
    async fn instances_status(&self) -> Result<InstancesStatus>;
    async fn submit_evaluation(&self, submission: &EvaluationSubmission) -> Result<StatusCode>;
    async fn submit_feedback(&self, submission: &FeedbackSubmission) -> Result<StatusCode>;
}

pub struct HttpReviewApi {
    http: Client,
    base_url: Url,
}

impl HttpReviewApi {
    pub fn new(server_url: &str) -> Result<Self> {
        Self::with_session_cookie(server_url, None)
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        Self::with_session_cookie(&settings.server_url, settings.session_cookie.as_deref())
    }

    pub fn with_session_cookie(server_url: &str, session_cookie: Option<&str>) -> Result<Self> {
        let mut base_url =
            Url::parse(server_url).with_context(|| format!("invalid server url '{server_url}'"))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        if let Some(cookie) = session_cookie {
            headers.insert(
                COOKIE,
                HeaderValue::from_str(cookie).context("session cookie is not a valid header value")?,
            );
        }
        let http = Client::builder()
            .default_headers(headers)
            .build()
            .context("failed to build http client")?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("failed to build endpoint url for '{path}'"))
    }

    /// Requests a navigation target with the session's credentials, e.g. to
    /// end the login session via `/logout`.
    pub async fn follow(&self, target: &NavigationTarget) -> Result<StatusCode> {
        let url = target.url(&self.base_url)?;
        debug!(%url, "review: following navigation target");
        let response = self.http.get(url).send().await?;
        Ok(response.status())
    }
}

#[async_trait]
impl ReviewApi for HttpReviewApi {
    async fn model_outputs(&self, index: InstanceIndex) -> Result<ModelOutputsResponse> {
        let url = self.endpoint(&format!("api/model-outputs/{}", index.0))?;
        let body = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("malformed model outputs for instance {index}"))?;
        Ok(body)
    }

    async fn instances_status(&self) -> Result<InstancesStatus> {
        let url = self.endpoint("api/instances-status")?;
        let body = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("malformed instances status")?;
        Ok(body)
    }

    async fn submit_evaluation(&self, submission: &EvaluationSubmission) -> Result<StatusCode> {
        let url = self.endpoint("api/submit-evaluation")?;
        let response = self.http.post(url).json(submission).send().await?;
        Ok(response.status())
    }

    async fn submit_feedback(&self, submission: &FeedbackSubmission) -> Result<StatusCode> {
        let url = self.endpoint("api/submit-feedback")?;
        let response = self.http.post(url).json(submission).send().await?;
        Ok(response.status())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod session_tests;
