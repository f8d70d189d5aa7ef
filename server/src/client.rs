use jiff::{SignedDuration, Timestamp};
use reqwest::{
    Client, Method, RequestBuilder, Response, Url,
    multipart::{Form, Part},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;
use types::{
    AdminIdentity, AdminSession, Error, Result,
    application::{Application, ApplicationStatus, StatusChange},
    opportunity::{ImageUpload, Opportunity, OpportunityDraft},
    user::{DraftMode, User, UserDraft},
};

trait ReqwestExt {
    async fn try_send<T: DeserializeOwned>(self) -> Result<T>;
    async fn try_execute(self) -> Result<()>;
}

impl ReqwestExt for RequestBuilder {
    async fn try_send<T: DeserializeOwned>(self) -> Result<T> {
        let response = send_checked(self).await?;
        let body = response.bytes().await?;

        match serde_json::from_slice(&body) {
            Ok(r) => Ok(r),
            Err(error) => {
                // NOTE: Bodies may contain personal data, so only their size is logged.
                tracing::debug!(?error, len = body.len(), "failed to parse response");
                Err(error.into())
            }
        }
    }

    async fn try_execute(self) -> Result<()> {
        send_checked(self).await.map(drop)
    }
}

/// Fields the volunteer API uses to explain a rejected request.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

async fn send_checked(request: RequestBuilder) -> Result<Response> {
    let response = request.send().await.map_err(|error| {
        tracing::warn!(%error, "volunteer API unreachable");
        let status = if error.is_timeout() { 504 } else { 502 };
        Error::from(error).with_status(status)
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().clone();
    let body = response.bytes().await.unwrap_or_default();
    let message = serde_json::from_slice::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    tracing::warn!(%status, path = url.path(), %message, "volunteer API rejected request");
    Err(types::err!("{message}").with_status(status.as_u16()))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequesterBody<'a> {
    requester_id: &'a str,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// What the volunteer API hands back for a successful admin login.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginGrant {
    pub token: SecretString,
    #[serde(alias = "user")]
    pub admin: AdminIdentity,
    /// Token lifetime in seconds, when the API reports one.
    #[serde(default)]
    pub expires_in: Option<i64>,
}

impl LoginGrant {
    pub fn expires_at(&self) -> Option<Timestamp> {
        let seconds = self.expires_in?;
        Timestamp::now()
            .checked_add(SignedDuration::from_secs(seconds))
            .ok()
    }
}

#[allow(async_fn_in_trait)]
pub trait UserApi {
    async fn list_users(&self, session: &AdminSession) -> Result<Vec<User>>;
    async fn register_user(&self, session: &AdminSession, draft: &UserDraft) -> Result<()>;
    async fn update_user(&self, session: &AdminSession, id: &str, draft: &UserDraft) -> Result<()>;
    async fn delete_user(&self, session: &AdminSession, id: &str) -> Result<()>;
}

#[allow(async_fn_in_trait)]
pub trait OpportunityApi {
    async fn list_opportunities(&self, session: &AdminSession) -> Result<Vec<Opportunity>>;
    async fn create_opportunity(
        &self,
        session: &AdminSession,
        draft: &OpportunityDraft,
        image: Option<&ImageUpload>,
    ) -> Result<Opportunity>;
    async fn update_opportunity(
        &self,
        session: &AdminSession,
        id: &str,
        draft: &OpportunityDraft,
        image: Option<&ImageUpload>,
    ) -> Result<Opportunity>;
    async fn delete_opportunity(&self, session: &AdminSession, id: &str) -> Result<()>;
    async fn cancel_opportunity(&self, session: &AdminSession, id: &str) -> Result<()>;
}

#[allow(async_fn_in_trait)]
pub trait ApplicationApi {
    async fn list_applications(&self, session: &AdminSession) -> Result<Vec<Application>>;
    async fn set_application_status(
        &self,
        session: &AdminSession,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<()>;
}

/// A record id as a single path segment.
///
/// `.` and `..` would be dropped from the path, so they are rejected with the
/// empty id.
fn record_id(id: &str) -> Result<&str> {
    match id {
        "" | "." | ".." => Err(types::err!("invalid record id {id:?}").with_status(400)),
        _ => Ok(id),
    }
}

/// Typed client for the volunteer platform's HTTP API.
#[derive(Clone)]
pub struct VolunteerClient {
    client: Client,
    base_url: Url,
}

impl VolunteerClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(types::err!("{base_url} cannot be used as an API base URL"));
        }

        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url,
        })
    }

    /// The base URL extended by `segments`, each percent-encoded as one segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| types::err!("{} cannot be used as an API base URL", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str], token: Option<&SecretString>) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;
        let request = self.client.request(method, url);

        Ok(match token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        })
    }

    fn authed(&self, method: Method, segments: &[&str], session: &AdminSession) -> Result<RequestBuilder> {
        self.request(method, segments, Some(&session.access_token))
    }

    pub async fn login(&self, email: &str, password: &SecretString) -> Result<LoginGrant> {
        self.request(Method::POST, &["api", "admin", "login"], None)?
            .json(&Credentials {
                email,
                password: password.expose_secret(),
            })
            .try_send()
            .await
    }

    fn opportunity_form(draft: &OpportunityDraft, image: Option<&ImageUpload>) -> Result<Form> {
        let mut form = Form::new();
        for (name, value) in draft.form_fields()? {
            form = form.text(name, value);
        }
        if let Some(image) = image {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.content_type)?;
            form = form.part("image", part);
        }
        Ok(form)
    }

    fn check_opportunity(draft: &OpportunityDraft, image: Option<&ImageUpload>) -> Result<()> {
        draft.validate().map_err(Error::bad_request)?;
        if let Some(image) = image {
            image.validate().map_err(Error::bad_request)?;
        }
        Ok(())
    }
}

impl UserApi for VolunteerClient {
    async fn list_users(&self, session: &AdminSession) -> Result<Vec<User>> {
        self.authed(Method::GET, &["api", "users", ""], session)?
            .try_send()
            .await
    }

    async fn register_user(&self, session: &AdminSession, draft: &UserDraft) -> Result<()> {
        draft.validate(DraftMode::Create).map_err(Error::bad_request)?;
        self.authed(Method::POST, &["api", "users", "register"], session)?
            .json(draft)
            .try_execute()
            .await
    }

    async fn update_user(&self, session: &AdminSession, id: &str, draft: &UserDraft) -> Result<()> {
        draft.validate(DraftMode::Edit).map_err(Error::bad_request)?;
        self.authed(Method::PUT, &["api", "users", record_id(id)?], session)?
            .json(draft)
            .try_execute()
            .await
    }

    async fn delete_user(&self, session: &AdminSession, id: &str) -> Result<()> {
        self.authed(Method::DELETE, &["api", "users", record_id(id)?], session)?
            .try_execute()
            .await
    }
}

impl OpportunityApi for VolunteerClient {
    async fn list_opportunities(&self, session: &AdminSession) -> Result<Vec<Opportunity>> {
        self.authed(Method::GET, &["api", "opportunities"], session)?
            .try_send()
            .await
    }

    async fn create_opportunity(
        &self,
        session: &AdminSession,
        draft: &OpportunityDraft,
        image: Option<&ImageUpload>,
    ) -> Result<Opportunity> {
        Self::check_opportunity(draft, image)?;
        self.authed(Method::POST, &["api", "opportunities"], session)?
            .multipart(Self::opportunity_form(draft, image)?)
            .try_send()
            .await
    }

    async fn update_opportunity(
        &self,
        session: &AdminSession,
        id: &str,
        draft: &OpportunityDraft,
        image: Option<&ImageUpload>,
    ) -> Result<Opportunity> {
        Self::check_opportunity(draft, image)?;
        let request = self.authed(Method::PUT, &["api", "opportunities", record_id(id)?], session)?;
        let request = match image {
            Some(_) => request.multipart(Self::opportunity_form(draft, image)?),
            None => request.json(draft),
        };
        request.try_send().await
    }

    async fn delete_opportunity(&self, session: &AdminSession, id: &str) -> Result<()> {
        self.authed(Method::DELETE, &["api", "admin", "opportunities", record_id(id)?], session)?
            .json(&RequesterBody {
                requester_id: session.requester_id(),
            })
            .try_execute()
            .await
    }

    async fn cancel_opportunity(&self, session: &AdminSession, id: &str) -> Result<()> {
        self.authed(Method::PUT, &["api", "admin", "opportunities", record_id(id)?, "cancel"], session)?
            .json(&RequesterBody {
                requester_id: session.requester_id(),
            })
            .try_execute()
            .await
    }
}

impl ApplicationApi for VolunteerClient {
    async fn list_applications(&self, session: &AdminSession) -> Result<Vec<Application>> {
        self.authed(Method::GET, &["api", "applications"], session)?
            .try_send()
            .await
    }

    async fn set_application_status(
        &self,
        session: &AdminSession,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<()> {
        self.authed(Method::PUT, &["api", "applications", record_id(id)?, "status"], session)?
            .json(&StatusChange { status })
            .try_execute()
            .await
    }
}
