use dioxus::prelude::*;
use types::{
    SessionInfo,
    application::{Application, ApplicationStatus},
    opportunity::{ImageUpload, Opportunity, OpportunityDraft},
    stats::DashboardStats,
    user::{User, UserDraft},
};

#[cfg(feature = "server")]
use server::{ApplicationApi, OpportunityApi, UserApi};

#[post("/api/session")]
pub async fn current_session() -> ServerFnResult<Option<SessionInfo>> {
    match server::require_session().await {
        Ok(session) => Ok(Some(session.info())),
        Err(_) => Ok(None),
    }
}

#[post("/api/dashboard")]
pub async fn dashboard() -> ServerFnResult<DashboardStats> {
    let session = server::require_session().await?;
    let today = jiff::Zoned::now().date();
    Ok(server::dashboard(server::volunteer_api()?, &session, today).await?)
}

#[post("/api/users")]
pub async fn list_users() -> ServerFnResult<Vec<User>> {
    let session = server::require_session().await?;
    Ok(server::volunteer_api()?.list_users(&session).await?)
}

#[post("/api/users/register")]
pub async fn register_user(draft: UserDraft) -> ServerFnResult<()> {
    let session = server::require_session().await?;
    server::volunteer_api()?
        .register_user(&session, &draft)
        .await?;
    Ok(())
}

#[post("/api/users/update")]
pub async fn update_user(id: String, draft: UserDraft) -> ServerFnResult<()> {
    let session = server::require_session().await?;
    server::volunteer_api()?
        .update_user(&session, &id, &draft)
        .await?;
    Ok(())
}

#[post("/api/users/delete")]
pub async fn delete_user(id: String) -> ServerFnResult<()> {
    let session = server::require_session().await?;
    server::volunteer_api()?.delete_user(&session, &id).await?;
    Ok(())
}

#[post("/api/opportunities")]
pub async fn list_opportunities() -> ServerFnResult<Vec<Opportunity>> {
    let session = server::require_session().await?;
    Ok(server::volunteer_api()?.list_opportunities(&session).await?)
}

#[post("/api/opportunities/create")]
pub async fn create_opportunity(
    draft: OpportunityDraft,
    image: Option<ImageUpload>,
) -> ServerFnResult<Opportunity> {
    let session = server::require_session().await?;
    Ok(server::volunteer_api()?
        .create_opportunity(&session, &draft, image.as_ref())
        .await?)
}

#[post("/api/opportunities/update")]
pub async fn update_opportunity(
    id: String,
    draft: OpportunityDraft,
    image: Option<ImageUpload>,
) -> ServerFnResult<Opportunity> {
    let session = server::require_session().await?;
    Ok(server::volunteer_api()?
        .update_opportunity(&session, &id, &draft, image.as_ref())
        .await?)
}

#[post("/api/opportunities/delete")]
pub async fn delete_opportunity(id: String) -> ServerFnResult<()> {
    let session = server::require_session().await?;
    server::volunteer_api()?
        .delete_opportunity(&session, &id)
        .await?;
    Ok(())
}

#[post("/api/opportunities/cancel")]
pub async fn cancel_opportunity(id: String) -> ServerFnResult<()> {
    let session = server::require_session().await?;
    server::volunteer_api()?
        .cancel_opportunity(&session, &id)
        .await?;
    Ok(())
}

#[post("/api/applications")]
pub async fn list_applications() -> ServerFnResult<Vec<Application>> {
    let session = server::require_session().await?;
    Ok(server::volunteer_api()?.list_applications(&session).await?)
}

#[post("/api/applications/status")]
pub async fn set_application_status(id: String, status: ApplicationStatus) -> ServerFnResult<()> {
    let session = server::require_session().await?;
    server::volunteer_api()?
        .set_application_status(&session, &id, status)
        .await?;
    Ok(())
}
