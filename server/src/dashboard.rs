use jiff::civil::Date;
use types::{AdminSession, Result, stats::DashboardStats};

use crate::{ApplicationApi, OpportunityApi, UserApi};

/// Fetch all three collections concurrently and aggregate them.
pub async fn dashboard<A>(api: &A, session: &AdminSession, today: Date) -> Result<DashboardStats>
where
    A: UserApi + OpportunityApi + ApplicationApi,
{
    let (users, opportunities, applications) = tokio::try_join!(
        api.list_users(session),
        api.list_opportunities(session),
        api.list_applications(session),
    )?;

    tracing::debug!(
        users = users.len(),
        opportunities = opportunities.len(),
        applications = applications.len(),
        "computing dashboard"
    );

    Ok(DashboardStats::compute(
        &users,
        &opportunities,
        &applications,
        today,
    ))
}
