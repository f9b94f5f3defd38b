mod common;

use axum::extract::State;
use common::setup_state;
use storefront_api::routes::health::health_check;

#[tokio::test]
async fn health_check_reports_database_status() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let response = health_check(State(state)).await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
    assert_eq!(data.database, "ok");
    Ok(())
}
