use super::*;

#[tokio::test]
async fn fake_client_records_calls() {
    let client = FakeGameApiClient::new();
    let ctx = Ctx::root();
    client.get_ship(&ctx, "BUYER-1").await.unwrap();
    client.navigate_ship(&ctx, "BUYER-1", "X1-WAYPOINT").await.unwrap();
    assert_eq!(client.calls(), vec!["get_ship:BUYER-1", "navigate_ship:BUYER-1:X1-WAYPOINT"]);
}

#[tokio::test]
async fn reqwest_client_requires_player_token_on_context() {
    let client = ReqwestGameApiClient::new("http://127.0.0.1:1");
    let ctx = Ctx::root();
    let err = client.get_ship(&ctx, "BUYER-1").await.unwrap_err();
    assert!(matches!(err, ApiError::MissingToken));
}
