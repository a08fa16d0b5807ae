use domain::DomainError;
use domain::network::ReachabilityProbe;
use infrastructure::TcpReachabilityProbe;
use tokio::net::TcpListener;

#[tokio::test]
async fn test_probe_succeeds_against_listener() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let _ = listener.accept().await;
    });

    let result = TcpReachabilityProbe::new().probe("127.0.0.1", port).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_probe_fails_on_closed_port() {
    // Bind then drop to get a port nobody listens on
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };

    let result = TcpReachabilityProbe::new().probe("127.0.0.1", port).await;
    assert!(matches!(result, Err(DomainError::ProbeFailed(_))));
}
