use snitch_common::PolicyEvent;
use snitch_policy::{serve_with_listener, start_server, PolicyDir, PolicyHandler, PolicyServer};
use snitch_proto::{Policy, PolicyServiceClient};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Handler that refuses every event
struct RejectAll;

impl PolicyHandler for RejectAll {
    fn update_container_policy(&self, _event: &PolicyEvent) -> bool {
        false
    }

    fn update_host_policy(&self, _event: &PolicyEvent) -> bool {
        false
    }
}

#[tokio::test]
async fn test_policy_service_over_grpc() {
    let _ = env_logger::builder().is_test(true).try_init();

    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("block-ptrace.yaml"), "").unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = PolicyServer::new(RejectAll, PolicyDir::new(dir.path()));
    let handle = tokio::spawn(serve_with_listener(server, listener));

    let mut client = PolicyServiceClient::connect(format!("http://{}", addr))
        .await
        .unwrap();

    let delete = br#"{"type":"DELETED","object":{"metadata":{"name":"block-ptrace"}}}"#.to_vec();
    let res = client
        .container_policy(Policy { policy: delete })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(res.status, 1);
    assert!(res.present);
    assert!(!res.applied);

    let add = br#"{"type":"ADDED","object":{"metadata":{"name":"block-ptrace"}}}"#.to_vec();
    let res = client
        .host_policy(Policy { policy: add })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(res.status, 0);

    let res = client
        .host_policy(Policy {
            policy: b"{broken".to_vec(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(res.status, 0);

    handle.abort();
}

#[tokio::test]
async fn test_start_server_on_ephemeral_port() {
    let dir = TempDir::new().unwrap();
    let server = PolicyServer::new(RejectAll, PolicyDir::new(dir.path()));

    let (addr, handle) = start_server(server, "127.0.0.1:0".parse().unwrap())
        .await
        .unwrap();
    assert_ne!(addr.port(), 0);

    let mut client = PolicyServiceClient::connect(format!("http://{}", addr))
        .await
        .unwrap();
    let res = client
        .container_policy(Policy {
            policy: br#"{"type":"DELETED","object":{"metadata":{"name":"missing"}}}"#.to_vec(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(res.status, 1);
    assert!(!res.present);

    handle.abort();
}
