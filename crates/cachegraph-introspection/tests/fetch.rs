use std::time::Duration;

use cachegraph_core::{analyze_schema, IntrospectionConfig};
use cachegraph_introspection::{IntrospectionClient, IntrospectionError};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

/// Read one HTTP request (headers plus content-length body) off the socket.
async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Serve a single canned response and hand back the request that was received.
async fn serve_once(
    status: &'static str,
    body: String,
) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/graphql", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
        request
    });

    (url, handle)
}

/// Accept a connection and never answer.
async fn serve_silence() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/graphql", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let (_stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });
    url
}

fn schema_body() -> String {
    json!({
        "data": {
            "__schema": {
                "queryType": { "name": "Query" },
                "mutationType": null,
                "subscriptionType": null,
                "types": [
                    {
                        "kind": "OBJECT", "name": "Query", "description": null,
                        "fields": [{
                            "name": "book", "description": null,
                            "args": [{ "name": "id", "description": null, "defaultValue": null,
                                       "type": { "kind": "NON_NULL", "name": null,
                                                 "ofType": { "kind": "SCALAR", "name": "ID", "ofType": null } } }],
                            "type": { "kind": "OBJECT", "name": "Book", "ofType": null },
                            "isDeprecated": false, "deprecationReason": null
                        }],
                        "inputFields": null, "interfaces": [], "enumValues": null, "possibleTypes": null
                    },
                    {
                        "kind": "OBJECT", "name": "Book", "description": "A book",
                        "fields": [{
                            "name": "id", "description": null, "args": [],
                            "type": { "kind": "NON_NULL", "name": null,
                                      "ofType": { "kind": "SCALAR", "name": "ID", "ofType": null } },
                            "isDeprecated": false, "deprecationReason": null
                        }],
                        "inputFields": null, "interfaces": [], "enumValues": null, "possibleTypes": null
                    }
                ]
            }
        }
    })
    .to_string()
}

#[tokio::test]
async fn fetches_and_analyzes_schema() {
    let (url, server) = serve_once("200 OK", schema_body()).await;

    let mut config = IntrospectionConfig::default();
    config
        .headers
        .insert("Authorization".to_string(), "Bearer secret".to_string());
    let client = IntrospectionClient::new(config).unwrap();

    let schema = client
        .fetch_schema(&url, &CancellationToken::new())
        .await
        .unwrap();
    let analyzed = analyze_schema(&schema).unwrap();
    assert_eq!(analyzed.queries[0].name, "book");
    assert!(analyzed.entity("Book").unwrap().has_identity_field);

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /graphql"));
    assert!(request.to_lowercase().contains("authorization: bearer secret"));
    assert!(request.contains("IntrospectionQuery"));
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let (url, _server) = serve_once("503 Service Unavailable", "{}".to_string()).await;
    let client = IntrospectionClient::new(IntrospectionConfig::default()).unwrap();

    match client.fetch_schema(&url, &CancellationToken::new()).await {
        Err(IntrospectionError::Status { status, .. }) => assert_eq!(status, 503),
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn slow_server_times_out() {
    let url = serve_silence().await;
    let config = IntrospectionConfig {
        timeout_secs: 1,
        ..Default::default()
    };
    let client = IntrospectionClient::new(config).unwrap();

    let result = client.fetch_schema(&url, &CancellationToken::new()).await;
    assert!(matches!(
        result,
        Err(IntrospectionError::Timeout { seconds: 1, .. })
    ));
}

#[tokio::test]
async fn in_flight_request_can_be_cancelled() {
    let url = serve_silence().await;
    let client = IntrospectionClient::new(IntrospectionConfig::default()).unwrap();

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let result = client.fetch_schema(&url, &token).await;
    assert!(matches!(result, Err(IntrospectionError::Cancelled)));
}

#[tokio::test]
async fn endpoint_check_reports_reachability() {
    let (url, _server) = serve_once("200 OK", json!({ "data": { "__typename": "Query" } }).to_string()).await;
    let client = IntrospectionClient::new(IntrospectionConfig::default()).unwrap();

    let status = client.check_endpoint(&url).await;
    assert!(status.ok, "{}", status.message);

    // Nothing listens on the discard port
    let status = client.check_endpoint("http://127.0.0.1:9/graphql").await;
    assert!(!status.ok);
}
