//! Client exchanges against a local TCP server

use std::time::Duration;

use fakebook_crawler::config::SiteConfig;
use fakebook_crawler::cookie::CookieJar;
use fakebook_crawler::error::CrawlError;
use fakebook_crawler::http::client::{HttpClient, Transport};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn listen() -> (TcpListener, SiteConfig) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let site = SiteConfig {
        host: "127.0.0.1".to_string(),
        port,
        ..SiteConfig::default()
    };
    (listener, site)
}

/// Reads one request head plus any Content-Length body.
async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_string();
            let len = head
                .lines()
                .find_map(|l| l.strip_prefix("Content-Length: "))
                .map(|v| v.trim().parse::<usize>().unwrap())
                .unwrap_or(0);
            if buf.len() >= end + 4 + len {
                return String::from_utf8_lossy(&buf[..end + 4 + len]).to_string();
            }
        }

        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            return String::from_utf8_lossy(&buf).to_string();
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

#[tokio::test]
async fn test_get_round_trip() {
    let (listener, site) = listen().await;

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\n\r\nbody")
            .await
            .unwrap();
        request
    });

    let mut client = HttpClient::connect(site).await.unwrap();
    let mut jar = CookieJar::new();
    jar.set_session_id("abc");

    let response = client.get("/fakebook/", &mut jar).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, b"body".to_vec());

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /fakebook/ HTTP/1.1\r\nHost: 127.0.0.1\r\n"));
    assert!(request.contains("Connection: keep-alive\r\n"));
    assert!(request.contains("Cookie: sessionid=abc\r\n"));
}

#[tokio::test]
async fn test_keep_alive_reuses_buffered_bytes() {
    let (listener, site) = listen().await;

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        // Both responses arrive in one segment
        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\none\
                  HTTP/1.1 404 Not Found\r\nContent-Length: 3\r\n\r\ntwo",
            )
            .await
            .unwrap();
        read_request(&mut socket).await
    });

    let mut client = HttpClient::connect(site).await.unwrap();
    let mut jar = CookieJar::new();

    let first = client.get("/a", &mut jar).await.unwrap();
    let second = client.get("/b", &mut jar).await.unwrap();

    assert_eq!(first.body, b"one".to_vec());
    assert_eq!(second.status, 404);
    assert_eq!(second.body, b"two".to_vec());
    assert!(server.await.unwrap().starts_with("GET /b HTTP/1.1"));
}

#[tokio::test]
async fn test_body_split_across_segments() {
    let (listener, site) = listen().await;

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 11\r\n\r\nhello")
            .await
            .unwrap();
        socket.flush().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        socket.write_all(b" world").await.unwrap();
    });

    let mut client = HttpClient::connect(site).await.unwrap();
    let response = client.get("/", &mut CookieJar::new()).await.unwrap();

    assert_eq!(response.body, b"hello world".to_vec());
}

#[tokio::test]
async fn test_chunked_response() {
    let (listener, site) = listen().await;

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nfake\r\n")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        socket.write_all(b"4\r\nbook\r\n0\r\n\r\n").await.unwrap();
    });

    let mut client = HttpClient::connect(site).await.unwrap();
    let response = client.get("/", &mut CookieJar::new()).await.unwrap();

    assert_eq!(response.body_text(), "fakebook");
}

#[tokio::test]
async fn test_post_form_body() {
    let (listener, site) = listen().await;

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        socket
            .write_all(b"HTTP/1.1 302 Found\r\nLocation: /fakebook/\r\nContent-Length: 0\r\n\r\n")
            .await
            .unwrap();
        request
    });

    let mut client = HttpClient::connect(site).await.unwrap();
    let mut jar = CookieJar::new();
    jar.set_csrf_token("tok");

    let response = client
        .post_form("/login", &[("username", "u"), ("csrfmiddlewaretoken", "tok")], &mut jar)
        .await
        .unwrap();
    assert_eq!(response.status, 302);
    assert_eq!(response.header("Location"), Some("/fakebook/"));

    let request = server.await.unwrap();
    let body = "username=u&csrfmiddlewaretoken=tok";
    assert!(request.starts_with("POST /login HTTP/1.1\r\n"));
    assert!(request.contains(&format!("Content-Length: {}\r\n", body.len())));
    assert!(request.contains("Cookie: csrftoken=tok\r\n"));
    assert!(request.ends_with(&format!("\r\n\r\n{}", body)));
}

#[tokio::test]
async fn test_peer_close_is_transient_and_reconnect_recovers() {
    let (listener, site) = listen().await;

    tokio::spawn(async move {
        // First connection is dropped without a reply
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        drop(socket);

        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok")
            .await
            .unwrap();
    });

    let mut client = HttpClient::connect(site).await.unwrap();
    let mut jar = CookieJar::new();

    let err = client.get("/", &mut jar).await.unwrap_err();
    assert!(err.is_transient());

    client.reconnect().await.unwrap();
    let response = client.get("/", &mut jar).await.unwrap();
    assert_eq!(response.body, b"ok".to_vec());
}

#[tokio::test]
async fn test_garbage_response_is_malformed() {
    let (listener, site) = listen().await;

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        socket.write_all(b"SSH-2.0-OpenSSH\r\n\r\n").await.unwrap();
    });

    let mut client = HttpClient::connect(site).await.unwrap();
    let err = client.get("/", &mut CookieJar::new()).await.unwrap_err();

    assert!(matches!(err, CrawlError::MalformedResponse(_)));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_oversized_body_is_malformed() {
    let (listener, mut site) = listen().await;
    site.max_response_bytes = 1024;

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        let _ = socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100000\r\n\r\n")
            .await;
        let _ = socket.write_all(&[b'x'; 4096]).await;
    });

    let mut client = HttpClient::connect(site).await.unwrap();
    let err = client.get("/", &mut CookieJar::new()).await.unwrap_err();

    assert!(matches!(err, CrawlError::MalformedResponse(_)));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_connect_failure_is_fatal() {
    let (listener, site) = listen().await;
    drop(listener);

    let err = match HttpClient::connect(site).await {
        Ok(_) => panic!("connected to a closed port"),
        Err(e) => e,
    };

    assert!(matches!(err, CrawlError::Connect { .. }));
    assert!(!err.is_transient());
}
