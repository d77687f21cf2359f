use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use leagues_terminal::error::FetchError;
use leagues_terminal::http_client::http_client_with_timeout;
use leagues_terminal::league_fetch::{LeagueSource, SportsDbClient};

/// Serves one raw HTTP response on a local port and returns the base URL.
fn serve_once(response: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind local listener");
    let addr = listener.local_addr().expect("local addr");
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut request = [0u8; 2048];
            let _ = stream.read(&mut request);
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        }
    });
    format!("http://{addr}")
}

fn client_for(base: &str) -> SportsDbClient {
    let http = http_client_with_timeout(Duration::from_secs(5)).expect("http client");
    SportsDbClient::new(http, &format!("{base}/all_leagues.php"), base)
}

#[test]
fn leagues_ok_response_is_parsed() {
    let base = serve_once(concat!(
        "HTTP/1.1 200 OK\r\n",
        "Content-Type: application/json\r\n",
        "Content-Length: 96\r\n",
        "Connection: close\r\n\r\n",
        r#"{"leagues":[{"idLeague":"1","strLeague":"NBA","#,
        r#""strSport":"Basketball","strLeagueAlternate":""}]}"#,
    ));
    let leagues = client_for(&base).fetch_league_list().expect("leagues");
    assert_eq!(leagues.len(), 1);
    assert_eq!(leagues[0].name, "NBA");
}

#[test]
fn non_success_status_keeps_status_and_reason() {
    let base = serve_once(concat!(
        "HTTP/1.1 404 Not Found\r\n",
        "Content-Length: 7\r\n",
        "Connection: close\r\n\r\n",
        "missing",
    ));
    let err = client_for(&base)
        .fetch_league_seasons("4328")
        .expect_err("404 should fail");
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "HTTP error! status: 404");
    assert!(matches!(
        err,
        FetchError::Http { ref message, .. } if message.starts_with("Not Found")
    ));
}

#[test]
fn unreadable_error_body_still_reports_status() {
    // Announces 100 bytes but closes after 3.
    let base = serve_once(concat!(
        "HTTP/1.1 503 Service Unavailable\r\n",
        "Content-Length: 100\r\n",
        "Connection: close\r\n\r\n",
        "bad",
    ));
    let err = client_for(&base)
        .fetch_league_list()
        .expect_err("503 should fail");
    assert_eq!(err.status(), Some(503));
}

#[test]
fn badge_check_rejects_non_image_and_missing_files() {
    let base = serve_once(concat!(
        "HTTP/1.1 200 OK\r\n",
        "Content-Type: text/html\r\n",
        "Content-Length: 6\r\n",
        "Connection: close\r\n\r\n",
        "<html>",
    ));
    let err = client_for(&base)
        .check_badge(&format!("{base}/badge.png"))
        .expect_err("html is not a badge");
    assert!(matches!(err, FetchError::Decode(_)));

    let base = serve_once(concat!(
        "HTTP/1.1 404 Not Found\r\n",
        "Content-Length: 0\r\n",
        "Connection: close\r\n\r\n",
    ));
    let err = client_for(&base)
        .check_badge(&format!("{base}/badge.png"))
        .expect_err("missing badge");
    assert_eq!(err.status(), Some(404));
}

#[test]
fn refused_connection_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind local listener");
    let base = format!("http://{}", listener.local_addr().expect("local addr"));
    drop(listener);
    let err = client_for(&base)
        .fetch_league_list()
        .expect_err("nothing is listening");
    assert!(matches!(err, FetchError::Network { .. }));
    assert_eq!(err.status(), None);
}
