use fakebook_crawler::cookie::SessionCookie;
use fakebook_crawler::crawl::{Extractor, RegexExtractor};

fn extractor() -> RegexExtractor {
    RegexExtractor::new("webcrawler-site.ccs.neu.edu", "/fakebook").unwrap()
}

const FLAG: &str = "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ01";

#[test]
fn test_status_code_from_status_line() {
    let ex = extractor();

    assert_eq!(ex.status_code("HTTP/1.1 200 OK\r\n\r\n"), Some(200));
    assert_eq!(ex.status_code("HTTP/1.1 500 Internal Server Error\r\n"), Some(500));
    assert_eq!(ex.status_code("<html>no status</html>"), None);
}

#[test]
fn test_status_code_accepts_any_http_version() {
    let ex = extractor();

    assert_eq!(ex.status_code("HTTP/2 200 \r\n\r\n"), Some(200));
    assert_eq!(ex.status_code("HTTP/1.0 404 Not Found\r\n"), Some(404));
}

#[test]
fn test_csrf_cookie_extraction() {
    let ex = extractor();
    let text = "HTTP/1.1 200 OK\r\nSet-Cookie: csrftoken=AbC123; Path=/\r\n\r\n";

    assert_eq!(
        ex.cookies(text),
        vec![SessionCookie::CsrfToken("AbC123".to_string())]
    );
}

#[test]
fn test_session_and_csrf_cookies() {
    let ex = extractor();
    let text = "HTTP/1.1 302 FOUND\r\n\
                set-cookie: csrftoken=c9; expires=Thu, 01 Jan 2099; Path=/\r\n\
                Set-Cookie: sessionid=s9; httponly; Path=/\r\n\r\n";

    assert_eq!(
        ex.cookies(text),
        vec![
            SessionCookie::CsrfToken("c9".to_string()),
            SessionCookie::SessionId("s9".to_string()),
        ]
    );
}

#[test]
fn test_cookies_ignore_unrelated_headers() {
    let ex = extractor();
    let text = "HTTP/1.1 200 OK\r\nSet-Cookie: theme=dark\r\nX-Note: csrftoken=nope\r\n\r\n";

    assert!(ex.cookies(text).is_empty());
}

#[test]
fn test_flag_extraction() {
    let ex = extractor();
    let body = format!(
        "<div><h2 class='secret_flag' style=\"color:red\">FLAG: {}</h2></div>",
        FLAG
    );

    assert_eq!(ex.flags(&body), vec![FLAG.to_string()]);
}

#[test]
fn test_flag_requires_exactly_64_chars() {
    let ex = extractor();
    let short = format!(
        "<h2 class='secret_flag' style=\"color:red\">FLAG: {}</h2>",
        &FLAG[..63]
    );
    let long = format!(
        "<h2 class='secret_flag' style=\"color:red\">FLAG: {}X</h2>",
        FLAG
    );

    assert!(ex.flags(&short).is_empty());
    assert!(ex.flags(&long).is_empty());
}

#[test]
fn test_internal_links_only() {
    let ex = extractor();
    let body = r#"<ul>
        <li><a href="/fakebook/123/">Alice</a></li>
        <li><a   href="/fakebook/456/friends/1/" class="x">Friends</a></li>
        <li><a href="/accounts/logout/">Log out</a></li>
        <li><a href="http://example.com/">Elsewhere</a></li>
    </ul>"#;

    assert_eq!(
        ex.links(body),
        vec!["/fakebook/123/".to_string(), "/fakebook/456/friends/1/".to_string()]
    );
}

#[test]
fn test_redirect_absolute_location() {
    let ex = extractor();
    let text = "HTTP/1.1 301 MOVED PERMANENTLY\r\nLocation: http://webcrawler-site.ccs.neu.edu/fakebook/newpath\r\n\r\n";

    assert_eq!(ex.redirect_targets(text), vec!["/fakebook/newpath".to_string()]);
}

#[test]
fn test_redirect_relative_location_keeps_query() {
    let ex = extractor();
    let text = "HTTP/1.1 301 MOVED PERMANENTLY\r\nLocation: /fakebook/x/?page=2\r\n\r\n";

    assert_eq!(ex.redirect_targets(text), vec!["/fakebook/x/?page=2".to_string()]);
}

#[test]
fn test_redirect_to_other_host_is_dropped() {
    let ex = extractor();
    let text = "HTTP/1.1 301 MOVED PERMANENTLY\r\nLocation: http://evil.example/fakebook/\r\n\r\n";

    assert!(ex.redirect_targets(text).is_empty());
}
