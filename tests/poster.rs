use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Cursor, Read};

use indicatif::ProgressBar;
use omdb_poster::api::HttpResponse;
use omdb_poster::{fetch_poster, ui, Config, LookupError, Movie, Transport};
use reqwest::StatusCode;
use tempfile::tempdir;

/// Serves fixed responses by URL and counts every request.
#[derive(Default)]
struct MockTransport {
    routes: HashMap<String, (StatusCode, Vec<u8>)>,
    calls: Cell<usize>,
    requested: RefCell<Vec<String>>,
}

impl MockTransport {
    fn route(mut self, url: &str, status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        self.routes.insert(url.to_string(), (status, body.into()));
        self
    }
}

impl Transport for &MockTransport {
    fn get(&self, url: &str) -> omdb_poster::Result<HttpResponse> {
        self.calls.set(self.calls.get() + 1);
        self.requested.borrow_mut().push(url.to_string());
        match self.routes.get(url) {
            Some((status, body)) => Ok(HttpResponse {
                status: *status,
                content_length: Some(body.len() as u64),
                body: Box::new(Cursor::new(body.clone())),
            }),
            None => Err(LookupError::Transport {
                url: url.to_string(),
                source: Box::new(io::Error::new(io::ErrorKind::ConnectionRefused, "refused")),
            }),
        }
    }
}

/// Hands out a few bytes, then fails mid-stream.
struct Flaky {
    sent: bool,
}

impl Read for Flaky {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.sent {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"));
        }
        self.sent = true;
        let n = buf.len().min(16);
        buf[..n].fill(0xff);
        Ok(n)
    }
}

struct FlakyTransport;

impl Transport for FlakyTransport {
    fn get(&self, _url: &str) -> omdb_poster::Result<HttpResponse> {
        Ok(HttpResponse {
            status: StatusCode::OK,
            content_length: None,
            body: Box::new(Flaky { sent: false }),
        })
    }
}

const POSTER_URL: &str = "http://x/y/poster.jpg";
const UP_QUERY: &str = "http://www.omdbapi.com/?v=1&t=Up";
const UP_JSON: &str = r#"{"Title":"Up","Year":"2009","Poster":"http://x/y/poster.jpg","imdbID":"tt1049413","Response":"True"}"#;

fn up() -> Movie {
    Movie {
        title: "Up".into(),
        poster: POSTER_URL.into(),
        ..Movie::default()
    }
}

fn image(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

#[test]
fn poster_is_written_as_title_plus_extension() {
    let dir = tempdir().unwrap();
    let transport = MockTransport::default().route(POSTER_URL, StatusCode::OK, image(4096));

    let poster = fetch_poster(&&transport, &up(), dir.path(), &ProgressBar::hidden()).unwrap();

    assert_eq!(poster.path, dir.path().join("Up.jpg"));
    assert_eq!(poster.bytes, 4096);
    assert_eq!(fs::read(&poster.path).unwrap(), image(4096));
    assert_eq!(transport.requested.borrow().as_slice(), [POSTER_URL]);
}

#[test]
fn existing_file_is_overwritten() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("Up.jpg"), vec![0u8; 10_000]).unwrap();
    let transport = MockTransport::default().route(POSTER_URL, StatusCode::OK, image(300));

    let poster = fetch_poster(&&transport, &up(), dir.path(), &ProgressBar::hidden()).unwrap();

    assert_eq!(poster.bytes, 300);
    assert_eq!(fs::metadata(&poster.path).unwrap().len(), 300);
}

#[test]
fn missing_poster_makes_no_request() {
    let dir = tempdir().unwrap();
    let transport = MockTransport::default();

    for poster in ["N/A", ""] {
        let movie = Movie {
            poster: poster.into(),
            ..up()
        };
        let err = fetch_poster(&&transport, &movie, dir.path(), &ProgressBar::hidden()).unwrap_err();
        assert!(matches!(err, LookupError::NoPoster));
        assert_eq!(err.to_string(), "the movie has no poster");
    }
    assert_eq!(transport.calls.get(), 0);
}

#[test]
fn poster_error_status_is_not_saved() {
    let dir = tempdir().unwrap();
    let transport = MockTransport::default().route(POSTER_URL, StatusCode::NOT_FOUND, "nope");

    let err = fetch_poster(&&transport, &up(), dir.path(), &ProgressBar::hidden()).unwrap_err();

    assert_eq!(err.to_string(), "getting http://x/y/poster.jpg: 404 Not Found");
    assert!(!dir.path().join("Up.jpg").exists());
}

#[test]
fn dropped_connection_is_a_transport_error_and_leaves_no_file() {
    let dir = tempdir().unwrap();

    let err = fetch_poster(&FlakyTransport, &up(), dir.path(), &ProgressBar::hidden()).unwrap_err();

    assert!(matches!(err, LookupError::Transport { ref url, .. } if url == POSTER_URL));
    assert_eq!(err.to_string(), "getting http://x/y/poster.jpg: reset by peer");
    assert!(!dir.path().join("Up.jpg").exists());
}

#[test]
fn dot_title_is_saved_as_poster() {
    let dir = tempdir().unwrap();
    let transport =
        MockTransport::default().route("http://x/posters/42", StatusCode::OK, image(64));
    let movie = Movie {
        title: "..".into(),
        poster: "http://x/posters/42".into(),
        ..Movie::default()
    };

    let poster = fetch_poster(&&transport, &movie, dir.path(), &ProgressBar::hidden()).unwrap();

    assert_eq!(poster.path, dir.path().join("poster"));
    assert_eq!(fs::metadata(&poster.path).unwrap().len(), 64);
}

#[test]
fn unwritable_directory_is_reported_with_the_path() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");
    let transport = MockTransport::default().route(POSTER_URL, StatusCode::OK, image(8));

    let err = fetch_poster(&&transport, &up(), &missing, &ProgressBar::hidden()).unwrap_err();

    assert!(matches!(err, LookupError::Io { ref path, .. } if *path == missing.join("Up.jpg")));
}

fn quiet_config(dir: &std::path::Path) -> Config {
    Config {
        output_dir: dir.to_path_buf(),
        quiet: true,
        ..Config::default()
    }
}

#[test]
fn run_looks_up_then_downloads() {
    let dir = tempdir().unwrap();
    let transport = MockTransport::default()
        .route(UP_QUERY, StatusCode::OK, UP_JSON)
        .route(POSTER_URL, StatusCode::OK, image(1234));
    let config = Config {
        title: "Up".into(),
        ..quiet_config(dir.path())
    };

    let poster = ui::run(&config, &transport).unwrap();

    assert_eq!(poster.path, dir.path().join("Up.jpg"));
    assert_eq!(poster.bytes, 1234);
    assert_eq!(
        transport.requested.borrow().as_slice(),
        [UP_QUERY, POSTER_URL]
    );
}

#[test]
fn run_by_id_sends_year_and_plot() {
    let dir = tempdir().unwrap();
    let query = "http://www.omdbapi.com/?v=1&i=tt1049413&y=2009&plot=full";
    let transport = MockTransport::default()
        .route(query, StatusCode::OK, UP_JSON)
        .route(POSTER_URL, StatusCode::OK, image(10));
    let config = Config {
        id: "tt1049413".into(),
        year: "2009".into(),
        plot: "full".into(),
        ..quiet_config(dir.path())
    };

    let poster = ui::run(&config, &transport).unwrap();

    assert_eq!(poster.bytes, 10);
    assert_eq!(transport.requested.borrow()[0], query);
}

#[test]
fn run_without_title_or_id_never_touches_the_network() {
    let dir = tempdir().unwrap();
    let transport = MockTransport::default();

    let err = ui::run(&quiet_config(dir.path()), &transport).unwrap_err();

    assert!(matches!(err, LookupError::Usage));
    assert_eq!(transport.calls.get(), 0);
}

#[test]
fn run_with_bad_year_never_touches_the_network() {
    let dir = tempdir().unwrap();
    let transport = MockTransport::default();
    let config = Config {
        title: "Up".into(),
        year: "2009a".into(),
        ..quiet_config(dir.path())
    };

    let err = ui::run(&config, &transport).unwrap_err();

    assert_eq!(err.to_string(), r#"invalid year: "2009a""#);
    assert_eq!(transport.calls.get(), 0);
}

#[test]
fn run_stops_after_lookup_when_there_is_no_poster() {
    let dir = tempdir().unwrap();
    let transport = MockTransport::default().route(
        UP_QUERY,
        StatusCode::OK,
        r#"{"Title":"Up","Poster":"N/A","Response":"True"}"#,
    );
    let config = Config {
        title: "Up".into(),
        ..quiet_config(dir.path())
    };

    let err = ui::run(&config, &transport).unwrap_err();

    assert!(matches!(err, LookupError::NoPoster));
    assert_eq!(transport.calls.get(), 1);
}

#[test]
fn run_surfaces_transport_failures_with_the_url() {
    let dir = tempdir().unwrap();
    let transport = MockTransport::default();
    let config = Config {
        title: "Up".into(),
        ..quiet_config(dir.path())
    };

    let err = ui::run(&config, &transport).unwrap_err();

    assert_eq!(err.to_string(), "getting http://www.omdbapi.com/?v=1&t=Up: refused");
}
