use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use serde_json::{Value, json};

#[derive(Debug, Clone)]
pub struct StubChapter {
    pub id: &'static str,
    pub manga: Option<&'static str>,
    pub number: Option<&'static str>,
    pub lang: &'static str,
}

#[derive(Debug, Clone)]
pub struct StubCatalogConfig {
    pub manga: Vec<(&'static str, &'static str)>,
    pub chapters: Vec<StubChapter>,
    pub manga_total: u64,
    /// Largest feed page the stub returns, whatever `limit` asks for.
    pub feed_page_size: usize,
    /// Paths answered with a fixed status and MangaDex-style error body.
    pub failures: HashMap<String, u16>,
}

impl Default for StubCatalogConfig {
    fn default() -> Self {
        let ch = |id, manga, number, lang| StubChapter {
            id,
            manga,
            number,
            lang,
        };
        Self {
            manga: vec![("m-1", "Frieren"), ("m-2", "Dungeon Meshi")],
            chapters: vec![
                ch("c1", Some("m-1"), Some("1"), "en"),
                ch("c2", Some("m-1"), Some("2"), "en"),
                ch("c5", Some("m-1"), Some("5"), "en"),
                ch("j1", Some("m-1"), Some("1"), "ja"),
                ch("orphan", None, Some("7"), "en"),
            ],
            manga_total: 4_321,
            feed_page_size: 2,
            failures: HashMap::new(),
        }
    }
}

pub struct CatalogStub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl CatalogStub {
    pub fn spawn(config: StubCatalogConfig) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start catalog stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let seen = Arc::clone(&requests);
        let node_url = base_url.clone();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let raw_url = request.url().to_string();
                seen.lock().expect("requests lock").push(raw_url.clone());

                let url = url::Url::parse(&format!("http://stub{raw_url}")).expect("parse url");
                let (status, body) = route(&config, &node_url, &url);

                let header =
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .expect("build header");
                let response = tiny_http::Response::from_string(body.to_string())
                    .with_status_code(status)
                    .with_header(header);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Raw request targets (path and query) in arrival order.
    #[allow(dead_code)]
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl Drop for CatalogStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn error_body(status: u16, detail: &str) -> Value {
    json!({
        "result": "error",
        "errors": [{"status": status, "title": "error", "detail": detail}],
    })
}

fn query_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn manga_json(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "type": "manga",
        "attributes": {
            "title": {"en": title},
            "description": {"en": format!("About {title}")},
            "status": "ongoing",
            "tags": [],
        },
        "relationships": [
            {"id": "a-1", "type": "author", "attributes": {"name": "Stub Author"}},
            {"id": "cv-1", "type": "cover_art", "attributes": {"fileName": format!("{id}.png")}},
        ],
    })
}

fn chapter_json(chapter: &StubChapter) -> Value {
    let relationships: Vec<Value> = chapter
        .manga
        .map(|m| json!({"id": m, "type": "manga"}))
        .into_iter()
        .collect();
    json!({
        "id": chapter.id,
        "type": "chapter",
        "attributes": {
            "chapter": chapter.number,
            "volume": null,
            "title": null,
            "translatedLanguage": chapter.lang,
            "publishAt": "2024-01-01T00:00:00+00:00",
            "pages": 2,
        },
        "relationships": relationships,
    })
}

fn route(config: &StubCatalogConfig, node_url: &str, url: &url::Url) -> (u16, Value) {
    let path = url.path();
    if let Some(status) = config.failures.get(path) {
        return (*status, error_body(*status, "stub failure"));
    }

    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    match segments.as_slice() {
        ["manga"] => {
            let data: Vec<Value> = config
                .manga
                .iter()
                .map(|(id, title)| manga_json(id, title))
                .collect();
            let offset: u64 = query_value(&pairs, "offset")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            let limit: u64 = query_value(&pairs, "limit")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10);
            if offset + limit > 10_000 {
                return (400, error_body(400, "offset + limit must be <= 10000"));
            }
            (
                200,
                json!({"result": "ok", "data": data, "limit": data.len(), "offset": offset, "total": config.manga_total}),
            )
        }
        ["manga", "tag"] => (
            200,
            json!({
                "result": "ok",
                "data": [
                    {"id": "t-action", "type": "tag", "attributes": {"name": {"en": "Action"}, "group": "genre"}},
                    {"id": "t-fantasy", "type": "tag", "attributes": {"name": {"en": "Fantasy"}, "group": "genre"}},
                ],
                "total": 2,
            }),
        ),
        ["manga", id] => match config.manga.iter().find(|(m, _)| m == id) {
            Some((id, title)) => (200, json!({"result": "ok", "data": manga_json(id, title)})),
            None => (404, error_body(404, "Manga could not be found")),
        },
        ["chapter"] => {
            let manga = query_value(&pairs, "manga").unwrap_or_default();
            let offset: usize = query_value(&pairs, "offset")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            let limit: usize = query_value(&pairs, "limit")
                .and_then(|v| v.parse().ok())
                .unwrap_or(100);
            if offset + limit > 10_000 {
                return (400, error_body(400, "offset + limit must be <= 10000"));
            }
            let all: Vec<&StubChapter> = config
                .chapters
                .iter()
                .filter(|c| c.manga == Some(manga))
                .collect();
            let data: Vec<Value> = all
                .iter()
                .skip(offset)
                .take(limit.min(config.feed_page_size))
                .map(|c| chapter_json(c))
                .collect();
            (
                200,
                json!({"result": "ok", "data": data, "limit": limit, "offset": offset, "total": all.len()}),
            )
        }
        ["chapter", id] => match config.chapters.iter().find(|c| c.id == *id) {
            Some(chapter) => (200, json!({"result": "ok", "data": chapter_json(chapter)})),
            None => (404, error_body(404, "Chapter could not be found")),
        },
        ["at-home", "server", id] => (
            200,
            json!({
                "result": "ok",
                "baseUrl": node_url,
                "chapter": {
                    "hash": format!("hash-{id}"),
                    "data": ["1.png", "2.png"],
                    "dataSaver": ["1.jpg", "2.jpg"],
                },
            }),
        ),
        _ => (404, error_body(404, "no such route")),
    }
}
