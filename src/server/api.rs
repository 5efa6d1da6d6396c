//! REST handlers over in-memory stores, using rouille.
//!
//! # Key types
//!
//! - [`StoreServer`] - HTTP server running on a background thread
//! - [`StoreRegistry`] - one [`MemoryStore`] per webinar id, created on first use
//!
//! # Thread safety
//!
//! rouille calls the handler from its own thread pool. The registry map sits
//! behind a `Mutex`; each `MemoryStore` locks internally.
//! CORS headers are added to all responses for browser access.

use crate::entities::{
    CtaConfig, Interaction, InteractionConfig, InteractionId, InteractionPatch, PauseConfig, PollConfig,
    ScreenPosition,
};
use crate::sync::{InteractionStore, MemoryStore, StoreError};
use log::{debug, info};
use rouille::{Request, Response};
use serde::Serialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, mpsc};
use std::thread::JoinHandle;

/// Per-webinar stores served by the dev server.
#[derive(Default)]
pub struct StoreRegistry {
    stores: Mutex<HashMap<String, Arc<MemoryStore>>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store for `webinar_id`, empty if it was never seen.
    pub fn get_or_create(&self, webinar_id: &str) -> Arc<MemoryStore> {
        let mut stores = self.stores.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(
            stores
                .entry(webinar_id.to_string())
                .or_insert_with(|| Arc::new(MemoryStore::new())),
        )
    }

    /// Replace a webinar's store with one holding `items`.
    pub fn seed(&self, webinar_id: &str, items: Vec<Interaction>) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::with_items(items));
        self.stores
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(webinar_id.to_string(), Arc::clone(&store));
        store
    }

    pub fn webinars(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .stores
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }
}

/// A small starting set for `--serve-store`, so the editor opens with content.
pub fn demo_interactions() -> Vec<Interaction> {
    let mut welcome = Interaction::draft(
        InteractionConfig::Poll(PollConfig {
            options: vec!["Beginner".into(), "Intermediate".into(), "Expert".into()],
            allow_multiple: false,
        }),
        30.0,
        "How familiar are you with the topic?",
    );
    welcome.duration = Some(45.0);
    welcome.position = ScreenPosition::Center;

    let mut pause = Interaction::draft(
        InteractionConfig::Pause(PauseConfig {
            message: "Take a minute to try the exercise".into(),
        }),
        300.0,
        "Exercise break",
    );
    pause.required = true;

    let offer = Interaction::draft(
        InteractionConfig::Cta(CtaConfig {
            button_text: "Book a demo".into(),
            button_url: "https://example.com/demo".into(),
        }),
        900.0,
        "Book a demo",
    );

    vec![welcome, pause, offer]
}

/// Generic API response
#[derive(Serialize)]
struct ApiResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ApiResponse {
    fn ok() -> Self {
        Self { success: true, message: None, error: None }
    }

    fn ok_msg(msg: &str) -> Self {
        Self { success: true, message: Some(msg.to_string()), error: None }
    }

    fn err(msg: &str) -> Self {
        Self { success: false, message: None, error: Some(msg.to_string()) }
    }
}

fn error_response(err: &StoreError) -> Response {
    debug!("Store error: {}", err);
    Response::json(&ApiResponse::err(&err.to_string())).with_status_code(err.status_code())
}

fn bad_request(msg: &str) -> Response {
    Response::json(&ApiResponse::err(msg)).with_status_code(400)
}

/// Route target parsed from `/api/webinars/{w}/interactions[/{id}]`.
#[derive(Debug, PartialEq)]
enum Target<'a> {
    Collection { webinar: &'a str },
    Item { webinar: &'a str, id: &'a str },
}

fn parse_target(path: &str) -> Option<Target<'_>> {
    let rest = path.strip_prefix("/api/webinars/")?;
    let (webinar, rest) = rest.split_once('/')?;
    if webinar.is_empty() {
        return None;
    }
    let rest = rest.strip_prefix("interactions")?;
    match rest.trim_end_matches('/') {
        "" => Some(Target::Collection { webinar }),
        tail => {
            let id = tail.strip_prefix('/')?;
            (!id.is_empty() && !id.contains('/')).then_some(Target::Item { webinar, id })
        }
    }
}

/// Development REST server for the interaction store.
pub struct StoreServer {
    addr: SocketAddr,
    handle: Option<JoinHandle<()>>,
    stop_tx: mpsc::Sender<()>,
}

impl StoreServer {
    /// Bind `addr` (port 0 picks a free one) and serve on a background thread.
    pub fn start(addr: &str, registry: Arc<StoreRegistry>) -> anyhow::Result<Self> {
        let server = rouille::Server::new(addr, move |request| Self::handle_request(request, &registry))
            .map_err(|e| anyhow::anyhow!("Failed to bind store server on {}: {}", addr, e))?;
        let addr = server.server_addr();
        info!("Store server listening on http://{}", addr);
        let (handle, stop_tx) = server.stoppable();
        Ok(Self {
            addr,
            handle: Some(handle),
            stop_tx,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL for `HttpStore`.
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    fn handle_request(request: &Request, registry: &StoreRegistry) -> Response {
        // Handle preflight
        if request.method() == "OPTIONS" {
            return Response::empty_204()
                .with_additional_header("Access-Control-Allow-Origin", "*")
                .with_additional_header("Access-Control-Allow-Methods", "GET, POST, PUT, PATCH, DELETE, OPTIONS")
                .with_additional_header("Access-Control-Allow-Headers", "Content-Type");
        }

        let path = request.url();
        debug!("{} {}", request.method(), path);

        let response = if path == "/api/health" {
            if request.method() == "GET" {
                Response::json(&ApiResponse::ok_msg("cueline store server"))
            } else {
                Response::json(&ApiResponse::err("Method not allowed")).with_status_code(405)
            }
        } else {
            match parse_target(&path) {
                Some(Target::Collection { webinar }) => {
                    let store = registry.get_or_create(webinar);
                    match request.method() {
                        "GET" => Self::list(&store),
                        "POST" => Self::create(request, &store),
                        _ => Response::json(&ApiResponse::err("Method not allowed")).with_status_code(405),
                    }
                }
                Some(Target::Item { webinar, id }) => {
                    let store = registry.get_or_create(webinar);
                    let id = InteractionId::from(id);
                    match request.method() {
                        "PUT" => Self::update(request, &store, &id),
                        "PATCH" => Self::patch(request, &store, &id),
                        "DELETE" => Self::delete(&store, &id),
                        _ => Response::json(&ApiResponse::err("Method not allowed")).with_status_code(405),
                    }
                }
                None => Response::json(&ApiResponse::err("Not found")).with_status_code(404),
            }
        };

        // Add CORS headers to response
        response.with_additional_header("Access-Control-Allow-Origin", "*")
    }

    fn list(store: &MemoryStore) -> Response {
        match store.list() {
            Ok(items) => Response::json(&items),
            Err(e) => error_response(&e),
        }
    }

    fn create(request: &Request, store: &MemoryStore) -> Response {
        let draft = match rouille::input::json_input::<Interaction>(request) {
            Ok(d) => d,
            Err(e) => return bad_request(&format!("Invalid JSON: {}", e)),
        };
        match store.create(&draft) {
            Ok(stored) => Response::json(&stored).with_status_code(201),
            Err(e) => error_response(&e),
        }
    }

    fn update(request: &Request, store: &MemoryStore, id: &InteractionId) -> Response {
        let body = match rouille::input::json_input::<Interaction>(request) {
            Ok(b) => b,
            Err(e) => return bad_request(&format!("Invalid JSON: {}", e)),
        };
        match store.update(id, &body) {
            Ok(stored) => Response::json(&stored),
            Err(e) => error_response(&e),
        }
    }

    fn patch(request: &Request, store: &MemoryStore, id: &InteractionId) -> Response {
        let patch = match rouille::input::json_input::<InteractionPatch>(request) {
            Ok(p) => p,
            Err(e) => return bad_request(&format!("Invalid JSON: {}", e)),
        };
        match store.patch(id, &patch) {
            Ok(stored) => Response::json(&stored),
            Err(e) => error_response(&e),
        }
    }

    fn delete(store: &MemoryStore, id: &InteractionId) -> Response {
        match store.delete(id) {
            Ok(()) => Response::json(&ApiResponse::ok()),
            Err(e) => error_response(&e),
        }
    }
}

impl Drop for StoreServer {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        debug!("Store server on {} stopped", self.addr);
    }
}
