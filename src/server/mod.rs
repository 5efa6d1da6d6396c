//! Development persistence server.
//!
//! Serves the interaction REST boundary from memory so the editor runs with
//! no backend (`cueline --serve-store PORT`), and so `HttpStore` can be tested
//! against a real socket.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐   HTTP (reqwest)   ┌──────────────────────────┐
//! │  Editor / workers    │  ───────────────▶  │  StoreServer thread      │
//! │  HttpStore           │                    │  (rouille)               │
//! └──────────────────────┘                    │   StoreRegistry          │
//!                                             │   webinar -> MemoryStore │
//!                                             └──────────────────────────┘
//! ```
//!
//! # Endpoints
//!
//! | Method | Path                                   | Description        |
//! |--------|----------------------------------------|--------------------|
//! | GET    | `/api/health`                          | Health check       |
//! | GET    | `/api/webinars/{w}/interactions`       | Ordered list       |
//! | POST   | `/api/webinars/{w}/interactions`       | Create (201)       |
//! | PUT    | `/api/webinars/{w}/interactions/{id}`  | Full update        |
//! | PATCH  | `/api/webinars/{w}/interactions/{id}`  | Move / toggle      |
//! | DELETE | `/api/webinars/{w}/interactions/{id}`  | Delete             |
//!
//! Errors answer `{"success": false, "error": "..."}` with a non-2xx code.

mod api;

pub use api::{StoreRegistry, StoreServer, demo_interactions};
