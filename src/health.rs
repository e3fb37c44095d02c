//! Health banner.
//!
//! `GET /` answers without touching the upstream, so a `200` here only says
//! the relay process is up and serving.
//!
//! ```bash
//! curl http://localhost:8000/
//! # Momo proxy running
//! ```

use crate::{Request, Response};

pub const BANNER: &str = "Momo proxy running";

/// Always `200 OK`, `text/plain`, body [`BANNER`].
pub async fn banner(_req: Request) -> Response {
    Response::text(BANNER)
}
