//! Loopback redirect listener
//!
//! The consent page redirects the browser back to a loopback URI once the
//! user approves access. A one-route server waits for that single hit and
//! then shuts down; no state is carried in the redirect itself.

use crate::error::{Error, Result};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use url::Url;

const LANDING_PAGE: &str =
    "<html><body><p>Authorized. You can close this tab and return to the terminal.</p></body></html>";

/// Wait for one GET on the redirect URI's path.
///
/// Binds the URI's host and port, serves until the redirect arrives, then
/// shuts down gracefully so the browser still receives the landing page.
/// Times out with an error if the user never approves.
pub async fn wait_for_redirect(redirect_uri: &str, timeout: Duration) -> Result<()> {
    let uri = Url::parse(redirect_uri)?;
    let host = uri.host_str().unwrap_or("127.0.0.1").to_string();
    let port = uri
        .port()
        .ok_or_else(|| Error::auth(format!("redirect URI has no port: {redirect_uri}")))?;
    let route = if uri.path().is_empty() { "/" } else { uri.path() };

    let (tx, rx) = oneshot::channel::<()>();
    let tx = Arc::new(Mutex::new(Some(tx)));

    let app = Router::new().route(
        route,
        get({
            let tx = Arc::clone(&tx);
            move || {
                let tx = Arc::clone(&tx);
                async move {
                    if let Ok(mut guard) = tx.lock() {
                        if let Some(tx) = guard.take() {
                            let _ = tx.send(());
                        }
                    }
                    Html(LANDING_PAGE)
                }
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .map_err(|e| Error::auth(format!("failed to bind {host}:{port}: {e}")))?;

    let shutdown = async move {
        let _ = rx.await;
    };

    tokio::select! {
        served = axum::serve(listener, app).with_graceful_shutdown(shutdown) => {
            served.map_err(|e| Error::auth(format!("redirect listener failed: {e}")))?;
            Ok(())
        }
        () = tokio::time::sleep(timeout) => {
            Err(Error::auth("timed out waiting for authorization"))
        }
    }
}
