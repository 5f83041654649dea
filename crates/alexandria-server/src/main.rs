//! Alexandria server binary.
//!
//! Wires the seeded catalog, the built-in fragment templates and the page
//! services together, then serves until SIGTERM or SIGINT.

use std::sync::Arc;

use alexandria_catalog::{CatalogStore, Document, DocumentKind, SharedCatalog};
use alexandria_core::attr;
use alexandria_pipeline::{AcceptAll, HtmlFragments, FOOTER_FRAGMENT, HEADER_FRAGMENT};
use alexandria_services::{DocumentService, ShelfService};
use alexandria_server::{Server, ServerConfig};
use alexandria_telemetry::{init_logging, LogConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&LogConfig::development())?;

    let catalog: Arc<dyn CatalogStore> = Arc::new(seed_catalog());

    let server = Server::builder()
        .config(ServerConfig::default())
        .renderer(Arc::new(fragments()))
        .route(
            "/",
            Arc::new(ShelfService::new(Arc::clone(&catalog))),
            Arc::new(AcceptAll),
        )
        .route(
            "/document",
            Arc::new(DocumentService::new(Arc::clone(&catalog))),
            Arc::new(AcceptAll),
        )
        .build();

    server.run().await?;
    Ok(())
}

fn seed_catalog() -> SharedCatalog {
    SharedCatalog::with_documents([
        Document::new(1, "Almagest", "Ptolemy", DocumentKind::Book),
        Document::new(2, "Elements", "Euclid", DocumentKind::Book),
        Document::new(3, "Metropolis", "Fritz Lang", DocumentKind::Film),
        Document::new(4, "Kind of Blue", "Miles Davis", DocumentKind::Album),
    ])
}

/// The built-in fragment set. A real template engine can replace this
/// behind the same `FragmentRenderer` trait.
fn fragments() -> HtmlFragments {
    HtmlFragments::new()
        .with(HEADER_FRAGMENT, |ctx| {
            let mut html = String::from(
                "<!doctype html><html><head><meta charset=\"utf-8\">\
                 <title>Alexandria</title></head><body>\
                 <header><h1>Alexandria</h1>",
            );
            if let Some(message) = ctx.attr_str(attr::MESSAGE) {
                html.push_str("<p class=\"message\">");
                html.push_str(&escape(message));
                html.push_str("</p>");
            }
            html.push_str("</header>");
            html
        })
        .with(FOOTER_FRAGMENT, |_ctx| {
            "<footer><a href=\"/\">Back to the shelf</a></footer></body></html>".to_string()
        })
        .with("shelf", |ctx| {
            let mut html = String::from("<main><ul class=\"shelf\">");
            let listing = ctx
                .attr(attr::SHELF_LISTING)
                .and_then(serde_json::Value::as_array)
                .cloned()
                .unwrap_or_default();
            for meta in &listing {
                let id = meta["id"].as_u64().unwrap_or_default();
                let title = escape(meta["title"].as_str().unwrap_or_default());
                let kind = escape(meta["kind"].as_str().unwrap_or_default());
                let state = if meta["on_loan"].as_bool().unwrap_or(false) {
                    " (on loan)"
                } else {
                    ""
                };
                html.push_str(&format!(
                    "<li><a href=\"/document?id={id}\">{title}</a> [{kind}]{state}</li>"
                ));
            }
            html.push_str("</ul></main>");
            html
        })
        .with("document", |ctx| {
            let Some(meta) = ctx.attr(attr::DOCUMENT_META) else {
                return "<main><p>No document selected.</p></main>".to_string();
            };
            let id = meta["id"].as_u64().unwrap_or_default();
            let title = escape(meta["title"].as_str().unwrap_or_default());
            let creator = escape(meta["creator"].as_str().unwrap_or_default());
            let kind = escape(meta["kind"].as_str().unwrap_or_default());
            let action = ctx.attr_str(attr::ACTION_TOKEN).unwrap_or("emprunter");

            let mut html = format!("<main><h2>{title}</h2><p>{creator} ({kind})</p>");
            if meta["on_loan"].as_bool().unwrap_or(false) {
                html.push_str("<p>Currently on loan.</p>");
            } else {
                html.push_str(&format!(
                    "<form method=\"post\" action=\"/document?id={id}\">\
                     <button name=\"{action}\" value=\"1\">Borrow</button></form>"
                ));
            }
            html.push_str("</main>");
            html
        })
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
