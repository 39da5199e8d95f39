mod app_state;
mod config;
mod error;
mod services;
mod storage;

use crate::app_state::AppState;
use crate::config::Settings;
use crate::storage::RecordStore;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use env_logger::Env;
use include_dir::{include_dir, Dir};
use log::{info, warn};
use mime_guess::from_path;
use std::io;
use std::thread;
use std::time::Duration;

static STATIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/static/dist");

async fn serve_embedded(req: HttpRequest) -> HttpResponse {
    let path = req.path().trim_start_matches('/');
    let file_path = if path.is_empty() { "index.html" } else { path };

    match STATIC_DIR.get_file(file_path) {
        Some(file) => {
            let mime = from_path(file_path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.as_ref())
                .body(file.contents().to_vec())
        }
        None => match STATIC_DIR.get_file("index.html") {
            Some(index) => HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(index.contents().to_vec()),
            None => HttpResponse::NotFound().body("Not Found"),
        },
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let settings =
        Settings::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let aliases = settings
        .alias_table()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    info!(
        "Alias table version {} ({} fields)",
        aliases.version,
        aliases.fields.len()
    );

    std::fs::create_dir_all(&settings.upload_dir)?;
    let store = RecordStore::new(&settings.database_path);
    store.init().map_err(io::Error::other)?;

    let state = AppState::new(store, aliases, settings.upload_dir.clone());
    let url = format!("http://{}:{}", settings.host, settings.port);

    if settings.open_browser {
        let url_clone = url.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(500));
            if let Err(e) = webbrowser::open(&url_clone) {
                warn!("Could not open browser: {}", e);
            }
        });
    }

    info!(
        "Server running at {} (database {}, staging {})",
        url,
        settings.database_path.display(),
        settings.upload_dir.display()
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(services::configure_routes)
            .default_service(web::route().to(serve_embedded))
    })
        .bind((settings.host.as_str(), settings.port))?
        .run()
        .await
}
