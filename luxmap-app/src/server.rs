//! `GET /espectro?arquivo=<path>`: PNG spectral chart of a file or directory.

use crate::plotting;
use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use luxmap_core::spectral::load_path;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct SpectrumQuery {
    arquivo: Option<String>,
}

#[derive(Debug, Clone, Copy)]
struct RenderSettings {
    png_size: (u32, u32),
}

fn render(path: PathBuf, png_size: (u32, u32)) -> Result<Vec<u8>> {
    let load = load_path(&path).with_context(|| format!("Failed to load {:?}", path))?;
    if load.curve_count() == 0 {
        anyhow::bail!("no readable spectral files in {:?}", path);
    }
    plotting::spectral_png_bytes(&load.groups, png_size)
}

async fn spectrum(State(settings): State<RenderSettings>, Query(q): Query<SpectrumQuery>) -> Response {
    let Some(path) = q.arquivo.filter(|p| !p.is_empty()).map(PathBuf::from) else {
        return (StatusCode::NOT_FOUND, "File not found").into_response();
    };
    if !path.exists() {
        log::warn!("Requested spectrum {:?} does not exist", path);
        return (StatusCode::NOT_FOUND, "File not found").into_response();
    }

    let rendered = tokio::task::spawn_blocking(move || render(path, settings.png_size)).await;
    match rendered {
        Ok(Ok(png)) => ([(header::CONTENT_TYPE, "image/png")], png).into_response(),
        Ok(Err(err)) => {
            log::error!("Spectrum rendering failed: {:#}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render spectrum: {:#}", err),
            )
                .into_response()
        }
        Err(join) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to render spectrum: {}", join),
        )
            .into_response(),
    }
}

pub fn router(png_size: (u32, u32)) -> Router {
    Router::new()
        .route("/espectro", get(spectrum))
        .with_state(RenderSettings { png_size })
}

/// Serves the route until the process is interrupted.
pub fn run(addr: &str, png_size: (u32, u32)) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;
    runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        println!("Serving on http://{}/espectro?arquivo=<path>", addr);
        axum::serve(listener, router(png_size))
            .await
            .context("HTTP server stopped")
    })
}
