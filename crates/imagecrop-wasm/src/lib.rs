//! Imagecrop WASM - WebAssembly bindings for the imagecrop engine
//!
//! This crate exposes the imagecrop-core controller and its helpers to
//! JavaScript/TypeScript. Rendering uses the in-memory raster backend, so
//! the bindings need nothing from the DOM beyond `console`, `Blob` and `File`.
//!
//! # Module Structure
//!
//! - `controller` - The crop controller with JS callbacks and a promise-based crop
//! - `geometry` - Zoom/rotation helpers, fit dimensions and crop rectangles
//! - `gesture` - Standalone two-finger gesture interpreter
//! - `logger` - `log` facade routed to the browser console
//! - `output` - Conversion of crop results into JS objects
//! - `validate` - File size/type validation and size formatting
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsCropController } from '@imagecrop/wasm';
//!
//! await init();
//!
//! const controller = new JsCropController({ aspectRatio: 16 / 9, outputFormat: 'all' });
//! controller.on_crop_complete((result) => upload(result.blob));
//! controller.select_file(file.name, file.type, new Uint8Array(await file.arrayBuffer()));
//! const result = await controller.crop();
//! ```

use wasm_bindgen::prelude::*;

mod controller;
mod geometry;
mod gesture;
mod logger;
mod output;
mod validate;

pub use controller::JsCropController;
pub use geometry::{
    clamp_zoom, compute_crop_rect, compute_fit_dimensions, normalize_rotation, JsCropRect, JsSize,
};
pub use gesture::{JsGestureInterpreter, JsGestureUpdate};
pub use validate::{format_file_size, validate_file};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logger::install(log::LevelFilter::Info);
}

/// Change how much the engine logs to the browser console.
///
/// Accepts `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"` or `"off"`;
/// anything else leaves the level unchanged.
#[wasm_bindgen]
pub fn set_log_level(level: &str) {
    if let Some(filter) = logger::parse_level(level) {
        log::set_max_level(filter);
    }
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_set_log_level_ignores_unknown() {
        log::set_max_level(log::LevelFilter::Warn);
        set_log_level("loud");
        assert_eq!(log::max_level(), log::LevelFilter::Warn);

        set_log_level("debug");
        assert_eq!(log::max_level(), log::LevelFilter::Debug);
    }
}
