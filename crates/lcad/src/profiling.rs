//! `--profile` support.
//!
//! Spans recorded during a numbering run (`number`, `number_circuit`, one
//! `numberer` per label prefix, `plan_placeholders`, `write_circuit`) are
//! written as a Chrome trace, viewable in `chrome://tracing` or
//! https://ui.perfetto.dev/

use std::path::PathBuf;
use tracing_subscriber::prelude::*;

/// Keeps the trace file open; it is flushed when this is dropped.
pub struct ProfileGuard {
    _flush: tracing_chrome::FlushGuard,
}

/// Start recording spans into `trace_path`, if one was given.
pub fn init(trace_path: Option<PathBuf>) -> Option<ProfileGuard> {
    let trace_path = trace_path?;
    log::debug!("Writing trace to {}", trace_path.display());

    let (layer, flush) = tracing_chrome::ChromeLayerBuilder::new()
        .file(trace_path)
        .include_args(true)
        .build();

    if tracing_subscriber::registry().with(layer).try_init().is_err() {
        log::warn!("A tracing subscriber is already installed; trace may be empty");
    }

    Some(ProfileGuard { _flush: flush })
}
