pub mod config;
pub mod host;
pub mod interactions;
pub mod motion;
pub mod navigation;
pub mod playback;
pub mod rate_limit;
pub mod selectors;
pub mod telemetry;
pub mod visibility;

#[cfg(target_arch = "wasm32")]
pub mod frontend;

#[cfg(test)]
mod testing;
