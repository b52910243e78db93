//! HTTP Handlers

mod artifact;
mod job;
mod ping;
mod tts;
mod vc;

pub use artifact::download_artifact;
pub use job::{query_job_status, withdraw_job};
pub use ping::ping;
pub use tts::{generate_tts, submit_tts};
pub use vc::{generate_vc, submit_vc};
