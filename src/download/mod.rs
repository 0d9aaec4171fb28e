//! Download management and processing
//!
//! - `admission`: one job per chat
//! - `ytdlp` / `ffmpeg`: the two external steps
//! - `job`: the runner tying them together

pub mod admission;
pub mod error;
pub mod ffmpeg;
pub mod job;
pub mod options;
pub mod workspace;
pub mod ytdlp;
pub mod ytdlp_errors;

pub use admission::{AdmissionGuard, ChatSlot};
pub use error::DownloadError;
pub use job::{ChatSink, DeliveryKind, JobReport, JobRequest, JobRunner};
pub use options::{Gain, OutputKind, ProcessingOptions};
