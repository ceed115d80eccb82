pub mod capture;

pub use capture::{write_wav, MicRecorder, TARGET_RATE};
