pub mod audio;
pub mod config;
pub mod greeting;
pub mod intent;
pub mod kernel;
pub mod logging;
pub mod policy;
pub mod session;
pub mod speech;

pub use config::VoxConfig;
pub use intent::{ClassificationResult, HybridClassifier, Intent};
pub use kernel::Reactor;
pub use session::Session;
