pub mod deployer;
pub mod renderer;

pub use deployer::{DeployOptions, Deployer};
pub use renderer::{json_escape, posix_path, Renderer};
