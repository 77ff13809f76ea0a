use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhysicsError {
    #[error("failed to read scene file {path}")]
    SceneRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("scene is not valid JSON")]
    SceneParse(#[from] serde_json::Error),
    #[error("world is full ({0} bodies)")]
    WorldFull(usize),
    #[error("render output failed")]
    Render(#[source] std::io::Error),
    #[error("window renderer: {0}")]
    Window(String),
}
