//! The consumer of decoded levels.
//!
//! Rendering is not part of this crate. Whatever draws the bridge
//! implements [`Scene`]; the client calls it whenever the active level is
//! replaced.

use philipont_protocol::Level;

/// Receives level changes from a [`Client`](crate::Client).
///
/// The client always calls [`destroy_buffers`](Scene::destroy_buffers)
/// before [`init_buffers`](Scene::init_buffers), so an implementation never
/// holds resources for two levels at once.
pub trait Scene {
    /// Releases everything built for the previous level.
    fn destroy_buffers(&mut self);

    /// Builds resources for a freshly decoded level.
    fn init_buffers(&mut self, level: &Level);
}

/// A scene that logs level changes and renders nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogScene;

impl Scene for LogScene {
    fn destroy_buffers(&mut self) {
        tracing::debug!("scene buffers destroyed");
    }

    fn init_buffers(&mut self, level: &Level) {
        tracing::info!(
            lid = level.lid,
            name = %level.name,
            heightmap = level.terrain.heightmap.len(),
            nodes = level.nodes.len(),
            links = level.links.len(),
            "scene buffers initialised"
        );
    }
}
