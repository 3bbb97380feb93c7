use std::time::Duration;

use philipont::prelude::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// What the demo prints for each level it receives.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct LevelSummary {
    lid: u32,
    name: String,
    designer: String,
    skin: Option<Skin>,
    heightmap_samples: usize,
    road_points: usize,
    nodes: usize,
    links: usize,
}

impl From<&Level> for LevelSummary {
    fn from(level: &Level) -> Self {
        Self {
            lid: level.lid,
            name: level.name.clone(),
            designer: level.designer.clone(),
            skin: level.environment.skin_kind(),
            heightmap_samples: level.terrain.heightmap.len(),
            road_points: level.road.points.len(),
            nodes: level.nodes.len(),
            links: level.links.len(),
        }
    }
}

/// Stands in for a renderer: keeps a summary of the active level.
#[derive(Default)]
struct SummaryScene {
    current: Option<LevelSummary>,
    loaded: usize,
}

impl Scene for SummaryScene {
    fn destroy_buffers(&mut self) {
        self.current = None;
    }

    fn init_buffers(&mut self, level: &Level) {
        let summary = LevelSummary::from(level);
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::warn!(error = %e, "cannot serialize level summary"),
        }
        self.current = Some(summary);
        self.loaded += 1;
    }
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

const DEFAULT_URL: &str = "ws://127.0.0.1:8080";
const DEFAULT_USER: &str = "12";
const DEFAULT_PASSHASH: &[u8; 32] = b"01234567890123456789012345678901";

fn config_from_env() -> ClientConfig {
    let url = std::env::var("PHILIPONT_URL").unwrap_or_else(|_| DEFAULT_URL.into());
    let user = std::env::var("PHILIPONT_USER").unwrap_or_else(|_| DEFAULT_USER.into());

    ClientConfig::builder()
        .url(&url)
        .credentials(&user, *DEFAULT_PASSHASH)
        .recv_timeout(Some(Duration::from_secs(30)))
        .auto_level(NewLevelParams {
            name: "WOOHOO!".into(),
            designer: "Phil za best".into(),
            terrain_x: 10.0,
            terrain_z: 10.0,
            terrain_res: 0.5,
        })
        .build()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = config_from_env();
    tracing::info!(url = %config.url, "connecting to simulation server");

    let mut client = Client::connect(config, SummaryScene::default()).await?;
    client.run().await?;

    let (scene, _) = client.close().await?;
    tracing::info!(levels = scene.loaded, "session finished");
    Ok(())
}
