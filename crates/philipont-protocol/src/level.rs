//! Level domain model and the decode script for `ACK_NEW_LEVEL`.
//!
//! A level travels as one flat sequence of fields. Some array lengths are not
//! on the wire at all; they are derived from scalars decoded earlier in the
//! same message, so the read order below is load-bearing:
//!
//! ```text
//! Metadata → Terrain → Road → Environment → Nodes → Links → Done
//!            │          │
//!            │          └─ road points   = 4 × segments
//!            └─ heightmap = (⌊size_x/res⌋+1) × (⌊size_z/res⌋+1)
//! ```
//!
//! The script either produces a whole [`Level`] or fails; a partially
//! decoded level is never observable.

use serde::{Deserialize, Serialize};

use crate::converter::{Vec3, Vec3Converter};
use crate::opcode::{Skin, LINK_NODE_SLOTS, NODE_MAX_LINKS};
use crate::response::Response;
use crate::{ProtocolError, ProtocolResult};

/// Length of the authentication token carried in level metadata.
pub const AUTH_TOKEN_LEN: usize = 32;

/// Upper bound on heightmap cells a client may request for a new level.
pub const MAX_HEIGHTMAP_CELLS: usize = 256 * 256;

/// Number of heightmap samples for a terrain of the given size.
///
/// Each axis has `⌊size / res⌋ + 1` samples. Fails with `InvalidLength` when
/// the ratio is negative, not finite (zero resolution, NaN) or the product
/// does not fit in `usize`.
pub fn heightmap_len(size_x: f64, size_z: f64, res: f64) -> ProtocolResult<usize> {
    let samples = |size: f64| -> ProtocolResult<usize> {
        let cells = (size / res).floor();
        if !cells.is_finite() || cells < 0.0 || cells >= u32::MAX as f64 {
            return Err(ProtocolError::InvalidLength(format!(
                "terrain size {size} at resolution {res} gives {cells} cells"
            )));
        }
        Ok(cells as usize + 1)
    };
    samples(size_x)?
        .checked_mul(samples(size_z)?)
        .ok_or_else(|| {
            ProtocolError::InvalidLength(format!(
                "heightmap {size_x}×{size_z} at resolution {res} overflows"
            ))
        })
}

// ---------------------------------------------------------------------------
// Domain model
// ---------------------------------------------------------------------------

/// The complete state of one editable bridge scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// Level id assigned by the server.
    pub lid: u32,
    /// Owning user id.
    pub uid: u32,
    pub name: String,
    pub designer: String,
    /// Opaque 32-character token authorising edits to this level.
    pub auth: String,
    pub terrain: Terrain,
    pub road: Road,
    pub environment: Environment,
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    /// Editor grid settings; not on the wire.
    pub grid: EditorGrid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terrain {
    pub water_level: f64,
    pub size_x: f64,
    pub size_z: f64,
    pub resolution: f64,
    /// Row-major samples, [`heightmap_len`] of them.
    pub heightmap: Vec<Vec3>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Road {
    pub segments: u32,
    /// Four control points per segment.
    pub points: Vec<Vec3>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Raw skin value; see [`Environment::skin_kind`].
    pub skin: u32,
    pub atmosphere_density: f64,
    pub humidity: f64,
    pub wind: Vec3,
    pub gravity: Vec3,
}

impl Environment {
    /// The skin as a known preset, or `None` for values this client does
    /// not recognise.
    pub fn skin_kind(&self) -> Option<Skin> {
        Skin::try_from(self.skin).ok()
    }
}

/// A vertex of the structure graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: u32,
    pub kind: u32,
    /// Link count as declared by the server. May exceed `links.len()`.
    pub link_count: u32,
    pub position: Vec3,
    pub speed: Vec3,
    pub acceleration: Vec3,
    /// Indices of incident links, at most [`NODE_MAX_LINKS`].
    pub links: Vec<u16>,
}

/// An edge of the structure graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: u32,
    pub material: u32,
    pub length: f64,
    pub long_stress: f64,
    pub rot_stress: f64,
    /// Node slots; indices into [`Level::nodes`], not bounds-checked here.
    pub nodes: [u16; LINK_NODE_SLOTS],
}

/// Snapping grid used by the level editor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EditorGrid {
    pub res: f64,
    pub z: u32,
}

impl Default for EditorGrid {
    fn default() -> Self {
        Self { res: 0.1, z: 1 }
    }
}

// ---------------------------------------------------------------------------
// Assembler
// ---------------------------------------------------------------------------

impl Level {
    /// Decodes a level from the body of an `ACK_NEW_LEVEL` message (the
    /// opcode byte already consumed).
    pub fn decode(response: &mut Response<'_>) -> ProtocolResult<Self> {
        // Metadata
        let lid = response.int()?;
        let uid = response.int()?;
        let len = response.ubyte()?;
        let name = response.string(usize::from(len))?;
        let len = response.ubyte()?;
        let designer = response.string(usize::from(len))?;
        let auth = response.string(AUTH_TOKEN_LEN)?;

        let terrain = Terrain::decode(response)?;
        let road = Road::decode(response)?;
        let environment = Environment::decode(response)?;

        let node_count = response.short()?;
        let nodes = (0..node_count)
            .map(|_| Node::decode(response))
            .collect::<ProtocolResult<Vec<_>>>()?;

        let link_count = response.short()?;
        let links = (0..link_count)
            .map(|_| Link::decode(response))
            .collect::<ProtocolResult<Vec<_>>>()?;

        Ok(Self {
            lid,
            uid,
            name,
            designer,
            auth,
            terrain,
            road,
            environment,
            nodes,
            links,
            grid: EditorGrid::default(),
        })
    }
}

impl Terrain {
    fn decode(response: &mut Response<'_>) -> ProtocolResult<Self> {
        let water_level = response.double()?;
        let size_x = response.double()?;
        let size_z = response.double()?;
        let resolution = response.double()?;
        let cells = heightmap_len(size_x, size_z, resolution)?;
        let heightmap = response.custom_array(&Vec3Converter, cells)?;
        Ok(Self {
            water_level,
            size_x,
            size_z,
            resolution,
            heightmap,
        })
    }
}

impl Road {
    fn decode(response: &mut Response<'_>) -> ProtocolResult<Self> {
        let segments = response.int()?;
        let count = usize::try_from(segments)
            .ok()
            .and_then(|s| s.checked_mul(4))
            .ok_or_else(|| {
                ProtocolError::InvalidLength(format!(
                    "{segments} road segments overflow"
                ))
            })?;
        let points = response.custom_array(&Vec3Converter, count)?;
        Ok(Self { segments, points })
    }
}

impl Environment {
    fn decode(response: &mut Response<'_>) -> ProtocolResult<Self> {
        Ok(Self {
            skin: response.int()?,
            atmosphere_density: response.double()?,
            humidity: response.double()?,
            wind: response.custom(&Vec3Converter)?,
            gravity: response.custom(&Vec3Converter)?,
        })
    }
}

impl Node {
    fn decode(response: &mut Response<'_>) -> ProtocolResult<Self> {
        let id = response.int()?;
        let kind = response.int()?;
        let link_count = response.int()?;
        let position = response.custom(&Vec3Converter)?;
        let speed = response.custom(&Vec3Converter)?;
        let acceleration = response.custom(&Vec3Converter)?;

        // Only the first NODE_MAX_LINKS references are on the wire; a larger
        // declared count is kept in `link_count` but not read.
        let stored = (link_count as usize).min(NODE_MAX_LINKS);
        if stored < link_count as usize {
            tracing::debug!(id, link_count, "node declares more links than the cap");
        }
        let links = (0..stored)
            .map(|_| response.short())
            .collect::<ProtocolResult<Vec<_>>>()?;

        Ok(Self {
            id,
            kind,
            link_count,
            position,
            speed,
            acceleration,
            links,
        })
    }
}

impl Link {
    fn decode(response: &mut Response<'_>) -> ProtocolResult<Self> {
        let id = response.int()?;
        let material = response.int()?;
        let length = response.double()?;
        let long_stress = response.double()?;
        let rot_stress = response.double()?;
        let mut nodes = [0u16; LINK_NODE_SLOTS];
        for slot in &mut nodes {
            *slot = response.short()?;
        }
        Ok(Self {
            id,
            material,
            length,
            long_stress,
            rot_stress,
            nodes,
        })
    }
}
