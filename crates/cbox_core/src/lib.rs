//! Cornell Box Core - scene inputs consumed by the renderer.
//!
//! This crate provides the data the ray tracer receives from the outside world:
//!
//! - **Meshes**: vertex/normal/face arrays with 1-based face indices, loadable
//!   from Wavefront OBJ files
//! - **Textures**: width x height RGB float images, loadable from raster
//!   images or raw little-endian float streams
//!
//! # Example
//!
//! ```ignore
//! use cbox_core::{MeshData, Texture};
//!
//! let mug = MeshData::load_obj("meshes/mug.obj")?;
//! let stone = Texture::open("textures/stone.png")?;
//! println!("{} faces, {}x{} texture", mug.face_count(), stone.width, stone.height);
//! ```

pub mod mesh;
pub mod texture;

// Re-export commonly used types
pub use mesh::{Face, MeshData, MeshError, MeshResult};
pub use texture::{Texture, TextureError, TextureResult};
