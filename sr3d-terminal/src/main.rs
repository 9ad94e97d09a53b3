//! SR3D Terminal Demo - rotating silhouette
//!
//! Renders an STL mesh (or a built-in cube) as a flat black silhouette.
//! Controls:
//!   - WASD / Arrow Keys: Rotate the mesh
//!   - E/R: Roll rotation
//!   - Q/ESC: Quit

use std::env;
use std::fs;

use anyhow::{Context, Result};
use sr3d_core::{stl, Mesh};
use sr3d_terminal::TerminalApp;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mesh = match args.get(1) {
        Some(path) => {
            let data = fs::read(path).with_context(|| format!("failed to read {path}"))?;
            stl::parse_stl(&data).with_context(|| format!("failed to parse {path}"))?
        }
        None => Mesh::cube(2.0),
    };

    log::info!(
        "mesh loaded: {} vertices, {} faces",
        mesh.verts.len(),
        mesh.faces.len()
    );

    let mut app = TerminalApp::new(mesh)?;
    app.run()
}
