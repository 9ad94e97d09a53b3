//! Example: load and render an STL file in the terminal
//!
//! Usage: cargo run --example view_stl -- path/to/file.stl

use std::env;
use std::fs;

use anyhow::{Context, Result};
use sr3d_core::{stl, Mesh};
use sr3d_terminal::TerminalApp;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mesh = if let Some(path) = args.get(1) {
        let data = fs::read(path).with_context(|| format!("failed to read {path}"))?;
        let mesh = stl::parse_stl(&data).with_context(|| format!("failed to parse {path}"))?;
        println!("Loaded {} faces from {path}", mesh.face_count());
        mesh
    } else {
        eprintln!("Usage: view_stl <stl-file>");
        eprintln!("\nNo STL file provided, using default cube...");
        Mesh::cube(2.0)
    };

    println!("Starting terminal renderer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(mesh)?;
    app.run()
}
