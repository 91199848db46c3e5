mod demo;

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tessera_light::AoMode;
use tessera_material::RenderLayer;
use tessera_render::{RendererConfig, SpriteAtlas};
use tessera_runtime::{SectionBuilder, SectionJob};

use crate::demo::{DemoWorld, SceneSettings};

#[derive(Parser, Debug)]
#[command(name = "tessera", version, about = "Tessellates a procedural block scene and reports mesh stats")]
struct Args {
    /// Renderer and scene settings (TOML).
    #[arg(long, default_value = "tessera.toml")]
    config: PathBuf,

    /// Overrides `ambient_occlusion_mode` from the config file.
    #[arg(long)]
    ao_mode: Option<AoMode>,

    /// Flat shading everywhere.
    #[arg(long)]
    no_ao: bool,

    /// Scene width in sections; overrides `[scene] sections`.
    #[arg(long)]
    sections: Option<i32>,

    /// Mesher threads; 0 picks one per core.
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Build the scene this many times.
    #[arg(long, default_value_t = 1)]
    repeat: u32,
}

fn load_scene(args: &Args) -> SceneSettings {
    let mut scene = match fs::read_to_string(&args.config) {
        Ok(s) => SceneSettings::from_toml_str(&s).unwrap_or_else(|err| {
            log::warn!("bad [scene] table: {err}; using defaults");
            SceneSettings::default()
        }),
        Err(_) => SceneSettings::default(),
    };
    if let Some(n) = args.sections {
        scene.sections = n;
    }
    scene.sections = scene.sections.max(1);
    scene
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = RendererConfig::load_or_default(&args.config);
    if let Some(mode) = args.ao_mode {
        config.ao_mode = mode;
    }
    if args.no_ao {
        config.ambient_occlusion = false;
    }
    let scene = load_scene(&args);
    log::info!(
        "ao {} (mode {}), culling {}, {}x{} sections",
        if config.ambient_occlusion { "on" } else { "off" },
        config.ao_mode,
        config.cull_faces,
        scene.sections,
        scene.sections
    );

    let atlas = Arc::new(SpriteAtlas::grid(4, 4));
    let models = demo::models(&atlas)?;
    let world = DemoWorld::new(scene);
    let builder = SectionBuilder::new(args.threads, config, atlas, Arc::new(models))?;

    let n = world.settings().sections;
    let top = (world.settings().ground + world.settings().hill_height as i32 + 1) / tessera_runtime::SECTION_SIZE;
    let mut jobs = Vec::new();
    for sx in 0..n {
        for sz in 0..n {
            for sy in 0..=top {
                jobs.push(SectionJob::at_section(sx, sy, sz));
            }
        }
    }

    for round in 0..args.repeat.max(1) {
        let t0 = Instant::now();
        let out = builder.build_sections(&world, &jobs);
        let elapsed = t0.elapsed();

        let mut per_layer = [0usize; RenderLayer::ALL.len()];
        let mut bytes = 0usize;
        let mut failed = 0usize;
        for section in &out {
            match &section.buffers {
                Ok(buffers) => {
                    for (layer, b) in buffers.iter() {
                        per_layer[layer.index()] += b.quad_count();
                        bytes += b.vertex_bytes().len();
                    }
                }
                Err(err) => {
                    failed += 1;
                    log::error!("{err}");
                }
            }
        }
        let slowest = out.iter().map(|s| s.t_ms).max().unwrap_or(0);
        println!(
            "round {round}: {} sections on {} threads in {:.1} ms (slowest {slowest} ms)",
            out.len(),
            builder.threads(),
            elapsed.as_secs_f64() * 1000.0
        );
        for layer in RenderLayer::ALL {
            println!("  {layer:?}: {} quads", per_layer[layer.index()]);
        }
        println!("  vertex data: {} KiB, {failed} failed", bytes / 1024);
    }
    Ok(())
}
