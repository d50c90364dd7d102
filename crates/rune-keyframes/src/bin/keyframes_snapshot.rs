use anyhow::{Context, Result, bail};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rune_config::RuneConfig;
use rune_cssom::{Document, HostFeatures, ResourceOrigin};
use rune_keyframes::AnimationRegistry;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        eprintln!(
            "Usage: cargo run -p rune-keyframes --bin keyframes_snapshot <css-file> ... [--resource <href>=<path>] [--cross-origin <path>]"
        );
        bail!("missing <css-file>");
    }

    let config = RuneConfig::load();
    let mut document = Document::with_features(HostFeatures::from_config(&config.cssom));

    // Resources first so inline sheets can @import them
    let mut inline: Vec<PathBuf> = Vec::new();
    let mut cross_origin: Vec<String> = Vec::new();
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--resource" => {
                let Some(entry) = args.get(i + 1) else {
                    bail!("--resource expects <href>=<path>");
                };
                let Some((href, path)) = entry.split_once('=') else {
                    bail!("--resource expects <href>=<path>, got `{}`", entry);
                };
                let css = read_css(Path::new(path))?;
                document.register_resource(href, css, ResourceOrigin::SameOrigin);
                i += 2;
            }
            "--cross-origin" => {
                let Some(path) = args.get(i + 1) else {
                    bail!("--cross-origin expects a path");
                };
                let css = read_css(Path::new(path))?;
                document.register_resource(path.as_str(), css, ResourceOrigin::CrossOrigin);
                cross_origin.push(path.clone());
                i += 2;
            }
            other => {
                inline.push(PathBuf::from(other));
                i += 1;
            }
        }
    }

    for path in &inline {
        let css = read_css(path)?;
        document.add_style_sheet(&css);
    }
    for href in &cross_origin {
        document
            .link_style_sheet(href)
            .with_context(|| format!("failed to link {}", href))?;
    }

    let registry = AnimationRegistry::initialize(document.into_ref(), config.animations);
    let snapshot = registry.snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn read_css(path: &Path) -> Result<String> {
    if !path.exists() {
        bail!("input file not found: {}", path.display());
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
