/// Example program to print the loaded configuration
///
/// Run with: cargo run -p rune-config --example print_config

fn main() {
    // Load configuration from rune.toml, then apply RUNE_* overrides
    let config = rune_config::RuneConfig::load();

    println!("=== Rune Keyframes Configuration ===\n");

    println!("Animation Settings:");
    println!("  Name Prefix: {}", config.animations.name_prefix);
    println!("  Name Space: {}", config.animations.name_space);
    println!("  Unique Names: {}", config.animations.unique_names);
    println!("  Fallback Prefix: {}", config.animations.fallback_prefix);
    println!();

    println!("Stylesheet Host Settings:");
    println!("  Standard @keyframes: {}", config.cssom.standard_keyframes);
    println!("  Max Import Depth: {}", config.cssom.max_import_depth);
    println!();

    match toml::to_string_pretty(&config) {
        Ok(toml_str) => {
            println!("=== Serialized Configuration ===");
            println!("{}", toml_str);
        }
        Err(e) => {
            eprintln!("Failed to serialize config: {}", e);
        }
    }
}
