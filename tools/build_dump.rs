use std::env;
use std::fs;
use std::path::PathBuf;

use arancio::Registry;

/// Usage: build-dump [OUTPUT] [LANGUAGES_DIR]
///
/// Registers the JSON language definitions of LANGUAGES_DIR, if given, then the builtin
/// languages and dumps everything to OUTPUT.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let output = PathBuf::from(args.next().unwrap_or_else(|| "builtin.zst".to_owned()));
    let languages_dir = args.next().map(PathBuf::from);

    let mut registry = Registry::default();
    let mut language_count = 0;
    let mut language_errors = 0;

    if let Some(dir) = languages_dir {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension() != Some("json".as_ref()) {
                continue;
            }
            match registry.register_from_path(&path) {
                Ok(_) => language_count += 1,
                Err(e) => {
                    eprintln!("✗ Failed to load language {}: {}", path.display(), e);
                    language_errors += 1;
                }
            }
        }
    }

    registry.register_builtins()?;
    registry.freeze();

    println!("Languages:");
    for name in registry.languages() {
        println!("- {name}");
    }

    println!("\nSummary:");
    println!("- Successfully loaded: {} language files", language_count);
    println!("- Failed to load: {} language files", language_errors);
    println!("- Lexers: {}", registry.definitions().len());

    registry.dump_to_file(&output)?;
    let compressed_size = fs::metadata(&output)?.len();
    println!(
        "\n✓ Registry saved to {} ({:.2} KB)",
        output.display(),
        compressed_size as f64 / 1024.0
    );

    Ok(())
}
