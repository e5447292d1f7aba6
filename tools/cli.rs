use std::fs;
use std::path::{Path, PathBuf};

use arancio::{DEFAULT_CODE, HtmlRenderer, Options, Registry};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// The simplified decorations as JSON
    Decorations,
    /// `<span>` markup
    Html,
}

/// Highlights a source file with the builtin languages
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// File to highlight
    input: Option<PathBuf>,

    /// Language of the file. Defaults to the file extension.
    #[arg(short, long)]
    lang: Option<String>,

    #[arg(short, long, value_enum, default_value_t = Format::Decorations)]
    format: Format,

    /// Prefix of the CSS classes in the HTML output
    #[arg(long, default_value = "")]
    class_prefix: String,

    /// Numbers the lines of the HTML output, starting at the given number
    #[arg(long)]
    line_numbers: Option<isize>,

    /// Extra JSON language definitions to register before the builtin ones
    #[arg(long = "language-file")]
    language_files: Vec<PathBuf>,

    /// Prints the known languages and exits
    #[arg(long)]
    list_languages: bool,
}

fn language_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or(DEFAULT_CODE)
        .to_owned()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut registry = Registry::default();
    for path in &cli.language_files {
        registry.register_from_path(path)?;
    }
    registry.register_builtins()?;
    registry.freeze();

    if cli.list_languages {
        for name in registry.languages() {
            println!("{name}");
        }
        return Ok(());
    }

    let Some(input) = cli.input else {
        return Err("an input file is required".into());
    };
    let source = fs::read_to_string(&input)?;
    let lang = cli.lang.unwrap_or_else(|| language_of(&input));
    let decorations = registry.scan(&lang, &source, 0)?;

    match cli.format {
        Format::Decorations => println!("{}", serde_json::to_string_pretty(&decorations)?),
        Format::Html => {
            let renderer = HtmlRenderer::new(cli.class_prefix);
            let options = match cli.line_numbers {
                Some(start) => Options::default().line_numbers(start),
                None => Options::default(),
            };
            println!("{}", renderer.render(&lang, &source, &decorations, &options));
        }
    }

    Ok(())
}
