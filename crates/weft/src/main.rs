mod log;

use anyhow::{Context, bail};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use mimalloc::MiMalloc;
use weft_builder::Parse;
use weft_errors::Renderer;
use weft_tokenizer::kind_name;
use weft_tree::TreeView;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[command(name = "weft", about = "Inspect the syntax trees of weft files")]
enum Options {
    /// Print the syntax tree of a file.
    Dump {
        path: Utf8PathBuf,
        /// Build the flyweight tree instead of the heavyweight one.
        #[arg(long)]
        lighter: bool,
    },
    /// Report the syntax errors of a file.
    Check { path: Utf8PathBuf },
}

fn main() -> anyhow::Result<()> {
    log::init()?;

    match Options::parse() {
        Options::Dump { path, lighter } => {
            let text = read(&path)?;
            if lighter {
                dump(&weft_parse::module_lighter(&text)?);
            } else {
                dump(&weft_parse::module(&text)?);
            }
            Ok(())
        }
        Options::Check { path } => {
            let text = read(&path)?;
            let parse = weft_parse::module_lighter(&text)?;

            let renderer = Renderer::styled();
            for diagnostic in parse.errors() {
                eprintln!("{}", diagnostic.render(&renderer, path.as_str(), &text));
            }

            match parse.errors().len() {
                0 => Ok(()),
                1 => bail!("`{path}` has a syntax error"),
                count => bail!("`{path}` has {count} syntax errors"),
            }
        }
    }
}

fn read(path: &Utf8Path) -> anyhow::Result<String> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read `{path}`"))?;
    tracing::debug!(%path, len = text.len(), "read source");
    Ok(text)
}

fn dump<V: TreeView>(parse: &Parse<V>) {
    print!("{}", parse.tree().debug_dump(kind_name));
    for error in parse.errors() {
        println!("error@{:?}: {}", error.range(), error.message());
    }
}
