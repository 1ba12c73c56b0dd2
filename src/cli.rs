/*!
dbplot Command Line Interface

Renders plot specs (JSON files) against a database and writes the resulting
figure with the selected writer.
*/

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use dbplot::writer::{self, Writer};
use dbplot::{FunctionRegistry, Plot, PlotConfig, Value, VERSION};

#[derive(Parser)]
#[command(name = "dbplot")]
#[command(about = "Turn database query results into plots")]
#[command(version = VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render one plot spec (or a directory of specs) against a database
    Render {
        /// Path to a plot spec JSON file, or a directory of *.json specs
        spec: PathBuf,

        /// Data source connection string
        #[arg(long, default_value = "sqlite://memory")]
        db: String,

        /// Positional query bind parameters as a JSON array, e.g. '[1, "Fe"]'
        #[arg(long)]
        binds: Option<String>,

        /// Output format
        #[arg(long, default_value = "json")]
        writer: String,

        /// Output file (single spec) or directory (directory of specs);
        /// stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate a plot spec without executing its query
    Validate {
        /// Path to the plot spec JSON file
        spec: PathBuf,
    },

    /// Show the style a legend label resolves to
    Style {
        /// The legend label
        label: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            spec,
            db,
            binds,
            writer,
            output,
        } => {
            let binds = parse_binds(binds.as_deref())?;
            let reader = dbplot::reader::open(&db)?;
            let writer = writer::open(&writer)?;
            let registry = FunctionRegistry::builtins();

            let specs = collect_specs(&spec)?;
            if specs.is_empty() {
                eprintln!("No plot specs found at {}", spec.display());
                std::process::exit(1);
            }

            for path in &specs {
                let config = PlotConfig::from_path(path)?;
                let plot = Plot::new(config, &registry)?;
                let figure = plot.render(reader.as_ref(), &binds)?;
                let rendered = writer.write(&figure)?;

                match &output {
                    None => println!("{}", rendered),
                    Some(out) if specs.len() == 1 && !out.is_dir() => {
                        std::fs::write(out, &rendered)?;
                        println!("Wrote {}", out.display());
                    }
                    Some(dir) => {
                        let stem = path
                            .file_stem()
                            .map(|s| s.to_string_lossy().into_owned())
                            .unwrap_or_else(|| "plot".to_string());
                        let out = dir.join(format!("{}.{}", stem, writer.extension()));
                        std::fs::create_dir_all(dir)?;
                        std::fs::write(&out, &rendered)?;
                        println!("Wrote {}", out.display());
                    }
                }
            }
        }

        Commands::Validate { spec } => {
            let config = PlotConfig::from_path(&spec)?;
            let registry = FunctionRegistry::builtins();
            match Plot::new(config, &registry) {
                Ok(plot) => {
                    println!("{} is a valid {:?} plot spec", spec.display(), plot.kind());
                }
                Err(e) => {
                    eprintln!("Invalid plot spec: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Style { label } => {
            let style = dbplot::style::resolve(&label);
            println!(
                "{}: pattern={:?} color={} marker={:?}",
                label, style.pattern, style.color, style.marker
            );
        }
    }

    Ok(())
}

/// A spec argument is either one JSON file or a directory of them.
fn collect_specs(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if path.is_dir() {
        let mut specs: Vec<PathBuf> = std::fs::read_dir(path)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.extension().map(|e| e == "json").unwrap_or(false))
            .collect();
        specs.sort();
        Ok(specs)
    } else {
        Ok(vec![path.to_path_buf()])
    }
}

fn parse_binds(binds: Option<&str>) -> anyhow::Result<Vec<Value>> {
    match binds {
        None => Ok(Vec::new()),
        Some(text) => {
            let parsed: serde_json::Value = serde_json::from_str(text)?;
            let items = match parsed {
                serde_json::Value::Array(items) => items,
                single => vec![single],
            };
            items
                .into_iter()
                .map(|v| match v {
                    serde_json::Value::Null => Ok(Value::Null),
                    serde_json::Value::Number(n) => Ok(Value::Number(
                        n.as_f64().ok_or_else(|| anyhow::anyhow!("bad number"))?,
                    )),
                    serde_json::Value::String(s) => Ok(Value::Text(s)),
                    serde_json::Value::Bool(b) => Ok(Value::Number(if b { 1.0 } else { 0.0 })),
                    other => Err(anyhow::anyhow!("unsupported bind value: {}", other)),
                })
                .collect()
        }
    }
}
