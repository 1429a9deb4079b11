//! Responsive Layout CLI
//!
//! Usage:
//!   responsive-layout [OPTIONS] [FILE]
//!
//! Options:
//!   -w, --width <PX>         Viewport width; repeat to replay resizes
//!   --strategy <NAME>        Use one strategy at every breakpoint
//!   --format <FORMAT>        Output format: text or toml
//!   --lint                   Report layout defects on stderr
//!   --syntax                 Show constraint expression reference
//!   -v, --verbose            Increase log output (repeatable)
//!   -h, --help               Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use responsive_layout::layout::lint;
use responsive_layout::report::format_result;
use responsive_layout::{Scene, SceneLayout, StrategyKind};

#[derive(Parser)]
#[command(name = "responsive-layout")]
#[command(about = "Lay out boxes with breakpoint-selected packing strategies")]
struct Cli {
    /// Scene file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Viewport width; repeat to replay a sequence of resizes
    #[arg(short = 'w', long = "width", default_values_t = [1024.0])]
    widths: Vec<f64>,

    /// Use this strategy at every breakpoint (masonry, bin-grid, flow, constraint)
    #[arg(long)]
    strategy: Option<StrategyKind>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Report overflow, overlap and other layout defects on stderr
    #[arg(long)]
    lint: bool,

    /// Show constraint expression reference
    #[arg(long)]
    syntax: bool,

    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Toml,
}

fn main() {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    if cli.syntax {
        print_syntax();
        return;
    }

    // If no input file and stdin is a terminal (interactive), show intro help
    if cli.input.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let scene = match Scene::from_str(&source) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let scene = match cli.strategy {
        Some(kind) => match scene.with_strategy(kind) {
            Ok(scene) => scene,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => scene,
    };

    let mut manager = scene.manager();
    let mut transitions = Vec::new();
    for &width in &cli.widths {
        let update = manager.update(width);
        if update.changed {
            transitions.push(format!("breakpoint: {} at {}px", update.name, width));
        }
    }

    // default_values_t guarantees at least one width
    let width = cli.widths.last().copied().unwrap_or(1024.0);
    let envelope = scene.envelope_for(width);
    let result = match manager.layout(&scene.boxes, &envelope) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if cli.lint {
        for warning in lint::check(&result, &scene.boxes, &envelope) {
            eprintln!("warning: {}", warning);
        }
    }

    match cli.format {
        Format::Text => {
            for line in &transitions {
                println!("{}", line);
            }
            println!("{}", format_result(&result));
        }
        Format::Toml => {
            let layout = SceneLayout {
                breakpoint: manager.active().map(|bp| bp.name.clone()).unwrap_or_default(),
                strategy: manager
                    .strategy()
                    .map(|s| s.kind())
                    .unwrap_or(StrategyKind::Masonry),
                result,
            };
            match toml::to_string(&layout) {
                Ok(text) => print!("{}", text),
                Err(e) => {
                    eprintln!("Error serializing layout: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

/// Log to stderr; `RUST_LOG` wins over `-v`
fn setup_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "responsive_layout=warn",
            1 => "responsive_layout=debug",
            _ => "responsive_layout=trace",
        })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn print_intro() {
    println!(
        r#"Responsive Layout - box packing switched by viewport breakpoints

USAGE:
    responsive-layout [OPTIONS] [FILE]
    cat scene.toml | responsive-layout -w 800

OPTIONS:
    -w, --width        Viewport width (repeat to replay resizes)
    --strategy         Force masonry, bin-grid, flow or constraint
    --format           text (default) or toml
    --lint             Report layout defects on stderr
    --syntax           Constraint expression reference
    -v, --verbose      More log output
    -h, --help         Print help

QUICK START:
    printf '[[boxes]]\nid = "a"\nwidth = 100\nheight = 100\n' | responsive-layout -w 400

This lays out one box at a 400px viewport with the built-in breakpoints."#
    );
}

fn print_syntax() {
    println!(
        r#"CONSTRAINT EXPRESSIONS
======================

FORM
    box.attribute RELATION value [@ priority]

ATTRIBUTES
    left  right  top  bottom  width  height  center_x  center_y

RELATIONS
    =  ==      equality
    >=  <=     accepted, solved as equality

VALUES
    100                    constant
    a.width                another box's attribute
    a.width * 0.5          scaled attribute (also 0.5 * a.width)
    a.right + 8            attribute plus offset (also - 8)
    50 * 2                 scaled constant

PRIORITY
    @ 250                  whole number, default 1000; higher wins

SEPARATORS
    ;  or a new expression; // starts a comment

IDS
    Plain identifiers (letters, digits, _). Quote other ids: "hero-image".left
    Inside quotes, \" and \\ stand for " and \

UNSET ATTRIBUTES
    Read as 0, sizes included. With [layout] preferred_sizes = true an unset
    width or height reads as the box's preferred size.

EXAMPLES
    a.left = 0
    a.width = 100
    b.left = a.width + 10 @ 500
    b.top = a.bottom + 8; b.width = a.width * 0.5"#
    );
}
