//! Headless driver for attrgraph-core: builds a small demo graph, prints
//! its structure as a dot description, and optionally replays a write to
//! show incremental recomputation — useful for scripted checks and CI
//! without a real client embedding the library.

use attrgraph_core::Graph;
use clap::{Parser, Subcommand};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Parser)]
#[command(name = "attrgraph-cli", version, about = "Debug driver for incremental attribute graphs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the demo layout graph (width/height -> area -> frame) and
    /// print its structure as a dot description.
    Dot {
        #[arg(long, default_value_t = 200)]
        width: i64,
        #[arg(long, default_value_t = 100)]
        height: i64,
    },
    /// Build the demo graph, read the frame once, write a new width, read
    /// it again, and print the observer trace produced along the way.
    Trace {
        #[arg(long, default_value_t = 200)]
        width: i64,
        #[arg(long, default_value_t = 100)]
        height: i64,
        #[arg(long)]
        set_width: i64,
    },
}

fn build_demo_graph(width: i64, height: i64) -> (Graph, attrgraph_core::Node<i64>, attrgraph_core::Node<String>) {
    let graph = Graph::new();
    let w = graph.create_input("width", width);
    let h = graph.create_input("height", height);
    let (w1, h1) = (w.clone(), h.clone());
    let area = graph.create_rule("area", move || w1.read() * h1.read());
    let (w2, h2, area_for_frame) = (w.clone(), h.clone(), area.clone());
    let frame = graph.create_rule("frame", move || {
        format!("{}x{} area={}", w2.read(), h2.read(), area_for_frame.read())
    });
    (graph, w, frame)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Dot { width, height } => {
            let (graph, _width, frame) = build_demo_graph(width, height);
            frame.read();
            print!("{}", graph.snapshot().render_dot());
        }
        Command::Trace { width, height, set_width } => {
            let (graph, width_node, frame) = build_demo_graph(width, height);
            let log = Rc::new(RefCell::new(Vec::new()));
            let log_clone = Rc::clone(&log);
            graph.set_observer(move |label, _graph| {
                tracing::info!(label = %label, "observer notification");
                log_clone.borrow_mut().push(label.to_string());
            });

            let before = frame.read();
            width_node.write(set_width).unwrap();
            let after = frame.read();

            println!("before: {before}");
            println!("after:  {after}");
            println!("--- observer trace ---");
            for label in log.borrow().iter() {
                println!("{label}");
            }
        }
    }
}
