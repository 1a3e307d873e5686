use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use outpost::board::Board;
use outpost::logger::init_logging;
use outpost::moves::execute::{generate_legal, make_move, unmake_move};
use outpost::moves::magic::loader::magic_tables;
use outpost::moves::perft::{PerftCounters, perft, perft_with_breakdown};
use outpost::moves::types::MoveList;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about = "Perft harness over the outpost move generator")]
struct Args {
    /// Position to search from; FEN or the `startpos` sentinel.
    #[arg(short, long, default_value = "startpos")]
    fen: String,
    /// Leaf depth.
    #[arg(short, long, default_value_t = 5)]
    depth: u32,
    /// Print per-root-move node counts.
    #[arg(long, default_value_t = false)]
    divide: bool,
    /// Print the classified breakdown (captures, checks, mates, ...).
    #[arg(long, default_value_t = false)]
    stats: bool,
    /// Optional log file; enables tracing output.
    #[arg(long)]
    log: Option<String>,
}

fn main() {
    let args = Args::parse();

    if let Some(path) = &args.log {
        init_logging(path, "outpost::moves::perft=debug,info");
    }

    let tables = magic_tables();

    let mut board = Board::new();
    if let Err(err) = board.set_fen(&args.fen) {
        eprintln!("bad position '{}': {err}", args.fen);
        std::process::exit(1);
    }
    board.keep_repetitions = false;

    println!("position: {board}");
    println!("depth:    {}", args.depth);

    if args.stats {
        let mut counters = PerftCounters::zero();
        let start = Instant::now();
        perft_with_breakdown(&mut board, tables, args.depth, &mut counters);
        let elapsed = start.elapsed();

        println!("nodes:            {}", counters.nodes);
        println!("captures:         {}", counters.captures);
        println!("en passant:       {}", counters.ep_captures);
        println!("castles:          {}", counters.castles);
        println!("promotions:       {}", counters.promotions);
        println!("checks:           {}", counters.checks);
        println!("discovery checks: {}", counters.discovery_checks);
        println!("double checks:    {}", counters.double_checks);
        println!("checkmates:       {}", counters.checkmates);
        report_speed(counters.nodes, elapsed);
        return;
    }

    if args.depth == 0 {
        println!("total: 1");
        return;
    }

    // Split on the root moves so the bar ticks per subtree, divide or not.
    let mut roots = MoveList::new();
    let mut scratch = MoveList::new();
    generate_legal(&mut board, tables, &mut roots, &mut scratch);

    let bar = ProgressBar::new(roots.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .expect("valid progress template"),
    );

    let start = Instant::now();
    let mut total = 0u64;
    let mut rows = Vec::with_capacity(roots.len());

    for &mv in roots.iter() {
        bar.set_message(mv.to_uci());
        let undo = make_move(&mut board, mv);
        let nodes = if args.depth <= 1 {
            1
        } else {
            perft(&mut board, tables, args.depth - 1)
        };
        unmake_move(&mut board, mv, undo);
        total += nodes;
        rows.push((mv, nodes));
        bar.inc(1);
    }
    bar.finish_and_clear();
    let elapsed = start.elapsed();

    if args.divide {
        for (mv, nodes) in &rows {
            println!("{mv}: {nodes}");
        }
    }
    println!("total: {total}");
    report_speed(total, elapsed);
}

fn report_speed(nodes: u64, elapsed: std::time::Duration) {
    let secs = elapsed.as_secs_f64().max(1e-9);
    println!(
        "time:  {:.3}s ({:.2} Mnps)",
        secs,
        nodes as f64 / secs / 1_000_000.0
    );
}
