//! Life Search CLI - Find long-lived Game of Life seeds.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::path::PathBuf;
use std::time::Instant;

use life_search::{
    compute::evolution::{SearchEngine, render_report, summarize, top_trials},
    schema::SearchConfig,
};

struct Args {
    config_path: Option<PathBuf>,
    size: Option<usize>,
    count: Option<usize>,
    evolve: bool,
    json: bool,
}

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let argv: Vec<String> = std::env::args().collect();

    if argv.iter().any(|a| a == "--example") {
        print_example_config();
        return;
    }
    if argv.iter().any(|a| a == "--help" || a == "-h") {
        print_usage(&argv[0]);
        return;
    }

    let args = parse_args(&argv).unwrap_or_else(|e| {
        eprintln!("{}", e);
        eprintln!();
        print_usage(&argv[0]);
        std::process::exit(1);
    });

    // Load configuration
    let mut config = match &args.config_path {
        Some(path) => SearchConfig::from_json_file(path).unwrap_or_else(|e| {
            eprintln!("Error loading config {}: {}", path.display(), e);
            std::process::exit(1);
        }),
        None => SearchConfig::default(),
    };
    if let Some(size) = args.size {
        config.board_size = size;
    }
    if let Some(count) = args.count {
        config.trial_count = count;
    }
    let report_top = config.report_top;

    let mut engine = SearchEngine::new(config).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if args.evolve {
        run_evolution(&mut engine);
    } else {
        run_batch(&mut engine, report_top, args.json);
    }
}

fn run_batch(engine: &mut SearchEngine, report_top: usize, json: bool) {
    let config = engine.config();
    println!(
        "Creating {} boards of size {}x{} ({} tick budget)",
        config.trial_count, config.board_size, config.board_size, config.max_ticks
    );

    let start = Instant::now();
    let trials = engine.run().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let elapsed = start.elapsed();

    if json {
        match serde_json::to_string_pretty(&summarize(&trials, report_top)) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error serializing results: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print!("{}", render_report(&top_trials(&trials, report_top)));
    }

    let cache = engine.cache().stats();
    println!();
    println!(
        "Evaluated {} boards in {:.2}s ({:.1} boards/s)",
        trials.len(),
        elapsed.as_secs_f64(),
        trials.len() as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    println!(
        "Cache: {} states, {:.1}% hit rate, {} ticks saved",
        cache.entries,
        cache.hit_rate() * 100.0,
        cache.ticks_saved
    );
}

fn run_evolution(engine: &mut SearchEngine) {
    let config = engine.config();
    println!("Life Search Evolution");
    println!("=====================");
    println!(
        "Population: {} boards of size {}x{}",
        config.evolution.population_size, config.board_size, config.board_size
    );
    println!("Generations: {}", config.evolution.max_generations);
    println!("Tick budget: {}", config.max_ticks);
    println!("Mutation fraction: {}", config.evolution.mutation_fraction);
    println!();

    let result = engine
        .run_evolution_with_callback(|generation| {
            println!(
                "  Generation {}: {}/{} survived, best={}, avg={:.1}, children={}",
                generation.generation,
                generation.survivors,
                generation.population,
                generation.best_tick,
                generation.average_tick,
                generation.children
            );
        })
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    let stats = &result.stats;
    println!();
    println!("Stopped: {:?}", stats.stop_reason);
    println!("Generations: {}", stats.generations);
    println!(
        "Evaluations: {} in {:.2}s ({:.1}/s)",
        stats.total_evaluations, stats.elapsed_seconds, stats.evaluations_per_second
    );
    println!(
        "Cache: {} states, {:.1}% hit rate",
        stats.cache.entries,
        stats.cache.hit_rate() * 100.0
    );

    if let Some(best) = &result.best {
        println!();
        println!("Best board ({} ticks):", best.survival_ticks());
        print!("{}", best.seed);
    }
}

fn parse_args(argv: &[String]) -> Result<Args, String> {
    let mut args = Args {
        config_path: None,
        size: None,
        count: None,
        evolve: false,
        json: false,
    };
    let mut positional = Vec::new();

    let mut iter = argv.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().ok_or("--config requires a path")?;
                args.config_path = Some(PathBuf::from(path));
            }
            "--evolve" => args.evolve = true,
            "--json" => args.json = true,
            flag if flag.starts_with("--") => return Err(format!("Unknown option: {}", flag)),
            value => positional.push(value),
        }
    }

    match positional.as_slice() {
        [] => {}
        [size] => args.size = Some(parse_count(size, "size")?),
        [size, count] => {
            args.size = Some(parse_count(size, "size")?);
            args.count = Some(parse_count(count, "count")?);
        }
        _ => return Err("Too many arguments".to_string()),
    }

    Ok(args)
}

fn parse_count(value: &str, name: &str) -> Result<usize, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid {}: {}", name, value))
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [size] [count] [--config <config.json>] [--evolve] [--json]", program);
    eprintln!();
    eprintln!("Search random Game of Life seeds for the longest survival time.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  size         Side length of seed boards (default: 5)");
    eprintln!("  count        Number of boards to evaluate (default: 10000)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config     Load settings from a JSON file");
    eprintln!("  --evolve     Run the generational search instead of a single batch");
    eprintln!("  --json       Print the ranked boards as JSON");
    eprintln!("  --example    Print the default configuration");
}

fn print_example_config() {
    match serde_json::to_string_pretty(&SearchConfig::default()) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing config: {}", e);
            std::process::exit(1);
        }
    }
}
