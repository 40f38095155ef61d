//! Quick search performance test

use life_search::{
    SearchEngine,
    schema::{EvolutionConfig, SearchConfig},
};
use std::time::Instant;

fn main() {
    println!("=== Batch Search Performance Test ===\n");

    // Test different board sizes
    for board_size in [4, 5, 6, 8] {
        println!("Board size: {}x{}", board_size, board_size);

        let config = SearchConfig {
            board_size,
            trial_count: 2000,
            max_ticks: 2000,
            random_seed: Some(42),
            diagnostics_interval: 0,
            ..Default::default()
        };

        let start = Instant::now();
        let mut engine = match SearchEngine::new(config) {
            Ok(engine) => engine,
            Err(e) => {
                eprintln!("Error: {}", e);
                return;
            }
        };
        let trials = match engine.run() {
            Ok(trials) => trials,
            Err(e) => {
                eprintln!("Error: {}", e);
                return;
            }
        };
        let elapsed = start.elapsed();
        let cache = engine.cache().stats();

        println!("  Trials:         {}", trials.len());
        println!("  Elapsed:        {:.2}s", elapsed.as_secs_f64());
        println!(
            "  Trials/sec:     {:.1}",
            trials.len() as f64 / elapsed.as_secs_f64()
        );
        println!(
            "  Best ticks:     {}",
            trials.first().map_or(0, |t| t.survival_ticks())
        );
        println!("  Cache states:   {}", cache.entries);
        println!("  Cache hit rate: {:.1}%", cache.hit_rate() * 100.0);
        println!("  Ticks saved:    {}", cache.ticks_saved);
        println!();
    }

    println!("=== Evolution Scalability Test (5x5 boards) ===\n");

    // Test different population sizes
    for population_size in [50, 100, 200, 400] {
        let config = SearchConfig {
            max_ticks: 1000,
            random_seed: Some(42),
            diagnostics_interval: 0,
            evolution: EvolutionConfig {
                population_size,
                max_generations: 5,
                ..Default::default()
            },
            ..Default::default()
        };

        let start = Instant::now();
        let result = SearchEngine::new(config).and_then(|mut engine| engine.run_evolution());
        let elapsed = start.elapsed();

        match result {
            Ok(result) => println!(
                "Population {}: {} evals in {:.2}s ({:.1} evals/sec), {} generations, stopped {:?}",
                population_size,
                result.stats.total_evaluations,
                elapsed.as_secs_f64(),
                result.stats.total_evaluations as f64 / elapsed.as_secs_f64(),
                result.stats.generations,
                result.stats.stop_reason
            ),
            Err(e) => eprintln!("Population {}: {}", population_size, e),
        }
    }
}
