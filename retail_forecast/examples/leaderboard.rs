use retail_data::sample::{generate, SampleConfig};
use retail_data::merge;
use retail_forecast::evaluate::{leaderboard, write_leaderboard_csv, EvaluateConfig};
use retail_forecast::models::random_forest::ForestConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Retail Forecast: Leaderboard Example");
    println!("====================================\n");

    let data = generate(&SampleConfig {
        stores: 3,
        depts_per_store: 2,
        ..SampleConfig::default()
    })?;
    let records = merge(&data.sales, &data.market, &data.stores)?;

    println!("Scoring models on an 8-week holdout...\n");
    let config = EvaluateConfig {
        top_series: 5,
        forest: ForestConfig {
            trees: 100,
            max_depth: Some(10),
            ..ForestConfig::default()
        },
        ..EvaluateConfig::default()
    };
    let rows = leaderboard(&records, &config)?;

    println!(
        "{:<28} {:<22} {:>6} {:>12} {:>12}  notes",
        "model", "scope", "rows", "MAE", "WMAE"
    );
    for row in &rows {
        println!(
            "{:<28} {:<22} {:>6} {:>12.2} {:>12.2}  {}",
            row.model, row.scope, row.rows, row.mae, row.wmae, row.notes
        );
    }

    let out = std::env::temp_dir().join("retail_forecast_leaderboard.csv");
    write_leaderboard_csv(&out, &rows)?;
    println!("\nLeaderboard written to {}", out.display());
    Ok(())
}
