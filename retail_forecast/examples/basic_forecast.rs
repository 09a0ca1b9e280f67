use retail_data::sample::{generate, SampleConfig};
use retail_data::{merge, SeriesKey};
use retail_forecast::features::FeatureConfig;
use retail_forecast::models::random_forest::ForestConfig;
use retail_forecast::pipeline::{
    forecast_series, train_global_forest, ForecastMode, ForecastRequest, TrainConfig,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Retail Forecast: Basic Forecasting Example");
    println!("==========================================\n");

    // Create sample data
    println!("Generating sample data...");
    let data = generate(&SampleConfig::default())?;
    let records = merge(&data.sales, &data.market, &data.stores)?;
    println!(
        "Merged {} rows across {} stores\n",
        records.len(),
        data.stores.len()
    );

    // Train the global model
    println!("Training the global forest...");
    let config = TrainConfig {
        forest: ForestConfig {
            trees: 100,
            max_depth: Some(10),
            ..ForestConfig::default()
        },
        ..TrainConfig::default()
    };
    let outcome = train_global_forest(&records, &config)?;
    println!(
        "Holdout: {} rows, MAE {:.2}, WMAE {:.2}\n",
        outcome.holdout_rows, outcome.holdout_mae, outcome.holdout_wmae
    );

    // Recursive forecast for one series
    let key = SeriesKey::new(1, 1);
    let horizon = 8;
    println!("Forecasting {key}, {horizon} weeks ahead:\n");
    let request = ForecastRequest {
        key,
        mode: ForecastMode::GlobalForest,
        horizon,
    };
    let forecast = forecast_series(
        &records,
        &request,
        Some(&outcome.artifacts),
        &FeatureConfig::default(),
    )?;

    let dates = forecast.dates().unwrap_or_default();
    for (date, value) in dates.iter().zip(forecast.values()) {
        println!("  {date}  {value:>10.2}");
    }

    // Compare against the seasonal-trend model on the same series
    println!("\nSeasonal-trend comparison:");
    let request = ForecastRequest {
        key,
        mode: ForecastMode::SeasonalTrend,
        horizon,
    };
    let trend = forecast_series(&records, &request, None, &FeatureConfig::default())?;
    for (date, value) in trend.dates().unwrap_or_default().iter().zip(trend.values()) {
        println!("  {date}  {value:>10.2}");
    }

    println!("\nForecast as JSON:\n{}", forecast.to_json()?);
    Ok(())
}
