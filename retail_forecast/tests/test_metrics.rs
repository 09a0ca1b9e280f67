use assert_approx_eq::assert_approx_eq;
use retail_forecast::metrics::{
    forecast_accuracy, mean_absolute_error, wmae,
};
use rstest::rstest;

#[test]
fn accuracy_on_a_known_forecast() {
    let actual = vec![100.0, 110.0, 120.0];
    let forecast = vec![90.0, 115.0, 120.0];

    let accuracy = forecast_accuracy(&forecast, &actual).unwrap();
    assert_approx_eq!(accuracy.mae, 5.0);
    assert_approx_eq!(accuracy.mse, (100.0 + 25.0 + 0.0) / 3.0);
    assert_approx_eq!(accuracy.rmse, accuracy.mse.sqrt());
    assert!(accuracy.mape > 0.0);
    assert!(accuracy.smape > 0.0);
}

#[test]
fn accuracy_display_is_printable() {
    let accuracy = forecast_accuracy(&[1.0, 2.0], &[1.0, 2.0]).unwrap();
    let text = format!("{accuracy}");
    assert!(text.contains("MAE"));
    assert!(text.contains("SMAPE"));
}

#[test]
fn mae_matches_hand_computation() {
    let value = mean_absolute_error(&[10.0, 20.0], &[12.0, 16.0]).unwrap();
    assert_approx_eq!(value, 3.0);
}

#[test]
fn wmae_weights_large_series_harder() {
    let actual = [100.0, 100.0];
    let forecast = [90.0, 90.0];
    // Equal errors, unequal weights: still 10 either way.
    assert_approx_eq!(wmae(&actual, &forecast, &[1.0, 3.0]).unwrap(), 10.0);

    // Unequal errors: the heavier row dominates.
    let skewed = wmae(&[100.0, 100.0], &[100.0, 90.0], &[1.0, 3.0]).unwrap();
    assert_approx_eq!(skewed, 30.0 / 4.0);
}

#[rstest]
#[case(&[], &[], &[])]
#[case(&[1.0], &[1.0, 2.0], &[1.0])]
#[case(&[1.0], &[1.0], &[1.0, 2.0])]
fn wmae_rejects_misaligned_input(
    #[case] actual: &[f64],
    #[case] forecast: &[f64],
    #[case] weights: &[f64],
) {
    assert!(wmae(actual, forecast, weights).is_err());
}

#[test]
fn wmae_rejects_zero_weights() {
    assert!(wmae(&[1.0], &[2.0], &[0.0]).is_err());
}

#[test]
fn accuracy_rejects_misaligned_input() {
    assert!(forecast_accuracy(&[1.0], &[1.0, 2.0]).is_err());
    assert!(forecast_accuracy(&[], &[]).is_err());
    assert!(mean_absolute_error(&[], &[]).is_err());
}
