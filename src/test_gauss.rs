use crate::gauss::EstimatedGauss;
use nearly_eq::assert_nearly_eq;

#[test]
fn test_converges_to_constant_observation() {
    let mut gauss = EstimatedGauss::new();
    for _ in 0..100 {
        gauss.update(250.0);
    }
    assert_nearly_eq!(gauss.mean(), 250.0, 1.0);
    // Constant observations drive the spread onto its floor.
    assert_nearly_eq!(gauss.sigma(), 1.0, 1e-2);
}

#[test]
fn test_first_update_dominated_by_observation() {
    // Large initial process noise: the first observation takes over.
    let mut gauss = EstimatedGauss::new();
    gauss.update(100.0);
    assert!(gauss.mean() > 99.0);
}

#[test]
fn test_keeps_adapting_after_many_updates() {
    let mut gauss = EstimatedGauss::new();
    for _ in 0..1000 {
        gauss.update(10.0);
    }
    let settled = gauss.mean();

    // The gain floor keeps the estimator from freezing.
    for _ in 0..5000 {
        gauss.update(200.0);
    }
    assert!(gauss.mean() > settled + 50.0);
}

#[test]
fn test_set_values() {
    let mut gauss = EstimatedGauss::new();
    gauss.set_values(-1024.0, 73.9);
    assert_nearly_eq!(gauss.mean(), -1024.0);
    assert_nearly_eq!(gauss.sigma(), 73.9);
}

#[test]
fn test_sigma_floor() {
    let mut gauss = EstimatedGauss::with_noise(1000.0, 0.01, 1000.0, 0.01);
    gauss.set_values(5.0, 0.0);
    gauss.update(5.0);
    assert!(gauss.sigma() >= 1.0);
}
