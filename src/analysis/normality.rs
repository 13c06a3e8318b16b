//! Normal distribution helpers and the Shapiro-Wilk test
//!
//! Coefficients and the p-value approximation follow Royston (1995),
//! Algorithm AS R94.

use serde::Serialize;
use statrs::function::erf::{erfc, erfc_inv};
use std::f64::consts::{FRAC_1_SQRT_2, PI, SQRT_2};

/// Largest sample the approximation is valid for
pub const SHAPIRO_WILK_MAX_N: usize = 5000;

/// Smallest sample the test is defined for
pub const SHAPIRO_WILK_MIN_N: usize = 3;

const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.5440, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const G: [f64; 2] = [-2.273, 0.459];

/// Standard normal CDF
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z * FRAC_1_SQRT_2)
}

/// Standard normal quantile, `p` in (0, 1)
pub fn normal_ppf(p: f64) -> f64 {
    -SQRT_2 * erfc_inv(2.0 * p)
}

/// Shapiro-Wilk statistic and p-value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalityTest {
    pub statistic: f64,
    pub p_value: f64,
}

impl NormalityTest {
    /// Normal at the 5% level
    pub fn is_normal(&self) -> bool {
        self.p_value > 0.05
    }
}

/// Run the test; `None` outside 3..=5000 values or when all values are equal
pub fn shapiro_wilk(values: &[f64]) -> Option<NormalityTest> {
    let n = values.len();
    if !(SHAPIRO_WILK_MIN_N..=SHAPIRO_WILK_MAX_N).contains(&n) {
        return None;
    }

    let x = super::sorted(values);
    let mean = super::mean(&x);
    let ssq: f64 = x.iter().map(|v| (v - mean).powi(2)).sum();
    if ssq <= 0.0 || x[n - 1] - x[0] <= 0.0 {
        return None;
    }

    let a = coefficients(n);
    let half = n / 2;
    let numerator: f64 = (0..half).map(|i| a[i] * (x[n - 1 - i] - x[i])).sum();
    let w = (numerator * numerator / ssq).min(1.0);

    Some(NormalityTest {
        statistic: w,
        p_value: p_value(w, n),
    })
}

/// Antisymmetric weights for the upper half, largest first
fn coefficients(n: usize) -> Vec<f64> {
    let half = n / 2;
    if n == 3 {
        return vec![FRAC_1_SQRT_2];
    }

    let an25 = n as f64 + 0.25;
    let m: Vec<f64> = (1..=half)
        .map(|i| normal_ppf((i as f64 - 0.375) / an25))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / (n as f64).sqrt();

    let a1 = poly(&C1, rsn) - m[0] / ssumm2;
    let mut a = vec![0.0; half];
    a[0] = a1;

    let (first, fac) = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        a[1] = a2;
        let fac = ((summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1])
            / (1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2))
            .sqrt();
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * m[0] * m[0]) / (1.0 - 2.0 * a1 * a1)).sqrt();
        (1, fac)
    };

    for i in first..half {
        a[i] = -m[i] / fac;
    }
    a
}

fn p_value(w: f64, n: usize) -> f64 {
    if w >= 1.0 {
        return 1.0;
    }

    if n == 3 {
        let stqr = (0.75f64).sqrt().asin();
        return (6.0 / PI * (w.sqrt().asin() - stqr)).max(0.0);
    }

    let an = n as f64;
    let w1 = (1.0 - w).ln();
    let z = if n <= 11 {
        let gamma = poly(&G, an);
        if w1 >= gamma {
            return 0.0;
        }
        let y = -(gamma - w1).ln();
        let m = poly(&C3, an);
        let s = poly(&C4, an).exp();
        (y - m) / s
    } else {
        let ln_n = an.ln();
        let m = poly(&C5, ln_n);
        let s = poly(&C6, ln_n).exp();
        (w1 - m) / s
    };

    1.0 - normal_cdf(z)
}

/// c[0] + c[1] x + c[2] x^2 + ...
fn poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, coef| acc * x + coef)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_cdf_and_ppf() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-12);
        assert!((normal_cdf(1.96) - 0.975).abs() < 1e-4);
        assert!((normal_ppf(0.975) - 1.959964).abs() < 1e-5);
        assert!((normal_ppf(0.5)).abs() < 1e-12);
        assert!((normal_cdf(normal_ppf(0.1)) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_poly() {
        assert_eq!(poly(&[1.0, 2.0, 3.0], 2.0), 17.0);
    }

    #[test]
    fn test_three_evenly_spaced_values() {
        let result = shapiro_wilk(&[1.0, 2.0, 3.0]).unwrap();
        assert!((result.statistic - 1.0).abs() < 1e-9);
        assert!(result.p_value > 0.99);
    }

    #[test]
    fn test_normal_sample_is_normal() {
        let values: Vec<f64> = (1..=50)
            .map(|i| 10.0 + normal_ppf((i as f64 - 0.5) / 50.0))
            .collect();
        let result = shapiro_wilk(&values).unwrap();
        assert!(result.statistic > 0.98);
        assert!(result.is_normal());
    }

    #[test]
    fn test_heavily_skewed_sample_is_not_normal() {
        let mut values = vec![1.0; 15];
        values.extend([2.0, 3.0, 50.0, 100.0, 200.0]);
        let result = shapiro_wilk(&values).unwrap();
        assert!(result.statistic < 0.7);
        assert!(!result.is_normal());
    }

    #[test]
    fn test_reference_value_one_to_ten() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let result = shapiro_wilk(&values).unwrap();
        assert!((result.statistic - 0.9702).abs() < 1e-3);
        assert!((result.p_value - 0.8924).abs() < 1e-3);
    }

    #[test]
    fn test_small_sample_branch() {
        let result = shapiro_wilk(&[2.1, 2.4, 2.2, 2.9, 2.5, 2.3, 2.6]).unwrap();
        assert!(result.statistic > 0.0 && result.statistic <= 1.0);
        assert!((0.0..=1.0).contains(&result.p_value));
    }

    #[test]
    fn test_out_of_range_sizes() {
        assert!(shapiro_wilk(&[1.0, 2.0]).is_none());
        assert!(shapiro_wilk(&[4.0; 10]).is_none());
        assert!(shapiro_wilk(&vec![1.0; SHAPIRO_WILK_MAX_N + 1]).is_none());
    }

    #[test]
    fn test_varied_sample_above_limit_is_skipped() {
        let varied: Vec<f64> = (0..SHAPIRO_WILK_MAX_N + 1)
            .map(|i| 10.0 + (i % 97) as f64 * 0.01)
            .collect();
        assert!(shapiro_wilk(&varied).is_none());
        assert!(shapiro_wilk(&varied[..SHAPIRO_WILK_MAX_N]).is_some());
    }
}
