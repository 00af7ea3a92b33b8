//! Ordinary least squares with an intercept term.
//!
//! Solves the normal equations `(X'X) b = X'y` with a Cholesky factorization
//! and reports classical standard errors from `s² (X'X)^-1`.

use ndarray::{Array1, Array2, ArrayView1};
use serde::Serialize;

use crate::error::RegressionError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coefficient {
    pub name: String,
    pub estimate: f64,
    /// Absent when there are no residual degrees of freedom.
    pub std_error: Option<f64>,
    pub t_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OlsFit {
    pub response: String,
    pub intercept: Coefficient,
    pub coefficients: Vec<Coefficient>,
    pub r_squared: f64,
    pub observations: usize,
    pub residual_dof: usize,
}

impl OlsFit {
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.coefficients
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.estimate)
    }

    pub fn predict(&self, regressors: &[f64]) -> f64 {
        self.intercept.estimate
            + self
                .coefficients
                .iter()
                .zip(regressors)
                .map(|(c, x)| c.estimate * x)
                .sum::<f64>()
    }

    /// Coefficient table in the usual regression-summary layout.
    pub fn summary(&self) -> String {
        let fmt_opt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.4}"));

        let mut s = format!(
            "OLS: {} ~ {}\n",
            self.response,
            std::iter::once("intercept")
                .chain(self.coefficients.iter().map(|c| c.name.as_str()))
                .collect::<Vec<_>>()
                .join(" + ")
        );
        s.push_str(&format!(
            "{:20} {:>14} {:>12} {:>10}\n",
            "", "coef", "std err", "t"
        ));
        for c in std::iter::once(&self.intercept).chain(&self.coefficients) {
            s.push_str(&format!(
                "{:20} {:>14.4} {:>12} {:>10}\n",
                c.name,
                c.estimate,
                fmt_opt(c.std_error),
                fmt_opt(c.t_value)
            ));
        }
        s.push_str(&format!(
            "R-squared: {:.4}  observations: {}  residual dof: {}\n",
            self.r_squared, self.observations, self.residual_dof
        ));
        s
    }
}

/// Fits `response ~ intercept + regressors`.
pub fn fit_ols(
    response: (&str, &[f64]),
    regressors: &[(&str, &[f64])],
) -> Result<OlsFit, RegressionError> {
    let (response_name, y) = response;
    let n = y.len();
    let k = regressors.len() + 1;

    for (name, xs) in regressors {
        if xs.len() != n {
            return Err(RegressionError::DimensionMismatch {
                name: name.to_string(),
                expected: n,
                got: xs.len(),
            });
        }
    }
    if n < k {
        return Err(RegressionError::TooFewObservations { needed: k, got: n });
    }

    // Design matrix: a column of ones, then one column per regressor
    let x = Array2::from_shape_fn((n, k), |(i, j)| {
        if j == 0 { 1.0 } else { regressors[j - 1].1[i] }
    });
    let y = ArrayView1::from(y);

    let xt = x.t();
    let xtx = xt.dot(&x);
    let xty = xt.dot(&y);

    let l = cholesky(&xtx)?;
    let beta = cholesky_solve(&l, &xty);

    let residuals = &y - &x.dot(&beta);
    let ss_res = residuals.dot(&residuals);
    let y_mean = y.mean().unwrap_or(0.0);
    let ss_tot = y.mapv(|v| (v - y_mean).powi(2)).sum();
    let r_squared = if ss_tot == 0.0 {
        0.0
    } else {
        1.0 - ss_res / ss_tot
    };

    let residual_dof = n - k;
    let std_errors: Vec<Option<f64>> = if residual_dof == 0 {
        vec![None; k]
    } else {
        let sigma2 = ss_res / residual_dof as f64;
        (0..k)
            .map(|j| {
                // j-th diagonal entry of (X'X)^-1
                let mut unit = Array1::zeros(k);
                unit[j] = 1.0;
                let inv_jj = cholesky_solve(&l, &unit)[j];
                Some((sigma2 * inv_jj).sqrt())
            })
            .collect()
    };

    let coefficient = |name: &str, j: usize| {
        let std_error = std_errors[j];
        Coefficient {
            name: name.to_string(),
            estimate: beta[j],
            std_error,
            t_value: std_error.filter(|se| *se > 0.0).map(|se| beta[j] / se),
        }
    };

    Ok(OlsFit {
        response: response_name.to_string(),
        intercept: coefficient("intercept", 0),
        coefficients: regressors
            .iter()
            .enumerate()
            .map(|(j, (name, _))| coefficient(*name, j + 1))
            .collect(),
        r_squared,
        observations: n,
        residual_dof,
    })
}

/// Lower-triangular `L` with `a = L L'`, for symmetric positive definite `a`.
fn cholesky(a: &Array2<f64>) -> Result<Array2<f64>, RegressionError> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
            if i == j {
                let diag = a[[i, i]] - sum;
                // relative threshold: collinear columns leave rounding noise here
                if diag <= a[[i, i]].abs() * 1e-12 {
                    return Err(RegressionError::SingularMatrix);
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    Ok(l)
}

/// Solves `L L' x = b` by forward then backward substitution.
fn cholesky_solve(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = l.nrows();

    // L z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let sum: f64 = (0..i).map(|j| l[[i, j]] * z[j]).sum();
        z[i] = (b[i] - sum) / l[[i, i]];
    }

    // L' x = z
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|j| l[[j, i]] * x[j]).sum();
        x[i] = (z[i] - sum) / l[[i, i]];
    }

    x
}
