//! L2-regularized logistic regression
//!
//! Minimizes `sum_i logloss(y_i, sigmoid(w.x_i + b)) + ||w||^2 / (2C)` with
//! L-BFGS. The intercept is not penalized. Optimization starts from zero and
//! uses no randomness, so the same data always yields the same model.

use crate::classifier::{check_training_data, LinearClassifier};
use crate::features::SparseVector;
use reviewsense_core::{ClassifierKind, ClassifierMetrics, Error, Result, Sentiment};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

const ARMIJO: f64 = 1e-4;
const MAX_LINE_SEARCH_STEPS: usize = 40;
const RELATIVE_FTOL: f64 = 1e-10;

/// Optimizer settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticRegressionParams {
    /// Inverse regularization strength
    pub c: f64,

    /// Maximum number of L-BFGS iterations
    pub max_iter: usize,

    /// Stop once the largest gradient component falls below this
    pub tolerance: f64,

    /// Number of curvature pairs kept by L-BFGS
    pub history: usize,
}

impl Default for LogisticRegressionParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            tolerance: 1e-4,
            history: 10,
        }
    }
}

/// Fitted binary logistic regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    coefficients: Vec<f64>,
    intercept: f64,
    #[serde(default)]
    iterations: usize,
    #[serde(default)]
    metrics: Option<ClassifierMetrics>,
}

impl LogisticRegression {
    /// Fit on TF-IDF rows and their labels
    pub fn fit(
        x: &[SparseVector],
        y: &[Sentiment],
        n_features: usize,
        params: &LogisticRegressionParams,
    ) -> Result<Self> {
        check_training_data(x, y, n_features)?;
        if params.c <= 0.0 {
            return Err(Error::classifier("regularization parameter C must be positive"));
        }
        if params.history == 0 {
            return Err(Error::classifier("L-BFGS history must keep at least one pair"));
        }

        let targets: Vec<f64> = y.iter().map(|s| s.class() as f64).collect();
        let objective = Objective {
            x,
            y: &targets,
            n_features,
            inv_c: 1.0 / params.c,
        };

        let (theta, iterations) = minimize(&objective, params);
        debug!(iterations, n_features, "logistic regression converged");

        let intercept = theta[n_features];
        let mut coefficients = theta;
        coefficients.truncate(n_features);

        Ok(Self {
            coefficients,
            intercept,
            iterations,
            metrics: None,
        })
    }

    /// Attach held-out evaluation metrics
    pub fn with_metrics(mut self, metrics: ClassifierMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Log-odds of the positive class
    pub fn decision_function(&self, x: &SparseVector) -> Result<f64> {
        x.check_dimension(self.coefficients.len())?;
        Ok(x.dot(&self.coefficients) + self.intercept)
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

impl LinearClassifier for LogisticRegression {
    fn kind(&self) -> ClassifierKind {
        ClassifierKind::LogisticRegression
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_proba(&self, x: &SparseVector) -> Result<[f64; 2]> {
        let p = sigmoid(self.decision_function(x)?);
        Ok([1.0 - p, p])
    }

    fn metrics(&self) -> Option<ClassifierMetrics> {
        self.metrics
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^z)` without overflow
fn softplus(z: f64) -> f64 {
    z.max(0.0) + (-z.abs()).exp().ln_1p()
}

/// Penalized negative log-likelihood over `theta = [w..., b]`
struct Objective<'a> {
    x: &'a [SparseVector],
    y: &'a [f64],
    n_features: usize,
    inv_c: f64,
}

impl Objective<'_> {
    fn dimension(&self) -> usize {
        self.n_features + 1
    }

    /// Returns the loss and writes the gradient into `grad`
    fn evaluate(&self, theta: &[f64], grad: &mut [f64]) -> f64 {
        grad.fill(0.0);
        let (w, b) = theta.split_at(self.n_features);
        let b = b[0];

        let mut loss = 0.0;
        for (row, &target) in self.x.iter().zip(self.y) {
            let z = row.dot(w) + b;
            loss += softplus(z) - target * z;

            let residual = sigmoid(z) - target;
            for (j, value) in row.iter() {
                grad[j] += residual * value;
            }
            grad[self.n_features] += residual;
        }

        for (g, &wj) in grad.iter_mut().zip(w) {
            loss += 0.5 * self.inv_c * wj * wj;
            *g += self.inv_c * wj;
        }

        loss
    }
}

/// One stored curvature pair
struct Correction {
    s: Vec<f64>,
    y: Vec<f64>,
    rho: f64,
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// `y += alpha * x`
fn axpy(alpha: f64, x: &[f64], y: &mut [f64]) {
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi += alpha * xi;
    }
}

/// Two-loop recursion: approximate inverse Hessian times `grad`
fn two_loop(grad: &[f64], history: &VecDeque<Correction>) -> Vec<f64> {
    let mut q = grad.to_vec();
    let mut alphas = Vec::with_capacity(history.len());

    for c in history.iter().rev() {
        let alpha = c.rho * dot(&c.s, &q);
        axpy(-alpha, &c.y, &mut q);
        alphas.push(alpha);
    }

    if let Some(last) = history.back() {
        let gamma = dot(&last.s, &last.y) / dot(&last.y, &last.y);
        q.iter_mut().for_each(|v| *v *= gamma);
    }

    for (c, alpha) in history.iter().zip(alphas.iter().rev()) {
        let beta = c.rho * dot(&c.y, &q);
        axpy(alpha - beta, &c.s, &mut q);
    }

    q
}

fn minimize(objective: &Objective<'_>, params: &LogisticRegressionParams) -> (Vec<f64>, usize) {
    let dim = objective.dimension();
    let mut theta = vec![0.0; dim];
    let mut grad = vec![0.0; dim];
    let mut loss = objective.evaluate(&theta, &mut grad);

    let mut candidate = vec![0.0; dim];
    let mut candidate_grad = vec![0.0; dim];
    let mut history: VecDeque<Correction> = VecDeque::with_capacity(params.history);
    let mut iterations = 0;

    while iterations < params.max_iter {
        let max_grad = grad.iter().fold(0.0f64, |m, g| m.max(g.abs()));
        if max_grad <= params.tolerance {
            break;
        }
        iterations += 1;

        let mut direction: Vec<f64> = two_loop(&grad, &history).into_iter().map(|d| -d).collect();
        let mut slope = dot(&grad, &direction);
        if slope >= 0.0 {
            // curvature information went stale; restart from steepest descent
            history.clear();
            direction = grad.iter().map(|g| -g).collect();
            slope = -dot(&grad, &grad);
        }

        let mut step = if history.is_empty() {
            (1.0 / dot(&grad, &grad).sqrt()).min(1.0)
        } else {
            1.0
        };

        let mut accepted = None;
        for _ in 0..MAX_LINE_SEARCH_STEPS {
            for i in 0..dim {
                candidate[i] = theta[i] + step * direction[i];
            }
            let candidate_loss = objective.evaluate(&candidate, &mut candidate_grad);
            if candidate_loss <= loss + ARMIJO * step * slope {
                accepted = Some(candidate_loss);
                break;
            }
            step *= 0.5;
        }

        let Some(candidate_loss) = accepted else {
            debug!(iterations, "line search made no progress");
            break;
        };

        let s: Vec<f64> = candidate.iter().zip(&theta).map(|(a, b)| a - b).collect();
        let y: Vec<f64> = candidate_grad.iter().zip(&grad).map(|(a, b)| a - b).collect();
        let sy = dot(&s, &y);
        if sy > 1e-12 {
            if history.len() == params.history {
                history.pop_front();
            }
            history.push_back(Correction { s, y, rho: 1.0 / sy });
        }

        let improvement = loss - candidate_loss;
        std::mem::swap(&mut theta, &mut candidate);
        std::mem::swap(&mut grad, &mut candidate_grad);
        loss = candidate_loss;

        if improvement <= RELATIVE_FTOL * loss.abs().max(1.0) {
            break;
        }
    }

    (theta, iterations)
}
