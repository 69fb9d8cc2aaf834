//! Adam (Adaptive Moment Estimation) over a flat parameter vector.

/// Adam optimizer state.
///
/// Moment buffers are created on the first step and sized to the parameter
/// vector.
#[derive(Debug, Clone)]
pub struct Adam {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    t: i32,
    m: Vec<f64>,
    v: Vec<f64>,
}

impl Adam {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            t: 0,
            m: Vec::new(),
            v: Vec::new(),
        }
    }

    pub fn with_betas(mut self, beta1: f64, beta2: f64) -> Self {
        self.beta1 = beta1;
        self.beta2 = beta2;
        self
    }

    /// Number of steps taken.
    pub fn steps(&self) -> i32 {
        self.t
    }

    /// Apply one update.
    ///
    /// # Panics
    /// Panics if `params` and `gradients` differ in length, or if the length
    /// changes between steps.
    pub fn step(&mut self, params: &mut [f64], gradients: &[f64]) {
        assert_eq!(params.len(), gradients.len(), "gradient length mismatch");
        if self.m.is_empty() {
            self.m = vec![0.0; params.len()];
            self.v = vec![0.0; params.len()];
        }
        assert_eq!(self.m.len(), params.len(), "parameter count changed");

        self.t += 1;
        let bias1 = 1.0 - self.beta1.powi(self.t);
        let bias2 = 1.0 - self.beta2.powi(self.t);

        for i in 0..params.len() {
            let g = gradients[i];
            self.m[i] = self.beta1 * self.m[i] + (1.0 - self.beta1) * g;
            self.v[i] = self.beta2 * self.v[i] + (1.0 - self.beta2) * g * g;

            let m_hat = self.m[i] / bias1;
            let v_hat = self.v[i] / bias2;
            params[i] -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
        }
    }

    /// Forget moment estimates (for a new training run).
    pub fn reset(&mut self) {
        self.t = 0;
        self.m.clear();
        self.v.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_step_moves_by_learning_rate() {
        // With bias correction the first step is lr * sign(g).
        let mut adam = Adam::new(0.01);
        let mut params = vec![1.0, -1.0];
        adam.step(&mut params, &[0.5, -3.0]);
        assert!((params[0] - 0.99).abs() < 1e-6);
        assert!((params[1] + 0.99).abs() < 1e-6);
        assert_eq!(adam.steps(), 1);
    }

    #[test]
    fn test_minimizes_quadratic() {
        let mut adam = Adam::new(0.1);
        let mut x = vec![5.0];
        for _ in 0..500 {
            let g = vec![2.0 * (x[0] - 2.0)];
            adam.step(&mut x, &g);
        }
        assert!((x[0] - 2.0).abs() < 1e-2);
    }

    #[test]
    fn test_reset() {
        let mut adam = Adam::new(0.1);
        let mut x = vec![0.0];
        adam.step(&mut x, &[1.0]);
        adam.reset();
        assert_eq!(adam.steps(), 0);
        let mut y = vec![0.0, 0.0];
        adam.step(&mut y, &[1.0, 1.0]);
        assert_eq!(adam.steps(), 1);
    }
}
