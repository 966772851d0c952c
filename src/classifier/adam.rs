use ndarray::{Array, Dimension, Zip};

use crate::constants::{ADAM_BETA1, ADAM_BETA2, ADAM_EPSILON};

/// First and second moment estimates for one parameter tensor
pub struct Moments<D: Dimension> {
    m: Array<f32, D>,
    v: Array<f32, D>,
}

impl<D: Dimension> Moments<D> {
    pub fn zeros_like(param: &Array<f32, D>) -> Self {
        Self {
            m: Array::zeros(param.raw_dim()),
            v: Array::zeros(param.raw_dim()),
        }
    }
}

/// Adam optimizer
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    step: i32,
}

impl Adam {
    pub fn new(learning_rate: f32) -> Self {
        Self {
            learning_rate,
            beta1: ADAM_BETA1,
            beta2: ADAM_BETA2,
            epsilon: ADAM_EPSILON,
            step: 0,
        }
    }

    /// Advance the shared step counter; call once per mini-batch
    pub fn begin_step(&mut self) {
        self.step = self.step.saturating_add(1);
    }

    /// Apply one bias-corrected update to `param`
    pub fn update<D: Dimension>(&self, param: &mut Array<f32, D>, grad: &Array<f32, D>, moments: &mut Moments<D>) {
        let (b1, b2, eps, lr) = (self.beta1, self.beta2, self.epsilon, self.learning_rate);
        let correction1 = 1.0 - b1.powi(self.step.max(1));
        let correction2 = 1.0 - b2.powi(self.step.max(1));

        Zip::from(param)
            .and(grad)
            .and(&mut moments.m)
            .and(&mut moments.v)
            .for_each(|p, &g, m, v| {
                *m = b1 * *m + (1.0 - b1) * g;
                *v = b2 * *v + (1.0 - b2) * g * g;
                let m_hat = *m / correction1;
                let v_hat = *v / correction2;
                *p -= lr * m_hat / (v_hat.sqrt() + eps);
            });
    }
}
