use log::debug;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::adam::{Adam, Moments};
use super::{Activation, Classifier, FitOptions, FitReport};
use crate::{Error, Result};

/// Fully connected layer, `inputs · weights + bias`
#[derive(Clone)]
struct DenseLayer {
    weights: Array2<f32>,
    bias: Array1<f32>,
}

impl DenseLayer {
    /// Glorot-uniform weights, zero bias
    fn new(inputs: usize, units: usize, rng: &mut StdRng) -> Self {
        #[allow(clippy::cast_precision_loss)] // Layer sizes are small
        let limit = (6.0 / (inputs + units) as f32).sqrt();
        let dist = Uniform::new_inclusive(-limit, limit);
        Self {
            weights: Array2::from_shape_fn((inputs, units), |_| rng.sample(dist)),
            bias: Array1::zeros(units),
        }
    }

    fn forward(&self, inputs: &ArrayView2<f32>) -> Array2<f32> {
        inputs.dot(&self.weights) + &self.bias
    }
}

/// Two-layer dense classifier head: input → hidden → single output unit.
///
/// The output is left unsquashed; callers apply [`super::sigmoid`] at
/// prediction time.
pub struct DenseClassifier {
    hidden: DenseLayer,
    output: DenseLayer,
    activation: Activation,
    learning_rate: f32,
    rng: StdRng,
}

impl DenseClassifier {
    /// Create a freshly initialized classifier
    ///
    /// # Errors
    ///
    /// Returns an error if a dimension is zero or the learning rate is not positive
    pub fn new(
        input_dim: usize,
        hidden_units: usize,
        activation: Activation,
        learning_rate: f32,
        seed: Option<u64>,
    ) -> Result<Self> {
        if input_dim == 0 || hidden_units == 0 {
            return Err(Error::InvalidInput(format!(
                "Classifier dimensions must be positive (input {input_dim}, hidden {hidden_units})"
            )));
        }
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(Error::InvalidInput(format!("Learning rate must be positive, got {learning_rate}")));
        }

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let hidden = DenseLayer::new(input_dim, hidden_units, &mut rng);
        let output = DenseLayer::new(hidden_units, 1, &mut rng);

        Ok(Self {
            hidden,
            output,
            activation,
            learning_rate,
            rng,
        })
    }

    #[must_use]
    pub fn hidden_units(&self) -> usize {
        self.hidden.bias.len()
    }

    fn check_columns(&self, cols: usize) -> Result<()> {
        if cols == self.input_dim() {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "Expected {} input features, got {cols}",
                self.input_dim()
            )))
        }
    }

    /// Forward pass keeping the hidden pre-activations for backprop
    fn forward(&self, inputs: &ArrayView2<f32>) -> (Array2<f32>, Array2<f32>, Array2<f32>) {
        let pre_activation = self.hidden.forward(inputs);
        let activation = self.activation;
        let hidden = pre_activation.mapv(|v| activation.apply(v));
        let output = self.output.forward(&hidden.view());
        (pre_activation, hidden, output)
    }
}

impl Classifier for DenseClassifier {
    fn input_dim(&self) -> usize {
        self.hidden.weights.nrows()
    }

    fn predict(&self, inputs: ArrayView2<f32>) -> Result<Array1<f32>> {
        self.check_columns(inputs.ncols())?;
        let (_, _, output) = self.forward(&inputs);
        Ok(output.column(0).to_owned())
    }

    fn fit(&mut self, inputs: Array2<f32>, labels: Array1<f32>, options: &FitOptions) -> Result<FitReport> {
        self.check_columns(inputs.ncols())?;
        let samples = inputs.nrows();
        if samples == 0 {
            return Err(Error::TrainingError("Cannot train on an empty dataset".to_string()));
        }
        if labels.len() != samples {
            return Err(Error::InvalidInput(format!(
                "Got {} labels for {samples} input rows",
                labels.len()
            )));
        }
        if options.epochs == 0 || options.batch_size == 0 {
            return Err(Error::InvalidInput("Epochs and batch size must be positive".to_string()));
        }

        // A failed run must not leave partially trained weights behind
        let snapshot = (self.hidden.clone(), self.output.clone());
        match self.train_epochs(&inputs, &labels, options) {
            Ok(final_loss) => Ok(FitReport {
                epochs: options.epochs,
                samples,
                final_loss,
            }),
            Err(e) => {
                (self.hidden, self.output) = snapshot;
                Err(e)
            }
        }
    }
}

impl DenseClassifier {
    /// Minibatch Adam over `inputs`, returning the last epoch's mean loss
    #[allow(clippy::cast_precision_loss)] // Batch sizes are small
    fn train_epochs(&mut self, inputs: &Array2<f32>, labels: &Array1<f32>, options: &FitOptions) -> Result<f32> {
        let samples = inputs.nrows();
        let mut optimizer = Adam::new(self.learning_rate);
        let mut hidden_w = Moments::zeros_like(&self.hidden.weights);
        let mut hidden_b = Moments::zeros_like(&self.hidden.bias);
        let mut output_w = Moments::zeros_like(&self.output.weights);
        let mut output_b = Moments::zeros_like(&self.output.bias);

        let mut order: Vec<usize> = (0..samples).collect();
        let mut final_loss = f32::NAN;

        for epoch in 0..options.epochs {
            if options.shuffle {
                order.shuffle(&mut self.rng);
            }

            let mut epoch_loss = 0.0f32;
            for batch in order.chunks(options.batch_size) {
                let x = inputs.select(Axis(0), batch);
                let y = labels.select(Axis(0), batch);
                let m = batch.len() as f32;

                let (pre_activation, hidden, output) = self.forward(&x.view());
                let diff = &output.column(0) - &y;
                epoch_loss += diff.mapv(|d| d * d).sum();

                // d(MSE)/d(output), shaped (batch, 1)
                let grad_output = diff.mapv(|d| 2.0 * d / m).insert_axis(Axis(1));
                let grad_output_w = hidden.t().dot(&grad_output);
                let grad_output_b = grad_output.sum_axis(Axis(0));

                let activation = self.activation;
                let grad_hidden = grad_output.dot(&self.output.weights.t())
                    * pre_activation.mapv(|v| activation.derivative(v));
                let grad_hidden_w = x.t().dot(&grad_hidden);
                let grad_hidden_b = grad_hidden.sum_axis(Axis(0));

                optimizer.begin_step();
                optimizer.update(&mut self.output.weights, &grad_output_w, &mut output_w);
                optimizer.update(&mut self.output.bias, &grad_output_b, &mut output_b);
                optimizer.update(&mut self.hidden.weights, &grad_hidden_w, &mut hidden_w);
                optimizer.update(&mut self.hidden.bias, &grad_hidden_b, &mut hidden_b);
            }

            final_loss = epoch_loss / samples as f32;
            if !final_loss.is_finite() {
                return Err(Error::TrainingError(format!("Loss diverged at epoch {epoch}")));
            }
            debug!("epoch {}/{}: mse {:.5}", epoch + 1, options.epochs, final_loss);
        }

        Ok(final_loss)
    }
}
