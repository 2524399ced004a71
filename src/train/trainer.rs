use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::dataset::sampler::{Batch, BatchSampler};
use crate::dataset::split::Split;
use crate::error::{Result, RiceError};
use crate::layers::Mode;
use crate::loss::cross_entropy::CrossEntropyLoss;
use crate::network::network::Network;
use crate::optim::adamw::AdamW;
use crate::train::eval_stats::{EvalStats, TestReport, TrainingReport};
use crate::train::metrics::{count_correct_preds, mean};
use crate::train::train_config::TrainConfig;

/// Owns everything a run mutates: the model, its optimizer and the RNG that
/// drives batch sampling. The sampler and config are read-only.
pub struct Trainer {
    network: Network,
    optimizer: AdamW,
    sampler: BatchSampler,
    rng: ChaCha8Rng,
    config: TrainConfig,
    steps: usize,
}

impl Trainer {
    pub fn new(network: Network, sampler: BatchSampler, config: TrainConfig, seed: u64) -> Result<Trainer> {
        config.validate()?;
        if network.input_size() != Some(sampler.indexer().sample_len()) {
            return Err(RiceError::Config(format!(
                "network expects {:?} inputs but images flatten to {}",
                network.input_size(),
                sampler.indexer().sample_len()
            )));
        }
        if network.output_size() != Some(sampler.n_classes()) {
            return Err(RiceError::Config(format!(
                "network produces {:?} logits but the dataset has {} varieties",
                network.output_size(),
                sampler.n_classes()
            )));
        }

        let optimizer = AdamW::new(config.learning_rate, config.weight_decay);
        Ok(Trainer {
            network,
            optimizer,
            sampler,
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
            steps: 0,
        })
    }

    /// Resolves the dataset, builds the model described by `run.model` and
    /// seeds both initialisation and sampling from `run.seed`.
    pub fn from_config(run: &RunConfig) -> Result<Trainer> {
        let sampler = BatchSampler::from_config(&run.dataset)?;
        let mut init_rng = ChaCha8Rng::seed_from_u64(run.seed);
        let network = run.model.build(run.dataset.input_size(), sampler.n_classes(), &mut init_rng);
        Trainer::new(network, sampler, run.train.clone(), run.seed.wrapping_add(1))
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn sampler(&self) -> &BatchSampler {
        &self.sampler
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Optimizer steps completed so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Draws a batch with the trainer's RNG.
    pub fn sample(&mut self, split: Split, batch_size: usize) -> Result<Batch> {
        self.sampler.sample(split, batch_size, &mut self.rng)
    }

    /// One optimisation step on a fresh train batch. Returns the batch loss.
    pub fn train_step(&mut self) -> Result<f64> {
        let batch = self.sample(Split::Train, self.config.batch_size)?;
        self.network.set_mode(Mode::Train);

        let logits = self.network.forward(&batch.pixels)?;
        let loss = CrossEntropyLoss::loss(&logits, &batch.labels);

        self.network.zero_grad();
        self.network.backward(&CrossEntropyLoss::derivative(&logits, &batch.labels));
        self.optimizer.step(&mut self.network);
        self.steps += 1;

        debug!(step = self.steps, loss, "train step");
        Ok(loss)
    }

    /// Eval-mode loss and number of correct predictions on `batch`.
    /// Leaves parameters and normalisation statistics untouched.
    pub fn batch_loss(&mut self, batch: &Batch) -> Result<(f64, usize)> {
        self.with_eval_mode(|t| {
            let logits = t.network.forward(&batch.pixels)?;
            Ok((
                CrossEntropyLoss::loss(&logits, &batch.labels),
                count_correct_preds(&logits, &batch.labels),
            ))
        })
    }

    /// Mean train and validation loss and mean validation accuracy over
    /// `num_batches` fresh batches per split, in evaluation mode.
    pub fn evaluate(&mut self, num_batches: usize) -> Result<EvalStats> {
        let batch_size = self.config.batch_size;
        self.with_eval_mode(|t| {
            let mut train_losses = Vec::with_capacity(num_batches);
            let mut val_losses = Vec::with_capacity(num_batches);
            let mut val_accuracies = Vec::with_capacity(num_batches);

            for _ in 0..num_batches {
                let batch = t.sample(Split::Train, batch_size)?;
                train_losses.push(t.batch_loss(&batch)?.0);
            }
            for _ in 0..num_batches {
                let batch = t.sample(Split::Validation, batch_size)?;
                let (loss, correct) = t.batch_loss(&batch)?;
                val_losses.push(loss);
                val_accuracies.push(correct as f64 / batch.len() as f64 * 100.0);
            }

            Ok(EvalStats {
                steps: t.steps,
                train_loss: mean(&train_losses).unwrap_or(0.0),
                val_loss: mean(&val_losses).unwrap_or(0.0),
                val_accuracy: mean(&val_accuracies).unwrap_or(0.0),
            })
        })
    }

    /// Loss of a single eval-mode batch from `split`.
    pub fn split_loss(&mut self, split: Split) -> Result<f64> {
        let batch = self.sample(split, self.config.batch_size)?;
        let (loss, _) = self.batch_loss(&batch)?;
        Ok(loss)
    }

    /// Extended evaluation over the test split, accumulating correct/tested
    /// across `test_steps` batches.
    pub fn test_pass(&mut self) -> Result<TestReport> {
        let steps = self.config.test_steps;
        let batch_size = self.config.test_batch_size;
        let report_every = self.config.test_report_every;

        let mut report = TestReport::default();
        for i in 0..steps {
            let batch = self.sample(Split::Test, batch_size)?;
            let (loss, correct) = self.batch_loss(&batch)?;
            report.correct += correct;
            report.tested += batch.len();
            report.losses_log10.push(loss.log10());

            if (i + 1) % report_every == 0 {
                info!(
                    "Correct predictions: {} / {} | Accuracy(%): {:.2}",
                    report.correct,
                    report.tested,
                    report.accuracy()
                );
            }
        }
        Ok(report)
    }

    /// The whole run: training with periodic evaluation, final split losses
    /// and the test pass.
    pub fn run(&mut self) -> Result<TrainingReport> {
        let iterations = self.config.iterations;
        let interval = self.config.eval_interval;
        let eval_batches = self.config.eval_batches;

        info!(
            iterations,
            batch_size = self.config.batch_size,
            parameters = self.network.num_parameters(),
            "starting training"
        );

        let mut train_losses_log10 = Vec::with_capacity(iterations);
        let mut evaluations = Vec::new();
        for i in 0..iterations {
            let loss = self.train_step()?;
            train_losses_log10.push(loss.log10());

            if i % interval == 0 {
                let stats = self.evaluate(eval_batches)?;
                info!(
                    "Iteration: {} | TrainLoss: {:.4} | ValLoss: {:.4} | AverageValAccuracy: {:.2}%",
                    i, stats.train_loss, stats.val_loss, stats.val_accuracy
                );
                evaluations.push(stats);
            }
        }

        let mut final_losses = Vec::with_capacity(3);
        for split in Split::ALL {
            let loss = self.split_loss(split)?;
            info!("{}Loss: {:.6}", split, loss);
            final_losses.push((split, loss));
        }

        let accuracies: Vec<f64> = evaluations.iter().map(|e| e.val_accuracy).collect();
        let average_val_accuracy = mean(&accuracies);
        if let Some(acc) = average_val_accuracy {
            info!("AvgValAccuracy: {:.4}", acc);
        }

        let test = self.test_pass()?;

        Ok(TrainingReport {
            train_losses_log10,
            evaluations,
            final_losses,
            average_val_accuracy,
            test,
        })
    }

    /// Runs `f` with the network in evaluation mode and restores the previous
    /// mode afterwards, whether `f` succeeded or not.
    fn with_eval_mode<T>(&mut self, f: impl FnOnce(&mut Trainer) -> Result<T>) -> Result<T> {
        let previous = self.network.mode();
        self.network.set_mode(Mode::Eval);
        let result = f(self);
        self.network.set_mode(previous);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::indexer::ImageIndexer;
    use crate::dataset::split::SplitRanges;

    fn sampler(n_classes: usize) -> BatchSampler {
        let varieties = (0..n_classes).map(|i| format!("V{i}")).collect();
        BatchSampler::new(
            ImageIndexer::new("unused", 2, 2),
            varieties,
            SplitRanges::compute(100, 0.1, 0.1).unwrap(),
        ).unwrap()
    }

    #[test]
    fn mismatched_network_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let wrong_input = Network::mlp(5, &[4], 3, &mut rng);
        assert!(Trainer::new(wrong_input, sampler(3), TrainConfig::default(), 0).is_err());

        let wrong_output = Network::mlp(12, &[4], 2, &mut rng);
        assert!(Trainer::new(wrong_output, sampler(3), TrainConfig::default(), 0).is_err());

        let right = Network::mlp(12, &[4], 3, &mut rng);
        assert!(Trainer::new(right, sampler(3), TrainConfig::default(), 0).is_ok());
    }

    #[test]
    fn zero_sized_images_never_reach_training() {
        let mut run = RunConfig::default();
        run.dataset.varieties = Some(vec!["A".into(), "B".into()]);
        run.dataset.image_width = 0;
        run.dataset.image_height = 0;
        run.model.hidden_sizes = vec![4];
        assert!(matches!(Trainer::from_config(&run), Err(RiceError::Config(_))));
    }

    #[test]
    fn failed_evaluation_restores_training_mode() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let network = Network::mlp(12, &[4], 3, &mut rng);
        let mut trainer = Trainer::new(network, sampler(3), TrainConfig::default(), 0).unwrap();

        // No images exist under "unused", so sampling fails inside eval mode.
        assert!(trainer.evaluate(1).is_err());
        assert_eq!(trainer.network().mode(), Mode::Train);
    }
}
