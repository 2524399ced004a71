use std::path::Path;

use image::{ImageBuffer, Rgb};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tempfile::TempDir;

use rice_mlp::report::write_loss_curves;
use rice_mlp::{
    BatchSampler, DatasetConfig, ModelSpec, RunConfig, Split, TrainConfig, Trainer,
};

/// Writes `per_variety` JPEGs for each variety. Variety `v` gets a dominant
/// colour channel `v % 3` so the classes are trivially separable.
fn write_dataset(root: &Path, varieties: &[&str], per_variety: usize, size: u32) {
    for (v, name) in varieties.iter().enumerate() {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        for index in 1..=per_variety {
            let img = ImageBuffer::from_fn(size, size, |x, y| {
                let mut px = [30u8, 30u8, 30u8];
                px[v % 3] = 200u8.saturating_add(((x + y + index as u32) % 40) as u8);
                Rgb(px)
            });
            img.save(dir.join(format!("{} ({}).jpg", name, index))).unwrap();
        }
    }
}

fn dataset_config(root: &Path, size: u32) -> DatasetConfig {
    DatasetConfig {
        root: root.to_path_buf(),
        varieties: None,
        images_per_variety: 10,
        test_fraction: 0.1,
        val_fraction: 0.1,
        image_width: size,
        image_height: size,
    }
}

#[test]
fn train_batch_has_expected_shapes_and_one_hot_labels() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path(), &["Basmati", "Arborio"], 10, 100);

    let sampler = BatchSampler::from_config(&dataset_config(dir.path(), 100)).unwrap();
    assert_eq!(sampler.varieties(), ["Arborio", "Basmati"]);
    assert_eq!(sampler.ranges().train, 1..=8);
    assert_eq!(sampler.ranges().validation, 9..=9);
    assert_eq!(sampler.ranges().test, 10..=10);

    let mut rng = ChaCha8Rng::seed_from_u64(2000);
    let batch = sampler.sample(Split::Train, 4, &mut rng).unwrap();
    assert_eq!(batch.pixels.shape(), (4, 30_000));
    assert_eq!(batch.labels.shape(), (4, 2));
    for (row, record) in batch.records.iter().enumerate() {
        let labels = batch.labels.row(row);
        assert_eq!(labels.iter().sum::<f64>(), 1.0);
        assert!(labels.iter().all(|&x| x == 0.0 || x == 1.0));
        assert_eq!(labels[record.variety], 1.0);
        assert!((1..=8).contains(&record.index));
    }
}

#[test]
fn held_out_splits_only_touch_their_indices() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path(), &["Ipsala", "Jasmine"], 10, 8);
    let sampler = BatchSampler::from_config(&dataset_config(dir.path(), 8)).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let val = sampler.sample(Split::Validation, 6, &mut rng).unwrap();
    assert!(val.records.iter().all(|r| r.index == 9));
    let test = sampler.sample(Split::Test, 6, &mut rng).unwrap();
    assert!(test.records.iter().all(|r| r.index == 10));
}

#[test]
fn decoding_the_same_record_twice_is_bit_identical() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path(), &["Karacadag"], 3, 37);
    let sampler = BatchSampler::from_config(&DatasetConfig {
        images_per_variety: 3,
        test_fraction: 0.34,
        val_fraction: 0.34,
        ..dataset_config(dir.path(), 20)
    }).unwrap();

    let a = sampler.indexer().load("Karacadag", 2).unwrap();
    let b = sampler.indexer().load("Karacadag", 2).unwrap();
    assert_eq!(a.len(), 20 * 20 * 3);
    assert_eq!(a, b);
}

fn small_run(root: &Path) -> RunConfig {
    RunConfig {
        seed: 42,
        log_level: "warn".into(),
        plot_dir: root.join("plots"),
        dataset: dataset_config(root, 4),
        model: ModelSpec { hidden_sizes: vec![8] },
        train: TrainConfig {
            iterations: 60,
            batch_size: 8,
            learning_rate: 1e-2,
            weight_decay: 0.01,
            eval_interval: 20,
            eval_batches: 2,
            test_steps: 4,
            test_batch_size: 5,
            test_report_every: 2,
            smoothing_window: 10,
        },
    }
}

#[test]
fn evaluation_on_a_fixed_batch_is_repeatable() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path(), &["Arborio", "Basmati", "Ipsala"], 10, 4);
    let mut trainer = Trainer::from_config(&small_run(dir.path())).unwrap();
    for _ in 0..3 {
        trainer.train_step().unwrap();
    }

    let batch = trainer.sample(Split::Validation, 6).unwrap();
    let (first, correct_first) = trainer.batch_loss(&batch).unwrap();
    let (second, correct_second) = trainer.batch_loss(&batch).unwrap();
    assert_eq!(first, second);
    assert_eq!(correct_first, correct_second);
    assert_eq!(trainer.steps(), 3);
}

#[test]
fn full_run_learns_separable_varieties_and_writes_charts() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("images");
    write_dataset(&data, &["Arborio", "Basmati", "Ipsala"], 10, 4);
    let mut config = small_run(&data);
    config.plot_dir = dir.path().join("plots");

    let mut trainer = Trainer::from_config(&config).unwrap();
    let report = trainer.run().unwrap();

    assert_eq!(report.train_losses_log10.len(), 60);
    assert_eq!(report.evaluations.len(), 3);
    assert_eq!(
        report.evaluations.iter().map(|e| e.steps).collect::<Vec<_>>(),
        vec![1, 21, 41]
    );
    assert_eq!(
        report.final_losses.iter().map(|(s, _)| *s).collect::<Vec<_>>(),
        vec![Split::Train, Split::Validation, Split::Test]
    );
    assert!(report.average_val_accuracy.is_some());
    assert_eq!(report.test.tested, 20);
    assert_eq!(report.test.losses_log10.len(), 4);
    assert!(report.test.accuracy() >= 80.0, "test accuracy {}", report.test.accuracy());

    let (train_chart, test_chart) =
        write_loss_curves(&report, &config.plot_dir, config.train.smoothing_window).unwrap();
    assert!(std::fs::read_to_string(train_chart).unwrap().contains("<polyline"));
    assert!(test_chart.exists());
}

#[test]
fn missing_image_aborts_training() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path(), &["Arborio", "Basmati"], 10, 4);
    std::fs::remove_file(dir.path().join("Arborio").join("Arborio (3).jpg")).unwrap();

    let mut config = small_run(dir.path());
    config.train.iterations = 200;
    let mut trainer = Trainer::from_config(&config).unwrap();
    assert!(matches!(trainer.run(), Err(rice_mlp::RiceError::Decode { .. })));
}
