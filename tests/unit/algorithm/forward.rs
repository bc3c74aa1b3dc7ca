//! Tests for buffer layout, layer stacking and noisy forward evaluation

#[cfg(test)]
mod tests {
    use blackout::BlackoutError;
    use blackout::algorithm::forward::{
        Activation, EvaluatorConfig, ForwardEvaluator, PixelBuffer, default_layers, sigmoid,
    };
    use blackout::algorithm::parameters::{LayerParameters, ParameterSample};
    use blackout::math::binomial::BinomialCache;
    use rand::{SeedableRng, rngs::StdRng};

    const AREA: usize = 9;
    const STEPS: usize = 8;

    fn zero_sample(config: &EvaluatorConfig) -> ParameterSample {
        let (rows, cols) = config.layer_shape();
        ParameterSample::new(
            config
                .layers
                .iter()
                .map(|_| LayerParameters::zeros(rows, cols))
                .collect(),
        )
    }

    fn random_sample(config: &EvaluatorConfig, seed: u64) -> ParameterSample {
        let (rows, cols) = config.layer_shape();
        let mut rng = StdRng::seed_from_u64(seed);
        ParameterSample::random(&mut rng, config.layers.len(), rows, cols, 0.5)
    }

    // Tests slot positions with and without the time feature
    // Verified by placing the bias slot before the time slot
    #[test]
    fn test_buffer_layout() {
        let config = EvaluatorConfig::new(AREA, STEPS);
        assert_eq!(config.slot_count(), 2);
        assert_eq!(config.buffer_len(), AREA + 2);
        assert_eq!(config.time_slot(), Some(AREA));
        assert_eq!(config.bias_slot(), AREA + 1);
        assert_eq!(config.layer_shape(), (AREA, AREA + 2));

        let without_time = config.with_time_feature(false);
        assert_eq!(without_time.buffer_len(), AREA + 1);
        assert_eq!(without_time.time_slot(), None);
        assert_eq!(without_time.bias_slot(), AREA);
    }

    // Tests default layer stacks end in a linear layer unless squashed
    // Verified by applying the linear activation to the first layer
    #[test]
    fn test_default_layers() {
        assert_eq!(
            default_layers(3, false),
            vec![Activation::Sigmoid, Activation::Sigmoid, Activation::Linear]
        );
        assert_eq!(default_layers(2, true), vec![Activation::Sigmoid; 2]);
        assert_eq!(default_layers(1, false), vec![Activation::Linear]);
        assert_eq!(EvaluatorConfig::new(4, 4).layers, default_layers(3, false));
    }

    // Tests stamping writes sentinels and clearing zeroes them
    // Verified by skipping the time slot when stamping
    #[test]
    fn test_stamp_and_clear_slots() {
        let config = EvaluatorConfig::new(3, 4);
        let mut buffer = PixelBuffer::from_vec(vec![5.0, 6.0, 7.0, 0.0, 0.0]);

        config.stamp_slots(&mut buffer, 0.25);
        assert_eq!(buffer.to_vec(), vec![5.0, 6.0, 7.0, 0.25, 1.0]);

        config.clear_slots(&mut buffer);
        assert_eq!(buffer.to_vec(), vec![5.0, 6.0, 7.0, 0.0, 0.0]);
    }

    // Tests the sigmoid and activation application
    // Verified by applying the sigmoid to linear layers
    #[test]
    fn test_activation() {
        assert!((sigmoid(0.0) - 0.5).abs() < f64::EPSILON);
        assert!(sigmoid(40.0) > 0.999_999);
        assert!(sigmoid(-40.0) < 1e-6);

        let mut values = PixelBuffer::from_vec(vec![0.0, 2.0]);
        Activation::Linear.apply(&mut values);
        assert_eq!(values.to_vec(), vec![0.0, 2.0]);
        Activation::Sigmoid.apply(&mut values);
        assert!((values[0] - 0.5).abs() < f64::EPSILON);
    }

    // Tests configuration validation
    // Verified by allowing an empty layer list
    #[test]
    fn test_config_validation() {
        let cache = BinomialCache::new();
        assert!(ForwardEvaluator::new(&cache, EvaluatorConfig::new(0, 4)).is_err());
        assert!(ForwardEvaluator::new(&cache, EvaluatorConfig::new(4, 0)).is_err());
        assert!(
            ForwardEvaluator::new(&cache, EvaluatorConfig::new(4, 4).with_layers(vec![])).is_err()
        );
        assert!(ForwardEvaluator::new(&cache, EvaluatorConfig::new(4, 4)).is_ok());
    }

    // Tests evaluators refuse a table that hasn't been precomputed
    // Verified by removing the population check
    #[test]
    fn test_requires_populated_table() {
        let cache = BinomialCache::empty();
        let result = ForwardEvaluator::new(&cache, EvaluatorConfig::new(AREA, STEPS));

        assert!(matches!(
            result,
            Err(BlackoutError::TableNotPopulated { n: 0, k: 0 })
        ));
    }

    // Tests a zero candidate with a linear output never adds noise
    // Verified by clamping at the headroom before the zero floor
    #[test]
    fn test_zero_candidate_reconstructs_black() {
        let cache = BinomialCache::new();
        let config = EvaluatorConfig::new(AREA, STEPS);
        let evaluator = ForwardEvaluator::new(&cache, config.clone()).unwrap();

        let output = evaluator.evaluate(&zero_sample(&config), 17).unwrap();

        assert_eq!(output.len(), config.buffer_len());
        assert!(output.iter().all(|value| *value == 0.0));
    }

    // Tests a saturating output fills every pixel on the first step
    // Verified by letting the accumulator exceed the headroom
    #[test]
    fn test_saturating_candidate_fills_image() {
        let cache = BinomialCache::new();
        let config = EvaluatorConfig::new(AREA, STEPS).with_layers(vec![Activation::Linear]);
        let evaluator = ForwardEvaluator::new(&cache, config.clone()).unwrap();

        let mut sample = zero_sample(&config);
        if let Some(layer) = sample.layers.first_mut() {
            layer.base.column_mut(config.bias_slot()).fill(2.0);
        }

        for seed in [0, 1, 99] {
            let output = evaluator.evaluate(&sample, seed).unwrap();
            let pixels: Vec<f64> = output.iter().take(AREA).copied().collect();
            assert_eq!(pixels, vec![255.0; AREA]);
            assert_eq!(output[AREA], 0.0);
            assert_eq!(output[AREA + 1], 0.0);
        }
    }

    // Tests random candidates stay in pixel range with integral values
    // Verified by skipping the clamp against the accumulated value
    #[test]
    fn test_output_bounded() {
        let cache = BinomialCache::new();
        let config = EvaluatorConfig::new(AREA, 32).with_layers(default_layers(3, true));
        let evaluator = ForwardEvaluator::new(&cache, config.clone()).unwrap();

        for seed in 0..6 {
            let sample = random_sample(&config, seed);
            let output = evaluator.evaluate(&sample, seed).unwrap();
            for value in output.iter().take(AREA) {
                assert!((0.0..=255.0).contains(value), "pixel {value} out of range");
                assert!((value - value.round()).abs() < f64::EPSILON);
            }
        }
    }

    // Tests the same candidate and seed reproduce the same reconstruction
    // Verified by seeding the noise from the thread RNG
    #[test]
    fn test_deterministic_per_seed() {
        let cache = BinomialCache::new();
        let config = EvaluatorConfig::new(AREA, STEPS).with_layers(default_layers(2, true));
        let evaluator = ForwardEvaluator::new(&cache, config.clone()).unwrap();
        let sample = random_sample(&config, 4);

        let first = evaluator.evaluate(&sample, 123).unwrap();
        let second = evaluator.evaluate(&sample, 123).unwrap();
        assert_eq!(first, second);
    }

    // Tests the layer stack works without a time slot
    // Verified by stamping time into the bias position
    #[test]
    fn test_without_time_feature() {
        let cache = BinomialCache::new();
        let config = EvaluatorConfig::new(AREA, STEPS).with_time_feature(false);
        let evaluator = ForwardEvaluator::new(&cache, config.clone()).unwrap();
        let sample = random_sample(&config, 8);

        let output = evaluator.evaluate(&sample, 8).unwrap();
        assert_eq!(output.len(), AREA + 1);
        assert_eq!(output[AREA], 0.0);
    }

    // Tests candidates that don't match the layout are rejected
    // Verified by zipping layers without checking their count
    #[test]
    fn test_layout_mismatch_rejected() {
        let cache = BinomialCache::new();
        let config = EvaluatorConfig::new(AREA, STEPS);
        let evaluator = ForwardEvaluator::new(&cache, config.clone()).unwrap();

        let mut short = zero_sample(&config);
        short.layers.pop();
        assert!(matches!(
            evaluator.evaluate(&short, 0),
            Err(BlackoutError::InvalidParameter { .. })
        ));

        let mut wrong_shape = zero_sample(&config);
        wrong_shape.layers[1] = LayerParameters::zeros(AREA, AREA);
        assert!(matches!(
            evaluator.evaluate(&wrong_shape, 0),
            Err(BlackoutError::ShapeMismatch { .. })
        ));
    }
}
