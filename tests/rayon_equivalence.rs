#![cfg(feature = "rayon")]

use detpost::{
    decode, decode_par, DecodeParams, LetterboxRatios, PostProcessor, PostprocessConfig,
    RawOutput, ScoreMode,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn make_output(rows: usize, classes: usize, seed: u64) -> RawOutput {
    let mut rng = StdRng::seed_from_u64(seed);
    let stride = 5 + classes;
    let mut data = Vec::with_capacity(rows * stride);
    for _ in 0..rows {
        data.push(rng.random_range(0.0f32..640.0));
        data.push(rng.random_range(0.0f32..640.0));
        data.push(rng.random_range(4.0f32..160.0));
        data.push(rng.random_range(4.0f32..160.0));
        for _ in 0..=classes {
            data.push(rng.random::<f32>());
        }
    }
    RawOutput::new(data, &[1, rows, stride]).unwrap()
}

#[test]
fn parallel_decode_matches_sequential() {
    let raw = make_output(5000, 20, 9);
    for score_mode in [ScoreMode::ObjectnessTimesClass, ScoreMode::ClassOnly] {
        let params = DecodeParams {
            confidence_threshold: 0.4,
            class_threshold: 0.6,
            score_mode,
        };
        let sequential = decode(raw.view(), params).unwrap();
        let parallel = decode_par(raw.view(), params).unwrap();
        assert!(!sequential.is_empty());
        assert_eq!(parallel, sequential);
    }
}

#[test]
fn parallel_pipeline_matches_sequential() {
    let raw = make_output(3000, 10, 21);
    let base = PostprocessConfig {
        confidence_threshold: 0.3,
        class_threshold: 0.5,
        overlap_threshold: 0.45,
        ..PostprocessConfig::default()
    };
    let ratios = LetterboxRatios::from_dims(1280, 720).unwrap();

    let sequential = PostProcessor::new(base).unwrap().run(raw.view(), ratios).unwrap();
    let parallel = PostProcessor::new(PostprocessConfig {
        parallel: true,
        ..base
    })
    .unwrap()
    .run(raw.view(), ratios)
    .unwrap();
    assert_eq!(parallel, sequential);
}
