use detpost::{
    DetPostError, Label, Labels, LetterboxRatios, PostProcessor, PostprocessConfig, RawOutput,
    RawOutputView, ScoreMode,
};

#[test]
fn raw_output_rejects_length_mismatch() {
    let data = [0.0f32; 13];
    let err = RawOutputView::new(&data, &[1, 2, 7]).err().unwrap();
    assert_eq!(
        err,
        DetPostError::ShapeMismatch {
            dims: [1, 2, 7],
            expected: 14,
            len: 13,
        }
    );

    let err = RawOutput::new(vec![0.0; 15], &[1, 2, 7]).err().unwrap();
    assert!(matches!(err, DetPostError::ShapeMismatch { len: 15, .. }));
}

#[test]
fn raw_output_rejects_bad_rank_and_stride() {
    let err = RawOutputView::new(&[0.0; 4], &[2, 2]).err().unwrap();
    assert_eq!(
        err,
        DetPostError::InvalidShape {
            reason: "dims must be [batch, rows, stride]",
        }
    );

    let err = RawOutputView::new(&[], &[1, 0, 0]).err().unwrap();
    assert_eq!(
        err,
        DetPostError::InvalidShape {
            reason: "row stride must be non-zero",
        }
    );

    let err = RawOutputView::new(&[], &[usize::MAX, 2, 7]).err().unwrap();
    assert_eq!(
        err,
        DetPostError::InvalidShape {
            reason: "dims overflow usize",
        }
    );
}

#[test]
fn raw_output_rows_and_batches() {
    let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
    let raw = RawOutput::new(data, &[2, 2, 3]).unwrap();
    let view = raw.view();
    assert_eq!(view.total_rows(), 4);
    assert_eq!(view.row(2).unwrap(), &[6.0, 7.0, 8.0]);
    assert!(view.row(4).is_none());
    assert_eq!(view.rows().count(), 4);

    let second = view.batch(1).unwrap();
    assert_eq!(second.dims(), [1, 2, 3]);
    assert_eq!(second.row(0).unwrap(), &[6.0, 7.0, 8.0]);

    let err = view.batch(2).err().unwrap();
    assert_eq!(
        err,
        DetPostError::IndexOutOfBounds {
            index: 2,
            len: 2,
            context: "batch",
        }
    );
}

#[test]
fn raw_output_from_rows_requires_equal_lengths() {
    let raw = RawOutput::from_rows(&[vec![1.0f32, 2.0], vec![3.0, 4.0]]).unwrap();
    assert_eq!(raw.dims(), [1, 2, 2]);
    assert_eq!(raw.data(), &[1.0, 2.0, 3.0, 4.0]);

    let err = RawOutput::from_rows(&[vec![1.0f32, 2.0], vec![3.0]]).err().unwrap();
    assert_eq!(
        err,
        DetPostError::InvalidShape {
            reason: "rows have different lengths",
        }
    );
}

#[test]
fn letterbox_ratios_follow_the_longer_side() {
    let ratios = LetterboxRatios::from_dims(640, 480).unwrap();
    assert_eq!(ratios.x_ratio(), 1.0);
    assert!((ratios.y_ratio() - 640.0 / 480.0).abs() < 1e-6);

    let ratios = LetterboxRatios::from_dims(300, 600).unwrap();
    assert_eq!(ratios.x_ratio(), 2.0);
    assert_eq!(ratios.y_ratio(), 1.0);

    assert!(LetterboxRatios::from_dims(0, 10).is_err());
}

#[test]
fn letterbox_ratios_reject_non_positive_values() {
    let err = LetterboxRatios::new(0.0, 1.0).err().unwrap();
    assert_eq!(
        err,
        DetPostError::InvalidRatio {
            name: "x_ratio",
            value: 0.0,
        }
    );
    assert!(LetterboxRatios::new(1.0, f32::INFINITY).is_err());
    assert!(LetterboxRatios::new(1.0, f32::NAN).is_err());
}

#[test]
fn config_rejects_thresholds_outside_unit_interval() {
    let err = PostProcessor::new(PostprocessConfig {
        confidence_threshold: 1.5,
        ..PostprocessConfig::default()
    })
    .err()
    .unwrap();
    assert_eq!(
        err,
        DetPostError::InvalidThreshold {
            name: "confidence_threshold",
            value: 1.5,
        }
    );

    let err = PostprocessConfig {
        overlap_threshold: -0.1,
        ..PostprocessConfig::default()
    }
    .validate()
    .err()
    .unwrap();
    assert!(matches!(
        err,
        DetPostError::InvalidThreshold {
            name: "overlap_threshold",
            ..
        }
    ));

    let cfg = PostprocessConfig {
        class_threshold: f32::NAN,
        ..PostprocessConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn standalone_threshold_check_matches_config_validation() {
    use detpost::lowlevel::validate_threshold;

    assert!(validate_threshold("overlap_threshold", 0.0).is_ok());
    assert!(validate_threshold("overlap_threshold", 1.0).is_ok());
    assert_eq!(
        validate_threshold("overlap_threshold", 1.2),
        Err(DetPostError::InvalidThreshold {
            name: "overlap_threshold",
            value: 1.2,
        })
    );

    let cfg = PostprocessConfig {
        overlap_threshold: 1.2,
        ..PostprocessConfig::default()
    };
    assert_eq!(cfg.validate(), validate_threshold("overlap_threshold", 1.2));
    assert!(validate_threshold("overlap_threshold", f32::INFINITY).is_err());
}

#[test]
fn default_config_is_valid() {
    let cfg = PostprocessConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.score_mode, ScoreMode::ObjectnessTimesClass);
    assert_eq!(cfg.decode_params().confidence_threshold, 0.25);
}

#[test]
fn labels_resolve_names_or_ids() {
    let labels = Labels::coco();
    assert_eq!(labels.label_for(2), Label::Name("car".into()));
    assert_eq!(labels.label_for(80), Label::Id(80));
    assert!(Labels::default().is_empty());
}
