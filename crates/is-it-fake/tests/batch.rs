use std::{collections::HashMap, io::Cursor};

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use is_it_fake::{
    AdapterError, AnalysisError, ClassificationResult, Classifier, Detector, ErrorKind,
    ImageInput, LazyClassifier, SortKey, TriageConfig, VerdictKind, analyze_batch, sort_records,
};

/// Looks up the FAKE score by image width, so each test image gets a known score.
struct ByWidth(HashMap<u32, f64>);

impl Classifier for ByWidth {
    fn classify(&self, image: &DynamicImage) -> Result<Vec<ClassificationResult>, AdapterError> {
        let fake = self.0.get(&image.width()).copied().ok_or_else(|| {
            AdapterError::Inference(format!("no score for width {}", image.width()))
        })?;
        Ok(vec![("Real", 1.0 - fake).into(), ("Fake", fake).into()])
    }
}

fn png(width: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, 2, Rgb([90, 120, 200])))
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encoding should succeed");
    buf
}

fn classifier() -> ByWidth {
    ByWidth(HashMap::from([(1, 0.2), (2, 0.9), (3, 0.5), (4, 0.52)]))
}

#[test]
fn test_decode_failure_does_not_abort_batch() {
    let inputs = vec![
        ImageInput::new("first.png", png(1)),
        ImageInput::new("second.png", b"\x89PNG truncated".to_vec()),
        ImageInput::new("third.png", png(2)),
    ];

    let records = analyze_batch(&classifier(), inputs, &TriageConfig::default());
    assert_eq!(records.len(), 3);

    assert_eq!(records[0].verdict(), Some(VerdictKind::LikelyReal));
    assert!((records[0].fake_score() - 0.2).abs() < 1e-12);

    let err = records[1].error().expect("second image should fail");
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(records[1].fake_score().abs() < f64::EPSILON);
    assert!(records[1].image().is_none());

    assert_eq!(records[2].verdict(), Some(VerdictKind::AiGenerated));
    assert!(records[2].image().is_some());
}

#[test]
fn test_classifier_failure_is_recorded_per_item() {
    let inputs = vec![
        ImageInput::new("known.png", png(3)),
        ImageInput::new("unknown.png", png(9)),
    ];

    let records = analyze_batch(&classifier(), inputs, &TriageConfig::default());
    assert_eq!(records[0].verdict(), Some(VerdictKind::ManualReview));
    assert!(matches!(
        records[1].error(),
        Some(AnalysisError::Adapter(AdapterError::Inference(_)))
    ));
}

#[test]
fn test_sorting_after_analysis() {
    let inputs = vec![
        ImageInput::new("b.png", png(1)),
        ImageInput::new("a.png", png(2)),
        ImageInput::new("c.png", png(3)),
    ];
    let mut records = analyze_batch(&classifier(), inputs, &TriageConfig::default());
    let names = |records: &[is_it_fake::AnalysisRecord]| {
        records
            .iter()
            .map(|r| r.filename().to_string())
            .collect::<Vec<_>>()
    };

    sort_records(&mut records, SortKey::HighestFake);
    assert_eq!(names(&records), ["a.png", "c.png", "b.png"]);

    sort_records(&mut records, SortKey::LowestFake);
    assert_eq!(names(&records), ["b.png", "c.png", "a.png"]);

    sort_records(&mut records, SortKey::FilenameAsc);
    assert_eq!(names(&records), ["a.png", "b.png", "c.png"]);
}

#[test]
fn test_config_is_applied_per_call() {
    let detector = Detector::new(classifier());
    let records = detector.analyze_batch([ImageInput::new("close.png", png(4))]);
    assert_eq!(records[0].verdict(), Some(VerdictKind::ManualReview));

    let detector = detector.with_gray_zone(0.0).expect("in range");
    let records = detector.analyze_batch([ImageInput::new("close.png", png(4))]);
    assert_eq!(records[0].verdict(), Some(VerdictKind::AiGenerated));
}

#[test]
fn test_unavailable_model_fails_every_item() {
    let lazy = LazyClassifier::new(|| -> Result<ByWidth, AdapterError> {
        Err(AdapterError::Unavailable("model.onnx missing".to_string()))
    });
    let inputs = (1..=3).map(|w| ImageInput::new(format!("{w}.png"), png(w)));

    let records = analyze_batch(&lazy, inputs, &TriageConfig::default());
    assert_eq!(records.len(), 3);
    assert!(
        records
            .iter()
            .all(|r| r.error().map(AnalysisError::kind) == Some(ErrorKind::Adapter))
    );
    assert!(!lazy.is_initialized());
}

#[test]
fn test_nan_score_becomes_error_record() {
    let mut scores = classifier();
    scores.0.insert(5, f64::NAN);
    let inputs = vec![
        ImageInput::new("nan.png", png(5)),
        ImageInput::new("fine.png", png(2)),
    ];

    let records = analyze_batch(&scores, inputs, &TriageConfig::default());
    assert_eq!(records.len(), 2);
    assert!(matches!(
        records[0].error(),
        Some(AnalysisError::Adapter(AdapterError::InvalidOutput(_)))
    ));
    assert_eq!(records[0].verdict(), None);
    assert!(records[0].fake_score().abs() < f64::EPSILON);
    assert_eq!(records[1].verdict(), Some(VerdictKind::AiGenerated));
}
