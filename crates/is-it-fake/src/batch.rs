use core::fmt;
use std::{
    io::{self, Read},
    path::Path,
};

use image::DynamicImage;

use crate::{
    classifier::{ClassificationResult, Classifier},
    config::{SortKey, TriageConfig},
    error::AnalysisError,
    pipeline::analyze_bytes,
    scores::ScoreMap,
    verdict::VerdictKind,
};

/// Raw bytes of one uploaded or captured image.
///
/// An input whose source could not be read still carries its filename, so a
/// batch reports it as an error record instead of dropping it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    filename: String,
    data: Result<Vec<u8>, String>,
}

impl ImageInput {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            data: Ok(bytes),
        }
    }

    /// An input whose bytes are unavailable, with the reason.
    pub fn unreadable(filename: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            data: Err(reason.into()),
        }
    }

    /// Read a file; the filename is the final path component.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        Ok(Self::new(filename_of(path), bytes))
    }

    /// Like [`ImageInput::from_path`], but a read failure becomes an unreadable input.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read(path) {
            Ok(bytes) => Self::new(filename_of(path), bytes),
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "failed to read image file");
                Self::unreadable(filename_of(path), err.to_string())
            }
        }
    }

    /// Read a whole byte stream, such as a camera capture piped to stdin.
    pub fn from_reader(filename: impl Into<String>, mut reader: impl Read) -> io::Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self::new(filename, bytes))
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The image bytes, or [`AnalysisError::Read`] when the source was unreadable.
    pub fn bytes(&self) -> Result<&[u8], AnalysisError> {
        match &self.data {
            Ok(bytes) => Ok(bytes.as_slice()),
            Err(reason) => Err(AnalysisError::Read(reason.clone())),
        }
    }
}

fn filename_of(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// Display state of a batch record: a verdict, or the error that prevented one.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Verdict(VerdictKind),
    Failed(AnalysisError),
}

impl Outcome {
    #[must_use]
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Verdict(kind) => kind.icon(),
            Self::Failed(_) => "❌",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verdict(kind) => write!(f, "{kind}"),
            Self::Failed(err) => write!(f, "{} Error: {err}", self.icon()),
        }
    }
}

/// Result of analyzing one image in a batch.
#[derive(Debug, Clone)]
pub struct AnalysisRecord {
    filename: String,
    fake_score: f64,
    real_score: f64,
    outcome: Outcome,
    raw: Vec<ClassificationResult>,
    image: Option<DynamicImage>,
}

impl AnalysisRecord {
    fn failed(filename: String, err: AnalysisError) -> Self {
        Self {
            filename,
            fake_score: 0.0,
            real_score: 0.0,
            outcome: Outcome::Failed(err),
            raw: Vec::new(),
            image: None,
        }
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    #[must_use]
    pub fn fake_score(&self) -> f64 {
        self.fake_score
    }

    #[must_use]
    pub fn real_score(&self) -> f64 {
        self.real_score
    }

    #[must_use]
    pub fn scores(&self) -> ScoreMap {
        ScoreMap::new(self.real_score, self.fake_score)
    }

    /// FAKE confidence clamped to `[0, 1]` for progress bars.
    #[must_use]
    pub fn fake_progress(&self) -> f64 {
        self.fake_score.clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    #[must_use]
    pub fn verdict(&self) -> Option<VerdictKind> {
        match self.outcome {
            Outcome::Verdict(kind) => Some(kind),
            Outcome::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&AnalysisError> {
        match &self.outcome {
            Outcome::Verdict(_) => None,
            Outcome::Failed(err) => Some(err),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error().is_some()
    }

    #[must_use]
    pub fn raw(&self) -> &[ClassificationResult] {
        &self.raw
    }

    /// The decoded image, absent when analysis failed.
    #[must_use]
    pub fn image(&self) -> Option<&DynamicImage> {
        self.image.as_ref()
    }
}

/// Analyze a single input, turning any failure into an error record.
pub fn analyze_input<C: Classifier + ?Sized>(
    classifier: &C,
    input: ImageInput,
    config: &TriageConfig,
) -> AnalysisRecord {
    let ImageInput { filename, data } = input;
    let result = data
        .map_err(AnalysisError::Read)
        .and_then(|bytes| analyze_bytes(classifier, &bytes, config));
    match result {
        Ok((image, analysis)) => AnalysisRecord {
            filename,
            fake_score: analysis.fake_score(),
            real_score: analysis.real_score(),
            outcome: Outcome::Verdict(analysis.verdict()),
            raw: analysis.into_raw(),
            image: Some(image),
        },
        Err(err) => {
            tracing::warn!(
                filename = %filename,
                error = %err,
                kind = ?err.kind(),
                "image analysis failed"
            );
            AnalysisRecord::failed(filename, err)
        }
    }
}

/// Analyze every input in order.
///
/// Each image is processed independently: a failure produces an error record
/// for that image and processing moves on, so the output always has one
/// record per input, in input order.
pub fn analyze_batch<C, I>(classifier: &C, images: I, config: &TriageConfig) -> Vec<AnalysisRecord>
where
    C: Classifier + ?Sized,
    I: IntoIterator<Item = ImageInput>,
{
    let images = images.into_iter();
    let mut records = Vec::with_capacity(images.size_hint().0);

    for (i, input) in images.enumerate() {
        let _span =
            tracing::debug_span!("analyze", index = i, filename = input.filename()).entered();
        records.push(analyze_input(classifier, input, config));
    }

    let failed = records.iter().filter(|record| record.is_error()).count();
    tracing::info!(total = records.len(), failed, "batch analysis complete");
    records
}

/// Sort records in place. Every ordering is stable for equal keys.
pub fn sort_records(records: &mut [AnalysisRecord], key: SortKey) {
    match key {
        SortKey::HighestFake => records.sort_by(|a, b| b.fake_score.total_cmp(&a.fake_score)),
        SortKey::LowestFake => records.sort_by(|a, b| a.fake_score.total_cmp(&b.fake_score)),
        SortKey::FilenameAsc => {
            records.sort_by_cached_key(|record| record.filename.to_lowercase());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, io::Cursor};

    use image::{ImageFormat, Rgb, RgbImage};

    use super::*;
    use crate::error::{AdapterError, ErrorKind};

    /// Reports the red channel of the top-left pixel as the FAKE score.
    struct RedChannel {
        calls: Cell<usize>,
    }

    impl Classifier for RedChannel {
        fn classify(
            &self,
            image: &DynamicImage,
        ) -> Result<Vec<ClassificationResult>, AdapterError> {
            self.calls.set(self.calls.get() + 1);
            let red = f64::from(image.to_rgb8().get_pixel(0, 0)[0]) / 255.0;
            Ok(vec![("REAL", 1.0 - red).into(), ("FAKE", red).into()])
        }
    }

    fn png(red: u8) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([red, 0, 0])))
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .expect("encoding should succeed");
        buf
    }

    fn record(filename: &str, fake: f64) -> AnalysisRecord {
        AnalysisRecord {
            filename: filename.to_string(),
            fake_score: fake,
            real_score: 1.0 - fake,
            outcome: Outcome::Verdict(TriageConfig::default().verdict(fake)),
            raw: Vec::new(),
            image: None,
        }
    }

    fn filenames(records: &[AnalysisRecord]) -> Vec<&str> {
        records.iter().map(AnalysisRecord::filename).collect()
    }

    #[test]
    fn test_failure_is_isolated() {
        let classifier = RedChannel { calls: Cell::new(0) };
        let inputs = vec![
            ImageInput::new("one.png", png(255)),
            ImageInput::new("two.png", b"corrupt".to_vec()),
            ImageInput::new("three.png", png(0)),
        ];

        let records = analyze_batch(&classifier, inputs, &TriageConfig::default());
        assert_eq!(records.len(), 3);
        assert_eq!(classifier.calls.get(), 2);

        assert_eq!(records[0].verdict(), Some(VerdictKind::AiGenerated));
        assert!(records[0].image().is_some());
        assert_eq!(records[0].raw().len(), 2);

        let failed = &records[1];
        assert_eq!(failed.filename(), "two.png");
        assert_eq!(failed.error().map(AnalysisError::kind), Some(ErrorKind::Decode));
        assert!(failed.fake_score().abs() < f64::EPSILON);
        assert!(failed.real_score().abs() < f64::EPSILON);
        assert!(failed.image().is_none());
        assert!(failed.raw().is_empty());
        assert!(failed.outcome().to_string().starts_with("❌ Error: decode error"));

        assert_eq!(records[2].verdict(), Some(VerdictKind::LikelyReal));
    }

    #[test]
    fn test_adapter_failure_recorded() {
        struct Offline;
        impl Classifier for Offline {
            fn classify(
                &self,
                _image: &DynamicImage,
            ) -> Result<Vec<ClassificationResult>, AdapterError> {
                Err(AdapterError::Unavailable("model not loaded".to_string()))
            }
        }

        let records = analyze_batch(
            &Offline,
            [ImageInput::new("a.png", png(10)), ImageInput::new("b.png", png(20))],
            &TriageConfig::default(),
        );
        assert_eq!(records.len(), 2);
        assert!(
            records
                .iter()
                .all(|r| r.error().map(AnalysisError::kind) == Some(ErrorKind::Adapter))
        );
    }

    #[test]
    fn test_sort_orders() {
        let base = vec![record("b", 0.2), record("a", 0.9), record("c", 0.5)];

        let mut records = base.clone();
        sort_records(&mut records, SortKey::HighestFake);
        assert_eq!(filenames(&records), ["a", "c", "b"]);

        let mut records = base.clone();
        sort_records(&mut records, SortKey::LowestFake);
        assert_eq!(filenames(&records), ["b", "c", "a"]);

        let mut records = base;
        sort_records(&mut records, SortKey::FilenameAsc);
        assert_eq!(filenames(&records), ["a", "b", "c"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let base = vec![
            record("first", 0.4),
            record("Beta", 0.7),
            record("second", 0.4),
            record("beta", 0.1),
        ];

        let mut records = base.clone();
        sort_records(&mut records, SortKey::HighestFake);
        assert_eq!(filenames(&records), ["Beta", "first", "second", "beta"]);

        let mut records = base.clone();
        sort_records(&mut records, SortKey::LowestFake);
        assert_eq!(filenames(&records), ["beta", "first", "second", "Beta"]);

        let mut records = base;
        sort_records(&mut records, SortKey::FilenameAsc);
        assert_eq!(filenames(&records), ["Beta", "beta", "first", "second"]);
    }

    #[test]
    fn test_fake_progress_is_clamped() {
        assert!((record("x", 1.4).fake_progress() - 1.0).abs() < f64::EPSILON);
        assert!(record("x", -0.2).fake_progress().abs() < f64::EPSILON);
        assert!((record("x", 0.3).fake_progress() - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_input_from_reader() {
        let input = ImageInput::from_reader("camera", Cursor::new(vec![1, 2, 3])).unwrap();
        assert_eq!(input.filename(), "camera");
        assert_eq!(input.bytes().unwrap(), &[1, 2, 3]);
    }

    #[test]
    fn test_unreadable_input_recorded() {
        let classifier = RedChannel { calls: Cell::new(0) };
        let dir = tempfile::tempdir().unwrap();
        let missing = ImageInput::load(dir.path().join("gone.png"));
        assert_eq!(missing.filename(), "gone.png");
        assert!(matches!(missing.bytes(), Err(AnalysisError::Read(_))));

        let records = analyze_batch(
            &classifier,
            [missing, ImageInput::new("ok.png", png(200))],
            &TriageConfig::default(),
        );
        assert_eq!(records.len(), 2);
        assert_eq!(classifier.calls.get(), 1);

        let failed = &records[0];
        assert_eq!(failed.filename(), "gone.png");
        assert_eq!(failed.error().map(AnalysisError::kind), Some(ErrorKind::Read));
        assert!(failed.image().is_none());
        assert!(failed.outcome().to_string().starts_with("❌ Error: read error"));

        assert_eq!(records[1].verdict(), Some(VerdictKind::AiGenerated));
    }

    #[test]
    fn test_load_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, png(7)).unwrap();

        let input = ImageInput::load(&path);
        assert_eq!(input.filename(), "photo.png");
        assert_eq!(input.bytes().unwrap(), png(7).as_slice());
    }
}
