//! Session-scoped pipeline cache
//!
//! The full pipeline (load -> split -> train both models -> evaluate both
//! models) runs exactly once per session. A [`Session`] is the immutable
//! bundle of everything it produced; a [`SessionCache`] guards its
//! construction so racing first readers deduplicate onto a single in-flight
//! bootstrap, and a failed bootstrap leaves the cache empty rather than
//! publishing a half-built session.

use crate::data::{DatasetLoader, FeatureSummary, LabelCodecs, NormalizedDataset};
use crate::error::Result;
use crate::inference::{self, SurveyForm, Verdict};
use crate::training::{
    evaluate, train, train_eval_split, EvaluationReport, ModelKind, SplitIndices,
    TrainedClassifier, SPLIT_SEED, TRAIN_FRACTION,
};
use once_cell::sync::OnceCell;
use polars::prelude::DataFrame;
use tracing::info;

/// Everything the pipeline produces, computed once and then read-only
#[derive(Debug, Clone)]
pub struct Session {
    dataset: NormalizedDataset,
    split: SplitIndices,
    neighbor: TrainedClassifier,
    gaussian: TrainedClassifier,
    neighbor_report: EvaluationReport,
    gaussian_report: EvaluationReport,
    feature_summaries: Vec<FeatureSummary>,
    label_distribution: Vec<(String, usize)>,
}

impl Session {
    /// Run the pipeline over a CSV file.
    pub fn bootstrap_from_csv(path: &str) -> Result<Self> {
        Self::build(DatasetLoader::new().load_csv(path)?)
    }

    /// Run the pipeline over an in-memory DataFrame with the raw schema.
    pub fn bootstrap(df: &DataFrame) -> Result<Self> {
        Self::build(DatasetLoader::new().normalize(df)?)
    }

    fn build(dataset: NormalizedDataset) -> Result<Self> {
        let x = dataset.features()?;
        let y = dataset.labels()?;
        let classes = dataset.codecs().personality.classes().to_vec();

        let split = train_eval_split(dataset.n_rows(), TRAIN_FRACTION, SPLIT_SEED)?;
        let (x_train, y_train, x_eval, y_eval) = split.take(&x, &y);

        let neighbor = train(ModelKind::Neighbor, &x_train, &y_train)?;
        let gaussian = train(ModelKind::Gaussian, &x_train, &y_train)?;

        let neighbor_report = evaluate(&neighbor, &x_eval, &y_eval, &classes)?;
        let gaussian_report = evaluate(&gaussian, &x_eval, &y_eval, &classes)?;

        let feature_summaries = dataset.feature_summaries()?;
        let label_distribution = dataset.label_distribution()?;

        info!(
            rows = dataset.n_rows(),
            train = split.train.len(),
            eval = split.eval.len(),
            "session bootstrap complete"
        );

        Ok(Self {
            dataset,
            split,
            neighbor,
            gaussian,
            neighbor_report,
            gaussian_report,
            feature_summaries,
            label_distribution,
        })
    }

    /// The normalized dataset.
    pub fn dataset(&self) -> &NormalizedDataset {
        &self.dataset
    }

    /// The three codecs fitted during normalization.
    pub fn codecs(&self) -> &LabelCodecs {
        self.dataset.codecs()
    }

    /// Canonical feature-column order.
    pub fn feature_columns(&self) -> &'static [&'static str] {
        self.dataset.feature_columns()
    }

    /// The train/evaluation partition.
    pub fn split(&self) -> &SplitIndices {
        &self.split
    }

    /// The trained classifier of the requested kind.
    pub fn classifier(&self, kind: ModelKind) -> &TrainedClassifier {
        match kind {
            ModelKind::Neighbor => &self.neighbor,
            ModelKind::Gaussian => &self.gaussian,
        }
    }

    /// The evaluation report for the requested classifier.
    pub fn report(&self, kind: ModelKind) -> &EvaluationReport {
        match kind {
            ModelKind::Neighbor => &self.neighbor_report,
            ModelKind::Gaussian => &self.gaussian_report,
        }
    }

    /// Descriptive statistics per feature column.
    pub fn feature_summaries(&self) -> &[FeatureSummary] {
        &self.feature_summaries
    }

    /// Row count per decoded label.
    pub fn label_distribution(&self) -> &[(String, usize)] {
        &self.label_distribution
    }

    /// Predict from a canonical-order feature vector, decoding the label.
    pub fn predict_vector(&self, kind: ModelKind, features: &[f64]) -> Result<Verdict> {
        let prediction = inference::predict(self.classifier(kind), features)?;
        let label = self
            .codecs()
            .personality
            .decode(prediction.label_code)?
            .to_string();
        Ok(Verdict {
            label,
            confidence: prediction.confidence,
        })
    }

    /// Predict from raw survey answers.
    pub fn predict_form(&self, kind: ModelKind, form: &SurveyForm) -> Result<Verdict> {
        self.predict_vector(kind, &form.to_feature_vector())
    }
}

/// At-most-once holder for the session's pipeline artifacts.
///
/// All callers racing to initialize block on the one in-flight bootstrap;
/// afterwards reads are lock-free. An initialization error is returned to
/// the caller and nothing is cached, so a later call may retry with a
/// corrected source.
pub struct SessionCache {
    cell: OnceCell<Session>,
}

impl SessionCache {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Return the session, bootstrapping it with `init` if this is the
    /// first access.
    pub fn get_or_bootstrap<F>(&self, init: F) -> Result<&Session>
    where
        F: FnOnce() -> Result<Session>,
    {
        self.cell.get_or_try_init(init)
    }

    /// The session, if already bootstrapped.
    pub fn get(&self) -> Option<&Session> {
        self.cell.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PersonaError;
    use polars::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 25 respondents: 15 extrovert-leaning, 10 introvert-leaning
    fn survey_df() -> DataFrame {
        let mut time_alone = Vec::new();
        let mut stage_fear = Vec::new();
        let mut social = Vec::new();
        let mut outside = Vec::new();
        let mut drained = Vec::new();
        let mut friends = Vec::new();
        let mut posts = Vec::new();
        let mut label = Vec::new();

        for i in 0..15u32 {
            time_alone.push(1.0 + (i % 4) as f64);
            stage_fear.push("No");
            social.push(6.0 + (i % 5) as f64);
            outside.push(4.0 + (i % 4) as f64);
            drained.push("No");
            friends.push(8.0 + (i % 8) as f64);
            posts.push(5.0 + (i % 6) as f64);
            label.push("Extrovert");
        }
        for i in 0..10u32 {
            time_alone.push(8.0 + (i % 4) as f64);
            stage_fear.push("Yes");
            social.push((i % 3) as f64);
            outside.push((i % 3) as f64);
            drained.push("Yes");
            friends.push((i % 4) as f64);
            posts.push((i % 3) as f64);
            label.push("Introvert");
        }

        df!(
            "Time_spent_Alone" => time_alone,
            "Stage_fear" => stage_fear,
            "Social_event_attendance" => social,
            "Going_outside" => outside,
            "Drained_after_socializing" => drained,
            "Friends_circle_size" => friends,
            "Post_frequency" => posts,
            "Personality" => label
        )
        .unwrap()
    }

    #[test]
    fn test_bootstrap_produces_all_artifacts() {
        let session = Session::bootstrap(&survey_df()).unwrap();

        assert_eq!(session.dataset().n_rows(), 25);
        assert_eq!(session.split().train.len(), 20);
        assert_eq!(session.split().eval.len(), 5);
        assert_eq!(session.feature_columns().len(), 7);
        assert_eq!(session.feature_summaries().len(), 7);

        for kind in ModelKind::ALL {
            let report = session.report(kind);
            assert!(report.accuracy >= 0.0 && report.accuracy <= 1.0);
            assert_eq!(report.n_rows, 5);
            assert_eq!(report.confusion.len(), 2);
        }
    }

    #[test]
    fn test_predict_form_round_trip() {
        let session = Session::bootstrap(&survey_df()).unwrap();
        let form = SurveyForm {
            time_alone: 4,
            stage_fear: false,
            social_events: 8,
            going_outside: 5,
            drained_after_socializing: false,
            friends_circle: 10,
            post_frequency: 7,
        };

        for kind in ModelKind::ALL {
            let verdict = session.predict_form(kind, &form).unwrap();
            assert_eq!(verdict.label, "Extrovert");
            assert!(verdict.confidence > 0.5);
        }
    }

    #[test]
    fn test_shape_error_leaves_session_usable() {
        let session = Session::bootstrap(&survey_df()).unwrap();

        let err = session
            .predict_vector(ModelKind::Neighbor, &[1.0; 6])
            .unwrap_err();
        assert!(matches!(err, PersonaError::FeatureShape { .. }));

        // Subsequent valid calls still succeed
        let verdict = session
            .predict_vector(ModelKind::Neighbor, &[4.0, 0.0, 8.0, 5.0, 0.0, 10.0, 7.0])
            .unwrap();
        assert_eq!(verdict.label, "Extrovert");
    }

    #[test]
    fn test_cache_bootstraps_once() {
        let cache = SessionCache::new();
        let bootstraps = AtomicUsize::new(0);
        let df = survey_df();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    let session = cache
                        .get_or_bootstrap(|| {
                            bootstraps.fetch_add(1, Ordering::SeqCst);
                            Session::bootstrap(&df)
                        })
                        .unwrap();
                    assert_eq!(session.dataset().n_rows(), 25);
                });
            }
        });

        assert_eq!(bootstraps.load(Ordering::SeqCst), 1);
        assert!(cache.is_initialized());
    }

    #[test]
    fn test_failed_bootstrap_caches_nothing() {
        let cache = SessionCache::new();
        let bad = survey_df().drop("Personality").unwrap();

        let err = cache.get_or_bootstrap(|| Session::bootstrap(&bad)).unwrap_err();
        assert!(matches!(err, PersonaError::SchemaMismatch { .. }));
        assert!(!cache.is_initialized());

        // A corrected source can still initialize afterwards
        let session = cache
            .get_or_bootstrap(|| Session::bootstrap(&survey_df()))
            .unwrap();
        assert_eq!(session.dataset().n_rows(), 25);
    }
}
