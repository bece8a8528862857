//! Built-in component definitions
//!
//! The recommendation blocks and the computer-vision blocks the backend
//! implements. Declaration order is palette order.

use serde_json::json;

use super::schema::{ConfigField, ConfigKind};
use super::{Category, ComponentType};

pub(super) fn recommender_components() -> Vec<ComponentType> {
    vec![
        ComponentType::new("data-source", Category::Input, "Data Source", "dataframe")
            .with_icon("database")
            .with_description("Loads user-item interactions from CSV, a database, an API or a synthetic generator")
            .field(
                ConfigField::choice("data_source", "synthetic", &["csv", "synthetic", "database", "api"])
                    .required(),
            )
            .field(ConfigField::new("file_path", ConfigKind::Str).required_when("data_source", "csv"))
            .field(ConfigField::int("sample_size", 0).at_least(0.0))
            .field(ConfigField::int("n_users", 100).at_least(1.0))
            .field(ConfigField::int("n_items", 200).at_least(1.0))
            .field(ConfigField::int("n_interactions", 1000).at_least(1.0)),
        ComponentType::new("features-input", Category::Input, "Features Input", "features")
            .with_icon("table")
            .with_description("Provides user or item side features")
            .field(ConfigField::choice("feature_type", "user", &["user", "item"]).required())
            .field(ConfigField::int("n_entities", 100).at_least(1.0)),
        ComponentType::new("preprocessor", Category::Transform, "Preprocessor", "processed-data")
            .accepting(["dataframe", "features"])
            .with_icon("filter")
            .with_description("Normalizes ratings and fills missing values")
            .field(ConfigField::boolean("normalize", true))
            .field(ConfigField::boolean("fill_missing", true)),
        ComponentType::new("split", Category::Transform, "Train/Test Split", "split-data")
            .accepting(["dataframe", "processed-data"])
            .with_icon("scissors")
            .with_description("Splits interactions into train and test sets")
            .field(ConfigField::float("test_size", 0.2).strictly_between(0.0, 1.0))
            .field(ConfigField::choice("method", "random", &["random", "temporal"])),
        ComponentType::new(
            "collaborative-filtering",
            Category::Model,
            "Collaborative Filtering",
            "model",
        )
        .accepting(["split-data", "processed-data"])
        .with_icon("users")
        .with_description("Neighbourhood-based recommendations from similar users or items")
        .field(ConfigField::choice("method", "user-based", &["user-based", "item-based"]))
        .field(ConfigField::int("k_neighbors", 50).at_least(1.0)),
        ComponentType::new(
            "matrix-factorization",
            Category::Model,
            "Matrix Factorization",
            "model",
        )
        .accepting(["split-data", "processed-data"])
        .with_icon("grid")
        .with_description("Latent factor model (SVD, ALS or NMF)")
        .field(ConfigField::choice("method", "svd", &["svd", "als", "nmf"]))
        .field(ConfigField::int("n_factors", 100).at_least(1.0))
        .field(ConfigField::int("n_epochs", 20).at_least(1.0)),
        ComponentType::new("xgboost", Category::Model, "XGBoost", "model")
            .accepting(["split-data", "processed-data", "features"])
            .with_icon("trees")
            .with_description("Gradient boosted trees over interaction and side features")
            .field(ConfigField::int("n_estimators", 100).at_least(1.0))
            .field(ConfigField::int("max_depth", 6).at_least(1.0))
            .field(ConfigField::float("learning_rate", 0.1).between(0.0, 1.0))
            .field(ConfigField::float("subsample", 0.8).between(0.0, 1.0))
            .field(ConfigField::float("colsample_bytree", 0.8).between(0.0, 1.0))
            .field(ConfigField::int("random_state", 42)),
        ComponentType::new("random-forest", Category::Model, "Random Forest", "model")
            .accepting(["split-data", "processed-data"])
            .with_icon("tree")
            .with_description("Bagged decision trees over interaction features")
            .field(ConfigField::int("n_estimators", 100).at_least(1.0))
            .field(ConfigField::new("max_depth", ConfigKind::Int).at_least(1.0))
            .field(ConfigField::int("min_samples_split", 2).at_least(2.0))
            .field(ConfigField::int("min_samples_leaf", 1).at_least(1.0))
            .field(ConfigField::new("max_features", ConfigKind::Str).with_default("sqrt"))
            .field(ConfigField::int("random_state", 42)),
        ComponentType::new("deep-learning", Category::Model, "Deep Learning", "model")
            .accepting(["split-data", "features"])
            .with_icon("brain")
            .with_description("Neural recommenders (NCF, Wide & Deep, DeepFM)")
            .field(ConfigField::choice("architecture", "ncf", &["ncf", "wide_deep", "deepfm"]))
            .field(ConfigField::int("embedding_dim", 64).at_least(1.0))
            .field(ConfigField::int("epochs", 10).at_least(1.0)),
        ComponentType::new("predictions", Category::Output, "Predictions", "recommendations")
            .accepting(["model"])
            .with_icon("list")
            .with_description("Top-k recommendations per user")
            .field(ConfigField::int("top_k", 10).at_least(1.0)),
        ComponentType::new("evaluation", Category::Output, "Evaluation", "metrics")
            .accepting(["model", "recommendations"])
            .with_icon("chart")
            .with_description("Rating and ranking metrics")
            .field(
                ConfigField::new("metrics", ConfigKind::List)
                    .with_default(json!(["rmse", "mae", "precision", "recall", "ndcg"])),
            )
            .field(ConfigField::new("k_values", ConfigKind::List).with_default(json!([5, 10, 20]))),
    ]
}

pub(super) fn vision_components() -> Vec<ComponentType> {
    vec![
        ComponentType::new("cv-data-source", Category::Input, "Video Source", "video-frames")
            .with_icon("video")
            .with_description("Frames from a video file or a synthetic moving object")
            .field(ConfigField::choice("source", "synthetic", &["synthetic", "video"]).required())
            .field(ConfigField::new("file_path", ConfigKind::Str).required_when("source", "video"))
            .field(ConfigField::int("n_frames", 100).at_least(1.0))
            .field(ConfigField::int("width", 640).at_least(1.0))
            .field(ConfigField::int("height", 480).at_least(1.0))
            .field(ConfigField::int("object_size", 50).at_least(1.0)),
        ComponentType::new("template-matcher", Category::Model, "Template Matcher", "tracked-boxes")
            .accepting(["video-frames"])
            .with_icon("crop")
            .with_description("Tracks the initial box by template matching")
            .field(ConfigField::choice(
                "method",
                "ccoeff_normed",
                &["ccoeff", "ccoeff_normed", "ccorr", "ccorr_normed", "sqdiff", "sqdiff_normed"],
            ))
            .field(ConfigField::boolean("update_template", false))
            .field(ConfigField::int("update_frequency", 10).at_least(1.0)),
        ComponentType::new("feature-matcher", Category::Model, "Feature Matcher", "tracked-boxes")
            .accepting(["video-frames"])
            .with_icon("target")
            .with_description("Tracks the initial box by keypoint matching")
            .field(ConfigField::choice("method", "orb", &["orb", "akaze", "brisk", "sift"]))
            .field(ConfigField::int("min_matches", 10).at_least(1.0))
            .field(ConfigField::float("ratio_threshold", 0.75).strictly_between(0.0, 1.0)),
        ComponentType::new("tracker", Category::Model, "Object Tracker", "tracked-boxes")
            .accepting(["video-frames"])
            .with_icon("crosshair")
            .with_description("OpenCV single-object tracker")
            .field(ConfigField::choice(
                "tracker_type",
                "kcf",
                &["kcf", "csrt", "medianflow", "mosse", "mil", "boosting", "tld"],
            ))
            .field(ConfigField::boolean("reinit_on_fail", false)),
        ComponentType::new("cv-evaluation", Category::Output, "Tracking Evaluation", "cv-metrics")
            .accepting(["tracked-boxes"])
            .with_icon("gauge")
            .with_description("IoU and centre error against ground truth")
            .field(ConfigField::new("metrics", ConfigKind::List).with_default(json!(["iou", "center_error"])))
            .field(
                ConfigField::new("iou_thresholds", ConfigKind::List).with_default(json!([0.3, 0.5, 0.7])),
            ),
    ]
}
