// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Artifacts read by the dashboard pages.
//!
//! Transform outputs exist twice, once per pipeline implementation; the
//! [`Source`] picks which copy. Model outputs have a single location and
//! ignore it.

use crate::{Format, ObjectKey};
use std::fmt;
use std::str::FromStr;

const TRANSFORM_WINDOWS: &str = "transform/folder_6_parquet/folder_4_windows_function_filtered";
const TRANSFORM_PCT_CHANGE: &str =
    "transform/folder_6_parquet/folder_5_percentage_change_filtered";

/// Pipeline implementation that produced a transform output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Source {
    #[default]
    DuckDb,
    Pandas,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::DuckDb, Source::Pandas];

    pub fn suffix(&self) -> &'static str {
        match self {
            Source::DuckDb => "duckdb",
            Source::Pandas => "pandas",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "duckdb" => Ok(Source::DuckDb),
            "pandas" => Ok(Source::Pandas),
            other => Err(format!("unknown source '{other}', expected duckdb or pandas")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogEntry {
    UserFoodProportion,
    DailyPercentageChange,
    UserDailyPercentageChange,
    UserClusters,
    ClusterAnalysis,
    AnomaliesDetected,
    ModelStatistics,
    CollaborativeRecommendations,
    CollaborativeStats,
    ContentBasedRecommendations,
    ContentBasedStats,
}

impl CatalogEntry {
    pub const ALL: [CatalogEntry; 11] = [
        CatalogEntry::UserFoodProportion,
        CatalogEntry::DailyPercentageChange,
        CatalogEntry::UserDailyPercentageChange,
        CatalogEntry::UserClusters,
        CatalogEntry::ClusterAnalysis,
        CatalogEntry::AnomaliesDetected,
        CatalogEntry::ModelStatistics,
        CatalogEntry::CollaborativeRecommendations,
        CatalogEntry::CollaborativeStats,
        CatalogEntry::ContentBasedRecommendations,
        CatalogEntry::ContentBasedStats,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CatalogEntry::UserFoodProportion => "user-food-proportion",
            CatalogEntry::DailyPercentageChange => "daily-percentage-change",
            CatalogEntry::UserDailyPercentageChange => "user-daily-percentage-change",
            CatalogEntry::UserClusters => "user-clusters",
            CatalogEntry::ClusterAnalysis => "cluster-analysis",
            CatalogEntry::AnomaliesDetected => "anomalies-detected",
            CatalogEntry::ModelStatistics => "model-statistics",
            CatalogEntry::CollaborativeRecommendations => "collaborative-recommendations",
            CatalogEntry::CollaborativeStats => "collaborative-stats",
            CatalogEntry::ContentBasedRecommendations => "content-based-recommendations",
            CatalogEntry::ContentBasedStats => "content-based-stats",
        }
    }

    /// Whether the key depends on [`Source`]
    pub fn has_source_variants(&self) -> bool {
        matches!(
            self,
            CatalogEntry::UserFoodProportion
                | CatalogEntry::DailyPercentageChange
                | CatalogEntry::UserDailyPercentageChange
        )
    }

    pub fn key(&self, source: Source) -> ObjectKey {
        let suffix = source.suffix();
        match self {
            CatalogEntry::UserFoodProportion => ObjectKey::new(TRANSFORM_WINDOWS)
                .join(&format!("user_food_proportion_{suffix}.parquet")),
            CatalogEntry::DailyPercentageChange => ObjectKey::new(TRANSFORM_PCT_CHANGE)
                .join(&format!("daily_percentage_change_{suffix}.parquet")),
            CatalogEntry::UserDailyPercentageChange => ObjectKey::new(TRANSFORM_PCT_CHANGE)
                .join(&format!("user_daily_percentage_change_{suffix}.parquet")),
            CatalogEntry::UserClusters => ObjectKey::new("AI/clustering/results/user_clusters.xlsx"),
            CatalogEntry::ClusterAnalysis => {
                ObjectKey::new("AI/clustering/results/cluster_analysis.json")
            }
            CatalogEntry::AnomaliesDetected => {
                ObjectKey::new("AI/anomaly_detection/results/anomalies_detected.xlsx")
            }
            CatalogEntry::ModelStatistics => {
                ObjectKey::new("AI/anomaly_detection/results/model_statistics.json")
            }
            CatalogEntry::CollaborativeRecommendations => ObjectKey::new(
                "AI/recommender/collaborative_filtering/results/recommendations.json",
            ),
            CatalogEntry::CollaborativeStats => {
                ObjectKey::new("AI/recommender/collaborative_filtering/results/stats.json")
            }
            CatalogEntry::ContentBasedRecommendations => {
                ObjectKey::new("AI/recommender/content_based/results/recommendations.json")
            }
            CatalogEntry::ContentBasedStats => {
                ObjectKey::new("AI/recommender/content_based/results/stats.json")
            }
        }
    }

    pub fn format(&self) -> Format {
        match self {
            CatalogEntry::UserFoodProportion
            | CatalogEntry::DailyPercentageChange
            | CatalogEntry::UserDailyPercentageChange => Format::Parquet,
            CatalogEntry::UserClusters | CatalogEntry::AnomaliesDetected => Format::Spreadsheet,
            _ => Format::Json,
        }
    }

    /// Every distinct `(key, format)` the dashboard may request
    pub fn all_keys() -> Vec<(CatalogEntry, ObjectKey, Format)> {
        let mut keys = Vec::new();
        for entry in Self::ALL {
            if entry.has_source_variants() {
                for source in Source::ALL {
                    keys.push((entry, entry.key(source), entry.format()));
                }
            } else {
                keys.push((entry, entry.key(Source::default()), entry.format()));
            }
        }
        keys
    }
}

impl fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CatalogEntry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|entry| entry.name() == s)
            .ok_or_else(|| format!("unknown dataset '{s}'"))
    }
}
