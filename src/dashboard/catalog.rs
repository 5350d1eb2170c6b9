use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::engine::operations;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct MetricSpec {
    pub id: String,
    pub display_name: String,
    pub operation: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ParameterSpec {
    /// Name of the request parameter the value is sent under.
    pub name: String,
    pub label: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct DistributionSpec {
    pub id: String,
    pub display_name: String,
    pub operation: String,
    #[serde(default = "default_x_label")]
    pub x_label: String,
    #[serde(default = "default_y_label")]
    pub y_label: String,
    #[serde(default)]
    pub parameter: Option<ParameterSpec>,
}

fn default_x_label() -> String {
    "x".to_owned()
}

fn default_y_label() -> String {
    "Count".to_owned()
}

/// The fixed set of metrics and distributions a dashboard offers.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Catalog {
    #[serde(default)]
    pub metrics: Vec<MetricSpec>,
    #[serde(default)]
    pub distributions: Vec<DistributionSpec>,
}

const BUILTIN_METRICS: [(&str, &str, &str); 8] = [
    ("nodes", "Nodes", operations::NODE_COUNT),
    ("edges", "Edges", operations::EDGE_COUNT),
    ("max_dg", "Max degree", operations::MAX_DEGREE),
    ("avg_dg", "Average degree", operations::AVERAGE_DEGREE),
    ("cl_ef", "Clustering effect", operations::CLUSTERING_EFFECT),
    (
        "avg_cl_coef",
        "Average clustering coefficient",
        operations::AVERAGE_CLUSTERING_COEFFICIENT,
    ),
    (
        "avg_cm_nb",
        "Average common neighbours",
        operations::AVERAGE_COMMON_NEIGHBOURS,
    ),
    (
        "max_cm_ng",
        "Max common neighbours",
        operations::MAX_COMMON_NEIGHBOURS,
    ),
];

impl Catalog {
    pub fn builtin() -> Self {
        let metrics = BUILTIN_METRICS
            .iter()
            .map(|(id, display_name, operation)| MetricSpec {
                id: (*id).to_owned(),
                display_name: (*display_name).to_owned(),
                operation: (*operation).to_owned(),
            })
            .collect();

        let distributions = vec![
            DistributionSpec {
                id: "dg_dis".to_owned(),
                display_name: "Degree distribution".to_owned(),
                operation: operations::DEGREE_DISTRIBUTION.to_owned(),
                x_label: "Degree".to_owned(),
                y_label: "Count".to_owned(),
                parameter: None,
            },
            DistributionSpec {
                id: "cl_ef_dis".to_owned(),
                display_name: "Clustering effect distribution".to_owned(),
                operation: operations::CLUSTERING_EFFECT_DISTRIBUTION.to_owned(),
                x_label: "Degree".to_owned(),
                y_label: "Clustering effect".to_owned(),
                parameter: None,
            },
            DistributionSpec {
                id: "cl_coef_dis".to_owned(),
                display_name: "Clustering coefficient distribution".to_owned(),
                operation: operations::CLUSTERING_COEFFICIENT_DISTRIBUTION.to_owned(),
                x_label: "Clustering coefficient".to_owned(),
                y_label: "Count".to_owned(),
                parameter: Some(ParameterSpec {
                    name: "bins".to_owned(),
                    label: "Bins".to_owned(),
                }),
            },
        ];

        Self {
            metrics,
            distributions,
        }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(raw).context("invalid catalog JSON")?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("failed to load catalog {}", path.display()))
    }

    fn validate(&self) -> Result<()> {
        let mut metric_ids = HashSet::new();
        for metric in &self.metrics {
            ensure!(!metric.id.is_empty(), "metric ids must not be empty");
            ensure!(
                !metric.operation.is_empty(),
                "metric {} has no operation",
                metric.id
            );
            ensure!(
                metric_ids.insert(metric.id.as_str()),
                "duplicate metric id {}",
                metric.id
            );
        }

        let mut distribution_ids = HashSet::new();
        for distribution in &self.distributions {
            ensure!(!distribution.id.is_empty(), "distribution ids must not be empty");
            ensure!(
                !distribution.operation.is_empty(),
                "distribution {} has no operation",
                distribution.id
            );
            ensure!(
                distribution_ids.insert(distribution.id.as_str()),
                "duplicate distribution id {}",
                distribution.id
            );
        }

        Ok(())
    }
}
