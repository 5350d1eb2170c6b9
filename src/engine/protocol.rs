use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{EngineError, NodeId, ResultShape};

/// Wire names of the engine operations.
pub mod operations {
    pub const LOAD_DATASET: &str = "load_dataset";
    pub const NODE_COUNT: &str = "get_node_count";
    pub const EDGE_COUNT: &str = "get_edge_count";
    pub const MAX_DEGREE: &str = "get_max_dg";
    pub const AVERAGE_DEGREE: &str = "get_avg_dg";
    pub const CLUSTERING_EFFECT: &str = "get_cl_ef";
    pub const AVERAGE_CLUSTERING_COEFFICIENT: &str = "get_avg_cl_coef";
    pub const AVERAGE_COMMON_NEIGHBOURS: &str = "get_avg_cm_nb";
    pub const MAX_COMMON_NEIGHBOURS: &str = "get_max_cm_ng";
    pub const DEGREE_DISTRIBUTION: &str = "get_dg_dis";
    pub const CLUSTERING_EFFECT_DISTRIBUTION: &str = "get_cl_ef_dis";
    pub const CLUSTERING_COEFFICIENT_DISTRIBUTION: &str = "get_cl_coef_dis";
    pub const SHORTEST_DISTANCE: &str = "djikstra";
    pub const SHORTEST_PATH: &str = "djikstra_path";
    pub const BEST_SEED_NODES: &str = "get_best_starting_nodes";
    pub const SIMULATE_INFLUENCE_SPREAD: &str = "simulate_influnce_spread";
}

#[derive(Clone, Debug, PartialEq)]
pub struct RemoteCall {
    pub operation: String,
    pub params: Map<String, Value>,
    pub shape: ResultShape,
}

impl RemoteCall {
    pub fn new(operation: impl Into<String>, shape: ResultShape) -> Self {
        Self {
            operation: operation.into(),
            params: Map::new(),
            shape,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    #[cfg(test)]
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    pub fn load_dataset(path: &str) -> Self {
        Self::new(operations::LOAD_DATASET, ResultShape::Acknowledgment).with_param("path", path)
    }

    pub fn shortest_distance(start: NodeId, end: NodeId) -> Self {
        Self::new(operations::SHORTEST_DISTANCE, ResultShape::Scalar)
            .with_param("start", start)
            .with_param("end", end)
    }

    pub fn shortest_path(start: NodeId, end: NodeId) -> Self {
        Self::new(operations::SHORTEST_PATH, ResultShape::PathQuery)
            .with_param("start", start)
            .with_param("end", end)
    }

    pub fn best_seed_nodes(n: i64) -> Self {
        Self::new(operations::BEST_SEED_NODES, ResultShape::NodeList).with_param("n", n)
    }

    /// An empty seed list asks the engine to pick a random seed.
    pub fn simulate_influence_spread(seeds: &[NodeId]) -> Self {
        Self::new(operations::SIMULATE_INFLUENCE_SPREAD, ResultShape::Influence)
            .with_param("initial_nodes", seeds.to_vec())
    }
}

#[derive(Debug, Serialize)]
pub(super) struct WireRequest<'a> {
    pub(super) id: u64,
    pub(super) op: &'a str,
    pub(super) params: &'a Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireResponse {
    pub(super) id: u64,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl WireResponse {
    pub(super) fn into_outcome(self) -> Result<Value, EngineError> {
        match self.error {
            Some(message) => Err(EngineError::Remote(message)),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_serializes_as_single_json_object() {
        let call = RemoteCall::shortest_path(3, 9);
        let line = serde_json::to_string(&WireRequest {
            id: 7,
            op: &call.operation,
            params: &call.params,
        })
        .expect("request serializes");

        let parsed: Value = serde_json::from_str(&line).expect("round trip");
        assert_eq!(
            parsed,
            json!({"id": 7, "op": "djikstra_path", "params": {"start": 3, "end": 9}})
        );
    }

    #[test]
    fn error_field_wins_over_result() {
        let response: WireResponse =
            serde_json::from_str(r#"{"id": 1, "result": 4, "error": "no dataset"}"#)
                .expect("valid response");
        assert_eq!(
            response.into_outcome(),
            Err(EngineError::Remote("no dataset".to_owned()))
        );
    }

    #[test]
    fn missing_result_is_null() {
        let response: WireResponse = serde_json::from_str(r#"{"id": 2}"#).expect("valid response");
        assert_eq!(response.id, 2);
        assert_eq!(response.into_outcome(), Ok(Value::Null));
    }

    #[test]
    fn empty_seed_list_is_sent_as_empty_array() {
        let call = RemoteCall::simulate_influence_spread(&[]);
        assert_eq!(call.param("initial_nodes"), Some(&json!([])));
    }
}
