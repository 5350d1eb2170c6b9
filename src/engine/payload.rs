use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use super::EngineError;

pub type NodeId = i64;
pub type SeriesPoint = (f64, f64);

/// Sparse weighted adjacency: source -> target -> weight. No symmetry is assumed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Subgraph {
    adjacency: BTreeMap<NodeId, BTreeMap<NodeId, f64>>,
}

impl Subgraph {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn from_edges(edges: impl IntoIterator<Item = (NodeId, NodeId, f64)>) -> Self {
        let mut subgraph = Self::new();
        for (source, target, weight) in edges {
            subgraph.insert_edge(source, target, weight);
        }
        subgraph
    }

    pub fn insert_node(&mut self, id: NodeId) {
        self.adjacency.entry(id).or_default();
    }

    pub fn insert_edge(&mut self, source: NodeId, target: NodeId, weight: f64) {
        self.adjacency
            .entry(source)
            .or_default()
            .insert(target, weight);
    }

    /// Every id that appears as a source or as any target, each once, ascending.
    pub fn node_ids(&self) -> BTreeSet<NodeId> {
        let mut ids = BTreeSet::new();
        for (source, targets) in &self.adjacency {
            ids.insert(*source);
            ids.extend(targets.keys().copied());
        }
        ids
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.adjacency.contains_key(&id)
            || self
                .adjacency
                .values()
                .any(|targets| targets.contains_key(&id))
    }

    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, f64)> + '_ {
        self.adjacency.iter().flat_map(|(source, targets)| {
            targets
                .iter()
                .map(move |(target, weight)| (*source, *target, *weight))
        })
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeMap::len).sum()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PathResult {
    pub subgraph: Subgraph,
    pub path: Vec<NodeId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InfluenceResult {
    pub subgraph: Subgraph,
    pub counts: Vec<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultShape {
    Acknowledgment,
    Scalar,
    Series,
    PathQuery,
    NodeList,
    Influence,
}

impl ResultShape {
    pub fn label(self) -> &'static str {
        match self {
            Self::Acknowledgment => "acknowledgment",
            Self::Scalar => "scalar",
            Self::Series => "pair series",
            Self::PathQuery => "path result",
            Self::NodeList => "node list",
            Self::Influence => "influence result",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Acknowledgment,
    Scalar(f64),
    Series(Vec<SeriesPoint>),
    Path(PathResult),
    Nodes(Vec<NodeId>),
    Influence(InfluenceResult),
}

impl Payload {
    fn shape(&self) -> ResultShape {
        match self {
            Self::Acknowledgment => ResultShape::Acknowledgment,
            Self::Scalar(_) => ResultShape::Scalar,
            Self::Series(_) => ResultShape::Series,
            Self::Path(_) => ResultShape::PathQuery,
            Self::Nodes(_) => ResultShape::NodeList,
            Self::Influence(_) => ResultShape::Influence,
        }
    }

    fn mismatch(self, expected: ResultShape) -> EngineError {
        EngineError::malformed(format!(
            "expected {}, got {}",
            expected.label(),
            self.shape().label()
        ))
    }

    pub fn into_scalar(self) -> Result<f64, EngineError> {
        match self {
            Self::Scalar(value) => Ok(value),
            other => Err(other.mismatch(ResultShape::Scalar)),
        }
    }

    pub fn into_series(self) -> Result<Vec<SeriesPoint>, EngineError> {
        match self {
            Self::Series(series) => Ok(series),
            other => Err(other.mismatch(ResultShape::Series)),
        }
    }

    pub fn into_path(self) -> Result<PathResult, EngineError> {
        match self {
            Self::Path(result) => Ok(result),
            other => Err(other.mismatch(ResultShape::PathQuery)),
        }
    }

    pub fn into_nodes(self) -> Result<Vec<NodeId>, EngineError> {
        match self {
            Self::Nodes(nodes) => Ok(nodes),
            other => Err(other.mismatch(ResultShape::NodeList)),
        }
    }

    pub fn into_influence(self) -> Result<InfluenceResult, EngineError> {
        match self {
            Self::Influence(result) => Ok(result),
            other => Err(other.mismatch(ResultShape::Influence)),
        }
    }
}

pub fn decode(shape: ResultShape, value: Value) -> Result<Payload, EngineError> {
    match shape {
        ResultShape::Acknowledgment => Ok(Payload::Acknowledgment),
        ResultShape::Scalar => decode_number(&value, "scalar result").map(Payload::Scalar),
        ResultShape::Series => decode_series(&value).map(Payload::Series),
        ResultShape::PathQuery => decode_path(&value).map(Payload::Path),
        ResultShape::NodeList => decode_node_list(&value, "node list").map(Payload::Nodes),
        ResultShape::Influence => decode_influence(&value).map(Payload::Influence),
    }
}

fn decode_number(value: &Value, what: &str) -> Result<f64, EngineError> {
    let number = value
        .as_f64()
        .ok_or_else(|| EngineError::malformed(format!("{what} is not a number: {value}")))?;
    if number.is_finite() {
        Ok(number)
    } else {
        Err(EngineError::malformed(format!("{what} is not finite")))
    }
}

fn decode_node_id(value: &Value) -> Result<NodeId, EngineError> {
    value
        .as_i64()
        .ok_or_else(|| EngineError::malformed(format!("node id is not an integer: {value}")))
}

fn parse_node_key(key: &str) -> Result<NodeId, EngineError> {
    key.trim()
        .parse::<NodeId>()
        .map_err(|_| EngineError::malformed(format!("subgraph key is not a node id: {key:?}")))
}

fn decode_array<'a>(value: &'a Value, what: &str) -> Result<&'a Vec<Value>, EngineError> {
    value
        .as_array()
        .ok_or_else(|| EngineError::malformed(format!("{what} is not an array")))
}

fn decode_pair(value: &Value) -> Result<(&Value, &Value), EngineError> {
    match decode_array(value, "pair")?.as_slice() {
        [first, second] => Ok((first, second)),
        other => Err(EngineError::malformed(format!(
            "expected a pair, got {} elements",
            other.len()
        ))),
    }
}

fn decode_series(value: &Value) -> Result<Vec<SeriesPoint>, EngineError> {
    decode_array(value, "series")?
        .iter()
        .map(|point| {
            let (x, y) = decode_pair(point)?;
            Ok((
                decode_number(x, "series x")?,
                decode_number(y, "series y")?,
            ))
        })
        .collect()
}

fn decode_node_list(value: &Value, what: &str) -> Result<Vec<NodeId>, EngineError> {
    decode_array(value, what)?
        .iter()
        .map(decode_node_id)
        .collect()
}

fn decode_subgraph(value: &Value) -> Result<Subgraph, EngineError> {
    let object = value
        .as_object()
        .ok_or_else(|| EngineError::malformed("subgraph is not an object"))?;

    let mut subgraph = Subgraph::new();
    for (source_key, targets) in object {
        let source = parse_node_key(source_key)?;
        let targets = targets.as_object().ok_or_else(|| {
            EngineError::malformed(format!("adjacency of node {source} is not an object"))
        })?;

        subgraph.insert_node(source);
        for (target_key, weight) in targets {
            let target = parse_node_key(target_key)?;
            let weight = decode_number(weight, "edge weight")?;
            subgraph.insert_edge(source, target, weight);
        }
    }

    Ok(subgraph)
}

fn decode_path(value: &Value) -> Result<PathResult, EngineError> {
    let (subgraph, path) = decode_pair(value)?;
    let subgraph = decode_subgraph(subgraph)?;
    let path = decode_node_list(path, "path")?;

    if let Some(stray) = path.iter().find(|id| !subgraph.contains_node(**id)) {
        return Err(EngineError::malformed(format!(
            "path node {stray} is not part of the returned subgraph"
        )));
    }

    Ok(PathResult { subgraph, path })
}

fn decode_influence(value: &Value) -> Result<InfluenceResult, EngineError> {
    let (subgraph, counts) = decode_pair(value)?;
    let subgraph = decode_subgraph(subgraph)?;
    let counts = decode_array(counts, "influence counts")?
        .iter()
        .map(|count| decode_number(count, "influence count"))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(InfluenceResult { subgraph, counts })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_path_with_string_keys() {
        let payload = decode(
            ResultShape::PathQuery,
            json!([{"1": {"2": 5}, "2": {"3": 1.5}}, [1, 2, 3]]),
        )
        .expect("valid path payload");

        let result = payload.into_path().expect("path variant");
        assert_eq!(result.path, vec![1, 2, 3]);
        assert_eq!(result.subgraph.edge_count(), 2);
        assert_eq!(
            result.subgraph.node_ids().into_iter().collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn rejects_path_node_outside_subgraph() {
        let error = decode(ResultShape::PathQuery, json!([{"1": {"2": 1}}, [1, 9]]))
            .expect_err("stray path node");
        assert!(matches!(error, EngineError::Malformed(_)));
    }

    #[test]
    fn rejects_non_integer_subgraph_keys() {
        let error = decode(ResultShape::PathQuery, json!([{"a": {"2": 1}}, []]))
            .expect_err("bad key");
        assert!(matches!(error, EngineError::Malformed(_)));
    }

    #[test]
    fn scalar_must_be_a_number() {
        assert_eq!(
            decode(ResultShape::Scalar, json!(42)),
            Ok(Payload::Scalar(42.0))
        );
        assert!(matches!(
            decode(ResultShape::Scalar, json!("42")),
            Err(EngineError::Malformed(_))
        ));
    }

    #[test]
    fn series_requires_pairs() {
        assert_eq!(
            decode(ResultShape::Series, json!([[0, 3], [1, 7.5]])),
            Ok(Payload::Series(vec![(0.0, 3.0), (1.0, 7.5)]))
        );
        assert!(matches!(
            decode(ResultShape::Series, json!([[0, 3, 4]])),
            Err(EngineError::Malformed(_))
        ));
        assert!(matches!(
            decode(ResultShape::Series, json!({"0": 3})),
            Err(EngineError::Malformed(_))
        ));
    }

    #[test]
    fn acknowledgment_accepts_anything() {
        assert_eq!(
            decode(ResultShape::Acknowledgment, Value::Null),
            Ok(Payload::Acknowledgment)
        );
        assert_eq!(
            decode(ResultShape::Acknowledgment, json!("Dataset loaded")),
            Ok(Payload::Acknowledgment)
        );
    }

    #[test]
    fn influence_keeps_counts_in_order() {
        let result = decode(ResultShape::Influence, json!([{"4": {}}, [1, 3, 6]]))
            .and_then(Payload::into_influence)
            .expect("valid influence payload");
        assert_eq!(result.counts, vec![1.0, 3.0, 6.0]);
        assert!(result.subgraph.contains_node(4));
        assert_eq!(result.subgraph.edge_count(), 0);
    }

    #[test]
    fn variant_mismatch_is_malformed() {
        let error = Payload::Scalar(1.0).into_series().expect_err("mismatch");
        assert!(matches!(error, EngineError::Malformed(_)));
    }

    #[test]
    fn subgraph_counts_targets_as_nodes() {
        let subgraph = Subgraph::from_edges([(1, 2, 5.0), (2, 3, 1.0)]);
        assert!(subgraph.contains_node(3));
        assert!(!subgraph.contains_node(4));
        assert_eq!(subgraph.node_ids().len(), 3);
    }
}
