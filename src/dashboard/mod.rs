use std::sync::Arc;

use anyhow::{Result, ensure};
use log::debug;

use crate::engine::{EngineError, Gateway, NodeId, Payload, PendingCall, RemoteCall};

mod catalog;
mod distributions;
mod influence;
mod metrics;
mod path_query;
mod session;
mod status;

pub use catalog::Catalog;
pub use influence::{DEFAULT_SEED_COUNT, SpreadOutcome, parse_seed_list};
pub use status::Status;

use distributions::DistributionRegistry;
use influence::InfluenceQuery;
use metrics::MetricRegistry;
use path_query::PathQuery;
use session::Session;
use status::Tracked;

/// Owns every piece of dashboard state and the calls in flight for it.
///
/// Completions are routed by a key captured when the call was issued, so answers that
/// arrive in any order only ever touch the entity that asked for them.
pub struct Dashboard {
    gateway: Arc<dyn Gateway>,
    catalog: Catalog,
    session: Session,
    metrics: MetricRegistry,
    distributions: DistributionRegistry,
    path: PathQuery,
    influence: InfluenceQuery,
    in_flight: Vec<InFlight>,
}

struct InFlight {
    session_epoch: u64,
    target: Target,
    call: PendingCall,
}

#[derive(Clone, Debug)]
enum Target {
    Dataset,
    Metric(String),
    Distribution(String),
    Distance { epoch: u64 },
    Path { epoch: u64 },
    BestSeeds,
    Spread { seeds: Option<Vec<NodeId>> },
}

impl Dashboard {
    pub fn new(gateway: Arc<dyn Gateway>, catalog: Catalog) -> Self {
        let metrics = MetricRegistry::from_specs(&catalog.metrics);
        let distributions = DistributionRegistry::from_specs(&catalog.distributions);
        Self {
            gateway,
            catalog,
            session: Session::default(),
            metrics,
            distributions,
            path: PathQuery::default(),
            influence: InfluenceQuery::default(),
            in_flight: Vec::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn metrics(&self) -> &MetricRegistry {
        &self.metrics
    }

    pub fn distributions(&self) -> &DistributionRegistry {
        &self.distributions
    }

    pub fn path(&self) -> &PathQuery {
        &self.path
    }

    pub fn influence(&self) -> &InfluenceQuery {
        &self.influence
    }

    pub fn has_in_flight(&self) -> bool {
        !self.in_flight.is_empty()
    }

    fn ensure_ready(&self) -> Result<()> {
        ensure!(
            self.session.is_ready(),
            "no dataset is loaded (session is {})",
            self.session.status().label()
        );
        Ok(())
    }

    fn dispatch(&mut self, target: Target, call: RemoteCall) {
        debug!("dispatching {} for {target:?}", call.operation);
        let pending = self.gateway.invoke(call);
        self.in_flight.push(InFlight {
            session_epoch: self.session.epoch(),
            target,
            call: pending,
        });
    }

    /// Starts loading a dataset. Every metric, distribution and query goes back to its
    /// initial state, and answers still in flight for the previous dataset are dropped.
    pub fn submit_dataset_path(&mut self, path: &str) -> Result<()> {
        let call = self.session.begin(path)?;
        self.metrics = MetricRegistry::from_specs(&self.catalog.metrics);
        self.distributions = DistributionRegistry::from_specs(&self.catalog.distributions);
        self.path.invalidate();
        self.influence = InfluenceQuery::default();
        self.dispatch(Target::Dataset, call);
        Ok(())
    }

    pub fn fetch_metric(&mut self, id: &str) -> Result<()> {
        self.ensure_ready()?;
        let call = self.metrics.begin(id)?;
        self.dispatch(Target::Metric(id.to_owned()), call);
        Ok(())
    }

    pub fn rearm_metric(&mut self, id: &str) -> Result<()> {
        self.ensure_ready()?;
        self.metrics.rearm(id)
    }

    pub fn fetch_distribution(&mut self, id: &str, parameter: Option<i64>) -> Result<()> {
        self.ensure_ready()?;
        let call = self.distributions.begin(id, parameter)?;
        self.dispatch(Target::Distribution(id.to_owned()), call);
        Ok(())
    }

    pub fn rearm_distribution(&mut self, id: &str) -> Result<()> {
        self.ensure_ready()?;
        self.distributions.rearm(id)
    }

    pub fn set_node1(&mut self, node: Option<NodeId>) {
        self.path.set_node1(node);
    }

    pub fn set_node2(&mut self, node: Option<NodeId>) {
        self.path.set_node2(node);
    }

    pub fn compute_distance(&mut self) -> Result<()> {
        self.ensure_ready()?;
        let call = self.path.begin_distance()?;
        let epoch = self.path.epoch();
        self.dispatch(Target::Distance { epoch }, call);
        Ok(())
    }

    pub fn compute_path(&mut self) -> Result<()> {
        self.ensure_ready()?;
        let call = self.path.begin_path()?;
        let epoch = self.path.epoch();
        self.dispatch(Target::Path { epoch }, call);
        Ok(())
    }

    pub fn best_seeds(&mut self, n: i64) -> Result<()> {
        self.ensure_ready()?;
        let call = self.influence.begin_best_seeds(n)?;
        self.dispatch(Target::BestSeeds, call);
        Ok(())
    }

    /// `None` or an empty list lets the engine pick a random seed.
    pub fn simulate_spread(&mut self, seeds: Option<Vec<NodeId>>) -> Result<()> {
        self.ensure_ready()?;
        let seeds = seeds.filter(|seeds| !seeds.is_empty());
        let call = self.influence.begin_spread(seeds.as_deref());
        self.dispatch(Target::Spread { seeds }, call);
        Ok(())
    }

    /// Applies every answer that has arrived since the last poll. Returns how many calls
    /// finished.
    pub fn poll(&mut self) -> usize {
        let mut finished = Vec::new();
        self.in_flight.retain(|flight| match flight.call.try_take() {
            Some(outcome) => {
                debug!("{} answered", flight.call.operation());
                finished.push((flight.session_epoch, flight.target.clone(), outcome));
                false
            }
            None => true,
        });

        let count = finished.len();
        for (session_epoch, target, outcome) in finished {
            self.apply(session_epoch, target, outcome);
        }
        count
    }

    fn apply(&mut self, session_epoch: u64, target: Target, outcome: Result<Payload, EngineError>) {
        if session_epoch != self.session.epoch() {
            debug!("dropping answer for {target:?} from a previous dataset");
            return;
        }

        match target {
            Target::Dataset => self.session.complete(outcome),
            Target::Metric(id) => self.metrics.complete(&id, outcome),
            Target::Distribution(id) => self.distributions.complete(&id, outcome),
            Target::Distance { epoch } => self.path.complete_distance(epoch, outcome),
            Target::Path { epoch } => self.path.complete_path(epoch, outcome),
            Target::BestSeeds => self.influence.complete_best_seeds(outcome),
            Target::Spread { seeds } => self.influence.complete_spread(seeds, outcome),
        }
    }
}
