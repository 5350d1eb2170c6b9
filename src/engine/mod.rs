mod error;
mod gateway;
mod payload;
mod process;
mod protocol;
#[cfg(test)]
mod scripted;

pub use error::EngineError;
pub use gateway::{Gateway, PendingCall};
pub use payload::{
    InfluenceResult, NodeId, PathResult, Payload, ResultShape, SeriesPoint, Subgraph, decode,
};
pub use process::ProcessGateway;
pub use protocol::{RemoteCall, operations};
#[cfg(test)]
pub(crate) use scripted::ScriptedGateway;
