//! Node-level reads: chain, mempool, mining, network, blocks, transactions,
//! and wallet management calls that go to the node endpoint.

pub mod model;
pub mod queries;

pub use model::NodeStatus;
