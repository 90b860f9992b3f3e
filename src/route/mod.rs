//! Movement costs, least-cost routes, and bulk destination assignment.

pub mod cost;
pub mod dijkstra;
pub mod plan;

pub use cost::{entrance_cost, path_cost, CostTable};
pub use dijkstra::{
    shortest_path, shortest_paths, shortest_paths_with, travel_cost, ShortestPaths,
};
pub use plan::{nearest_destinations, Assignment};
