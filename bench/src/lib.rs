//! Benchmark utilities for the ECS runtime.
//!
//! - **Components**: Representative component types shared by the benchmarks
//! - **Workloads**: Seeded world builders and a churn driver for attach/detach heavy runs
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p rusty_ecs_bench
//!
//! # Run specific benchmark group
//! cargo bench -p rusty_ecs_bench -- collect
//! ```
//!
//! Results are written to `target/criterion/` with HTML reports for visualization.

pub mod components;
pub mod workload;
