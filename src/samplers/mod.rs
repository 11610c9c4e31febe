//! Sampling strategies for minimal samples.
//!
//! Samplers implement the shared [`Sampler`](crate::core::Sampler) trait. The
//! engine builds a fresh seeded sampler per call, or takes an injected one.

pub mod uniform;

pub use uniform::UniformRandomSampler;
