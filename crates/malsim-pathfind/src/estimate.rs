//! Monte Carlo conversion of TTC distributions into scalar costs.
//!
//! Exponential draws use inverse-transform sampling on a uniform `[0, 1)`
//! draw, so any seeded `Rng` replays the same estimates.

use malsim_core::{AttackGraph, CostMap, Ttc, TtcDistribution};
use rand::Rng;

use crate::config::SimulationConfig;
use crate::error::{Result, SimError};

/// Default number of draws per estimate.
pub const DEFAULT_SAMPLES: usize = 100;

/// Cost assigned to the miss branch of a Bernoulli mixture.
pub const DEFAULT_MISS_PENALTY: f64 = 500.0;

/// Sample-mean estimator for TTC distributions.
#[derive(Debug, Clone)]
pub struct CostEstimator {
    sample_count: usize,
    miss_penalty: f64,
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLES,
            miss_penalty: DEFAULT_MISS_PENALTY,
        }
    }
}

impl CostEstimator {
    pub fn new(sample_count: usize, miss_penalty: f64) -> Result<Self> {
        if sample_count == 0 {
            return Err(SimError::ZeroSamples);
        }
        Ok(Self {
            sample_count,
            miss_penalty,
        })
    }

    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        Self::new(config.ttc_samples, config.miss_penalty)
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn miss_penalty(&self) -> f64 {
        self.miss_penalty
    }

    /// One draw from `distribution`.
    pub fn sample<R: Rng>(&self, distribution: &TtcDistribution, rng: &mut R) -> f64 {
        match *distribution {
            TtcDistribution::Exponential { rate } => sample_exponential(rate, rng),
            TtcDistribution::ExponentialBernoulli { rate, bernoulli } => {
                if rng.random::<f64>() < bernoulli {
                    self.miss_penalty
                } else {
                    sample_exponential(rate, rng)
                }
            }
        }
    }

    /// Mean of `sample_count` independent draws.
    pub fn estimate<R: Rng>(&self, distribution: &TtcDistribution, rng: &mut R) -> Result<f64> {
        distribution.validate()?;
        let total: f64 = (0..self.sample_count)
            .map(|_| self.sample(distribution, rng))
            .sum();
        Ok(total / self.sample_count as f64)
    }

    /// Estimate a symbolic TTC.
    pub fn estimate_ttc<R: Rng>(&self, ttc: &Ttc, rng: &mut R) -> Result<f64> {
        let distribution = ttc.distribution()?;
        self.estimate(&distribution, rng)
    }

    /// Estimate a cost for every node; nodes without a TTC cost nothing.
    pub fn graph_costs<R: Rng>(&self, graph: &AttackGraph, rng: &mut R) -> Result<CostMap> {
        let mut costs = CostMap::with_capacity(graph.node_count());
        let mut estimated = 0usize;

        for node in graph.nodes() {
            let cost = match &node.ttc {
                Some(ttc) => {
                    estimated += 1;
                    self.estimate_ttc(ttc, rng)?
                }
                None => 0.0,
            };
            costs.insert(node.id, cost);
        }

        tracing::debug!(
            nodes = graph.node_count(),
            estimated,
            samples = self.sample_count,
            "Estimated node costs from TTC"
        );
        Ok(costs)
    }
}

fn sample_exponential<R: Rng>(rate: f64, rng: &mut R) -> f64 {
    let u: f64 = rng.random();
    -(1.0 - u).ln() / rate
}

#[cfg(test)]
mod tests {
    use super::*;
    use malsim_core::{AttackGraphBuilder, NodeId, TtcName};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_zero_samples_rejected() {
        assert!(matches!(
            CostEstimator::new(0, 500.0),
            Err(SimError::ZeroSamples)
        ));
    }

    #[test]
    fn test_exponential_mean_converges() {
        let estimator = CostEstimator::new(20_000, 500.0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let dist = TtcDistribution::Exponential { rate: 0.1 };
        let estimate = estimator.estimate(&dist, &mut rng).unwrap();
        assert!((estimate - 10.0).abs() < 0.5, "estimate {estimate}");
    }

    #[test]
    fn test_mixture_mean_converges() {
        let estimator = CostEstimator::new(20_000, 500.0).unwrap();
        let mut rng = StdRng::seed_from_u64(2);

        let dist = TtcDistribution::ExponentialBernoulli {
            rate: 1.0,
            bernoulli: 0.5,
        };
        let estimate = estimator.estimate(&dist, &mut rng).unwrap();
        let expected = dist.mean(500.0);
        assert!((estimate - expected).abs() < 10.0, "estimate {estimate}");
    }

    #[test]
    fn test_certain_miss_and_certain_hit() {
        let estimator = CostEstimator::new(50, 123.0).unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let always_miss = TtcDistribution::ExponentialBernoulli {
            rate: 1.0,
            bernoulli: 1.0,
        };
        assert_eq!(estimator.estimate(&always_miss, &mut rng).unwrap(), 123.0);

        let never_miss = TtcDistribution::ExponentialBernoulli {
            rate: 1.0,
            bernoulli: 0.0,
        };
        for _ in 0..100 {
            let draw = estimator.sample(&never_miss, &mut rng);
            assert!(draw >= 0.0 && draw < 123.0 * 10.0);
        }
    }

    #[test]
    fn test_seeded_estimates_replay() {
        let estimator = CostEstimator::default();
        let dist = TtcDistribution::Exponential { rate: 1.0 };

        let a = estimator
            .estimate(&dist, &mut StdRng::seed_from_u64(9))
            .unwrap();
        let b = estimator
            .estimate(&dist, &mut StdRng::seed_from_u64(9))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_distribution_rejected() {
        let estimator = CostEstimator::default();
        let mut rng = StdRng::seed_from_u64(4);
        let dist = TtcDistribution::Exponential { rate: -1.0 };
        assert!(matches!(
            estimator.estimate(&dist, &mut rng),
            Err(SimError::Graph(_))
        ));
    }

    #[test]
    fn test_graph_costs_default_to_zero_without_ttc() {
        let mut b = AttackGraphBuilder::new();
        let entry = b.or_node("entry");
        let hard = b.or_node("hard");
        b.set_ttc(hard, Ttc::named(TtcName::HardAndCertain));
        b.edge(entry, hard);
        let graph = b.build().unwrap();

        let estimator = CostEstimator::new(2_000, 500.0).unwrap();
        let costs = estimator
            .graph_costs(&graph, &mut StdRng::seed_from_u64(5))
            .unwrap();

        assert_eq!(costs.len(), 2);
        assert_eq!(costs[&NodeId(0)], 0.0);
        assert!(costs[&NodeId(1)] > 5.0 && costs[&NodeId(1)] < 15.0);
    }
}
