//! The proposal capability seam and the built-in random proposer.

use doe_core::{derive_substream_seed, DataTable, DoeError, RngHandle};
use doe_space::SearchSpace;
use serde::{Deserialize, Serialize};

use crate::store::MeasurementStore;

/// Capability that selects candidate configurations given history.
///
/// Implementations own whatever statistical machinery they need; the
/// campaign only requires that a proposal yields exactly `batch_quantity`
/// rows with one column per search space parameter. Proposals may be
/// expensive; the campaign memoizes them per (batch size, store epoch).
pub trait Proposer {
    /// Proposes a batch of candidate configurations.
    fn propose(
        &self,
        space: &SearchSpace,
        history: &MeasurementStore,
        batch_quantity: u64,
    ) -> Result<DataTable, DoeError>;
}

/// Default proposer drawing uniform independent samples per parameter.
///
/// Sampling is substream-seeded by (master seed, store epoch, batch size),
/// so identical campaign states propose identical batches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomProposer {
    /// Master seed for all proposal randomness.
    pub seed: u64,
}

impl RandomProposer {
    /// Creates a proposer with the given master seed.
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for RandomProposer {
    fn default() -> Self {
        Self::new(42)
    }
}

impl Proposer for RandomProposer {
    fn propose(
        &self,
        space: &SearchSpace,
        history: &MeasurementStore,
        batch_quantity: u64,
    ) -> Result<DataTable, DoeError> {
        let substream = derive_substream_seed(self.seed, history.epoch());
        let mut rng = RngHandle::from_seed(derive_substream_seed(substream, batch_quantity));
        let mut rows = Vec::with_capacity(batch_quantity as usize);
        for _ in 0..batch_quantity {
            let row = space
                .parameters()
                .iter()
                .map(|parameter| parameter.domain.sample(&mut rng))
                .collect();
            rows.push(row);
        }
        DataTable::new(space.parameter_names(), rows)
    }
}

#[cfg(test)]
mod tests {
    use doe_space::{Parameter, ParameterDomain, SearchSpace};

    use super::*;

    fn toy_space() -> SearchSpace {
        SearchSpace::new(vec![
            Parameter::new(
                "temperature",
                ParameterDomain::Discrete {
                    levels: vec![10.0, 20.0, 30.0],
                    tolerance: 0.5,
                },
            )
            .unwrap(),
            Parameter::new(
                "solvent",
                ParameterDomain::Categorical {
                    choices: vec!["water".into(), "ethanol".into()],
                },
            )
            .unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn proposals_repeat_for_identical_state() {
        let space = toy_space();
        let store = MeasurementStore::new(space.parameter_names());
        let proposer = RandomProposer::new(8001);
        let a = proposer.propose(&space, &store, 4).unwrap();
        let b = proposer.propose(&space, &store, 4).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 4);
    }

    #[test]
    fn proposals_stay_inside_the_domain() {
        let space = toy_space();
        let store = MeasurementStore::new(space.parameter_names());
        let batch = RandomProposer::new(7).propose(&space, &store, 16).unwrap();
        for (row_idx, _) in batch.rows().iter().enumerate() {
            for parameter in space.parameters() {
                let cell = batch.cell(row_idx, &parameter.name).unwrap();
                assert!(parameter.domain.accepts(cell, true));
            }
        }
    }
}
