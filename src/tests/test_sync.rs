use ndarray::array;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::approximator::QFunction;
use crate::network::NeuralNetwork;
use crate::optimizer::{Adam, OptimizerWrapper};
use crate::sync::TargetSynchronizer;
use super::support::ConstantQ;

#[test]
fn test_sync_fires_on_interval() {
    let online = ConstantQ::new(array![1.0, 2.0], 1);
    let mut target = ConstantQ::new(array![0.0, 0.0], 1);
    let mut sync = TargetSynchronizer::new(3).unwrap();

    assert!(!sync.maybe_sync(&online, &mut target).unwrap());
    assert!(!sync.maybe_sync(&online, &mut target).unwrap());
    assert_eq!(target.values, array![0.0, 0.0]);
    assert_eq!(sync.steps_since_sync(), 2);

    assert!(sync.maybe_sync(&online, &mut target).unwrap());
    assert_eq!(target.values, array![1.0, 2.0]);
    assert_eq!(sync.steps_since_sync(), 0);
    assert_eq!(sync.syncs(), 1);
}

#[test]
fn test_interval_one_syncs_every_step() {
    let online = ConstantQ::new(array![1.0], 1);
    let mut target = ConstantQ::new(array![0.0], 1);
    let mut sync = TargetSynchronizer::new(1).unwrap();
    for _ in 0..4 {
        assert!(sync.maybe_sync(&online, &mut target).unwrap());
    }
    assert_eq!(sync.syncs(), 4);
}

#[test]
fn test_zero_interval_rejected() {
    assert!(TargetSynchronizer::new(0).is_err());
}

#[test]
fn test_target_frozen_between_syncs() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut online = NeuralNetwork::q_network(2, 2, 1, 8, OptimizerWrapper::Adam(Adam::default()), 0.01, &mut rng).unwrap();
    let mut target = online.clone();
    let mut sync = TargetSynchronizer::new(10).unwrap();

    let probe = array![0.3, -0.2];
    let frozen = target.predict(probe.view()).unwrap();
    let states = array![[1.0, 0.0], [0.0, 1.0]];
    let targets = array![[5.0, -5.0], [2.0, 2.0]];

    for epoch in 0..9 {
        online.fit(states.view(), targets.view(), epoch).unwrap();
        assert!(!sync.maybe_sync(&online, &mut target).unwrap());
        assert_eq!(target.predict(probe.view()).unwrap(), frozen);
    }
    assert_ne!(online.predict(probe.view()).unwrap(), frozen);

    online.fit(states.view(), targets.view(), 9).unwrap();
    assert!(sync.maybe_sync(&online, &mut target).unwrap());
    assert_eq!(target.predict(probe.view()).unwrap(), online.predict(probe.view()).unwrap());
    assert_eq!(target.parameters(), online.parameters());
}
