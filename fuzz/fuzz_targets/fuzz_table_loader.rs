//! Fuzz target for the tab-separated review table loader.
//!
//! Arbitrary bytes must load or fail with an error, never panic. Tables that
//! load are pushed through model construction and one density evaluation.

#![no_main]

use gb_config::ModelConfig;
use gb_core::data::load_observations_from_reader;
use gb_core::model::BetaBinomialModel;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(table) = load_observations_from_reader(data, "<fuzz>") else {
        return;
    };
    assert!(table.observations.iter().all(|o| o.row >= 1));

    if let Ok(model) = BetaBinomialModel::new(&table, &ModelConfig::default()) {
        let theta = model.initial_point();
        let mut grad = vec![0.0; model.n_params()];
        let _ = model.log_density_and_grad(&theta, &mut grad);
    }
});
