use super::simulate::{self, SimulationResult};
use crate::engine::cancel::StopSignal;
use crate::engine::config::SimulationConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One configuration per seed, everything else taken from `base`.
pub fn with_seeds(base: &SimulationConfig, seeds: &[u64]) -> Vec<SimulationConfig> {
    seeds.iter().map(|&seed| base.with_seed(seed)).collect()
}

/// Runs independent chains, one per configuration.
///
/// Chains share nothing but the stop signal. Results come back in the order of `configs`;
/// a failing chain does not abort the others. Progress is reported per finished chain.
#[instrument(skip_all, name = "ensemble_workflow", fields(runs = configs.len()))]
pub fn run(
    configs: &[SimulationConfig],
    reporter: &ProgressReporter,
    stop: &StopSignal,
) -> Vec<Result<SimulationResult, EngineError>> {
    reporter.report(Progress::PhaseStart {
        name: "Ensemble Sampling",
    });
    reporter.report(Progress::TaskStart {
        total_steps: configs.len() as u64,
    });
    info!(runs = configs.len(), "Starting independent Monte Carlo chains.");

    let finished = AtomicU64::new(0);
    let run_one = |config: &SimulationConfig| {
        let result = simulate::run(config.clone(), &ProgressReporter::new(), stop);
        let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
        reporter.report(Progress::TaskProgress { completed: done });
        result
    };

    #[cfg(not(feature = "parallel"))]
    let iterator = configs.iter();

    #[cfg(feature = "parallel")]
    let iterator = configs.par_iter();

    let results: Vec<_> = iterator.map(run_one).collect();

    let failures = results.iter().filter(|r| r.is_err()).count();
    info!(
        runs = results.len(),
        failures, "Independent Monte Carlo chains finished."
    );
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::SimulationConfigBuilder;
    use std::sync::Mutex;

    fn small_config(seed: u64) -> SimulationConfig {
        SimulationConfigBuilder::new()
            .box_length(6.0)
            .particle_count(20)
            .temperature(1.0)
            .cutoff(2.5)
            .n_steps(400)
            .max_displacement(0.3)
            .save_every(50)
            .seed(seed)
            .build()
            .unwrap()
    }

    #[test]
    fn with_seeds_only_changes_the_seed() {
        let base = small_config(1);
        let configs = with_seeds(&base, &[5, 6, 7]);
        assert_eq!(configs.len(), 3);
        for (config, seed) in configs.iter().zip([5, 6, 7]) {
            assert_eq!(config.seed, seed);
            assert_eq!(config.with_seed(1), base);
        }
    }

    #[test]
    fn results_preserve_input_order_and_match_single_runs() {
        let configs = with_seeds(&small_config(0), &[11, 12, 13, 14]);
        let results = run(&configs, &ProgressReporter::new(), &StopSignal::new());

        for (config, result) in configs.iter().zip(&results) {
            let result = result.as_ref().unwrap();
            assert_eq!(result.config.seed, config.seed);

            let single =
                simulate::run(config.clone(), &ProgressReporter::new(), &StopSignal::new())
                    .unwrap();
            assert_eq!(result.final_energy.to_bits(), single.final_energy.to_bits());
            assert_eq!(result.acceptance, single.acceptance);
        }
    }

    #[test]
    fn failing_chain_does_not_abort_the_others() {
        let mut broken = small_config(2);
        broken.temperature = -1.0;
        let configs = vec![small_config(1), broken, small_config(3)];

        let results = run(&configs, &ProgressReporter::new(), &StopSignal::new());
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(EngineError::InvalidConfiguration(_))
        ));
        assert!(results[2].is_ok());
    }

    #[test]
    fn progress_counts_finished_chains() {
        let completed = Mutex::new(Vec::new());
        let configs = with_seeds(&small_config(0), &[1, 2, 3]);
        {
            let reporter = ProgressReporter::with_callback(Box::new(|event: Progress| {
                if let Progress::TaskProgress { completed: done } = event {
                    completed.lock().unwrap().push(done);
                }
            }));
            run(&configs, &reporter, &StopSignal::new());
        }
        let mut completed = completed.into_inner().unwrap();
        completed.sort_unstable();
        assert_eq!(completed, vec![1, 2, 3]);
    }

    #[test]
    fn stop_signal_cancels_every_chain() {
        let stop = StopSignal::new();
        stop.request_stop();
        let configs = with_seeds(&small_config(0), &[1, 2]);
        for result in run(&configs, &ProgressReporter::new(), &stop) {
            let result = result.unwrap();
            assert!(result.cancelled);
            assert_eq!(result.steps_completed, 0);
        }
    }
}
