// tests/solver_convergence_test.rs
use gbm_paths::mc::path_simulator::simulate_parallel;
use gbm_paths::models::params::SimulationParameters;
use statrs::statistics::Statistics;

// Log-space sampling is exact, so terminal log-price moments must not depend
// on the step count, unlike Euler-type schemes.
#[test]
fn test_terminal_log_moments_independent_of_steps() {
    let s0: f64 = 100.0;
    let r = 0.05;
    let q = 0.02;
    let sigma = 0.4;
    let t: f64 = 3.0;
    let paths = 20_000;

    let exact_mean = s0.ln() + (r - q - 0.5 * sigma * sigma) * t;
    let exact_sd = sigma * t.sqrt();

    for steps in [1usize, 4, 32, 100] {
        let params = SimulationParameters {
            s0,
            r,
            q,
            sigma,
            t,
            steps,
            paths,
            ..Default::default()
        };
        let ensemble = simulate_parallel(&params, 31 + steps as u64).unwrap();
        let log_terminal: Vec<f64> = ensemble
            .terminal_prices()
            .unwrap()
            .iter()
            .map(|s| s.ln())
            .collect();

        let mean = log_terminal.iter().mean();
        let sd = log_terminal.iter().std_dev();
        let mean_tol = 5.0 * exact_sd / (paths as f64).sqrt();

        println!("steps={} mean={} sd={}", steps, mean, sd);

        assert!(
            (mean - exact_mean).abs() < mean_tol,
            "log mean {} off by more than {} at {} steps",
            mean,
            mean_tol,
            steps
        );
        assert!(
            (sd - exact_sd).abs() / exact_sd < 0.03,
            "log sd {} vs {} at {} steps",
            sd,
            exact_sd,
            steps
        );
    }
}

#[test]
fn test_intermediate_times_have_exact_marginals() {
    let params = SimulationParameters {
        s0: 50.0,
        r: 0.03,
        q: 0.0,
        sigma: 0.25,
        t: 1.0,
        steps: 10,
        paths: 20_000,
        ..Default::default()
    };
    let ensemble = simulate_parallel(&params, 8).unwrap();
    let drift = params.r - params.q - 0.5 * params.sigma * params.sigma;

    for (i, t) in ensemble.time_grid().iter().enumerate() {
        let logs: Vec<f64> = ensemble.prices().row(i).iter().map(|s| s.ln()).collect();
        let mean = logs.iter().mean();
        let expected = params.s0.ln() + drift * t;
        let tol = 5.0 * params.sigma * t.sqrt() / (params.paths as f64).sqrt();
        assert!(
            (mean - expected).abs() < tol,
            "t={}: log mean {} vs {}",
            t,
            mean,
            expected
        );
    }
}
