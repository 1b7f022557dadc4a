//! Integration tests: motor time response through the public run API.

use dcm_core::{Tolerances, nearly_equal};
use dcm_sim::{
    ForwardEuler, PhysicalParameters, SignalKind, SignalParameters, SimOptions, SimulationWindow,
    TransientModel, derivative, integrate, run, signal,
};

fn bench_motor() -> PhysicalParameters {
    PhysicalParameters {
        resistance: 2.0,
        inductance: 0.5,
        torque_constant: 0.1,
        back_emf_constant: 0.1,
        inertia: 0.02,
        stiffness: 0.1,
    }
}

#[test]
fn trace_length_matches_grid() {
    let cases = [(5.0, 0.001, 5001), (1.0, 0.01, 101), (2.5, 0.5, 6), (0.35, 0.1, 4)];
    for (t_end, dt, expected) in cases {
        let result = run(
            &bench_motor(),
            &SignalParameters::default(),
            &SimulationWindow::new(t_end, dt),
        )
        .unwrap();
        assert_eq!(result.len(), expected, "t_end={t_end}, dt={dt}");
        assert_eq!(result.u.len(), expected);
        assert_eq!(result.current.len(), expected);
        assert_eq!(result.theta.len(), expected);
        assert_eq!(result.omega.len(), expected);

        let last = *result.t.last().unwrap();
        assert!(last <= t_end + dt);
    }
}

#[test]
fn single_point_trace_holds_initial_state() {
    // t_end shorter than one step leaves only the t=0 grid point
    for kind in SignalKind::ALL {
        let sig = SignalParameters::new(kind, 10.0, 2.0);
        let result = run(&bench_motor(), &sig, &SimulationWindow::new(0.0005, 0.001)).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.t[0], 0.0);
        assert_eq!(result.current[0], 0.0);
        assert_eq!(result.theta[0], 0.0);
        assert_eq!(result.omega[0], 0.0);
        assert_eq!(result.u[0], signal(0.0, 10.0, 2.0, kind).unwrap());
    }
}

#[test]
fn first_step_is_forward_euler_from_rest() {
    let p = bench_motor();
    let sig = SignalParameters::new(SignalKind::Rectangular, 10.0, 2.0);
    let dt = 0.001;
    let result = run(&p, &sig, &SimulationWindow::new(0.01, dt)).unwrap();

    // State recorded before the update: index 1 is x0 + dt * f(x0, u0)
    let d0 = derivative(&Default::default(), 10.0, &p);
    assert_eq!(result.current[1], dt * d0.current);
    assert_eq!(result.theta[1], 0.0);
    assert_eq!(result.omega[1], 0.0);

    // Second step: theta still lags, omega picks up torque
    let x1 = result.state(1).unwrap();
    let d1 = derivative(&x1, result.u[1], &p);
    assert_eq!(result.current[2], x1.current + dt * d1.current);
    assert_eq!(result.omega[2], x1.omega + dt * d1.omega);
    assert!(result.omega[2] > 0.0);
}

#[test]
fn zero_input_stays_at_rest() {
    for kind in SignalKind::ALL {
        let sig = SignalParameters::new(kind, 0.0, 1.0);
        let result = run(&bench_motor(), &sig, &SimulationWindow::new(3.0, 0.001)).unwrap();
        assert!(result.current.iter().all(|&v| v == 0.0));
        assert!(result.theta.iter().all(|&v| v == 0.0));
        assert!(result.omega.iter().all(|&v| v == 0.0));
        assert!(result.u.iter().all(|&v| v == 0.0));
    }
}

#[test]
fn identical_runs_are_bit_identical() {
    let sig = SignalParameters::new(SignalKind::Triangular, 10.0, 2.0);
    let window = SimulationWindow::new(5.0, 0.001);
    let a = run(&bench_motor(), &sig, &window).unwrap();
    let b = run(&bench_motor(), &sig, &window).unwrap();
    assert_eq!(a, b);
    for (x, y) in a.omega.iter().zip(&b.omega) {
        assert_eq!(x.to_bits(), y.to_bits());
    }
}

#[test]
fn step_input_spins_the_rotor() {
    // Constant voltage for the first 5 s (period 10 s rectangular)
    let sig = SignalParameters::new(SignalKind::Rectangular, 10.0, 10.0);
    let result = run(&bench_motor(), &sig, &SimulationWindow::new(1.0, 0.001)).unwrap();

    assert!(result.u.iter().all(|&u| u == 10.0));
    let last = result.len() - 1;
    assert!(result.current[last] > 0.0);
    assert!(result.theta[last] > 0.0);
    assert!(result.omega[last] > 0.0);
    // Current bounded by the stall value u/R
    assert!(result.current.iter().all(|&i| i <= 10.0 / 2.0 + 1e-9));

    // Reference values from an independent Euler loop
    let tol = Tolerances {
        abs: 0.0,
        rel: 1e-9,
    };
    assert!(nearly_equal(result.current[last], 4.504586155539056, tol));
    assert!(nearly_equal(result.theta[last], 5.460735132910344, tol));
    assert!(nearly_equal(result.omega[last], 9.099998759601453, tol));
}

#[test]
fn recorded_input_follows_the_waveform() {
    let sig = SignalParameters::new(SignalKind::Sinusoidal, 3.0, 0.5);
    let result = run(&bench_motor(), &sig, &SimulationWindow::new(1.0, 0.01)).unwrap();
    for (n, (&t, &u)) in result.t.iter().zip(&result.u).enumerate() {
        assert!((t - n as f64 * 0.01).abs() < 1e-12);
        assert_eq!(u, signal(t, 3.0, 0.5, SignalKind::Sinusoidal).unwrap());
    }
}

#[test]
fn unstable_step_diverges_without_error() {
    // dt far above L/R = 1e-3 s: explicit Euler blows up
    let p = PhysicalParameters {
        resistance: 1000.0,
        inductance: 1.0,
        ..bench_motor()
    };
    let sig = SignalParameters::new(SignalKind::Rectangular, 10.0, 1.0);
    let result = run(&p, &sig, &SimulationWindow::new(100.0, 0.1)).unwrap();

    assert_eq!(result.len(), 1001);
    let idx = result.first_non_finite().expect("trace should diverge");
    assert!(idx > 0);
}

#[test]
fn generic_integrate_matches_run() {
    let p = bench_motor();
    let sig = SignalParameters::new(SignalKind::Triangular, 5.0, 1.0);
    let window = SimulationWindow::new(0.5, 0.001);
    let model = dcm_sim::DcMotorModel::new(p, sig.build().unwrap()).unwrap();

    let record = integrate(
        &model,
        &ForwardEuler,
        model.initial_state(),
        &window,
        &SimOptions::default(),
        None,
    )
    .unwrap();
    let via_run = run(&p, &sig, &window).unwrap();

    assert_eq!(record.t, via_run.t);
    assert_eq!(record.u, via_run.u);
    let omega: Vec<f64> = record.x.iter().map(|x| x.omega).collect();
    assert_eq!(omega, via_run.omega);
}
