//! Invalid inputs are rejected before any integration step.

use dcm_sim::{
    PhysicalParameters, SimError, SignalKind, SignalParameters, SimOptions, SimulationWindow, run,
    run_with_options, run_with_progress,
};

fn assert_invalid(result: Result<dcm_sim::SimulationResult, SimError>, needle: &str) {
    match result {
        Err(SimError::InvalidParameter { what }) => {
            assert!(what.contains(needle), "message '{what}' lacks '{needle}'")
        }
        Ok(r) => panic!("expected rejection, got trace of {} points", r.len()),
    }
}

#[test]
fn zero_or_negative_inductance() {
    for l in [0.0, -1.0] {
        let p = PhysicalParameters {
            inductance: l,
            ..Default::default()
        };
        let r = run(&p, &SignalParameters::default(), &SimulationWindow::default());
        assert_invalid(r, "inductance");
    }
}

#[test]
fn zero_inertia() {
    let p = PhysicalParameters {
        inertia: 0.0,
        ..Default::default()
    };
    let r = run(&p, &SignalParameters::default(), &SimulationWindow::default());
    assert_invalid(r, "inertia");
}

#[test]
fn zero_resistance() {
    let p = PhysicalParameters {
        resistance: 0.0,
        ..Default::default()
    };
    let r = run(&p, &SignalParameters::default(), &SimulationWindow::default());
    assert_invalid(r, "resistance");
}

#[test]
fn zero_period() {
    for kind in SignalKind::ALL {
        let sig = SignalParameters::new(kind, 1.0, 0.0);
        let r = run(&PhysicalParameters::default(), &sig, &SimulationWindow::default());
        assert_invalid(r, "period");
    }
}

#[test]
fn zero_dt() {
    let r = run(
        &PhysicalParameters::default(),
        &SignalParameters::default(),
        &SimulationWindow::new(1.0, 0.0),
    );
    assert_invalid(r, "dt");
}

#[test]
fn non_positive_t_end() {
    for t_end in [0.0, -2.0] {
        let r = run(
            &PhysicalParameters::default(),
            &SignalParameters::default(),
            &SimulationWindow::new(t_end, 0.001),
        );
        assert_invalid(r, "t_end");
    }
}

#[test]
fn step_bound_exceeded() {
    let opts = SimOptions {
        max_steps: 10_000,
        record_every: 1,
    };
    let r = run_with_options(
        &PhysicalParameters::default(),
        &SignalParameters::default(),
        &SimulationWindow::new(1.0, 1e-9),
        &opts,
    );
    assert_invalid(r, "exceeds");
}

#[test]
fn rejection_emits_no_progress() {
    let mut calls = 0usize;
    let mut cb = |_: dcm_sim::SimProgress| calls += 1;
    let r = run_with_progress(
        &PhysicalParameters {
            inductance: 0.0,
            ..Default::default()
        },
        &SignalParameters::default(),
        &SimulationWindow::default(),
        &SimOptions::default(),
        Some(&mut cb),
    );
    assert!(r.is_err());
    assert_eq!(calls, 0);
}

#[test]
fn unrecognized_kind() {
    let err = "chirp".parse::<SignalKind>().unwrap_err();
    assert!(matches!(err, SimError::InvalidParameter { .. }));
}
