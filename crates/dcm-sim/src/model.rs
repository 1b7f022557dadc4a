//! TransientModel trait for pluggable dynamic systems.

/// Trait for transient (dynamic) system models driven by a scalar input.
///
/// A TransientModel must implement:
/// - State type (Clone, for snapshots)
/// - Initial state
/// - Input evaluation: u = g(t)
/// - RHS (right-hand side) computation: x_dot = f(x, u)
/// - Scalar field arithmetic for integration: add states, scale by scalar
pub trait TransientModel {
    /// State type (must be Clone).
    type State: Clone;

    /// Return the initial state at t=0.
    fn initial_state(&self) -> Self::State;

    /// Instantaneous input applied at time `t`.
    fn input(&self, t: f64) -> f64;

    /// Compute state derivative dxdt = f(x, u).
    fn rhs(&self, x: &Self::State, u: f64) -> Self::State;

    /// Add two states element-wise: result = a + b.
    fn add(&self, a: &Self::State, b: &Self::State) -> Self::State;

    /// Scale a state by a scalar: result = scale * a.
    fn scale(&self, a: &Self::State, scale: f64) -> Self::State;
}
