//! Analytical validation tests for the QR eigen-solver
//!
//! Validates computed eigenpairs against closed-form solutions and against
//! nalgebra's dense symmetric eigen-solver.
//!
//! Test cases:
//! 1. Second-difference matrix (diag 2, off -1) - analytic eigenpairs
//! 2. Shifted vs unshifted iteration counts
//! 3. Orthogonality and reconstruction on non-uniform bands
//! 4. Manual driving of the sweep iterator

use nalgebra::{DMatrix, DVector};
use tqr_solver::{
    QrIteration, SolverConfig, SolverError, build_tridiagonal, second_difference_eigenpairs,
    solve, solve_with_config,
};

/// Max deviation of computed pairs from the analytic ones, eigenvector sign ignored.
fn analytic_errors(n: usize, pairs: &[(f64, DVector<f64>)]) -> (f64, f64) {
    let (values, vectors) = second_difference_eigenpairs(n);
    let mut value_error: f64 = 0.0;
    let mut vector_error: f64 = 0.0;
    // Both lists are ascending and the analytic eigenvalues are distinct.
    for (j, (value, vector)) in pairs.iter().enumerate() {
        let exact = vectors.column(j);
        value_error = value_error.max((value - values[j]).abs());
        vector_error = vector_error.max((vector - exact).amax().min((vector + exact).amax()));
    }
    (value_error, vector_error)
}

fn non_uniform() -> DMatrix<f64> {
    build_tridiagonal(
        vec![4.0, -1.0, 3.0, 2.5, 0.5, 1.0, -3.0, 7.0],
        vec![1.0, 2.0, -0.5, 1.5, 0.25, -2.0, 0.75],
        None,
    )
    .expect("valid bands")
}

/// Test 1: 5×5 second-difference matrix
///
/// λ_j = 2(1 - cos(jπ/6)), v_j(i) = sin(ijπ/6) normalised.
/// Expected: eigenpairs within 1e-6 with ε = 1e-6, in any order.
#[test]
fn test_second_difference_n5_shifted() {
    let a = build_tridiagonal(2.0, -1.0, Some(5)).unwrap();
    let result = solve(&a, 1e-6, true).unwrap();

    let (value_error, vector_error) = analytic_errors(5, &result.sorted_pairs());
    assert!(value_error < 1e-6, "eigenvalue error {value_error:e}");
    assert!(vector_error < 1e-6, "eigenvector error {vector_error:e}");
}

#[test]
fn test_second_difference_n5_unshifted() {
    let a = build_tridiagonal(2.0, -1.0, Some(5)).unwrap();
    let result = solve(&a, 1e-6, false).unwrap();

    let (value_error, vector_error) = analytic_errors(5, &result.sorted_pairs());
    assert!(value_error < 1e-6, "eigenvalue error {value_error:e}");
    // Plain QR stops as soon as the coupling drops below ε, which bounds the
    // eigenvector accuracy less tightly than the eigenvalues.
    assert!(vector_error < 1e-5, "eigenvector error {vector_error:e}");
}

/// Test 2: the Wilkinson shift never costs extra sweeps
#[test]
fn test_shifted_converges_faster() {
    for n in [4, 16, 32, 64] {
        let a = build_tridiagonal(2.0, -1.0, Some(n)).unwrap();
        let shifted = solve(&a, 1e-6, true).unwrap();
        let unshifted = solve(&a, 1e-6, false).unwrap();

        assert!(
            shifted.iterations() <= unshifted.iterations(),
            "n = {n}: shifted {} vs unshifted {}",
            shifted.iterations(),
            unshifted.iterations()
        );
        assert!(shifted.orthogonality_error() < 1e-10);
    }
}

/// Test 3: V orthogonal and V·Λ·Vᵗ ≈ A
#[test]
fn test_orthogonality_and_reconstruction() {
    let a = non_uniform();
    for shifted in [true, false] {
        let result = solve(&a, 1e-9, shifted).unwrap();
        assert!(result.orthogonality_error() < 1e-10);
        assert!(result.reconstruction_error(&a) < 1e-7);

        for j in 0..result.dimension() {
            let v = result.eigenvector(j).unwrap();
            assert!((v.norm() - 1.0).abs() < 1e-10);
            let residual = &a * &v - &v * result.eigenvalues()[j];
            assert!(residual.norm() < 1e-6, "mode {j}: residual {}", residual.norm());
        }
    }
}

#[test]
fn test_matches_dense_symmetric_eigen() {
    let a = non_uniform();
    let result = solve(&a, 1e-10, true).unwrap();

    let mut expected: Vec<f64> = a.clone().symmetric_eigen().eigenvalues.iter().copied().collect();
    expected.sort_by(f64::total_cmp);
    let computed: Vec<f64> = result.sorted_pairs().into_iter().map(|(value, _)| value).collect();

    for (got, want) in computed.iter().zip(&expected) {
        assert!((got - want).abs() < 1e-8, "{got} vs {want}");
    }
}

#[test]
fn test_decomposition_parts() {
    let a = build_tridiagonal(2.0, -1.0, Some(4)).unwrap();
    let result = solve(&a, 1e-6, true).unwrap();
    let k = result.iterations();
    let eigenvalues = result.eigenvalues().clone();

    let (v, lambda, iterations) = result.into_parts();
    assert_eq!(iterations, k);
    assert_eq!(lambda.diagonal(), eigenvalues);
    assert_eq!(v.shape(), (4, 4));
}

/// Test 4: the iterator can be driven and stopped by the caller
#[test]
fn test_manual_sweeps() {
    let a = build_tridiagonal(2.0, -1.0, Some(6)).unwrap();
    let config = SolverConfig::unshifted();
    let mut iteration = QrIteration::new(&a, &config).unwrap();

    let first: Vec<_> = iteration.by_ref().take(3).collect();
    assert_eq!(first.len(), 3);
    assert_eq!(iteration.iterations(), 3);
    assert!(!iteration.is_converged());
    assert!(first.iter().all(|sweep| sweep.shift == 0.0));

    // The iterate stays similar to A: same trace throughout.
    assert!((iteration.matrix().trace() - a.trace()).abs() < 1e-12);

    let remaining = iteration.by_ref().count();
    assert!(iteration.is_converged());
    let result = iteration.finish();
    assert_eq!(result.iterations(), 3 + remaining);
    assert_eq!(
        result.iterations(),
        solve_with_config(&a, &config).unwrap().iterations()
    );
}

#[test]
fn test_capped_solve_fails_cleanly() {
    let a = build_tridiagonal(2.0, -1.0, Some(16)).unwrap();
    let config = SolverConfig::unshifted().with_max_iterations(10);
    match solve_with_config(&a, &config) {
        Err(SolverError::NonConvergence { block, iterations }) => {
            assert_eq!(iterations, 10);
            assert!(block >= 1 && block <= 15);
        }
        other => panic!("expected NonConvergence, got {other:?}"),
    }
}
