use axum::Json;
use axum::extract::Path;
use axum::response::IntoResponse;

use loadlab_types::api::{FibonacciResponse, SumResponse};

use crate::error::ApiError;
use crate::run_blocking;

/// Upper bound on fibonacci input. Naive double recursion is exponential;
/// anything past this burns CPU for longer than a request should live.
const FIBONACCI_MAX: i64 = 40;

/// Upper bound on the sum input.
const SUM_MAX: i64 = 10_000_000;

/// Deliberate CPU-burn endpoint for profiling demos. Admission control
/// happens before any work is started.
pub async fn fibonacci(Path(n): Path<i64>) -> Result<impl IntoResponse, ApiError> {
    if n < 0 {
        return Err(ApiError::Validation("n must be non-negative".into()));
    }
    if n > FIBONACCI_MAX {
        return Err(ApiError::Validation(format!(
            "n must be <= {} to prevent timeout",
            FIBONACCI_MAX
        )));
    }

    let result = run_blocking(move || Ok(fib(n as u64))).await?;

    Ok(Json(FibonacciResponse {
        n,
        fibonacci: result,
        message: "CPU intensive computation completed".into(),
    }))
}

pub async fn sum(Path(n): Path<i64>) -> Result<impl IntoResponse, ApiError> {
    if n < 0 {
        return Err(ApiError::Validation("n must be non-negative".into()));
    }
    if n > SUM_MAX {
        return Err(ApiError::Validation(format!("n must be <= {}", SUM_MAX)));
    }

    let result = run_blocking(move || Ok(sum_to(n as u64))).await?;

    Ok(Json(SumResponse {
        n,
        sum: result,
        message: "Computation completed".into(),
    }))
}

// Intentionally exponential — this is the load primitive, not a target
// for optimization.
fn fib(n: u64) -> u64 {
    if n <= 1 {
        n
    } else {
        fib(n - 1) + fib(n - 2)
    }
}

fn sum_to(n: u64) -> u64 {
    (0..=n).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fib_base_cases_and_known_values() {
        assert_eq!(fib(0), 0);
        assert_eq!(fib(1), 1);
        assert_eq!(fib(10), 55);
        assert_eq!(fib(20), 6765);
    }

    #[test]
    fn sum_matches_closed_form() {
        assert_eq!(sum_to(0), 0);
        assert_eq!(sum_to(100), 100 * 101 / 2);
        assert_eq!(sum_to(10_000_000), 10_000_000u64 * 10_000_001 / 2);
    }
}
