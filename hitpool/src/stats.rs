use log::debug;
use ndarray::{ArrayView1, Zip};
use statrs::distribution::{ChiSquared, ContinuousCDF};

const EPS: f64 = 1e-10;

/// Does `q` cover every hit count `p` puts mass on?
pub(crate) fn is_pmf_subset(p: ArrayView1<f64>, q: ArrayView1<f64>) -> bool {
    Zip::from(p).and(q).all(|&p_i, &q_i| q_i > 0.0 || p_i <= 0.0)
}

/// `D_KL(p || q)` between two hits PMFs of the same length.
pub(crate) fn kl_divergence(p: ArrayView1<f64>, q: ArrayView1<f64>) -> f64 {
    Zip::from(p)
        .and(q)
        .fold(0.0, |sum, &p_i, &q_i| sum + kl_div_term(p_i, q_i))
}

#[inline]
fn kl_div_term(p_i: f64, q_i: f64) -> f64 {
    match (p_i > EPS, q_i > EPS) {
        (true, true) => p_i * (p_i / q_i).ln(),
        (true, false) => f64::INFINITY,
        (false, _) => 0.0,
    }
}

/// G statistic of `n` rolls observed as `p_hat`, against the exact `p`.
pub(crate) fn g_test(n: usize, p: ArrayView1<f64>, p_hat: ArrayView1<f64>) -> f64 {
    (n as f64) * (2.0 * kl_divergence(p_hat, p))
}

/// `None` when `dof` isn't a valid chi-squared parameter.
pub(crate) fn chisq_cdf(dof: f64, x: f64) -> Option<f64> {
    ChiSquared::new(dof).ok().map(|distr| distr.cdf(x))
}

/// p-value of sampled hits PMF `p_hat` (from `n` rolls) under the exact
/// hits PMF `p`. A hit count the exact PMF rules out gives 0.
pub(crate) fn multinomial_test(n: usize, p: ArrayView1<f64>, p_hat: ArrayView1<f64>) -> f64 {
    debug_assert_eq!(p.len(), p_hat.len());

    if !is_pmf_subset(p_hat, p) {
        return 0.0;
    }

    let possible = p.iter().filter(|&&p_i| p_i > 0.0).count();

    // a single possible hit count
    if possible <= 1 {
        return 1.0;
    }

    let dof = (possible - 1) as f64;
    let g = g_test(n, p, p_hat);
    let pvalue = chisq_cdf(dof, g).map(|cdf| 1.0 - cdf).unwrap_or(0.0);

    debug!("multinomial_test: n: {n}, dof: {dof}, g: {g}, p-value: {pvalue}");

    pvalue
}
