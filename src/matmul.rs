//! Dense kernels behind the linear stage.
//!
//! - default: a simple, safe triple-loop GEMM
//! - optional: `matrixmultiply::sgemm` via the `matrixmultiply` feature

/// Computes `out = x * w^T + b` for a row-major batch.
///
/// Shapes:
/// - `x`: `(rows, in_dim)`
/// - `w`: `(out_dim, in_dim)`
/// - `b`: `(out_dim,)`
/// - `out`: `(rows, out_dim)`, overwritten
pub(crate) fn affine_rows(
    x: &[f32],
    rows: usize,
    in_dim: usize,
    w: &[f32],
    b: &[f32],
    out_dim: usize,
    out: &mut [f32],
) {
    debug_assert_eq!(x.len(), rows * in_dim);
    debug_assert_eq!(w.len(), out_dim * in_dim);
    debug_assert_eq!(b.len(), out_dim);
    debug_assert_eq!(out.len(), rows * out_dim);

    if rows == 0 || out_dim == 0 {
        return;
    }

    for row in out.chunks_exact_mut(out_dim) {
        row.copy_from_slice(b);
    }

    // w^T is read through strides: element (p, j) lives at w[j * in_dim + p].
    gemm_f32(
        rows, out_dim, in_dim, // m, n, k
        1.0, x, in_dim, 1, // alpha, a, rsa, csa
        w, 1, in_dim, // b, rsb, csb
        1.0, out, out_dim, 1, // beta, c, rsc, csc
    );
}

/// `c = alpha * a * b + beta * c` with arbitrary strides.
///
/// `a` is `(m, k)`, `b` is `(k, n)`, `c` is `(m, n)`.
#[allow(clippy::too_many_arguments)]
#[inline]
fn gemm_f32(
    m: usize,
    n: usize,
    k: usize,
    alpha: f32,
    a: &[f32],
    rsa: usize,
    csa: usize,
    b: &[f32],
    rsb: usize,
    csb: usize,
    beta: f32,
    c: &mut [f32],
    rsc: usize,
    csc: usize,
) {
    debug_assert!(m > 0 && n > 0);
    if k == 0 {
        return;
    }

    #[cfg(feature = "matrixmultiply")]
    {
        // SAFETY: callers pass buffers sized for the given shapes and strides
        // (checked by the debug assertions in `affine_rows`).
        unsafe {
            matrixmultiply::sgemm(
                m,
                k,
                n,
                alpha,
                a.as_ptr(),
                rsa as isize,
                csa as isize,
                b.as_ptr(),
                rsb as isize,
                csb as isize,
                beta,
                c.as_mut_ptr(),
                rsc as isize,
                csc as isize,
            );
        }
    }

    #[cfg(not(feature = "matrixmultiply"))]
    for i in 0..m {
        for j in 0..n {
            let mut acc = 0.0_f32;
            let a0 = i * rsa;
            let b0 = j * csb;

            for p in 0..k {
                let av = a[a0 + p * csa];
                let bv = b[p * rsb + b0];
                acc = av.mul_add(bv, acc);
            }

            let idx = i * rsc + j * csc;
            c[idx] = alpha * acc + beta * c[idx];
        }
    }
}
