//! Pollard-rho (Brent variant) factorization of the handshake `pq`.

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

fn abs_sub(a: u128, b: u128) -> u128 {
    a.max(b) - a.min(b)
}

/// Upper bound on the Brent cycle length before a constant is abandoned.
const MAX_CYCLE: u128 = 1 << 22;

fn brent(n: u128, c: u128) -> Option<u128> {
    let step = |v: u128| (v * v + c) % n;

    let mut y = 3 * (n / 7) % n;
    let m = (7 * (n / 13)).clamp(1, 128);
    let (mut g, mut r, mut q) = (1u128, 1u128, 1u128);
    let (mut x, mut ys) = (0u128, 0u128);

    while g == 1 {
        if r > MAX_CYCLE {
            return None;
        }
        x = y;
        for _ in 0..r {
            y = step(y);
        }
        let mut k = 0;
        while k < r && g == 1 {
            ys = y;
            for _ in 0..m.min(r - k) {
                y = step(y);
                q = q * abs_sub(x, y) % n;
            }
            g = gcd(q, n);
            k += m;
        }
        r *= 2;
    }

    if g == n {
        // The batch overshot; walk back one step at a time.
        g = 1;
        for _ in 0..r {
            ys = step(ys);
            g = gcd(abs_sub(x, ys), n);
            if g > 1 {
                break;
            }
        }
    }

    (g > 1 && g < n).then_some(g)
}

/// Split `pq` into its two factors `(p, q)` with `p ≤ q`.
///
/// Returns `None` when `pq` is prime, below 4, or resists every constant
/// tried; the caller treats that as a failed handshake rather than looping.
pub fn factorize(pq: u64) -> Option<(u64, u64)> {
    let n = pq as u128;
    if n < 4 {
        return None;
    }
    if n % 2 == 0 {
        return Some((2, pq / 2));
    }
    let scaled = [43u128, 47, 53, 59, 61].map(|k| k * (n / 103) % n);
    for c in scaled.into_iter().chain(1..=8) {
        if let Some(g) = brent(n, c) {
            let (p, q) = (g as u64, (n / g) as u64);
            return Some((p.min(q), p.max(q)));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_handshake_sized_pq() {
        assert_eq!(factorize(1470626929934143021), Some((1206429347, 1218991343)));
        assert_eq!(factorize(2363612107535801713), Some((1518968219, 1556064227)));
    }

    #[test]
    fn even_input() {
        assert_eq!(factorize(2 * 1_000_003), Some((2, 1_000_003)));
    }

    #[test]
    fn product_of_six_digit_primes() {
        assert_eq!(factorize(999_983 * 1_000_003), Some((999_983, 1_000_003)));
    }

    #[test]
    fn degenerate_inputs_do_not_panic() {
        assert_eq!(factorize(0), None);
        assert_eq!(factorize(1), None);
        assert_eq!(factorize(3), None);
        assert_eq!(factorize(1_000_003), None);
    }
}
