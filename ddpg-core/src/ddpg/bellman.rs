//! Bellman backups and TD errors.

/// Regression targets of the critic.
///
/// `target[i] = reward[i]` if `done[i]`, otherwise `reward[i] + gamma * next_q[i]`.
/// A terminal transition never reads `next_q[i]`, so a non-finite value there
/// does not leak into the target.
pub fn bellman_targets(reward: &[f32], done: &[bool], next_q: &[f32], gamma: f64) -> Vec<f32> {
    debug_assert_eq!(reward.len(), done.len());
    debug_assert_eq!(reward.len(), next_q.len());

    reward
        .iter()
        .zip(done)
        .zip(next_q)
        .map(|((r, done), next_q)| {
            if *done {
                *r
            } else {
                (*r as f64 + gamma * *next_q as f64) as f32
            }
        })
        .collect()
}

/// Signed TD errors `reward[i] + gamma * next_q[i] - q[i]`.
///
/// Terminal flags are not taken into account: the bootstrap term is added
/// for terminal transitions too. Consumers such as prioritized replay rely on
/// this exact formula, which differs from [`bellman_targets`].
pub fn td_errors(reward: &[f32], q: &[f32], next_q: &[f32], gamma: f64) -> Vec<f32> {
    debug_assert_eq!(reward.len(), q.len());
    debug_assert_eq!(reward.len(), next_q.len());

    reward
        .iter()
        .zip(q)
        .zip(next_q)
        .map(|((r, q), next_q)| (*r as f64 + gamma * *next_q as f64 - *q as f64) as f32)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_terminal_target_is_reward() {
        let t = bellman_targets(&[5.0], &[true], &[123.0], 0.9);
        assert_eq!(t, vec![5.0]);
    }

    #[test]
    fn test_terminal_target_ignores_non_finite_next_q() {
        let t = bellman_targets(
            &[5.0, 1.0, -2.0],
            &[true, true, true],
            &[f32::NAN, f32::INFINITY, f32::NEG_INFINITY],
            0.9,
        );
        assert_eq!(t, vec![5.0, 1.0, -2.0]);
    }

    #[test]
    fn test_non_terminal_target() {
        // 1 + 0.9 * 2
        let t = bellman_targets(&[1.0], &[false], &[2.0], 0.9);
        assert!((t[0] - 2.8).abs() < 1e-6);

        // 1 + 0.9 * 1
        let t = bellman_targets(&[1.0], &[false], &[1.0], 0.9);
        assert!((t[0] - 1.9).abs() < 1e-6);
    }

    #[test]
    fn test_zero_discount() {
        let t = bellman_targets(&[1.0, 3.0], &[false, true], &[10.0, 10.0], 0.0);
        assert_eq!(t, vec![1.0, 3.0]);
    }

    #[test]
    fn test_mixed_batch() {
        let t = bellman_targets(
            &[1.0, 5.0, 0.0],
            &[false, true, false],
            &[2.0, f32::NAN, -1.0],
            0.5,
        );
        assert_eq!(t, vec![2.0, 5.0, -0.5]);
    }

    #[test]
    fn test_td_error_formula() {
        let td = td_errors(&[2.0], &[3.0], &[4.0], 0.9);
        assert!((td[0] - 2.6).abs() < 1e-6);
    }
}
