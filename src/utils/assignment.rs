//! 抽签分配算法 (Secret Santa)
//!
//! 对参与者做随机置换，要求结果:
//! - 是参与者集合到自身的双射
//! - 没有不动点 (不能给自己送礼)
//! - 没有互送的二元环 (A -> B 且 B -> A)
//!
//! 采用拒绝采样: 洗牌 -> 校验 -> 不合格则重试，重试次数有上限。

use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use thiserror::Error;

/// 少于 3 人时不存在既无自环又无互送的置换
pub const MIN_PARTICIPANTS: usize = 3;

/// 默认重试上限
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssignmentError {
    #[error("At least {MIN_PARTICIPANTS} distinct participants are required, got {0}")]
    TooFewParticipants(usize),

    #[error("No valid assignment found after {0} attempts")]
    Exhausted(u32),
}

/// 使用给定随机源生成 (giver, receiver) 列表。
///
/// giver 顺序与输入顺序一致 (报名顺序)，随机性只体现在 receiver 上。
pub fn generate_assignments<T, R>(
    participants: &[T],
    max_attempts: u32,
    rng: &mut R,
) -> Result<Vec<(T, T)>, AssignmentError>
where
    T: Copy + Eq + Hash,
    R: Rng + ?Sized,
{
    generate_assignments_with(participants, max_attempts, |receivers: &mut [T]| {
        receivers.shuffle(&mut *rng)
    })
}

/// 与 [`generate_assignments`] 相同，但洗牌逻辑由调用方提供。
pub fn generate_assignments_with<T, F>(
    participants: &[T],
    max_attempts: u32,
    mut shuffle: F,
) -> Result<Vec<(T, T)>, AssignmentError>
where
    T: Copy + Eq + Hash,
    F: FnMut(&mut [T]),
{
    let distinct: HashSet<T> = participants.iter().copied().collect();
    if distinct.len() != participants.len() || distinct.len() < MIN_PARTICIPANTS {
        return Err(AssignmentError::TooFewParticipants(distinct.len()));
    }

    for attempt in 1..=max_attempts {
        let mut receivers = participants.to_vec();
        shuffle(&mut receivers);

        let pairs: Vec<(T, T)> = participants.iter().copied().zip(receivers).collect();
        if is_valid_pairing(&pairs) {
            log::debug!("Assignment accepted on attempt {attempt}/{max_attempts}");
            return Ok(pairs);
        }
    }

    Err(AssignmentError::Exhausted(max_attempts))
}

/// 校验一组 (giver, receiver) 是否构成合法的抽签结果
pub fn is_valid_pairing<T>(pairs: &[(T, T)]) -> bool
where
    T: Copy + Eq + Hash,
{
    let edges: HashMap<T, T> = pairs.iter().copied().collect();
    if edges.len() != pairs.len() {
        // giver 重复
        return false;
    }

    let receivers: HashSet<T> = pairs.iter().map(|&(_, receiver)| receiver).collect();
    if receivers.len() != pairs.len() || !receivers.iter().all(|r| edges.contains_key(r)) {
        return false;
    }

    pairs
        .iter()
        .all(|(giver, receiver)| giver != receiver && edges.get(receiver) != Some(giver))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ids(n: i64) -> Vec<i64> {
        (1..=n).collect()
    }

    #[test]
    fn test_generated_pairs_are_valid_for_various_sizes() {
        for n in 3..=12 {
            let participants = ids(n);
            for seed in 0..50u64 {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let pairs = generate_assignments(&participants, DEFAULT_MAX_ATTEMPTS, &mut rng)
                    .expect("generation should succeed");

                assert_eq!(pairs.len(), participants.len());
                assert!(is_valid_pairing(&pairs), "invalid pairing {pairs:?}");

                // giver 保持报名顺序
                let givers: Vec<i64> = pairs.iter().map(|p| p.0).collect();
                assert_eq!(givers, participants);

                let mut receivers: Vec<i64> = pairs.iter().map(|p| p.1).collect();
                receivers.sort();
                assert_eq!(receivers, participants);
            }
        }
    }

    #[test]
    fn test_three_participants_form_a_three_cycle() {
        let forward = vec![(1, 2), (2, 3), (3, 1)];
        let backward = vec![(1, 3), (2, 1), (3, 2)];
        for seed in 0..20u64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let pairs = generate_assignments(&ids(3), DEFAULT_MAX_ATTEMPTS, &mut rng).unwrap();
            assert!(pairs == forward || pairs == backward, "unexpected {pairs:?}");
        }
    }

    #[test]
    fn test_same_seed_gives_same_assignment() {
        let participants = ids(8);
        let mut a = ChaCha8Rng::seed_from_u64(42);
        let mut b = ChaCha8Rng::seed_from_u64(42);
        assert_eq!(
            generate_assignments(&participants, DEFAULT_MAX_ATTEMPTS, &mut a).unwrap(),
            generate_assignments(&participants, DEFAULT_MAX_ATTEMPTS, &mut b).unwrap()
        );
    }

    #[test]
    fn test_identity_shuffle_exhausts_retries() {
        let mut calls = 0;
        let result = generate_assignments_with(&ids(4), DEFAULT_MAX_ATTEMPTS, |_: &mut [i64]| {
            calls += 1
        });
        assert_eq!(result, Err(AssignmentError::Exhausted(DEFAULT_MAX_ATTEMPTS)));
        assert_eq!(calls, DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn test_reciprocal_pairs_are_rejected() {
        // [1,2,3,4] 反转 -> 1<->4, 2<->3，全是互送
        let result = generate_assignments_with(&ids(4), 10, |r: &mut [i64]| r.reverse());
        assert_eq!(result, Err(AssignmentError::Exhausted(10)));
    }

    #[test]
    fn test_retries_until_valid_candidate() {
        let mut attempt = 0;
        let pairs = generate_assignments_with(&ids(5), DEFAULT_MAX_ATTEMPTS, |r: &mut [i64]| {
            attempt += 1;
            if attempt == 7 {
                r.rotate_left(1);
            }
        })
        .unwrap();
        assert_eq!(attempt, 7);
        assert_eq!(pairs, vec![(1, 2), (2, 3), (3, 4), (4, 5), (5, 1)]);
    }

    #[test]
    fn test_zero_attempts_fails_immediately() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(
            generate_assignments(&ids(5), 0, &mut rng),
            Err(AssignmentError::Exhausted(0))
        );
    }

    #[test]
    fn test_too_few_participants() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(
            generate_assignments(&ids(2), DEFAULT_MAX_ATTEMPTS, &mut rng),
            Err(AssignmentError::TooFewParticipants(2))
        );
        assert_eq!(
            generate_assignments::<i64, _>(&[], DEFAULT_MAX_ATTEMPTS, &mut rng),
            Err(AssignmentError::TooFewParticipants(0))
        );
        // 重复 id 不算作不同参与者
        assert_eq!(
            generate_assignments(&[1, 1, 2], DEFAULT_MAX_ATTEMPTS, &mut rng),
            Err(AssignmentError::TooFewParticipants(2))
        );
    }

    #[test]
    fn test_is_valid_pairing() {
        assert!(is_valid_pairing(&[(1, 2), (2, 3), (3, 1)]));
        assert!(is_valid_pairing(&[(1, 2), (2, 3), (3, 4), (4, 1)]));
        // 自己送自己
        assert!(!is_valid_pairing(&[(1, 1), (2, 3), (3, 2)]));
        // 互送
        assert!(!is_valid_pairing(&[(1, 2), (2, 1), (3, 4), (4, 3)]));
        // receiver 不在 giver 集合中
        assert!(!is_valid_pairing(&[(1, 2), (2, 3), (3, 9)]));
        // receiver 重复
        assert!(!is_valid_pairing(&[(1, 2), (2, 3), (3, 2)]));
    }
}
