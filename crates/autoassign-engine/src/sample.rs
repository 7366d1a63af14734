use rand::seq::SliceRandom;
use rand::Rng;

/// Draw `count` distinct entries from `pool`.
///
/// A `count` of `0` means "everyone" and returns the whole pool, as does any
/// count at or above the pool size. Either way the pool order is kept.
/// Otherwise the result is a uniform random subset without repeats.
///
/// # Examples
///
/// ```
/// use autoassign_engine::sample::sample;
/// use rand::SeedableRng;
///
/// let pool = vec!["a".to_string(), "b".to_string(), "c".to_string()];
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
///
/// assert_eq!(sample(&pool, 0, &mut rng), pool);
/// assert_eq!(sample(&pool, 2, &mut rng).len(), 2);
/// ```
pub fn sample<T: Clone, R: Rng + ?Sized>(pool: &[T], count: usize, rng: &mut R) -> Vec<T> {
    if count == 0 || count >= pool.len() {
        return pool.to_vec();
    }
    pool.choose_multiple(rng, count).cloned().collect()
}
