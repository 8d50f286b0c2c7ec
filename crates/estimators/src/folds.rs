use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;

/// Assign row indices to `n_folds` folds so every fold sees roughly the same
/// class distribution.
///
/// Classes are visited in ascending label order and their rows shuffled with
/// `rng` before being dealt round-robin; the dealing position carries over from
/// one class to the next so fold sizes differ by at most one. Rows inside each
/// fold are returned in ascending order.
pub fn stratified_folds(y: &[u32], n_folds: usize, rng: &mut StdRng) -> Vec<Vec<usize>> {
    let n_folds = n_folds.max(1);
    let mut by_class: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (row, &label) in y.iter().enumerate() {
        by_class.entry(label).or_default().push(row);
    }

    let mut folds: Vec<Vec<usize>> = vec![Vec::new(); n_folds];
    let mut position = 0usize;
    for rows in by_class.values_mut() {
        rows.shuffle(rng);
        for &row in rows.iter() {
            folds[position % n_folds].push(row);
            position += 1;
        }
    }
    for fold in folds.iter_mut() {
        fold.sort_unstable();
    }
    folds
}
