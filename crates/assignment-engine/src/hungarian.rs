//! O(n^3) Kuhn-Munkres (Hungarian) algorithm for the minimum-weight perfect
//! matching on a square cost matrix, via shortest augmenting paths with
//! dual potentials.

/// Solves the assignment problem on a square `n x n` cost matrix.
///
/// Returns `col_for_row[i] = j`: row `i` is matched to column `j`. The
/// returned matching is a perfect matching (every row gets a column) that
/// minimizes total cost; it is deterministic for a given input matrix.
pub fn solve(cost: &[Vec<f64>]) -> Vec<usize> {
    let n = cost.len();
    if n == 0 {
        return Vec::new();
    }
    const INF: f64 = f64::INFINITY;
    let mut u = vec![0.0; n + 1];
    let mut v = vec![0.0; n + 1];
    let mut p = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![INF; n + 1];
        let mut used = vec![false; n + 1];
        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = INF;
            let mut j1 = 0usize;
            for j in 1..=n {
                if !used[j] {
                    let cur = cost[i0 - 1][j - 1] - u[i0] - v[j];
                    if cur < minv[j] {
                        minv[j] = cur;
                        way[j] = j0;
                    }
                    if minv[j] < delta {
                        delta = minv[j];
                        j1 = j;
                    }
                }
            }
            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut col_for_row = vec![0usize; n];
    for (j, &row) in p.iter().enumerate().skip(1) {
        if row != 0 {
            col_for_row[row - 1] = j - 1;
        }
    }
    col_for_row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total_cost(cost: &[Vec<f64>], matching: &[usize]) -> f64 {
        matching.iter().enumerate().map(|(i, &j)| cost[i][j]).sum()
    }

    fn is_permutation(matching: &[usize]) -> bool {
        let n = matching.len();
        let mut seen = vec![false; n];
        for &j in matching {
            if j >= n || seen[j] {
                return false;
            }
            seen[j] = true;
        }
        true
    }

    #[test]
    fn solves_trivial_1x1() {
        let cost = vec![vec![5.0]];
        let m = solve(&cost);
        assert_eq!(m, vec![0]);
    }

    #[test]
    fn picks_optimal_matching_over_2x2() {
        // Matching (0,0)+(1,1) = 1+1 = 2 vs (0,1)+(1,0) = 10+10 = 20.
        let cost = vec![vec![1.0, 10.0], vec![10.0, 1.0]];
        let m = solve(&cost);
        assert!(is_permutation(&m));
        assert_eq!(total_cost(&cost, &m), 2.0);
    }

    #[test]
    fn handles_known_3x3_example() {
        let cost = vec![
            vec![4.0, 1.0, 3.0],
            vec![2.0, 0.0, 5.0],
            vec![3.0, 2.0, 2.0],
        ];
        let m = solve(&cost);
        assert!(is_permutation(&m));
        // Optimal is (0,2)+(1,1)+(2,0) = 3+0+3 = 6.
        assert_eq!(total_cost(&cost, &m), 6.0);
    }

    #[test]
    fn result_is_always_a_permutation() {
        let cost = vec![
            vec![7.0, 2.0, 1.0, 9.0],
            vec![4.0, 6.0, 3.0, 8.0],
            vec![5.0, 5.0, 5.0, 5.0],
            vec![1.0, 1.0, 1.0, 1.0],
        ];
        let m = solve(&cost);
        assert!(is_permutation(&m));
        assert_eq!(m.len(), 4);
    }

    #[test]
    fn deterministic_across_repeated_calls() {
        let cost = vec![vec![3.0, 1.0], vec![2.0, 4.0]];
        let a = solve(&cost);
        let b = solve(&cost);
        assert_eq!(a, b);
    }
}
