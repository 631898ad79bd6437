//! Rectangular minimum-weight bipartite assignment over the guarantee-aware
//! cost matrix.
//!
//! [`cost_calculator::compute_cost_matrix`] produces an `m x k` matrix that is
//! rarely square (couriers and orders are rarely in equal supply). The
//! Hungarian algorithm only solves square matrices, so we pad to
//! `n x n`, `n = max(m, k)`, with a sentinel cost strictly above anything a
//! real pairing could produce, solve the padded matrix, then drop every pair
//! that touches a padding row or column.

#![forbid(unsafe_code)]

mod hungarian;

use cost_calculator::{compute_cost_matrix, CourierFacts, OrderFacts};

/// Cost ceiling used for padding rows/columns in the square matrix. Any real
/// `guarantee_aware_cost` output is expected to stay well under this; a
/// non-finite cost (should not occur, but defends against a future cost rule
/// that can produce one) is also replaced by this sentinel so the solver
/// never has to reason about NaN or infinity.
pub const SENTINEL_COST: f64 = 1_000_000.0;

/// One courier-to-order pairing chosen by [`assign`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Assignment {
    pub courier_index: usize,
    pub order_index: usize,
    pub cost: f64,
    pub estimated_work_hours: f64,
}

/// Computes the minimum-total-cost pairing of couriers to orders.
///
/// Not every courier or order need appear in the result: when supply and
/// demand are unequal, the surplus side is left unassigned. The returned
/// list has at most `min(couriers.len(), orders.len())` entries and never
/// repeats a courier or order index.
pub fn assign(
    couriers: &[CourierFacts],
    orders: &[OrderFacts],
    omega: f64,
    prep_time_minutes: f64,
) -> Vec<Assignment> {
    let m = couriers.len();
    let k = orders.len();
    if m == 0 || k == 0 {
        return Vec::new();
    }

    let base = compute_cost_matrix(couriers, orders, omega, prep_time_minutes);
    let n = m.max(k);
    let mut padded = vec![vec![SENTINEL_COST; n]; n];
    for (i, row) in base.iter().enumerate() {
        for (j, &cost) in row.iter().enumerate() {
            padded[i][j] = if cost.is_finite() { cost } else { SENTINEL_COST };
        }
    }

    let col_for_row = hungarian::solve(&padded);

    let mut assignments: Vec<Assignment> = (0..n)
        .filter(|&i| i < m)
        .filter_map(|i| {
            let j = col_for_row[i];
            if j >= k || padded[i][j] >= SENTINEL_COST {
                None
            } else {
                Some((i, j))
            }
        })
        .map(|(i, j)| {
            let (cost, estimated_work_hours) =
                cost_calculator::guarantee_aware_cost(couriers[i], orders[j], omega, prep_time_minutes);
            Assignment {
                courier_index: i,
                order_index: j,
                cost,
                estimated_work_hours,
            }
        })
        .collect();

    assignments.sort_by_key(|a| a.courier_index);
    assignments
}

#[cfg(test)]
mod tests {
    use super::*;
    use geokit::LatLon;

    fn courier(work: f64, active: f64) -> CourierFacts {
        CourierFacts {
            location: LatLon::new(12.97, 77.59),
            speed_kmph: 25.0,
            work_hours: work,
            active_hours: active,
        }
    }

    fn order_near(offset: f64) -> OrderFacts {
        OrderFacts {
            pickup: LatLon::new(12.97 + offset, 77.59),
            dropoff: LatLon::new(12.97 + offset + 0.01, 77.60),
        }
    }

    fn assignment_has_unique_indices(assignments: &[Assignment]) -> bool {
        let mut couriers_seen = std::collections::HashSet::new();
        let mut orders_seen = std::collections::HashSet::new();
        assignments.iter().all(|a| {
            couriers_seen.insert(a.courier_index) && orders_seen.insert(a.order_index)
        })
    }

    #[test]
    fn empty_inputs_produce_no_assignments() {
        assert!(assign(&[], &[], 0.25, 8.0).is_empty());
        assert!(assign(&[courier(0.0, 1.0)], &[], 0.25, 8.0).is_empty());
        assert!(assign(&[], &[order_near(0.0)], 0.25, 8.0).is_empty());
    }

    #[test]
    fn surplus_orders_are_left_unassigned_when_couriers_are_scarce() {
        let couriers = vec![courier(0.0, 1.0)];
        let orders = vec![order_near(0.0), order_near(0.1), order_near(0.2)];
        let result = assign(&couriers, &orders, 0.25, 8.0);
        assert_eq!(result.len(), 1);
        assert!(assignment_has_unique_indices(&result));
    }

    #[test]
    fn surplus_couriers_are_left_unassigned_when_orders_are_scarce() {
        let couriers = vec![courier(0.0, 1.0), courier(0.0, 1.0), courier(0.0, 1.0)];
        let orders = vec![order_near(0.0)];
        let result = assign(&couriers, &orders, 0.25, 8.0);
        assert_eq!(result.len(), 1);
        assert!(assignment_has_unique_indices(&result));
    }

    #[test]
    fn no_pairing_shares_a_courier_or_order() {
        let couriers = vec![courier(0.0, 1.0), courier(5.0, 1.0), courier(1.0, 2.0)];
        let orders = vec![order_near(0.0), order_near(0.1), order_near(0.2)];
        let result = assign(&couriers, &orders, 0.25, 8.0);
        assert_eq!(result.len(), 3);
        assert!(assignment_has_unique_indices(&result));
    }

    #[test]
    fn below_guarantee_courier_is_preferred_over_above_guarantee_courier() {
        // Two couriers equidistant from one order: courier 0 is far below
        // guarantee (G=0.25 >> W=0), courier 1 has already met guarantee
        // (W=10 >> G=0.25). The discount should steer the order to courier 0.
        let couriers = vec![courier(0.0, 1.0), courier(10.0, 1.0)];
        let orders = vec![order_near(0.0)];
        let result = assign(&couriers, &orders, 0.25, 8.0);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].courier_index, 0);
    }

    #[test]
    fn result_is_sorted_by_courier_index() {
        let couriers = vec![courier(3.0, 1.0), courier(0.0, 1.0), courier(1.0, 1.0)];
        let orders = vec![order_near(0.0), order_near(0.1), order_near(0.2)];
        let result = assign(&couriers, &orders, 0.25, 8.0);
        let indices: Vec<usize> = result.iter().map(|a| a.courier_index).collect();
        let mut sorted = indices.clone();
        sorted.sort_unstable();
        assert_eq!(indices, sorted);
    }

    proptest::proptest! {
        #[test]
        fn assignment_never_exceeds_min_supply_and_never_repeats_indices(
            courier_count in 0usize..6,
            order_count in 0usize..6,
        ) {
            let couriers: Vec<CourierFacts> = (0..courier_count)
                .map(|i| courier(i as f64, 1.0 + i as f64))
                .collect();
            let orders: Vec<OrderFacts> = (0..order_count)
                .map(|i| order_near(i as f64 * 0.01))
                .collect();
            let result = assign(&couriers, &orders, 0.25, 8.0);
            proptest::prop_assert!(result.len() <= courier_count.min(order_count));
            proptest::prop_assert!(assignment_has_unique_indices(&result));
            for a in &result {
                proptest::prop_assert!(a.cost.is_finite());
                proptest::prop_assert!(a.cost < SENTINEL_COST);
            }
        }
    }
}
