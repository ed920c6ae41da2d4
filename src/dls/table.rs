//! The resource percentage table behind rain-rule calculations.
//!
//! The table maps (overs remaining, wickets down) to the percentage of a
//! full 50-over innings' scoring resources still available. Values between
//! over anchors are linearly interpolated; balls are treated as fractional
//! overs on the same line. Queries outside the table clamp to its edges.

use super::errors::{DlsError, DlsResult};

/// Wicket columns: 0 through 9 down. Ten down means no resources at all.
pub const WICKET_BUCKETS: usize = 10;

/// Published standard-edition anchors, rows keyed by whole overs remaining.
const STANDARD_ANCHORS: &[(f64, [f64; WICKET_BUCKETS])] = &[
    (0.0, [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    (1.0, [3.6, 3.6, 3.6, 3.6, 3.6, 3.5, 3.5, 3.4, 3.2, 2.5]),
    (5.0, [17.2, 17.0, 16.8, 16.5, 16.1, 15.4, 14.3, 12.5, 9.4, 4.6]),
    (10.0, [32.1, 31.6, 30.8, 29.8, 28.3, 26.1, 22.8, 17.9, 11.4, 4.7]),
    (15.0, [45.2, 44.1, 42.6, 40.5, 37.6, 33.5, 27.8, 20.2, 11.8, 4.7]),
    (20.0, [56.6, 54.8, 52.4, 49.1, 44.6, 38.6, 30.8, 21.2, 11.9, 4.7]),
    (25.0, [66.5, 63.9, 60.5, 56.0, 50.0, 42.2, 32.6, 21.6, 11.9, 4.7]),
    (30.0, [75.1, 71.8, 67.3, 61.6, 54.1, 44.7, 33.6, 21.8, 11.9, 4.7]),
    (35.0, [82.7, 78.5, 73.0, 66.0, 57.2, 46.4, 34.2, 21.9, 11.9, 4.7]),
    (40.0, [89.3, 84.2, 77.8, 69.6, 59.5, 47.6, 34.6, 21.9, 11.9, 4.7]),
    (45.0, [95.0, 89.1, 81.8, 72.5, 61.3, 48.4, 34.7, 21.9, 11.9, 4.7]),
    (50.0, [100.0, 93.4, 85.1, 74.9, 62.7, 49.0, 34.9, 22.0, 11.9, 4.7]),
];

/// Resource lookup table with linear interpolation between over anchors.
#[derive(Debug, Clone)]
pub struct ResourceTable {
    /// Sorted ascending by overs remaining; always starts at 0.0.
    anchors: Vec<(f64, [f64; WICKET_BUCKETS])>,
}

impl ResourceTable {
    /// The built-in standard-edition table.
    pub fn standard() -> Self {
        Self {
            anchors: STANDARD_ANCHORS.to_vec(),
        }
    }

    /// Build a table from caller-supplied anchor rows.
    ///
    /// Rows may arrive unsorted. A 0-overs row of zeros is implied if
    /// absent. Duplicate over values and non-finite or negative resources
    /// are rejected.
    pub fn from_anchors(rows: Vec<(f64, [f64; WICKET_BUCKETS])>) -> DlsResult<Self> {
        if rows.is_empty() {
            return Err(DlsError::InvalidTable("no anchor rows".into()));
        }
        let mut anchors = rows;
        for (overs, resources) in &anchors {
            if !overs.is_finite() || *overs < 0.0 {
                return Err(DlsError::InvalidTable(format!(
                    "bad overs anchor {overs}"
                )));
            }
            if resources.iter().any(|r| !r.is_finite() || *r < 0.0) {
                return Err(DlsError::InvalidTable(format!(
                    "bad resource value at {overs} overs"
                )));
            }
        }
        anchors.sort_by(|a, b| a.0.total_cmp(&b.0));
        if anchors.windows(2).any(|w| w[0].0 == w[1].0) {
            return Err(DlsError::InvalidTable("duplicate overs anchor".into()));
        }
        if anchors[0].0 > 0.0 {
            anchors.insert(0, (0.0, [0.0; WICKET_BUCKETS]));
        }
        Ok(Self { anchors })
    }

    /// Largest overs-remaining value the table covers.
    pub fn max_overs(&self) -> f64 {
        self.anchors.last().map(|(o, _)| *o).unwrap_or(0.0)
    }

    /// Percentage of innings resources remaining with `overs_left` overs to
    /// bowl and `wickets_down` batters gone.
    pub fn resources_remaining(&self, overs_left: f64, wickets_down: u32) -> f64 {
        if wickets_down as usize >= WICKET_BUCKETS {
            return 0.0;
        }
        let col = wickets_down as usize;
        let overs = if overs_left.is_finite() {
            overs_left.clamp(0.0, self.max_overs())
        } else {
            return 0.0;
        };

        // Find the bracketing anchors. The table is small enough that a
        // linear scan beats anything cleverer.
        let mut lower = &self.anchors[0];
        for anchor in &self.anchors {
            if anchor.0 <= overs {
                lower = anchor;
            } else {
                let (o_lo, r_lo) = (lower.0, lower.1[col]);
                let (o_hi, r_hi) = (anchor.0, anchor.1[col]);
                let t = (overs - o_lo) / (o_hi - o_lo);
                return r_lo + t * (r_hi - r_lo);
            }
        }
        lower.1[col]
    }
}

impl Default for ResourceTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "expected {b}, got {a}");
    }

    #[test]
    fn test_exact_anchor_lookups() {
        let table = ResourceTable::standard();
        close(table.resources_remaining(50.0, 0), 100.0);
        close(table.resources_remaining(40.0, 0), 89.3);
        close(table.resources_remaining(25.0, 2), 60.5);
        close(table.resources_remaining(5.0, 9), 4.6);
        close(table.resources_remaining(0.0, 0), 0.0);
    }

    #[test]
    fn test_interpolation_between_anchors() {
        let table = ResourceTable::standard();
        // Midway between 20 (56.6) and 25 (66.5) overs with no wickets down.
        close(table.resources_remaining(22.5, 0), (56.6 + 66.5) / 2.0);
        // 3 balls = 0.5 overs on the 0..=1 segment: half of 3.6.
        close(table.resources_remaining(0.5, 0), 1.8);
    }

    #[test]
    fn test_out_of_range_clamps() {
        let table = ResourceTable::standard();
        close(table.resources_remaining(60.0, 0), 100.0);
        close(table.resources_remaining(-3.0, 0), 0.0);
        close(table.resources_remaining(f64::NAN, 0), 0.0);
        close(table.resources_remaining(30.0, 10), 0.0);
        close(table.resources_remaining(30.0, 14), 0.0);
    }

    #[test]
    fn test_monotonic_in_overs_and_wickets() {
        let table = ResourceTable::standard();
        let mut prev = 0.0;
        for tenths in 0..=500 {
            let overs = tenths as f64 / 10.0;
            let r = table.resources_remaining(overs, 3);
            assert!(
                r + 1e-9 >= prev,
                "resources decreased as overs grew: {r} < {prev} at {overs}"
            );
            prev = r;
        }
        for w in 0..9 {
            let more = table.resources_remaining(30.0, w);
            let fewer = table.resources_remaining(30.0, w + 1);
            assert!(
                fewer <= more + 1e-9,
                "losing a wicket increased resources at {w} down"
            );
        }
    }

    #[test]
    fn test_from_anchors_validation() {
        assert!(ResourceTable::from_anchors(vec![]).is_err());
        assert!(ResourceTable::from_anchors(vec![
            (10.0, [1.0; WICKET_BUCKETS]),
            (10.0, [2.0; WICKET_BUCKETS]),
        ])
        .is_err());
        assert!(ResourceTable::from_anchors(vec![(5.0, [-1.0; WICKET_BUCKETS])]).is_err());

        // Missing zero row is implied.
        let table =
            ResourceTable::from_anchors(vec![(10.0, [30.0; WICKET_BUCKETS])]).unwrap();
        close(table.resources_remaining(5.0, 0), 15.0);
    }
}
