/// Result of a degree-1 polynomial fit, stored as histogram metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
}

/// A fixed-binning 1D histogram accumulator.
///
/// Tracks sum-of-squared-weights per bin alongside the contents so that
/// ratio histograms and fits carry correct statistical errors. Out-of-range
/// fills land in the underflow/overflow counters rather than being dropped.
#[derive(Debug, Clone)]
pub struct Hist1D {
    pub name: String,
    pub title: String,
    pub n_bins: usize,
    pub x_min: f64,
    pub x_max: f64,
    /// Bin contents (length = n_bins, excluding under/overflow).
    pub contents: Vec<f64>,
    /// Sum of weights squared per bin.
    pub sumw2: Vec<f64>,
    pub underflow: f64,
    pub overflow: f64,
    /// Total number of fill calls, under/overflow included.
    pub entries: u64,
    pub fit: Option<LinearFit>,
}

impl Hist1D {
    pub fn new(name: &str, title: &str, n_bins: usize, x_min: f64, x_max: f64) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            n_bins,
            x_min,
            x_max,
            contents: vec![0.0; n_bins],
            sumw2: vec![0.0; n_bins],
            underflow: 0.0,
            overflow: 0.0,
            entries: 0,
            fit: None,
        }
    }

    pub fn fill(&mut self, value: f64) {
        self.fill_weighted(value, 1.0)
    }

    pub fn fill_weighted(&mut self, value: f64, weight: f64) {
        self.entries += 1;
        if value < self.x_min {
            self.underflow += weight;
        } else if value >= self.x_max {
            self.overflow += weight;
        } else {
            let idx = self.bin_index(value);
            self.contents[idx] += weight;
            self.sumw2[idx] += weight * weight;
        }
    }

    /// Bin holding `value`. Caller guarantees the value is in range.
    fn bin_index(&self, value: f64) -> usize {
        let frac = (value - self.x_min) / (self.x_max - self.x_min);
        ((frac * self.n_bins as f64) as usize).min(self.n_bins - 1)
    }

    pub fn bin_center(&self, idx: usize) -> f64 {
        let width = (self.x_max - self.x_min) / self.n_bins as f64;
        self.x_min + (idx as f64 + 0.5) * width
    }

    /// Bin-wise ratio of `self` over `denominator`, with errors propagated
    /// from the sum-of-squares of both operands. Bins where the denominator
    /// is empty are set to 0 with zero error. Both histograms must share the
    /// same binning; the registry only ever pairs like with like.
    pub fn divide(&self, denominator: &Hist1D, name: &str, title: &str) -> Hist1D {
        let mut ratio = Hist1D::new(name, title, self.n_bins, self.x_min, self.x_max);
        ratio.entries = self.entries;
        for idx in 0..self.n_bins {
            let num = self.contents[idx];
            let den = denominator.contents[idx];
            if den == 0.0 {
                continue;
            }
            ratio.contents[idx] = num / den;
            // var(a/b) = (var_a * b^2 + var_b * a^2) / b^4
            let var = (self.sumw2[idx] * den * den + denominator.sumw2[idx] * num * num)
                / (den * den * den * den);
            ratio.sumw2[idx] = var;
        }
        ratio
    }

    /// Weighted least-squares fit of the non-empty bins to y = intercept +
    /// slope * x, weights taken as 1/sumw2. Stores and returns the result;
    /// returns None without storing anything when fewer than 2 usable bins
    /// exist or the bins are degenerate.
    pub fn fit_linear(&mut self) -> Option<LinearFit> {
        let mut s = 0.0;
        let mut sx = 0.0;
        let mut sy = 0.0;
        let mut sxx = 0.0;
        let mut sxy = 0.0;
        let mut used = 0usize;
        for idx in 0..self.n_bins {
            let y = self.contents[idx];
            if y == 0.0 {
                continue;
            }
            let var = self.sumw2[idx];
            let w = if var > 0.0 { 1.0 / var } else { 1.0 };
            let x = self.bin_center(idx);
            s += w;
            sx += w * x;
            sy += w * y;
            sxx += w * x * x;
            sxy += w * x * y;
            used += 1;
        }
        if used < 2 {
            return None;
        }
        let det = s * sxx - sx * sx;
        if det.abs() < f64::EPSILON * sxx.abs() {
            return None;
        }
        let fit = LinearFit {
            intercept: (sxx * sy - sx * sxy) / det,
            slope: (s * sxy - sx * sy) / det,
        };
        self.fit = Some(fit);
        Some(fit)
    }
}

//Unit tests
#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1.0e-9
    }

    #[test]
    fn test_fill_placement() {
        let mut h = Hist1D::new("h", "h", 10, 0.0, 10.0);
        h.fill(3.5);
        h.fill(3.5);
        h.fill(9.999);
        assert_eq!(h.contents[3], 2.0);
        assert_eq!(h.sumw2[3], 2.0);
        assert_eq!(h.contents[9], 1.0);
        assert_eq!(h.entries, 3);
    }

    #[test]
    fn test_under_overflow() {
        let mut h = Hist1D::new("h", "h", 10, 0.0, 10.0);
        h.fill(-1.0);
        h.fill(10.0);
        h.fill(25.0);
        assert_eq!(h.underflow, 1.0);
        assert_eq!(h.overflow, 2.0);
        assert_eq!(h.entries, 3);
        assert!(h.contents.iter().all(|c| *c == 0.0));
    }

    #[test]
    fn test_weighted_fill() {
        let mut h = Hist1D::new("h", "h", 4, 0.0, 4.0);
        h.fill_weighted(1.5, 2.0);
        assert_eq!(h.contents[1], 2.0);
        assert_eq!(h.sumw2[1], 4.0);
    }

    #[test]
    fn test_divide() {
        let mut num = Hist1D::new("num", "num", 4, 0.0, 4.0);
        let mut den = Hist1D::new("den", "den", 4, 0.0, 4.0);
        for _ in 0..6 {
            num.fill(0.5);
        }
        for _ in 0..3 {
            den.fill(0.5);
        }
        num.fill(1.5); // Empty denominator bin
        let ratio = num.divide(&den, "ratio", "ratio");
        assert!(close(ratio.contents[0], 2.0));
        assert!(ratio.sumw2[0] > 0.0);
        // Denominator bin 1 is empty: defined as 0, not an exception
        assert_eq!(ratio.contents[1], 0.0);
        assert_eq!(ratio.sumw2[1], 0.0);
    }

    #[test]
    fn test_linear_fit_recovers_line() {
        let mut h = Hist1D::new("h", "h", 20, 0.0, 20.0);
        for idx in 0..20 {
            let x = h.bin_center(idx);
            h.contents[idx] = 2.0 + 3.0 * x;
            h.sumw2[idx] = 1.0;
        }
        let fit = h.fit_linear().expect("fit should succeed");
        assert!(close(fit.slope, 3.0));
        assert!(close(fit.intercept, 2.0));
        assert!(h.fit.is_some());
    }

    #[test]
    fn test_fit_needs_two_bins() {
        let mut h = Hist1D::new("h", "h", 10, 0.0, 10.0);
        h.fill(5.0);
        assert!(h.fit_linear().is_none());
        assert!(h.fit.is_none());

        let mut empty = Hist1D::new("e", "e", 10, 0.0, 10.0);
        assert!(empty.fit_linear().is_none());
    }
}
