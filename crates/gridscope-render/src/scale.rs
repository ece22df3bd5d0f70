//! Scales and tick generation shared by the three views.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// Continuous linear mapping from `domain` to `range`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, v: f64) -> f64 {
        let t = normalize(self.domain, v);
        lerp(self.range, t)
    }

    pub fn invert(&self, px: f64) -> f64 {
        let t = normalize(self.range, px);
        lerp(self.domain, t)
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        d3_ticks(self.domain.0, self.domain.1, count)
    }
}

/// Square-root scale; negative inputs keep their sign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SqrtScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl SqrtScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, v: f64) -> f64 {
        let d = (signed_sqrt(self.domain.0), signed_sqrt(self.domain.1));
        lerp(self.range, normalize(d, signed_sqrt(v)))
    }
}

fn signed_sqrt(v: f64) -> f64 {
    if v < 0.0 { -(-v).sqrt() } else { v.sqrt() }
}

/// Maps `v` onto `[0, 1]` over `(a, b)`. A degenerate interval maps everything to the midpoint.
fn normalize((a, b): (f64, f64), v: f64) -> f64 {
    let span = b - a;
    if span == 0.0 || !span.is_finite() {
        0.5
    } else {
        (v - a) / span
    }
}

fn lerp((a, b): (f64, f64), t: f64) -> f64 {
    a + (b - a) * t
}

/// Ordinal band scale with inner padding, no outer padding, centered alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: Vec<String>,
    range: (f64, f64),
    padding_inner: f64,
    step: f64,
    start: f64,
}

impl BandScale {
    pub fn new(domain: Vec<String>, range: (f64, f64), padding_inner: f64) -> Self {
        let padding_inner = padding_inner.clamp(0.0, 1.0);
        let n = domain.len() as f64;
        let (r0, r1) = range;
        let width = r1 - r0;
        let step = width / (n - padding_inner).max(1.0);
        let start = r0 + (width - step * (n - padding_inner)) * 0.5;
        Self {
            domain,
            range,
            padding_inner,
            step,
            start,
        }
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn bandwidth(&self) -> f64 {
        self.step * (1.0 - self.padding_inner)
    }

    pub fn position(&self, key: &str) -> Option<f64> {
        let idx = self.domain.iter().position(|k| k == key)?;
        Some(self.start + self.step * idx as f64)
    }
}

/// Linear scale over wall-clock time (millisecond resolution).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    pub domain: (NaiveDateTime, NaiveDateTime),
    pub range: (f64, f64),
}

impl TimeScale {
    pub fn new(domain: (NaiveDateTime, NaiveDateTime), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, t: NaiveDateTime) -> f64 {
        let d = (millis(self.domain.0), millis(self.domain.1));
        lerp(self.range, normalize(d, millis(t)))
    }

    /// First-of-month instants every `months` months (counted from January) inside the domain.
    pub fn month_ticks(&self, months: u32) -> Vec<NaiveDateTime> {
        let months = months.max(1) as i32;
        let (lo, hi) = if self.domain.0 <= self.domain.1 {
            self.domain
        } else {
            (self.domain.1, self.domain.0)
        };

        let mut index = lo.year() * 12 + lo.month0() as i32;
        let rem = index.rem_euclid(months);
        if rem != 0 {
            index += months - rem;
        }
        let mut out = Vec::new();
        loop {
            let Some(tick) = NaiveDate::from_ymd_opt(
                index.div_euclid(12),
                index.rem_euclid(12) as u32 + 1,
                1,
            )
            .and_then(|d| d.and_hms_opt(0, 0, 0)) else {
                break;
            };
            if tick > hi {
                break;
            }
            if tick >= lo {
                out.push(tick);
            }
            index += months;
        }
        out
    }
}

fn millis(t: NaiveDateTime) -> f64 {
    t.and_utc().timestamp_millis() as f64
}

/// Spacing of a tick run. Sub-unit steps are kept as a divisor so `0.1`-style ticks come out
/// exact.
#[derive(Debug, Clone, Copy)]
enum TickStep {
    Times(f64),
    Over(f64),
}

impl TickStep {
    /// The 1, 2, 5 or 10 times power-of-ten step closest to `span / count`.
    fn nice(span: f64, count: f64) -> Option<Self> {
        let raw = span / count;
        if !(raw.is_finite() && raw > 0.0) {
            return None;
        }
        let power = raw.log10().floor();
        let error = raw / 10f64.powf(power);
        let factor = [(50f64.sqrt(), 10.0), (10f64.sqrt(), 5.0), (2f64.sqrt(), 2.0)]
            .into_iter()
            .find(|(threshold, _)| error >= *threshold)
            .map_or(1.0, |(_, factor)| factor);
        let step = if power < 0.0 {
            Self::Over(10f64.powf(-power) / factor)
        } else {
            Self::Times(10f64.powf(power) * factor)
        };
        let (Self::Times(v) | Self::Over(v)) = step;
        (v.is_finite() && v > 0.0).then_some(step)
    }

    fn index_of(self, v: f64) -> i64 {
        match self {
            Self::Times(s) => (v / s).round() as i64,
            Self::Over(s) => (v * s).round() as i64,
        }
    }

    fn value(self, i: i64) -> f64 {
        match self {
            Self::Times(s) => i as f64 * s,
            Self::Over(s) => i as f64 / s,
        }
    }
}

/// First and last tick index inside `[lo, hi]`; retries once with a doubled count when a
/// small count leaves the range empty.
fn tick_range(lo: f64, hi: f64, count: f64) -> Option<(i64, i64, TickStep)> {
    let step = TickStep::nice(hi - lo, count)?;
    let mut first = step.index_of(lo);
    let mut last = step.index_of(hi);
    if step.value(first) < lo {
        first += 1;
    }
    if step.value(last) > hi {
        last -= 1;
    }
    if last < first && (0.5..2.0).contains(&count) {
        return tick_range(lo, hi, count * 2.0);
    }
    Some((first, last, step))
}

/// Evenly spaced "nice" tick values over `[start, stop]`, in the direction of the domain.
pub fn d3_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if !(start.is_finite() && stop.is_finite()) || count == 0 {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let Some((first, last, step)) = tick_range(start.min(stop), start.max(stop), count as f64)
    else {
        return Vec::new();
    };
    let mut out = (first..=last).map(|i| step.value(i)).collect::<Vec<_>>();
    if stop < start {
        out.reverse();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("date")
    }

    #[test]
    fn linear_apply_and_invert_round_trip() {
        let s = LinearScale::new((2015.0, 2018.0), (0.0, 300.0));
        assert_eq!(s.apply(2016.0), 100.0);
        assert_eq!(s.invert(150.0), 2016.5);
        // Degenerate domains map to the middle of the range.
        let flat = LinearScale::new((2016.0, 2016.0), (0.0, 300.0));
        assert_eq!(flat.apply(2016.0), 150.0);
        assert_eq!(flat.invert(42.0), 2016.0);
    }

    #[test]
    fn sqrt_scale_maps_extent_to_range() {
        let s = SqrtScale::new((0.0, 100.0), (5.0, 22.0));
        assert_eq!(s.apply(0.0), 5.0);
        assert_eq!(s.apply(100.0), 22.0);
        assert!((s.apply(25.0) - 13.5).abs() < 1e-9);
        assert_eq!(SqrtScale::new((7.0, 7.0), (5.0, 22.0)).apply(7.0), 13.5);
    }

    #[test]
    fn band_scale_with_inner_padding() {
        let s = BandScale::new(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            (0.0, 290.0),
            0.1,
        );
        // step = 290 / (3 - 0.1) = 100.
        assert!((s.step() - 100.0).abs() < 1e-9);
        assert!((s.bandwidth() - 90.0).abs() < 1e-9);
        assert!(s.position("a").expect("a").abs() < 1e-9);
        assert!((s.position("c").expect("c") - 200.0).abs() < 1e-9);
        assert_eq!(s.position("z"), None);
    }

    #[test]
    fn d3_ticks_match_reference_values() {
        assert_eq!(d3_ticks(0.0, 7.0, 6), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(d3_ticks(0.0, 10.0, 6), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(d3_ticks(0.0, 1.0, 5), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        assert_eq!(d3_ticks(10.0, 0.0, 2), vec![10.0, 5.0, 0.0]);
        assert_eq!(d3_ticks(3.0, 3.0, 6), vec![3.0]);
        assert!(d3_ticks(0.0, f64::NAN, 6).is_empty());
    }

    #[test]
    fn sub_unit_ticks_divide_exactly() {
        assert_eq!(d3_ticks(0.0, 0.4, 4), vec![0.0, 0.1, 0.2, 0.3, 0.4]);
        assert_eq!(d3_ticks(0.4, 0.0, 4), vec![0.4, 0.3, 0.2, 0.1, 0.0]);
        assert_eq!(d3_ticks(0.0, 5e6, 5), vec![0.0, 1e6, 2e6, 3e6, 4e6, 5e6]);
    }

    #[test]
    fn a_single_tick_request_retries_with_a_finer_step() {
        // One tick at step 1 misses (0.1, 0.9); the retry lands on 0.5.
        assert_eq!(d3_ticks(0.1, 0.9, 1), vec![0.5]);
        assert!(d3_ticks(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn half_year_ticks_fall_on_january_and_july() {
        let s = TimeScale::new((dt(2015, 1, 1), dt(2016, 8, 1)), (0.0, 1000.0));
        let ticks = s.month_ticks(6);
        assert_eq!(ticks, vec![dt(2015, 1, 1), dt(2015, 7, 1), dt(2016, 1, 1), dt(2016, 7, 1)]);
        assert_eq!(s.apply(dt(2015, 1, 1)), 0.0);
        assert_eq!(s.apply(dt(2016, 8, 1)), 1000.0);

        let s = TimeScale::new((dt(2015, 2, 10), dt(2015, 12, 31)), (0.0, 1.0));
        assert_eq!(s.month_ticks(6), vec![dt(2015, 7, 1)]);
    }
}
