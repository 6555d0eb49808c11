//! Weighted suites of numeric checks.
//!
//! A [`Check`] measures one quantity on a mutable per-candidate context and
//! maps it to a grade in `[0, 1]` between a low and a high threshold. A
//! [`CheckSuite`] runs an ordered list of weighted checks and reports their
//! weighted mean.
//!
//! Checks may write into the context while computing their value (for
//! instance which staff a stick end is anchored to). Later checks read those
//! fields, so suites never stop early: every check runs, in declaration
//! order, whatever the grades obtained so far.

use std::fmt;

/// Diagnostic tag attached to a candidate when a check fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Failure(pub &'static str);

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Direction of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Polarity {
    /// Higher values are better: `low` maps to 0, `high` to 1.
    Covariant,
    /// Lower values are better: `low` maps to 1, `high` to 0.
    Contravariant,
}

/// Context that can be tagged by a failing check.
pub trait Checkable {
    /// Record a failure. Called once per failing check, in suite order.
    fn set_failure(&mut self, failure: Failure);
}

type ValueFn<'a, C> = Box<dyn Fn(&mut C) -> f64 + 'a>;

/// One named test over a context of type `C`.
pub struct Check<'a, C> {
    name: &'static str,
    description: &'static str,
    low: f64,
    high: f64,
    polarity: Polarity,
    failure: Option<Failure>,
    value: ValueFn<'a, C>,
}

impl<'a, C: Checkable + 'a> Check<'a, C> {
    /// Build a check from its thresholds and value extractor.
    pub fn new(
        name: &'static str,
        description: &'static str,
        low: f64,
        high: f64,
        polarity: Polarity,
        failure: Option<Failure>,
        value: impl Fn(&mut C) -> f64 + 'a,
    ) -> Self {
        Self {
            name,
            description,
            low: low.min(high),
            high: low.max(high),
            polarity,
            failure,
            value: Box::new(value),
        }
    }

    /// Build a pass/fail check: the extractor returns 1.0 (pass) or 0.0 (fail).
    pub fn boolean(
        name: &'static str,
        description: &'static str,
        failure: Option<Failure>,
        value: impl Fn(&mut C) -> f64 + 'a,
    ) -> Self {
        Self::new(
            name,
            description,
            0.5,
            0.5,
            Polarity::Covariant,
            failure,
            value,
        )
    }

    /// Wrap the extractor so that it reports the best possible value when
    /// `skip` holds for the context.
    ///
    /// The wrapped extractor still runs first, so its side effects on the
    /// context are preserved.
    pub fn skipped_when(self, skip: impl Fn(&C) -> bool + 'a) -> Self {
        let best = self.best_value();
        let inner = self.value;
        Self {
            value: Box::new(move |ctx: &mut C| {
                let v = inner(ctx);
                if skip(ctx) {
                    best
                } else {
                    v
                }
            }),
            ..self
        }
    }

    /// Check name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Human readable description (with the unit of the value).
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Low threshold.
    pub fn low(&self) -> f64 {
        self.low
    }

    /// High threshold.
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Check polarity.
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Failure tag set on the context when the grade drops to 0.
    pub fn failure(&self) -> Option<Failure> {
        self.failure
    }

    /// A value that always obtains grade 1.
    pub fn best_value(&self) -> f64 {
        match self.polarity {
            Polarity::Covariant => self.high,
            Polarity::Contravariant => self.low,
        }
    }

    /// Compute the raw value, running any side effect on `ctx`.
    pub fn value(&self, ctx: &mut C) -> f64 {
        (self.value)(ctx)
    }

    /// Map a value to a grade in `[0, 1]`. NaN grades 0.
    pub fn grade_of(&self, value: f64) -> f64 {
        if value.is_nan() {
            return 0.0;
        }

        let span = self.high - self.low;
        if span <= 0.0 {
            let ok = match self.polarity {
                Polarity::Covariant => value >= self.high,
                Polarity::Contravariant => value <= self.low,
            };
            return if ok { 1.0 } else { 0.0 };
        }

        let g = match self.polarity {
            Polarity::Covariant => (value - self.low) / span,
            Polarity::Contravariant => (self.high - value) / span,
        };
        g.clamp(0.0, 1.0)
    }

    /// Run the check on `ctx`.
    ///
    /// When the grade is 0 and the check declares a failure tag, the context
    /// is tagged with it.
    pub fn pass(&self, ctx: &mut C) -> CheckGrade {
        let value = self.value(ctx);
        let grade = self.grade_of(value);
        let failed = grade <= 0.0 && self.failure.is_some();
        if failed {
            if let Some(failure) = self.failure {
                ctx.set_failure(failure);
            }
        }

        CheckGrade {
            name: self.name,
            value,
            grade,
            weight: 1.0,
            failure: if failed { self.failure } else { None },
        }
    }
}

impl<C> fmt::Debug for Check<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check")
            .field("name", &self.name)
            .field("low", &self.low)
            .field("high", &self.high)
            .field("polarity", &self.polarity)
            .field("failure", &self.failure)
            .finish()
    }
}

/// Outcome of one check on one candidate.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct CheckGrade {
    /// Check name.
    pub name: &'static str,
    /// Raw measured value.
    pub value: f64,
    /// Grade in `[0, 1]`.
    pub grade: f64,
    /// Weight of the check in its suite.
    pub weight: f64,
    /// Failure raised by this check, if any.
    pub failure: Option<Failure>,
}

/// Outcome of a whole suite on one candidate.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct SuiteResult {
    /// Weighted mean of the check grades.
    pub grade: f64,
    /// Per-check details, in evaluation order.
    pub checks: Vec<CheckGrade>,
}

impl SuiteResult {
    /// Failures raised, in evaluation order.
    pub fn failures(&self) -> impl Iterator<Item = Failure> + '_ {
        self.checks.iter().filter_map(|c| c.failure)
    }

    /// First failure raised, if any.
    pub fn first_failure(&self) -> Option<Failure> {
        self.failures().next()
    }

    /// True when a weighted check failed with a declared tag.
    pub fn is_vetoed(&self) -> bool {
        self.checks
            .iter()
            .any(|c| c.failure.is_some() && c.weight > 0.0)
    }

    /// True when no veto occurred and the grade reaches `min_grade`.
    pub fn accepts(&self, min_grade: f64) -> bool {
        !self.is_vetoed() && self.grade >= min_grade
    }

    /// Grade of the named check, if it ran.
    pub fn grade_of(&self, name: &str) -> Option<f64> {
        self.checks.iter().find(|c| c.name == name).map(|c| c.grade)
    }
}

/// Ordered, weighted collection of checks.
pub struct CheckSuite<'a, C> {
    name: &'static str,
    min_grade: f64,
    entries: Vec<(f64, Check<'a, C>)>,
}

impl<'a, C: Checkable + 'a> CheckSuite<'a, C> {
    /// Empty suite accepting candidates whose grade reaches `min_grade`.
    pub fn new(name: &'static str, min_grade: f64) -> Self {
        Self {
            name,
            min_grade,
            entries: Vec::new(),
        }
    }

    /// Append a check. Order matters: side effects of earlier checks are
    /// visible to later ones.
    pub fn add(&mut self, weight: f64, check: Check<'a, C>) -> &mut Self {
        self.entries.push((weight.max(0.0), check));
        self
    }

    /// Suite name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Minimum grade for acceptance.
    pub fn min_grade(&self) -> f64 {
        self.min_grade
    }

    /// Checks with their weights, in evaluation order.
    pub fn checks(&self) -> impl Iterator<Item = (f64, &Check<'a, C>)> {
        self.entries.iter().map(|(w, c)| (*w, c))
    }

    /// Number of checks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the suite has no check.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every check in order and report the weighted mean grade.
    pub fn pass(&self, ctx: &mut C) -> SuiteResult {
        Self::pass_collection(&[self], ctx)
    }

    /// Run several suites as one flattened suite.
    ///
    /// The grade is the weighted mean over all checks of all suites, not a
    /// mean of per-suite grades.
    pub fn pass_collection(suites: &[&CheckSuite<'a, C>], ctx: &mut C) -> SuiteResult {
        let mut checks = Vec::new();
        let mut total = 0.0;
        let mut sum = 0.0;

        for suite in suites {
            for (weight, check) in &suite.entries {
                let mut grade = check.pass(ctx);
                grade.weight = *weight;
                total += weight;
                sum += weight * grade.grade;
                checks.push(grade);
            }
        }

        let grade = if total > 0.0 { sum / total } else { 0.0 };
        SuiteResult { grade, checks }
    }
}

impl<C> fmt::Display for CheckSuite<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} suite (min grade {:.2})", self.name, self.min_grade)?;
        for (weight, check) in &self.entries {
            writeln!(
                f,
                "  {:>4.1} {:<12} {:>8.3} {:>8.3} {:<13} {}",
                weight,
                check.name,
                check.low,
                check.high,
                format!("{:?}", check.polarity),
                check.failure.map(|t| t.0).unwrap_or("-"),
            )?;
        }
        Ok(())
    }
}

impl<C> fmt::Debug for CheckSuite<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckSuite")
            .field("name", &self.name)
            .field("min_grade", &self.min_grade)
            .field("checks", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[derive(Default)]
    struct Sample {
        value: f64,
        anchor: Option<usize>,
        failures: Vec<Failure>,
    }

    impl Checkable for Sample {
        fn set_failure(&mut self, failure: Failure) {
            self.failures.push(failure);
        }
    }

    const TOO_LOW: Failure = Failure("TooLow");

    fn ramp(polarity: Polarity) -> Check<'static, Sample> {
        Check::new("Ramp", "sample value", 1.0, 3.0, polarity, Some(TOO_LOW), |p: &mut Sample| {
            p.value
        })
    }

    #[test]
    fn covariant_grade_is_clamped_linear() {
        let check = ramp(Polarity::Covariant);
        assert_relative_eq!(check.grade_of(1.0), 0.0);
        assert_relative_eq!(check.grade_of(3.0), 1.0);
        assert_relative_eq!(check.grade_of(2.5), 0.75);
        assert_relative_eq!(check.grade_of(-10.0), 0.0);
        assert_relative_eq!(check.grade_of(10.0), 1.0);
        assert_relative_eq!(check.grade_of(f64::NAN), 0.0);
    }

    #[test]
    fn contravariant_grade_is_inverted() {
        let check = ramp(Polarity::Contravariant);
        assert_relative_eq!(check.grade_of(1.0), 1.0);
        assert_relative_eq!(check.grade_of(3.0), 0.0);
        assert_relative_eq!(check.grade_of(1.5), 0.75);
        assert_relative_eq!(check.grade_of(0.0), 1.0);
        assert_relative_eq!(check.grade_of(4.0), 0.0);
    }

    #[test]
    fn boolean_check_is_all_or_nothing() {
        let check: Check<'_, Sample> = Check::boolean("Flag", "flag", None, |p: &mut Sample| p.value);
        assert_relative_eq!(check.grade_of(1.0), 1.0);
        assert_relative_eq!(check.grade_of(0.0), 0.0);
        assert_relative_eq!(check.grade_of(0.49), 0.0);
    }

    #[test]
    fn failing_check_tags_the_context() {
        let check = ramp(Polarity::Covariant);
        let mut sample = Sample {
            value: 0.5,
            ..Sample::default()
        };
        let grade = check.pass(&mut sample);
        assert_relative_eq!(grade.grade, 0.0);
        assert_eq!(grade.failure, Some(TOO_LOW));
        assert_eq!(sample.failures, vec![TOO_LOW]);
    }

    #[test]
    fn suite_runs_side_effects_after_a_failure() {
        let mut suite = CheckSuite::new("Sample", 0.5);
        suite.add(
            1.0,
            Check::boolean("Fail", "always fails", Some(TOO_LOW), |_| 0.0),
        );
        suite.add(
            1.0,
            Check::new(
                "Anchor",
                "records an anchor",
                0.0,
                1.0,
                Polarity::Contravariant,
                None,
                |p: &mut Sample| {
                    p.anchor = Some(7);
                    0.0
                },
            ),
        );
        suite.add(
            1.0,
            Check::boolean("Reader", "reads the anchor", None, |p: &mut Sample| {
                if p.anchor.is_some() {
                    1.0
                } else {
                    0.0
                }
            }),
        );

        let mut sample = Sample::default();
        let result = suite.pass(&mut sample);
        assert_eq!(sample.anchor, Some(7));
        assert_eq!(result.checks.len(), 3);
        assert_relative_eq!(result.grade_of("Reader").unwrap(), 1.0);
        assert!(result.is_vetoed());
        assert!(!result.accepts(0.5));
        assert_relative_eq!(result.grade, 2.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_weight_checks_only_contribute_side_effects() {
        let mut suite = CheckSuite::new("Sample", 0.5);
        suite.add(
            0.0,
            Check::boolean("Side", "side effect only", Some(TOO_LOW), |p: &mut Sample| {
                p.anchor = Some(1);
                0.0
            }),
        );
        suite.add(2.0, Check::boolean("Main", "main", None, |_| 1.0));

        let mut sample = Sample::default();
        let result = suite.pass(&mut sample);
        assert_relative_eq!(result.grade, 1.0);
        assert!(!result.is_vetoed());
        assert!(result.accepts(0.5));
        assert_eq!(sample.anchor, Some(1));
        assert_eq!(result.first_failure(), Some(TOO_LOW));
    }

    #[test]
    fn collection_is_flattened_into_one_mean() {
        let mut common = CheckSuite::new("Common", 0.5);
        common.add(1.0, Check::boolean("A", "a", None, |_| 1.0));
        common.add(1.0, Check::boolean("B", "b", None, |_| 1.0));
        common.add(1.0, Check::boolean("C", "c", None, |_| 1.0));
        let mut specific = CheckSuite::new("Specific", 0.5);
        specific.add(1.0, Check::boolean("D", "d", None, |_| 0.0));

        let mut sample = Sample::default();
        let result = CheckSuite::pass_collection(&[&common, &specific], &mut sample);
        // Suite-by-suite averaging would give 0.5.
        assert_relative_eq!(result.grade, 0.75);
        assert_eq!(result.checks.len(), 4);
    }

    #[test]
    fn skipped_check_keeps_side_effect_and_passes() {
        let check = Check::new(
            "Top",
            "distance",
            0.2,
            1.0,
            Polarity::Contravariant,
            None,
            |p: &mut Sample| {
                p.anchor = Some(3);
                5.0
            },
        )
        .skipped_when(|p: &Sample| p.value > 0.0);

        let mut long = Sample {
            value: 1.0,
            ..Sample::default()
        };
        assert_relative_eq!(check.pass(&mut long).grade, 1.0);
        assert_eq!(long.anchor, Some(3));

        let mut short = Sample::default();
        assert_relative_eq!(check.pass(&mut short).grade, 0.0);
    }
}
