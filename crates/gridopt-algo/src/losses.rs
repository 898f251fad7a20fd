//! Resistive (Joule) loss estimation.
//!
//! Every line is assumed to carry the same constant current `I`, so the loss
//! of an edge set is `Σ I²·R`. The current is a configured constant and is
//! not derived from a flow assignment. Reactance and voltage are not modeled.
//!
//! The estimator accepts anything that exposes a resistance: lines of a
//! [`Network`], [`LineRecord`]s straight from a loader, or references to
//! either. A record without a resistance fails with
//! [`GridError::MissingAttribute`]; it is never read as zero.

use crate::config::LossConfig;
use gridopt_core::{Amperes, GridError, GridResult, Line, LineRecord, Network, Ohms, Watts};
use serde::Serialize;
use tracing::debug;

/// An edge-like value with a series resistance.
pub trait ResistiveElement {
    fn resistance(&self) -> GridResult<Ohms>;
}

impl ResistiveElement for Line {
    fn resistance(&self) -> GridResult<Ohms> {
        Ok(self.resistance)
    }
}

impl ResistiveElement for LineRecord {
    fn resistance(&self) -> GridResult<Ohms> {
        match self.resistance {
            Some(ohms) if ohms.is_finite() && ohms >= 0.0 => Ok(Ohms(ohms)),
            Some(ohms) => Err(GridError::invalid(
                self.label(),
                "resistance",
                format!("{ohms} must be finite and >= 0"),
            )),
            None => Err(GridError::missing(self.label(), "resistance")),
        }
    }
}

impl<T: ResistiveElement + ?Sized> ResistiveElement for &T {
    fn resistance(&self) -> GridResult<Ohms> {
        (**self).resistance()
    }
}

/// Constant-current Joule loss model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossModel {
    pub current: Amperes,
}

impl Default for LossModel {
    fn default() -> Self {
        Self::from_config(&LossConfig::default())
    }
}

impl LossModel {
    pub fn new(current: Amperes) -> Self {
        Self { current }
    }

    pub fn from_config(config: &LossConfig) -> Self {
        Self::new(config.current())
    }

    /// Loss over an arbitrary edge set. Fails on the first element without a
    /// usable resistance.
    pub fn estimate<I>(&self, lines: I) -> GridResult<Watts>
    where
        I: IntoIterator,
        I::Item: ResistiveElement,
    {
        let mut total = Watts::ZERO;
        for line in lines {
            total = total + self.current.joule_loss(line.resistance()?);
        }
        Ok(total)
    }

    /// Loss over every line of a network.
    pub fn network_losses(&self, network: &Network) -> Watts {
        network
            .lines()
            .map(|line| self.current.joule_loss(line.resistance))
            .sum()
    }

    /// Score `candidate` against `baseline` under the same current.
    pub fn compare(&self, baseline: &Network, candidate: &Network) -> LossComparison {
        let comparison =
            LossComparison::new(self.network_losses(baseline), self.network_losses(candidate));
        debug!(
            baseline_w = comparison.baseline.value(),
            candidate_w = comparison.candidate.value(),
            reduction_percent = comparison.reduction_percent,
            "loss comparison"
        );
        comparison
    }
}

/// Losses of a candidate topology relative to a baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LossComparison {
    pub baseline: Watts,
    pub candidate: Watts,
    /// `(baseline - candidate) / baseline * 100`; 0 for a lossless baseline
    pub reduction_percent: f64,
}

impl LossComparison {
    pub fn new(baseline: Watts, candidate: Watts) -> Self {
        let reduction_percent = if baseline.value() > 0.0 {
            (baseline - candidate) / baseline * 100.0
        } else {
            0.0
        };
        Self {
            baseline,
            candidate,
            reduction_percent,
        }
    }

    pub fn savings(&self) -> Watts {
        self.baseline - self.candidate
    }
}
