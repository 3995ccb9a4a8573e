//! Explicit Euler integration with cooperative interruption.

use std::ops::ControlFlow;

use tracing::{debug, debug_span, info_span};

use crate::config::DiffusionConfig;
use crate::diffusion::flow::Flow;
use crate::domain::Field;
use crate::error::{NerveError, Result};

/// `H ← H + dt · V(H)`, repeated `steps` times.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Euler {
    dt: f64,
    steps: usize,
}

/// Outcome of a run.
#[derive(Clone, Debug)]
pub struct Integration {
    pub state: Field,
    /// Steps actually taken
    pub steps: usize,
    /// Stopped early by a callback
    pub interrupted: bool,
}

impl Euler {
    pub fn new(dt: f64, steps: usize) -> Self {
        Self { dt, steps }
    }

    pub fn from_config(config: &DiffusionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.dt, config.steps))
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn run<V: Flow + ?Sized>(&self, flow: &V, initial: Field) -> Result<Integration> {
        self.run_with(flow, initial, |_, _| ControlFlow::Continue(()))
    }

    /// Run with a callback invoked before every step. A callback returning
    /// `ControlFlow::Break` ends the run with the current state.
    pub fn run_with<V: Flow + ?Sized>(
        &self,
        flow: &V,
        initial: Field,
        mut callback: impl FnMut(usize, &Field) -> ControlFlow<()>,
    ) -> Result<Integration> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(NerveError::InvalidConfig(format!(
                "step size must be positive and finite, got {}",
                self.dt
            )));
        }
        let span = info_span!("euler", dt = self.dt, steps = self.steps, size = initial.len());
        let _run = span.enter();

        let mut state = initial;
        for step in 0..self.steps {
            if callback(step, &state).is_break() {
                debug!(step, "interrupted");
                return Ok(Integration {
                    state,
                    steps: step,
                    interrupted: true,
                });
            }
            let _step = debug_span!("step", step).entered();
            let velocity = flow.eval(&state)?;
            state.axpy(self.dt, &velocity)?;
            debug!(velocity = velocity.norm(), state = state.norm(), "euler step");
        }

        Ok(Integration {
            state,
            steps: self.steps,
            interrupted: false,
        })
    }
}
