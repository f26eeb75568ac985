//! Portão de agendamento da extração.
//!
//! Um debounce simples: a extração roda se nunca rodou neste processo ou se
//! o último disparo foi há mais que o intervalo configurado. O estado vive
//! no objeto (não é global) e não sobrevive a um reinício. Dois chamadores
//! concorrentes podem passar pelo portão ao mesmo tempo; não há exclusão
//! mútua.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Estado do último disparo da extração.
#[derive(Debug)]
pub struct SchedulerGate {
    interval: Duration,
    last_run: Mutex<Option<DateTime<Utc>>>,
}

impl SchedulerGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: Mutex::new(None),
        }
    }

    /// Portão com o intervalo padrão de 24 horas.
    pub fn daily() -> Self {
        Self::new(Duration::hours(24))
    }

    /// Verdadeiro se nunca rodou ou se `now - last_run > interval`.
    pub fn should_run(&self, now: DateTime<Utc>) -> bool {
        match *self.last_run.lock().unwrap_or_else(|e| e.into_inner()) {
            None => true,
            Some(last) => now - last > self.interval,
        }
    }

    /// Registra que a extração foi disparada em `now`.
    pub fn mark_run(&self, now: DateTime<Utc>) {
        *self.last_run.lock().unwrap_or_else(|e| e.into_inner()) = Some(now);
    }

    pub fn last_run(&self) -> Option<DateTime<Utc>> {
        *self.last_run.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
