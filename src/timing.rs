//! # Módulo de Instrumentación Temporal
//!
//! Define el registro de tiempos que acompaña a cada elemento que pasa por
//! una fila de caja y la capacidad `Timed` que permite a cualquier tipo de
//! carga de trabajo exponer esos tiempos.
//!
//! El modelo sigue el esquema clásico de teoría de colas:
//! - cuándo llegó el elemento a la fila
//! - cuándo salió de la fila y comenzó a ser atendido
//! - cuándo terminó su atención

use std::time::{Duration, Instant};

/// Marcas de tiempo del ciclo de vida de un elemento encolado.
///
/// Cada marca se escribe una sola vez, por el dueño del elemento en ese
/// momento: la fila escribe `enter` y `exit`, el cajero escribe `finish`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timing {
    /// Momento en que la fila aceptó el elemento
    pub enter: Option<Instant>,
    /// Momento en que un consumidor retiró el elemento de la fila
    pub exit: Option<Instant>,
    /// Momento en que terminó la atención del elemento
    pub finish: Option<Instant>,
}

impl Timing {
    /// Crea un registro sin ninguna marca.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tiempo de espera en la fila (`exit - enter`).
    ///
    /// # Returns
    ///
    /// `None` mientras alguno de los dos extremos no haya sido registrado
    pub fn in_queue_time(&self) -> Option<Duration> {
        span(self.enter, self.exit)
    }

    /// Tiempo de atención (`finish - exit`).
    pub fn service_time(&self) -> Option<Duration> {
        span(self.exit, self.finish)
    }

    /// Tiempo total en el sistema (`finish - enter`).
    pub fn total_wait_time(&self) -> Option<Duration> {
        span(self.enter, self.finish)
    }

    /// Indica si el elemento completó las tres etapas.
    pub fn is_complete(&self) -> bool {
        self.enter.is_some() && self.exit.is_some() && self.finish.is_some()
    }
}

fn span(from: Option<Instant>, to: Option<Instant>) -> Option<Duration> {
    Some(to?.saturating_duration_since(from?))
}

/// Capacidad de instrumentación temporal.
///
/// Un tipo solo necesita exponer su `Timing` embebido; el registro de
/// eventos y las duraciones derivadas vienen dados por los métodos por
/// defecto.
pub trait Timed {
    /// Registro de tiempos del elemento.
    fn timing(&self) -> &Timing;

    /// Acceso mutable al registro de tiempos.
    fn timing_mut(&mut self) -> &mut Timing;

    /// El elemento fue aceptado en la fila.
    fn record_enter_queue(&mut self) {
        self.timing_mut().enter = Some(Instant::now());
    }

    /// El elemento fue retirado de la fila para ser atendido.
    fn record_exit_queue(&mut self) {
        self.timing_mut().exit = Some(Instant::now());
    }

    /// La atención del elemento terminó.
    fn record_service_done(&mut self) {
        self.timing_mut().finish = Some(Instant::now());
    }

    fn in_queue_time(&self) -> Option<Duration> {
        self.timing().in_queue_time()
    }

    fn service_time(&self) -> Option<Duration> {
        self.timing().service_time()
    }

    fn total_wait_time(&self) -> Option<Duration> {
        self.timing().total_wait_time()
    }
}
