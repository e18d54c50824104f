//! # Módulo de Errores
//!
//! Errores de configuración (se reportan al usuario antes de simular) y
//! fallas inesperadas de los hilos de la simulación.

use thiserror::Error;

/// Parámetros de simulación inválidos.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// El selector de política no es `FIFO` ni `Priority`.
    #[error("política de fila desconocida: '{0}' (se espera FIFO o Priority)")]
    UnknownPolicy(String),

    #[error("la cantidad de clientes debe ser positiva")]
    NoCustomers,

    #[error("el tamaño promedio de carrito debe ser positivo")]
    EmptyCarts,

    /// Tiempo entre llegadas no positivo o no finito.
    #[error("el tiempo promedio entre llegadas debe ser un real positivo, se recibió {0}")]
    InvalidDelay(f64),

    /// Tiempo de llegada acumulado que no cabe en un `Duration`.
    #[error("el tiempo de llegada de {0} ms está fuera de rango")]
    DelayOutOfRange(f64),

    #[error("no se pudo interpretar '{0}' como tiempo en milisegundos")]
    UnparsableDelay(String),
}

/// Falla irrecuperable durante la simulación.
///
/// Un hilo que hace panic no tiene semántica de recuperación: la simulación
/// se aborta sin resultados parciales.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error("el hilo del cliente {id} terminó con panic")]
    CustomerPanicked { id: usize },

    #[error("el hilo del cajero terminó con panic")]
    ClerkPanicked,
}
