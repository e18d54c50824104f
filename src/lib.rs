//! # Simulador de Fila de Caja
//!
//! Esta biblioteca simula la fila de caja de un supermercado como un proceso
//! de colas con un único servidor: varios clientes (productores) llegan en
//! momentos aleatorios y dejan su carrito en una fila compartida, y un único
//! cajero (consumidor) los atiende uno por uno.
//!
//! ## Características principales
//!
//! - **Fila bloqueante thread-safe**: `Mutex` + `Condvar`, con notificación a
//!   todos los hilos en espera en cada cambio de estado.
//! - **Dos políticas intercambiables**: FIFO y prioridad por tamaño de
//!   carrito, detrás del mismo trait `CheckoutLine`.
//! - **Cierre por centinela**: `Entry::Shutdown` se encola solo después de
//!   que todos los clientes terminaron.
//! - **Métricas**: espera en fila, tiempo de atención y tiempo total por
//!   carrito, con sus promedios.
//!
//! ## Estructura del proyecto
//!
//! - `timing`: registro de tiempos y la capacidad `Timed`
//! - `cart`: los carritos, unidad de trabajo de la simulación
//! - `queue`: las filas bloqueantes y sus políticas
//! - `customer`: los clientes (productores) y el plan de llegadas
//! - `clerk`: el cajero (consumidor)
//! - `simulation`: coordinación de la simulación completa
//! - `metrics`: cálculo de métricas y reportes

pub mod cart;
pub mod clerk;
pub mod customer;
pub mod error;
pub mod metrics;
pub mod queue;
pub mod simulation;
pub mod timing;

// Re-exportar las estructuras principales para facilitar su uso
pub use cart::Cart;
pub use clerk::{Clerk, ClerkState};
pub use customer::{Arrival, Customer, CustomerFactory, CustomerPool};
pub use error::{ConfigError, SimulationError};
pub use metrics::{CartMetrics, MetricsCalculator, SimulationMetrics};
pub use queue::{CheckoutLine, Entry, FifoLine, PriorityLine, QueuePolicy};
pub use simulation::{Simulation, SimulationConfig};
pub use timing::{Timed, Timing};

/// Configuración por defecto del simulador
pub mod config {
    use std::time::Duration;

    /// Tiempo de atención por cada producto del carrito
    pub const TIME_PER_CART_ITEM: Duration = Duration::from_millis(10);

    /// Token de línea de comandos para la fila FIFO
    pub const FIFO_TOKEN: &str = "FIFO";

    /// Token de línea de comandos para la fila por prioridad
    pub const PRIORITY_TOKEN: &str = "Priority";
}
