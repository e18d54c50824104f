//! # Módulo de Simulación Principal
//!
//! Este módulo coordina la simulación de la fila de caja: lanza al cajero y
//! a los clientes, espera a que todos los clientes hayan encolado su
//! carrito, envía el centinela de cierre y recolecta los resultados.

use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::{debug, info};
use rand::SeedableRng;
use rand_pcg::Pcg64;

use crate::cart::Cart;
use crate::clerk::Clerk;
use crate::config;
use crate::customer::{Arrival, CustomerFactory, CustomerPool};
use crate::error::{ConfigError, SimulationError};
use crate::metrics::{MetricsCalculator, SimulationMetrics};
use crate::queue::{CheckoutLine, Entry, QueuePolicy};

/// Parámetros de una simulación con llegadas aleatorias.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    /// Cantidad de clientes
    pub customers: usize,
    /// Tamaño promedio de los carritos
    pub avg_cart_size: u32,
    /// Tiempo promedio entre llegadas, en milisegundos
    pub avg_delay_ms: f64,
    /// Política de la fila de caja
    pub policy: QueuePolicy,
    /// Tiempo de atención por producto
    pub time_per_item: Duration,
    /// Semilla del generador aleatorio; `None` usa entropía del sistema
    pub seed: Option<u64>,
}

impl SimulationConfig {
    pub fn new(customers: usize, avg_cart_size: u32, avg_delay_ms: f64, policy: QueuePolicy) -> Self {
        Self {
            customers,
            avg_cart_size,
            avg_delay_ms,
            policy,
            time_per_item: config::TIME_PER_CART_ITEM,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_time_per_item(mut self, time_per_item: Duration) -> Self {
        self.time_per_item = time_per_item;
        self
    }

    /// Verifica que todos los parámetros sean positivos.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.customers == 0 {
            return Err(ConfigError::NoCustomers);
        }
        if self.avg_cart_size == 0 {
            return Err(ConfigError::EmptyCarts);
        }
        if !self.avg_delay_ms.is_finite() || self.avg_delay_ms <= 0.0 {
            return Err(ConfigError::InvalidDelay(self.avg_delay_ms));
        }
        Ok(())
    }
}

/// Orquestador de la simulación.
///
/// La `Simulation` mantiene el plan de llegadas, de modo que `run` puede
/// ejecutarse más de una vez sobre los mismos clientes.
pub struct Simulation {
    policy: QueuePolicy,
    arrivals: Vec<Arrival>,
    time_per_item: Duration,
    metrics_calculator: MetricsCalculator,
}

impl Simulation {
    /// Crea una simulación con un plan de llegadas aleatorio.
    ///
    /// # Errors
    ///
    /// `ConfigError` si algún parámetro no es positivo o si el plan de
    /// llegadas no cabe en un `Duration`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use grocery_line_simulator::{QueuePolicy, Simulation, SimulationConfig};
    ///
    /// let config = SimulationConfig::new(3, 2, 1.0, QueuePolicy::Fifo).with_seed(11);
    /// let simulation = Simulation::new(&config).unwrap();
    /// assert_eq!(simulation.arrivals().len(), 3);
    /// ```
    pub fn new(config: &SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_entropy(),
        };
        let arrivals =
            CustomerPool::new(config.customers, config.avg_cart_size, config.avg_delay_ms, rng)
                .arrivals()?;

        Ok(Self::with_arrivals(config.policy, arrivals, config.time_per_item))
    }

    /// Crea una simulación con un plan de llegadas fijo.
    pub fn with_arrivals(policy: QueuePolicy, arrivals: Vec<Arrival>, time_per_item: Duration) -> Self {
        Self {
            policy,
            arrivals,
            time_per_item,
            metrics_calculator: MetricsCalculator::new(),
        }
    }

    pub fn arrivals(&self) -> &[Arrival] {
        &self.arrivals
    }

    pub fn policy(&self) -> QueuePolicy {
        self.policy
    }

    /// Ejecuta la simulación completa.
    ///
    /// 1. Lanza al cajero y a un hilo por cliente
    /// 2. Espera a que todos los clientes terminen de encolar
    /// 3. Recién entonces encola el centinela y espera al cajero
    /// 4. Calcula las métricas sobre los carritos atendidos
    ///
    /// # Errors
    ///
    /// `SimulationError` si algún hilo terminó con panic
    pub fn run(&self) -> Result<SimulationMetrics, SimulationError> {
        info!(
            "Simulando {} clientes con fila {} ({}).",
            self.arrivals.len(),
            self.policy,
            self.policy.description()
        );

        let start_time = Instant::now();
        let line = self.policy.build::<Cart>();

        let clerk_handle = Clerk::new(line.clone(), self.time_per_item).spawn();

        let mut factory = CustomerFactory::new();
        let customer_handles: Vec<_> = self
            .arrivals
            .iter()
            .map(|&arrival| {
                let customer = factory.create(arrival);
                (customer.id(), customer.spawn(line.clone()))
            })
            .collect();

        let served = shutdown(line.as_ref(), customer_handles, clerk_handle)?;

        let end_time = Instant::now();
        info!("Simulación completada, {} carritos atendidos.", served.len());

        Ok(self
            .metrics_calculator
            .calculate_simulation_metrics(&served, start_time, end_time))
    }

    /// Genera el resumen final de los resultados.
    pub fn generate_report(&self, metrics: &SimulationMetrics) -> String {
        self.metrics_calculator.generate_report(metrics)
    }

    /// Genera la tabla detallada por carrito.
    pub fn generate_details(&self, metrics: &SimulationMetrics) -> String {
        self.metrics_calculator.generate_details(metrics)
    }

    /// Genera un reporte en formato CSV.
    pub fn generate_csv_report(&self, metrics: &SimulationMetrics) -> String {
        self.metrics_calculator.generate_csv_report(metrics)
    }
}

/// Cierra la simulación en el orden obligatorio.
///
/// Espera a todos los clientes, recién entonces encola el centinela y luego
/// espera al cajero. Aunque un cliente haya terminado con panic el centinela
/// se envía igual, así el hilo del cajero nunca queda colgado.
fn shutdown(
    line: &dyn CheckoutLine<Cart>,
    customer_handles: Vec<(usize, JoinHandle<usize>)>,
    clerk_handle: JoinHandle<Vec<Cart>>,
) -> Result<Vec<Cart>, SimulationError> {
    let mut failure = None;
    for (id, handle) in customer_handles {
        if handle.join().is_err() && failure.is_none() {
            failure = Some(SimulationError::CustomerPanicked { id });
        }
    }

    // Ningún cliente sigue en vuelo: el centinela es lo último que entra.
    debug!("Todos los clientes encolaron, enviando centinela");
    line.enqueue(Entry::Shutdown);

    let served = clerk_handle.join().map_err(|_| SimulationError::ClerkPanicked)?;
    match failure {
        Some(err) => Err(err),
        None => Ok(served),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_validate_rejects_non_positive_values() {
        let base = SimulationConfig::new(3, 5, 10.0, QueuePolicy::Fifo);
        assert_eq!(base.validate(), Ok(()));

        let mut config = base.clone();
        config.customers = 0;
        assert_eq!(config.validate(), Err(ConfigError::NoCustomers));

        let mut config = base.clone();
        config.avg_cart_size = 0;
        assert_eq!(config.validate(), Err(ConfigError::EmptyCarts));

        let mut config = base.clone();
        config.avg_delay_ms = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidDelay(0.0)));

        let mut config = base;
        config.avg_delay_ms = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_new_rejects_delay_beyond_duration_range() {
        let config = SimulationConfig::new(3, 10, 1e23, QueuePolicy::Fifo).with_seed(1);
        assert_eq!(config.validate(), Ok(()));
        assert!(matches!(
            Simulation::new(&config),
            Err(ConfigError::DelayOutOfRange(_))
        ));
    }

    #[test]
    fn test_shutdown_reaches_clerk_after_customer_panic() {
        let line = QueuePolicy::Fifo.build::<Cart>();
        let clerk_handle = Clerk::new(line.clone(), Duration::from_millis(1)).spawn();

        let mut factory = CustomerFactory::new();
        let healthy = factory.create(Arrival::new(Duration::ZERO, 2));
        let healthy_id = healthy.id();
        let customer_handles = vec![
            (healthy_id, healthy.spawn(line.clone())),
            (2, thread::spawn(|| -> usize { panic!("cliente sin carrito") })),
        ];

        let result = shutdown(line.as_ref(), customer_handles, clerk_handle);

        assert_eq!(result.unwrap_err(), SimulationError::CustomerPanicked { id: 2 });
        // el cajero consumió el centinela y terminó
        assert!(line.is_empty());
    }

    #[test]
    fn test_new_uses_seed_for_plan() {
        let config = SimulationConfig::new(8, 10, 5.0, QueuePolicy::Priority).with_seed(3);
        let a = Simulation::new(&config).unwrap();
        let b = Simulation::new(&config).unwrap();
        assert_eq!(a.arrivals(), b.arrivals());
        assert_eq!(a.policy(), QueuePolicy::Priority);
    }

    #[test]
    fn test_run_twice_serves_everyone_each_time() {
        let arrivals = vec![Arrival::new(Duration::ZERO, 1); 4];
        let simulation = Simulation::with_arrivals(QueuePolicy::Fifo, arrivals, Duration::from_millis(1));

        for _ in 0..2 {
            let metrics = simulation.run().unwrap();
            let mut order = metrics.service_order.clone();
            order.sort_unstable();
            assert_eq!(order, vec![1, 2, 3, 4]);
        }
    }
}
