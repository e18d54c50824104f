//! # Módulo de Métricas y Reportes
//!
//! Este módulo se encarga de calcular y generar reportes de las métricas de
//! la fila de caja a partir de los tiempos registrados en cada carrito.

use std::time::{Duration, Instant};

use crate::cart::Cart;
use crate::timing::Timed;

/// Métricas individuales de un carrito atendido.
#[derive(Debug, Clone, PartialEq)]
pub struct CartMetrics {
    /// ID del cliente dueño del carrito
    pub customer_id: usize,
    /// Cantidad de productos del carrito
    pub cart_size: u32,
    /// Llegada a la fila relativa al inicio de la simulación
    pub arrival_time: Duration,
    /// Tiempo de espera en la fila
    pub queue_wait_time: Duration,
    /// Tiempo de atención
    pub service_time: Duration,
    /// Tiempo total en el sistema
    pub total_wait_time: Duration,
}

/// Métricas agregadas de toda la simulación.
#[derive(Debug, Clone)]
pub struct SimulationMetrics {
    /// Métricas de cada carrito, en orden de atención
    pub carts: Vec<CartMetrics>,
    /// Tiempo promedio de espera en la fila
    pub average_queue_wait_time: Duration,
    /// Tiempo promedio de atención
    pub average_service_time: Duration,
    /// Tiempo promedio total en el sistema
    pub average_total_wait_time: Duration,
    /// Suma de los tiempos de atención (tiempo ocupado del cajero)
    pub clerk_busy_time: Duration,
    /// IDs de clientes en el orden en que fueron atendidos
    pub service_order: Vec<usize>,
    /// Duración total de la simulación
    pub total_simulation_time: Duration,
    /// Throughput (carritos por segundo)
    pub throughput: f64,
}

/// Calculadora de métricas para la simulación.
pub struct MetricsCalculator;

impl MetricsCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Calcula las métricas de un carrito.
    ///
    /// # Returns
    ///
    /// `None` si al carrito le falta alguna de sus tres marcas de tiempo
    pub fn calculate_cart_metrics(&self, cart: &Cart, start_time: Instant) -> Option<CartMetrics> {
        let timing = cart.timing();
        Some(CartMetrics {
            customer_id: cart.customer_id(),
            cart_size: cart.size(),
            arrival_time: timing.enter?.saturating_duration_since(start_time),
            queue_wait_time: cart.in_queue_time()?,
            service_time: cart.service_time()?,
            total_wait_time: cart.total_wait_time()?,
        })
    }

    /// Calcula las métricas agregadas de toda la simulación.
    ///
    /// Los carritos incompletos quedan fuera de los promedios.
    ///
    /// # Arguments
    ///
    /// * `served` - Carritos atendidos, en orden de atención
    /// * `start_time` - Momento de inicio de la simulación
    /// * `end_time` - Momento de finalización de la simulación
    pub fn calculate_simulation_metrics(
        &self,
        served: &[Cart],
        start_time: Instant,
        end_time: Instant,
    ) -> SimulationMetrics {
        let carts: Vec<CartMetrics> = served
            .iter()
            .filter_map(|cart| self.calculate_cart_metrics(cart, start_time))
            .collect();

        let total_queue_wait: Duration = carts.iter().map(|m| m.queue_wait_time).sum();
        let clerk_busy_time: Duration = carts.iter().map(|m| m.service_time).sum();
        let total_wait: Duration = carts.iter().map(|m| m.total_wait_time).sum();

        let completed = carts.len() as u32;
        let average = |sum: Duration| {
            if completed > 0 {
                sum / completed
            } else {
                Duration::ZERO
            }
        };

        let total_simulation_time = end_time.saturating_duration_since(start_time);
        let throughput = if total_simulation_time.as_secs_f64() > 0.0 {
            carts.len() as f64 / total_simulation_time.as_secs_f64()
        } else {
            0.0
        };

        SimulationMetrics {
            service_order: carts.iter().map(|m| m.customer_id).collect(),
            average_queue_wait_time: average(total_queue_wait),
            average_service_time: average(clerk_busy_time),
            average_total_wait_time: average(total_wait),
            clerk_busy_time,
            total_simulation_time,
            throughput,
            carts,
        }
    }

    /// Genera el resumen final con los tres promedios y la duración total.
    pub fn generate_report(&self, metrics: &SimulationMetrics) -> String {
        let mut report = String::new();

        report.push_str("------------------\n");
        for (label, value) in [
            ("espera en fila", metrics.average_queue_wait_time),
            ("atención", metrics.average_service_time),
            ("espera total", metrics.average_total_wait_time),
        ] {
            report.push_str(&format!(
                "Tiempo promedio de {:>14} fue {:>8.1} ms.\n",
                label,
                Self::as_millis_f64(value)
            ));
        }
        report.push_str("---\n");
        report.push_str(&format!(
            "Tiempo total de simulación fue {:.2} ms.\n",
            Self::as_millis_f64(metrics.total_simulation_time)
        ));

        report
    }

    /// Genera la tabla detallada por carrito.
    pub fn generate_details(&self, metrics: &SimulationMetrics) -> String {
        let mut details = String::new();

        details.push_str("\n=== DETALLE POR CARRITO ===\n\n");
        details.push_str(&format!(
            "{:^8} {:^9} {:^12} {:^12} {:^12} {:^12}\n",
            "Cliente", "Tamaño", "Llegada", "Espera", "Atención", "Total"
        ));
        details.push_str(&format!("{}\n", "-".repeat(70)));

        for cart in &metrics.carts {
            details.push_str(&format!(
                "{:^8} {:^9} {:^12} {:^12} {:^12} {:^12}\n",
                format!("#{:02}", cart.customer_id),
                cart.cart_size,
                Self::format_ms(cart.arrival_time),
                Self::format_ms(cart.queue_wait_time),
                Self::format_ms(cart.service_time),
                Self::format_ms(cart.total_wait_time),
            ));
        }

        details.push_str(&format!("\nCarritos atendidos: {}\n", metrics.carts.len()));
        details.push_str(&format!(
            "Tiempo ocupado del cajero: {}\n",
            Self::format_ms(metrics.clerk_busy_time)
        ));
        details.push_str(&format!(
            "Throughput: {:.3} carritos/segundo\n",
            metrics.throughput
        ));
        details.push_str(&format!("Orden de atención: {:?}\n", metrics.service_order));

        details
    }

    /// Genera un reporte en formato CSV, una fila por carrito.
    pub fn generate_csv_report(&self, metrics: &SimulationMetrics) -> String {
        let mut csv = String::new();

        csv.push_str("CustomerID,CartSize,ArrivalMs,QueueWaitMs,ServiceMs,TotalMs\n");
        for cart in &metrics.carts {
            csv.push_str(&format!(
                "{},{},{:.3},{:.3},{:.3},{:.3}\n",
                cart.customer_id,
                cart.cart_size,
                Self::as_millis_f64(cart.arrival_time),
                Self::as_millis_f64(cart.queue_wait_time),
                Self::as_millis_f64(cart.service_time),
                Self::as_millis_f64(cart.total_wait_time),
            ));
        }

        csv
    }

    /// Formatea una duración en milisegundos con un decimal (ej: "12.5ms").
    pub fn format_ms(duration: Duration) -> String {
        format!("{:.1}ms", Self::as_millis_f64(duration))
    }

    fn as_millis_f64(duration: Duration) -> f64 {
        duration.as_secs_f64() * 1000.0
    }
}

impl Default for MetricsCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn served_cart(customer_id: usize, wait: Duration, service: Duration, start: Instant) -> Cart {
        let mut cart = Cart::new(customer_id, 3);
        let timing = cart.timing_mut();
        timing.enter = Some(start);
        timing.exit = Some(start + wait);
        timing.finish = Some(start + wait + service);
        cart
    }

    #[test]
    fn test_format_ms() {
        assert_eq!(MetricsCalculator::format_ms(Duration::from_micros(12_500)), "12.5ms");
        assert_eq!(MetricsCalculator::format_ms(Duration::ZERO), "0.0ms");
    }

    #[test]
    fn test_averages_ignore_incomplete_carts() {
        let start = Instant::now();
        let carts = vec![
            served_cart(1, Duration::from_millis(10), Duration::from_millis(20), start),
            served_cart(2, Duration::from_millis(30), Duration::from_millis(40), start),
            Cart::new(3, 9),
        ];

        let metrics = MetricsCalculator::new().calculate_simulation_metrics(
            &carts,
            start,
            start + Duration::from_secs(1),
        );

        assert_eq!(metrics.carts.len(), 2);
        assert_eq!(metrics.service_order, vec![1, 2]);
        assert_eq!(metrics.average_queue_wait_time, Duration::from_millis(20));
        assert_eq!(metrics.average_service_time, Duration::from_millis(30));
        assert_eq!(metrics.average_total_wait_time, Duration::from_millis(50));
        assert_eq!(metrics.clerk_busy_time, Duration::from_millis(60));
        assert!((metrics.throughput - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_run_has_zero_averages() {
        let start = Instant::now();
        let metrics = MetricsCalculator::new().calculate_simulation_metrics(&[], start, start);
        assert_eq!(metrics.average_service_time, Duration::ZERO);
        assert_eq!(metrics.throughput, 0.0);
    }

    #[test]
    fn test_report_lines() {
        let start = Instant::now();
        let carts = vec![served_cart(1, Duration::from_millis(10), Duration::from_millis(20), start)];
        let calculator = MetricsCalculator::new();
        let metrics = calculator.calculate_simulation_metrics(&carts, start, start + Duration::from_millis(45));

        let report = calculator.generate_report(&metrics);
        assert!(report.contains("Tiempo promedio de espera en fila fue     10.0 ms."));
        assert!(report.contains("Tiempo promedio de       atención fue     20.0 ms."));
        assert!(report.contains("Tiempo total de simulación fue 45.00 ms."));

        let csv = calculator.generate_csv_report(&metrics);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "1,3,0.000,10.000,20.000,30.000");
    }
}
