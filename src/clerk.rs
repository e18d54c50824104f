//! # Módulo del Cajero
//!
//! El cajero es el único consumidor de la simulación. Retira carritos de la
//! fila, simula su atención durmiendo un tiempo proporcional a la cantidad
//! de productos y termina al recibir el centinela.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, info};

use crate::cart::Cart;
use crate::queue::{CheckoutLine, Entry};
use crate::timing::Timed;

/// Estado del ciclo de vida del cajero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClerkState {
    /// Atendiendo carritos (o esperando que llegue alguno)
    Running,
    /// Recibió el centinela; no acepta más carritos
    Terminated,
}

/// Consumidor que atiende la fila de caja.
pub struct Clerk {
    line: Arc<dyn CheckoutLine<Cart>>,
    time_per_item: Duration,
    state: ClerkState,
    served: Vec<Cart>,
}

impl Clerk {
    /// Crea un cajero conectado a su fila.
    ///
    /// # Arguments
    ///
    /// * `line` - Fila de donde se retiran los carritos
    /// * `time_per_item` - Tiempo de atención por cada producto del carrito
    pub fn new(line: Arc<dyn CheckoutLine<Cart>>, time_per_item: Duration) -> Self {
        Self {
            line,
            time_per_item,
            state: ClerkState::Running,
            served: Vec::new(),
        }
    }

    pub fn state(&self) -> ClerkState {
        self.state
    }

    /// Tiempo de atención de un carrito de `size` productos.
    pub fn service_duration(&self, size: u32) -> Duration {
        self.time_per_item.saturating_mul(size)
    }

    /// Atiende la siguiente entrada de la fila, bloqueando si está vacía.
    ///
    /// En estado `Terminated` no hace nada.
    ///
    /// # Returns
    ///
    /// El estado del cajero después del paso
    pub fn step(&mut self) -> ClerkState {
        if self.state == ClerkState::Terminated {
            return self.state;
        }

        match self.line.dequeue() {
            Entry::Shutdown => {
                debug!("Cajero recibió la señal de cierre, atendió {} carritos", self.served.len());
                self.state = ClerkState::Terminated;
            }
            Entry::Item(mut cart) => {
                info!("Cajero atiende a cliente {} con {}", cart.customer_id(), cart);
                thread::sleep(self.service_duration(cart.size()));
                cart.record_service_done();
                self.served.push(cart);
            }
        }
        self.state
    }

    /// Atiende carritos hasta recibir el centinela.
    ///
    /// # Returns
    ///
    /// Los carritos atendidos, en orden de atención
    pub fn run(mut self) -> Vec<Cart> {
        while self.step() == ClerkState::Running {}
        self.served
    }

    /// Lanza el cajero en su propio hilo.
    pub fn spawn(self) -> thread::JoinHandle<Vec<Cart>> {
        thread::spawn(move || self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::QueuePolicy;

    #[test]
    fn test_shutdown_terminates_without_serving() {
        let line = QueuePolicy::Fifo.build::<Cart>();
        line.enqueue(Entry::Shutdown);
        line.enqueue(Entry::Item(Cart::new(1, 1)));

        let mut clerk = Clerk::new(line.clone(), Duration::from_millis(1));
        assert_eq!(clerk.step(), ClerkState::Terminated);
        assert_eq!(clerk.step(), ClerkState::Terminated);

        // el carrito posterior al centinela queda sin atender
        assert_eq!(line.len(), 1);
        assert!(clerk.run().is_empty());
    }

    #[test]
    fn test_served_carts_are_stamped() {
        let line = QueuePolicy::Fifo.build::<Cart>();
        line.enqueue(Entry::Item(Cart::new(1, 2)));
        line.enqueue(Entry::Shutdown);

        let served = Clerk::new(line, Duration::from_millis(5)).run();
        assert_eq!(served.len(), 1);
        assert!(served[0].timing().is_complete());
        assert!(served[0].service_time().unwrap() >= Duration::from_millis(10));
    }

    #[test]
    fn test_service_duration_scales_with_size() {
        let clerk = Clerk::new(QueuePolicy::Fifo.build(), Duration::from_millis(10));
        assert_eq!(clerk.service_duration(0), Duration::ZERO);
        assert_eq!(clerk.service_duration(7), Duration::from_millis(70));
    }
}
