//! # Módulo de Carritos
//!
//! Un carrito es la unidad de trabajo de la simulación: lo crea un cliente,
//! pasa por la fila de caja y lo atiende el cajero. Su tamaño (cantidad de
//! productos) determina su prioridad y cuánto tarda su atención.

use std::cmp::Ordering;
use std::fmt;

use crate::timing::{Timed, Timing};

/// Carrito de compras con su instrumentación temporal embebida.
#[derive(Clone, Debug)]
pub struct Cart {
    customer_id: usize,
    size: u32,
    timing: Timing,
}

impl Cart {
    /// Crea un carrito lleno con `size` productos.
    ///
    /// # Arguments
    ///
    /// * `customer_id` - Cliente dueño del carrito (1-indexado)
    /// * `size` - Cantidad de productos en el carrito
    ///
    /// # Examples
    ///
    /// ```rust
    /// use grocery_line_simulator::Cart;
    ///
    /// let cart = Cart::new(1, 12);
    /// assert_eq!(cart.size(), 12);
    /// assert_eq!(cart.to_string(), "Carrito(12)");
    /// ```
    pub fn new(customer_id: usize, size: u32) -> Self {
        Self {
            customer_id,
            size,
            timing: Timing::new(),
        }
    }

    /// Cantidad de productos en el carrito.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Cliente dueño del carrito.
    pub fn customer_id(&self) -> usize {
        self.customer_id
    }
}

impl Timed for Cart {
    fn timing(&self) -> &Timing {
        &self.timing
    }

    fn timing_mut(&mut self) -> &mut Timing {
        &mut self.timing
    }
}

// El orden es por cantidad de productos; a igual tamaño decide el id del
// cliente. Los tiempos no participan.
impl PartialEq for Cart {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cart {}

impl PartialOrd for Cart {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cart {
    fn cmp(&self, other: &Self) -> Ordering {
        self.size
            .cmp(&other.size)
            .then_with(|| self.customer_id.cmp(&other.customer_id))
    }
}

impl fmt::Display for Cart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Carrito({})", self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smaller_cart_goes_first() {
        let small = Cart::new(2, 3);
        let big = Cart::new(1, 30);
        assert!(small < big);
    }

    #[test]
    fn test_equal_size_ordered_by_customer() {
        let first = Cart::new(1, 10);
        let second = Cart::new(2, 10);
        assert!(first < second);
        assert_ne!(first, second);
    }

    #[test]
    fn test_new_cart_has_no_timestamps() {
        let cart = Cart::new(7, 4);
        assert_eq!(cart.customer_id(), 7);
        assert_eq!(*cart.timing(), Timing::new());
        assert_eq!(cart.service_time(), None);
    }
}
