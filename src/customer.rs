//! # Módulo de Clientes
//!
//! Los clientes son los productores de la simulación: cada uno espera su
//! tiempo de llegada, deja su carrito en la fila de caja y termina.
//! `CustomerPool` genera el plan de llegadas aleatorio a partir de los
//! parámetros promedio.

use std::f64::consts::PI;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::info;
use rand::Rng;
use rand_pcg::Pcg64;

use crate::cart::Cart;
use crate::error::ConfigError;
use crate::queue::{CheckoutLine, Entry};

/// Muestra aleatoria con densidad de medio ciclo de seno.
///
/// La densidad imita la primera mitad de una onda seno (de 0 a π), por lo
/// que el valor más probable coincide con la media. El resultado queda en
/// el rango `[0, 2 * mean]`.
///
/// # Examples
///
/// ```rust
/// use rand::SeedableRng;
/// use rand_pcg::Pcg64;
/// use grocery_line_simulator::customer::sine_pdf_sample;
///
/// let mut rng = Pcg64::seed_from_u64(7);
/// let value = sine_pdf_sample(&mut rng, 50.0);
/// assert!((0.0..=100.0).contains(&value));
/// ```
pub fn sine_pdf_sample<R: Rng>(rng: &mut R, mean: f64) -> f64 {
    let u: f64 = rng.gen();
    2.0 * (1.0 - 2.0 * u).acos() * mean / PI
}

/// Llegada planificada de un cliente.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arrival {
    /// Espera desde el inicio de la simulación hasta llegar a la fila
    pub delay: Duration,
    /// Cantidad de productos en su carrito
    pub cart_size: u32,
}

impl Arrival {
    pub fn new(delay: Duration, cart_size: u32) -> Self {
        Self { delay, cart_size }
    }
}

/// Productor: espera su turno de llegada y encola un único carrito.
#[derive(Debug)]
pub struct Customer {
    id: usize,
    delay: Duration,
    cart: Cart,
}

impl Customer {
    /// Crea un cliente con su carrito ya lleno.
    pub fn new(id: usize, arrival: Arrival) -> Self {
        Self {
            id,
            delay: arrival.delay,
            cart: Cart::new(id, arrival.cart_size),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Ejecuta el ciclo de vida completo del cliente.
    ///
    /// 1. Duerme durante su tiempo de llegada
    /// 2. Deja el carrito en la fila
    /// 3. Informa cuántos clientes tenía adelante
    ///
    /// # Returns
    ///
    /// La cantidad de clientes que había delante al momento de encolar
    pub fn run(self, line: &dyn CheckoutLine<Cart>) -> usize {
        thread::sleep(self.delay);

        let description = self.cart.to_string();
        let ahead = line.enqueue(Entry::Item(self.cart)) - 1;
        info!(
            "Cliente {} con {} entró a la fila, con {} clientes adelante.",
            self.id, description, ahead
        );
        ahead
    }

    /// Lanza el cliente en su propio hilo.
    pub fn spawn(self, line: Arc<dyn CheckoutLine<Cart>>) -> thread::JoinHandle<usize> {
        thread::spawn(move || self.run(line.as_ref()))
    }
}

/// Numera clientes de forma consecutiva a partir de 1.
///
/// Reemplaza un contador global: cada simulación crea el suyo.
#[derive(Debug)]
pub struct CustomerFactory {
    next_id: usize,
}

impl CustomerFactory {
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Crea el siguiente cliente con el próximo id disponible.
    pub fn create(&mut self, arrival: Arrival) -> Customer {
        let customer = Customer::new(self.next_id, arrival);
        self.next_id += 1;
        customer
    }
}

impl Default for CustomerFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// Generador del plan de llegadas aleatorio.
///
/// Las llegadas son acumulativas: cada cliente espera lo mismo que el
/// anterior más un incremento aleatorio alrededor de `avg_delay`, medido
/// desde el inicio de la simulación. Así los tiempos de llegada crecen
/// de forma monótona.
pub struct CustomerPool {
    num_customers: usize,
    avg_load: u32,
    avg_delay_ms: f64,
    rng: Pcg64,
}

impl CustomerPool {
    /// # Arguments
    ///
    /// * `num_customers` - Cantidad de clientes a generar
    /// * `avg_load` - Tamaño promedio de los carritos
    /// * `avg_delay_ms` - Tiempo promedio entre llegadas (ms)
    /// * `rng` - Generador de números aleatorios
    pub fn new(num_customers: usize, avg_load: u32, avg_delay_ms: f64, rng: Pcg64) -> Self {
        Self {
            num_customers,
            avg_load,
            avg_delay_ms,
            rng,
        }
    }

    /// Genera el plan de llegadas de todos los clientes.
    ///
    /// # Errors
    ///
    /// `ConfigError::DelayOutOfRange` si algún tiempo de llegada acumulado
    /// no se puede representar como `Duration`
    pub fn arrivals(&mut self) -> Result<Vec<Arrival>, ConfigError> {
        let mut prev_delay_ms = 0.0;
        (0..self.num_customers)
            .map(|_| {
                let load = sine_pdf_sample(&mut self.rng, f64::from(self.avg_load)) as u32;
                prev_delay_ms += sine_pdf_sample(&mut self.rng, self.avg_delay_ms);
                let delay = Duration::try_from_secs_f64(prev_delay_ms / 1000.0)
                    .map_err(|_| ConfigError::DelayOutOfRange(prev_delay_ms))?;
                Ok(Arrival::new(delay, load))
            })
            .collect()
    }
}
