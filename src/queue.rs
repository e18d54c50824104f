//! # Módulo de Filas de Caja
//!
//! Implementa la fila bloqueante compartida entre clientes y cajero, con dos
//! políticas de extracción intercambiables:
//! - **FIFO**: los elementos salen en el orden en que entraron
//! - **Priority**: sale primero el elemento más pequeño según su orden total
//!
//! Ambas variantes protegen todo su estado con un único `Mutex` y usan un
//! `Condvar` asociado a la condición "no vacía". Cada cambio de estado
//! despierta a todos los hilos en espera (`notify_all`); cada hilo vuelve a
//! verificar la condición antes de actuar.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use log::{debug, trace};

use crate::config;
use crate::error::ConfigError;
use crate::timing::Timed;

/// Elemento que circula por la fila.
///
/// `Shutdown` es el centinela que indica al consumidor que no llegarán más
/// elementos. No lleva tiempos y, en la política por prioridad, es mayor que
/// cualquier `Item`, por lo que nunca sale antes que un elemento real.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Entry<T> {
    /// Unidad de trabajo real
    Item(T),
    /// Señal de fin de la simulación
    Shutdown,
}

impl<T> Entry<T> {
    /// Indica si la entrada es el centinela.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, Entry::Shutdown)
    }

    /// Extrae el elemento, o `None` si es el centinela.
    pub fn into_item(self) -> Option<T> {
        match self {
            Entry::Item(item) => Some(item),
            Entry::Shutdown => None,
        }
    }
}

impl<T: Timed> Entry<T> {
    fn record_enter_queue(&mut self) {
        if let Entry::Item(item) = self {
            item.record_enter_queue();
            trace!("entrada registrada en {:?}", item.timing().enter);
        }
    }

    fn record_exit_queue(&mut self) {
        if let Entry::Item(item) = self {
            item.record_exit_queue();
            trace!("salida registrada en {:?}", item.timing().exit);
        }
    }
}

/// Contrato común de las filas de caja thread-safe.
///
/// - `enqueue` nunca bloquea (la fila no tiene límite de tamaño).
/// - `dequeue` bloquea mientras la fila esté vacía, sin timeout.
/// - Ambas operaciones registran los tiempos correspondientes en el elemento.
pub trait CheckoutLine<T>: Send + Sync {
    /// Agrega la entrada a la fila y registra su momento de entrada.
    ///
    /// # Returns
    ///
    /// El largo de la fila inmediatamente después de agregarla
    fn enqueue(&self, entry: Entry<T>) -> usize;

    /// Retira la siguiente entrada según la política y registra su salida.
    ///
    /// Bloquea el hilo llamador hasta que haya al menos una entrada.
    fn dequeue(&self) -> Entry<T>;

    /// Cantidad de entradas presentes en este instante.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Política de extracción de esta fila.
    fn policy(&self) -> QueuePolicy;
}

/// Política de extracción, elegida al construir la fila.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueuePolicy {
    /// Fila común: primero en llegar, primero en salir.
    Fifo,
    /// Fila que atiende primero los carritos con menos productos.
    Priority,
}

impl QueuePolicy {
    /// Construye una fila vacía con esta política.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use grocery_line_simulator::{Cart, CheckoutLine, Entry, QueuePolicy};
    ///
    /// let line = QueuePolicy::Priority.build::<Cart>();
    /// line.enqueue(Entry::Item(Cart::new(1, 30)));
    /// line.enqueue(Entry::Item(Cart::new(2, 10)));
    /// assert_eq!(line.dequeue().into_item().unwrap().size(), 10);
    /// ```
    pub fn build<T>(self) -> Arc<dyn CheckoutLine<T>>
    where
        T: Timed + Ord + Send + 'static,
    {
        match self {
            Self::Fifo => Arc::new(FifoLine::new()),
            Self::Priority => Arc::new(PriorityLine::new()),
        }
    }

    /// Token de línea de comandos que selecciona esta política.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Fifo => config::FIFO_TOKEN,
            Self::Priority => config::PRIORITY_TOKEN,
        }
    }

    /// Descripción legible de la política.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Fifo => "primero en llegar, primero en ser atendido",
            Self::Priority => "se atienden primero los carritos más pequeños",
        }
    }
}

impl fmt::Display for QueuePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for QueuePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            config::FIFO_TOKEN => Ok(Self::Fifo),
            config::PRIORITY_TOKEN => Ok(Self::Priority),
            other => Err(ConfigError::UnknownPolicy(other.to_string())),
        }
    }
}

/// Fila bloqueante con orden de inserción.
pub struct FifoLine<T> {
    inner: Mutex<VecDeque<Entry<T>>>,
    changed: Condvar,
}

impl<T: Timed> FifoLine<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
            changed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Entry<T>>> {
        self.inner.lock().expect("mutex de la fila FIFO envenenado")
    }
}

impl<T: Timed> Default for FifoLine<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Timed + Send> CheckoutLine<T> for FifoLine<T> {
    fn enqueue(&self, mut entry: Entry<T>) -> usize {
        let mut items = self.lock();
        entry.record_enter_queue();
        items.push_back(entry);
        let len = items.len();
        self.changed.notify_all();
        debug!("FIFO: entrada agregada, largo {}", len);
        len
    }

    fn dequeue(&self) -> Entry<T> {
        let mut items = self.lock();
        while items.is_empty() {
            items = self
                .changed
                .wait(items)
                .expect("mutex de la fila FIFO envenenado");
        }
        let mut entry = items.pop_front().expect("fila verificada no vacía");
        entry.record_exit_queue();
        self.changed.notify_all();
        debug!("FIFO: entrada retirada, quedan {}", items.len());
        entry
    }

    fn len(&self) -> usize {
        self.lock().len()
    }

    fn policy(&self) -> QueuePolicy {
        QueuePolicy::Fifo
    }
}

/// Entrada con su número de secuencia de inserción.
///
/// A igual orden entre entradas, sale primero la que entró antes.
struct Ranked<T> {
    entry: Entry<T>,
    seq: u64,
}

impl<T: Ord> PartialEq for Ranked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T: Ord> Eq for Ranked<T> {}

impl<T: Ord> PartialOrd for Ranked<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Ord> Ord for Ranked<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.entry
            .cmp(&other.entry)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

struct Heap<T> {
    // min-heap sobre el orden de `Ranked`
    items: BinaryHeap<Reverse<Ranked<T>>>,
    next_seq: u64,
}

/// Fila bloqueante que extrae siempre la entrada más pequeña.
pub struct PriorityLine<T> {
    inner: Mutex<Heap<T>>,
    changed: Condvar,
}

impl<T: Timed + Ord> PriorityLine<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Heap {
                items: BinaryHeap::new(),
                next_seq: 0,
            }),
            changed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Heap<T>> {
        self.inner.lock().expect("mutex de la fila por prioridad envenenado")
    }
}

impl<T: Timed + Ord> Default for PriorityLine<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Timed + Ord + Send> CheckoutLine<T> for PriorityLine<T> {
    fn enqueue(&self, mut entry: Entry<T>) -> usize {
        let mut heap = self.lock();
        entry.record_enter_queue();
        let seq = heap.next_seq;
        heap.next_seq += 1;
        heap.items.push(Reverse(Ranked { entry, seq }));
        let len = heap.items.len();
        self.changed.notify_all();
        debug!("Priority: entrada #{} agregada, largo {}", seq, len);
        len
    }

    fn dequeue(&self) -> Entry<T> {
        let mut heap = self.lock();
        while heap.items.is_empty() {
            heap = self
                .changed
                .wait(heap)
                .expect("mutex de la fila por prioridad envenenado");
        }
        let Reverse(Ranked { mut entry, seq }) =
            heap.items.pop().expect("fila verificada no vacía");
        entry.record_exit_queue();
        self.changed.notify_all();
        debug!("Priority: entrada #{} retirada, quedan {}", seq, heap.items.len());
        entry
    }

    fn len(&self) -> usize {
        self.lock().items.len()
    }

    fn policy(&self) -> QueuePolicy {
        QueuePolicy::Priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::Cart;

    #[test]
    fn test_policy_tokens() {
        assert_eq!("FIFO".parse::<QueuePolicy>(), Ok(QueuePolicy::Fifo));
        assert_eq!("Priority".parse::<QueuePolicy>(), Ok(QueuePolicy::Priority));
        assert_eq!(
            "fifo".parse::<QueuePolicy>(),
            Err(ConfigError::UnknownPolicy("fifo".to_string()))
        );
        assert_eq!(QueuePolicy::Priority.to_string(), "Priority");
    }

    #[test]
    fn test_shutdown_sorts_after_every_item() {
        let biggest = Entry::Item(Cart::new(1, u32::MAX));
        assert!(biggest < Entry::Shutdown);
    }

    #[test]
    fn test_enqueue_returns_length_after_insertion() {
        let line = FifoLine::new();
        assert_eq!(line.enqueue(Entry::Item(Cart::new(1, 5))), 1);
        assert_eq!(line.enqueue(Entry::Item(Cart::new(2, 5))), 2);
        line.dequeue();
        assert_eq!(line.enqueue(Entry::Shutdown), 2);
        assert_eq!(line.len(), 2);
    }

    #[test]
    fn test_priority_ties_leave_in_insertion_order() {
        #[derive(Debug)]
        struct Tagged {
            key: u32,
            tag: char,
            timing: crate::timing::Timing,
        }
        impl PartialEq for Tagged {
            fn eq(&self, other: &Self) -> bool {
                self.key == other.key
            }
        }
        impl Eq for Tagged {}
        impl PartialOrd for Tagged {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }
        impl Ord for Tagged {
            fn cmp(&self, other: &Self) -> Ordering {
                self.key.cmp(&other.key)
            }
        }
        impl Timed for Tagged {
            fn timing(&self) -> &crate::timing::Timing {
                &self.timing
            }
            fn timing_mut(&mut self) -> &mut crate::timing::Timing {
                &mut self.timing
            }
        }

        let line = PriorityLine::new();
        for (key, tag) in [(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd')] {
            line.enqueue(Entry::Item(Tagged { key, tag, timing: Default::default() }));
        }
        let tags: String = (0..4)
            .map(|_| line.dequeue().into_item().unwrap().tag)
            .collect();
        assert_eq!(tags, "bdac");
    }

    #[test]
    fn test_dequeue_stamps_exit_time() {
        let line = QueuePolicy::Fifo.build::<Cart>();
        line.enqueue(Entry::Item(Cart::new(1, 3)));
        let cart = line.dequeue().into_item().unwrap();
        assert!(cart.timing().enter.is_some());
        assert!(cart.timing().exit.is_some());
        assert!(cart.timing().finish.is_none());
    }
}
