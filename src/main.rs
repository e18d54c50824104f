use std::io::Write;
use std::process;
use std::time::Duration;

use clap::Parser;
use env_logger::{Builder, Env, Target};

use grocery_line_simulator::{ConfigError, QueuePolicy, Simulation, SimulationConfig};

/// Simulación de la fila de caja de un supermercado.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Cantidad de clientes a simular
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    customers: u32,

    /// Tamaño promedio de los carritos (cantidad de productos)
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    avg_load: u32,

    /// Tiempo promedio entre llegadas de clientes (ms)
    #[arg(value_parser = parse_delay)]
    avg_delay: f64,

    /// Política de la fila: FIFO o Priority
    policy: QueuePolicy,

    /// Semilla del generador aleatorio
    #[arg(long)]
    seed: Option<u64>,

    /// Tiempo de atención por producto (ms)
    #[arg(long, default_value_t = 10)]
    time_per_item: u64,

    /// Mostrar la tabla detallada por carrito
    #[arg(long)]
    details: bool,

    /// Imprimir también los resultados por carrito en formato CSV
    #[arg(long)]
    csv: bool,
}

fn parse_delay(s: &str) -> Result<f64, ConfigError> {
    let delay: f64 = s
        .parse()
        .map_err(|_| ConfigError::UnparsableDelay(s.to_string()))?;
    if !delay.is_finite() || delay <= 0.0 {
        return Err(ConfigError::InvalidDelay(delay));
    }
    Ok(delay)
}

fn main() {
    let args = Args::parse();

    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .target(Target::Stdout)
        .init();

    let mut config = SimulationConfig::new(
        args.customers as usize,
        args.avg_load,
        args.avg_delay,
        args.policy,
    )
    .with_time_per_item(Duration::from_millis(args.time_per_item));
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let simulation = Simulation::new(&config).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    println!("Generando {} clientes.", config.customers);
    println!("Tamaño promedio de carrito: {}", config.avg_cart_size);
    println!("Tiempo promedio entre llegadas: {:.2} ms", config.avg_delay_ms);
    println!("Usando una fila {}.\n", config.policy);

    let metrics = simulation.run().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    if args.details {
        print!("{}", simulation.generate_details(&metrics));
    }
    println!();
    print!("{}", simulation.generate_report(&metrics));

    if args.csv {
        println!();
        print!("{}", simulation.generate_csv_report(&metrics));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positional_arguments() {
        let args = Args::try_parse_from(["bin", "5", "10", "2.5", "Priority", "--seed", "4"]).unwrap();
        assert_eq!(args.customers, 5);
        assert_eq!(args.avg_load, 10);
        assert_eq!(args.avg_delay, 2.5);
        assert_eq!(args.policy, QueuePolicy::Priority);
        assert_eq!(args.seed, Some(4));
        assert_eq!(args.time_per_item, 10);
    }

    #[test]
    fn test_rejects_bad_arguments() {
        assert!(Args::try_parse_from(["bin", "5", "10", "2.5"]).is_err());
        assert!(Args::try_parse_from(["bin", "0", "10", "2.5", "FIFO"]).is_err());
        assert!(Args::try_parse_from(["bin", "5", "10", "-1", "FIFO"]).is_err());
        assert!(Args::try_parse_from(["bin", "5", "10", "abc", "FIFO"]).is_err());
        assert!(Args::try_parse_from(["bin", "5", "10", "2.5", "LIFO"]).is_err());
    }

    #[test]
    fn test_parse_delay() {
        assert_eq!(parse_delay("12.5"), Ok(12.5));
        assert_eq!(parse_delay("0"), Err(ConfigError::InvalidDelay(0.0)));
        assert_eq!(
            parse_delay("x"),
            Err(ConfigError::UnparsableDelay("x".to_string()))
        );
    }
}
