//! Kubernetes resource quantity parsing and formatting
//!
//! Declared limits arrive as quantity strings ("500m", "1.5", "128Mi",
//! "1G"). All CPU math in the analyzer is done in millicores and all memory
//! math in bytes, so everything is normalized here, at the edge.

/// Parse a CPU quantity string to millicores.
///
/// "100m" -> 100, "1" -> 1000, "1.5" -> 1500
pub fn parse_cpu_millicores(cpu: &str) -> Option<f64> {
    let cpu = cpu.trim();
    if cpu.is_empty() {
        return None;
    }

    if let Some(millis) = cpu.strip_suffix('m') {
        let value: f64 = millis.parse().ok()?;
        (value >= 0.0).then_some(value)
    } else {
        let cores: f64 = cpu.parse().ok()?;
        (cores >= 0.0).then_some(cores * 1000.0)
    }
}

/// Parse a memory or storage quantity string to bytes.
///
/// Supports binary (Ki, Mi, Gi, Ti, Pi, Ei) and decimal (K, M, G, T, P, E)
/// suffixes; a bare number is already bytes.
pub fn parse_memory_bytes(memory: &str) -> Option<f64> {
    let memory = memory.trim();
    if memory.is_empty() {
        return None;
    }

    let (number, multiplier) = match memory.find(|c: char| c.is_ascii_alphabetic()) {
        Some(idx) => {
            let (number, unit) = memory.split_at(idx);
            let multiplier = match unit {
                "Ki" => 1024f64,
                "Mi" => 1024f64.powi(2),
                "Gi" => 1024f64.powi(3),
                "Ti" => 1024f64.powi(4),
                "Pi" => 1024f64.powi(5),
                "Ei" => 1024f64.powi(6),
                "K" | "k" => 1e3,
                "M" => 1e6,
                "G" => 1e9,
                "T" => 1e12,
                "P" => 1e15,
                "E" => 1e18,
                _ => return None,
            };
            (number, multiplier)
        }
        None => (memory, 1.0),
    };

    let value: f64 = number.parse().ok()?;
    (value >= 0.0).then_some(value * multiplier)
}

/// Format millicores as a canonical CPU quantity string
pub fn format_millicores(millicores: f64) -> String {
    format!("{}m", millicores.round() as i64)
}

/// Format bytes as a plain-integer quantity string
///
/// A bare integer is always a valid Kubernetes quantity, so mutation
/// payloads use it rather than guessing a suffix.
pub fn format_bytes_quantity(bytes: f64) -> String {
    format!("{}", bytes.round() as i64)
}
