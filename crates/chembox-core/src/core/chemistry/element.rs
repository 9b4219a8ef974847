use phf::{Map, phf_map};

/// Static description of a chemical element as the sandbox knows it.
///
/// One immutable record per element symbol; atoms hold a reference into the
/// table rather than copying these fields around. The color is opaque to the
/// physics and only travels through to the rendering snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementSpec {
    /// Element symbol (e.g. "H", "Na").
    pub symbol: &'static str,
    /// Maximum number of simultaneous bonds, counting a double bond twice.
    pub valence: u8,
    /// Display color as RGB, opaque to the simulation.
    pub color: [u8; 3],
    /// Default formal ionic charge, applied when the charge model is enabled.
    pub formal_charge: i8,
    /// Collision radius in canvas units.
    pub radius: f64,
}

static ELEMENTS: Map<&'static str, ElementSpec> = phf_map! {
    "H" => ElementSpec { symbol: "H", valence: 1, color: [220, 220, 255], formal_charge: 0, radius: 12.0 },
    "O" => ElementSpec { symbol: "O", valence: 2, color: [255, 160, 160], formal_charge: 0, radius: 16.0 },
    "S" => ElementSpec { symbol: "S", valence: 6, color: [255, 210, 140], formal_charge: 0, radius: 16.0 },
    "Na" => ElementSpec { symbol: "Na", valence: 1, color: [160, 200, 255], formal_charge: 1, radius: 18.0 },
    "Cl" => ElementSpec { symbol: "Cl", valence: 1, color: [160, 255, 170], formal_charge: -1, radius: 17.0 },
    "C" => ElementSpec { symbol: "C", valence: 4, color: [200, 200, 200], formal_charge: 0, radius: 16.0 },
    "Ca" => ElementSpec { symbol: "Ca", valence: 2, color: [210, 190, 140], formal_charge: 2, radius: 20.0 },
};

/// Looks up an element by its symbol.
///
/// Returns `None` for unknown symbols; spawn requests for unknown elements are
/// rejected at this boundary rather than propagated as errors.
pub fn lookup(symbol: &str) -> Option<&'static ElementSpec> {
    ELEMENTS.get(symbol)
}

/// Iterates over every element in the table, in unspecified order.
pub fn all() -> impl Iterator<Item = &'static ElementSpec> {
    ELEMENTS.values()
}
