/// Default units keyed by normalized measurement label
const UNIT_TABLE: &[(&str, &str)] = &[
    ("temperature", "°C"),
    ("temp", "°C"),
    ("humidity", "%"),
    ("relative_humidity", "%"),
    ("pressure", "Pa"),
    ("ph", "pH"),
    ("co2", "ppm"),
    ("voc", "ppb"),
    ("pm2_5", "µg/m³"),
    ("pm10", "µg/m³"),
    ("voltage", "V"),
    ("current", "A"),
    ("power", "W"),
    ("energy", "kWh"),
    ("battery", "%"),
    ("battery_level", "%"),
    ("light", "lux"),
    ("illuminance", "lux"),
    ("noise", "dB"),
    ("sound_level", "dB"),
    ("speed", "m/s"),
    ("wind_speed", "m/s"),
    ("distance", "m"),
    ("altitude", "m"),
    ("weight", "kg"),
    ("flow", "L/min"),
    ("flow_rate", "L/min"),
    ("frequency", "Hz"),
    ("vibration", "mm/s"),
    ("rssi", "dBm"),
    ("conductivity", "µS/cm"),
    ("turbidity", "NTU"),
    ("dissolved_oxygen", "mg/L"),
];

/// Infer a unit from a measurement label ("Temperature", "wind speed", ...).
///
/// Returns `None` for labels outside the table.
pub fn infer_unit(label: &str) -> Option<&'static str> {
    let key = normalize(label);
    UNIT_TABLE
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, unit)| *unit)
}

fn normalize(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' || c == '.' { '_' } else { c })
        .collect()
}
