use bfslog::message::{DataRecord, LogWriter, ScalarType};

/// Samples for a single record of [flight_log].
pub fn record(i: usize) -> DataRecord {
    let mut record = DataRecord::new();
    let i_u8 = u8::try_from(i % 256).unwrap();
    record
        .push(1_000_000u64 + i as u64 * 20_000)
        .push(i_u8)
        .push(-(i as i16))
        .push(i as f32 * 0.5)
        .push(45.0f64 + i as f64 * 1e-6);
    record
}

/// Build a log like the flight computer writes: declarations followed by `records`
/// data frames.
pub fn flight_log(records: usize) -> Vec<u8> {
    let mut writer = LogWriter::new(Vec::new());
    writer.write_key(ScalarType::Uint64, "Time_us").unwrap();
    writer.write_desc(ScalarType::Uint64, "Time, us").unwrap();
    writer.write_key(ScalarType::Uint8, "Mode").unwrap();
    writer.write_desc(ScalarType::Uint8, "Flight mode").unwrap();
    writer.write_key(ScalarType::Int16, "Elevator").unwrap();
    writer.write_desc(ScalarType::Int16, "Elevator command, counts").unwrap();
    writer.write_key(ScalarType::Float, "Airspeed_ms").unwrap();
    writer.write_desc(ScalarType::Float, "Indicated airspeed, m/s").unwrap();
    writer.write_key(ScalarType::Double, "Lat_deg").unwrap();
    writer.write_desc(ScalarType::Double, "Latitude, deg").unwrap();
    for i in 0..records {
        writer.write_data(&record(i)).unwrap();
    }
    writer.into_inner()
}
