//! Serialization of the shared sensor types.
//!
//! `sensor-types` only derives serde behind its `serde` feature; this crate
//! always enables it, so the JSON shapes are checked here.

use sensor_types::{
    AudioFormat, CoordinateConvention, ImuReading, PixelLayout, RawColorFrame, Timestamp,
};

#[test]
fn timestamp_round_trips_as_nanoseconds() {
    let ts = Timestamp::from_nanos(1_500_000_000);
    let json = serde_json::to_string(&ts).unwrap();
    assert!(json.contains("1500000000"));

    let parsed: Timestamp = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, ts);
}

#[test]
fn imu_reading_names_its_convention() {
    let reading = ImuReading {
        timestamp: Timestamp::from_nanos(5_000_000),
        acceleration: [0.0, 0.0, 9.81],
        convention: CoordinateConvention::Ned,
        ..ImuReading::default()
    };

    let json = serde_json::to_string(&reading).unwrap();
    assert!(json.contains("\"ned\""));

    let parsed: ImuReading = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, reading);
}

#[test]
fn conventions_use_lowercase_names() {
    for convention in CoordinateConvention::ALL {
        let json = serde_json::to_string(&convention).unwrap();
        assert_eq!(json, format!("\"{convention}\""));
        let parsed: CoordinateConvention = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, convention);
    }
    assert!(serde_json::from_str::<CoordinateConvention>("\"nwu\"").is_err());
}

#[test]
fn frame_and_format_round_trip() {
    let frame = RawColorFrame::solid(2, 2, [1, 2, 3]);
    let parsed: RawColorFrame =
        serde_json::from_str(&serde_json::to_string(&frame).unwrap()).unwrap();
    assert_eq!(parsed, frame);
    assert_eq!(parsed.layout, PixelLayout::Rgb8);

    let format = AudioFormat::default();
    let parsed: AudioFormat =
        serde_json::from_str(&serde_json::to_string(&format).unwrap()).unwrap();
    assert_eq!(parsed, format);
}
