//! Track log rows: one [PositionSample] per CRLF terminated CSV record.
use csv::{Terminator, WriterBuilder};

use crate::{epoch::format_log_time, sample::PositionSample, Error};

/// Track log header
pub const HEADER: [&str; 10] = [
    "time",
    "latitude",
    "longitude",
    "horizontalAccuracy",
    "speed",
    "speedAccuracy",
    "course",
    "courseAccuracy",
    "altitude",
    "verticalAccuracy",
];

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Encodes one sample as track log fields. Invalid measurements
/// are left empty, accuracies are always written.
pub fn fields(sample: &PositionSample) -> [String; 10] {
    [
        format_log_time(&sample.time),
        optional(sample.coordinates.map(|c| c.latitude)),
        optional(sample.coordinates.map(|c| c.longitude)),
        sample.horizontal_accuracy.to_string(),
        optional(sample.speed),
        sample.speed_accuracy.to_string(),
        optional(sample.course),
        sample.course_accuracy.to_string(),
        optional(sample.altitude),
        sample.vertical_accuracy.to_string(),
    ]
}

/// Encodes a complete record, terminator included
pub fn encode_record<I, T>(fields: I) -> Result<Vec<u8>, Error>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut w = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::with_capacity(128));
    w.write_record(fields)?;
    w.into_inner()
        .map_err(|e| Error::FileIO(e.into_error()))
}

/// Encodes the header record
pub fn encode_header() -> Result<Vec<u8>, Error> {
    encode_record(HEADER)
}

/// Encodes a sample record
pub fn encode_sample(sample: &PositionSample) -> Result<Vec<u8>, Error> {
    encode_record(fields(sample))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sample::{Coordinates, RawFix};
    use chrono::{FixedOffset, TimeZone};
    #[test]
    fn header() {
        let header = encode_header().unwrap();
        assert_eq!(
            String::from_utf8(header).unwrap(),
            "time,latitude,longitude,horizontalAccuracy,speed,speedAccuracy,course,courseAccuracy,altitude,verticalAccuracy\r\n"
        );
    }
    #[test]
    fn sample_rows() {
        let time = FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(2021, 6, 22, 6, 10, 15)
            .unwrap();
        let sample = PositionSample::from(RawFix {
            latitude: 35.5,
            longitude: 139.25,
            horizontal_accuracy: 4.0,
            altitude: 12.5,
            vertical_accuracy: 3.0,
            speed: 1.5,
            speed_accuracy: 0.5,
            course: 270.0,
            course_accuracy: 15.0,
            time,
        });
        let row = String::from_utf8(encode_sample(&sample).unwrap()).unwrap();
        assert_eq!(row, "2021-06-22 06:10:15+09:00,35.5,139.25,4,1.5,0.5,270,15,12.5,3\r\n");

        let sample = PositionSample::from(RawFix {
            latitude: 0.0,
            longitude: 0.0,
            horizontal_accuracy: -1.0,
            altitude: 0.0,
            vertical_accuracy: -1.0,
            speed: -1.0,
            speed_accuracy: -1.0,
            course: -1.0,
            course_accuracy: -1.0,
            time,
        });
        let row = String::from_utf8(encode_sample(&sample).unwrap()).unwrap();
        assert_eq!(row, "2021-06-22 06:10:15+09:00,,,-1,,-1,,-1,,-1\r\n");

        let sample = PositionSample::at(Coordinates::new(1.0, 2.0), time).with_speed(0.0);
        let row = String::from_utf8(encode_sample(&sample).unwrap()).unwrap();
        assert_eq!(row, "2021-06-22 06:10:15+09:00,1,2,0,0,0,,-1,,-1\r\n");
    }
}
